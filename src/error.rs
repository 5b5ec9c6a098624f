// error.rs
use std::fmt;

use thiserror::Error;

use crate::dtos::workrequestdtos::RequestValidationError;
use crate::models::workrequestmodel::WorkRequestStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorMessage {
    InvalidCredentials,
    AlreadyRegistered,
    RateLimited,
    SessionExpired,
    NetworkFailure,
    UserNotAuthenticated,
    PermissionDenied,
    ServerError,
}

impl ErrorMessage {
    /// Known server message fragments and the localized key each maps to.
    const SERVER_FRAGMENTS: [(&'static str, ErrorMessage); 4] = [
        ("invalid login credentials", ErrorMessage::InvalidCredentials),
        ("already registered", ErrorMessage::AlreadyRegistered),
        ("rate limit", ErrorMessage::RateLimited),
        ("unauthenticated", ErrorMessage::SessionExpired),
    ];

    pub fn from_server_message(message: &str) -> Option<ErrorMessage> {
        let lowered = message.to_lowercase();
        Self::SERVER_FRAGMENTS
            .iter()
            .find(|(fragment, _)| lowered.contains(fragment))
            .map(|(_, kind)| *kind)
    }

    pub fn i18n_key(&self) -> &'static str {
        match self {
            ErrorMessage::InvalidCredentials => "auth.invalid_credentials",
            ErrorMessage::AlreadyRegistered => "auth.already_registered",
            ErrorMessage::RateLimited => "auth.rate_limited",
            ErrorMessage::SessionExpired => "auth.session_expired",
            ErrorMessage::NetworkFailure => "errors.network",
            ErrorMessage::UserNotAuthenticated => "auth.login_required",
            ErrorMessage::PermissionDenied => "errors.permission_denied",
            ErrorMessage::ServerError => "errors.server",
        }
    }

    fn to_str(&self) -> &'static str {
        match self {
            ErrorMessage::InvalidCredentials => "Email or password is wrong",
            ErrorMessage::AlreadyRegistered => "An account with this email already exists",
            ErrorMessage::RateLimited => "Too many attempts, please wait and try again",
            ErrorMessage::SessionExpired => "Your session has expired, please log in again",
            ErrorMessage::NetworkFailure => "Could not reach the server, check your connection",
            ErrorMessage::UserNotAuthenticated => "Authentication required. Please log in.",
            ErrorMessage::PermissionDenied => "You are not allowed to perform this action",
            ErrorMessage::ServerError => "Something went wrong, please try again later",
        }
    }
}

impl fmt::Display for ErrorMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.to_str())
    }
}

#[derive(Error, Debug)]
pub enum ClientError {
    #[error("Transport failure: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("{0}")]
    Validation(#[from] RequestValidationError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Server rejected request ({status}): {message}")]
    Server { status: u16, message: String },

    #[error("Malformed server response: {0}")]
    MalformedResponse(String),

    #[error("{}", ErrorMessage::UserNotAuthenticated)]
    Unauthenticated,

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("Work request {0} is closed")]
    RequestClosed(i64),

    #[error("Cannot move work request {id} from {from:?} to {to:?}")]
    InvalidStatusTransition {
        id: i64,
        from: WorkRequestStatus,
        to: WorkRequestStatus,
    },

    #[error("Work request {0} has no pending status change")]
    NoPendingChange(i64),

    #[error("Work request {0} already has a pending status change")]
    ChangeAlreadyPending(i64),

    #[error("User {0} proposed this change and cannot answer it")]
    SelfConfirmation(i64),

    #[error("Work request {0} is not completed yet")]
    NotCompleted(i64),

    #[error("Work request {0} already has a provider")]
    ProviderAlreadyAssigned(i64),

    #[error("Conversation for work request {0} is closed")]
    ConversationClosed(i64),

    #[error("A message is already being sent")]
    SendInFlight,

    #[error("Session storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<validator::ValidationErrors> for ClientError {
    fn from(errors: validator::ValidationErrors) -> Self {
        ClientError::InvalidInput(errors.to_string())
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        ClientError::MalformedResponse(err.to_string())
    }
}

/// What a UI shows in a transient notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserFacingError {
    pub key: String,
    pub text: String,
}

impl ClientError {
    pub fn user_message(&self) -> UserFacingError {
        let known = |kind: ErrorMessage| UserFacingError {
            key: kind.i18n_key().to_string(),
            text: kind.to_string(),
        };

        match self {
            ClientError::Transport(_) => known(ErrorMessage::NetworkFailure),
            ClientError::Validation(err) => UserFacingError {
                key: err.i18n_key().to_string(),
                text: err.to_string(),
            },
            ClientError::Server { message, .. } => {
                match ErrorMessage::from_server_message(message) {
                    Some(kind) => known(kind),
                    None => UserFacingError {
                        key: "errors.server_message".to_string(),
                        text: message.clone(),
                    },
                }
            }
            ClientError::Unauthenticated => known(ErrorMessage::UserNotAuthenticated),
            ClientError::PermissionDenied(_) | ClientError::SelfConfirmation(_) => {
                known(ErrorMessage::PermissionDenied)
            }
            ClientError::MalformedResponse(_)
            | ClientError::Storage(_)
            | ClientError::Config(_) => known(ErrorMessage::ServerError),
            other => UserFacingError {
                key: "errors.action_rejected".to_string(),
                text: other.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_known_server_messages() {
        assert_eq!(
            ErrorMessage::from_server_message("Invalid login credentials"),
            Some(ErrorMessage::InvalidCredentials)
        );
        assert_eq!(
            ErrorMessage::from_server_message("User already registered"),
            Some(ErrorMessage::AlreadyRegistered)
        );
        assert_eq!(
            ErrorMessage::from_server_message("Email rate limit exceeded"),
            Some(ErrorMessage::RateLimited)
        );
        assert_eq!(ErrorMessage::from_server_message("Something odd"), None);
    }

    #[test]
    fn unmapped_server_message_is_shown_verbatim() {
        let err = ClientError::Server {
            status: 422,
            message: "The title field is required.".to_string(),
        };
        let shown = err.user_message();
        assert_eq!(shown.key, "errors.server_message");
        assert_eq!(shown.text, "The title field is required.");
    }

    #[test]
    fn mapped_server_message_uses_key() {
        let err = ClientError::Server {
            status: 401,
            message: "Invalid login credentials".to_string(),
        };
        assert_eq!(err.user_message().key, "auth.invalid_credentials");
    }

    #[test]
    fn validation_errors_keep_their_rule() {
        let err = ClientError::from(RequestValidationError::BudgetOrder);
        let shown = err.user_message();
        assert_eq!(shown.key, "work_request.budget_order");
        assert_eq!(shown.text, "max cannot be less than min");
    }
}
