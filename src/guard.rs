// guard.rs
use crate::{
    models::usermodel::{Session, UserRole},
    navigation::Route,
    session::SessionStore,
};

/// Outcome of a route guard: the session to render with, or where to go instead.
#[derive(Debug, Clone, PartialEq)]
pub enum Access {
    Granted(Session),
    Redirect(Route),
}

impl Access {
    pub fn is_granted(&self) -> bool {
        matches!(self, Access::Granted(_))
    }
}

pub fn require_session(store: &SessionStore) -> Access {
    match store.current() {
        Some(session) => Access::Granted(session),
        None => {
            tracing::debug!("No session, redirecting to login");
            Access::Redirect(Route::Login)
        }
    }
}

pub fn require_roles(store: &SessionStore, required_roles: &[UserRole]) -> Access {
    match require_session(store) {
        Access::Granted(session) if required_roles.contains(&session.role()) => {
            Access::Granted(session)
        }
        Access::Granted(session) => {
            tracing::warn!(
                "User {} with role {} denied a view for {:?}",
                session.user_id(),
                session.role().to_str(),
                required_roles
            );
            Access::Redirect(Route::Root)
        }
        redirect => redirect,
    }
}

/// Staff views: support desk and administration.
pub fn require_staff(store: &SessionStore) -> Access {
    require_roles(
        store,
        &[UserRole::Support, UserRole::Admin, UserRole::HeadAdmin],
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::usermodel::User;
    use crate::session::token_store::MemoryTokenStore;
    use std::sync::Arc;

    fn store_with(role: Option<UserRole>) -> SessionStore {
        let store = SessionStore::new(Arc::new(MemoryTokenStore::new()));
        if let Some(role) = role {
            let user = User {
                id: 1,
                name: "Sara".to_string(),
                email: "sara@example.com".to_string(),
                role,
                phone: None,
            };
            store.sign_in(user, "tok").unwrap();
        }
        store
    }

    #[test]
    fn anonymous_is_sent_to_login() {
        let store = store_with(None);
        assert_eq!(require_session(&store), Access::Redirect(Route::Login));
        assert_eq!(require_staff(&store), Access::Redirect(Route::Login));
    }

    #[test]
    fn wrong_role_is_sent_home() {
        let store = store_with(Some(UserRole::Provider));
        assert!(require_session(&store).is_granted());
        assert_eq!(require_staff(&store), Access::Redirect(Route::Root));
    }

    #[test]
    fn staff_pass() {
        let store = store_with(Some(UserRole::Support));
        assert!(require_staff(&store).is_granted());
        assert!(require_roles(&store, &[UserRole::Support]).is_granted());
    }
}
