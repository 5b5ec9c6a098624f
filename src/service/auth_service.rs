// service/auth_service.rs
use std::sync::Arc;

use validator::Validate;

use crate::{
    api::{userapi::UserExt, ResourceClient},
    dtos::userdtos::{LoginUserDto, RegisterUserDto},
    error::ClientError,
    models::usermodel::{Profile, Session},
    session::SessionStore,
};

/// Remote side of the session lifecycle: login, registration, logout and
/// the lazily fetched profile.
#[derive(Debug, Clone)]
pub struct AuthService {
    client: Arc<ResourceClient>,
}

impl AuthService {
    pub fn new(client: Arc<ResourceClient>) -> Self {
        Self { client }
    }

    fn session(&self) -> &Arc<SessionStore> {
        self.client.session()
    }

    pub fn restore(&self) -> Option<Session> {
        self.session().restore()
    }

    pub fn current(&self) -> Option<Session> {
        self.session().current()
    }

    pub async fn login(&self, dto: LoginUserDto) -> Result<Session, ClientError> {
        dto.validate()?;

        let response = self.client.login(&dto).await.map_err(|e| {
            tracing::warn!("Login failed for {}: {}", dto.email, e);
            e
        })?;

        self.session().sign_in(response.user, response.token)
    }

    pub async fn register(&self, dto: RegisterUserDto) -> Result<Session, ClientError> {
        dto.validate()?;
        if dto.role.is_staff() {
            return Err(ClientError::InvalidInput(format!(
                "{} accounts cannot be self-registered",
                dto.role.to_str()
            )));
        }

        let payload = dto.into_payload();
        let response = self.client.register(&payload).await?;
        tracing::info!("Registered {} as {}", payload.email, payload.role.to_str());

        self.session().sign_up(response.user, response.token)
    }

    /// Tells the server, then forgets the session no matter what it said.
    pub async fn sign_out(&self) {
        if self.session().current().is_some() {
            if let Err(e) = self.client.logout().await {
                tracing::warn!("Logout request failed, clearing session anyway: {}", e);
            }
        }
        self.session().clear();
    }

    /// Profile of the signed-in user, fetched on first use and then cached.
    pub async fn profile(&self) -> Result<Profile, ClientError> {
        self.session().require()?;
        if let Some(profile) = self.session().cached_profile() {
            return Ok(profile);
        }

        let profile = self.client.get_current_user().await?;
        self.session().set_profile(profile.clone());
        Ok(profile)
    }
}
