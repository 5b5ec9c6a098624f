pub mod api;
pub mod config;
pub mod dtos;
pub mod error;
pub mod guard;
pub mod models;
pub mod navigation;
pub mod service;
pub mod session;

use std::sync::Arc;

use api::ResourceClient;
use config::Config;
use error::ClientError;
use service::{
    auth_service::AuthService, chat_service::ChatService,
    notification_service::NotificationService, review_service::ReviewService,
    work_request_service::WorkRequestService,
};
use session::{
    token_store::{FileTokenStore, TokenStore},
    SessionStore,
};

/// Everything a running client needs, built once at start.
#[derive(Debug, Clone)]
pub struct AppState {
    pub env: Config,
    pub session: Arc<SessionStore>,
    pub client: Arc<ResourceClient>,
    pub auth_service: AuthService,
    pub work_request_service: WorkRequestService,
    pub notification_service: NotificationService,
    pub chat_service: ChatService,
    pub review_service: ReviewService,
}

impl AppState {
    pub fn new(config: Config) -> Result<Self, ClientError> {
        let store = Arc::new(FileTokenStore::new(config.session_file.clone()));
        tracing::debug!("Session file at {}", store.path().display());
        Self::with_token_store(config, store)
    }

    pub fn with_token_store(
        config: Config,
        store: Arc<dyn TokenStore>,
    ) -> Result<Self, ClientError> {
        let session = Arc::new(SessionStore::new(store));
        let client = Arc::new(ResourceClient::new(
            &config.api_base_url,
            config.http_timeout,
            session.clone(),
        )?);

        let work_request_service = WorkRequestService::new(client.clone());
        let chat_service = ChatService::new(
            client.clone(),
            work_request_service.clone(),
            config.chat_poll,
            config.conversations_poll,
        );

        Ok(AppState {
            auth_service: AuthService::new(client.clone()),
            notification_service: NotificationService::new(
                client.clone(),
                config.notification_poll,
            ),
            review_service: ReviewService::new(client.clone()),
            work_request_service,
            chat_service,
            env: config,
            session,
            client,
        })
    }

    /// Signs out; every poller checks the session and stops fetching on its own.
    pub async fn sign_out(&self) {
        self.auth_service.sign_out().await;
    }
}
