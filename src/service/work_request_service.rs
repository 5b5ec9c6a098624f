// service/work_request_service.rs
use std::sync::Arc;

use tokio::sync::broadcast;
use validator::Validate;

use crate::{
    api::{workrequestapi::WorkRequestExt, ResourceClient},
    dtos::workrequestdtos::{Attachment, CreateWorkRequestDto},
    error::ClientError,
    models::{
        usermodel::{Session, UserRole},
        workrequestmodel::{ServiceType, WorkRequest},
    },
    navigation::{navigate_once, Navigator, Route},
    service::status_workflow::{self, StatusAction},
};

const UPDATES_CAPACITY: usize = 64;

#[derive(Debug, Clone)]
pub struct WorkRequestService {
    client: Arc<ResourceClient>,
    updates: broadcast::Sender<WorkRequest>,
}

impl WorkRequestService {
    pub fn new(client: Arc<ResourceClient>) -> Self {
        let (updates, _) = broadcast::channel(UPDATES_CAPACITY);
        Self { client, updates }
    }

    /// Every work request this service receives from the server, as it arrives.
    pub fn subscribe(&self) -> broadcast::Receiver<WorkRequest> {
        self.updates.subscribe()
    }

    fn publish(&self, requests: &[WorkRequest]) {
        if self.updates.receiver_count() == 0 {
            return;
        }
        for request in requests {
            // Only fails when every receiver is gone.
            let _ = self.updates.send(request.clone());
        }
    }

    pub async fn list(&self) -> Result<Vec<WorkRequest>, ClientError> {
        let requests = self.client.list_work_requests().await?;
        self.publish(&requests);
        Ok(requests)
    }

    pub async fn my_requests(&self) -> Result<Vec<WorkRequest>, ClientError> {
        self.client.session().require()?;
        let requests = self.client.my_work_requests().await?;
        self.publish(&requests);
        Ok(requests)
    }

    fn stored_phone(&self, session: &Session) -> Option<String> {
        self.client
            .session()
            .cached_profile()
            .and_then(|p| p.stored_phone().map(str::to_string))
            .or_else(|| {
                session
                    .user
                    .phone
                    .as_deref()
                    .map(str::trim)
                    .filter(|p| !p.is_empty())
                    .map(str::to_string)
            })
    }

    /// Checks every local rule, then posts the request. Nothing is sent when a rule fails.
    pub async fn create(
        &self,
        dto: &CreateWorkRequestDto,
        attachments: &[Attachment],
    ) -> Result<WorkRequest, ClientError> {
        let session = self.client.session().require()?;
        let stored_phone = self.stored_phone(&session);

        dto.check_rules(stored_phone.as_deref()).map_err(|e| {
            tracing::debug!("Work request rejected locally: {}", e);
            ClientError::from(e)
        })?;
        dto.validate()?;

        let payload = dto.normalized(stored_phone.as_deref());
        let created = self.client.create_work_request(&payload, attachments).await?;

        tracing::info!(
            "Work request {} created by user {} ({} attachments)",
            created.id,
            session.user_id(),
            attachments.len()
        );
        self.publish(std::slice::from_ref(&created));
        Ok(created)
    }

    /// The add-work form flow: create, clear the form, go to "my requests".
    /// The form is left untouched on failure.
    pub async fn submit(
        &self,
        form: &mut CreateWorkRequestDto,
        attachments: &[Attachment],
        navigator: &dyn Navigator,
    ) -> Result<WorkRequest, ClientError> {
        let created = self.create(form, attachments).await?;
        *form = CreateWorkRequestDto::default();
        navigate_once(navigator, Route::MyRequests);
        Ok(created)
    }

    pub async fn update_status(
        &self,
        request: &WorkRequest,
        action: StatusAction,
    ) -> Result<WorkRequest, ClientError> {
        let session = self.client.session().require()?;
        let plan = status_workflow::plan(request, &session, action)?;

        let updated = self
            .client
            .update_work_request_status(request.id, &plan.payload)
            .await?;

        if updated.state != plan.expected {
            tracing::warn!(
                "Work request {} status answered {:?}, expected {:?}",
                request.id,
                updated.state,
                plan.expected
            );
        } else {
            tracing::info!(
                "Work request {} status {:?} by user {}",
                request.id,
                updated.state,
                session.user_id()
            );
        }
        self.publish(std::slice::from_ref(&updated));
        Ok(updated)
    }

    pub async fn assign_provider(
        &self,
        request: &WorkRequest,
        provider_id: i64,
    ) -> Result<WorkRequest, ClientError> {
        let session = self.client.session().require()?;
        check_assignment(request, &session)?;

        let updated = self.client.assign_provider(request.id, provider_id).await?;
        tracing::info!("Provider {} assigned to work request {}", provider_id, request.id);
        self.publish(std::slice::from_ref(&updated));
        Ok(updated)
    }
}

/// Only the owning client may pick a provider, once, on an open non-support request.
pub fn check_assignment(request: &WorkRequest, session: &Session) -> Result<(), ClientError> {
    if session.role() != UserRole::Client || request.owner_id != session.user_id() {
        return Err(ClientError::PermissionDenied(format!(
            "user {} cannot assign a provider to work request {}",
            session.user_id(),
            request.id
        )));
    }
    if request.service_type == ServiceType::Support {
        return Err(ClientError::PermissionDenied(format!(
            "work request {} is a support thread",
            request.id
        )));
    }
    if request.is_closed() {
        return Err(ClientError::RequestClosed(request.id));
    }
    if request.provider_id.is_some() {
        return Err(ClientError::ProviderAlreadyAssigned(request.id));
    }
    Ok(())
}
