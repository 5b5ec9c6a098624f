// api/workrequestapi.rs
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};

use super::client::{RequestOptions, ResourceClient};
use crate::{
    dtos::workrequestdtos::{AssignProviderDto, Attachment, CreateWorkRequestDto, UpdateStatusDto},
    error::ClientError,
    models::workrequestmodel::WorkRequest,
};

const ENVELOPE_KEYS: [&str; 2] = ["work_request", "work_requests"];

#[async_trait]
pub trait WorkRequestExt {
    async fn list_work_requests(&self) -> Result<Vec<WorkRequest>, ClientError>;

    async fn my_work_requests(&self) -> Result<Vec<WorkRequest>, ClientError>;

    async fn create_work_request(
        &self,
        dto: &CreateWorkRequestDto,
        attachments: &[Attachment],
    ) -> Result<WorkRequest, ClientError>;

    async fn update_work_request_status(
        &self,
        id: i64,
        dto: &UpdateStatusDto,
    ) -> Result<WorkRequest, ClientError>;

    async fn assign_provider(&self, id: i64, provider_id: i64) -> Result<WorkRequest, ClientError>;
}

fn multipart_body(
    dto: &CreateWorkRequestDto,
    attachments: &[Attachment],
) -> Result<Form, ClientError> {
    let mut form = Form::new();
    for (name, value) in dto.form_fields() {
        form = form.text(name, value);
    }
    for attachment in attachments {
        let part = Part::bytes(attachment.bytes.clone())
            .file_name(attachment.file_name.clone())
            .mime_str(&attachment.mime_type)?;
        form = form.part("attachments[]", part);
    }
    Ok(form)
}

#[async_trait]
impl WorkRequestExt for ResourceClient {
    async fn list_work_requests(&self) -> Result<Vec<WorkRequest>, ClientError> {
        self.request("/work-requests", RequestOptions::get())
            .await?
            .decode(&ENVELOPE_KEYS)
    }

    async fn my_work_requests(&self) -> Result<Vec<WorkRequest>, ClientError> {
        self.request("/work-requests/my", RequestOptions::get())
            .await?
            .decode(&ENVELOPE_KEYS)
    }

    async fn create_work_request(
        &self,
        dto: &CreateWorkRequestDto,
        attachments: &[Attachment],
    ) -> Result<WorkRequest, ClientError> {
        let options = if attachments.is_empty() {
            RequestOptions::post().json(serde_json::to_value(dto)?)
        } else {
            RequestOptions::post().multipart(multipart_body(dto, attachments)?)
        };

        self.request("/work-request", options)
            .await?
            .decode(&ENVELOPE_KEYS)
    }

    async fn update_work_request_status(
        &self,
        id: i64,
        dto: &UpdateStatusDto,
    ) -> Result<WorkRequest, ClientError> {
        let path = format!("/work-request/{}/status", id);
        self.request(&path, RequestOptions::put().json(serde_json::to_value(dto)?))
            .await?
            .decode(&ENVELOPE_KEYS)
    }

    async fn assign_provider(&self, id: i64, provider_id: i64) -> Result<WorkRequest, ClientError> {
        let path = format!("/work-request/{}/assign-provider", id);
        let body = serde_json::to_value(AssignProviderDto { provider_id })?;
        self.request(&path, RequestOptions::put().json(body))
            .await?
            .decode(&ENVELOPE_KEYS)
    }
}
