// service/review_service.rs
use std::sync::Arc;

use validator::Validate;

use crate::{
    api::{reviewapi::ReviewExt, ResourceClient},
    dtos::reviewdtos::{CreateReviewDto, UpdateReviewDto},
    error::ClientError,
    models::{
        reviewmodel::Review,
        usermodel::Session,
        workrequestmodel::{WorkRequest, WorkRequestStatus},
    },
};

#[derive(Debug, Clone)]
pub struct ReviewService {
    client: Arc<ResourceClient>,
}

impl ReviewService {
    pub fn new(client: Arc<ResourceClient>) -> Self {
        Self { client }
    }

    pub async fn leave_review(
        &self,
        request: &WorkRequest,
        rating: u8,
        comment: &str,
    ) -> Result<Review, ClientError> {
        let session = self.client.session().require()?;
        let reviewee_id = check_review(request, &session)?;

        let dto = CreateReviewDto {
            work_request_id: request.id,
            reviewee_id,
            rating,
            comment: comment.trim().to_string(),
        };
        dto.validate()?;

        let review = self.client.create_review(&dto).await?;
        tracing::info!(
            "User {} reviewed user {} on work request {}",
            session.user_id(),
            reviewee_id,
            request.id
        );
        Ok(review)
    }

    pub async fn edit_review(
        &self,
        id: i64,
        rating: u8,
        comment: &str,
    ) -> Result<Review, ClientError> {
        self.client.session().require()?;
        let dto = UpdateReviewDto {
            rating,
            comment: comment.trim().to_string(),
        };
        dto.validate()?;
        self.client.update_review(id, &dto).await
    }

    pub async fn reviews_for(&self, user_id: i64) -> Result<Vec<Review>, ClientError> {
        self.client.get_user_reviews(user_id).await
    }
}

/// Returns who the caller would be reviewing: the other party of a completed request.
pub fn check_review(request: &WorkRequest, session: &Session) -> Result<i64, ClientError> {
    if request.status() != WorkRequestStatus::Completed {
        return Err(ClientError::NotCompleted(request.id));
    }

    let caller = session.user_id();
    if !request.is_party(caller) {
        return Err(ClientError::PermissionDenied(format!(
            "user {} is not a party to work request {}",
            caller, request.id
        )));
    }

    match request.provider_id {
        Some(provider) if caller == request.owner_id => Ok(provider),
        Some(_) => Ok(request.owner_id),
        None => Err(ClientError::PermissionDenied(format!(
            "work request {} has no provider to review",
            request.id
        ))),
    }
}
