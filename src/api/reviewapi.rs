// api/reviewapi.rs
use async_trait::async_trait;

use super::client::{RequestOptions, ResourceClient};
use crate::{
    dtos::reviewdtos::{CreateReviewDto, UpdateReviewDto},
    error::ClientError,
    models::reviewmodel::Review,
};

#[async_trait]
pub trait ReviewExt {
    async fn create_review(&self, dto: &CreateReviewDto) -> Result<Review, ClientError>;

    async fn update_review(&self, id: i64, dto: &UpdateReviewDto) -> Result<Review, ClientError>;

    async fn get_user_reviews(&self, user_id: i64) -> Result<Vec<Review>, ClientError>;
}

#[async_trait]
impl ReviewExt for ResourceClient {
    async fn create_review(&self, dto: &CreateReviewDto) -> Result<Review, ClientError> {
        self.request("/reviews", RequestOptions::post().json(serde_json::to_value(dto)?))
            .await?
            .decode(&["review"])
    }

    async fn update_review(&self, id: i64, dto: &UpdateReviewDto) -> Result<Review, ClientError> {
        let path = format!("/reviews/{}", id);
        self.request(&path, RequestOptions::put().json(serde_json::to_value(dto)?))
            .await?
            .decode(&["review"])
    }

    async fn get_user_reviews(&self, user_id: i64) -> Result<Vec<Review>, ClientError> {
        let path = format!("/reviews/user/{}", user_id);
        self.request(&path, RequestOptions::get())
            .await?
            .decode(&["reviews"])
    }
}
