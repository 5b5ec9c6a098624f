// api/notificationapi.rs
use async_trait::async_trait;

use super::client::{RequestOptions, ResourceClient};
use crate::{error::ClientError, models::notificationmodel::NotificationFeed};

#[async_trait]
pub trait NotificationExt {
    async fn get_notifications(&self) -> Result<NotificationFeed, ClientError>;

    async fn mark_notification_read(&self, id: &str) -> Result<(), ClientError>;

    async fn mark_all_notifications_read(&self) -> Result<(), ClientError>;
}

#[async_trait]
impl NotificationExt for ResourceClient {
    async fn get_notifications(&self) -> Result<NotificationFeed, ClientError> {
        self.request("/notifications", RequestOptions::get())
            .await?
            .decode(&[])
    }

    async fn mark_notification_read(&self, id: &str) -> Result<(), ClientError> {
        let path = format!("/notifications/{}/read", id);
        self.request(&path, RequestOptions::post())
            .await?
            .expect_ok()
    }

    async fn mark_all_notifications_read(&self) -> Result<(), ClientError> {
        self.request("/notifications/read-all", RequestOptions::post())
            .await?
            .expect_ok()
    }
}
