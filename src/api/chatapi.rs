// api/chatapi.rs
use async_trait::async_trait;

use super::client::{RequestOptions, ResourceClient};
use crate::{
    dtos::chatdtos::SendMessageDto,
    error::ClientError,
    models::chatmodels::{Conversation, Message},
};

#[async_trait]
pub trait ChatExt {
    async fn get_conversations(&self) -> Result<Vec<Conversation>, ClientError>;

    async fn get_messages(
        &self,
        work_request_id: i64,
        other_user_id: i64,
    ) -> Result<Vec<Message>, ClientError>;

    async fn send_message(&self, dto: &SendMessageDto) -> Result<Message, ClientError>;

    async fn mark_conversation_read(
        &self,
        work_request_id: i64,
        sender_id: i64,
    ) -> Result<(), ClientError>;
}

#[async_trait]
impl ChatExt for ResourceClient {
    async fn get_conversations(&self) -> Result<Vec<Conversation>, ClientError> {
        self.request("/chat/conversations", RequestOptions::get())
            .await?
            .decode(&["conversations"])
    }

    async fn get_messages(
        &self,
        work_request_id: i64,
        other_user_id: i64,
    ) -> Result<Vec<Message>, ClientError> {
        let path = format!("/chat/{}", work_request_id);
        self.request(&path, RequestOptions::get().query("other_user_id", other_user_id))
            .await?
            .decode(&["messages"])
    }

    async fn send_message(&self, dto: &SendMessageDto) -> Result<Message, ClientError> {
        self.request("/chat", RequestOptions::post().json(serde_json::to_value(dto)?))
            .await?
            .decode(&["message"])
    }

    async fn mark_conversation_read(
        &self,
        work_request_id: i64,
        sender_id: i64,
    ) -> Result<(), ClientError> {
        let path = format!("/chat/mark-notifications-read/{}/{}", work_request_id, sender_id);
        self.request(&path, RequestOptions::post())
            .await?
            .expect_ok()
    }
}
