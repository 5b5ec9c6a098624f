// dtos/chatdtos.rs
use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct SendMessageDto {
    pub work_request_id: i64,
    pub receiver_id: i64,
    #[validate(length(
        min = 1,
        max = 5000,
        message = "Message must be between 1 and 5000 characters"
    ))]
    pub content: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessagesQuery {
    pub other_user_id: i64,
}
