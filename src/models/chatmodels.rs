// models/chatmodels.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::usermodel::UserRole;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct ChatParticipant {
    pub id: i64,
    #[serde(default)]
    pub name: String,
    pub role: UserRole,
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Message {
    pub id: i64,
    pub work_request_id: i64,
    pub sender_id: i64,
    pub receiver_id: i64,
    pub content: String,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub sender: Option<ChatParticipant>,
}

impl Message {
    pub fn sender_role(&self) -> Option<UserRole> {
        self.sender.as_ref().map(|sender| sender.role)
    }

    /// Whether the viewer should see this message as their own.
    /// Staff viewers see every staff message as their own.
    pub fn is_own(&self, viewer_id: i64, viewer_role: UserRole) -> bool {
        if self.sender_id == viewer_id {
            return true;
        }
        viewer_role.is_staff() && self.sender_role().map_or(false, |role| role.is_staff())
    }
}

/// Sort by server creation time; ids break ties.
pub fn sort_messages(messages: &mut [Message]) {
    messages.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
}

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Conversation {
    pub work_request_id: i64,
    pub other_user: ChatParticipant,
    #[serde(default)]
    pub last_message: Option<Message>,
    #[serde(default)]
    pub unread_count: i64,
}
