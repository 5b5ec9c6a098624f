// models/notificationmodel.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::navigation::Route;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Notification {
    pub id: String,
    #[serde(rename = "type")]
    pub notification_type: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub data: serde_json::Value,
    #[serde(default)]
    pub read_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub fn is_read(&self) -> bool {
        self.read_at.is_some()
    }

    fn data_id(&self, key: &str) -> Option<i64> {
        match self.data.get(key)? {
            serde_json::Value::Number(n) => n.as_i64(),
            serde_json::Value::String(s) => s.parse().ok(),
            _ => None,
        }
    }

    /// Where clicking this notification should take the user.
    pub fn route(&self) -> Route {
        let work_request_id = self.data_id("work_request_id");

        if self.notification_type == "new_message" {
            if let Some(work_request_id) = work_request_id {
                if let Some(other_user_id) = self.data_id("sender_id") {
                    return Route::Conversation {
                        work_request_id,
                        other_user_id,
                    };
                }
            }
            return Route::Messages;
        }

        if self.notification_type.starts_with("status_") {
            if let Some(id) = work_request_id {
                return Route::RequestDetail { id };
            }
            return Route::MyRequests;
        }

        Route::Notifications
    }
}

/// One poll result: the full list plus the server's unread count.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct NotificationFeed {
    #[serde(alias = "data")]
    pub notifications: Vec<Notification>,
    #[serde(default)]
    pub unread_count: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn notification(kind: &str, data: serde_json::Value) -> Notification {
        serde_json::from_value(json!({
            "id": "n-1",
            "type": kind,
            "title": "t",
            "message": "m",
            "data": data,
            "read_at": null,
            "created_at": "2024-05-01T10:00:00Z"
        }))
        .unwrap()
    }

    #[test]
    fn new_message_routes_to_conversation() {
        let n = notification("new_message", json!({ "work_request_id": 42, "sender_id": "8" }));
        assert_eq!(
            n.route(),
            Route::Conversation {
                work_request_id: 42,
                other_user_id: 8
            }
        );
    }

    #[test]
    fn new_message_without_ids_routes_to_inbox() {
        let n = notification("new_message", json!({}));
        assert_eq!(n.route(), Route::Messages);
    }

    #[test]
    fn status_notifications_route_to_request() {
        let n = notification("status_change_requested", json!({ "work_request_id": 42 }));
        assert_eq!(n.route(), Route::RequestDetail { id: 42 });
    }

    #[test]
    fn other_notifications_route_to_list() {
        let n = notification("review_received", json!(null));
        assert_eq!(n.route(), Route::Notifications);
        assert!(!n.is_read());
    }
}
