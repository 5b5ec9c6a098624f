//! Shared fixtures for the integration tests: a wiremock server standing in
//! for the marketplace API and app states wired to it.
#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use serde_json::{json, Value};
use wiremock::MockServer;
use workdesk::{
    config::Config,
    models::usermodel::{Session, User, UserRole},
    session::token_store::{MemoryTokenStore, TokenStore},
    AppState,
};

pub const TOKEN: &str = "test-token";
pub const CLIENT_ID: i64 = 1;
pub const PROVIDER_ID: i64 = 2;

pub fn user(id: i64, role: UserRole) -> User {
    User {
        id,
        name: format!("user-{}", id),
        email: format!("user{}@example.com", id),
        role,
        phone: Some("+966501234567".to_string()),
    }
}

pub fn user_json(id: i64, role: &str) -> Value {
    json!({
        "id": id,
        "name": format!("user-{}", id),
        "email": format!("user{}@example.com", id),
        "role": role,
        "phone": "+966501234567"
    })
}

/// Config whose pollers tick every `poll`.
pub fn config(server: &MockServer, poll: Duration) -> Config {
    let mut config = Config::with_base_url(server.uri());
    config.http_timeout = Duration::from_secs(5);
    config.notification_poll = poll;
    config.chat_poll = poll;
    config.conversations_poll = poll;
    config
}

pub fn anonymous(server: &MockServer) -> AppState {
    anonymous_with(server, Duration::from_secs(60), Arc::new(MemoryTokenStore::new()))
}

pub fn anonymous_with(server: &MockServer, poll: Duration, store: Arc<dyn TokenStore>) -> AppState {
    AppState::with_token_store(config(server, poll), store).expect("app state")
}

pub fn signed_in(server: &MockServer, id: i64, role: UserRole) -> AppState {
    signed_in_polling(server, id, role, Duration::from_secs(60))
}

pub fn signed_in_polling(server: &MockServer, id: i64, role: UserRole, poll: Duration) -> AppState {
    let store = Arc::new(MemoryTokenStore::with_session(Session::new(user(id, role), TOKEN)));
    let state = anonymous_with(server, poll, store);
    state.auth_service.restore().expect("restored session");
    state
}

pub fn work_request_json(id: i64, status: &str, pending: Option<(&str, i64)>) -> Value {
    let mut value = json!({
        "id": id,
        "user_id": CLIENT_ID,
        "title": "Fix kitchen sink",
        "description": "Leaking under the counter",
        "service_type": "local",
        "city": "riyadh",
        "category_ids": [3],
        "budget_min": "60.00",
        "budget_max": 200,
        "provider_id": PROVIDER_ID,
        "status": status,
        "pending_status": null,
        "pending_status_changed_by": null,
        "created_at": "2024-05-01T10:00:00Z"
    });
    if let Some((proposed, by)) = pending {
        value["pending_status"] = json!(proposed);
        value["pending_status_changed_by"] = json!(by);
    }
    value
}

pub fn notification_json(id: &str, kind: &str, data: Value, read: bool) -> Value {
    json!({
        "id": id,
        "type": kind,
        "title": "New message",
        "message": "You have a new message",
        "data": data,
        "read_at": if read { json!("2024-05-01T10:05:00Z") } else { Value::Null },
        "created_at": "2024-05-01T10:00:00Z"
    })
}

pub fn message_json(id: i64, sender: (i64, &str), receiver: i64, minute: u32) -> Value {
    json!({
        "id": id,
        "work_request_id": 42,
        "sender_id": sender.0,
        "receiver_id": receiver,
        "content": format!("message {}", id),
        "created_at": format!("2024-05-01T10:{:02}:00Z", minute),
        "sender": { "id": sender.0, "name": "someone", "role": sender.1 }
    })
}

/// Number of requests the mock server has seen for `path`.
pub async fn hits(server: &MockServer, path: &str) -> usize {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|request| request.url.path() == path)
        .count()
}
