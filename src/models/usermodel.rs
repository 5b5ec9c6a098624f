// models/usermodel.rs
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum UserRole {
    Client,
    Provider,
    Admin,
    HeadAdmin,
    Support,
}

impl UserRole {
    pub fn to_str(&self) -> &str {
        match self {
            UserRole::Client => "client",
            UserRole::Provider => "provider",
            UserRole::Admin => "admin",
            UserRole::HeadAdmin => "head_admin",
            UserRole::Support => "support",
        }
    }

    /// Staff roles share one identity in chat and in authorization checks.
    pub fn is_staff(&self) -> bool {
        matches!(self, UserRole::Admin | UserRole::HeadAdmin | UserRole::Support)
    }

    /// Roles allowed to force-set a work request status.
    pub fn can_override_status(&self) -> bool {
        matches!(self, UserRole::Admin | UserRole::HeadAdmin)
    }
}

/// Identity returned by login and registration.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub role: UserRole,
    #[serde(default)]
    pub phone: Option<String>,
}

/// The one authenticated identity of a client instance.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Session {
    pub user: User,
    pub auth_token: String,
}

impl Session {
    pub fn new(user: User, auth_token: impl Into<String>) -> Self {
        Self {
            user,
            auth_token: auth_token.into(),
        }
    }

    pub fn user_id(&self) -> i64 {
        self.user.id
    }

    pub fn role(&self) -> UserRole {
        self.user.role
    }
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Tag {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Profile {
    #[serde(alias = "id")]
    pub user_id: i64,
    pub role: UserRole,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub categories: Vec<Tag>,
    #[serde(default)]
    pub skills: Vec<Tag>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub rating: Option<f32>,
    #[serde(default)]
    pub completed_jobs: Option<i32>,
}

impl Profile {
    pub fn stored_phone(&self) -> Option<&str> {
        self.phone
            .as_deref()
            .map(str::trim)
            .filter(|phone| !phone.is_empty())
    }
}
