// models/reviewmodel.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Review {
    pub id: i64,
    pub work_request_id: i64,
    #[serde(default)]
    pub reviewer_id: Option<i64>,
    pub reviewee_id: i64,
    pub rating: u8,
    #[serde(default)]
    pub comment: String,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}
