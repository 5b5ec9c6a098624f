// models/workrequestmodel.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

pub const MIN_BUDGET: f64 = 50.0;

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum WorkRequestStatus {
    New,
    InProgress,
    PendingPayment,
    Completed,
    Delayed,
    Cancelled,
}

impl WorkRequestStatus {
    pub fn to_str(&self) -> &str {
        match self {
            WorkRequestStatus::New => "new",
            WorkRequestStatus::InProgress => "in_progress",
            WorkRequestStatus::PendingPayment => "pending_payment",
            WorkRequestStatus::Completed => "completed",
            WorkRequestStatus::Delayed => "delayed",
            WorkRequestStatus::Cancelled => "cancelled",
        }
    }

    /// Completed and cancelled requests are archived and accept no further changes.
    pub fn is_terminal(&self) -> bool {
        matches!(self, WorkRequestStatus::Completed | WorkRequestStatus::Cancelled)
    }

    /// Whether a negotiated change from `self` to `next` may be proposed.
    /// Nothing leaves a terminal status and nothing goes back to `new`.
    pub fn can_move_to(&self, next: WorkRequestStatus) -> bool {
        !self.is_terminal() && next != *self && next != WorkRequestStatus::New
    }
}

#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ServiceType {
    Local,
    Freelance,
    #[serde(alias = "Support")]
    Support,
}

impl ServiceType {
    pub fn to_str(&self) -> &str {
        match self {
            ServiceType::Local => "local",
            ServiceType::Freelance => "freelance",
            ServiceType::Support => "support",
        }
    }
}

/// Status of a work request together with any unconfirmed proposal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusState {
    Settled(WorkRequestStatus),
    ProposedChange {
        current: WorkRequestStatus,
        proposed: WorkRequestStatus,
        proposer_id: i64,
    },
}

impl StatusState {
    pub fn current(&self) -> WorkRequestStatus {
        match self {
            StatusState::Settled(status) => *status,
            StatusState::ProposedChange { current, .. } => *current,
        }
    }

    pub fn pending(&self) -> Option<(WorkRequestStatus, i64)> {
        match self {
            StatusState::Settled(_) => None,
            StatusState::ProposedChange {
                proposed,
                proposer_id,
                ..
            } => Some((*proposed, *proposer_id)),
        }
    }

    pub fn is_closed(&self) -> bool {
        self.current().is_terminal()
    }

    /// True when `user_id` proposed the pending change and must wait for the counterpart.
    pub fn is_awaiting_counterpart_of(&self, user_id: i64) -> bool {
        matches!(self.pending(), Some((_, proposer)) if proposer == user_id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "WorkRequestRecord", into = "WorkRequestRecord")]
pub struct WorkRequest {
    pub id: i64,
    pub owner_id: i64,
    pub title: String,
    pub description: String,
    pub service_type: ServiceType,
    pub city: Option<String>,
    pub category_ids: Vec<i64>,
    pub skill_ids: Vec<i64>,
    pub budget_min: Option<f64>,
    pub budget_max: Option<f64>,
    pub duration: Option<String>,
    pub provider_id: Option<i64>,
    pub state: StatusState,
    pub created_at: Option<DateTime<Utc>>,
}

impl WorkRequest {
    pub fn status(&self) -> WorkRequestStatus {
        self.state.current()
    }

    pub fn is_closed(&self) -> bool {
        self.state.is_closed()
    }

    /// Owner, assigned provider, or nobody.
    pub fn is_party(&self, user_id: i64) -> bool {
        self.owner_id == user_id || self.provider_id == Some(user_id)
    }
}

/// Wire shape of a work request, with the pending proposal spread over two optional fields.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkRequestRecord {
    pub id: i64,
    #[serde(alias = "user_id")]
    pub owner_id: i64,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub service_type: ServiceType,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub category_ids: Vec<i64>,
    #[serde(default)]
    pub skill_ids: Vec<i64>,
    #[serde(default, deserialize_with = "de_opt_amount")]
    pub budget_min: Option<f64>,
    #[serde(default, deserialize_with = "de_opt_amount")]
    pub budget_max: Option<f64>,
    #[serde(default)]
    pub duration: Option<String>,
    #[serde(default)]
    pub provider_id: Option<i64>,
    pub status: WorkRequestStatus,
    #[serde(default)]
    pub pending_status: Option<WorkRequestStatus>,
    #[serde(default)]
    pub pending_status_changed_by: Option<i64>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl TryFrom<WorkRequestRecord> for WorkRequest {
    type Error = String;

    fn try_from(record: WorkRequestRecord) -> Result<Self, Self::Error> {
        let state = match (record.pending_status, record.pending_status_changed_by) {
            (Some(proposed), Some(proposer_id)) if proposed != record.status => {
                StatusState::ProposedChange {
                    current: record.status,
                    proposed,
                    proposer_id,
                }
            }
            (Some(_), None) => {
                return Err(format!(
                    "work request {} has a pending status without a proposer",
                    record.id
                ))
            }
            _ => StatusState::Settled(record.status),
        };

        if let (Some(min), Some(max)) = (record.budget_min, record.budget_max) {
            if max < min {
                return Err(format!(
                    "work request {} has budget_max {} below budget_min {}",
                    record.id, max, min
                ));
            }
        }

        Ok(WorkRequest {
            id: record.id,
            owner_id: record.owner_id,
            title: record.title,
            description: record.description,
            service_type: record.service_type,
            city: record.city.filter(|city| !city.trim().is_empty()),
            category_ids: record.category_ids,
            skill_ids: record.skill_ids,
            budget_min: record.budget_min,
            budget_max: record.budget_max,
            duration: record.duration,
            provider_id: record.provider_id,
            state,
            created_at: record.created_at,
        })
    }
}

impl From<WorkRequest> for WorkRequestRecord {
    fn from(request: WorkRequest) -> Self {
        let (pending_status, pending_status_changed_by) = match request.state.pending() {
            Some((proposed, proposer)) => (Some(proposed), Some(proposer)),
            None => (None, None),
        };

        WorkRequestRecord {
            id: request.id,
            owner_id: request.owner_id,
            title: request.title,
            description: request.description,
            service_type: request.service_type,
            city: request.city,
            category_ids: request.category_ids,
            skill_ids: request.skill_ids,
            budget_min: request.budget_min,
            budget_max: request.budget_max,
            duration: request.duration,
            provider_id: request.provider_id,
            status: request.state.current(),
            pending_status,
            pending_status_changed_by,
            created_at: request.created_at,
        }
    }
}

// Decimal columns come back as strings ("60.00") from some endpoints.
fn de_opt_amount<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Amount {
        Number(f64),
        Text(String),
    }

    match Option::<Amount>::deserialize(deserializer)? {
        None => Ok(None),
        Some(Amount::Number(value)) => Ok(Some(value)),
        Some(Amount::Text(text)) if text.trim().is_empty() => Ok(None),
        Some(Amount::Text(text)) => text
            .trim()
            .parse::<f64>()
            .map(Some)
            .map_err(|_| serde::de::Error::custom(format!("invalid amount: {}", text))),
    }
}
