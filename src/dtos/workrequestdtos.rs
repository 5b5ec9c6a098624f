// dtos/workrequestdtos.rs
use serde::{Deserialize, Serialize};
use thiserror::Error;
use validator::Validate;

use crate::dtos::userdtos::is_valid_phone;
use crate::models::workrequestmodel::{ServiceType, WorkRequestStatus, MIN_BUDGET};

/// Local checks on the add-work form, in the order they are reported.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RequestValidationError {
    #[error("select at least one category")]
    MissingCategory,

    #[error("city is required for local services")]
    MissingCity,

    #[error("phone number is required for local services")]
    MissingPhone,

    #[error("phone number format is invalid")]
    InvalidPhone,

    #[error("budget must be at least {0}")]
    BudgetBelowMinimum(f64),

    #[error("max cannot be less than min")]
    BudgetOrder,
}

impl RequestValidationError {
    pub fn i18n_key(&self) -> &'static str {
        match self {
            RequestValidationError::MissingCategory => "work_request.category_required",
            RequestValidationError::MissingCity => "work_request.city_required",
            RequestValidationError::MissingPhone => "work_request.phone_required",
            RequestValidationError::InvalidPhone => "work_request.phone_invalid",
            RequestValidationError::BudgetBelowMinimum(_) => "work_request.budget_minimum",
            RequestValidationError::BudgetOrder => "work_request.budget_order",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateWorkRequestDto {
    #[validate(length(min = 1, max = 255, message = "Title must be between 1 and 255 characters"))]
    pub title: String,

    #[validate(length(max = 5000, message = "Description must be at most 5000 characters"))]
    pub description: String,

    pub service_type: ServiceType,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,

    pub categories: Vec<String>,

    #[serde(default)]
    pub skills: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub budget_min: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub budget_max: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

impl Default for CreateWorkRequestDto {
    fn default() -> Self {
        Self {
            title: String::new(),
            description: String::new(),
            service_type: ServiceType::Local,
            city: None,
            categories: Vec::new(),
            skills: Vec::new(),
            budget_min: None,
            budget_max: None,
            duration: None,
            phone: None,
        }
    }
}

fn filled(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

impl CreateWorkRequestDto {
    /// Marketplace rules checked before anything is sent.
    /// `stored_phone` is the phone already on the caller's profile, if any.
    pub fn check_rules(&self, stored_phone: Option<&str>) -> Result<(), RequestValidationError> {
        if self.categories.iter().all(|c| c.trim().is_empty()) {
            return Err(RequestValidationError::MissingCategory);
        }

        if self.service_type == ServiceType::Local {
            if filled(&self.city).is_none() {
                return Err(RequestValidationError::MissingCity);
            }

            if stored_phone.is_none() {
                let phone = filled(&self.phone).ok_or(RequestValidationError::MissingPhone)?;
                if !is_valid_phone(phone) {
                    return Err(RequestValidationError::InvalidPhone);
                }
            }
        }

        for amount in [self.budget_min, self.budget_max].into_iter().flatten() {
            if !amount.is_finite() || amount < MIN_BUDGET {
                return Err(RequestValidationError::BudgetBelowMinimum(MIN_BUDGET));
            }
        }

        if let (Some(min), Some(max)) = (self.budget_min, self.budget_max) {
            if max < min {
                return Err(RequestValidationError::BudgetOrder);
            }
        }

        Ok(())
    }

    /// Copy with fields that do not apply to the service type dropped.
    pub fn normalized(&self, stored_phone: Option<&str>) -> CreateWorkRequestDto {
        let mut dto = self.clone();
        dto.categories.retain(|c| !c.trim().is_empty());
        dto.city = filled(&self.city).map(str::to_string);
        if dto.service_type != ServiceType::Local {
            dto.city = None;
            dto.phone = None;
        } else if stored_phone.is_some() {
            dto.phone = None;
        } else {
            dto.phone = filled(&self.phone).map(str::to_string);
        }
        dto
    }

    /// Flat text fields for a multipart body.
    pub fn form_fields(&self) -> Vec<(String, String)> {
        let mut fields = vec![
            ("title".to_string(), self.title.clone()),
            ("description".to_string(), self.description.clone()),
            ("service_type".to_string(), self.service_type.to_str().to_string()),
        ];

        let optional = [
            ("city", self.city.clone()),
            ("budget_min", self.budget_min.map(|v| v.to_string())),
            ("budget_max", self.budget_max.map(|v| v.to_string())),
            ("duration", self.duration.clone()),
            ("phone", self.phone.clone()),
        ];
        for (name, value) in optional {
            if let Some(value) = value {
                fields.push((name.to_string(), value));
            }
        }

        for category in &self.categories {
            fields.push(("categories[]".to_string(), category.clone()));
        }
        for skill in &self.skills {
            fields.push(("skills[]".to_string(), skill.clone()));
        }

        fields
    }
}

#[derive(Debug, Clone)]
pub struct Attachment {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UpdateStatusDto {
    pub status: WorkRequestStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub confirm: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reject: Option<bool>,
}

impl UpdateStatusDto {
    pub fn propose(status: WorkRequestStatus) -> Self {
        Self {
            status,
            confirm: None,
            reject: None,
        }
    }

    pub fn confirm(status: WorkRequestStatus) -> Self {
        Self {
            status,
            confirm: Some(true),
            reject: None,
        }
    }

    pub fn reject(status: WorkRequestStatus) -> Self {
        Self {
            status,
            confirm: None,
            reject: Some(true),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssignProviderDto {
    pub provider_id: i64,
}
