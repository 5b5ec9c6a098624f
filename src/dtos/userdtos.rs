// dtos/userdtos.rs
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::usermodel::{User, UserRole};

// Dial code plus local number, digits only once separators are stripped.
static PHONE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\+?[1-9][0-9]{7,14}$").expect("Invalid phone regex"));

fn strip_separators(phone: &str) -> String {
    phone
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '(' | ')' | '.'))
        .collect()
}

pub fn is_valid_phone(phone: &str) -> bool {
    PHONE_PATTERN.is_match(&strip_separators(phone))
}

/// Joins a dial code ("+966") and a local number ("050 123 4567") into one
/// international number, dropping the local trunk zero.
pub fn compose_phone(dial_code: &str, local_number: &str) -> String {
    let dial = strip_separators(dial_code);
    let dial = dial.trim_start_matches('+');
    let local = strip_separators(local_number);
    let local = local.trim_start_matches('0');
    format!("+{}{}", dial, local)
}

#[derive(Validate, Debug, Default, Clone, Serialize, Deserialize)]
pub struct LoginUserDto {
    #[validate(length(min = 1, message = "Email is required"), email(message = "Email is invalid"))]
    pub email: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

#[derive(Validate, Debug, Clone, Serialize, Deserialize)]
pub struct RegisterUserDto {
    #[validate(length(min = 1, message = "Name is required"))]
    pub name: String,

    #[validate(
        length(min = 1, message = "Email is required"),
        email(message = "Email is invalid")
    )]
    pub email: String,

    #[validate(
        length(min = 1, message = "Password is required"),
        length(min = 8, message = "Password must be at least 8 characters")
    )]
    pub password: String,

    #[validate(must_match(other = "password", message = "passwords do not match"))]
    pub password_confirmation: String,

    pub role: UserRole,

    #[serde(skip)]
    pub dial_code: String,

    #[validate(length(min = 4, max = 20, message = "Phone number must be between 4-20 characters"))]
    #[serde(skip)]
    pub local_phone: String,
}

/// Body actually sent to POST /register.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterPayload {
    pub name: String,
    pub email: String,
    pub password: String,
    pub password_confirmation: String,
    pub role: UserRole,
    pub phone: String,
}

impl RegisterUserDto {
    pub fn phone(&self) -> String {
        compose_phone(&self.dial_code, &self.local_phone)
    }

    pub fn into_payload(self) -> RegisterPayload {
        let phone = self.phone();
        RegisterPayload {
            name: self.name,
            email: self.email,
            password: self.password,
            password_confirmation: self.password_confirmation,
            role: self.role,
            phone,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponseDto {
    pub user: User,
    #[serde(alias = "access_token")]
    pub token: String,
}
