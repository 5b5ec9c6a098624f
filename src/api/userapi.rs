// api/userapi.rs
use async_trait::async_trait;
use serde_json::json;

use super::client::{RequestOptions, ResourceClient};
use crate::{
    dtos::userdtos::{AuthResponseDto, LoginUserDto, RegisterPayload},
    error::ClientError,
    models::usermodel::Profile,
};

#[async_trait]
pub trait UserExt {
    async fn login(&self, dto: &LoginUserDto) -> Result<AuthResponseDto, ClientError>;

    async fn register(&self, payload: &RegisterPayload) -> Result<AuthResponseDto, ClientError>;

    async fn logout(&self) -> Result<(), ClientError>;

    async fn get_current_user(&self) -> Result<Profile, ClientError>;
}

#[async_trait]
impl UserExt for ResourceClient {
    async fn login(&self, dto: &LoginUserDto) -> Result<AuthResponseDto, ClientError> {
        let body = json!({ "email": dto.email, "password": dto.password });
        self.request("/login", RequestOptions::post().json(body))
            .await?
            .decode(&[])
    }

    async fn register(&self, payload: &RegisterPayload) -> Result<AuthResponseDto, ClientError> {
        let body = serde_json::to_value(payload)?;
        self.request("/register", RequestOptions::post().json(body))
            .await?
            .decode(&[])
    }

    async fn logout(&self) -> Result<(), ClientError> {
        self.request("/logout", RequestOptions::post())
            .await?
            .expect_ok()
    }

    async fn get_current_user(&self) -> Result<Profile, ClientError> {
        self.request("/user/current", RequestOptions::get())
            .await?
            .decode(&["user", "profile"])
    }
}
