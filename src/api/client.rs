// api/client.rs
use std::sync::Arc;
use std::time::Duration;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION, CONTENT_TYPE};
use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;

use crate::error::ClientError;
use crate::session::SessionStore;

pub enum RequestBody {
    Empty,
    Json(serde_json::Value),
    Multipart(reqwest::multipart::Form),
}

pub struct RequestOptions {
    pub method: Method,
    pub body: RequestBody,
    pub query: Vec<(String, String)>,
}

impl RequestOptions {
    pub fn new(method: Method) -> Self {
        Self {
            method,
            body: RequestBody::Empty,
            query: Vec::new(),
        }
    }

    pub fn get() -> Self {
        Self::new(Method::GET)
    }

    pub fn post() -> Self {
        Self::new(Method::POST)
    }

    pub fn put() -> Self {
        Self::new(Method::PUT)
    }

    pub fn json(mut self, body: serde_json::Value) -> Self {
        self.body = RequestBody::Json(body);
        self
    }

    pub fn multipart(mut self, form: reqwest::multipart::Form) -> Self {
        self.body = RequestBody::Multipart(form);
        self
    }

    pub fn query(mut self, key: &str, value: impl ToString) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }
}

/// Status and body of a response, uninterpreted.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: StatusCode,
    pub body: Vec<u8>,
}

impl RawResponse {
    pub fn ok(&self) -> bool {
        self.status.is_success()
    }

    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// The `message` field of a JSON body, if there is one.
    pub fn message(&self) -> Option<String> {
        let value: serde_json::Value = serde_json::from_slice(&self.body).ok()?;
        value
            .get("message")
            .and_then(|m| m.as_str())
            .map(str::to_string)
    }

    pub fn server_error(&self) -> ClientError {
        let message = self.message().unwrap_or_else(|| {
            self.status
                .canonical_reason()
                .unwrap_or("Request failed")
                .to_string()
        });
        ClientError::Server {
            status: self.status.as_u16(),
            message,
        }
    }

    /// Non-2xx becomes a server error carrying the body's message.
    pub fn expect_ok(&self) -> Result<(), ClientError> {
        if self.ok() {
            Ok(())
        } else {
            Err(self.server_error())
        }
    }

    /// Decodes the body as `T`, accepting it bare or wrapped under `data`
    /// or one of `keys`.
    pub fn decode<T: DeserializeOwned>(&self, keys: &[&str]) -> Result<T, ClientError> {
        self.expect_ok()?;
        let value: serde_json::Value = serde_json::from_slice(&self.body)?;
        unwrap_payload(value, keys)
    }
}

pub fn unwrap_payload<T: DeserializeOwned>(
    value: serde_json::Value,
    keys: &[&str],
) -> Result<T, ClientError> {
    let direct_err = match serde_json::from_value::<T>(value.clone()) {
        Ok(decoded) => return Ok(decoded),
        Err(e) => e,
    };

    if let serde_json::Value::Object(map) = &value {
        let mut candidates = vec!["data"];
        candidates.extend_from_slice(keys);
        for key in candidates {
            if let Some(inner) = map.get(key) {
                if let Ok(decoded) = serde_json::from_value::<T>(inner.clone()) {
                    return Ok(decoded);
                }
                if let Some(nested) = inner.get("data") {
                    if let Ok(decoded) = serde_json::from_value::<T>(nested.clone()) {
                        return Ok(decoded);
                    }
                }
            }
        }
    }

    Err(ClientError::MalformedResponse(direct_err.to_string()))
}

/// Authenticated HTTP accessor. Interpreting responses is left to callers.
#[derive(Clone)]
pub struct ResourceClient {
    http: reqwest::Client,
    base_url: String,
    session: Arc<SessionStore>,
}

impl std::fmt::Debug for ResourceClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResourceClient")
            .field("base_url", &self.base_url)
            .field("signed_in", &self.session.current().is_some())
            .finish()
    }
}

impl ResourceClient {
    pub fn new(
        base_url: &str,
        timeout: Duration,
        session: Arc<SessionStore>,
    ) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
            session,
        })
    }

    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn headers(&self, body: &RequestBody) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        // reqwest sets the multipart boundary itself
        if !matches!(body, RequestBody::Multipart(_)) {
            headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        }
        if let Some(token) = self.session.token() {
            match HeaderValue::from_str(&format!("Bearer {}", token)) {
                Ok(value) => {
                    headers.insert(AUTHORIZATION, value);
                }
                Err(_) => tracing::warn!(
                    "Session token is not a valid header value, sending unauthenticated"
                ),
            }
        }
        headers
    }

    /// Sends one request. Only transport failures are errors here.
    pub async fn request(
        &self,
        path: &str,
        options: RequestOptions,
    ) -> Result<RawResponse, ClientError> {
        let url = format!("{}/{}", self.base_url, path.trim_start_matches('/'));
        let headers = self.headers(&options.body);
        let method = options.method.clone();

        let mut builder = self.http.request(options.method, &url).headers(headers);
        if !options.query.is_empty() {
            builder = builder.query(&options.query);
        }
        builder = match options.body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder.body(value.to_string()),
            RequestBody::Multipart(form) => builder.multipart(form),
        };

        let response = builder.send().await.map_err(|e| {
            tracing::warn!("{} {} failed: {}", method, path, e);
            ClientError::Transport(e)
        })?;

        let status = response.status();
        let body = response.bytes().await?.to_vec();
        tracing::debug!("{} {} -> {}", method, path, status);

        Ok(RawResponse { status, body })
    }
}
