// ABOUTME: HTTP client for the CardioCheck prediction service
// Covers authentication, user details, risk prediction and nearby hospital lookup

use async_trait::async_trait;
use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};
use url::Url;

use super::types::{
    AuthResponse, Coordinates, EditUserDetailsRequest, Envelope, ErrorBody, Hospital, HospitalsBody, LoginRequest,
    PredictionBody, RegisterRequest, UserDetails, UserDetailsBody,
};
use crate::components::assessment::{NormalizedSubmission, PredictionOutcome, PredictionService, SubmissionError};
use crate::config::AppConfig;

const LOGIN_PATH: &str = "users/user_login/";
const REGISTER_PATH: &str = "users/user_register/";
const USER_DETAILS_PATH: &str = "users/user_details/";
const EDIT_USER_DETAILS_PATH: &str = "users/edit_user_details/";
const PREDICT_PATH: &str = "cardio/predict/";
const HOSPITALS_PATH: &str = "cardio/find_nearby_hospitals/";

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Authentication required: log in first")]
    NotAuthenticated,

    #[error("Request to {path} failed: {source}")]
    Transport {
        path: &'static str,
        #[source]
        source: reqwest::Error,
    },

    /// The service answered with an error status or `success: false`
    #[error("{message}")]
    Server { status: u16, message: String },

    #[error("Unexpected response from {path}: {detail}")]
    Malformed { path: &'static str, detail: String },

    #[error("Invalid endpoint URL: {0}")]
    Url(#[from] url::ParseError),
}

impl ApiError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::NotAuthenticated)
            || matches!(self, Self::Server { status, .. } if *status == StatusCode::UNAUTHORIZED.as_u16())
    }
}

impl From<ApiError> for SubmissionError {
    fn from(err: ApiError) -> Self {
        // A rejected token is a dead session, not a bad submission
        if err.is_unauthorized() {
            return Self::NotAuthenticated;
        }
        match err {
            ApiError::NotAuthenticated => Self::NotAuthenticated,
            ApiError::Transport { source, .. } => Self::Transport(source.to_string()),
            ApiError::Server { status, message } => Self::Rejected {
                status: Some(status),
                message,
            },
            ApiError::Malformed { detail, .. } => Self::MalformedResponse(detail),
            ApiError::Url(e) => Self::Transport(e.to_string()),
        }
    }
}

/// Client for the prediction service. Cheap to clone; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct CardioApiClient {
    client: Client,
    base_url: Url,
    token: Option<String>,
}

impl CardioApiClient {
    pub fn new(config: &AppConfig) -> anyhow::Result<Self> {
        Self::with_base_url(config.api_base_url()?, Duration::from_secs(config.api.timeout_secs))
    }

    pub fn with_base_url(base_url: Url, timeout: Duration) -> anyhow::Result<Self> {
        use anyhow::Context;

        let client = Client::builder()
            .user_agent(concat!("cardiocheck/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url,
            token: None,
        })
    }

    pub fn with_token(mut self, token: Option<String>) -> Self {
        self.token = token;
        self
    }

    pub fn set_token(&mut self, token: Option<String>) {
        self.token = token;
    }

    pub fn has_token(&self) -> bool {
        self.token.is_some()
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Exchange credentials for a session token
    pub async fn login(&self, email: &str, password: &str) -> Result<String, ApiError> {
        let body = LoginRequest {
            email: email.trim().to_string(),
            password: password.to_string(),
        };
        let request = self.client.post(self.endpoint(LOGIN_PATH)?).json(&body);
        let token = self.send_auth(LOGIN_PATH, request).await?;
        info!("Logged in as {}", body.email);
        Ok(token)
    }

    /// Create an account; the service answers with a session token
    pub async fn register(&self, request: &RegisterRequest) -> Result<String, ApiError> {
        let builder = self.client.post(self.endpoint(REGISTER_PATH)?).json(request);
        let token = self.send_auth(REGISTER_PATH, builder).await?;
        info!("Registered account {}", request.email);
        Ok(token)
    }

    pub async fn user_details(&self) -> Result<UserDetails, ApiError> {
        let request = self.authorized(self.client.get(self.endpoint(USER_DETAILS_PATH)?))?;
        let envelope: Envelope<UserDetailsBody> = self.send_envelope(USER_DETAILS_PATH, request).await?;

        envelope.body.user_details.ok_or_else(|| ApiError::Malformed {
            path: USER_DETAILS_PATH,
            detail: "missing user_details".to_string(),
        })
    }

    /// Update profile fields; the service reads them as form data and answers with the updated user
    pub async fn edit_user_details(&self, changes: &EditUserDetailsRequest) -> Result<UserDetails, ApiError> {
        let request = self.authorized(self.client.post(self.endpoint(EDIT_USER_DETAILS_PATH)?).form(changes))?;
        let envelope: Envelope<UserDetailsBody> = self.send_envelope(EDIT_USER_DETAILS_PATH, request).await?;
        info!("Updated user details");
        envelope.body.user_details.ok_or_else(|| ApiError::Malformed {
            path: EDIT_USER_DETAILS_PATH,
            detail: "missing user_details".to_string(),
        })
    }

    /// Submit a normalized assessment and return the service's result message
    pub async fn predict(&self, submission: &NormalizedSubmission) -> Result<String, ApiError> {
        let request = self.authorized(self.client.post(self.endpoint(PREDICT_PATH)?).json(submission))?;
        let envelope: Envelope<PredictionBody> = self.send_envelope(PREDICT_PATH, request).await?;

        envelope.body.prediction.ok_or_else(|| ApiError::Malformed {
            path: PREDICT_PATH,
            detail: "missing prediction".to_string(),
        })
    }

    pub async fn nearby_hospitals(&self, location: Coordinates) -> Result<Vec<Hospital>, ApiError> {
        let request = self.authorized(self.client.post(self.endpoint(HOSPITALS_PATH)?).json(&location))?;
        let envelope: Envelope<HospitalsBody> = self.send_envelope(HOSPITALS_PATH, request).await?;

        debug!("Found {} nearby hospitals", envelope.body.hospitals.len());
        Ok(envelope.body.hospitals)
    }

    fn endpoint(&self, path: &str) -> Result<Url, ApiError> {
        Ok(self.base_url.join(path)?)
    }

    fn authorized(&self, request: RequestBuilder) -> Result<RequestBuilder, ApiError> {
        let token = self.token.as_deref().ok_or(ApiError::NotAuthenticated)?;
        Ok(request.bearer_auth(token))
    }

    /// Send a request and read the raw status and body
    async fn execute(&self, path: &'static str, request: RequestBuilder) -> Result<(StatusCode, String), ApiError> {
        debug!("Sending request to {}", path);

        let response = request
            .send()
            .await
            .map_err(|source| ApiError::Transport { path, source })?;
        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|source| ApiError::Transport { path, source })?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorBody>(&text)
                .ok()
                .map(|body| body.message)
                .filter(|message| !message.is_empty())
                .unwrap_or_else(|| format!("Service returned {}", status));
            warn!("{} returned {}: {}", path, status, message);
            return Err(ApiError::Server {
                status: status.as_u16(),
                message,
            });
        }

        Ok((status, text))
    }

    async fn send_envelope<T: DeserializeOwned>(
        &self,
        path: &'static str,
        request: RequestBuilder,
    ) -> Result<Envelope<T>, ApiError> {
        let (status, text) = self.execute(path, request).await?;

        let envelope: Envelope<T> = serde_json::from_str(&text).map_err(|e| ApiError::Malformed {
            path,
            detail: e.to_string(),
        })?;

        if !envelope.success {
            return Err(ApiError::Server {
                status: status.as_u16(),
                message: envelope.message,
            });
        }
        Ok(envelope)
    }

    async fn send_auth(&self, path: &'static str, request: RequestBuilder) -> Result<String, ApiError> {
        let (status, text) = self.execute(path, request).await?;

        let response: AuthResponse = serde_json::from_str(&text).map_err(|e| ApiError::Malformed {
            path,
            detail: e.to_string(),
        })?;

        if !response.is_success() {
            return Err(ApiError::Server {
                status: status.as_u16(),
                message: response.message,
            });
        }

        response.token.ok_or_else(|| ApiError::Malformed {
            path,
            detail: "missing token".to_string(),
        })
    }
}

#[async_trait]
impl PredictionService for CardioApiClient {
    async fn predict(&self, submission: &NormalizedSubmission) -> Result<PredictionOutcome, SubmissionError> {
        let message = CardioApiClient::predict(self, submission).await?;
        Ok(PredictionOutcome::new(message))
    }
}
