//! Error types for the Marketo REST client

use marketo_api_contract::{ApiContractError, ApiError};
use reqwest::StatusCode;
use thiserror::Error;

/// Errors that can occur when using the Marketo client
#[derive(Debug, Error)]
pub enum MarketoError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("URL parsing error: {0}")]
    Url(#[from] url::ParseError),

    #[error("Marketo authentication failed: {detail}")]
    Auth { detail: String },

    #[error("Marketo {operation} API failed with status {status}: {errors:?}")]
    Api {
        operation: &'static str,
        status: StatusCode,
        errors: Vec<ApiError>,
    },

    #[error(transparent)]
    Contract(#[from] ApiContractError),

    #[error("invalid request: {0}")]
    Invalid(#[from] validator::ValidationErrors),

    #[error("no lead found for email {email}")]
    LeadNotFound { email: String },

    #[error("campaign {name:?} is not configured")]
    UnknownCampaign { name: String },
}

impl MarketoError {
    pub(crate) fn auth(err: impl std::fmt::Display) -> Self {
        Self::Auth {
            detail: err.to_string(),
        }
    }
}

/// Result type alias for Marketo client operations
pub type MarketoResult<T> = Result<T, MarketoError>;
