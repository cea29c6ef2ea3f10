//! Error handling

use axum::Json;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;
use tracing::{error, info};

use crate::compositor::CompositeError;

/// Error definitions for the campaign application.
#[derive(Debug)]
pub enum CampaignError {
    /// When you didn't do the right thing
    BadRequest(String),
    /// A required brief field is absent
    MissingField(String),
    /// When a requested resource is not found
    NotFound(String),
    /// No base image could be found or generated
    Generation(String),
    /// When an internal server error occurs
    InternalServerError(String),
}

impl std::fmt::Display for CampaignError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BadRequest(message) => write!(f, "{message}"),
            Self::MissingField(field) => write!(f, "Missing required field: {field}"),
            Self::NotFound(what) => write!(f, "{what}"),
            Self::Generation(message) => write!(f, "{message}"),
            Self::InternalServerError(message) => write!(f, "{message}"),
        }
    }
}

impl std::error::Error for CampaignError {}

impl From<std::io::Error> for CampaignError {
    fn from(err: std::io::Error) -> Self {
        CampaignError::InternalServerError(err.to_string())
    }
}

impl From<serde_json::Error> for CampaignError {
    fn from(err: serde_json::Error) -> Self {
        CampaignError::InternalServerError(err.to_string())
    }
}

impl From<reqwest::Error> for CampaignError {
    fn from(err: reqwest::Error) -> Self {
        CampaignError::Generation(err.to_string())
    }
}

impl From<CompositeError> for CampaignError {
    fn from(err: CompositeError) -> Self {
        CampaignError::InternalServerError(err.to_string())
    }
}

impl From<tokio::task::JoinError> for CampaignError {
    fn from(err: tokio::task::JoinError) -> Self {
        CampaignError::InternalServerError(err.to_string())
    }
}

impl IntoResponse for CampaignError {
    fn into_response(self) -> axum::response::Response {
        let status = match &self {
            CampaignError::BadRequest(message) => {
                info!("Bad request received: {}", message);
                StatusCode::BAD_REQUEST
            }
            CampaignError::MissingField(field) => {
                info!("Brief is missing {}", field);
                StatusCode::BAD_REQUEST
            }
            CampaignError::NotFound(what) => {
                info!("404 {what}");
                StatusCode::NOT_FOUND
            }
            CampaignError::Generation(message) => {
                error!("Image generation error: {}", message);
                StatusCode::INTERNAL_SERVER_ERROR
            }
            CampaignError::InternalServerError(message) => {
                error!("Internal server error: {}", message);
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        (status, Json(json!({ "error": self.to_string() }))).into_response()
    }
}
