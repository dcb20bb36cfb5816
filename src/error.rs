use crate::db::StoreError;
use crate::domain::pm_summary::SummaryError;
use crate::domain::work_order::TransitionError;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

#[derive(Debug, thiserror::Error)]
pub enum PortalError {
    #[error("invalid email or password")]
    BadCredentials,
    #[error("not signed in")]
    Unauthorized,
    #[error("you do not have permission to do that")]
    Forbidden,
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("{0}")]
    Validation(String),
    #[error("{0}")]
    Conflict(String),
    #[error("too many attempts, try again later")]
    RateLimited,
    #[error("backend request failed")]
    Store(anyhow::Error),
}

pub type PortalResult<T> = Result<T, PortalError>;

impl From<anyhow::Error> for PortalError {
    fn from(err: anyhow::Error) -> Self {
        match err.downcast_ref::<StoreError>() {
            Some(StoreError::Duplicate(what)) => {
                PortalError::Conflict(format!("{} already exists", what))
            }
            None => PortalError::Store(err),
        }
    }
}

impl From<TransitionError> for PortalError {
    fn from(err: TransitionError) -> Self {
        match err {
            TransitionError::Forbidden => PortalError::Forbidden,
            other => PortalError::Conflict(other.to_string()),
        }
    }
}

impl From<SummaryError> for PortalError {
    fn from(err: SummaryError) -> Self {
        PortalError::Validation(err.to_string())
    }
}

impl PortalError {
    pub fn status(&self) -> StatusCode {
        match self {
            PortalError::BadCredentials | PortalError::Unauthorized => StatusCode::UNAUTHORIZED,
            PortalError::Forbidden => StatusCode::FORBIDDEN,
            PortalError::NotFound(_) => StatusCode::NOT_FOUND,
            PortalError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            PortalError::Conflict(_) => StatusCode::CONFLICT,
            PortalError::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            PortalError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for PortalError {
    fn into_response(self) -> Response {
        match &self {
            PortalError::Store(e) => tracing::error!("Store request failed: {:#}", e),
            other => tracing::warn!("Request rejected: {}", other),
        }
        (self.status(), Json(json!({ "error": self.to_string() }))).into_response()
    }
}
