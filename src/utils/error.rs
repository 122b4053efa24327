//! Shared API error type
//!
//! `ApiError` is the single error type returned from handlers and from the
//! pipeline stages they call. It carries one of the error kinds from the
//! pipeline's error taxonomy and maps each kind onto an HTTP status when
//! converted into a response.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

pub type ApiResult<T> = Result<T, ApiError>;

/// Error kind taxonomy for the retrieval pipeline.
///
/// Kinds are not exception types mapped 1:1 onto Rust's `std::error::Error`
/// hierarchy; they are the small, closed set of outcomes a caller needs to
/// branch on (retry, surface to the user, or ask a clarifying question).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Upstream (corpus API or LLM API) failed in a way that may succeed on retry.
    Transient,
    /// The requested resource does not exist in the corpus.
    NotFound,
    /// The caller's input failed validation before any upstream call was made.
    BadInput,
    /// The LLM returned a response that could not be parsed into the expected shape.
    LlmMalformed,
    /// The LLM proposed a reference that failed corpus validation.
    Hallucinated,
    /// The query is ambiguous; the caller must resolve it via the clarification flow.
    ClarificationRequired,
    /// Anything else - a bug, a missing file, a poisoned lock.
    Internal,
}

#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct ApiError {
    pub kind: ErrorKind,
    pub message: String,
}

impl ApiError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self { kind, message: message.into() }
    }

    pub fn transient(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Transient, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    pub fn bad_input(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::BadInput, message)
    }

    pub fn llm_malformed(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::LlmMalformed, message)
    }

    pub fn hallucinated(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Hallucinated, message)
    }

    pub fn clarification_required(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ClarificationRequired, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Internal, message)
    }

    fn status_code(&self) -> StatusCode {
        match self.kind {
            ErrorKind::Transient => StatusCode::BAD_GATEWAY,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::BadInput => StatusCode::BAD_REQUEST,
            ErrorKind::LlmMalformed => StatusCode::BAD_GATEWAY,
            ErrorKind::Hallucinated => StatusCode::INTERNAL_SERVER_ERROR,
            ErrorKind::ClarificationRequired => StatusCode::OK,
            ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    kind: &'static str,
}

impl ErrorKind {
    fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::Transient => "transient",
            ErrorKind::NotFound => "not_found",
            ErrorKind::BadInput => "bad_input",
            ErrorKind::LlmMalformed => "llm_malformed",
            ErrorKind::Hallucinated => "hallucinated",
            ErrorKind::ClarificationRequired => "clarification_required",
            ErrorKind::Internal => "internal",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.kind != ErrorKind::Internal && self.kind != ErrorKind::Hallucinated {
            tracing::warn!(kind = self.kind.as_str(), "{}", self.message);
        } else {
            tracing::error!(kind = self.kind.as_str(), "{}", self.message);
        }
        let status = self.status_code();
        let body = ErrorBody { error: self.message, kind: self.kind.as_str() };
        (status, Json(body)).into_response()
    }
}

impl From<std::io::Error> for ApiError {
    fn from(e: std::io::Error) -> Self {
        ApiError::internal(format!("io error: {e}"))
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(e: serde_json::Error) -> Self {
        ApiError::internal(format!("serialization error: {e}"))
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() || e.is_connect() {
            ApiError::transient(format!("upstream request failed: {e}"))
        } else {
            ApiError::internal(format!("upstream request failed: {e}"))
        }
    }
}
