pub mod client;
pub mod query;

use thiserror::Error;

use crate::schema::SchemaViolation;

pub use client::OpenAlexClient;
pub use query::SearchParams;

/// Every way an OpenAlex operation can fail.
///
/// Only [`OpenAlexError::Http`] carries a status code, so callers can branch
/// on [`OpenAlexError::status_code`] or [`OpenAlexError::kind`] without
/// looking at message text.
#[derive(Debug, Error)]
pub enum OpenAlexError {
    #[error("invalid input: {0}")]
    InvalidInput(#[source] SchemaViolation),
    #[error("request to OpenAlex failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("OpenAlex API error: HTTP {status}: {body}")]
    Http { status: u16, body: String },
    #[error("OpenAlex response is not valid JSON: {0}")]
    Decode(#[from] serde_json::Error),
    #[error("OpenAlex response failed validation: {0}")]
    ResponseSchema(#[source] SchemaViolation),
    #[error("failed to build HTTP client: {0}")]
    ClientSetup(#[source] reqwest::Error),
    #[error("invalid base URL {url:?}: {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}

impl OpenAlexError {
    pub fn status_code(&self) -> Option<u16> {
        match self {
            OpenAlexError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Stable tag for the failure class.
    pub fn kind(&self) -> &'static str {
        match self {
            OpenAlexError::InvalidInput(_) => "input_validation",
            OpenAlexError::Transport(_) => "transport",
            OpenAlexError::Http { .. } => "http",
            OpenAlexError::Decode(_) => "decode",
            OpenAlexError::ResponseSchema(_) => "response_schema",
            OpenAlexError::ClientSetup(_) | OpenAlexError::InvalidBaseUrl { .. } => {
                "configuration"
            }
        }
    }

    /// Schema violation behind an input or response failure.
    pub fn violation(&self) -> Option<&SchemaViolation> {
        match self {
            OpenAlexError::InvalidInput(v) | OpenAlexError::ResponseSchema(v) => Some(v),
            _ => None,
        }
    }
}
