use thiserror::Error;

/// Failures while loading a report template
#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("Template '{name}' not found at {path}")]
    NotFound { name: String, path: String },

    #[error("Failed to parse template '{name}': {reason}")]
    Malformed { name: String, reason: String },
}

/// Failures while decoding uploaded CSV or JSON content
///
/// Only `ingest` surfaces these. Every later stage recovers locally.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("Failed to parse CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error("Failed to parse JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("No columns to parse from input")]
    Empty,

    #[error("Expected {expected} fields in line {line}, saw {found}")]
    RaggedRow {
        line: usize,
        expected: usize,
        found: usize,
    },
}

/// Failures from the external generation provider
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("{provider} not configured: {reason}")]
    Unconfigured {
        provider: &'static str,
        reason: String,
    },

    #[error("Preview only: no API calls")]
    PreviewOnly,

    #[error("{provider} HTTP error {status}: {body}")]
    Http {
        provider: &'static str,
        status: u16,
        body: String,
    },

    #[error("Unexpected response from {provider}: {reason}")]
    Malformed {
        provider: &'static str,
        reason: String,
    },

    #[error("Failed to send request to {provider}: {reason}")]
    Transport {
        provider: &'static str,
        reason: String,
    },
}
