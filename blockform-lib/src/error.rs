use thiserror::Error;

/// Errors surfaced by block decoration, form building and submission.
#[derive(Debug, Error)]
pub enum FormError {
    #[error("request to {url} failed: {message}")]
    Fetch { url: String, message: String },

    #[error("{url} answered with status {status}")]
    Status { url: String, status: u16 },

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid URL {0}")]
    InvalidUrl(String),

    #[error("PDF generation failed: {0}")]
    Pdf(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("block markup is missing {0}")]
    MissingBlockContent(&'static str),
}

pub type Result<T> = std::result::Result<T, FormError>;
