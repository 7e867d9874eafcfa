use thiserror::Error;

#[derive(Error, Debug)]
pub enum CollectError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("upstream returned HTTP {status}: {body}")]
    Transport { status: u16, body: String },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, CollectError>;
