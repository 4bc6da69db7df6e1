use std::io;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("invalid input: {0}")]
    Validation(String),
    #[error("not permitted: {0}")]
    Forbidden(String),
    #[error("session expired or not authorized; log in again with `helpdesk session login`")]
    Unauthorized,
    #[error("ticket service responded with {status}: {message}")]
    Service { status: u16, message: String },
    #[error("could not reach ticket service: {0}")]
    Network(String),
    /// Already shown to the user as an error notice.
    #[error("request failed")]
    Reported,
    #[error("cache error: {0}")]
    Cache(String),
    #[error(transparent)]
    Io(#[from] io::Error),
}

impl AppError {
    /// Text shown in an error notice for this failure.
    pub fn notice_text(&self) -> String {
        match self {
            AppError::Service { message, .. } if message.trim().is_empty() => {
                "Failed to update the ticket".to_string()
            }
            AppError::Service { message, .. } => message.clone(),
            other => other.to_string(),
        }
    }
}

pub type AppResult<T> = Result<T, AppError>;
