//! Error type shared by the command handlers, the record store and the TUI.
//!
//! The curve calculator itself never fails; everything here comes from the
//! edges of the tool (files, settings, user input).

use thiserror::Error;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("no tasks found for project '{project}'")]
    ProjectNotFound { project: String },

    #[error("could not parse date '{input}' (expected YYYY-MM-DD)")]
    InvalidDate { input: String },

    #[error("configuration error: {message}")]
    Config { message: String },

    #[error("terminal error: {0}")]
    Terminal(String),
}

impl AppError {
    pub fn config(message: impl Into<String>) -> Self {
        AppError::Config {
            message: message.into(),
        }
    }
}
