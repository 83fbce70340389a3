use thiserror::Error;

use crate::api::ApiError;

#[derive(Debug, Clone, Error)]
pub enum AppError {
    /// Non-200 status or transport failure. Displayed as-is to the user.
    #[error("{0}")]
    Transfer(String),

    #[error("I/O error: {0}")]
    Io(String),
}

impl AppError {
    /// Text for the user-facing dialog, falling back when the error carries none.
    pub fn user_message(&self) -> String {
        let message = self.to_string();
        if message.trim().is_empty() {
            "Failed to download".to_string()
        } else {
            message
        }
    }
}

impl From<ApiError> for AppError {
    fn from(err: ApiError) -> Self {
        AppError::Transfer(err.to_string())
    }
}
