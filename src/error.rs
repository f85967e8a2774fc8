use thiserror::Error;

/// Result alias used across the bot.
pub type Result<T> = std::result::Result<T, AppError>;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("telegram error: {0}")]
    Telegram(#[from] teloxide::RequestError),

    #[error("{0}")]
    InvalidInput(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    InvalidTransition(String),

    #[error("{0} not found")]
    NotFound(String),
}

impl AppError {
    /// Short line shown to the user when a handler fails.
    ///
    /// Validation, authorization and transition failures carry their own
    /// wording; store errors are passed through; anything else collapses to a
    /// generic notice. Nothing here is retried. The dialog stays live and
    /// the user may try again.
    pub fn user_message(&self) -> String {
        match self {
            AppError::InvalidInput(m)
            | AppError::Forbidden(m)
            | AppError::InvalidTransition(m) => m.clone(),
            AppError::NotFound(what) => format!("{what} not found."),
            AppError::Database(e) => format!("Database error: {e}"),
            AppError::Telegram(_) => "Something went wrong. Please try again.".to_string(),
        }
    }
}
