use thiserror::Error;

#[derive(Error, Debug)]
pub enum SpeakBookError {
    #[error("{0}")]
    Validation(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Email: {0} has been taken")]
    DuplicateEmail(String),

    #[error("Upload failed: {0}")]
    UploadFailed(String),

    #[error("Unsupported media type: {0}")]
    UnsupportedMediaType(String),

    #[error("{0}")]
    PayloadTooLarge(String),

    #[error("Database error: {0}")]
    Database(String),
}

impl From<sqlx::Error> for SpeakBookError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => Self::NotFound("record not found".to_string()),
            other => Self::Database(other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, SpeakBookError>;
