use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// Credential or identity resolution failure. Deliberately covers both
    /// "no such channel" and "wrong secret" so callers cannot enumerate
    /// which channels exist.
    #[error("user not found or wrong key")]
    UserNotFound,

    #[error("already exists: {0}")]
    Conflict(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("login state mismatch")]
    StateMismatch,

    #[error("missing authorization code")]
    MissingCode,

    #[error("not configured: {0}")]
    Configuration(String),

    #[error("upstream failure: {0}")]
    Upstream(String),

    #[error("sealing error: {0}")]
    Sealing(String),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("database error: {0}")]
    Database(sqlx::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<sqlx::Error> for Error {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            // Map "no rows" to NotFound so callers never see the store sentinel
            sqlx::Error::RowNotFound => Self::NotFound("no matching row".to_string()),
            sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
                Self::Conflict("resource already exists".to_string())
            }
            _ => Self::Database(err),
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
