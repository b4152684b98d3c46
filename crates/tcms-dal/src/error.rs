pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Database error: {0}")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    MigrationError(#[from] sqlx::migrate::MigrateError),

    #[error("User password error: {0}")]
    UserPasswordError(#[from] argon2::password_hash::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Record not found: {0}")]
    RecordNotFound(String),

    #[error("Conflicting record: {0}")]
    Conflict(String),

    #[error("Invalid order by field: {0}")]
    InvalidOrderByField(String),

    #[error("Invalid credentials")]
    InvalidCredentials,
}

impl Error {
    /// Maps unique constraint violations to [`Error::Conflict`], missing rows to [`Error::RecordNotFound`]
    pub(crate) fn from_write(e: sqlx::Error, entity: &str) -> Self {
        match e {
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                Error::Conflict(format!("{entity}: {}", db.message()))
            }
            sqlx::Error::RowNotFound => Error::RecordNotFound(entity.to_string()),
            e => Error::DatabaseError(e),
        }
    }

    pub(crate) fn from_read(e: sqlx::Error, entity: &str) -> Self {
        match e {
            sqlx::Error::RowNotFound => Error::RecordNotFound(entity.to_string()),
            e => Error::DatabaseError(e),
        }
    }
}
