//! Error types for rdbmap

use thiserror::Error;

/// Result type alias for rdbmap operations
pub type OrmResult<T> = Result<T, OrmError>;

/// Error types for mapping, write generation and execution
#[derive(Debug, Error)]
pub enum OrmError {
    /// A table (or other named entity) was registered twice
    #[error("Duplicate entity: {0}")]
    DuplicateEntity(String),

    /// A lookup that must succeed found nothing
    #[error("Not found: {0}")]
    NotFound(String),

    /// A `Table.Column` reference could not be parsed
    #[error("Invalid qualified column name: '{0}'")]
    InvalidQualifiedName(String),

    /// A relationship names a foreign key column the child object does not carry
    #[error("Invalid foreign key column: {0}")]
    InvalidForeignKeyColumn(String),

    /// A relationship change and a direct edit of its foreign key columns were
    /// found in the same change log
    #[error("Foreign key properties should not be set when the corresponding relationship has changed")]
    ForeignKeyConflict { relationship: String },

    /// The relationship graph contains a cycle, so no safe insert order exists
    #[error("Dependency cycle detected between tables: {}", tables.join(", "))]
    CycleDetected { tables: Vec<String> },

    /// UPDATE/DELETE generation needs at least one primary key column
    #[error("Table '{0}' has no primary key column")]
    MissingPrimaryKey(String),

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// A converter rejected a value
    #[error("Conversion error in '{converter}': {message}")]
    Conversion { converter: String, message: String },

    /// Database connection error
    #[error("Connection error: {0}")]
    Connection(String),

    /// Query execution error
    #[error("Query error: {0}")]
    Query(#[from] tokio_postgres::Error),

    /// Pool error
    #[cfg(feature = "pool")]
    #[error("Pool error: {0}")]
    Pool(String),

    /// Query timeout error
    #[error("Query timeout after {0:?}")]
    Timeout(std::time::Duration),

    /// An optimistic write matched no rows: the row was changed or removed
    /// since it was read
    #[error("Stale record in table '{table}': no rows matched `{sql}`")]
    StaleRecord { table: String, sql: String },

    /// Other errors
    #[error("{0}")]
    Other(String),
}

impl OrmError {
    /// Create a not found error
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(message.into())
    }

    /// Create a validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    /// Create a conversion error for a named converter
    pub fn conversion(converter: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Conversion {
            converter: converter.into(),
            message: message.into(),
        }
    }

    /// Check if this is a not found error
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// Check if this is an optimistic concurrency conflict
    pub fn is_stale(&self) -> bool {
        matches!(self, Self::StaleRecord { .. })
    }

    /// Check if this is a timeout error
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout(_))
    }

    /// Check if this error comes from a broken mapping rather than from data
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Self::DuplicateEntity(_)
                | Self::NotFound(_)
                | Self::InvalidQualifiedName(_)
                | Self::InvalidForeignKeyColumn(_)
                | Self::CycleDetected { .. }
                | Self::MissingPrimaryKey(_)
        )
    }

    /// Parse a tokio_postgres error into a more specific OrmError
    pub fn from_db_error(err: tokio_postgres::Error) -> Self {
        if err.is_closed() {
            return Self::Connection(err.to_string());
        }
        Self::Query(err)
    }
}

#[cfg(feature = "pool")]
impl From<deadpool_postgres::PoolError> for OrmError {
    fn from(err: deadpool_postgres::PoolError) -> Self {
        Self::Pool(err.to_string())
    }
}

impl From<serde_json::Error> for OrmError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}
