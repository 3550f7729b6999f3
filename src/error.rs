use thiserror::Error;

use crate::db_types::ValueKind;

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug, Error)]
pub enum DbError {
    #[error("the provided file is not a json file: {0}")]
    InvalidFormat(String),

    #[error("could not read database")]
    Io(#[source] std::io::Error),

    #[error("could not decode json")]
    Decode(#[source] serde_json::Error),

    #[error("table does not exist: {0}")]
    TableNotFound(String),

    #[error("column does not exist: {0}")]
    ColumnNotFound(String),

    /// Not produced by any operation yet; kept for uniqueness checks.
    #[error("record already exists")]
    RecordAlreadyExists,

    #[error("record does not exist")]
    RecordNotFound,

    #[error("column {column} holds {found}, expected {expected}")]
    TypeMismatch {
        column: String,
        expected: ValueKind,
        found: ValueKind,
    },

    #[error("column {column} holds {kind} values, which have no ordering")]
    Unorderable { column: String, kind: ValueKind },
}

impl DbError {
    /// Stable name of the error kind, used by transport layers.
    pub fn kind(&self) -> &'static str {
        match self {
            DbError::InvalidFormat(_) => "InvalidFormat",
            DbError::Io(_) => "IOFailure",
            DbError::Decode(_) => "DecodeFailure",
            DbError::TableNotFound(_) => "TableNotFound",
            DbError::ColumnNotFound(_) => "ColumnNotFound",
            DbError::RecordAlreadyExists => "RecordAlreadyExists",
            DbError::RecordNotFound => "RecordNotFound",
            DbError::TypeMismatch { .. } => "TypeMismatch",
            DbError::Unorderable { .. } => "Unorderable",
        }
    }
}
