use thiserror::Error;

/// Closed set of result codes crossing the engine boundary. Every failure of
/// every public operation maps to exactly one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResultCode {
    Ok,
    Error,
    Nomem,
    IoError,
    ParseError,
    NotFound,
    ConstraintError,
}

impl ResultCode {
    /// Canonical human-readable string for a code. Stable across versions,
    /// intended for diagnostics only.
    pub fn as_str(&self) -> &'static str {
        match self {
            ResultCode::Ok => "Success",
            ResultCode::Error => "General error",
            ResultCode::Nomem => "Out of memory",
            ResultCode::IoError => "I/O error",
            ResultCode::ParseError => "SQL parse error",
            ResultCode::NotFound => "Not found",
            ResultCode::ConstraintError => "Constraint violation",
        }
    }
}

impl std::fmt::Display for ResultCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Canonical diagnostic string for a result code.
pub fn error_string(code: ResultCode) -> &'static str {
    code.as_str()
}

#[derive(Error, Debug)]
pub enum DatabaseError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQL parsing error: {details}")]
    SqlParseError { details: String },

    #[error("Unsupported statement: {details}")]
    UnsupportedStatement { details: String },

    #[error("Invalid table header: {reason}")]
    InvalidHeader { reason: String },

    #[error("Table '{name}' not found")]
    TableNotFound { name: String },

    #[error("Table '{name}' already exists")]
    DuplicateTable { name: String },

    #[error("File for table '{name}' already exists and is not empty")]
    FileExists { name: String },

    #[error("Column '{name}' not found in table '{table}'")]
    ColumnNotFound { name: String, table: String },

    #[error("Duplicate column name '{name}'")]
    DuplicateColumn { name: String },

    #[error("Type mismatch in column '{column}': expected {expected}, got {actual}")]
    TypeMismatch {
        column: String,
        expected: String,
        actual: String,
    },

    #[error("Row has {actual} values but schema expects {expected} columns")]
    ColumnCountMismatch { expected: usize, actual: usize },

    #[error("Text value of {length} bytes exceeds capacity {capacity} of column '{column}'")]
    TextOverflow {
        column: String,
        capacity: usize,
        length: usize,
    },

    #[error("Column '{column}' is not nullable")]
    NullViolation { column: String },

    #[error("handle is closed")]
    HandleClosed,

    #[error("Serialization/deserialization error: {details}")]
    SerializationError { details: String },

    #[error("Out of memory: {details}")]
    OutOfMemory { details: String },
}

impl DatabaseError {
    /// Map an internal error to the closed result-code set. This is the only
    /// translation point; no component invents codes of its own.
    pub fn code(&self) -> ResultCode {
        match self {
            DatabaseError::Io(_) => ResultCode::IoError,
            DatabaseError::SqlParseError { .. }
            | DatabaseError::UnsupportedStatement { .. }
            | DatabaseError::InvalidHeader { .. }
            | DatabaseError::DuplicateColumn { .. }
            | DatabaseError::ColumnNotFound { .. } => ResultCode::ParseError,
            DatabaseError::TableNotFound { .. } => ResultCode::NotFound,
            DatabaseError::DuplicateTable { .. }
            | DatabaseError::TypeMismatch { .. }
            | DatabaseError::ColumnCountMismatch { .. }
            | DatabaseError::TextOverflow { .. }
            | DatabaseError::NullViolation { .. } => ResultCode::ConstraintError,
            DatabaseError::FileExists { .. }
            | DatabaseError::HandleClosed
            | DatabaseError::SerializationError { .. } => ResultCode::Error,
            DatabaseError::OutOfMemory { .. } => ResultCode::Nomem,
        }
    }
}

impl From<sqlparser::parser::ParserError> for DatabaseError {
    fn from(err: sqlparser::parser::ParserError) -> Self {
        DatabaseError::SqlParseError {
            details: err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, DatabaseError>;
