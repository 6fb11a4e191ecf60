//! Error types for ddlgen.

use thiserror::Error;

/// The main error type for DDL generation.
#[derive(Debug, Error)]
pub enum DdlError {
    /// A logical type has no native mapping on the active dialect.
    #[error("Unsupported type '{logical}' for dialect {dialect}")]
    UnsupportedType {
        logical: String,
        dialect: &'static str,
    },

    /// A foreign key or index names a column (or table) that does not exist.
    #[error("Invalid schema reference in table '{table}': {message}")]
    InvalidSchemaReference { table: String, message: String },

    /// Two derived names for the same table collapse to one identifier.
    #[error("Identifier collision in table '{table}': '{name}' is generated twice")]
    IdentifierCollision { table: String, name: String },

    /// Failed to parse a type shorthand such as `DECIMAL(10,2)`.
    #[error("Parse error at position {position}: {message}")]
    Parse { position: usize, message: String },

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl DdlError {
    /// Create an unsupported type error.
    pub fn unsupported(logical: impl Into<String>, dialect: &'static str) -> Self {
        Self::UnsupportedType {
            logical: logical.into(),
            dialect,
        }
    }

    /// Create an invalid reference error for the given table.
    pub fn reference(table: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidSchemaReference {
            table: table.into(),
            message: message.into(),
        }
    }

    /// Create a collision error.
    pub fn collision(table: impl Into<String>, name: impl Into<String>) -> Self {
        Self::IdentifierCollision {
            table: table.into(),
            name: name.into(),
        }
    }

    /// Create a parse error at the given position.
    pub fn parse(position: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            position,
            message: message.into(),
        }
    }
}

/// Result type alias for DDL generation.
pub type DdlResult<T> = Result<T, DdlError>;
