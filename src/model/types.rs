//! Logical Column Types
//!
//! Dialect-neutral type names. Every platform maps these to its own native
//! syntax; nothing in the model carries engine-specific type strings except
//! an explicit `sql_type` override on the domain.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DdlError;

/// Logical column type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum LogicalType {
    Boolean,
    TinyInt,
    SmallInt,
    Integer,
    BigInt,
    Real,
    Float,
    Double,
    Decimal,
    Numeric,
    Char,
    Varchar,
    /// Long character data (TEXT on most engines)
    LongVarchar,
    Clob,
    Date,
    Time,
    Timestamp,
    Binary,
    VarBinary,
    LongVarBinary,
    Blob,
}

impl LogicalType {
    pub const ALL: [LogicalType; 21] = [
        Self::Boolean,
        Self::TinyInt,
        Self::SmallInt,
        Self::Integer,
        Self::BigInt,
        Self::Real,
        Self::Float,
        Self::Double,
        Self::Decimal,
        Self::Numeric,
        Self::Char,
        Self::Varchar,
        Self::LongVarchar,
        Self::Clob,
        Self::Date,
        Self::Time,
        Self::Timestamp,
        Self::Binary,
        Self::VarBinary,
        Self::LongVarBinary,
        Self::Blob,
    ];

    /// Canonical upper-case name, as used in schema files.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Boolean => "BOOLEAN",
            Self::TinyInt => "TINYINT",
            Self::SmallInt => "SMALLINT",
            Self::Integer => "INTEGER",
            Self::BigInt => "BIGINT",
            Self::Real => "REAL",
            Self::Float => "FLOAT",
            Self::Double => "DOUBLE",
            Self::Decimal => "DECIMAL",
            Self::Numeric => "NUMERIC",
            Self::Char => "CHAR",
            Self::Varchar => "VARCHAR",
            Self::LongVarchar => "LONGVARCHAR",
            Self::Clob => "CLOB",
            Self::Date => "DATE",
            Self::Time => "TIME",
            Self::Timestamp => "TIMESTAMP",
            Self::Binary => "BINARY",
            Self::VarBinary => "VARBINARY",
            Self::LongVarBinary => "LONGVARBINARY",
            Self::Blob => "BLOB",
        }
    }

    /// Character types whose default literals are quoted.
    pub const fn is_text(&self) -> bool {
        matches!(
            self,
            Self::Char | Self::Varchar | Self::LongVarchar | Self::Clob
        )
    }

    pub const fn is_temporal(&self) -> bool {
        matches!(self, Self::Date | Self::Time | Self::Timestamp)
    }

    pub const fn is_binary(&self) -> bool {
        matches!(
            self,
            Self::Binary | Self::VarBinary | Self::LongVarBinary | Self::Blob
        )
    }

    pub const fn is_boolean(&self) -> bool {
        matches!(self, Self::Boolean)
    }
}

impl fmt::Display for LogicalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for LogicalType {
    type Err = DdlError;

    /// Case-insensitive; a few common aliases are accepted.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let upper = s.trim().to_ascii_uppercase();
        let found = match upper.as_str() {
            "BOOL" => Some(Self::Boolean),
            "INT" => Some(Self::Integer),
            "TEXT" => Some(Self::LongVarchar),
            other => Self::ALL.iter().copied().find(|t| t.name() == other),
        };
        found.ok_or_else(|| DdlError::unsupported(s.trim(), "any"))
    }
}

impl TryFrom<String> for LogicalType {
    type Error = DdlError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<LogicalType> for String {
    fn from(value: LogicalType) -> Self {
        value.name().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str() {
        assert_eq!("integer".parse::<LogicalType>().unwrap(), LogicalType::Integer);
        assert_eq!("LONGVARCHAR".parse::<LogicalType>().unwrap(), LogicalType::LongVarchar);
        assert_eq!("text".parse::<LogicalType>().unwrap(), LogicalType::LongVarchar);
        assert_eq!("Bool".parse::<LogicalType>().unwrap(), LogicalType::Boolean);
    }

    #[test]
    fn test_unknown_type_is_an_error() {
        let err = "GEOMETRY".parse::<LogicalType>().unwrap_err();
        assert!(matches!(err, DdlError::UnsupportedType { ref logical, .. } if logical == "GEOMETRY"));
    }

    #[test]
    fn test_every_name_parses_back() {
        for t in LogicalType::ALL {
            assert_eq!(t.name().parse::<LogicalType>().unwrap(), t);
        }
    }

    #[test]
    fn test_categories() {
        assert!(LogicalType::Varchar.is_text());
        assert!(!LogicalType::Date.is_text());
        assert!(LogicalType::Timestamp.is_temporal());
        assert!(LogicalType::Blob.is_binary());
        assert!(!LogicalType::Integer.is_binary());
    }
}
