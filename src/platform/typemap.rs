//! Type Domain Mapper
//!
//! Per-dialect table from logical type to native type syntax.

use std::collections::{BTreeMap, HashMap};

use crate::error::{DdlError, DdlResult};
use crate::model::{Domain, LogicalType};

/// A native type and whether it takes a `(size[,scale])` suffix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NativeType {
    pub name: String,
    pub sized: bool,
    /// Size rendered when the domain leaves it unset.
    pub default_size: Option<u32>,
}

impl NativeType {
    pub fn sized(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sized: true,
            default_size: None,
        }
    }

    pub fn bare(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sized: false,
            default_size: None,
        }
    }

    pub fn with_default_size(mut self, size: u32) -> Self {
        self.default_size = Some(size);
        self
    }
}

#[derive(Debug, Clone)]
pub struct TypeMap {
    dialect: &'static str,
    entries: HashMap<LogicalType, NativeType>,
}

impl TypeMap {
    pub fn empty(dialect: &'static str) -> Self {
        Self {
            dialect,
            entries: HashMap::new(),
        }
    }

    /// SQL-standard spellings.
    pub fn generic() -> Self {
        use LogicalType::*;
        Self::empty("generic")
            .with(Boolean, NativeType::bare("BOOLEAN"))
            .with(TinyInt, NativeType::sized("SMALLINT"))
            .with(SmallInt, NativeType::sized("SMALLINT"))
            .with(Integer, NativeType::sized("INTEGER"))
            .with(BigInt, NativeType::sized("BIGINT"))
            .with(Real, NativeType::bare("REAL"))
            .with(Float, NativeType::sized("FLOAT"))
            .with(Double, NativeType::bare("DOUBLE PRECISION"))
            .with(Decimal, NativeType::sized("DECIMAL"))
            .with(Numeric, NativeType::sized("NUMERIC"))
            .with(Char, NativeType::sized("CHAR"))
            .with(Varchar, NativeType::sized("VARCHAR").with_default_size(255))
            .with(LongVarchar, NativeType::bare("CLOB"))
            .with(Clob, NativeType::bare("CLOB"))
            .with(Date, NativeType::bare("DATE"))
            .with(Time, NativeType::sized("TIME"))
            .with(Timestamp, NativeType::sized("TIMESTAMP"))
            .with(Binary, NativeType::sized("BINARY"))
            .with(VarBinary, NativeType::sized("VARBINARY").with_default_size(255))
            .with(LongVarBinary, NativeType::bare("BLOB"))
            .with(Blob, NativeType::bare("BLOB"))
    }

    pub fn mysql() -> Self {
        use LogicalType::*;
        Self::empty("mysql")
            .with(Boolean, NativeType::sized("TINYINT").with_default_size(1))
            .with(TinyInt, NativeType::sized("TINYINT"))
            .with(SmallInt, NativeType::sized("SMALLINT"))
            .with(Integer, NativeType::sized("INTEGER"))
            .with(BigInt, NativeType::sized("BIGINT"))
            .with(Real, NativeType::sized("DOUBLE"))
            .with(Float, NativeType::sized("FLOAT"))
            .with(Double, NativeType::sized("DOUBLE"))
            .with(Decimal, NativeType::sized("DECIMAL"))
            .with(Numeric, NativeType::sized("DECIMAL"))
            .with(Char, NativeType::sized("CHAR"))
            .with(Varchar, NativeType::sized("VARCHAR").with_default_size(255))
            // TEXT ignores any size on purpose
            .with(LongVarchar, NativeType::bare("TEXT"))
            .with(Clob, NativeType::bare("LONGTEXT"))
            .with(Date, NativeType::bare("DATE"))
            .with(Time, NativeType::sized("TIME"))
            .with(Timestamp, NativeType::sized("DATETIME"))
            .with(Binary, NativeType::bare("BLOB"))
            .with(VarBinary, NativeType::bare("MEDIUMBLOB"))
            .with(LongVarBinary, NativeType::bare("LONGBLOB"))
            .with(Blob, NativeType::bare("LONGBLOB"))
    }

    pub fn pgsql() -> Self {
        use LogicalType::*;
        Self::empty("pgsql")
            .with(Boolean, NativeType::bare("BOOLEAN"))
            .with(TinyInt, NativeType::bare("INT2"))
            .with(SmallInt, NativeType::bare("INT2"))
            .with(Integer, NativeType::bare("INTEGER"))
            .with(BigInt, NativeType::bare("INT8"))
            .with(Real, NativeType::bare("REAL"))
            .with(Float, NativeType::bare("DOUBLE PRECISION"))
            .with(Double, NativeType::bare("DOUBLE PRECISION"))
            .with(Decimal, NativeType::sized("NUMERIC"))
            .with(Numeric, NativeType::sized("NUMERIC"))
            .with(Char, NativeType::sized("CHAR"))
            .with(Varchar, NativeType::sized("VARCHAR").with_default_size(255))
            .with(LongVarchar, NativeType::bare("TEXT"))
            .with(Clob, NativeType::bare("TEXT"))
            .with(Date, NativeType::bare("DATE"))
            .with(Time, NativeType::bare("TIME"))
            .with(Timestamp, NativeType::bare("TIMESTAMP"))
            .with(Binary, NativeType::bare("BYTEA"))
            .with(VarBinary, NativeType::bare("BYTEA"))
            .with(LongVarBinary, NativeType::bare("BYTEA"))
            .with(Blob, NativeType::bare("BYTEA"))
    }

    pub fn with(mut self, logical: LogicalType, native: NativeType) -> Self {
        self.entries.insert(logical, native);
        self
    }

    pub fn without(mut self, logical: LogicalType) -> Self {
        self.entries.remove(&logical);
        self
    }

    /// Apply `LOGICAL = "NATIVE"` overrides. An overridden type keeps the
    /// size behaviour of the entry it replaces.
    pub fn apply_overrides(&mut self, overrides: &BTreeMap<String, String>) -> DdlResult<()> {
        for (logical, native) in overrides {
            let logical: LogicalType = logical
                .parse()
                .map_err(|_| DdlError::unsupported(logical.as_str(), self.dialect))?;
            let sized = self.entries.get(&logical).is_none_or(|n| n.sized);
            self.entries.insert(
                logical,
                NativeType {
                    name: native.clone(),
                    sized,
                    default_size: None,
                },
            );
        }
        Ok(())
    }

    pub fn native(&self, logical: LogicalType) -> DdlResult<&NativeType> {
        self.entries
            .get(&logical)
            .ok_or_else(|| DdlError::unsupported(logical.name(), self.dialect))
    }

    /// Render `NAME`, `NAME(size)` or `NAME(size,scale)`.
    pub fn map(&self, logical: LogicalType, size: Option<u32>, scale: Option<u32>) -> DdlResult<String> {
        let native = self.native(logical)?;
        if !native.sized {
            return Ok(native.name.clone());
        }
        Ok(match (size.or(native.default_size), scale) {
            (Some(size), Some(scale)) => format!("{}({},{})", native.name, size, scale),
            (Some(size), None) => format!("{}({})", native.name, size),
            (None, _) => native.name.clone(),
        })
    }

    /// Map a column domain; an explicit `sql_type` wins and is never sized.
    pub fn map_domain(&self, domain: &Domain) -> DdlResult<String> {
        match &domain.sql_type {
            Some(native) => Ok(native.clone()),
            None => self.map(domain.logical_type, domain.size, domain.scale),
        }
    }

    /// The bare native name a domain renders to, without size.
    pub fn native_name(&self, domain: &Domain) -> DdlResult<String> {
        match &domain.sql_type {
            Some(native) => Ok(native.to_ascii_uppercase()),
            None => Ok(self.native(domain.logical_type)?.name.clone()),
        }
    }
}
