use crate::config::{ForeignKeyChecks, PlatformConfig};
use crate::error::DdlResult;

use super::defaults::{BooleanStyle, StringEscape};
use super::{DefaultValueFormatter, Dialect, IdentifierPolicy, Platform, TypeMap};

/// ANSI SQL platform. Every statement comes from the trait defaults.
#[derive(Debug, Clone)]
pub struct GenericPlatform {
    types: TypeMap,
    identifiers: IdentifierPolicy,
    literals: DefaultValueFormatter,
    foreign_key_checks: ForeignKeyChecks,
}

impl GenericPlatform {
    pub const QUOTE: &'static str = "\"";
    pub const MAX_IDENTIFIER_LENGTH: usize = 128;

    pub fn new() -> Self {
        Self {
            types: TypeMap::generic(),
            identifiers: IdentifierPolicy::new(Self::QUOTE, Self::MAX_IDENTIFIER_LENGTH),
            literals: DefaultValueFormatter::new(StringEscape::DoubledQuote, BooleanStyle::Keyword),
            foreign_key_checks: ForeignKeyChecks::Never,
        }
    }

    pub fn with_config(config: &PlatformConfig) -> DdlResult<Self> {
        let mut platform = Self::new();
        platform.types.apply_overrides(&config.types)?;
        platform.identifiers = IdentifierPolicy::new(
            config.quote_char.as_deref().unwrap_or(Self::QUOTE),
            config.identifier_max_length.unwrap_or(Self::MAX_IDENTIFIER_LENGTH),
        );
        if let Some(policy) = config.foreign_key_checks {
            platform.foreign_key_checks = policy;
        }
        Ok(platform)
    }
}

impl Default for GenericPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl Platform for GenericPlatform {
    fn dialect(&self) -> Dialect {
        Dialect::Generic
    }

    fn type_map(&self) -> &TypeMap {
        &self.types
    }

    fn identifiers(&self) -> &IdentifierPolicy {
        &self.identifiers
    }

    fn literals(&self) -> &DefaultValueFormatter {
        &self.literals
    }

    fn foreign_key_checks(&self) -> ForeignKeyChecks {
        self.foreign_key_checks
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Column, DefaultValue, IdMethod, Index, LogicalType, Table};

    #[test]
    fn test_column_ddl() {
        let platform = GenericPlatform::new();
        let column = Column::new("active", LogicalType::Boolean)
            .not_null()
            .default(DefaultValue::Literal("true".into()));
        assert_eq!(platform.column_ddl(&column).unwrap(), "\"active\" BOOLEAN DEFAULT TRUE NOT NULL");
    }

    #[test]
    fn test_no_auto_increment_keyword() {
        let platform = GenericPlatform::new();
        let column = Column::new("id", LogicalType::Integer).primary_key().auto_increment();
        assert_eq!(platform.column_ddl(&column).unwrap(), "\"id\" INTEGER NOT NULL");
    }

    #[test]
    fn test_config_overrides() {
        let config = PlatformConfig::builder()
            .quote_char("[")
            .identifier_max_length(30)
            .type_override("CLOB", "NTEXT")
            .build();
        let platform = GenericPlatform::with_config(&config).unwrap();
        assert_eq!(platform.quote_identifier("foo"), "[foo]");
        assert_eq!(platform.identifiers().max_length(), 30);
        let column = Column::new("body", LogicalType::Clob);
        assert_eq!(platform.column_ddl(&column).unwrap(), "[body] NTEXT");
    }

    #[test]
    fn test_unique_clause() {
        let platform = GenericPlatform::new();
        let table = Table::new("foo")
            .id_method(IdMethod::Native)
            .column(Column::new("a", LogicalType::Integer))
            .column(Column::new("b", LogicalType::Integer))
            .index(Index::new().column("a").column("b").unique());
        assert_eq!(
            platform.unique_ddl(&table, &table.indices[0]).unwrap(),
            "CONSTRAINT \"foo_U_1\" UNIQUE (\"a\",\"b\")"
        );
    }
}
