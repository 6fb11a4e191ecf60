//! PostgreSQL platform.
//!
//! Native ids become `SERIAL` columns; tables using a sequence get their
//! sequence created (and dropped) next to the table, and descriptions are
//! attached with `COMMENT ON`.

use tracing::warn;

use crate::config::{ForeignKeyChecks, PlatformConfig};
use crate::error::DdlResult;
use crate::model::{Column, IdMethod, LogicalType, Table, TableRef};

use super::defaults::{BooleanStyle, StringEscape};
use super::{ddl, DefaultValueFormatter, Dialect, IdentifierPolicy, Platform, TypeMap};

#[derive(Debug, Clone)]
pub struct PgsqlPlatform {
    types: TypeMap,
    identifiers: IdentifierPolicy,
    literals: DefaultValueFormatter,
    foreign_key_checks: ForeignKeyChecks,
}

impl PgsqlPlatform {
    pub const QUOTE: &'static str = "\"";
    pub const MAX_IDENTIFIER_LENGTH: usize = 63;

    pub fn new() -> Self {
        Self {
            types: TypeMap::pgsql(),
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

    /// The id method driving an auto-increment column; a column rendered
    /// on its own is treated as native.
    fn id_method_for(table: Option<&Table>, column: &Column) -> Option<IdMethod> {
        if !column.auto_increment {
            return None;
        }
        Some(table.map_or(IdMethod::Native, |t| t.id_method))
    }

    fn sequence_for(&self, table: &Table) -> Option<String> {
        match table.id_method {
            IdMethod::Sequence => self.sequence_name(table),
            _ => None,
        }
    }

    fn comments(&self, table: &Table) -> String {
        let mut sql = String::new();
        if let Some(description) = &table.description {
            sql.push_str(&format!(
                "\nCOMMENT ON TABLE {} IS {};\n",
                self.quote_identifier(&table.name),
                self.quote(description)
            ));
        }
        for column in &table.columns {
            if let Some(description) = &column.description {
                sql.push_str(&format!(
                    "\nCOMMENT ON COLUMN {}.{} IS {};\n",
                    self.quote_identifier(&table.name),
                    self.quote_identifier(&column.name),
                    self.quote(description)
                ));
            }
        }
        sql
    }
}

impl Default for PgsqlPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl Platform for PgsqlPlatform {
    fn dialect(&self) -> Dialect {
        Dialect::PgSql
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

    // descriptions are attached with COMMENT ON after the table
    fn table_prefix(&self, _table: &Table) -> String {
        String::new()
    }

    fn column_type(&self, table: Option<&Table>, column: &Column) -> DdlResult<String> {
        match Self::id_method_for(table, column) {
            Some(IdMethod::Native) if column.domain.sql_type.is_none() => {
                Ok(match column.domain.logical_type {
                    LogicalType::BigInt => "BIGSERIAL".to_string(),
                    _ => "SERIAL".to_string(),
                })
            }
            Some(IdMethod::None) => {
                if let Some(table) = table {
                    warn!(
                        table = %table.name,
                        column = %column.name,
                        "auto-increment dropped: table has no id method"
                    );
                }
                self.types.map_domain(&column.domain)
            }
            _ => self.types.map_domain(&column.domain),
        }
    }

    fn column_default(&self, table: Option<&Table>, column: &Column) -> Option<String> {
        let sequence = match (Self::id_method_for(table, column), table) {
            (Some(IdMethod::Sequence), Some(table)) => self.sequence_for(table),
            _ => None,
        };
        match sequence {
            Some(sequence) => Some(format!(
                "DEFAULT nextval({})",
                self.quote(&self.quote_identifier(&sequence))
            )),
            None => self.literals.clause(&column.domain),
        }
    }

    fn add_table_ddl(&self, table: TableRef<'_>) -> DdlResult<String> {
        let table_sql = ddl::add_table(self, table)?;
        let mut sql = String::new();
        if let Some(sequence) = self.sequence_for(&table) {
            sql.push_str(&format!("\nCREATE SEQUENCE {};\n", self.quote_identifier(&sequence)));
        }
        sql.push_str(&table_sql);
        sql.push_str(&self.comments(&table));
        Ok(sql)
    }

    fn drop_table_ddl(&self, table: &Table) -> String {
        let mut sql = format!(
            "\nDROP TABLE IF EXISTS {} CASCADE;\n",
            self.quote_identifier(&table.name)
        );
        if let Some(sequence) = self.sequence_for(table) {
            sql.push_str(&format!(
                "\nDROP SEQUENCE IF EXISTS {};\n",
                self.quote_identifier(&sequence)
            ));
        }
        sql
    }
}
