//! MySQL platform.
//!
//! Indices and foreign keys are declared inside CREATE TABLE, table
//! options come from vendor parameters, and foreign keys are only rendered
//! for InnoDB tables.

use std::slice;

use crate::config::{ForeignKeyChecks, PlatformConfig};
use crate::error::DdlResult;
use crate::model::{Column, ForeignKey, Index, Table, TableRef, VendorInfo};

use super::defaults::{BooleanStyle, StringEscape};
use super::{ddl, DefaultValueFormatter, Dialect, IdentifierPolicy, Platform, TypeMap};

/// Vendor parameter and the table option it renders as.
const TABLE_OPTIONS: &[(&str, &str)] = &[
    ("AutoIncrement", "AUTO_INCREMENT"),
    ("AvgRowLength", "AVG_ROW_LENGTH"),
    ("Charset", "CHARACTER SET"),
    ("Checksum", "CHECKSUM"),
    ("Collate", "COLLATE"),
    ("Connection", "CONNECTION"),
    ("DataDirectory", "DATA DIRECTORY"),
    ("DelayKeyWrite", "DELAY_KEY_WRITE"),
    ("IndexDirectory", "INDEX DIRECTORY"),
    ("InsertMethod", "INSERT_METHOD"),
    ("KeyBlockSize", "KEY_BLOCK_SIZE"),
    ("MaxRows", "MAX_ROWS"),
    ("MinRows", "MIN_ROWS"),
    ("PackKeys", "PACK_KEYS"),
    ("RowFormat", "ROW_FORMAT"),
    ("Union", "UNION"),
];

const BEGIN_DDL: &str = "
# This is a fix for InnoDB in MySQL >= 4.1.x
# It \"suspends judgement\" for fkey relationships until are tables are set.
SET FOREIGN_KEY_CHECKS = 0;
";

const END_DDL: &str = "
# This restores the fkey checks, after having unset them earlier
SET FOREIGN_KEY_CHECKS = 1;
";

#[derive(Debug, Clone)]
pub struct MysqlPlatform {
    types: TypeMap,
    identifiers: IdentifierPolicy,
    literals: DefaultValueFormatter,
    foreign_key_checks: ForeignKeyChecks,
    default_engine: String,
    engine_keyword: String,
}

impl MysqlPlatform {
    pub const QUOTE: &'static str = "`";
    pub const MAX_IDENTIFIER_LENGTH: usize = 64;
    pub const DEFAULT_ENGINE: &'static str = "InnoDB";

    pub fn new() -> Self {
        Self {
            types: TypeMap::mysql(),
            identifiers: IdentifierPolicy::new(Self::QUOTE, Self::MAX_IDENTIFIER_LENGTH),
            literals: DefaultValueFormatter::new(StringEscape::Backslash, BooleanStyle::Numeric),
            foreign_key_checks: ForeignKeyChecks::Always,
            default_engine: Self::DEFAULT_ENGINE.to_string(),
            engine_keyword: "ENGINE".to_string(),
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
        if let Some(engine) = &config.default_storage_engine {
            platform.default_engine = engine.clone();
        }
        if let Some(keyword) = &config.engine_keyword {
            platform.engine_keyword = keyword.to_ascii_uppercase();
        }
        Ok(platform)
    }

    /// Table vendor parameters laid over the database ones.
    fn table_vendor(&self, table: TableRef<'_>) -> VendorInfo {
        self.vendor().merged(&table.database.vendor, &table.table.vendor)
    }

    /// Storage engine of a table, falling back to the platform default.
    pub fn engine(&self, table: TableRef<'_>) -> String {
        let info = self.table_vendor(table);
        self.vendor()
            .param_for(slice::from_ref(&info), "Engine", &self.default_engine)
            .to_string()
    }

    fn table_options(&self, info: &VendorInfo) -> Vec<String> {
        let vendor = self.vendor();
        let infos = slice::from_ref(info);
        TABLE_OPTIONS
            .iter()
            .filter_map(|(key, sql_name)| {
                let value = vendor.param(infos, key).or_else(|| vendor.param(infos, sql_name))?;
                let value = if is_unsigned_integer(value) {
                    value.to_string()
                } else {
                    self.quote(value)
                };
                Some(format!("{}={}", sql_name, value))
            })
            .collect()
    }
}

fn is_unsigned_integer(value: &str) -> bool {
    !value.is_empty() && value.bytes().all(|b| b.is_ascii_digit())
}

impl Default for MysqlPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl Platform for MysqlPlatform {
    fn dialect(&self) -> Dialect {
        Dialect::MySql
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

    fn auto_increment_keyword(&self) -> Option<&str> {
        Some("AUTO_INCREMENT")
    }

    fn indexes_foreign_keys(&self) -> bool {
        true
    }

    fn supports_foreign_keys(&self, table: TableRef<'_>) -> bool {
        self.engine(table).eq_ignore_ascii_case("InnoDB")
    }

    fn inline_constraints(&self) -> bool {
        true
    }

    fn begin_ddl(&self) -> String {
        BEGIN_DDL.to_string()
    }

    fn end_ddl(&self) -> String {
        END_DDL.to_string()
    }

    // the description goes into the COMMENT table option
    fn table_prefix(&self, _table: &Table) -> String {
        String::new()
    }

    fn table_suffix(&self, table: TableRef<'_>) -> String {
        let info = self.table_vendor(table);
        let mut suffix = format!(" {}={}", self.engine_keyword, self.engine(table));
        for option in self.table_options(&info) {
            suffix.push(' ');
            suffix.push_str(&option);
        }
        if let Some(description) = &table.description {
            suffix.push_str(" COMMENT=");
            suffix.push_str(&self.quote(description));
        }
        suffix
    }

    fn column_ddl_in(&self, table: Option<&Table>, column: &Column) -> DdlResult<String> {
        let vendor = self.vendor();
        let mut parts = vec![
            self.quote_identifier(&column.name),
            self.column_type(table, column)?,
        ];
        if let Some(charset) = vendor.param(&column.vendor, "Charset") {
            parts.push(format!("CHARACTER SET {}", self.quote(charset)));
        }
        if let Some(collation) = vendor.param(&column.vendor, "Collate") {
            parts.push(format!("COLLATE {}", self.quote(collation)));
        }

        let default = self.column_default(table, column);
        if self.types.native_name(&column.domain)? == "TIMESTAMP" {
            // nullable TIMESTAMP columns must say so explicitly
            let nullability = if column.is_not_null() { "NOT NULL" } else { "NULL" };
            parts.push(nullability.to_string());
            match default {
                Some(default) => parts.push(default),
                None if column.is_not_null() => parts.push("DEFAULT CURRENT_TIMESTAMP".to_string()),
                None => {}
            }
        } else {
            parts.extend(default);
            if column.is_not_null() {
                parts.push("NOT NULL".to_string());
            }
        }

        if let Some(keyword) = ddl::auto_increment_keyword(self, table, column) {
            parts.push(keyword.to_string());
        }
        let comment = vendor
            .param(&column.vendor, "Comment")
            .or(column.description.as_deref());
        if let Some(comment) = comment {
            parts.push(format!("COMMENT {}", self.quote(comment)));
        }
        Ok(parts.join(" "))
    }

    fn unique_clause(&self, index: &Index, name: &str) -> String {
        format!(
            "UNIQUE INDEX {} ({})",
            self.quote_identifier(name),
            ddl::index_columns(self, index, ", ")
        )
    }

    fn drop_index_ddl(&self, table: &Table, index: &Index) -> DdlResult<String> {
        let layout = ddl::layout(self, table)?;
        let resolved = layout.find_index(index)?;
        Ok(format!(
            "\nALTER TABLE {} DROP INDEX {};\n",
            self.quote_identifier(&table.name),
            self.quote_identifier(&resolved.name)
        ))
    }

    fn drop_foreign_key_ddl(&self, table: &Table, fk: &ForeignKey) -> DdlResult<String> {
        let layout = ddl::layout(self, table)?;
        let name = layout.find_foreign_key(fk)?;
        Ok(format!(
            "\nALTER TABLE {} DROP FOREIGN KEY {};\n",
            self.quote_identifier(&table.name),
            self.quote_identifier(name)
        ))
    }
}
