//! Platforms
//!
//! A platform renders the schema model for one database engine. The
//! [`Platform`] trait is the shared base: its default methods produce
//! generic SQL from four components (type map, identifier policy, default
//! formatter, vendor resolver), and each engine overrides only what differs.

pub mod ddl;
pub mod defaults;
pub mod generic;
pub mod identifier;
pub mod mysql;
pub mod pgsql;
pub mod typemap;
pub mod vendor;

use std::fmt;
use std::str::FromStr;

use crate::config::{ForeignKeyChecks, PlatformConfig};
use crate::error::{DdlError, DdlResult};
use crate::model::{Column, Database, ForeignKey, Index, Table, TableRef};

pub use defaults::DefaultValueFormatter;
pub use generic::GenericPlatform;
pub use identifier::{IdentifierPolicy, NameKind};
pub use mysql::MysqlPlatform;
pub use pgsql::PgsqlPlatform;
pub use typemap::{NativeType, TypeMap};
pub use vendor::VendorResolver;

/// Supported SQL dialects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Dialect {
    #[default]
    Generic,
    MySql,
    PgSql,
}

impl Dialect {
    /// Tag matched against `VendorInfo::dialect`.
    pub const fn tag(&self) -> &'static str {
        match self {
            Dialect::Generic => "generic",
            Dialect::MySql => "mysql",
            Dialect::PgSql => "pgsql",
        }
    }

    pub fn platform(&self, config: &PlatformConfig) -> DdlResult<Box<dyn Platform>> {
        Ok(match self {
            Dialect::Generic => Box::new(GenericPlatform::with_config(config)?),
            Dialect::MySql => Box::new(MysqlPlatform::with_config(config)?),
            Dialect::PgSql => Box::new(PgsqlPlatform::with_config(config)?),
        })
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for Dialect {
    type Err = DdlError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "generic" | "ansi" => Ok(Dialect::Generic),
            "mysql" => Ok(Dialect::MySql),
            "pgsql" | "postgres" | "postgresql" => Ok(Dialect::PgSql),
            other => Err(DdlError::Config(format!("Unknown dialect: '{}'", other))),
        }
    }
}

/// A DDL-generating platform.
///
/// Statements come back wrapped as `"\n<statement>;\n"`, so concatenated
/// statements are separated by exactly one blank line. Fragments
/// (`column_ddl`, `index_ddl`, ...) carry no surrounding whitespace.
pub trait Platform: Send + Sync {
    fn dialect(&self) -> Dialect;
    fn type_map(&self) -> &TypeMap;
    fn identifiers(&self) -> &IdentifierPolicy;
    fn literals(&self) -> &DefaultValueFormatter;
    fn foreign_key_checks(&self) -> ForeignKeyChecks;

    fn vendor(&self) -> VendorResolver<'static> {
        VendorResolver::new(self.dialect().tag())
    }

    fn quote_identifier(&self, name: &str) -> String {
        self.identifiers().quote(name)
    }

    fn quote(&self, text: &str) -> String {
        self.literals().quote(text)
    }

    /// Keyword appended to natively generated id columns.
    fn auto_increment_keyword(&self) -> Option<&str> {
        None
    }

    /// Whether foreign keys get a backing index when none covers them.
    fn indexes_foreign_keys(&self) -> bool {
        false
    }

    /// Whether foreign key constraints are rendered for a table.
    fn supports_foreign_keys(&self, _table: TableRef<'_>) -> bool {
        true
    }

    /// Indices and foreign keys rendered inside CREATE TABLE rather than
    /// as separate statements.
    fn inline_constraints(&self) -> bool {
        false
    }

    /// Statement disabling foreign-key enforcement for a batch.
    fn begin_ddl(&self) -> String {
        String::new()
    }

    fn end_ddl(&self) -> String {
        String::new()
    }

    /// Text between the opening newline and `CREATE TABLE`.
    fn table_prefix(&self, table: &Table) -> String {
        match &table.description {
            Some(text) => format!("-- {}\n", text),
            None => String::new(),
        }
    }

    /// Text between the closing parenthesis and the semicolon.
    fn table_suffix(&self, _table: TableRef<'_>) -> String {
        String::new()
    }

    fn column_type(&self, _table: Option<&Table>, column: &Column) -> DdlResult<String> {
        self.type_map().map_domain(&column.domain)
    }

    fn column_default(&self, _table: Option<&Table>, column: &Column) -> Option<String> {
        self.literals().clause(&column.domain)
    }

    /// Index type prefix for CREATE INDEX, e.g. `UNIQUE ` or `FULLTEXT `.
    fn index_type(&self, index: &Index) -> String {
        match self.vendor().param(&index.vendor, "Index_type") {
            Some(kind) => format!("{} ", kind),
            None if index.unique => "UNIQUE ".to_string(),
            None => String::new(),
        }
    }

    /// Index line inside CREATE TABLE.
    fn index_clause(&self, index: &Index, name: &str) -> String {
        ddl::inline_index(self, index, name)
    }

    /// Unique constraint line inside CREATE TABLE.
    fn unique_clause(&self, index: &Index, name: &str) -> String {
        format!(
            "CONSTRAINT {} UNIQUE ({})",
            self.quote_identifier(name),
            ddl::index_columns(self, index, ",")
        )
    }

    fn add_tables_ddl(&self, database: &Database) -> DdlResult<String> {
        ddl::add_tables(self, database)
    }

    /// CREATE TABLE, failing when a foreign key target is missing from the
    /// owning database.
    fn add_table_ddl(&self, table: TableRef<'_>) -> DdlResult<String> {
        ddl::add_table(self, table)
    }

    fn drop_table_ddl(&self, table: &Table) -> String {
        format!("\nDROP TABLE IF EXISTS {};\n", self.quote_identifier(&table.name))
    }

    fn column_ddl(&self, column: &Column) -> DdlResult<String> {
        self.column_ddl_in(None, column)
    }

    /// Column clause with the owning table as context.
    fn column_ddl_in(&self, table: Option<&Table>, column: &Column) -> DdlResult<String> {
        ddl::column(self, table, column)
    }

    fn primary_key_ddl(&self, table: &Table) -> String {
        ddl::primary_key(self, table)
    }

    fn add_indices_ddl(&self, table: &Table) -> DdlResult<String> {
        ddl::add_indices(self, table)
    }

    fn add_index_ddl(&self, table: &Table, index: &Index) -> DdlResult<String> {
        let layout = ddl::layout(self, table)?;
        let resolved = layout.find_index(index)?;
        Ok(ddl::create_index(self, table, index, &resolved.name))
    }

    fn index_ddl(&self, table: &Table, index: &Index) -> DdlResult<String> {
        let layout = ddl::layout(self, table)?;
        let resolved = layout.find_index(index)?;
        Ok(self.index_clause(index, &resolved.name))
    }

    fn unique_ddl(&self, table: &Table, index: &Index) -> DdlResult<String> {
        let layout = ddl::layout(self, table)?;
        let resolved = layout.find_index(index)?;
        Ok(self.unique_clause(index, &resolved.name))
    }

    fn drop_index_ddl(&self, table: &Table, index: &Index) -> DdlResult<String> {
        let layout = ddl::layout(self, table)?;
        let resolved = layout.find_index(index)?;
        Ok(format!("\nDROP INDEX {};\n", self.quote_identifier(&resolved.name)))
    }

    fn add_foreign_keys_ddl(&self, table: TableRef<'_>) -> DdlResult<String> {
        ddl::add_foreign_keys(self, table)
    }

    fn add_foreign_key_ddl(&self, table: TableRef<'_>, fk: &ForeignKey) -> DdlResult<String> {
        let Some(name) = ddl::foreign_key_name(self, table, fk)? else {
            return Ok(String::new());
        };
        Ok(ddl::alter_add_foreign_key(self, &table, fk, &name))
    }

    /// Constraint clause for CREATE TABLE; empty when the table cannot
    /// carry foreign keys.
    fn foreign_key_ddl(&self, table: TableRef<'_>, fk: &ForeignKey) -> DdlResult<String> {
        let Some(name) = ddl::foreign_key_name(self, table, fk)? else {
            return Ok(String::new());
        };
        Ok(ddl::foreign_key(self, fk, &name))
    }

    fn drop_foreign_key_ddl(&self, table: &Table, fk: &ForeignKey) -> DdlResult<String> {
        let layout = ddl::layout(self, table)?;
        let name = layout.find_foreign_key(fk)?;
        Ok(format!(
            "\nALTER TABLE {} DROP CONSTRAINT {};\n",
            self.quote_identifier(&table.name),
            self.quote_identifier(name)
        ))
    }

    fn sequence_name(&self, table: &Table) -> Option<String> {
        self.identifiers().sequence_name(table)
    }
}
