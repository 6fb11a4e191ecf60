//! # ddlgen
//!
//! Multi-dialect DDL generation: turn a dialect-neutral schema model into
//! CREATE, DROP and ALTER statements for MySQL, PostgreSQL or generic SQL.
//!
//! ## Quick Example
//!
//! ```
//! use ddlgen::prelude::*;
//!
//! let db = Database::new("test").table(
//!     Table::new("foo")
//!         .id_method(IdMethod::Native)
//!         .column(Column::new("id", LogicalType::Integer).primary_key().auto_increment())
//!         .column(Column::new("bar", LogicalType::Varchar).not_null()),
//! );
//!
//! let platform = Dialect::MySql.platform(&PlatformConfig::default()).unwrap();
//! let sql = platform.add_table_ddl(db.table_ref("foo").unwrap()).unwrap();
//! assert!(sql.contains("`id` INTEGER NOT NULL AUTO_INCREMENT"));
//! assert!(sql.ends_with(") ENGINE=InnoDB;\n"));
//! ```
//!
//! ## Dialects
//!
//! | Dialect   | Quote | Max identifier | Foreign key checks |
//! |-----------|-------|----------------|--------------------|
//! | `generic` | `"`   | 128            | never              |
//! | `mysql`   | `` ` `` | 64           | always             |
//! | `pgsql`   | `"`   | 63             | never              |

pub mod config;
pub mod error;
pub mod model;
pub mod parser;
pub mod platform;

pub mod prelude {
    pub use crate::config::{ConfigFile, ForeignKeyChecks, PlatformConfig};
    pub use crate::error::*;
    pub use crate::model::*;
    pub use crate::platform::{Dialect, GenericPlatform, MysqlPlatform, PgsqlPlatform, Platform};
}

/// Generate the full creation script of a database.
///
/// # Example
///
/// ```
/// use ddlgen::prelude::*;
///
/// let db = Database::new("test").table(
///     Table::new("foo").column(Column::new("id", LogicalType::Integer).primary_key()),
/// );
/// let sql = ddlgen::generate(&db, Dialect::PgSql, &PlatformConfig::default()).unwrap();
/// assert!(sql.contains("CREATE TABLE \"foo\""));
/// ```
pub fn generate(
    database: &model::Database,
    dialect: platform::Dialect,
    config: &config::PlatformConfig,
) -> error::DdlResult<String> {
    dialect.platform(config)?.add_tables_ddl(database)
}
