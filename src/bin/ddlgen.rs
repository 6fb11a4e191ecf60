//! ddlgen: the DDL generator CLI
//!
//! Reads a serialized schema model and prints the script for one dialect.
//!
//! # Usage
//!
//! ```bash
//! # Full creation script
//! ddlgen schema.json --dialect mysql
//!
//! # One table, PostgreSQL
//! ddlgen schema.toml --dialect pgsql --table book
//!
//! # Drop statements only, written to a file
//! ddlgen schema.json --drop -o drop.sql
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use colored::*;
use ddlgen::prelude::*;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "ddlgen")]
#[command(version)]
#[command(about = "Generate CREATE/DROP DDL for MySQL, PostgreSQL or generic SQL", long_about = None)]
#[command(after_help = "EXAMPLES:
    ddlgen schema.json --dialect mysql
    ddlgen schema.toml --dialect pgsql --table book
    ddlgen schema.json --drop -o drop.sql")]
struct Cli {
    /// Schema file (.json or .toml)
    schema: PathBuf,

    /// Target dialect: generic, mysql or pgsql (postgres and ansi are accepted too)
    #[arg(short, long, default_value = "mysql", env = "DDLGEN_DIALECT")]
    dialect: Dialect,

    /// Platform configuration file (defaults to ./ddlgen.toml, then the user config dir)
    #[arg(short, long, env = "DDLGEN_CONFIG")]
    config: Option<PathBuf>,

    /// Only generate the named table
    #[arg(short, long)]
    table: Option<String>,

    /// Generate DROP statements instead of CREATE
    #[arg(long)]
    drop: bool,

    /// Output file path
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Verbose logging (-v debug, -vv trace)
    #[arg(short, long, action = ArgAction::Count)]
    verbose: u8,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(&cli) {
        eprintln!("{} {:#}", "Error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "ddlgen=debug",
        _ => "ddlgen=trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn run(cli: &Cli) -> Result<()> {
    let dialect = cli.dialect;
    let database = load_schema(&cli.schema)?;
    let config = load_config(cli.config.as_deref())?;
    let platform = dialect
        .platform(config.for_dialect(dialect))
        .context("Invalid platform configuration")?;

    let sql = match &cli.table {
        Some(name) => {
            let table = database
                .table_ref(name)
                .with_context(|| format!("Table '{}' not found in {}", name, cli.schema.display()))?;
            if cli.drop {
                platform.drop_table_ddl(&table)
            } else {
                table_script(platform.as_ref(), table)?
            }
        }
        None if cli.drop => drop_script(platform.as_ref(), &database),
        None => platform.add_tables_ddl(&database)?,
    };

    match &cli.output {
        Some(path) => {
            fs::write(path, &sql).with_context(|| format!("Failed to write {}", path.display()))?;
            eprintln!(
                "{} Wrote {} DDL to {}",
                "✓".green(),
                dialect.to_string().yellow(),
                path.display().to_string().cyan()
            );
        }
        None => print!("{}", sql),
    }
    Ok(())
}

/// CREATE statements for a single table, including the indices and
/// foreign keys a dialect declares outside CREATE TABLE.
fn table_script(platform: &dyn Platform, table: TableRef<'_>) -> Result<String> {
    let mut sql = platform.add_table_ddl(table)?;
    if !platform.inline_constraints() {
        sql.push_str(&platform.add_indices_ddl(&table)?);
        sql.push_str(&platform.add_foreign_keys_ddl(table)?);
    }
    Ok(sql)
}

/// DROP statements in reverse declaration order, so referencing tables go
/// first.
fn drop_script(platform: &dyn Platform, database: &Database) -> String {
    database
        .tables_for_sql()
        .rev()
        .map(|table| platform.drop_table_ddl(table))
        .collect()
}

fn load_schema(path: &Path) -> Result<Database> {
    let content =
        fs::read_to_string(path).with_context(|| format!("Failed to read {}", path.display()))?;
    let database = match path.extension().and_then(|e| e.to_str()) {
        Some("toml") => toml::from_str(&content)
            .with_context(|| format!("Invalid TOML schema {}", path.display()))?,
        _ => serde_json::from_str(&content)
            .with_context(|| format!("Invalid JSON schema {}", path.display()))?,
    };
    Ok(database)
}

fn load_config(explicit: Option<&Path>) -> Result<ConfigFile> {
    match explicit.map(Path::to_path_buf).or_else(ConfigFile::discover) {
        Some(path) => {
            tracing::debug!(path = %path.display(), "loading platform configuration");
            ConfigFile::load(&path).with_context(|| format!("Failed to load config {}", path.display()))
        }
        None => Ok(ConfigFile::default()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dialect_argument() {
        let cli = Cli::try_parse_from(["ddlgen", "schema.json", "--dialect", "postgres"]).unwrap();
        assert_eq!(cli.dialect, Dialect::PgSql);
        let cli = Cli::try_parse_from(["ddlgen", "schema.json", "-d", "generic"]).unwrap();
        assert_eq!(cli.dialect, Dialect::Generic);
        assert!(Cli::try_parse_from(["ddlgen", "schema.json", "-d", "oracle"]).is_err());
    }

    #[test]
    fn test_drop_script_reverses_tables() {
        let database = Database::new("library")
            .table(Table::new("author"))
            .table(Table::new("draft").skip_sql())
            .table(Table::new("book"));
        let sql = drop_script(&GenericPlatform::new(), &database);
        assert_eq!(sql, "\nDROP TABLE IF EXISTS \"book\";\n\nDROP TABLE IF EXISTS \"author\";\n");
    }

    #[test]
    fn test_table_script_includes_constraints() {
        let database = Database::new("library")
            .table(Table::new("author").column(Column::new("id", LogicalType::Integer).primary_key()))
            .table(
                Table::new("book")
                    .column(Column::new("author_id", LogicalType::Integer))
                    .index(Index::new().column("author_id"))
                    .foreign_key(ForeignKey::new("author").reference("author_id", "id")),
            );
        let book = database.table_ref("book").unwrap();
        let sql = table_script(&GenericPlatform::new(), book).unwrap();
        assert!(sql.contains("CREATE INDEX \"book_I_1\""));
        assert!(sql.contains("ALTER TABLE \"book\" ADD CONSTRAINT \"book_FK_1\""));
    }
}
