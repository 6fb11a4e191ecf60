//! Platform configuration
//!
//! Every option is optional; unset options fall back to the dialect's own
//! defaults when a platform is built. A configuration file carries one
//! section per dialect:
//!
//! ```toml
//! [mysql]
//! default_storage_engine = "MyISAM"
//! engine_keyword = "TYPE"
//! foreign_key_checks = "when-foreign-keys-present"
//!
//! [mysql.types]
//! LONGVARCHAR = "MEDIUMTEXT"
//!
//! [pgsql]
//! identifier_max_length = 63
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{DdlError, DdlResult};
use crate::platform::Dialect;

/// When a batch script wraps itself in foreign-key-check toggles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ForeignKeyChecks {
    /// Always emit the toggle pair, even for a script without tables.
    Always,
    /// Only when at least one generated table carries a foreign key.
    WhenForeignKeysPresent,
    Never,
}

/// Per-platform options.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct PlatformConfig {
    /// Storage engine used when a table names none (MySQL).
    pub default_storage_engine: Option<String>,
    /// `ENGINE` or the legacy `TYPE` keyword (MySQL).
    pub engine_keyword: Option<String>,
    pub identifier_max_length: Option<usize>,
    /// Opening quote; an empty string disables identifier quoting.
    pub quote_char: Option<String>,
    pub foreign_key_checks: Option<ForeignKeyChecks>,
    /// Native type overrides keyed by logical type name.
    pub types: BTreeMap<String, String>,
}

/// A configuration file: one section per dialect.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ConfigFile {
    pub generic: PlatformConfig,
    pub mysql: PlatformConfig,
    pub pgsql: PlatformConfig,
}

impl PlatformConfig {
    /// Create a new configuration builder
    pub fn builder() -> PlatformConfigBuilder {
        PlatformConfigBuilder::default()
    }
}

impl ConfigFile {
    pub fn from_toml_str(src: &str) -> DdlResult<Self> {
        toml::from_str(src).map_err(|e| DdlError::Config(e.to_string()))
    }

    pub fn load(path: impl AsRef<Path>) -> DdlResult<Self> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// `./ddlgen.toml`, then `<config dir>/ddlgen/config.toml`.
    pub fn discover() -> Option<PathBuf> {
        let local = PathBuf::from("ddlgen.toml");
        if local.exists() {
            return Some(local);
        }
        dirs::config_dir()
            .map(|p| p.join("ddlgen").join("config.toml"))
            .filter(|p| p.exists())
    }

    pub fn for_dialect(&self, dialect: Dialect) -> &PlatformConfig {
        match dialect {
            Dialect::Generic => &self.generic,
            Dialect::MySql => &self.mysql,
            Dialect::PgSql => &self.pgsql,
        }
    }
}

/// Builder for PlatformConfig
#[derive(Debug, Default)]
pub struct PlatformConfigBuilder {
    config: PlatformConfig,
}

impl PlatformConfigBuilder {
    pub fn default_storage_engine(mut self, engine: impl Into<String>) -> Self {
        self.config.default_storage_engine = Some(engine.into());
        self
    }

    pub fn engine_keyword(mut self, keyword: impl Into<String>) -> Self {
        self.config.engine_keyword = Some(keyword.into());
        self
    }

    pub fn identifier_max_length(mut self, len: usize) -> Self {
        self.config.identifier_max_length = Some(len);
        self
    }

    pub fn quote_char(mut self, quote: impl Into<String>) -> Self {
        self.config.quote_char = Some(quote.into());
        self
    }

    pub fn foreign_key_checks(mut self, policy: ForeignKeyChecks) -> Self {
        self.config.foreign_key_checks = Some(policy);
        self
    }

    pub fn type_override(mut self, logical: impl Into<String>, native: impl Into<String>) -> Self {
        self.config.types.insert(logical.into(), native.into());
        self
    }

    pub fn build(self) -> PlatformConfig {
        self.config
    }
}
