//! Schema Model
//!
//! The dialect-neutral tree the platforms render: a database owns tables,
//! a table owns its columns, indices and foreign keys. The model is built
//! once by whoever loads the schema and is only ever borrowed during
//! generation.
//!
//! ```
//! use ddlgen::model::*;
//!
//! let book = Table::new("book")
//!     .id_method(IdMethod::Native)
//!     .column(Column::new("id", LogicalType::Integer).primary_key().auto_increment())
//!     .column(Column::new("title", LogicalType::Varchar).size(255).not_null())
//!     .column(Column::new("author_id", LogicalType::Integer))
//!     .index(Index::new().column("title"))
//!     .foreign_key(ForeignKey::new("author").reference("author_id", "id"));
//!
//! assert_eq!(book.primary_key().len(), 1);
//! ```

pub mod types;

use std::collections::BTreeMap;
use std::ops::Deref;

use serde::{Deserialize, Serialize};

use crate::error::DdlError;
use crate::parser::parse_type_spec;

pub use types::LogicalType;

/// A complete database schema.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Database {
    pub name: String,
    #[serde(default)]
    pub tables: Vec<Table>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub vendor: Vec<VendorInfo>,
}

/// How a table generates its primary key values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdMethod {
    /// Engine-native generation (AUTO_INCREMENT, SERIAL)
    Native,
    /// An explicit sequence object
    Sequence,
    #[default]
    None,
}

/// A table definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    pub name: String,
    #[serde(default)]
    pub columns: Vec<Column>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub indices: Vec<Index>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub foreign_keys: Vec<ForeignKey>,
    #[serde(default)]
    pub id_method: IdMethod,
    /// Explicit sequence name for the id method.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id_method_parameter: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub vendor: Vec<VendorInfo>,
    /// Part of the model but left out of generated scripts.
    #[serde(default)]
    pub skip_sql: bool,
}

/// The logical type descriptor of a column.
#[derive(Debug, Clone, PartialEq)]
pub struct Domain {
    pub logical_type: LogicalType,
    pub size: Option<u32>,
    pub scale: Option<u32>,
    pub default: Option<DefaultValue>,
    /// Native type rendered verbatim instead of the mapped one.
    pub sql_type: Option<String>,
}

/// A column default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DefaultValue {
    /// A value rendered according to the column type.
    Literal(String),
    /// Raw SQL, rendered unquoted.
    Expression(String),
    /// An explicit `DEFAULT NULL`.
    Null,
}

/// A column definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "ColumnRepr", into = "ColumnRepr")]
pub struct Column {
    pub name: String,
    pub domain: Domain,
    pub not_null: bool,
    pub primary_key: bool,
    pub auto_increment: bool,
    pub description: Option<String>,
    pub vendor: Vec<VendorInfo>,
}

/// One column of an index, with an optional key prefix length.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexColumn {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub size: Option<u32>,
}

/// An index definition.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Index {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub columns: Vec<IndexColumn>,
    #[serde(default)]
    pub unique: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub vendor: Vec<VendorInfo>,
}

/// Referential action for ON DELETE / ON UPDATE.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FkAction {
    #[serde(rename = "CASCADE")]
    Cascade,
    #[serde(rename = "SET NULL")]
    SetNull,
    #[serde(rename = "SET DEFAULT")]
    SetDefault,
    #[serde(rename = "RESTRICT")]
    Restrict,
    #[serde(rename = "NO ACTION")]
    NoAction,
}

impl FkAction {
    pub const fn as_sql(&self) -> &'static str {
        match self {
            Self::Cascade => "CASCADE",
            Self::SetNull => "SET NULL",
            Self::SetDefault => "SET DEFAULT",
            Self::Restrict => "RESTRICT",
            Self::NoAction => "NO ACTION",
        }
    }
}

/// A local/foreign column pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    pub local: String,
    pub foreign: String,
}

/// A foreign key definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForeignKey {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub foreign_table: String,
    pub references: Vec<Reference>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_delete: Option<FkAction>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_update: Option<FkAction>,
    #[serde(default)]
    pub skip_sql: bool,
}

/// Dialect-scoped extension parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VendorInfo {
    /// Dialect tag, e.g. `mysql`.
    #[serde(rename = "type")]
    pub dialect: String,
    #[serde(default)]
    pub parameters: BTreeMap<String, String>,
}

impl Database {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn table(mut self, table: Table) -> Self {
        self.tables.push(table);
        self
    }

    pub fn add_table(&mut self, table: Table) {
        self.tables.push(table);
    }

    pub fn vendor(mut self, info: VendorInfo) -> Self {
        self.vendor.push(info);
        self
    }

    pub fn table_named(&self, name: &str) -> Option<&Table> {
        self.tables.iter().find(|t| t.name == name)
    }

    /// A table of this database, borrowed with the database as context.
    pub fn table_ref(&self, name: &str) -> Option<TableRef<'_>> {
        self.table_named(name).map(|table| TableRef::new(self, table))
    }

    /// Tables that take part in generated scripts, in declaration order.
    pub fn tables_for_sql(&self) -> impl DoubleEndedIterator<Item = &Table> {
        self.tables.iter().filter(|t| !t.skip_sql)
    }

    /// Same as [`Database::tables_for_sql`], each paired with this database.
    pub fn table_refs_for_sql(&self) -> impl DoubleEndedIterator<Item = TableRef<'_>> {
        self.tables_for_sql().map(move |table| TableRef::new(self, table))
    }
}

/// A table together with the database that owns it.
///
/// The model keeps no parent pointers, so statements that look past the
/// table (foreign key targets, database-wide vendor options) take this
/// handle instead of a bare `&Table`. It derefs to the table.
#[derive(Debug, Clone, Copy)]
pub struct TableRef<'a> {
    pub database: &'a Database,
    pub table: &'a Table,
}

impl<'a> TableRef<'a> {
    pub fn new(database: &'a Database, table: &'a Table) -> Self {
        Self { database, table }
    }
}

impl Deref for TableRef<'_> {
    type Target = Table;

    fn deref(&self) -> &Table {
        self.table
    }
}

impl Table {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
            indices: Vec::new(),
            foreign_keys: Vec::new(),
            id_method: IdMethod::None,
            id_method_parameter: None,
            description: None,
            vendor: Vec::new(),
            skip_sql: false,
        }
    }

    pub fn column(mut self, col: Column) -> Self {
        self.columns.push(col);
        self
    }

    pub fn index(mut self, index: Index) -> Self {
        self.indices.push(index);
        self
    }

    pub fn foreign_key(mut self, fk: ForeignKey) -> Self {
        self.foreign_keys.push(fk);
        self
    }

    pub fn id_method(mut self, method: IdMethod) -> Self {
        self.id_method = method;
        self
    }

    pub fn sequence(mut self, name: impl Into<String>) -> Self {
        self.id_method_parameter = Some(name.into());
        self
    }

    pub fn description(mut self, text: impl Into<String>) -> Self {
        self.description = Some(text.into());
        self
    }

    pub fn vendor(mut self, info: VendorInfo) -> Self {
        self.vendor.push(info);
        self
    }

    pub fn skip_sql(mut self) -> Self {
        self.skip_sql = true;
        self
    }

    pub fn column_named(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_named(name).is_some()
    }

    /// Primary-key columns in declaration order.
    pub fn primary_key(&self) -> Vec<&Column> {
        self.columns.iter().filter(|c| c.primary_key).collect()
    }

    pub fn has_primary_key(&self) -> bool {
        self.columns.iter().any(|c| c.primary_key)
    }

    pub fn foreign_keys_for_sql(&self) -> impl Iterator<Item = &ForeignKey> {
        self.foreign_keys.iter().filter(|fk| !fk.skip_sql)
    }
}

impl Domain {
    pub fn new(logical_type: LogicalType) -> Self {
        Self {
            logical_type,
            size: None,
            scale: None,
            default: None,
            sql_type: None,
        }
    }
}

impl Column {
    pub fn new(name: impl Into<String>, logical_type: LogicalType) -> Self {
        Self {
            name: name.into(),
            domain: Domain::new(logical_type),
            not_null: false,
            primary_key: false,
            auto_increment: false,
            description: None,
            vendor: Vec::new(),
        }
    }

    pub fn size(mut self, size: u32) -> Self {
        self.domain.size = Some(size);
        self
    }

    pub fn scale(mut self, scale: u32) -> Self {
        self.domain.scale = Some(scale);
        self
    }

    pub fn not_null(mut self) -> Self {
        self.not_null = true;
        self
    }

    /// Primary-key columns are always NOT NULL.
    pub fn primary_key(mut self) -> Self {
        self.primary_key = true;
        self.not_null = true;
        self
    }

    pub fn auto_increment(mut self) -> Self {
        self.auto_increment = true;
        self
    }

    pub fn default(mut self, value: DefaultValue) -> Self {
        self.domain.default = Some(value);
        self
    }

    pub fn sql_type(mut self, native: impl Into<String>) -> Self {
        self.domain.sql_type = Some(native.into());
        self
    }

    pub fn description(mut self, text: impl Into<String>) -> Self {
        self.description = Some(text.into());
        self
    }

    pub fn vendor(mut self, info: VendorInfo) -> Self {
        self.vendor.push(info);
        self
    }

    pub fn is_not_null(&self) -> bool {
        self.not_null || self.primary_key
    }
}

impl Index {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn column(mut self, name: impl Into<String>) -> Self {
        self.columns.push(IndexColumn {
            name: name.into(),
            size: None,
        });
        self
    }

    /// Add a column indexed on its first `size` characters.
    pub fn column_prefix(mut self, name: impl Into<String>, size: u32) -> Self {
        self.columns.push(IndexColumn {
            name: name.into(),
            size: Some(size),
        });
        self
    }

    pub fn unique(mut self) -> Self {
        self.unique = true;
        self
    }

    pub fn vendor(mut self, info: VendorInfo) -> Self {
        self.vendor.push(info);
        self
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }
}

impl ForeignKey {
    pub fn new(foreign_table: impl Into<String>) -> Self {
        Self {
            name: None,
            foreign_table: foreign_table.into(),
            references: Vec::new(),
            on_delete: None,
            on_update: None,
            skip_sql: false,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn reference(mut self, local: impl Into<String>, foreign: impl Into<String>) -> Self {
        self.references.push(Reference {
            local: local.into(),
            foreign: foreign.into(),
        });
        self
    }

    pub fn on_delete(mut self, action: FkAction) -> Self {
        self.on_delete = Some(action);
        self
    }

    pub fn on_update(mut self, action: FkAction) -> Self {
        self.on_update = Some(action);
        self
    }

    pub fn skip_sql(mut self) -> Self {
        self.skip_sql = true;
        self
    }

    pub fn local_columns(&self) -> Vec<&str> {
        self.references.iter().map(|r| r.local.as_str()).collect()
    }

    pub fn foreign_columns(&self) -> Vec<&str> {
        self.references.iter().map(|r| r.foreign.as_str()).collect()
    }
}

impl VendorInfo {
    pub fn new(dialect: impl Into<String>) -> Self {
        Self {
            dialect: dialect.into(),
            parameters: BTreeMap::new(),
        }
    }

    pub fn parameter(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_parameter(name, value);
        self
    }

    pub fn set_parameter(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.parameters.insert(name.into(), value.into());
    }

    /// Case-insensitive parameter lookup.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.parameters
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Flat serde shape of a column: the type may be written as shorthand
/// (`"DOUBLE(3,2)"`) with explicit `size`/`scale` taking precedence.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ColumnRepr {
    name: String,
    #[serde(rename = "type")]
    type_spec: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    size: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    scale: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    default: Option<DefaultValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    sql_type: Option<String>,
    #[serde(default)]
    not_null: bool,
    #[serde(default)]
    primary_key: bool,
    #[serde(default)]
    auto_increment: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    vendor: Vec<VendorInfo>,
}

impl TryFrom<ColumnRepr> for Column {
    type Error = DdlError;

    fn try_from(repr: ColumnRepr) -> Result<Self, Self::Error> {
        let spec = parse_type_spec(&repr.type_spec)?;
        Ok(Column {
            name: repr.name,
            domain: Domain {
                logical_type: spec.logical_type,
                size: repr.size.or(spec.size),
                scale: repr.scale.or(spec.scale),
                default: repr.default,
                sql_type: repr.sql_type,
            },
            not_null: repr.not_null || repr.primary_key,
            primary_key: repr.primary_key,
            auto_increment: repr.auto_increment,
            description: repr.description,
            vendor: repr.vendor,
        })
    }
}

impl From<Column> for ColumnRepr {
    fn from(col: Column) -> Self {
        ColumnRepr {
            name: col.name,
            type_spec: col.domain.logical_type.name().to_string(),
            size: col.domain.size,
            scale: col.domain.scale,
            default: col.domain.default,
            sql_type: col.domain.sql_type,
            not_null: col.not_null,
            primary_key: col.primary_key,
            auto_increment: col.auto_increment,
            description: col.description,
            vendor: col.vendor,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_table_builder() {
        let table = Table::new("foo")
            .column(Column::new("foo", LogicalType::Integer).primary_key())
            .column(Column::new("baz", LogicalType::Varchar).size(255))
            .column(Column::new("bar", LogicalType::Integer).primary_key());

        let pk: Vec<&str> = table.primary_key().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(pk, vec!["foo", "bar"]);
        assert!(table.column_named("baz").is_some());
        assert!(table.column_named("qux").is_none());
    }

    #[test]
    fn test_primary_key_implies_not_null() {
        let col = Column::new("id", LogicalType::Integer).primary_key();
        assert!(col.not_null);
        assert!(col.is_not_null());
    }

    #[test]
    fn test_vendor_lookup_is_case_insensitive() {
        let info = VendorInfo::new("mysql").parameter("Charset", "utf8");
        assert_eq!(info.get("charset"), Some("utf8"));
        assert_eq!(info.get("CHARSET"), Some("utf8"));
        assert_eq!(info.get("Collate"), None);
    }

    #[test]
    fn test_skip_sql_tables_are_filtered() {
        let db = Database::new("test")
            .table(Table::new("a"))
            .table(Table::new("b").skip_sql())
            .table(Table::new("c"));
        let names: Vec<&str> = db.tables_for_sql().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["a", "c"]);
        assert!(db.table_named("b").is_some());

        let reversed: Vec<&str> = db.tables_for_sql().rev().map(|t| t.name.as_str()).collect();
        assert_eq!(reversed, vec!["c", "a"]);
    }

    #[test]
    fn test_table_ref() {
        let db = Database::new("test")
            .table(Table::new("a").column(Column::new("id", LogicalType::Integer)))
            .table(Table::new("b").skip_sql());
        let a = db.table_ref("a").unwrap();
        assert_eq!(a.name, "a");
        assert!(a.has_column("id"));
        assert!(std::ptr::eq(a.database, &db));
        assert!(db.table_ref("nope").is_none());
        assert_eq!(db.table_refs_for_sql().count(), 1);
    }

    #[test]
    fn test_deserialize_column_shorthand() {
        let json = r#"{
            "name": "price",
            "type": "DOUBLE(3,2)",
            "not_null": true,
            "default": { "literal": "123" }
        }"#;
        let col: Column = serde_json::from_str(json).unwrap();
        assert_eq!(col.domain.logical_type, LogicalType::Double);
        assert_eq!(col.domain.size, Some(3));
        assert_eq!(col.domain.scale, Some(2));
        assert_eq!(col.domain.default, Some(DefaultValue::Literal("123".into())));
        assert!(col.not_null);
    }

    #[test]
    fn test_deserialize_unknown_type_fails() {
        let json = r#"{ "name": "shape", "type": "GEOMETRY" }"#;
        let err = serde_json::from_str::<Column>(json).unwrap_err();
        assert!(err.to_string().contains("GEOMETRY"));
    }

    #[test]
    fn test_deserialize_database_toml() {
        let src = r#"
            name = "bookstore"

            [[tables]]
            name = "author"
            id_method = "native"

            [[tables.columns]]
            name = "id"
            type = "INTEGER"
            primary_key = true
            auto_increment = true

            [[tables.vendor]]
            type = "mysql"
            parameters = { Engine = "MyISAM" }
        "#;
        let db: Database = toml::from_str(src).unwrap();
        let author = db.table_named("author").unwrap();
        assert_eq!(author.id_method, IdMethod::Native);
        assert!(author.columns[0].is_not_null());
        assert_eq!(author.vendor[0].get("engine"), Some("MyISAM"));
    }
}
