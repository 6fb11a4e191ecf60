//! DDL Assembler
//!
//! Statement builders shared by the default [`Platform`] methods. Every
//! function is generic over the platform so that dialect overrides of the
//! smaller hooks (quoting, column clauses, index clauses) flow through the
//! assembled statements.

use std::borrow::Cow;

use tracing::{debug, warn};

use super::{NameKind, Platform};
use crate::config::ForeignKeyChecks;
use crate::error::{DdlError, DdlResult};
use crate::model::{Column, Database, ForeignKey, IdMethod, Index, Table, TableRef};

const BANNER_WIDTH: usize = 71;

/// An index as rendered: declared on the table or synthesized to back a
/// foreign key, with its resolved name.
#[derive(Debug, Clone)]
pub struct ResolvedIndex<'a> {
    pub index: Cow<'a, Index>,
    pub name: String,
    pub kind: NameKind,
}

/// Indices and foreign keys of one table with their resolved names.
#[derive(Debug, Clone)]
pub struct TableLayout<'a> {
    pub table: &'a Table,
    /// Declared indices in order, then synthesized foreign-key indices.
    pub indices: Vec<ResolvedIndex<'a>>,
    pub foreign_keys: Vec<(&'a ForeignKey, String)>,
}

impl<'a> TableLayout<'a> {
    /// The resolved entry for an index of this table. Identity is checked
    /// first so that two identical unnamed indices stay distinguishable.
    pub fn find_index(&self, index: &Index) -> DdlResult<&ResolvedIndex<'a>> {
        self.indices
            .iter()
            .find(|r| matches!(&r.index, Cow::Borrowed(i) if std::ptr::eq(*i, index)))
            .or_else(|| self.indices.iter().find(|r| &*r.index == index))
            .ok_or_else(|| DdlError::reference(&self.table.name, "index is not declared on this table"))
    }

    pub fn find_foreign_key(&self, fk: &ForeignKey) -> DdlResult<&str> {
        self.foreign_keys
            .iter()
            .find(|(candidate, _)| std::ptr::eq(*candidate, fk))
            .or_else(|| self.foreign_keys.iter().find(|(candidate, _)| *candidate == fk))
            .map(|(_, name)| name.as_str())
            .ok_or_else(|| DdlError::reference(&self.table.name, "foreign key is not declared on this table"))
    }

    /// Foreign keys that take part in generated scripts.
    pub fn foreign_keys_for_sql(&self) -> impl Iterator<Item = &(&'a ForeignKey, String)> {
        self.foreign_keys.iter().filter(|(fk, _)| !fk.skip_sql)
    }
}

/// Validate a table's local references and resolve every index and
/// foreign key name.
pub fn layout<'a, P: Platform + ?Sized>(platform: &P, table: &'a Table) -> DdlResult<TableLayout<'a>> {
    validate_columns(table)?;

    let mut entries: Vec<(Cow<'a, Index>, NameKind)> = table
        .indices
        .iter()
        .map(|index| {
            let kind = if index.unique { NameKind::Unique } else { NameKind::Index };
            (Cow::Borrowed(index), kind)
        })
        .collect();

    if platform.indexes_foreign_keys() {
        let primary_key: Vec<&str> = table.primary_key().iter().map(|c| c.name.as_str()).collect();
        for fk in table.foreign_keys_for_sql() {
            let locals = fk.local_columns();
            let covered = is_leftmost_prefix(&locals, &primary_key)
                || entries.iter().any(|(index, _)| {
                    let columns: Vec<&str> = index.column_names().collect();
                    is_leftmost_prefix(&locals, &columns)
                });
            if !covered {
                let index = locals.iter().fold(Index::new(), |index, column| index.column(*column));
                entries.push((Cow::Owned(index), NameKind::ForeignKeyIndex));
            }
        }
    }

    let requests: Vec<(Option<&str>, NameKind)> = entries
        .iter()
        .map(|(index, kind)| (index.name.as_deref(), *kind))
        .collect();
    let names = platform.identifiers().name_indices(&table.name, &requests)?;
    let indices = entries
        .into_iter()
        .zip(names)
        .map(|((index, kind), name)| ResolvedIndex { index, name, kind })
        .collect();

    let fk_names = platform.identifiers().name_foreign_keys(table)?;
    let foreign_keys = table.foreign_keys.iter().zip(fk_names).collect();

    Ok(TableLayout {
        table,
        indices,
        foreign_keys,
    })
}

fn is_leftmost_prefix(prefix: &[&str], columns: &[&str]) -> bool {
    columns.len() >= prefix.len() && columns[..prefix.len()] == *prefix
}

/// Index and foreign key columns must exist on the table, and neither may
/// be empty.
fn validate_columns(table: &Table) -> DdlResult<()> {
    for index in &table.indices {
        if index.columns.is_empty() {
            let label = index.name.as_deref().unwrap_or("unnamed");
            return Err(DdlError::reference(
                &table.name,
                format!("index '{}' has no columns", label),
            ));
        }
        if let Some(missing) = index.column_names().find(|c| !table.has_column(c)) {
            return Err(DdlError::reference(
                &table.name,
                format!("index column '{}' does not exist", missing),
            ));
        }
    }
    for fk in &table.foreign_keys {
        if fk.references.is_empty() {
            return Err(DdlError::reference(
                &table.name,
                format!("foreign key to '{}' has no column references", fk.foreign_table),
            ));
        }
        if let Some(missing) = fk.local_columns().into_iter().find(|c| !table.has_column(c)) {
            return Err(DdlError::reference(
                &table.name,
                format!("foreign key column '{}' does not exist", missing),
            ));
        }
    }
    Ok(())
}

/// Foreign key targets must exist in the database.
pub fn validate_references(database: &Database, table: &Table) -> DdlResult<()> {
    table
        .foreign_keys_for_sql()
        .try_for_each(|fk| validate_foreign_key(database, table, fk))
}

fn validate_foreign_key(database: &Database, table: &Table, fk: &ForeignKey) -> DdlResult<()> {
    let target = database.table_named(&fk.foreign_table).ok_or_else(|| {
        DdlError::reference(
            &table.name,
            format!("foreign table '{}' does not exist", fk.foreign_table),
        )
    })?;
    if let Some(missing) = fk.foreign_columns().into_iter().find(|c| !target.has_column(c)) {
        return Err(DdlError::reference(
            &table.name,
            format!("foreign column '{}.{}' does not exist", target.name, missing),
        ));
    }
    Ok(())
}

/// Resolved name of one foreign key after checking its target, or `None`
/// when the platform renders no constraints for the table.
pub fn foreign_key_name<P: Platform + ?Sized>(
    platform: &P,
    table: TableRef<'_>,
    fk: &ForeignKey,
) -> DdlResult<Option<String>> {
    let layout = layout(platform, table.table)?;
    let name = layout.find_foreign_key(fk)?.to_string();
    if !fk.skip_sql {
        validate_foreign_key(table.database, table.table, fk)?;
    }
    Ok(platform.supports_foreign_keys(table).then_some(name))
}

/// Section header written before each table of a script.
pub fn banner(title: &str) -> String {
    let rule = "-".repeat(BANNER_WIDTH);
    format!("\n{}\n-- {}\n{}\n", rule, title, rule)
}

pub fn add_tables<P: Platform + ?Sized>(platform: &P, database: &Database) -> DdlResult<String> {
    let tables: Vec<TableRef<'_>> = database.table_refs_for_sql().collect();
    for table in &tables {
        validate_references(database, table)?;
    }

    let toggle = match platform.foreign_key_checks() {
        ForeignKeyChecks::Always => true,
        ForeignKeyChecks::WhenForeignKeysPresent => tables.iter().any(|table| {
            platform.supports_foreign_keys(*table) && table.foreign_keys_for_sql().next().is_some()
        }),
        ForeignKeyChecks::Never => false,
    };

    let mut script = String::new();
    if toggle {
        script.push_str(&platform.begin_ddl());
    }
    for table in &tables {
        script.push_str(&banner(&table.name));
        script.push_str(&platform.drop_table_ddl(table));
        script.push_str(&platform.add_table_ddl(*table)?);
        if !platform.inline_constraints() {
            script.push_str(&platform.add_indices_ddl(table)?);
        }
    }
    if !platform.inline_constraints() {
        for table in &tables {
            script.push_str(&platform.add_foreign_keys_ddl(*table)?);
        }
    }
    if toggle {
        script.push_str(&platform.end_ddl());
    }

    debug!(
        database = %database.name,
        dialect = %platform.dialect(),
        tables = tables.len(),
        "generated DDL script"
    );
    Ok(script)
}

pub fn add_table<P: Platform + ?Sized>(platform: &P, table_ref: TableRef<'_>) -> DdlResult<String> {
    let table = table_ref.table;
    validate_references(table_ref.database, table)?;
    let layout = layout(platform, table)?;

    let mut lines = Vec::with_capacity(table.columns.len() + 1);
    for column in &table.columns {
        lines.push(platform.column_ddl_in(Some(table), column)?);
    }
    if table.has_primary_key() {
        lines.push(platform.primary_key_ddl(table));
    }
    if platform.inline_constraints() {
        for resolved in &layout.indices {
            lines.push(if resolved.index.unique {
                platform.unique_clause(&resolved.index, &resolved.name)
            } else {
                platform.index_clause(&resolved.index, &resolved.name)
            });
        }
        if platform.supports_foreign_keys(table_ref) {
            for (fk, name) in layout.foreign_keys_for_sql() {
                lines.push(foreign_key(platform, fk, name).replace('\n', "\n\t"));
            }
        }
    }

    debug!(table = %table.name, dialect = %platform.dialect(), "generating CREATE TABLE");
    Ok(format!(
        "\n{}CREATE TABLE {}\n(\n\t{}\n){};\n",
        platform.table_prefix(table),
        platform.quote_identifier(&table.name),
        lines.join(",\n\t"),
        platform.table_suffix(table_ref)
    ))
}

/// `name type [DEFAULT x] [NOT NULL] [AUTO_INCREMENT]`
pub fn column<P: Platform + ?Sized>(platform: &P, table: Option<&Table>, column: &Column) -> DdlResult<String> {
    let mut parts = vec![
        platform.quote_identifier(&column.name),
        platform.column_type(table, column)?,
    ];
    if let Some(default) = platform.column_default(table, column) {
        parts.push(default);
    }
    if column.is_not_null() {
        parts.push("NOT NULL".to_string());
    }
    if let Some(keyword) = auto_increment_keyword(platform, table, column) {
        parts.push(keyword.to_string());
    }
    Ok(parts.join(" "))
}

/// The platform's auto-increment keyword when the column asks for one and
/// its table (if known) generates ids natively.
pub fn auto_increment_keyword<'p, P: Platform + ?Sized>(
    platform: &'p P,
    table: Option<&Table>,
    column: &Column,
) -> Option<&'p str> {
    if !column.auto_increment {
        return None;
    }
    let keyword = platform.auto_increment_keyword()?;
    match table {
        Some(table) if table.id_method != IdMethod::Native => {
            warn!(
                table = %table.name,
                column = %column.name,
                "auto-increment dropped: table id method is not native"
            );
            None
        }
        _ => Some(keyword),
    }
}

/// Comma-separated quoted column names.
pub fn column_list<'c, P: Platform + ?Sized>(platform: &P, names: impl IntoIterator<Item = &'c str>) -> String {
    names
        .into_iter()
        .map(|name| platform.quote_identifier(name))
        .collect::<Vec<_>>()
        .join(",")
}

/// Quoted index columns with their prefix lengths.
pub fn index_columns<P: Platform + ?Sized>(platform: &P, index: &Index, separator: &str) -> String {
    index
        .columns
        .iter()
        .map(|column| match column.size {
            Some(size) => format!("{}({})", platform.quote_identifier(&column.name), size),
            None => platform.quote_identifier(&column.name),
        })
        .collect::<Vec<_>>()
        .join(separator)
}

pub fn primary_key<P: Platform + ?Sized>(platform: &P, table: &Table) -> String {
    let columns = table.primary_key();
    if columns.is_empty() {
        return String::new();
    }
    format!(
        "PRIMARY KEY ({})",
        column_list(platform, columns.iter().map(|c| c.name.as_str()))
    )
}

pub fn inline_index<P: Platform + ?Sized>(platform: &P, index: &Index, name: &str) -> String {
    let kind = platform
        .vendor()
        .param(&index.vendor, "Index_type")
        .map(|kind| format!("{} ", kind))
        .unwrap_or_default();
    format!(
        "{}INDEX {} ({})",
        kind,
        platform.quote_identifier(name),
        index_columns(platform, index, ", ")
    )
}

pub fn create_index<P: Platform + ?Sized>(platform: &P, table: &Table, index: &Index, name: &str) -> String {
    debug!(table = %table.name, index = name, "generating CREATE INDEX");
    format!(
        "\nCREATE {}INDEX {} ON {} ({});\n",
        platform.index_type(index),
        platform.quote_identifier(name),
        platform.quote_identifier(&table.name),
        index_columns(platform, index, ",")
    )
}

pub fn add_indices<P: Platform + ?Sized>(platform: &P, table: &Table) -> DdlResult<String> {
    let layout = layout(platform, table)?;
    Ok(layout
        .indices
        .iter()
        .map(|resolved| create_index(platform, table, &resolved.index, &resolved.name))
        .collect())
}

/// `CONSTRAINT n FOREIGN KEY (..) REFERENCES t (..) [ON DELETE a] [ON UPDATE a]`,
/// one clause per line.
pub fn foreign_key<P: Platform + ?Sized>(platform: &P, fk: &ForeignKey, name: &str) -> String {
    let mut sql = format!(
        "CONSTRAINT {}\n\tFOREIGN KEY ({})\n\tREFERENCES {} ({})",
        platform.quote_identifier(name),
        column_list(platform, fk.local_columns()),
        platform.quote_identifier(&fk.foreign_table),
        column_list(platform, fk.foreign_columns())
    );
    if let Some(action) = fk.on_delete {
        sql.push_str("\n\tON DELETE ");
        sql.push_str(action.as_sql());
    }
    if let Some(action) = fk.on_update {
        sql.push_str("\n\tON UPDATE ");
        sql.push_str(action.as_sql());
    }
    sql
}

pub fn alter_add_foreign_key<P: Platform + ?Sized>(platform: &P, table: &Table, fk: &ForeignKey, name: &str) -> String {
    debug!(table = %table.name, foreign_key = name, "generating ADD CONSTRAINT");
    format!(
        "\nALTER TABLE {} ADD {};\n",
        platform.quote_identifier(&table.name),
        foreign_key(platform, fk, name)
    )
}

pub fn add_foreign_keys<P: Platform + ?Sized>(platform: &P, table_ref: TableRef<'_>) -> DdlResult<String> {
    let table = table_ref.table;
    validate_references(table_ref.database, table)?;
    let layout = layout(platform, table)?;
    if !platform.supports_foreign_keys(table_ref) {
        return Ok(String::new());
    }
    Ok(layout
        .foreign_keys_for_sql()
        .map(|(fk, name)| alter_add_foreign_key(platform, table, fk, name))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::LogicalType;
    use crate::platform::{GenericPlatform, MysqlPlatform};

    fn book() -> Table {
        Table::new("book")
            .id_method(IdMethod::Native)
            .column(Column::new("id", LogicalType::Integer).primary_key().auto_increment())
            .column(Column::new("title", LogicalType::Varchar).not_null())
            .column(Column::new("author_id", LogicalType::Integer))
            .index(Index::new().column("title"))
            .foreign_key(ForeignKey::new("author").reference("author_id", "id"))
    }

    #[test]
    fn test_banner() {
        let banner = banner("book");
        let lines: Vec<&str> = banner.lines().collect();
        assert_eq!(lines[0], "");
        assert_eq!(lines[1].len(), BANNER_WIDTH);
        assert_eq!(lines[2], "-- book");
        assert_eq!(lines[1], lines[3]);
    }

    #[test]
    fn test_layout_synthesizes_foreign_key_index() {
        let table = book();
        let layout = layout(&MysqlPlatform::new(), &table).unwrap();
        let names: Vec<&str> = layout.indices.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["book_I_1", "book_FI_1"]);
        assert!(matches!(layout.indices[1].index, Cow::Owned(_)));
        assert_eq!(layout.foreign_keys[0].1, "book_FK_1");
    }

    #[test]
    fn test_layout_without_foreign_key_indices() {
        let table = book();
        let layout = layout(&GenericPlatform::new(), &table).unwrap();
        assert_eq!(layout.indices.len(), 1);
    }

    #[test]
    fn test_covered_foreign_key_gets_no_index() {
        let by_pk = Table::new("book_author")
            .column(Column::new("book_id", LogicalType::Integer).primary_key())
            .column(Column::new("author_id", LogicalType::Integer).primary_key())
            .foreign_key(ForeignKey::new("book").reference("book_id", "id"));
        assert!(layout(&MysqlPlatform::new(), &by_pk).unwrap().indices.is_empty());

        let by_index = Table::new("book")
            .column(Column::new("author_id", LogicalType::Integer))
            .column(Column::new("title", LogicalType::Varchar))
            .index(Index::new().column("author_id").column("title"))
            .foreign_key(ForeignKey::new("author").reference("author_id", "id"));
        assert_eq!(layout(&MysqlPlatform::new(), &by_index).unwrap().indices.len(), 1);

        // second column of a composite key is not a leftmost prefix
        let not_leftmost = Table::new("book")
            .column(Column::new("title", LogicalType::Varchar))
            .column(Column::new("author_id", LogicalType::Integer))
            .index(Index::new().column("title").column("author_id"))
            .foreign_key(ForeignKey::new("author").reference("author_id", "id"));
        assert_eq!(layout(&MysqlPlatform::new(), &not_leftmost).unwrap().indices.len(), 2);
    }

    #[test]
    fn test_missing_local_columns() {
        let table = Table::new("foo").index(Index::new().column("nope"));
        let err = layout(&GenericPlatform::new(), &table).unwrap_err();
        assert!(matches!(err, DdlError::InvalidSchemaReference { ref message, .. } if message.contains("nope")));

        let table = Table::new("foo").foreign_key(ForeignKey::new("bar").reference("bar_id", "id"));
        assert!(layout(&GenericPlatform::new(), &table).is_err());
    }

    #[test]
    fn test_empty_index_and_foreign_key() {
        let table = Table::new("foo")
            .column(Column::new("a", LogicalType::Integer))
            .index(Index::named("nothing"));
        let err = layout(&GenericPlatform::new(), &table).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid schema reference in table 'foo': index 'nothing' has no columns"
        );

        let table = Table::new("foo")
            .column(Column::new("a", LogicalType::Integer))
            .foreign_key(ForeignKey::new("bar"));
        let err = layout(&MysqlPlatform::new(), &table).unwrap_err();
        assert!(err.to_string().contains("foreign key to 'bar' has no column references"));
    }

    #[test]
    fn test_foreign_key_name() {
        let db = Database::new("test")
            .table(book())
            .table(Table::new("author").column(Column::new("id", LogicalType::Integer)));
        let table = db.table_ref("book").unwrap();
        let fk = &table.foreign_keys[0];
        assert_eq!(
            foreign_key_name(&GenericPlatform::new(), table, fk).unwrap().as_deref(),
            Some("book_FK_1")
        );

        let db = Database::new("test")
            .vendor(crate::model::VendorInfo::new("mysql").parameter("Engine", "MyISAM"))
            .table(book())
            .table(Table::new("author").column(Column::new("id", LogicalType::Integer)));
        let table = db.table_ref("book").unwrap();
        assert_eq!(foreign_key_name(&MysqlPlatform::new(), table, &table.foreign_keys[0]).unwrap(), None);

        let db = Database::new("test").table(book());
        let table = db.table_ref("book").unwrap();
        assert!(foreign_key_name(&GenericPlatform::new(), table, &table.foreign_keys[0]).is_err());
    }

    #[test]
    fn test_validate_references() {
        let db = Database::new("test")
            .table(book())
            .table(Table::new("author").column(Column::new("uuid", LogicalType::Char)));
        let err = validate_references(&db, &db.tables[0]).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid schema reference in table 'book': foreign column 'author.id' does not exist"
        );

        let db = Database::new("test").table(book());
        let err = validate_references(&db, &db.tables[0]).unwrap_err();
        assert!(err.to_string().contains("foreign table 'author'"));
    }

    #[test]
    fn test_find_index_of_another_table() {
        let table = book();
        let other = Index::named("elsewhere").column("title");
        let layout = layout(&GenericPlatform::new(), &table).unwrap();
        assert!(layout.find_index(&table.indices[0]).is_ok());
        assert!(matches!(
            layout.find_index(&other),
            Err(DdlError::InvalidSchemaReference { .. })
        ));
    }

    #[test]
    fn test_identical_unnamed_indices_resolve_by_identity() {
        let table = Table::new("foo")
            .column(Column::new("bar", LogicalType::Integer))
            .index(Index::new().column("bar"))
            .index(Index::new().column("bar"));
        let layout = layout(&GenericPlatform::new(), &table).unwrap();
        assert_eq!(layout.find_index(&table.indices[0]).unwrap().name, "foo_I_1");
        assert_eq!(layout.find_index(&table.indices[1]).unwrap().name, "foo_I_2");
    }

    #[test]
    fn test_auto_increment_needs_native_id_method() {
        let platform = MysqlPlatform::new();
        let column = Column::new("id", LogicalType::Integer).auto_increment();
        assert_eq!(auto_increment_keyword(&platform, None, &column), Some("AUTO_INCREMENT"));

        let native = Table::new("foo").id_method(IdMethod::Native);
        assert_eq!(auto_increment_keyword(&platform, Some(&native), &column), Some("AUTO_INCREMENT"));

        let none = Table::new("foo");
        assert_eq!(auto_increment_keyword(&platform, Some(&none), &column), None);
    }
}
