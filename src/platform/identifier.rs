//! Identifier Policy
//!
//! Deterministic names for indices, foreign keys and sequences, shortening
//! of over-long identifiers, and quoting.

use std::collections::HashSet;

use sha2::{Digest, Sha256};

use crate::error::{DdlError, DdlResult};
use crate::model::{IdMethod, Table};

/// Hex digits of the hash suffix appended to shortened names.
const HASH_LEN: usize = 8;

/// What a derived name is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NameKind {
    Index,
    Unique,
    /// An index added to back a foreign key
    ForeignKeyIndex,
    ForeignKey,
}

impl NameKind {
    pub const fn tag(&self) -> &'static str {
        match self {
            Self::Index => "I",
            Self::Unique => "U",
            Self::ForeignKeyIndex => "FI",
            Self::ForeignKey => "FK",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentifierPolicy {
    open: String,
    close: String,
    max_length: usize,
}

impl IdentifierPolicy {
    /// `[` closes with `]`; every other quote closes with itself.
    pub fn new(quote: &str, max_length: usize) -> Self {
        let close = match quote {
            "[" => "]".to_string(),
            other => other.to_string(),
        };
        Self {
            open: quote.to_string(),
            close,
            max_length,
        }
    }

    pub fn max_length(&self) -> usize {
        self.max_length
    }

    /// Quote each dot-separated part, doubling embedded closing quotes.
    pub fn quote(&self, name: &str) -> String {
        if self.open.is_empty() {
            return name.to_string();
        }
        let escaped = format!("{}{}", self.close, self.close);
        name.split('.')
            .map(|part| format!("{}{}{}", self.open, part.replace(&self.close, &escaped), self.close))
            .collect::<Vec<_>>()
            .join(".")
    }

    /// Shorten a name over the limit to `<prefix>_<hash>`. The same input
    /// always yields the same output.
    pub fn shorten(&self, name: &str) -> String {
        if name.chars().count() <= self.max_length {
            return name.to_string();
        }
        let digest = Sha256::digest(name.as_bytes());
        let hash: String = digest.iter().map(|b| format!("{:02x}", b)).collect();
        if self.max_length <= HASH_LEN + 1 {
            return hash[..self.max_length.min(hash.len())].to_string();
        }
        let keep = self.max_length - HASH_LEN - 1;
        let prefix: String = name.chars().take(keep).collect();
        format!("{}_{}", prefix, &hash[..HASH_LEN])
    }

    /// `<table>_<kind>_<ordinal>`, shortened to the dialect limit.
    pub fn derive(&self, table: &str, kind: NameKind, ordinal: usize) -> String {
        self.shorten(&format!("{}_{}_{}", table, kind.tag(), ordinal))
    }

    /// Resolve index names. Unnamed indices are numbered per kind, counting
    /// only the unnamed ones, in the order given. Explicit names are kept
    /// unless they exceed the length limit.
    pub fn name_indices(&self, table: &str, indices: &[(Option<&str>, NameKind)]) -> DdlResult<Vec<String>> {
        let mut counters = [0usize; 3];
        let names = indices
            .iter()
            .map(|(explicit, kind)| match explicit {
                Some(name) => self.shorten(name),
                None => {
                    let slot = match kind {
                        NameKind::Index | NameKind::ForeignKey => 0,
                        NameKind::Unique => 1,
                        NameKind::ForeignKeyIndex => 2,
                    };
                    counters[slot] += 1;
                    self.derive(table, *kind, counters[slot])
                }
            })
            .collect::<Vec<_>>();
        ensure_distinct(table, &names)?;
        Ok(names)
    }

    /// Resolve foreign key names in declaration order.
    pub fn name_foreign_keys(&self, table: &Table) -> DdlResult<Vec<String>> {
        let mut ordinal = 0;
        let names = table
            .foreign_keys
            .iter()
            .map(|fk| match &fk.name {
                Some(name) => self.shorten(name),
                None => {
                    ordinal += 1;
                    self.derive(&table.name, NameKind::ForeignKey, ordinal)
                }
            })
            .collect::<Vec<_>>();
        ensure_distinct(&table.name, &names)?;
        Ok(names)
    }

    /// `<table>_SEQ` unless the table names its sequence; `None` when the
    /// id method needs no sequence.
    pub fn sequence_name(&self, table: &Table) -> Option<String> {
        if table.id_method == IdMethod::None {
            return None;
        }
        Some(match &table.id_method_parameter {
            Some(name) => name.clone(),
            None => self.shorten(&format!("{}_SEQ", table.name)),
        })
    }
}

fn ensure_distinct(table: &str, names: &[String]) -> DdlResult<()> {
    let mut seen = HashSet::new();
    for name in names {
        if !seen.insert(name.as_str()) {
            return Err(DdlError::collision(table, name.as_str()));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ForeignKey;

    #[test]
    fn test_quote() {
        let backticks = IdentifierPolicy::new("`", 64);
        assert_eq!(backticks.quote("foo"), "`foo`");
        assert_eq!(backticks.quote("we`ird"), "`we``ird`");
        assert_eq!(backticks.quote("db.foo"), "`db`.`foo`");

        let brackets = IdentifierPolicy::new("[", 128);
        assert_eq!(brackets.quote("a]b"), "[a]]b]");

        let plain = IdentifierPolicy::new("", 64);
        assert_eq!(plain.quote("foo"), "foo");
    }

    #[test]
    fn test_shorten_is_deterministic() {
        let policy = IdentifierPolicy::new("\"", 20);
        let long = "a_really_long_table_name_I_1";
        let first = policy.shorten(long);
        assert_eq!(first, policy.shorten(long));
        assert_eq!(first.chars().count(), 20);
        assert!(first.starts_with("a_really_lo_"));
        assert_eq!(policy.shorten("short_name"), "short_name");
    }

    #[test]
    fn test_shorten_distinguishes_inputs() {
        let policy = IdentifierPolicy::new("\"", 20);
        assert_ne!(
            policy.shorten("a_really_long_table_name_I_1"),
            policy.shorten("a_really_long_table_name_I_2")
        );
    }

    #[test]
    fn test_index_ordinals_per_kind() {
        let policy = IdentifierPolicy::new("`", 64);
        let names = policy
            .name_indices(
                "foo",
                &[
                    (None, NameKind::ForeignKeyIndex),
                    (Some("bar_index"), NameKind::Index),
                    (None, NameKind::Index),
                    (None, NameKind::Unique),
                    (None, NameKind::Index),
                ],
            )
            .unwrap();
        assert_eq!(names, vec!["foo_FI_1", "bar_index", "foo_I_1", "foo_U_1", "foo_I_2"]);
    }

    #[test]
    fn test_explicit_name_colliding_with_derived() {
        let policy = IdentifierPolicy::new("`", 64);
        let err = policy
            .name_indices("foo", &[(Some("foo_I_1"), NameKind::Index), (None, NameKind::Index)])
            .unwrap_err();
        assert!(matches!(err, DdlError::IdentifierCollision { ref name, .. } if name == "foo_I_1"));
    }

    #[test]
    fn test_foreign_key_names() {
        let policy = IdentifierPolicy::new("`", 64);
        let table = Table::new("foo")
            .foreign_key(ForeignKey::new("bar"))
            .foreign_key(ForeignKey::new("baz").named("foo_baz_FK"))
            .foreign_key(ForeignKey::new("qux"));
        assert_eq!(
            policy.name_foreign_keys(&table).unwrap(),
            vec!["foo_FK_1", "foo_baz_FK", "foo_FK_2"]
        );
    }

    #[test]
    fn test_long_explicit_names_are_shortened() {
        let policy = IdentifierPolicy::new("`", 64);
        let long = "x".repeat(80);
        let names = policy
            .name_indices("foo", &[(Some(long.as_str()), NameKind::Index)])
            .unwrap();
        assert_eq!(names[0].chars().count(), 64);
        assert_eq!(names[0], policy.shorten(&long));

        let table = Table::new("foo").foreign_key(ForeignKey::new("bar").named(long.as_str()));
        let fk_names = policy.name_foreign_keys(&table).unwrap();
        assert_eq!(fk_names[0].chars().count(), 64);
        assert!(fk_names[0].starts_with(&"x".repeat(55)));
    }

    #[test]
    fn test_sequence_name() {
        let policy = IdentifierPolicy::new("`", 64);
        let table = Table::new("foo").id_method(IdMethod::Native);
        assert_eq!(policy.sequence_name(&table).as_deref(), Some("foo_SEQ"));

        let table = Table::new("foo").id_method(IdMethod::Native).sequence("foo_sequence");
        assert_eq!(policy.sequence_name(&table).as_deref(), Some("foo_sequence"));

        assert_eq!(policy.sequence_name(&Table::new("foo")), None);
    }
}
