//! Vendor Extension Resolver
//!
//! Looks up dialect-scoped parameters on tables, columns and indices.
//! Keys are case-insensitive and a few conventional spellings are
//! synonyms; within a group the earlier spelling wins.

use crate::model::VendorInfo;

const SYNONYMS: &[&[&str]] = &[
    &["Charset", "Character set", "CHARACTER SET"],
    &["Collation", "Collate"],
    &["Type", "Engine"],
    &["DelayKeyWrite", "Delay_key_write", "DELAY_KEY_WRITE"],
    &["PackKeys", "Pack_Keys"],
];

fn synonyms(key: &str) -> Vec<&str> {
    SYNONYMS
        .iter()
        .find(|group| group.iter().any(|k| k.eq_ignore_ascii_case(key)))
        .map(|group| group.to_vec())
        .unwrap_or_else(|| vec![key])
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VendorResolver<'a> {
    dialect: &'a str,
}

impl<'a> VendorResolver<'a> {
    pub fn new(dialect: &'a str) -> Self {
        Self { dialect }
    }

    /// The vendor info for this dialect, if the entity carries one.
    pub fn info<'v>(&self, infos: &'v [VendorInfo]) -> Option<&'v VendorInfo> {
        infos
            .iter()
            .find(|info| info.dialect.eq_ignore_ascii_case(self.dialect))
    }

    pub fn param<'v>(&self, infos: &'v [VendorInfo], key: &str) -> Option<&'v str> {
        let info = self.info(infos)?;
        synonyms(key).into_iter().find_map(|k| info.get(k))
    }

    /// Parameter value, or the platform-wide fallback.
    pub fn param_for<'v>(&self, infos: &'v [VendorInfo], key: &str, fallback: &'v str) -> &'v str {
        self.param(infos, key).unwrap_or(fallback)
    }

    /// Overlay `inner` parameters (a table) on `outer` ones (its database).
    pub fn merged(&self, outer: &[VendorInfo], inner: &[VendorInfo]) -> VendorInfo {
        let mut merged = self
            .info(outer)
            .cloned()
            .unwrap_or_else(|| VendorInfo::new(self.dialect));
        if let Some(info) = self.info(inner) {
            for (key, value) in &info.parameters {
                merged.parameters.retain(|k, _| !k.eq_ignore_ascii_case(key));
                merged.set_parameter(key.clone(), value.clone());
            }
        }
        merged
    }
}
