//! Default Value Formatter
//!
//! Renders column defaults as dialect literals.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime, Timelike};

use crate::model::{DefaultValue, Domain, LogicalType};

/// How embedded quotes are escaped inside string literals.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StringEscape {
    /// `\'` and `\\`
    Backslash,
    /// `''`
    DoubledQuote,
}

/// How boolean literals are spelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BooleanStyle {
    /// `1` / `0`
    Numeric,
    /// `TRUE` / `FALSE`
    Keyword,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DefaultValueFormatter {
    escape: StringEscape,
    booleans: BooleanStyle,
}

impl DefaultValueFormatter {
    pub const fn new(escape: StringEscape, booleans: BooleanStyle) -> Self {
        Self { escape, booleans }
    }

    /// Single-quoted, escaped string literal.
    pub fn quote(&self, text: &str) -> String {
        let escaped = match self.escape {
            StringEscape::Backslash => text.replace('\\', "\\\\").replace('\'', "\\'"),
            StringEscape::DoubledQuote => text.replace('\'', "''"),
        };
        format!("'{}'", escaped)
    }

    pub fn boolean(&self, value: &str) -> String {
        let truthy = matches!(
            value.trim().to_ascii_lowercase().as_str(),
            "true" | "t" | "1" | "y" | "yes" | "on"
        );
        match (self.booleans, truthy) {
            (BooleanStyle::Numeric, true) => "1".to_string(),
            (BooleanStyle::Numeric, false) => "0".to_string(),
            (BooleanStyle::Keyword, true) => "TRUE".to_string(),
            (BooleanStyle::Keyword, false) => "FALSE".to_string(),
        }
    }

    /// The literal for a default, typed by the column's logical type.
    pub fn literal(&self, domain: &Domain, value: &DefaultValue) -> String {
        match value {
            DefaultValue::Null => "NULL".to_string(),
            DefaultValue::Expression(expr) => expr.clone(),
            DefaultValue::Literal(raw) => {
                let logical = domain.logical_type;
                if logical.is_boolean() {
                    self.boolean(raw)
                } else if logical.is_temporal() {
                    self.quote(&normalize_temporal(logical, raw))
                } else if logical.is_text() || logical.is_binary() {
                    self.quote(raw)
                } else {
                    raw.trim().to_string()
                }
            }
        }
    }

    /// `DEFAULT <literal>`, or `None` when the domain has no default.
    pub fn clause(&self, domain: &Domain) -> Option<String> {
        domain
            .default
            .as_ref()
            .map(|value| format!("DEFAULT {}", self.literal(domain, value)))
    }

    /// ` DEFAULT <literal>` with its leading space, or an empty string.
    pub fn format_default(&self, domain: &Domain) -> String {
        self.clause(domain)
            .map(|clause| format!(" {}", clause))
            .unwrap_or_default()
    }
}

fn normalize_temporal(logical: LogicalType, raw: &str) -> String {
    let value = raw.trim();
    let normalized = match logical {
        LogicalType::Date => NaiveDate::parse_from_str(value, "%Y-%m-%d")
            .ok()
            .map(|d| d.format("%Y-%m-%d").to_string()),
        LogicalType::Time => ["%H:%M:%S", "%H:%M:%S%.f", "%H:%M"]
            .iter()
            .find_map(|fmt| NaiveTime::parse_from_str(value, fmt).ok())
            .map(|t| format_time(&t)),
        _ => parse_datetime(value).map(|dt| format!("{} {}", dt.format("%Y-%m-%d"), format_time(&dt.time()))),
    };
    normalized.unwrap_or_else(|| {
        tracing::warn!(value, logical_type = %logical, "default value is not a valid literal, quoting as-is");
        value.to_string()
    })
}

fn parse_datetime(value: &str) -> Option<NaiveDateTime> {
    [
        "%Y-%m-%d %H:%M:%S",
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%d %H:%M:%S%.f",
        "%Y-%m-%dT%H:%M:%S%.f",
    ]
    .iter()
    .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
    .or_else(|| {
        NaiveDate::parse_from_str(value, "%Y-%m-%d")
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
    })
}

fn format_time(t: &NaiveTime) -> String {
    if t.nanosecond() == 0 {
        t.format("%H:%M:%S").to_string()
    } else {
        t.format("%H:%M:%S%.f").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MYSQL: DefaultValueFormatter =
        DefaultValueFormatter::new(StringEscape::Backslash, BooleanStyle::Numeric);
    const ANSI: DefaultValueFormatter =
        DefaultValueFormatter::new(StringEscape::DoubledQuote, BooleanStyle::Keyword);

    fn domain(logical: LogicalType, default: DefaultValue) -> Domain {
        let mut domain = Domain::new(logical);
        domain.default = Some(default);
        domain
    }

    #[test]
    fn test_numeric_literal_is_unquoted() {
        let d = domain(LogicalType::Double, DefaultValue::Literal("123".into()));
        assert_eq!(MYSQL.format_default(&d), " DEFAULT 123");
    }

    #[test]
    fn test_string_literal_is_quoted_and_escaped() {
        let d = domain(LogicalType::Varchar, DefaultValue::Literal("it's".into()));
        assert_eq!(MYSQL.format_default(&d), " DEFAULT 'it\\'s'");
        assert_eq!(ANSI.format_default(&d), " DEFAULT 'it''s'");
    }

    #[test]
    fn test_boolean_literal() {
        let d = domain(LogicalType::Boolean, DefaultValue::Literal("true".into()));
        assert_eq!(MYSQL.format_default(&d), " DEFAULT 1");
        assert_eq!(ANSI.format_default(&d), " DEFAULT TRUE");
        let d = domain(LogicalType::Boolean, DefaultValue::Literal("no".into()));
        assert_eq!(ANSI.format_default(&d), " DEFAULT FALSE");
    }

    #[test]
    fn test_expression_is_verbatim() {
        let d = domain(LogicalType::Timestamp, DefaultValue::Expression("CURRENT_TIMESTAMP".into()));
        assert_eq!(MYSQL.format_default(&d), " DEFAULT CURRENT_TIMESTAMP");
    }

    #[test]
    fn test_null_and_absent_are_distinct() {
        let d = domain(LogicalType::Integer, DefaultValue::Null);
        assert_eq!(MYSQL.format_default(&d), " DEFAULT NULL");
        assert_eq!(MYSQL.format_default(&Domain::new(LogicalType::Integer)), "");
        assert_eq!(MYSQL.clause(&Domain::new(LogicalType::Integer)), None);
    }

    #[test]
    fn test_temporal_literals_are_normalized() {
        let d = domain(LogicalType::Timestamp, DefaultValue::Literal("2024-01-05T10:00:00".into()));
        assert_eq!(MYSQL.format_default(&d), " DEFAULT '2024-01-05 10:00:00'");

        let d = domain(LogicalType::Date, DefaultValue::Literal("2024-01-05".into()));
        assert_eq!(ANSI.format_default(&d), " DEFAULT '2024-01-05'");

        let d = domain(LogicalType::Time, DefaultValue::Literal("09:30".into()));
        assert_eq!(ANSI.format_default(&d), " DEFAULT '09:30:00'");

        let d = domain(LogicalType::Date, DefaultValue::Literal("yesterday".into()));
        assert_eq!(ANSI.format_default(&d), " DEFAULT 'yesterday'");
    }
}
