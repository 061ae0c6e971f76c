//! SQL Dialect support.
//!
//! Databases differ in how they delimit identifiers and strings, how they
//! name parameters, which native types a cast can target and how a result
//! window is expressed. The compiler asks the dialect for all of these.

mod generic;

pub use generic::GenericDialect;

use crate::model::CastType;

/// Trait for SQL dialect-specific behavior.
pub trait Dialect {
    /// Returns the name of the dialect.
    fn name(&self) -> &'static str;

    /// Returns the opening and closing identifier delimiters.
    fn identifier_delimiters(&self) -> (&'static str, &'static str) {
        ("\"", "\"")
    }

    /// Returns the opening and closing string-literal delimiters.
    fn string_delimiters(&self) -> (&'static str, &'static str) {
        ("'", "'")
    }

    /// Returns the prefix of named parameter placeholders.
    fn parameter_prefix(&self) -> &'static str {
        ":"
    }

    /// Returns the native type keyword a cast tag maps to.
    fn cast_type_name(&self, cast: CastType) -> Option<&'static str>;

    /// Renders a boolean literal.
    fn bool_literal(&self, value: bool) -> String {
        String::from(if value { "TRUE" } else { "FALSE" })
    }

    /// Renders a binary literal.
    fn binary_literal(&self, bytes: &[u8]) -> String {
        let hex: String = bytes.iter().map(|byte| format!("{byte:02X}")).collect();
        format!("X'{hex}'")
    }

    /// Renders the trailing result-window clause.
    ///
    /// Returns an empty string when neither bound is set.
    fn offset_fetch(&self, skip: Option<u64>, take: Option<u64>) -> String {
        if skip.is_none() && take.is_none() {
            return String::new();
        }
        let mut sql = format!(" OFFSET {} ROWS", skip.unwrap_or(0));
        if let Some(take) = take {
            sql.push_str(&format!(" FETCH NEXT {take} ROWS ONLY"));
        }
        sql
    }

    /// Delimits an identifier, doubling any embedded closing delimiter.
    fn quote_identifier(&self, name: &str) -> String {
        let (open, close) = self.identifier_delimiters();
        let escaped = name.replace(close, &format!("{close}{close}"));
        format!("{open}{escaped}{close}")
    }

    /// Delimits a string literal, doubling any embedded closing delimiter.
    fn quote_string(&self, value: &str) -> String {
        let (open, close) = self.string_delimiters();
        let escaped = value.replace(close, &format!("{close}{close}"));
        format!("{open}{escaped}{close}")
    }
}
