//! SQL Server dialect implementation.

use oxide_query_core::dialect::Dialect;
use oxide_query_core::model::CastType;

/// SQL Server (T-SQL) dialect.
#[derive(Debug, Default, Clone, Copy)]
pub struct MssqlDialect;

impl MssqlDialect {
    /// Creates a new SQL Server dialect.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Dialect for MssqlDialect {
    fn name(&self) -> &'static str {
        "mssql"
    }

    fn identifier_delimiters(&self) -> (&'static str, &'static str) {
        ("[", "]")
    }

    fn parameter_prefix(&self) -> &'static str {
        "@"
    }

    fn cast_type_name(&self, cast: CastType) -> Option<&'static str> {
        Some(match cast {
            CastType::Boolean => "bit",
            CastType::Byte => "tinyint",
            CastType::Char => "char",
            CastType::DateTime => "datetime",
            CastType::Double => "float",
            CastType::Decimal => "decimal",
            CastType::Guid => "uniqueidentifier",
            CastType::Int16 => "smallint",
            CastType::Int32 => "int",
            CastType::Int64 => "bigint",
            CastType::Single => "real",
            CastType::String => "nvarchar",
        })
    }

    fn bool_literal(&self, value: bool) -> String {
        String::from(if value { "1" } else { "0" }) // no boolean literal, bit instead
    }

    fn binary_literal(&self, bytes: &[u8]) -> String {
        let hex: String = bytes.iter().map(|byte| format!("{byte:02X}")).collect();
        format!("0x{hex}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use oxide_query_core::SqlValue;

    #[test]
    fn test_mssql_dialect() {
        let dialect = MssqlDialect::new();
        assert_eq!(dialect.name(), "mssql");
        assert_eq!(dialect.quote_identifier("Order Details"), "[Order Details]");
        assert_eq!(dialect.quote_identifier("a]b"), "[a]]b]");
        assert_eq!(dialect.quote_string("O'Brien"), "'O''Brien'");
        assert_eq!(dialect.parameter_prefix(), "@");
    }

    #[test]
    fn test_every_cast_type_maps() {
        let dialect = MssqlDialect::new();
        for cast in CastType::ALL {
            assert!(dialect.cast_type_name(cast).is_some(), "{cast} unmapped");
        }
        assert_eq!(dialect.cast_type_name(CastType::Guid), Some("uniqueidentifier"));
        assert_eq!(dialect.cast_type_name(CastType::Double), Some("float"));
    }

    #[test]
    fn test_inline_literals() {
        let dialect = MssqlDialect::new();
        assert_eq!(SqlValue::Bool(true).to_sql_inline(&dialect), "1");
        assert_eq!(SqlValue::Blob(vec![0xDE, 0xAD]).to_sql_inline(&dialect), "0xDEAD");
        assert_eq!(
            dialect.offset_fetch(Some(10), Some(5)),
            " OFFSET 10 ROWS FETCH NEXT 5 ROWS ONLY"
        );
    }
}
