//! Generic SQL dialect.

use super::Dialect;
use crate::model::CastType;

/// A generic SQL dialect using ANSI SQL standards.
#[derive(Debug, Default, Clone, Copy)]
pub struct GenericDialect;

impl GenericDialect {
    /// Creates a new generic dialect.
    #[must_use]
    pub const fn new() -> Self {
        Self
    }
}

impl Dialect for GenericDialect {
    fn name(&self) -> &'static str {
        "generic"
    }

    fn cast_type_name(&self, cast: CastType) -> Option<&'static str> {
        match cast {
            CastType::Boolean => Some("BOOLEAN"),
            CastType::Char => Some("CHAR"),
            CastType::DateTime => Some("TIMESTAMP"),
            CastType::Double => Some("DOUBLE PRECISION"),
            CastType::Decimal => Some("DECIMAL"),
            CastType::Int16 => Some("SMALLINT"),
            CastType::Int32 => Some("INTEGER"),
            CastType::Int64 => Some("BIGINT"),
            CastType::Single => Some("REAL"),
            CastType::String => Some("VARCHAR"),
            CastType::Byte | CastType::Guid => None,
        }
    }
}
