//! Compiled statements and bound parameters.

use serde::Serialize;

use crate::metadata::DbType;
use crate::value::SqlValue;

/// A named parameter bound by the compiler.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Parameter {
    /// Placeholder name, including the dialect prefix.
    pub name: String,
    /// Bound value.
    pub value: SqlValue,
    /// Declared provider type, if known.
    pub db_type: Option<DbType>,
    /// Declared size.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<u32>,
    /// Declared precision.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub precision: Option<u8>,
    /// Declared scale.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scale: Option<u8>,
}

impl Parameter {
    /// Creates a parameter with no declared type or shape.
    #[must_use]
    pub fn untyped(name: &str, value: SqlValue) -> Self {
        Self {
            name: String::from(name),
            value,
            db_type: None,
            size: None,
            precision: None,
            scale: None,
        }
    }

    /// Copies this template's shape under a new name and value.
    #[must_use]
    pub fn from_template(&self, name: &str, value: SqlValue) -> Self {
        Self {
            name: String::from(name),
            value,
            ..self.clone()
        }
    }
}

/// The output of a compilation: statement text plus its parameters.
///
/// `parameters` is ordered the way placeholders appear in `text`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompiledStatement {
    /// SQL text.
    pub text: String,
    /// Bound parameters in placeholder order.
    pub parameters: Vec<Parameter>,
}

impl CompiledStatement {
    /// Finds a parameter by name.
    #[must_use]
    pub fn parameter(&self, name: &str) -> Option<&Parameter> {
        self.parameters.iter().find(|p| p.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_template_keeps_shape() {
        let mut template = Parameter::untyped("LastName", SqlValue::Null);
        template.db_type = Some(DbType::AnsiString);
        template.size = Some(50);

        let bound = template.from_template("@LastName1", SqlValue::Text(String::from("Smith")));
        assert_eq!(bound.name, "@LastName1");
        assert_eq!(bound.db_type, Some(DbType::AnsiString));
        assert_eq!(bound.size, Some(50));
        assert_eq!(template.name, "LastName");
        assert_eq!(template.value, SqlValue::Null);
    }

    #[test]
    fn test_parameter_by_name() {
        let statement = CompiledStatement {
            text: String::from("SELECT * FROM [T] WHERE [A] = @Expr1"),
            parameters: vec![Parameter::untyped("@Expr1", SqlValue::Int(1))],
        };
        assert!(statement.parameter("@Expr1").is_some());
        assert!(statement.parameter("@Expr2").is_none());
    }
}
