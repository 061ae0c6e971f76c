//! Compiler options.

use oxide_query_core::{CompileError, Result};
use serde::{Deserialize, Serialize};

/// Names and numbering the compiler emits.
///
/// Every field has a default, so a partial JSON document is enough:
///
/// ```rust
/// use oxide_query_mssql::CompileOptions;
///
/// let options = CompileOptions::from_json(r#"{ "row_number_column": "RowNum" }"#).unwrap();
/// assert_eq!(options.row_number_column, "RowNum");
/// assert_eq!(options.paging_cte_name, "withStatement");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompileOptions {
    /// Row-number column of the paging and partition-top shapes.
    pub row_number_column: String,
    /// Name of the paging CTE.
    pub paging_cte_name: String,
    /// Alias of the ranked derived table in partition-top.
    pub ranked_alias: String,
    /// Alias of the de-duplicated key set in partition-top.
    pub partition_keys_alias: String,
    /// Name stem of parameters whose column has no metadata.
    pub expression_parameter_stem: String,
    /// Suffix of the first bound parameter.
    pub first_parameter_index: u32,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            row_number_column: String::from("ESRN"),
            paging_cte_name: String::from("withStatement"),
            ranked_alias: String::from("r"),
            partition_keys_alias: String::from("ij"),
            expression_parameter_stem: String::from("Expr"),
            first_parameter_index: 1,
        }
    }
}

impl CompileOptions {
    /// Loads options from a JSON document.
    ///
    /// # Errors
    ///
    /// Returns `CompileError::InvalidOptions` if the document does not parse.
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| CompileError::InvalidOptions(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = CompileOptions::default();
        assert_eq!(options.row_number_column, "ESRN");
        assert_eq!(options.ranked_alias, "r");
        assert_eq!(options.partition_keys_alias, "ij");
        assert_eq!(options.expression_parameter_stem, "Expr");
        assert_eq!(options.first_parameter_index, 1);
    }

    #[test]
    fn test_from_json_partial() {
        let options = CompileOptions::from_json(r#"{"first_parameter_index": 0}"#).unwrap();
        assert_eq!(options.first_parameter_index, 0);
        assert_eq!(options.paging_cte_name, "withStatement");
    }

    #[test]
    fn test_from_json_rejects_garbage() {
        let err = CompileOptions::from_json("{ not json").unwrap_err();
        assert!(matches!(err, CompileError::InvalidOptions(_)));

        let err = CompileOptions::from_json(r#"{"first_parameter_index": "one"}"#).unwrap_err();
        assert!(matches!(err, CompileError::InvalidOptions(_)));
    }
}
