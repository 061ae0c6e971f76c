//! Error types for query compilation.

use thiserror::Error;

/// Errors raised while compiling a query model.
///
/// Every variant describes a malformed model or an unsupported combination.
/// Compilation stops at the first error and never returns partial text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    /// Open and close parenthesis tokens do not pair up.
    #[error("unbalanced parentheses in {clause} predicate")]
    UnbalancedParentheses {
        /// Clause that owns the predicate list.
        clause: &'static str,
    },

    /// A conjunction token that is not between two operands.
    #[error("conjunction at token {position} of {clause} predicate has no operand on both sides")]
    MisplacedConjunction {
        /// Clause that owns the predicate list.
        clause: &'static str,
        /// Zero-based token index.
        position: usize,
    },

    /// Any other structural problem in a predicate token list.
    #[error("malformed {clause} predicate at token {position}: {reason}")]
    MalformedPredicate {
        /// Clause that owns the predicate list.
        clause: &'static str,
        /// Zero-based token index.
        position: usize,
        /// What is wrong.
        reason: String,
    },

    /// A comparison whose operator does not fit its operands.
    #[error("malformed comparison: {0}")]
    MalformedComparison(String),

    /// A scalar expression that cannot be rendered.
    #[error("malformed expression: {0}")]
    MalformedExpression(String),

    /// A decorator is missing one of its required parameters.
    #[error("{decorator} decorator is missing required parameter '{parameter}'")]
    MissingDecoratorParameter {
        /// SQL name of the decorator.
        decorator: &'static str,
        /// Parameter key.
        parameter: &'static str,
    },

    /// A decorator parameter has the wrong shape.
    #[error("{decorator} decorator parameter '{parameter}' is invalid: {reason}")]
    InvalidDecoratorParameter {
        /// SQL name of the decorator.
        decorator: &'static str,
        /// Parameter key.
        parameter: &'static str,
        /// What is wrong.
        reason: String,
    },

    /// A cast target the dialect has no native type for.
    #[error("cast type '{cast}' has no mapping in the {dialect} dialect")]
    UnmappedCastType {
        /// The requested cast tag.
        cast: String,
        /// Dialect name.
        dialect: &'static str,
    },

    /// A sub-query or scope that must be aliased has no alias.
    #[error("{context} requires an alias")]
    MissingAlias {
        /// Where the alias was needed.
        context: &'static str,
    },

    /// A column whose owning scope is not reachable from the statement.
    #[error("cannot qualify column '{column}': its table '{table}' is not in scope")]
    AmbiguousQualification {
        /// Column name.
        column: String,
        /// Table of the owning scope.
        table: String,
    },

    /// Paging settings that cannot produce a valid statement.
    #[error("invalid paging: {0}")]
    InvalidPaging(String),

    /// The parameter suffix counter ran past `u32::MAX`.
    #[error("parameter index overflowed; lower first_parameter_index")]
    ParameterIndexOverflow,

    /// Compiler options that failed to load.
    #[error("invalid compile options: {0}")]
    InvalidOptions(String),
}

/// Result type for compilation.
pub type Result<T> = std::result::Result<T, CompileError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CompileError::UnbalancedParentheses { clause: "WHERE" };
        assert_eq!(err.to_string(), "unbalanced parentheses in WHERE predicate");

        let err = CompileError::MissingDecoratorParameter {
            decorator: "SUBSTRING",
            parameter: "length",
        };
        assert_eq!(
            err.to_string(),
            "SUBSTRING decorator is missing required parameter 'length'"
        );

        let err = CompileError::MissingAlias {
            context: "FROM sub-query",
        };
        assert_eq!(err.to_string(), "FROM sub-query requires an alias");
    }
}
