//! Query model.
//!
//! An in-memory description of one statement: scopes, expressions,
//! predicate token streams and the clauses of a query node. The model is
//! built once through the fluent methods and never modified by the
//! compiler.
//!
//! ```rust
//! use oxide_query_core::model::{Compare, Query, Scope, TableName};
//!
//! let e = Query::new(Scope::new(TableName::new("Employees")).with_join_alias("e"));
//! let id = e.col("EmployeeID");
//! let last_name = e.col("LastName");
//!
//! let query = e
//!     .select(id.clone())
//!     .select(last_name.expr().upper().alias("Name"))
//!     .where_clause(id.lt(6));
//! assert_eq!(query.select.len(), 2);
//! ```

mod decorator;
mod expr;
mod predicate;
mod query;
mod scope;

pub use decorator::{param, CastType, Decorator, DecoratorArg, DecoratorKind};
pub use expr::{
    ArithmeticOp, CaseBranch, CaseCondition, CaseExpr, Column, Direction, ExprBase, Expression,
    MathExpr, MathOperand, OrderByItem, WhenThen, WindowExpr, WindowFunction,
};
pub use predicate::{
    Bound, Compare, Comparison, ComparisonOp, Conjunction, InItem, Paren, PredicateList,
    PredicateToken, Quantifier, RightOperand,
};
pub use query::{
    page_bounds, ApplyKind, ApplySpec, CountAll, GroupByItem, JoinKind, JoinSpec, Paging,
    PartitionTop, Query, SelectItem, SetOperation, SetOperationKind,
};
pub use scope::{Scope, ScopeId, TableName};
