//! # oxide-query-mssql
//!
//! SQL Server (T-SQL) compiler for `oxide-query-core` models.
//!
//! # How SQL Server differs from other dialects
//!
//! - **Identifier quoting**: square brackets (`[Order Details]`), with `]`
//!   doubled inside a name.
//! - **Parameters**: named, prefixed with `@`. Names are derived from the
//!   mapped property of the compared column (`@LastName3`) or from a
//!   configurable stem (`@Expr3`).
//! - **[OFFSET/FETCH]**: requires an ORDER BY; `OFFSET 0 ROWS` is written
//!   when only a row limit is given.
//! - **Paging by page number**: compiled to a `ROW_NUMBER()` CTE, which
//!   works on servers without OFFSET/FETCH.
//! - **[APPLY]**: `CROSS APPLY` and `OUTER APPLY` lateral sub-queries.
//! - **Table hints**: `WITH (NOLOCK)` on FROM and JOIN tables.
//!
//! [OFFSET/FETCH]: https://learn.microsoft.com/sql/t-sql/queries/select-order-by-clause-transact-sql
//! [APPLY]: https://learn.microsoft.com/sql/t-sql/queries/from-transact-sql
//!
//! ## Example
//!
//! ```rust
//! use oxide_query_core::model::{Compare, Query, Scope, TableName};
//! use oxide_query_mssql::compile;
//!
//! let e = Query::new(Scope::new(TableName::new("Employees")).with_join_alias("e"));
//! let id = e.col("EmployeeID");
//! let last_name = e.col("LastName");
//!
//! let query = e
//!     .select(id.clone())
//!     .select(last_name.clone())
//!     .where_clause(last_name.like("Da%"))
//!     .order_by(id.expr().asc());
//!
//! let statement = compile(&query).unwrap();
//! assert_eq!(
//!     statement.text,
//!     "SELECT e.[EmployeeID], e.[LastName] FROM [Employees] e \
//!      WHERE e.[LastName] LIKE @Expr1 ORDER BY e.[EmployeeID] ASC"
//! );
//! assert_eq!(statement.parameters.len(), 1);
//! ```

mod compiler;
mod context;
mod dialect;
mod options;

pub use compiler::{compile, Compiler};
pub use dialect::MssqlDialect;
pub use options::CompileOptions;
