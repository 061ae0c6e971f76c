//! # oxide-query-core
//!
//! Dialect-neutral half of the oxide-query compiler.
//!
//! This crate provides:
//! - A composable query model (scopes, expressions, decorators, predicate
//!   token streams, joins, applies, set operations and paging strategies)
//! - The [`Dialect`](dialect::Dialect) trait a SQL target implements
//! - Column metadata and a thread-safe parameter template cache
//! - The compiled statement and parameter types a target produces
//!
//! Compilation itself lives in the dialect crates, such as
//! `oxide-query-mssql`.

pub mod dialect;
pub mod error;
pub mod metadata;
pub mod model;
pub mod statement;
pub mod value;

pub use error::{CompileError, Result};
pub use metadata::{
    ColumnMetadata, ColumnSet, DbType, NoLookup, ParameterCache, ParameterLookup,
    ProviderMetadata, SystemType, TableMetadata,
};
pub use statement::{CompiledStatement, Parameter};
pub use value::{SqlValue, ToSqlValue};
