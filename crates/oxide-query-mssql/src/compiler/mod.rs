//! Statement composer.
//!
//! [`Compiler`] turns a [`Query`] into T-SQL text plus its bound
//! parameters. Every clause builder renders straight into the text in
//! emission order, so parameters are numbered in the order their
//! placeholders appear. Nested sub-statements recurse through
//! `compile_nested` with the same [`CompileContext`].

mod clauses;
mod decorators;
mod expr;
mod paging;
mod predicate;

use oxide_query_core::dialect::Dialect;
use oxide_query_core::model::{Paging, Query};
use oxide_query_core::{CompileError, CompiledStatement, NoLookup, ParameterLookup, Result};
use tracing::{debug, trace};

use crate::context::CompileContext;
use crate::dialect::MssqlDialect;
use crate::options::CompileOptions;

/// SQL Server query compiler.
///
/// A compiler holds no per-statement state; each [`compile`](Self::compile)
/// call gets a fresh context, so one compiler can be shared across threads
/// when its lookup can.
pub struct Compiler<'a> {
    dialect: MssqlDialect,
    lookup: &'a dyn ParameterLookup,
    options: CompileOptions,
}

impl<'a> Compiler<'a> {
    /// Creates a compiler with default options.
    #[must_use]
    pub fn new(lookup: &'a dyn ParameterLookup) -> Self {
        Self::with_options(lookup, CompileOptions::default())
    }

    /// Creates a compiler with explicit options.
    #[must_use]
    pub fn with_options(lookup: &'a dyn ParameterLookup, options: CompileOptions) -> Self {
        Self {
            dialect: MssqlDialect::new(),
            lookup,
            options,
        }
    }

    #[must_use]
    pub const fn options(&self) -> &CompileOptions {
        &self.options
    }

    /// Compiles a top-level statement.
    ///
    /// # Errors
    ///
    /// Returns the first [`CompileError`](oxide_query_core::CompileError)
    /// raised anywhere in the statement tree. No partial text is returned.
    pub fn compile(&self, query: &Query) -> Result<CompiledStatement> {
        let mut ctx = CompileContext::new(self.options.first_parameter_index);
        let text = self.compile_nested(&mut ctx, query)?;
        let parameters = ctx.into_parameters();

        debug!(
            shape = shape_name(query),
            table = %query.scope.table(),
            parameters = parameters.len(),
            "compiled statement"
        );

        Ok(CompiledStatement { text, parameters })
    }

    /// Compiles `query` inside its own scope.
    fn compile_nested(&self, ctx: &mut CompileContext, query: &Query) -> Result<String> {
        let mut guard = ctx.enter(query);
        if guard.depth() > 1 {
            trace!(
                depth = guard.depth(),
                table = %query.scope.table(),
                "compiling sub-statement"
            );
        }
        self.build_query(&mut guard, query)
    }

    fn build_query(&self, ctx: &mut CompileContext, query: &Query) -> Result<String> {
        match &query.paging {
            Some(Paging::Page { number, size }) => self.page_numbered(ctx, query, *number, *size),
            Some(Paging::PartitionTop(spec)) => self.partition_top(ctx, query, spec),
            Some(Paging::Window { skip, take }) => {
                if query.order_by.is_empty() {
                    return Err(CompileError::InvalidPaging(String::from(
                        "OFFSET/FETCH requires an ORDER BY",
                    )));
                }
                let mut sql = self.plain(ctx, query)?;
                sql.push_str(&self.dialect.offset_fetch(*skip, *take));
                Ok(sql)
            }
            None => self.plain(ctx, query),
        }
    }

    /// `SELECT ... FROM ...` with every clause, in emission order.
    fn plain(&self, ctx: &mut CompileContext, query: &Query) -> Result<String> {
        let mut sql = String::from("SELECT ");
        sql.push_str(&self.select_clause(ctx, query)?);
        sql.push_str(" FROM ");
        sql.push_str(&self.from_clause(ctx, query)?);
        sql.push_str(&self.join_clause(ctx, query)?);
        sql.push_str(&self.apply_clause(ctx, query)?);
        sql.push_str(&self.where_clause(ctx, query)?);
        sql.push_str(&self.set_operations(ctx, query)?);
        sql.push_str(&self.group_by_clause(ctx, query)?);
        sql.push_str(&self.having_clause(ctx, query)?);
        sql.push_str(&self.order_by_clause(ctx, query)?);
        Ok(sql)
    }
}

/// Compiles a statement without parameter templates.
///
/// # Errors
///
/// See [`Compiler::compile`].
pub fn compile(query: &Query) -> Result<CompiledStatement> {
    Compiler::new(&NoLookup).compile(query)
}

const fn shape_name(query: &Query) -> &'static str {
    match query.paging {
        None => "plain",
        Some(Paging::Page { .. }) => "page",
        Some(Paging::Window { .. }) => "offset_fetch",
        Some(Paging::PartitionTop(_)) => "partition_top",
    }
}
