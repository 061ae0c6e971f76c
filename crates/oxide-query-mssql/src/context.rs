//! Compilation context.
//!
//! One context lives for one top-level compile and is threaded by mutable
//! reference through every nested compile. It owns the parameter counter,
//! the bound parameters and the scope state that decides how columns
//! qualify. Scope state only changes through [`ScopeGuard`], which restores
//! it on every exit path.

use std::collections::HashSet;
use std::ops::{Deref, DerefMut};

use oxide_query_core::model::{Query, ScopeId, SelectItem};
use oxide_query_core::{CompileError, Parameter, Result};

#[derive(Debug)]
pub struct CompileContext {
    /// `None` once the suffix space is used up.
    next_index: Option<u32>,
    parameters: Vec<Parameter>,
    in_sub_query: HashSet<ScopeId>,
    visible: Vec<ScopeId>,
    depth: usize,
}

impl CompileContext {
    pub fn new(first_parameter_index: u32) -> Self {
        Self {
            next_index: Some(first_parameter_index),
            parameters: Vec::new(),
            in_sub_query: HashSet::new(),
            visible: Vec::new(),
            depth: 0,
        }
    }

    /// Takes the next parameter suffix. Suffixes never repeat within one
    /// compile.
    pub fn next_parameter_index(&mut self) -> Result<u32> {
        let index = self
            .next_index
            .ok_or(CompileError::ParameterIndexOverflow)?;
        self.next_index = index.checked_add(1);
        Ok(index)
    }

    pub fn bind(&mut self, parameter: Parameter) {
        self.parameters.push(parameter);
    }

    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    pub fn into_parameters(self) -> Vec<Parameter> {
        self.parameters
    }

    /// Number of query nodes currently being compiled, the root included.
    pub const fn depth(&self) -> usize {
        self.depth
    }

    /// Whether `scope` is being compiled right now as its own statement.
    pub fn is_in_sub_query(&self, scope: ScopeId) -> bool {
        self.in_sub_query.contains(&scope)
    }

    /// Whether a column of `scope` can be referenced from here.
    pub fn is_visible(&self, scope: ScopeId) -> bool {
        self.visible.contains(&scope)
    }

    /// Enters `query` for the duration of the returned guard.
    ///
    /// The node becomes "in sub-query", and its own scope plus every scope
    /// it introduces (FROM sub-query, join targets, applies, SELECT-list
    /// sub-queries) becomes visible to column references.
    pub fn enter(&mut self, query: &Query) -> ScopeGuard<'_> {
        let scope = query.scope.id();
        let visible_len = self.visible.len();
        let was_in_sub_query = !self.in_sub_query.insert(scope);

        self.visible.push(scope);
        if let Some(from) = &query.from_query {
            self.visible.push(from.scope.id());
        }
        self.visible
            .extend(query.joins.iter().map(|join| join.target.scope.id()));
        self.visible
            .extend(query.applies.iter().map(|apply| apply.query.scope.id()));
        self.visible
            .extend(query.select.iter().filter_map(|item| match item {
                SelectItem::SubQuery(sub) => Some(sub.scope.id()),
                SelectItem::AllColumns(_) | SelectItem::Expression(_) => None,
            }));
        self.depth += 1;

        ScopeGuard {
            ctx: self,
            scope,
            was_in_sub_query,
            visible_len,
        }
    }
}

/// Restores the scope state of a [`CompileContext`] when dropped.
#[derive(Debug)]
pub struct ScopeGuard<'c> {
    ctx: &'c mut CompileContext,
    scope: ScopeId,
    was_in_sub_query: bool,
    visible_len: usize,
}

impl Deref for ScopeGuard<'_> {
    type Target = CompileContext;

    fn deref(&self) -> &Self::Target {
        self.ctx
    }
}

impl DerefMut for ScopeGuard<'_> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.ctx
    }
}

impl Drop for ScopeGuard<'_> {
    fn drop(&mut self) {
        if !self.was_in_sub_query {
            self.ctx.in_sub_query.remove(&self.scope);
        }
        self.ctx.visible.truncate(self.visible_len);
        self.ctx.depth -= 1;
    }
}
