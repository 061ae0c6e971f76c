//! Table scopes.
//!
//! A scope is one table as seen by one query node. It carries the two
//! names the node can be known by: the join alias its own clauses use and
//! the output alias an enclosing query uses once the node is compiled as a
//! sub-query.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::metadata::TableMetadata;

static NEXT_SCOPE_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of a scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScopeId(u64);

impl ScopeId {
    fn next() -> Self {
        Self(NEXT_SCOPE_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// A possibly catalog- and schema-qualified table name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TableName {
    /// Catalog (database) name.
    pub catalog: Option<String>,
    /// Schema name.
    pub schema: Option<String>,
    /// Table name.
    pub name: String,
}

impl TableName {
    /// Creates an unqualified table name.
    #[must_use]
    pub fn new(name: &str) -> Self {
        Self {
            catalog: None,
            schema: None,
            name: String::from(name),
        }
    }

    /// Sets the schema.
    #[must_use]
    pub fn with_schema(mut self, schema: &str) -> Self {
        self.schema = Some(String::from(schema));
        self
    }

    /// Sets the catalog.
    #[must_use]
    pub fn with_catalog(mut self, catalog: &str) -> Self {
        self.catalog = Some(String::from(catalog));
        self
    }

    /// Returns the name parts from catalog to table.
    pub fn parts(&self) -> impl Iterator<Item = &str> {
        self.catalog
            .as_deref()
            .into_iter()
            .chain(self.schema.as_deref())
            .chain(std::iter::once(self.name.as_str()))
    }
}

impl fmt::Display for TableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<&str> = self.parts().collect();
        f.write_str(&parts.join("."))
    }
}

/// One table as seen by one query node.
#[derive(Debug)]
pub struct Scope {
    id: ScopeId,
    table: TableName,
    join_alias: Option<String>,
    output_alias: Option<String>,
    metadata: Option<Arc<TableMetadata>>,
}

impl Scope {
    /// Creates a scope with a fresh identity and no aliases.
    #[must_use]
    pub fn new(table: TableName) -> Self {
        Self {
            id: ScopeId::next(),
            table,
            join_alias: None,
            output_alias: None,
            metadata: None,
        }
    }

    /// Sets the alias the node's own clauses qualify with.
    #[must_use]
    pub fn with_join_alias(mut self, alias: &str) -> Self {
        self.join_alias = Some(String::from(alias));
        self
    }

    /// Sets the alias an enclosing query uses for the compiled node.
    #[must_use]
    pub fn with_output_alias(mut self, alias: &str) -> Self {
        self.output_alias = Some(String::from(alias));
        self
    }

    /// Attaches column metadata.
    #[must_use]
    pub fn with_metadata(mut self, metadata: Arc<TableMetadata>) -> Self {
        self.metadata = Some(metadata);
        self
    }

    #[must_use]
    pub const fn id(&self) -> ScopeId {
        self.id
    }

    #[must_use]
    pub const fn table(&self) -> &TableName {
        &self.table
    }

    #[must_use]
    pub fn join_alias(&self) -> Option<&str> {
        self.join_alias.as_deref()
    }

    #[must_use]
    pub fn output_alias(&self) -> Option<&str> {
        self.output_alias.as_deref()
    }

    #[must_use]
    pub fn metadata(&self) -> Option<&TableMetadata> {
        self.metadata.as_deref()
    }

    /// Returns `true` for the single implicit table that never qualifies.
    #[must_use]
    pub const fn is_unaliased(&self) -> bool {
        self.join_alias.is_none() && self.output_alias.is_none()
    }
}
