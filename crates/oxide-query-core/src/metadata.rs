//! Column metadata and parameter templates.
//!
//! The compiler never discovers schema on its own. Callers attach a
//! [`TableMetadata`] to a scope, and a [`ParameterLookup`] turns that
//! metadata into per-column parameter templates which the binder clones.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use serde::Serialize;

use crate::statement::Parameter;
use crate::value::SqlValue;

/// Provider-level parameter type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum DbType {
    /// Variable-length non-Unicode text.
    AnsiString,
    /// Fixed-length non-Unicode text.
    AnsiStringFixedLength,
    /// Variable-length binary data.
    Binary,
    /// Boolean.
    Boolean,
    /// Unsigned 8-bit integer.
    Byte,
    /// Currency amount.
    Currency,
    /// Date without time.
    Date,
    /// Date and time.
    DateTime,
    /// Date and time with extended precision.
    DateTime2,
    /// Date and time with offset.
    DateTimeOffset,
    /// Fixed-point number.
    Decimal,
    /// Double-precision float.
    Double,
    /// Globally unique identifier.
    Guid,
    /// Signed 16-bit integer.
    Int16,
    /// Signed 32-bit integer.
    Int32,
    /// Signed 64-bit integer.
    Int64,
    /// Single-precision float.
    Single,
    /// Variable-length Unicode text.
    String,
    /// Fixed-length Unicode text.
    StringFixedLength,
    /// Time of day.
    Time,
    /// XML document.
    Xml,
}

/// Language-level type of a mapped column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum SystemType {
    Boolean,
    Byte,
    Bytes,
    Char,
    DateTime,
    Decimal,
    Double,
    Guid,
    Int16,
    Int32,
    Int64,
    Single,
    String,
}

impl SystemType {
    /// Returns the provider type a column of this type binds as by default.
    #[must_use]
    pub const fn default_db_type(self) -> DbType {
        match self {
            Self::Boolean => DbType::Boolean,
            Self::Byte => DbType::Byte,
            Self::Bytes => DbType::Binary,
            Self::Char => DbType::StringFixedLength,
            Self::DateTime => DbType::DateTime,
            Self::Decimal => DbType::Decimal,
            Self::Double => DbType::Double,
            Self::Guid => DbType::Guid,
            Self::Int16 => DbType::Int16,
            Self::Int32 => DbType::Int32,
            Self::Int64 => DbType::Int64,
            Self::Single => DbType::Single,
            Self::String => DbType::String,
        }
    }
}

/// Metadata for a single mapped column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnMetadata {
    /// Column name in the database.
    pub name: String,
    /// Name of the mapped property, used for parameter names.
    pub property_name: String,
    /// Language-level type.
    pub system_type: SystemType,
    /// Maximum length for text and binary columns.
    pub max_length: Option<u32>,
    /// Numeric precision.
    pub precision: Option<u8>,
    /// Numeric scale.
    pub scale: Option<u8>,
}

impl ColumnMetadata {
    /// Creates column metadata whose property name equals the column name.
    #[must_use]
    pub fn new(name: &str, system_type: SystemType) -> Self {
        Self {
            name: String::from(name),
            property_name: String::from(name),
            system_type,
            max_length: None,
            precision: None,
            scale: None,
        }
    }

    /// Sets the mapped property name.
    #[must_use]
    pub fn with_property_name(mut self, property_name: &str) -> Self {
        self.property_name = String::from(property_name);
        self
    }

    /// Sets the maximum length.
    #[must_use]
    pub const fn with_max_length(mut self, max_length: u32) -> Self {
        self.max_length = Some(max_length);
        self
    }

    /// Sets precision and scale.
    #[must_use]
    pub const fn with_precision(mut self, precision: u8, scale: u8) -> Self {
        self.precision = Some(precision);
        self.scale = Some(scale);
        self
    }
}

/// Ordered collection of column metadata for one table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnSet {
    columns: Vec<ColumnMetadata>,
}

impl ColumnSet {
    /// Creates an empty column set.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            columns: Vec::new(),
        }
    }

    /// Adds a column.
    #[must_use]
    pub fn with(mut self, column: ColumnMetadata) -> Self {
        self.columns.push(column);
        self
    }

    /// Finds a column by its database name, ignoring ASCII case.
    #[must_use]
    pub fn find_by_column_name(&self, name: &str) -> Option<&ColumnMetadata> {
        self.columns
            .iter()
            .find(|c| c.name.eq_ignore_ascii_case(name))
    }

    /// Iterates over the columns in declaration order.
    pub fn iter(&self) -> impl Iterator<Item = &ColumnMetadata> {
        self.columns.iter()
    }

    /// Returns the number of columns.
    #[must_use]
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Returns `true` if there are no columns.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// Provider-specific overrides, keyed by column name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProviderMetadata {
    db_types: HashMap<String, DbType>,
}

impl ProviderMetadata {
    /// Creates empty provider metadata.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares the provider type of a column.
    #[must_use]
    pub fn with_db_type(mut self, column: &str, db_type: DbType) -> Self {
        self.db_types.insert(String::from(column), db_type);
        self
    }

    /// Returns the declared provider type of a column.
    #[must_use]
    pub fn db_type(&self, column: &str) -> Option<DbType> {
        self.db_types.get(column).copied()
    }
}

/// Everything known about the table behind a scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableMetadata {
    /// Identity used as the parameter cache key.
    pub data_id: String,
    /// Provider overrides.
    pub provider: ProviderMetadata,
    /// Mapped columns.
    pub columns: ColumnSet,
}

impl TableMetadata {
    /// Creates table metadata.
    #[must_use]
    pub fn new(data_id: &str, provider: ProviderMetadata, columns: ColumnSet) -> Self {
        Self {
            data_id: String::from(data_id),
            provider,
            columns,
        }
    }
}

/// Shared read-only map from column name to parameter template.
pub type ParameterTemplates = Arc<HashMap<String, Parameter>>;

/// Source of parameter templates for a table.
///
/// A miss is not an error: the binder falls back to an untyped parameter.
pub trait ParameterLookup {
    /// Returns the templates for the given table, if any.
    fn lookup(
        &self,
        data_id: &str,
        provider: &ProviderMetadata,
        columns: &ColumnSet,
    ) -> Option<ParameterTemplates>;
}

/// A lookup that never finds anything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoLookup;

impl ParameterLookup for NoLookup {
    fn lookup(&self, _: &str, _: &ProviderMetadata, _: &ColumnSet) -> Option<ParameterTemplates> {
        None
    }
}

/// Thread-safe template cache keyed by data id.
///
/// Templates are built from the metadata the first time a data id is seen
/// and handed out as shared maps afterwards.
#[derive(Debug, Default)]
pub struct ParameterCache {
    entries: RwLock<HashMap<String, ParameterTemplates>>,
}

impl ParameterCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of cached tables.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Returns `true` if nothing has been cached yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn build(provider: &ProviderMetadata, columns: &ColumnSet) -> HashMap<String, Parameter> {
        columns
            .iter()
            .map(|column| {
                let db_type = provider
                    .db_type(&column.name)
                    .unwrap_or_else(|| column.system_type.default_db_type());
                let mut template = Parameter::untyped(&column.property_name, SqlValue::Null);
                template.db_type = Some(db_type);
                template.size = column.max_length;
                template.precision = column.precision;
                template.scale = column.scale;
                (column.name.clone(), template)
            })
            .collect()
    }
}

impl ParameterLookup for ParameterCache {
    fn lookup(
        &self,
        data_id: &str,
        provider: &ProviderMetadata,
        columns: &ColumnSet,
    ) -> Option<ParameterTemplates> {
        if let Some(found) = self
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(data_id)
        {
            return Some(Arc::clone(found));
        }

        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let templates = entries
            .entry(String::from(data_id))
            .or_insert_with(|| Arc::new(Self::build(provider, columns)));
        Some(Arc::clone(templates))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn employees() -> (ProviderMetadata, ColumnSet) {
        let provider = ProviderMetadata::new().with_db_type("LastName", DbType::AnsiString);
        let columns = ColumnSet::new()
            .with(ColumnMetadata::new("EmployeeID", SystemType::Int32))
            .with(
                ColumnMetadata::new("LastName", SystemType::String)
                    .with_property_name("Surname")
                    .with_max_length(50),
            )
            .with(ColumnMetadata::new("Salary", SystemType::Decimal).with_precision(10, 2));
        (provider, columns)
    }

    #[test]
    fn test_find_by_column_name_ignores_case() {
        let (_, columns) = employees();
        assert_eq!(columns.len(), 3);
        assert!(columns.find_by_column_name("lastname").is_some());
        assert!(columns.find_by_column_name("Missing").is_none());
    }

    #[test]
    fn test_cache_builds_templates_from_metadata() {
        let (provider, columns) = employees();
        let cache = ParameterCache::new();
        assert!(cache.is_empty());

        let templates = cache.lookup("Employees", &provider, &columns).unwrap();
        let last_name = &templates["LastName"];
        assert_eq!(last_name.db_type, Some(DbType::AnsiString));
        assert_eq!(last_name.size, Some(50));
        assert_eq!(templates["EmployeeID"].db_type, Some(DbType::Int32));
        assert_eq!(templates["Salary"].precision, Some(10));
        assert_eq!(templates["Salary"].scale, Some(2));
    }

    #[test]
    fn test_cache_hands_out_shared_maps() {
        let (provider, columns) = employees();
        let cache = ParameterCache::new();
        let first = cache.lookup("Employees", &provider, &columns).unwrap();
        let second = cache.lookup("Employees", &provider, &columns).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_no_lookup_misses() {
        let (provider, columns) = employees();
        assert!(NoLookup.lookup("Employees", &provider, &columns).is_none());
    }
}
