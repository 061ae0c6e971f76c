#![allow(dead_code)]

use std::sync::Arc;

use chrono::{NaiveDate, NaiveDateTime};
use oxide_query_core::model::{Query, Scope, TableName};
use oxide_query_core::{
    ColumnMetadata, ColumnSet, CompileError, CompiledStatement, DbType, ParameterCache,
    ProviderMetadata, SystemType, TableMetadata,
};
use oxide_query_mssql::{CompileOptions, Compiler};
use tracing_subscriber::filter::LevelFilter;

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_test_writer()
        .with_max_level(LevelFilter::TRACE)
        .try_init();
}

pub fn employees_metadata() -> Arc<TableMetadata> {
    let columns = ColumnSet::new()
        .with(ColumnMetadata::new("EmployeeID", SystemType::Int32))
        .with(ColumnMetadata::new("LastName", SystemType::String).with_max_length(20))
        .with(ColumnMetadata::new("FirstName", SystemType::String).with_max_length(10))
        .with(
            ColumnMetadata::new("Title", SystemType::String)
                .with_property_name("JobTitle")
                .with_max_length(30),
        )
        .with(ColumnMetadata::new("HireDate", SystemType::DateTime))
        .with(ColumnMetadata::new("ReportsTo", SystemType::Int32));
    let provider = ProviderMetadata::new().with_db_type("Title", DbType::AnsiString);
    Arc::new(TableMetadata::new("Employees", provider, columns))
}

pub fn orders_metadata() -> Arc<TableMetadata> {
    let columns = ColumnSet::new()
        .with(ColumnMetadata::new("OrderID", SystemType::Int32))
        .with(ColumnMetadata::new("EmployeeID", SystemType::Int32))
        .with(ColumnMetadata::new("OrderDate", SystemType::DateTime))
        .with(ColumnMetadata::new("Freight", SystemType::Decimal).with_precision(19, 4))
        .with(ColumnMetadata::new("ShipCity", SystemType::String).with_max_length(15));
    let provider = ProviderMetadata::new().with_db_type("ShipCity", DbType::AnsiString);
    Arc::new(TableMetadata::new("Orders", provider, columns))
}

pub fn order_details_metadata() -> Arc<TableMetadata> {
    let columns = ColumnSet::new()
        .with(ColumnMetadata::new("OrderID", SystemType::Int32))
        .with(ColumnMetadata::new("ProductID", SystemType::Int32))
        .with(ColumnMetadata::new("Quantity", SystemType::Int16))
        .with(ColumnMetadata::new("UnitPrice", SystemType::Decimal).with_precision(19, 4));
    Arc::new(TableMetadata::new(
        "OrderDetails",
        ProviderMetadata::new(),
        columns,
    ))
}

pub fn employees_scope(alias: &str) -> Scope {
    Scope::new(TableName::new("Employees"))
        .with_join_alias(alias)
        .with_metadata(employees_metadata())
}

pub fn orders_scope(alias: &str) -> Scope {
    Scope::new(TableName::new("Orders"))
        .with_join_alias(alias)
        .with_metadata(orders_metadata())
}

pub fn order_details_scope(alias: &str) -> Scope {
    Scope::new(TableName::new("Order Details"))
        .with_join_alias(alias)
        .with_metadata(order_details_metadata())
}

pub fn employees(alias: &str) -> Query {
    Query::new(employees_scope(alias))
}

pub fn orders(alias: &str) -> Query {
    Query::new(orders_scope(alias))
}

pub fn order_details(alias: &str) -> Query {
    Query::new(order_details_scope(alias))
}

pub fn date(year: i32, month: u32, day: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap_or_else(|| panic!("invalid date {year}-{month}-{day}"))
}

pub fn compile(query: &Query) -> CompiledStatement {
    compile_with(query, CompileOptions::default())
}

pub fn compile_with(query: &Query, options: CompileOptions) -> CompiledStatement {
    init_tracing();
    let cache = ParameterCache::new();
    Compiler::with_options(&cache, options)
        .compile(query)
        .unwrap_or_else(|e| panic!("Failed to compile: {e}"))
}

pub fn compile_err(query: &Query) -> CompileError {
    init_tracing();
    let cache = ParameterCache::new();
    match Compiler::new(&cache).compile(query) {
        Ok(statement) => panic!("Expected compile error, got: {}", statement.text),
        Err(e) => e,
    }
}

/// Placeholders in order of appearance, skipping string literals.
pub fn placeholders(sql: &str) -> Vec<String> {
    let mut found = Vec::new();
    let mut in_string = false;
    let mut chars = sql.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\'' => in_string = !in_string,
            '@' if !in_string => {
                let mut name = String::from("@");
                while let Some(&next) = chars.peek() {
                    if next.is_ascii_alphanumeric() || next == '_' {
                        name.push(next);
                        chars.next();
                    } else {
                        break;
                    }
                }
                found.push(name);
            }
            _ => {}
        }
    }
    found
}

pub fn parameter_names(statement: &CompiledStatement) -> Vec<String> {
    statement.parameters.iter().map(|p| p.name.clone()).collect()
}

/// Trailing number of a placeholder name.
pub fn suffix(name: &str) -> u32 {
    let digits: String = name
        .chars()
        .rev()
        .take_while(char::is_ascii_digit)
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    digits
        .parse()
        .unwrap_or_else(|_| panic!("placeholder {name} has no numeric suffix"))
}

/// Whether parentheses outside string literals and bracketed identifiers
/// pair up.
pub fn parens_balanced(sql: &str) -> bool {
    let mut depth = 0_i32;
    let mut in_string = false;
    let mut in_identifier = false;
    for c in sql.chars() {
        match c {
            '\'' if !in_identifier => in_string = !in_string,
            '[' if !in_string => in_identifier = true,
            ']' if !in_string => in_identifier = false,
            '(' if !in_string && !in_identifier => depth += 1,
            ')' if !in_string && !in_identifier => {
                depth -= 1;
                if depth < 0 {
                    return false;
                }
            }
            _ => {}
        }
    }
    depth == 0 && !in_string
}
