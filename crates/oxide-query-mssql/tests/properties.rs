//! Properties every compiled statement holds.

mod common;

use std::sync::Arc;

use common::{
    compile, employees, order_details, orders, orders_scope, parens_balanced, placeholders,
};
use oxide_query_core::model::{
    CaseBranch, CaseExpr, Column, Compare, Expression, PredicateList, Query, WindowExpr,
    WindowFunction,
};

/// A statement that binds parameters in every clause that can hold one.
fn busy_query() -> Query {
    let e = employees("e");
    let id = e.col("EmployeeID");
    let last = e.col("LastName");
    let hire = e.col("HireDate");

    let totals = Query::new(orders_scope("t").with_output_alias("Freight"));
    let total_employee = totals.col("EmployeeID");
    let total_freight = totals.col("Freight");
    let totals = totals
        .select(total_freight.clone().expr().sum())
        .where_clause(total_employee.eq_column(id.clone()))
        .where_clause(total_freight.gt(10));

    let latest = orders("latest");
    let latest_employee = latest.col("EmployeeID");
    let latest_date = latest.col("OrderDate");
    let latest = latest
        .top(1)
        .select(latest_date.clone())
        .where_clause(latest_employee.eq_column(id.clone()))
        .where_clause(latest_date.clone().gt(common::date(1997, 1, 1)))
        .order_by(latest_date.expr().desc());

    let berlin = orders("b");
    let berlin_employee = berlin.col("EmployeeID");
    let berlin_city = berlin.col("ShipCity");
    let berlin = berlin
        .select(berlin_employee)
        .where_clause(berlin_city.eq("Berlin"));

    let od = order_details("od");
    let od_order = od.col("OrderID");
    let quantity = od.col("Quantity");
    let bulk = od.select(od_order).where_clause(quantity.gt_eq(50));

    e.select(id.clone())
        .select_sub_query(totals)
        .cross_apply(latest)
        .where_clause(last.like("D%"))
        .where_clause(id.in_query(berlin))
        .where_clause(hire.between_values(common::date(1992, 1, 1), common::date(1994, 1, 1)))
        .union(bulk)
}

#[test]
fn test_compilation_is_deterministic() {
    let query = busy_query();
    assert_eq!(compile(&query), compile(&query));
}

#[test]
fn test_placeholders_match_parameters_in_order() {
    let statement = compile(&busy_query());
    let names = common::parameter_names(&statement);

    assert_eq!(placeholders(&statement.text), names);
    assert_eq!(names.len(), 7);
    let suffixes: Vec<u32> = names.iter().map(|n| common::suffix(n)).collect();
    assert_eq!(suffixes, [1, 2, 3, 4, 5, 6, 7]);
}

#[test]
fn test_parentheses_balance() {
    let e = employees("e");
    let id = e.col("EmployeeID");
    let last = e.col("LastName");
    let title = e.col("Title");
    let predicates = [
        PredicateList::from(id.clone().gt(1)),
        PredicateList::new()
            .open()
            .and(id.clone().gt(1))
            .close()
            .or(last.clone().eq("(").and(title.clone().is_null())),
        PredicateList::new()
            .open()
            .open()
            .and(id.clone().lt(5))
            .close()
            .and(title.clone().like("%)%"))
            .close(),
        PredicateList::from(last.clone().expr().trim().upper().eq("X"))
            .or_not(id.clone().in_values(vec![1, 2, 3])),
    ];
    for predicate in predicates {
        let text = compile(&employees_where(&e, predicate)).text;
        assert!(parens_balanced(&text), "unbalanced: {text}");
    }
    assert!(parens_balanced(&compile(&busy_query()).text));
}

fn employees_where(e: &Query, predicate: PredicateList) -> Query {
    Query::over(Arc::clone(&e.scope)).where_clause(predicate)
}

#[test]
fn test_raw_fragments_are_emitted_unchanged() {
    let fragment = "e.[FirstName] + ' ' + e.[LastName] AS FullName";
    let e = employees("e");
    let query = e
        .select(Column::raw(fragment).expr().upper().alias("Ignored"))
        .group_by(Column::raw("e.[FirstName] + ' ' + e.[LastName]"))
        .order_by(Column::raw("FullName"));

    assert_eq!(
        compile(&query).text,
        "SELECT e.[FirstName] + ' ' + e.[LastName] AS FullName FROM [Employees] e \
         GROUP BY e.[FirstName] + ' ' + e.[LastName] ORDER BY FullName"
    );
}

#[test]
fn test_decorators_nest_in_order() {
    let e = employees("e");
    let last = e.col("LastName");
    let query = e.select(
        last.expr()
            .substring(Some(2), 3)
            .upper()
            .coalesce("'?'")
            .alias("Code"),
    );
    assert_eq!(
        compile(&query).text,
        "SELECT COALESCE(UPPER(SUBSTRING(e.[LastName], 2, 3)), '?') AS 'Code' FROM [Employees] e"
    );
}

#[test]
fn test_case_and_window_expressions() {
    let e = employees("e");
    let id = e.col("EmployeeID");
    let title = e.col("Title");
    let reports_to = e.col("ReportsTo");
    let seniority = CaseExpr::new()
        .when(reports_to.is_null(), id.clone())
        .otherwise(CaseBranch::value(0));
    let rank = WindowExpr::new(WindowFunction::RowNumber)
        .partition_by(title)
        .order_by(id.expr().asc());

    let statement = compile(
        &e.select(Expression::case(seniority).alias("Boss"))
            .select(Expression::window(rank).alias("Rank")),
    );
    assert_eq!(
        statement.text,
        "SELECT CASE WHEN e.[ReportsTo] IS NULL THEN e.[EmployeeID] ELSE 0 END AS 'Boss', \
         ROW_NUMBER() OVER(PARTITION BY e.[Title] ORDER BY e.[EmployeeID] ASC) AS 'Rank' \
         FROM [Employees] e"
    );
    assert!(statement.parameters.is_empty());
}
