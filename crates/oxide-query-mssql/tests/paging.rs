//! Page-numbered, OFFSET/FETCH and partition-top statements.

mod common;

use std::sync::Arc;

use common::{compile, compile_err, compile_with, employees, order_details, orders};
use oxide_query_core::model::{page_bounds, Compare, PartitionTop, Query};
use oxide_query_core::CompileError;
use oxide_query_mssql::CompileOptions;

fn ordered_employees() -> Query {
    let e = employees("e");
    let id = e.col("EmployeeID");
    let last = e.col("LastName");
    e.select(id.clone())
        .select(last.clone())
        .where_clause(id.gt(0))
        .order_by(last.expr().asc())
}

#[test]
fn test_page_numbered_cte() {
    let statement = compile(&ordered_employees().page(3, 10));
    assert_eq!(
        statement.text,
        "WITH [withStatement] AS (SELECT e.[EmployeeID], e.[LastName], \
         ROW_NUMBER() OVER(ORDER BY e.[LastName] ASC) AS ESRN FROM [Employees] e \
         WHERE e.[EmployeeID] > @EmployeeID1) \
         SELECT * FROM [withStatement] WHERE ESRN BETWEEN 21 AND 30 ORDER BY ESRN ASC"
    );
    assert_eq!(statement.parameters.len(), 1);
}

#[test]
fn test_page_bounds() {
    assert_eq!(page_bounds(1, 10), (1, 10));
    assert_eq!(page_bounds(3, 10), (21, 30));
    assert_eq!(page_bounds(7, 1), (7, 7));
}

#[test]
fn test_page_keeps_grouping_inside_the_cte() {
    let o = orders("o");
    let employee = o.col("EmployeeID");
    let freight = o.col("Freight");
    let query = o
        .select(employee.clone())
        .select(freight.clone().expr().sum().alias("Total"))
        .group_by(employee.clone())
        .having(freight.expr().sum().gt(10))
        .order_by(employee.expr().asc())
        .page(1, 5);

    assert_eq!(
        compile(&query).text,
        "WITH [withStatement] AS (SELECT o.[EmployeeID], SUM(o.[Freight]) AS 'Total', \
         ROW_NUMBER() OVER(ORDER BY o.[EmployeeID] ASC) AS ESRN FROM [Orders] o \
         GROUP BY o.[EmployeeID] HAVING SUM(o.[Freight]) > @Freight1) \
         SELECT * FROM [withStatement] WHERE ESRN BETWEEN 1 AND 5 ORDER BY ESRN ASC"
    );
}

#[test]
fn test_page_uses_configured_names() {
    let options = CompileOptions {
        row_number_column: String::from("RowNum"),
        paging_cte_name: String::from("paged"),
        ..CompileOptions::default()
    };
    let text = compile_with(&ordered_employees().page(2, 25), options).text;
    assert!(text.starts_with("WITH [paged] AS (SELECT"));
    assert!(text.ends_with(
        "SELECT * FROM [paged] WHERE RowNum BETWEEN 26 AND 50 ORDER BY RowNum ASC"
    ));
}

#[test]
fn test_page_rejects_set_operations() {
    let o = orders("o");
    let employee = o.col("EmployeeID");
    let query = ordered_employees().union(o.select(employee)).page(1, 10);
    assert!(matches!(compile_err(&query), CompileError::InvalidPaging(_)));
}

#[test]
fn test_take_without_skip() {
    let e = employees("e");
    let id = e.col("EmployeeID");
    let query = e.select(id.clone()).order_by(id.expr().asc()).take(5);
    assert_eq!(
        compile(&query).text,
        "SELECT e.[EmployeeID] FROM [Employees] e ORDER BY e.[EmployeeID] ASC \
         OFFSET 0 ROWS FETCH NEXT 5 ROWS ONLY"
    );
}

#[test]
fn test_skip_without_take() {
    let e = employees("e");
    let id = e.col("EmployeeID");
    let query = e.select(id.clone()).order_by(id.expr().asc()).skip(10);
    assert_eq!(
        compile(&query).text,
        "SELECT e.[EmployeeID] FROM [Employees] e ORDER BY e.[EmployeeID] ASC OFFSET 10 ROWS"
    );
}

#[test]
fn test_partition_top() {
    let e = employees("e");
    let o = Arc::new(orders("o"));
    let od = Arc::new(order_details("od"));
    let id = e.col("EmployeeID");
    let last = e.col("LastName");
    let first = e.col("FirstName");

    let spec = PartitionTop::new(1)
        .partition_by(id.clone())
        .distinct_by(id.clone())
        .order_by(last.clone())
        .order_by(o.col("Freight"))
        .order_by(od.col("Quantity").expr().desc());
    let query = e
        .select(id.clone())
        .select(last.clone())
        .select(first)
        .inner_join(Arc::clone(&o), id.clone().eq_column(o.col("EmployeeID")))
        .inner_join(Arc::clone(&od), o.col("OrderID").eq_column(od.col("OrderID")))
        .where_clause(id.lt(6))
        .order_by(last.expr().asc())
        .partition_top(spec);

    let statement = compile(&query);
    assert_eq!(
        statement.text,
        "SELECT e.[EmployeeID], e.[LastName], e.[FirstName] FROM [Employees] e \
         INNER JOIN (SELECT DISTINCT [EmployeeID] FROM (SELECT e.[EmployeeID], \
         ROW_NUMBER() OVER(PARTITION BY e.[EmployeeID] ORDER BY e.[LastName], o.[Freight], \
         od.[Quantity] DESC) AS ESRN FROM [Employees] e \
         INNER JOIN [Orders] o ON e.[EmployeeID] = o.[EmployeeID] \
         INNER JOIN [Order Details] od ON o.[OrderID] = od.[OrderID] \
         WHERE e.[EmployeeID] < @EmployeeID1) r WHERE ESRN <= 1) ij \
         ON ij.[EmployeeID] = e.[EmployeeID] ORDER BY e.[LastName] ASC"
    );
    assert_eq!(common::parameter_names(&statement), ["@EmployeeID1"]);
}

#[test]
fn test_partition_top_shape_per_key() {
    let e = employees("e");
    let o = Arc::new(orders("o"));
    let id = e.col("EmployeeID");
    let reports_to = e.col("ReportsTo");
    let order_date = o.col("OrderDate");

    let spec = PartitionTop::new(3)
        .partition_by(reports_to.clone())
        .distinct_by(id.clone())
        .distinct_by(reports_to)
        .order_by(order_date.expr().desc());
    let query = e
        .select(id.clone())
        .left_join(Arc::clone(&o), id.eq_column(o.col("EmployeeID")))
        .partition_top(spec);

    let text = compile(&query).text;
    assert_eq!(text.matches("ROW_NUMBER()").count(), 1);
    assert_eq!(text.matches("SELECT DISTINCT").count(), 1);
    assert!(text.contains("SELECT DISTINCT [EmployeeID], [ReportsTo] FROM"));
    assert!(text.contains("WHERE ESRN <= 3) ij"));
    assert!(text.ends_with(
        "ON ij.[EmployeeID] = e.[EmployeeID] AND ij.[ReportsTo] = e.[ReportsTo]"
    ));
}

#[test]
fn test_partition_top_rejects_grouping() {
    let e = employees("e");
    let id = e.col("EmployeeID");
    let title = e.col("Title");
    let spec = PartitionTop::new(1)
        .partition_by(title.clone())
        .distinct_by(id.clone())
        .order_by(id.expr().asc());
    let query = e.select(title.clone()).group_by(title).partition_top(spec);
    assert!(matches!(compile_err(&query), CompileError::InvalidPaging(_)));
}

#[test]
fn test_offset_fetch_requires_order_by() {
    let e = employees("e");
    let id = e.col("EmployeeID");
    let query = e.select(id).take(5);
    assert!(matches!(compile_err(&query), CompileError::InvalidPaging(_)));
}

#[test]
fn test_partition_top_rejects_repeated_key_names() {
    let e = employees("e");
    let o = Arc::new(orders("o"));
    let id = e.col("EmployeeID");
    let spec = PartitionTop::new(1)
        .partition_by(id.clone())
        .distinct_by(id.clone())
        .distinct_by(o.col("EmployeeID"))
        .order_by(id.clone().expr().asc());
    let query = e
        .select(id.clone())
        .inner_join(Arc::clone(&o), id.eq_column(o.col("EmployeeID")))
        .partition_top(spec);
    assert!(matches!(compile_err(&query), CompileError::InvalidPaging(_)));
}
