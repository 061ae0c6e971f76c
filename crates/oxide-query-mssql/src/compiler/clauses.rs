//! Clause builders.

use oxide_query_core::dialect::Dialect;
use oxide_query_core::model::{OrderByItem, Query, Scope, SelectItem};
use oxide_query_core::{CompileError, Result};

use super::Compiler;
use crate::context::CompileContext;

impl Compiler<'_> {
    /// `[DISTINCT ][TOP n ]` followed by the select list, or `*`.
    pub(super) fn select_clause(&self, ctx: &mut CompileContext, query: &Query) -> Result<String> {
        let mut sql = String::new();
        if query.distinct {
            sql.push_str("DISTINCT ");
        }
        if let Some(top) = query.top {
            sql.push_str(&format!("TOP {top} "));
        }

        let mut items = Vec::with_capacity(query.select.len() + 1);
        for item in &query.select {
            items.push(self.select_item(ctx, item)?);
        }
        if let Some(count) = &query.count_all {
            let mut text = String::from("COUNT(*)");
            if let Some(alias) = &count.alias {
                text.push_str(" AS ");
                text.push_str(&self.dialect.quote_string(alias));
            }
            items.push(text);
        }

        if items.is_empty() {
            sql.push('*');
        } else {
            sql.push_str(&items.join(", "));
        }
        Ok(sql)
    }

    fn select_item(&self, ctx: &mut CompileContext, item: &SelectItem) -> Result<String> {
        match item {
            SelectItem::Expression(expression) => self.render_expression(ctx, expression, false, true),
            SelectItem::SubQuery(sub) => {
                let alias = sub.scope.output_alias().ok_or(CompileError::MissingAlias {
                    context: "SELECT sub-query",
                })?;
                let text = self.compile_nested(ctx, sub)?;
                Ok(format!("({text}) AS {alias}"))
            }
            SelectItem::AllColumns(scope) => Ok(scope
                .join_alias()
                .or_else(|| scope.output_alias())
                .map_or_else(|| String::from("*"), |alias| format!("{alias}.*"))),
        }
    }

    /// The table or nested statement after FROM.
    pub(super) fn from_clause(&self, ctx: &mut CompileContext, query: &Query) -> Result<String> {
        match &query.from_query {
            Some(sub) => {
                let alias = sub.scope.output_alias().ok_or(CompileError::MissingAlias {
                    context: "FROM sub-query",
                })?;
                let text = self.compile_nested(ctx, sub)?;
                Ok(format!("({text}) AS {alias}"))
            }
            None => Ok(self.table_source(&query.scope, query.with_no_lock)),
        }
    }

    /// `[catalog].[schema].[table] alias[ WITH (NOLOCK)]`.
    pub(super) fn table_source(&self, scope: &Scope, no_lock: bool) -> String {
        let mut sql = self.table_name(scope);
        if let Some(alias) = scope.join_alias() {
            sql.push(' ');
            sql.push_str(alias);
        }
        if no_lock {
            sql.push_str(" WITH (NOLOCK)");
        }
        sql
    }

    fn table_name(&self, scope: &Scope) -> String {
        let parts: Vec<String> = scope
            .table()
            .parts()
            .map(|part| self.dialect.quote_identifier(part))
            .collect();
        parts.join(".")
    }

    pub(super) fn join_clause(&self, ctx: &mut CompileContext, query: &Query) -> Result<String> {
        let mut sql = String::new();
        for join in &query.joins {
            if join.on.is_empty() {
                return Err(CompileError::MalformedPredicate {
                    clause: "JOIN",
                    position: 0,
                    reason: String::from("join condition is empty"),
                });
            }
            sql.push(' ');
            sql.push_str(join.kind.as_sql());
            sql.push(' ');
            sql.push_str(&self.table_source(&join.target.scope, query.with_no_lock));
            sql.push_str(" ON ");
            sql.push_str(&self.render_predicate(ctx, &join.on, "JOIN")?);
        }
        Ok(sql)
    }

    /// Lateral sub-queries, exposed under their join alias.
    pub(super) fn apply_clause(&self, ctx: &mut CompileContext, query: &Query) -> Result<String> {
        let mut sql = String::new();
        for apply in &query.applies {
            let scope = &apply.query.scope;
            let alias = scope
                .output_alias()
                .or_else(|| scope.join_alias())
                .ok_or(CompileError::MissingAlias {
                    context: "APPLY sub-query",
                })?;
            let text = self.compile_nested(ctx, &apply.query)?;
            sql.push_str(&format!(" {} ({text}) AS {alias}", apply.kind.as_sql()));
        }
        Ok(sql)
    }

    pub(super) fn where_clause(&self, ctx: &mut CompileContext, query: &Query) -> Result<String> {
        if query.where_items.is_empty() {
            return Ok(String::new());
        }
        let predicate = self.render_predicate(ctx, &query.where_items, "WHERE")?;
        Ok(format!(" WHERE {predicate}"))
    }

    pub(super) fn having_clause(&self, ctx: &mut CompileContext, query: &Query) -> Result<String> {
        if query.having_items.is_empty() {
            return Ok(String::new());
        }
        let predicate = self.render_predicate(ctx, &query.having_items, "HAVING")?;
        Ok(format!(" HAVING {predicate}"))
    }

    pub(super) fn group_by_clause(&self, ctx: &mut CompileContext, query: &Query) -> Result<String> {
        if query.group_by.is_empty() {
            return Ok(String::new());
        }
        let mut items = Vec::with_capacity(query.group_by.len());
        for item in &query.group_by {
            items.push(self.render_expression(ctx, &item.expression, false, false)?);
        }
        let mut sql = format!(" GROUP BY {}", items.join(", "));
        if query.with_rollup {
            sql.push_str(" WITH ROLLUP");
        }
        Ok(sql)
    }

    pub(super) fn order_by_clause(&self, ctx: &mut CompileContext, query: &Query) -> Result<String> {
        if query.order_by.is_empty() {
            return Ok(String::new());
        }
        Ok(format!(" ORDER BY {}", self.order_by_list(ctx, &query.order_by)?))
    }

    /// Comma-separated ORDER BY items; a direction is emitted only when set.
    pub(super) fn order_by_list(&self, ctx: &mut CompileContext, items: &[OrderByItem]) -> Result<String> {
        let mut rendered = Vec::with_capacity(items.len());
        for item in items {
            let mut text = self.render_expression(ctx, &item.expression, false, false)?;
            if let Some(direction) = item.direction {
                text.push(' ');
                text.push_str(direction.as_sql());
            }
            rendered.push(text);
        }
        Ok(rendered.join(", "))
    }

    /// Each right-hand statement is compiled in full, unparenthesized.
    pub(super) fn set_operations(&self, ctx: &mut CompileContext, query: &Query) -> Result<String> {
        let mut sql = String::new();
        for operation in &query.set_operations {
            let text = self.compile_nested(ctx, &operation.query)?;
            sql.push_str(&format!(" {} {text}", operation.kind.as_sql()));
        }
        Ok(sql)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use oxide_query_core::model::{Compare, Query, Scope, TableName};
    use oxide_query_core::NoLookup;

    use super::*;

    #[test]
    fn test_table_source_quotes_every_part() {
        let compiler = Compiler::new(&NoLookup);
        let scope = Scope::new(
            TableName::new("Order Details")
                .with_schema("dbo")
                .with_catalog("Northwind"),
        )
        .with_join_alias("od");
        assert_eq!(
            compiler.table_source(&scope, true),
            "[Northwind].[dbo].[Order Details] od WITH (NOLOCK)"
        );
        let bare = Scope::new(TableName::new("Orders"));
        assert_eq!(compiler.table_source(&bare, false), "[Orders]");
    }

    #[test]
    fn test_empty_join_condition_is_rejected() {
        let compiler = Compiler::new(&NoLookup);
        let orders = Query::new(Scope::new(TableName::new("Orders")).with_join_alias("o"));
        let e = Query::new(Scope::new(TableName::new("Employees")).with_join_alias("e"))
            .inner_join(orders, oxide_query_core::model::PredicateList::new());
        assert!(matches!(
            compiler.compile(&e),
            Err(CompileError::MalformedPredicate { clause: "JOIN", .. })
        ));
    }

    #[test]
    fn test_select_all_of_joined_scope() {
        let compiler = Compiler::new(&NoLookup);
        let orders = Arc::new(Query::new(
            Scope::new(TableName::new("Orders")).with_join_alias("o"),
        ));
        let e = Query::new(Scope::new(TableName::new("Employees")).with_join_alias("e"));
        let on = e.col("EmployeeID").eq_column(orders.col("EmployeeID"));
        let query = e
            .select_all_of(&orders.scope)
            .inner_join(Arc::clone(&orders), on);
        assert_eq!(
            compiler.compile(&query).unwrap().text,
            "SELECT o.* FROM [Employees] e INNER JOIN [Orders] o ON e.[EmployeeID] = o.[EmployeeID]"
        );
    }
}
