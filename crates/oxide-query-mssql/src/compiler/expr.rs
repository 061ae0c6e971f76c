//! Expression renderer and column qualification.

use oxide_query_core::dialect::Dialect;
use oxide_query_core::model::{
    CaseBranch, CaseCondition, CaseExpr, Column, ExprBase, Expression, MathExpr, MathOperand,
    WindowExpr, WindowFunction,
};
use oxide_query_core::{CompileError, Result};

use super::Compiler;
use crate::context::CompileContext;

impl Compiler<'_> {
    /// Renders one expression.
    ///
    /// `inner` marks an operand of a larger expression; inner expressions
    /// never carry an alias. `wants_alias` is set only by the SELECT list.
    pub(super) fn render_expression(
        &self,
        ctx: &mut CompileContext,
        expression: &Expression,
        inner: bool,
        wants_alias: bool,
    ) -> Result<String> {
        let alias_allowed = !inner && wants_alias;

        let base = match &expression.base {
            ExprBase::Column(column) => {
                if let Some(raw) = column.literal() {
                    return Ok(String::from(raw));
                }
                self.qualify_column(ctx, column)?
            }
            ExprBase::AliasRef(alias) => self.dialect.quote_identifier(alias),
            ExprBase::Math(math) => self.render_math(ctx, math)?,
            ExprBase::Case(case) => {
                let text = self.render_case(ctx, case)?;
                return Ok(self.with_alias(text, expression.alias.as_deref(), alias_allowed));
            }
            ExprBase::Window(window) => {
                let text = self.render_window(ctx, window)?;
                return Ok(self.with_alias(text, expression.alias.as_deref(), alias_allowed));
            }
        };

        let sql = if expression.decorators.is_empty() {
            base
        } else if expression.distinct {
            self.apply_decorators(&format!("DISTINCT {base}"), &expression.decorators)?
        } else {
            self.apply_decorators(&base, &expression.decorators)?
        };

        if alias_allowed && (!expression.decorators.is_empty() || expression.alias.is_some()) {
            let alias = expression
                .alias
                .as_deref()
                .or_else(|| expression.column().map(|c| c.name.as_str()));
            return Ok(self.with_alias(sql, alias, true));
        }
        Ok(sql)
    }

    fn with_alias(&self, mut sql: String, alias: Option<&str>, allowed: bool) -> String {
        if let (true, Some(alias)) = (allowed, alias) {
            sql.push_str(" AS ");
            sql.push_str(&self.dialect.quote_string(alias));
        }
        sql
    }

    /// Qualifies a column for the statement currently being compiled.
    ///
    /// Inside its own scope a column uses the scope's join alias. From an
    /// enclosing statement it uses the output alias when the scope has one,
    /// and the join alias otherwise.
    pub(super) fn qualify_column(&self, ctx: &CompileContext, column: &Column) -> Result<String> {
        if let Some(raw) = column.literal() {
            return Ok(String::from(raw));
        }
        let name = self.dialect.quote_identifier(&column.name);
        let Some(scope) = column.scope.as_deref() else {
            return Ok(name);
        };
        if scope.is_unaliased() {
            return Ok(name);
        }
        if !ctx.is_visible(scope.id()) {
            return Err(CompileError::AmbiguousQualification {
                column: column.name.clone(),
                table: scope.table().to_string(),
            });
        }

        let qualifier = if ctx.is_in_sub_query(scope.id()) {
            scope.join_alias()
        } else {
            scope.output_alias().or_else(|| scope.join_alias())
        };
        Ok(match qualifier {
            Some(alias) => format!("{alias}.{name}"),
            None => name,
        })
    }

    fn render_math(&self, ctx: &mut CompileContext, math: &MathExpr) -> Result<String> {
        let op = math.op.as_sql();
        if math.left_first {
            let left = self.render_expression(ctx, &math.left, true, true)?;
            let right = self.render_math_operand(ctx, &math.right)?;
            Ok(format!("({left}{op}{right})"))
        } else {
            let right = self.render_math_operand(ctx, &math.right)?;
            let left = self.render_expression(ctx, &math.left, true, true)?;
            Ok(format!("({right}{op}{left})"))
        }
    }

    fn render_math_operand(&self, ctx: &mut CompileContext, operand: &MathOperand) -> Result<String> {
        match operand {
            MathOperand::Expression(expression) => self.render_expression(ctx, expression, true, true),
            MathOperand::Literal(value) => Ok(value.to_sql_inline(&self.dialect)),
        }
    }

    fn render_case(&self, ctx: &mut CompileContext, case: &CaseExpr) -> Result<String> {
        if case.whens.is_empty() {
            return Err(CompileError::MalformedExpression(String::from(
                "CASE requires at least one WHEN",
            )));
        }

        let mut sql = String::from("CASE");
        for arm in &case.whens {
            sql.push_str(" WHEN ");
            match &arm.when {
                CaseCondition::Predicate(predicate) => {
                    sql.push_str(&self.render_predicate(ctx, predicate, "CASE")?);
                }
                CaseCondition::Value(branch) => sql.push_str(&self.render_branch(ctx, branch)?),
            }
            sql.push_str(" THEN ");
            sql.push_str(&self.render_branch(ctx, &arm.then)?);
        }
        if let Some(otherwise) = &case.otherwise {
            sql.push_str(" ELSE ");
            sql.push_str(&self.render_branch(ctx, otherwise)?);
        }
        sql.push_str(" END");
        Ok(sql)
    }

    fn render_branch(&self, ctx: &mut CompileContext, branch: &CaseBranch) -> Result<String> {
        match branch {
            CaseBranch::Expression(expression) => self.render_expression(ctx, expression, true, false),
            CaseBranch::Literal(value) => Ok(value.to_sql_inline(&self.dialect)),
        }
    }

    fn render_window(&self, ctx: &mut CompileContext, window: &WindowExpr) -> Result<String> {
        let argument = match &window.function {
            WindowFunction::RowNumber | WindowFunction::Rank | WindowFunction::DenseRank => {
                String::new()
            }
            WindowFunction::Ntile(buckets) => buckets.to_string(),
            WindowFunction::Sum(e)
            | WindowFunction::Avg(e)
            | WindowFunction::Count(e)
            | WindowFunction::Min(e)
            | WindowFunction::Max(e) => self.render_expression(ctx, e, true, false)?,
        };

        let mut over = Vec::with_capacity(2);
        if !window.partition_by.is_empty() {
            let mut columns = Vec::with_capacity(window.partition_by.len());
            for expression in &window.partition_by {
                columns.push(self.render_expression(ctx, expression, true, false)?);
            }
            over.push(format!("PARTITION BY {}", columns.join(", ")));
        }
        if !window.order_by.is_empty() {
            over.push(format!("ORDER BY {}", self.order_by_list(ctx, &window.order_by)?));
        }

        Ok(format!(
            "{}({argument}) OVER({})",
            window.function.sql_name(),
            over.join(" ")
        ))
    }
}
