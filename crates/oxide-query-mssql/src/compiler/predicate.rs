//! Predicate renderer and parameter binder.

use oxide_query_core::dialect::Dialect;
use oxide_query_core::model::{
    Bound, Comparison, ComparisonOp, DecoratorKind, Expression, InItem, Paren, PredicateList,
    PredicateToken, Quantifier, RightOperand,
};
use oxide_query_core::{CompileError, DbType, Parameter, Result, SqlValue};
use tracing::trace;

use super::Compiler;
use crate::context::CompileContext;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Slot {
    Start,
    Open,
    Operand,
    Conjunction,
}

/// Checks that `tokens` form one well-formed boolean expression.
fn validate(tokens: &[PredicateToken], clause: &'static str) -> Result<()> {
    let mut depth = 0_usize;
    let mut last = Slot::Start;

    for (position, token) in tokens.iter().enumerate() {
        last = match token {
            PredicateToken::Paren(Paren::Open) => {
                if last == Slot::Operand {
                    return Err(CompileError::MalformedPredicate {
                        clause,
                        position,
                        reason: String::from("missing conjunction before '('"),
                    });
                }
                depth += 1;
                Slot::Open
            }
            PredicateToken::Paren(Paren::Close) => {
                if depth == 0 {
                    return Err(CompileError::UnbalancedParentheses { clause });
                }
                match last {
                    Slot::Open => {
                        return Err(CompileError::MalformedPredicate {
                            clause,
                            position,
                            reason: String::from("empty parentheses"),
                        })
                    }
                    Slot::Conjunction => {
                        return Err(CompileError::MisplacedConjunction {
                            clause,
                            position: position - 1,
                        })
                    }
                    Slot::Start | Slot::Operand => {}
                }
                depth -= 1;
                Slot::Operand
            }
            PredicateToken::Conjunction(_) => {
                if last != Slot::Operand {
                    return Err(CompileError::MisplacedConjunction { clause, position });
                }
                Slot::Conjunction
            }
            PredicateToken::Literal(_) | PredicateToken::Comparison(_) => {
                if last == Slot::Operand {
                    return Err(CompileError::MalformedPredicate {
                        clause,
                        position,
                        reason: String::from("missing conjunction between operands"),
                    });
                }
                Slot::Operand
            }
        };
    }

    if depth != 0 {
        return Err(CompileError::UnbalancedParentheses { clause });
    }
    if last == Slot::Conjunction {
        return Err(CompileError::MisplacedConjunction {
            clause,
            position: tokens.len() - 1,
        });
    }
    Ok(())
}

/// Declared type forced onto a bound parameter regardless of its template.
fn parameter_hint(op: ComparisonOp, left: Option<&Expression>) -> Option<DbType> {
    if matches!(
        op,
        ComparisonOp::Like | ComparisonOp::NotLike | ComparisonOp::Contains
    ) {
        return Some(DbType::String);
    }
    let date_part = left.is_some_and(|e| {
        e.decorators
            .iter()
            .any(|d| d.kind == DecoratorKind::DatePart)
    });
    date_part.then_some(DbType::Int32)
}

fn strip_sentinels(sql: &str) -> &str {
    sql.strip_prefix('<')
        .and_then(|inner| inner.strip_suffix('>'))
        .unwrap_or(sql)
}

impl Compiler<'_> {
    /// Renders a predicate token stream, binding parameters as it goes.
    pub(super) fn render_predicate(
        &self,
        ctx: &mut CompileContext,
        predicate: &PredicateList,
        clause: &'static str,
    ) -> Result<String> {
        validate(predicate.tokens(), clause)?;

        let mut sql = String::new();
        for token in predicate.tokens() {
            match token {
                PredicateToken::Paren(Paren::Open) => sql.push('('),
                PredicateToken::Paren(Paren::Close) => sql.push(')'),
                PredicateToken::Conjunction(conjunction) => sql.push_str(conjunction.as_sql()),
                PredicateToken::Literal(text) => sql.push_str(strip_sentinels(text)),
                PredicateToken::Comparison(comparison) => {
                    sql.push_str(&self.render_comparison(ctx, comparison)?);
                }
            }
        }
        Ok(sql)
    }

    fn render_comparison(&self, ctx: &mut CompileContext, comparison: &Comparison) -> Result<String> {
        let op = comparison.op;

        if matches!(op, ComparisonOp::Exists | ComparisonOp::NotExists) {
            let RightOperand::SubQuery { query, .. } = &comparison.right else {
                return Err(malformed(op, "requires a sub-query"));
            };
            let keyword = if op == ComparisonOp::Exists { "EXISTS" } else { "NOT EXISTS" };
            let text = self.compile_nested(ctx, query)?;
            return Ok(format!("{keyword} ({text})"));
        }

        let left = comparison
            .left
            .as_ref()
            .ok_or_else(|| malformed(op, "requires a left operand"))?;

        if let Some(symbol) = op.infix() {
            // operands render in text order so parameters number left to right
            return if comparison.left_first {
                let lhs = self.render_expression(ctx, left, true, false)?;
                let rhs = self.render_right(ctx, comparison, left)?;
                Ok(format!("{lhs}{symbol}{rhs}"))
            } else {
                let rhs = self.render_right(ctx, comparison, left)?;
                let lhs = self.render_expression(ctx, left, true, false)?;
                Ok(format!("{rhs}{symbol}{lhs}"))
            };
        }

        let lhs = self.render_expression(ctx, left, true, false)?;
        match op {
            ComparisonOp::Like | ComparisonOp::NotLike => {
                let keyword = if op == ComparisonOp::Like { "LIKE" } else { "NOT LIKE" };
                let rhs = self.render_right(ctx, comparison, left)?;
                let mut sql = format!("{lhs} {keyword} {rhs}");
                if let Some(escape) = comparison.like_escape {
                    sql.push_str(" ESCAPE ");
                    sql.push_str(&self.dialect.quote_string(&escape.to_string()));
                }
                Ok(sql)
            }
            ComparisonOp::Contains => {
                let rhs = self.render_right(ctx, comparison, left)?;
                Ok(format!("CONTAINS({lhs}, {rhs})"))
            }
            ComparisonOp::IsNull => Ok(format!("{lhs} IS NULL")),
            ComparisonOp::IsNotNull => Ok(format!("{lhs} IS NOT NULL")),
            ComparisonOp::In | ComparisonOp::NotIn => {
                let keyword = if op == ComparisonOp::In { "IN" } else { "NOT IN" };
                match &comparison.right {
                    RightOperand::SubQuery { query, .. } => {
                        let text = self.compile_nested(ctx, query)?;
                        Ok(format!("{lhs} {keyword} ({text})"))
                    }
                    RightOperand::List(items) => {
                        Ok(format!("{lhs} {keyword} ({})", self.inline_list(op, items)?))
                    }
                    _ => Err(malformed(op, "requires a value list or a sub-query")),
                }
            }
            ComparisonOp::Between => {
                let RightOperand::Range { low, high } = &comparison.right else {
                    return Err(malformed(op, "requires a range"));
                };
                let low = self.render_bound(ctx, op, left, low)?;
                let high = self.render_bound(ctx, op, left, high)?;
                Ok(format!("{lhs} BETWEEN {low} AND {high}"))
            }
            ComparisonOp::Equal
            | ComparisonOp::NotEqual
            | ComparisonOp::GreaterThan
            | ComparisonOp::LessThan
            | ComparisonOp::LessThanOrEqual
            | ComparisonOp::GreaterThanOrEqual
            | ComparisonOp::Exists
            | ComparisonOp::NotExists => Err(malformed(op, "unexpected operator")),
        }
    }

    /// A parameter, a qualified column or a parenthesized sub-query.
    fn render_right(
        &self,
        ctx: &mut CompileContext,
        comparison: &Comparison,
        left: &Expression,
    ) -> Result<String> {
        match &comparison.right {
            RightOperand::Value(value) => self.bind(ctx, comparison.op, left, value.clone()),
            RightOperand::Column(column) => self.qualify_column(ctx, column),
            RightOperand::SubQuery { query, quantifier } => {
                let text = self.compile_nested(ctx, query)?;
                Ok(match quantifier.map(Quantifier::as_sql) {
                    Some(quantifier) => format!("{quantifier} ({text})"),
                    None => format!("({text})"),
                })
            }
            RightOperand::None | RightOperand::List(_) | RightOperand::Range { .. } => {
                Err(malformed(comparison.op, "requires a value, a column or a sub-query"))
            }
        }
    }

    fn render_bound(
        &self,
        ctx: &mut CompileContext,
        op: ComparisonOp,
        left: &Expression,
        bound: &Bound,
    ) -> Result<String> {
        match bound {
            Bound::Value(value) => self.bind(ctx, op, left, value.clone()),
            Bound::Column(column) => self.qualify_column(ctx, column),
        }
    }

    /// Inline IN list. Nested lists are flattened one level; nothing binds.
    fn inline_list(&self, op: ComparisonOp, items: &[InItem]) -> Result<String> {
        let mut values = Vec::with_capacity(items.len());
        for item in items {
            match item {
                InItem::Value(value) => values.push(value.to_sql_inline(&self.dialect)),
                InItem::List(list) => {
                    values.extend(list.iter().map(|value| value.to_sql_inline(&self.dialect)));
                }
            }
        }
        if values.is_empty() {
            return Err(malformed(op, "value list is empty"));
        }
        Ok(values.join(", "))
    }

    /// Binds `value` and returns its placeholder.
    ///
    /// The name comes from the left column's property name when its scope
    /// has metadata, and from the expression stem otherwise. A template from
    /// the lookup supplies the declared shape; it is cloned, never changed.
    fn bind(
        &self,
        ctx: &mut CompileContext,
        op: ComparisonOp,
        left: &Expression,
        value: SqlValue,
    ) -> Result<String> {
        let column = left.column().filter(|c| c.literal().is_none());
        let table = column.and_then(|c| c.scope.as_deref()).and_then(|s| s.metadata());
        let metadata = column.zip(table).and_then(|(c, t)| t.columns.find_by_column_name(&c.name));

        let stem = metadata.map_or(self.options.expression_parameter_stem.as_str(), |m| {
            m.property_name.as_str()
        });
        let name = format!(
            "{}{stem}{}",
            self.dialect.parameter_prefix(),
            ctx.next_parameter_index()?
        );

        let template = table.zip(metadata).and_then(|(t, m)| {
            self.lookup
                .lookup(&t.data_id, &t.provider, &t.columns)
                .and_then(|templates| templates.get(&m.name).cloned())
        });
        let mut parameter = match template {
            Some(template) => template.from_template(&name, value),
            None => Parameter::untyped(&name, value),
        };
        if let Some(hint) = parameter_hint(op, Some(left)) {
            parameter.db_type = Some(hint);
        }

        trace!(name = %parameter.name, db_type = ?parameter.db_type, "bound parameter");
        ctx.bind(parameter);
        Ok(name)
    }
}

fn malformed(op: ComparisonOp, reason: &str) -> CompileError {
    CompileError::MalformedComparison(format!("{op:?} {reason}"))
}
