//! Predicate token streams.
//!
//! A predicate is a flat list of tokens read left to right. Nesting is
//! expressed only through explicit parenthesis tokens, so the list mirrors
//! the emitted text one token at a time.

use std::sync::Arc;

use super::expr::{Column, Expression};
use super::query::Query;
use crate::value::{SqlValue, ToSqlValue};

/// A parenthesis token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Paren {
    Open,
    Close,
}

/// A conjunction token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Conjunction {
    And,
    Or,
    AndNot,
    OrNot,
}

impl Conjunction {
    /// Returns the keyword with its surrounding spaces.
    #[must_use]
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::And => " AND ",
            Self::Or => " OR ",
            Self::AndNot => " AND NOT ",
            Self::OrNot => " OR NOT ",
        }
    }
}

/// One token of a predicate stream.
#[derive(Debug, Clone)]
pub enum PredicateToken {
    Paren(Paren),
    Conjunction(Conjunction),
    /// Raw boolean SQL, emitted verbatim.
    Literal(String),
    Comparison(Box<Comparison>),
}

impl PredicateToken {
    /// Returns `true` for tokens that can stand on either side of a
    /// conjunction once closed.
    #[must_use]
    pub const fn ends_operand(&self) -> bool {
        matches!(
            self,
            Self::Literal(_) | Self::Comparison(_) | Self::Paren(Paren::Close)
        )
    }
}

/// An ordered predicate token stream.
#[derive(Debug, Clone, Default)]
pub struct PredicateList {
    tokens: Vec<PredicateToken>,
}

impl PredicateList {
    #[must_use]
    pub const fn new() -> Self {
        Self { tokens: Vec::new() }
    }

    #[must_use]
    pub fn tokens(&self) -> &[PredicateToken] {
        &self.tokens
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Appends a token as-is, without any structural help.
    #[must_use]
    pub fn push(mut self, token: PredicateToken) -> Self {
        self.tokens.push(token);
        self
    }

    /// Whether an OR sits outside every parenthesis.
    fn has_top_level_or(&self) -> bool {
        let mut depth = 0_usize;
        self.tokens.iter().any(|token| match token {
            PredicateToken::Paren(Paren::Open) => {
                depth += 1;
                false
            }
            PredicateToken::Paren(Paren::Close) => {
                depth = depth.saturating_sub(1);
                false
            }
            PredicateToken::Conjunction(Conjunction::Or | Conjunction::OrNot) => depth == 0,
            PredicateToken::Conjunction(_)
            | PredicateToken::Literal(_)
            | PredicateToken::Comparison(_) => false,
        })
    }

    fn join(mut self, conjunction: Conjunction, other: impl Into<Self>) -> Self {
        let other = other.into();
        if other.is_empty() {
            return self;
        }
        if self.is_empty() {
            return other;
        }
        let complete = self.tokens.last().is_some_and(PredicateToken::ends_operand);
        if complete
            && matches!(conjunction, Conjunction::And | Conjunction::AndNot)
            && self.has_top_level_or()
        {
            self = self.group();
        }
        if complete {
            self.tokens.push(PredicateToken::Conjunction(conjunction));
        }
        if other.tokens.len() > 1 {
            self.tokens.push(PredicateToken::Paren(Paren::Open));
            self.tokens.extend(other.tokens);
            self.tokens.push(PredicateToken::Paren(Paren::Close));
        } else {
            self.tokens.extend(other.tokens);
        }
        self
    }

    /// Appends `AND other`.
    ///
    /// A multi-token `other` is parenthesized when something precedes it,
    /// and an existing top-level OR is grouped first so it keeps binding
    /// tighter than the new AND.
    #[must_use]
    pub fn and(self, other: impl Into<Self>) -> Self {
        self.join(Conjunction::And, other)
    }

    /// Appends `OR other`. A multi-token `other` is parenthesized when
    /// something precedes it.
    #[must_use]
    pub fn or(self, other: impl Into<Self>) -> Self {
        self.join(Conjunction::Or, other)
    }

    #[must_use]
    pub fn and_not(self, other: impl Into<Self>) -> Self {
        self.join(Conjunction::AndNot, other)
    }

    #[must_use]
    pub fn or_not(self, other: impl Into<Self>) -> Self {
        self.join(Conjunction::OrNot, other)
    }

    #[must_use]
    pub fn open(self) -> Self {
        self.push(PredicateToken::Paren(Paren::Open))
    }

    #[must_use]
    pub fn close(self) -> Self {
        self.push(PredicateToken::Paren(Paren::Close))
    }

    /// Appends raw SQL.
    #[must_use]
    pub fn literal(self, sql: &str) -> Self {
        self.push(PredicateToken::Literal(String::from(sql)))
    }

    /// Wraps the whole list in parentheses.
    #[must_use]
    pub fn group(self) -> Self {
        if self.is_empty() {
            return self;
        }
        let mut tokens = Vec::with_capacity(self.tokens.len() + 2);
        tokens.push(PredicateToken::Paren(Paren::Open));
        tokens.extend(self.tokens);
        tokens.push(PredicateToken::Paren(Paren::Close));
        Self { tokens }
    }
}

impl From<Comparison> for PredicateList {
    fn from(comparison: Comparison) -> Self {
        Self {
            tokens: vec![PredicateToken::Comparison(Box::new(comparison))],
        }
    }
}

/// Comparison operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonOp {
    Equal,
    NotEqual,
    GreaterThan,
    LessThan,
    LessThanOrEqual,
    GreaterThanOrEqual,
    Like,
    NotLike,
    /// Full-text CONTAINS.
    Contains,
    IsNull,
    IsNotNull,
    In,
    NotIn,
    Between,
    Exists,
    NotExists,
}

impl ComparisonOp {
    /// Returns the infix symbol for binary comparison operators.
    #[must_use]
    pub const fn infix(self) -> Option<&'static str> {
        match self {
            Self::Equal => Some(" = "),
            Self::NotEqual => Some(" <> "),
            Self::GreaterThan => Some(" > "),
            Self::LessThan => Some(" < "),
            Self::LessThanOrEqual => Some(" <= "),
            Self::GreaterThanOrEqual => Some(" >= "),
            _ => None,
        }
    }
}

/// Sub-query search condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Quantifier {
    All,
    Any,
    Some,
}

impl Quantifier {
    #[must_use]
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::All => "ALL",
            Self::Any => "ANY",
            Self::Some => "SOME",
        }
    }
}

/// One entry of an inline IN list.
#[derive(Debug, Clone)]
pub enum InItem {
    Value(SqlValue),
    /// A nested list, flattened one level when rendered.
    List(Vec<SqlValue>),
}

impl InItem {
    #[must_use]
    pub fn value<T: ToSqlValue>(value: T) -> Self {
        Self::Value(value.to_sql_value())
    }

    #[must_use]
    pub fn list<T: ToSqlValue>(values: Vec<T>) -> Self {
        Self::List(values.into_iter().map(ToSqlValue::to_sql_value).collect())
    }
}

/// One side of a BETWEEN range.
#[derive(Debug, Clone)]
pub enum Bound {
    Value(SqlValue),
    Column(Column),
}

impl Bound {
    #[must_use]
    pub fn value<T: ToSqlValue>(value: T) -> Self {
        Self::Value(value.to_sql_value())
    }
}

impl From<Column> for Bound {
    fn from(column: Column) -> Self {
        Self::Column(column)
    }
}

/// Right-hand side of a comparison.
#[derive(Debug, Clone)]
pub enum RightOperand {
    /// Unary operators.
    None,
    /// Bound as a parameter.
    Value(SqlValue),
    /// Column-to-column comparison.
    Column(Column),
    SubQuery {
        query: Arc<Query>,
        quantifier: Option<Quantifier>,
    },
    /// Inline IN list.
    List(Vec<InItem>),
    Range {
        low: Bound,
        high: Bound,
    },
}

/// A single comparison token.
#[derive(Debug, Clone)]
pub struct Comparison {
    /// Left operand; absent for EXISTS.
    pub left: Option<Expression>,
    pub op: ComparisonOp,
    pub right: RightOperand,
    /// Emit the left operand before the right one.
    pub left_first: bool,
    /// LIKE escape character.
    pub like_escape: Option<char>,
}

impl Comparison {
    /// Creates a comparison with the left operand first.
    #[must_use]
    pub fn new(left: impl Into<Expression>, op: ComparisonOp, right: RightOperand) -> Self {
        Self {
            left: Some(left.into()),
            op,
            right,
            left_first: true,
            like_escape: None,
        }
    }

    /// `EXISTS (query)`.
    #[must_use]
    pub fn exists(query: impl Into<Arc<Query>>) -> Self {
        Self::unary_query(ComparisonOp::Exists, query.into())
    }

    /// `NOT EXISTS (query)`.
    #[must_use]
    pub fn not_exists(query: impl Into<Arc<Query>>) -> Self {
        Self::unary_query(ComparisonOp::NotExists, query.into())
    }

    const fn unary_query(op: ComparisonOp, query: Arc<Query>) -> Self {
        Self {
            left: None,
            op,
            right: RightOperand::SubQuery {
                query,
                quantifier: None,
            },
            left_first: true,
            like_escape: None,
        }
    }

    /// Emits the right operand first.
    #[must_use]
    pub const fn right_first(mut self) -> Self {
        self.left_first = false;
        self
    }

    /// Sets the LIKE escape character.
    #[must_use]
    pub const fn escape(mut self, ch: char) -> Self {
        self.like_escape = Some(ch);
        self
    }

    /// Combines with AND.
    #[must_use]
    pub fn and(self, other: impl Into<PredicateList>) -> PredicateList {
        PredicateList::from(self).and(other)
    }

    /// Combines with OR.
    #[must_use]
    pub fn or(self, other: impl Into<PredicateList>) -> PredicateList {
        PredicateList::from(self).or(other)
    }
}

/// Comparison constructors for anything usable as a left operand.
pub trait Compare: Into<Expression> + Sized {
    /// `self = value`.
    fn eq<T: ToSqlValue>(self, value: T) -> Comparison {
        Comparison::new(self, ComparisonOp::Equal, RightOperand::Value(value.to_sql_value()))
    }

    /// `self <> value`.
    fn not_eq<T: ToSqlValue>(self, value: T) -> Comparison {
        Comparison::new(self, ComparisonOp::NotEqual, RightOperand::Value(value.to_sql_value()))
    }

    /// `self > value`.
    fn gt<T: ToSqlValue>(self, value: T) -> Comparison {
        Comparison::new(self, ComparisonOp::GreaterThan, RightOperand::Value(value.to_sql_value()))
    }

    /// `self >= value`.
    fn gt_eq<T: ToSqlValue>(self, value: T) -> Comparison {
        Comparison::new(
            self,
            ComparisonOp::GreaterThanOrEqual,
            RightOperand::Value(value.to_sql_value()),
        )
    }

    /// `self < value`.
    fn lt<T: ToSqlValue>(self, value: T) -> Comparison {
        Comparison::new(self, ComparisonOp::LessThan, RightOperand::Value(value.to_sql_value()))
    }

    /// `self <= value`.
    fn lt_eq<T: ToSqlValue>(self, value: T) -> Comparison {
        Comparison::new(
            self,
            ComparisonOp::LessThanOrEqual,
            RightOperand::Value(value.to_sql_value()),
        )
    }

    /// `self = other` between two columns.
    fn eq_column(self, other: Column) -> Comparison {
        self.compare_column(ComparisonOp::Equal, other)
    }

    /// `self <op> other` between two columns.
    fn compare_column(self, op: ComparisonOp, other: Column) -> Comparison {
        Comparison::new(self, op, RightOperand::Column(other))
    }

    /// `self <op> [quantifier] (query)`.
    fn compare_query(
        self,
        op: ComparisonOp,
        query: impl Into<Arc<Query>>,
        quantifier: Option<Quantifier>,
    ) -> Comparison {
        Comparison::new(
            self,
            op,
            RightOperand::SubQuery {
                query: query.into(),
                quantifier,
            },
        )
    }

    fn like<T: ToSqlValue>(self, pattern: T) -> Comparison {
        Comparison::new(self, ComparisonOp::Like, RightOperand::Value(pattern.to_sql_value()))
    }

    fn not_like<T: ToSqlValue>(self, pattern: T) -> Comparison {
        Comparison::new(self, ComparisonOp::NotLike, RightOperand::Value(pattern.to_sql_value()))
    }

    /// Full-text `CONTAINS(self, term)`.
    fn contains<T: ToSqlValue>(self, term: T) -> Comparison {
        Comparison::new(self, ComparisonOp::Contains, RightOperand::Value(term.to_sql_value()))
    }

    fn is_null(self) -> Comparison {
        Comparison::new(self, ComparisonOp::IsNull, RightOperand::None)
    }

    fn is_not_null(self) -> Comparison {
        Comparison::new(self, ComparisonOp::IsNotNull, RightOperand::None)
    }

    /// `self IN (...)` with an inline list.
    fn in_list(self, items: Vec<InItem>) -> Comparison {
        Comparison::new(self, ComparisonOp::In, RightOperand::List(items))
    }

    /// `self NOT IN (...)` with an inline list.
    fn not_in_list(self, items: Vec<InItem>) -> Comparison {
        Comparison::new(self, ComparisonOp::NotIn, RightOperand::List(items))
    }

    /// `self IN (...)` over plain values.
    fn in_values<T: ToSqlValue>(self, values: Vec<T>) -> Comparison {
        self.in_list(values.into_iter().map(InItem::value).collect())
    }

    fn in_query(self, query: impl Into<Arc<Query>>) -> Comparison {
        self.compare_query(ComparisonOp::In, query, None)
    }

    fn not_in_query(self, query: impl Into<Arc<Query>>) -> Comparison {
        self.compare_query(ComparisonOp::NotIn, query, None)
    }

    /// `self BETWEEN low AND high` with either bound a value or a column.
    fn between(self, low: Bound, high: Bound) -> Comparison {
        Comparison::new(self, ComparisonOp::Between, RightOperand::Range { low, high })
    }

    /// `self BETWEEN low AND high` over two values.
    fn between_values<T: ToSqlValue, U: ToSqlValue>(self, low: T, high: U) -> Comparison {
        self.between(Bound::value(low), Bound::value(high))
    }
}

impl Compare for Column {}
impl Compare for Expression {}
