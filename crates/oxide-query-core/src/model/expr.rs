//! Column references and scalar expressions.

use std::sync::Arc;

use super::decorator::{CastType, Decorator, DecoratorKind};
use super::predicate::{Comparison, PredicateList};
use super::scope::Scope;
use crate::value::{SqlValue, ToSqlValue};

const RAW_OPEN: char = '<';
const RAW_CLOSE: char = '>';

/// A column reference, optionally bound to the scope that owns it.
#[derive(Debug, Clone)]
pub struct Column {
    /// Owning scope; `None` never qualifies.
    pub scope: Option<Arc<Scope>>,
    /// Column name, or a `<...>` wrapped raw fragment.
    pub name: String,
}

impl Column {
    /// Creates a column owned by `scope`.
    #[must_use]
    pub fn new(scope: &Arc<Scope>, name: &str) -> Self {
        Self {
            scope: Some(Arc::clone(scope)),
            name: String::from(name),
        }
    }

    /// Creates a column that never qualifies.
    #[must_use]
    pub fn unscoped(name: &str) -> Self {
        Self {
            scope: None,
            name: String::from(name),
        }
    }

    /// Creates a raw SQL fragment emitted verbatim wherever a column fits.
    #[must_use]
    pub fn raw(sql: &str) -> Self {
        Self {
            scope: None,
            name: format!("{RAW_OPEN}{sql}{RAW_CLOSE}"),
        }
    }

    /// Returns the fragment text when this is a raw column.
    #[must_use]
    pub fn literal(&self) -> Option<&str> {
        let inner = self.name.strip_prefix(RAW_OPEN)?;
        Some(inner.strip_suffix(RAW_CLOSE).unwrap_or(inner))
    }

    /// Wraps the column in an expression.
    #[must_use]
    pub fn expr(self) -> Expression {
        Expression::from(self)
    }
}

/// The undecorated core of an expression.
#[derive(Debug, Clone)]
pub enum ExprBase {
    /// A column reference.
    Column(Column),
    /// A previously declared output alias.
    AliasRef(String),
    /// A parenthesized binary arithmetic operation.
    Math(Box<MathExpr>),
    /// A CASE expression.
    Case(Box<CaseExpr>),
    /// A window function with its OVER clause.
    Window(Box<WindowExpr>),
}

/// A scalar expression: a base plus decorators, an alias and DISTINCT.
#[derive(Debug, Clone)]
pub struct Expression {
    /// Undecorated base.
    pub base: ExprBase,
    /// Decorators in application order.
    pub decorators: Vec<Decorator>,
    /// Output alias.
    pub alias: Option<String>,
    /// Prefix the decorated argument with DISTINCT.
    pub distinct: bool,
}

impl Expression {
    /// Creates an expression around a base.
    #[must_use]
    pub const fn new(base: ExprBase) -> Self {
        Self {
            base,
            decorators: Vec::new(),
            alias: None,
            distinct: false,
        }
    }

    /// References an alias declared elsewhere in the statement.
    #[must_use]
    pub fn alias_ref(alias: &str) -> Self {
        Self::new(ExprBase::AliasRef(String::from(alias)))
    }

    /// Builds a CASE expression.
    #[must_use]
    pub fn case(case: CaseExpr) -> Self {
        Self::new(ExprBase::Case(Box::new(case)))
    }

    /// Builds a window function expression.
    #[must_use]
    pub fn window(window: WindowExpr) -> Self {
        Self::new(ExprBase::Window(Box::new(window)))
    }

    /// Returns the column when the base is a column reference.
    #[must_use]
    pub const fn column(&self) -> Option<&Column> {
        match &self.base {
            ExprBase::Column(column) => Some(column),
            _ => None,
        }
    }

    /// Returns `true` when the base is a raw fragment.
    #[must_use]
    pub fn is_literal(&self) -> bool {
        self.column().and_then(Column::literal).is_some()
    }

    #[must_use]
    pub fn alias(mut self, alias: &str) -> Self {
        self.alias = Some(String::from(alias));
        self
    }

    #[must_use]
    pub const fn distinct(mut self) -> Self {
        self.distinct = true;
        self
    }

    /// Appends a decorator; later decorators wrap earlier ones.
    #[must_use]
    pub fn decorate(mut self, decorator: impl Into<Decorator>) -> Self {
        self.decorators.push(decorator.into());
        self
    }

    #[must_use]
    pub fn lower(self) -> Self {
        self.decorate(DecoratorKind::Lower)
    }

    #[must_use]
    pub fn upper(self) -> Self {
        self.decorate(DecoratorKind::Upper)
    }

    #[must_use]
    pub fn ltrim(self) -> Self {
        self.decorate(DecoratorKind::LTrim)
    }

    #[must_use]
    pub fn rtrim(self) -> Self {
        self.decorate(DecoratorKind::RTrim)
    }

    #[must_use]
    pub fn trim(self) -> Self {
        self.decorate(DecoratorKind::Trim)
    }

    #[must_use]
    pub fn substring(self, start: Option<i64>, length: i64) -> Self {
        self.decorate(Decorator::substring(start, length))
    }

    #[must_use]
    pub fn coalesce(self, expressions: &str) -> Self {
        self.decorate(Decorator::coalesce(expressions))
    }

    /// Truncates a date-time to midnight.
    #[must_use]
    pub fn date(self) -> Self {
        self.decorate(DecoratorKind::Date)
    }

    #[must_use]
    pub fn length(self) -> Self {
        self.decorate(DecoratorKind::Length)
    }

    #[must_use]
    pub fn round(self, digits: i64) -> Self {
        self.decorate(Decorator::round(digits))
    }

    #[must_use]
    pub fn date_part(self, unit: &str) -> Self {
        self.decorate(Decorator::date_part(unit))
    }

    #[must_use]
    pub fn avg(self) -> Self {
        self.decorate(DecoratorKind::Avg)
    }

    #[must_use]
    pub fn count(self) -> Self {
        self.decorate(DecoratorKind::Count)
    }

    #[must_use]
    pub fn max(self) -> Self {
        self.decorate(DecoratorKind::Max)
    }

    #[must_use]
    pub fn min(self) -> Self {
        self.decorate(DecoratorKind::Min)
    }

    #[must_use]
    pub fn std_dev(self) -> Self {
        self.decorate(DecoratorKind::StdDev)
    }

    #[must_use]
    pub fn sum(self) -> Self {
        self.decorate(DecoratorKind::Sum)
    }

    #[must_use]
    pub fn var(self) -> Self {
        self.decorate(DecoratorKind::Var)
    }

    #[must_use]
    pub fn cast(self, cast: CastType) -> Self {
        self.decorate(Decorator::cast(cast))
    }

    #[must_use]
    pub fn cast_with_length(self, cast: CastType, length: u32) -> Self {
        self.decorate(Decorator::cast_with_length(cast, length))
    }

    #[must_use]
    pub fn cast_with_precision(self, cast: CastType, precision: u8, scale: u8) -> Self {
        self.decorate(Decorator::cast_with_precision(cast, precision, scale))
    }

    /// Builds `(self <op> operand)`.
    #[must_use]
    pub fn math(self, op: ArithmeticOp, operand: impl Into<MathOperand>) -> Self {
        Self::new(ExprBase::Math(Box::new(MathExpr {
            op,
            left: self,
            right: operand.into(),
            left_first: true,
        })))
    }

    /// Builds `(operand <op> self)`.
    #[must_use]
    pub fn math_right_first(self, op: ArithmeticOp, operand: impl Into<MathOperand>) -> Self {
        Self::new(ExprBase::Math(Box::new(MathExpr {
            op,
            left: self,
            right: operand.into(),
            left_first: false,
        })))
    }

    /// Orders ascending.
    #[must_use]
    pub fn asc(self) -> OrderByItem {
        OrderByItem::new(self, Some(Direction::Ascending))
    }

    /// Orders descending.
    #[must_use]
    pub fn desc(self) -> OrderByItem {
        OrderByItem::new(self, Some(Direction::Descending))
    }
}

impl From<Column> for Expression {
    fn from(column: Column) -> Self {
        Self::new(ExprBase::Column(column))
    }
}

/// Binary arithmetic operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArithmeticOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
}

impl ArithmeticOp {
    /// Returns the operator with its surrounding spaces.
    #[must_use]
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::Add => " + ",
            Self::Subtract => " - ",
            Self::Multiply => " * ",
            Self::Divide => " / ",
            Self::Modulo => " % ",
        }
    }
}

/// Second operand of a math expression.
#[derive(Debug, Clone)]
pub enum MathOperand {
    Expression(Expression),
    Literal(SqlValue),
}

impl MathOperand {
    /// A typed literal operand.
    #[must_use]
    pub fn value<T: ToSqlValue>(value: T) -> Self {
        Self::Literal(value.to_sql_value())
    }
}

impl From<Expression> for MathOperand {
    fn from(expression: Expression) -> Self {
        Self::Expression(expression)
    }
}

impl From<Column> for MathOperand {
    fn from(column: Column) -> Self {
        Self::Expression(column.into())
    }
}

/// `left <op> right`, or `right <op> left` when `left_first` is false.
#[derive(Debug, Clone)]
pub struct MathExpr {
    pub op: ArithmeticOp,
    pub left: Expression,
    pub right: MathOperand,
    pub left_first: bool,
}

/// A THEN, ELSE or simple WHEN value.
#[derive(Debug, Clone)]
pub enum CaseBranch {
    Expression(Expression),
    Literal(SqlValue),
}

impl CaseBranch {
    /// A literal branch, written inline.
    #[must_use]
    pub fn value<T: ToSqlValue>(value: T) -> Self {
        Self::Literal(value.to_sql_value())
    }
}

impl From<Expression> for CaseBranch {
    fn from(expression: Expression) -> Self {
        Self::Expression(expression)
    }
}

impl From<Column> for CaseBranch {
    fn from(column: Column) -> Self {
        Self::Expression(column.into())
    }
}

/// The test of one WHEN arm.
#[derive(Debug, Clone)]
pub enum CaseCondition {
    /// A search condition.
    Predicate(PredicateList),
    /// A value, for simple CASE forms.
    Value(CaseBranch),
}

impl From<PredicateList> for CaseCondition {
    fn from(predicate: PredicateList) -> Self {
        Self::Predicate(predicate)
    }
}

impl From<Comparison> for CaseCondition {
    fn from(comparison: Comparison) -> Self {
        Self::Predicate(comparison.into())
    }
}

impl From<CaseBranch> for CaseCondition {
    fn from(branch: CaseBranch) -> Self {
        Self::Value(branch)
    }
}

/// One `WHEN ... THEN ...` arm.
#[derive(Debug, Clone)]
pub struct WhenThen {
    pub when: CaseCondition,
    pub then: CaseBranch,
}

/// `CASE WHEN ... THEN ... [ELSE ...] END`.
#[derive(Debug, Clone, Default)]
pub struct CaseExpr {
    pub whens: Vec<WhenThen>,
    pub otherwise: Option<CaseBranch>,
}

impl CaseExpr {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            whens: Vec::new(),
            otherwise: None,
        }
    }

    /// Adds a WHEN arm.
    #[must_use]
    pub fn when(mut self, when: impl Into<CaseCondition>, then: impl Into<CaseBranch>) -> Self {
        self.whens.push(WhenThen {
            when: when.into(),
            then: then.into(),
        });
        self
    }

    /// Sets the ELSE branch.
    #[must_use]
    pub fn otherwise(mut self, branch: impl Into<CaseBranch>) -> Self {
        self.otherwise = Some(branch.into());
        self
    }
}

/// Ranking or aggregate function used with OVER.
#[derive(Debug, Clone)]
pub enum WindowFunction {
    RowNumber,
    Rank,
    DenseRank,
    Ntile(u32),
    Sum(Expression),
    Avg(Expression),
    Count(Expression),
    Min(Expression),
    Max(Expression),
}

impl WindowFunction {
    /// Returns the function name.
    #[must_use]
    pub const fn sql_name(&self) -> &'static str {
        match self {
            Self::RowNumber => "ROW_NUMBER",
            Self::Rank => "RANK",
            Self::DenseRank => "DENSE_RANK",
            Self::Ntile(_) => "NTILE",
            Self::Sum(_) => "SUM",
            Self::Avg(_) => "AVG",
            Self::Count(_) => "COUNT",
            Self::Min(_) => "MIN",
            Self::Max(_) => "MAX",
        }
    }
}

/// `FUNC(arg) OVER(PARTITION BY ... ORDER BY ...)`.
#[derive(Debug, Clone)]
pub struct WindowExpr {
    pub function: WindowFunction,
    pub partition_by: Vec<Expression>,
    pub order_by: Vec<OrderByItem>,
}

impl WindowExpr {
    #[must_use]
    pub const fn new(function: WindowFunction) -> Self {
        Self {
            function,
            partition_by: Vec::new(),
            order_by: Vec::new(),
        }
    }

    #[must_use]
    pub fn partition_by(mut self, expression: impl Into<Expression>) -> Self {
        self.partition_by.push(expression.into());
        self
    }

    #[must_use]
    pub fn order_by(mut self, item: impl Into<OrderByItem>) -> Self {
        self.order_by.push(item.into());
        self
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

impl Direction {
    #[must_use]
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::Ascending => "ASC",
            Self::Descending => "DESC",
        }
    }
}

/// An ORDER BY entry.
#[derive(Debug, Clone)]
pub struct OrderByItem {
    pub expression: Expression,
    /// `None` emits no direction keyword.
    pub direction: Option<Direction>,
}

impl OrderByItem {
    #[must_use]
    pub const fn new(expression: Expression, direction: Option<Direction>) -> Self {
        Self {
            expression,
            direction,
        }
    }
}

impl From<Expression> for OrderByItem {
    fn from(expression: Expression) -> Self {
        Self::new(expression, None)
    }
}

impl From<Column> for OrderByItem {
    fn from(column: Column) -> Self {
        Self::new(column.into(), None)
    }
}
