//! The query node and its clause specs.

use std::sync::Arc;

use super::expr::{Column, Expression, OrderByItem};
use super::predicate::PredicateList;
use super::scope::Scope;

/// One entry of the SELECT list.
#[derive(Debug, Clone)]
pub enum SelectItem {
    Expression(Expression),
    /// A scalar sub-query, exposed under its output alias.
    SubQuery(Arc<Query>),
    /// `alias.*` for a joined scope.
    AllColumns(Arc<Scope>),
}

impl From<Expression> for SelectItem {
    fn from(expression: Expression) -> Self {
        Self::Expression(expression)
    }
}

impl From<Column> for SelectItem {
    fn from(column: Column) -> Self {
        Self::Expression(column.into())
    }
}

/// `COUNT(*)` in the SELECT list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CountAll {
    pub alias: Option<String>,
}

/// Join kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    Inner,
    Left,
    Right,
    Full,
}

impl JoinKind {
    #[must_use]
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::Inner => "INNER JOIN",
            Self::Left => "LEFT JOIN",
            Self::Right => "RIGHT JOIN",
            Self::Full => "FULL JOIN",
        }
    }
}

/// A joined table. The target's scope supplies table and join alias.
#[derive(Debug, Clone)]
pub struct JoinSpec {
    pub kind: JoinKind,
    pub target: Arc<Query>,
    pub on: PredicateList,
}

/// Lateral apply kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyKind {
    Cross,
    Outer,
}

impl ApplyKind {
    #[must_use]
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::Cross => "CROSS APPLY",
            Self::Outer => "OUTER APPLY",
        }
    }
}

/// A lateral sub-query, exposed under its join alias.
#[derive(Debug, Clone)]
pub struct ApplySpec {
    pub kind: ApplyKind,
    pub query: Arc<Query>,
}

#[derive(Debug, Clone)]
pub struct GroupByItem {
    pub expression: Expression,
}

/// Set operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetOperationKind {
    Union,
    UnionAll,
    Intersect,
    Except,
}

impl SetOperationKind {
    #[must_use]
    pub const fn as_sql(self) -> &'static str {
        match self {
            Self::Union => "UNION",
            Self::UnionAll => "UNION ALL",
            Self::Intersect => "INTERSECT",
            Self::Except => "EXCEPT",
        }
    }
}

#[derive(Debug, Clone)]
pub struct SetOperation {
    pub kind: SetOperationKind,
    pub query: Arc<Query>,
}

/// At most `max_per_partition` rows per distinct partition key.
#[derive(Debug, Clone)]
pub struct PartitionTop {
    pub partition_by: Vec<Column>,
    pub distinct_by: Vec<Column>,
    /// Ranking order inside each partition.
    pub order_by: Vec<OrderByItem>,
    pub max_per_partition: u32,
}

impl PartitionTop {
    #[must_use]
    pub const fn new(max_per_partition: u32) -> Self {
        Self {
            partition_by: Vec::new(),
            distinct_by: Vec::new(),
            order_by: Vec::new(),
            max_per_partition,
        }
    }

    #[must_use]
    pub fn partition_by(mut self, column: Column) -> Self {
        self.partition_by.push(column);
        self
    }

    #[must_use]
    pub fn distinct_by(mut self, column: Column) -> Self {
        self.distinct_by.push(column);
        self
    }

    #[must_use]
    pub fn order_by(mut self, item: impl Into<OrderByItem>) -> Self {
        self.order_by.push(item.into());
        self
    }
}

/// Paging strategy. Exactly one applies to a node.
#[derive(Debug, Clone)]
pub enum Paging {
    /// One-based page number and page size, via a row-number CTE.
    Page { number: u32, size: u32 },
    /// Trailing OFFSET/FETCH.
    Window { skip: Option<u64>, take: Option<u64> },
    PartitionTop(PartitionTop),
}

/// Returns the inclusive one-based row range of a page.
#[must_use]
pub fn page_bounds(number: u32, size: u32) -> (u64, u64) {
    let first = u64::from(number.saturating_sub(1)) * u64::from(size) + 1;
    let last = first + u64::from(size.saturating_sub(1));
    (first, last)
}

/// One query node.
///
/// Nodes are immutable once built and shared through `Arc`, so the same
/// node can appear as the outer statement and as a nested sub-query.
#[derive(Debug, Clone)]
pub struct Query {
    pub scope: Arc<Scope>,
    pub distinct: bool,
    pub top: Option<u64>,
    pub select: Vec<SelectItem>,
    pub count_all: Option<CountAll>,
    /// Replaces the scope table in FROM with a nested statement.
    pub from_query: Option<Arc<Query>>,
    pub joins: Vec<JoinSpec>,
    pub applies: Vec<ApplySpec>,
    pub where_items: PredicateList,
    pub group_by: Vec<GroupByItem>,
    pub with_rollup: bool,
    pub having_items: PredicateList,
    pub order_by: Vec<OrderByItem>,
    pub set_operations: Vec<SetOperation>,
    pub paging: Option<Paging>,
    pub with_no_lock: bool,
}

impl Query {
    /// Creates an empty query over a scope.
    #[must_use]
    pub fn new(scope: Scope) -> Self {
        Self::over(Arc::new(scope))
    }

    /// Creates an empty query over a shared scope.
    #[must_use]
    pub const fn over(scope: Arc<Scope>) -> Self {
        Self {
            scope,
            distinct: false,
            top: None,
            select: Vec::new(),
            count_all: None,
            from_query: None,
            joins: Vec::new(),
            applies: Vec::new(),
            where_items: PredicateList::new(),
            group_by: Vec::new(),
            with_rollup: false,
            having_items: PredicateList::new(),
            order_by: Vec::new(),
            set_operations: Vec::new(),
            paging: None,
            with_no_lock: false,
        }
    }

    /// A column of this node's scope.
    #[must_use]
    pub fn col(&self, name: &str) -> Column {
        Column::new(&self.scope, name)
    }

    #[must_use]
    pub fn select(mut self, item: impl Into<SelectItem>) -> Self {
        self.select.push(item.into());
        self
    }

    /// Selects a scalar sub-query under its output alias.
    #[must_use]
    pub fn select_sub_query(mut self, query: impl Into<Arc<Query>>) -> Self {
        self.select.push(SelectItem::SubQuery(query.into()));
        self
    }

    /// Selects `alias.*` for another scope.
    #[must_use]
    pub fn select_all_of(mut self, scope: &Arc<Scope>) -> Self {
        self.select.push(SelectItem::AllColumns(Arc::clone(scope)));
        self
    }

    #[must_use]
    pub const fn distinct(mut self) -> Self {
        self.distinct = true;
        self
    }

    #[must_use]
    pub const fn top(mut self, rows: u64) -> Self {
        self.top = Some(rows);
        self
    }

    /// Adds `COUNT(*)` to the SELECT list.
    #[must_use]
    pub fn count_all(mut self, alias: Option<&str>) -> Self {
        self.count_all = Some(CountAll {
            alias: alias.map(String::from),
        });
        self
    }

    /// Selects from a nested statement instead of the scope table.
    #[must_use]
    pub fn from_query(mut self, query: impl Into<Arc<Query>>) -> Self {
        self.from_query = Some(query.into());
        self
    }

    #[must_use]
    pub fn join(
        mut self,
        kind: JoinKind,
        target: impl Into<Arc<Query>>,
        on: impl Into<PredicateList>,
    ) -> Self {
        self.joins.push(JoinSpec {
            kind,
            target: target.into(),
            on: on.into(),
        });
        self
    }

    #[must_use]
    pub fn inner_join(self, target: impl Into<Arc<Query>>, on: impl Into<PredicateList>) -> Self {
        self.join(JoinKind::Inner, target, on)
    }

    #[must_use]
    pub fn left_join(self, target: impl Into<Arc<Query>>, on: impl Into<PredicateList>) -> Self {
        self.join(JoinKind::Left, target, on)
    }

    #[must_use]
    pub fn right_join(self, target: impl Into<Arc<Query>>, on: impl Into<PredicateList>) -> Self {
        self.join(JoinKind::Right, target, on)
    }

    #[must_use]
    pub fn full_join(self, target: impl Into<Arc<Query>>, on: impl Into<PredicateList>) -> Self {
        self.join(JoinKind::Full, target, on)
    }

    #[must_use]
    pub fn cross_apply(mut self, query: impl Into<Arc<Query>>) -> Self {
        self.applies.push(ApplySpec {
            kind: ApplyKind::Cross,
            query: query.into(),
        });
        self
    }

    #[must_use]
    pub fn outer_apply(mut self, query: impl Into<Arc<Query>>) -> Self {
        self.applies.push(ApplySpec {
            kind: ApplyKind::Outer,
            query: query.into(),
        });
        self
    }

    /// Adds a WHERE condition, ANDed with any existing one.
    #[must_use]
    pub fn where_clause(mut self, predicate: impl Into<PredicateList>) -> Self {
        self.where_items = std::mem::take(&mut self.where_items).and(predicate);
        self
    }

    #[must_use]
    pub fn group_by(mut self, expression: impl Into<Expression>) -> Self {
        self.group_by.push(GroupByItem {
            expression: expression.into(),
        });
        self
    }

    #[must_use]
    pub const fn with_rollup(mut self) -> Self {
        self.with_rollup = true;
        self
    }

    /// Adds a HAVING condition, ANDed with any existing one.
    #[must_use]
    pub fn having(mut self, predicate: impl Into<PredicateList>) -> Self {
        self.having_items = std::mem::take(&mut self.having_items).and(predicate);
        self
    }

    #[must_use]
    pub fn order_by(mut self, item: impl Into<OrderByItem>) -> Self {
        self.order_by.push(item.into());
        self
    }

    fn set_operation(mut self, kind: SetOperationKind, query: Arc<Self>) -> Self {
        self.set_operations.push(SetOperation { kind, query });
        self
    }

    #[must_use]
    pub fn union(self, query: impl Into<Arc<Query>>) -> Self {
        self.set_operation(SetOperationKind::Union, query.into())
    }

    #[must_use]
    pub fn union_all(self, query: impl Into<Arc<Query>>) -> Self {
        self.set_operation(SetOperationKind::UnionAll, query.into())
    }

    #[must_use]
    pub fn intersect(self, query: impl Into<Arc<Query>>) -> Self {
        self.set_operation(SetOperationKind::Intersect, query.into())
    }

    #[must_use]
    pub fn except(self, query: impl Into<Arc<Query>>) -> Self {
        self.set_operation(SetOperationKind::Except, query.into())
    }

    /// Pages through a ranked result; replaces any other paging.
    #[must_use]
    pub fn page(mut self, number: u32, size: u32) -> Self {
        self.paging = Some(Paging::Page { number, size });
        self
    }

    /// Skips rows with OFFSET; keeps a previously set `take`.
    #[must_use]
    pub fn skip(mut self, rows: u64) -> Self {
        let take = match self.paging {
            Some(Paging::Window { take, .. }) => take,
            _ => None,
        };
        self.paging = Some(Paging::Window {
            skip: Some(rows),
            take,
        });
        self
    }

    /// Limits rows with FETCH NEXT; keeps a previously set `skip`.
    #[must_use]
    pub fn take(mut self, rows: u64) -> Self {
        let skip = match self.paging {
            Some(Paging::Window { skip, .. }) => skip,
            _ => None,
        };
        self.paging = Some(Paging::Window {
            skip,
            take: Some(rows),
        });
        self
    }

    /// Limits rows per partition; replaces any other paging.
    #[must_use]
    pub fn partition_top(mut self, spec: PartitionTop) -> Self {
        self.paging = Some(Paging::PartitionTop(spec));
        self
    }

    #[must_use]
    pub const fn with_no_lock(mut self) -> Self {
        self.with_no_lock = true;
        self
    }
}
