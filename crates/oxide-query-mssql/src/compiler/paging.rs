//! Page-numbered and partition-top statement shapes.

use oxide_query_core::dialect::Dialect;
use oxide_query_core::model::{page_bounds, PartitionTop, Query};
use oxide_query_core::{CompileError, Result};

use super::Compiler;
use crate::context::CompileContext;

fn invalid(reason: &str) -> CompileError {
    CompileError::InvalidPaging(String::from(reason))
}

impl Compiler<'_> {
    /// Wraps the statement in a row-number CTE and selects one page of it.
    ///
    /// ```text
    /// WITH [withStatement] AS (SELECT ..., ROW_NUMBER() OVER(ORDER BY ...) AS ESRN
    /// FROM ... WHERE ... GROUP BY ... HAVING ...)
    /// SELECT * FROM [withStatement] WHERE ESRN BETWEEN 21 AND 30 ORDER BY ESRN ASC
    /// ```
    pub(super) fn page_numbered(
        &self,
        ctx: &mut CompileContext,
        query: &Query,
        number: u32,
        size: u32,
    ) -> Result<String> {
        if number == 0 || size == 0 {
            return Err(invalid("page number and page size must be positive"));
        }
        if query.order_by.is_empty() {
            return Err(invalid("page-numbered paging requires an ORDER BY"));
        }
        if !query.set_operations.is_empty() {
            return Err(invalid("page-numbered paging cannot carry set operations"));
        }
        if ctx.depth() > 1 {
            return Err(invalid("page-numbered paging cannot be nested in another statement"));
        }

        let select = self.select_clause(ctx, query)?;
        let order = self.order_by_list(ctx, &query.order_by)?;
        let from = self.from_clause(ctx, query)?;
        let joins = self.join_clause(ctx, query)?;
        let applies = self.apply_clause(ctx, query)?;
        let filter = self.where_clause(ctx, query)?;
        let group = self.group_by_clause(ctx, query)?;
        let having = self.having_clause(ctx, query)?;

        let (first, last) = page_bounds(number, size);
        let cte = self.dialect.quote_identifier(&self.options.paging_cte_name);
        let row_number = &self.options.row_number_column;

        Ok(format!(
            "WITH {cte} AS (SELECT {select}, ROW_NUMBER() OVER(ORDER BY {order}) AS {row_number} \
             FROM {from}{joins}{applies}{filter}{group}{having}) \
             SELECT * FROM {cte} WHERE {row_number} BETWEEN {first} AND {last} \
             ORDER BY {row_number} ASC"
        ))
    }

    /// Keeps at most `max_per_partition` rows per partition key.
    ///
    /// The innermost statement ranks rows inside each partition, the middle
    /// one de-duplicates the distinct-by keys of the surviving rows, and the
    /// outer one joins those keys back to the root table.
    pub(super) fn partition_top(
        &self,
        ctx: &mut CompileContext,
        query: &Query,
        spec: &PartitionTop,
    ) -> Result<String> {
        if spec.max_per_partition == 0 {
            return Err(invalid("rows per partition must be positive"));
        }
        if spec.partition_by.is_empty() || spec.distinct_by.is_empty() {
            return Err(invalid("partition-top requires partition and distinct-by columns"));
        }
        if spec.order_by.is_empty() {
            return Err(invalid("partition-top requires a ranking order"));
        }
        if query.from_query.is_some() {
            return Err(invalid("partition-top cannot select from a sub-query"));
        }
        if !query.set_operations.is_empty() {
            return Err(invalid("partition-top cannot carry set operations"));
        }
        if !query.group_by.is_empty() || !query.having_items.is_empty() {
            return Err(invalid("partition-top cannot carry GROUP BY or HAVING"));
        }
        let root_alias = query.scope.join_alias().ok_or(CompileError::MissingAlias {
            context: "partition-top root",
        })?;

        let select = self.select_clause(ctx, query)?;
        let root = self.table_source(&query.scope, query.with_no_lock);

        for (i, column) in spec.distinct_by.iter().enumerate() {
            if column.literal().is_some() {
                return Err(invalid("partition-top distinct-by columns cannot be raw SQL"));
            }
            if spec.distinct_by[..i]
                .iter()
                .any(|earlier| earlier.name.eq_ignore_ascii_case(&column.name))
            {
                return Err(CompileError::InvalidPaging(format!(
                    "partition-top distinct-by column '{}' appears twice",
                    column.name
                )));
            }
        }

        let mut keys = Vec::with_capacity(spec.distinct_by.len());
        let mut ranked_keys = Vec::with_capacity(spec.distinct_by.len());
        for column in &spec.distinct_by {
            keys.push(self.dialect.quote_identifier(&column.name));
            ranked_keys.push(self.qualify_column(ctx, column)?);
        }
        let mut partition = Vec::with_capacity(spec.partition_by.len());
        for column in &spec.partition_by {
            partition.push(self.qualify_column(ctx, column)?);
        }
        let rank_order = self.order_by_list(ctx, &spec.order_by)?;

        let from = self.from_clause(ctx, query)?;
        let joins = self.join_clause(ctx, query)?;
        let applies = self.apply_clause(ctx, query)?;
        let filter = self.where_clause(ctx, query)?;

        let ranked = &self.options.ranked_alias;
        let key_set = &self.options.partition_keys_alias;
        let row_number = &self.options.row_number_column;
        let on: Vec<String> = keys
            .iter()
            .map(|key| format!("{key_set}.{key} = {root_alias}.{key}"))
            .collect();

        let mut sql = format!(
            "SELECT {select} FROM {root} INNER JOIN (SELECT DISTINCT {keys} FROM \
             (SELECT {ranked_keys}, ROW_NUMBER() OVER(PARTITION BY {partition} ORDER BY {rank_order}) \
             AS {row_number} FROM {from}{joins}{applies}{filter}) {ranked} \
             WHERE {row_number} <= {max}) {key_set} ON {on}",
            keys = keys.join(", "),
            ranked_keys = ranked_keys.join(", "),
            partition = partition.join(", "),
            max = spec.max_per_partition,
            on = on.join(" AND "),
        );
        sql.push_str(&self.order_by_clause(ctx, query)?);
        Ok(sql)
    }
}
