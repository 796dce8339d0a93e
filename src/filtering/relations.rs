use sea_orm::sea_query::{
    Alias, Asterisk, ConditionalStatement, Expr, Func, JoinType, Query, SelectStatement, SimpleExpr,
    SubQueryStatement,
};

use crate::core::RelationLink;
use crate::query::SortDirection;

/// A subquery over a relation chain, correlated with the parent table.
///
/// `alias` names the last table of the chain inside the subquery.
struct RelationScope {
    statement: SelectStatement,
    alias: String,
}

fn scope_alias(link: &RelationLink, depth: usize) -> String {
    format!("{}_{depth}", link.name)
}

/// `FROM first AS first_1 [JOIN next AS next_2 ON ...] WHERE first_1.fk = parent.local`
fn relation_scope(parent: &str, chain: &[RelationLink]) -> Option<RelationScope> {
    let (first, rest) = chain.split_first()?;
    let mut alias = scope_alias(first, 1);

    let mut statement = Query::select();
    statement
        .from_as(Alias::new(first.table), Alias::new(&alias))
        .and_where(
            Expr::col((Alias::new(&alias), Alias::new(first.foreign_key)))
                .equals((Alias::new(parent), Alias::new(first.local_key))),
        );

    for (offset, link) in rest.iter().enumerate() {
        let next = scope_alias(link, offset + 2);
        statement.join_as(
            JoinType::InnerJoin,
            Alias::new(link.table),
            Alias::new(&next),
            Expr::col((Alias::new(&next), Alias::new(link.foreign_key)))
                .equals((Alias::new(&alias), Alias::new(link.local_key))),
        );
        alias = next;
    }

    Some(RelationScope { statement, alias })
}

fn scalar_subquery(statement: SelectStatement) -> SimpleExpr {
    SimpleExpr::SubQuery(None, Box::new(SubQueryStatement::SelectStatement(statement)))
}

/// Relation-existence predicate: at least one row reached through `chain`
/// satisfies the constraint built by `constrain` against the subquery alias.
///
/// Returns `None` when the chain is empty or `constrain` yields nothing.
pub fn where_has<F>(parent: &str, chain: &[RelationLink], constrain: F) -> Option<SimpleExpr>
where
    F: FnOnce(&str) -> Option<SimpleExpr>,
{
    let RelationScope { mut statement, alias } = relation_scope(parent, chain)?;
    let constraint = constrain(&alias)?;
    statement.expr(Expr::val(1)).and_where(constraint);
    Some(Expr::exists(statement))
}

/// Correlated `MIN` (ascending) or `MAX` (descending) of `attribute` over
/// the rows reached through `chain`.
pub fn related_aggregate(
    parent: &str,
    chain: &[RelationLink],
    attribute: &str,
    direction: SortDirection,
) -> Option<SimpleExpr> {
    let RelationScope { mut statement, alias } = relation_scope(parent, chain)?;
    let column = Expr::col((Alias::new(&alias), Alias::new(attribute)));
    let aggregate = match direction {
        SortDirection::Asc => Func::min(column),
        SortDirection::Desc => Func::max(column),
    };
    statement.expr(aggregate);
    Some(scalar_subquery(statement))
}

/// Correlated `COUNT(*)` of the rows reached through `chain`.
pub fn related_count(parent: &str, chain: &[RelationLink]) -> Option<SimpleExpr> {
    let RelationScope { mut statement, .. } = relation_scope(parent, chain)?;
    statement.expr(Func::count(Expr::col(Asterisk)));
    Some(scalar_subquery(statement))
}
