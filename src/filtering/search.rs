use sea_orm::{
    Condition, DatabaseBackend, DbErr,
    sea_query::{Alias, Expr, Func, SimpleExpr},
};

use super::relations::where_has;
use crate::core::{TableResource, resolve_relation};
use crate::query::SearchClause;

// Basic safety limits
const MAX_SEARCH_QUERY_LENGTH: usize = 10_000;

/// Escape LIKE wildcards so they match literally.
/// Escapes: % (match any) and _ (match single char)
fn escape_like_wildcards(input: &str) -> String {
    input
        .replace('\\', "\\\\") // Escape backslash first
        .replace('%', "\\%")
        .replace('_', "\\_")
}

/// Cut the term to the length limit without splitting a character.
fn truncate_term(term: &str) -> &str {
    if term.len() <= MAX_SEARCH_QUERY_LENGTH {
        return term;
    }
    let mut end = MAX_SEARCH_QUERY_LENGTH;
    while !term.is_char_boundary(end) {
        end -= 1;
    }
    &term[..end]
}

/// Case-insensitive substring match:
/// `UPPER(table.column) LIKE UPPER('%term%') ESCAPE '\'`.
///
/// Both sides are folded by the database so they agree on which characters
/// have a case. `PostgreSQL` has no `UPPER` for non-text types, so the column
/// is cast to text there first.
#[must_use]
pub fn build_like_condition(
    table: &str,
    column: &str,
    term: &str,
    backend: DatabaseBackend,
) -> SimpleExpr {
    let column = Expr::col((Alias::new(table), Alias::new(column)));
    let pattern = format!("%{}%", escape_like_wildcards(term));

    let upper = match backend {
        DatabaseBackend::Postgres => Func::upper(column.cast_as(Alias::new("TEXT"))),
        _ => Func::upper(column),
    };

    Expr::cust_with_exprs(
        "$1 LIKE $2 ESCAPE $3",
        [
            upper.into(),
            Func::upper(Expr::val(pattern)).into(),
            Expr::val("\\").into(),
        ],
    )
}

/// Build the OR-group for a search clause.
///
/// Relational columns match through a relation-existence predicate. Returns
/// `None` when no column contributes a predicate, so an empty group never
/// filters anything out.
///
/// # Errors
///
/// Returns `DbErr::Custom` when a relational column names an undefined relation.
pub fn build_search_condition<T: TableResource>(
    clause: &SearchClause,
    backend: DatabaseBackend,
) -> Result<Option<Condition>, DbErr> {
    let table = T::table_name();
    let term = truncate_term(&clause.term);
    if term.is_empty() {
        return Ok(None);
    }

    let mut any = Condition::any();
    let mut matched = 0_usize;

    for column in &clause.columns {
        let expr = match &column.relation {
            Some(path) => {
                let chain = resolve_relation(T::relations(), path, T::RESOURCE_NAME)?;
                where_has(&table, &chain, |alias| {
                    Some(build_like_condition(alias, &column.attribute, term, backend))
                })
            }
            None => Some(build_like_condition(&table, &column.attribute, term, backend)),
        };
        if let Some(expr) = expr {
            any = any.add(expr);
            matched += 1;
        }
    }

    Ok((matched > 0).then_some(any))
}
