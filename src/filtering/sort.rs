use sea_orm::{
    DbErr,
    sea_query::{Alias, Expr, SimpleExpr},
};

use super::relations::related_aggregate;
use crate::core::{TableResource, resolve_relation};
use crate::query::SortClause;

/// Build the ORDER BY expression for a sort clause.
///
/// Direct columns are left unqualified so computed aliases such as
/// `comments_count` stay sortable. Relational columns order by a correlated
/// `MIN`/`MAX` of the related attribute.
///
/// # Errors
///
/// Returns `DbErr::Custom` when a relational column names an undefined relation.
pub fn build_order_expr<T: TableResource>(clause: &SortClause) -> Result<SimpleExpr, DbErr> {
    let attribute = clause.column.attribute.as_str();
    let Some(path) = &clause.column.relation else {
        return Ok(Expr::col(Alias::new(attribute)).into());
    };

    let chain = resolve_relation(T::relations(), path, T::RESOURCE_NAME)?;
    related_aggregate(&T::table_name(), &chain, attribute, clause.direction).ok_or_else(|| {
        DbErr::Custom(format!(
            "cannot sort `{}` on resource `{}`",
            clause.column,
            T::RESOURCE_NAME
        ))
    })
}
