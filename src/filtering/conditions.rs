use sea_orm::{
    Condition, DatabaseBackend, DbErr, Value,
    sea_query::{Alias, Expr, SimpleExpr},
};
use serde_json::Value as JsonValue;
use uuid::Uuid;

use super::relations::where_has;
use crate::core::{TableResource, resolve_relation};
use crate::query::{FilterClause, FilterPredicate};

/// Convert a JSON filter value into a bindable SQL value.
///
/// Strings holding a UUID bind as `uuid` on `PostgreSQL`, where comparing a
/// `uuid` column to text fails. `null`, arrays and objects have no scalar
/// form and yield `None`.
#[must_use]
pub fn json_to_value(value: &JsonValue, backend: DatabaseBackend) -> Option<Value> {
    match value {
        JsonValue::Bool(flag) => Some(Value::from(*flag)),
        JsonValue::Number(number) => number
            .as_i64()
            .map(Value::from)
            .or_else(|| number.as_u64().map(Value::from))
            .or_else(|| number.as_f64().map(Value::from)),
        JsonValue::String(text) => {
            if backend == DatabaseBackend::Postgres
                && let Ok(uuid) = Uuid::parse_str(text.trim())
            {
                return Some(Value::from(uuid));
            }
            Some(Value::from(text.clone()))
        }
        JsonValue::Null | JsonValue::Array(_) | JsonValue::Object(_) => None,
    }
}

/// Build the comparison for one filter against `table.attribute`.
///
/// Returns `None` when a value cannot be bound, in which case the filter is
/// skipped.
#[must_use]
pub fn filter_expr(
    table: &str,
    attribute: &str,
    predicate: &FilterPredicate,
    backend: DatabaseBackend,
) -> Option<SimpleExpr> {
    let column = Expr::col((Alias::new(table), Alias::new(attribute)));
    match predicate {
        FilterPredicate::Equals(value) => Some(column.eq(json_to_value(value, backend)?)),
        FilterPredicate::Between(lower, upper) => Some(column.between(
            json_to_value(lower, backend)?,
            json_to_value(upper, backend)?,
        )),
        FilterPredicate::In(values) => {
            let values: Vec<Value> = values
                .iter()
                .filter_map(|value| json_to_value(value, backend))
                .collect();
            Some(column.is_in(values))
        }
    }
}

fn clause_expr<T: TableResource>(
    table: &str,
    clause: &FilterClause,
    backend: DatabaseBackend,
) -> Result<Option<SimpleExpr>, DbErr> {
    let attribute = clause.column.attribute.as_str();
    match &clause.column.relation {
        Some(path) => {
            let chain = resolve_relation(T::relations(), path, T::RESOURCE_NAME)?;
            Ok(where_has(table, &chain, |alias| {
                filter_expr(alias, attribute, &clause.predicate, backend)
            }))
        }
        None => Ok(filter_expr(table, attribute, &clause.predicate, backend)),
    }
}

/// AND together every filter clause.
///
/// # Errors
///
/// Returns `DbErr::Custom` when a relational column names an undefined relation.
pub fn apply_filters<T: TableResource>(
    filters: &[FilterClause],
    backend: DatabaseBackend,
) -> Result<Condition, DbErr> {
    let table = T::table_name();
    let mut condition = Condition::all();

    for clause in filters {
        match clause_expr::<T>(&table, clause, backend)? {
            Some(expr) => condition = condition.add(expr),
            None => tracing::debug!(
                resource = T::RESOURCE_NAME,
                column = %clause.column,
                "Skipping filter without a bindable value"
            ),
        }
    }

    Ok(condition)
}
