//! Runs a [`TableQuery`] against the database.
//!
//! [`build_select`] turns the intent into a Sea-ORM `Select`, [`paginate`]
//! counts and fetches one page of it as JSON rows and then loads the
//! registered relations onto those rows.
//!
//! Each eager relation costs one query per path segment:
//!
//! ```text
//! with(["author.profile", "comments"])
//!   SELECT * FROM authors  WHERE authors.id        IN (<posts.author_id>)
//!   SELECT * FROM profiles WHERE profiles.author_id IN (<authors.id>)
//!   SELECT * FROM comments WHERE comments.post_id  IN (<posts.id>)
//! ```

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;

use sea_orm::{
    ConnectionTrait, DatabaseBackend, DbErr, EntityTrait, FromQueryResult, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect, QueryTrait, Select,
    sea_query::{Alias, Asterisk, ConditionalStatement, Expr, Query},
};
use serde_json::Value as JsonValue;

use crate::core::{MAX_SQL_INTEGER, RelationLink, TableResource, resolve_relation};
use crate::filtering::{
    apply_filters, build_order_expr, build_search_condition, json_to_value, related_count,
};
use crate::pagination::Page;
use crate::query::{Projection, TableQuery};

/// Build the select for `query` on the resource's entity.
///
/// # Errors
///
/// Returns `DbErr::Custom` when a column path, eager load or count names a
/// relation the resource does not declare.
pub fn build_select<R: TableResource>(
    query: &TableQuery,
    backend: DatabaseBackend,
) -> Result<Select<R::EntityType>, DbErr> {
    let table = R::table_name();
    let mut condition = query.base_condition().clone();

    let filters = apply_filters::<R>(query.filters(), backend)?;
    if !filters.is_empty() {
        condition = condition.add(filters);
    }
    for search in query.searches() {
        if let Some(group) = build_search_condition::<R>(search, backend)? {
            condition = condition.add(group);
        }
    }

    let mut select = R::EntityType::find();
    if !condition.is_empty() {
        select = select.filter(condition);
    }

    if let Projection::Columns(columns) = query.projection() {
        select = select.select_only();
        for column in columns_with_eager_keys::<R>(columns, query.eager_loads())? {
            select = select.expr_as(
                Expr::col((Alias::new(&table), Alias::new(&column))),
                column.as_str(),
            );
        }
    }

    for relation in query.counts() {
        let chain = resolve_relation(R::relations(), relation, R::RESOURCE_NAME)?;
        let count = related_count(&table, &chain).ok_or_else(|| {
            DbErr::Custom(format!("cannot count `{relation}` on resource `{}`", R::RESOURCE_NAME))
        })?;
        select = select.expr_as(count, count_alias(relation).as_str());
    }

    for sort in query.sorts() {
        select = select.order_by(build_order_expr::<R>(sort)?, sort.direction.order());
    }

    Ok(select)
}

/// `comments` -> `comments_count`, `author.posts` -> `author_posts_count`
fn count_alias(relation: &str) -> String {
    format!("{}_count", relation.replace('.', "_"))
}

/// Projected columns plus the local keys eager relations attach through.
fn columns_with_eager_keys<R: TableResource>(
    columns: &[String],
    eager_loads: &[String],
) -> Result<Vec<String>, DbErr> {
    let mut selected = columns.to_vec();
    for path in eager_loads {
        let chain = resolve_relation(R::relations(), path, R::RESOURCE_NAME)?;
        if let Some(link) = chain.first()
            && !selected.iter().any(|column| column == link.local_key)
        {
            selected.push(link.local_key.to_string());
        }
    }
    Ok(selected)
}

/// Count the matching rows, fetch page `page` (1-based) and load the eager
/// relations onto it.
///
/// A page whose offset does not fit in a SQL integer lies past the end of
/// any table and comes back empty without being fetched.
///
/// # Errors
///
/// Returns any `DbErr` raised while building or running the queries.
pub async fn paginate<R, C>(
    db: &C,
    query: &TableQuery,
    page: u64,
    per_page: u64,
) -> Result<Page<JsonValue>, DbErr>
where
    R: TableResource,
    C: ConnectionTrait,
{
    let backend = db.get_database_backend();
    let select = build_select::<R>(query, backend)?;
    tracing::debug!(
        resource = R::RESOURCE_NAME,
        sql = %select.build(backend).sql,
        "Running table query"
    );

    let page = page.max(1);
    let per_page = per_page.clamp(1, MAX_SQL_INTEGER);
    let paginator = select.into_json().paginate(db, per_page);
    let totals = paginator.num_items_and_pages().await?;
    let mut rows = if page_offset(page, per_page).is_some() {
        paginator.fetch_page(page - 1).await?
    } else {
        Vec::new()
    };

    if !query.eager_loads().is_empty() {
        load_relations(
            db,
            R::relations(),
            &mut rows,
            query.eager_loads().to_vec(),
            R::RESOURCE_NAME,
        )
        .await?;
    }

    let columns = match query.projection() {
        Projection::All => Vec::new(),
        Projection::Columns(columns) => columns.clone(),
    };

    Ok(Page::new(rows, page, per_page, totals.number_of_items, columns))
}

/// Row offset of `page`, or `None` when it overflows a SQL integer.
fn page_offset(page: u64, per_page: u64) -> Option<u64> {
    page.checked_sub(1)?
        .checked_mul(per_page)
        .filter(|offset| *offset <= MAX_SQL_INTEGER)
}

type LoadFuture<'a> = Pin<Box<dyn Future<Output = Result<(), DbErr>> + Send + 'a>>;

/// Group relation paths by their first segment, keeping first-seen order:
/// `["author", "author.profile", "comments"]` ->
/// `[("author", ["profile"]), ("comments", [])]`.
fn group_paths(paths: &[String]) -> Vec<(String, Vec<String>)> {
    let mut groups: Vec<(String, Vec<String>)> = Vec::new();
    for path in paths {
        let (head, rest) = match path.split_once('.') {
            Some((head, rest)) => (head, Some(rest)),
            None => (path.as_str(), None),
        };
        let index = match groups.iter().position(|(name, _)| name == head) {
            Some(index) => index,
            None => {
                groups.push((head.to_string(), Vec::new()));
                groups.len() - 1
            }
        };
        if let Some(rest) = rest
            && !groups[index].1.iter().any(|known| known == rest)
        {
            groups[index].1.push(rest.to_string());
        }
    }
    groups
}

/// Key used to match a parent row's local key with a related row's
/// foreign key. `null` never matches.
fn key_of(value: &JsonValue) -> Option<String> {
    match value {
        JsonValue::Null => None,
        JsonValue::String(text) => Some(text.clone()),
        other => Some(other.to_string()),
    }
}

fn load_relations<'a, C: ConnectionTrait>(
    db: &'a C,
    available: Vec<RelationLink>,
    rows: &'a mut [JsonValue],
    paths: Vec<String>,
    owner: &'static str,
) -> LoadFuture<'a> {
    Box::pin(async move {
        for (name, nested) in group_paths(&paths) {
            let Some(link) = resolve_relation(available.clone(), &name, owner)?.pop() else {
                continue;
            };

            let mut related = fetch_related(db, &link, rows).await?;
            if !nested.is_empty() {
                load_relations(db, link.nested_relations(), &mut related, nested, link.name).await?;
            }
            attach(rows, &link, related);
        }
        Ok(())
    })
}

async fn fetch_related<C: ConnectionTrait>(
    db: &C,
    link: &RelationLink,
    rows: &[JsonValue],
) -> Result<Vec<JsonValue>, DbErr> {
    let backend = db.get_database_backend();

    let mut seen = Vec::new();
    let mut keys = Vec::new();
    for value in rows.iter().filter_map(|row| row.get(link.local_key)) {
        if let Some(key) = key_of(value)
            && !seen.contains(&key)
            && let Some(bound) = json_to_value(value, backend)
        {
            seen.push(key);
            keys.push(bound);
        }
    }
    if keys.is_empty() {
        return Ok(Vec::new());
    }

    let mut statement = Query::select();
    statement
        .column(Asterisk)
        .from(Alias::new(link.table))
        .and_where(Expr::col((Alias::new(link.table), Alias::new(link.foreign_key))).is_in(keys));

    let statement = backend.build(&statement);
    tracing::debug!(relation = link.name, sql = %statement.sql, "Loading relation");

    JsonValue::find_by_statement(statement).all(db).await
}

/// Attach related rows under `link.name`: an array for has-many relations,
/// otherwise the first match or `null`.
fn attach(rows: &mut [JsonValue], link: &RelationLink, related: Vec<JsonValue>) {
    let mut grouped: HashMap<String, Vec<JsonValue>> = HashMap::new();
    for row in related {
        if let Some(key) = row.get(link.foreign_key).and_then(key_of) {
            grouped.entry(key).or_default().push(row);
        }
    }

    for row in rows.iter_mut() {
        let matches = row
            .get(link.local_key)
            .and_then(key_of)
            .and_then(|key| grouped.get(&key))
            .cloned()
            .unwrap_or_default();

        let value = if link.kind.is_many() {
            JsonValue::Array(matches)
        } else {
            matches.into_iter().next().unwrap_or(JsonValue::Null)
        };

        if let Some(object) = row.as_object_mut() {
            object.insert(link.name.to_string(), value);
        }
    }
}
