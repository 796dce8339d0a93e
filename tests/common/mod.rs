#![allow(dead_code)]

use axum::Router;
use sea_orm::{ActiveValue::Set, Database, DatabaseConnection, DbErr, EntityTrait, Schema};
use sea_orm_migration::prelude::*;
use serde_json::Value as JsonValue;
use tablecrate::{TableParams, table_index, table_search};

pub mod blog_entity;

use blog_entity::{PostTable, PublishedPostTable, author, comment, post, profile};

pub async fn setup_test_db() -> Result<DatabaseConnection, DbErr> {
    let db = Database::connect("sqlite::memory:").await?;

    // Run migrations
    Migrator::up(&db, None).await?;
    seed(&db).await?;

    Ok(db)
}

pub fn setup_test_app(db: DatabaseConnection) -> Router {
    let api = Router::new()
        .route(
            "/posts",
            axum::routing::get(table_index::<PostTable>).post(table_search::<PostTable>),
        )
        .route(
            "/published",
            axum::routing::get(table_index::<PublishedPostTable>),
        )
        .with_state(db);

    Router::new().nest("/api/v1", api)
}

pub fn params(value: JsonValue) -> TableParams {
    serde_json::from_value(value).expect("valid table params")
}

/// `id` of every row, in page order
pub fn ids(rows: &[JsonValue]) -> Vec<i64> {
    rows.iter().map(|row| row["id"].as_i64().expect("row id")).collect()
}

pub fn sorted_ids(rows: &[JsonValue]) -> Vec<i64> {
    let mut ids = ids(rows);
    ids.sort_unstable();
    ids
}

/// Authors, their profiles, five posts and their comments:
///
/// | post | title | author | status | views | comments |
/// |---|---|---|---|---|---|
/// | 1 | Rust ownership | Jane Doe (Oslo) | published | 120 | 3 |
/// | 2 | Async in depth | John Smith (Johannesburg) | draft | 45 | 0 |
/// | 3 | Joining tables | Alice Jones (Paris) | review | 300 | 1 |
/// | 4 | Pagination tips | Jane Doe (Oslo) | published | 10 | 0 |
/// | 5 | Borrow checker | John Smith (Johannesburg) | published | 75 | 2 |
async fn seed(db: &DatabaseConnection) -> Result<(), DbErr> {
    let authors = [
        (1, "Jane Doe", "jane@example.com"),
        (2, "John Smith", "john@example.com"),
        (3, "Alice Jones", "alice@example.com"),
    ];
    author::Entity::insert_many(authors.map(|(id, name, email)| author::ActiveModel {
        id: Set(id),
        name: Set(name.to_string()),
        email: Set(email.to_string()),
    }))
    .exec(db)
    .await?;

    let profiles = [(1, 1, "Oslo"), (2, 2, "Johannesburg"), (3, 3, "Paris")];
    profile::Entity::insert_many(profiles.map(|(id, author_id, city)| profile::ActiveModel {
        id: Set(id),
        author_id: Set(author_id),
        city: Set(city.to_string()),
    }))
    .exec(db)
    .await?;

    let posts = [
        (1, 1, "Rust ownership", "published", 120),
        (2, 2, "Async in depth", "draft", 45),
        (3, 3, "Joining tables", "review", 300),
        (4, 1, "Pagination tips", "published", 10),
        (5, 2, "Borrow checker", "published", 75),
    ];
    post::Entity::insert_many(posts.map(|(id, author_id, title, status, views)| post::ActiveModel {
        id: Set(id),
        author_id: Set(author_id),
        title: Set(title.to_string()),
        status: Set(status.to_string()),
        views: Set(views),
    }))
    .exec(db)
    .await?;

    let comments = [
        (1, 1, "Great intro"),
        (2, 1, "Helpful"),
        (3, 1, "More please"),
        (4, 3, "Nice joins"),
        (5, 5, "Finally clicked"),
        (6, 5, "Thanks"),
    ];
    comment::Entity::insert_many(comments.map(|(id, post_id, body)| comment::ActiveModel {
        id: Set(id),
        post_id: Set(post_id),
        body: Set(body.to_string()),
    }))
    .exec(db)
    .await?;

    Ok(())
}

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![Box::new(CreateBlogTables)]
    }
}

pub struct CreateBlogTables;

#[async_trait::async_trait]
impl MigrationName for CreateBlogTables {
    fn name(&self) -> &'static str {
        "m20240101_000001_create_blog_tables"
    }
}

#[async_trait::async_trait]
impl MigrationTrait for CreateBlogTables {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let schema = Schema::new(manager.get_database_backend());

        manager
            .create_table(schema.create_table_from_entity(author::Entity))
            .await?;
        manager
            .create_table(schema.create_table_from_entity(profile::Entity))
            .await?;
        manager
            .create_table(schema.create_table_from_entity(post::Entity))
            .await?;
        manager
            .create_table(schema.create_table_from_entity(comment::Entity))
            .await?;
        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(comment::Entity).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(post::Entity).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(profile::Entity).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(author::Entity).to_owned())
            .await?;
        Ok(())
    }
}
