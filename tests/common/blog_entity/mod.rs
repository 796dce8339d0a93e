use tablecrate::{RelationLink, TableQuery, TableResource};

pub mod author {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
    #[sea_orm(table_name = "authors")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: i32,
        pub name: String,
        pub email: String,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

pub mod profile {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
    #[sea_orm(table_name = "profiles")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: i32,
        pub author_id: i32,
        pub city: String,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

pub mod post {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
    #[sea_orm(table_name = "posts")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: i32,
        pub author_id: i32,
        pub title: String,
        pub status: String,
        pub views: i32,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

pub mod comment {
    use sea_orm::entity::prelude::*;

    #[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel)]
    #[sea_orm(table_name = "comments")]
    pub struct Model {
        #[sea_orm(primary_key, auto_increment = false)]
        pub id: i32,
        pub post_id: i32,
        pub body: String,
    }

    #[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
    pub enum Relation {}

    impl ActiveModelBehavior for ActiveModel {}
}

fn author_relations() -> Vec<RelationLink> {
    vec![RelationLink::has_one("profile", "profiles", "id", "author_id")]
}

fn post_relations() -> Vec<RelationLink> {
    vec![
        RelationLink::belongs_to("author", "authors", "author_id", "id").with_nested(author_relations),
        RelationLink::has_many("comments", "comments", "id", "post_id"),
    ]
}

/// Every post, configured through request parameters only.
pub struct PostTable;

impl TableResource for PostTable {
    type EntityType = post::Entity;
    const RESOURCE_NAME: &'static str = "posts";

    fn relations() -> Vec<RelationLink> {
        post_relations()
    }
}

/// Published posts only, each with its comment count, at most 2 per page.
pub struct PublishedPostTable;

impl TableResource for PublishedPostTable {
    type EntityType = post::Entity;
    const RESOURCE_NAME: &'static str = "published_posts";

    fn relations() -> Vec<RelationLink> {
        post_relations()
    }

    fn base_query() -> TableQuery {
        use sea_orm::ColumnTrait;

        TableQuery::new()
            .filter(post::Column::Status.eq("published"))
            .add_count("comments")
    }

    fn max_per_page() -> Option<u64> {
        Some(2)
    }
}
