//! Relation descriptors for dotted column paths.
//!
//! A column path such as `author.profile.city` names the attribute `city`
//! reached through the relation path `author.profile`. Each segment of the
//! relation path must match a [`RelationLink`] declared by the resource (or
//! nested under the previous segment's link).

use sea_orm::DbErr;

/// Cardinality of a relation, used when attaching eager-loaded rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelationKind {
    /// Many related rows per parent row; attached as an array.
    HasMany,
    /// At most one related row holding the parent's key; attached as an object or `null`.
    HasOne,
    /// The parent row holds the related row's key; attached as an object or `null`.
    BelongsTo,
}

impl RelationKind {
    #[must_use]
    pub const fn is_many(self) -> bool {
        matches!(self, Self::HasMany)
    }
}

/// A relation from a parent table to a related table.
///
/// Related rows satisfy `related.foreign_key = parent.local_key`:
///
/// | kind | `local_key` (parent) | `foreign_key` (related) |
/// |---|---|---|
/// | `has_many("comments", "comments", "id", "post_id")` | `posts.id` | `comments.post_id` |
/// | `belongs_to("author", "authors", "author_id", "id")` | `posts.author_id` | `authors.id` |
#[derive(Debug, Clone, Copy)]
pub struct RelationLink {
    /// Relation name as it appears in column paths and in loaded rows
    pub name: &'static str,
    /// Table holding the related rows
    pub table: &'static str,
    pub kind: RelationKind,
    /// Column on the parent table
    pub local_key: &'static str,
    /// Column on the related table
    pub foreign_key: &'static str,
    /// Relations reachable from the related table
    pub nested: fn() -> Vec<RelationLink>,
}

fn no_relations() -> Vec<RelationLink> {
    Vec::new()
}

impl RelationLink {
    #[must_use]
    pub const fn new(
        name: &'static str,
        table: &'static str,
        kind: RelationKind,
        local_key: &'static str,
        foreign_key: &'static str,
    ) -> Self {
        Self {
            name,
            table,
            kind,
            local_key,
            foreign_key,
            nested: no_relations,
        }
    }

    #[must_use]
    pub const fn has_many(
        name: &'static str,
        table: &'static str,
        local_key: &'static str,
        foreign_key: &'static str,
    ) -> Self {
        Self::new(name, table, RelationKind::HasMany, local_key, foreign_key)
    }

    #[must_use]
    pub const fn has_one(
        name: &'static str,
        table: &'static str,
        local_key: &'static str,
        foreign_key: &'static str,
    ) -> Self {
        Self::new(name, table, RelationKind::HasOne, local_key, foreign_key)
    }

    #[must_use]
    pub const fn belongs_to(
        name: &'static str,
        table: &'static str,
        local_key: &'static str,
        foreign_key: &'static str,
    ) -> Self {
        Self::new(name, table, RelationKind::BelongsTo, local_key, foreign_key)
    }

    /// Declare the relations reachable through this one.
    #[must_use]
    pub const fn with_nested(mut self, nested: fn() -> Vec<RelationLink>) -> Self {
        self.nested = nested;
        self
    }

    #[must_use]
    pub fn nested_relations(&self) -> Vec<RelationLink> {
        (self.nested)()
    }
}

/// Resolve a dot-separated relation path into the chain of links it traverses.
///
/// # Errors
///
/// Returns `DbErr::Custom` when a segment does not name a declared relation.
pub fn resolve_relation(
    roots: Vec<RelationLink>,
    path: &str,
    resource: &str,
) -> Result<Vec<RelationLink>, DbErr> {
    let mut available = roots;
    let mut chain = Vec::new();

    for segment in path.split('.') {
        let link = available
            .iter()
            .find(|link| link.name == segment)
            .copied()
            .ok_or_else(|| {
                DbErr::Custom(format!(
                    "relation `{segment}` (in `{path}`) is not defined on resource `{resource}`"
                ))
            })?;
        available = link.nested_relations();
        chain.push(link);
    }

    Ok(chain)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn author_relations() -> Vec<RelationLink> {
        vec![RelationLink::has_one("profile", "profiles", "id", "author_id")]
    }

    fn post_relations() -> Vec<RelationLink> {
        vec![
            RelationLink::belongs_to("author", "authors", "author_id", "id")
                .with_nested(author_relations),
            RelationLink::has_many("comments", "comments", "id", "post_id"),
        ]
    }

    #[test]
    fn test_resolve_direct_relation() {
        let chain = resolve_relation(post_relations(), "comments", "posts").unwrap();
        assert_eq!(chain.len(), 1);
        assert_eq!(chain[0].table, "comments");
        assert!(chain[0].kind.is_many());
    }

    #[test]
    fn test_resolve_nested_relation() {
        let chain = resolve_relation(post_relations(), "author.profile", "posts").unwrap();
        let tables: Vec<&str> = chain.iter().map(|link| link.table).collect();
        assert_eq!(tables, vec!["authors", "profiles"]);
        assert_eq!(chain[1].kind, RelationKind::HasOne);
    }

    #[test]
    fn test_unknown_relation_is_an_error() {
        let err = resolve_relation(post_relations(), "tags", "posts").unwrap_err();
        assert!(err.to_string().contains("`tags`"), "got: {err}");
    }

    #[test]
    fn test_nested_segment_must_exist_under_parent() {
        // `profile` hangs off `author`, not off the post itself
        assert!(resolve_relation(post_relations(), "profile", "posts").is_err());
        assert!(resolve_relation(post_relations(), "comments.profile", "posts").is_err());
    }
}
