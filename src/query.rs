//! The query intent: a declarative description of the constraints a table
//! request asks for. It is assembled with explicit builder methods and
//! turned into a Sea-ORM `Select` by [`crate::execution`].

use sea_orm::{Condition, Order, sea_query::IntoCondition};
use serde_json::Value as JsonValue;

/// A possibly dotted column path.
///
/// `title` is a direct column; `author.profile.city` is the attribute
/// `city` reached through the relation path `author.profile`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ColumnPath {
    pub relation: Option<String>,
    pub attribute: String,
}

impl ColumnPath {
    #[must_use]
    pub fn parse(path: &str) -> Self {
        match path.rsplit_once('.') {
            Some((relation, attribute)) => Self {
                relation: Some(relation.to_string()),
                attribute: attribute.to_string(),
            },
            None => Self {
                relation: None,
                attribute: path.to_string(),
            },
        }
    }

    #[must_use]
    pub const fn is_relational(&self) -> bool {
        self.relation.is_some()
    }
}

impl std::fmt::Display for ColumnPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.relation {
            Some(relation) => write!(f, "{relation}.{}", self.attribute),
            None => write!(f, "{}", self.attribute),
        }
    }
}

/// Comparison a filter performs on its column.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterPredicate {
    Equals(JsonValue),
    /// Inclusive on both ends
    Between(JsonValue, JsonValue),
    In(Vec<JsonValue>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FilterClause {
    pub column: ColumnPath,
    pub predicate: FilterPredicate,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    /// Accepts exactly `asc` or `desc`, ignoring case.
    #[must_use]
    pub fn parse(direction: &str) -> Option<Self> {
        match direction.to_lowercase().as_str() {
            "asc" => Some(Self::Asc),
            "desc" => Some(Self::Desc),
            _ => None,
        }
    }

    #[must_use]
    pub const fn order(self) -> Order {
        match self {
            Self::Asc => Order::Asc,
            Self::Desc => Order::Desc,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SortClause {
    pub column: ColumnPath,
    pub direction: SortDirection,
}

/// Case-insensitive substring match of `term`, OR-ed across `columns`.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchClause {
    pub term: String,
    pub columns: Vec<ColumnPath>,
}

/// Columns selected for each row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Projection {
    /// `*`
    #[default]
    All,
    Columns(Vec<String>),
}

/// Accumulated constraints of a table request.
///
/// Every builder method consumes the intent and returns the extended one:
///
/// ```rust,ignore
/// let query = TableQuery::new()
///     .filter(post::Column::Published.eq(true))
///     .add_set_filter("status", vec![json!("draft"), json!("review")])
///     .add_sort("title", SortDirection::Asc)
///     .add_eager_load("author");
/// ```
#[derive(Debug, Clone)]
pub struct TableQuery {
    base: Condition,
    filters: Vec<FilterClause>,
    sorts: Vec<SortClause>,
    searches: Vec<SearchClause>,
    eager_loads: Vec<String>,
    counts: Vec<String>,
    projection: Projection,
}

impl Default for TableQuery {
    fn default() -> Self {
        Self {
            base: Condition::all(),
            filters: Vec::new(),
            sorts: Vec::new(),
            searches: Vec::new(),
            eager_loads: Vec::new(),
            counts: Vec::new(),
            projection: Projection::All,
        }
    }
}

impl TableQuery {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a host-defined constraint, AND-ed with everything else.
    #[must_use]
    pub fn filter<F: IntoCondition>(mut self, condition: F) -> Self {
        self.base = self.base.add(condition.into_condition());
        self
    }

    #[must_use]
    pub fn add_equality_filter(self, column: &str, value: JsonValue) -> Self {
        self.add_filter(column, FilterPredicate::Equals(value))
    }

    #[must_use]
    pub fn add_range_filter(self, column: &str, lower: JsonValue, upper: JsonValue) -> Self {
        self.add_filter(column, FilterPredicate::Between(lower, upper))
    }

    #[must_use]
    pub fn add_set_filter(self, column: &str, values: Vec<JsonValue>) -> Self {
        self.add_filter(column, FilterPredicate::In(values))
    }

    fn add_filter(mut self, column: &str, predicate: FilterPredicate) -> Self {
        self.filters.push(FilterClause {
            column: ColumnPath::parse(column),
            predicate,
        });
        self
    }

    #[must_use]
    pub fn add_sort(mut self, column: &str, direction: SortDirection) -> Self {
        self.sorts.push(SortClause {
            column: ColumnPath::parse(column),
            direction,
        });
        self
    }

    /// Add an OR-group of substring matches. An empty term or an empty
    /// column list adds nothing.
    #[must_use]
    pub fn add_search_clause<I, S>(mut self, term: &str, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let columns: Vec<ColumnPath> = columns
            .into_iter()
            .map(|column| ColumnPath::parse(column.as_ref()))
            .collect();
        if !term.is_empty() && !columns.is_empty() {
            self.searches.push(SearchClause {
                term: term.to_string(),
                columns,
            });
        }
        self
    }

    /// Register a relation path to load alongside the page. Already
    /// registered paths are not duplicated.
    #[must_use]
    pub fn add_eager_load(mut self, relation: &str) -> Self {
        if !relation.is_empty() && !self.eager_loads.iter().any(|known| known == relation) {
            self.eager_loads.push(relation.to_string());
        }
        self
    }

    /// Register several relation paths, merged with those already present.
    #[must_use]
    pub fn with<I, S>(self, relations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        relations
            .into_iter()
            .fold(self, |query, relation| query.add_eager_load(relation.as_ref()))
    }

    /// Attach a `<relation>_count` column holding the number of related rows.
    #[must_use]
    pub fn add_count(mut self, relation: &str) -> Self {
        if !relation.is_empty() && !self.counts.iter().any(|known| known == relation) {
            self.counts.push(relation.to_string());
        }
        self
    }

    #[must_use]
    pub fn project(mut self, projection: Projection) -> Self {
        self.projection = projection;
        self
    }

    #[must_use]
    pub const fn base_condition(&self) -> &Condition {
        &self.base
    }

    #[must_use]
    pub fn filters(&self) -> &[FilterClause] {
        &self.filters
    }

    #[must_use]
    pub fn sorts(&self) -> &[SortClause] {
        &self.sorts
    }

    #[must_use]
    pub fn searches(&self) -> &[SearchClause] {
        &self.searches
    }

    #[must_use]
    pub fn eager_loads(&self) -> &[String] {
        &self.eager_loads
    }

    #[must_use]
    pub fn counts(&self) -> &[String] {
        &self.counts
    }

    #[must_use]
    pub const fn projection(&self) -> &Projection {
        &self.projection
    }
}
