// Resource binding: which entity a table request runs against and which
// relations its dotted column paths may traverse.

pub mod relations;
pub mod traits;

// Re-export commonly used items
pub use relations::{RelationKind, RelationLink, resolve_relation};
pub use traits::{DEFAULT_PER_PAGE, MAX_SQL_INTEGER, TableResource};
