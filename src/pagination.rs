use axum::http::header::HeaderMap;
use serde::{Deserialize, Serialize};

/// One page of rows plus the paginator metadata a data-table needs.
///
/// `from` and `to` are 1-based positions of the first and last row on the
/// page within the whole result, or `None` when the page is empty.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Page<T> {
    pub data: Vec<T>,
    pub current_page: u64,
    pub per_page: u64,
    pub total: u64,
    pub last_page: u64,
    pub from: Option<u64>,
    pub to: Option<u64>,
    /// Columns the rows were projected to; empty when every column was selected
    pub columns: Vec<String>,
}

impl<T> Page<T> {
    #[must_use]
    pub fn new(data: Vec<T>, current_page: u64, per_page: u64, total: u64, columns: Vec<String>) -> Self {
        let current_page = current_page.max(1);
        let per_page = per_page.max(1);
        let last_page = total.div_ceil(per_page).max(1);

        let (from, to) = if data.is_empty() {
            (None, None)
        } else {
            let first = (current_page - 1) * per_page + 1;
            (Some(first), Some(first + data.len() as u64 - 1))
        };

        Self {
            data,
            current_page,
            per_page,
            total,
            last_page,
            from,
            to,
            columns,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// `Content-Range: <resource> <from>-<to>/<total>` for this page.
    ///
    /// Empty pages report `<resource> */<total>`.
    #[must_use]
    pub fn content_range(&self, resource_name: &str) -> HeaderMap {
        let safe_name = sanitize_resource_name(resource_name);
        let content_range = match (self.from, self.to) {
            (Some(from), Some(to)) => format!("{safe_name} {from}-{to}/{}", self.total),
            _ => format!("{safe_name} */{}", self.total),
        };

        let mut headers = HeaderMap::new();
        if let Ok(value) = content_range.parse() {
            headers.insert("Content-Range", value);
        }
        headers
    }
}

/// Drop characters that cannot appear in a header value
fn sanitize_resource_name(name: &str) -> String {
    name.chars().filter(|c| c.is_ascii() && !c.is_ascii_control()).collect()
}
