use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value as JsonValue};
use serde_with::{DefaultOnError, DisplayFromStr, PickFirst, serde_as};
use utoipa::{IntoParams, ToSchema};

/// Parameters sent by a data-table component.
///
/// Every field is optional. Values that cannot be understood fall back to
/// their defaults instead of rejecting the request.
///
/// # Columns
/// Either a list of column objects:
/// ```json
/// [{"name": "title", "searchable": true}, {"name": "author.name", "searchable": "1"}]
/// ```
/// or a mapping keyed by column name, where each value may also carry a
/// filter and a sort direction:
/// ```json
/// {"title": {"searchable": true, "sortDirection": "asc"}, "status": {"value": "draft"}}
/// ```
///
/// # Filters
/// ```json
/// [{"column": "views", "values": [10, 100], "modifiers": {"range": true}},
///  {"column": "author.name", "value": "Jane"}]
/// ```
///
/// # Sorting
/// ```json
/// [{"column": "created_at", "direction": "desc"}]
/// ```
#[serde_as]
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TableParams {
    #[serde(deserialize_with = "deserialize_columns")]
    pub columns: Vec<ColumnSpec>,
    #[serde(deserialize_with = "deserialize_filters")]
    pub filters: Vec<FilterSpec>,
    #[serde(deserialize_with = "deserialize_sorting")]
    pub sorting: Vec<SortSpec>,
    #[serde_as(as = "DefaultOnError")]
    pub search: String,
    #[serde_as(as = "DefaultOnError<Option<PickFirst<(_, DisplayFromStr)>>>")]
    pub per_page: Option<u64>,
    /// 1-based page number
    #[serde_as(as = "DefaultOnError<Option<PickFirst<(_, DisplayFromStr)>>>")]
    pub page: Option<u64>,
}

/// Query-string form of [`TableParams`].
///
/// `columns`, `filters` and `sorting` carry JSON-encoded strings, for example:
///
/// ```text
/// GET /posts?columns=[{"name":"title","searchable":true}]&search=rust&perPage=25&page=2
/// ```
#[derive(Debug, Clone, Default, Deserialize, IntoParams, ToSchema)]
#[into_params(parameter_in = Query)]
#[serde(rename_all = "camelCase")]
pub struct TableQueryParams {
    /// JSON-encoded column definitions (list or mapping).
    #[param(example = r#"[{"name":"title","searchable":true},{"name":"author.name","searchable":true}]"#)]
    pub columns: Option<String>,
    /// JSON-encoded list of filters.
    #[param(example = r#"[{"column":"views","values":[10,100],"modifiers":{"range":true}}]"#)]
    pub filters: Option<String>,
    /// JSON-encoded list of sort directives.
    #[param(example = r#"[{"column":"title","direction":"asc"}]"#)]
    pub sorting: Option<String>,
    /// Free-text search applied to searchable columns.
    #[param(example = "rust")]
    pub search: Option<String>,
    /// Page length, defaults to 15.
    #[param(example = "15")]
    pub per_page: Option<String>,
    /// 1-based page number.
    #[param(example = "1")]
    pub page: Option<String>,
}

impl From<TableQueryParams> for TableParams {
    fn from(raw: TableQueryParams) -> Self {
        Self {
            columns: parse_json_param("columns", raw.columns.as_deref())
                .map(|value| parse_columns(&value))
                .unwrap_or_default(),
            filters: parse_json_param("filters", raw.filters.as_deref())
                .map(|value| parse_filters(&value))
                .unwrap_or_default(),
            sorting: parse_json_param("sorting", raw.sorting.as_deref())
                .map(|value| parse_sorting(&value))
                .unwrap_or_default(),
            search: raw.search.unwrap_or_default(),
            per_page: raw.per_page.as_deref().and_then(parse_number),
            page: raw.page.as_deref().and_then(parse_number),
        }
    }
}

/// A column the table displays, searches or filters on.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnSpec {
    /// Column path; `relation.attribute` for related columns
    pub name: String,
    pub searchable: bool,
    /// Sort direction carried by mapping-shaped columns
    pub sort_direction: Option<String>,
    /// Filter value carried by mapping-shaped columns
    pub filter: Option<FilterValue>,
    pub modifiers: Modifiers,
}

impl ColumnSpec {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    #[must_use]
    pub fn searchable(mut self) -> Self {
        self.searchable = true;
        self
    }

    fn from_settings(name: &str, settings: &Map<String, JsonValue>) -> Self {
        Self {
            name: name.to_string(),
            searchable: settings.get("searchable").is_some_and(coerce_bool),
            sort_direction: settings
                .get("sortDirection")
                .or_else(|| settings.get("sort_direction"))
                .and_then(JsonValue::as_str)
                .map(str::to_string),
            filter: filter_value_from_settings(settings),
            modifiers: Modifiers::from_json(settings.get("modifiers")),
        }
    }

    /// Filter carried by this column, if any.
    #[must_use]
    pub fn filter_spec(&self) -> Option<FilterSpec> {
        self.filter.as_ref().map(|value| FilterSpec {
            column: self.name.clone(),
            value: Some(value.clone()),
            modifiers: self.modifiers.clone(),
        })
    }

    /// Sort directive carried by this column, if any.
    #[must_use]
    pub fn sort_spec(&self) -> Option<SortSpec> {
        self.sort_direction.as_ref().map(|direction| SortSpec {
            column: Some(self.name.clone()),
            direction: Some(direction.clone()),
        })
    }
}

/// Value side of a filter.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterValue {
    Scalar(JsonValue),
    List(Vec<JsonValue>),
}

impl FilterValue {
    /// `null` means "no value"; arrays become lists; anything else is a scalar.
    #[must_use]
    pub fn from_json(value: &JsonValue) -> Option<Self> {
        match value {
            JsonValue::Null => None,
            JsonValue::Array(items) => Some(Self::List(items.clone())),
            other => Some(Self::Scalar(other.clone())),
        }
    }
}

/// Comparison modifiers attached to a filter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Modifiers {
    /// Compare a two-element list as an inclusive `[lower, upper]` range
    pub range: bool,
}

impl Modifiers {
    fn from_json(value: Option<&JsonValue>) -> Self {
        let range = value
            .and_then(JsonValue::as_object)
            .and_then(|modifiers| modifiers.get("range"))
            .is_some_and(coerce_bool);
        Self { range }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterSpec {
    pub column: String,
    /// `None` when the entry carried no usable value; such filters are skipped
    pub value: Option<FilterValue>,
    pub modifiers: Modifiers,
}

/// Raw sort directive. Validation happens when the directive is applied,
/// so malformed entries are kept here and dropped there.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SortSpec {
    pub column: Option<String>,
    pub direction: Option<String>,
}

/// Interpret a loosely typed flag.
///
/// `true`, the integer `1` and the strings `"1"`, `"true"`, `"on"` and
/// `"yes"` (any case, surrounding whitespace ignored) are true. Every other
/// value, `null` included, is false.
#[must_use]
pub fn coerce_bool(value: &JsonValue) -> bool {
    match value {
        JsonValue::Bool(flag) => *flag,
        JsonValue::Number(number) => number.as_i64() == Some(1) || number.as_u64() == Some(1),
        JsonValue::String(text) => matches!(
            text.trim().to_ascii_lowercase().as_str(),
            "1" | "true" | "on" | "yes"
        ),
        _ => false,
    }
}

fn parse_number(raw: &str) -> Option<u64> {
    raw.trim().parse().ok()
}

fn parse_json_param(name: &str, raw: Option<&str>) -> Option<JsonValue> {
    let raw = raw?.trim();
    if raw.is_empty() {
        return None;
    }
    match serde_json::from_str(raw) {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!(parameter = name, error = %e, "Ignoring malformed JSON table parameter");
            None
        }
    }
}

fn filter_value_from_settings(settings: &Map<String, JsonValue>) -> Option<FilterValue> {
    settings
        .get("values")
        .and_then(FilterValue::from_json)
        .or_else(|| settings.get("value").and_then(FilterValue::from_json))
}

fn parse_columns(value: &JsonValue) -> Vec<ColumnSpec> {
    let empty = Map::new();
    match value {
        JsonValue::Array(items) => items
            .iter()
            .filter_map(|item| match item {
                JsonValue::String(name) if !name.is_empty() => Some(ColumnSpec::new(name.as_str())),
                JsonValue::Object(settings) => settings
                    .get("name")
                    .and_then(JsonValue::as_str)
                    .filter(|name| !name.is_empty())
                    .map(|name| ColumnSpec::from_settings(name, settings)),
                _ => None,
            })
            .collect(),
        JsonValue::Object(columns) => columns
            .iter()
            .filter(|(name, _)| !name.is_empty())
            .map(|(name, settings)| {
                ColumnSpec::from_settings(name, settings.as_object().unwrap_or(&empty))
            })
            .collect(),
        _ => Vec::new(),
    }
}

fn parse_filters(value: &JsonValue) -> Vec<FilterSpec> {
    match value {
        JsonValue::Array(items) => items
            .iter()
            .filter_map(|item| {
                let entry = item.as_object()?;
                let column = entry
                    .get("column")
                    .and_then(JsonValue::as_str)
                    .filter(|column| !column.is_empty())?;
                Some(FilterSpec {
                    column: column.to_string(),
                    value: filter_value_from_settings(entry),
                    modifiers: Modifiers::from_json(entry.get("modifiers")),
                })
            })
            .collect(),
        // {"status": "draft", "views": [1, 2]}
        JsonValue::Object(entries) => entries
            .iter()
            .filter(|(column, _)| !column.is_empty())
            .map(|(column, value)| FilterSpec {
                column: column.clone(),
                value: FilterValue::from_json(value),
                modifiers: Modifiers::default(),
            })
            .collect(),
        _ => Vec::new(),
    }
}

fn parse_sorting(value: &JsonValue) -> Vec<SortSpec> {
    let text = |entry: &Map<String, JsonValue>, key: &str| {
        entry.get(key).and_then(JsonValue::as_str).map(str::to_string)
    };
    value
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(JsonValue::as_object)
                .map(|entry| SortSpec {
                    column: text(entry, "column"),
                    direction: text(entry, "direction"),
                })
                .collect()
        })
        .unwrap_or_default()
}

fn deserialize_columns<'de, D>(deserializer: D) -> Result<Vec<ColumnSpec>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<JsonValue>::deserialize(deserializer)?;
    Ok(value.map(|value| parse_columns(&value)).unwrap_or_default())
}

fn deserialize_filters<'de, D>(deserializer: D) -> Result<Vec<FilterSpec>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<JsonValue>::deserialize(deserializer)?;
    Ok(value.map(|value| parse_filters(&value)).unwrap_or_default())
}

fn deserialize_sorting<'de, D>(deserializer: D) -> Result<Vec<SortSpec>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<JsonValue>::deserialize(deserializer)?;
    Ok(value.map(|value| parse_sorting(&value)).unwrap_or_default())
}
