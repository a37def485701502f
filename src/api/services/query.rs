//! List/search parameters shared by every list endpoint.

use super::error::{ServiceError, ServiceResult};
use super::field_mask::{lookup_path, parse_list};
use crate::models::{Entity, Page};
use regex::Regex;
use serde::Deserialize;
use serde_json::{Map, Value};
use std::cmp::Ordering;
use std::sync::LazyLock;
use utoipa::IntoParams;

static SORT_FIELD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z_][a-z0-9_]*(\.[a-z_][a-z0-9_]*)*$")
        .unwrap_or_else(|e| panic!("invalid sort field pattern: {e}"))
});

/// Page size bounds, taken from configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageLimits {
    pub default_size: u32,
    pub max_size: u32,
}

impl Default for PageLimits {
    fn default() -> Self {
        Self {
            default_size: 10,
            max_size: 1000,
        }
    }
}

/// Query string of a list request.
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListParams {
    /// Page number, starting at 1
    pub page: Option<u32>,
    /// Records per page
    pub size: Option<u32>,
    /// Case-insensitive search term
    pub q: Option<String>,
    /// Comma-separated sort fields; `-` prefix sorts descending
    pub sort: Option<String>,
    /// Comma-separated fields to return
    pub fields: Option<String>,
    /// Comma-separated record ids
    pub id: Option<String>,
}

/// A parsed list request.
#[derive(Debug, Clone, PartialEq)]
pub struct ListQuery {
    pub page: u32,
    pub size: u32,
    pub q: Option<String>,
    pub sort: Vec<(String, bool)>,
    pub fields: Vec<String>,
    pub ids: Vec<i64>,
    /// Reference filters: the field's `id` must be one of the listed ids.
    pub filters: Vec<(String, Vec<i64>)>,
}

pub fn parse_ids(field: &str, raw: Option<&str>) -> ServiceResult<Vec<i64>> {
    parse_list(raw)
        .iter()
        .map(|s| {
            s.parse::<i64>().map_err(|_| {
                ServiceError::validation(format!("Invalid id '{}' in '{}'", s, field))
            })
        })
        .collect()
}

impl ListQuery {
    pub fn new(params: &ListParams, limits: PageLimits) -> ServiceResult<Self> {
        let size = match params.size {
            None | Some(0) => limits.default_size,
            Some(s) => s.min(limits.max_size),
        };

        let mut sort = Vec::new();
        for raw in parse_list(params.sort.as_deref()) {
            let (field, desc) = match raw.strip_prefix('-') {
                Some(f) => (f.to_string(), true),
                None => (raw.trim_start_matches('+').to_string(), false),
            };
            if !SORT_FIELD_RE.is_match(&field) {
                return Err(ServiceError::validation(format!(
                    "Invalid sort field '{}'",
                    raw
                )));
            }
            sort.push((field, desc));
        }
        if sort.is_empty() {
            sort.push(("id".to_string(), false));
        }

        Ok(Self {
            page: params.page.unwrap_or(1).max(1),
            size,
            q: params
                .q
                .as_deref()
                .map(str::trim)
                .filter(|q| !q.is_empty())
                .map(str::to_lowercase),
            sort,
            fields: parse_list(params.fields.as_deref()),
            ids: parse_ids("id", params.id.as_deref())?,
            filters: Vec::new(),
        })
    }

    pub fn with_filter(mut self, field: &str, raw: Option<&str>) -> ServiceResult<Self> {
        let ids = parse_ids(field, raw)?;
        if !ids.is_empty() {
            self.filters.push((field.to_string(), ids));
        }
        Ok(self)
    }

    /// Filter, sort, cut and project `records`.
    pub fn apply<T: Entity>(&self, records: Vec<T>) -> ServiceResult<Page<Value>> {
        let mut docs = Vec::with_capacity(records.len());
        for record in records {
            let doc = serde_json::to_value(&record).map_err(|e| {
                ServiceError::validation(format!("Failed to encode {}: {}", T::KIND, e))
            })?;
            if self.matches(&doc, T::SEARCH_FIELDS) {
                docs.push(doc);
            }
        }

        docs.sort_by(|a, b| self.compare(a, b));

        let skip = (self.page as usize - 1).saturating_mul(self.size as usize);
        let next = docs.len() > skip.saturating_add(self.size as usize);
        let items = docs
            .into_iter()
            .skip(skip)
            .take(self.size as usize)
            .map(|d| project(d, &self.fields))
            .collect();

        Ok(Page {
            page: self.page,
            next,
            items,
        })
    }

    fn matches(&self, doc: &Value, search_fields: &[&str]) -> bool {
        if !self.ids.is_empty() {
            let id = doc.get("id").and_then(Value::as_i64).unwrap_or_default();
            if !self.ids.contains(&id) {
                return false;
            }
        }
        for (field, ids) in &self.filters {
            let id = doc
                .get(field)
                .and_then(|v| v.get("id"))
                .and_then(Value::as_i64);
            if !id.is_some_and(|id| ids.contains(&id)) {
                return false;
            }
        }
        match &self.q {
            None => true,
            Some(q) => search_fields.iter().any(|path| {
                let segments: Vec<&str> = path.split('.').collect();
                lookup_path(doc, &segments)
                    .and_then(Value::as_str)
                    .is_some_and(|text| text.to_lowercase().contains(q.as_str()))
            }),
        }
    }

    fn compare(&self, a: &Value, b: &Value) -> Ordering {
        for (field, desc) in &self.sort {
            let segments: Vec<&str> = field.split('.').collect();
            let ord = compare_values(lookup_path(a, &segments), lookup_path(b, &segments));
            let ord = if *desc { ord.reverse() } else { ord };
            if ord != Ordering::Equal {
                return ord;
            }
        }
        Ordering::Equal
    }
}

fn rank(v: Option<&Value>) -> u8 {
    match v {
        None | Some(Value::Null) => 0,
        Some(Value::Bool(_)) => 1,
        Some(Value::Number(_)) => 2,
        Some(Value::String(_)) => 3,
        Some(Value::Object(_)) => 4,
        Some(Value::Array(_)) => 5,
    }
}

/// Total order over JSON values. References (objects) sort by name, then id.
fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::Bool(x)), Some(Value::Bool(y))) => x.cmp(y),
        (Some(Value::Number(x)), Some(Value::Number(y))) => {
            let (x, y) = (x.as_f64().unwrap_or_default(), y.as_f64().unwrap_or_default());
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(Value::Object(x)), Some(Value::Object(y))) => {
            compare_values(x.get("name"), y.get("name"))
                .then_with(|| compare_values(x.get("id"), y.get("id")))
        }
        (Some(Value::Array(x)), Some(Value::Array(y))) => x.len().cmp(&y.len()),
        _ => rank(a).cmp(&rank(b)),
    }
}

/// Keep only the named top-level fields. Unknown names are ignored.
pub fn project(doc: Value, fields: &[String]) -> Value {
    if fields.is_empty() {
        return doc;
    }
    match doc {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .filter(|(k, _)| fields.iter().any(|f| f == k))
                .collect::<Map<String, Value>>(),
        ),
        other => other,
    }
}
