//! Field masks for create and update requests.
//!
//! A mask is a list of dotted paths (`subject`, `close.close_reason`). Only
//! paths whose first segment is a mutable field of the record may be
//! written; everything else in the input is server-owned and ignored.

use super::error::{ServiceError, ServiceResult};
use crate::models::Entity;
use serde_json::{Map, Value};

/// Split a comma-separated list, dropping blanks.
pub fn parse_list(raw: Option<&str>) -> Vec<String> {
    raw.map(|s| {
        s.split(',')
            .map(str::trim)
            .filter(|p| !p.is_empty())
            .map(str::to_string)
            .collect()
    })
    .unwrap_or_default()
}

/// Reject mask paths that do not start with a mutable field.
pub fn check_mask(mask: &[String], mutable: &[&str]) -> ServiceResult<()> {
    for path in mask {
        let head = path.split('.').next().unwrap_or_default();
        if !mutable.contains(&head) {
            return Err(ServiceError::validation(format!(
                "Field '{}' cannot be updated",
                path
            )));
        }
    }
    Ok(())
}

/// Copy the masked paths from `input` into `target`.
///
/// A path that is missing or null in the input removes the key from the
/// target, so the field falls back to its default when decoded.
pub fn apply_mask(target: &mut Value, input: &Value, mask: &[String]) -> ServiceResult<()> {
    if !target.is_object() {
        *target = Value::Object(Map::new());
    }
    for path in mask {
        let segments: Vec<&str> = path.split('.').collect();
        let value = lookup_path(input, &segments).filter(|v| !v.is_null()).cloned();
        write_path(target, &segments, value)?;
    }
    Ok(())
}

/// The value at a dotted path.
pub fn lookup_path<'a>(value: &'a Value, segments: &[&str]) -> Option<&'a Value> {
    segments
        .iter()
        .try_fold(value, |current, segment| current.get(*segment))
}

fn write_path(target: &mut Value, segments: &[&str], value: Option<Value>) -> ServiceResult<()> {
    let Some((last, parents)) = segments.split_last() else {
        return Ok(());
    };
    let mut current = target;
    for segment in parents {
        let Value::Object(map) = current else {
            return Err(ServiceError::validation(format!(
                "Field '{}' is not an object",
                segment
            )));
        };
        let entry = map
            .entry(segment.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if entry.is_null() {
            *entry = Value::Object(Map::new());
        }
        current = entry;
    }
    let Value::Object(map) = current else {
        return Err(ServiceError::validation(format!(
            "Cannot set '{}' on a non-object field",
            segments.join(".")
        )));
    };
    match value {
        Some(v) => {
            map.insert(last.to_string(), v);
        }
        None => {
            map.remove(*last);
        }
    }
    Ok(())
}

/// Every mutable field: the mask used by create and full (PUT) updates.
pub fn full_mask(mutable: &[&str]) -> Vec<String> {
    mutable.iter().map(|s| s.to_string()).collect()
}

/// The mask for a partial (PATCH) update: the explicit mask if given,
/// otherwise the mutable top-level keys present in the body.
pub fn patch_mask(explicit: Option<&str>, body: &Value, mutable: &[&str]) -> ServiceResult<Vec<String>> {
    let explicit = parse_list(explicit);
    if !explicit.is_empty() {
        check_mask(&explicit, mutable)?;
        return Ok(explicit);
    }
    let Value::Object(map) = body else {
        return Err(ServiceError::validation("Request body must be a JSON object"));
    };
    Ok(map
        .keys()
        .filter(|k| mutable.contains(&k.as_str()))
        .cloned()
        .collect())
}

/// How an update request applies its body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UpdateMode {
    /// `PUT`: every mutable field is replaced; missing fields are cleared.
    Replace,
    /// `PATCH`: only the masked fields (or the body's keys) are written.
    Patch { mask: Option<String> },
}

impl UpdateMode {
    pub fn mask(&self, body: &Value, mutable: &[&str]) -> ServiceResult<Vec<String>> {
        match self {
            UpdateMode::Replace => Ok(full_mask(mutable)),
            UpdateMode::Patch { mask } => patch_mask(mask.as_deref(), body, mutable),
        }
    }
}

/// Apply the masked input fields to a copy of `current`.
pub fn merge<T: Entity>(current: &T, input: &Value, mask: &[String]) -> ServiceResult<T> {
    let mut target = serde_json::to_value(current)
        .map_err(|e| ServiceError::validation(format!("Failed to encode {}: {}", T::KIND, e)))?;
    apply_mask(&mut target, input, mask)?;
    serde_json::from_value(target)
        .map_err(|e| ServiceError::validation(format!("Invalid {}: {}", T::KIND, e)))
}

/// Build a new record from client input, keeping only its mutable fields.
pub fn from_input<T: Entity>(input: &Value) -> ServiceResult<T> {
    merge(&T::default(), input, &full_mask(T::MUTABLE_FIELDS))
}
