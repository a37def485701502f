//! The `Entity` trait ties a model type to its storage kind and update rules.

use super::lookup::Audit;
use crate::storage::RecordKind;
use regex::Regex;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::sync::LazyLock;

static COLOR_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^#[0-9A-Fa-f]{6}$").unwrap_or_else(|e| panic!("invalid color pattern: {e}"))
});

/// A record type kept by the storage layer.
pub trait Entity: Serialize + DeserializeOwned + Default + Clone + Send + Sync + 'static {
    const KIND: RecordKind;

    /// Top-level fields a client may set on create and update.
    const MUTABLE_FIELDS: &'static [&'static str];

    /// Fields matched by the `q` search parameter (dotted paths allowed).
    const SEARCH_FIELDS: &'static [&'static str] = &["name"];

    fn id(&self) -> i64;

    /// Set the identity assigned by storage. Versioned records also refresh their etag.
    fn assign_identity(&mut self, id: i64, ver: i32);

    /// Link a child record to its parent (no-op for top-level records).
    fn attach_to(&mut self, _parent_id: i64) {}

    fn audit_mut(&mut self) -> &mut Audit;

    /// Name shown when other records reference this one.
    fn label(&self) -> Option<String> {
        None
    }

    /// Normalize client input and check record-local rules.
    fn sanitize(&mut self) -> Result<(), String> {
        Ok(())
    }
}

/// Trim a required name in place, rejecting blanks.
pub fn require_name(name: &mut String, what: &str) -> Result<(), String> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(format!("{} name is required", what));
    }
    *name = trimmed.to_string();
    Ok(())
}

/// Drop blank optional text.
pub fn tidy_text(text: &mut Option<String>) {
    if let Some(t) = text.as_deref()
        && t.trim().is_empty()
    {
        *text = None;
    }
}

/// Check a `#RRGGBB` color.
pub fn check_color(color: Option<&str>) -> Result<(), String> {
    match color {
        Some(c) if !COLOR_RE.is_match(c) => Err(format!("Invalid color '{}': expected #RRGGBB", c)),
        _ => Ok(()),
    }
}

/// Upper bound for reaction and resolution minutes.
pub const MAX_MINUTES: i64 = i32::MAX as i64;

/// Reaction and resolution times are minutes; resolution may not precede reaction.
pub fn check_times(reaction_time: i64, resolution_time: i64) -> Result<(), String> {
    if reaction_time <= 0 {
        return Err("reaction_time must be a positive number of minutes".to_string());
    }
    if resolution_time > MAX_MINUTES {
        return Err(format!("resolution_time must not exceed {} minutes", MAX_MINUTES));
    }
    if resolution_time < reaction_time {
        return Err("resolution_time must not be less than reaction_time".to_string());
    }
    Ok(())
}

/// Generate the `Entity` impl shared by unversioned catalog records.
///
/// The type provides `check(&mut self) -> Result<(), String>`; child records
/// name the field that holds their parent id.
macro_rules! catalog_entity {
    (
        $ty:ty,
        kind: $kind:expr,
        mutable: [$($field:literal),* $(,)?],
        search: [$($search:literal),* $(,)?]
        $(, parent: $parent:ident)? $(,)?
    ) => {
        impl $crate::models::entity::Entity for $ty {
            const KIND: $crate::storage::RecordKind = $kind;
            const MUTABLE_FIELDS: &'static [&'static str] = &[$($field),*];
            const SEARCH_FIELDS: &'static [&'static str] = &[$($search),*];

            fn id(&self) -> i64 {
                self.id
            }

            fn assign_identity(&mut self, id: i64, _ver: i32) {
                self.id = id;
            }

            fn attach_to(&mut self, _parent_id: i64) {
                $(self.$parent = _parent_id;)?
            }

            fn audit_mut(&mut self) -> &mut $crate::models::Audit {
                &mut self.audit
            }

            fn label(&self) -> Option<String> {
                Some(self.name.clone())
            }

            fn sanitize(&mut self) -> Result<(), String> {
                self.check()
            }
        }
    };
}

pub(crate) use catalog_entity;
