//! Entity tags for optimistic concurrency.
//!
//! An etag packs `(kind, id, ver)` into an opaque, URL-safe token:
//! base64url (no padding) of `"<kind>.<id>.<ver>"`. Clients send it back on
//! update and delete; the server rejects the call when `ver` is stale.

use crate::storage::RecordKind;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EtagError {
    #[error("Malformed etag: {0}")]
    Malformed(String),
    #[error("Etag refers to a {found}, expected a {expected}")]
    KindMismatch {
        expected: RecordKind,
        found: RecordKind,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Etag {
    pub kind: RecordKind,
    pub id: i64,
    pub ver: i32,
}

impl Etag {
    pub fn new(kind: RecordKind, id: i64, ver: i32) -> Self {
        Self { kind, id, ver }
    }

    pub fn encode(&self) -> String {
        URL_SAFE_NO_PAD.encode(format!("{}.{}.{}", self.kind.as_str(), self.id, self.ver))
    }

    pub fn decode(token: &str) -> Result<Self, EtagError> {
        let malformed = || EtagError::Malformed(token.to_string());

        let raw = URL_SAFE_NO_PAD
            .decode(token.trim())
            .map_err(|_| malformed())?;
        let raw = String::from_utf8(raw).map_err(|_| malformed())?;

        let mut parts = raw.split('.');
        let (Some(kind), Some(id), Some(ver), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return Err(malformed());
        };

        let kind = RecordKind::ALL
            .into_iter()
            .find(|k| k.as_str() == kind)
            .ok_or_else(malformed)?;
        let id: i64 = id.parse().map_err(|_| malformed())?;
        let ver: i32 = ver.parse().map_err(|_| malformed())?;
        if id <= 0 || ver <= 0 {
            return Err(malformed());
        }

        Ok(Self { kind, id, ver })
    }

    /// Decode and require the etag to belong to `expected`.
    pub fn decode_kind(token: &str, expected: RecordKind) -> Result<Self, EtagError> {
        let etag = Self::decode(token)?;
        if etag.kind != expected {
            return Err(EtagError::KindMismatch {
                expected,
                found: etag.kind,
            });
        }
        Ok(etag)
    }
}

/// A record reference taken from a path segment.
///
/// Accepts either a full etag (id + version, checked on write) or a bare
/// numeric id (no version check).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecordRef {
    pub id: i64,
    pub ver: Option<i32>,
}

impl RecordRef {
    pub fn parse(segment: &str, kind: RecordKind) -> Result<Self, EtagError> {
        if let Ok(id) = segment.parse::<i64>() {
            if id <= 0 {
                return Err(EtagError::Malformed(segment.to_string()));
            }
            return Ok(Self { id, ver: None });
        }
        let etag = Etag::decode_kind(segment, kind)?;
        Ok(Self {
            id: etag.id,
            ver: Some(etag.ver),
        })
    }
}
