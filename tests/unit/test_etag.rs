//! Unit tests for etag encoding and record references.

use cases_api::models::{Etag, EtagError, RecordRef};
use cases_api::storage::RecordKind;

#[test]
fn test_etag_decodes_what_it_encodes() {
    let etag = Etag::new(RecordKind::Case, 1042, 7);
    let decoded = Etag::decode(&etag.encode()).unwrap();
    assert_eq!(decoded, etag);
}

#[test]
fn test_etag_changes_with_version() {
    let v1 = Etag::new(RecordKind::Case, 5, 1).encode();
    let v2 = Etag::new(RecordKind::Case, 5, 2).encode();
    assert_ne!(v1, v2);
}

#[test]
fn test_etag_kind_mismatch() {
    let token = Etag::new(RecordKind::CaseComment, 3, 1).encode();
    let err = Etag::decode_kind(&token, RecordKind::Case).unwrap_err();
    assert_eq!(
        err,
        EtagError::KindMismatch {
            expected: RecordKind::Case,
            found: RecordKind::CaseComment,
        }
    );
}

#[test]
fn test_record_ref_from_etag_carries_version() {
    let token = Etag::new(RecordKind::RelatedCase, 77, 3).encode();
    let r = RecordRef::parse(&token, RecordKind::RelatedCase).unwrap();
    assert_eq!(r.id, 77);
    assert_eq!(r.ver, Some(3));
}

#[test]
fn test_record_ref_rejects_negative_and_garbage() {
    assert!(RecordRef::parse("-4", RecordKind::Case).is_err());
    assert!(RecordRef::parse("", RecordKind::Case).is_err());
    assert!(RecordRef::parse("%%%", RecordKind::Case).is_err());
}
