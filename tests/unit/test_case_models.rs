//! Unit tests for case and catalog model rules.

use cases_api::models::{
    Case, CaseCommunication, CommunicationType, Entity, Lookup, Priority, RateInfo, RelatedCase,
    RelationType, Sla, SlaCondition, Source, SourceType, StatusCondition,
};
use chrono::{Duration, Utc};
use serde_json::json;

fn valid_case() -> Case {
    Case {
        subject: "  VPN down  ".to_string(),
        source: Some(Lookup::id(1)),
        status: Some(Lookup::id(2)),
        ..Default::default()
    }
}

#[test]
fn test_case_sanitize_trims_subject() {
    let mut case = valid_case();
    case.description = Some("   ".to_string());
    case.sanitize().unwrap();
    assert_eq!(case.subject, "VPN down");
    assert_eq!(case.description, None);
}

#[test]
fn test_case_requires_source_and_status() {
    let mut no_source = Case {
        source: None,
        ..valid_case()
    };
    assert!(no_source.sanitize().is_err());

    let mut no_status = Case {
        status: None,
        ..valid_case()
    };
    assert!(no_status.sanitize().is_err());

    let mut blank = Case {
        subject: " ".to_string(),
        ..valid_case()
    };
    assert!(blank.sanitize().is_err());
}

#[test]
fn test_case_rating_range() {
    let mut case = Case {
        rate: Some(RateInfo {
            rating: 6,
            rating_comment: None,
        }),
        ..valid_case()
    };
    assert!(case.sanitize().is_err());

    case.rate = Some(RateInfo {
        rating: 5,
        rating_comment: Some("great".to_string()),
    });
    assert!(case.sanitize().is_ok());
}

#[test]
fn test_case_json_uses_flat_audit_fields() {
    let mut case = valid_case();
    case.assign_identity(12, 3);
    let doc = serde_json::to_value(&case).unwrap();
    assert_eq!(doc["id"], 12);
    assert_eq!(doc["ver"], 3);
    assert!(doc["etag"].as_str().is_some_and(|e| !e.is_empty()));
    assert!(doc.get("audit").is_none());
}

#[test]
fn test_source_type_wire_name() {
    let source = Source::new("Portal", SourceType::SocialMedia);
    let doc = serde_json::to_value(&source).unwrap();
    assert_eq!(doc["type"], "SOCIAL_MEDIA");

    let parsed: Source = serde_json::from_value(json!({"name": "Mail", "type": "EMAIL"})).unwrap();
    assert_eq!(parsed.source_type, Some(SourceType::Email));
}

#[test]
fn test_priority_color_checked() {
    let mut bad = Priority::new("Low", Some("green"));
    assert!(bad.sanitize().is_err());
    let mut good = Priority::new(" Low ", Some("#00FF00"));
    good.sanitize().unwrap();
    assert_eq!(good.name, "Low");
}

#[test]
fn test_status_condition_cannot_be_initial_and_final() {
    let mut both = StatusCondition::new("Odd", true, true);
    assert!(both.sanitize().is_err());

    let parsed: StatusCondition = serde_json::from_value(json!({"name": "Done", "final": true})).unwrap();
    assert!(parsed.is_final);
    assert!(!parsed.initial);
}

#[test]
fn test_sla_validity_window() {
    let now = Utc::now();
    let mut sla = Sla::new("Gold", 30, 240);
    sla.valid_from = Some(now);
    sla.valid_to = Some(now - Duration::days(1));
    assert!(sla.sanitize().is_err());

    sla.valid_to = Some(now + Duration::days(30));
    assert!(sla.sanitize().is_ok());

    let mut slow_reaction = Sla::new("Bronze", 500, 100);
    assert!(slow_reaction.sanitize().is_err());
}

#[test]
fn test_sla_condition_priorities() {
    let mut dup = SlaCondition::new("Dup", vec![Lookup::id(1), Lookup::id(1)], 10, 20);
    assert!(dup.sanitize().is_err());

    let cond = SlaCondition::new("Fast", vec![Lookup::id(1), Lookup::id(4)], 10, 20);
    assert!(cond.covers(4));
    assert!(!cond.covers(2));
}

#[test]
fn test_relation_inverse_pairs() {
    for t in [
        RelationType::Duplicates,
        RelationType::Blocks,
        RelationType::Causes,
        RelationType::IsChildOf,
        RelationType::RelatesTo,
    ] {
        assert_eq!(t.inverse().inverse(), t);
    }
    assert_eq!(RelationType::RelatesTo.inverse(), RelationType::RelatesTo);

    let mut rel = RelatedCase::new(8, RelationType::Blocks);
    rel.primary_case = Lookup::id(3);
    let seen_from_eight = rel.inverted();
    assert_eq!(seen_from_eight.primary_case.id, 8);
    assert_eq!(seen_from_eight.related_case.id, 3);
    assert_eq!(seen_from_eight.relation_type, Some(RelationType::IsBlockedBy));
    assert!(rel.joins(8, 3));
}

#[test]
fn test_communication_identity() {
    let a = CaseCommunication::new(CommunicationType::Email, "msg-1");
    let b = CaseCommunication::new(CommunicationType::Email, "msg-1");
    let c = CaseCommunication::new(CommunicationType::Chat, "msg-1");
    assert!(a.same_link(&b));
    assert!(!a.same_link(&c));
    assert_eq!(CommunicationType::parse(" email "), Some(CommunicationType::Email));
    assert_eq!(CommunicationType::parse("fax"), None);
}
