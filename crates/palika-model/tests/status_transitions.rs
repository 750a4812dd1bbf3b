use palika_model::{AreaStatus, EntityKind, ReviewAction, ReviewStatus, TokenStatus};

#[test]
fn area_assignment_loop_is_ordered() {
    assert!(AreaStatus::Unassigned.can_transition(AreaStatus::Assigned));
    assert!(AreaStatus::Assigned.can_transition(AreaStatus::Pending));
    assert!(AreaStatus::Assigned.can_transition(AreaStatus::Unassigned));
    assert!(AreaStatus::Pending.can_transition(AreaStatus::Unassigned));
}

#[test]
fn area_pending_never_returns_to_assigned_directly() {
    assert!(!AreaStatus::Pending.can_transition(AreaStatus::Assigned));
    assert!(!AreaStatus::Unassigned.can_transition(AreaStatus::Pending));
}

#[test]
fn imported_terminal_states_do_not_transition() {
    for status in [
        AreaStatus::PendingValidation,
        AreaStatus::Rejected,
        AreaStatus::Removed,
    ] {
        assert!(!status.can_transition(AreaStatus::Assigned));
        assert!(!status.can_transition(AreaStatus::Unassigned));
        assert!(!status.is_withdrawable());
    }
}

#[test]
fn area_status_string_codec_round_trips() {
    for status in [
        AreaStatus::Unassigned,
        AreaStatus::Assigned,
        AreaStatus::Pending,
        AreaStatus::PendingValidation,
        AreaStatus::Rejected,
        AreaStatus::Removed,
    ] {
        assert_eq!(AreaStatus::parse(status.as_str()).expect("parse"), status);
    }
    assert!(AreaStatus::parse("archived").is_err());
}

#[test]
fn review_actions_apply_only_from_pending() {
    for action in [
        ReviewAction::Approve,
        ReviewAction::Reject,
        ReviewAction::RequestEdit,
    ] {
        assert!(ReviewStatus::Pending.can_apply(action));
        assert!(!ReviewStatus::Approved.can_apply(action));
        assert!(!ReviewStatus::Rejected.can_apply(action));
        assert!(!ReviewStatus::RequestedForEdit.can_apply(action));
    }
}

#[test]
fn review_action_resulting_statuses() {
    assert_eq!(
        ReviewAction::Approve.resulting_status(),
        ReviewStatus::Approved
    );
    assert_eq!(
        ReviewAction::Reject.resulting_status(),
        ReviewStatus::Rejected
    );
    assert_eq!(
        ReviewAction::RequestEdit.resulting_status(),
        ReviewStatus::RequestedForEdit
    );
}

#[test]
fn token_status_codec() {
    assert_eq!(
        TokenStatus::parse("unallocated").expect("parse"),
        TokenStatus::Unallocated
    );
    assert_eq!(
        TokenStatus::parse("allocated").expect("parse"),
        TokenStatus::Allocated
    );
    assert!(TokenStatus::parse("free").is_err());
}

#[test]
fn entity_kind_point_columns_match_survey_tool_output() {
    assert_eq!(EntityKind::Building.point_column(), "geom");
    assert_eq!(EntityKind::Business.point_column(), "gps");
    assert_eq!(EntityKind::Family.point_column(), "gps");
}
