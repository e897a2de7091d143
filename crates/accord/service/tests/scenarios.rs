mod common;

use accord_service::{
    AccessError, AccordConfig, ApprovalOutcome, BenignOutcome, Outcome, RejectionReason,
    RequestState,
};
use accord_types::{
    Action, Decision, GovernanceEvent, MemberStatus, MisbehaviorKind, ResourceId, ResourceTable, Role,
};
use common::{admin, id, Group, DAY};

#[test]
fn regular_member_viewing_global_table_is_penalized() {
    let mut group = Group::new();
    let before = group.service.balance_of(&id("rm1"));

    let outcome = group
        .service
        .create_access_request(&id("rm1"), ResourceTable::Global, Action::View)
        .unwrap();

    let report = outcome.penalty().expect("should be penalized");
    assert_eq!(report.reason, "Unauthorized access attempt");
    assert_eq!(report.penalty_amount, 5_000);
    assert_eq!(group.service.balance_of(&id("rm1")), before - 5_000);
    assert!(group.service.access_requests().is_empty());

    let member = group.service.member(&id("rm1")).unwrap();
    assert_eq!(member.status, MemberStatus::Malicious);
    let until = group.service.blocking_end_time(&id("rm1")).unwrap();
    assert_eq!(until, Some(group.service.now() + chrono::Duration::hours(1)));

    let last = &group.service.events().last().unwrap().event;
    assert!(matches!(
        last,
        GovernanceEvent::MaliciousActivityReported { member, .. } if member == &id("rm1")
    ));
}

#[test]
fn secondary_head_edit_swaps_roles_and_later_earns_reward() {
    let mut group = Group::new();
    let request = group
        .service
        .create_access_request(&id("sgh1"), ResourceTable::Global, Action::Edit)
        .unwrap()
        .completed()
        .unwrap();
    assert_eq!(request.id, 0);
    assert!(!request.is_approved);

    let early = group
        .service
        .edit_global_resource_table(&id("sgh1"), &id("sgh1"), &id("pgh1"))
        .unwrap_err();
    assert_eq!(early.reason(), RejectionReason::QuorumNotMet);

    group.service.handle_access_request(&id("pgh1"), 0, true).unwrap();
    group.service.handle_access_request(&id("pgh2"), 0, true).unwrap();
    assert!(group.service.access_request(0).unwrap().is_approved);

    let exec = group
        .service
        .edit_global_resource_table(&id("sgh1"), &id("pgh1"), &id("sgh1"))
        .unwrap();
    assert_eq!(exec.value, (Role::SecondaryHead, Role::PrimaryHead));
    assert_eq!(
        (
            group.service.role_of(&id("pgh1")).unwrap().code(),
            group.service.role_of(&id("sgh1")).unwrap().code()
        ),
        (3, 2)
    );
    for untouched in ["pgh2", "pgh3", "pgh4"] {
        assert_eq!(group.service.role_of(&id(untouched)).unwrap(), Role::PrimaryHead);
    }
    assert_eq!(group.service.role_of(&id("sgh2")).unwrap(), Role::SecondaryHead);
    assert_eq!(group.service.access_request(0).unwrap().state, RequestState::Executed);

    let before = group.service.balance_of(&id("sgh1"));
    group.advance(2 * DAY);
    let outcome = group.service.report_benign(&admin(), &id("sgh1")).unwrap();
    assert!(outcome.is_rewarded());
    assert!(group.service.balance_of(&id("sgh1")) > before);
}

#[test]
fn primary_head_delete_counts_requester_toward_quorum() {
    let mut group = Group::new();
    let request = group.approved_request("pgh1", ResourceTable::Global, Action::Delete, &["pgh2"]);
    assert!(!group.service.access_request(request).unwrap().is_approved);

    let err = group
        .service
        .delete_global_resource_table(&id("pgh1"), &id("pgh4"))
        .unwrap_err();
    assert_eq!(err.reason(), RejectionReason::QuorumNotMet);

    assert_eq!(
        group.service.handle_access_request(&id("pgh3"), request, true).unwrap(),
        ApprovalOutcome::Counted { approvals: 3, required: 3, approved: true }
    );
    let exec = group
        .service
        .delete_global_resource_table(&id("pgh1"), &id("pgh4"))
        .unwrap();
    assert_eq!(exec.value.member, id("pgh4"));
    assert!(group.service.member(&id("pgh4")).is_err());
    assert_eq!(group.service.members().len(), 7);
}

#[test]
fn secondary_head_delete_needs_three_primary_heads() {
    let mut group = Group::new();
    group
        .service
        .set_table_policy(&admin(), Role::SecondaryHead, ResourceTable::Global, Action::Delete, Decision::Allow)
        .unwrap();

    let request = group.approved_request("sgh1", ResourceTable::Global, Action::Delete, &["pgh1", "pgh2"]);
    assert!(!group.service.access_request(request).unwrap().is_approved);

    group.service.handle_access_request(&id("pgh3"), request, true).unwrap();
    let exec = group
        .service
        .delete_global_resource_table(&id("sgh1"), &id("pgh4"))
        .unwrap();
    assert_eq!(exec.value.member, id("pgh4"));
}

#[test]
fn swapped_roles_govern_later_requests_and_votes() {
    let mut group = Group::new();
    group.approved_request("sgh2", ResourceTable::Global, Action::Edit, &["pgh3", "pgh4"]);
    group
        .service
        .edit_global_resource_table(&id("sgh2"), &id("sgh1"), &id("pgh1"))
        .unwrap();
    assert_eq!(group.service.role_of(&id("pgh1")).unwrap(), Role::SecondaryHead);
    assert_eq!(group.service.role_of(&id("sgh1")).unwrap(), Role::PrimaryHead);

    let request = group
        .service
        .create_access_request(&id("pgh2"), ResourceTable::Global, Action::View)
        .unwrap()
        .completed()
        .unwrap();
    let err = group
        .service
        .handle_access_request(&id("pgh1"), request.id, true)
        .unwrap_err();
    assert_eq!(err.reason(), RejectionReason::NotAuthorized);
    assert_eq!(
        group.service.handle_access_request(&id("sgh1"), request.id, true).unwrap(),
        ApprovalOutcome::Counted { approvals: 2, required: 2, approved: true }
    );

    let outcome = group
        .service
        .create_access_request(&id("pgh1"), ResourceTable::Global, Action::Delete)
        .unwrap();
    let report = outcome.penalty().unwrap();
    assert_eq!(report.reason, "Unauthorized access attempt");
    assert_eq!(report.penalty_amount, 7_500);
}

#[test]
fn approvals_are_idempotent_and_self_approval_is_refused() {
    let mut group = Group::new();
    let request = group.approved_request("pgh1", ResourceTable::Global, Action::Edit, &["pgh2"]);

    assert_eq!(
        group.service.handle_access_request(&id("pgh2"), request, true).unwrap(),
        ApprovalOutcome::Duplicate
    );
    assert_eq!(
        group.service.handle_access_request(&id("pgh3"), request, false).unwrap(),
        ApprovalOutcome::Ignored
    );
    // The requester's own endorsement plus pgh2.
    assert_eq!(group.service.access_request(request).unwrap().approvals.len(), 2);

    let err = group
        .service
        .handle_access_request(&id("pgh1"), request, true)
        .unwrap_err();
    assert_eq!(err.reason(), RejectionReason::NotAuthorized);
    let err = group
        .service
        .handle_access_request(&id("sgh1"), request, true)
        .unwrap_err();
    assert_eq!(err.reason(), RejectionReason::NotAuthorized);
    let err = group
        .service
        .handle_access_request(&id("pgh2"), 99, true)
        .unwrap_err();
    assert_eq!(err.reason(), RejectionReason::UnknownRequest);
}

#[test]
fn global_view_returns_snapshot_and_emits_event() {
    let mut group = Group::new();
    group.approved_request("sgh2", ResourceTable::Global, Action::View, &["pgh3", "pgh4"]);

    let exec = group.service.view_global_resource_table(&id("sgh2")).unwrap();
    assert_eq!(exec.value.len(), 8);
    assert_eq!(exec.value[0].member, id("pgh1"));

    let viewed = group.service.events().iter().rev().find_map(|e| match &e.event {
        GovernanceEvent::GlobalResourceTableViewed { viewer, resource_table } => {
            Some((viewer.clone(), resource_table.len()))
        }
        _ => None,
    });
    assert_eq!(viewed, Some((id("sgh2"), 8)));

    // The approval was consumed.
    let again = group.service.view_global_resource_table(&id("sgh2")).unwrap_err();
    assert_eq!(again.reason(), RejectionReason::QuorumNotMet);
}

#[test]
fn local_view_needs_one_approval() {
    let mut group = Group::new();
    group.approved_request("sgh1", ResourceTable::Local, Action::View, &["pgh3"]);

    let exec = group.service.view_local_resource_table(&id("sgh1")).unwrap();
    let resources: Vec<_> = exec.value.iter().map(|e| e.resource.as_str()).collect();
    assert_eq!(resources, vec!["picture", "movie"]);
    assert!(exec.value.iter().all(|e| e.active));
}

#[test]
fn scope_access_follows_scope_policy() {
    let mut group = Group::new();
    let picture = ResourceId::new("picture");

    let granted = group
        .service
        .access_resource(&id("rm1"), "picture", picture.clone(), Action::View)
        .unwrap();
    assert!(matches!(granted, Outcome::Completed(_)));

    let denied = group
        .service
        .access_resource(&id("sgh1"), "picture", picture, Action::Edit)
        .unwrap();
    let report = denied.penalty().unwrap();
    assert_eq!(report.kind, MisbehaviorKind::UnauthorizedAccess);
    assert_eq!(report.penalty_amount, 7_500);
}

#[test]
fn too_frequent_access_is_penalized_and_blocks() {
    let mut group = Group::new();
    let movie = ResourceId::new("movie");

    group
        .service
        .access_resource(&id("sgh2"), "movie", movie.clone(), Action::View)
        .unwrap()
        .completed()
        .unwrap();

    group.advance(5);
    let second = group
        .service
        .access_resource(&id("sgh2"), "movie", movie.clone(), Action::View)
        .unwrap();
    let report = second.penalty().expect("second call should be penalized");
    assert_eq!(report.reason, "Too frequent access");
    assert_eq!(report.penalty_amount, 3_000);

    // No business effect from the second call.
    let granted = group
        .service
        .events()
        .iter()
        .filter(|e| matches!(&e.event, GovernanceEvent::AccessGranted { executor, .. } if executor == &id("sgh2")))
        .count();
    assert_eq!(granted, 1);

    group.advance(60);
    let blocked = group
        .service
        .access_resource(&id("sgh2"), "movie", movie.clone(), Action::View)
        .unwrap_err();
    assert_eq!(blocked.reason(), RejectionReason::Blocked);

    group.advance(600);
    assert!(group
        .service
        .access_resource(&id("sgh2"), "movie", movie, Action::View)
        .unwrap()
        .completed()
        .is_some());
    assert_eq!(group.service.member(&id("sgh2")).unwrap().status, MemberStatus::Active);
    assert!(group
        .service
        .events()
        .iter()
        .any(|e| e.event == GovernanceEvent::MemberReinstated { member: id("sgh2") }));
}

#[test]
fn partner_deactivating_scope_is_denial_of_service() {
    let mut group = Group::new();
    let before = group.service.balance_of(&id("sgh1"));

    let outcome = group.service.deactivate_scope(&id("sgh1"), "picture").unwrap();
    let report = outcome.penalty().unwrap();
    assert_eq!(report.reason, "Denial of Service");
    assert_eq!(report.penalty_amount, 20_000);
    assert_eq!(group.service.balance_of(&id("sgh1")), before - 20_000);
    assert!(group.service.scope("picture").unwrap().is_active());

    let owner = group.service.deactivate_scope(&id("pgh1"), "picture").unwrap();
    assert_eq!(owner, Outcome::Completed(true));
    let err = group
        .service
        .access_resource(&id("pgh1"), "picture", ResourceId::new("picture"), Action::View)
        .unwrap_err();
    assert_eq!(err.reason(), RejectionReason::ScopeInactive);

    group.approved_request("pgh3", ResourceTable::Local, Action::View, &["pgh4"]);
    let local = group.service.view_local_resource_table(&id("pgh3")).unwrap();
    let picture = local.value.iter().find(|e| e.resource == "picture").unwrap();
    assert!(!picture.active);
}

#[test]
fn quiet_member_is_rewarded_on_access() {
    let mut group = Group::new();
    let before = group.service.balance_of(&id("rm2"));

    group.advance(2 * DAY);
    let receipt = group
        .service
        .access_resource(&id("rm2"), "movie", ResourceId::new("movie"), Action::View)
        .unwrap()
        .completed()
        .unwrap();
    assert_eq!(receipt.reward, Some(5_000));
    assert_eq!(group.service.balance_of(&id("rm2")), before + 5_000);
}

#[test]
fn penalty_then_benign_report_restores_some_balance() {
    let mut group = Group::new();
    group
        .service
        .report_misbehavior(&admin(), &id("rm1"), MisbehaviorKind::DataTampering)
        .unwrap();
    let after_penalty = group.service.balance_of(&id("rm1"));

    let early = group.service.report_benign(&admin(), &id("rm1")).unwrap();
    assert!(matches!(early, BenignOutcome::NotEligible { eligible_at: Some(_) }));

    group.advance(DAY);
    let outcome = group.service.report_benign(&admin(), &id("rm1")).unwrap();
    assert!(outcome.is_rewarded());
    assert!(group.service.balance_of(&id("rm1")) > after_penalty);
    // Status is only restored by the next blocking check.
    assert_eq!(group.service.member(&id("rm1")).unwrap().status, MemberStatus::Malicious);
}

#[test]
fn blocking_check_precedes_policy() {
    let mut group = Group::new();
    group
        .service
        .report_misbehavior(&admin(), &id("pgh3"), MisbehaviorKind::UnauthorizedAccess)
        .unwrap();
    let balance = group.service.balance_of(&id("pgh3"));

    let err = group
        .service
        .create_access_request(&id("pgh3"), ResourceTable::Global, Action::View)
        .unwrap_err();
    assert_eq!(err.reason(), RejectionReason::Blocked);
    // Rejected without a second sanction.
    assert_eq!(group.service.balance_of(&id("pgh3")), balance);
    assert!(group.service.access_requests().is_empty());
}

#[test]
fn penalty_never_drives_balance_negative() {
    let mut config = AccordConfig::default();
    config.incentives.secondary_head_balance = 2_000;
    let mut group = Group::with_config(config);

    let report = group
        .service
        .deactivate_scope(&id("sgh2"), "movie")
        .unwrap()
        .penalty()
        .cloned()
        .unwrap();
    assert_eq!(report.penalty_amount, 20_000);
    assert_eq!(report.debited, 2_000);
    assert_eq!(group.service.balance_of(&id("sgh2")), 0);
}

#[test]
fn edit_rejects_non_heads_without_consuming_request() {
    let mut group = Group::new();
    group.approved_request("sgh1", ResourceTable::Global, Action::Edit, &["pgh1", "pgh2"]);

    let err = group
        .service
        .edit_global_resource_table(&id("sgh1"), &id("sgh1"), &id("rm1"))
        .unwrap_err();
    assert!(matches!(err, AccessError::Quorum(_)));
    assert_eq!(err.reason(), RejectionReason::InvalidRequest);
    assert!(group.service.access_request(0).unwrap().is_approved);
    assert_eq!(group.service.access_request(0).unwrap().state, RequestState::Approved);

    assert!(group
        .service
        .edit_global_resource_table(&id("sgh1"), &id("sgh1"), &id("pgh4"))
        .is_ok());
}

#[test]
fn non_admin_cannot_sanction_or_configure() {
    let mut group = Group::new();
    let err = group
        .service
        .report_misbehavior(&id("pgh1"), &id("rm1"), MisbehaviorKind::DataTampering)
        .unwrap_err();
    assert_eq!(err.reason(), RejectionReason::NotAuthorized);

    let err = group
        .service
        .set_scope_policy(
            &id("sgh1"),
            "picture",
            Role::SecondaryHead,
            ResourceId::new("picture"),
            Action::Edit,
            accord_types::Decision::Allow,
        )
        .unwrap_err();
    assert_eq!(err.reason(), RejectionReason::NotAuthorized);
}

#[test]
fn journal_exports_as_json() {
    let mut group = Group::new();
    group
        .service
        .create_access_request(&id("rm1"), ResourceTable::Global, Action::View)
        .unwrap();
    let json = group.service.journal().to_json().unwrap();
    let entries: serde_json::Value = serde_json::from_str(&json).unwrap();
    let last = entries.as_array().and_then(|e| e.last()).unwrap();
    assert_eq!(last["event"]["type"], "MaliciousActivityReported");
    assert!(json.contains("Unauthorized access attempt"));
}
