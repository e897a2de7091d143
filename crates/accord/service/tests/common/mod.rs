#![allow(dead_code)]

use accord_incentive::InMemoryIncentiveLedger;
use accord_service::{AccessControlService, AccordConfig};
use accord_types::{Action, Decision, ManualClock, MemberId, ResourceId, ResourceTable, Role};
use chrono::{TimeZone, Utc};
use std::sync::Arc;

pub const DAY: u64 = 86_400;

pub fn id(s: &str) -> MemberId {
    MemberId::new(s)
}

pub fn admin() -> MemberId {
    id("admin")
}

pub struct Group {
    pub service: AccessControlService,
    pub clock: Arc<ManualClock>,
}

impl Group {
    pub fn new() -> Self {
        Self::with_config(AccordConfig::default())
    }

    /// Four primary heads, two secondary heads, two regular members, the
    /// table policy used across scenarios and two head-pair scopes.
    pub fn with_config(config: AccordConfig) -> Self {
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2024, 9, 2, 9, 0, 0).unwrap(),
        ));
        let mut service = AccessControlService::new(
            config,
            admin(),
            clock.clone(),
            Box::new(InMemoryIncentiveLedger::new()),
        )
        .unwrap();

        let members = [
            ("pgh1", "Hospital A", Role::PrimaryHead),
            ("pgh2", "Hospital B", Role::PrimaryHead),
            ("pgh3", "Hospital C", Role::PrimaryHead),
            ("pgh4", "Hospital D", Role::PrimaryHead),
            ("sgh1", "Clinic A", Role::SecondaryHead),
            ("sgh2", "Clinic B", Role::SecondaryHead),
            ("rm1", "Nurse", Role::RegularMember),
            ("rm2", "Porter", Role::RegularMember),
        ];
        for (member, name, role) in members {
            service
                .assign_role(&admin(), id(member), name, "healthcare", role)
                .unwrap();
        }

        let table_policy = [
            (Role::PrimaryHead, ResourceTable::Global, Action::View, Decision::Allow),
            (Role::PrimaryHead, ResourceTable::Global, Action::Edit, Decision::Allow),
            (Role::PrimaryHead, ResourceTable::Global, Action::Delete, Decision::Allow),
            (Role::PrimaryHead, ResourceTable::Local, Action::View, Decision::Allow),
            (Role::SecondaryHead, ResourceTable::Global, Action::View, Decision::Allow),
            (Role::SecondaryHead, ResourceTable::Global, Action::Edit, Decision::Allow),
            (Role::SecondaryHead, ResourceTable::Local, Action::View, Decision::Allow),
            (Role::RegularMember, ResourceTable::Global, Action::View, Decision::Deny),
            (Role::RegularMember, ResourceTable::Local, Action::View, Decision::Deny),
        ];
        for (role, table, action, decision) in table_policy {
            service
                .set_table_policy(&admin(), role, table, action, decision)
                .unwrap();
        }

        service
            .open_scope(&admin(), "picture", &id("pgh1"), &id("sgh1"))
            .unwrap();
        service
            .open_scope(&id("pgh2"), "movie", &id("pgh2"), &id("sgh2"))
            .unwrap();
        for (scope, owner) in [("picture", "pgh1"), ("movie", "pgh2")] {
            let resource = ResourceId::new(scope);
            for (role, action, decision) in [
                (Role::PrimaryHead, Action::View, Decision::Allow),
                (Role::PrimaryHead, Action::Edit, Decision::Allow),
                (Role::SecondaryHead, Action::View, Decision::Allow),
                (Role::SecondaryHead, Action::Edit, Decision::Deny),
                (Role::RegularMember, Action::View, Decision::Allow),
            ] {
                service
                    .set_scope_policy(&id(owner), scope, role, resource.clone(), action, decision)
                    .unwrap();
            }
        }

        Self { service, clock }
    }

    pub fn advance(&self, secs: u64) {
        self.clock.advance(secs);
    }

    /// Create a request and have `approvers` vote for it. Returns its id.
    pub fn approved_request(
        &mut self,
        requester: &str,
        table: ResourceTable,
        action: Action,
        approvers: &[&str],
    ) -> u64 {
        let request = self
            .service
            .create_access_request(&id(requester), table, action)
            .unwrap()
            .completed()
            .expect("request should be created");
        for approver in approvers {
            self.service
                .handle_access_request(&id(approver), request.id, true)
                .unwrap();
        }
        request.id
    }
}
