//! The access control service.
//!
//! Owns every component and exposes the member-facing operations. Each call
//! reads the clock once and runs to completion against a single `&mut self`,
//! so callers observe either all of its effects or none.

use crate::config::AccordConfig;
use crate::error::AccessError;
use accord_identity::{Member, RoleLedger};
use accord_incentive::{InMemoryIncentiveLedger, IncentiveLedger};
use accord_judge::{BenignOutcome, Enforcement, MisbehaviorJudge, MisbehaviorReport, Outcome};
use accord_policy::{AccessReceipt, PolicyEntry, ResourceScope};
use accord_quorum::{AccessRequest, ApprovalOutcome, Execution, TableAccessControl};
use accord_types::{
    Action, Clock, Decision, EventJournal, GovernanceEvent, JournalEntry, LocalResourceEntry,
    MemberId, MemberStatus, MisbehaviorKind, ResourceId, ResourceTable, Role, SystemClock,
    TableEntry, Timestamp, TokenAmount,
};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{info, warn};

pub struct AccessControlService {
    config: AccordConfig,
    admin: MemberId,
    clock: Arc<dyn Clock>,
    roles: RoleLedger,
    incentives: Box<dyn IncentiveLedger>,
    journal: EventJournal,
    judge: MisbehaviorJudge,
    tables: TableAccessControl,
    scopes: BTreeMap<String, ResourceScope>,
}

/// Disjoint borrows of the service for one call.
struct Parts<'a> {
    cx: Enforcement<'a>,
    judge: &'a MisbehaviorJudge,
    tables: &'a mut TableAccessControl,
    scopes: &'a mut BTreeMap<String, ResourceScope>,
}

impl AccessControlService {
    pub fn new(
        config: AccordConfig,
        admin: MemberId,
        clock: Arc<dyn Clock>,
        incentives: Box<dyn IncentiveLedger>,
    ) -> Result<Self, AccessError> {
        config.validate()?;
        Ok(Self::build(config, admin, clock, incentives))
    }

    /// Default configuration, wall clock, in-memory balances.
    pub fn with_defaults(admin: MemberId) -> Self {
        Self::build(
            AccordConfig::default(),
            admin,
            Arc::new(SystemClock),
            Box::new(InMemoryIncentiveLedger::new()),
        )
    }

    fn build(
        config: AccordConfig,
        admin: MemberId,
        clock: Arc<dyn Clock>,
        incentives: Box<dyn IncentiveLedger>,
    ) -> Self {
        info!(admin = %admin, "Access control service created");
        Self {
            judge: MisbehaviorJudge::new(config.judge.clone()),
            tables: TableAccessControl::new(config.quorum),
            config,
            admin,
            clock,
            roles: RoleLedger::new(),
            incentives,
            journal: EventJournal::new(),
            scopes: BTreeMap::new(),
        }
    }

    fn parts(&mut self) -> Parts<'_> {
        let now = self.clock.now();
        Parts {
            cx: Enforcement::new(&mut self.roles, &mut *self.incentives, &mut self.journal, now),
            judge: &self.judge,
            tables: &mut self.tables,
            scopes: &mut self.scopes,
        }
    }

    fn ensure_admin(&self, caller: &MemberId) -> Result<(), AccessError> {
        if caller != &self.admin {
            warn!(member = %caller, "Administrative call by non-admin");
            return Err(AccessError::NotAdmin(caller.clone()));
        }
        Ok(())
    }

    // ── Administration ──────────────────────────────────────────────────

    /// Register a member and mint the initial balance for its role.
    pub fn assign_role(
        &mut self,
        caller: &MemberId,
        member: MemberId,
        name: &str,
        member_type: &str,
        role: Role,
    ) -> Result<Member, AccessError> {
        self.ensure_admin(caller)?;
        let now = self.clock.now();
        let record = self.roles.register(member.clone(), name, member_type, role, now)?;

        let balance = self.config.incentives.initial_balance(role);
        if let Err(e) = self.incentives.mint(&member, balance) {
            self.roles.remove(&member)?;
            return Err(e.into());
        }

        self.journal
            .record(GovernanceEvent::MemberRegistered { member, role }, now);
        Ok(record)
    }

    pub fn set_table_policy(
        &mut self,
        caller: &MemberId,
        role: Role,
        table: ResourceTable,
        action: Action,
        decision: Decision,
    ) -> Result<Option<Decision>, AccessError> {
        self.ensure_admin(caller)?;
        let mut p = self.parts();
        Ok(p.tables.set_policy(&mut p.cx, role, table, action, decision)?)
    }

    /// Open a scope for a primary head (owner) and a secondary head (partner).
    /// The admin or the owner may open it.
    pub fn open_scope(
        &mut self,
        caller: &MemberId,
        name: &str,
        owner: &MemberId,
        partner: &MemberId,
    ) -> Result<LocalResourceEntry, AccessError> {
        if caller != &self.admin && caller != owner {
            return Err(AccessError::NotAdmin(caller.clone()));
        }
        if self.scopes.contains_key(name) {
            return Err(AccessError::ScopeExists(name.to_string()));
        }
        let owner_role = self.roles.role_of(owner)?;
        let partner_role = self.roles.role_of(partner)?;
        if owner_role != Role::PrimaryHead || partner_role != Role::SecondaryHead {
            return Err(AccessError::InvalidScopePair {
                scope: name.to_string(),
                owner_role,
                partner_role,
            });
        }

        let scope = ResourceScope::new(
            name,
            owner.clone(),
            partner.clone(),
            self.admin.clone(),
            self.config.rate_limit,
        )
        .with_denial_handling(self.config.enforcement.scope_denial);
        let entry = scope.local_entry();

        let now = self.clock.now();
        self.tables.local_table_mut().upsert(entry.clone());
        self.scopes.insert(name.to_string(), scope);
        self.journal.record(
            GovernanceEvent::ScopeOpened {
                resource: name.to_string(),
                owner: owner.clone(),
                partner: partner.clone(),
            },
            now,
        );
        info!(scope = name, owner = %owner, partner = %partner, "Resource scope opened");
        Ok(entry)
    }

    /// Sanction a member directly, e.g. for data tampering detected out of band.
    pub fn report_misbehavior(
        &mut self,
        caller: &MemberId,
        member: &MemberId,
        kind: MisbehaviorKind,
    ) -> Result<MisbehaviorReport, AccessError> {
        self.ensure_admin(caller)?;
        let mut p = self.parts();
        Ok(p.judge.report_misbehavior(&mut p.cx, member, kind)?)
    }

    /// Pay the benign reward if the member has been quiet long enough.
    pub fn report_benign(
        &mut self,
        caller: &MemberId,
        member: &MemberId,
    ) -> Result<BenignOutcome, AccessError> {
        self.ensure_admin(caller)?;
        let mut p = self.parts();
        Ok(p.judge.report_benign(&mut p.cx, member)?)
    }

    pub fn suspend_member(&mut self, caller: &MemberId, member: &MemberId) -> Result<(), AccessError> {
        self.ensure_admin(caller)?;
        let now = self.clock.now();
        self.roles.suspend(member, now)?;
        self.journal.record(
            GovernanceEvent::MemberStatusChanged {
                member: member.clone(),
                status: MemberStatus::Blocked,
            },
            now,
        );
        Ok(())
    }

    pub fn reinstate_member(&mut self, caller: &MemberId, member: &MemberId) -> Result<(), AccessError> {
        self.ensure_admin(caller)?;
        let now = self.clock.now();
        self.roles.reinstate(member, now)?;
        self.journal.record(
            GovernanceEvent::MemberStatusChanged {
                member: member.clone(),
                status: MemberStatus::Active,
            },
            now,
        );
        Ok(())
    }

    // ── Resource scopes ─────────────────────────────────────────────────

    pub fn set_scope_policy(
        &mut self,
        caller: &MemberId,
        scope: &str,
        role: Role,
        resource: ResourceId,
        action: Action,
        decision: Decision,
    ) -> Result<Option<Decision>, AccessError> {
        let mut p = self.parts();
        let scope = p
            .scopes
            .get_mut(scope)
            .ok_or_else(|| AccessError::UnknownScope(scope.to_string()))?;
        Ok(scope.set_policy(&mut p.cx, caller, role, resource, action, decision)?)
    }

    pub fn access_resource(
        &mut self,
        caller: &MemberId,
        scope: &str,
        resource: ResourceId,
        action: Action,
    ) -> Result<Outcome<AccessReceipt>, AccessError> {
        let mut p = self.parts();
        let scope = p
            .scopes
            .get_mut(scope)
            .ok_or_else(|| AccessError::UnknownScope(scope.to_string()))?;
        Ok(scope.access(&mut p.cx, p.judge, caller, &resource, action)?)
    }

    pub fn activate_scope(&mut self, caller: &MemberId, scope: &str) -> Result<Outcome<bool>, AccessError> {
        self.toggle_scope(caller, scope, true)
    }

    pub fn deactivate_scope(&mut self, caller: &MemberId, scope: &str) -> Result<Outcome<bool>, AccessError> {
        self.toggle_scope(caller, scope, false)
    }

    fn toggle_scope(&mut self, caller: &MemberId, name: &str, active: bool) -> Result<Outcome<bool>, AccessError> {
        let mut p = self.parts();
        let scope = p
            .scopes
            .get_mut(name)
            .ok_or_else(|| AccessError::UnknownScope(name.to_string()))?;
        let outcome = if active {
            scope.activate(&mut p.cx, p.judge, caller)?
        } else {
            scope.deactivate(&mut p.cx, p.judge, caller)?
        };
        if !outcome.is_penalized() {
            p.tables.local_table_mut().upsert(scope.local_entry());
        }
        Ok(outcome)
    }

    // ── Quorum workflow ─────────────────────────────────────────────────

    pub fn create_access_request(
        &mut self,
        caller: &MemberId,
        table: ResourceTable,
        action: Action,
    ) -> Result<Outcome<AccessRequest>, AccessError> {
        let mut p = self.parts();
        Ok(p.tables.create_access_request(&mut p.cx, p.judge, caller, table, action)?)
    }

    pub fn handle_access_request(
        &mut self,
        caller: &MemberId,
        request_id: u64,
        approve: bool,
    ) -> Result<ApprovalOutcome, AccessError> {
        let mut p = self.parts();
        Ok(p.tables.handle_access_request(&mut p.cx, p.judge, caller, request_id, approve)?)
    }

    /// Swap the roles of `first` and `second`. Returns their new roles.
    pub fn edit_global_resource_table(
        &mut self,
        caller: &MemberId,
        first: &MemberId,
        second: &MemberId,
    ) -> Result<Execution<(Role, Role)>, AccessError> {
        let mut p = self.parts();
        Ok(p.tables.edit_global_resource_table(&mut p.cx, p.judge, caller, first, second)?)
    }

    pub fn delete_global_resource_table(
        &mut self,
        caller: &MemberId,
        member: &MemberId,
    ) -> Result<Execution<TableEntry>, AccessError> {
        let mut p = self.parts();
        Ok(p.tables.delete_global_resource_table(&mut p.cx, p.judge, caller, member)?)
    }

    pub fn view_global_resource_table(
        &mut self,
        caller: &MemberId,
    ) -> Result<Execution<Vec<TableEntry>>, AccessError> {
        let mut p = self.parts();
        Ok(p.tables.view_global_resource_table(&mut p.cx, p.judge, caller)?)
    }

    pub fn view_local_resource_table(
        &mut self,
        caller: &MemberId,
    ) -> Result<Execution<Vec<LocalResourceEntry>>, AccessError> {
        let mut p = self.parts();
        Ok(p.tables.view_local_resource_table(&mut p.cx, p.judge, caller)?)
    }

    // ── Queries ─────────────────────────────────────────────────────────

    pub fn admin(&self) -> &MemberId {
        &self.admin
    }

    pub fn config(&self) -> &AccordConfig {
        &self.config
    }

    pub fn now(&self) -> Timestamp {
        self.clock.now()
    }

    pub fn member(&self, member: &MemberId) -> Result<Member, AccessError> {
        Ok(self.roles.member(member)?.clone())
    }

    pub fn role_of(&self, member: &MemberId) -> Result<Role, AccessError> {
        Ok(self.roles.role_of(member)?)
    }

    pub fn members(&self) -> Vec<Member> {
        self.roles.members()
    }

    pub fn balance_of(&self, member: &MemberId) -> TokenAmount {
        self.incentives.balance_of(member)
    }

    /// End of the member's current blocking window, if one is open or has
    /// not yet been lifted.
    pub fn blocking_end_time(&self, member: &MemberId) -> Result<Option<Timestamp>, AccessError> {
        Ok(self.roles.member(member)?.blocking_end_time)
    }

    pub fn access_request(&self, request_id: u64) -> Result<AccessRequest, AccessError> {
        Ok(self.tables.request(request_id)?.clone())
    }

    pub fn access_requests(&self) -> Vec<AccessRequest> {
        self.tables.requests().to_vec()
    }

    pub fn table_policies(&self) -> Vec<PolicyEntry> {
        self.tables.policies()
    }

    pub fn scope(&self, name: &str) -> Result<&ResourceScope, AccessError> {
        self.scopes
            .get(name)
            .ok_or_else(|| AccessError::UnknownScope(name.to_string()))
    }

    pub fn events(&self) -> &[JournalEntry] {
        self.journal.entries()
    }

    pub fn journal(&self) -> &EventJournal {
        &self.journal
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use accord_types::ManualClock;
    use chrono::{TimeZone, Utc};

    fn id(s: &str) -> MemberId {
        MemberId::new(s)
    }

    fn service() -> (AccessControlService, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2024, 8, 1, 0, 0, 0).unwrap(),
        ));
        let service = AccessControlService::new(
            AccordConfig::default(),
            id("admin"),
            clock.clone(),
            Box::new(InMemoryIncentiveLedger::new()),
        )
        .unwrap();
        (service, clock)
    }

    #[test]
    fn registration_mints_initial_balance() {
        let (mut svc, _) = service();
        let admin = id("admin");
        svc.assign_role(&admin, id("pgh"), "Alice", "hospital", Role::PrimaryHead)
            .unwrap();
        svc.assign_role(&admin, id("rm"), "Carol", "staff", Role::RegularMember)
            .unwrap();

        assert_eq!(svc.balance_of(&id("pgh")), 1_000_000);
        assert_eq!(svc.balance_of(&id("rm")), 100_000);
        assert_eq!(svc.events()[0].event.kind(), "MemberRegistered");
    }

    #[test]
    fn administration_requires_admin() {
        let (mut svc, _) = service();
        let err = svc
            .assign_role(&id("mallory"), id("x"), "X", "x", Role::PrimaryHead)
            .unwrap_err();
        assert!(matches!(err, AccessError::NotAdmin(_)));
        assert!(svc.members().is_empty());
    }

    #[test]
    fn invalid_config_is_rejected() {
        let mut config = AccordConfig::default();
        config.quorum.local.view = 0;
        let result = AccessControlService::new(
            config,
            id("admin"),
            Arc::new(SystemClock),
            Box::new(InMemoryIncentiveLedger::new()),
        );
        assert!(matches!(result, Err(AccessError::InvalidConfig(_))));
    }

    #[test]
    fn scopes_need_a_head_pair() {
        let (mut svc, _) = service();
        let admin = id("admin");
        svc.assign_role(&admin, id("pgh"), "A", "h", Role::PrimaryHead).unwrap();
        svc.assign_role(&admin, id("sgh"), "B", "c", Role::SecondaryHead).unwrap();
        svc.assign_role(&admin, id("rm"), "C", "s", Role::RegularMember).unwrap();

        let err = svc.open_scope(&admin, "picture", &id("pgh"), &id("rm")).unwrap_err();
        assert!(matches!(err, AccessError::InvalidScopePair { .. }));

        let entry = svc.open_scope(&id("pgh"), "picture", &id("pgh"), &id("sgh")).unwrap();
        assert!(entry.active);
        assert!(matches!(
            svc.open_scope(&admin, "picture", &id("pgh"), &id("sgh")),
            Err(AccessError::ScopeExists(_))
        ));
        assert!(matches!(
            svc.access_resource(&id("pgh"), "movie", ResourceId::new("movie"), Action::View),
            Err(AccessError::UnknownScope(_))
        ));
    }

    #[test]
    fn suspension_blocks_every_call() {
        let (mut svc, _) = service();
        let admin = id("admin");
        svc.assign_role(&admin, id("sgh"), "B", "c", Role::SecondaryHead).unwrap();
        svc.set_table_policy(&admin, Role::SecondaryHead, ResourceTable::Global, Action::Edit, Decision::Allow)
            .unwrap();
        svc.suspend_member(&admin, &id("sgh")).unwrap();

        let err = svc
            .create_access_request(&id("sgh"), ResourceTable::Global, Action::Edit)
            .unwrap_err();
        assert_eq!(err.reason(), crate::RejectionReason::Blocked);

        svc.reinstate_member(&admin, &id("sgh")).unwrap();
        assert!(svc
            .create_access_request(&id("sgh"), ResourceTable::Global, Action::Edit)
            .is_ok());
    }
}
