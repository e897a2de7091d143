//! Quorum-gated access to the global and local resource tables.

use crate::config::QuorumConfig;
use crate::error::QuorumError;
use crate::request::{AccessRequest, ApprovalOutcome};
use accord_judge::{Enforcement, MisbehaviorJudge, Outcome};
use accord_policy::{PolicyEntry, PolicyMatrix};
use accord_types::{
    Action, Decision, GovernanceEvent, LocalResourceEntry, MemberId, MisbehaviorKind,
    ResourceTable, Role, TableEntry, TokenAmount,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

/// Directory of resources managed by head-pair scopes.
#[derive(Clone, Debug, Default)]
pub struct LocalResourceTable {
    entries: Vec<LocalResourceEntry>,
}

impl LocalResourceTable {
    /// Insert or replace the entry for `entry.resource`.
    pub fn upsert(&mut self, entry: LocalResourceEntry) {
        match self.entries.iter_mut().find(|e| e.resource == entry.resource) {
            Some(existing) => *existing = entry,
            None => self.entries.push(entry),
        }
    }

    pub fn get(&self, resource: &str) -> Option<&LocalResourceEntry> {
        self.entries.iter().find(|e| e.resource == resource)
    }

    pub fn entries(&self) -> &[LocalResourceEntry] {
        &self.entries
    }
}

/// Result of an executed table operation.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Execution<T> {
    pub request_id: u64,
    pub value: T,
    /// Benign reward paid to the executor.
    pub reward: Option<TokenAmount>,
}

pub struct TableAccessControl {
    matrix: PolicyMatrix,
    quorum: QuorumConfig,
    requests: Vec<AccessRequest>,
    local: LocalResourceTable,
}

impl TableAccessControl {
    pub fn new(quorum: QuorumConfig) -> Self {
        Self {
            matrix: PolicyMatrix::new(),
            quorum,
            requests: Vec::new(),
            local: LocalResourceTable::default(),
        }
    }

    pub fn quorum(&self) -> &QuorumConfig {
        &self.quorum
    }

    pub fn policies(&self) -> Vec<PolicyEntry> {
        self.matrix.entries()
    }

    pub fn evaluate(&self, role: Role, table: ResourceTable, action: Action) -> Decision {
        self.matrix.evaluate(role, &table.resource_id(), action)
    }

    /// Overwrite a table policy entry. Callers are expected to have checked
    /// administrative authority.
    pub fn set_policy(
        &mut self,
        cx: &mut Enforcement<'_>,
        role: Role,
        table: ResourceTable,
        action: Action,
        decision: Decision,
    ) -> Result<Option<Decision>, QuorumError> {
        let previous = self.matrix.set(role, table.resource_id(), action, decision)?;
        cx.emit(GovernanceEvent::PolicyUpdated {
            role,
            resource: table.to_string(),
            action,
            allowed: decision.is_allow(),
        });
        info!(role = %role, table = %table, action = %action, decision = %decision, "Table policy updated");
        Ok(previous)
    }

    pub fn request(&self, id: u64) -> Result<&AccessRequest, QuorumError> {
        self.requests
            .get(id as usize)
            .ok_or(QuorumError::UnknownRequest(id))
    }

    pub fn requests(&self) -> &[AccessRequest] {
        &self.requests
    }

    pub fn local_table(&self) -> &LocalResourceTable {
        &self.local
    }

    pub fn local_table_mut(&mut self) -> &mut LocalResourceTable {
        &mut self.local
    }

    fn primary_heads(cx: &Enforcement<'_>) -> usize {
        cx.roles.count_with_role(Role::PrimaryHead)
    }

    /// Open a request. A policy denial is an unauthorized access attempt:
    /// the caller is penalized and no request is created.
    ///
    /// A primary-head requester endorses their own request, so it starts
    /// with one approval and may be approved immediately.
    pub fn create_access_request(
        &mut self,
        cx: &mut Enforcement<'_>,
        judge: &MisbehaviorJudge,
        caller: &MemberId,
        table: ResourceTable,
        action: Action,
    ) -> Result<Outcome<AccessRequest>, QuorumError> {
        judge.check_blocking(cx, caller)?;
        let role = cx.roles.role_of(caller)?;

        if !self.evaluate(role, table, action).is_allow() {
            warn!(member = %caller, role = %role, table = %table, action = %action, "Access request denied by policy");
            let report = judge.report_misbehavior(cx, caller, MisbehaviorKind::UnauthorizedAccess)?;
            return Ok(Outcome::Penalized(report));
        }

        let heads = Self::primary_heads(cx);
        if heads == 0 {
            warn!(member = %caller, table = %table, action = %action, "No primary head can approve request");
            return Err(QuorumError::NoEligibleApprovers { table, action });
        }

        let id = self.requests.len() as u64;
        let required = self.quorum.required(table, action, heads);
        let mut request = AccessRequest::new(id, caller.clone(), table, action, required, cx.now);
        if role == Role::PrimaryHead {
            request.approve(caller.clone(), required, cx.now);
        }
        self.requests.push(request.clone());

        cx.emit(GovernanceEvent::AccessRequestCreated {
            request_id: id,
            requester: caller.clone(),
            resource_table: table,
            action,
        });
        info!(request_id = id, member = %caller, table = %table, action = %action, required, approved = request.is_approved, "Access request created");
        Ok(Outcome::Completed(request))
    }

    /// Vote on a request. Only unblocked primary heads other than the
    /// requester may vote.
    pub fn handle_access_request(
        &mut self,
        cx: &mut Enforcement<'_>,
        judge: &MisbehaviorJudge,
        approver: &MemberId,
        id: u64,
        approve: bool,
    ) -> Result<ApprovalOutcome, QuorumError> {
        judge.check_blocking(cx, approver)?;
        if cx.roles.role_of(approver)? != Role::PrimaryHead {
            return Err(QuorumError::NotAuthorized {
                member: approver.clone(),
                operation: format!("approve access request {id}"),
            });
        }

        let request = self.request(id)?;
        if &request.requester == approver {
            return Err(QuorumError::NotAuthorized {
                member: approver.clone(),
                operation: format!("approve own access request {id}"),
            });
        }
        if request.is_executed() {
            return Err(QuorumError::RequestClosed(id));
        }
        let heads = Self::primary_heads(cx);

        if !approve {
            debug!(request_id = id, approver = %approver, "Negative vote ignored");
            return Ok(ApprovalOutcome::Ignored);
        }

        let request = self
            .requests
            .get_mut(id as usize)
            .ok_or(QuorumError::UnknownRequest(id))?;
        let required = self
            .quorum
            .required(request.resource_table, request.action, heads);
        let was_approved = request.is_approved;

        if !request.approve(approver.clone(), required, cx.now) {
            debug!(request_id = id, approver = %approver, "Duplicate approval");
            return Ok(ApprovalOutcome::Duplicate);
        }

        let outcome = ApprovalOutcome::Counted {
            approvals: request.approval_count(),
            required: request.required,
            approved: request.is_approved,
        };
        cx.emit(GovernanceEvent::AccessRequestApproved {
            request_id: id,
            approver: approver.clone(),
        });
        if request.is_approved && !was_approved {
            info!(request_id = id, approvals = request.approval_count(), "Access request approved");
        } else {
            debug!(request_id = id, approver = %approver, approvals = request.approval_count(), required, "Approval recorded");
        }
        Ok(outcome)
    }

    /// Most recent approved, unexecuted request by `caller` for the pair.
    fn executable(&self, caller: &MemberId, table: ResourceTable, action: Action) -> Result<usize, QuorumError> {
        self.requests
            .iter()
            .rposition(|r| r.matches(caller, table, action) && r.is_executable())
            .ok_or_else(|| QuorumError::QuorumNotMet {
                member: caller.clone(),
                table,
                action,
            })
    }

    fn complete<T>(
        &mut self,
        cx: &mut Enforcement<'_>,
        judge: &MisbehaviorJudge,
        index: usize,
        caller: &MemberId,
        value: T,
    ) -> Execution<T> {
        let request = &mut self.requests[index];
        request.mark_executed(cx.now);
        let (request_id, table, action) = (request.id, request.resource_table, request.action);

        cx.emit(GovernanceEvent::AccessGranted {
            executor: caller.clone(),
            resource: table.to_string(),
            action,
        });
        info!(request_id, member = %caller, table = %table, action = %action, "Access request executed");

        let reward = judge.reward_if_eligible(cx, caller);
        Execution {
            request_id,
            value,
            reward,
        }
    }

    /// Swap the roles of two distinct heads.
    pub fn edit_global_resource_table(
        &mut self,
        cx: &mut Enforcement<'_>,
        judge: &MisbehaviorJudge,
        caller: &MemberId,
        first: &MemberId,
        second: &MemberId,
    ) -> Result<Execution<(Role, Role)>, QuorumError> {
        judge.check_blocking(cx, caller)?;
        let index = self.executable(caller, ResourceTable::Global, Action::Edit)?;

        for member in [first, second] {
            if !cx.roles.role_of(member)?.is_head() {
                return Err(QuorumError::NotAHead(member.clone()));
            }
        }
        let roles = cx.roles.swap_roles(first, second)?;
        cx.emit(GovernanceEvent::RolesSwapped {
            first: first.clone(),
            second: second.clone(),
            swapped_by: caller.clone(),
        });

        Ok(self.complete(cx, judge, index, caller, roles))
    }

    /// Remove a member from the global table.
    pub fn delete_global_resource_table(
        &mut self,
        cx: &mut Enforcement<'_>,
        judge: &MisbehaviorJudge,
        caller: &MemberId,
        member: &MemberId,
    ) -> Result<Execution<TableEntry>, QuorumError> {
        judge.check_blocking(cx, caller)?;
        let index = self.executable(caller, ResourceTable::Global, Action::Delete)?;

        if caller == member {
            return Err(QuorumError::CannotRemoveSelf(caller.clone()));
        }
        let removed = cx.roles.remove(member)?;
        cx.emit(GovernanceEvent::MemberRemoved {
            member: member.clone(),
            removed_by: caller.clone(),
        });

        Ok(self.complete(cx, judge, index, caller, removed.table_entry()))
    }

    pub fn view_global_resource_table(
        &mut self,
        cx: &mut Enforcement<'_>,
        judge: &MisbehaviorJudge,
        caller: &MemberId,
    ) -> Result<Execution<Vec<TableEntry>>, QuorumError> {
        judge.check_blocking(cx, caller)?;
        let index = self.executable(caller, ResourceTable::Global, Action::View)?;

        let snapshot = cx.roles.global_resource_table();
        cx.emit(GovernanceEvent::GlobalResourceTableViewed {
            viewer: caller.clone(),
            resource_table: snapshot.clone(),
        });

        Ok(self.complete(cx, judge, index, caller, snapshot))
    }

    pub fn view_local_resource_table(
        &mut self,
        cx: &mut Enforcement<'_>,
        judge: &MisbehaviorJudge,
        caller: &MemberId,
    ) -> Result<Execution<Vec<LocalResourceEntry>>, QuorumError> {
        judge.check_blocking(cx, caller)?;
        let index = self.executable(caller, ResourceTable::Local, Action::View)?;

        let snapshot = self.local.entries().to_vec();
        cx.emit(GovernanceEvent::LocalResourceTableViewed {
            viewer: caller.clone(),
            resource_table: snapshot.clone(),
        });

        Ok(self.complete(cx, judge, index, caller, snapshot))
    }
}

impl Default for TableAccessControl {
    fn default() -> Self {
        Self::new(QuorumConfig::default())
    }
}
