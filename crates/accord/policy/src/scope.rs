//! Per-pair resource scopes.
//!
//! A scope guards one managed resource for a primary head (owner) and a
//! secondary head (partner). It owns an independent policy matrix and rate
//! limiter, and an active flag only the owner may toggle.

use crate::error::PolicyError;
use crate::matrix::{PolicyEntry, PolicyMatrix};
use crate::rate_limit::{RateLimitConfig, RateLimiter};
use accord_judge::{Enforcement, MisbehaviorJudge, Outcome};
use accord_types::{
    Action, Decision, GovernanceEvent, LocalResourceEntry, MemberId, MisbehaviorKind, ResourceId,
    Role, TokenAmount,
};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// What a policy denial turns into.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DenialHandling {
    /// Report an unauthorized access attempt to the judge.
    #[default]
    Penalize,
    /// Fail with `PolicyDenied` and leave the caller untouched.
    Reject,
}

/// Confirmation of an executed access.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessReceipt {
    pub member: MemberId,
    pub resource: ResourceId,
    pub action: Action,
    /// Benign reward paid alongside the access.
    pub reward: Option<TokenAmount>,
}

#[derive(Clone, Debug)]
pub struct ResourceScope {
    name: String,
    owner: MemberId,
    partner: MemberId,
    admin: MemberId,
    matrix: PolicyMatrix,
    limiter: RateLimiter,
    denial: DenialHandling,
    active: bool,
}

impl ResourceScope {
    pub fn new(
        name: impl Into<String>,
        owner: MemberId,
        partner: MemberId,
        admin: MemberId,
        rate_limit: RateLimitConfig,
    ) -> Self {
        Self {
            name: name.into(),
            owner,
            partner,
            admin,
            matrix: PolicyMatrix::new(),
            limiter: RateLimiter::new(rate_limit),
            denial: DenialHandling::default(),
            active: true,
        }
    }

    pub fn with_denial_handling(mut self, denial: DenialHandling) -> Self {
        self.denial = denial;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn owner(&self) -> &MemberId {
        &self.owner
    }

    pub fn partner(&self) -> &MemberId {
        &self.partner
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn policies(&self) -> Vec<PolicyEntry> {
        self.matrix.entries()
    }

    pub fn evaluate(&self, role: Role, resource: &ResourceId, action: Action) -> Decision {
        self.matrix.evaluate(role, resource, action)
    }

    pub fn local_entry(&self) -> LocalResourceEntry {
        LocalResourceEntry {
            resource: self.name.clone(),
            owner: self.owner.clone(),
            partner: self.partner.clone(),
            active: self.active,
        }
    }

    fn may_administer(&self, caller: &MemberId) -> bool {
        caller == &self.owner || caller == &self.admin
    }

    /// Owner or admin only. Unauthorized callers are rejected, not penalized.
    pub fn set_policy(
        &mut self,
        cx: &mut Enforcement<'_>,
        caller: &MemberId,
        role: Role,
        resource: ResourceId,
        action: Action,
        decision: Decision,
    ) -> Result<Option<Decision>, PolicyError> {
        if !self.may_administer(caller) {
            return Err(PolicyError::NotAuthorized {
                member: caller.clone(),
                operation: format!("set policy on scope {}", self.name),
            });
        }
        let previous = self.matrix.set(role, resource.clone(), action, decision)?;
        cx.emit(GovernanceEvent::PolicyUpdated {
            role,
            resource: resource.to_string(),
            action,
            allowed: decision.is_allow(),
        });
        info!(scope = %self.name, role = %role, resource = %resource, action = %action, decision = %decision, "Scope policy updated");
        Ok(previous)
    }

    /// Perform `action` on `resource` within this scope.
    ///
    /// Order: blocking window, active flag, rate limit, policy. A too-frequent
    /// call is penalized even when the policy would allow it.
    pub fn access(
        &mut self,
        cx: &mut Enforcement<'_>,
        judge: &MisbehaviorJudge,
        caller: &MemberId,
        resource: &ResourceId,
        action: Action,
    ) -> Result<Outcome<AccessReceipt>, PolicyError> {
        judge.check_blocking(cx, caller)?;
        if !self.active {
            return Err(PolicyError::ScopeInactive(self.name.clone()));
        }
        let role = cx.roles.role_of(caller)?;

        if self.limiter.is_too_frequent(caller, resource, action, cx.now) {
            warn!(scope = %self.name, member = %caller, resource = %resource, action = %action, "Access too frequent");
            let report = judge.report_misbehavior(cx, caller, MisbehaviorKind::TooFrequentAccess)?;
            return Ok(Outcome::Penalized(report));
        }

        if let Err(denied) = self.matrix.ensure_allowed(role, resource, action) {
            warn!(scope = %self.name, member = %caller, role = %role, resource = %resource, action = %action, "Access denied by policy");
            return match self.denial {
                DenialHandling::Reject => Err(denied),
                DenialHandling::Penalize => {
                    let report =
                        judge.report_misbehavior(cx, caller, MisbehaviorKind::UnauthorizedAccess)?;
                    Ok(Outcome::Penalized(report))
                }
            };
        }

        self.limiter.record(caller, resource, action, cx.now);
        cx.emit(GovernanceEvent::AccessGranted {
            executor: caller.clone(),
            resource: resource.to_string(),
            action,
        });
        info!(scope = %self.name, member = %caller, resource = %resource, action = %action, "Access granted");

        let reward = judge.reward_if_eligible(cx, caller);
        Ok(Outcome::Completed(AccessReceipt {
            member: caller.clone(),
            resource: resource.clone(),
            action,
            reward,
        }))
    }

    pub fn activate(
        &mut self,
        cx: &mut Enforcement<'_>,
        judge: &MisbehaviorJudge,
        caller: &MemberId,
    ) -> Result<Outcome<bool>, PolicyError> {
        self.toggle(cx, judge, caller, true)
    }

    pub fn deactivate(
        &mut self,
        cx: &mut Enforcement<'_>,
        judge: &MisbehaviorJudge,
        caller: &MemberId,
    ) -> Result<Outcome<bool>, PolicyError> {
        self.toggle(cx, judge, caller, false)
    }

    // Authorization is decided before the flag is touched; a rejected call
    // leaves the scope exactly as it was.
    fn toggle(
        &mut self,
        cx: &mut Enforcement<'_>,
        judge: &MisbehaviorJudge,
        caller: &MemberId,
        active: bool,
    ) -> Result<Outcome<bool>, PolicyError> {
        judge.check_blocking(cx, caller)?;

        if !self.may_administer(caller) {
            warn!(scope = %self.name, member = %caller, activate = active, "Scope toggle by non-owner");
            let report = judge.report_misbehavior(cx, caller, MisbehaviorKind::DenialOfService)?;
            return Ok(Outcome::Penalized(report));
        }

        let changed = self.active != active;
        self.active = active;
        let event = if active {
            GovernanceEvent::ScopeActivated {
                resource: self.name.clone(),
                by: caller.clone(),
            }
        } else {
            GovernanceEvent::ScopeDeactivated {
                resource: self.name.clone(),
                by: caller.clone(),
            }
        };
        cx.emit(event);
        info!(scope = %self.name, member = %caller, active, "Scope toggled");
        Ok(Outcome::Completed(changed))
    }
}
