//! Access requests and their approval lifecycle.

use accord_types::{Action, MemberId, ResourceTable, Timestamp};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// `Created -> PartiallyApproved* -> Approved -> Executed`. Never backwards.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum RequestState {
    Created,
    PartiallyApproved,
    Approved,
    Executed,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessRequest {
    /// Sequential, starting at zero.
    pub id: u64,
    pub requester: MemberId,
    pub resource_table: ResourceTable,
    pub action: Action,
    pub approvals: BTreeSet<MemberId>,
    /// Threshold evaluated at the most recent approval.
    pub required: usize,
    /// Write-once.
    pub is_approved: bool,
    pub state: RequestState,
    pub created_at: Timestamp,
    pub approved_at: Option<Timestamp>,
    pub executed_at: Option<Timestamp>,
}

impl AccessRequest {
    pub(crate) fn new(
        id: u64,
        requester: MemberId,
        resource_table: ResourceTable,
        action: Action,
        required: usize,
        now: Timestamp,
    ) -> Self {
        Self {
            id,
            requester,
            resource_table,
            action,
            approvals: BTreeSet::new(),
            required,
            is_approved: false,
            state: RequestState::Created,
            created_at: now,
            approved_at: None,
            executed_at: None,
        }
    }

    pub fn approval_count(&self) -> usize {
        self.approvals.len()
    }

    pub fn is_executed(&self) -> bool {
        self.state == RequestState::Executed
    }

    /// Approved and not yet consumed.
    pub fn is_executable(&self) -> bool {
        self.is_approved && !self.is_executed()
    }

    pub(crate) fn matches(&self, requester: &MemberId, table: ResourceTable, action: Action) -> bool {
        &self.requester == requester && self.resource_table == table && self.action == action
    }

    /// Add an approval; flips to approved once the threshold is reached.
    ///
    /// Returns `false` if the approver had already voted.
    pub(crate) fn approve(&mut self, approver: MemberId, required: usize, now: Timestamp) -> bool {
        if !self.approvals.insert(approver) {
            return false;
        }
        self.required = required;
        if self.is_approved {
            return true;
        }
        if self.approvals.len() >= required {
            self.is_approved = true;
            self.state = RequestState::Approved;
            self.approved_at = Some(now);
        } else {
            self.state = RequestState::PartiallyApproved;
        }
        true
    }

    pub(crate) fn mark_executed(&mut self, now: Timestamp) {
        self.state = RequestState::Executed;
        self.executed_at = Some(now);
    }
}

/// Result of a vote.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ApprovalOutcome {
    Counted {
        approvals: usize,
        required: usize,
        approved: bool,
    },
    /// Same approver voting again; nothing changed.
    Duplicate,
    /// `approve = false`; negative votes are not counted.
    Ignored,
}
