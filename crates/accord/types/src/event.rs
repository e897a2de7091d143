//! Governance events and the append-only journal that records them.

use crate::{
    Action, LocalResourceEntry, MemberId, MemberStatus, ResourceTable, Role, TableEntry, Timestamp,
    TokenAmount,
};
use serde::{Deserialize, Serialize};

/// Observable facts emitted by the authority layer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum GovernanceEvent {
    MemberRegistered {
        member: MemberId,
        role: Role,
    },
    MemberRemoved {
        member: MemberId,
        removed_by: MemberId,
    },
    RolesSwapped {
        first: MemberId,
        second: MemberId,
        swapped_by: MemberId,
    },
    MemberStatusChanged {
        member: MemberId,
        status: MemberStatus,
    },
    /// A blocking window ran out and the member was restored.
    MemberReinstated {
        member: MemberId,
    },
    PolicyUpdated {
        role: Role,
        resource: String,
        action: Action,
        allowed: bool,
    },
    AccessRequestCreated {
        request_id: u64,
        requester: MemberId,
        resource_table: ResourceTable,
        action: Action,
    },
    AccessRequestApproved {
        request_id: u64,
        approver: MemberId,
    },
    AccessGranted {
        executor: MemberId,
        resource: String,
        action: Action,
    },
    MaliciousActivityReported {
        member: MemberId,
        reason: String,
        penalty_amount: TokenAmount,
        blocking_end_time: Timestamp,
    },
    BenignBehaviorRewarded {
        member: MemberId,
        amount: TokenAmount,
    },
    GlobalResourceTableViewed {
        viewer: MemberId,
        resource_table: Vec<TableEntry>,
    },
    LocalResourceTableViewed {
        viewer: MemberId,
        resource_table: Vec<LocalResourceEntry>,
    },
    ScopeOpened {
        resource: String,
        owner: MemberId,
        partner: MemberId,
    },
    ScopeActivated {
        resource: String,
        by: MemberId,
    },
    ScopeDeactivated {
        resource: String,
        by: MemberId,
    },
}

impl GovernanceEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            GovernanceEvent::MemberRegistered { .. } => "MemberRegistered",
            GovernanceEvent::MemberRemoved { .. } => "MemberRemoved",
            GovernanceEvent::RolesSwapped { .. } => "RolesSwapped",
            GovernanceEvent::MemberStatusChanged { .. } => "MemberStatusChanged",
            GovernanceEvent::MemberReinstated { .. } => "MemberReinstated",
            GovernanceEvent::PolicyUpdated { .. } => "PolicyUpdated",
            GovernanceEvent::AccessRequestCreated { .. } => "AccessRequestCreated",
            GovernanceEvent::AccessRequestApproved { .. } => "AccessRequestApproved",
            GovernanceEvent::AccessGranted { .. } => "AccessGranted",
            GovernanceEvent::MaliciousActivityReported { .. } => "MaliciousActivityReported",
            GovernanceEvent::BenignBehaviorRewarded { .. } => "BenignBehaviorRewarded",
            GovernanceEvent::GlobalResourceTableViewed { .. } => "GlobalResourceTableViewed",
            GovernanceEvent::LocalResourceTableViewed { .. } => "LocalResourceTableViewed",
            GovernanceEvent::ScopeOpened { .. } => "ScopeOpened",
            GovernanceEvent::ScopeActivated { .. } => "ScopeActivated",
            GovernanceEvent::ScopeDeactivated { .. } => "ScopeDeactivated",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct JournalEntry {
    pub seq: u64,
    pub timestamp: Timestamp,
    pub event: GovernanceEvent,
}

/// Append-only, totally ordered event log.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct EventJournal {
    entries: Vec<JournalEntry>,
}

impl EventJournal {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event and return its sequence number.
    pub fn record(&mut self, event: GovernanceEvent, at: Timestamp) -> u64 {
        let seq = self.entries.len() as u64;
        self.entries.push(JournalEntry {
            seq,
            timestamp: at,
            event,
        });
        seq
    }

    pub fn entries(&self) -> &[JournalEntry] {
        &self.entries
    }

    /// Entries with `seq >= from`.
    pub fn since(&self, from: u64) -> &[JournalEntry] {
        let start = (from as usize).min(self.entries.len());
        &self.entries[start..]
    }

    pub fn last(&self) -> Option<&JournalEntry> {
        self.entries.last()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn events(&self) -> impl Iterator<Item = &GovernanceEvent> {
        self.entries.iter().map(|e| &e.event)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.entries)
    }
}
