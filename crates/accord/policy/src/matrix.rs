//! Role x resource x action policy matrix.

use crate::error::PolicyError;
use accord_types::{Action, Decision, ResourceId, Role};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::debug;

/// Fail-closed policy matrix. A missing entry evaluates to `Deny`.
#[derive(Clone, Debug, Default)]
pub struct PolicyMatrix {
    entries: HashMap<(Role, ResourceId, Action), Decision>,
}

/// A single matrix row, as exposed in snapshots.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyEntry {
    pub role: Role,
    pub resource: ResourceId,
    pub action: Action,
    pub decision: Decision,
}

impl PolicyMatrix {
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite an entry. Returns the previous decision, if any.
    pub fn set(
        &mut self,
        role: Role,
        resource: ResourceId,
        action: Action,
        decision: Decision,
    ) -> Result<Option<Decision>, PolicyError> {
        if !role.is_assignable() {
            return Err(PolicyError::InvalidRole(role));
        }
        Ok(self.entries.insert((role, resource, action), decision))
    }

    pub fn evaluate(&self, role: Role, resource: &ResourceId, action: Action) -> Decision {
        let decision = self
            .entries
            .get(&(role, resource.clone(), action))
            .copied()
            .unwrap_or(Decision::Deny);
        debug!(role = %role, resource = %resource, action = %action, decision = %decision, "Policy evaluated");
        decision
    }

    pub fn ensure_allowed(&self, role: Role, resource: &ResourceId, action: Action) -> Result<(), PolicyError> {
        match self.evaluate(role, resource, action) {
            Decision::Allow => Ok(()),
            Decision::Deny => Err(PolicyError::Denied {
                role,
                resource: resource.clone(),
                action,
            }),
        }
    }

    /// Sorted snapshot of every explicit entry.
    pub fn entries(&self) -> Vec<PolicyEntry> {
        let mut entries: Vec<PolicyEntry> = self
            .entries
            .iter()
            .map(|((role, resource, action), decision)| PolicyEntry {
                role: *role,
                resource: resource.clone(),
                action: *action,
                decision: *decision,
            })
            .collect();
        entries.sort_by(|a, b| {
            (a.role, &a.resource, a.action).cmp(&(b.role, &b.resource, b.action))
        });
        entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
