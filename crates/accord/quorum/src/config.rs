//! Quorum sizing.

use accord_types::{Action, ResourceTable};
use serde::{Deserialize, Serialize};

/// Approvals required per action on one table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableQuorum {
    pub view: usize,
    pub edit: usize,
    pub delete: usize,
}

impl TableQuorum {
    pub fn for_action(&self, action: Action) -> usize {
        match action {
            Action::View => self.view,
            Action::Edit => self.edit,
            Action::Delete => self.delete,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QuorumConfig {
    pub global: TableQuorum,
    pub local: TableQuorum,
}

impl QuorumConfig {
    pub fn configured(&self, table: ResourceTable, action: Action) -> usize {
        match table {
            ResourceTable::Global => self.global.for_action(action),
            ResourceTable::Local => self.local.for_action(action),
        }
    }

    /// Approvals needed given the number of primary heads in the group.
    ///
    /// A primary-head requester counts toward this total. Capped by the
    /// population so a small group is never stuck, and never below one.
    pub fn required(&self, table: ResourceTable, action: Action, primary_heads: usize) -> usize {
        self.configured(table, action).min(primary_heads).max(1)
    }

    /// Every configured size must be at least one.
    pub fn is_valid(&self) -> bool {
        [self.global, self.local].iter().all(|t| {
            [Action::View, Action::Edit, Action::Delete]
                .iter()
                .all(|a| t.for_action(*a) > 0)
        })
    }
}

impl Default for QuorumConfig {
    fn default() -> Self {
        Self {
            global: TableQuorum {
                view: 2,
                edit: 2,
                delete: 3,
            },
            local: TableQuorum {
                view: 1,
                edit: 1,
                delete: 1,
            },
        }
    }
}
