//! Penalty, blocking and reward parameters.

use accord_types::{MisbehaviorKind, Role, TokenAmount};
use serde::{Deserialize, Serialize};

// ── Penalties ───────────────────────────────────────────────────────────

/// Amount charged per role tier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RoleAmounts {
    pub primary_head: TokenAmount,
    pub secondary_head: TokenAmount,
    pub regular_member: TokenAmount,
}

impl RoleAmounts {
    pub fn for_role(&self, role: Role) -> TokenAmount {
        match role {
            Role::PrimaryHead => self.primary_head,
            Role::SecondaryHead => self.secondary_head,
            // Unassignable roles never reach the judge; charge the base tier.
            Role::RegularMember | Role::Undefined | Role::Admin => self.regular_member,
        }
    }
}

impl Default for RoleAmounts {
    fn default() -> Self {
        Self {
            primary_head: 10_000,
            secondary_head: 7_500,
            regular_member: 5_000,
        }
    }
}

/// Fixed debit per misbehavior kind.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PenaltySchedule {
    pub unauthorized_access: RoleAmounts,
    pub too_frequent_access: TokenAmount,
    pub data_tampering: TokenAmount,
    pub denial_of_service: TokenAmount,
}

impl PenaltySchedule {
    pub fn amount(&self, kind: MisbehaviorKind, role: Role) -> TokenAmount {
        match kind {
            MisbehaviorKind::UnauthorizedAccess => self.unauthorized_access.for_role(role),
            MisbehaviorKind::TooFrequentAccess => self.too_frequent_access,
            MisbehaviorKind::DataTampering => self.data_tampering,
            MisbehaviorKind::DenialOfService => self.denial_of_service,
        }
    }
}

impl Default for PenaltySchedule {
    fn default() -> Self {
        Self {
            unauthorized_access: RoleAmounts::default(),
            too_frequent_access: 3_000,
            data_tampering: 8_000,
            denial_of_service: 20_000,
        }
    }
}

// ── Blocking ────────────────────────────────────────────────────────────

/// Lockout length per misbehavior kind, in seconds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BlockingSchedule {
    pub unauthorized_access_secs: u64,
    pub too_frequent_access_secs: u64,
    pub data_tampering_secs: u64,
    pub denial_of_service_secs: u64,
}

impl BlockingSchedule {
    pub fn duration_secs(&self, kind: MisbehaviorKind) -> u64 {
        match kind {
            MisbehaviorKind::UnauthorizedAccess => self.unauthorized_access_secs,
            MisbehaviorKind::TooFrequentAccess => self.too_frequent_access_secs,
            MisbehaviorKind::DataTampering => self.data_tampering_secs,
            MisbehaviorKind::DenialOfService => self.denial_of_service_secs,
        }
    }
}

impl Default for BlockingSchedule {
    fn default() -> Self {
        Self {
            unauthorized_access_secs: 3_600,  // 1 hour
            too_frequent_access_secs: 600,    // 10 minutes
            data_tampering_secs: 10_800,      // 3 hours
            denial_of_service_secs: 172_800,  // 2 days
        }
    }
}

// ── Judge ───────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JudgeConfig {
    pub penalties: PenaltySchedule,
    pub blocking: BlockingSchedule,
    /// Quiet period after the last status change before a reward is due.
    pub benign_threshold_secs: u64,
    pub reward_amount: TokenAmount,
}

impl JudgeConfig {
    pub fn with_benign_threshold(mut self, secs: u64) -> Self {
        self.benign_threshold_secs = secs;
        self
    }

    pub fn with_reward_amount(mut self, amount: TokenAmount) -> Self {
        self.reward_amount = amount;
        self
    }

    pub fn with_penalties(mut self, penalties: PenaltySchedule) -> Self {
        self.penalties = penalties;
        self
    }

    pub fn with_blocking(mut self, blocking: BlockingSchedule) -> Self {
        self.blocking = blocking;
        self
    }
}

impl Default for JudgeConfig {
    fn default() -> Self {
        Self {
            penalties: PenaltySchedule::default(),
            blocking: BlockingSchedule::default(),
            benign_threshold_secs: 86_400, // 1 day
            reward_amount: 5_000,
        }
    }
}
