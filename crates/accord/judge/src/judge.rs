//! The misbehavior judge.
//!
//! All penalty and reward side effects go through here. A call either applies
//! every effect (balance, status, window, event) or none of them.

use crate::config::JudgeConfig;
use crate::error::JudgeError;
use accord_identity::{Member, RoleLedger};
use accord_incentive::IncentiveLedger;
use accord_types::{
    EventJournal, GovernanceEvent, MemberId, MisbehaviorKind, ReportId, Timestamp, TokenAmount,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

/// Mutable state a single enforcement step may touch, plus the instant it
/// happens at.
pub struct Enforcement<'a> {
    pub roles: &'a mut RoleLedger,
    pub incentives: &'a mut dyn IncentiveLedger,
    pub journal: &'a mut EventJournal,
    pub now: Timestamp,
}

impl<'a> Enforcement<'a> {
    pub fn new(
        roles: &'a mut RoleLedger,
        incentives: &'a mut dyn IncentiveLedger,
        journal: &'a mut EventJournal,
        now: Timestamp,
    ) -> Self {
        Self {
            roles,
            incentives,
            journal,
            now,
        }
    }

    pub fn emit(&mut self, event: GovernanceEvent) -> u64 {
        self.journal.record(event, self.now)
    }
}

/// Result of a sanctioned misbehavior.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MisbehaviorReport {
    pub report_id: ReportId,
    pub member: MemberId,
    pub kind: MisbehaviorKind,
    pub reason: String,
    /// Scheduled penalty.
    pub penalty_amount: TokenAmount,
    /// What the balance could actually cover.
    pub debited: TokenAmount,
    pub blocking_end_time: Timestamp,
}

/// Result of a call that may be converted into a sanction.
///
/// `Penalized` is a successful call: the violation was reported even though
/// the requested business effect did not happen.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Outcome<T> {
    Completed(T),
    Penalized(MisbehaviorReport),
}

impl<T> Outcome<T> {
    pub fn is_penalized(&self) -> bool {
        matches!(self, Outcome::Penalized(_))
    }

    pub fn completed(self) -> Option<T> {
        match self {
            Outcome::Completed(value) => Some(value),
            Outcome::Penalized(_) => None,
        }
    }

    pub fn penalty(&self) -> Option<&MisbehaviorReport> {
        match self {
            Outcome::Completed(_) => None,
            Outcome::Penalized(report) => Some(report),
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Outcome<U> {
        match self {
            Outcome::Completed(value) => Outcome::Completed(f(value)),
            Outcome::Penalized(report) => Outcome::Penalized(report),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum BenignOutcome {
    Rewarded { amount: TokenAmount, balance: TokenAmount },
    /// `eligible_at` is `None` while the member is suspended.
    NotEligible { eligible_at: Option<Timestamp> },
}

impl BenignOutcome {
    pub fn is_rewarded(&self) -> bool {
        matches!(self, BenignOutcome::Rewarded { .. })
    }
}

#[derive(Clone, Debug, Default)]
pub struct MisbehaviorJudge {
    config: JudgeConfig,
}

impl MisbehaviorJudge {
    pub fn new(config: JudgeConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &JudgeConfig {
        &self.config
    }

    /// Penalize `member` for `kind`: debit, mark malicious, open a blocking
    /// window and emit `MaliciousActivityReported`.
    pub fn report_misbehavior(
        &self,
        cx: &mut Enforcement<'_>,
        member: &MemberId,
        kind: MisbehaviorKind,
    ) -> Result<MisbehaviorReport, JudgeError> {
        let role = cx.roles.role_of(member)?;
        let penalty_amount = self.config.penalties.amount(kind, role);
        let scheduled_end = accord_types::offset(cx.now, self.config.blocking.duration_secs(kind));

        let debit = cx.incentives.debit(member, penalty_amount)?;
        if let Err(e) = cx.roles.record_misbehavior(member, cx.now, scheduled_end) {
            if debit.applied > 0 {
                if let Err(refund) = cx.incentives.credit(member, debit.applied) {
                    error!(member = %member, error = %refund, "Failed to refund penalty after ledger error");
                }
            }
            return Err(e.into());
        }

        let blocking_end_time = cx
            .roles
            .member(member)?
            .blocking_end_time
            .unwrap_or(scheduled_end);

        let report = MisbehaviorReport {
            report_id: ReportId::generate(),
            member: member.clone(),
            kind,
            reason: kind.reason().to_string(),
            penalty_amount,
            debited: debit.applied,
            blocking_end_time,
        };

        cx.emit(GovernanceEvent::MaliciousActivityReported {
            member: member.clone(),
            reason: report.reason.clone(),
            penalty_amount,
            blocking_end_time,
        });

        warn!(
            report_id = %report.report_id,
            member = %member,
            reason = %report.reason,
            penalty = penalty_amount,
            debited = debit.applied,
            until = %blocking_end_time,
            "Malicious activity reported"
        );

        Ok(report)
    }

    /// When the member becomes reward-eligible, if ever.
    pub fn eligible_at(&self, member: &Member) -> Option<Timestamp> {
        if member.is_suspended() {
            return None;
        }
        let base = match member.last_reward_at {
            Some(rewarded) if rewarded > member.last_status_update => rewarded,
            _ => member.last_status_update,
        };
        let after_threshold = accord_types::offset(base, self.config.benign_threshold_secs);
        Some(match member.blocking_end_time {
            Some(end) if end > after_threshold => end,
            _ => after_threshold,
        })
    }

    /// Credit the benign reward if the quiet period has elapsed.
    ///
    /// Does not touch status; a malicious member stays malicious until the
    /// next blocking check lifts the expired window.
    pub fn report_benign(
        &self,
        cx: &mut Enforcement<'_>,
        member: &MemberId,
    ) -> Result<BenignOutcome, JudgeError> {
        let record = cx.roles.member(member)?;
        let eligible_at = self.eligible_at(record);

        match eligible_at {
            Some(at) if cx.now >= at => {}
            _ => {
                debug!(member = %member, eligible_at = ?eligible_at, "Benign reward not yet due");
                return Ok(BenignOutcome::NotEligible { eligible_at });
            }
        }

        let amount = self.config.reward_amount;
        let balance = cx.incentives.credit(member, amount)?;
        cx.roles.record_reward(member, cx.now)?;
        cx.emit(GovernanceEvent::BenignBehaviorRewarded {
            member: member.clone(),
            amount,
        });

        info!(member = %member, amount, balance, "Benign behavior rewarded");
        Ok(BenignOutcome::Rewarded { amount, balance })
    }

    /// Pay a due reward after a successful action. Never fails the action.
    pub fn reward_if_eligible(&self, cx: &mut Enforcement<'_>, member: &MemberId) -> Option<TokenAmount> {
        match self.report_benign(cx, member) {
            Ok(BenignOutcome::Rewarded { amount, .. }) => Some(amount),
            Ok(BenignOutcome::NotEligible { .. }) => None,
            Err(e) => {
                warn!(member = %member, error = %e, "Benign reward skipped");
                None
            }
        }
    }

    /// Reject callers inside a blocking window or under suspension.
    ///
    /// An expired window is lifted here and `MemberReinstated` is emitted.
    pub fn check_blocking(&self, cx: &mut Enforcement<'_>, member: &MemberId) -> Result<(), JudgeError> {
        let record = cx.roles.member(member)?;
        if record.is_suspended() {
            return Err(JudgeError::Suspended(member.clone()));
        }
        if let Some(end) = record.blocking_end_time {
            if cx.now < end {
                debug!(member = %member, until = %end, "Call rejected inside blocking window");
                return Err(JudgeError::Blocked {
                    member: member.clone(),
                    until: end,
                });
            }
        }

        if cx.roles.lift_expired_block(member, cx.now)? {
            cx.emit(GovernanceEvent::MemberReinstated {
                member: member.clone(),
            });
        }
        Ok(())
    }
}
