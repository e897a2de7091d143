use accord_identity::IdentityError;
use accord_incentive::IncentiveError;
use accord_types::{MemberId, Timestamp};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum JudgeError {
    #[error("member {member} is blocked until {until}")]
    Blocked { member: MemberId, until: Timestamp },

    #[error("member {0} is suspended")]
    Suspended(MemberId),

    #[error(transparent)]
    Identity(#[from] IdentityError),

    #[error(transparent)]
    Incentive(#[from] IncentiveError),
}

impl JudgeError {
    /// True for both timed windows and administrative suspension.
    pub fn is_blocked(&self) -> bool {
        matches!(self, JudgeError::Blocked { .. } | JudgeError::Suspended(_))
    }
}
