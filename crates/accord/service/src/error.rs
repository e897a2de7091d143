use accord_identity::IdentityError;
use accord_incentive::IncentiveError;
use accord_judge::JudgeError;
use accord_policy::PolicyError;
use accord_quorum::QuorumError;
use accord_types::{MemberId, Role};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Every way a call can be rejected without a sanction.
#[derive(Debug, Error)]
pub enum AccessError {
    #[error("{0} is not the administrator")]
    NotAdmin(MemberId),

    #[error("Resource scope not found: {0}")]
    UnknownScope(String),

    #[error("Resource scope already exists: {0}")]
    ScopeExists(String),

    #[error("scope {scope} needs a primary head owner and a secondary head partner, got {owner_role} and {partner_role}")]
    InvalidScopePair {
        scope: String,
        owner_role: Role,
        partner_role: Role,
    },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("service state lock poisoned")]
    LockPoisoned,

    #[error(transparent)]
    Identity(#[from] IdentityError),

    #[error(transparent)]
    Incentive(#[from] IncentiveError),

    #[error(transparent)]
    Judge(#[from] JudgeError),

    #[error(transparent)]
    Policy(#[from] PolicyError),

    #[error(transparent)]
    Quorum(#[from] QuorumError),

    #[error("configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

/// Flat classification of a rejection, for callers that branch on it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RejectionReason {
    PolicyDenied,
    Blocked,
    QuorumNotMet,
    NoEligibleApprovers,
    NotAuthorized,
    UnknownMember,
    UnknownRequest,
    UnknownScope,
    ScopeInactive,
    RequestClosed,
    InvalidRequest,
    Ledger,
    Configuration,
    LockPoisoned,
}

impl AccessError {
    pub fn reason(&self) -> RejectionReason {
        match self {
            AccessError::NotAdmin(_) => RejectionReason::NotAuthorized,
            AccessError::UnknownScope(_) => RejectionReason::UnknownScope,
            AccessError::ScopeExists(_) | AccessError::InvalidScopePair { .. } => {
                RejectionReason::InvalidRequest
            }
            AccessError::InvalidConfig(_) | AccessError::Config(_) => RejectionReason::Configuration,
            AccessError::LockPoisoned => RejectionReason::LockPoisoned,
            AccessError::Identity(e) => identity_reason(e),
            AccessError::Incentive(_) => RejectionReason::Ledger,
            AccessError::Judge(e) => judge_reason(e),
            AccessError::Policy(e) => policy_reason(e),
            AccessError::Quorum(e) => match e {
                QuorumError::UnknownRequest(_) => RejectionReason::UnknownRequest,
                QuorumError::NotAuthorized { .. } => RejectionReason::NotAuthorized,
                QuorumError::QuorumNotMet { .. } => RejectionReason::QuorumNotMet,
                QuorumError::NoEligibleApprovers { .. } => RejectionReason::NoEligibleApprovers,
                QuorumError::RequestClosed(_) => RejectionReason::RequestClosed,
                QuorumError::NotAHead(_) | QuorumError::CannotRemoveSelf(_) => {
                    RejectionReason::InvalidRequest
                }
                QuorumError::Policy(e) => policy_reason(e),
                QuorumError::Judge(e) => judge_reason(e),
                QuorumError::Identity(e) => identity_reason(e),
            },
        }
    }
}

fn identity_reason(e: &IdentityError) -> RejectionReason {
    match e {
        IdentityError::NotFound(_) => RejectionReason::UnknownMember,
        IdentityError::AlreadyRegistered(_)
        | IdentityError::InvalidRole(_)
        | IdentityError::SameMember(_) => RejectionReason::InvalidRequest,
    }
}

fn judge_reason(e: &JudgeError) -> RejectionReason {
    match e {
        JudgeError::Blocked { .. } | JudgeError::Suspended(_) => RejectionReason::Blocked,
        JudgeError::Identity(e) => identity_reason(e),
        JudgeError::Incentive(_) => RejectionReason::Ledger,
    }
}

fn policy_reason(e: &PolicyError) -> RejectionReason {
    match e {
        PolicyError::Denied { .. } => RejectionReason::PolicyDenied,
        PolicyError::InvalidRole(_) => RejectionReason::InvalidRequest,
        PolicyError::NotAuthorized { .. } => RejectionReason::NotAuthorized,
        PolicyError::ScopeInactive(_) => RejectionReason::ScopeInactive,
        PolicyError::Judge(e) => judge_reason(e),
        PolicyError::Identity(e) => identity_reason(e),
    }
}
