use accord_identity::IdentityError;
use accord_judge::JudgeError;
use accord_policy::PolicyError;
use accord_types::{Action, MemberId, ResourceTable};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum QuorumError {
    #[error("Access request not found: {0}")]
    UnknownRequest(u64),

    #[error("{member} is not authorized to {operation}")]
    NotAuthorized { member: MemberId, operation: String },

    #[error("no approved request from {member} for {action} on {table}")]
    QuorumNotMet {
        member: MemberId,
        table: ResourceTable,
        action: Action,
    },

    #[error("no primary head can approve {action} on {table}")]
    NoEligibleApprovers { table: ResourceTable, action: Action },

    #[error("Access request {0} has already been executed")]
    RequestClosed(u64),

    #[error("{0} is not a group head")]
    NotAHead(MemberId),

    #[error("{0} cannot remove themselves from the table")]
    CannotRemoveSelf(MemberId),

    #[error(transparent)]
    Policy(#[from] PolicyError),

    #[error(transparent)]
    Judge(#[from] JudgeError),

    #[error(transparent)]
    Identity(#[from] IdentityError),
}
