use accord_identity::IdentityError;
use accord_judge::JudgeError;
use accord_types::{Action, MemberId, ResourceId, Role};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PolicyError {
    #[error("policy denies {action} on {resource} for {role}")]
    Denied {
        role: Role,
        resource: ResourceId,
        action: Action,
    },

    #[error("role {0} cannot appear in a policy matrix")]
    InvalidRole(Role),

    #[error("{member} is not authorized to {operation}")]
    NotAuthorized { member: MemberId, operation: String },

    #[error("resource scope {0} is inactive")]
    ScopeInactive(String),

    #[error(transparent)]
    Judge(#[from] JudgeError),

    #[error(transparent)]
    Identity(#[from] IdentityError),
}
