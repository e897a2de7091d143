//! Accord Quorum - privileged table operations
//!
//! Requests to view, edit or delete the shared resource tables go through a
//! create/approve/execute lifecycle. The table policy matrix gates creation;
//! a configured number of distinct primary-head approvals gates execution.

#![deny(unsafe_code)]

pub mod config;
pub mod error;
pub mod request;
pub mod table;

pub use config::{QuorumConfig, TableQuorum};
pub use error::QuorumError;
pub use request::{AccessRequest, ApprovalOutcome, RequestState};
pub use table::{Execution, LocalResourceTable, TableAccessControl};
