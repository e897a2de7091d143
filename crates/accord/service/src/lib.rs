//! Accord Service - access control and reputation for hierarchical groups
//!
//! [`AccessControlService`] wires the role ledger, the incentive ledger, the
//! misbehavior judge, the per-pair resource scopes and the quorum workflow
//! together behind one API. Calls that violate policy either fail with an
//! [`AccessError`] or succeed as [`Outcome::Penalized`] with the sanction
//! that was applied.
//!
//! ```no_run
//! use accord_service::{AccessControlService, telemetry, AccordConfig};
//! use accord_types::{Action, Decision, MemberId, ResourceTable, Role};
//!
//! let config = AccordConfig::load(Some("accord.toml")).expect("config");
//! telemetry::init_tracing(&config.logging).ok();
//!
//! let admin = MemberId::new("admin");
//! let mut service = AccessControlService::with_defaults(admin.clone());
//! service
//!     .assign_role(&admin, MemberId::new("alice"), "Alice", "hospital", Role::PrimaryHead)
//!     .expect("register");
//! service
//!     .set_table_policy(&admin, Role::PrimaryHead, ResourceTable::Global, Action::View, Decision::Allow)
//!     .expect("policy");
//! ```

#![deny(unsafe_code)]

pub mod config;
pub mod error;
pub mod service;
pub mod shared;
pub mod telemetry;

pub use config::{AccordConfig, EnforcementConfig, IncentiveConfig, LoggingConfig};
pub use error::{AccessError, RejectionReason};
pub use service::AccessControlService;
pub use shared::SharedAccessControl;

pub use accord_judge::{BenignOutcome, MisbehaviorReport, Outcome};
pub use accord_policy::{AccessReceipt, DenialHandling};
pub use accord_quorum::{AccessRequest, ApprovalOutcome, Execution, RequestState};
