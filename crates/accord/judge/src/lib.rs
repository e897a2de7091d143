//! Accord Judge - penalties, rewards and blocking windows
//!
//! The judge is the only writer of member status. Violations detected by the
//! policy engine or the quorum workflow are routed here; the judge debits the
//! incentive ledger, marks the member malicious and opens a blocking window.
//! Quiet members are paid a reward once the benign threshold has elapsed.

#![deny(unsafe_code)]

pub mod config;
pub mod error;
pub mod judge;

pub use config::{BlockingSchedule, JudgeConfig, PenaltySchedule, RoleAmounts};
pub use error::JudgeError;
pub use judge::{BenignOutcome, Enforcement, MisbehaviorJudge, MisbehaviorReport, Outcome};
