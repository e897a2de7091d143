//! Accord Policy - resource policy engine
//!
//! Fail-closed `(role, resource, action)` matrices, a per-triple rate limiter
//! and per-pair resource scopes whose activation is owner-only. Violations
//! are handed to the judge rather than executed.

#![deny(unsafe_code)]

pub mod error;
pub mod matrix;
pub mod rate_limit;
pub mod scope;

pub use error::PolicyError;
pub use matrix::{PolicyEntry, PolicyMatrix};
pub use rate_limit::{RateLimitConfig, RateLimiter};
pub use scope::{AccessReceipt, DenialHandling, ResourceScope};
