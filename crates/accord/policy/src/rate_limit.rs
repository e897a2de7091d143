//! Minimum spacing between identical accesses.

use accord_types::{Action, MemberId, ResourceId, Timestamp};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Zero disables the limiter.
    pub min_access_interval_secs: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            min_access_interval_secs: 60,
        }
    }
}

/// Tracks the last allowed access per (member, resource, action).
#[derive(Clone, Debug, Default)]
pub struct RateLimiter {
    config: RateLimitConfig,
    last_access: HashMap<(MemberId, ResourceId, Action), Timestamp>,
}

impl RateLimiter {
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            last_access: HashMap::new(),
        }
    }

    pub fn config(&self) -> &RateLimitConfig {
        &self.config
    }

    pub fn last_access(&self, member: &MemberId, resource: &ResourceId, action: Action) -> Option<Timestamp> {
        self.last_access
            .get(&(member.clone(), resource.clone(), action))
            .copied()
    }

    /// True when a previous allowed access is closer than the minimum interval.
    pub fn is_too_frequent(
        &self,
        member: &MemberId,
        resource: &ResourceId,
        action: Action,
        now: Timestamp,
    ) -> bool {
        if self.config.min_access_interval_secs == 0 {
            return false;
        }
        match self.last_access(member, resource, action) {
            Some(last) => now < accord_types::offset(last, self.config.min_access_interval_secs),
            None => false,
        }
    }

    pub fn record(&mut self, member: &MemberId, resource: &ResourceId, action: Action, now: Timestamp) {
        self.last_access
            .insert((member.clone(), resource.clone(), action), now);
    }
}
