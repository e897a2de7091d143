//! Configuration for the access control service

use accord_judge::JudgeConfig;
use accord_policy::{DenialHandling, RateLimitConfig};
use accord_quorum::QuorumConfig;
use accord_types::{Role, TokenAmount};
use serde::{Deserialize, Serialize};

use crate::error::AccessError;

/// Top-level service configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccordConfig {
    /// Penalties, blocking windows and rewards
    #[serde(default)]
    pub judge: JudgeConfig,

    /// Approvals required per table and action
    #[serde(default)]
    pub quorum: QuorumConfig,

    #[serde(default)]
    pub rate_limit: RateLimitConfig,

    #[serde(default)]
    pub enforcement: EnforcementConfig,

    #[serde(default)]
    pub incentives: IncentiveConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// How scopes treat policy denials.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnforcementConfig {
    #[serde(default)]
    pub scope_denial: DenialHandling,
}

/// Balances minted on registration, per role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncentiveConfig {
    #[serde(default = "default_primary_balance")]
    pub primary_head_balance: TokenAmount,

    #[serde(default = "default_secondary_balance")]
    pub secondary_head_balance: TokenAmount,

    #[serde(default = "default_regular_balance")]
    pub regular_member_balance: TokenAmount,
}

impl IncentiveConfig {
    pub fn initial_balance(&self, role: Role) -> TokenAmount {
        match role {
            Role::PrimaryHead => self.primary_head_balance,
            Role::SecondaryHead => self.secondary_head_balance,
            Role::RegularMember => self.regular_member_balance,
            Role::Undefined | Role::Admin => 0,
        }
    }
}

impl Default for IncentiveConfig {
    fn default() -> Self {
        Self {
            primary_head_balance: default_primary_balance(),
            secondary_head_balance: default_secondary_balance(),
            regular_member_balance: default_regular_balance(),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Filter directive used when `RUST_LOG` is unset
    #[serde(default = "default_log_level")]
    pub level: String,

    /// JSON format
    #[serde(default)]
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

fn default_primary_balance() -> TokenAmount {
    1_000_000
}

fn default_secondary_balance() -> TokenAmount {
    500_000
}

fn default_regular_balance() -> TokenAmount {
    100_000
}

fn default_log_level() -> String {
    "info".to_string()
}

impl AccordConfig {
    /// Load configuration from defaults, an optional file and `ACCORD__`
    /// environment variables (`ACCORD__JUDGE__REWARD_AMOUNT=7000`).
    pub fn load(path: Option<&str>) -> Result<Self, AccessError> {
        let mut builder = config::Config::builder();

        builder = builder.add_source(config::Config::try_from(&AccordConfig::default())?);

        if let Some(path) = path {
            builder = builder.add_source(config::File::with_name(path).required(false));
        }

        builder = builder.add_source(
            config::Environment::with_prefix("ACCORD")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        );

        let loaded: AccordConfig = builder.build()?.try_deserialize()?;
        loaded.validate()?;
        Ok(loaded)
    }

    pub fn validate(&self) -> Result<(), AccessError> {
        if !self.quorum.is_valid() {
            return Err(AccessError::InvalidConfig(
                "quorum sizes must be at least 1".to_string(),
            ));
        }
        if self.judge.reward_amount == 0 {
            return Err(AccessError::InvalidConfig(
                "reward amount must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = AccordConfig::default();
        assert_eq!(config.judge.benign_threshold_secs, 86_400);
        assert_eq!(config.judge.reward_amount, 5_000);
        assert_eq!(config.rate_limit.min_access_interval_secs, 60);
        assert_eq!(config.enforcement.scope_denial, DenialHandling::Penalize);
        assert_eq!(config.incentives.initial_balance(Role::RegularMember), 100_000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_without_file() {
        let config = AccordConfig::load(None).unwrap();
        assert_eq!(config.quorum, QuorumConfig::default());
    }

    #[test]
    fn test_load_from_file() {
        let path = std::env::temp_dir().join(format!("accord-config-{}.toml", std::process::id()));
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            "[judge]\nreward_amount = 7000\n\n[quorum.global]\nview = 1\nedit = 3\ndelete = 4\n\n[enforcement]\nscope_denial = \"reject\""
        )
        .unwrap();

        let config = AccordConfig::load(path.to_str()).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(config.judge.reward_amount, 7_000);
        assert_eq!(config.judge.benign_threshold_secs, 86_400);
        assert_eq!(config.quorum.global.delete, 4);
        assert_eq!(config.quorum.local.view, 1);
        assert_eq!(config.enforcement.scope_denial, DenialHandling::Reject);
    }

    #[test]
    fn test_zero_quorum_rejected() {
        let mut config = AccordConfig::default();
        config.quorum.global.edit = 0;
        assert!(matches!(
            config.validate(),
            Err(AccessError::InvalidConfig(_))
        ));
    }
}
