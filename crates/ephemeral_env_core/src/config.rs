//! Handler configuration, resolved once at the Lambda boundary from a key
//! lookup (normally the process environment) and passed down explicitly.

use std::str::FromStr;

use thiserror::Error;

pub const ENVIRONMENT_PREFIX_VAR: &str = "ENVIRONMENT_PREFIX";
pub const AUTO_DESTROY_HOURS_VAR: &str = "AUTO_DESTROY_HOURS";
pub const AGE_CHECK_FAILURE_POLICY_VAR: &str = "AGE_CHECK_FAILURE_POLICY";
pub const AUDIT_TABLE_NAME_VAR: &str = "AUDIT_TABLE_NAME";
pub const DEFAULT_AUTO_DESTROY_HOURS: u64 = 24;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("ENVIRONMENT_PREFIX not configured")]
    MissingEnvironmentPrefix,

    #[error("AUTO_DESTROY_HOURS must be a non-negative integer, got '{0}'")]
    InvalidAutoDestroyHours(String),

    #[error("AGE_CHECK_FAILURE_POLICY must be 'proceed' or 'skip', got '{0}'")]
    InvalidAgeCheckPolicy(String),

    #[error("AUDIT_TABLE_NAME must be configured")]
    MissingAuditTable,
}

/// What the age check concludes when the proxy table cannot be inspected.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum AgeCheckPolicy {
    /// Treat the environment as old enough and clean it up (fail-open).
    #[default]
    Proceed,
    /// Treat the environment as too young and leave it alone (fail-closed).
    Skip,
}

impl AgeCheckPolicy {
    pub fn assume_old(self) -> bool {
        matches!(self, Self::Proceed)
    }
}

impl FromStr for AgeCheckPolicy {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "proceed" | "fail-open" => Ok(Self::Proceed),
            "skip" | "fail-closed" => Ok(Self::Skip),
            _ => Err(ConfigError::InvalidAgeCheckPolicy(value.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CleanupConfig {
    pub environment_prefix: String,
    pub auto_destroy_hours: u64,
    pub age_check_policy: AgeCheckPolicy,
}

impl CleanupConfig {
    pub fn new(environment_prefix: impl Into<String>, auto_destroy_hours: u64) -> Self {
        Self {
            environment_prefix: environment_prefix.into(),
            auto_destroy_hours,
            age_check_policy: AgeCheckPolicy::default(),
        }
    }

    pub fn with_age_check_policy(mut self, policy: AgeCheckPolicy) -> Self {
        self.age_check_policy = policy;
        self
    }

    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let environment_prefix = lookup(ENVIRONMENT_PREFIX_VAR).unwrap_or_default();
        if environment_prefix.trim().is_empty() {
            return Err(ConfigError::MissingEnvironmentPrefix);
        }

        let auto_destroy_hours = match lookup(AUTO_DESTROY_HOURS_VAR) {
            Some(raw) if !raw.trim().is_empty() => raw
                .trim()
                .parse::<u64>()
                .map_err(|_| ConfigError::InvalidAutoDestroyHours(raw.clone()))?,
            _ => DEFAULT_AUTO_DESTROY_HOURS,
        };

        let age_check_policy = match lookup(AGE_CHECK_FAILURE_POLICY_VAR) {
            Some(raw) if !raw.trim().is_empty() => raw.parse::<AgeCheckPolicy>()?,
            _ => AgeCheckPolicy::default(),
        };

        Ok(Self {
            environment_prefix,
            auto_destroy_hours,
            age_check_policy,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditConfig {
    pub table_name: String,
}

impl AuditConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        match lookup(AUDIT_TABLE_NAME_VAR) {
            Some(table_name) if !table_name.trim().is_empty() => Ok(Self { table_name }),
            _ => Err(ConfigError::MissingAuditTable),
        }
    }
}
