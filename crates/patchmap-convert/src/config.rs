//! Coercion configuration

use serde::{Deserialize, Serialize};

/// Handling of model fields absent from a patch value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MissingFieldPolicy {
    /// Absent fields take their type's default value
    #[default]
    Default,
    /// Absent non-optional fields fail coercion
    Reject,
}

/// Handling of value keys that are not fields of the model
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnknownFieldPolicy {
    /// Unknown keys fail coercion
    #[default]
    Reject,
    /// Unknown keys are dropped
    Ignore,
}

/// Value coercion configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CoercionConfig {
    /// Policy for absent model fields
    pub missing_fields: MissingFieldPolicy,
    /// Policy for keys not declared by the model
    pub unknown_fields: UnknownFieldPolicy,
}

impl CoercionConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With missing-field policy
    #[inline]
    #[must_use]
    pub fn with_missing_fields(mut self, policy: MissingFieldPolicy) -> Self {
        self.missing_fields = policy;
        self
    }

    /// With unknown-field policy
    #[inline]
    #[must_use]
    pub fn with_unknown_fields(mut self, policy: UnknownFieldPolicy) -> Self {
        self.unknown_fields = policy;
        self
    }

    /// Strict configuration: absent fields and unknown keys both fail
    #[inline]
    #[must_use]
    pub fn strict() -> Self {
        Self {
            missing_fields: MissingFieldPolicy::Reject,
            unknown_fields: UnknownFieldPolicy::Reject,
        }
    }

    /// Lenient configuration: defaults for absent fields, unknown keys dropped
    #[inline]
    #[must_use]
    pub fn lenient() -> Self {
        Self {
            missing_fields: MissingFieldPolicy::Default,
            unknown_fields: UnknownFieldPolicy::Ignore,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_missing_fields_and_rejects_unknown_keys() {
        let config = CoercionConfig::new();
        assert_eq!(config.missing_fields, MissingFieldPolicy::Default);
        assert_eq!(config.unknown_fields, UnknownFieldPolicy::Reject);
    }

    #[test]
    fn builders_chain() {
        let config = CoercionConfig::new().with_unknown_fields(UnknownFieldPolicy::Ignore);
        assert_eq!(config, CoercionConfig::lenient());
        let config = CoercionConfig::new().with_missing_fields(MissingFieldPolicy::Reject);
        assert_eq!(config, CoercionConfig::strict());
    }

    #[test]
    fn policies_parse_snake_case() {
        let config: CoercionConfig = toml::from_str("missing_fields = \"reject\"").unwrap();
        assert_eq!(config.missing_fields, MissingFieldPolicy::Reject);
        assert_eq!(config.unknown_fields, UnknownFieldPolicy::Reject);

        let config: CoercionConfig = toml::from_str("unknown_fields = \"ignore\"").unwrap();
        assert_eq!(config.missing_fields, MissingFieldPolicy::Default);
        assert_eq!(config.unknown_fields, UnknownFieldPolicy::Ignore);
    }
}
