//! Registry configuration

use serde::{Deserialize, Serialize};

/// Default bound on model nesting depth
pub const DEFAULT_MAX_DEPTH: usize = 32;

/// Schema registry configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistryConfig {
    /// Maximum nesting depth of fields and array elements below a root model
    pub max_depth: usize,
    /// Build schemas on first lookup instead of requiring prior registration
    pub lazy_registration: bool,
}

impl RegistryConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With maximum nesting depth
    #[inline]
    #[must_use]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// With lazy registration enabled or disabled
    #[inline]
    #[must_use]
    pub fn with_lazy_registration(mut self, lazy: bool) -> Self {
        self.lazy_registration = lazy;
        self
    }
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            max_depth: DEFAULT_MAX_DEPTH,
            lazy_registration: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = RegistryConfig::new();
        assert_eq!(config.max_depth, DEFAULT_MAX_DEPTH);
        assert!(config.lazy_registration);
    }

    #[test]
    fn builders_chain() {
        let config = RegistryConfig::new()
            .with_max_depth(4)
            .with_lazy_registration(false);
        assert_eq!(config.max_depth, 4);
        assert!(!config.lazy_registration);
    }

    #[test]
    fn partial_toml_falls_back_to_defaults() {
        let config: RegistryConfig = toml::from_str("max_depth = 8").unwrap();
        assert_eq!(config.max_depth, 8);
        assert!(config.lazy_registration);
    }
}
