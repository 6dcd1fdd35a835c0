//! Error types for schema construction
//!
//! Every variant signals a setup defect, raised once before any patch
//! operation is looked at.

/// Fatal configuration error
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigurationError {
    /// Model has no cached schema and lazy registration is disabled
    #[error("Type {model} has no registered mappings")]
    Unregistered {
        /// Unregistered model name
        model: String,
    },

    /// Source and destination schemas share no entry
    #[error("Model {source_model} does not have any field, which exist in {destination_model}.")]
    NoCommonFields {
        /// Model the patch was written against
        source_model: String,
        /// Model the store holds
        destination_model: String,
    },

    /// `String` registered as a root model
    #[error("String mapping is not allowed")]
    StringRoot,

    /// Leaf type registered as a root model
    #[error("type {model} has no addressable sub-paths")]
    UnaddressableRoot {
        /// Leaf type name
        model: String,
    },

    /// Model graph re-enters a model already on the traversal path
    #[error("model {model} is cyclic: re-entered at {path}")]
    CyclicModel {
        /// Re-entered model
        model: String,
        /// Path prefix at which it was re-entered
        path: String,
    },

    /// Nesting exceeds the configured depth bound
    #[error("model nesting exceeds depth {max_depth} at {path}")]
    DepthExceeded {
        /// Configured bound
        max_depth: usize,
        /// Path prefix at which the bound was hit
        path: String,
    },

    /// Generated path pattern failed to compile
    #[error("invalid path pattern '{pattern}': {message}")]
    InvalidPattern {
        /// Pattern text
        pattern: String,
        /// Regex compiler message
        message: String,
    },
}

impl ConfigurationError {
    /// Create no-common-fields error for a model pair
    pub fn no_common_fields(
        source_model: impl Into<String>,
        destination_model: impl Into<String>,
    ) -> Self {
        Self::NoCommonFields {
            source_model: source_model.into(),
            destination_model: destination_model.into(),
        }
    }
}

/// Result type alias for schema operations
pub type SchemaResult<T> = Result<T, ConfigurationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_common_fields_names_both_models() {
        let err = ConfigurationError::no_common_fields("Dog", "Fruit");
        assert_eq!(
            err.to_string(),
            "Model Dog does not have any field, which exist in Fruit."
        );
    }

    #[test]
    fn string_root_display() {
        assert_eq!(
            ConfigurationError::StringRoot.to_string(),
            "String mapping is not allowed"
        );
    }
}
