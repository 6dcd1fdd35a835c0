//! Path schema derivation
//!
//! Provides [`PathSchemaBuilder`], which walks a [`TypeDescriptor`] graph
//! depth-first and emits one [`SchemaEntry`] per addressable path.
//!
//! # Rules
//! - A leaf field at path `P` yields `(P, false, type)`
//! - A model field yields its own entry, then the entries of its fields
//! - An array field yields its own entry, then recurses into the element type
//!   at `P/<index>`, where the element entry is flagged as an array element
//! - `String` is never expanded

use crate::config::RegistryConfig;
use crate::descriptor::TypeDescriptor;
use crate::entry::{PathPattern, PathSchema, SchemaEntry, INDEX_SEGMENT};
use crate::error::{ConfigurationError, SchemaResult};
use std::any::TypeId;

/// Builds path schemas from type descriptors
#[derive(Debug, Clone, Copy)]
pub struct PathSchemaBuilder {
    max_depth: usize,
}

/// Traversal state for one build
struct Walk {
    entries: Vec<SchemaEntry>,
    /// Models on the current traversal path
    stack: Vec<TypeId>,
}

impl PathSchemaBuilder {
    /// Create builder from registry configuration
    #[inline]
    #[must_use]
    pub fn new(config: &RegistryConfig) -> Self {
        Self {
            max_depth: config.max_depth,
        }
    }

    /// Derive the path schema of `root`
    ///
    /// # Errors
    /// - [`ConfigurationError::StringRoot`] if `root` is `String`
    /// - [`ConfigurationError::UnaddressableRoot`] for any other leaf root
    /// - [`ConfigurationError::CyclicModel`] if the graph cycles
    /// - [`ConfigurationError::DepthExceeded`] past the depth bound
    pub fn build(&self, root: &TypeDescriptor) -> SchemaResult<PathSchema> {
        let mut walk = Walk {
            entries: Vec::new(),
            stack: Vec::new(),
        };

        match root.peel_optional() {
            TypeDescriptor::String => return Err(ConfigurationError::StringRoot),
            TypeDescriptor::Model(_) | TypeDescriptor::Array(_) => {
                self.expand(&mut walk, "", root, 0)?;
            }
            leaf => {
                return Err(ConfigurationError::UnaddressableRoot {
                    model: leaf.to_string(),
                })
            }
        }

        let schema = PathSchema::new(root.to_string(), walk.entries);
        tracing::debug!("Built path schema for {}: {} entries", schema.model(), schema.len());
        Ok(schema)
    }

    /// Emit the entry at `path` (unless root) and everything below it
    fn visit(
        &self,
        walk: &mut Walk,
        path: &str,
        is_array_element: bool,
        ty: &TypeDescriptor,
        depth: usize,
    ) -> SchemaResult<()> {
        if depth > self.max_depth {
            return Err(ConfigurationError::DepthExceeded {
                max_depth: self.max_depth,
                path: path.to_string(),
            });
        }

        let pattern = PathPattern::compile(path).map_err(|e| ConfigurationError::InvalidPattern {
            pattern: path.to_string(),
            message: e.to_string(),
        })?;
        walk.entries
            .push(SchemaEntry::new(pattern, is_array_element, ty.clone()));

        self.expand(walk, path, ty, depth)
    }

    /// Recurse into the children of `ty` rooted at `path`
    fn expand(
        &self,
        walk: &mut Walk,
        path: &str,
        ty: &TypeDescriptor,
        depth: usize,
    ) -> SchemaResult<()> {
        match ty.peel_optional() {
            TypeDescriptor::Array(element) => {
                let element_path = format!("{path}/{INDEX_SEGMENT}");
                self.visit(walk, &element_path, true, element, depth + 1)
            }
            TypeDescriptor::Model(model) => {
                if walk.stack.contains(&model.type_id()) {
                    return Err(ConfigurationError::CyclicModel {
                        model: model.name().to_string(),
                        path: if path.is_empty() { "/".to_string() } else { path.to_string() },
                    });
                }

                walk.stack.push(model.type_id());
                for field in model.fields() {
                    let field_path = format!("{path}/{}", pattern_segment(field.name()));
                    self.visit(walk, &field_path, false, field.ty(), depth + 1)?;
                }
                walk.stack.pop();
                Ok(())
            }
            _ => Ok(()),
        }
    }
}

impl Default for PathSchemaBuilder {
    fn default() -> Self {
        Self::new(&RegistryConfig::default())
    }
}

/// Field name as it appears in a JSON Pointer, escaped for regex embedding
fn pattern_segment(name: &str) -> String {
    regex::escape(&name.replace('~', "~0").replace('/', "~1"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{Describe, Field};

    struct Leg;
    struct Dog;
    struct User;
    struct Node;
    struct Outer;
    struct Inner;

    impl Describe for Leg {
        fn describe() -> TypeDescriptor {
            TypeDescriptor::model::<Self>("Leg", || vec![Field::of::<bool>("IsOk")])
        }
    }

    impl Describe for Dog {
        fn describe() -> TypeDescriptor {
            TypeDescriptor::model::<Self>("Dog", || {
                vec![
                    Field::of::<Option<String>>("Name"),
                    Field::of::<i32>("Age"),
                    Field::of::<Option<Vec<Leg>>>("Legs"),
                ]
            })
        }
    }

    impl Describe for User {
        fn describe() -> TypeDescriptor {
            TypeDescriptor::model::<Self>("User", || {
                vec![
                    Field::of::<Option<String>>("Name"),
                    Field::of::<f64>("Rating"),
                    Field::of::<Vec<Dog>>("Dogs"),
                ]
            })
        }
    }

    impl Describe for Node {
        fn describe() -> TypeDescriptor {
            TypeDescriptor::model::<Self>("Node", || {
                vec![Field::of::<i32>("Value"), Field::of::<Vec<Node>>("Children")]
            })
        }
    }

    impl Describe for Inner {
        fn describe() -> TypeDescriptor {
            TypeDescriptor::model::<Self>("Inner", || vec![Field::of::<Option<Outer>>("Back")])
        }
    }

    impl Describe for Outer {
        fn describe() -> TypeDescriptor {
            TypeDescriptor::model::<Self>("Outer", || vec![Field::of::<Inner>("Inner")])
        }
    }

    fn patterns(schema: &PathSchema) -> Vec<&str> {
        schema.iter().map(|e| e.pattern().as_str()).collect()
    }

    #[test]
    fn depth_first_discovery_order() {
        let schema = PathSchemaBuilder::default().build(&User::describe()).unwrap();
        assert_eq!(
            patterns(&schema),
            vec![
                "^/Name$",
                "^/Rating$",
                "^/Dogs$",
                "^/Dogs/[0-9]+$",
                "^/Dogs/[0-9]+/Name$",
                "^/Dogs/[0-9]+/Age$",
                "^/Dogs/[0-9]+/Legs$",
                "^/Dogs/[0-9]+/Legs/[0-9]+$",
                "^/Dogs/[0-9]+/Legs/[0-9]+/IsOk$",
            ]
        );
        assert_eq!(schema.model(), "User");
    }

    #[test]
    fn only_index_entries_are_array_elements() {
        let schema = PathSchemaBuilder::default().build(&User::describe()).unwrap();
        assert!(!schema.find("/Dogs").unwrap().is_array_element());
        assert!(schema.find("/Dogs/1").unwrap().is_array_element());
        assert!(!schema.find("/Dogs/1/Name").unwrap().is_array_element());
        assert!(schema.find("/Dogs/1/Legs/0").unwrap().is_array_element());
        assert_eq!(
            schema.find("/Dogs/1").unwrap().value_type(),
            &Dog::describe()
        );
    }

    #[test]
    fn strings_are_not_expanded() {
        let schema = PathSchemaBuilder::default().build(&User::describe()).unwrap();
        assert!(schema.find("/Name").is_some());
        assert!(schema.find("/Name/1").is_none());
    }

    #[test]
    fn string_root_rejected() {
        let result = PathSchemaBuilder::default().build(&String::describe());
        assert_eq!(result, Err(ConfigurationError::StringRoot));
        let result = PathSchemaBuilder::default().build(&Option::<String>::describe());
        assert_eq!(result, Err(ConfigurationError::StringRoot));
    }

    #[test]
    fn leaf_root_rejected() {
        let result = PathSchemaBuilder::default().build(&i32::describe());
        assert!(matches!(result, Err(ConfigurationError::UnaddressableRoot { .. })));
    }

    #[test]
    fn array_root_is_addressable() {
        let schema = PathSchemaBuilder::default().build(&Vec::<Leg>::describe()).unwrap();
        assert_eq!(patterns(&schema), vec!["^/[0-9]+$", "^/[0-9]+/IsOk$"]);
    }

    #[test]
    fn self_reference_through_array_is_cyclic() {
        let result = PathSchemaBuilder::default().build(&Node::describe());
        assert_eq!(
            result,
            Err(ConfigurationError::CyclicModel {
                model: "Node".to_string(),
                path: "/Children/[0-9]+".to_string(),
            })
        );
    }

    #[test]
    fn mutual_reference_is_cyclic() {
        let result = PathSchemaBuilder::default().build(&Outer::describe());
        assert!(matches!(
            result,
            Err(ConfigurationError::CyclicModel { ref model, .. }) if model == "Outer"
        ));
    }

    #[test]
    fn sibling_reuse_is_not_a_cycle() {
        struct Pair;
        impl Describe for Pair {
            fn describe() -> TypeDescriptor {
                TypeDescriptor::model::<Self>("Pair", || {
                    vec![Field::of::<Leg>("Left"), Field::of::<Leg>("Right")]
                })
            }
        }
        let schema = PathSchemaBuilder::default().build(&Pair::describe()).unwrap();
        assert_eq!(schema.len(), 4);
    }

    #[test]
    fn depth_bound_enforced() {
        let builder = PathSchemaBuilder::new(&RegistryConfig::new().with_max_depth(3));
        let result = builder.build(&User::describe());
        assert!(matches!(
            result,
            Err(ConfigurationError::DepthExceeded { max_depth: 3, .. })
        ));

        let builder = PathSchemaBuilder::new(&RegistryConfig::new().with_max_depth(6));
        assert!(builder.build(&User::describe()).is_ok());
    }

    #[test]
    fn field_names_are_escaped() {
        struct Odd;
        impl Describe for Odd {
            fn describe() -> TypeDescriptor {
                TypeDescriptor::model::<Self>("Odd", || {
                    vec![Field::of::<i32>("a.b"), Field::of::<i32>("c/d")]
                })
            }
        }
        let schema = PathSchemaBuilder::default().build(&Odd::describe()).unwrap();
        assert!(schema.find("/a.b").is_some());
        assert!(schema.find("/aXb").is_none());
        assert!(schema.find("/c~1d").is_some());
    }
}
