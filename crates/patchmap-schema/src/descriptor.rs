//! Static type descriptors for model field graphs
//!
//! Provides [`TypeDescriptor`] and the [`Describe`] trait, the explicit
//! replacement for walking a model's fields at runtime.

use std::any::TypeId;
use std::fmt::{self, Debug, Display, Formatter};
use std::hash::{Hash, Hasher};

/// Value type of an addressable field
///
/// Every variant except [`TypeDescriptor::Array`] and [`TypeDescriptor::Model`]
/// is a leaf. [`TypeDescriptor::Optional`] is transparent for path expansion
/// but marks the value as nullable for coercion.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TypeDescriptor {
    /// Boolean
    Bool,
    /// 32-bit signed integer
    Int32,
    /// 64-bit signed integer
    Int64,
    /// 64-bit float
    Double,
    /// UTF-8 string (always a leaf, never expanded per character)
    String,
    /// UUID, stored as binary subtype 4
    Uuid,
    /// UTC timestamp
    DateTime,
    /// Opaque document or JSON value, stored as given
    Document,
    /// Nullable wrapper
    Optional(Box<TypeDescriptor>),
    /// Sequence of elements
    Array(Box<TypeDescriptor>),
    /// Composite model with named fields
    Model(ModelRef),
}

impl TypeDescriptor {
    /// Descriptor of `T`
    #[inline]
    #[must_use]
    pub fn of<T: Describe>() -> Self {
        T::describe()
    }

    /// Array of `element`
    #[inline]
    #[must_use]
    pub fn array(element: TypeDescriptor) -> Self {
        Self::Array(Box::new(element))
    }

    /// Nullable `inner`
    #[inline]
    #[must_use]
    pub fn optional(inner: TypeDescriptor) -> Self {
        Self::Optional(Box::new(inner))
    }

    /// Model descriptor for `T` with lazily evaluated fields
    #[inline]
    #[must_use]
    pub fn model<T: 'static>(name: &'static str, fields: fn() -> Vec<Field>) -> Self {
        Self::Model(ModelRef::of::<T>(name, fields))
    }

    /// Strip every [`TypeDescriptor::Optional`] layer
    #[must_use]
    pub fn peel_optional(&self) -> &TypeDescriptor {
        let mut current = self;
        while let Self::Optional(inner) = current {
            current = inner;
        }
        current
    }

    /// Whether `null` is an acceptable value
    #[inline]
    #[must_use]
    pub fn is_nullable(&self) -> bool {
        matches!(self, Self::Optional(_) | Self::Document)
    }

    /// Whether the type has no addressable sub-paths
    #[inline]
    #[must_use]
    pub fn is_leaf(&self) -> bool {
        !matches!(self.peel_optional(), Self::Array(_) | Self::Model(_))
    }

    /// Model reference, looking through optional layers
    #[inline]
    #[must_use]
    pub fn as_model(&self) -> Option<&ModelRef> {
        match self.peel_optional() {
            Self::Model(model) => Some(model),
            _ => None,
        }
    }
}

impl Display for TypeDescriptor {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool => f.write_str("bool"),
            Self::Int32 => f.write_str("i32"),
            Self::Int64 => f.write_str("i64"),
            Self::Double => f.write_str("f64"),
            Self::String => f.write_str("String"),
            Self::Uuid => f.write_str("Uuid"),
            Self::DateTime => f.write_str("DateTime"),
            Self::Document => f.write_str("Document"),
            Self::Optional(inner) => write!(f, "Option<{inner}>"),
            Self::Array(element) => write!(f, "Vec<{element}>"),
            Self::Model(model) => f.write_str(model.name()),
        }
    }
}

/// Identity and field list of a composite model
///
/// Fields are produced on demand so self-referencing graphs can be described
/// without infinite construction. Equality and hashing use the Rust type
/// identity only.
#[derive(Clone, Copy)]
pub struct ModelRef {
    type_id: TypeId,
    name: &'static str,
    fields: fn() -> Vec<Field>,
}

impl ModelRef {
    /// Reference for model type `T`
    #[inline]
    #[must_use]
    pub fn of<T: 'static>(name: &'static str, fields: fn() -> Vec<Field>) -> Self {
        Self {
            type_id: TypeId::of::<T>(),
            name,
            fields,
        }
    }

    /// Rust type identity
    #[inline]
    #[must_use]
    pub fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// Display name
    #[inline]
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Declared fields, in declaration order
    #[inline]
    #[must_use]
    pub fn fields(&self) -> Vec<Field> {
        (self.fields)()
    }
}

impl PartialEq for ModelRef {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl Eq for ModelRef {}

impl Hash for ModelRef {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.type_id.hash(state);
    }
}

impl Debug for ModelRef {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelRef")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}

/// Named field of a model
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Field {
    name: String,
    ty: TypeDescriptor,
}

impl Field {
    /// Create field with an explicit descriptor
    #[inline]
    #[must_use]
    pub fn new(name: impl Into<String>, ty: TypeDescriptor) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }

    /// Create field whose descriptor comes from `T`
    #[inline]
    #[must_use]
    pub fn of<T: Describe>(name: impl Into<String>) -> Self {
        Self::new(name, T::describe())
    }

    /// Field name as addressed in patch paths and stored documents
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Field value type
    #[inline]
    #[must_use]
    pub fn ty(&self) -> &TypeDescriptor {
        &self.ty
    }
}

/// Types that can describe their own shape
///
/// Models implement this by returning [`TypeDescriptor::model`]:
///
/// ```
/// use patchmap_schema::{Describe, Field, TypeDescriptor};
///
/// struct Leg {
///     is_ok: bool,
/// }
///
/// impl Describe for Leg {
///     fn describe() -> TypeDescriptor {
///         TypeDescriptor::model::<Self>("Leg", || vec![Field::of::<bool>("IsOk")])
///     }
/// }
///
/// assert!(!Leg::describe().is_leaf());
/// ```
pub trait Describe: 'static {
    /// Descriptor of this type
    fn describe() -> TypeDescriptor;
}

macro_rules! describe_leaf {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl Describe for $ty {
                #[inline]
                fn describe() -> TypeDescriptor {
                    TypeDescriptor::$variant
                }
            }
        )*
    };
}

describe_leaf! {
    bool => Bool,
    i32 => Int32,
    i64 => Int64,
    f64 => Double,
    String => String,
    uuid::Uuid => Uuid,
    chrono::DateTime<chrono::Utc> => DateTime,
    serde_json::Value => Document,
    bson::Document => Document,
}

impl<T: Describe> Describe for Option<T> {
    #[inline]
    fn describe() -> TypeDescriptor {
        TypeDescriptor::optional(T::describe())
    }
}

impl<T: Describe> Describe for Vec<T> {
    #[inline]
    fn describe() -> TypeDescriptor {
        TypeDescriptor::array(T::describe())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Point;
    struct Other;

    impl Describe for Point {
        fn describe() -> TypeDescriptor {
            TypeDescriptor::model::<Self>("Point", || {
                vec![Field::of::<f64>("X"), Field::of::<f64>("Y")]
            })
        }
    }

    #[test]
    fn leaf_descriptors() {
        assert_eq!(TypeDescriptor::of::<bool>(), TypeDescriptor::Bool);
        assert_eq!(TypeDescriptor::of::<String>(), TypeDescriptor::String);
        assert_eq!(TypeDescriptor::of::<serde_json::Value>(), TypeDescriptor::Document);
        assert!(TypeDescriptor::String.is_leaf());
    }

    #[test]
    fn wrappers_compose() {
        let ty = TypeDescriptor::of::<Option<Vec<i32>>>();
        assert_eq!(
            ty,
            TypeDescriptor::optional(TypeDescriptor::array(TypeDescriptor::Int32))
        );
        assert!(ty.is_nullable());
        assert!(!ty.is_leaf());
        assert_eq!(ty.to_string(), "Option<Vec<i32>>");
    }

    #[test]
    fn peel_optional_strips_all_layers() {
        let ty = TypeDescriptor::of::<Option<Option<String>>>();
        assert_eq!(ty.peel_optional(), &TypeDescriptor::String);
    }

    #[test]
    fn model_equality_uses_type_identity() {
        let a = TypeDescriptor::of::<Point>();
        let b = TypeDescriptor::model::<Point>("Renamed", Vec::new);
        let c = TypeDescriptor::model::<Other>("Point", Vec::new);
        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn model_fields_are_lazy() {
        let ty = TypeDescriptor::of::<Option<Point>>();
        let model = ty.as_model().unwrap();
        assert_eq!(model.name(), "Point");
        let names: Vec<_> = model.fields().iter().map(|f| f.name().to_string()).collect();
        assert_eq!(names, vec!["X", "Y"]);
    }
}
