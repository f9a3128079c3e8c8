//! Nominal type identity and value types for the managed model.
//!
//! ModelType uniquely identifies a declared type within a universe.
//! It's interned for cheap comparison and cloning.

use std::collections::HashMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::{LazyLock, RwLock};

use crate::util::Name;

/// Global model type interner
static TYPE_INTERNER: LazyLock<RwLock<HashMap<ModelTypeInner, &'static ModelTypeInner>>> =
    LazyLock::new(|| RwLock::new(HashMap::new()));

/// A unique identifier for a declared model type (interned).
///
/// ModelTypes are cheap to copy and compare (pointer comparison). They
/// combine the owning universe and the type name, so identically-named
/// types from different universes stay distinct.
#[derive(Clone, Copy)]
pub struct ModelType {
    inner: &'static ModelTypeInner,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct ModelTypeInner {
    universe: u64,
    name: Name,
}

impl ModelType {
    /// Create a type identity. Only the universe hands these out.
    pub(crate) fn new(universe: u64, name: Name) -> Self {
        let inner = ModelTypeInner { universe, name };

        // Fast path: check if already interned
        {
            let interner = TYPE_INTERNER.read().unwrap();
            if let Some(&interned) = interner.get(&inner) {
                return ModelType { inner: interned };
            }
        }

        let mut interner = TYPE_INTERNER.write().unwrap();

        // Double-check after acquiring write lock
        if let Some(&interned) = interner.get(&inner) {
            return ModelType { inner: interned };
        }

        let leaked: &'static ModelTypeInner = Box::leak(Box::new(inner.clone()));
        interner.insert(inner, leaked);

        ModelType { inner: leaked }
    }

    /// Get the type name.
    pub fn name(&self) -> Name {
        self.inner.name
    }

    /// Get the owning universe id.
    pub(crate) fn universe(&self) -> u64 {
        self.inner.universe
    }
}

impl PartialEq for ModelType {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self.inner, other.inner)
    }
}

impl Eq for ModelType {}

impl Hash for ModelType {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::ptr::hash(self.inner, state)
    }
}

impl PartialOrd for ModelType {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ModelType {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.inner
            .universe
            .cmp(&other.inner.universe)
            .then_with(|| self.inner.name.cmp(&other.inner.name))
    }
}

impl fmt::Debug for ModelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ModelType")
            .field("name", &self.inner.name.as_str())
            .finish()
    }
}

impl fmt::Display for ModelType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.inner.name)
    }
}

/// The kind of a declared type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeKind {
    /// An abstract contract with no state of its own.
    Interface,
    /// A partially implemented abstract class.
    AbstractClass,
    /// A concrete class; the only legal delegate kind.
    Class,
}

impl TypeKind {
    /// Whether the kind is legal for a view hierarchy.
    pub fn is_abstract(&self) -> bool {
        matches!(self, TypeKind::Interface | TypeKind::AbstractClass)
    }
}

impl fmt::Display for TypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeKind::Interface => write!(f, "interface"),
            TypeKind::AbstractClass => write!(f, "abstract class"),
            TypeKind::Class => write!(f, "class"),
        }
    }
}

/// Scalar value kinds, in their primitive form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scalar {
    Bool,
    Char,
    Byte,
    Short,
    Int,
    Long,
    Float,
    Double,
}

impl Scalar {
    /// Primitive spelling, e.g. `boolean`, `int`.
    pub fn primitive_name(&self) -> &'static str {
        match self {
            Scalar::Bool => "boolean",
            Scalar::Char => "char",
            Scalar::Byte => "byte",
            Scalar::Short => "short",
            Scalar::Int => "int",
            Scalar::Long => "long",
            Scalar::Float => "float",
            Scalar::Double => "double",
        }
    }

    /// Boxed wrapper spelling, e.g. `Boolean`, `Integer`.
    pub fn boxed_name(&self) -> &'static str {
        match self {
            Scalar::Bool => "Boolean",
            Scalar::Char => "Character",
            Scalar::Byte => "Byte",
            Scalar::Short => "Short",
            Scalar::Int => "Integer",
            Scalar::Long => "Long",
            Scalar::Float => "Float",
            Scalar::Double => "Double",
        }
    }
}

/// A value type as declared on an accessor or field.
///
/// Primitive and boxed scalar forms are distinct declarations but compare
/// equal after normalization; parameterized types compare structurally.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ValueType {
    Void,
    /// Primitive scalar form, e.g. `int`.
    Scalar(Scalar),
    /// Boxed scalar form, e.g. `Integer`.
    Boxed(Scalar),
    Str,
    /// A reference to another declared type.
    Reference(ModelType),
    List(Box<ValueType>),
    Set(Box<ValueType>),
    /// Read-only managed container keyed by name.
    ManagedMap(Box<ValueType>),
    /// Read-only managed container of unique elements.
    ManagedSet(Box<ValueType>),
}

impl ValueType {
    /// Collapse boxed scalars to their primitive form, recursively.
    pub fn normalized(&self) -> ValueType {
        match self {
            ValueType::Boxed(s) => ValueType::Scalar(*s),
            ValueType::List(e) => ValueType::List(Box::new(e.normalized())),
            ValueType::Set(e) => ValueType::Set(Box::new(e.normalized())),
            ValueType::ManagedMap(e) => ValueType::ManagedMap(Box::new(e.normalized())),
            ValueType::ManagedSet(e) => ValueType::ManagedSet(Box::new(e.normalized())),
            other => other.clone(),
        }
    }

    /// Whether two declared types agree after primitive/boxed normalization.
    pub fn is_equivalent(&self, other: &ValueType) -> bool {
        self.normalized() == other.normalized()
    }

    /// Whether this is one of the read-only managed container kinds.
    pub fn is_managed_container(&self) -> bool {
        matches!(self, ValueType::ManagedMap(_) | ValueType::ManagedSet(_))
    }

    /// The container kind name for diagnostics, if a managed container.
    pub fn container_kind(&self) -> Option<&'static str> {
        match self {
            ValueType::ManagedMap(_) => Some("ManagedMap"),
            ValueType::ManagedSet(_) => Some("ManagedSet"),
            _ => None,
        }
    }

    /// The referenced model type, if this is a direct reference.
    pub fn referenced_type(&self) -> Option<ModelType> {
        match self {
            ValueType::Reference(t) => Some(*t),
            _ => None,
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueType::Void => write!(f, "void"),
            ValueType::Scalar(s) => write!(f, "{}", s.primitive_name()),
            ValueType::Boxed(s) => write!(f, "{}", s.boxed_name()),
            ValueType::Str => write!(f, "String"),
            ValueType::Reference(t) => write!(f, "{}", t),
            ValueType::List(e) => write!(f, "List<{}>", e),
            ValueType::Set(e) => write!(f, "Set<{}>", e),
            ValueType::ManagedMap(e) => write!(f, "ManagedMap<{}>", e),
            ValueType::ManagedSet(e) => write!(f, "ManagedSet<{}>", e),
        }
    }
}
