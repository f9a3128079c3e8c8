//! Structural type schemas - the contract the binding engine consumes.
//!
//! A TypeSchema is a pre-computed, immutable view of one declared type:
//! its kind, supertype order, flattened method set, and the fields and
//! constructors it declares itself. Schemas are produced and memoized by
//! a SchemaProvider; the engine never inspects declarations directly.

use std::fmt;
use std::sync::Arc;

use crate::model::types::{ModelType, TypeKind, ValueType};
use crate::util::Name;

/// Declared visibility of a method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Public,
    Protected,
    Private,
}

/// A method's identity: name plus parameter types.
///
/// Return types do not participate, so covariant overrides collapse onto
/// one signature.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MethodSignature {
    pub name: Name,
    pub params: Vec<ValueType>,
}

impl fmt::Display for MethodSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.name)?;
        for (i, p) in self.params.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", p)?;
        }
        write!(f, ")")
    }
}

/// A declared method, tagged with the type that declared it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodDecl {
    pub name: Name,
    pub params: Vec<ValueType>,
    pub return_type: ValueType,
    pub visibility: Visibility,
    pub is_abstract: bool,
    /// The declaration carries the unmanaged marker (legal on getters only).
    pub unmanaged: bool,
    pub declared_by: ModelType,
}

impl MethodDecl {
    /// The deduplication and delegate-matching key.
    pub fn signature(&self) -> MethodSignature {
        MethodSignature {
            name: self.name,
            params: self.params.clone(),
        }
    }
}

/// A declared field, tagged with its declaring type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDecl {
    pub name: Name,
    pub static_final: bool,
    pub declared_by: ModelType,
}

/// An explicit constructor declaration. Any explicit constructor is
/// illegal on a managed type, including zero-argument ones.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstructorDecl {
    pub params: Vec<ValueType>,
    pub declared_by: ModelType,
}

/// An immutable structural schema for one declared type.
///
/// Schemas are Arc-wrapped internally for cheap cloning and safe sharing
/// across concurrent binding computations.
#[derive(Clone)]
pub struct TypeSchema {
    inner: Arc<TypeSchemaInner>,
}

struct TypeSchemaInner {
    ty: ModelType,
    kind: TypeKind,
    /// Self first, then supertypes depth-first in declaration order,
    /// deduplicated.
    supertype_order: Vec<ModelType>,
    /// Flattened across the hierarchy; one entry per signature, keeping
    /// the most-derived declaration.
    methods: Vec<MethodDecl>,
    /// Fields declared by this type only.
    fields: Vec<FieldDecl>,
    /// Constructors declared by this type only.
    constructors: Vec<ConstructorDecl>,
    parameterized: bool,
    managed: bool,
    named_marker: bool,
}

impl TypeSchema {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        ty: ModelType,
        kind: TypeKind,
        supertype_order: Vec<ModelType>,
        methods: Vec<MethodDecl>,
        fields: Vec<FieldDecl>,
        constructors: Vec<ConstructorDecl>,
        parameterized: bool,
        managed: bool,
        named_marker: bool,
    ) -> Self {
        TypeSchema {
            inner: Arc::new(TypeSchemaInner {
                ty,
                kind,
                supertype_order,
                methods,
                fields,
                constructors,
                parameterized,
                managed,
                named_marker,
            }),
        }
    }

    /// The nominal type this schema describes.
    pub fn ty(&self) -> ModelType {
        self.inner.ty
    }

    pub fn kind(&self) -> TypeKind {
        self.inner.kind
    }

    /// The linearized supertype order, self first.
    pub fn supertype_order(&self) -> &[ModelType] {
        &self.inner.supertype_order
    }

    /// Whether this type is assignable to `other` (i.e. `other` is self
    /// or appears among the supertypes).
    pub fn is_assignable_to(&self, other: ModelType) -> bool {
        self.inner.supertype_order.contains(&other)
    }

    /// The flattened method set, most-derived declaration per signature.
    pub fn methods(&self) -> &[MethodDecl] {
        &self.inner.methods
    }

    /// Fields declared by this type itself (not inherited).
    pub fn fields(&self) -> &[FieldDecl] {
        &self.inner.fields
    }

    /// Explicit constructors declared by this type itself.
    pub fn constructors(&self) -> &[ConstructorDecl] {
        &self.inner.constructors
    }

    /// Whether the type declaration is generic.
    pub fn is_parameterized(&self) -> bool {
        self.inner.parameterized
    }

    /// Whether the type carries the managed marker.
    pub fn is_managed(&self) -> bool {
        self.inner.managed
    }

    /// Whether the type implements the read-only-name marker contract.
    pub fn has_named_marker(&self) -> bool {
        self.inner.named_marker
    }
}

impl fmt::Debug for TypeSchema {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypeSchema")
            .field("ty", &self.inner.ty)
            .field("kind", &self.inner.kind)
            .field("methods", &self.inner.methods.len())
            .finish()
    }
}

/// Supplies a structural schema per nominal type.
///
/// Implementations memoize: repeated calls for the same type are cheap and
/// side-effect-free from the caller's perspective, and safe under
/// concurrent first access.
pub trait SchemaProvider: Send + Sync {
    /// Get the schema for a type declared in this provider's universe.
    ///
    /// # Panics
    ///
    /// Panics if `ty` originates from a different universe; type
    /// identities cannot be constructed by hand.
    fn schema_for(&self, ty: ModelType) -> TypeSchema;
}

/// Whether `sup` is a supertype of (or equal to) `sub`.
pub fn is_assignable_from(provider: &dyn SchemaProvider, sup: ModelType, sub: ModelType) -> bool {
    sup == sub || provider.schema_for(sub).is_assignable_to(sup)
}
