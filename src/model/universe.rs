//! The declarative type universe backing the schema provider.
//!
//! A TypeUniverse is the registry of declared model types: it owns the
//! extends relation, computes supertype linearizations, and memoizes one
//! TypeSchema per type. Declarations can only reference already-declared
//! supertypes, so the extends relation is acyclic by construction.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::RwLock;

use petgraph::algo::has_path_connecting;
use petgraph::prelude::DiGraphMap;
use thiserror::Error;
use tracing::debug;

use crate::model::schema::{
    ConstructorDecl, FieldDecl, MethodDecl, SchemaProvider, TypeSchema, Visibility,
};
use crate::model::types::{ModelType, TypeKind, ValueType};
use crate::util::Name;

/// Name of the built-in read-only-name marker contract.
pub const NAMED_MARKER: &str = "Named";

static NEXT_UNIVERSE: AtomicU64 = AtomicU64::new(0);

/// Error raised while declaring a type.
#[derive(Debug, Error)]
pub enum DeclareError {
    #[error("type `{0}` is already declared")]
    DuplicateType(Name),

    #[error("supertype `{0}` belongs to a different universe")]
    ForeignSupertype(Name),
}

/// A method declaration on a [`TypeDecl`], not yet stamped with its
/// declaring type.
#[derive(Debug, Clone)]
pub struct MethodSpec {
    name: Name,
    params: Vec<ValueType>,
    return_type: ValueType,
    visibility: Visibility,
    is_abstract: bool,
    unmanaged: bool,
}

impl MethodSpec {
    /// An implemented public method.
    pub fn implemented(
        name: impl Into<Name>,
        params: Vec<ValueType>,
        return_type: ValueType,
    ) -> Self {
        MethodSpec {
            name: name.into(),
            params,
            return_type,
            visibility: Visibility::Public,
            is_abstract: false,
            unmanaged: false,
        }
    }

    /// An abstract public method.
    pub fn abstract_method(
        name: impl Into<Name>,
        params: Vec<ValueType>,
        return_type: ValueType,
    ) -> Self {
        MethodSpec {
            is_abstract: true,
            ..MethodSpec::implemented(name, params, return_type)
        }
    }

    /// Override the visibility.
    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    /// Mark the declaration as unmanaged.
    pub fn unmanaged(mut self) -> Self {
        self.unmanaged = true;
        self
    }
}

/// A type declaration to register with a universe.
#[derive(Debug, Clone)]
pub struct TypeDecl {
    name: Name,
    kind: TypeKind,
    supertypes: Vec<ModelType>,
    managed: bool,
    parameterized: bool,
    methods: Vec<MethodSpec>,
    fields: Vec<(Name, bool)>,
    constructors: Vec<Vec<ValueType>>,
}

impl TypeDecl {
    fn new(name: impl Into<Name>, kind: TypeKind) -> Self {
        TypeDecl {
            name: name.into(),
            kind,
            supertypes: Vec::new(),
            managed: false,
            parameterized: false,
            methods: Vec::new(),
            fields: Vec::new(),
            constructors: Vec::new(),
        }
    }

    /// Declare an interface.
    pub fn interface(name: impl Into<Name>) -> Self {
        TypeDecl::new(name, TypeKind::Interface)
    }

    /// Declare an abstract class.
    pub fn abstract_class(name: impl Into<Name>) -> Self {
        TypeDecl::new(name, TypeKind::AbstractClass)
    }

    /// Declare a concrete class (usable as a delegate type).
    pub fn class(name: impl Into<Name>) -> Self {
        TypeDecl::new(name, TypeKind::Class)
    }

    /// Add a supertype (must already be declared).
    pub fn extends(mut self, supertype: ModelType) -> Self {
        self.supertypes.push(supertype);
        self
    }

    /// Mark the type as managed.
    pub fn managed(mut self) -> Self {
        self.managed = true;
        self
    }

    /// Mark the declaration as generic.
    pub fn parameterized(mut self) -> Self {
        self.parameterized = true;
        self
    }

    /// Add a method declaration.
    pub fn method(mut self, method: MethodSpec) -> Self {
        self.methods.push(method);
        self
    }

    /// Shorthand for an abstract `get`-style accessor.
    pub fn abstract_getter(self, name: impl Into<Name>, ty: ValueType) -> Self {
        self.method(MethodSpec::abstract_method(name, vec![], ty))
    }

    /// Shorthand for an implemented `get`-style accessor.
    pub fn getter(self, name: impl Into<Name>, ty: ValueType) -> Self {
        self.method(MethodSpec::implemented(name, vec![], ty))
    }

    /// Shorthand for an abstract `set`-style accessor.
    pub fn abstract_setter(self, name: impl Into<Name>, ty: ValueType) -> Self {
        self.method(MethodSpec::abstract_method(name, vec![ty], ValueType::Void))
    }

    /// Shorthand for an implemented `set`-style accessor.
    pub fn setter(self, name: impl Into<Name>, ty: ValueType) -> Self {
        self.method(MethodSpec::implemented(name, vec![ty], ValueType::Void))
    }

    /// Shorthand for an abstract getter carrying the unmanaged marker.
    pub fn unmanaged_getter(self, name: impl Into<Name>, ty: ValueType) -> Self {
        self.method(MethodSpec::abstract_method(name, vec![], ty).unmanaged())
    }

    /// Add an instance field (illegal on managed types).
    pub fn instance_field(mut self, name: impl Into<Name>) -> Self {
        self.fields.push((name.into(), false));
        self
    }

    /// Add a static-final constant (legal).
    pub fn constant(mut self, name: impl Into<Name>) -> Self {
        self.fields.push((name.into(), true));
        self
    }

    /// Add an explicit constructor (illegal on managed types).
    pub fn constructor(mut self, params: Vec<ValueType>) -> Self {
        self.constructors.push(params);
        self
    }
}

#[derive(Debug)]
struct TypeDef {
    kind: TypeKind,
    supertypes: Vec<ModelType>,
    managed: bool,
    parameterized: bool,
    methods: Vec<MethodDecl>,
    fields: Vec<FieldDecl>,
    constructors: Vec<ConstructorDecl>,
}

#[derive(Debug)]
struct UniverseInner {
    defs: HashMap<ModelType, TypeDef>,
    order: Vec<ModelType>,
    extends: DiGraphMap<ModelType, ()>,
    schemas: HashMap<ModelType, TypeSchema>,
}

/// The registry of declared model types.
///
/// Declaration happens through `&self`; the universe is safe to share
/// across threads once populated, and schema computation is memoized with
/// at-most-one computation per type under concurrent first access.
#[derive(Debug)]
pub struct TypeUniverse {
    id: u64,
    named: ModelType,
    inner: RwLock<UniverseInner>,
}

impl TypeUniverse {
    /// Create an empty universe with the built-in `Named` marker contract.
    pub fn new() -> Self {
        let id = NEXT_UNIVERSE.fetch_add(1, Ordering::Relaxed);
        let named = ModelType::new(id, Name::new(NAMED_MARKER));

        let mut extends = DiGraphMap::new();
        extends.add_node(named);

        let mut defs = HashMap::new();
        defs.insert(
            named,
            TypeDef {
                kind: TypeKind::Interface,
                supertypes: Vec::new(),
                managed: false,
                parameterized: false,
                methods: vec![MethodDecl {
                    name: Name::new("getName"),
                    params: vec![],
                    return_type: ValueType::Str,
                    visibility: Visibility::Public,
                    is_abstract: true,
                    unmanaged: false,
                    declared_by: named,
                }],
                fields: Vec::new(),
                constructors: Vec::new(),
            },
        );

        TypeUniverse {
            id,
            named,
            inner: RwLock::new(UniverseInner {
                defs,
                order: vec![named],
                extends,
                schemas: HashMap::new(),
            }),
        }
    }

    /// The built-in read-only-name marker type.
    pub fn named_marker(&self) -> ModelType {
        self.named
    }

    /// Register a type declaration, returning its identity.
    pub fn declare(&self, decl: TypeDecl) -> Result<ModelType, DeclareError> {
        let ty = ModelType::new(self.id, decl.name);

        let mut inner = self.inner.write().unwrap();
        if inner.defs.contains_key(&ty) {
            return Err(DeclareError::DuplicateType(decl.name));
        }
        for sup in &decl.supertypes {
            if sup.universe() != self.id {
                return Err(DeclareError::ForeignSupertype(sup.name()));
            }
        }

        inner.extends.add_node(ty);
        for sup in &decl.supertypes {
            inner.extends.add_edge(ty, *sup, ());
        }

        let methods = decl
            .methods
            .into_iter()
            .map(|m| MethodDecl {
                name: m.name,
                params: m.params,
                return_type: m.return_type,
                visibility: m.visibility,
                is_abstract: m.is_abstract,
                unmanaged: m.unmanaged,
                declared_by: ty,
            })
            .collect();
        let fields = decl
            .fields
            .into_iter()
            .map(|(name, static_final)| FieldDecl {
                name,
                static_final,
                declared_by: ty,
            })
            .collect();
        let constructors = decl
            .constructors
            .into_iter()
            .map(|params| ConstructorDecl {
                params,
                declared_by: ty,
            })
            .collect();

        inner.defs.insert(
            ty,
            TypeDef {
                kind: decl.kind,
                supertypes: decl.supertypes,
                managed: decl.managed,
                parameterized: decl.parameterized,
                methods,
                fields,
                constructors,
            },
        );
        inner.order.push(ty);
        Ok(ty)
    }

    /// Look up a declared type by name.
    pub fn get(&self, name: &str) -> Option<ModelType> {
        let ty = ModelType::new(self.id, Name::new(name));
        let inner = self.inner.read().unwrap();
        inner.defs.contains_key(&ty).then_some(ty)
    }

    /// All declared types, in declaration order.
    pub fn declared_types(&self) -> Vec<ModelType> {
        self.inner.read().unwrap().order.clone()
    }

    /// Declared types carrying the managed marker, in declaration order.
    pub fn managed_types(&self) -> Vec<ModelType> {
        let inner = self.inner.read().unwrap();
        inner
            .order
            .iter()
            .copied()
            .filter(|t| inner.defs.get(t).map(|d| d.managed).unwrap_or(false))
            .collect()
    }

    /// Whether `sup` is a supertype of (or equal to) `sub`.
    pub fn is_assignable_from(&self, sup: ModelType, sub: ModelType) -> bool {
        if sup == sub {
            return true;
        }
        let inner = self.inner.read().unwrap();
        has_path_connecting(&inner.extends, sub, sup, None)
    }

    fn compute_schema(&self, inner: &UniverseInner, ty: ModelType) -> TypeSchema {
        let def = inner
            .defs
            .get(&ty)
            .expect("type identity does not belong to this universe");

        // Linearize: self first, then supertypes depth-first in
        // declaration order, deduplicated.
        let mut order = Vec::new();
        let mut seen = HashSet::new();
        let mut stack = vec![ty];
        while let Some(t) = stack.pop() {
            if !seen.insert(t) {
                continue;
            }
            order.push(t);
            let supers = &inner.defs[&t].supertypes;
            for sup in supers.iter().rev() {
                stack.push(*sup);
            }
        }

        // Flatten methods most-derived-first; the first declaration seen
        // for a signature wins.
        let mut methods: Vec<MethodDecl> = Vec::new();
        let mut sigs = HashSet::new();
        for t in &order {
            for m in &inner.defs[t].methods {
                if sigs.insert(m.signature()) {
                    methods.push(m.clone());
                }
            }
        }

        let named_marker = order.contains(&self.named);

        debug!(ty = %ty, methods = methods.len(), "computed type schema");

        TypeSchema::new(
            ty,
            def.kind,
            order,
            methods,
            def.fields.clone(),
            def.constructors.clone(),
            def.parameterized,
            def.managed,
            named_marker,
        )
    }
}

impl Default for TypeUniverse {
    fn default() -> Self {
        TypeUniverse::new()
    }
}

impl SchemaProvider for TypeUniverse {
    fn schema_for(&self, ty: ModelType) -> TypeSchema {
        // Fast path: already memoized (read lock only)
        {
            let inner = self.inner.read().unwrap();
            if let Some(schema) = inner.schemas.get(&ty) {
                return schema.clone();
            }
        }

        let mut inner = self.inner.write().unwrap();

        // Double-check after acquiring write lock
        if let Some(schema) = inner.schemas.get(&ty) {
            return schema.clone();
        }

        let schema = self.compute_schema(&inner, ty);
        inner.schemas.insert(ty, schema.clone());
        schema
    }
}
