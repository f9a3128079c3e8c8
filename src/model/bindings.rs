//! Resolved struct bindings - the engine's output.
//!
//! A StructBindings value records, for one (views, delegate) combination,
//! which view schemas were retained after convergence, the managed
//! properties requiring generated storage, and exactly one binding per
//! relevant method. Constructed once, immutable, safe to share.

use std::fmt;
use std::sync::Arc;

use crate::model::accessor::AccessorKind;
use crate::model::schema::{MethodDecl, MethodSignature, TypeSchema};
use crate::model::types::ValueType;
use crate::util::Name;

/// A method backed by generated storage.
#[derive(Debug, Clone)]
pub struct ManagedBinding {
    /// The view declaration being satisfied.
    pub method: MethodDecl,
    /// The property whose storage backs the method.
    pub property: Name,
    pub accessor: AccessorKind,
}

/// A method whose view implementation is used verbatim.
#[derive(Debug, Clone)]
pub struct DirectBinding {
    pub method: MethodDecl,
}

/// A method forwarded to the delegate instance.
#[derive(Debug, Clone)]
pub struct DelegateBinding {
    /// The view declaration being satisfied.
    pub method: MethodDecl,
    /// The delegate's matching implementation.
    pub implementation: MethodDecl,
}

/// How one resolved method is implemented. Exactly one variant applies
/// per method.
#[derive(Debug, Clone)]
pub enum MethodBinding {
    Managed(ManagedBinding),
    Direct(DirectBinding),
    Delegate(DelegateBinding),
}

impl MethodBinding {
    /// The signature of the view method this binding satisfies.
    pub fn signature(&self) -> MethodSignature {
        match self {
            MethodBinding::Managed(b) => b.method.signature(),
            MethodBinding::Direct(b) => b.method.signature(),
            MethodBinding::Delegate(b) => b.method.signature(),
        }
    }

    /// Short strategy label for reports.
    pub fn strategy(&self) -> &'static str {
        match self {
            MethodBinding::Managed(_) => "managed",
            MethodBinding::Direct(_) => "direct",
            MethodBinding::Delegate(_) => "delegate",
        }
    }
}

impl fmt::Display for MethodBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.signature(), self.strategy())
    }
}

/// A property requiring generated backing storage.
#[derive(Debug, Clone)]
pub struct ManagedProperty {
    pub name: Name,
    pub value_type: ValueType,
    /// Whether a setter participates (read-only properties have none).
    pub writable: bool,
}

/// The immutable result of binding one (views, delegate) combination.
#[derive(Clone)]
pub struct StructBindings {
    inner: Arc<StructBindingsInner>,
}

struct StructBindingsInner {
    declared_views: Vec<TypeSchema>,
    delegate: Option<TypeSchema>,
    managed_properties: Vec<ManagedProperty>,
    method_bindings: Vec<MethodBinding>,
}

impl StructBindings {
    pub(crate) fn new(
        declared_views: Vec<TypeSchema>,
        delegate: Option<TypeSchema>,
        managed_properties: Vec<ManagedProperty>,
        method_bindings: Vec<MethodBinding>,
    ) -> Self {
        StructBindings {
            inner: Arc::new(StructBindingsInner {
                declared_views,
                delegate,
                managed_properties,
                method_bindings,
            }),
        }
    }

    /// The view schemas retained after convergence reduction.
    pub fn declared_views(&self) -> &[TypeSchema] {
        &self.inner.declared_views
    }

    /// The delegate schema, if a delegate type was supplied.
    pub fn delegate(&self) -> Option<&TypeSchema> {
        self.inner.delegate.as_ref()
    }

    /// Properties requiring generated storage, in declaration order.
    pub fn managed_properties(&self) -> &[ManagedProperty] {
        &self.inner.managed_properties
    }

    /// Look up one managed property by name.
    pub fn managed_property(&self, name: &str) -> Option<&ManagedProperty> {
        self.inner
            .managed_properties
            .iter()
            .find(|p| p.name.as_str() == name)
    }

    /// Every resolved method, exactly once, in resolution order.
    pub fn method_bindings(&self) -> &[MethodBinding] {
        &self.inner.method_bindings
    }
}

impl fmt::Debug for StructBindings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StructBindings")
            .field(
                "views",
                &self
                    .inner
                    .declared_views
                    .iter()
                    .map(|s| s.ty().name().as_str())
                    .collect::<Vec<_>>(),
            )
            .field("delegate", &self.inner.delegate.as_ref().map(|s| s.ty()))
            .field("managed_properties", &self.inner.managed_properties.len())
            .field("method_bindings", &self.inner.method_bindings.len())
            .finish()
    }
}
