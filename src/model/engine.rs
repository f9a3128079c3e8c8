//! The struct binding engine.
//!
//! Combines one or more view schemas and an optional delegate schema into
//! a single StructBindings result: merged property set, one binding per
//! method, and aggregated validation diagnostics. The engine is a pure
//! function of its inputs plus the schema provider; results are memoized
//! per (views, delegate) combination with at-most-one computation per key
//! under concurrent requests.

use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, OnceLock, RwLock};

use tracing::debug;

use crate::model::accessor::{classify, AccessorKind, Classification};
use crate::model::bindings::{
    DelegateBinding, DirectBinding, ManagedBinding, ManagedProperty, MethodBinding, StructBindings,
};
use crate::model::convergence::find_converging_types;
use crate::model::diagnostics::{InvalidManagedType, ProblemCollector};
use crate::model::schema::{
    is_assignable_from, MethodDecl, MethodSignature, SchemaProvider, TypeSchema, Visibility,
};
use crate::model::types::{ModelType, TypeKind, ValueType};
use crate::model::universe::NAMED_MARKER;
use crate::util::Name;

type BindOutcome = Result<StructBindings, InvalidManagedType>;

#[derive(Clone, PartialEq, Eq, Hash)]
struct BindingKey {
    views: Vec<ModelType>,
    delegate: Option<ModelType>,
}

/// All accessor declarations collected for one property.
#[derive(Default)]
struct PropertySlot {
    getters: Vec<MethodDecl>,
    setters: Vec<MethodDecl>,
}

impl PropertySlot {
    fn accessors(&self) -> impl Iterator<Item = &MethodDecl> {
        self.getters.iter().chain(self.setters.iter())
    }
}

/// Resolves struct bindings for managed model types.
///
/// Safe to share across threads; repeated calls with an identical input
/// combination return the same immutable result.
pub struct StructBindingEngine {
    provider: Arc<dyn SchemaProvider>,
    cache: RwLock<HashMap<BindingKey, Arc<OnceLock<BindOutcome>>>>,
}

impl StructBindingEngine {
    pub fn new(provider: Arc<dyn SchemaProvider>) -> Self {
        StructBindingEngine {
            provider,
            cache: RwLock::new(HashMap::new()),
        }
    }

    /// Resolve bindings for the given view types and optional delegate.
    ///
    /// `views` must be a non-empty, duplicate-free ordered sequence. On
    /// failure, the error aggregates every violation found in one
    /// complete validation walk.
    pub fn bind(
        &self,
        views: &[ModelType],
        delegate: Option<ModelType>,
    ) -> Result<StructBindings, InvalidManagedType> {
        assert!(!views.is_empty(), "at least one view type is required");

        let key = BindingKey {
            views: views.to_vec(),
            delegate,
        };

        // Look up (or install) the per-key slot under a briefly-held map
        // lock; the computation itself runs outside it, so concurrent
        // binds of distinct keys never serialize.
        let slot = {
            let cache = self.cache.read().unwrap();
            cache.get(&key).cloned()
        };
        let slot = match slot {
            Some(slot) => {
                debug!(primary = %views[0], "struct bindings cache hit");
                slot
            }
            None => {
                let mut cache = self.cache.write().unwrap();
                cache.entry(key).or_default().clone()
            }
        };

        slot.get_or_init(|| self.compute(views, delegate)).clone()
    }

    fn compute(&self, views: &[ModelType], delegate: Option<ModelType>) -> BindOutcome {
        let provider = self.provider.as_ref();
        let primary = views[0];
        debug!(primary = %primary, views = views.len(), "computing struct bindings");

        let mut problems = ProblemCollector::new(primary);

        let view_schemas: Vec<TypeSchema> =
            views.iter().map(|t| provider.schema_for(*t)).collect();
        let delegate_schema = delegate.map(|t| provider.schema_for(t));

        // Only the converged set is retained as declared views, but the
        // full hierarchy is still validated below.
        let declared_views: Vec<TypeSchema> = find_converging_types(views, provider)
            .into_iter()
            .map(|t| provider.schema_for(t))
            .collect();

        let mut visited = HashSet::new();
        for schema in &view_schemas {
            for &ty in schema.supertype_order() {
                if !visited.insert(ty) {
                    continue;
                }
                validate_hierarchy_type(&provider.schema_for(ty), &mut problems);
            }
        }

        if let Some(ds) = &delegate_schema {
            if ds.kind() != TypeKind::Class {
                problems.invalid_delegate(ds.ty(), "it must be a non-abstract type");
            }
            if ds.is_parameterized() {
                problems.invalid_delegate(ds.ty(), "it cannot be a parameterized type");
            }
        }

        let (order, merged) = merge_methods(&view_schemas, provider);

        let delegate_impls: HashMap<MethodSignature, MethodDecl> = delegate_schema
            .iter()
            .flat_map(|s| s.methods().iter())
            .filter(|m| !m.is_abstract)
            .map(|m| (m.signature(), m.clone()))
            .collect();

        let named_views = view_schemas.iter().any(|s| s.has_named_marker());

        let mut bindings: Vec<MethodBinding> = Vec::new();
        let mut prop_order: Vec<Name> = Vec::new();
        let mut props: HashMap<Name, PropertySlot> = HashMap::new();

        for sig in &order {
            let m = &merged[sig];

            if m.visibility != Visibility::Public {
                problems.invalid_method(m, "it must be public");
                continue;
            }

            match classify(m) {
                Classification::Getter { property } => {
                    slot_for(&mut props, &mut prop_order, property)
                        .getters
                        .push(m.clone());
                }
                Classification::Setter { property } => {
                    slot_for(&mut props, &mut prop_order, property)
                        .setters
                        .push(m.clone());
                }
                Classification::Malformed { reason } if m.is_abstract => {
                    problems.invalid_method(m, reason);
                }
                // An implemented method with an accessor-like name but a
                // non-accessor signature is an ordinary method.
                Classification::Malformed { .. } | Classification::NotAccessor => {
                    let delegate_impl = delegate_impls.get(sig);
                    if !m.is_abstract {
                        if let Some(di) = delegate_impl {
                            problems.invalid_method(
                                m,
                                format!(
                                    "it is both implemented by the view '{}' and the delegate type '{}'",
                                    m.declared_by, di.declared_by
                                ),
                            );
                        } else {
                            bindings.push(MethodBinding::Direct(DirectBinding {
                                method: m.clone(),
                            }));
                        }
                    } else if let Some(di) = delegate_impl {
                        bindings.push(MethodBinding::Delegate(DelegateBinding {
                            method: m.clone(),
                            implementation: di.clone(),
                        }));
                    } else {
                        problems.invalid_method(m, "it must have an implementation");
                    }
                }
            }
        }

        let mut managed_properties: Vec<ManagedProperty> = Vec::new();
        for name in &prop_order {
            resolve_property(
                *name,
                &props[name],
                &delegate_impls,
                delegate_schema.as_ref(),
                named_views,
                provider,
                &mut problems,
                &mut bindings,
                &mut managed_properties,
            );
        }

        problems.into_result()?;

        debug!(
            primary = %primary,
            managed = managed_properties.len(),
            bindings = bindings.len(),
            "struct bindings resolved"
        );

        Ok(StructBindings::new(
            declared_views,
            delegate_schema,
            managed_properties,
            bindings,
        ))
    }
}

fn slot_for<'a>(
    props: &'a mut HashMap<Name, PropertySlot>,
    prop_order: &mut Vec<Name>,
    name: Name,
) -> &'a mut PropertySlot {
    if !props.contains_key(&name) {
        prop_order.push(name);
    }
    props.entry(name).or_default()
}

/// Intrinsic well-formedness of one type in a view hierarchy.
fn validate_hierarchy_type(schema: &TypeSchema, problems: &mut ProblemCollector) {
    if !schema.kind().is_abstract() {
        problems.invalid_type(
            schema.ty(),
            "it must be defined as an interface or an abstract class",
        );
    }
    if schema.is_parameterized() {
        problems.invalid_type(schema.ty(), "it cannot be a parameterized type");
    }
    for field in schema.fields() {
        if !field.static_final {
            problems.invalid_field(field, "it must be static and final");
        }
    }
    for ctor in schema.constructors() {
        problems.invalid_constructor(ctor, "custom constructors are not allowed");
    }
}

/// Merge the method space of all view schemas, deduplicated by signature.
/// The most-derived declaration wins; for unrelated declarers an
/// implementation beats an abstract declaration, else first occurrence.
fn merge_methods(
    view_schemas: &[TypeSchema],
    provider: &dyn SchemaProvider,
) -> (Vec<MethodSignature>, HashMap<MethodSignature, MethodDecl>) {
    let mut order: Vec<MethodSignature> = Vec::new();
    let mut merged: HashMap<MethodSignature, MethodDecl> = HashMap::new();

    for schema in view_schemas {
        for m in schema.methods() {
            let sig = m.signature();
            match merged.entry(sig.clone()) {
                Entry::Vacant(e) => {
                    order.push(sig);
                    e.insert(m.clone());
                }
                Entry::Occupied(mut e) => {
                    let kept = e.get();
                    let replace = if kept.declared_by == m.declared_by {
                        false
                    } else if is_assignable_from(provider, kept.declared_by, m.declared_by) {
                        true
                    } else if is_assignable_from(provider, m.declared_by, kept.declared_by) {
                        false
                    } else {
                        kept.is_abstract && !m.is_abstract
                    };
                    if replace {
                        e.insert(m.clone());
                    }
                }
            }
        }
    }

    (order, merged)
}

#[allow(clippy::too_many_arguments)]
fn resolve_property(
    name: Name,
    slot: &PropertySlot,
    delegate_impls: &HashMap<MethodSignature, MethodDecl>,
    delegate_schema: Option<&TypeSchema>,
    named_views: bool,
    provider: &dyn SchemaProvider,
    problems: &mut ProblemCollector,
    bindings: &mut Vec<MethodBinding>,
    managed_properties: &mut Vec<ManagedProperty>,
) {
    let mut ok = true;

    // A view implementation colliding with a delegate implementation of
    // the same signature is reported per method, naming both types.
    for m in slot.accessors() {
        if !m.is_abstract {
            if let Some(di) = delegate_impls.get(&m.signature()) {
                problems.invalid_method(
                    m,
                    format!(
                        "it is both implemented by the view '{}' and the delegate type '{}'",
                        m.declared_by, di.declared_by
                    ),
                );
                ok = false;
            }
        }
    }

    let has_abstract = slot.accessors().any(|m| m.is_abstract);
    let has_implemented = slot.accessors().any(|m| !m.is_abstract);

    if has_abstract && has_implemented {
        problems.invalid_property(
            name,
            "it must have either only abstract accessor methods or only implemented accessor methods",
        );
        ok = false;
    }

    if slot.getters.is_empty() && has_abstract {
        problems.invalid_property(name, "it must both have an abstract getter and a setter");
        ok = false;
    }

    // The first getter's return type governs; every other accessor must
    // agree after primitive/boxed normalization.
    let expected: ValueType = slot
        .getters
        .first()
        .map(|g| g.return_type.clone())
        .unwrap_or_else(|| slot.setters[0].params[0].clone());

    for g in slot.getters.iter().skip(1) {
        if !g.return_type.is_equivalent(&expected) {
            problems.invalid_method(g, format!("it should return '{}'", expected));
            ok = false;
        }
    }
    for s in &slot.setters {
        if !s.params[0].is_equivalent(&expected) {
            problems.invalid_method(
                s,
                format!("it should take a parameter of type '{}'", expected),
            );
            ok = false;
        }
    }

    if expected.is_managed_container() && !slot.setters.is_empty() {
        let kind = expected.container_kind().unwrap_or("managed container");
        problems.invalid_property(
            name,
            format!("it cannot have a setter ({} properties must be read only)", kind),
        );
        ok = false;
    }

    if named_views && name.as_str() == "name" && !slot.setters.is_empty() {
        problems.invalid_property(
            name,
            format!(
                "it must not have a setter, because the type implements '{}'",
                NAMED_MARKER
            ),
        );
        ok = false;
    }

    let unmanaged = slot.getters.iter().any(|g| g.unmanaged);
    if unmanaged {
        if slot.setters.is_empty() {
            problems.invalid_property(
                name,
                "it must not be read only, because it is marked as unmanaged",
            );
            ok = false;
        }
        if let Some(t) = expected.referenced_type() {
            if provider.schema_for(t).is_managed() {
                problems.invalid_property(
                    name,
                    format!(
                        "it is marked as unmanaged, but '{}' is a managed type; please remove the annotation",
                        expected
                    ),
                );
                ok = false;
            }
        }
    }

    if !ok {
        return;
    }

    // Fully implemented in views: the implementations are used verbatim.
    if has_implemented && !has_abstract {
        for m in slot.accessors() {
            bindings.push(MethodBinding::Direct(DirectBinding { method: m.clone() }));
        }
        return;
    }

    // All accessors are abstract here. A delegate must cover the whole
    // accessor set or none of it; splitting strategies within one
    // property is rejected.
    let covered: Vec<bool> = slot
        .accessors()
        .map(|m| delegate_impls.contains_key(&m.signature()))
        .collect();
    if covered.iter().any(|&c| c) {
        if covered.iter().all(|&c| c) {
            for m in slot.accessors() {
                let implementation = delegate_impls[&m.signature()].clone();
                bindings.push(MethodBinding::Delegate(DelegateBinding {
                    method: m.clone(),
                    implementation,
                }));
            }
        } else {
            let delegate_name = delegate_schema
                .map(|s| s.ty().name().as_str())
                .unwrap_or_default();
            problems.invalid_property(
                name,
                format!(
                    "the delegate type '{}' must implement either both accessor methods or neither",
                    delegate_name
                ),
            );
        }
        return;
    }

    // Managed storage backs the property.
    for g in &slot.getters {
        bindings.push(MethodBinding::Managed(ManagedBinding {
            method: g.clone(),
            property: name,
            accessor: AccessorKind::Getter,
        }));
    }
    for s in &slot.setters {
        bindings.push(MethodBinding::Managed(ManagedBinding {
            method: s.clone(),
            property: name,
            accessor: AccessorKind::Setter,
        }));
    }
    managed_properties.push(ManagedProperty {
        name,
        value_type: expected,
        writable: !slot.setters.is_empty(),
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::types::Scalar;
    use crate::model::universe::{MethodSpec, TypeDecl, TypeUniverse};

    fn engine(universe: Arc<TypeUniverse>) -> StructBindingEngine {
        StructBindingEngine::new(universe)
    }

    fn str_property(decl: TypeDecl, property: &str) -> TypeDecl {
        let suffix = {
            let mut c = property.chars();
            let first = c.next().unwrap().to_uppercase().to_string();
            format!("{}{}", first, c.as_str())
        };
        decl.abstract_getter(format!("get{}", suffix), ValueType::Str)
            .abstract_setter(format!("set{}", suffix), ValueType::Str)
    }

    #[test]
    fn test_abstract_pair_binds_managed() {
        let universe = Arc::new(TypeUniverse::new());
        let ty = universe
            .declare(str_property(TypeDecl::interface("PublishingModel"), "repoUrl"))
            .unwrap();

        let bindings = engine(universe).bind(&[ty], None).unwrap();

        assert_eq!(bindings.managed_properties().len(), 1);
        let prop = bindings.managed_property("repoUrl").unwrap();
        assert_eq!(prop.value_type, ValueType::Str);
        assert!(prop.writable);

        assert_eq!(bindings.method_bindings().len(), 2);
        assert!(bindings
            .method_bindings()
            .iter()
            .all(|b| matches!(b, MethodBinding::Managed(_))));
    }

    #[test]
    fn test_implemented_pair_binds_direct() {
        let universe = Arc::new(TypeUniverse::new());
        let ty = universe
            .declare(
                TypeDecl::abstract_class("CachedModel")
                    .getter("getRepoUrl", ValueType::Str)
                    .setter("setRepoUrl", ValueType::Str),
            )
            .unwrap();

        let bindings = engine(universe).bind(&[ty], None).unwrap();

        assert!(bindings.managed_properties().is_empty());
        assert_eq!(bindings.method_bindings().len(), 2);
        assert!(bindings
            .method_bindings()
            .iter()
            .all(|b| matches!(b, MethodBinding::Direct(_))));
    }

    #[test]
    fn test_delegate_pair_binds_delegate() {
        let universe = Arc::new(TypeUniverse::new());
        let view = universe
            .declare(str_property(TypeDecl::interface("PublishingModel"), "repoUrl"))
            .unwrap();
        let delegate = universe
            .declare(
                TypeDecl::class("DefaultPublishingModel")
                    .getter("getRepoUrl", ValueType::Str)
                    .setter("setRepoUrl", ValueType::Str),
            )
            .unwrap();

        let bindings = engine(universe).bind(&[view], Some(delegate)).unwrap();

        assert!(bindings.managed_properties().is_empty());
        assert_eq!(bindings.method_bindings().len(), 2);
        for b in bindings.method_bindings() {
            match b {
                MethodBinding::Delegate(d) => {
                    assert_eq!(d.implementation.declared_by, delegate);
                }
                other => panic!("expected delegate binding, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_view_and_delegate_collision_reported_per_method() {
        let universe = Arc::new(TypeUniverse::new());
        let view = universe
            .declare(
                TypeDecl::abstract_class("CachedModel")
                    .getter("getRepoUrl", ValueType::Str)
                    .setter("setRepoUrl", ValueType::Str),
            )
            .unwrap();
        let delegate = universe
            .declare(
                TypeDecl::class("BackingModel")
                    .getter("getRepoUrl", ValueType::Str)
                    .setter("setRepoUrl", ValueType::Str),
            )
            .unwrap();

        let err = engine(universe).bind(&[view], Some(delegate)).unwrap_err();

        assert_eq!(err.problems().len(), 2);
        for problem in err.problems() {
            assert!(problem.reason.contains("implemented by the view 'CachedModel'"));
            assert!(problem.reason.contains("the delegate type 'BackingModel'"));
        }
    }

    #[test]
    fn test_setter_only_property_rejected() {
        let universe = Arc::new(TypeUniverse::new());
        let ty = universe
            .declare(
                TypeDecl::interface("WriteOnly").abstract_setter("setRepoUrl", ValueType::Str),
            )
            .unwrap();

        let err = engine(universe).bind(&[ty], None).unwrap_err();

        assert_eq!(err.problems().len(), 1);
        assert_eq!(
            err.problems()[0].reason,
            "it must both have an abstract getter and a setter"
        );
    }

    #[test]
    fn test_type_mismatch_names_setter_and_expected_type() {
        let universe = Arc::new(TypeUniverse::new());
        let ty = universe
            .declare(
                TypeDecl::interface("Mismatched")
                    .abstract_getter("getCount", ValueType::Scalar(Scalar::Int))
                    .abstract_setter("setCount", ValueType::Str),
            )
            .unwrap();

        let err = engine(universe).bind(&[ty], None).unwrap_err();

        assert_eq!(err.problems().len(), 1);
        let text = err.problems()[0].to_string();
        assert!(text.contains("Method setCount(String)"), "{}", text);
        assert!(text.contains("it should take a parameter of type 'int'"), "{}", text);
    }

    #[test]
    fn test_parameterized_collection_mismatch_reports_expected_type() {
        let universe = Arc::new(TypeUniverse::new());
        let ty = universe
            .declare(
                TypeDecl::interface("Mismatched")
                    .abstract_getter("getTags", ValueType::List(Box::new(ValueType::Str)))
                    .abstract_setter(
                        "setTags",
                        ValueType::List(Box::new(ValueType::Boxed(Scalar::Int))),
                    ),
            )
            .unwrap();

        let err = engine(universe).bind(&[ty], None).unwrap_err();

        assert_eq!(err.problems().len(), 1);
        assert!(err.problems()[0]
            .reason
            .contains("it should take a parameter of type 'List<String>'"));
    }

    #[test]
    fn test_primitive_boxed_equivalence_for_all_scalars() {
        let scalars = [
            Scalar::Bool,
            Scalar::Char,
            Scalar::Byte,
            Scalar::Short,
            Scalar::Int,
            Scalar::Long,
            Scalar::Float,
            Scalar::Double,
        ];
        for scalar in scalars {
            let universe = Arc::new(TypeUniverse::new());
            let ty = universe
                .declare(
                    TypeDecl::interface("Model")
                        .abstract_getter("getValue", ValueType::Scalar(scalar))
                        .abstract_setter("setValue", ValueType::Boxed(scalar)),
                )
                .unwrap();

            let bindings = engine(universe).bind(&[ty], None).unwrap();
            assert_eq!(
                bindings.managed_properties().len(),
                1,
                "{:?} failed",
                scalar
            );
        }
    }

    #[test]
    fn test_multiple_violations_reported_in_one_pass() {
        let universe = Arc::new(TypeUniverse::new());
        let base = universe
            .declare(
                TypeDecl::abstract_class("Base")
                    .instance_field("counter")
                    .method(
                        MethodSpec::implemented("reset", vec![], ValueType::Void)
                            .with_visibility(Visibility::Private),
                    ),
            )
            .unwrap();
        let root = universe
            .declare(
                TypeDecl::class("BadRoot")
                    .extends(base)
                    .parameterized()
                    .constructor(vec![ValueType::Str]),
            )
            .unwrap();

        let err = engine(universe).bind(&[root], None).unwrap_err();
        let reasons: Vec<String> = err.problems().iter().map(|p| p.to_string()).collect();

        assert_eq!(reasons.len(), 5, "{:?}", reasons);
        // Own-type issues come before inherited ones.
        assert!(reasons[0].contains("Type BadRoot"));
        assert!(reasons[0].contains("interface or an abstract class"));
        assert!(reasons[1].contains("parameterized"));
        assert!(reasons[2].contains("Constructor BadRoot(String)"));
        assert!(reasons[3].contains("Field counter (declared by Base)"));
        assert!(reasons[4].contains("Method reset() (declared by Base)"));
        assert!(reasons[4].contains("it must be public"));
    }

    #[test]
    fn test_abstract_non_accessor_requires_implementation() {
        let universe = Arc::new(TypeUniverse::new());
        let ty = universe
            .declare(TypeDecl::interface("Model").method(MethodSpec::abstract_method(
                "publish",
                vec![],
                ValueType::Void,
            )))
            .unwrap();

        let err = engine(universe).bind(&[ty], None).unwrap_err();
        assert_eq!(err.problems().len(), 1);
        assert_eq!(err.problems()[0].reason, "it must have an implementation");
    }

    #[test]
    fn test_abstract_non_accessor_satisfied_by_delegate() {
        let universe = Arc::new(TypeUniverse::new());
        let view = universe
            .declare(TypeDecl::interface("Model").method(MethodSpec::abstract_method(
                "publish",
                vec![],
                ValueType::Void,
            )))
            .unwrap();
        let delegate = universe
            .declare(TypeDecl::class("Publisher").method(MethodSpec::implemented(
                "publish",
                vec![],
                ValueType::Void,
            )))
            .unwrap();

        let bindings = engine(universe).bind(&[view], Some(delegate)).unwrap();
        assert_eq!(bindings.method_bindings().len(), 1);
        assert!(matches!(
            bindings.method_bindings()[0],
            MethodBinding::Delegate(_)
        ));
    }

    #[test]
    fn test_mixed_abstract_and_implemented_accessors_rejected() {
        let universe = Arc::new(TypeUniverse::new());
        let ty = universe
            .declare(
                TypeDecl::abstract_class("Mixed")
                    .abstract_getter("getRepoUrl", ValueType::Str)
                    .setter("setRepoUrl", ValueType::Str),
            )
            .unwrap();

        let err = engine(universe).bind(&[ty], None).unwrap_err();
        assert_eq!(err.problems().len(), 1);
        assert_eq!(
            err.problems()[0].reason,
            "it must have either only abstract accessor methods or only implemented accessor methods"
        );
    }

    #[test]
    fn test_managed_container_property_cannot_have_setter() {
        let universe = Arc::new(TypeUniverse::new());
        let task = universe.declare(TypeDecl::interface("Task").managed()).unwrap();
        let tasks = ValueType::ManagedMap(Box::new(ValueType::Reference(task)));
        let ty = universe
            .declare(
                TypeDecl::interface("Project")
                    .abstract_getter("getTasks", tasks.clone())
                    .abstract_setter("setTasks", tasks),
            )
            .unwrap();

        let err = engine(universe).bind(&[ty], None).unwrap_err();
        assert_eq!(err.problems().len(), 1);
        assert!(err.problems()[0]
            .reason
            .contains("it cannot have a setter (ManagedMap properties must be read only)"));
    }

    #[test]
    fn test_managed_container_without_setter_is_read_only_managed() {
        let universe = Arc::new(TypeUniverse::new());
        let task = universe.declare(TypeDecl::interface("Task").managed()).unwrap();
        let ty = universe
            .declare(TypeDecl::interface("Project").abstract_getter(
                "getTasks",
                ValueType::ManagedSet(Box::new(ValueType::Reference(task))),
            ))
            .unwrap();

        let bindings = engine(universe).bind(&[ty], None).unwrap();
        let prop = bindings.managed_property("tasks").unwrap();
        assert!(!prop.writable);
    }

    #[test]
    fn test_named_contract_forbids_name_setter() {
        let universe = Arc::new(TypeUniverse::new());
        let named = universe.named_marker();
        let ty = universe
            .declare(
                TypeDecl::interface("Repository")
                    .extends(named)
                    .abstract_setter("setName", ValueType::Str),
            )
            .unwrap();

        let err = engine(universe).bind(&[ty], None).unwrap_err();
        assert_eq!(err.problems().len(), 1);
        assert!(err.problems()[0]
            .reason
            .contains("it must not have a setter, because the type implements 'Named'"));
    }

    #[test]
    fn test_unmanaged_property_must_not_be_read_only() {
        let universe = Arc::new(TypeUniverse::new());
        let ty = universe
            .declare(TypeDecl::interface("Model").unmanaged_getter("getHandle", ValueType::Str))
            .unwrap();

        let err = engine(universe).bind(&[ty], None).unwrap_err();
        assert_eq!(err.problems().len(), 1);
        assert_eq!(
            err.problems()[0].reason,
            "it must not be read only, because it is marked as unmanaged"
        );
    }

    #[test]
    fn test_unmanaged_property_of_managed_type_rejected() {
        let universe = Arc::new(TypeUniverse::new());
        let task = universe.declare(TypeDecl::interface("Task").managed()).unwrap();
        let ty = universe
            .declare(
                TypeDecl::interface("Model")
                    .unmanaged_getter("getTask", ValueType::Reference(task))
                    .abstract_setter("setTask", ValueType::Reference(task)),
            )
            .unwrap();

        let err = engine(universe).bind(&[ty], None).unwrap_err();
        assert_eq!(err.problems().len(), 1);
        assert!(err.problems()[0].reason.contains("please remove the annotation"));
    }

    #[test]
    fn test_subtype_may_add_setter_to_unmanaged_supertype_getter() {
        let universe = Arc::new(TypeUniverse::new());
        let base = universe
            .declare(TypeDecl::interface("Base").unmanaged_getter("getHandle", ValueType::Str))
            .unwrap();
        let sub = universe
            .declare(
                TypeDecl::interface("Sub")
                    .extends(base)
                    .abstract_setter("setHandle", ValueType::Str),
            )
            .unwrap();

        let bindings = engine(universe).bind(&[sub], None).unwrap();
        let prop = bindings.managed_property("handle").unwrap();
        assert!(prop.writable);
    }

    #[test]
    fn test_implemented_method_with_accessor_like_name_binds_direct() {
        let universe = Arc::new(TypeUniverse::new());
        let ty = universe
            .declare(TypeDecl::abstract_class("Helper").method(MethodSpec::implemented(
                "isValid",
                vec![],
                ValueType::Str,
            )))
            .unwrap();

        let bindings = engine(universe).bind(&[ty], None).unwrap();
        assert_eq!(bindings.method_bindings().len(), 1);
        assert!(matches!(
            bindings.method_bindings()[0],
            MethodBinding::Direct(_)
        ));
    }

    #[test]
    fn test_is_getter_must_return_primitive_boolean() {
        let universe = Arc::new(TypeUniverse::new());
        let ty = universe
            .declare(TypeDecl::interface("Model").method(MethodSpec::abstract_method(
                "isEnabled",
                vec![],
                ValueType::Boxed(Scalar::Bool),
            )))
            .unwrap();

        let err = engine(universe).bind(&[ty], None).unwrap_err();
        assert_eq!(err.problems().len(), 1);
        assert!(err.problems()[0]
            .reason
            .contains("it should either return 'boolean', or its name should be 'getEnabled()'"));
    }

    #[test]
    fn test_convergence_reduces_declared_views() {
        let universe = Arc::new(TypeUniverse::new());
        let base = universe
            .declare(str_property(TypeDecl::interface("Base"), "repoUrl"))
            .unwrap();
        let leaf = universe
            .declare(TypeDecl::interface("Leaf").extends(base))
            .unwrap();

        let bindings = engine(universe).bind(&[base, leaf], None).unwrap();

        let views: Vec<&str> = bindings
            .declared_views()
            .iter()
            .map(|s| s.ty().name().as_str())
            .collect();
        assert_eq!(views, vec!["Leaf"]);
        // The merged hierarchy still resolves the inherited property.
        assert!(bindings.managed_property("repoUrl").is_some());
    }

    #[test]
    fn test_partial_delegate_coverage_rejected() {
        let universe = Arc::new(TypeUniverse::new());
        let view = universe
            .declare(str_property(TypeDecl::interface("Model"), "repoUrl"))
            .unwrap();
        let delegate = universe
            .declare(TypeDecl::class("HalfBacking").getter("getRepoUrl", ValueType::Str))
            .unwrap();

        let err = engine(universe).bind(&[view], Some(delegate)).unwrap_err();
        assert_eq!(err.problems().len(), 1);
        assert!(err.problems()[0]
            .reason
            .contains("must implement either both accessor methods or neither"));
    }

    #[test]
    fn test_abstract_delegate_rejected() {
        let universe = Arc::new(TypeUniverse::new());
        let view = universe
            .declare(str_property(TypeDecl::interface("Model"), "repoUrl"))
            .unwrap();
        let delegate = universe
            .declare(TypeDecl::abstract_class("AbstractBacking"))
            .unwrap();

        let err = engine(universe).bind(&[view], Some(delegate)).unwrap_err();
        assert!(err
            .problems()
            .iter()
            .any(|p| p.reason == "it must be a non-abstract type"));
    }

    #[test]
    fn test_identical_inputs_return_identical_results() {
        let universe = Arc::new(TypeUniverse::new());
        let ty = universe
            .declare(str_property(TypeDecl::interface("Model"), "repoUrl"))
            .unwrap();
        let engine = engine(universe);

        let a = engine.bind(&[ty], None).unwrap();
        let b = engine.bind(&[ty], None).unwrap();

        assert_eq!(a.managed_properties().len(), b.managed_properties().len());
        assert_eq!(a.method_bindings().len(), b.method_bindings().len());
        assert_eq!(
            a.method_bindings()[0].signature(),
            b.method_bindings()[0].signature()
        );
    }

    #[test]
    fn test_failure_is_deterministic_across_calls() {
        let universe = Arc::new(TypeUniverse::new());
        let ty = universe
            .declare(TypeDecl::interface("Broken").abstract_setter("setX", ValueType::Str))
            .unwrap();
        let engine = engine(universe);

        let a = engine.bind(&[ty], None).unwrap_err();
        let b = engine.bind(&[ty], None).unwrap_err();
        assert_eq!(a.to_string(), b.to_string());
    }

    #[test]
    fn test_concurrent_binds_agree() {
        let universe = Arc::new(TypeUniverse::new());
        let ty = universe
            .declare(str_property(TypeDecl::interface("Model"), "repoUrl"))
            .unwrap();
        let engine = Arc::new(StructBindingEngine::new(universe));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let engine = Arc::clone(&engine);
                std::thread::spawn(move || engine.bind(&[ty], None).unwrap())
            })
            .collect();

        for handle in handles {
            let bindings = handle.join().unwrap();
            assert_eq!(bindings.managed_properties().len(), 1);
            assert_eq!(bindings.method_bindings().len(), 2);
        }
    }
}
