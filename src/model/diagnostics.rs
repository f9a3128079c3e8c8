//! Structured binding diagnostics.
//!
//! Rule violations are collected as structured records during one bind
//! call and rendered to display text only at the boundary. The engine
//! always completes its full validation walk before failing, so the
//! caller sees every violation in a single report.

use std::fmt;

use miette::Diagnostic;

use crate::model::schema::{ConstructorDecl, FieldDecl, MethodDecl, MethodSignature};
use crate::model::types::{ModelType, ValueType};
use crate::util::Name;

/// What a violated rule disqualifies the offending member as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Classifier {
    ManagedType,
    DelegateType,
    Method,
    Property,
    Field,
    Constructor,
}

impl fmt::Display for Classifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Classifier::ManagedType => write!(f, "managed type"),
            Classifier::DelegateType => write!(f, "delegate type"),
            Classifier::Method => write!(f, "method"),
            Classifier::Property => write!(f, "property"),
            Classifier::Field => write!(f, "field"),
            Classifier::Constructor => write!(f, "constructor"),
        }
    }
}

/// The offending member a problem is attached to.
///
/// Members carry their declaring type only when it differs from the
/// primary view type under validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProblemContext {
    Type(ModelType),
    Method {
        signature: MethodSignature,
        declared_by: Option<ModelType>,
    },
    Property(Name),
    Field {
        name: Name,
        declared_by: Option<ModelType>,
    },
    Constructor {
        owner: ModelType,
        params: Vec<ValueType>,
    },
}

impl fmt::Display for ProblemContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProblemContext::Type(ty) => write!(f, "Type {}", ty),
            ProblemContext::Method {
                signature,
                declared_by,
            } => {
                write!(f, "Method {}", signature)?;
                if let Some(ty) = declared_by {
                    write!(f, " (declared by {})", ty)?;
                }
                Ok(())
            }
            ProblemContext::Property(name) => write!(f, "Property '{}'", name),
            ProblemContext::Field { name, declared_by } => {
                write!(f, "Field {}", name)?;
                if let Some(ty) = declared_by {
                    write!(f, " (declared by {})", ty)?;
                }
                Ok(())
            }
            ProblemContext::Constructor { owner, params } => {
                write!(f, "Constructor {}(", owner)?;
                for (i, p) in params.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", p)?;
                }
                write!(f, ")")
            }
        }
    }
}

/// One rule violation: context, classifier, reason.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Problem {
    pub context: ProblemContext,
    pub classifier: Classifier,
    pub reason: String,
}

impl fmt::Display for Problem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} is not a valid {}: {}",
            self.context, self.classifier, self.reason
        )
    }
}

/// Accumulates every violation found during one bind call.
#[derive(Debug)]
pub struct ProblemCollector {
    primary: ModelType,
    problems: Vec<Problem>,
}

impl ProblemCollector {
    pub fn new(primary: ModelType) -> Self {
        ProblemCollector {
            primary,
            problems: Vec::new(),
        }
    }

    fn qualify(&self, declared_by: ModelType) -> Option<ModelType> {
        (declared_by != self.primary).then_some(declared_by)
    }

    pub fn invalid_type(&mut self, ty: ModelType, reason: impl Into<String>) {
        self.problems.push(Problem {
            context: ProblemContext::Type(ty),
            classifier: Classifier::ManagedType,
            reason: reason.into(),
        });
    }

    pub fn invalid_delegate(&mut self, ty: ModelType, reason: impl Into<String>) {
        self.problems.push(Problem {
            context: ProblemContext::Type(ty),
            classifier: Classifier::DelegateType,
            reason: reason.into(),
        });
    }

    pub fn invalid_method(&mut self, method: &MethodDecl, reason: impl Into<String>) {
        self.problems.push(Problem {
            context: ProblemContext::Method {
                signature: method.signature(),
                declared_by: self.qualify(method.declared_by),
            },
            classifier: Classifier::Method,
            reason: reason.into(),
        });
    }

    pub fn invalid_property(&mut self, name: Name, reason: impl Into<String>) {
        self.problems.push(Problem {
            context: ProblemContext::Property(name),
            classifier: Classifier::Property,
            reason: reason.into(),
        });
    }

    pub fn invalid_field(&mut self, field: &FieldDecl, reason: impl Into<String>) {
        self.problems.push(Problem {
            context: ProblemContext::Field {
                name: field.name,
                declared_by: self.qualify(field.declared_by),
            },
            classifier: Classifier::Field,
            reason: reason.into(),
        });
    }

    pub fn invalid_constructor(&mut self, ctor: &ConstructorDecl, reason: impl Into<String>) {
        self.problems.push(Problem {
            context: ProblemContext::Constructor {
                owner: ctor.declared_by,
                params: ctor.params.clone(),
            },
            classifier: Classifier::Constructor,
            reason: reason.into(),
        });
    }

    pub fn has_problems(&self) -> bool {
        !self.problems.is_empty()
    }

    /// Fail with the aggregated report if any problem was collected.
    pub fn into_result(self) -> Result<(), InvalidManagedType> {
        if self.problems.is_empty() {
            Ok(())
        } else {
            Err(InvalidManagedType {
                primary: self.primary,
                problems: self.problems,
            })
        }
    }
}

/// The single failure kind of the binding engine: one or more rule
/// violations for a type, aggregated over a complete validation walk.
#[derive(Debug, Clone, Diagnostic)]
#[diagnostic(
    code(gantry::model::invalid_managed_type),
    help("declared model types must follow the managed type contract")
)]
pub struct InvalidManagedType {
    primary: ModelType,
    problems: Vec<Problem>,
}

impl InvalidManagedType {
    /// The primary view type the report is attributed to.
    pub fn primary(&self) -> ModelType {
        self.primary
    }

    /// The collected violations, in discovery order.
    pub fn problems(&self) -> &[Problem] {
        &self.problems
    }
}

impl fmt::Display for InvalidManagedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Type {} is not a valid managed type:", self.primary)?;
        for problem in &self.problems {
            write!(f, "\n- {}", problem)?;
        }
        Ok(())
    }
}

impl std::error::Error for InvalidManagedType {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::universe::{TypeDecl, TypeUniverse};

    fn test_type(universe: &TypeUniverse, name: &str) -> ModelType {
        universe.declare(TypeDecl::interface(name)).unwrap()
    }

    #[test]
    fn test_report_rendering() {
        let universe = TypeUniverse::new();
        let primary = test_type(&universe, "PublishingModel");
        let base = test_type(&universe, "BaseModel");

        let mut collector = ProblemCollector::new(primary);
        collector.invalid_property(Name::new("repoUrl"), "it cannot have a setter");
        collector.invalid_method(
            &MethodDecl {
                name: Name::new("frobnicate"),
                params: vec![],
                return_type: ValueType::Void,
                visibility: crate::model::schema::Visibility::Public,
                is_abstract: true,
                unmanaged: false,
                declared_by: base,
            },
            "it must have an implementation",
        );

        let err = collector.into_result().unwrap_err();
        let text = err.to_string();

        assert_eq!(
            text,
            "Type PublishingModel is not a valid managed type:\n\
             - Property 'repoUrl' is not a valid property: it cannot have a setter\n\
             - Method frobnicate() (declared by BaseModel) is not a valid method: it must have an implementation"
        );
    }

    #[test]
    fn test_own_member_is_not_qualified() {
        let universe = TypeUniverse::new();
        let primary = test_type(&universe, "Model");

        let mut collector = ProblemCollector::new(primary);
        collector.invalid_method(
            &MethodDecl {
                name: Name::new("setThing"),
                params: vec![ValueType::Str],
                return_type: ValueType::Str,
                visibility: crate::model::schema::Visibility::Public,
                is_abstract: true,
                unmanaged: false,
                declared_by: primary,
            },
            "it must have void return type",
        );

        let err = collector.into_result().unwrap_err();
        assert!(err
            .to_string()
            .contains("- Method setThing(String) is not a valid method:"));
        assert!(!err.to_string().contains("declared by"));
    }

    #[test]
    fn test_empty_collector_is_ok() {
        let universe = TypeUniverse::new();
        let primary = test_type(&universe, "Fine");

        let collector = ProblemCollector::new(primary);
        assert!(!collector.has_problems());
        assert!(collector.into_result().is_ok());
    }
}
