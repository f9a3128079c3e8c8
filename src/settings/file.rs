//! gantry.toml settings file parsing and schema.
//!
//! The settings file names the root project, the sub-projects that
//! participate in the build, any included builds, and the model type
//! declarations that populate the project's type universe.

use std::path::PathBuf;

use serde::Deserialize;

use crate::model::schema::Visibility;
use crate::model::types::{Scalar, ValueType};
use crate::model::universe::{MethodSpec, TypeDecl, TypeUniverse};
use crate::settings::SettingsError;

/// Top-level schema of a `gantry.toml` file.
#[derive(Debug, Clone, Deserialize)]
pub struct SettingsFile {
    pub settings: SettingsSection,

    /// Model type declarations, in order. Supertypes and referenced
    /// types must be declared earlier in the file (or be built in).
    #[serde(default)]
    pub types: Vec<TypeDeclaration>,
}

/// The `[settings]` table.
#[derive(Debug, Clone, Deserialize)]
pub struct SettingsSection {
    /// Root project name.
    pub root: String,

    /// Sub-project names participating in the build.
    #[serde(default)]
    pub projects: Vec<String>,

    /// Included (composite) build paths, relative to the settings file.
    #[serde(default)]
    pub includes: Vec<PathBuf>,
}

/// One `[[types]]` block.
#[derive(Debug, Clone, Deserialize)]
pub struct TypeDeclaration {
    pub name: String,

    #[serde(default)]
    pub kind: DeclaredKind,

    /// Names of already-declared supertypes.
    #[serde(default)]
    pub extends: Vec<String>,

    /// Whether the type is a managed view contract.
    #[serde(default)]
    pub managed: bool,

    /// Whether the declaration is generic.
    #[serde(default)]
    pub parameterized: bool,

    #[serde(default)]
    pub methods: Vec<MethodDeclaration>,

    #[serde(default)]
    pub fields: Vec<FieldDeclaration>,

    #[serde(default)]
    pub constructors: Vec<ConstructorDeclaration>,
}

#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum DeclaredKind {
    #[default]
    Interface,
    AbstractClass,
    Class,
}

#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum DeclaredVisibility {
    #[default]
    Public,
    Protected,
    Private,
}

/// One `[[types.methods]]` block.
#[derive(Debug, Clone, Deserialize)]
pub struct MethodDeclaration {
    pub name: String,

    /// Return type string; defaults to `void`.
    #[serde(default = "default_void")]
    pub returns: String,

    /// Parameter type strings.
    #[serde(default)]
    pub params: Vec<String>,

    #[serde(default, rename = "abstract")]
    pub is_abstract: bool,

    #[serde(default)]
    pub visibility: DeclaredVisibility,

    #[serde(default)]
    pub unmanaged: bool,
}

fn default_void() -> String {
    "void".to_string()
}

/// One `[[types.fields]]` block.
#[derive(Debug, Clone, Deserialize)]
pub struct FieldDeclaration {
    pub name: String,

    #[serde(default, rename = "static-final")]
    pub static_final: bool,
}

/// One `[[types.constructors]]` block.
#[derive(Debug, Clone, Deserialize)]
pub struct ConstructorDeclaration {
    #[serde(default)]
    pub params: Vec<String>,
}

impl SettingsFile {
    /// Parse a settings file from TOML text.
    pub fn parse(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    /// Populate a fresh universe from the declarations, in file order.
    pub fn build_universe(&self) -> Result<TypeUniverse, SettingsError> {
        let universe = TypeUniverse::new();

        for decl in &self.types {
            let mut td = match decl.kind {
                DeclaredKind::Interface => TypeDecl::interface(decl.name.as_str()),
                DeclaredKind::AbstractClass => TypeDecl::abstract_class(decl.name.as_str()),
                DeclaredKind::Class => TypeDecl::class(decl.name.as_str()),
            };
            if decl.managed {
                td = td.managed();
            }
            if decl.parameterized {
                td = td.parameterized();
            }
            for sup in &decl.extends {
                let sup_ty = universe
                    .get(sup)
                    .ok_or_else(|| SettingsError::UnknownType(sup.clone()))?;
                td = td.extends(sup_ty);
            }
            for m in &decl.methods {
                let params = m
                    .params
                    .iter()
                    .map(|p| parse_value_type(p, &universe))
                    .collect::<Result<Vec<_>, _>>()?;
                let returns = parse_value_type(&m.returns, &universe)?;
                let mut spec = if m.is_abstract {
                    MethodSpec::abstract_method(m.name.as_str(), params, returns)
                } else {
                    MethodSpec::implemented(m.name.as_str(), params, returns)
                };
                spec = spec.with_visibility(match m.visibility {
                    DeclaredVisibility::Public => Visibility::Public,
                    DeclaredVisibility::Protected => Visibility::Protected,
                    DeclaredVisibility::Private => Visibility::Private,
                });
                if m.unmanaged {
                    spec = spec.unmanaged();
                }
                td = td.method(spec);
            }
            for f in &decl.fields {
                td = if f.static_final {
                    td.constant(f.name.as_str())
                } else {
                    td.instance_field(f.name.as_str())
                };
            }
            for c in &decl.constructors {
                let params = c
                    .params
                    .iter()
                    .map(|p| parse_value_type(p, &universe))
                    .collect::<Result<Vec<_>, _>>()?;
                td = td.constructor(params);
            }

            universe.declare(td)?;
        }

        Ok(universe)
    }
}

/// Parse a declared type string into a value type.
///
/// Supported forms: `void`, primitive scalars (`boolean`, `int`, ...),
/// boxed scalars (`Boolean`, `Integer`, ...), `String`, the container
/// forms `List<T>`, `Set<T>`, `ManagedMap<T>`, `ManagedSet<T>`, and the
/// name of any already-declared type.
pub fn parse_value_type(s: &str, universe: &TypeUniverse) -> Result<ValueType, SettingsError> {
    let s = s.trim();

    if s == "void" {
        return Ok(ValueType::Void);
    }
    if s == "String" {
        return Ok(ValueType::Str);
    }
    if let Some(scalar) = primitive_scalar(s) {
        return Ok(ValueType::Scalar(scalar));
    }
    if let Some(scalar) = boxed_scalar(s) {
        return Ok(ValueType::Boxed(scalar));
    }

    for (prefix, build) in [
        ("List<", ValueType::List as fn(Box<ValueType>) -> ValueType),
        ("Set<", ValueType::Set),
        ("ManagedMap<", ValueType::ManagedMap),
        ("ManagedSet<", ValueType::ManagedSet),
    ] {
        if let Some(rest) = s.strip_prefix(prefix) {
            let elem = rest
                .strip_suffix('>')
                .ok_or_else(|| SettingsError::MalformedType(s.to_string()))?;
            return Ok(build(Box::new(parse_value_type(elem, universe)?)));
        }
    }

    if s.chars().all(|c| c.is_alphanumeric() || c == '_') && !s.is_empty() {
        return universe
            .get(s)
            .map(ValueType::Reference)
            .ok_or_else(|| SettingsError::UnknownType(s.to_string()));
    }

    Err(SettingsError::MalformedType(s.to_string()))
}

fn primitive_scalar(s: &str) -> Option<Scalar> {
    Some(match s {
        "boolean" => Scalar::Bool,
        "char" => Scalar::Char,
        "byte" => Scalar::Byte,
        "short" => Scalar::Short,
        "int" => Scalar::Int,
        "long" => Scalar::Long,
        "float" => Scalar::Float,
        "double" => Scalar::Double,
        _ => return None,
    })
}

fn boxed_scalar(s: &str) -> Option<Scalar> {
    Some(match s {
        "Boolean" => Scalar::Bool,
        "Character" => Scalar::Char,
        "Byte" => Scalar::Byte,
        "Short" => Scalar::Short,
        "Integer" => Scalar::Int,
        "Long" => Scalar::Long,
        "Float" => Scalar::Float,
        "Double" => Scalar::Double,
        _ => return None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const EXAMPLE: &str = r#"
        [settings]
        root = "my-app"
        projects = ["core", "cli"]
        includes = ["../shared-build"]

        [[types]]
        name = "Credentials"
        kind = "interface"
        managed = true

        [[types.methods]]
        name = "getToken"
        returns = "String"
        abstract = true

        [[types.methods]]
        name = "setToken"
        params = ["String"]
        abstract = true

        [[types]]
        name = "PublishingModel"
        kind = "interface"
        managed = true
        extends = ["Named"]

        [[types.methods]]
        name = "getCredentials"
        returns = "Credentials"
        abstract = true

        [[types.methods]]
        name = "setCredentials"
        params = ["Credentials"]
        abstract = true
    "#;

    #[test]
    fn test_parse_settings_file() {
        let file = SettingsFile::parse(EXAMPLE).unwrap();

        assert_eq!(file.settings.root, "my-app");
        assert_eq!(file.settings.projects, vec!["core", "cli"]);
        assert_eq!(file.types.len(), 2);
        assert_eq!(file.types[1].extends, vec!["Named"]);
    }

    #[test]
    fn test_build_universe_from_file() {
        let file = SettingsFile::parse(EXAMPLE).unwrap();
        let universe = file.build_universe().unwrap();

        assert!(universe.get("Credentials").is_some());
        assert!(universe.get("PublishingModel").is_some());
        assert_eq!(universe.managed_types().len(), 2);
    }

    #[test]
    fn test_forward_reference_rejected() {
        let file = SettingsFile::parse(
            r#"
            [settings]
            root = "x"

            [[types]]
            name = "Model"

            [[types.methods]]
            name = "getOther"
            returns = "Later"
            abstract = true

            [[types]]
            name = "Later"
        "#,
        )
        .unwrap();

        let err = file.build_universe().unwrap_err();
        assert!(matches!(err, SettingsError::UnknownType(name) if name == "Later"));
    }

    #[test]
    fn test_parse_value_type_forms() {
        let universe = TypeUniverse::new();

        assert_eq!(
            parse_value_type("int", &universe).unwrap(),
            ValueType::Scalar(Scalar::Int)
        );
        assert_eq!(
            parse_value_type("Integer", &universe).unwrap(),
            ValueType::Boxed(Scalar::Int)
        );
        assert_eq!(
            parse_value_type("List<String>", &universe).unwrap(),
            ValueType::List(Box::new(ValueType::Str))
        );
        assert_eq!(
            parse_value_type("ManagedSet<List<int>>", &universe).unwrap(),
            ValueType::ManagedSet(Box::new(ValueType::List(Box::new(ValueType::Scalar(
                Scalar::Int
            )))))
        );
    }

    #[test]
    fn test_parse_value_type_rejects_garbage() {
        let universe = TypeUniverse::new();

        assert!(matches!(
            parse_value_type("List<String", &universe),
            Err(SettingsError::MalformedType(_))
        ));
        assert!(matches!(
            parse_value_type("Nope", &universe),
            Err(SettingsError::UnknownType(_))
        ));
        assert!(matches!(
            parse_value_type("", &universe),
            Err(SettingsError::MalformedType(_))
        ));
    }
}
