//! Core feature metadata: the `@core`/`@link` directive applications on a schema
//! definition, parsed into a queryable model.

use std::collections::HashMap;
use std::fmt;
use std::str;
use std::sync::Arc;

use apollo_compiler::InvalidNameError;
use apollo_compiler::Name;
use apollo_compiler::Node;
use apollo_compiler::ast::Directive;
use apollo_compiler::ast::Value;
use apollo_compiler::name;
use thiserror::Error;

use crate::error::SchemaError;
use crate::link::core_spec_definition::CORE_VERSIONS;
use crate::link::core_spec_definition::CoreSpecDefinition;
use crate::link::core_spec_definition::LINK_VERSIONS;
use crate::link::spec::Identity;
use crate::link::spec::Url;

pub(crate) mod core_spec_definition;
pub mod database;
pub mod spec;
pub(crate) mod spec_definition;

pub const DEFAULT_LINK_NAME: Name = name!("link");
pub const DEFAULT_CORE_NAME: Name = name!("core");

#[derive(Error, Debug, PartialEq)]
pub enum LinkError {
    #[error(transparent)]
    InvalidName(#[from] InvalidNameError),
    #[error("Invalid use of @core/@link in schema: {0}")]
    BootstrapError(String),
}

impl From<LinkError> for SchemaError {
    fn from(value: LinkError) -> Self {
        SchemaError::FeatureError {
            message: value.to_string(),
        }
    }
}

/// The stated purpose of a feature, from the `for:` argument.
#[derive(Eq, PartialEq, Debug)]
pub enum Purpose {
    SECURITY,
    EXECUTION,
}

impl Purpose {
    pub fn from_value(value: &Value) -> Result<Purpose, LinkError> {
        if let Value::Enum(value) = value {
            Ok(value.parse::<Purpose>()?)
        } else {
            Err(LinkError::BootstrapError(
                "invalid `for` value, should be an enum".to_string(),
            ))
        }
    }
}

impl str::FromStr for Purpose {
    type Err = LinkError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "SECURITY" => Ok(Purpose::SECURITY),
            "EXECUTION" => Ok(Purpose::EXECUTION),
            _ => Err(LinkError::BootstrapError(format!(
                "invalid/unrecognized `for` value '{}'",
                s
            ))),
        }
    }
}

impl fmt::Display for Purpose {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Purpose::SECURITY => f.write_str("SECURITY"),
            Purpose::EXECUTION => f.write_str("EXECUTION"),
        }
    }
}

impl From<&Purpose> for Name {
    fn from(value: &Purpose) -> Self {
        match value {
            Purpose::SECURITY => name!("SECURITY"),
            Purpose::EXECUTION => name!("EXECUTION"),
        }
    }
}

/// A single element imported from a feature by `@link(import:)`.
#[derive(Eq, PartialEq, Debug)]
pub struct CoreImport {
    /// The name of the element being imported.
    ///
    /// This never starts with '@': whether this names a directive is carried by
    /// `is_directive` instead.
    pub element: Name,

    /// Whether the imported element is a directive (otherwise it is a type).
    pub is_directive: bool,

    /// The optional alias under which the element is imported.
    pub alias: Option<Name>,
}

impl CoreImport {
    pub fn from_value(value: &Value) -> Result<CoreImport, LinkError> {
        match value {
            Value::String(str) => {
                if let Some(directive_name) = str.strip_prefix('@') {
                    Ok(CoreImport {
                        element: Name::new(directive_name)?,
                        is_directive: true,
                        alias: None,
                    })
                } else {
                    Ok(CoreImport {
                        element: Name::new(str)?,
                        is_directive: false,
                        alias: None,
                    })
                }
            }
            Value::Object(fields) => {
                let mut name: Option<&str> = None;
                let mut alias: Option<&str> = None;
                for (k, v) in fields {
                    match k.as_str() {
                        "name" => {
                            name = Some(v.as_str().ok_or_else(|| {
                                LinkError::BootstrapError("invalid value for `name` field in @link(import:) argument: must be a string".to_string())
                            })?)
                        }
                        "as" => {
                            alias = Some(v.as_str().ok_or_else(|| {
                                LinkError::BootstrapError("invalid value for `as` field in @link(import:) argument: must be a string".to_string())
                            })?)
                        }
                        _ => Err(LinkError::BootstrapError(format!(
                            "unknown field `{k}` in @link(import:) argument"
                        )))?,
                    }
                }
                let Some(element) = name else {
                    return Err(LinkError::BootstrapError(
                        "invalid entry in @link(import:) argument, missing mandatory `name` field"
                            .to_string(),
                    ));
                };
                if let Some(directive_name) = element.strip_prefix('@') {
                    if let Some(alias_str) = alias.as_ref() {
                        let Some(alias_str) = alias_str.strip_prefix('@') else {
                            return Err(LinkError::BootstrapError(format!(
                                "invalid alias '{}' for import name '{}': should start with '@' since the imported name does",
                                alias_str, element
                            )));
                        };
                        alias = Some(alias_str);
                    }
                    Ok(CoreImport {
                        element: Name::new(directive_name)?,
                        is_directive: true,
                        alias: alias.map(Name::new).transpose()?,
                    })
                } else {
                    if let Some(alias) = &alias {
                        if alias.starts_with('@') {
                            return Err(LinkError::BootstrapError(format!(
                                "invalid alias '{}' for import name '{}': should not start with '@' (or, if {} is a directive, then the name should start with '@')",
                                alias, element, element
                            )));
                        }
                    }
                    Ok(CoreImport {
                        element: Name::new(element)?,
                        is_directive: false,
                        alias: alias.map(Name::new).transpose()?,
                    })
                }
            }
            _ => Err(LinkError::BootstrapError(
                "invalid sub-value for @link(import:) argument: values should be either strings or input object values of the form { name: \"<importedElement>\", as: \"<alias>\" }.".to_string()
            )),
        }
    }

    pub fn element_display_name(&self) -> impl fmt::Display + '_ {
        DisplayName {
            name: &self.element,
            is_directive: self.is_directive,
        }
    }

    /// The name under which this element is known in the importing schema.
    pub fn imported_name(&self) -> &Name {
        self.alias.as_ref().unwrap_or(&self.element)
    }

    pub fn imported_display_name(&self) -> impl fmt::Display + '_ {
        DisplayName {
            name: self.imported_name(),
            is_directive: self.is_directive,
        }
    }
}

/// A [`fmt::Display`]able wrapper for name strings that adds an `@` in front for directive names.
struct DisplayName<'s> {
    name: &'s str,
    is_directive: bool,
}

impl fmt::Display for DisplayName<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_directive {
            f.write_str("@")?;
        }
        f.write_str(self.name)
    }
}

impl fmt::Display for CoreImport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.alias.is_some() {
            write!(
                f,
                r#"{{ name: "{}", as: "{}" }}"#,
                self.element_display_name(),
                self.imported_display_name()
            )
        } else {
            write!(f, r#""{}""#, self.imported_display_name())
        }
    }
}

/// One feature activated on a schema by a `@core`/`@link` application.
#[derive(Debug, Eq, PartialEq)]
pub struct CoreFeature {
    pub url: Url,
    pub spec_alias: Option<Name>,
    pub imports: Vec<Arc<CoreImport>>,
    pub purpose: Option<Purpose>,
}

impl CoreFeature {
    /// The name this feature goes by in the schema, accounting for any `as:` alias.
    pub fn spec_name_in_schema(&self) -> &Name {
        self.spec_alias.as_ref().unwrap_or(&self.url.identity.name)
    }

    /// The in-schema name of one of this feature's directives.
    ///
    /// Imported directives go by their imported name; a directive named like the
    /// feature itself goes by the feature name unqualified; anything else is
    /// prefixed with the feature name.
    pub fn directive_name_in_schema(&self, name: &Name) -> Name {
        if let Some(import) = self.imports.iter().find(|i| i.element == *name) {
            import.alias.clone().unwrap_or_else(|| name.clone())
        } else if name == self.url.identity.name.as_str() {
            self.spec_name_in_schema().clone()
        } else {
            // Both sides are `Name`s and we just add valid characters in between.
            Name::new_unchecked(&format!("{}__{}", self.spec_name_in_schema(), name))
        }
    }

    /// The in-schema name of one of this feature's types. Unlike directives, a
    /// type named like the feature itself still gets the prefix.
    pub fn type_name_in_schema(&self, name: &Name) -> Name {
        if let Some(import) = self.imports.iter().find(|i| i.element == *name) {
            import.alias.clone().unwrap_or_else(|| name.clone())
        } else {
            Name::new_unchecked(&format!("{}__{}", self.spec_name_in_schema(), name))
        }
    }

    /// Whether an element name in the schema belongs to this feature by the
    /// prefixing/import conventions.
    pub fn is_feature_definition_name(&self, name: &Name, is_directive: bool) -> bool {
        if name.starts_with(&format!("{}__", self.spec_name_in_schema())) {
            return true;
        }
        if is_directive && name == self.spec_name_in_schema() {
            return true;
        }
        self.imports
            .iter()
            .any(|i| i.is_directive == is_directive && i.imported_name() == name)
    }

    pub fn from_directive_application(directive: &Node<Directive>) -> Result<CoreFeature, LinkError> {
        let (url, is_link) = if let Some(value) = directive.specified_argument_by_name("url") {
            (value, true)
        } else if let Some(value) = directive.specified_argument_by_name("feature") {
            (value, false)
        } else {
            return Err(LinkError::BootstrapError(
                "the `url` argument for @link is mandatory".to_string(),
            ));
        };

        let (directive_name, arg_name) = if is_link {
            ("link", "url")
        } else {
            ("core", "feature")
        };

        let url = url.as_str().ok_or_else(|| {
            LinkError::BootstrapError(format!(
                "the `{arg_name}` argument for @{directive_name} must be a String"
            ))
        })?;
        let url: Url = url.parse::<Url>().map_err(|e| {
            LinkError::BootstrapError(format!("invalid `{arg_name}` argument (reason: {e})"))
        })?;

        let spec_alias = directive
            .specified_argument_by_name("as")
            .and_then(|arg| arg.as_str())
            .map(Name::new)
            .transpose()?;
        let purpose = if let Some(value) = directive.specified_argument_by_name("for") {
            Some(Purpose::from_value(value)?)
        } else {
            None
        };

        // The older @core directive has no import mechanism.
        let imports = if is_link {
            directive
                .specified_argument_by_name("import")
                .and_then(|arg| arg.as_list())
                .unwrap_or(&[])
                .iter()
                .map(|value| Ok(Arc::new(CoreImport::from_value(value)?)))
                .collect::<Result<Vec<Arc<CoreImport>>, LinkError>>()?
        } else {
            Default::default()
        };

        Ok(CoreFeature {
            url,
            spec_alias,
            imports,
            purpose,
        })
    }
}

impl fmt::Display for CoreFeature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let imported_elements: Vec<String> = self
            .imports
            .iter()
            .map(|import| import.to_string())
            .collect::<Vec<String>>();
        let imports = if imported_elements.is_empty() {
            "".to_string()
        } else {
            format!(r#", import: [{}]"#, imported_elements.join(", "))
        };
        let alias = self
            .spec_alias
            .as_ref()
            .map(|a| format!(r#", as: "{}""#, a))
            .unwrap_or("".to_string());
        let purpose = self
            .purpose
            .as_ref()
            .map(|p| format!(r#", for: {}"#, p))
            .unwrap_or("".to_string());
        write!(f, r#"@link(url: "{}"{alias}{imports}{purpose})"#, self.url)
    }
}

/// The feature (and, when applicable, the import) an element came from.
#[derive(Debug)]
pub struct FeatureElement {
    pub feature: Arc<CoreFeature>,
    pub import: Option<Arc<CoreImport>>,
}

/// All features activated on a schema, indexed every way lookups need.
#[derive(Default, Eq, PartialEq, Debug)]
pub struct CoreFeatures {
    pub(crate) features: Vec<Arc<CoreFeature>>,
    pub(crate) by_identity: HashMap<Identity, Arc<CoreFeature>>,
    pub(crate) by_name_in_schema: HashMap<Name, Arc<CoreFeature>>,
    pub(crate) types_by_imported_name: HashMap<Name, (Arc<CoreFeature>, Arc<CoreImport>)>,
    pub(crate) directives_by_imported_name: HashMap<Name, (Arc<CoreFeature>, Arc<CoreImport>)>,
}

impl CoreFeatures {
    /// The specification of the bootstrap `@core`/`@link` directive itself.
    pub(crate) fn core_spec_definition(&self) -> Result<&'static CoreSpecDefinition, LinkError> {
        if let Some(link_feature) = self.for_identity(&Identity::link_identity()) {
            LINK_VERSIONS.get(&link_feature.url.version)
        } else if let Some(core_feature) = self.for_identity(&Identity::core_identity()) {
            CORE_VERSIONS.get(&core_feature.url.version)
        } else {
            Err(LinkError::BootstrapError(
                "unexpectedly could not find the core/link specification among the schema's features"
                    .to_string(),
            ))
        }
    }

    /// The feature that declares the core specification itself.
    pub fn core_itself(&self) -> Option<Arc<CoreFeature>> {
        self.for_identity(&Identity::link_identity())
            .or_else(|| self.for_identity(&Identity::core_identity()))
    }

    pub fn all_features(&self) -> &[Arc<CoreFeature>] {
        self.features.as_ref()
    }

    pub fn for_identity(&self, identity: &Identity) -> Option<Arc<CoreFeature>> {
        self.by_identity.get(identity).cloned()
    }

    /// The feature a type name belongs to, if any. Either an imported name or a
    /// feature-prefixed one.
    pub fn source_feature_of_type(&self, type_name: &Name) -> Option<FeatureElement> {
        if let Some((feature, import)) = self.types_by_imported_name.get(type_name) {
            Some(FeatureElement {
                feature: Arc::clone(feature),
                import: Some(Arc::clone(import)),
            })
        } else {
            type_name.split_once("__").and_then(|(spec_name, _)| {
                self.by_name_in_schema
                    .get(spec_name)
                    .map(|feature| FeatureElement {
                        feature: Arc::clone(feature),
                        import: None,
                    })
            })
        }
    }

    /// The feature a directive name belongs to, if any. An imported name, the
    /// feature's own name (a directive named like its feature), or a
    /// feature-prefixed name.
    pub fn source_feature_of_directive(&self, directive_name: &Name) -> Option<FeatureElement> {
        if let Some((feature, import)) = self.directives_by_imported_name.get(directive_name) {
            return Some(FeatureElement {
                feature: Arc::clone(feature),
                import: Some(Arc::clone(import)),
            });
        }

        if let Some(feature) = self.by_name_in_schema.get(directive_name) {
            return Some(FeatureElement {
                feature: Arc::clone(feature),
                import: None,
            });
        }

        directive_name.split_once("__").and_then(|(spec_name, _)| {
            self.by_name_in_schema
                .get(spec_name)
                .map(|feature| FeatureElement {
                    feature: Arc::clone(feature),
                    import: None,
                })
        })
    }
}
