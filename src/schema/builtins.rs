//! Built-in scalars and directives, plus the structural compatibility check
//! for user schemas that shadow one of them with their own definition.
//!
//! apollo-compiler already injects the built-in definitions at parse time, so
//! this module does not bootstrap anything. It owns the canonical shapes and
//! compares user redefinitions against them during [`CoreSchema::validate`].
//!
//! [`CoreSchema::validate`]: crate::schema::CoreSchema::validate

use apollo_compiler::Name;
use apollo_compiler::Node;
use apollo_compiler::Schema;
use apollo_compiler::ast;
use apollo_compiler::ast::DirectiveDefinition;
use apollo_compiler::ast::DirectiveLocation;
use apollo_compiler::ast::InputValueDefinition;
use apollo_compiler::ast::Value;
use apollo_compiler::name;
use apollo_compiler::schema::ExtendedType;
use apollo_compiler::schema::ObjectType;
use apollo_compiler::schema::ScalarType;
use apollo_compiler::ty;

use crate::error::SchemaError;
use crate::values::value_equals;

pub(crate) const BUILT_IN_SCALARS: [&str; 5] = ["Int", "Float", "String", "Boolean", "ID"];

pub(crate) const BUILT_IN_DIRECTIVES: [&str; 4] = ["include", "skip", "deprecated", "specifiedBy"];

/// Whether `name` is a built-in scalar or an introspection type name.
pub(crate) fn is_built_in_type_name(name: &str) -> bool {
    name.starts_with("__") || BUILT_IN_SCALARS.contains(&name)
}

pub(crate) fn is_built_in_directive_name(name: &str) -> bool {
    BUILT_IN_DIRECTIVES.contains(&name)
}

/// The canonical definition of a built-in directive, or `None` if `name` is
/// not a built-in directive name.
pub(crate) fn built_in_directive_definition(name: &str) -> Option<Node<DirectiveDefinition>> {
    let definition = match name {
        "include" => conditional_directive(name!("include")),
        "skip" => conditional_directive(name!("skip")),
        "deprecated" => DirectiveDefinition {
            description: None,
            name: name!("deprecated"),
            arguments: vec![argument(
                name!("reason"),
                ty!(String),
                Some(Value::String("No longer supported".to_owned())),
            )],
            repeatable: false,
            locations: vec![
                DirectiveLocation::FieldDefinition,
                DirectiveLocation::ArgumentDefinition,
                DirectiveLocation::InputFieldDefinition,
                DirectiveLocation::EnumValue,
            ],
        },
        "specifiedBy" => DirectiveDefinition {
            description: None,
            name: name!("specifiedBy"),
            arguments: vec![argument(name!("url"), ty!(String!), None)],
            repeatable: false,
            locations: vec![DirectiveLocation::Scalar],
        },
        _ => return None,
    };
    Some(Node::new(definition))
}

fn conditional_directive(name: Name) -> DirectiveDefinition {
    DirectiveDefinition {
        description: None,
        name,
        arguments: vec![argument(name!("if"), ty!(Boolean!), None)],
        repeatable: false,
        locations: vec![
            DirectiveLocation::Field,
            DirectiveLocation::FragmentSpread,
            DirectiveLocation::InlineFragment,
        ],
    }
}

fn argument(name: Name, ty: ast::Type, default_value: Option<Value>) -> Node<InputValueDefinition> {
    Node::new(InputValueDefinition {
        description: None,
        name,
        ty: Node::new(ty),
        default_value: default_value.map(Node::new),
        directives: Default::default(),
    })
}

/// Checks every user definition that shadows a built-in type or directive for
/// structural compatibility with the canonical shape.
///
/// Definitions that apollo-compiler itself injected are skipped; only user
/// redefinitions are compared.
pub(crate) fn validate_built_in_redefinitions(schema: &Schema) -> Result<(), SchemaError> {
    for name in BUILT_IN_SCALARS {
        if let Some(ty) = schema.types.get(name) {
            if !ty.is_built_in() {
                let canonical = built_in_type_definition(name).ok_or_else(|| {
                    SchemaError::internal(format!(
                        "No canonical definition for built-in type `{name}`"
                    ))
                })?;
                check_type_redefinition(&canonical, ty)?;
            }
        }
    }
    for name in BUILT_IN_DIRECTIVES {
        if let Some(definition) = schema.directive_definitions.get(name) {
            if !definition.is_built_in() {
                let canonical = built_in_directive_definition(name)
                    .ok_or_else(|| SchemaError::internal(format!(
                        "No canonical definition for built-in directive `@{name}`"
                    )))?;
                check_directive_redefinition(&canonical, definition)?;
            }
        }
    }
    Ok(())
}

/// The canonical definition of a built-in type, or `None` if `name` is not a
/// built-in type name. Every built-in type today is a scalar.
pub(crate) fn built_in_type_definition(name: &str) -> Option<ExtendedType> {
    if !BUILT_IN_SCALARS.contains(&name) {
        return None;
    }
    Some(ExtendedType::Scalar(Node::new(ScalarType {
        description: None,
        name: Name::new(name).ok()?,
        directives: Default::default(),
    })))
}

fn check_type_redefinition(
    canonical: &ExtendedType,
    user: &ExtendedType,
) -> Result<(), SchemaError> {
    match (canonical, user) {
        // Scalars carry no structure, so any scalar redefinition is compatible.
        (ExtendedType::Scalar(_), ExtendedType::Scalar(_)) => Ok(()),
        (ExtendedType::Object(canonical), ExtendedType::Object(user)) => {
            check_object_redefinition(canonical, user)
        }
        _ => Err(SchemaError::BuiltInRedefinition {
            kind: kind_label(canonical),
            name: canonical.name().to_string(),
            message: format!("redefined as {}", kind_name(user)),
        }),
    }
}

fn kind_label(ty: &ExtendedType) -> &'static str {
    match ty {
        ExtendedType::Scalar(_) => "scalar",
        ExtendedType::Object(_) => "object type",
        ExtendedType::Interface(_) => "interface type",
        ExtendedType::Union(_) => "union type",
        ExtendedType::Enum(_) => "enum type",
        ExtendedType::InputObject(_) => "input object type",
    }
}

fn kind_name(ty: &ExtendedType) -> &'static str {
    match ty {
        ExtendedType::Scalar(_) => "a scalar type",
        ExtendedType::Object(_) => "an object type",
        ExtendedType::Interface(_) => "an interface type",
        ExtendedType::Union(_) => "a union type",
        ExtendedType::Enum(_) => "an enum type",
        ExtendedType::InputObject(_) => "an input object type",
    }
}

fn check_directive_redefinition(
    canonical: &DirectiveDefinition,
    user: &DirectiveDefinition,
) -> Result<(), SchemaError> {
    let error = |message: String| SchemaError::BuiltInRedefinition {
        kind: "directive",
        name: canonical.name.to_string(),
        message,
    };
    if canonical.repeatable != user.repeatable {
        return Err(error(format!(
            "it should{} be repeatable",
            if canonical.repeatable { "" } else { " not" },
        )));
    }
    if canonical.locations.len() != user.locations.len()
        || canonical
            .locations
            .iter()
            .any(|location| !user.locations.contains(location))
    {
        return Err(error("it does not have the same locations".to_owned()));
    }
    check_argument_redefinition(&canonical.arguments, &user.arguments, error)
}

/// Compares a redefinition's arguments against the canonical list. Every
/// canonical argument must have a counterpart with the same type and an equal
/// default; extra arguments are allowed if they are nullable or defaulted.
fn check_argument_redefinition(
    canonical: &[Node<InputValueDefinition>],
    user: &[Node<InputValueDefinition>],
    error: impl Fn(String) -> SchemaError,
) -> Result<(), SchemaError> {
    for canonical_argument in canonical {
        let Some(user_argument) = user
            .iter()
            .find(|argument| argument.name == canonical_argument.name)
        else {
            return Err(error(format!(
                "it should have an argument `{}`",
                canonical_argument.name,
            )));
        };
        if *user_argument.ty != *canonical_argument.ty {
            return Err(error(format!(
                "argument `{}` should have type `{}`",
                canonical_argument.name,
                *canonical_argument.ty,
            )));
        }
        let defaults_match = match (&canonical_argument.default_value, &user_argument.default_value)
        {
            (None, None) => true,
            (Some(canonical_default), Some(user_default)) => {
                value_equals(canonical_default, user_default)
            }
            _ => false,
        };
        if !defaults_match {
            return Err(error(format!(
                "argument `{}` does not have the same default value",
                canonical_argument.name,
            )));
        }
    }
    for user_argument in user {
        if canonical
            .iter()
            .all(|argument| argument.name != user_argument.name)
            && user_argument.ty.is_non_null()
            && user_argument.default_value.is_none()
        {
            return Err(error(format!(
                "extra argument `{}` must be nullable or have a default value",
                user_argument.name,
            )));
        }
    }
    Ok(())
}

/// Field-level compatibility for an object type shadowing a built-in one. No
/// built-in object types exist today, but the rule is the same as for
/// directives, with one historical allowance: a canonical non-null field may
/// be redefined nullable.
fn check_object_redefinition(
    canonical: &ObjectType,
    user: &ObjectType,
) -> Result<(), SchemaError> {
    let error = |message: String| SchemaError::BuiltInRedefinition {
        kind: "object type",
        name: canonical.name.to_string(),
        message,
    };
    for (field_name, canonical_field) in &canonical.fields {
        let Some(user_field) = user.fields.get(field_name) else {
            return Err(error(format!("it should have a field `{field_name}`")));
        };
        if user_field.ty != canonical_field.ty
            && !is_nullable_variant_of(&user_field.ty, &canonical_field.ty)
        {
            return Err(error(format!(
                "field `{field_name}` should have type `{}`",
                canonical_field.ty,
            )));
        }
        check_argument_redefinition(&canonical_field.arguments, &user_field.arguments, error)?;
    }
    Ok(())
}

fn is_nullable_variant_of(user: &ast::Type, canonical: &ast::Type) -> bool {
    match canonical {
        ast::Type::NonNullNamed(name) => {
            matches!(user, ast::Type::Named(user_name) if user_name == name)
        }
        ast::Type::NonNullList(inner) => {
            matches!(user, ast::Type::List(user_inner) if **user_inner == **inner)
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use apollo_compiler::schema::Component;
    use apollo_compiler::schema::FieldDefinition;
    use apollo_compiler::collections::IndexMap;

    use super::*;

    fn field(name: Name, ty: ast::Type) -> (Name, Component<FieldDefinition>) {
        (
            name.clone(),
            Component::new(FieldDefinition {
                description: None,
                name,
                arguments: Vec::new(),
                ty,
                directives: Default::default(),
            }),
        )
    }

    fn object_type(name: Name, fields: IndexMap<Name, Component<FieldDefinition>>) -> ObjectType {
        ObjectType {
            description: None,
            name,
            implements_interfaces: Default::default(),
            directives: Default::default(),
            fields,
        }
    }

    #[test]
    fn identical_deprecated_redefinition_is_compatible() {
        let mut schema = Schema::parse("type Query { x: Int }", "schema.graphql").unwrap();
        let redefinition = built_in_directive_definition("deprecated").unwrap();
        schema
            .directive_definitions
            .insert(name!("deprecated"), redefinition);
        assert!(validate_built_in_redefinitions(&schema).is_ok());
    }

    #[test]
    fn changed_default_is_incompatible() {
        let mut schema = Schema::parse("type Query { x: Int }", "schema.graphql").unwrap();
        let mut redefinition = built_in_directive_definition("deprecated")
            .unwrap()
            .as_ref()
            .clone();
        redefinition.arguments = vec![argument(
            name!("reason"),
            ty!(String),
            Some(Value::String("No Longer Supported".to_owned())),
        )];
        schema
            .directive_definitions
            .insert(name!("deprecated"), Node::new(redefinition));
        assert!(matches!(
            validate_built_in_redefinitions(&schema),
            Err(SchemaError::BuiltInRedefinition { .. })
        ));
    }

    #[test]
    fn repeatable_mismatch_is_incompatible() {
        let mut schema = Schema::parse("type Query { x: Int }", "schema.graphql").unwrap();
        let mut redefinition = built_in_directive_definition("skip")
            .unwrap()
            .as_ref()
            .clone();
        redefinition.repeatable = true;
        schema
            .directive_definitions
            .insert(name!("skip"), Node::new(redefinition));
        assert!(validate_built_in_redefinitions(&schema).is_err());
    }

    #[test]
    fn missing_argument_is_incompatible() {
        let mut schema = Schema::parse("type Query { x: Int }", "schema.graphql").unwrap();
        let mut redefinition = built_in_directive_definition("include")
            .unwrap()
            .as_ref()
            .clone();
        redefinition.arguments.clear();
        schema
            .directive_definitions
            .insert(name!("include"), Node::new(redefinition));
        assert!(validate_built_in_redefinitions(&schema).is_err());
    }

    #[test]
    fn extra_required_argument_is_incompatible() {
        let mut schema = Schema::parse("type Query { x: Int }", "schema.graphql").unwrap();
        let mut redefinition = built_in_directive_definition("include")
            .unwrap()
            .as_ref()
            .clone();
        redefinition
            .arguments
            .push(argument(name!("label"), ty!(String!), None));
        schema
            .directive_definitions
            .insert(name!("include"), Node::new(redefinition));
        assert!(validate_built_in_redefinitions(&schema).is_err());

        // The same extra argument is fine once it is nullable.
        let mut redefinition = built_in_directive_definition("include")
            .unwrap()
            .as_ref()
            .clone();
        redefinition
            .arguments
            .push(argument(name!("label"), ty!(String), None));
        schema
            .directive_definitions
            .insert(name!("include"), Node::new(redefinition));
        assert!(validate_built_in_redefinitions(&schema).is_ok());
    }

    #[test]
    fn built_in_scalar_redefined_as_object_is_incompatible() {
        let mut schema = Schema::parse("type Query { x: Int }", "schema.graphql").unwrap();
        schema.types.insert(
            name!("String"),
            ExtendedType::Object(Node::new(object_type(name!("String"), Default::default()))),
        );
        assert!(matches!(
            validate_built_in_redefinitions(&schema),
            Err(SchemaError::BuiltInRedefinition { .. })
        ));
    }

    #[test]
    fn object_redefinition_may_relax_non_null_fields() {
        let canonical = object_type(
            name!("Service"),
            [field(name!("sdl"), ty!(String!))].into_iter().collect(),
        );
        let relaxed = object_type(
            name!("Service"),
            [field(name!("sdl"), ty!(String))].into_iter().collect(),
        );
        assert!(check_object_redefinition(&canonical, &relaxed).is_ok());

        let retyped = object_type(
            name!("Service"),
            [field(name!("sdl"), ty!(Int))].into_iter().collect(),
        );
        assert!(check_object_redefinition(&canonical, &retyped).is_err());

        let missing = object_type(name!("Service"), Default::default());
        assert!(check_object_redefinition(&canonical, &missing).is_err());
    }
}
