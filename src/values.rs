//! Input value handling: coercion to a target type, default filling, deep
//! equality, variable collection and variable/location compatibility.
//!
//! Values are carried as [`apollo_compiler::ast::Value`] literals (which
//! include variable references). All type-directed functions take the schema
//! so named types can be resolved.

use apollo_compiler::Name;
use apollo_compiler::Node;
use apollo_compiler::Schema;
use apollo_compiler::ast::Argument;
use apollo_compiler::ast::Directive;
use apollo_compiler::ast::DirectiveDefinition;
use apollo_compiler::ast::InputValueDefinition;
use apollo_compiler::ast::Type;
use apollo_compiler::ast::Value;
use apollo_compiler::ast::VariableDefinition;
use apollo_compiler::schema::ExtendedType;
use indexmap::IndexMap;
use indexmap::IndexSet;
use itertools::Itertools;

use crate::error::SchemaError;

/// Deep structural equality on value literals.
///
/// Object fields compare as unordered maps; everything else compares
/// positionally.
pub fn value_equals(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Null, Value::Null) => true,
        (Value::Enum(l), Value::Enum(r)) => l == r,
        (Value::Variable(l), Value::Variable(r)) => l == r,
        (Value::String(l), Value::String(r)) => l == r,
        (Value::Float(l), Value::Float(r)) => l == r,
        (Value::Int(l), Value::Int(r)) => l == r,
        (Value::Boolean(l), Value::Boolean(r)) => l == r,
        (Value::List(l), Value::List(r)) => {
            l.len() == r.len() && l.iter().zip(r.iter()).all(|(l, r)| value_equals(l, r))
        }
        (Value::Object(l), Value::Object(r)) => {
            l.len() == r.len()
                && l.iter().all(|(l_name, l_value)| {
                    r.iter()
                        .find(|(r_name, _)| l_name == r_name)
                        .is_some_and(|(_, r_value)| value_equals(l_value, r_value))
                })
        }
        _ => false,
    }
}

/// Whether two directive applications carry the same argument bag, up to
/// argument order and deep value equality.
pub fn same_directive_arguments(left: &Directive, right: &Directive) -> bool {
    if left.arguments.len() != right.arguments.len() {
        return false;
    }
    let right_by_name: IndexMap<&Name, &Node<Value>> = right
        .arguments
        .iter()
        .map(|arg| (&arg.name, &arg.value))
        .collect();
    left.arguments.iter().all(|arg| {
        right_by_name
            .get(&arg.name)
            .is_some_and(|right_value| value_equals(&arg.value, right_value))
    })
}

/// Whether a string is a valid GraphQL integer literal (no leading zeros, no
/// exponent).
fn is_integer_string(s: &str) -> bool {
    let digits = s.strip_prefix('-').unwrap_or(s);
    match digits.as_bytes() {
        [] => false,
        [b'0'] => true,
        [b'0', ..] => false,
        bytes => bytes.iter().all(|b| b.is_ascii_digit()),
    }
}

fn nullable(ty: &Type) -> Type {
    match ty {
        Type::NonNullNamed(name) => Type::Named(name.clone()),
        Type::NonNullList(inner) => Type::List(inner.clone()),
        other => other.clone(),
    }
}

/// Normalizes a value literal against a target type.
///
/// This is where the value representation gets canonicalized: floats with an
/// integral text become ints, strings become enum values for enum targets and
/// int literals for integer-shaped `ID` strings, and input object fields are
/// re-keyed in declaration order. A null reaching a non-null target errors.
pub fn value_to_ast(value: &Value, ty: &Type, schema: &Schema) -> Result<Value, SchemaError> {
    match ty {
        Type::NonNullNamed(_) | Type::NonNullList(_) => {
            let ast = value_to_ast(value, &nullable(ty), schema)?;
            if matches!(ast, Value::Null) {
                return Err(SchemaError::InvalidValue {
                    message: format!("Invalid null value for non-null type \"{ty}\""),
                });
            }
            Ok(ast)
        }
        _ if matches!(value, Value::Null) => Ok(Value::Null),
        _ if matches!(value, Value::Variable(_)) => Ok(value.clone()),
        Type::List(item_ty) => match value {
            Value::List(items) => Ok(Value::List(
                items
                    .iter()
                    .map(|item| Ok(Node::new(value_to_ast(item, item_ty, schema)?)))
                    .collect::<Result<Vec<_>, SchemaError>>()?,
            )),
            // A single value at a list position coerces to its own item.
            _ => value_to_ast(value, item_ty, schema),
        },
        Type::Named(type_name) => match schema.types.get(type_name) {
            Some(ExtendedType::InputObject(input_object)) => {
                let Value::Object(entries) = value else {
                    return Err(SchemaError::InvalidValue {
                        message: format!(
                            "Invalid non-object value for input object type \"{type_name}\""
                        ),
                    });
                };
                let mut fields = Vec::new();
                for (field_name, field) in &input_object.fields {
                    let Some((_, field_value)) =
                        entries.iter().find(|(name, _)| name == field_name)
                    else {
                        continue;
                    };
                    fields.push((
                        field_name.clone(),
                        Node::new(value_to_ast(field_value, &field.ty, schema)?),
                    ));
                }
                Ok(Value::Object(fields))
            }
            Some(ExtendedType::Enum(_)) => match value {
                Value::String(s) => Ok(Value::Enum(Name::new(s)?)),
                _ => Ok(value.clone()),
            },
            _ => Ok(match value {
                Value::Float(f) => {
                    let text = f.to_string();
                    // Integral floats print back as ints.
                    match text.parse::<i32>() {
                        Ok(i) if is_integer_string(&text) => Value::Int(i.into()),
                        _ => value.clone(),
                    }
                }
                Value::String(s) if type_name == "ID" && is_integer_string(s) => {
                    match s.parse::<i32>() {
                        Ok(i) => Value::Int(i.into()),
                        // Values too large for Int stay as strings.
                        Err(_) => value.clone(),
                    }
                }
                _ => value.clone(),
            }),
        },
    }
}

/// The inverse of [`value_to_ast`]: maps a literal back to its canonical
/// internal form for the given target type.
///
/// An int literal at an `ID` position comes back as the equivalent digit
/// string, so a value survives a round trip through [`value_to_ast`]
/// unchanged in meaning.
pub fn value_from_ast(value: &Value, ty: &Type, schema: &Schema) -> Result<Value, SchemaError> {
    match ty {
        Type::NonNullNamed(_) | Type::NonNullList(_) => value_from_ast(value, &nullable(ty), schema),
        Type::List(item_ty) => match value {
            Value::List(items) => Ok(Value::List(
                items
                    .iter()
                    .map(|item| Ok(Node::new(value_from_ast(item, item_ty, schema)?)))
                    .collect::<Result<Vec<_>, SchemaError>>()?,
            )),
            _ => value_from_ast(value, item_ty, schema),
        },
        Type::Named(type_name) => match (schema.types.get(type_name), value) {
            (Some(ExtendedType::InputObject(input_object)), Value::Object(entries)) => {
                let mut fields = Vec::new();
                for (name, field_value) in entries {
                    let converted = match input_object.fields.get(name) {
                        Some(field) => value_from_ast(field_value, &field.ty, schema)?,
                        None => field_value.as_ref().clone(),
                    };
                    fields.push((name.clone(), Node::new(converted)));
                }
                Ok(Value::Object(fields))
            }
            (_, Value::Int(i)) if type_name == "ID" => Ok(Value::String(i.to_string())),
            _ => Ok(value.clone()),
        },
    }
}

/// Recursively fills in the defaults of an input object value's missing
/// fields, erroring on missing required fields and on fields the input type
/// does not define.
pub fn apply_default_values(
    value: &Value,
    ty: &Type,
    schema: &Schema,
) -> Result<Value, SchemaError> {
    if matches!(value, Value::Variable(_)) {
        return Ok(value.clone());
    }
    if matches!(value, Value::Null) {
        if ty.is_non_null() {
            return Err(SchemaError::InvalidValue {
                message: format!("Invalid null value for non-null type \"{ty}\""),
            });
        }
        return Ok(Value::Null);
    }
    match ty {
        Type::NonNullNamed(_) | Type::NonNullList(_) => {
            apply_default_values(value, &nullable(ty), schema)
        }
        Type::List(item_ty) => match value {
            Value::List(items) => Ok(Value::List(
                items
                    .iter()
                    .map(|item| Ok(Node::new(apply_default_values(item, item_ty, schema)?)))
                    .collect::<Result<Vec<_>, SchemaError>>()?,
            )),
            _ => apply_default_values(value, item_ty, schema),
        },
        Type::Named(type_name) => {
            let Some(ExtendedType::InputObject(input_object)) = schema.types.get(type_name) else {
                return Ok(value.clone());
            };
            let Value::Object(entries) = value else {
                return Err(SchemaError::InvalidValue {
                    message: format!("Expected value for type \"{type_name}\" to be an object"),
                });
            };
            let mut updated = Vec::new();
            for (field_name, field) in &input_object.fields {
                match entries.iter().find(|(name, _)| name == field_name) {
                    Some((_, field_value)) => {
                        updated.push((
                            field_name.clone(),
                            Node::new(apply_default_values(field_value, &field.ty, schema)?),
                        ));
                    }
                    None => {
                        if let Some(default) = &field.default_value {
                            updated.push((
                                field_name.clone(),
                                Node::new(apply_default_values(default, &field.ty, schema)?),
                            ));
                        } else if field.ty.is_non_null() {
                            return Err(SchemaError::InvalidValue {
                                message: format!(
                                    "Field \"{}\" of required type \"{}\" was not provided.",
                                    field_name, field.ty
                                ),
                            });
                        }
                    }
                }
            }
            for (name, _) in entries {
                if !input_object.fields.contains_key(name) {
                    let suggestions = suggestion_list(
                        name,
                        input_object.fields.keys().map(|k| k.as_str()),
                    );
                    return Err(SchemaError::InvalidValue {
                        message: format!(
                            "Field \"{}\" is not defined by type \"{}\".{}",
                            name,
                            type_name,
                            did_you_mean(&suggestions)
                        ),
                    });
                }
            }
            Ok(Value::Object(updated))
        }
    }
}

/// Expands a possibly-absent value against its argument or input field
/// definition: an absent value becomes the definition's default (if any), and
/// whatever value results has its own nested defaults filled in.
pub fn with_default_values(
    value: Option<&Value>,
    definition: &InputValueDefinition,
    schema: &Schema,
) -> Result<Option<Value>, SchemaError> {
    let value = match value {
        Some(value) => value,
        None => match &definition.default_value {
            Some(default) => default,
            None => return Ok(None),
        },
    };
    Ok(Some(apply_default_values(value, &definition.ty, schema)?))
}

/// The argument bag of a directive application, keyed by argument name.
pub fn arguments_from_ast(arguments: &[Node<Argument>]) -> IndexMap<Name, Node<Value>> {
    arguments
        .iter()
        .map(|arg| (arg.name.clone(), arg.value.clone()))
        .collect()
}

/// The argument bag of a directive application with the definition's defaults
/// filled in for absent arguments.
pub fn directive_arguments_with_defaults(
    directive: &Directive,
    definition: &DirectiveDefinition,
    schema: &Schema,
) -> Result<IndexMap<Name, Value>, SchemaError> {
    let mut arguments = IndexMap::new();
    for argument_definition in &definition.arguments {
        let provided = directive
            .arguments
            .iter()
            .find(|arg| arg.name == argument_definition.name)
            .map(|arg| arg.value.as_ref());
        if let Some(value) = with_default_values(provided, argument_definition, schema)? {
            arguments.insert(argument_definition.name.clone(), value);
        }
    }
    Ok(arguments)
}

/// Renders a value as GraphQL syntax, normalizing against the target type
/// first when one is provided.
pub fn value_to_string(
    value: &Value,
    ty: Option<&Type>,
    schema: &Schema,
) -> Result<String, SchemaError> {
    match ty {
        Some(ty) => Ok(value_to_ast(value, ty, schema)?.to_string()),
        None => Ok(value.to_string()),
    }
}

/// Whether a value is usable where an argument or input field of this
/// definition is expected, resolving variable references against the provided
/// definitions.
pub fn is_valid_value(
    value: &Value,
    definition: &InputValueDefinition,
    schema: &Schema,
    variables: &VariableDefinitions,
) -> bool {
    is_valid_value_application(
        value,
        &definition.ty,
        definition.default_value.as_deref(),
        schema,
        variables,
    )
}

fn is_valid_value_application(
    value: &Value,
    location_ty: &Type,
    location_default: Option<&Value>,
    schema: &Schema,
    variables: &VariableDefinitions,
) -> bool {
    // Variable usage is checked against the variable's declared type, not the
    // value it may end up holding.
    if let Value::Variable(name) = value {
        return variables
            .get(name)
            .is_some_and(|definition| is_valid_variable(definition, location_ty, location_default));
    }
    if location_ty.is_non_null() {
        return !matches!(value, Value::Null)
            && is_valid_value_application(value, &nullable(location_ty), None, schema, variables);
    }
    if matches!(value, Value::Null) {
        return true;
    }
    match location_ty {
        Type::List(item_ty) => match value {
            Value::List(items) => items
                .iter()
                .all(|item| is_valid_value_application(item, item_ty, None, schema, variables)),
            // Single values coerce to singleton lists.
            _ => is_valid_value_application(value, item_ty, None, schema, variables),
        },
        Type::Named(type_name) => match schema.types.get(type_name) {
            Some(ExtendedType::InputObject(input_object)) => {
                let Value::Object(entries) = value else {
                    return false;
                };
                input_object.fields.iter().all(|(field_name, field)| {
                    match entries.iter().find(|(name, _)| name == field_name) {
                        Some((_, field_value)) => is_valid_value_application(
                            field_value,
                            &field.ty,
                            field.default_value.as_deref(),
                            schema,
                            variables,
                        ),
                        None => field.default_value.is_some() || !field.ty.is_non_null(),
                    }
                })
            }
            Some(ExtendedType::Enum(enum_)) => match value {
                Value::Enum(name) => enum_.values.contains_key(name.as_str()),
                Value::String(name) => enum_.values.contains_key(name.as_str()),
                _ => false,
            },
            Some(ExtendedType::Scalar(_)) => match type_name.as_str() {
                "Int" => matches!(value, Value::Int(_)),
                "Float" => matches!(value, Value::Int(_) | Value::Float(_)),
                "String" => matches!(value, Value::String(_)),
                "Boolean" => matches!(value, Value::Boolean(_)),
                "ID" => matches!(value, Value::Int(_) | Value::String(_)),
                // Custom scalars only accept string literals.
                _ => matches!(value, Value::String(_)),
            },
            _ => false,
        },
        // Non-null wrappers were unwrapped above.
        Type::NonNullNamed(_) | Type::NonNullList(_) => false,
    }
}

/// Whether a variable of this definition may be used at a location of the
/// given type and default.
pub fn is_valid_variable(
    definition: &VariableDefinition,
    location_ty: &Type,
    location_default: Option<&Value>,
) -> bool {
    let variable_ty: &Type = &definition.ty;
    if location_ty.is_non_null() && !variable_ty.is_non_null() {
        // A nullable variable fits a non-null location only when a default
        // exists on one side or the other to fall back on.
        let has_non_null_variable_default = definition
            .default_value
            .as_ref()
            .is_some_and(|default| !matches!(default.as_ref(), Value::Null));
        if !has_non_null_variable_default && location_default.is_none() {
            return false;
        }
        return are_types_compatible(variable_ty, &nullable(location_ty));
    }
    are_types_compatible(variable_ty, location_ty)
}

/// Type compatibility for variable usage: the variable's type must be at
/// least as strict as the location's.
pub fn are_types_compatible(variable_ty: &Type, location_ty: &Type) -> bool {
    if location_ty.is_non_null() {
        return variable_ty.is_non_null()
            && are_types_compatible(&nullable(variable_ty), &nullable(location_ty));
    }
    if variable_ty.is_non_null() {
        return are_types_compatible(&nullable(variable_ty), location_ty);
    }
    match (variable_ty, location_ty) {
        (Type::List(variable_item), Type::List(location_item)) => {
            are_types_compatible(variable_item, location_item)
        }
        (Type::List(_), _) | (_, Type::List(_)) => false,
        (variable_ty, location_ty) => variable_ty == location_ty,
    }
}

/// Collects the names of all variables referenced anywhere in a value.
pub fn variables_in_value(value: &Value, names: &mut IndexSet<Name>) {
    match value {
        Value::Variable(name) => {
            names.insert(name.clone());
        }
        Value::List(items) => {
            for item in items {
                variables_in_value(item, names);
            }
        }
        Value::Object(entries) => {
            for (_, entry) in entries {
                variables_in_value(entry, names);
            }
        }
        _ => {}
    }
}

pub fn variables_in_arguments(arguments: &[Node<Argument>]) -> IndexSet<Name> {
    let mut names = IndexSet::new();
    for argument in arguments {
        variables_in_value(&argument.value, &mut names);
    }
    names
}

/// A name-unique collection of variable definitions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VariableDefinitions {
    definitions: Vec<Node<VariableDefinition>>,
}

impl VariableDefinitions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a collection from raw definitions, checking name uniqueness and
    /// that every variable type is an input type.
    pub fn from_ast(
        definitions: &[Node<VariableDefinition>],
        schema: &Schema,
    ) -> Result<Self, SchemaError> {
        let mut collected = Self::new();
        for definition in definitions {
            if !is_input_type(&definition.ty, schema) {
                return Err(SchemaError::InvalidValue {
                    message: format!(
                        "Invalid type \"{}\" for variable \"${}\": not an input type",
                        definition.ty, definition.name
                    ),
                });
            }
            if !collected.insert(definition.clone()) {
                return Err(SchemaError::InvalidValue {
                    message: format!("Duplicate definition for variable \"${}\"", definition.name),
                });
            }
        }
        Ok(collected)
    }

    /// Adds a definition, returning false when one with the same name already
    /// exists.
    pub fn insert(&mut self, definition: Node<VariableDefinition>) -> bool {
        if self.contains(&definition.name) {
            return false;
        }
        self.definitions.push(definition);
        true
    }

    /// Adds every definition from `other` that is not already present.
    pub fn merge(&mut self, other: &VariableDefinitions) {
        for definition in &other.definitions {
            self.insert(definition.clone());
        }
    }

    pub fn get(&self, name: &str) -> Option<&Node<VariableDefinition>> {
        self.definitions
            .iter()
            .find(|definition| definition.name == name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.is_empty()
    }

    pub fn len(&self) -> usize {
        self.definitions.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Node<VariableDefinition>> {
        self.definitions.iter()
    }

    /// Restricts the collection to the given variables, erroring on a variable
    /// that is not defined here.
    pub fn filter(&self, names: &IndexSet<Name>) -> Result<VariableDefinitions, SchemaError> {
        let mut filtered = Self::new();
        for name in names {
            let definition = self.get(name).ok_or_else(|| SchemaError::InvalidValue {
                message: format!("Cannot find definition for variable \"${name}\""),
            })?;
            filtered.insert(definition.clone());
        }
        Ok(filtered)
    }
}

fn is_input_type(ty: &Type, schema: &Schema) -> bool {
    matches!(
        schema.types.get(ty.inner_named_type()),
        Some(ExtendedType::Scalar(_) | ExtendedType::Enum(_) | ExtendedType::InputObject(_))
    )
}

/// Candidate names lexically close to the input, closest first.
fn suggestion_list<'a>(input: &str, options: impl Iterator<Item = &'a str>) -> Vec<String> {
    let threshold = input.len() / 2 + 1;
    let mut scored: Vec<(usize, String)> = options
        .filter_map(|option| {
            let distance = lexical_distance(input, option);
            (distance <= threshold).then(|| (distance, option.to_string()))
        })
        .collect();
    scored.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(&b.1)));
    scored.into_iter().map(|(_, option)| option).collect()
}

/// Case-insensitive Levenshtein distance, with a distance of 1 for a pure
/// case change.
fn lexical_distance(a: &str, b: &str) -> usize {
    if a == b {
        return 0;
    }
    let a = a.to_lowercase();
    let b = b.to_lowercase();
    if a == b {
        return 1;
    }
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let mut previous: Vec<usize> = (0..=b.len()).collect();
    let mut current = vec![0; b.len() + 1];
    for (i, a_char) in a.iter().enumerate() {
        current[0] = i + 1;
        for (j, b_char) in b.iter().enumerate() {
            let cost = if a_char == b_char { 0 } else { 1 };
            current[j + 1] = (previous[j] + cost)
                .min(previous[j + 1] + 1)
                .min(current[j] + 1);
        }
        std::mem::swap(&mut previous, &mut current);
    }
    previous[b.len()]
}

fn did_you_mean(suggestions: &[String]) -> String {
    if suggestions.is_empty() {
        return String::new();
    }
    format!(
        " Did you mean {}?",
        suggestions
            .iter()
            .take(5)
            .map(|s| format!("\"{s}\""))
            .join(" or ")
    )
}

#[cfg(test)]
mod tests {
    use apollo_compiler::name;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    use super::*;

    fn test_schema() -> Schema {
        Schema::parse(
            r#"
            type Query {
              field(arg: Int = 3, ids: [ID!], shape: Shape): String
            }

            enum Size {
              SMALL
              LARGE
            }

            scalar Json

            input Shape {
              size: Size = SMALL
              label: String!
              tags: [String]
              meta: Json
            }
            "#,
            "values_tests.graphqls",
        )
        .unwrap()
    }

    fn parse_value(text: &str) -> Value {
        // Parsing a field argument is the simplest way to get a value literal.
        let doc = apollo_compiler::ast::Document::parse(
            format!("{{ field(arg: {text}) }}"),
            "value.graphql",
        )
        .unwrap();
        let apollo_compiler::ast::Definition::OperationDefinition(op) = &doc.definitions[0] else {
            panic!("expected an operation");
        };
        let apollo_compiler::ast::Selection::Field(field) = &op.selection_set[0] else {
            panic!("expected a field");
        };
        field.arguments[0].value.as_ref().clone()
    }

    #[test]
    fn object_equality_ignores_field_order() {
        let left = parse_value(r#"{ a: 1, b: "x" }"#);
        let right = parse_value(r#"{ b: "x", a: 1 }"#);
        assert!(value_equals(&left, &right));

        let different = parse_value(r#"{ a: 2, b: "x" }"#);
        assert!(!value_equals(&left, &different));
    }

    #[test]
    fn list_equality_checks_length() {
        assert!(!value_equals(
            &parse_value("[1, 2]"),
            &parse_value("[1, 2, 3]")
        ));
        assert!(value_equals(&parse_value("[1, 2]"), &parse_value("[1, 2]")));
    }

    #[rstest]
    #[case("0", true)]
    #[case("-4", true)]
    #[case("123", true)]
    #[case("04", false)]
    #[case("1.5", false)]
    #[case("", false)]
    #[case("-", false)]
    fn integer_strings(#[case] input: &str, #[case] expected: bool) {
        assert_eq!(is_integer_string(input), expected);
    }

    #[test]
    fn integer_shaped_id_strings_become_int_literals() {
        let schema = test_schema();
        let ty = Type::Named(name!("ID"));
        let converted = value_to_ast(&Value::String("42".to_string()), &ty, &schema).unwrap();
        assert_eq!(converted, Value::Int(42.into()));

        // And convert back to the same string.
        let back = value_from_ast(&converted, &ty, &schema).unwrap();
        assert_eq!(back, Value::String("42".to_string()));
    }

    #[test]
    fn non_integer_id_strings_stay_strings() {
        let schema = test_schema();
        let ty = Type::Named(name!("ID"));
        let value = Value::String("user:42".to_string());
        assert_eq!(value_to_ast(&value, &ty, &schema).unwrap(), value);
        // Too large for Int, kept textual.
        let big = Value::String("123456789123456789".to_string());
        assert_eq!(value_to_ast(&big, &ty, &schema).unwrap(), big);
    }

    #[test]
    fn strings_become_enum_values_for_enum_targets() {
        let schema = test_schema();
        let ty = Type::Named(name!("Size"));
        assert_eq!(
            value_to_ast(&Value::String("SMALL".to_string()), &ty, &schema).unwrap(),
            Value::Enum(name!("SMALL")),
        );
    }

    #[test]
    fn null_is_rejected_at_non_null_positions() {
        let schema = test_schema();
        let ty = Type::NonNullNamed(name!("Int"));
        let error = value_to_ast(&Value::Null, &ty, &schema).unwrap_err();
        assert_eq!(
            error.to_string(),
            "Invalid null value for non-null type \"Int!\""
        );
    }

    #[test]
    fn defaults_are_applied_recursively() {
        let schema = test_schema();
        let ty = Type::Named(name!("Shape"));
        let value = parse_value(r#"{ label: "a" }"#);
        let filled = apply_default_values(&value, &ty, &schema).unwrap();
        assert_eq!(filled, parse_value(r#"{ size: SMALL, label: "a" }"#));
    }

    #[test]
    fn missing_required_fields_error() {
        let schema = test_schema();
        let ty = Type::Named(name!("Shape"));
        let error = apply_default_values(&parse_value("{ size: LARGE }"), &ty, &schema).unwrap_err();
        assert_eq!(
            error.to_string(),
            "Field \"label\" of required type \"String!\" was not provided."
        );
    }

    #[test]
    fn unknown_fields_error_with_suggestions() {
        let schema = test_schema();
        let ty = Type::Named(name!("Shape"));
        let error =
            apply_default_values(&parse_value(r#"{ label: "a", sise: SMALL }"#), &ty, &schema)
                .unwrap_err();
        assert_eq!(
            error.to_string(),
            "Field \"sise\" is not defined by type \"Shape\". Did you mean \"size\"?"
        );
    }

    #[test]
    fn argument_defaults_fill_absent_arguments() {
        let directive_schema = Schema::parse(
            r#"
            type Query { x: Int }
            directive @mark(reason: String = "No longer supported", weight: Int) on FIELD_DEFINITION
            "#,
            "directive.graphqls",
        )
        .unwrap();
        let definition = directive_schema
            .directive_definitions
            .get("mark")
            .unwrap()
            .as_ref();
        let application = Directive {
            name: name!("mark"),
            arguments: vec![],
        };
        let arguments =
            directive_arguments_with_defaults(&application, definition, &directive_schema).unwrap();
        assert_eq!(arguments.len(), 1);
        assert_eq!(
            arguments.get("reason"),
            Some(&Value::String("No longer supported".to_string()))
        );
    }

    #[test]
    fn singleton_values_are_valid_at_list_positions() {
        let schema = test_schema();
        let variables = VariableDefinitions::new();
        let definition = InputValueDefinition {
            description: None,
            name: name!("ids"),
            ty: Node::new(Type::List(Box::new(Type::NonNullNamed(name!("ID"))))),
            default_value: None,
            directives: Default::default(),
        };
        assert!(is_valid_value(
            &Value::String("a".to_string()),
            &definition,
            &schema,
            &variables
        ));
        assert!(is_valid_value(
            &parse_value(r#"["a", "b"]"#),
            &definition,
            &schema,
            &variables
        ));
        assert!(!is_valid_value(
            &parse_value(r#"["a", null]"#),
            &definition,
            &schema,
            &variables
        ));
    }

    #[test]
    fn custom_scalars_only_accept_string_literals() {
        let schema = test_schema();
        let variables = VariableDefinitions::new();
        let definition = InputValueDefinition {
            description: None,
            name: name!("meta"),
            ty: Node::new(Type::Named(name!("Json"))),
            default_value: None,
            directives: Default::default(),
        };
        assert!(is_valid_value(
            &Value::String("{}".to_string()),
            &definition,
            &schema,
            &variables
        ));
        for value in [
            parse_value("true"),
            parse_value("42"),
            parse_value("4.2"),
            parse_value(r#"{ a: 1 }"#),
        ] {
            assert!(!is_valid_value(&value, &definition, &schema, &variables));
        }
    }

    #[test]
    fn variable_type_compatibility() {
        use apollo_compiler::ty;

        // Exact matches are compatible, mismatches are not.
        assert!(are_types_compatible(&ty!(Int), &ty!(Int)));
        assert!(!are_types_compatible(&ty!(Int), &ty!(String)));
        // A non-null variable can flow to a nullable location, not vice versa.
        assert!(are_types_compatible(&ty!(Int!), &ty!(Int)));
        assert!(!are_types_compatible(&ty!(Int), &ty!(Int!)));
        // List nesting must line up.
        assert!(are_types_compatible(&ty!([Int]), &ty!([Int])));
        assert!(are_types_compatible(&ty!([Int!]), &ty!([Int])));
        assert!(!are_types_compatible(&ty!([Int]), &ty!(Int)));
        assert!(!are_types_compatible(&ty!(Int), &ty!([Int])));
    }

    #[test]
    fn nullable_variable_needs_a_default_for_non_null_locations() {
        let schema = test_schema();
        let mut variables = VariableDefinitions::new();
        variables.insert(Node::new(VariableDefinition {
            name: name!("x"),
            ty: Node::new(Type::Named(name!("Int"))),
            default_value: None,
            directives: Default::default(),
        }));
        variables.insert(Node::new(VariableDefinition {
            name: name!("y"),
            ty: Node::new(Type::Named(name!("Int"))),
            default_value: Some(Node::new(Value::Int(0.into()))),
            directives: Default::default(),
        }));

        let required_arg = InputValueDefinition {
            description: None,
            name: name!("arg"),
            ty: Node::new(Type::NonNullNamed(name!("Int"))),
            default_value: None,
            directives: Default::default(),
        };
        assert!(!is_valid_value(
            &Value::Variable(name!("x")),
            &required_arg,
            &schema,
            &variables
        ));
        assert!(is_valid_value(
            &Value::Variable(name!("y")),
            &required_arg,
            &schema,
            &variables
        ));
    }

    #[test]
    fn variables_are_collected_from_nested_values() {
        let value = parse_value(r#"{ a: $one, b: [$two, { c: $one }] }"#);
        let mut names = IndexSet::new();
        variables_in_value(&value, &mut names);
        assert_eq!(
            names.into_iter().collect::<Vec<_>>(),
            vec![name!("one"), name!("two")]
        );
    }

    #[test]
    fn variable_definitions_reject_duplicates_and_output_types() {
        let schema = test_schema();
        let int_var = |name: Name| {
            Node::new(VariableDefinition {
                name,
                ty: Node::new(Type::Named(name!("Int"))),
                default_value: None,
                directives: Default::default(),
            })
        };
        let duplicate =
            VariableDefinitions::from_ast(&[int_var(name!("a")), int_var(name!("a"))], &schema);
        assert_eq!(
            duplicate.unwrap_err().to_string(),
            "Duplicate definition for variable \"$a\""
        );

        let output_typed = VariableDefinitions::from_ast(
            &[Node::new(VariableDefinition {
                name: name!("q"),
                ty: Node::new(Type::Named(name!("Query"))),
                default_value: None,
                directives: Default::default(),
            })],
            &schema,
        );
        assert_eq!(
            output_typed.unwrap_err().to_string(),
            "Invalid type \"Query\" for variable \"$q\": not an input type"
        );
    }

    #[test]
    fn filter_errors_on_unknown_variables() {
        let variables = VariableDefinitions::new();
        let error = variables
            .filter(&IndexSet::from([name!("missing")]))
            .unwrap_err();
        assert_eq!(
            error.to_string(),
            "Cannot find definition for variable \"$missing\""
        );
    }
}
