use std::fmt::Debug;
use std::fmt::Display;
use std::fmt::Formatter;
use std::ops::Deref;

use apollo_compiler::Name;
use apollo_compiler::Node;
use apollo_compiler::Schema;
use apollo_compiler::ast;
use apollo_compiler::name;
use apollo_compiler::schema::Component;
use apollo_compiler::schema::ComponentName;
use apollo_compiler::schema::Directive;
use apollo_compiler::schema::DirectiveDefinition;
use apollo_compiler::schema::EnumType;
use apollo_compiler::schema::EnumValueDefinition;
use apollo_compiler::schema::ExtendedType;
use apollo_compiler::schema::FieldDefinition;
use apollo_compiler::schema::InputObjectType;
use apollo_compiler::schema::InputValueDefinition;
use apollo_compiler::schema::InterfaceType;
use apollo_compiler::schema::ObjectType;
use apollo_compiler::schema::ScalarType;
use apollo_compiler::schema::SchemaDefinition;
use apollo_compiler::schema::UnionType;
use serde::Serialize;
use strum::IntoEnumIterator;

use crate::error::SchemaError;
use crate::error::bail;
use crate::link::database::core_features;
use crate::schema::CoreSchema;
use crate::schema::builtins;
use crate::schema::referencer::DirectiveReferencers;
use crate::schema::referencer::EnumTypeReferencers;
use crate::schema::referencer::InputObjectTypeReferencers;
use crate::schema::referencer::InterfaceTypeReferencers;
use crate::schema::referencer::ObjectTypeReferencers;
use crate::schema::referencer::Referencers;
use crate::schema::referencer::ScalarTypeReferencers;
use crate::schema::referencer::UnionTypeReferencers;

/// A zero-allocation error representation for position lookups,
/// because many of these errors are actually immediately discarded.
#[derive(Debug, thiserror::Error)]
pub enum PositionLookupError {
    #[error("Schema has no directive `{0}`")]
    DirectiveMissing(DirectiveDefinitionPosition),
    #[error("Schema has no type `{0}`")]
    TypeMissing(Name),
    #[error("Schema type `{0}` is not {1}")]
    TypeWrongKind(Name, &'static str),
    #[error("{0} type `{1}` has no field `{2}`")]
    MissingField(&'static str, Name, Name),
    #[error("Directive `{}` has no argument `{}`", .0.directive_name, .0.argument_name)]
    MissingDirectiveArgument(DirectiveArgumentDefinitionPosition),
    #[error("{0} `{1}.{2}` has no argument `{3}`")]
    MissingFieldArgument(&'static str, Name, Name, Name),
    #[error("Enum type `{}` has no value `{}`", .0.type_name, .0.value_name)]
    MissingValue(EnumValueDefinitionPosition),
    #[error("Cannot mutate reserved {0} `{1}.{2}`")]
    MutateReservedField(&'static str, Name, Name),
    #[error("Cannot mutate built-in {0} `{1}`")]
    MutateBuiltIn(&'static str, Name),
}

impl From<PositionLookupError> for SchemaError {
    fn from(value: PositionLookupError) -> Self {
        match value {
            PositionLookupError::TypeMissing(name) => SchemaError::UnknownType {
                name: name.to_string(),
            },
            PositionLookupError::DirectiveMissing(pos) => SchemaError::UnknownDirective {
                name: pos.directive_name.to_string(),
            },
            PositionLookupError::MutateReservedField(kind, type_name, field_name) => {
                SchemaError::BuiltInMutation {
                    coordinate: format!("{kind} {type_name}.{field_name}"),
                }
            }
            PositionLookupError::MutateBuiltIn(kind, name) => SchemaError::BuiltInMutation {
                coordinate: format!("{kind} {name}"),
            },
            other => SchemaError::internal(other.to_string()),
        }
    }
}

/// The error type returned when a position conversion fails.
#[derive(Debug, thiserror::Error)]
#[error("Type `{actual}` was unexpectedly not {expected}")]
pub struct PositionConvertError<T: Debug + Display> {
    actual: T,
    expected: &'static str,
}

impl<T: Debug + Display> From<PositionConvertError<T>> for SchemaError {
    fn from(value: PositionConvertError<T>) -> Self {
        SchemaError::internal(value.to_string())
    }
}

/// To declare a conversion for a `Position::Branch(T) -> T`:
/// ```no_compile
/// fallible_conversions!(TypeDefinition::Scalar -> ScalarTypeDefinition);
/// ```
///
/// To declare a conversion from one enum to another, with a different set of branches:
/// ```no_compile
/// fallible_conversions!(TypeDefinition::{Scalar, Enum, InputObject} -> InputObjectTypeDefinition)
/// ```
macro_rules! fallible_conversions {
    ( $from:ident :: $branch:ident -> $to:ident ) => {
        impl TryFrom<$from> for $to {
            type Error = PositionConvertError<$from>;

            fn try_from(value: $from) -> Result<Self, Self::Error> {
                match value {
                    $from::$branch(value) => Ok(value),
                    _ => Err(PositionConvertError {
                        actual: value,
                        expected: $to::EXPECTED,
                    }),
                }
            }
        }
    };
    ( $from:ident :: { $($branch:ident),+ } -> $to:ident ) => {
        impl TryFrom<$from> for $to {
            type Error = PositionConvertError<$from>;

            fn try_from(value: $from) -> Result<Self, Self::Error> {
                match value {
                    $(
                        $from::$branch(value) => Ok($to::$branch(value)),
                    )+
                    _ => Err(PositionConvertError {
                        actual: value,
                        expected: $to::EXPECTED,
                    }),
                }
            }
        }
    }
}

/// To declare a conversion from a type to a superset type:
/// ```no_compile
/// infallible_conversions!(ObjectOrInterfaceTypeDefinition::{Object, Interface} -> TypeDefinition)
/// ```
macro_rules! infallible_conversions {
    ( $from:ident :: { $($branch:ident),+ } -> $to:ident ) => {
        impl From<$from> for $to {
            fn from(value: $from) -> Self {
                match value {
                    $(
                        $from::$branch(value) => $to::$branch(value)
                    ),+
                }
            }
        }
    }
}

#[derive(Clone, PartialEq, Eq, Hash, derive_more::From, derive_more::Display, Serialize)]
pub enum TypeDefinitionPosition {
    Scalar(ScalarTypeDefinitionPosition),
    Object(ObjectTypeDefinitionPosition),
    Interface(InterfaceTypeDefinitionPosition),
    Union(UnionTypeDefinitionPosition),
    Enum(EnumTypeDefinitionPosition),
    InputObject(InputObjectTypeDefinitionPosition),
}

impl Debug for TypeDefinitionPosition {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Scalar(p) => write!(f, "Scalar({p})"),
            Self::Object(p) => write!(f, "Object({p})"),
            Self::Interface(p) => write!(f, "Interface({p})"),
            Self::Union(p) => write!(f, "Union({p})"),
            Self::Enum(p) => write!(f, "Enum({p})"),
            Self::InputObject(p) => write!(f, "InputObject({p})"),
        }
    }
}

impl TypeDefinitionPosition {
    pub fn is_composite_type(&self) -> bool {
        matches!(
            self,
            TypeDefinitionPosition::Object(_)
                | TypeDefinitionPosition::Interface(_)
                | TypeDefinitionPosition::Union(_)
        )
    }

    pub fn is_introspection_type(&self) -> bool {
        self.type_name().starts_with("__")
    }

    pub fn type_name(&self) -> &Name {
        match self {
            TypeDefinitionPosition::Scalar(type_) => &type_.type_name,
            TypeDefinitionPosition::Object(type_) => &type_.type_name,
            TypeDefinitionPosition::Interface(type_) => &type_.type_name,
            TypeDefinitionPosition::Union(type_) => &type_.type_name,
            TypeDefinitionPosition::Enum(type_) => &type_.type_name,
            TypeDefinitionPosition::InputObject(type_) => &type_.type_name,
        }
    }

    fn describe(&self) -> &'static str {
        match self {
            TypeDefinitionPosition::Scalar(_) => ScalarTypeDefinitionPosition::EXPECTED,
            TypeDefinitionPosition::Object(_) => ObjectTypeDefinitionPosition::EXPECTED,
            TypeDefinitionPosition::Interface(_) => InterfaceTypeDefinitionPosition::EXPECTED,
            TypeDefinitionPosition::Union(_) => UnionTypeDefinitionPosition::EXPECTED,
            TypeDefinitionPosition::Enum(_) => EnumTypeDefinitionPosition::EXPECTED,
            TypeDefinitionPosition::InputObject(_) => InputObjectTypeDefinitionPosition::EXPECTED,
        }
    }

    pub fn get<'schema>(
        &self,
        schema: &'schema Schema,
    ) -> Result<&'schema ExtendedType, PositionLookupError> {
        let name = self.type_name();
        let ty = schema
            .types
            .get(name)
            .ok_or_else(|| PositionLookupError::TypeMissing(name.clone()))?;
        match (ty, self) {
            (ExtendedType::Scalar(_), TypeDefinitionPosition::Scalar(_))
            | (ExtendedType::Object(_), TypeDefinitionPosition::Object(_))
            | (ExtendedType::Interface(_), TypeDefinitionPosition::Interface(_))
            | (ExtendedType::Union(_), TypeDefinitionPosition::Union(_))
            | (ExtendedType::Enum(_), TypeDefinitionPosition::Enum(_))
            | (ExtendedType::InputObject(_), TypeDefinitionPosition::InputObject(_)) => Ok(ty),
            _ => Err(PositionLookupError::TypeWrongKind(
                name.clone(),
                self.describe(),
            )),
        }
    }

    pub fn try_get<'schema>(&self, schema: &'schema Schema) -> Option<&'schema ExtendedType> {
        self.get(schema).ok()
    }

    pub fn pre_insert(&self, schema: &mut CoreSchema) -> Result<(), SchemaError> {
        match self {
            TypeDefinitionPosition::Scalar(type_) => type_.pre_insert(schema),
            TypeDefinitionPosition::Object(type_) => type_.pre_insert(schema),
            TypeDefinitionPosition::Interface(type_) => type_.pre_insert(schema),
            TypeDefinitionPosition::Union(type_) => type_.pre_insert(schema),
            TypeDefinitionPosition::Enum(type_) => type_.pre_insert(schema),
            TypeDefinitionPosition::InputObject(type_) => type_.pre_insert(schema),
        }
    }

    /// Inserts a new empty type with this position's type name into the schema.
    /// This is used during passes where we shallow-copy types from schema to schema.
    pub fn insert_empty(&self, schema: &mut CoreSchema) -> Result<(), SchemaError> {
        match self {
            TypeDefinitionPosition::Scalar(type_) => type_.insert(
                schema,
                Node::new(ScalarType {
                    description: None,
                    name: self.type_name().clone(),
                    directives: Default::default(),
                }),
            ),
            TypeDefinitionPosition::Object(type_) => type_.insert(
                schema,
                Node::new(ObjectType {
                    description: None,
                    name: self.type_name().clone(),
                    implements_interfaces: Default::default(),
                    fields: Default::default(),
                    directives: Default::default(),
                }),
            ),
            TypeDefinitionPosition::Interface(type_) => type_.insert(
                schema,
                Node::new(InterfaceType {
                    description: None,
                    name: self.type_name().clone(),
                    implements_interfaces: Default::default(),
                    fields: Default::default(),
                    directives: Default::default(),
                }),
            ),
            TypeDefinitionPosition::Union(type_) => type_.insert(
                schema,
                Node::new(UnionType {
                    description: None,
                    name: self.type_name().clone(),
                    members: Default::default(),
                    directives: Default::default(),
                }),
            ),
            TypeDefinitionPosition::Enum(type_) => type_.insert(
                schema,
                Node::new(EnumType {
                    description: None,
                    name: self.type_name().clone(),
                    values: Default::default(),
                    directives: Default::default(),
                }),
            ),
            TypeDefinitionPosition::InputObject(type_) => type_.insert(
                schema,
                Node::new(InputObjectType {
                    description: None,
                    name: self.type_name().clone(),
                    fields: Default::default(),
                    directives: Default::default(),
                }),
            ),
        }
    }

    pub fn insert_directive(
        &self,
        schema: &mut CoreSchema,
        directive: Component<Directive>,
    ) -> Result<(), SchemaError> {
        match self {
            TypeDefinitionPosition::Scalar(type_) => type_.insert_directive(schema, directive),
            TypeDefinitionPosition::Object(type_) => type_.insert_directive(schema, directive),
            TypeDefinitionPosition::Interface(type_) => type_.insert_directive(schema, directive),
            TypeDefinitionPosition::Union(type_) => type_.insert_directive(schema, directive),
            TypeDefinitionPosition::Enum(type_) => type_.insert_directive(schema, directive),
            TypeDefinitionPosition::InputObject(type_) => type_.insert_directive(schema, directive),
        }
    }

    pub fn remove_directive_name(&self, schema: &mut CoreSchema, name: &str) {
        match self {
            TypeDefinitionPosition::Scalar(type_) => type_.remove_directive_name(schema, name),
            TypeDefinitionPosition::Object(type_) => type_.remove_directive_name(schema, name),
            TypeDefinitionPosition::Interface(type_) => type_.remove_directive_name(schema, name),
            TypeDefinitionPosition::Union(type_) => type_.remove_directive_name(schema, name),
            TypeDefinitionPosition::Enum(type_) => type_.remove_directive_name(schema, name),
            TypeDefinitionPosition::InputObject(type_) => type_.remove_directive_name(schema, name),
        }
    }

    pub fn rename(&self, schema: &mut CoreSchema, new_name: Name) -> Result<(), SchemaError> {
        match self {
            TypeDefinitionPosition::Scalar(type_) => type_.rename(schema, new_name),
            TypeDefinitionPosition::Object(type_) => type_.rename(schema, new_name),
            TypeDefinitionPosition::Interface(type_) => type_.rename(schema, new_name),
            TypeDefinitionPosition::Union(type_) => type_.rename(schema, new_name),
            TypeDefinitionPosition::Enum(type_) => type_.rename(schema, new_name),
            TypeDefinitionPosition::InputObject(type_) => type_.rename(schema, new_name),
        }
    }

    /// Removes the type and clears every referencing position's slot. Returns
    /// whether the type existed.
    pub fn remove(&self, schema: &mut CoreSchema) -> Result<bool, SchemaError> {
        let is_some = match self {
            TypeDefinitionPosition::Scalar(scalar_pos) => scalar_pos.remove(schema)?.is_some(),
            TypeDefinitionPosition::Enum(enum_pos) => enum_pos.remove(schema)?.is_some(),
            TypeDefinitionPosition::Object(object_pos) => object_pos.remove(schema)?.is_some(),
            TypeDefinitionPosition::Interface(interface_pos) => {
                interface_pos.remove(schema)?.is_some()
            }
            TypeDefinitionPosition::Union(union_pos) => union_pos.remove(schema)?.is_some(),
            TypeDefinitionPosition::InputObject(input_object_pos) => {
                input_object_pos.remove(schema)?.is_some()
            }
        };
        Ok(is_some)
    }

    pub fn remove_recursive(&self, schema: &mut CoreSchema) -> Result<(), SchemaError> {
        match self {
            TypeDefinitionPosition::Scalar(scalar_pos) => {
                // Note: No `remove_recursive` for scalars
                _ = scalar_pos.remove(schema)?;
            }
            TypeDefinitionPosition::Enum(enum_pos) => {
                // Note: No `remove_recursive` for enums
                _ = enum_pos.remove(schema)?;
            }
            TypeDefinitionPosition::Object(object_pos) => {
                object_pos.remove_recursive(schema)?;
            }
            TypeDefinitionPosition::Interface(interface_pos) => {
                interface_pos.remove_recursive(schema)?;
            }
            TypeDefinitionPosition::Union(union_pos) => {
                union_pos.remove_recursive(schema)?;
            }
            TypeDefinitionPosition::InputObject(input_object_pos) => {
                input_object_pos.remove_recursive(schema)?;
            }
        };
        Ok(())
    }
}

impl From<&ExtendedType> for TypeDefinitionPosition {
    fn from(ty: &ExtendedType) -> Self {
        match ty {
            ExtendedType::Scalar(v) => {
                TypeDefinitionPosition::Scalar(ScalarTypeDefinitionPosition {
                    type_name: v.name.clone(),
                })
            }
            ExtendedType::Object(v) => {
                TypeDefinitionPosition::Object(ObjectTypeDefinitionPosition {
                    type_name: v.name.clone(),
                })
            }
            ExtendedType::Interface(v) => {
                TypeDefinitionPosition::Interface(InterfaceTypeDefinitionPosition {
                    type_name: v.name.clone(),
                })
            }
            ExtendedType::Union(v) => TypeDefinitionPosition::Union(UnionTypeDefinitionPosition {
                type_name: v.name.clone(),
            }),
            ExtendedType::Enum(v) => TypeDefinitionPosition::Enum(EnumTypeDefinitionPosition {
                type_name: v.name.clone(),
            }),
            ExtendedType::InputObject(v) => {
                TypeDefinitionPosition::InputObject(InputObjectTypeDefinitionPosition {
                    type_name: v.name.clone(),
                })
            }
        }
    }
}

fallible_conversions!(TypeDefinitionPosition::Scalar -> ScalarTypeDefinitionPosition);
fallible_conversions!(TypeDefinitionPosition::Object -> ObjectTypeDefinitionPosition);
fallible_conversions!(TypeDefinitionPosition::Interface -> InterfaceTypeDefinitionPosition);
fallible_conversions!(TypeDefinitionPosition::Union -> UnionTypeDefinitionPosition);
fallible_conversions!(TypeDefinitionPosition::Enum -> EnumTypeDefinitionPosition);
fallible_conversions!(TypeDefinitionPosition::InputObject -> InputObjectTypeDefinitionPosition);

infallible_conversions!(CompositeTypeDefinitionPosition::{Object, Interface, Union} -> TypeDefinitionPosition);
infallible_conversions!(ObjectOrInterfaceTypeDefinitionPosition::{Object, Interface} -> TypeDefinitionPosition);

#[derive(Clone, PartialEq, Eq, Hash, derive_more::From, derive_more::Display, Serialize)]
pub enum CompositeTypeDefinitionPosition {
    Object(ObjectTypeDefinitionPosition),
    Interface(InterfaceTypeDefinitionPosition),
    Union(UnionTypeDefinitionPosition),
}

impl Debug for CompositeTypeDefinitionPosition {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Object(p) => write!(f, "Object({p})"),
            Self::Interface(p) => write!(f, "Interface({p})"),
            Self::Union(p) => write!(f, "Union({p})"),
        }
    }
}

impl CompositeTypeDefinitionPosition {
    const EXPECTED: &'static str = "a composite type";

    pub fn is_object_type(&self) -> bool {
        matches!(self, CompositeTypeDefinitionPosition::Object(_))
    }

    pub fn is_abstract_type(&self) -> bool {
        !self.is_object_type()
    }

    pub fn type_name(&self) -> &Name {
        match self {
            CompositeTypeDefinitionPosition::Object(type_) => &type_.type_name,
            CompositeTypeDefinitionPosition::Interface(type_) => &type_.type_name,
            CompositeTypeDefinitionPosition::Union(type_) => &type_.type_name,
        }
    }

    fn describe(&self) -> &'static str {
        match self {
            CompositeTypeDefinitionPosition::Object(_) => ObjectTypeDefinitionPosition::EXPECTED,
            CompositeTypeDefinitionPosition::Interface(_) => {
                InterfaceTypeDefinitionPosition::EXPECTED
            }
            CompositeTypeDefinitionPosition::Union(_) => UnionTypeDefinitionPosition::EXPECTED,
        }
    }

    pub fn field(&self, field_name: Name) -> Result<FieldDefinitionPosition, SchemaError> {
        match self {
            CompositeTypeDefinitionPosition::Object(type_) => Ok(type_.field(field_name).into()),
            CompositeTypeDefinitionPosition::Interface(type_) => Ok(type_.field(field_name).into()),
            CompositeTypeDefinitionPosition::Union(type_) => {
                let field = type_.introspection_typename_field();
                if *field.field_name() == field_name {
                    Ok(field.into())
                } else {
                    Err(SchemaError::internal(format!(
                        r#"Union types don't have field "{}", only "{}""#,
                        field_name,
                        field.field_name(),
                    )))
                }
            }
        }
    }

    pub fn introspection_typename_field(&self) -> FieldDefinitionPosition {
        match self {
            CompositeTypeDefinitionPosition::Object(type_) => {
                type_.introspection_typename_field().into()
            }
            CompositeTypeDefinitionPosition::Interface(type_) => {
                type_.introspection_typename_field().into()
            }
            CompositeTypeDefinitionPosition::Union(type_) => {
                type_.introspection_typename_field().into()
            }
        }
    }

    pub fn get<'schema>(
        &self,
        schema: &'schema Schema,
    ) -> Result<&'schema ExtendedType, PositionLookupError> {
        let name = self.type_name();
        let ty = schema
            .types
            .get(name)
            .ok_or_else(|| PositionLookupError::TypeMissing(name.clone()))?;
        match (ty, self) {
            (ExtendedType::Object(_), CompositeTypeDefinitionPosition::Object(_))
            | (ExtendedType::Interface(_), CompositeTypeDefinitionPosition::Interface(_))
            | (ExtendedType::Union(_), CompositeTypeDefinitionPosition::Union(_)) => Ok(ty),
            _ => Err(PositionLookupError::TypeWrongKind(
                name.clone(),
                self.describe(),
            )),
        }
    }
}

fallible_conversions!(CompositeTypeDefinitionPosition::Object -> ObjectTypeDefinitionPosition);
fallible_conversions!(CompositeTypeDefinitionPosition::Interface -> InterfaceTypeDefinitionPosition);
fallible_conversions!(CompositeTypeDefinitionPosition::Union -> UnionTypeDefinitionPosition);
fallible_conversions!(TypeDefinitionPosition::{Object, Interface, Union} -> CompositeTypeDefinitionPosition);

#[derive(Clone, PartialEq, Eq, Hash, derive_more::From, derive_more::Display, Serialize)]
pub enum ObjectOrInterfaceTypeDefinitionPosition {
    Object(ObjectTypeDefinitionPosition),
    Interface(InterfaceTypeDefinitionPosition),
}

impl Debug for ObjectOrInterfaceTypeDefinitionPosition {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Object(p) => write!(f, "Object({p})"),
            Self::Interface(p) => write!(f, "Interface({p})"),
        }
    }
}

impl ObjectOrInterfaceTypeDefinitionPosition {
    const EXPECTED: &'static str = "an object/interface type";

    pub fn type_name(&self) -> &Name {
        match self {
            Self::Object(type_) => &type_.type_name,
            Self::Interface(type_) => &type_.type_name,
        }
    }

    pub fn field(&self, field_name: Name) -> ObjectOrInterfaceFieldDefinitionPosition {
        match self {
            Self::Object(type_) => type_.field(field_name).into(),
            Self::Interface(type_) => type_.field(field_name).into(),
        }
    }
}

fallible_conversions!(TypeDefinitionPosition::{Object, Interface} -> ObjectOrInterfaceTypeDefinitionPosition);
fallible_conversions!(CompositeTypeDefinitionPosition::{Object, Interface} -> ObjectOrInterfaceTypeDefinitionPosition);

#[derive(Clone, PartialEq, Eq, Hash, derive_more::From, derive_more::Display, Serialize)]
pub enum FieldDefinitionPosition {
    Object(ObjectFieldDefinitionPosition),
    Interface(InterfaceFieldDefinitionPosition),
    Union(UnionTypenameFieldDefinitionPosition),
}

impl Debug for FieldDefinitionPosition {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Object(p) => write!(f, "ObjectField({p})"),
            Self::Interface(p) => write!(f, "InterfaceField({p})"),
            Self::Union(p) => write!(f, "UnionField({p})"),
        }
    }
}

impl FieldDefinitionPosition {
    pub fn type_name(&self) -> &Name {
        match self {
            FieldDefinitionPosition::Object(field) => &field.type_name,
            FieldDefinitionPosition::Interface(field) => &field.type_name,
            FieldDefinitionPosition::Union(field) => &field.type_name,
        }
    }

    pub fn field_name(&self) -> &Name {
        match self {
            FieldDefinitionPosition::Object(field) => &field.field_name,
            FieldDefinitionPosition::Interface(field) => &field.field_name,
            FieldDefinitionPosition::Union(field) => field.field_name(),
        }
    }

    pub fn is_introspection_typename_field(&self) -> bool {
        *self.field_name() == *INTROSPECTION_TYPENAME_FIELD_NAME
    }

    pub fn parent(&self) -> CompositeTypeDefinitionPosition {
        match self {
            FieldDefinitionPosition::Object(field) => field.parent().into(),
            FieldDefinitionPosition::Interface(field) => field.parent().into(),
            FieldDefinitionPosition::Union(field) => field.parent().into(),
        }
    }

    pub fn get<'schema>(
        &self,
        schema: &'schema Schema,
    ) -> Result<&'schema Component<FieldDefinition>, PositionLookupError> {
        match self {
            FieldDefinitionPosition::Object(field) => field.get(schema),
            FieldDefinitionPosition::Interface(field) => field.get(schema),
            FieldDefinitionPosition::Union(field) => field.get(schema),
        }
    }

    pub fn try_get<'schema>(
        &self,
        schema: &'schema Schema,
    ) -> Option<&'schema Component<FieldDefinition>> {
        self.get(schema).ok()
    }
}

#[derive(Clone, PartialEq, Eq, Hash, derive_more::From, derive_more::Display, Serialize)]
pub enum ObjectOrInterfaceFieldDefinitionPosition {
    Object(ObjectFieldDefinitionPosition),
    Interface(InterfaceFieldDefinitionPosition),
}

impl Debug for ObjectOrInterfaceFieldDefinitionPosition {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Object(p) => write!(f, "ObjectField({p})"),
            Self::Interface(p) => write!(f, "InterfaceField({p})"),
        }
    }
}

impl ObjectOrInterfaceFieldDefinitionPosition {
    const EXPECTED: &'static str = "an object/interface field";

    pub fn type_name(&self) -> &Name {
        match self {
            Self::Object(field) => &field.type_name,
            Self::Interface(field) => &field.type_name,
        }
    }

    pub fn field_name(&self) -> &Name {
        match self {
            Self::Object(field) => &field.field_name,
            Self::Interface(field) => &field.field_name,
        }
    }

    pub fn parent(&self) -> ObjectOrInterfaceTypeDefinitionPosition {
        match self {
            Self::Object(field) => field.parent().into(),
            Self::Interface(field) => field.parent().into(),
        }
    }

    pub fn get<'schema>(
        &self,
        schema: &'schema Schema,
    ) -> Result<&'schema Component<FieldDefinition>, PositionLookupError> {
        match self {
            Self::Object(field) => field.get(schema),
            Self::Interface(field) => field.get(schema),
        }
    }

    pub fn insert(
        &self,
        schema: &mut CoreSchema,
        field: Component<FieldDefinition>,
    ) -> Result<(), SchemaError> {
        match self {
            Self::Object(pos) => pos.insert(schema, field),
            Self::Interface(pos) => pos.insert(schema, field),
        }
    }

    pub fn remove(&self, schema: &mut CoreSchema) -> Result<(), SchemaError> {
        match self {
            Self::Object(pos) => pos.remove(schema),
            Self::Interface(pos) => pos.remove(schema),
        }
    }

    pub fn insert_directive(
        &self,
        schema: &mut CoreSchema,
        directive: Node<Directive>,
    ) -> Result<(), SchemaError> {
        match self {
            Self::Object(pos) => pos.insert_directive(schema, directive),
            Self::Interface(pos) => pos.insert_directive(schema, directive),
        }
    }

    pub fn remove_directive_name(&self, schema: &mut CoreSchema, name: &str) {
        match self {
            Self::Object(pos) => pos.remove_directive_name(schema, name),
            Self::Interface(pos) => pos.remove_directive_name(schema, name),
        }
    }
}

fallible_conversions!(FieldDefinitionPosition::{Object, Interface} -> ObjectOrInterfaceFieldDefinitionPosition);
infallible_conversions!(ObjectOrInterfaceFieldDefinitionPosition::{Object, Interface} -> FieldDefinitionPosition);

#[derive(Clone, PartialEq, Eq, Hash, Serialize)]
pub struct SchemaDefinitionPosition;

impl SchemaDefinitionPosition {
    pub fn get<'schema>(&self, schema: &'schema Schema) -> &'schema Node<SchemaDefinition> {
        &schema.schema_definition
    }

    fn make_mut<'schema>(
        &self,
        schema: &'schema mut Schema,
    ) -> &'schema mut Node<SchemaDefinition> {
        &mut schema.schema_definition
    }

    pub fn insert_directive(
        &self,
        schema: &mut CoreSchema,
        directive: Component<Directive>,
    ) -> Result<(), SchemaError> {
        let schema_definition = self.make_mut(&mut schema.schema);
        if schema_definition
            .directives
            .iter()
            .any(|other_directive| other_directive.ptr_eq(&directive))
        {
            bail!(
                "Directive application \"@{}\" already exists on schema definition",
                directive.name,
            );
        }
        let name = directive.name.clone();
        self.insert_directive_name_references(&mut schema.referencers, &name)?;
        schema_definition.make_mut().directives.push(directive);
        self.recompute_features_or_roll_back(schema, &name, |directives| {
            directives.pop();
        })
    }

    pub fn insert_directive_at(
        &self,
        schema: &mut CoreSchema,
        directive: Component<Directive>,
        index: usize,
    ) -> Result<(), SchemaError> {
        let schema_definition = self.make_mut(&mut schema.schema);
        if schema_definition
            .directives
            .iter()
            .any(|other_directive| other_directive.ptr_eq(&directive))
        {
            bail!(
                "Directive application \"@{}\" already exists on schema definition",
                directive.name,
            );
        }
        let name = directive.name.clone();
        self.insert_directive_name_references(&mut schema.referencers, &name)?;
        schema_definition
            .make_mut()
            .directives
            .insert(index, directive);
        self.recompute_features_or_roll_back(schema, &name, move |directives| {
            directives.remove(index);
        })
    }

    /// Recomputes the feature metadata after a directive application change.
    /// On failure the application is removed again via `undo` and the
    /// referencer entry is restored, so the schema is left as it was before
    /// the insertion.
    fn recompute_features_or_roll_back(
        &self,
        schema: &mut CoreSchema,
        name: &Name,
        undo: impl FnOnce(&mut Vec<Component<Directive>>),
    ) -> Result<(), SchemaError> {
        match core_features(&schema.schema) {
            Ok(features) => {
                schema.features = features.map(Box::new);
                Ok(())
            }
            Err(error) => {
                let schema_definition = self.make_mut(&mut schema.schema).make_mut();
                undo(&mut schema_definition.directives);
                if !schema_definition
                    .directives
                    .iter()
                    .any(|other_directive| other_directive.name == *name)
                {
                    self.remove_directive_name_references(&mut schema.referencers, name);
                }
                Err(error.into())
            }
        }
    }

    /// Remove a specific directive application from the schema definition. The
    /// feature metadata is recomputed when the removed application is a core or
    /// link directive.
    pub fn remove_directive(
        &self,
        schema: &mut CoreSchema,
        directive: &Component<Directive>,
    ) -> Result<(), SchemaError> {
        let is_core_link = Self::is_core_link(schema, &directive.name);
        let schema_definition = self.make_mut(&mut schema.schema).make_mut();
        let mut other_directives_with_name = false;
        schema_definition.directives.retain(|other_directive| {
            if other_directive.ptr_eq(directive) {
                false
            } else {
                if other_directive.name == directive.name {
                    other_directives_with_name = true;
                }
                true
            }
        });
        if !other_directives_with_name {
            self.remove_directive_name_references(&mut schema.referencers, &directive.name);
        }
        if is_core_link {
            schema.features = core_features(&schema.schema)?.map(Box::new);
        }
        Ok(())
    }

    /// Remove all applications of the named directive from the schema
    /// definition, recomputing feature metadata if it was the core or link
    /// directive.
    pub fn remove_directive_name(
        &self,
        schema: &mut CoreSchema,
        name: &str,
    ) -> Result<(), SchemaError> {
        let is_core_link = Self::is_core_link(schema, name);
        self.remove_directive_name_references(&mut schema.referencers, name);
        self.make_mut(&mut schema.schema)
            .make_mut()
            .directives
            .retain(|other_directive| other_directive.name != name);
        if is_core_link {
            schema.features = core_features(&schema.schema)?.map(Box::new);
        }
        Ok(())
    }

    fn is_core_link(schema: &CoreSchema, name: &str) -> bool {
        match &schema.features {
            Some(features) => match features.core_itself() {
                Some(core) => {
                    core.directive_name_in_schema(&core.url.identity.name).as_str() == name
                }
                None => false,
            },
            None => false,
        }
    }

    fn insert_references(
        &self,
        schema_definition: &Node<SchemaDefinition>,
        schema: &Schema,
        referencers: &mut Referencers,
    ) -> Result<(), SchemaError> {
        validate_component_directives(schema_definition.directives.deref())?;
        for directive_reference in schema_definition.directives.iter() {
            self.insert_directive_name_references(referencers, &directive_reference.name)?;
        }
        for root_kind in SchemaRootDefinitionKind::iter() {
            let child = SchemaRootDefinitionPosition { root_kind };
            match root_kind {
                SchemaRootDefinitionKind::Query => {
                    if let Some(root_type) = &schema_definition.query {
                        child.insert_references(root_type.clone(), schema, referencers)?;
                    }
                }
                SchemaRootDefinitionKind::Mutation => {
                    if let Some(root_type) = &schema_definition.mutation {
                        child.insert_references(root_type.clone(), schema, referencers)?;
                    }
                }
                SchemaRootDefinitionKind::Subscription => {
                    if let Some(root_type) = &schema_definition.subscription {
                        child.insert_references(root_type.clone(), schema, referencers)?;
                    }
                }
            }
        }
        Ok(())
    }

    fn insert_directive_name_references(
        &self,
        referencers: &mut Referencers,
        name: &Name,
    ) -> Result<(), SchemaError> {
        let Some(directive_referencers) = referencers.directives.get_mut(name) else {
            return Err(SchemaError::UnknownDirective {
                name: name.to_string(),
            });
        };
        directive_referencers.schema = Some(SchemaDefinitionPosition);
        Ok(())
    }

    fn remove_directive_name_references(&self, referencers: &mut Referencers, name: &str) {
        let Some(directive_referencers) = referencers.directives.get_mut(name) else {
            return;
        };
        directive_referencers.schema = None;
    }
}

impl Display for SchemaDefinitionPosition {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "schema")
    }
}

impl Debug for SchemaDefinitionPosition {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Schema({self})")
    }
}

#[derive(
    Debug,
    Copy,
    Clone,
    PartialEq,
    Eq,
    Hash,
    strum_macros::Display,
    strum_macros::EnumIter,
    Serialize,
)]
pub enum SchemaRootDefinitionKind {
    #[strum(to_string = "query")]
    Query,
    #[strum(to_string = "mutation")]
    Mutation,
    #[strum(to_string = "subscription")]
    Subscription,
}

impl SchemaRootDefinitionKind {
    /// The root kind a type with this name is conventionally bound to.
    pub fn if_root_name(name: &str) -> Option<Self> {
        match name {
            "Query" => Some(SchemaRootDefinitionKind::Query),
            "Mutation" => Some(SchemaRootDefinitionKind::Mutation),
            "Subscription" => Some(SchemaRootDefinitionKind::Subscription),
            _ => None,
        }
    }
}

impl From<SchemaRootDefinitionKind> for ast::OperationType {
    fn from(value: SchemaRootDefinitionKind) -> Self {
        match value {
            SchemaRootDefinitionKind::Query => ast::OperationType::Query,
            SchemaRootDefinitionKind::Mutation => ast::OperationType::Mutation,
            SchemaRootDefinitionKind::Subscription => ast::OperationType::Subscription,
        }
    }
}

impl From<ast::OperationType> for SchemaRootDefinitionKind {
    fn from(value: ast::OperationType) -> Self {
        match value {
            ast::OperationType::Query => SchemaRootDefinitionKind::Query,
            ast::OperationType::Mutation => SchemaRootDefinitionKind::Mutation,
            ast::OperationType::Subscription => SchemaRootDefinitionKind::Subscription,
        }
    }
}

#[derive(Clone, PartialEq, Eq, Hash, Serialize)]
pub struct SchemaRootDefinitionPosition {
    pub root_kind: SchemaRootDefinitionKind,
}

impl SchemaRootDefinitionPosition {
    pub fn parent(&self) -> SchemaDefinitionPosition {
        SchemaDefinitionPosition
    }

    pub fn get<'schema>(
        &self,
        schema: &'schema Schema,
    ) -> Result<&'schema ComponentName, PositionLookupError> {
        let schema_definition = self.parent().get(schema);

        match self.root_kind {
            SchemaRootDefinitionKind::Query => schema_definition.query.as_ref(),
            SchemaRootDefinitionKind::Mutation => schema_definition.mutation.as_ref(),
            SchemaRootDefinitionKind::Subscription => schema_definition.subscription.as_ref(),
        }
        .ok_or_else(|| {
            PositionLookupError::MissingField(
                "Schema definition",
                name!("schema"),
                Name::new_unchecked(self.root_kind.to_string().as_str()),
            )
        })
    }

    pub fn try_get<'schema>(&self, schema: &'schema Schema) -> Option<&'schema ComponentName> {
        self.get(schema).ok()
    }

    /// Bind this root operation to the given object type. Fails if the root is
    /// already bound or the type does not exist in the schema.
    pub fn insert(&self, schema: &mut CoreSchema, root_type: ComponentName) -> Result<(), SchemaError> {
        if self.try_get(&schema.schema).is_some() {
            return Err(SchemaError::DuplicateName {
                message: format!("Root already has a type `{self}`"),
            });
        }
        let parent = self.parent().make_mut(&mut schema.schema).make_mut();
        match self.root_kind {
            SchemaRootDefinitionKind::Query => parent.query = Some(root_type),
            SchemaRootDefinitionKind::Mutation => parent.mutation = Some(root_type),
            SchemaRootDefinitionKind::Subscription => parent.subscription = Some(root_type),
        }
        self.insert_references(
            self.get(&schema.schema)?.clone(),
            &schema.schema,
            &mut schema.referencers,
        )
    }

    /// Unbind this root operation, leaving the object type in place.
    pub fn remove(&self, schema: &mut CoreSchema) -> Result<(), SchemaError> {
        let Some(root_type) = self.try_get(&schema.schema) else {
            return Ok(());
        };
        self.remove_references(root_type.clone(), &schema.schema, &mut schema.referencers)?;
        let parent = self.parent().make_mut(&mut schema.schema).make_mut();
        match self.root_kind {
            SchemaRootDefinitionKind::Query => parent.query = None,
            SchemaRootDefinitionKind::Mutation => parent.mutation = None,
            SchemaRootDefinitionKind::Subscription => parent.subscription = None,
        }
        Ok(())
    }

    fn insert_references(
        &self,
        root_type: impl Into<ComponentName>,
        schema: &Schema,
        referencers: &mut Referencers,
    ) -> Result<(), SchemaError> {
        let root_type = root_type.into();
        let object_type_referencers = referencers
            .object_types
            .get_mut(root_type.deref())
            .ok_or_else(|| SchemaError::UnknownType {
                name: root_type.to_string(),
            })?;
        object_type_referencers.schema_roots.insert(self.clone());
        if self.root_kind == SchemaRootDefinitionKind::Query {
            ObjectTypeDefinitionPosition {
                type_name: root_type.name,
            }
            .insert_root_query_references(schema, referencers)?;
        }
        Ok(())
    }

    fn remove_references(
        &self,
        root_type: impl Into<ComponentName>,
        schema: &Schema,
        referencers: &mut Referencers,
    ) -> Result<(), SchemaError> {
        let root_type = root_type.into();
        if self.root_kind == SchemaRootDefinitionKind::Query {
            ObjectTypeDefinitionPosition {
                type_name: root_type.name.clone(),
            }
            .remove_root_query_references(schema, referencers)?;
        }
        let Some(object_type_referencers) = referencers.object_types.get_mut(root_type.deref())
        else {
            return Ok(());
        };
        object_type_referencers.schema_roots.shift_remove(self);
        Ok(())
    }

    /// Point this root at a renamed type. Only the schema definition's slot is
    /// rewritten, registry bookkeeping happens at the type's `rename`.
    fn rename_type(&self, schema: &mut Schema, new_name: Name) -> Result<(), PositionLookupError> {
        let origin = self.get(schema)?.origin.clone();
        let parent = self.parent().make_mut(schema).make_mut();
        let renamed = ComponentName {
            origin,
            name: new_name,
        };
        match self.root_kind {
            SchemaRootDefinitionKind::Query => parent.query = Some(renamed),
            SchemaRootDefinitionKind::Mutation => parent.mutation = Some(renamed),
            SchemaRootDefinitionKind::Subscription => parent.subscription = Some(renamed),
        }
        Ok(())
    }
}

impl Display for SchemaRootDefinitionPosition {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "schema.{}", self.root_kind)
    }
}

impl Debug for SchemaRootDefinitionPosition {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "SchemaRoot({self})")
    }
}

#[derive(Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ScalarTypeDefinitionPosition {
    pub type_name: Name,
}

impl ScalarTypeDefinitionPosition {
    const EXPECTED: &'static str = "a scalar type";
    const KIND: &'static str = "scalar type";

    pub fn get<'schema>(
        &self,
        schema: &'schema Schema,
    ) -> Result<&'schema Node<ScalarType>, PositionLookupError> {
        schema
            .types
            .get(&self.type_name)
            .ok_or_else(|| PositionLookupError::TypeMissing(self.type_name.clone()))
            .and_then(|type_| {
                if let ExtendedType::Scalar(type_) = type_ {
                    Ok(type_)
                } else {
                    Err(PositionLookupError::TypeWrongKind(
                        self.type_name.clone(),
                        Self::EXPECTED,
                    ))
                }
            })
    }

    pub fn try_get<'schema>(&self, schema: &'schema Schema) -> Option<&'schema Node<ScalarType>> {
        self.get(schema).ok()
    }

    fn make_mut<'schema>(
        &self,
        schema: &'schema mut Schema,
    ) -> Result<&'schema mut Node<ScalarType>, PositionLookupError> {
        if builtins::is_built_in_type_name(&self.type_name) {
            return Err(PositionLookupError::MutateBuiltIn(
                Self::KIND,
                self.type_name.clone(),
            ));
        }
        schema
            .types
            .get_mut(&self.type_name)
            .ok_or_else(|| PositionLookupError::TypeMissing(self.type_name.clone()))
            .and_then(|type_| {
                if let ExtendedType::Scalar(type_) = type_ {
                    Ok(type_)
                } else {
                    Err(PositionLookupError::TypeWrongKind(
                        self.type_name.clone(),
                        Self::EXPECTED,
                    ))
                }
            })
    }

    fn try_make_mut<'schema>(
        &self,
        schema: &'schema mut Schema,
    ) -> Option<&'schema mut Node<ScalarType>> {
        if self.try_get(schema).is_some() {
            self.make_mut(schema).ok()
        } else {
            None
        }
    }

    pub fn pre_insert(&self, schema: &mut CoreSchema) -> Result<(), SchemaError> {
        if schema.referencers.contains_type_name(&self.type_name) {
            return Err(SchemaError::DuplicateName {
                message: format!("Type `{self}` already exists in schema"),
            });
        }
        schema
            .referencers
            .scalar_types
            .insert(self.type_name.clone(), Default::default());
        Ok(())
    }

    pub fn insert(&self, schema: &mut CoreSchema, type_: Node<ScalarType>) -> Result<(), SchemaError> {
        if self.type_name != type_.name {
            bail!(
                "Scalar type \"{}\" given type named \"{}\"",
                self,
                type_.name,
            );
        }
        if !schema.referencers.scalar_types.contains_key(&self.type_name) {
            bail!("Type \"{}\" has not been pre-inserted", self);
        }
        if schema.schema.types.contains_key(&self.type_name) {
            return Err(SchemaError::DuplicateName {
                message: format!("Type `{self}` already exists in schema"),
            });
        }
        schema
            .schema
            .types
            .insert(self.type_name.clone(), ExtendedType::Scalar(type_));
        self.insert_references(self.get(&schema.schema)?, &mut schema.referencers)
    }

    /// Remove this scalar from the schema, along with all fields and arguments
    /// of this type.
    pub fn remove(&self, schema: &mut CoreSchema) -> Result<Option<ScalarTypeReferencers>, SchemaError> {
        let Some(referencers) = self.remove_internal(schema)? else {
            return Ok(None);
        };
        for field in &referencers.object_fields {
            field.remove(schema)?;
        }
        for argument in &referencers.object_field_arguments {
            argument.remove(schema)?;
        }
        for field in &referencers.interface_fields {
            field.remove(schema)?;
        }
        for argument in &referencers.interface_field_arguments {
            argument.remove(schema)?;
        }
        for field in &referencers.input_object_fields {
            field.remove(schema)?;
        }
        for argument in &referencers.directive_arguments {
            argument.remove(schema)?;
        }
        Ok(Some(referencers))
    }

    fn remove_internal(
        &self,
        schema: &mut CoreSchema,
    ) -> Result<Option<ScalarTypeReferencers>, SchemaError> {
        if builtins::is_built_in_type_name(&self.type_name) {
            return Err(PositionLookupError::MutateBuiltIn(Self::KIND, self.type_name.clone()).into());
        }
        let Some(type_) = self.try_get(&schema.schema) else {
            return Ok(None);
        };
        self.remove_references(type_, &mut schema.referencers);
        schema.schema.types.shift_remove(&self.type_name);
        Ok(Some(
            schema
                .referencers
                .scalar_types
                .shift_remove(&self.type_name)
                .ok_or_else(|| {
                    SchemaError::internal(format!(
                        "Schema missing referencers for type \"{self}\"",
                    ))
                })?,
        ))
    }

    /// Renames this scalar type, rewriting the type registry, the type slot of
    /// every referencing element, and the referencer bookkeeping.
    pub fn rename(&self, schema: &mut CoreSchema, new_name: Name) -> Result<(), SchemaError> {
        rename_guards(Self::KIND, &self.type_name, &new_name, schema)?;
        self.make_mut(&mut schema.schema)?.make_mut().name = new_name.clone();
        rekey_schema_type(&mut schema.schema, &self.type_name, &new_name);
        let referencers = schema
            .referencers
            .scalar_types
            .swap_remove(&self.type_name)
            .ok_or_else(|| {
                SchemaError::internal(format!("Schema missing referencers for type \"{self}\""))
            })?;
        for field in &referencers.object_fields {
            field.rename_type(&mut schema.schema, new_name.clone())?;
        }
        for argument in &referencers.object_field_arguments {
            argument.rename_type(&mut schema.schema, new_name.clone())?;
        }
        for field in &referencers.interface_fields {
            field.rename_type(&mut schema.schema, new_name.clone())?;
        }
        for argument in &referencers.interface_field_arguments {
            argument.rename_type(&mut schema.schema, new_name.clone())?;
        }
        for field in &referencers.input_object_fields {
            field.rename_type(&mut schema.schema, new_name.clone())?;
        }
        for argument in &referencers.directive_arguments {
            argument.rename_type(&mut schema.schema, new_name.clone())?;
        }
        schema
            .referencers
            .scalar_types
            .insert(new_name.clone(), referencers);
        schema
            .referencers
            .rename_scalar_type(&self.type_name, &new_name);
        Ok(())
    }

    pub fn insert_directive(
        &self,
        schema: &mut CoreSchema,
        directive: Component<Directive>,
    ) -> Result<(), SchemaError> {
        let type_ = self.make_mut(&mut schema.schema)?;
        if type_
            .directives
            .iter()
            .any(|other_directive| other_directive.ptr_eq(&directive))
        {
            bail!(
                "Directive application \"@{}\" already exists on scalar type \"{}\"",
                directive.name,
                self,
            );
        }
        self.insert_directive_name_references(&mut schema.referencers, &directive.name)?;
        type_.make_mut().directives.push(directive);
        Ok(())
    }

    /// Remove a directive application from this scalar by name.
    pub fn remove_directive_name(&self, schema: &mut CoreSchema, name: &str) {
        let Some(type_) = self.try_make_mut(&mut schema.schema) else {
            return;
        };
        self.remove_directive_name_references(&mut schema.referencers, name);
        type_
            .make_mut()
            .directives
            .retain(|other_directive| other_directive.name != name);
    }

    /// Remove a specific directive application from this scalar.
    pub fn remove_directive(&self, schema: &mut CoreSchema, directive: &Component<Directive>) {
        let Some(type_) = self.try_make_mut(&mut schema.schema) else {
            return;
        };
        if !type_.directives.iter().any(|other_directive| {
            (other_directive.name == directive.name) && !other_directive.ptr_eq(directive)
        }) {
            self.remove_directive_name_references(&mut schema.referencers, &directive.name);
        }
        type_
            .make_mut()
            .directives
            .retain(|other_directive| !other_directive.ptr_eq(directive));
    }

    fn insert_references(
        &self,
        type_: &Node<ScalarType>,
        referencers: &mut Referencers,
    ) -> Result<(), SchemaError> {
        validate_component_directives(type_.directives.deref())?;
        for directive_reference in type_.directives.iter() {
            self.insert_directive_name_references(referencers, &directive_reference.name)?;
        }
        Ok(())
    }

    fn remove_references(&self, type_: &Node<ScalarType>, referencers: &mut Referencers) {
        for directive_reference in type_.directives.iter() {
            self.remove_directive_name_references(referencers, &directive_reference.name);
        }
    }

    fn insert_directive_name_references(
        &self,
        referencers: &mut Referencers,
        name: &Name,
    ) -> Result<(), SchemaError> {
        let Some(directive_referencers) = referencers.directives.get_mut(name) else {
            return Err(SchemaError::UnknownDirective {
                name: name.to_string(),
            });
        };
        directive_referencers.scalar_types.insert(self.clone());
        Ok(())
    }

    fn remove_directive_name_references(&self, referencers: &mut Referencers, name: &str) {
        let Some(directive_referencers) = referencers.directives.get_mut(name) else {
            return;
        };
        directive_referencers.scalar_types.shift_remove(self);
    }
}

impl Display for ScalarTypeDefinitionPosition {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.type_name)
    }
}

impl Debug for ScalarTypeDefinitionPosition {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Scalar({self})")
    }
}

#[derive(Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ObjectTypeDefinitionPosition {
    pub type_name: Name,
}

impl ObjectTypeDefinitionPosition {
    const EXPECTED: &'static str = "an object type";
    const KIND: &'static str = "object type";

    pub fn new(type_name: Name) -> Self {
        Self { type_name }
    }

    pub fn field(&self, field_name: Name) -> ObjectFieldDefinitionPosition {
        ObjectFieldDefinitionPosition {
            type_name: self.type_name.clone(),
            field_name,
        }
    }

    pub fn introspection_typename_field(&self) -> ObjectFieldDefinitionPosition {
        self.field(INTROSPECTION_TYPENAME_FIELD_NAME.clone())
    }

    pub fn get<'schema>(
        &self,
        schema: &'schema Schema,
    ) -> Result<&'schema Node<ObjectType>, PositionLookupError> {
        schema
            .types
            .get(&self.type_name)
            .ok_or_else(|| PositionLookupError::TypeMissing(self.type_name.clone()))
            .and_then(|type_| {
                if let ExtendedType::Object(type_) = type_ {
                    Ok(type_)
                } else {
                    Err(PositionLookupError::TypeWrongKind(
                        self.type_name.clone(),
                        Self::EXPECTED,
                    ))
                }
            })
    }

    pub fn try_get<'schema>(&self, schema: &'schema Schema) -> Option<&'schema Node<ObjectType>> {
        self.get(schema).ok()
    }

    fn make_mut<'schema>(
        &self,
        schema: &'schema mut Schema,
    ) -> Result<&'schema mut Node<ObjectType>, PositionLookupError> {
        if builtins::is_built_in_type_name(&self.type_name) {
            return Err(PositionLookupError::MutateBuiltIn(
                Self::KIND,
                self.type_name.clone(),
            ));
        }
        schema
            .types
            .get_mut(&self.type_name)
            .ok_or_else(|| PositionLookupError::TypeMissing(self.type_name.clone()))
            .and_then(|type_| {
                if let ExtendedType::Object(type_) = type_ {
                    Ok(type_)
                } else {
                    Err(PositionLookupError::TypeWrongKind(
                        self.type_name.clone(),
                        Self::EXPECTED,
                    ))
                }
            })
    }

    fn try_make_mut<'schema>(
        &self,
        schema: &'schema mut Schema,
    ) -> Option<&'schema mut Node<ObjectType>> {
        if self.try_get(schema).is_some() {
            self.make_mut(schema).ok()
        } else {
            None
        }
    }

    pub fn pre_insert(&self, schema: &mut CoreSchema) -> Result<(), SchemaError> {
        if schema.referencers.contains_type_name(&self.type_name) {
            return Err(SchemaError::DuplicateName {
                message: format!("Type `{self}` already exists in schema"),
            });
        }
        schema
            .referencers
            .object_types
            .insert(self.type_name.clone(), Default::default());
        Ok(())
    }

    /// Insert the given object type at this position. If the type's name is
    /// `Query`, `Mutation`, or `Subscription` and the corresponding root
    /// operation is unbound, the root is bound to this type.
    pub fn insert(&self, schema: &mut CoreSchema, type_: Node<ObjectType>) -> Result<(), SchemaError> {
        if self.type_name != type_.name {
            bail!(
                "Object type \"{}\" given type named \"{}\"",
                self,
                type_.name,
            );
        }
        if !schema.referencers.object_types.contains_key(&self.type_name) {
            bail!("Type \"{}\" has not been pre-inserted", self);
        }
        if schema.schema.types.contains_key(&self.type_name) {
            return Err(SchemaError::DuplicateName {
                message: format!("Type `{self}` already exists in schema"),
            });
        }
        schema
            .schema
            .types
            .insert(self.type_name.clone(), ExtendedType::Object(type_));
        self.insert_references(
            self.get(&schema.schema)?,
            &schema.schema,
            &mut schema.referencers,
        )?;
        if let Some(root_kind) = SchemaRootDefinitionKind::if_root_name(&self.type_name) {
            let root = SchemaRootDefinitionPosition { root_kind };
            if root.try_get(&schema.schema).is_none() {
                root.insert(schema, ComponentName::from(self.type_name.clone()))?;
            }
        }
        Ok(())
    }

    /// Remove the type from the schema, and remove any direct references to
    /// the type.
    pub fn remove(&self, schema: &mut CoreSchema) -> Result<Option<ObjectTypeReferencers>, SchemaError> {
        let Some(referencers) = self.remove_internal(schema)? else {
            return Ok(None);
        };
        for root in &referencers.schema_roots {
            root.remove(schema)?;
        }
        for field in &referencers.object_fields {
            field.remove(schema)?;
        }
        for field in &referencers.interface_fields {
            field.remove(schema)?;
        }
        for union_type in &referencers.union_types {
            union_type.remove_member(schema, &self.type_name);
        }
        Ok(Some(referencers))
    }

    /// Remove the type from the schema, and recursively remove any references
    /// to the type.
    pub fn remove_recursive(&self, schema: &mut CoreSchema) -> Result<(), SchemaError> {
        let Some(referencers) = self.remove_internal(schema)? else {
            return Ok(());
        };
        for root in referencers.schema_roots {
            root.remove(schema)?;
        }
        for field in referencers.object_fields {
            field.remove_recursive(schema)?;
        }
        for field in referencers.interface_fields {
            field.remove_recursive(schema)?;
        }
        for union_type in referencers.union_types {
            union_type.remove_member_recursive(schema, &self.type_name)?;
        }
        Ok(())
    }

    fn remove_internal(
        &self,
        schema: &mut CoreSchema,
    ) -> Result<Option<ObjectTypeReferencers>, SchemaError> {
        if builtins::is_built_in_type_name(&self.type_name) {
            return Err(PositionLookupError::MutateBuiltIn(Self::KIND, self.type_name.clone()).into());
        }
        let Some(type_) = self.try_get(&schema.schema) else {
            return Ok(None);
        };
        self.remove_references(type_, &schema.schema, &mut schema.referencers)?;
        schema.schema.types.shift_remove(&self.type_name);
        Ok(Some(
            schema
                .referencers
                .object_types
                .shift_remove(&self.type_name)
                .ok_or_else(|| {
                    SchemaError::internal(format!(
                        "Schema missing referencers for type \"{self}\"",
                    ))
                })?,
        ))
    }

    pub fn rename(&self, schema: &mut CoreSchema, new_name: Name) -> Result<(), SchemaError> {
        rename_guards(Self::KIND, &self.type_name, &new_name, schema)?;
        self.make_mut(&mut schema.schema)?.make_mut().name = new_name.clone();
        rekey_schema_type(&mut schema.schema, &self.type_name, &new_name);
        let referencers = schema
            .referencers
            .object_types
            .swap_remove(&self.type_name)
            .ok_or_else(|| {
                SchemaError::internal(format!("Schema missing referencers for type \"{self}\""))
            })?;
        for root in &referencers.schema_roots {
            root.rename_type(&mut schema.schema, new_name.clone())?;
        }
        for field in &referencers.object_fields {
            field.rename_type(&mut schema.schema, new_name.clone())?;
        }
        for field in &referencers.interface_fields {
            field.rename_type(&mut schema.schema, new_name.clone())?;
        }
        for union_type in &referencers.union_types {
            union_type.rename_member(&mut schema.schema, &self.type_name, new_name.clone())?;
        }
        schema
            .referencers
            .object_types
            .insert(new_name.clone(), referencers);
        schema
            .referencers
            .rename_object_type(&self.type_name, &new_name);
        Ok(())
    }

    pub fn insert_directive(
        &self,
        schema: &mut CoreSchema,
        directive: Component<Directive>,
    ) -> Result<(), SchemaError> {
        let type_ = self.make_mut(&mut schema.schema)?;
        if type_
            .directives
            .iter()
            .any(|other_directive| other_directive.ptr_eq(&directive))
        {
            bail!(
                "Directive application \"@{}\" already exists on object type \"{}\"",
                directive.name,
                self,
            );
        }
        self.insert_directive_name_references(&mut schema.referencers, &directive.name)?;
        type_.make_mut().directives.push(directive);
        Ok(())
    }

    pub fn remove_directive_name(&self, schema: &mut CoreSchema, name: &str) {
        let Some(type_) = self.try_make_mut(&mut schema.schema) else {
            return;
        };
        self.remove_directive_name_references(&mut schema.referencers, name);
        type_
            .make_mut()
            .directives
            .retain(|other_directive| other_directive.name != name);
    }

    pub fn remove_directive(&self, schema: &mut CoreSchema, directive: &Component<Directive>) {
        let Some(type_) = self.try_make_mut(&mut schema.schema) else {
            return;
        };
        if !type_.directives.iter().any(|other_directive| {
            (other_directive.name == directive.name) && !other_directive.ptr_eq(directive)
        }) {
            self.remove_directive_name_references(&mut schema.referencers, &directive.name);
        }
        type_
            .make_mut()
            .directives
            .retain(|other_directive| !other_directive.ptr_eq(directive));
    }

    pub fn insert_implements_interface(
        &self,
        schema: &mut CoreSchema,
        name: ComponentName,
    ) -> Result<(), SchemaError> {
        let type_ = self.make_mut(&mut schema.schema)?;
        type_.make_mut().implements_interfaces.insert(name.clone());
        self.insert_implements_interface_references(&mut schema.referencers, &name)
    }

    pub fn remove_implements_interface(&self, schema: &mut CoreSchema, name: &str) {
        let Some(type_) = self.try_make_mut(&mut schema.schema) else {
            return;
        };
        self.remove_implements_interface_references(&mut schema.referencers, name);
        type_
            .make_mut()
            .implements_interfaces
            .retain(|other_type| other_type.name != name);
    }

    fn rename_implements(
        &self,
        schema: &mut Schema,
        old_name: &Name,
        new_name: Name,
    ) -> Result<(), PositionLookupError> {
        let type_ = self.make_mut(schema)?.make_mut();
        type_.implements_interfaces = type_
            .implements_interfaces
            .iter()
            .map(|other_type| {
                if other_type.name == *old_name {
                    ComponentName {
                        origin: other_type.origin.clone(),
                        name: new_name.clone(),
                    }
                } else {
                    other_type.clone()
                }
            })
            .collect();
        Ok(())
    }

    fn insert_references(
        &self,
        type_: &Node<ObjectType>,
        schema: &Schema,
        referencers: &mut Referencers,
    ) -> Result<(), SchemaError> {
        validate_component_directives(type_.directives.deref())?;
        for directive_reference in type_.directives.iter() {
            self.insert_directive_name_references(referencers, &directive_reference.name)?;
        }
        for interface_type_reference in type_.implements_interfaces.iter() {
            self.insert_implements_interface_references(referencers, interface_type_reference)?;
        }
        let introspection_typename_field = self.introspection_typename_field();
        introspection_typename_field.insert_references(
            introspection_typename_field.get(schema)?,
            referencers,
            true,
        )?;
        if let Some(root_query_type) = (SchemaRootDefinitionPosition {
            root_kind: SchemaRootDefinitionKind::Query,
        })
        .try_get(schema)
        {
            // Note that when inserting an object type that is the root query
            // type, it's possible for the root query type to have been set
            // before this insertion. In that case, we need to insert
            // references for the special introspection fields __schema and
            // __type.
            if self.type_name == root_query_type.name {
                self.insert_root_query_references(schema, referencers)?;
            }
        }
        for (field_name, field) in type_.fields.iter() {
            self.field(field_name.clone())
                .insert_references(field, referencers, false)?;
        }
        Ok(())
    }

    fn remove_references(
        &self,
        type_: &Node<ObjectType>,
        schema: &Schema,
        referencers: &mut Referencers,
    ) -> Result<(), SchemaError> {
        for directive_reference in type_.directives.iter() {
            self.remove_directive_name_references(referencers, &directive_reference.name);
        }
        for interface_type_reference in type_.implements_interfaces.iter() {
            self.remove_implements_interface_references(referencers, interface_type_reference);
        }
        let introspection_typename_field = self.introspection_typename_field();
        introspection_typename_field.remove_references(
            introspection_typename_field.get(schema)?,
            referencers,
            true,
        )?;
        if let Some(root_query_type) = (SchemaRootDefinitionPosition {
            root_kind: SchemaRootDefinitionKind::Query,
        })
        .try_get(schema)
        {
            // Note that when removing an object type that is the root query
            // type, it's possible for the root query type to still be set
            // after this removal. In that case, we need to remove references
            // for the special introspection fields __schema and __type.
            if self.type_name == root_query_type.name {
                self.remove_root_query_references(schema, referencers)?;
            }
        }
        for (field_name, field) in type_.fields.iter() {
            self.field(field_name.clone())
                .remove_references(field, referencers, false)?;
        }
        Ok(())
    }

    fn insert_directive_name_references(
        &self,
        referencers: &mut Referencers,
        name: &Name,
    ) -> Result<(), SchemaError> {
        let Some(directive_referencers) = referencers.directives.get_mut(name) else {
            return Err(SchemaError::UnknownDirective {
                name: name.to_string(),
            });
        };
        directive_referencers.object_types.insert(self.clone());
        Ok(())
    }

    fn remove_directive_name_references(&self, referencers: &mut Referencers, name: &str) {
        let Some(directive_referencers) = referencers.directives.get_mut(name) else {
            return;
        };
        directive_referencers.object_types.shift_remove(self);
    }

    fn insert_implements_interface_references(
        &self,
        referencers: &mut Referencers,
        name: &str,
    ) -> Result<(), SchemaError> {
        let Some(interface_type_referencers) = referencers.interface_types.get_mut(name) else {
            return Err(SchemaError::UnknownType {
                name: name.to_string(),
            });
        };
        interface_type_referencers.object_types.insert(self.clone());
        Ok(())
    }

    fn remove_implements_interface_references(&self, referencers: &mut Referencers, name: &str) {
        let Some(interface_type_referencers) = referencers.interface_types.get_mut(name) else {
            return;
        };
        interface_type_referencers.object_types.shift_remove(self);
    }

    fn insert_root_query_references(
        &self,
        schema: &Schema,
        referencers: &mut Referencers,
    ) -> Result<(), SchemaError> {
        // Note that unlike most insert logic in this file, the underlying
        // elements being inserted here (the special introspection fields
        // __schema and __type) actually depend on two elements existing
        // instead of one: the object type, and the schema root being set to
        // that type. We accordingly don't assume the fields are resolvable.
        let introspection_schema_field = self.field(name!("__schema"));
        if let Some(field) = introspection_schema_field.try_get(schema) {
            introspection_schema_field.insert_references(field, referencers, true)?;
        }
        let introspection_type_field = self.field(name!("__type"));
        if let Some(field) = introspection_type_field.try_get(schema) {
            introspection_type_field.insert_references(field, referencers, true)?;
        }
        Ok(())
    }

    fn remove_root_query_references(
        &self,
        schema: &Schema,
        referencers: &mut Referencers,
    ) -> Result<(), SchemaError> {
        let introspection_schema_field = self.field(name!("__schema"));
        if let Some(field) = introspection_schema_field.try_get(schema) {
            introspection_schema_field.remove_references(field, referencers, true)?;
        }
        let introspection_type_field = self.field(name!("__type"));
        if let Some(field) = introspection_type_field.try_get(schema) {
            introspection_type_field.remove_references(field, referencers, true)?;
        }
        Ok(())
    }
}

impl Display for ObjectTypeDefinitionPosition {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.type_name)
    }
}

impl Debug for ObjectTypeDefinitionPosition {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Object({self})")
    }
}

#[derive(Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ObjectFieldDefinitionPosition {
    pub type_name: Name,
    pub field_name: Name,
}

impl ObjectFieldDefinitionPosition {
    pub fn is_introspection_typename_field(&self) -> bool {
        self.field_name == *INTROSPECTION_TYPENAME_FIELD_NAME
    }

    pub fn parent(&self) -> ObjectTypeDefinitionPosition {
        ObjectTypeDefinitionPosition {
            type_name: self.type_name.clone(),
        }
    }

    pub fn argument(&self, argument_name: Name) -> ObjectFieldArgumentDefinitionPosition {
        ObjectFieldArgumentDefinitionPosition {
            type_name: self.type_name.clone(),
            field_name: self.field_name.clone(),
            argument_name,
        }
    }

    pub fn get<'schema>(
        &self,
        schema: &'schema Schema,
    ) -> Result<&'schema Component<FieldDefinition>, PositionLookupError> {
        let parent = self.parent();
        parent.get(schema)?;

        schema
            .type_field(&self.type_name, &self.field_name)
            .map_err(|_| {
                PositionLookupError::MissingField(
                    "Object type",
                    self.type_name.clone(),
                    self.field_name.clone(),
                )
            })
    }

    pub fn try_get<'schema>(
        &self,
        schema: &'schema Schema,
    ) -> Option<&'schema Component<FieldDefinition>> {
        self.get(schema).ok()
    }

    fn make_mut<'schema>(
        &self,
        schema: &'schema mut Schema,
    ) -> Result<&'schema mut Component<FieldDefinition>, PositionLookupError> {
        if is_graphql_reserved_name(&self.field_name) {
            return Err(PositionLookupError::MutateReservedField(
                "object field",
                self.type_name.clone(),
                self.field_name.clone(),
            ));
        }
        let parent = self.parent();
        let type_ = parent.make_mut(schema)?.make_mut();
        type_.fields.get_mut(&self.field_name).ok_or_else(|| {
            PositionLookupError::MissingField(
                "Object type",
                self.type_name.clone(),
                self.field_name.clone(),
            )
        })
    }

    fn try_make_mut<'schema>(
        &self,
        schema: &'schema mut Schema,
    ) -> Option<&'schema mut Component<FieldDefinition>> {
        if self.try_get(schema).is_some() {
            self.make_mut(schema).ok()
        } else {
            None
        }
    }

    pub fn insert(
        &self,
        schema: &mut CoreSchema,
        field: Component<FieldDefinition>,
    ) -> Result<(), SchemaError> {
        if self.field_name != field.name {
            bail!("Object field \"{}\" given field named \"{}\"", self, field.name);
        }
        if is_graphql_reserved_name(&self.field_name) {
            return Err(PositionLookupError::MutateReservedField(
                "object field",
                self.type_name.clone(),
                self.field_name.clone(),
            )
            .into());
        }
        let parent_type = self.parent().make_mut(&mut schema.schema)?;
        if parent_type.fields.contains_key(&self.field_name) {
            return Err(SchemaError::DuplicateName {
                message: format!("Field `{self}` already exists in schema"),
            });
        }
        parent_type
            .make_mut()
            .fields
            .insert(self.field_name.clone(), field);
        self.insert_references(self.get(&schema.schema)?, &mut schema.referencers, false)
    }

    pub fn remove(&self, schema: &mut CoreSchema) -> Result<(), SchemaError> {
        let Some(field) = self.try_get(&schema.schema) else {
            return Ok(());
        };
        self.remove_references(field, &mut schema.referencers, false)?;
        self.parent()
            .make_mut(&mut schema.schema)?
            .make_mut()
            .fields
            .shift_remove(&self.field_name);
        Ok(())
    }

    /// Remove this field. If the parent type is left with no fields, remove
    /// the parent type recursively as well.
    pub fn remove_recursive(&self, schema: &mut CoreSchema) -> Result<(), SchemaError> {
        self.remove(schema)?;
        let parent = self.parent();
        let Some(type_) = parent.try_get(&schema.schema) else {
            return Ok(());
        };
        if type_.fields.is_empty() {
            parent.remove_recursive(schema)?;
        }
        Ok(())
    }

    /// Change this field's type, keeping the referencer bookkeeping for both
    /// the old and new types consistent.
    pub fn set_type(&self, schema: &mut CoreSchema, ty: ast::Type) -> Result<(), SchemaError> {
        check_output_type_reference(schema, ty.inner_named_type(), "Object field", self)?;
        let field = self.make_mut(&mut schema.schema)?;
        let old_field = field.clone();
        field.make_mut().ty = ty;
        self.remove_type_references(&old_field, &mut schema.referencers);
        let field = self.get(&schema.schema)?.clone();
        self.insert_type_references(&field, &mut schema.referencers)
    }

    pub fn insert_directive(
        &self,
        schema: &mut CoreSchema,
        directive: Node<Directive>,
    ) -> Result<(), SchemaError> {
        let field = self.make_mut(&mut schema.schema)?;
        if field
            .directives
            .iter()
            .any(|other_directive| other_directive.ptr_eq(&directive))
        {
            bail!(
                "Directive application \"@{}\" already exists on object field \"{}\"",
                directive.name,
                self,
            );
        }
        self.insert_directive_name_references(&mut schema.referencers, &directive.name)?;
        field.make_mut().directives.push(directive);
        Ok(())
    }

    pub fn remove_directive_name(&self, schema: &mut CoreSchema, name: &str) {
        let Some(field) = self.try_make_mut(&mut schema.schema) else {
            return;
        };
        self.remove_directive_name_references(&mut schema.referencers, name);
        field
            .make_mut()
            .directives
            .retain(|other_directive| other_directive.name != name);
    }

    pub fn remove_directive(&self, schema: &mut CoreSchema, directive: &Node<Directive>) {
        let Some(field) = self.try_make_mut(&mut schema.schema) else {
            return;
        };
        if !field.directives.iter().any(|other_directive| {
            (other_directive.name == directive.name) && !other_directive.ptr_eq(directive)
        }) {
            self.remove_directive_name_references(&mut schema.referencers, &directive.name);
        }
        field
            .make_mut()
            .directives
            .retain(|other_directive| !other_directive.ptr_eq(directive));
    }

    fn insert_references(
        &self,
        field: &Component<FieldDefinition>,
        referencers: &mut Referencers,
        allow_built_ins: bool,
    ) -> Result<(), SchemaError> {
        if !allow_built_ins && is_graphql_reserved_name(&self.field_name) {
            return Err(PositionLookupError::MutateReservedField(
                "object field",
                self.type_name.clone(),
                self.field_name.clone(),
            )
            .into());
        }
        validate_node_directives(field.directives.deref())?;
        for directive_reference in field.directives.iter() {
            self.insert_directive_name_references(referencers, &directive_reference.name)?;
        }
        self.insert_type_references(field, referencers)?;
        validate_arguments(&field.arguments)?;
        for argument in field.arguments.iter() {
            self.argument(argument.name.clone())
                .insert_references(argument, referencers)?;
        }
        Ok(())
    }

    fn remove_references(
        &self,
        field: &Component<FieldDefinition>,
        referencers: &mut Referencers,
        allow_built_ins: bool,
    ) -> Result<(), SchemaError> {
        if !allow_built_ins && is_graphql_reserved_name(&self.field_name) {
            return Err(PositionLookupError::MutateReservedField(
                "object field",
                self.type_name.clone(),
                self.field_name.clone(),
            )
            .into());
        }
        for directive_reference in field.directives.iter() {
            self.remove_directive_name_references(referencers, &directive_reference.name);
        }
        self.remove_type_references(field, referencers);
        for argument in field.arguments.iter() {
            self.argument(argument.name.clone())
                .remove_references(argument, referencers);
        }
        Ok(())
    }

    fn insert_directive_name_references(
        &self,
        referencers: &mut Referencers,
        name: &Name,
    ) -> Result<(), SchemaError> {
        let Some(directive_referencers) = referencers.directives.get_mut(name) else {
            return Err(SchemaError::UnknownDirective {
                name: name.to_string(),
            });
        };
        directive_referencers.object_fields.insert(self.clone());
        Ok(())
    }

    fn remove_directive_name_references(&self, referencers: &mut Referencers, name: &str) {
        let Some(directive_referencers) = referencers.directives.get_mut(name) else {
            return;
        };
        directive_referencers.object_fields.shift_remove(self);
    }

    fn insert_type_references(
        &self,
        field: &Component<FieldDefinition>,
        referencers: &mut Referencers,
    ) -> Result<(), SchemaError> {
        let output_type_reference = field.ty.inner_named_type();
        if let Some(scalar_type_referencers) =
            referencers.scalar_types.get_mut(output_type_reference)
        {
            scalar_type_referencers.object_fields.insert(self.clone());
        } else if let Some(object_type_referencers) =
            referencers.object_types.get_mut(output_type_reference)
        {
            object_type_referencers.object_fields.insert(self.clone());
        } else if let Some(interface_type_referencers) =
            referencers.interface_types.get_mut(output_type_reference)
        {
            interface_type_referencers.object_fields.insert(self.clone());
        } else if let Some(union_type_referencers) =
            referencers.union_types.get_mut(output_type_reference)
        {
            union_type_referencers.object_fields.insert(self.clone());
        } else if let Some(enum_type_referencers) =
            referencers.enum_types.get_mut(output_type_reference)
        {
            enum_type_referencers.object_fields.insert(self.clone());
        } else {
            return Err(SchemaError::internal(format!(
                "Object field \"{self}\"'s inner type \"{output_type_reference}\" does not refer to an existing output type.",
            )));
        }
        Ok(())
    }

    fn remove_type_references(
        &self,
        field: &Component<FieldDefinition>,
        referencers: &mut Referencers,
    ) {
        let output_type_reference = field.ty.inner_named_type();
        if let Some(scalar_type_referencers) =
            referencers.scalar_types.get_mut(output_type_reference)
        {
            scalar_type_referencers.object_fields.shift_remove(self);
        } else if let Some(object_type_referencers) =
            referencers.object_types.get_mut(output_type_reference)
        {
            object_type_referencers.object_fields.shift_remove(self);
        } else if let Some(interface_type_referencers) =
            referencers.interface_types.get_mut(output_type_reference)
        {
            interface_type_referencers.object_fields.shift_remove(self);
        } else if let Some(union_type_referencers) =
            referencers.union_types.get_mut(output_type_reference)
        {
            union_type_referencers.object_fields.shift_remove(self);
        } else if let Some(enum_type_referencers) =
            referencers.enum_types.get_mut(output_type_reference)
        {
            enum_type_referencers.object_fields.shift_remove(self);
        }
    }

    fn rename_type(&self, schema: &mut Schema, new_name: Name) -> Result<(), PositionLookupError> {
        let field = self.make_mut(schema)?;
        rename_type(&mut field.make_mut().ty, new_name);
        Ok(())
    }
}

impl Display for ObjectFieldDefinitionPosition {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.type_name, self.field_name)
    }
}

impl Debug for ObjectFieldDefinitionPosition {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "ObjectField({self})")
    }
}

#[derive(Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ObjectFieldArgumentDefinitionPosition {
    pub type_name: Name,
    pub field_name: Name,
    pub argument_name: Name,
}

impl ObjectFieldArgumentDefinitionPosition {
    pub fn parent(&self) -> ObjectFieldDefinitionPosition {
        ObjectFieldDefinitionPosition {
            type_name: self.type_name.clone(),
            field_name: self.field_name.clone(),
        }
    }

    pub fn get<'schema>(
        &self,
        schema: &'schema Schema,
    ) -> Result<&'schema Node<InputValueDefinition>, PositionLookupError> {
        let parent = self.parent();
        let field = parent.get(schema)?;

        field
            .arguments
            .iter()
            .find(|a| a.name == self.argument_name)
            .ok_or_else(|| {
                PositionLookupError::MissingFieldArgument(
                    "Object field",
                    self.type_name.clone(),
                    self.field_name.clone(),
                    self.argument_name.clone(),
                )
            })
    }

    pub fn try_get<'schema>(
        &self,
        schema: &'schema Schema,
    ) -> Option<&'schema Node<InputValueDefinition>> {
        self.get(schema).ok()
    }

    fn make_mut<'schema>(
        &self,
        schema: &'schema mut Schema,
    ) -> Result<&'schema mut Node<InputValueDefinition>, PositionLookupError> {
        let parent = self.parent();
        let field = parent.make_mut(schema)?.make_mut();

        field
            .arguments
            .iter_mut()
            .find(|a| a.name == self.argument_name)
            .ok_or_else(|| {
                PositionLookupError::MissingFieldArgument(
                    "Object field",
                    self.type_name.clone(),
                    self.field_name.clone(),
                    self.argument_name.clone(),
                )
            })
    }

    fn try_make_mut<'schema>(
        &self,
        schema: &'schema mut Schema,
    ) -> Option<&'schema mut Node<InputValueDefinition>> {
        if self.try_get(schema).is_some() {
            self.make_mut(schema).ok()
        } else {
            None
        }
    }

    pub fn insert(
        &self,
        schema: &mut CoreSchema,
        argument: Node<InputValueDefinition>,
    ) -> Result<(), SchemaError> {
        if self.argument_name != argument.name {
            bail!(
                "Object field argument \"{}\" given argument named \"{}\"",
                self,
                argument.name,
            );
        }
        let field = self.parent().make_mut(&mut schema.schema)?;
        if field.arguments.iter().any(|a| a.name == self.argument_name) {
            return Err(SchemaError::DuplicateName {
                message: format!("Argument `{self}` already exists in schema"),
            });
        }
        field.make_mut().arguments.push(argument);
        self.insert_references(self.get(&schema.schema)?, &mut schema.referencers)
    }

    pub fn remove(&self, schema: &mut CoreSchema) -> Result<(), SchemaError> {
        let Some(argument) = self.try_get(&schema.schema) else {
            return Ok(());
        };
        self.remove_references(argument, &mut schema.referencers);
        self.parent()
            .make_mut(&mut schema.schema)?
            .make_mut()
            .arguments
            .retain(|other_argument| other_argument.name != self.argument_name);
        Ok(())
    }

    pub fn set_type(&self, schema: &mut CoreSchema, ty: ast::Type) -> Result<(), SchemaError> {
        check_input_type_reference(schema, ty.inner_named_type(), "Object field argument", self)?;
        let argument = self.make_mut(&mut schema.schema)?;
        let old_argument = argument.clone();
        argument.make_mut().ty = Node::new(ty);
        self.remove_type_references(&old_argument, &mut schema.referencers);
        let argument = self.get(&schema.schema)?.clone();
        self.insert_type_references(&argument, &mut schema.referencers)
    }

    pub fn insert_directive(
        &self,
        schema: &mut CoreSchema,
        directive: Node<Directive>,
    ) -> Result<(), SchemaError> {
        let argument = self.make_mut(&mut schema.schema)?;
        if argument
            .directives
            .iter()
            .any(|other_directive| other_directive.ptr_eq(&directive))
        {
            bail!(
                "Directive application \"@{}\" already exists on object field argument \"{}\"",
                directive.name,
                self,
            );
        }
        self.insert_directive_name_references(&mut schema.referencers, &directive.name)?;
        argument.make_mut().directives.push(directive);
        Ok(())
    }

    pub fn remove_directive_name(&self, schema: &mut CoreSchema, name: &str) {
        let Some(argument) = self.try_make_mut(&mut schema.schema) else {
            return;
        };
        self.remove_directive_name_references(&mut schema.referencers, name);
        argument
            .make_mut()
            .directives
            .retain(|other_directive| other_directive.name != name);
    }

    pub fn remove_directive(&self, schema: &mut CoreSchema, directive: &Node<Directive>) {
        let Some(argument) = self.try_make_mut(&mut schema.schema) else {
            return;
        };
        if !argument.directives.iter().any(|other_directive| {
            (other_directive.name == directive.name) && !other_directive.ptr_eq(directive)
        }) {
            self.remove_directive_name_references(&mut schema.referencers, &directive.name);
        }
        argument
            .make_mut()
            .directives
            .retain(|other_directive| !other_directive.ptr_eq(directive));
    }

    fn insert_references(
        &self,
        argument: &Node<InputValueDefinition>,
        referencers: &mut Referencers,
    ) -> Result<(), SchemaError> {
        validate_node_directives(argument.directives.deref())?;
        for directive_reference in argument.directives.iter() {
            self.insert_directive_name_references(referencers, &directive_reference.name)?;
        }
        self.insert_type_references(argument, referencers)
    }

    fn remove_references(
        &self,
        argument: &Node<InputValueDefinition>,
        referencers: &mut Referencers,
    ) {
        for directive_reference in argument.directives.iter() {
            self.remove_directive_name_references(referencers, &directive_reference.name);
        }
        self.remove_type_references(argument, referencers);
    }

    fn insert_directive_name_references(
        &self,
        referencers: &mut Referencers,
        name: &Name,
    ) -> Result<(), SchemaError> {
        let Some(directive_referencers) = referencers.directives.get_mut(name) else {
            return Err(SchemaError::UnknownDirective {
                name: name.to_string(),
            });
        };
        directive_referencers
            .object_field_arguments
            .insert(self.clone());
        Ok(())
    }

    fn remove_directive_name_references(&self, referencers: &mut Referencers, name: &str) {
        let Some(directive_referencers) = referencers.directives.get_mut(name) else {
            return;
        };
        directive_referencers
            .object_field_arguments
            .shift_remove(self);
    }

    fn insert_type_references(
        &self,
        argument: &Node<InputValueDefinition>,
        referencers: &mut Referencers,
    ) -> Result<(), SchemaError> {
        let input_type_reference = argument.ty.inner_named_type();
        if let Some(scalar_type_referencers) =
            referencers.scalar_types.get_mut(input_type_reference)
        {
            scalar_type_referencers
                .object_field_arguments
                .insert(self.clone());
        } else if let Some(enum_type_referencers) =
            referencers.enum_types.get_mut(input_type_reference)
        {
            enum_type_referencers
                .object_field_arguments
                .insert(self.clone());
        } else if let Some(input_object_type_referencers) =
            referencers.input_object_types.get_mut(input_type_reference)
        {
            input_object_type_referencers
                .object_field_arguments
                .insert(self.clone());
        } else {
            return Err(SchemaError::internal(format!(
                "Object field argument \"{self}\"'s inner type \"{input_type_reference}\" does not refer to an existing input type.",
            )));
        }
        Ok(())
    }

    fn remove_type_references(
        &self,
        argument: &Node<InputValueDefinition>,
        referencers: &mut Referencers,
    ) {
        let input_type_reference = argument.ty.inner_named_type();
        if let Some(scalar_type_referencers) =
            referencers.scalar_types.get_mut(input_type_reference)
        {
            scalar_type_referencers
                .object_field_arguments
                .shift_remove(self);
        } else if let Some(enum_type_referencers) =
            referencers.enum_types.get_mut(input_type_reference)
        {
            enum_type_referencers
                .object_field_arguments
                .shift_remove(self);
        } else if let Some(input_object_type_referencers) =
            referencers.input_object_types.get_mut(input_type_reference)
        {
            input_object_type_referencers
                .object_field_arguments
                .shift_remove(self);
        }
    }

    fn rename_type(&self, schema: &mut Schema, new_name: Name) -> Result<(), PositionLookupError> {
        let argument = self.make_mut(schema)?;
        let argument = argument.make_mut();
        let mut ty = argument.ty.deref().clone();
        rename_type(&mut ty, new_name);
        argument.ty = Node::new(ty);
        Ok(())
    }
}

impl Display for ObjectFieldArgumentDefinitionPosition {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}.{}({}:)",
            self.type_name, self.field_name, self.argument_name
        )
    }
}

impl Debug for ObjectFieldArgumentDefinitionPosition {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "ObjectFieldArgument({self})")
    }
}

#[derive(Clone, PartialEq, Eq, Hash, Serialize)]
pub struct InterfaceTypeDefinitionPosition {
    pub type_name: Name,
}

impl InterfaceTypeDefinitionPosition {
    const EXPECTED: &'static str = "an interface type";
    const KIND: &'static str = "interface type";

    pub fn new(type_name: Name) -> Self {
        Self { type_name }
    }

    pub fn field(&self, field_name: Name) -> InterfaceFieldDefinitionPosition {
        InterfaceFieldDefinitionPosition {
            type_name: self.type_name.clone(),
            field_name,
        }
    }

    pub fn introspection_typename_field(&self) -> InterfaceFieldDefinitionPosition {
        self.field(INTROSPECTION_TYPENAME_FIELD_NAME.clone())
    }

    pub fn get<'schema>(
        &self,
        schema: &'schema Schema,
    ) -> Result<&'schema Node<InterfaceType>, PositionLookupError> {
        schema
            .types
            .get(&self.type_name)
            .ok_or_else(|| PositionLookupError::TypeMissing(self.type_name.clone()))
            .and_then(|type_| {
                if let ExtendedType::Interface(type_) = type_ {
                    Ok(type_)
                } else {
                    Err(PositionLookupError::TypeWrongKind(
                        self.type_name.clone(),
                        Self::EXPECTED,
                    ))
                }
            })
    }

    pub fn try_get<'schema>(
        &self,
        schema: &'schema Schema,
    ) -> Option<&'schema Node<InterfaceType>> {
        self.get(schema).ok()
    }

    fn make_mut<'schema>(
        &self,
        schema: &'schema mut Schema,
    ) -> Result<&'schema mut Node<InterfaceType>, PositionLookupError> {
        if builtins::is_built_in_type_name(&self.type_name) {
            return Err(PositionLookupError::MutateBuiltIn(
                Self::KIND,
                self.type_name.clone(),
            ));
        }
        schema
            .types
            .get_mut(&self.type_name)
            .ok_or_else(|| PositionLookupError::TypeMissing(self.type_name.clone()))
            .and_then(|type_| {
                if let ExtendedType::Interface(type_) = type_ {
                    Ok(type_)
                } else {
                    Err(PositionLookupError::TypeWrongKind(
                        self.type_name.clone(),
                        Self::EXPECTED,
                    ))
                }
            })
    }

    fn try_make_mut<'schema>(
        &self,
        schema: &'schema mut Schema,
    ) -> Option<&'schema mut Node<InterfaceType>> {
        if self.try_get(schema).is_some() {
            self.make_mut(schema).ok()
        } else {
            None
        }
    }

    pub fn pre_insert(&self, schema: &mut CoreSchema) -> Result<(), SchemaError> {
        if schema.referencers.contains_type_name(&self.type_name) {
            return Err(SchemaError::DuplicateName {
                message: format!("Type `{self}` already exists in schema"),
            });
        }
        schema
            .referencers
            .interface_types
            .insert(self.type_name.clone(), Default::default());
        Ok(())
    }

    pub fn insert(
        &self,
        schema: &mut CoreSchema,
        type_: Node<InterfaceType>,
    ) -> Result<(), SchemaError> {
        if self.type_name != type_.name {
            bail!(
                "Interface type \"{}\" given type named \"{}\"",
                self,
                type_.name,
            );
        }
        if !schema
            .referencers
            .interface_types
            .contains_key(&self.type_name)
        {
            bail!("Type \"{}\" has not been pre-inserted", self);
        }
        if schema.schema.types.contains_key(&self.type_name) {
            return Err(SchemaError::DuplicateName {
                message: format!("Type `{self}` already exists in schema"),
            });
        }
        schema
            .schema
            .types
            .insert(self.type_name.clone(), ExtendedType::Interface(type_));
        self.insert_references(
            self.get(&schema.schema)?,
            &schema.schema,
            &mut schema.referencers,
        )
    }

    pub fn remove(
        &self,
        schema: &mut CoreSchema,
    ) -> Result<Option<InterfaceTypeReferencers>, SchemaError> {
        let Some(referencers) = self.remove_internal(schema)? else {
            return Ok(None);
        };
        for type_ in &referencers.object_types {
            type_.remove_implements_interface(schema, &self.type_name);
        }
        for field in &referencers.object_fields {
            field.remove(schema)?;
        }
        for type_ in &referencers.interface_types {
            type_.remove_implements_interface(schema, &self.type_name);
        }
        for field in &referencers.interface_fields {
            field.remove(schema)?;
        }
        Ok(Some(referencers))
    }

    pub fn remove_recursive(&self, schema: &mut CoreSchema) -> Result<(), SchemaError> {
        let Some(referencers) = self.remove_internal(schema)? else {
            return Ok(());
        };
        for type_ in referencers.object_types {
            type_.remove_implements_interface(schema, &self.type_name);
        }
        for field in referencers.object_fields {
            field.remove_recursive(schema)?;
        }
        for type_ in referencers.interface_types {
            type_.remove_implements_interface(schema, &self.type_name);
        }
        for field in referencers.interface_fields {
            field.remove_recursive(schema)?;
        }
        Ok(())
    }

    fn remove_internal(
        &self,
        schema: &mut CoreSchema,
    ) -> Result<Option<InterfaceTypeReferencers>, SchemaError> {
        if builtins::is_built_in_type_name(&self.type_name) {
            return Err(PositionLookupError::MutateBuiltIn(Self::KIND, self.type_name.clone()).into());
        }
        let Some(type_) = self.try_get(&schema.schema) else {
            return Ok(None);
        };
        self.remove_references(type_, &schema.schema, &mut schema.referencers)?;
        schema.schema.types.shift_remove(&self.type_name);
        Ok(Some(
            schema
                .referencers
                .interface_types
                .shift_remove(&self.type_name)
                .ok_or_else(|| {
                    SchemaError::internal(format!(
                        "Schema missing referencers for type \"{self}\"",
                    ))
                })?,
        ))
    }

    pub fn rename(&self, schema: &mut CoreSchema, new_name: Name) -> Result<(), SchemaError> {
        rename_guards(Self::KIND, &self.type_name, &new_name, schema)?;
        self.make_mut(&mut schema.schema)?.make_mut().name = new_name.clone();
        rekey_schema_type(&mut schema.schema, &self.type_name, &new_name);
        let referencers = schema
            .referencers
            .interface_types
            .swap_remove(&self.type_name)
            .ok_or_else(|| {
                SchemaError::internal(format!("Schema missing referencers for type \"{self}\""))
            })?;
        for type_ in &referencers.object_types {
            type_.rename_implements(&mut schema.schema, &self.type_name, new_name.clone())?;
        }
        for field in &referencers.object_fields {
            field.rename_type(&mut schema.schema, new_name.clone())?;
        }
        for type_ in &referencers.interface_types {
            type_.rename_implements(&mut schema.schema, &self.type_name, new_name.clone())?;
        }
        for field in &referencers.interface_fields {
            field.rename_type(&mut schema.schema, new_name.clone())?;
        }
        schema
            .referencers
            .interface_types
            .insert(new_name.clone(), referencers);
        schema
            .referencers
            .rename_interface_type(&self.type_name, &new_name);
        Ok(())
    }

    pub fn insert_directive(
        &self,
        schema: &mut CoreSchema,
        directive: Component<Directive>,
    ) -> Result<(), SchemaError> {
        let type_ = self.make_mut(&mut schema.schema)?;
        if type_
            .directives
            .iter()
            .any(|other_directive| other_directive.ptr_eq(&directive))
        {
            bail!(
                "Directive application \"@{}\" already exists on interface type \"{}\"",
                directive.name,
                self,
            );
        }
        self.insert_directive_name_references(&mut schema.referencers, &directive.name)?;
        type_.make_mut().directives.push(directive);
        Ok(())
    }

    pub fn remove_directive_name(&self, schema: &mut CoreSchema, name: &str) {
        let Some(type_) = self.try_make_mut(&mut schema.schema) else {
            return;
        };
        self.remove_directive_name_references(&mut schema.referencers, name);
        type_
            .make_mut()
            .directives
            .retain(|other_directive| other_directive.name != name);
    }

    pub fn remove_directive(&self, schema: &mut CoreSchema, directive: &Component<Directive>) {
        let Some(type_) = self.try_make_mut(&mut schema.schema) else {
            return;
        };
        if !type_.directives.iter().any(|other_directive| {
            (other_directive.name == directive.name) && !other_directive.ptr_eq(directive)
        }) {
            self.remove_directive_name_references(&mut schema.referencers, &directive.name);
        }
        type_
            .make_mut()
            .directives
            .retain(|other_directive| !other_directive.ptr_eq(directive));
    }

    pub fn insert_implements_interface(
        &self,
        schema: &mut CoreSchema,
        name: ComponentName,
    ) -> Result<(), SchemaError> {
        let type_ = self.make_mut(&mut schema.schema)?;
        type_.make_mut().implements_interfaces.insert(name.clone());
        self.insert_implements_interface_references(&mut schema.referencers, &name)
    }

    pub fn remove_implements_interface(&self, schema: &mut CoreSchema, name: &str) {
        let Some(type_) = self.try_make_mut(&mut schema.schema) else {
            return;
        };
        self.remove_implements_interface_references(&mut schema.referencers, name);
        type_
            .make_mut()
            .implements_interfaces
            .retain(|other_type| other_type.name != name);
    }

    fn rename_implements(
        &self,
        schema: &mut Schema,
        old_name: &Name,
        new_name: Name,
    ) -> Result<(), PositionLookupError> {
        let type_ = self.make_mut(schema)?.make_mut();
        type_.implements_interfaces = type_
            .implements_interfaces
            .iter()
            .map(|other_type| {
                if other_type.name == *old_name {
                    ComponentName {
                        origin: other_type.origin.clone(),
                        name: new_name.clone(),
                    }
                } else {
                    other_type.clone()
                }
            })
            .collect();
        Ok(())
    }

    fn insert_references(
        &self,
        type_: &Node<InterfaceType>,
        schema: &Schema,
        referencers: &mut Referencers,
    ) -> Result<(), SchemaError> {
        validate_component_directives(type_.directives.deref())?;
        for directive_reference in type_.directives.iter() {
            self.insert_directive_name_references(referencers, &directive_reference.name)?;
        }
        for interface_type_reference in type_.implements_interfaces.iter() {
            self.insert_implements_interface_references(referencers, interface_type_reference)?;
        }
        let introspection_typename_field = self.introspection_typename_field();
        introspection_typename_field.insert_references(
            introspection_typename_field.get(schema)?,
            referencers,
            true,
        )?;
        for (field_name, field) in type_.fields.iter() {
            self.field(field_name.clone())
                .insert_references(field, referencers, false)?;
        }
        Ok(())
    }

    fn remove_references(
        &self,
        type_: &Node<InterfaceType>,
        schema: &Schema,
        referencers: &mut Referencers,
    ) -> Result<(), SchemaError> {
        for directive_reference in type_.directives.iter() {
            self.remove_directive_name_references(referencers, &directive_reference.name);
        }
        for interface_type_reference in type_.implements_interfaces.iter() {
            self.remove_implements_interface_references(referencers, interface_type_reference);
        }
        let introspection_typename_field = self.introspection_typename_field();
        introspection_typename_field.remove_references(
            introspection_typename_field.get(schema)?,
            referencers,
            true,
        )?;
        for (field_name, field) in type_.fields.iter() {
            self.field(field_name.clone())
                .remove_references(field, referencers, false)?;
        }
        Ok(())
    }

    fn insert_directive_name_references(
        &self,
        referencers: &mut Referencers,
        name: &Name,
    ) -> Result<(), SchemaError> {
        let Some(directive_referencers) = referencers.directives.get_mut(name) else {
            return Err(SchemaError::UnknownDirective {
                name: name.to_string(),
            });
        };
        directive_referencers.interface_types.insert(self.clone());
        Ok(())
    }

    fn remove_directive_name_references(&self, referencers: &mut Referencers, name: &str) {
        let Some(directive_referencers) = referencers.directives.get_mut(name) else {
            return;
        };
        directive_referencers.interface_types.shift_remove(self);
    }

    fn insert_implements_interface_references(
        &self,
        referencers: &mut Referencers,
        name: &str,
    ) -> Result<(), SchemaError> {
        let Some(interface_type_referencers) = referencers.interface_types.get_mut(name) else {
            return Err(SchemaError::UnknownType {
                name: name.to_string(),
            });
        };
        interface_type_referencers
            .interface_types
            .insert(self.clone());
        Ok(())
    }

    fn remove_implements_interface_references(&self, referencers: &mut Referencers, name: &str) {
        let Some(interface_type_referencers) = referencers.interface_types.get_mut(name) else {
            return;
        };
        interface_type_referencers.interface_types.shift_remove(self);
    }
}

impl Display for InterfaceTypeDefinitionPosition {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.type_name)
    }
}

impl Debug for InterfaceTypeDefinitionPosition {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Interface({self})")
    }
}

#[derive(Clone, PartialEq, Eq, Hash, Serialize)]
pub struct InterfaceFieldDefinitionPosition {
    pub type_name: Name,
    pub field_name: Name,
}

impl InterfaceFieldDefinitionPosition {
    pub fn is_introspection_typename_field(&self) -> bool {
        self.field_name == *INTROSPECTION_TYPENAME_FIELD_NAME
    }

    pub fn parent(&self) -> InterfaceTypeDefinitionPosition {
        InterfaceTypeDefinitionPosition {
            type_name: self.type_name.clone(),
        }
    }

    pub fn argument(&self, argument_name: Name) -> InterfaceFieldArgumentDefinitionPosition {
        InterfaceFieldArgumentDefinitionPosition {
            type_name: self.type_name.clone(),
            field_name: self.field_name.clone(),
            argument_name,
        }
    }

    pub fn get<'schema>(
        &self,
        schema: &'schema Schema,
    ) -> Result<&'schema Component<FieldDefinition>, PositionLookupError> {
        let parent = self.parent();
        parent.get(schema)?;

        schema
            .type_field(&self.type_name, &self.field_name)
            .map_err(|_| {
                PositionLookupError::MissingField(
                    "Interface type",
                    self.type_name.clone(),
                    self.field_name.clone(),
                )
            })
    }

    pub fn try_get<'schema>(
        &self,
        schema: &'schema Schema,
    ) -> Option<&'schema Component<FieldDefinition>> {
        self.get(schema).ok()
    }

    fn make_mut<'schema>(
        &self,
        schema: &'schema mut Schema,
    ) -> Result<&'schema mut Component<FieldDefinition>, PositionLookupError> {
        if is_graphql_reserved_name(&self.field_name) {
            return Err(PositionLookupError::MutateReservedField(
                "interface field",
                self.type_name.clone(),
                self.field_name.clone(),
            ));
        }
        let parent = self.parent();
        let type_ = parent.make_mut(schema)?.make_mut();
        type_.fields.get_mut(&self.field_name).ok_or_else(|| {
            PositionLookupError::MissingField(
                "Interface type",
                self.type_name.clone(),
                self.field_name.clone(),
            )
        })
    }

    fn try_make_mut<'schema>(
        &self,
        schema: &'schema mut Schema,
    ) -> Option<&'schema mut Component<FieldDefinition>> {
        if self.try_get(schema).is_some() {
            self.make_mut(schema).ok()
        } else {
            None
        }
    }

    pub fn insert(
        &self,
        schema: &mut CoreSchema,
        field: Component<FieldDefinition>,
    ) -> Result<(), SchemaError> {
        if self.field_name != field.name {
            bail!(
                "Interface field \"{}\" given field named \"{}\"",
                self,
                field.name,
            );
        }
        if is_graphql_reserved_name(&self.field_name) {
            return Err(PositionLookupError::MutateReservedField(
                "interface field",
                self.type_name.clone(),
                self.field_name.clone(),
            )
            .into());
        }
        let parent_type = self.parent().make_mut(&mut schema.schema)?;
        if parent_type.fields.contains_key(&self.field_name) {
            return Err(SchemaError::DuplicateName {
                message: format!("Field `{self}` already exists in schema"),
            });
        }
        parent_type
            .make_mut()
            .fields
            .insert(self.field_name.clone(), field);
        self.insert_references(self.get(&schema.schema)?, &mut schema.referencers, false)
    }

    pub fn remove(&self, schema: &mut CoreSchema) -> Result<(), SchemaError> {
        let Some(field) = self.try_get(&schema.schema) else {
            return Ok(());
        };
        self.remove_references(field, &mut schema.referencers, false)?;
        self.parent()
            .make_mut(&mut schema.schema)?
            .make_mut()
            .fields
            .shift_remove(&self.field_name);
        Ok(())
    }

    pub fn remove_recursive(&self, schema: &mut CoreSchema) -> Result<(), SchemaError> {
        self.remove(schema)?;
        let parent = self.parent();
        let Some(type_) = parent.try_get(&schema.schema) else {
            return Ok(());
        };
        if type_.fields.is_empty() {
            parent.remove_recursive(schema)?;
        }
        Ok(())
    }

    pub fn set_type(&self, schema: &mut CoreSchema, ty: ast::Type) -> Result<(), SchemaError> {
        check_output_type_reference(schema, ty.inner_named_type(), "Interface field", self)?;
        let field = self.make_mut(&mut schema.schema)?;
        let old_field = field.clone();
        field.make_mut().ty = ty;
        self.remove_type_references(&old_field, &mut schema.referencers);
        let field = self.get(&schema.schema)?.clone();
        self.insert_type_references(&field, &mut schema.referencers)
    }

    pub fn insert_directive(
        &self,
        schema: &mut CoreSchema,
        directive: Node<Directive>,
    ) -> Result<(), SchemaError> {
        let field = self.make_mut(&mut schema.schema)?;
        if field
            .directives
            .iter()
            .any(|other_directive| other_directive.ptr_eq(&directive))
        {
            bail!(
                "Directive application \"@{}\" already exists on interface field \"{}\"",
                directive.name,
                self,
            );
        }
        self.insert_directive_name_references(&mut schema.referencers, &directive.name)?;
        field.make_mut().directives.push(directive);
        Ok(())
    }

    pub fn remove_directive_name(&self, schema: &mut CoreSchema, name: &str) {
        let Some(field) = self.try_make_mut(&mut schema.schema) else {
            return;
        };
        self.remove_directive_name_references(&mut schema.referencers, name);
        field
            .make_mut()
            .directives
            .retain(|other_directive| other_directive.name != name);
    }

    pub fn remove_directive(&self, schema: &mut CoreSchema, directive: &Node<Directive>) {
        let Some(field) = self.try_make_mut(&mut schema.schema) else {
            return;
        };
        if !field.directives.iter().any(|other_directive| {
            (other_directive.name == directive.name) && !other_directive.ptr_eq(directive)
        }) {
            self.remove_directive_name_references(&mut schema.referencers, &directive.name);
        }
        field
            .make_mut()
            .directives
            .retain(|other_directive| !other_directive.ptr_eq(directive));
    }

    fn insert_references(
        &self,
        field: &Component<FieldDefinition>,
        referencers: &mut Referencers,
        allow_built_ins: bool,
    ) -> Result<(), SchemaError> {
        if !allow_built_ins && is_graphql_reserved_name(&self.field_name) {
            return Err(PositionLookupError::MutateReservedField(
                "interface field",
                self.type_name.clone(),
                self.field_name.clone(),
            )
            .into());
        }
        validate_node_directives(field.directives.deref())?;
        for directive_reference in field.directives.iter() {
            self.insert_directive_name_references(referencers, &directive_reference.name)?;
        }
        self.insert_type_references(field, referencers)?;
        validate_arguments(&field.arguments)?;
        for argument in field.arguments.iter() {
            self.argument(argument.name.clone())
                .insert_references(argument, referencers)?;
        }
        Ok(())
    }

    fn remove_references(
        &self,
        field: &Component<FieldDefinition>,
        referencers: &mut Referencers,
        allow_built_ins: bool,
    ) -> Result<(), SchemaError> {
        if !allow_built_ins && is_graphql_reserved_name(&self.field_name) {
            return Err(PositionLookupError::MutateReservedField(
                "interface field",
                self.type_name.clone(),
                self.field_name.clone(),
            )
            .into());
        }
        for directive_reference in field.directives.iter() {
            self.remove_directive_name_references(referencers, &directive_reference.name);
        }
        self.remove_type_references(field, referencers);
        for argument in field.arguments.iter() {
            self.argument(argument.name.clone())
                .remove_references(argument, referencers);
        }
        Ok(())
    }

    fn insert_directive_name_references(
        &self,
        referencers: &mut Referencers,
        name: &Name,
    ) -> Result<(), SchemaError> {
        let Some(directive_referencers) = referencers.directives.get_mut(name) else {
            return Err(SchemaError::UnknownDirective {
                name: name.to_string(),
            });
        };
        directive_referencers.interface_fields.insert(self.clone());
        Ok(())
    }

    fn remove_directive_name_references(&self, referencers: &mut Referencers, name: &str) {
        let Some(directive_referencers) = referencers.directives.get_mut(name) else {
            return;
        };
        directive_referencers.interface_fields.shift_remove(self);
    }

    fn insert_type_references(
        &self,
        field: &Component<FieldDefinition>,
        referencers: &mut Referencers,
    ) -> Result<(), SchemaError> {
        let output_type_reference = field.ty.inner_named_type();
        if let Some(scalar_type_referencers) =
            referencers.scalar_types.get_mut(output_type_reference)
        {
            scalar_type_referencers
                .interface_fields
                .insert(self.clone());
        } else if let Some(object_type_referencers) =
            referencers.object_types.get_mut(output_type_reference)
        {
            object_type_referencers
                .interface_fields
                .insert(self.clone());
        } else if let Some(interface_type_referencers) =
            referencers.interface_types.get_mut(output_type_reference)
        {
            interface_type_referencers
                .interface_fields
                .insert(self.clone());
        } else if let Some(union_type_referencers) =
            referencers.union_types.get_mut(output_type_reference)
        {
            union_type_referencers.interface_fields.insert(self.clone());
        } else if let Some(enum_type_referencers) =
            referencers.enum_types.get_mut(output_type_reference)
        {
            enum_type_referencers.interface_fields.insert(self.clone());
        } else {
            return Err(SchemaError::internal(format!(
                "Interface field \"{self}\"'s inner type \"{output_type_reference}\" does not refer to an existing output type.",
            )));
        }
        Ok(())
    }

    fn remove_type_references(
        &self,
        field: &Component<FieldDefinition>,
        referencers: &mut Referencers,
    ) {
        let output_type_reference = field.ty.inner_named_type();
        if let Some(scalar_type_referencers) =
            referencers.scalar_types.get_mut(output_type_reference)
        {
            scalar_type_referencers.interface_fields.shift_remove(self);
        } else if let Some(object_type_referencers) =
            referencers.object_types.get_mut(output_type_reference)
        {
            object_type_referencers.interface_fields.shift_remove(self);
        } else if let Some(interface_type_referencers) =
            referencers.interface_types.get_mut(output_type_reference)
        {
            interface_type_referencers
                .interface_fields
                .shift_remove(self);
        } else if let Some(union_type_referencers) =
            referencers.union_types.get_mut(output_type_reference)
        {
            union_type_referencers.interface_fields.shift_remove(self);
        } else if let Some(enum_type_referencers) =
            referencers.enum_types.get_mut(output_type_reference)
        {
            enum_type_referencers.interface_fields.shift_remove(self);
        }
    }

    fn rename_type(&self, schema: &mut Schema, new_name: Name) -> Result<(), PositionLookupError> {
        let field = self.make_mut(schema)?;
        rename_type(&mut field.make_mut().ty, new_name);
        Ok(())
    }
}

impl Display for InterfaceFieldDefinitionPosition {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.type_name, self.field_name)
    }
}

impl Debug for InterfaceFieldDefinitionPosition {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "InterfaceField({self})")
    }
}

#[derive(Clone, PartialEq, Eq, Hash, Serialize)]
pub struct InterfaceFieldArgumentDefinitionPosition {
    pub type_name: Name,
    pub field_name: Name,
    pub argument_name: Name,
}

impl InterfaceFieldArgumentDefinitionPosition {
    pub fn parent(&self) -> InterfaceFieldDefinitionPosition {
        InterfaceFieldDefinitionPosition {
            type_name: self.type_name.clone(),
            field_name: self.field_name.clone(),
        }
    }

    pub fn get<'schema>(
        &self,
        schema: &'schema Schema,
    ) -> Result<&'schema Node<InputValueDefinition>, PositionLookupError> {
        let parent = self.parent();
        let field = parent.get(schema)?;

        field
            .arguments
            .iter()
            .find(|a| a.name == self.argument_name)
            .ok_or_else(|| {
                PositionLookupError::MissingFieldArgument(
                    "Interface field",
                    self.type_name.clone(),
                    self.field_name.clone(),
                    self.argument_name.clone(),
                )
            })
    }

    pub fn try_get<'schema>(
        &self,
        schema: &'schema Schema,
    ) -> Option<&'schema Node<InputValueDefinition>> {
        self.get(schema).ok()
    }

    fn make_mut<'schema>(
        &self,
        schema: &'schema mut Schema,
    ) -> Result<&'schema mut Node<InputValueDefinition>, PositionLookupError> {
        let parent = self.parent();
        let field = parent.make_mut(schema)?.make_mut();

        field
            .arguments
            .iter_mut()
            .find(|a| a.name == self.argument_name)
            .ok_or_else(|| {
                PositionLookupError::MissingFieldArgument(
                    "Interface field",
                    self.type_name.clone(),
                    self.field_name.clone(),
                    self.argument_name.clone(),
                )
            })
    }

    fn try_make_mut<'schema>(
        &self,
        schema: &'schema mut Schema,
    ) -> Option<&'schema mut Node<InputValueDefinition>> {
        if self.try_get(schema).is_some() {
            self.make_mut(schema).ok()
        } else {
            None
        }
    }

    pub fn insert(
        &self,
        schema: &mut CoreSchema,
        argument: Node<InputValueDefinition>,
    ) -> Result<(), SchemaError> {
        if self.argument_name != argument.name {
            bail!(
                "Interface field argument \"{}\" given argument named \"{}\"",
                self,
                argument.name,
            );
        }
        let field = self.parent().make_mut(&mut schema.schema)?;
        if field.arguments.iter().any(|a| a.name == self.argument_name) {
            return Err(SchemaError::DuplicateName {
                message: format!("Argument `{self}` already exists in schema"),
            });
        }
        field.make_mut().arguments.push(argument);
        self.insert_references(self.get(&schema.schema)?, &mut schema.referencers)
    }

    pub fn remove(&self, schema: &mut CoreSchema) -> Result<(), SchemaError> {
        let Some(argument) = self.try_get(&schema.schema) else {
            return Ok(());
        };
        self.remove_references(argument, &mut schema.referencers);
        self.parent()
            .make_mut(&mut schema.schema)?
            .make_mut()
            .arguments
            .retain(|other_argument| other_argument.name != self.argument_name);
        Ok(())
    }

    pub fn set_type(&self, schema: &mut CoreSchema, ty: ast::Type) -> Result<(), SchemaError> {
        check_input_type_reference(schema, ty.inner_named_type(), "Interface field argument", self)?;
        let argument = self.make_mut(&mut schema.schema)?;
        let old_argument = argument.clone();
        argument.make_mut().ty = Node::new(ty);
        self.remove_type_references(&old_argument, &mut schema.referencers);
        let argument = self.get(&schema.schema)?.clone();
        self.insert_type_references(&argument, &mut schema.referencers)
    }

    pub fn insert_directive(
        &self,
        schema: &mut CoreSchema,
        directive: Node<Directive>,
    ) -> Result<(), SchemaError> {
        let argument = self.make_mut(&mut schema.schema)?;
        if argument
            .directives
            .iter()
            .any(|other_directive| other_directive.ptr_eq(&directive))
        {
            bail!(
                "Directive application \"@{}\" already exists on interface field argument \"{}\"",
                directive.name,
                self,
            );
        }
        self.insert_directive_name_references(&mut schema.referencers, &directive.name)?;
        argument.make_mut().directives.push(directive);
        Ok(())
    }

    pub fn remove_directive_name(&self, schema: &mut CoreSchema, name: &str) {
        let Some(argument) = self.try_make_mut(&mut schema.schema) else {
            return;
        };
        self.remove_directive_name_references(&mut schema.referencers, name);
        argument
            .make_mut()
            .directives
            .retain(|other_directive| other_directive.name != name);
    }

    pub fn remove_directive(&self, schema: &mut CoreSchema, directive: &Node<Directive>) {
        let Some(argument) = self.try_make_mut(&mut schema.schema) else {
            return;
        };
        if !argument.directives.iter().any(|other_directive| {
            (other_directive.name == directive.name) && !other_directive.ptr_eq(directive)
        }) {
            self.remove_directive_name_references(&mut schema.referencers, &directive.name);
        }
        argument
            .make_mut()
            .directives
            .retain(|other_directive| !other_directive.ptr_eq(directive));
    }

    fn insert_references(
        &self,
        argument: &Node<InputValueDefinition>,
        referencers: &mut Referencers,
    ) -> Result<(), SchemaError> {
        validate_node_directives(argument.directives.deref())?;
        for directive_reference in argument.directives.iter() {
            self.insert_directive_name_references(referencers, &directive_reference.name)?;
        }
        self.insert_type_references(argument, referencers)
    }

    fn remove_references(
        &self,
        argument: &Node<InputValueDefinition>,
        referencers: &mut Referencers,
    ) {
        for directive_reference in argument.directives.iter() {
            self.remove_directive_name_references(referencers, &directive_reference.name);
        }
        self.remove_type_references(argument, referencers);
    }

    fn insert_directive_name_references(
        &self,
        referencers: &mut Referencers,
        name: &Name,
    ) -> Result<(), SchemaError> {
        let Some(directive_referencers) = referencers.directives.get_mut(name) else {
            return Err(SchemaError::UnknownDirective {
                name: name.to_string(),
            });
        };
        directive_referencers
            .interface_field_arguments
            .insert(self.clone());
        Ok(())
    }

    fn remove_directive_name_references(&self, referencers: &mut Referencers, name: &str) {
        let Some(directive_referencers) = referencers.directives.get_mut(name) else {
            return;
        };
        directive_referencers
            .interface_field_arguments
            .shift_remove(self);
    }

    fn insert_type_references(
        &self,
        argument: &Node<InputValueDefinition>,
        referencers: &mut Referencers,
    ) -> Result<(), SchemaError> {
        let input_type_reference = argument.ty.inner_named_type();
        if let Some(scalar_type_referencers) =
            referencers.scalar_types.get_mut(input_type_reference)
        {
            scalar_type_referencers
                .interface_field_arguments
                .insert(self.clone());
        } else if let Some(enum_type_referencers) =
            referencers.enum_types.get_mut(input_type_reference)
        {
            enum_type_referencers
                .interface_field_arguments
                .insert(self.clone());
        } else if let Some(input_object_type_referencers) =
            referencers.input_object_types.get_mut(input_type_reference)
        {
            input_object_type_referencers
                .interface_field_arguments
                .insert(self.clone());
        } else {
            return Err(SchemaError::internal(format!(
                "Interface field argument \"{self}\"'s inner type \"{input_type_reference}\" does not refer to an existing input type.",
            )));
        }
        Ok(())
    }

    fn remove_type_references(
        &self,
        argument: &Node<InputValueDefinition>,
        referencers: &mut Referencers,
    ) {
        let input_type_reference = argument.ty.inner_named_type();
        if let Some(scalar_type_referencers) =
            referencers.scalar_types.get_mut(input_type_reference)
        {
            scalar_type_referencers
                .interface_field_arguments
                .shift_remove(self);
        } else if let Some(enum_type_referencers) =
            referencers.enum_types.get_mut(input_type_reference)
        {
            enum_type_referencers
                .interface_field_arguments
                .shift_remove(self);
        } else if let Some(input_object_type_referencers) =
            referencers.input_object_types.get_mut(input_type_reference)
        {
            input_object_type_referencers
                .interface_field_arguments
                .shift_remove(self);
        }
    }

    fn rename_type(&self, schema: &mut Schema, new_name: Name) -> Result<(), PositionLookupError> {
        let argument = self.make_mut(schema)?;
        let argument = argument.make_mut();
        let mut ty = argument.ty.deref().clone();
        rename_type(&mut ty, new_name);
        argument.ty = Node::new(ty);
        Ok(())
    }
}

impl Display for InterfaceFieldArgumentDefinitionPosition {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}.{}({}:)",
            self.type_name, self.field_name, self.argument_name
        )
    }
}

impl Debug for InterfaceFieldArgumentDefinitionPosition {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "InterfaceFieldArgument({self})")
    }
}

#[derive(Clone, PartialEq, Eq, Hash, Serialize)]
pub struct UnionTypeDefinitionPosition {
    pub type_name: Name,
}

impl UnionTypeDefinitionPosition {
    const EXPECTED: &'static str = "a union type";
    const KIND: &'static str = "union type";

    pub fn new(type_name: Name) -> Self {
        Self { type_name }
    }

    pub fn introspection_typename_field(&self) -> UnionTypenameFieldDefinitionPosition {
        UnionTypenameFieldDefinitionPosition {
            type_name: self.type_name.clone(),
        }
    }

    pub fn get<'schema>(
        &self,
        schema: &'schema Schema,
    ) -> Result<&'schema Node<UnionType>, PositionLookupError> {
        schema
            .types
            .get(&self.type_name)
            .ok_or_else(|| PositionLookupError::TypeMissing(self.type_name.clone()))
            .and_then(|type_| {
                if let ExtendedType::Union(type_) = type_ {
                    Ok(type_)
                } else {
                    Err(PositionLookupError::TypeWrongKind(
                        self.type_name.clone(),
                        Self::EXPECTED,
                    ))
                }
            })
    }

    pub fn try_get<'schema>(&self, schema: &'schema Schema) -> Option<&'schema Node<UnionType>> {
        self.get(schema).ok()
    }

    fn make_mut<'schema>(
        &self,
        schema: &'schema mut Schema,
    ) -> Result<&'schema mut Node<UnionType>, PositionLookupError> {
        if builtins::is_built_in_type_name(&self.type_name) {
            return Err(PositionLookupError::MutateBuiltIn(
                Self::KIND,
                self.type_name.clone(),
            ));
        }
        schema
            .types
            .get_mut(&self.type_name)
            .ok_or_else(|| PositionLookupError::TypeMissing(self.type_name.clone()))
            .and_then(|type_| {
                if let ExtendedType::Union(type_) = type_ {
                    Ok(type_)
                } else {
                    Err(PositionLookupError::TypeWrongKind(
                        self.type_name.clone(),
                        Self::EXPECTED,
                    ))
                }
            })
    }

    fn try_make_mut<'schema>(
        &self,
        schema: &'schema mut Schema,
    ) -> Option<&'schema mut Node<UnionType>> {
        if self.try_get(schema).is_some() {
            self.make_mut(schema).ok()
        } else {
            None
        }
    }

    pub fn pre_insert(&self, schema: &mut CoreSchema) -> Result<(), SchemaError> {
        if schema.referencers.contains_type_name(&self.type_name) {
            return Err(SchemaError::DuplicateName {
                message: format!("Type `{self}` already exists in schema"),
            });
        }
        schema
            .referencers
            .union_types
            .insert(self.type_name.clone(), Default::default());
        Ok(())
    }

    pub fn insert(&self, schema: &mut CoreSchema, type_: Node<UnionType>) -> Result<(), SchemaError> {
        if self.type_name != type_.name {
            bail!("Union type \"{}\" given type named \"{}\"", self, type_.name);
        }
        if !schema.referencers.union_types.contains_key(&self.type_name) {
            bail!("Type \"{}\" has not been pre-inserted", self);
        }
        if schema.schema.types.contains_key(&self.type_name) {
            return Err(SchemaError::DuplicateName {
                message: format!("Type `{self}` already exists in schema"),
            });
        }
        schema
            .schema
            .types
            .insert(self.type_name.clone(), ExtendedType::Union(type_));
        self.insert_references(self.get(&schema.schema)?, &mut schema.referencers)
    }

    pub fn remove(&self, schema: &mut CoreSchema) -> Result<Option<UnionTypeReferencers>, SchemaError> {
        let Some(referencers) = self.remove_internal(schema)? else {
            return Ok(None);
        };
        for field in &referencers.object_fields {
            field.remove(schema)?;
        }
        for field in &referencers.interface_fields {
            field.remove(schema)?;
        }
        Ok(Some(referencers))
    }

    pub fn remove_recursive(&self, schema: &mut CoreSchema) -> Result<(), SchemaError> {
        let Some(referencers) = self.remove_internal(schema)? else {
            return Ok(());
        };
        for field in referencers.object_fields {
            field.remove_recursive(schema)?;
        }
        for field in referencers.interface_fields {
            field.remove_recursive(schema)?;
        }
        Ok(())
    }

    fn remove_internal(
        &self,
        schema: &mut CoreSchema,
    ) -> Result<Option<UnionTypeReferencers>, SchemaError> {
        if builtins::is_built_in_type_name(&self.type_name) {
            return Err(PositionLookupError::MutateBuiltIn(Self::KIND, self.type_name.clone()).into());
        }
        let Some(type_) = self.try_get(&schema.schema) else {
            return Ok(None);
        };
        self.remove_references(type_, &mut schema.referencers);
        schema.schema.types.shift_remove(&self.type_name);
        Ok(Some(
            schema
                .referencers
                .union_types
                .shift_remove(&self.type_name)
                .ok_or_else(|| {
                    SchemaError::internal(format!(
                        "Schema missing referencers for type \"{self}\"",
                    ))
                })?,
        ))
    }

    pub fn rename(&self, schema: &mut CoreSchema, new_name: Name) -> Result<(), SchemaError> {
        rename_guards(Self::KIND, &self.type_name, &new_name, schema)?;
        self.make_mut(&mut schema.schema)?.make_mut().name = new_name.clone();
        rekey_schema_type(&mut schema.schema, &self.type_name, &new_name);
        let referencers = schema
            .referencers
            .union_types
            .swap_remove(&self.type_name)
            .ok_or_else(|| {
                SchemaError::internal(format!("Schema missing referencers for type \"{self}\""))
            })?;
        for field in &referencers.object_fields {
            field.rename_type(&mut schema.schema, new_name.clone())?;
        }
        for field in &referencers.interface_fields {
            field.rename_type(&mut schema.schema, new_name.clone())?;
        }
        schema
            .referencers
            .union_types
            .insert(new_name.clone(), referencers);
        schema
            .referencers
            .rename_union_type(&self.type_name, &new_name);
        Ok(())
    }

    pub fn insert_directive(
        &self,
        schema: &mut CoreSchema,
        directive: Component<Directive>,
    ) -> Result<(), SchemaError> {
        let type_ = self.make_mut(&mut schema.schema)?;
        if type_
            .directives
            .iter()
            .any(|other_directive| other_directive.ptr_eq(&directive))
        {
            bail!(
                "Directive application \"@{}\" already exists on union type \"{}\"",
                directive.name,
                self,
            );
        }
        self.insert_directive_name_references(&mut schema.referencers, &directive.name)?;
        type_.make_mut().directives.push(directive);
        Ok(())
    }

    pub fn remove_directive_name(&self, schema: &mut CoreSchema, name: &str) {
        let Some(type_) = self.try_make_mut(&mut schema.schema) else {
            return;
        };
        self.remove_directive_name_references(&mut schema.referencers, name);
        type_
            .make_mut()
            .directives
            .retain(|other_directive| other_directive.name != name);
    }

    pub fn remove_directive(&self, schema: &mut CoreSchema, directive: &Component<Directive>) {
        let Some(type_) = self.try_make_mut(&mut schema.schema) else {
            return;
        };
        if !type_.directives.iter().any(|other_directive| {
            (other_directive.name == directive.name) && !other_directive.ptr_eq(directive)
        }) {
            self.remove_directive_name_references(&mut schema.referencers, &directive.name);
        }
        type_
            .make_mut()
            .directives
            .retain(|other_directive| !other_directive.ptr_eq(directive));
    }

    pub fn insert_member(
        &self,
        schema: &mut CoreSchema,
        name: ComponentName,
    ) -> Result<(), SchemaError> {
        let type_ = self.make_mut(&mut schema.schema)?;
        type_.make_mut().members.insert(name.clone());
        self.insert_member_references(&mut schema.referencers, &name)
    }

    pub fn remove_member(&self, schema: &mut CoreSchema, name: &str) {
        let Some(type_) = self.try_make_mut(&mut schema.schema) else {
            return;
        };
        self.remove_member_references(&mut schema.referencers, name);
        type_
            .make_mut()
            .members
            .retain(|other_type| other_type.name != name);
    }

    /// Remove a member from this union. If the union is left with no members,
    /// remove the union recursively as well.
    pub fn remove_member_recursive(&self, schema: &mut CoreSchema, name: &str) -> Result<(), SchemaError> {
        self.remove_member(schema, name);
        let Some(type_) = self.try_get(&schema.schema) else {
            return Ok(());
        };
        if type_.members.is_empty() {
            self.remove_recursive(schema)?;
        }
        Ok(())
    }

    fn rename_member(
        &self,
        schema: &mut Schema,
        old_name: &Name,
        new_name: Name,
    ) -> Result<(), PositionLookupError> {
        let type_ = self.make_mut(schema)?.make_mut();
        type_.members = type_
            .members
            .iter()
            .map(|other_type| {
                if other_type.name == *old_name {
                    ComponentName {
                        origin: other_type.origin.clone(),
                        name: new_name.clone(),
                    }
                } else {
                    other_type.clone()
                }
            })
            .collect();
        Ok(())
    }

    fn insert_references(
        &self,
        type_: &Node<UnionType>,
        referencers: &mut Referencers,
    ) -> Result<(), SchemaError> {
        validate_component_directives(type_.directives.deref())?;
        for directive_reference in type_.directives.iter() {
            self.insert_directive_name_references(referencers, &directive_reference.name)?;
        }
        for object_type_reference in type_.members.iter() {
            self.insert_member_references(referencers, object_type_reference)?;
        }
        self.introspection_typename_field()
            .insert_type_references(referencers)
    }

    fn remove_references(&self, type_: &Node<UnionType>, referencers: &mut Referencers) {
        for directive_reference in type_.directives.iter() {
            self.remove_directive_name_references(referencers, &directive_reference.name);
        }
        for object_type_reference in type_.members.iter() {
            self.remove_member_references(referencers, object_type_reference);
        }
        self.introspection_typename_field()
            .remove_type_references(referencers);
    }

    fn insert_directive_name_references(
        &self,
        referencers: &mut Referencers,
        name: &Name,
    ) -> Result<(), SchemaError> {
        let Some(directive_referencers) = referencers.directives.get_mut(name) else {
            return Err(SchemaError::UnknownDirective {
                name: name.to_string(),
            });
        };
        directive_referencers.union_types.insert(self.clone());
        Ok(())
    }

    fn remove_directive_name_references(&self, referencers: &mut Referencers, name: &str) {
        let Some(directive_referencers) = referencers.directives.get_mut(name) else {
            return;
        };
        directive_referencers.union_types.shift_remove(self);
    }

    fn insert_member_references(
        &self,
        referencers: &mut Referencers,
        name: &str,
    ) -> Result<(), SchemaError> {
        let Some(object_type_referencers) = referencers.object_types.get_mut(name) else {
            return Err(SchemaError::UnknownType {
                name: name.to_string(),
            });
        };
        object_type_referencers.union_types.insert(self.clone());
        Ok(())
    }

    fn remove_member_references(&self, referencers: &mut Referencers, name: &str) {
        let Some(object_type_referencers) = referencers.object_types.get_mut(name) else {
            return;
        };
        object_type_referencers.union_types.shift_remove(self);
    }
}

impl Display for UnionTypeDefinitionPosition {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.type_name)
    }
}

impl Debug for UnionTypeDefinitionPosition {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Union({self})")
    }
}

/// The `__typename` field of a union type. Unions have no other fields, and
/// this one is immutable, so this position only supports reads and referencer
/// bookkeeping.
#[derive(Clone, PartialEq, Eq, Hash, Serialize)]
pub struct UnionTypenameFieldDefinitionPosition {
    pub type_name: Name,
}

impl UnionTypenameFieldDefinitionPosition {
    pub fn field_name(&self) -> &Name {
        &INTROSPECTION_TYPENAME_FIELD_NAME
    }

    pub fn parent(&self) -> UnionTypeDefinitionPosition {
        UnionTypeDefinitionPosition {
            type_name: self.type_name.clone(),
        }
    }

    pub fn get<'schema>(
        &self,
        schema: &'schema Schema,
    ) -> Result<&'schema Component<FieldDefinition>, PositionLookupError> {
        let parent = self.parent();
        parent.get(schema)?;

        schema
            .type_field(&self.type_name, self.field_name())
            .map_err(|_| {
                PositionLookupError::MissingField(
                    "Union type",
                    self.type_name.clone(),
                    name!("__typename"),
                )
            })
    }

    pub fn try_get<'schema>(
        &self,
        schema: &'schema Schema,
    ) -> Option<&'schema Component<FieldDefinition>> {
        self.get(schema).ok()
    }

    fn insert_type_references(&self, referencers: &mut Referencers) -> Result<(), SchemaError> {
        let output_type_reference = "String";
        let Some(scalar_type_referencers) =
            referencers.scalar_types.get_mut(output_type_reference)
        else {
            return Err(SchemaError::internal(format!(
                "Union typename field \"{self}\"'s type \"{output_type_reference}\" does not refer to an existing scalar type.",
            )));
        };
        scalar_type_referencers.union_fields.insert(self.clone());
        Ok(())
    }

    fn remove_type_references(&self, referencers: &mut Referencers) {
        let output_type_reference = "String";
        let Some(scalar_type_referencers) =
            referencers.scalar_types.get_mut(output_type_reference)
        else {
            return;
        };
        scalar_type_referencers.union_fields.shift_remove(self);
    }
}

impl Display for UnionTypenameFieldDefinitionPosition {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.type_name, self.field_name())
    }
}

impl Debug for UnionTypenameFieldDefinitionPosition {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "UnionField({self})")
    }
}

#[derive(Clone, PartialEq, Eq, Hash, Serialize)]
pub struct EnumTypeDefinitionPosition {
    pub type_name: Name,
}

impl EnumTypeDefinitionPosition {
    const EXPECTED: &'static str = "an enum type";
    const KIND: &'static str = "enum type";

    pub fn value(&self, value_name: Name) -> EnumValueDefinitionPosition {
        EnumValueDefinitionPosition {
            type_name: self.type_name.clone(),
            value_name,
        }
    }

    pub fn get<'schema>(
        &self,
        schema: &'schema Schema,
    ) -> Result<&'schema Node<EnumType>, PositionLookupError> {
        schema
            .types
            .get(&self.type_name)
            .ok_or_else(|| PositionLookupError::TypeMissing(self.type_name.clone()))
            .and_then(|type_| {
                if let ExtendedType::Enum(type_) = type_ {
                    Ok(type_)
                } else {
                    Err(PositionLookupError::TypeWrongKind(
                        self.type_name.clone(),
                        Self::EXPECTED,
                    ))
                }
            })
    }

    pub fn try_get<'schema>(&self, schema: &'schema Schema) -> Option<&'schema Node<EnumType>> {
        self.get(schema).ok()
    }

    fn make_mut<'schema>(
        &self,
        schema: &'schema mut Schema,
    ) -> Result<&'schema mut Node<EnumType>, PositionLookupError> {
        if builtins::is_built_in_type_name(&self.type_name) {
            return Err(PositionLookupError::MutateBuiltIn(
                Self::KIND,
                self.type_name.clone(),
            ));
        }
        schema
            .types
            .get_mut(&self.type_name)
            .ok_or_else(|| PositionLookupError::TypeMissing(self.type_name.clone()))
            .and_then(|type_| {
                if let ExtendedType::Enum(type_) = type_ {
                    Ok(type_)
                } else {
                    Err(PositionLookupError::TypeWrongKind(
                        self.type_name.clone(),
                        Self::EXPECTED,
                    ))
                }
            })
    }

    fn try_make_mut<'schema>(
        &self,
        schema: &'schema mut Schema,
    ) -> Option<&'schema mut Node<EnumType>> {
        if self.try_get(schema).is_some() {
            self.make_mut(schema).ok()
        } else {
            None
        }
    }

    pub fn pre_insert(&self, schema: &mut CoreSchema) -> Result<(), SchemaError> {
        if schema.referencers.contains_type_name(&self.type_name) {
            return Err(SchemaError::DuplicateName {
                message: format!("Type `{self}` already exists in schema"),
            });
        }
        schema
            .referencers
            .enum_types
            .insert(self.type_name.clone(), Default::default());
        Ok(())
    }

    pub fn insert(&self, schema: &mut CoreSchema, type_: Node<EnumType>) -> Result<(), SchemaError> {
        if self.type_name != type_.name {
            bail!("Enum type \"{}\" given type named \"{}\"", self, type_.name);
        }
        if !schema.referencers.enum_types.contains_key(&self.type_name) {
            bail!("Type \"{}\" has not been pre-inserted", self);
        }
        if schema.schema.types.contains_key(&self.type_name) {
            return Err(SchemaError::DuplicateName {
                message: format!("Type `{self}` already exists in schema"),
            });
        }
        schema
            .schema
            .types
            .insert(self.type_name.clone(), ExtendedType::Enum(type_));
        self.insert_references(self.get(&schema.schema)?, &mut schema.referencers)
    }

    /// Remove this enum from the schema, along with all fields and arguments
    /// of this type.
    pub fn remove(&self, schema: &mut CoreSchema) -> Result<Option<EnumTypeReferencers>, SchemaError> {
        let Some(referencers) = self.remove_internal(schema)? else {
            return Ok(None);
        };
        for field in &referencers.object_fields {
            field.remove(schema)?;
        }
        for argument in &referencers.object_field_arguments {
            argument.remove(schema)?;
        }
        for field in &referencers.interface_fields {
            field.remove(schema)?;
        }
        for argument in &referencers.interface_field_arguments {
            argument.remove(schema)?;
        }
        for field in &referencers.input_object_fields {
            field.remove(schema)?;
        }
        for argument in &referencers.directive_arguments {
            argument.remove(schema)?;
        }
        Ok(Some(referencers))
    }

    fn remove_internal(
        &self,
        schema: &mut CoreSchema,
    ) -> Result<Option<EnumTypeReferencers>, SchemaError> {
        if builtins::is_built_in_type_name(&self.type_name) {
            return Err(PositionLookupError::MutateBuiltIn(Self::KIND, self.type_name.clone()).into());
        }
        let Some(type_) = self.try_get(&schema.schema) else {
            return Ok(None);
        };
        self.remove_references(type_, &mut schema.referencers)?;
        schema.schema.types.shift_remove(&self.type_name);
        Ok(Some(
            schema
                .referencers
                .enum_types
                .shift_remove(&self.type_name)
                .ok_or_else(|| {
                    SchemaError::internal(format!(
                        "Schema missing referencers for type \"{self}\"",
                    ))
                })?,
        ))
    }

    pub fn rename(&self, schema: &mut CoreSchema, new_name: Name) -> Result<(), SchemaError> {
        rename_guards(Self::KIND, &self.type_name, &new_name, schema)?;
        self.make_mut(&mut schema.schema)?.make_mut().name = new_name.clone();
        rekey_schema_type(&mut schema.schema, &self.type_name, &new_name);
        let referencers = schema
            .referencers
            .enum_types
            .swap_remove(&self.type_name)
            .ok_or_else(|| {
                SchemaError::internal(format!("Schema missing referencers for type \"{self}\""))
            })?;
        for field in &referencers.object_fields {
            field.rename_type(&mut schema.schema, new_name.clone())?;
        }
        for argument in &referencers.object_field_arguments {
            argument.rename_type(&mut schema.schema, new_name.clone())?;
        }
        for field in &referencers.interface_fields {
            field.rename_type(&mut schema.schema, new_name.clone())?;
        }
        for argument in &referencers.interface_field_arguments {
            argument.rename_type(&mut schema.schema, new_name.clone())?;
        }
        for field in &referencers.input_object_fields {
            field.rename_type(&mut schema.schema, new_name.clone())?;
        }
        for argument in &referencers.directive_arguments {
            argument.rename_type(&mut schema.schema, new_name.clone())?;
        }
        schema
            .referencers
            .enum_types
            .insert(new_name.clone(), referencers);
        schema
            .referencers
            .rename_enum_type(&self.type_name, &new_name);
        Ok(())
    }

    pub fn insert_directive(
        &self,
        schema: &mut CoreSchema,
        directive: Component<Directive>,
    ) -> Result<(), SchemaError> {
        let type_ = self.make_mut(&mut schema.schema)?;
        if type_
            .directives
            .iter()
            .any(|other_directive| other_directive.ptr_eq(&directive))
        {
            bail!(
                "Directive application \"@{}\" already exists on enum type \"{}\"",
                directive.name,
                self,
            );
        }
        self.insert_directive_name_references(&mut schema.referencers, &directive.name)?;
        type_.make_mut().directives.push(directive);
        Ok(())
    }

    pub fn remove_directive_name(&self, schema: &mut CoreSchema, name: &str) {
        let Some(type_) = self.try_make_mut(&mut schema.schema) else {
            return;
        };
        self.remove_directive_name_references(&mut schema.referencers, name);
        type_
            .make_mut()
            .directives
            .retain(|other_directive| other_directive.name != name);
    }

    pub fn remove_directive(&self, schema: &mut CoreSchema, directive: &Component<Directive>) {
        let Some(type_) = self.try_make_mut(&mut schema.schema) else {
            return;
        };
        if !type_.directives.iter().any(|other_directive| {
            (other_directive.name == directive.name) && !other_directive.ptr_eq(directive)
        }) {
            self.remove_directive_name_references(&mut schema.referencers, &directive.name);
        }
        type_
            .make_mut()
            .directives
            .retain(|other_directive| !other_directive.ptr_eq(directive));
    }

    fn insert_references(
        &self,
        type_: &Node<EnumType>,
        referencers: &mut Referencers,
    ) -> Result<(), SchemaError> {
        validate_component_directives(type_.directives.deref())?;
        for directive_reference in type_.directives.iter() {
            self.insert_directive_name_references(referencers, &directive_reference.name)?;
        }
        for (value_name, value) in type_.values.iter() {
            self.value(value_name.clone())
                .insert_references(value, referencers)?;
        }
        Ok(())
    }

    fn remove_references(
        &self,
        type_: &Node<EnumType>,
        referencers: &mut Referencers,
    ) -> Result<(), SchemaError> {
        for directive_reference in type_.directives.iter() {
            self.remove_directive_name_references(referencers, &directive_reference.name);
        }
        for (value_name, value) in type_.values.iter() {
            self.value(value_name.clone())
                .remove_references(value, referencers)?;
        }
        Ok(())
    }

    fn insert_directive_name_references(
        &self,
        referencers: &mut Referencers,
        name: &Name,
    ) -> Result<(), SchemaError> {
        let Some(directive_referencers) = referencers.directives.get_mut(name) else {
            return Err(SchemaError::UnknownDirective {
                name: name.to_string(),
            });
        };
        directive_referencers.enum_types.insert(self.clone());
        Ok(())
    }

    fn remove_directive_name_references(&self, referencers: &mut Referencers, name: &str) {
        let Some(directive_referencers) = referencers.directives.get_mut(name) else {
            return;
        };
        directive_referencers.enum_types.shift_remove(self);
    }
}

impl Display for EnumTypeDefinitionPosition {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.type_name)
    }
}

impl Debug for EnumTypeDefinitionPosition {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Enum({self})")
    }
}

#[derive(Clone, PartialEq, Eq, Hash, Serialize)]
pub struct EnumValueDefinitionPosition {
    pub type_name: Name,
    pub value_name: Name,
}

impl EnumValueDefinitionPosition {
    pub fn parent(&self) -> EnumTypeDefinitionPosition {
        EnumTypeDefinitionPosition {
            type_name: self.type_name.clone(),
        }
    }

    pub fn get<'schema>(
        &self,
        schema: &'schema Schema,
    ) -> Result<&'schema Component<EnumValueDefinition>, PositionLookupError> {
        let parent = self.parent();
        let type_ = parent.get(schema)?;

        type_
            .values
            .get(&self.value_name)
            .ok_or_else(|| PositionLookupError::MissingValue(self.clone()))
    }

    pub fn try_get<'schema>(
        &self,
        schema: &'schema Schema,
    ) -> Option<&'schema Component<EnumValueDefinition>> {
        self.get(schema).ok()
    }

    fn make_mut<'schema>(
        &self,
        schema: &'schema mut Schema,
    ) -> Result<&'schema mut Component<EnumValueDefinition>, PositionLookupError> {
        let parent = self.parent();
        let type_ = parent.make_mut(schema)?.make_mut();

        type_
            .values
            .get_mut(&self.value_name)
            .ok_or_else(|| PositionLookupError::MissingValue(self.clone()))
    }

    fn try_make_mut<'schema>(
        &self,
        schema: &'schema mut Schema,
    ) -> Option<&'schema mut Component<EnumValueDefinition>> {
        if self.try_get(schema).is_some() {
            self.make_mut(schema).ok()
        } else {
            None
        }
    }

    pub fn insert(
        &self,
        schema: &mut CoreSchema,
        value: Component<EnumValueDefinition>,
    ) -> Result<(), SchemaError> {
        if self.value_name != value.value {
            bail!("Enum value \"{}\" given value named \"{}\"", self, value.value);
        }
        let parent_type = self.parent().make_mut(&mut schema.schema)?;
        if parent_type.values.contains_key(&self.value_name) {
            return Err(SchemaError::DuplicateName {
                message: format!("Value `{self}` already exists in schema"),
            });
        }
        parent_type
            .make_mut()
            .values
            .insert(self.value_name.clone(), value);
        self.insert_references(self.get(&schema.schema)?, &mut schema.referencers)
    }

    pub fn remove(&self, schema: &mut CoreSchema) -> Result<(), SchemaError> {
        let Some(value) = self.try_get(&schema.schema) else {
            return Ok(());
        };
        self.remove_references(value, &mut schema.referencers)?;
        self.parent()
            .make_mut(&mut schema.schema)?
            .make_mut()
            .values
            .shift_remove(&self.value_name);
        Ok(())
    }

    pub fn insert_directive(
        &self,
        schema: &mut CoreSchema,
        directive: Node<Directive>,
    ) -> Result<(), SchemaError> {
        let value = self.make_mut(&mut schema.schema)?;
        if value
            .directives
            .iter()
            .any(|other_directive| other_directive.ptr_eq(&directive))
        {
            bail!(
                "Directive application \"@{}\" already exists on enum value \"{}\"",
                directive.name,
                self,
            );
        }
        self.insert_directive_name_references(&mut schema.referencers, &directive.name)?;
        value.make_mut().directives.push(directive);
        Ok(())
    }

    pub fn remove_directive_name(&self, schema: &mut CoreSchema, name: &str) {
        let Some(value) = self.try_make_mut(&mut schema.schema) else {
            return;
        };
        self.remove_directive_name_references(&mut schema.referencers, name);
        value
            .make_mut()
            .directives
            .retain(|other_directive| other_directive.name != name);
    }

    pub fn remove_directive(&self, schema: &mut CoreSchema, directive: &Node<Directive>) {
        let Some(value) = self.try_make_mut(&mut schema.schema) else {
            return;
        };
        if !value.directives.iter().any(|other_directive| {
            (other_directive.name == directive.name) && !other_directive.ptr_eq(directive)
        }) {
            self.remove_directive_name_references(&mut schema.referencers, &directive.name);
        }
        value
            .make_mut()
            .directives
            .retain(|other_directive| !other_directive.ptr_eq(directive));
    }

    fn insert_references(
        &self,
        value: &Component<EnumValueDefinition>,
        referencers: &mut Referencers,
    ) -> Result<(), SchemaError> {
        validate_node_directives(value.directives.deref())?;
        for directive_reference in value.directives.iter() {
            self.insert_directive_name_references(referencers, &directive_reference.name)?;
        }
        Ok(())
    }

    fn remove_references(
        &self,
        value: &Component<EnumValueDefinition>,
        referencers: &mut Referencers,
    ) -> Result<(), SchemaError> {
        for directive_reference in value.directives.iter() {
            self.remove_directive_name_references(referencers, &directive_reference.name);
        }
        Ok(())
    }

    fn insert_directive_name_references(
        &self,
        referencers: &mut Referencers,
        name: &Name,
    ) -> Result<(), SchemaError> {
        let Some(directive_referencers) = referencers.directives.get_mut(name) else {
            return Err(SchemaError::UnknownDirective {
                name: name.to_string(),
            });
        };
        directive_referencers.enum_values.insert(self.clone());
        Ok(())
    }

    fn remove_directive_name_references(&self, referencers: &mut Referencers, name: &str) {
        let Some(directive_referencers) = referencers.directives.get_mut(name) else {
            return;
        };
        directive_referencers.enum_values.shift_remove(self);
    }
}

impl Display for EnumValueDefinitionPosition {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.type_name, self.value_name)
    }
}

impl Debug for EnumValueDefinitionPosition {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "EnumValue({self})")
    }
}

#[derive(Clone, PartialEq, Eq, Hash, Serialize)]
pub struct InputObjectTypeDefinitionPosition {
    pub type_name: Name,
}

impl InputObjectTypeDefinitionPosition {
    const EXPECTED: &'static str = "an input object type";
    const KIND: &'static str = "input object type";

    pub fn field(&self, field_name: Name) -> InputObjectFieldDefinitionPosition {
        InputObjectFieldDefinitionPosition {
            type_name: self.type_name.clone(),
            field_name,
        }
    }

    pub fn get<'schema>(
        &self,
        schema: &'schema Schema,
    ) -> Result<&'schema Node<InputObjectType>, PositionLookupError> {
        schema
            .types
            .get(&self.type_name)
            .ok_or_else(|| PositionLookupError::TypeMissing(self.type_name.clone()))
            .and_then(|type_| {
                if let ExtendedType::InputObject(type_) = type_ {
                    Ok(type_)
                } else {
                    Err(PositionLookupError::TypeWrongKind(
                        self.type_name.clone(),
                        Self::EXPECTED,
                    ))
                }
            })
    }

    pub fn try_get<'schema>(
        &self,
        schema: &'schema Schema,
    ) -> Option<&'schema Node<InputObjectType>> {
        self.get(schema).ok()
    }

    fn make_mut<'schema>(
        &self,
        schema: &'schema mut Schema,
    ) -> Result<&'schema mut Node<InputObjectType>, PositionLookupError> {
        if builtins::is_built_in_type_name(&self.type_name) {
            return Err(PositionLookupError::MutateBuiltIn(
                Self::KIND,
                self.type_name.clone(),
            ));
        }
        schema
            .types
            .get_mut(&self.type_name)
            .ok_or_else(|| PositionLookupError::TypeMissing(self.type_name.clone()))
            .and_then(|type_| {
                if let ExtendedType::InputObject(type_) = type_ {
                    Ok(type_)
                } else {
                    Err(PositionLookupError::TypeWrongKind(
                        self.type_name.clone(),
                        Self::EXPECTED,
                    ))
                }
            })
    }

    fn try_make_mut<'schema>(
        &self,
        schema: &'schema mut Schema,
    ) -> Option<&'schema mut Node<InputObjectType>> {
        if self.try_get(schema).is_some() {
            self.make_mut(schema).ok()
        } else {
            None
        }
    }

    pub fn pre_insert(&self, schema: &mut CoreSchema) -> Result<(), SchemaError> {
        if schema.referencers.contains_type_name(&self.type_name) {
            return Err(SchemaError::DuplicateName {
                message: format!("Type `{self}` already exists in schema"),
            });
        }
        schema
            .referencers
            .input_object_types
            .insert(self.type_name.clone(), Default::default());
        Ok(())
    }

    pub fn insert(
        &self,
        schema: &mut CoreSchema,
        type_: Node<InputObjectType>,
    ) -> Result<(), SchemaError> {
        if self.type_name != type_.name {
            bail!(
                "Input object type \"{}\" given type named \"{}\"",
                self,
                type_.name,
            );
        }
        if !schema
            .referencers
            .input_object_types
            .contains_key(&self.type_name)
        {
            bail!("Type \"{}\" has not been pre-inserted", self);
        }
        if schema.schema.types.contains_key(&self.type_name) {
            return Err(SchemaError::DuplicateName {
                message: format!("Type `{self}` already exists in schema"),
            });
        }
        schema
            .schema
            .types
            .insert(self.type_name.clone(), ExtendedType::InputObject(type_));
        self.insert_references(self.get(&schema.schema)?, &mut schema.referencers)
    }

    pub fn remove(
        &self,
        schema: &mut CoreSchema,
    ) -> Result<Option<InputObjectTypeReferencers>, SchemaError> {
        let Some(referencers) = self.remove_internal(schema)? else {
            return Ok(None);
        };
        for argument in &referencers.object_field_arguments {
            argument.remove(schema)?;
        }
        for argument in &referencers.interface_field_arguments {
            argument.remove(schema)?;
        }
        for field in &referencers.input_object_fields {
            field.remove(schema)?;
        }
        for argument in &referencers.directive_arguments {
            argument.remove(schema)?;
        }
        Ok(Some(referencers))
    }

    pub fn remove_recursive(&self, schema: &mut CoreSchema) -> Result<(), SchemaError> {
        let Some(referencers) = self.remove_internal(schema)? else {
            return Ok(());
        };
        for argument in referencers.object_field_arguments {
            argument.remove(schema)?;
        }
        for argument in referencers.interface_field_arguments {
            argument.remove(schema)?;
        }
        for field in referencers.input_object_fields {
            field.remove_recursive(schema)?;
        }
        for argument in referencers.directive_arguments {
            argument.remove(schema)?;
        }
        Ok(())
    }

    fn remove_internal(
        &self,
        schema: &mut CoreSchema,
    ) -> Result<Option<InputObjectTypeReferencers>, SchemaError> {
        if builtins::is_built_in_type_name(&self.type_name) {
            return Err(PositionLookupError::MutateBuiltIn(Self::KIND, self.type_name.clone()).into());
        }
        let Some(type_) = self.try_get(&schema.schema) else {
            return Ok(None);
        };
        self.remove_references(type_, &mut schema.referencers)?;
        schema.schema.types.shift_remove(&self.type_name);
        Ok(Some(
            schema
                .referencers
                .input_object_types
                .shift_remove(&self.type_name)
                .ok_or_else(|| {
                    SchemaError::internal(format!(
                        "Schema missing referencers for type \"{self}\"",
                    ))
                })?,
        ))
    }

    pub fn rename(&self, schema: &mut CoreSchema, new_name: Name) -> Result<(), SchemaError> {
        rename_guards(Self::KIND, &self.type_name, &new_name, schema)?;
        self.make_mut(&mut schema.schema)?.make_mut().name = new_name.clone();
        rekey_schema_type(&mut schema.schema, &self.type_name, &new_name);
        let referencers = schema
            .referencers
            .input_object_types
            .swap_remove(&self.type_name)
            .ok_or_else(|| {
                SchemaError::internal(format!("Schema missing referencers for type \"{self}\""))
            })?;
        for argument in &referencers.object_field_arguments {
            argument.rename_type(&mut schema.schema, new_name.clone())?;
        }
        for argument in &referencers.interface_field_arguments {
            argument.rename_type(&mut schema.schema, new_name.clone())?;
        }
        for field in &referencers.input_object_fields {
            field.rename_type(&mut schema.schema, new_name.clone())?;
        }
        for argument in &referencers.directive_arguments {
            argument.rename_type(&mut schema.schema, new_name.clone())?;
        }
        schema
            .referencers
            .input_object_types
            .insert(new_name.clone(), referencers);
        schema
            .referencers
            .rename_input_object_type(&self.type_name, &new_name);
        Ok(())
    }

    pub fn insert_directive(
        &self,
        schema: &mut CoreSchema,
        directive: Component<Directive>,
    ) -> Result<(), SchemaError> {
        let type_ = self.make_mut(&mut schema.schema)?;
        if type_
            .directives
            .iter()
            .any(|other_directive| other_directive.ptr_eq(&directive))
        {
            bail!(
                "Directive application \"@{}\" already exists on input object type \"{}\"",
                directive.name,
                self,
            );
        }
        self.insert_directive_name_references(&mut schema.referencers, &directive.name)?;
        type_.make_mut().directives.push(directive);
        Ok(())
    }

    pub fn remove_directive_name(&self, schema: &mut CoreSchema, name: &str) {
        let Some(type_) = self.try_make_mut(&mut schema.schema) else {
            return;
        };
        self.remove_directive_name_references(&mut schema.referencers, name);
        type_
            .make_mut()
            .directives
            .retain(|other_directive| other_directive.name != name);
    }

    pub fn remove_directive(&self, schema: &mut CoreSchema, directive: &Component<Directive>) {
        let Some(type_) = self.try_make_mut(&mut schema.schema) else {
            return;
        };
        if !type_.directives.iter().any(|other_directive| {
            (other_directive.name == directive.name) && !other_directive.ptr_eq(directive)
        }) {
            self.remove_directive_name_references(&mut schema.referencers, &directive.name);
        }
        type_
            .make_mut()
            .directives
            .retain(|other_directive| !other_directive.ptr_eq(directive));
    }

    fn insert_references(
        &self,
        type_: &Node<InputObjectType>,
        referencers: &mut Referencers,
    ) -> Result<(), SchemaError> {
        validate_component_directives(type_.directives.deref())?;
        for directive_reference in type_.directives.iter() {
            self.insert_directive_name_references(referencers, &directive_reference.name)?;
        }
        for (field_name, field) in type_.fields.iter() {
            self.field(field_name.clone())
                .insert_references(field, referencers)?;
        }
        Ok(())
    }

    fn remove_references(
        &self,
        type_: &Node<InputObjectType>,
        referencers: &mut Referencers,
    ) -> Result<(), SchemaError> {
        for directive_reference in type_.directives.iter() {
            self.remove_directive_name_references(referencers, &directive_reference.name);
        }
        for (field_name, field) in type_.fields.iter() {
            self.field(field_name.clone())
                .remove_references(field, referencers)?;
        }
        Ok(())
    }

    fn insert_directive_name_references(
        &self,
        referencers: &mut Referencers,
        name: &Name,
    ) -> Result<(), SchemaError> {
        let Some(directive_referencers) = referencers.directives.get_mut(name) else {
            return Err(SchemaError::UnknownDirective {
                name: name.to_string(),
            });
        };
        directive_referencers
            .input_object_types
            .insert(self.clone());
        Ok(())
    }

    fn remove_directive_name_references(&self, referencers: &mut Referencers, name: &str) {
        let Some(directive_referencers) = referencers.directives.get_mut(name) else {
            return;
        };
        directive_referencers.input_object_types.shift_remove(self);
    }
}

impl Display for InputObjectTypeDefinitionPosition {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.type_name)
    }
}

impl Debug for InputObjectTypeDefinitionPosition {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "InputObject({self})")
    }
}

#[derive(Clone, PartialEq, Eq, Hash, Serialize)]
pub struct InputObjectFieldDefinitionPosition {
    pub type_name: Name,
    pub field_name: Name,
}

impl InputObjectFieldDefinitionPosition {
    pub fn parent(&self) -> InputObjectTypeDefinitionPosition {
        InputObjectTypeDefinitionPosition {
            type_name: self.type_name.clone(),
        }
    }

    pub fn get<'schema>(
        &self,
        schema: &'schema Schema,
    ) -> Result<&'schema Component<InputValueDefinition>, PositionLookupError> {
        let parent = self.parent();
        let type_ = parent.get(schema)?;

        type_.fields.get(&self.field_name).ok_or_else(|| {
            PositionLookupError::MissingField(
                "Input object type",
                self.type_name.clone(),
                self.field_name.clone(),
            )
        })
    }

    pub fn try_get<'schema>(
        &self,
        schema: &'schema Schema,
    ) -> Option<&'schema Component<InputValueDefinition>> {
        self.get(schema).ok()
    }

    fn make_mut<'schema>(
        &self,
        schema: &'schema mut Schema,
    ) -> Result<&'schema mut Component<InputValueDefinition>, PositionLookupError> {
        let parent = self.parent();
        let type_ = parent.make_mut(schema)?.make_mut();

        type_.fields.get_mut(&self.field_name).ok_or_else(|| {
            PositionLookupError::MissingField(
                "Input object type",
                self.type_name.clone(),
                self.field_name.clone(),
            )
        })
    }

    fn try_make_mut<'schema>(
        &self,
        schema: &'schema mut Schema,
    ) -> Option<&'schema mut Component<InputValueDefinition>> {
        if self.try_get(schema).is_some() {
            self.make_mut(schema).ok()
        } else {
            None
        }
    }

    pub fn insert(
        &self,
        schema: &mut CoreSchema,
        field: Component<InputValueDefinition>,
    ) -> Result<(), SchemaError> {
        if self.field_name != field.name {
            bail!(
                "Input object field \"{}\" given field named \"{}\"",
                self,
                field.name,
            );
        }
        let parent_type = self.parent().make_mut(&mut schema.schema)?;
        if parent_type.fields.contains_key(&self.field_name) {
            return Err(SchemaError::DuplicateName {
                message: format!("Field `{self}` already exists in schema"),
            });
        }
        parent_type
            .make_mut()
            .fields
            .insert(self.field_name.clone(), field);
        self.insert_references(self.get(&schema.schema)?, &mut schema.referencers)
    }

    pub fn remove(&self, schema: &mut CoreSchema) -> Result<(), SchemaError> {
        let Some(field) = self.try_get(&schema.schema) else {
            return Ok(());
        };
        self.remove_references(field, &mut schema.referencers)?;
        self.parent()
            .make_mut(&mut schema.schema)?
            .make_mut()
            .fields
            .shift_remove(&self.field_name);
        Ok(())
    }

    /// Remove this field. If the parent type is left with no fields, remove
    /// the parent type recursively as well.
    pub fn remove_recursive(&self, schema: &mut CoreSchema) -> Result<(), SchemaError> {
        self.remove(schema)?;
        let parent = self.parent();
        let Some(type_) = parent.try_get(&schema.schema) else {
            return Ok(());
        };
        if type_.fields.is_empty() {
            parent.remove_recursive(schema)?;
        }
        Ok(())
    }

    pub fn set_type(&self, schema: &mut CoreSchema, ty: ast::Type) -> Result<(), SchemaError> {
        check_input_type_reference(schema, ty.inner_named_type(), "Input object field", self)?;
        let field = self.make_mut(&mut schema.schema)?;
        let old_field = field.clone();
        field.make_mut().ty = Node::new(ty);
        self.remove_type_references(&old_field, &mut schema.referencers);
        let field = self.get(&schema.schema)?.clone();
        self.insert_type_references(&field, &mut schema.referencers)
    }

    pub fn insert_directive(
        &self,
        schema: &mut CoreSchema,
        directive: Node<Directive>,
    ) -> Result<(), SchemaError> {
        let field = self.make_mut(&mut schema.schema)?;
        if field
            .directives
            .iter()
            .any(|other_directive| other_directive.ptr_eq(&directive))
        {
            bail!(
                "Directive application \"@{}\" already exists on input object field \"{}\"",
                directive.name,
                self,
            );
        }
        self.insert_directive_name_references(&mut schema.referencers, &directive.name)?;
        field.make_mut().directives.push(directive);
        Ok(())
    }

    pub fn remove_directive_name(&self, schema: &mut CoreSchema, name: &str) {
        let Some(field) = self.try_make_mut(&mut schema.schema) else {
            return;
        };
        self.remove_directive_name_references(&mut schema.referencers, name);
        field
            .make_mut()
            .directives
            .retain(|other_directive| other_directive.name != name);
    }

    pub fn remove_directive(&self, schema: &mut CoreSchema, directive: &Node<Directive>) {
        let Some(field) = self.try_make_mut(&mut schema.schema) else {
            return;
        };
        if !field.directives.iter().any(|other_directive| {
            (other_directive.name == directive.name) && !other_directive.ptr_eq(directive)
        }) {
            self.remove_directive_name_references(&mut schema.referencers, &directive.name);
        }
        field
            .make_mut()
            .directives
            .retain(|other_directive| !other_directive.ptr_eq(directive));
    }

    fn insert_references(
        &self,
        field: &Component<InputValueDefinition>,
        referencers: &mut Referencers,
    ) -> Result<(), SchemaError> {
        validate_node_directives(field.directives.deref())?;
        for directive_reference in field.directives.iter() {
            self.insert_directive_name_references(referencers, &directive_reference.name)?;
        }
        self.insert_type_references(field, referencers)
    }

    fn remove_references(
        &self,
        field: &Component<InputValueDefinition>,
        referencers: &mut Referencers,
    ) -> Result<(), SchemaError> {
        for directive_reference in field.directives.iter() {
            self.remove_directive_name_references(referencers, &directive_reference.name);
        }
        self.remove_type_references(field, referencers);
        Ok(())
    }

    fn insert_directive_name_references(
        &self,
        referencers: &mut Referencers,
        name: &Name,
    ) -> Result<(), SchemaError> {
        let Some(directive_referencers) = referencers.directives.get_mut(name) else {
            return Err(SchemaError::UnknownDirective {
                name: name.to_string(),
            });
        };
        directive_referencers
            .input_object_fields
            .insert(self.clone());
        Ok(())
    }

    fn remove_directive_name_references(&self, referencers: &mut Referencers, name: &str) {
        let Some(directive_referencers) = referencers.directives.get_mut(name) else {
            return;
        };
        directive_referencers.input_object_fields.shift_remove(self);
    }

    fn insert_type_references(
        &self,
        field: &Component<InputValueDefinition>,
        referencers: &mut Referencers,
    ) -> Result<(), SchemaError> {
        let input_type_reference = field.ty.inner_named_type();
        if let Some(scalar_type_referencers) =
            referencers.scalar_types.get_mut(input_type_reference)
        {
            scalar_type_referencers
                .input_object_fields
                .insert(self.clone());
        } else if let Some(enum_type_referencers) =
            referencers.enum_types.get_mut(input_type_reference)
        {
            enum_type_referencers
                .input_object_fields
                .insert(self.clone());
        } else if let Some(input_object_type_referencers) =
            referencers.input_object_types.get_mut(input_type_reference)
        {
            input_object_type_referencers
                .input_object_fields
                .insert(self.clone());
        } else {
            return Err(SchemaError::internal(format!(
                "Input object field \"{self}\"'s inner type \"{input_type_reference}\" does not refer to an existing input type.",
            )));
        }
        Ok(())
    }

    fn remove_type_references(
        &self,
        field: &Component<InputValueDefinition>,
        referencers: &mut Referencers,
    ) {
        let input_type_reference = field.ty.inner_named_type();
        if let Some(scalar_type_referencers) =
            referencers.scalar_types.get_mut(input_type_reference)
        {
            scalar_type_referencers
                .input_object_fields
                .shift_remove(self);
        } else if let Some(enum_type_referencers) =
            referencers.enum_types.get_mut(input_type_reference)
        {
            enum_type_referencers.input_object_fields.shift_remove(self);
        } else if let Some(input_object_type_referencers) =
            referencers.input_object_types.get_mut(input_type_reference)
        {
            input_object_type_referencers
                .input_object_fields
                .shift_remove(self);
        }
    }

    fn rename_type(&self, schema: &mut Schema, new_name: Name) -> Result<(), PositionLookupError> {
        let field = self.make_mut(schema)?;
        let field = field.make_mut();
        let mut ty = field.ty.deref().clone();
        rename_type(&mut ty, new_name);
        field.ty = Node::new(ty);
        Ok(())
    }
}

impl Display for InputObjectFieldDefinitionPosition {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.type_name, self.field_name)
    }
}

impl Debug for InputObjectFieldDefinitionPosition {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "InputObjectField({self})")
    }
}

#[derive(Clone, PartialEq, Eq, Hash, Serialize)]
pub struct DirectiveDefinitionPosition {
    pub directive_name: Name,
}

impl DirectiveDefinitionPosition {
    const KIND: &'static str = "directive definition";

    pub fn argument(&self, argument_name: Name) -> DirectiveArgumentDefinitionPosition {
        DirectiveArgumentDefinitionPosition {
            directive_name: self.directive_name.clone(),
            argument_name,
        }
    }

    pub fn get<'schema>(
        &self,
        schema: &'schema Schema,
    ) -> Result<&'schema Node<DirectiveDefinition>, PositionLookupError> {
        schema
            .directive_definitions
            .get(&self.directive_name)
            .ok_or_else(|| PositionLookupError::DirectiveMissing(self.clone()))
    }

    pub fn try_get<'schema>(
        &self,
        schema: &'schema Schema,
    ) -> Option<&'schema Node<DirectiveDefinition>> {
        self.get(schema).ok()
    }

    fn make_mut<'schema>(
        &self,
        schema: &'schema mut Schema,
    ) -> Result<&'schema mut Node<DirectiveDefinition>, PositionLookupError> {
        if builtins::is_built_in_directive_name(&self.directive_name) {
            return Err(PositionLookupError::MutateBuiltIn(
                Self::KIND,
                self.directive_name.clone(),
            ));
        }
        schema
            .directive_definitions
            .get_mut(&self.directive_name)
            .ok_or_else(|| PositionLookupError::DirectiveMissing(self.clone()))
    }

    fn try_make_mut<'schema>(
        &self,
        schema: &'schema mut Schema,
    ) -> Option<&'schema mut Node<DirectiveDefinition>> {
        if self.try_get(schema).is_some() {
            self.make_mut(schema).ok()
        } else {
            None
        }
    }

    pub fn pre_insert(&self, schema: &mut CoreSchema) -> Result<(), SchemaError> {
        if schema
            .referencers
            .contains_directive_name(&self.directive_name)
        {
            return Err(SchemaError::DuplicateName {
                message: format!("Directive `@{}` already exists in schema", self.directive_name),
            });
        }
        schema
            .referencers
            .directives
            .insert(self.directive_name.clone(), Default::default());
        Ok(())
    }

    pub fn insert(
        &self,
        schema: &mut CoreSchema,
        directive: Node<DirectiveDefinition>,
    ) -> Result<(), SchemaError> {
        if self.directive_name != directive.name {
            bail!(
                "Directive definition \"{}\" given definition named \"{}\"",
                self,
                directive.name,
            );
        }
        if !schema
            .referencers
            .directives
            .contains_key(&self.directive_name)
        {
            bail!("Directive \"{}\" has not been pre-inserted", self);
        }
        if schema
            .schema
            .directive_definitions
            .contains_key(&self.directive_name)
        {
            return Err(SchemaError::DuplicateName {
                message: format!("Directive `@{}` already exists in schema", self.directive_name),
            });
        }
        schema
            .schema
            .directive_definitions
            .insert(self.directive_name.clone(), directive);
        self.insert_references(self.get(&schema.schema)?, &mut schema.referencers)
    }

    /// Remove this directive definition from the schema, along with all
    /// applications of it.
    pub fn remove(&self, schema: &mut CoreSchema) -> Result<Option<DirectiveReferencers>, SchemaError> {
        let Some(referencers) = self.remove_internal(schema)? else {
            return Ok(None);
        };
        if let Some(schema_definition) = &referencers.schema {
            schema_definition.remove_directive_name(schema, &self.directive_name)?;
        }
        for type_ in &referencers.scalar_types {
            type_.remove_directive_name(schema, &self.directive_name);
        }
        for type_ in &referencers.object_types {
            type_.remove_directive_name(schema, &self.directive_name);
        }
        for field in &referencers.object_fields {
            field.remove_directive_name(schema, &self.directive_name);
        }
        for argument in &referencers.object_field_arguments {
            argument.remove_directive_name(schema, &self.directive_name);
        }
        for type_ in &referencers.interface_types {
            type_.remove_directive_name(schema, &self.directive_name);
        }
        for field in &referencers.interface_fields {
            field.remove_directive_name(schema, &self.directive_name);
        }
        for argument in &referencers.interface_field_arguments {
            argument.remove_directive_name(schema, &self.directive_name);
        }
        for type_ in &referencers.union_types {
            type_.remove_directive_name(schema, &self.directive_name);
        }
        for type_ in &referencers.enum_types {
            type_.remove_directive_name(schema, &self.directive_name);
        }
        for value in &referencers.enum_values {
            value.remove_directive_name(schema, &self.directive_name);
        }
        for type_ in &referencers.input_object_types {
            type_.remove_directive_name(schema, &self.directive_name);
        }
        for field in &referencers.input_object_fields {
            field.remove_directive_name(schema, &self.directive_name);
        }
        for argument in &referencers.directive_arguments {
            argument.remove_directive_name(schema, &self.directive_name);
        }
        Ok(Some(referencers))
    }

    fn remove_internal(
        &self,
        schema: &mut CoreSchema,
    ) -> Result<Option<DirectiveReferencers>, SchemaError> {
        if builtins::is_built_in_directive_name(&self.directive_name) {
            return Err(PositionLookupError::MutateBuiltIn(
                Self::KIND,
                self.directive_name.clone(),
            )
            .into());
        }
        let Some(directive) = self.try_get(&schema.schema) else {
            return Ok(None);
        };
        self.remove_references(directive, &mut schema.referencers);
        schema
            .schema
            .directive_definitions
            .shift_remove(&self.directive_name);
        Ok(Some(
            schema
                .referencers
                .directives
                .shift_remove(&self.directive_name)
                .ok_or_else(|| {
                    SchemaError::internal(format!(
                        "Schema missing referencers for directive \"{self}\"",
                    ))
                })?,
        ))
    }

    fn insert_references(
        &self,
        directive: &Node<DirectiveDefinition>,
        referencers: &mut Referencers,
    ) -> Result<(), SchemaError> {
        validate_arguments(&directive.arguments)?;
        for argument in directive.arguments.iter() {
            self.argument(argument.name.clone())
                .insert_references(argument, referencers)?;
        }
        Ok(())
    }

    fn remove_references(
        &self,
        directive: &Node<DirectiveDefinition>,
        referencers: &mut Referencers,
    ) {
        for argument in directive.arguments.iter() {
            self.argument(argument.name.clone())
                .remove_references(argument, referencers);
        }
    }
}

impl Display for DirectiveDefinitionPosition {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "@{}", self.directive_name)
    }
}

impl Debug for DirectiveDefinitionPosition {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Directive({self})")
    }
}

#[derive(Clone, PartialEq, Eq, Hash, Serialize)]
pub struct DirectiveArgumentDefinitionPosition {
    pub directive_name: Name,
    pub argument_name: Name,
}

impl DirectiveArgumentDefinitionPosition {
    pub fn parent(&self) -> DirectiveDefinitionPosition {
        DirectiveDefinitionPosition {
            directive_name: self.directive_name.clone(),
        }
    }

    pub fn get<'schema>(
        &self,
        schema: &'schema Schema,
    ) -> Result<&'schema Node<InputValueDefinition>, PositionLookupError> {
        let parent = self.parent();
        let directive = parent.get(schema)?;

        directive
            .arguments
            .iter()
            .find(|a| a.name == self.argument_name)
            .ok_or_else(|| PositionLookupError::MissingDirectiveArgument(self.clone()))
    }

    pub fn try_get<'schema>(
        &self,
        schema: &'schema Schema,
    ) -> Option<&'schema Node<InputValueDefinition>> {
        self.get(schema).ok()
    }

    fn make_mut<'schema>(
        &self,
        schema: &'schema mut Schema,
    ) -> Result<&'schema mut Node<InputValueDefinition>, PositionLookupError> {
        let parent = self.parent();
        let directive = parent.make_mut(schema)?.make_mut();

        directive
            .arguments
            .iter_mut()
            .find(|a| a.name == self.argument_name)
            .ok_or_else(|| PositionLookupError::MissingDirectiveArgument(self.clone()))
    }

    fn try_make_mut<'schema>(
        &self,
        schema: &'schema mut Schema,
    ) -> Option<&'schema mut Node<InputValueDefinition>> {
        if self.try_get(schema).is_some() {
            self.make_mut(schema).ok()
        } else {
            None
        }
    }

    pub fn insert(
        &self,
        schema: &mut CoreSchema,
        argument: Node<InputValueDefinition>,
    ) -> Result<(), SchemaError> {
        if self.argument_name != argument.name {
            bail!(
                "Directive argument \"{}\" given argument named \"{}\"",
                self,
                argument.name,
            );
        }
        let directive = self.parent().make_mut(&mut schema.schema)?;
        if directive
            .arguments
            .iter()
            .any(|a| a.name == self.argument_name)
        {
            return Err(SchemaError::DuplicateName {
                message: format!("Argument `{self}` already exists in schema"),
            });
        }
        directive.make_mut().arguments.push(argument);
        self.insert_references(self.get(&schema.schema)?, &mut schema.referencers)
    }

    pub fn remove(&self, schema: &mut CoreSchema) -> Result<(), SchemaError> {
        let Some(argument) = self.try_get(&schema.schema) else {
            return Ok(());
        };
        self.remove_references(argument, &mut schema.referencers);
        self.parent()
            .make_mut(&mut schema.schema)?
            .make_mut()
            .arguments
            .retain(|other_argument| other_argument.name != self.argument_name);
        Ok(())
    }

    pub fn set_type(&self, schema: &mut CoreSchema, ty: ast::Type) -> Result<(), SchemaError> {
        check_input_type_reference(schema, ty.inner_named_type(), "Directive argument", self)?;
        let argument = self.make_mut(&mut schema.schema)?;
        let old_argument = argument.clone();
        argument.make_mut().ty = Node::new(ty);
        self.remove_type_references(&old_argument, &mut schema.referencers);
        let argument = self.get(&schema.schema)?.clone();
        self.insert_type_references(&argument, &mut schema.referencers)
    }

    pub fn insert_directive(
        &self,
        schema: &mut CoreSchema,
        directive: Node<Directive>,
    ) -> Result<(), SchemaError> {
        let argument = self.make_mut(&mut schema.schema)?;
        if argument
            .directives
            .iter()
            .any(|other_directive| other_directive.ptr_eq(&directive))
        {
            bail!(
                "Directive application \"@{}\" already exists on directive argument \"{}\"",
                directive.name,
                self,
            );
        }
        self.insert_directive_name_references(&mut schema.referencers, &directive.name)?;
        argument.make_mut().directives.push(directive);
        Ok(())
    }

    pub fn remove_directive_name(&self, schema: &mut CoreSchema, name: &str) {
        let Some(argument) = self.try_make_mut(&mut schema.schema) else {
            return;
        };
        self.remove_directive_name_references(&mut schema.referencers, name);
        argument
            .make_mut()
            .directives
            .retain(|other_directive| other_directive.name != name);
    }

    pub fn remove_directive(&self, schema: &mut CoreSchema, directive: &Node<Directive>) {
        let Some(argument) = self.try_make_mut(&mut schema.schema) else {
            return;
        };
        if !argument.directives.iter().any(|other_directive| {
            (other_directive.name == directive.name) && !other_directive.ptr_eq(directive)
        }) {
            self.remove_directive_name_references(&mut schema.referencers, &directive.name);
        }
        argument
            .make_mut()
            .directives
            .retain(|other_directive| !other_directive.ptr_eq(directive));
    }

    fn insert_references(
        &self,
        argument: &Node<InputValueDefinition>,
        referencers: &mut Referencers,
    ) -> Result<(), SchemaError> {
        validate_node_directives(argument.directives.deref())?;
        for directive_reference in argument.directives.iter() {
            self.insert_directive_name_references(referencers, &directive_reference.name)?;
        }
        self.insert_type_references(argument, referencers)
    }

    fn remove_references(
        &self,
        argument: &Node<InputValueDefinition>,
        referencers: &mut Referencers,
    ) {
        for directive_reference in argument.directives.iter() {
            self.remove_directive_name_references(referencers, &directive_reference.name);
        }
        self.remove_type_references(argument, referencers);
    }

    fn insert_directive_name_references(
        &self,
        referencers: &mut Referencers,
        name: &Name,
    ) -> Result<(), SchemaError> {
        let Some(directive_referencers) = referencers.directives.get_mut(name) else {
            return Err(SchemaError::UnknownDirective {
                name: name.to_string(),
            });
        };
        directive_referencers
            .directive_arguments
            .insert(self.clone());
        Ok(())
    }

    fn remove_directive_name_references(&self, referencers: &mut Referencers, name: &str) {
        let Some(directive_referencers) = referencers.directives.get_mut(name) else {
            return;
        };
        directive_referencers.directive_arguments.shift_remove(self);
    }

    fn insert_type_references(
        &self,
        argument: &Node<InputValueDefinition>,
        referencers: &mut Referencers,
    ) -> Result<(), SchemaError> {
        let input_type_reference = argument.ty.inner_named_type();
        if let Some(scalar_type_referencers) =
            referencers.scalar_types.get_mut(input_type_reference)
        {
            scalar_type_referencers
                .directive_arguments
                .insert(self.clone());
        } else if let Some(enum_type_referencers) =
            referencers.enum_types.get_mut(input_type_reference)
        {
            enum_type_referencers
                .directive_arguments
                .insert(self.clone());
        } else if let Some(input_object_type_referencers) =
            referencers.input_object_types.get_mut(input_type_reference)
        {
            input_object_type_referencers
                .directive_arguments
                .insert(self.clone());
        } else {
            return Err(SchemaError::internal(format!(
                "Directive argument \"{self}\"'s inner type \"{input_type_reference}\" does not refer to an existing input type.",
            )));
        }
        Ok(())
    }

    fn remove_type_references(
        &self,
        argument: &Node<InputValueDefinition>,
        referencers: &mut Referencers,
    ) {
        let input_type_reference = argument.ty.inner_named_type();
        if let Some(scalar_type_referencers) =
            referencers.scalar_types.get_mut(input_type_reference)
        {
            scalar_type_referencers
                .directive_arguments
                .shift_remove(self);
        } else if let Some(enum_type_referencers) =
            referencers.enum_types.get_mut(input_type_reference)
        {
            enum_type_referencers.directive_arguments.shift_remove(self);
        } else if let Some(input_object_type_referencers) =
            referencers.input_object_types.get_mut(input_type_reference)
        {
            input_object_type_referencers
                .directive_arguments
                .shift_remove(self);
        }
    }

    fn rename_type(&self, schema: &mut Schema, new_name: Name) -> Result<(), PositionLookupError> {
        let argument = self.make_mut(schema)?;
        let argument = argument.make_mut();
        let mut ty = argument.ty.deref().clone();
        rename_type(&mut ty, new_name);
        argument.ty = Node::new(ty);
        Ok(())
    }
}

impl Display for DirectiveArgumentDefinitionPosition {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "@{}({}:)", self.directive_name, self.argument_name)
    }
}

impl Debug for DirectiveArgumentDefinitionPosition {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "DirectiveArgument({self})")
    }
}

/// Any schema element that directives can be applied to.
#[derive(Clone, PartialEq, Eq, Hash, derive_more::From, derive_more::Display, Serialize)]
pub enum DirectiveTargetPosition {
    Schema(SchemaDefinitionPosition),
    ScalarType(ScalarTypeDefinitionPosition),
    ObjectType(ObjectTypeDefinitionPosition),
    ObjectField(ObjectFieldDefinitionPosition),
    ObjectFieldArgument(ObjectFieldArgumentDefinitionPosition),
    InterfaceType(InterfaceTypeDefinitionPosition),
    InterfaceField(InterfaceFieldDefinitionPosition),
    InterfaceFieldArgument(InterfaceFieldArgumentDefinitionPosition),
    UnionType(UnionTypeDefinitionPosition),
    EnumType(EnumTypeDefinitionPosition),
    EnumValue(EnumValueDefinitionPosition),
    InputObjectType(InputObjectTypeDefinitionPosition),
    InputObjectField(InputObjectFieldDefinitionPosition),
    DirectiveArgument(DirectiveArgumentDefinitionPosition),
}

impl Debug for DirectiveTargetPosition {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Schema(p) => Debug::fmt(p, f),
            Self::ScalarType(p) => Debug::fmt(p, f),
            Self::ObjectType(p) => Debug::fmt(p, f),
            Self::ObjectField(p) => Debug::fmt(p, f),
            Self::ObjectFieldArgument(p) => Debug::fmt(p, f),
            Self::InterfaceType(p) => Debug::fmt(p, f),
            Self::InterfaceField(p) => Debug::fmt(p, f),
            Self::InterfaceFieldArgument(p) => Debug::fmt(p, f),
            Self::UnionType(p) => Debug::fmt(p, f),
            Self::EnumType(p) => Debug::fmt(p, f),
            Self::EnumValue(p) => Debug::fmt(p, f),
            Self::InputObjectType(p) => Debug::fmt(p, f),
            Self::InputObjectField(p) => Debug::fmt(p, f),
            Self::DirectiveArgument(p) => Debug::fmt(p, f),
        }
    }
}

impl DirectiveTargetPosition {
    /// Returns all directive applications on this element, normalized to
    /// `&Node<Directive>` regardless of whether the underlying list holds
    /// components or nodes. Missing elements yield an empty list.
    pub fn get_all_applied_directives<'schema>(
        &self,
        schema: &'schema CoreSchema,
    ) -> Vec<&'schema Node<Directive>> {
        match self {
            Self::Schema(pos) => pos
                .get(&schema.schema)
                .directives
                .iter()
                .map(|d| &d.node)
                .collect(),
            Self::ScalarType(pos) => pos
                .try_get(&schema.schema)
                .map(|ty| ty.directives.iter().map(|d| &d.node).collect())
                .unwrap_or_default(),
            Self::ObjectType(pos) => pos
                .try_get(&schema.schema)
                .map(|ty| ty.directives.iter().map(|d| &d.node).collect())
                .unwrap_or_default(),
            Self::ObjectField(pos) => pos
                .try_get(&schema.schema)
                .map(|field| field.directives.iter().collect())
                .unwrap_or_default(),
            Self::ObjectFieldArgument(pos) => pos
                .try_get(&schema.schema)
                .map(|argument| argument.directives.iter().collect())
                .unwrap_or_default(),
            Self::InterfaceType(pos) => pos
                .try_get(&schema.schema)
                .map(|ty| ty.directives.iter().map(|d| &d.node).collect())
                .unwrap_or_default(),
            Self::InterfaceField(pos) => pos
                .try_get(&schema.schema)
                .map(|field| field.directives.iter().collect())
                .unwrap_or_default(),
            Self::InterfaceFieldArgument(pos) => pos
                .try_get(&schema.schema)
                .map(|argument| argument.directives.iter().collect())
                .unwrap_or_default(),
            Self::UnionType(pos) => pos
                .try_get(&schema.schema)
                .map(|ty| ty.directives.iter().map(|d| &d.node).collect())
                .unwrap_or_default(),
            Self::EnumType(pos) => pos
                .try_get(&schema.schema)
                .map(|ty| ty.directives.iter().map(|d| &d.node).collect())
                .unwrap_or_default(),
            Self::EnumValue(pos) => pos
                .try_get(&schema.schema)
                .map(|value| value.directives.iter().collect())
                .unwrap_or_default(),
            Self::InputObjectType(pos) => pos
                .try_get(&schema.schema)
                .map(|ty| ty.directives.iter().map(|d| &d.node).collect())
                .unwrap_or_default(),
            Self::InputObjectField(pos) => pos
                .try_get(&schema.schema)
                .map(|field| field.directives.iter().collect())
                .unwrap_or_default(),
            Self::DirectiveArgument(pos) => pos
                .try_get(&schema.schema)
                .map(|argument| argument.directives.iter().collect())
                .unwrap_or_default(),
        }
    }

    pub fn get_applied_directives<'schema>(
        &self,
        schema: &'schema CoreSchema,
        directive_name: &Name,
    ) -> Vec<&'schema Node<Directive>> {
        self.get_all_applied_directives(schema)
            .into_iter()
            .filter(|directive| directive.name == *directive_name)
            .collect()
    }

    pub fn insert_directive(
        &self,
        schema: &mut CoreSchema,
        directive: Directive,
    ) -> Result<(), SchemaError> {
        match self {
            Self::Schema(pos) => pos.insert_directive(schema, Component::new(directive)),
            Self::ScalarType(pos) => pos.insert_directive(schema, Component::new(directive)),
            Self::ObjectType(pos) => pos.insert_directive(schema, Component::new(directive)),
            Self::ObjectField(pos) => pos.insert_directive(schema, Node::new(directive)),
            Self::ObjectFieldArgument(pos) => pos.insert_directive(schema, Node::new(directive)),
            Self::InterfaceType(pos) => pos.insert_directive(schema, Component::new(directive)),
            Self::InterfaceField(pos) => pos.insert_directive(schema, Node::new(directive)),
            Self::InterfaceFieldArgument(pos) => pos.insert_directive(schema, Node::new(directive)),
            Self::UnionType(pos) => pos.insert_directive(schema, Component::new(directive)),
            Self::EnumType(pos) => pos.insert_directive(schema, Component::new(directive)),
            Self::EnumValue(pos) => pos.insert_directive(schema, Node::new(directive)),
            Self::InputObjectType(pos) => pos.insert_directive(schema, Component::new(directive)),
            Self::InputObjectField(pos) => pos.insert_directive(schema, Node::new(directive)),
            Self::DirectiveArgument(pos) => pos.insert_directive(schema, Node::new(directive)),
        }
    }

    pub fn remove_directive_name(
        &self,
        schema: &mut CoreSchema,
        name: &str,
    ) -> Result<(), SchemaError> {
        match self {
            Self::Schema(pos) => pos.remove_directive_name(schema, name)?,
            Self::ScalarType(pos) => pos.remove_directive_name(schema, name),
            Self::ObjectType(pos) => pos.remove_directive_name(schema, name),
            Self::ObjectField(pos) => pos.remove_directive_name(schema, name),
            Self::ObjectFieldArgument(pos) => pos.remove_directive_name(schema, name),
            Self::InterfaceType(pos) => pos.remove_directive_name(schema, name),
            Self::InterfaceField(pos) => pos.remove_directive_name(schema, name),
            Self::InterfaceFieldArgument(pos) => pos.remove_directive_name(schema, name),
            Self::UnionType(pos) => pos.remove_directive_name(schema, name),
            Self::EnumType(pos) => pos.remove_directive_name(schema, name),
            Self::EnumValue(pos) => pos.remove_directive_name(schema, name),
            Self::InputObjectType(pos) => pos.remove_directive_name(schema, name),
            Self::InputObjectField(pos) => pos.remove_directive_name(schema, name),
            Self::DirectiveArgument(pos) => pos.remove_directive_name(schema, name),
        }
        Ok(())
    }
}

pub fn is_graphql_reserved_name(name: &str) -> bool {
    name.starts_with("__")
}

pub(crate) static INTROSPECTION_TYPENAME_FIELD_NAME: Name = name!("__typename");

fn validate_component_directives(directives: &[Component<Directive>]) -> Result<(), SchemaError> {
    for directive in directives.iter() {
        if directives
            .iter()
            .filter(|other_directive| other_directive.ptr_eq(directive))
            .count()
            > 1
        {
            bail!(
                "Directive application \"@{}\" is duplicated on schema element",
                directive.name,
            );
        }
    }
    Ok(())
}

fn validate_node_directives(directives: &[Node<Directive>]) -> Result<(), SchemaError> {
    for directive in directives.iter() {
        if directives
            .iter()
            .filter(|other_directive| other_directive.ptr_eq(directive))
            .count()
            > 1
        {
            bail!(
                "Directive application \"@{}\" is duplicated on schema element",
                directive.name,
            );
        }
    }
    Ok(())
}

fn validate_arguments(arguments: &[Node<InputValueDefinition>]) -> Result<(), SchemaError> {
    for argument in arguments.iter() {
        if arguments
            .iter()
            .filter(|other_argument| other_argument.name == argument.name)
            .count()
            > 1
        {
            bail!(
                "Argument \"{}\" is duplicated on schema element",
                argument.name,
            );
        }
    }
    Ok(())
}

fn rename_type(ast_type: &mut ast::Type, new_name: Name) {
    match ast_type {
        ast::Type::Named(name) => *name = new_name,
        ast::Type::NonNullNamed(name) => *name = new_name,
        ast::Type::List(inner) => rename_type(inner, new_name),
        ast::Type::NonNullList(inner) => rename_type(inner, new_name),
    }
}

fn rename_guards(
    kind: &'static str,
    old_name: &Name,
    new_name: &Name,
    schema: &CoreSchema,
) -> Result<(), SchemaError> {
    if builtins::is_built_in_type_name(old_name) || is_graphql_reserved_name(old_name) {
        return Err(PositionLookupError::MutateBuiltIn(kind, old_name.clone()).into());
    }
    if builtins::is_built_in_type_name(new_name) || is_graphql_reserved_name(new_name) {
        return Err(PositionLookupError::MutateBuiltIn(kind, new_name.clone()).into());
    }
    if schema.schema.types.contains_key(new_name)
        || schema.referencers.contains_type_name(new_name)
    {
        return Err(SchemaError::DuplicateName {
            message: format!("Type `{new_name}` already exists in schema"),
        });
    }
    Ok(())
}

// The renamed type moves to the end of the registry; the relative order of
// all other types is preserved.
fn rekey_schema_type(schema: &mut Schema, old_name: &Name, new_name: &Name) {
    if let Some(type_) = schema.types.shift_remove(old_name) {
        schema.types.insert(new_name.clone(), type_);
    }
}

fn check_output_type_reference(
    schema: &CoreSchema,
    name: &Name,
    kind: &'static str,
    position: &impl Display,
) -> Result<(), SchemaError> {
    if !schema.referencers.contains_type_name(name) {
        return Err(SchemaError::UnknownType {
            name: name.to_string(),
        });
    }
    if schema.referencers.input_object_types.contains_key(name) {
        return Err(SchemaError::internal(format!(
            "{kind} \"{position}\"'s type \"{name}\" does not refer to an existing output type.",
        )));
    }
    Ok(())
}

fn check_input_type_reference(
    schema: &CoreSchema,
    name: &Name,
    kind: &'static str,
    position: &impl Display,
) -> Result<(), SchemaError> {
    if !schema.referencers.contains_type_name(name) {
        return Err(SchemaError::UnknownType {
            name: name.to_string(),
        });
    }
    if schema.referencers.object_types.contains_key(name)
        || schema.referencers.interface_types.contains_key(name)
        || schema.referencers.union_types.contains_key(name)
    {
        return Err(SchemaError::internal(format!(
            "{kind} \"{position}\"'s type \"{name}\" does not refer to an existing input type.",
        )));
    }
    Ok(())
}

impl CoreSchema {
    /// Builds the referencer and feature bookkeeping for an apollo-compiler
    /// schema. The schema does not need to be valid, but referential integrity
    /// of type and directive references is required.
    pub fn new(schema: Schema) -> Result<Self, SchemaError> {
        let mut core_schema = Self::new_uninitialized(schema)?;
        core_schema.collect_core_features()?;
        core_schema.collect_shallow_references();
        core_schema.collect_deep_references()?;
        Ok(core_schema)
    }

    pub(crate) fn new_uninitialized(schema: Schema) -> Result<Self, SchemaError> {
        Ok(Self {
            schema,
            referencers: Referencers::default(),
            features: None,
        })
    }

    pub(crate) fn collect_core_features(&mut self) -> Result<(), SchemaError> {
        self.features = core_features(&self.schema)?.map(Box::new);
        if let Some(features) = &self.features {
            tracing::trace!(
                "Schema declares {} core feature(s)",
                features.all_features().len(),
            );
        }
        Ok(())
    }

    pub(crate) fn collect_shallow_references(&mut self) {
        for (type_name, type_) in self.schema.types.iter() {
            match type_ {
                ExtendedType::Scalar(_) => {
                    self.referencers
                        .scalar_types
                        .insert(type_name.clone(), Default::default());
                }
                ExtendedType::Object(_) => {
                    self.referencers
                        .object_types
                        .insert(type_name.clone(), Default::default());
                }
                ExtendedType::Interface(_) => {
                    self.referencers
                        .interface_types
                        .insert(type_name.clone(), Default::default());
                }
                ExtendedType::Union(_) => {
                    self.referencers
                        .union_types
                        .insert(type_name.clone(), Default::default());
                }
                ExtendedType::Enum(_) => {
                    self.referencers
                        .enum_types
                        .insert(type_name.clone(), Default::default());
                }
                ExtendedType::InputObject(_) => {
                    self.referencers
                        .input_object_types
                        .insert(type_name.clone(), Default::default());
                }
            }
        }
        for directive_name in self.schema.directive_definitions.keys() {
            self.referencers
                .directives
                .insert(directive_name.clone(), Default::default());
        }
    }

    pub(crate) fn collect_deep_references(&mut self) -> Result<(), SchemaError> {
        SchemaDefinitionPosition.insert_references(
            &self.schema.schema_definition,
            &self.schema,
            &mut self.referencers,
        )?;
        for (type_name, type_) in self.schema.types.iter() {
            match type_ {
                ExtendedType::Scalar(type_) => {
                    ScalarTypeDefinitionPosition {
                        type_name: type_name.clone(),
                    }
                    .insert_references(type_, &mut self.referencers)?;
                }
                ExtendedType::Object(type_) => {
                    ObjectTypeDefinitionPosition {
                        type_name: type_name.clone(),
                    }
                    .insert_references(type_, &self.schema, &mut self.referencers)?;
                }
                ExtendedType::Interface(type_) => {
                    InterfaceTypeDefinitionPosition {
                        type_name: type_name.clone(),
                    }
                    .insert_references(type_, &self.schema, &mut self.referencers)?;
                }
                ExtendedType::Union(type_) => {
                    UnionTypeDefinitionPosition {
                        type_name: type_name.clone(),
                    }
                    .insert_references(type_, &mut self.referencers)?;
                }
                ExtendedType::Enum(type_) => {
                    EnumTypeDefinitionPosition {
                        type_name: type_name.clone(),
                    }
                    .insert_references(type_, &mut self.referencers)?;
                }
                ExtendedType::InputObject(type_) => {
                    InputObjectTypeDefinitionPosition {
                        type_name: type_name.clone(),
                    }
                    .insert_references(type_, &mut self.referencers)?;
                }
            }
        }
        for (directive_name, directive) in self.schema.directive_definitions.iter() {
            DirectiveDefinitionPosition {
                directive_name: directive_name.clone(),
            }
            .insert_references(directive, &mut self.referencers)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use apollo_compiler::ty;

    use super::*;

    fn parse(sdl: &str) -> CoreSchema {
        CoreSchema::new(
            Schema::parse_and_validate(sdl, "schema.graphql")
                .unwrap()
                .into_inner(),
        )
        .unwrap()
    }

    #[test]
    fn remove_object_type_recursive() {
        let mut schema = parse(
            r#"
            type Review {
                rating: Int!
                author: Account
            }
            type Account {
                handle: String!
            }
            type Query {
                reviews: [Review]
            }
        "#,
        );

        let position = ObjectTypeDefinitionPosition::new(name!("Account"));
        position.remove_recursive(&mut schema).unwrap();

        insta::assert_snapshot!(schema.schema(), @r#"
            type Review {
              rating: Int!
            }

            type Query {
              reviews: [Review]
            }
        "#);
    }

    #[test]
    fn remove_last_union_member_removes_union() {
        let mut schema = parse(
            r#"
            type Photo {
                url: String!
            }
            type Note {
                text: String!
            }
            union Attachment = Photo | Note
            type Query {
                attachments: [Attachment]
                ping: String
            }
        "#,
        );

        ObjectTypeDefinitionPosition::new(name!("Photo"))
            .remove_recursive(&mut schema)
            .unwrap();
        ObjectTypeDefinitionPosition::new(name!("Note"))
            .remove_recursive(&mut schema)
            .unwrap();

        insta::assert_snapshot!(schema.schema(), @r#"
            type Query {
              ping: String
            }
        "#);
    }

    #[test]
    fn rename_type_rewrites_references() {
        let mut schema = parse(
            r#"
            schema {
                query: RootQuery
            }

            type RootQuery {
                item: Item
            }

            interface Labeled {
                label: Tag
            }

            type Item implements Labeled {
                label: Tag
                note: String
            }

            type Box {
                contents: Stuff
            }

            union Stuff = Item | Box

            scalar Tag
        "#,
        );

        ObjectTypeDefinitionPosition::new(name!("RootQuery"))
            .rename(&mut schema, name!("Query"))
            .unwrap();
        ObjectTypeDefinitionPosition::new(name!("Item"))
            .rename(&mut schema, name!("Product"))
            .unwrap();
        ScalarTypeDefinitionPosition {
            type_name: name!("Tag"),
        }
        .rename(&mut schema, name!("Marker"))
        .unwrap();

        // The renamed types move to the end of the type registry.
        insta::assert_snapshot!(schema.schema(), @r#"
            schema {
              query: Query
            }

            interface Labeled {
              label: Marker
            }

            type Box {
              contents: Stuff
            }

            union Stuff = Product | Box

            type Query {
              item: Product
            }

            type Product implements Labeled {
              label: Marker
              note: String
            }

            scalar Marker
        "#);

        // The referencer bookkeeping follows the renames.
        let marker_referencers = schema.referencers.scalar_types.get("Marker").unwrap();
        assert!(
            marker_referencers
                .object_fields
                .contains(&ObjectFieldDefinitionPosition {
                    type_name: name!("Product"),
                    field_name: name!("label"),
                })
        );
        let product_referencers = schema.referencers.object_types.get("Product").unwrap();
        assert!(
            product_referencers
                .object_fields
                .contains(&ObjectFieldDefinitionPosition {
                    type_name: name!("Query"),
                    field_name: name!("item"),
                })
        );
        assert!(!schema.referencers.contains_type_name("Item"));
        assert!(!schema.referencers.contains_type_name("Tag"));
    }

    #[test]
    fn rename_refuses_existing_and_built_in_names() {
        let mut schema = parse(
            r#"
            type User {
                id: ID!
            }
            type Query {
                me: User
            }
        "#,
        );

        let position = ObjectTypeDefinitionPosition::new(name!("User"));
        let err = position.rename(&mut schema, name!("Query")).unwrap_err();
        assert!(matches!(err, SchemaError::DuplicateName { .. }));
        let err = position.rename(&mut schema, name!("String")).unwrap_err();
        assert!(matches!(err, SchemaError::BuiltInMutation { .. }));
    }

    #[test]
    fn built_in_types_are_protected() {
        let mut schema = parse(
            r#"
            type Query {
                ping: String
            }
        "#,
        );

        let string_position = ScalarTypeDefinitionPosition {
            type_name: name!("String"),
        };
        let err = string_position.remove(&mut schema).unwrap_err();
        assert!(matches!(err, SchemaError::BuiltInMutation { .. }));
        let err = DirectiveDefinitionPosition {
            directive_name: name!("deprecated"),
        }
        .remove(&mut schema)
        .unwrap_err();
        assert!(matches!(err, SchemaError::BuiltInMutation { .. }));
    }

    #[test]
    fn insert_existing_type_name_fails() {
        let mut schema = parse(
            r#"
            type User {
                id: ID!
            }
            type Query {
                me: User
            }
        "#,
        );

        let err = ObjectTypeDefinitionPosition::new(name!("User"))
            .pre_insert(&mut schema)
            .unwrap_err();
        assert!(matches!(err, SchemaError::DuplicateName { .. }));
    }

    #[test]
    fn inserting_mutation_type_binds_root() {
        let mut schema = parse(
            r#"
            type Query {
                ok: Boolean
            }
        "#,
        );

        let position = ObjectTypeDefinitionPosition::new(name!("Mutation"));
        position.pre_insert(&mut schema).unwrap();
        TypeDefinitionPosition::Object(position.clone())
            .insert_empty(&mut schema)
            .unwrap();
        position
            .field(name!("ping"))
            .insert(
                &mut schema,
                Component::new(FieldDefinition {
                    description: None,
                    name: name!("ping"),
                    arguments: Vec::new(),
                    ty: ty!(String),
                    directives: Default::default(),
                }),
            )
            .unwrap();

        let root = SchemaRootDefinitionPosition {
            root_kind: SchemaRootDefinitionKind::Mutation,
        };
        assert_eq!(root.get(schema.schema()).unwrap().name, "Mutation");
        let mutation_referencers = schema.referencers.object_types.get("Mutation").unwrap();
        assert!(mutation_referencers.schema_roots.contains(&root));
    }

    #[test]
    fn set_field_type_updates_referencers() {
        let mut schema = parse(
            r#"
            type User {
                id: ID!
            }
            type Query {
                me: User
            }
        "#,
        );

        let field = ObjectFieldDefinitionPosition {
            type_name: name!("Query"),
            field_name: name!("me"),
        };
        field.set_type(&mut schema, ty!(ID)).unwrap();

        assert!(
            schema
                .referencers
                .object_types
                .get("User")
                .unwrap()
                .object_fields
                .is_empty()
        );
        assert!(
            schema
                .referencers
                .scalar_types
                .get("ID")
                .unwrap()
                .object_fields
                .contains(&field)
        );
        insta::assert_snapshot!(schema.schema(), @r#"
            type User {
              id: ID!
            }

            type Query {
              me: ID
            }
        "#);
    }

    #[test]
    fn set_field_type_refuses_input_type() {
        let mut schema = parse(
            r#"
            input Filter {
                text: String
            }
            type Query {
                me(filter: Filter): String
            }
        "#,
        );

        let field = ObjectFieldDefinitionPosition {
            type_name: name!("Query"),
            field_name: name!("me"),
        };
        assert!(field.set_type(&mut schema, ty!(Filter)).is_err());
        assert!(field.set_type(&mut schema, ty!(Missing)).is_err());
    }

    #[test]
    fn remove_directive_definition_removes_applications() {
        let mut schema = parse(
            r#"
            directive @tag(name: String!) repeatable on OBJECT | FIELD_DEFINITION

            type Product @tag(name: "a") {
                sku: String @tag(name: "b")
            }
            type Query {
                products: [Product]
            }
        "#,
        );

        DirectiveDefinitionPosition {
            directive_name: name!("tag"),
        }
        .remove(&mut schema)
        .unwrap();

        insta::assert_snapshot!(schema.schema(), @r#"
            type Product {
              sku: String
            }

            type Query {
              products: [Product]
            }
        "#);
        assert!(!schema.referencers.contains_directive_name("tag"));
    }

    #[test]
    fn schema_directive_removal_recomputes_features() {
        let sdl = r#"
          extend schema
            @link(url: "https://specs.apollo.dev/link/v1.0")

          type Query { x: Int }

          enum link__Purpose {
            SECURITY
            EXECUTION
          }

          scalar link__Import

          directive @link(url: String, as: String, import: [link__Import], for: link__Purpose) repeatable on SCHEMA
        "#;
        let mut schema =
            CoreSchema::new(Schema::parse(sdl, "links.graphqls").unwrap()).unwrap();
        assert!(schema.features.is_some());

        SchemaDefinitionPosition
            .remove_directive_name(&mut schema, "link")
            .unwrap();

        assert!(schema.features.is_none());
        assert!(schema.schema.schema_definition.directives.is_empty());
    }

    #[test]
    fn failed_directive_insertion_leaves_no_application() {
        let mut schema = parse(
            r#"
            type Query {
                me: String
            }
        "#,
        );

        let position = ObjectTypeDefinitionPosition::new(name!("Query"));
        let error = position
            .insert_directive(
                &mut schema,
                Component::new(Directive {
                    name: name!("nope"),
                    arguments: Vec::new(),
                }),
            )
            .expect_err("no @nope definition exists");
        assert!(matches!(error, SchemaError::UnknownDirective { .. }));
        assert!(position.get(schema.schema()).unwrap().directives.is_empty());

        let error = SchemaDefinitionPosition
            .insert_directive(
                &mut schema,
                Component::new(Directive {
                    name: name!("nope"),
                    arguments: Vec::new(),
                }),
            )
            .expect_err("no @nope definition exists");
        assert!(matches!(error, SchemaError::UnknownDirective { .. }));
        assert!(schema.schema.schema_definition.directives.is_empty());
        assert!(!schema.referencers.contains_directive_name("nope"));
    }

    #[test]
    fn failed_feature_insertion_detaches_the_application() {
        let sdl = r#"
          extend schema
            @link(url: "https://specs.apollo.dev/link/v1.0")

          type Query { x: Int }

          enum link__Purpose {
            SECURITY
            EXECUTION
          }

          scalar link__Import

          directive @link(url: String, as: String, import: [link__Import], for: link__Purpose) repeatable on SCHEMA
        "#;
        let mut schema =
            CoreSchema::new(Schema::parse(sdl, "links.graphqls").unwrap()).unwrap();
        let directives_before = schema.schema.schema_definition.directives.len();

        // A second self-describing @link only fails once the feature metadata
        // is recomputed, so the application must be rolled back.
        let duplicate = Component::new(Directive {
            name: name!("link"),
            arguments: vec![Node::new(ast::Argument {
                name: name!("url"),
                value: Node::new(ast::Value::String(
                    "https://specs.apollo.dev/link/v1.0".to_string(),
                )),
            })],
        });
        SchemaDefinitionPosition
            .insert_directive(&mut schema, duplicate)
            .expect_err("the core specification may only be applied once");

        assert_eq!(
            schema.schema.schema_definition.directives.len(),
            directives_before
        );
        assert!(schema.features.is_some());
    }
}
