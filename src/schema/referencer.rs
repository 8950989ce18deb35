use std::fmt;
use std::hash::Hash;

use apollo_compiler::Name;
use apollo_compiler::Node;
use apollo_compiler::ast;
use apollo_compiler::collections::IndexMap;
use apollo_compiler::collections::IndexSet;
use itertools::Itertools;

use super::CoreSchema;
use crate::error::SchemaError;
use crate::error::internal_error;
use crate::schema::position::DirectiveArgumentDefinitionPosition;
use crate::schema::position::DirectiveTargetPosition;
use crate::schema::position::EnumTypeDefinitionPosition;
use crate::schema::position::EnumValueDefinitionPosition;
use crate::schema::position::InputObjectFieldDefinitionPosition;
use crate::schema::position::InputObjectTypeDefinitionPosition;
use crate::schema::position::InterfaceFieldArgumentDefinitionPosition;
use crate::schema::position::InterfaceFieldDefinitionPosition;
use crate::schema::position::InterfaceTypeDefinitionPosition;
use crate::schema::position::ObjectFieldArgumentDefinitionPosition;
use crate::schema::position::ObjectFieldDefinitionPosition;
use crate::schema::position::ObjectTypeDefinitionPosition;
use crate::schema::position::ScalarTypeDefinitionPosition;
use crate::schema::position::SchemaDefinitionPosition;
use crate::schema::position::SchemaRootDefinitionPosition;
use crate::schema::position::UnionTypeDefinitionPosition;
use crate::schema::position::UnionTypenameFieldDefinitionPosition;

/// The reverse index of a schema: for each named type and each directive
/// definition, the set of positions that reference it. Maintained incrementally
/// by every position mutation, so removing a definition can immediately find
/// and clear every element that was pointing at it.
#[derive(Clone, Default)]
pub struct Referencers {
    pub scalar_types: IndexMap<Name, ScalarTypeReferencers>,
    pub object_types: IndexMap<Name, ObjectTypeReferencers>,
    pub interface_types: IndexMap<Name, InterfaceTypeReferencers>,
    pub union_types: IndexMap<Name, UnionTypeReferencers>,
    pub enum_types: IndexMap<Name, EnumTypeReferencers>,
    pub input_object_types: IndexMap<Name, InputObjectTypeReferencers>,
    pub directives: IndexMap<Name, DirectiveReferencers>,
}

impl fmt::Debug for Referencers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();

        fn push_entry(
            parts: &mut Vec<String>,
            name: &Name,
            refs: impl Iterator<Item = String>,
        ) {
            // Introspection positions only add noise here.
            let all_refs = refs.filter(|s| !s.contains("__")).join(", ");
            if !all_refs.is_empty() {
                parts.push(format!("{name}: [{all_refs}]"));
            }
        }

        for (name, refs) in &self.scalar_types {
            push_entry(&mut parts, name, refs.display_strings());
        }
        for (name, refs) in &self.object_types {
            push_entry(&mut parts, name, refs.display_strings());
        }
        for (name, refs) in &self.interface_types {
            push_entry(&mut parts, name, refs.display_strings());
        }
        for (name, refs) in &self.union_types {
            push_entry(&mut parts, name, refs.display_strings());
        }
        for (name, refs) in &self.enum_types {
            push_entry(&mut parts, name, refs.display_strings());
        }
        for (name, refs) in &self.input_object_types {
            push_entry(&mut parts, name, refs.display_strings());
        }
        for (name, refs) in &self.directives {
            push_entry(&mut parts, name, refs.iter().map(|p| p.to_string()));
        }

        if f.alternate() {
            write!(f, "{{\n  {}\n}}", parts.join(",\n  "))
        } else {
            write!(f, "{{{}}}", parts.join(", "))
        }
    }
}

macro_rules! type_referencer_accessors {
    ( $( ($method:ident, $field:ident, $refs:ty, $kind:literal), )+ ) => {
        impl Referencers {
            $(
                pub fn $method(&self, name: &str) -> Result<&$refs, SchemaError> {
                    self.$field.get(name).ok_or_else(|| {
                        internal_error!(
                            concat!($kind, " type referencers unexpectedly missing type `{}`"),
                            name,
                        )
                    })
                }
            )+
        }
    };
}

type_referencer_accessors!(
    (get_scalar_type, scalar_types, ScalarTypeReferencers, "Scalar"),
    (get_object_type, object_types, ObjectTypeReferencers, "Object"),
    (
        get_interface_type,
        interface_types,
        InterfaceTypeReferencers,
        "Interface"
    ),
    (get_union_type, union_types, UnionTypeReferencers, "Union"),
    (get_enum_type, enum_types, EnumTypeReferencers, "Enum"),
    (
        get_input_object_type,
        input_object_types,
        InputObjectTypeReferencers,
        "Input object"
    ),
);

impl Referencers {
    pub fn contains_type_name(&self, name: &str) -> bool {
        self.scalar_types.contains_key(name)
            || self.object_types.contains_key(name)
            || self.interface_types.contains_key(name)
            || self.union_types.contains_key(name)
            || self.enum_types.contains_key(name)
            || self.input_object_types.contains_key(name)
    }

    pub fn contains_directive_name(&self, name: &str) -> bool {
        self.directives.contains_key(name)
    }

    pub fn get_directive(&self, name: &str) -> Result<&DirectiveReferencers, SchemaError> {
        self.directives.get(name).ok_or_else(|| {
            internal_error!("Directive referencers unexpectedly missing directive `{name}`")
        })
    }

    pub fn get_directive_applications<'schema>(
        &self,
        schema: &'schema CoreSchema,
        name: &Name,
    ) -> Result<
        impl Iterator<Item = (DirectiveTargetPosition, &'schema Node<ast::Directive>)>,
        SchemaError,
    > {
        let directive_referencers = self.get_directive(name)?;
        Ok(directive_referencers.iter().flat_map(|pos| {
            pos.get_applied_directives(schema, name)
                .into_iter()
                .map(move |directive_application| (pos.clone(), directive_application))
        }))
    }

    pub fn rename_object_type(&mut self, old_name: &Name, new_name: &Name) {
        for refs in self.scalar_types.values_mut() {
            rekey(&mut refs.object_fields, old_name, new_name);
            rekey(&mut refs.object_field_arguments, old_name, new_name);
        }
        for refs in self.object_types.values_mut() {
            rekey(&mut refs.object_fields, old_name, new_name);
        }
        for refs in self.interface_types.values_mut() {
            rekey(&mut refs.object_types, old_name, new_name);
            rekey(&mut refs.object_fields, old_name, new_name);
        }
        for refs in self.union_types.values_mut() {
            rekey(&mut refs.object_fields, old_name, new_name);
        }
        for refs in self.enum_types.values_mut() {
            rekey(&mut refs.object_fields, old_name, new_name);
            rekey(&mut refs.object_field_arguments, old_name, new_name);
        }
        for refs in self.input_object_types.values_mut() {
            rekey(&mut refs.object_field_arguments, old_name, new_name);
        }
        for refs in self.directives.values_mut() {
            rekey(&mut refs.object_types, old_name, new_name);
            rekey(&mut refs.object_fields, old_name, new_name);
            rekey(&mut refs.object_field_arguments, old_name, new_name);
        }
    }

    pub fn rename_interface_type(&mut self, old_name: &Name, new_name: &Name) {
        for refs in self.scalar_types.values_mut() {
            rekey(&mut refs.interface_fields, old_name, new_name);
            rekey(&mut refs.interface_field_arguments, old_name, new_name);
        }
        for refs in self.object_types.values_mut() {
            rekey(&mut refs.interface_fields, old_name, new_name);
        }
        for refs in self.interface_types.values_mut() {
            rekey(&mut refs.interface_types, old_name, new_name);
            rekey(&mut refs.interface_fields, old_name, new_name);
        }
        for refs in self.union_types.values_mut() {
            rekey(&mut refs.interface_fields, old_name, new_name);
        }
        for refs in self.enum_types.values_mut() {
            rekey(&mut refs.interface_fields, old_name, new_name);
            rekey(&mut refs.interface_field_arguments, old_name, new_name);
        }
        for refs in self.input_object_types.values_mut() {
            rekey(&mut refs.interface_field_arguments, old_name, new_name);
        }
        for refs in self.directives.values_mut() {
            rekey(&mut refs.interface_types, old_name, new_name);
            rekey(&mut refs.interface_fields, old_name, new_name);
            rekey(&mut refs.interface_field_arguments, old_name, new_name);
        }
    }

    pub fn rename_union_type(&mut self, old_name: &Name, new_name: &Name) {
        for refs in self.scalar_types.values_mut() {
            rekey(&mut refs.union_fields, old_name, new_name);
        }
        for refs in self.object_types.values_mut() {
            rekey(&mut refs.union_types, old_name, new_name);
        }
        for refs in self.directives.values_mut() {
            rekey(&mut refs.union_types, old_name, new_name);
        }
    }

    pub fn rename_scalar_type(&mut self, old_name: &Name, new_name: &Name) {
        for refs in self.directives.values_mut() {
            rekey(&mut refs.scalar_types, old_name, new_name);
        }
    }

    pub fn rename_enum_type(&mut self, old_name: &Name, new_name: &Name) {
        for refs in self.directives.values_mut() {
            rekey(&mut refs.enum_types, old_name, new_name);
            rekey(&mut refs.enum_values, old_name, new_name);
        }
    }

    pub fn rename_input_object_type(&mut self, old_name: &Name, new_name: &Name) {
        for refs in self.scalar_types.values_mut() {
            rekey(&mut refs.input_object_fields, old_name, new_name);
        }
        for refs in self.enum_types.values_mut() {
            rekey(&mut refs.input_object_fields, old_name, new_name);
        }
        for refs in self.input_object_types.values_mut() {
            rekey(&mut refs.input_object_fields, old_name, new_name);
        }
        for refs in self.directives.values_mut() {
            rekey(&mut refs.input_object_types, old_name, new_name);
            rekey(&mut refs.input_object_fields, old_name, new_name);
        }
    }
}

/// A position nested under (or naming) a specific type definition, so a type
/// rename must rewrite its stored type name.
trait TypeScopedPosition: Clone + Eq + Hash {
    fn scope_type_name(&self) -> &Name;
    fn with_scope_type_name(&self, type_name: Name) -> Self;
}

macro_rules! type_scoped_positions {
    ( $( $ty:ty, )+ ) => {
        $(
            impl TypeScopedPosition for $ty {
                fn scope_type_name(&self) -> &Name {
                    &self.type_name
                }

                fn with_scope_type_name(&self, type_name: Name) -> Self {
                    Self {
                        type_name,
                        ..self.clone()
                    }
                }
            }
        )+
    };
}

type_scoped_positions!(
    ScalarTypeDefinitionPosition,
    ObjectTypeDefinitionPosition,
    ObjectFieldDefinitionPosition,
    ObjectFieldArgumentDefinitionPosition,
    InterfaceTypeDefinitionPosition,
    InterfaceFieldDefinitionPosition,
    InterfaceFieldArgumentDefinitionPosition,
    UnionTypeDefinitionPosition,
    UnionTypenameFieldDefinitionPosition,
    EnumTypeDefinitionPosition,
    EnumValueDefinitionPosition,
    InputObjectTypeDefinitionPosition,
    InputObjectFieldDefinitionPosition,
);

fn rekey<P: TypeScopedPosition>(positions: &mut IndexSet<P>, old_name: &Name, new_name: &Name) {
    let renamed: Vec<_> = positions
        .iter()
        .filter(|pos| pos.scope_type_name() == old_name)
        .map(|pos| pos.with_scope_type_name(new_name.clone()))
        .collect();
    if renamed.is_empty() {
        return;
    }
    positions.retain(|pos| pos.scope_type_name() != old_name);
    positions.extend(renamed);
}

#[derive(Debug, Clone, Default)]
pub struct ScalarTypeReferencers {
    pub object_fields: IndexSet<ObjectFieldDefinitionPosition>,
    pub object_field_arguments: IndexSet<ObjectFieldArgumentDefinitionPosition>,
    pub interface_fields: IndexSet<InterfaceFieldDefinitionPosition>,
    pub interface_field_arguments: IndexSet<InterfaceFieldArgumentDefinitionPosition>,
    pub union_fields: IndexSet<UnionTypenameFieldDefinitionPosition>,
    pub input_object_fields: IndexSet<InputObjectFieldDefinitionPosition>,
    pub directive_arguments: IndexSet<DirectiveArgumentDefinitionPosition>,
}

impl ScalarTypeReferencers {
    pub fn len(&self) -> usize {
        self.object_fields.len()
            + self.object_field_arguments.len()
            + self.interface_fields.len()
            + self.interface_field_arguments.len()
            + self.union_fields.len()
            + self.input_object_fields.len()
            + self.directive_arguments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn display_strings(&self) -> impl Iterator<Item = String> + '_ {
        self.object_fields
            .iter()
            .map(|p| p.to_string())
            .chain(self.object_field_arguments.iter().map(|p| p.to_string()))
            .chain(self.interface_fields.iter().map(|p| p.to_string()))
            .chain(self.interface_field_arguments.iter().map(|p| p.to_string()))
            .chain(self.union_fields.iter().map(|p| p.to_string()))
            .chain(self.input_object_fields.iter().map(|p| p.to_string()))
            .chain(self.directive_arguments.iter().map(|p| p.to_string()))
    }
}

#[derive(Debug, Clone, Default)]
pub struct ObjectTypeReferencers {
    pub schema_roots: IndexSet<SchemaRootDefinitionPosition>,
    pub object_fields: IndexSet<ObjectFieldDefinitionPosition>,
    pub interface_fields: IndexSet<InterfaceFieldDefinitionPosition>,
    pub union_types: IndexSet<UnionTypeDefinitionPosition>,
}

impl ObjectTypeReferencers {
    pub fn len(&self) -> usize {
        self.schema_roots.len()
            + self.object_fields.len()
            + self.interface_fields.len()
            + self.union_types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn display_strings(&self) -> impl Iterator<Item = String> + '_ {
        self.schema_roots
            .iter()
            .map(|p| p.to_string())
            .chain(self.object_fields.iter().map(|p| p.to_string()))
            .chain(self.interface_fields.iter().map(|p| p.to_string()))
            .chain(self.union_types.iter().map(|p| p.to_string()))
    }
}

#[derive(Debug, Clone, Default)]
pub struct InterfaceTypeReferencers {
    pub object_types: IndexSet<ObjectTypeDefinitionPosition>,
    pub object_fields: IndexSet<ObjectFieldDefinitionPosition>,
    pub interface_types: IndexSet<InterfaceTypeDefinitionPosition>,
    pub interface_fields: IndexSet<InterfaceFieldDefinitionPosition>,
}

impl InterfaceTypeReferencers {
    pub fn len(&self) -> usize {
        self.object_types.len()
            + self.object_fields.len()
            + self.interface_types.len()
            + self.interface_fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn display_strings(&self) -> impl Iterator<Item = String> + '_ {
        self.object_types
            .iter()
            .map(|p| p.to_string())
            .chain(self.object_fields.iter().map(|p| p.to_string()))
            .chain(self.interface_types.iter().map(|p| p.to_string()))
            .chain(self.interface_fields.iter().map(|p| p.to_string()))
    }
}

#[derive(Debug, Clone, Default)]
pub struct UnionTypeReferencers {
    pub object_fields: IndexSet<ObjectFieldDefinitionPosition>,
    pub interface_fields: IndexSet<InterfaceFieldDefinitionPosition>,
}

impl UnionTypeReferencers {
    pub fn len(&self) -> usize {
        self.object_fields.len() + self.interface_fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn display_strings(&self) -> impl Iterator<Item = String> + '_ {
        self.object_fields
            .iter()
            .map(|p| p.to_string())
            .chain(self.interface_fields.iter().map(|p| p.to_string()))
    }
}

#[derive(Debug, Clone, Default)]
pub struct EnumTypeReferencers {
    pub object_fields: IndexSet<ObjectFieldDefinitionPosition>,
    pub object_field_arguments: IndexSet<ObjectFieldArgumentDefinitionPosition>,
    pub interface_fields: IndexSet<InterfaceFieldDefinitionPosition>,
    pub interface_field_arguments: IndexSet<InterfaceFieldArgumentDefinitionPosition>,
    pub input_object_fields: IndexSet<InputObjectFieldDefinitionPosition>,
    pub directive_arguments: IndexSet<DirectiveArgumentDefinitionPosition>,
}

impl EnumTypeReferencers {
    pub fn len(&self) -> usize {
        self.object_fields.len()
            + self.object_field_arguments.len()
            + self.interface_fields.len()
            + self.interface_field_arguments.len()
            + self.input_object_fields.len()
            + self.directive_arguments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn display_strings(&self) -> impl Iterator<Item = String> + '_ {
        self.object_fields
            .iter()
            .map(|p| p.to_string())
            .chain(self.object_field_arguments.iter().map(|p| p.to_string()))
            .chain(self.interface_fields.iter().map(|p| p.to_string()))
            .chain(self.interface_field_arguments.iter().map(|p| p.to_string()))
            .chain(self.input_object_fields.iter().map(|p| p.to_string()))
            .chain(self.directive_arguments.iter().map(|p| p.to_string()))
    }
}

#[derive(Debug, Clone, Default)]
pub struct InputObjectTypeReferencers {
    pub object_field_arguments: IndexSet<ObjectFieldArgumentDefinitionPosition>,
    pub interface_field_arguments: IndexSet<InterfaceFieldArgumentDefinitionPosition>,
    pub input_object_fields: IndexSet<InputObjectFieldDefinitionPosition>,
    pub directive_arguments: IndexSet<DirectiveArgumentDefinitionPosition>,
}

impl InputObjectTypeReferencers {
    pub fn len(&self) -> usize {
        self.object_field_arguments.len()
            + self.interface_field_arguments.len()
            + self.input_object_fields.len()
            + self.directive_arguments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn display_strings(&self) -> impl Iterator<Item = String> + '_ {
        self.object_field_arguments
            .iter()
            .map(|p| p.to_string())
            .chain(self.interface_field_arguments.iter().map(|p| p.to_string()))
            .chain(self.input_object_fields.iter().map(|p| p.to_string()))
            .chain(self.directive_arguments.iter().map(|p| p.to_string()))
    }
}

#[derive(Debug, Clone, Default)]
pub struct DirectiveReferencers {
    pub schema: Option<SchemaDefinitionPosition>,
    pub scalar_types: IndexSet<ScalarTypeDefinitionPosition>,
    pub object_types: IndexSet<ObjectTypeDefinitionPosition>,
    pub object_fields: IndexSet<ObjectFieldDefinitionPosition>,
    pub object_field_arguments: IndexSet<ObjectFieldArgumentDefinitionPosition>,
    pub interface_types: IndexSet<InterfaceTypeDefinitionPosition>,
    pub interface_fields: IndexSet<InterfaceFieldDefinitionPosition>,
    pub interface_field_arguments: IndexSet<InterfaceFieldArgumentDefinitionPosition>,
    pub union_types: IndexSet<UnionTypeDefinitionPosition>,
    pub enum_types: IndexSet<EnumTypeDefinitionPosition>,
    pub enum_values: IndexSet<EnumValueDefinitionPosition>,
    pub input_object_types: IndexSet<InputObjectTypeDefinitionPosition>,
    pub input_object_fields: IndexSet<InputObjectFieldDefinitionPosition>,
    pub directive_arguments: IndexSet<DirectiveArgumentDefinitionPosition>,
}

impl DirectiveReferencers {
    pub fn len(&self) -> usize {
        usize::from(self.schema.is_some())
            + self.scalar_types.len()
            + self.object_types.len()
            + self.object_fields.len()
            + self.object_field_arguments.len()
            + self.interface_types.len()
            + self.interface_fields.len()
            + self.interface_field_arguments.len()
            + self.union_types.len()
            + self.enum_types.len()
            + self.enum_values.len()
            + self.input_object_types.len()
            + self.input_object_fields.len()
            + self.directive_arguments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn extend(&mut self, other: &Self) {
        if let Some(schema) = &other.schema {
            self.schema = Some(schema.clone());
        }
        self.scalar_types.extend(other.scalar_types.iter().cloned());
        self.object_types.extend(other.object_types.iter().cloned());
        self.object_fields
            .extend(other.object_fields.iter().cloned());
        self.object_field_arguments
            .extend(other.object_field_arguments.iter().cloned());
        self.interface_types
            .extend(other.interface_types.iter().cloned());
        self.interface_fields
            .extend(other.interface_fields.iter().cloned());
        self.interface_field_arguments
            .extend(other.interface_field_arguments.iter().cloned());
        self.union_types.extend(other.union_types.iter().cloned());
        self.enum_types.extend(other.enum_types.iter().cloned());
        self.enum_values.extend(other.enum_values.iter().cloned());
        self.input_object_types
            .extend(other.input_object_types.iter().cloned());
        self.input_object_fields
            .extend(other.input_object_fields.iter().cloned());
        self.directive_arguments
            .extend(other.directive_arguments.iter().cloned());
    }

    pub fn iter(&self) -> impl Iterator<Item = DirectiveTargetPosition> + '_ {
        self.schema
            .iter()
            .cloned()
            .map(DirectiveTargetPosition::Schema)
            .chain(
                self.scalar_types
                    .iter()
                    .cloned()
                    .map(DirectiveTargetPosition::ScalarType),
            )
            .chain(
                self.object_types
                    .iter()
                    .cloned()
                    .map(DirectiveTargetPosition::ObjectType),
            )
            .chain(
                self.object_fields
                    .iter()
                    .cloned()
                    .map(DirectiveTargetPosition::ObjectField),
            )
            .chain(
                self.object_field_arguments
                    .iter()
                    .cloned()
                    .map(DirectiveTargetPosition::ObjectFieldArgument),
            )
            .chain(
                self.interface_types
                    .iter()
                    .cloned()
                    .map(DirectiveTargetPosition::InterfaceType),
            )
            .chain(
                self.interface_fields
                    .iter()
                    .cloned()
                    .map(DirectiveTargetPosition::InterfaceField),
            )
            .chain(
                self.interface_field_arguments
                    .iter()
                    .cloned()
                    .map(DirectiveTargetPosition::InterfaceFieldArgument),
            )
            .chain(
                self.union_types
                    .iter()
                    .cloned()
                    .map(DirectiveTargetPosition::UnionType),
            )
            .chain(
                self.enum_types
                    .iter()
                    .cloned()
                    .map(DirectiveTargetPosition::EnumType),
            )
            .chain(
                self.enum_values
                    .iter()
                    .cloned()
                    .map(DirectiveTargetPosition::EnumValue),
            )
            .chain(
                self.input_object_types
                    .iter()
                    .cloned()
                    .map(DirectiveTargetPosition::InputObjectType),
            )
            .chain(
                self.input_object_fields
                    .iter()
                    .cloned()
                    .map(DirectiveTargetPosition::InputObjectField),
            )
            .chain(
                self.directive_arguments
                    .iter()
                    .cloned()
                    .map(DirectiveTargetPosition::DirectiveArgument),
            )
    }
}
