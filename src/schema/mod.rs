use std::ops::Deref;
use std::sync::Arc;

use apollo_compiler::Name;
use apollo_compiler::Schema;
use apollo_compiler::schema::ExtendedType;
use apollo_compiler::validation::Valid;
use apollo_compiler::collections::IndexSet;

use crate::error::SchemaError;
use crate::link::CoreFeatures;
use crate::schema::position::CompositeTypeDefinitionPosition;
use crate::schema::position::DirectiveDefinitionPosition;
use crate::schema::position::EnumTypeDefinitionPosition;
use crate::schema::position::InputObjectTypeDefinitionPosition;
use crate::schema::position::InterfaceTypeDefinitionPosition;
use crate::schema::position::ObjectTypeDefinitionPosition;
use crate::schema::position::ScalarTypeDefinitionPosition;
use crate::schema::position::TypeDefinitionPosition;
use crate::schema::position::UnionTypeDefinitionPosition;
use crate::schema::referencer::Referencers;

pub(crate) mod api_schema;
pub(crate) mod builtins;
pub mod position;
pub mod referencer;

/// A mutable schema with referencer and core-feature bookkeeping.
///
/// The underlying document is mutated exclusively through the position types
/// in [`position`], which keep the back-reference index and the feature
/// metadata in sync with every change.
pub struct CoreSchema {
    pub(crate) schema: Schema,
    pub(crate) referencers: Referencers,
    pub(crate) features: Option<Box<CoreFeatures>>,
}

impl CoreSchema {
    /// An empty schema holding only the built-in scalars and directives.
    pub fn new_empty() -> Result<CoreSchema, SchemaError> {
        Self::new(Schema::new())
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn referencers(&self) -> &Referencers {
        &self.referencers
    }

    /// The `@core`/`@link` features this schema declares, if any.
    pub fn features(&self) -> Option<&CoreFeatures> {
        self.features.as_deref()
    }

    pub fn is_core_schema(&self) -> bool {
        self.features.is_some()
    }

    pub fn get_types(&self) -> impl Iterator<Item = TypeDefinitionPosition> + '_ {
        self.schema.types.iter().map(|(type_name, type_)| {
            let type_name = type_name.clone();
            match type_ {
                ExtendedType::Scalar(_) => ScalarTypeDefinitionPosition { type_name }.into(),
                ExtendedType::Object(_) => ObjectTypeDefinitionPosition { type_name }.into(),
                ExtendedType::Interface(_) => InterfaceTypeDefinitionPosition { type_name }.into(),
                ExtendedType::Union(_) => UnionTypeDefinitionPosition { type_name }.into(),
                ExtendedType::Enum(_) => EnumTypeDefinitionPosition { type_name }.into(),
                ExtendedType::InputObject(_) => {
                    InputObjectTypeDefinitionPosition { type_name }.into()
                }
            }
        })
    }

    pub fn get_type(&self, type_name: Name) -> Result<TypeDefinitionPosition, SchemaError> {
        let type_ = self
            .schema
            .types
            .get(&type_name)
            .ok_or_else(|| SchemaError::UnknownType {
                name: type_name.to_string(),
            })?;
        Ok(match type_ {
            ExtendedType::Scalar(_) => ScalarTypeDefinitionPosition { type_name }.into(),
            ExtendedType::Object(_) => ObjectTypeDefinitionPosition { type_name }.into(),
            ExtendedType::Interface(_) => InterfaceTypeDefinitionPosition { type_name }.into(),
            ExtendedType::Union(_) => UnionTypeDefinitionPosition { type_name }.into(),
            ExtendedType::Enum(_) => EnumTypeDefinitionPosition { type_name }.into(),
            ExtendedType::InputObject(_) => InputObjectTypeDefinitionPosition { type_name }.into(),
        })
    }

    pub fn try_get_type(&self, type_name: Name) -> Option<TypeDefinitionPosition> {
        self.get_type(type_name).ok()
    }

    pub fn get_directive_definitions(
        &self,
    ) -> impl Iterator<Item = DirectiveDefinitionPosition> + '_ {
        self.schema
            .directive_definitions
            .keys()
            .map(|name| DirectiveDefinitionPosition {
                directive_name: name.clone(),
            })
    }

    pub fn get_directive_definition(&self, name: &Name) -> Option<DirectiveDefinitionPosition> {
        self.schema
            .directive_definitions
            .contains_key(name)
            .then(|| DirectiveDefinitionPosition {
                directive_name: name.clone(),
            })
    }

    /// The object types a value of the given composite type may be at runtime.
    pub fn possible_runtime_types(
        &self,
        composite_type_definition_position: CompositeTypeDefinitionPosition,
    ) -> Result<IndexSet<ObjectTypeDefinitionPosition>, SchemaError> {
        Ok(match composite_type_definition_position {
            CompositeTypeDefinitionPosition::Object(pos) => std::iter::once(pos).collect(),
            CompositeTypeDefinitionPosition::Interface(pos) => self
                .referencers
                .get_interface_type(&pos.type_name)?
                .object_types
                .clone(),
            CompositeTypeDefinitionPosition::Union(pos) => pos
                .get(self.schema())?
                .members
                .iter()
                .map(|t| ObjectTypeDefinitionPosition {
                    type_name: t.name.clone(),
                })
                .collect::<IndexSet<_>>(),
        })
    }

    /// Checks built-in redefinitions for structural compatibility, then runs
    /// full GraphQL validation.
    pub fn validate(self) -> Result<ValidCoreSchema, SchemaError> {
        builtins::validate_built_in_redefinitions(&self.schema)?;
        let schema = self.schema.validate()?.into_inner();
        Ok(CoreSchema {
            schema,
            referencers: self.referencers,
            features: self.features,
        }
        .assume_valid())
    }

    pub fn assume_valid(self) -> ValidCoreSchema {
        ValidCoreSchema(Arc::new(Valid::assume_valid(self)))
    }

    /// A structurally independent deep copy. The referencer index and feature
    /// metadata are rebuilt from the copied document, so the clone and the
    /// original can be mutated independently.
    pub fn clone_schema(&self) -> Result<CoreSchema, SchemaError> {
        Self::new(self.schema.clone())
    }
}

/// A [`CoreSchema`] that has passed validation. Cloning preserves the
/// validated status without re-running validation.
#[derive(Clone)]
pub struct ValidCoreSchema(pub(crate) Arc<Valid<CoreSchema>>);

impl ValidCoreSchema {
    pub fn new(schema: Valid<Schema>) -> Result<ValidCoreSchema, SchemaError> {
        let schema = CoreSchema::new(schema.into_inner())?;
        Ok(schema.assume_valid())
    }

    pub fn schema(&self) -> &Valid<Schema> {
        Valid::assume_valid_ref(&self.schema)
    }

    /// A deep copy that is still marked valid; the copied document is
    /// identical to a validated one, so validation is not re-run.
    pub fn clone_valid(&self) -> Result<ValidCoreSchema, SchemaError> {
        Ok(self.clone_schema()?.assume_valid())
    }

    /// Derives the API schema: the validated schema with inaccessible
    /// elements and core-feature machinery stripped.
    pub fn to_api_schema(&self) -> Result<ValidCoreSchema, SchemaError> {
        api_schema::to_api_schema(self.clone_schema()?)
    }
}

impl Deref for ValidCoreSchema {
    type Target = CoreSchema;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl PartialEq for ValidCoreSchema {
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl Eq for ValidCoreSchema {}

#[cfg(test)]
mod tests {
    use apollo_compiler::name;

    use super::*;

    #[test]
    fn empty_schema_has_built_ins_and_no_user_types() {
        let schema = CoreSchema::new_empty().unwrap();
        assert!(schema.schema().types.contains_key("String"));
        assert!(schema.schema().directive_definitions.contains_key("skip"));
        assert!(!schema.is_core_schema());
        assert!(schema.get_types().all(|ty| ty.is_introspection_type()
            || builtins::is_built_in_type_name(ty.type_name())));
    }

    #[test]
    fn clone_is_independent() {
        let schema = Schema::parse_and_validate(
            r#"
            type User {
                id: ID!
            }
            type Query {
                me: User
            }
            "#,
            "schema.graphql",
        )
        .unwrap()
        .into_inner();
        let original = CoreSchema::new(schema).unwrap();
        let mut clone = original.clone_schema().unwrap();

        ObjectTypeDefinitionPosition::new(name!("User"))
            .remove_recursive(&mut clone)
            .unwrap();

        assert!(original.schema().types.contains_key("User"));
        assert!(!clone.schema().types.contains_key("User"));
        assert!(original.referencers().contains_type_name("User"));
        assert!(!clone.referencers().contains_type_name("User"));
    }

    #[test]
    fn possible_runtime_types_for_interface_and_union() {
        let schema = Schema::parse_and_validate(
            r#"
            interface Node {
                id: ID!
            }
            type User implements Node {
                id: ID!
            }
            type Post implements Node {
                id: ID!
            }
            union Entity = User | Post
            type Query {
                node: Node
                entity: Entity
            }
            "#,
            "schema.graphql",
        )
        .unwrap()
        .into_inner();
        let schema = CoreSchema::new(schema).unwrap();

        let node = schema
            .possible_runtime_types(
                InterfaceTypeDefinitionPosition {
                    type_name: name!("Node"),
                }
                .into(),
            )
            .unwrap();
        assert_eq!(node.len(), 2);
        assert!(node.contains(&ObjectTypeDefinitionPosition::new(name!("User"))));

        let entity = schema
            .possible_runtime_types(
                UnionTypeDefinitionPosition {
                    type_name: name!("Entity"),
                }
                .into(),
            )
            .unwrap();
        assert_eq!(entity.len(), 2);
    }

    #[test]
    fn incompatible_built_in_redefinition_fails_validation() {
        let schema = Schema::parse(
            "type Query { x: Int }",
            "schema.graphql",
        )
        .unwrap();
        let mut schema = CoreSchema::new(schema).unwrap();
        let mut redefinition = builtins::built_in_directive_definition("skip")
            .unwrap()
            .as_ref()
            .clone();
        redefinition.repeatable = true;
        schema
            .schema
            .directive_definitions
            .insert(name!("skip"), apollo_compiler::Node::new(redefinition));

        assert!(matches!(
            schema.validate(),
            Err(SchemaError::BuiltInRedefinition { .. })
        ));
    }
}
