//! Implements API schema generation: the schema a consumer sees once
//! inaccessible elements and core-feature machinery are stripped.

use apollo_compiler::Name;
use apollo_compiler::name;

use crate::error::SchemaError;
use crate::error::bail;
use crate::schema::CoreSchema;
use crate::schema::ValidCoreSchema;
use crate::schema::position::TypeDefinitionPosition;

/// The name under which the inaccessible directive is known in this schema,
/// resolved through the feature metadata when the inaccessible spec is
/// linked, or the plain name when the schema defines it directly.
fn inaccessible_directive_name(schema: &CoreSchema) -> Option<Name> {
    if let Some(features) = schema.features() {
        if let Some(feature) = features
            .all_features()
            .iter()
            .find(|feature| feature.url.identity.name == "inaccessible")
        {
            return Some(feature.directive_name_in_schema(&name!("inaccessible")));
        }
    }
    schema
        .schema
        .directive_definitions
        .contains_key("inaccessible")
        .then(|| name!("inaccessible"))
}

/// Removes every element the inaccessible directive is applied to, children
/// before their parent types so removal never leaves dangling child
/// positions. References from accessible elements to a removed type are left
/// for re-validation to report.
fn remove_inaccessible_elements(schema: &mut CoreSchema) -> Result<(), SchemaError> {
    let Some(directive_name) = inaccessible_directive_name(schema) else {
        return Ok(());
    };
    let Some(referencers) = schema
        .referencers
        .directives
        .get(directive_name.as_str())
        .cloned()
    else {
        return Ok(());
    };

    for position in &referencers.object_field_arguments {
        position.remove(schema)?;
    }
    for position in &referencers.interface_field_arguments {
        position.remove(schema)?;
    }
    for position in &referencers.directive_arguments {
        position.remove(schema)?;
    }
    for position in &referencers.object_fields {
        position.remove(schema)?;
    }
    for position in &referencers.interface_fields {
        position.remove(schema)?;
    }
    for position in &referencers.input_object_fields {
        position.remove(schema)?;
    }
    for position in &referencers.enum_values {
        position.remove(schema)?;
    }
    for position in &referencers.scalar_types {
        position.remove(schema)?;
    }
    for position in &referencers.object_types {
        position.remove(schema)?;
    }
    for position in &referencers.interface_types {
        position.remove(schema)?;
    }
    for position in &referencers.union_types {
        position.remove(schema)?;
    }
    for position in &referencers.enum_types {
        position.remove(schema)?;
    }
    for position in &referencers.input_object_types {
        position.remove(schema)?;
    }

    Ok(())
}

/// Removes the types and directives owned by the schema's core features,
/// including the bootstrap `@core`/`@link` directive itself. Removing the
/// bootstrap definition strips its schema applications, which drops the
/// feature metadata.
fn remove_core_feature_elements(schema: &mut CoreSchema) -> Result<(), SchemaError> {
    let (types_for_removal, directives_for_removal) = {
        let Some(features) = schema.features() else {
            return Ok(());
        };
        let types = schema
            .get_types()
            .filter(|position| features.source_feature_of_type(position.type_name()).is_some())
            .collect::<Vec<_>>();
        let directives = schema
            .get_directive_definitions()
            .filter(|position| {
                features
                    .source_feature_of_directive(&position.directive_name)
                    .is_some()
            })
            .collect::<Vec<_>>();
        (types, directives)
    };
    tracing::debug!(
        "Removing {} feature-owned type(s) and {} feature directive(s) from the API schema",
        types_for_removal.len(),
        directives_for_removal.len(),
    );

    // First remove children of the types to be removed, so there won't be
    // outgoing references from the type.
    for position in &types_for_removal {
        match position {
            TypeDefinitionPosition::Object(position) => {
                let object = position.get(schema.schema())?;
                let remove_children = object
                    .fields
                    .keys()
                    .map(|field_name| position.field(field_name.clone()))
                    .collect::<Vec<_>>();
                for child in remove_children {
                    child.remove(schema)?;
                }
            }
            TypeDefinitionPosition::Interface(position) => {
                let interface = position.get(schema.schema())?;
                let remove_children = interface
                    .fields
                    .keys()
                    .map(|field_name| position.field(field_name.clone()))
                    .collect::<Vec<_>>();
                for child in remove_children {
                    child.remove(schema)?;
                }
            }
            TypeDefinitionPosition::InputObject(position) => {
                let input_object = position.get(schema.schema())?;
                let remove_children = input_object
                    .fields
                    .keys()
                    .map(|field_name| position.field(field_name.clone()))
                    .collect::<Vec<_>>();
                for child in remove_children {
                    child.remove(schema)?;
                }
            }
            TypeDefinitionPosition::Enum(position) => {
                let enum_ = position.get(schema.schema())?;
                let remove_children = enum_
                    .values
                    .keys()
                    .map(|value_name| position.value(value_name.clone()))
                    .collect::<Vec<_>>();
                for child in remove_children {
                    child.remove(schema)?;
                }
            }
            _ => {}
        }
    }

    for position in &directives_for_removal {
        position.remove(schema)?;
    }

    for position in &types_for_removal {
        position.remove(schema)?;
    }

    Ok(())
}

pub(crate) fn to_api_schema(mut schema: CoreSchema) -> Result<ValidCoreSchema, SchemaError> {
    remove_inaccessible_elements(&mut schema)?;
    remove_core_feature_elements(&mut schema)?;

    if schema.is_core_schema() {
        bail!("API schema still carries core feature metadata after feature removal");
    }

    schema.validate()
}

#[cfg(test)]
mod tests {
    use apollo_compiler::Schema;

    use super::*;
    use crate::schema::position::ObjectFieldDefinitionPosition;

    const LINKED_SDL: &str = r#"
        schema
          @link(url: "https://specs.apollo.dev/link/v1.0")
          @link(url: "https://specs.apollo.dev/inaccessible/v0.2", import: ["@inaccessible"])
        {
          query: Query
        }

        directive @link(url: String, as: String, import: [link__Import], for: link__Purpose) repeatable on SCHEMA
        directive @inaccessible on FIELD_DEFINITION | OBJECT | INTERFACE | UNION | ARGUMENT_DEFINITION | SCALAR | ENUM | ENUM_VALUE | INPUT_OBJECT | INPUT_FIELD_DEFINITION

        scalar link__Import

        enum link__Purpose {
          SECURITY
          EXECUTION
        }

        type Query {
          visible: String
          hidden: Internal @inaccessible
        }

        type Internal @inaccessible {
          secret: String
        }
    "#;

    #[test]
    fn strips_inaccessible_and_feature_elements() {
        let schema = Schema::parse_and_validate(LINKED_SDL, "supergraph.graphql")
            .unwrap()
            .into_inner();
        let schema = CoreSchema::new(schema).unwrap();
        assert!(schema.is_core_schema());

        let api = schema.assume_valid().to_api_schema().unwrap();

        assert!(!api.is_core_schema());
        assert!(!api.schema().types.contains_key("Internal"));
        assert!(!api.schema().types.contains_key("link__Purpose"));
        assert!(!api.schema().types.contains_key("link__Import"));
        assert!(!api.schema().directive_definitions.contains_key("link"));
        assert!(
            !api.schema()
                .directive_definitions
                .contains_key("inaccessible")
        );
        let query = api.schema().get_object("Query").unwrap();
        assert!(query.fields.contains_key("visible"));
        assert!(!query.fields.contains_key("hidden"));
    }

    #[test]
    fn aliased_inaccessible_directive_is_honoured() {
        let sdl = r#"
            schema
              @link(url: "https://specs.apollo.dev/link/v1.0")
              @link(url: "https://specs.apollo.dev/inaccessible/v0.2", as: "private")
            {
              query: Query
            }

            directive @link(url: String, as: String, import: [link__Import], for: link__Purpose) repeatable on SCHEMA
            directive @private on FIELD_DEFINITION | OBJECT

            scalar link__Import

            enum link__Purpose {
              SECURITY
              EXECUTION
            }

            type Query {
              visible: String
              hidden: String @private
            }
        "#;
        let schema = Schema::parse_and_validate(sdl, "supergraph.graphql")
            .unwrap()
            .into_inner();
        let schema = CoreSchema::new(schema).unwrap();

        let api = schema.assume_valid().to_api_schema().unwrap();

        let query = api.schema().get_object("Query").unwrap();
        assert!(query.fields.contains_key("visible"));
        assert!(!query.fields.contains_key("hidden"));
        assert!(!api.schema().directive_definitions.contains_key("private"));
    }

    #[test]
    fn unlinked_schema_passes_through() {
        let sdl = r#"
            type Query {
              me: User
            }
            type User {
              id: ID!
            }
        "#;
        let schema = Schema::parse_and_validate(sdl, "schema.graphql")
            .unwrap()
            .into_inner();
        let schema = CoreSchema::new(schema).unwrap();

        let api = schema.assume_valid().to_api_schema().unwrap();

        assert!(api.schema().types.contains_key("User"));
        let field = ObjectFieldDefinitionPosition {
            type_name: name!("Query"),
            field_name: name!("me"),
        };
        assert!(field.get(api.schema()).is_ok());
    }
}
