use std::collections::BTreeMap;
use std::collections::btree_map::Keys;
use std::sync::Arc;

use apollo_compiler::Name;
use apollo_compiler::Node;
use apollo_compiler::schema::DirectiveDefinition;
use apollo_compiler::schema::ExtendedType;
use itertools::Itertools;

use crate::error::SchemaError;
use crate::link::CoreFeature;
use crate::link::LinkError;
use crate::link::spec::Identity;
use crate::link::spec::Url;
use crate::link::spec::Version;
use crate::schema::CoreSchema;

/// A known version of a feature specification, able to resolve the in-schema
/// names of its elements through a schema's feature metadata.
pub trait SpecDefinition {
    fn url(&self) -> &Url;

    fn identity(&self) -> &Identity {
        &self.url().identity
    }

    fn version(&self) -> &Version {
        &self.url().version
    }

    fn is_spec_directive_name(
        &self,
        schema: &CoreSchema,
        name_in_schema: &Name,
    ) -> Result<bool, SchemaError> {
        let Some(features) = schema.features() else {
            return Err(SchemaError::internal(
                "Schema is not a core schema (add @link first)",
            ));
        };
        Ok(features
            .source_feature_of_directive(name_in_schema)
            .map(|e| e.feature.url.identity == *self.identity())
            .unwrap_or(false))
    }

    fn is_spec_type_name(
        &self,
        schema: &CoreSchema,
        name_in_schema: &Name,
    ) -> Result<bool, SchemaError> {
        let Some(features) = schema.features() else {
            return Err(SchemaError::internal(
                "Schema is not a core schema (add @link first)",
            ));
        };
        Ok(features
            .source_feature_of_type(name_in_schema)
            .map(|e| e.feature.url.identity == *self.identity())
            .unwrap_or(false))
    }

    fn directive_name_in_schema(
        &self,
        schema: &CoreSchema,
        name_in_spec: &Name,
    ) -> Result<Option<Name>, SchemaError> {
        let Some(feature) = self.feature_in_schema(schema)? else {
            return Ok(None);
        };
        Ok(Some(feature.directive_name_in_schema(name_in_spec)))
    }

    fn type_name_in_schema(
        &self,
        schema: &CoreSchema,
        name_in_spec: &Name,
    ) -> Result<Option<Name>, SchemaError> {
        let Some(feature) = self.feature_in_schema(schema)? else {
            return Ok(None);
        };
        Ok(Some(feature.type_name_in_schema(name_in_spec)))
    }

    fn directive_definition<'schema>(
        &self,
        schema: &'schema CoreSchema,
        name_in_spec: &Name,
    ) -> Result<Option<&'schema Node<DirectiveDefinition>>, SchemaError> {
        match self.directive_name_in_schema(schema, name_in_spec)? {
            Some(name) => schema
                .schema()
                .directive_definitions
                .get(&name)
                .ok_or_else(|| {
                    SchemaError::internal(format!(
                        "Unexpectedly could not find spec directive \"@{}\" in schema",
                        name
                    ))
                })
                .map(Some),
            None => Ok(None),
        }
    }

    fn type_definition<'schema>(
        &self,
        schema: &'schema CoreSchema,
        name_in_spec: &Name,
    ) -> Result<Option<&'schema ExtendedType>, SchemaError> {
        match self.type_name_in_schema(schema, name_in_spec)? {
            Some(name) => schema
                .schema()
                .types
                .get(&name)
                .ok_or_else(|| {
                    SchemaError::internal(format!(
                        "Unexpectedly could not find spec type \"{}\" in schema",
                        name
                    ))
                })
                .map(Some),
            None => Ok(None),
        }
    }

    fn feature_in_schema(
        &self,
        schema: &CoreSchema,
    ) -> Result<Option<Arc<CoreFeature>>, SchemaError> {
        let Some(features) = schema.features() else {
            return Err(SchemaError::internal(
                "Schema is not a core schema (add @link first)",
            ));
        };
        Ok(features.for_identity(self.identity()))
    }

    fn to_string(&self) -> String {
        self.url().to_string()
    }
}

/// Registry of the supported versions of one specification.
#[derive(Clone)]
pub(crate) struct SpecDefinitions<T: SpecDefinition> {
    identity: Identity,
    definitions: BTreeMap<Version, T>,
}

impl<T: SpecDefinition> SpecDefinitions<T> {
    pub(crate) fn new(identity: Identity) -> Self {
        Self {
            identity,
            definitions: BTreeMap::new(),
        }
    }

    pub(crate) fn add(&mut self, definition: T) {
        assert_eq!(
            *definition.identity(),
            self.identity,
            "Cannot add definition for {} to the versions of definitions for {}",
            definition.to_string(),
            self.identity
        );
        if self.definitions.contains_key(definition.version()) {
            return;
        }
        self.definitions
            .insert(definition.version().clone(), definition);
    }

    pub(crate) fn find(&self, requested: &Version) -> Option<&T> {
        self.definitions.get(requested)
    }

    /// Like `find`, but an unsupported version is an error naming the versions
    /// that do exist.
    pub(crate) fn get(&self, requested: &Version) -> Result<&T, LinkError> {
        self.find(requested).ok_or_else(|| {
            LinkError::BootstrapError(format!(
                "schema uses unknown version v{} of the {} specification (known versions: {})",
                requested,
                self.identity,
                self.versions().map(|v| format!("v{v}")).join(", "),
            ))
        })
    }

    pub(crate) fn versions(&self) -> Keys<'_, Version, T> {
        self.definitions.keys()
    }
}
