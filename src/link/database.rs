use std::collections::HashMap;
use std::sync::Arc;

use apollo_compiler::Schema;
use apollo_compiler::ast::Directive;
use apollo_compiler::ast::DirectiveLocation;
use apollo_compiler::ast::Type;

use crate::link::CoreFeature;
use crate::link::CoreFeatures;
use crate::link::LinkError;
use crate::link::core_spec_definition::CORE_VERSIONS;
use crate::link::core_spec_definition::LINK_VERSIONS;
use crate::link::spec::Identity;
use crate::link::spec::Url;
use crate::link::spec_definition::SpecDefinition;

/// Extracts the core feature metadata of a schema, if any.
///
/// A schema is a core schema when its schema definition carries a
/// `@core`/`@link` application that describes the core specification itself.
/// Returns `Ok(None)` for schemas that are not core schemas, and errors only
/// for schemas that are unambiguously trying (and failing) to be one.
pub fn core_features(schema: &Schema) -> Result<Option<CoreFeatures>, LinkError> {
    let mut bootstrap_directives = Vec::new();
    for directive in schema.schema_definition.directives.iter() {
        if is_bootstrap_directive(schema, directive)? {
            bootstrap_directives.push(directive);
        }
    }
    let Some(bootstrap_directive) = bootstrap_directives.first().copied() else {
        return Ok(None);
    };
    // A second self-describing application is invalid, whatever name it goes by.
    if bootstrap_directives.len() > 1 {
        return Err(LinkError::BootstrapError(format!(
            "the core specification itself (\"{}\") is applied multiple times",
            Identity::link_identity()
        )));
    }
    // This schema uses "our" @core/@link. Now validate every application of
    // that directive and extract its metadata.
    let feature_name_in_schema = &bootstrap_directive.name;
    let mut features = Vec::new();
    let mut by_identity = HashMap::new();
    let mut by_name_in_schema = HashMap::new();
    let mut types_by_imported_name = HashMap::new();
    let mut directives_by_imported_name = HashMap::new();
    let applications = schema
        .schema_definition
        .directives
        .iter()
        .filter(|d| d.name == *feature_name_in_schema);
    for application in applications {
        let feature = Arc::new(CoreFeature::from_directive_application(application)?);
        features.push(Arc::clone(&feature));
        if by_identity
            .insert(feature.url.identity.clone(), Arc::clone(&feature))
            .is_some()
        {
            return Err(LinkError::BootstrapError(format!(
                "duplicate inclusion of feature \"{}\"",
                feature.url.identity
            )));
        }
        let name_in_schema = feature.spec_name_in_schema();
        if let Some(other) = by_name_in_schema.insert(name_in_schema.clone(), Arc::clone(&feature))
        {
            return Err(LinkError::BootstrapError(format!(
                "name conflict: {} and {} are imported under the same name (consider using the `@link(as:)` argument to disambiguate)",
                other.url, feature.url,
            )));
        }
    }

    // Imports are collected in a second pass so that conflicts with the
    // in-schema names of other features can be detected.
    for feature in &features {
        for import in &feature.imports {
            let imported_name = import.imported_name();
            let element_map = if import.is_directive {
                // The in-schema name of each feature acts as an implicit import
                // for a directive of the same name, so a directive import must
                // not collide with it.
                if let Some(other) = by_name_in_schema.get(imported_name) {
                    if !Arc::ptr_eq(other, feature) {
                        return Err(LinkError::BootstrapError(format!(
                            "import for '{}' of {} conflicts with spec {}",
                            import.imported_display_name(),
                            feature.url,
                            other.url
                        )));
                    }
                }
                &mut directives_by_imported_name
            } else {
                &mut types_by_imported_name
            };
            if let Some((other_feature, _)) = element_map.insert(
                imported_name.clone(),
                (Arc::clone(feature), Arc::clone(import)),
            ) {
                return Err(LinkError::BootstrapError(format!(
                    "name conflict: both {} and {} import {}",
                    feature.url,
                    other_feature.url,
                    import.imported_display_name()
                )));
            }
        }
    }

    let core_features = CoreFeatures {
        features,
        by_identity,
        by_name_in_schema,
        types_by_imported_name,
        directives_by_imported_name,
    };

    // Arguments the declared version of the core specification predates must
    // not be used anywhere in the schema.
    let core_spec = core_features.core_spec_definition()?;
    if !core_spec.supports_purpose() {
        if let Some(feature) = core_features
            .features
            .iter()
            .find(|feature| feature.purpose.is_some())
        {
            return Err(LinkError::BootstrapError(format!(
                "the `for:` argument on feature \"{}\" is not supported by {}",
                feature.url,
                core_spec.to_string(),
            )));
        }
    }
    if !core_spec.supports_imports()
        && bootstrap_directive
            .specified_argument_by_name("import")
            .is_some()
    {
        return Err(LinkError::BootstrapError(format!(
            "the `import:` argument is not supported by {}",
            core_spec.to_string(),
        )));
    }

    Ok(Some(core_features))
}

/// Whether this directive application marks the schema as a core schema, i.e.
/// whether it is a `@core`/`@link` application whose url names the core
/// specification itself. Fails if such an application names a version of the
/// core specification that is unknown.
fn is_bootstrap_directive(schema: &Schema, directive: &Directive) -> Result<bool, LinkError> {
    let Some(definition) = schema.directive_definitions.get(&directive.name) else {
        return Ok(false);
    };
    let locations = &definition.locations;
    let is_correct_def =
        definition.repeatable && locations.len() == 1 && locations[0] == DirectiveLocation::Schema;
    if !is_correct_def {
        return Ok(false);
    }
    for url_arg in ["url", "feature"] {
        // The "true" type of the url argument is `String` (nullable), for
        // future-proofing reasons, but a non-null variant is tolerated both for
        // convenience and because early implementations generated one.
        let has_url_arg = definition.arguments.iter().any(|arg| {
            arg.name == url_arg
                && matches!(&*arg.ty, Type::Named(name) | Type::NonNullNamed(name) if name == "String")
        });
        if !has_url_arg {
            continue;
        }
        let Some(url) = directive
            .specified_argument_by_name(url_arg)
            .and_then(|value| value.as_str())
        else {
            continue;
        };
        let Ok(url) = url.parse::<Url>() else {
            continue;
        };
        let versions = if url.identity == Identity::link_identity() {
            &LINK_VERSIONS
        } else if url.identity == Identity::core_identity() {
            &CORE_VERSIONS
        } else {
            continue;
        };
        let expected_name = directive
            .specified_argument_by_name("as")
            .and_then(|value| value.as_str())
            .unwrap_or(url.identity.name.as_str());
        if directive.name != expected_name {
            continue;
        }
        let spec = versions.get(&url.version)?;
        if spec.url_arg_name() != url_arg {
            continue;
        }
        return Ok(true);
    }
    Ok(false)
}

#[cfg(test)]
mod tests {
    use apollo_compiler::name;

    use super::*;
    use crate::link::CoreImport;
    use crate::link::Purpose;
    use crate::link::spec::APOLLO_SPEC_DOMAIN;
    use crate::link::spec::Version;

    #[test]
    fn explicit_root_directive_import() -> Result<(), LinkError> {
        let schema = r#"
          extend schema
            @link(url: "https://specs.apollo.dev/link/v1.0", import: ["Import"])
            @link(url: "https://specs.apollo.dev/inaccessible/v0.2", import: ["@inaccessible"])

          type Query { x: Int }

          enum link__Purpose {
            SECURITY
            EXECUTION
          }

          scalar Import

          directive @link(url: String, as: String, import: [Import], for: link__Purpose) repeatable on SCHEMA
        "#;

        let schema = Schema::parse(schema, "root_directive.graphqls").unwrap();

        let features = core_features(&schema)?;
        let features = features.expect("should have metadata");

        assert!(
            features
                .source_feature_of_directive(&name!("inaccessible"))
                .is_some()
        );

        Ok(())
    }

    #[test]
    fn recognizes_the_older_core_directive() -> Result<(), LinkError> {
        let schema = r#"
          schema
            @core(feature: "https://specs.apollo.dev/core/v0.2")
            @core(feature: "https://example.com/someSpec/v1.0", as: "mySpec")
          {
            query: Query
          }

          type Query { x: Int }

          enum core__Purpose {
            SECURITY
            EXECUTION
          }

          directive @core(feature: String!, as: String, for: core__Purpose) repeatable on SCHEMA
        "#;

        let schema = Schema::parse(schema, "core.graphqls").unwrap();

        let features = core_features(&schema)?.expect("should have metadata");
        assert_eq!(features.all_features().len(), 2);
        assert!(features.for_identity(&Identity::core_identity()).is_some());
        assert!(
            features
                .source_feature_of_directive(&name!("mySpec"))
                .is_some()
        );
        assert!(
            features
                .source_feature_of_type(&name!("mySpec__SomeType"))
                .is_some()
        );

        Ok(())
    }

    #[test]
    fn schemas_without_a_bootstrap_directive_are_not_core_schemas() -> Result<(), LinkError> {
        let schema = r#"
          type Query { x: Int }

          directive @link(url: String, as: String, for: link__Purpose) repeatable on SCHEMA

          enum link__Purpose { SECURITY EXECUTION }
        "#;

        let schema = Schema::parse(schema, "plain.graphqls").unwrap();
        assert!(core_features(&schema)?.is_none());
        Ok(())
    }

    #[test]
    fn unknown_version_of_the_core_specification_errors() {
        let schema = r#"
          extend schema
            @link(url: "https://specs.apollo.dev/link/v99.0")

          type Query { x: Int }

          enum link__Purpose { SECURITY EXECUTION }

          directive @link(url: String, as: String, for: link__Purpose) repeatable on SCHEMA
        "#;

        let schema = Schema::parse(schema, "unknown_version.graphqls").unwrap();
        let error = core_features(&schema).expect_err("v99.0 is not a known link version");
        let message = error.to_string();
        assert!(message.contains("unknown version v99.0"), "{message}");
        assert!(message.contains("known versions"), "{message}");
    }

    #[test]
    fn the_purpose_argument_requires_core_v0_2() {
        let schema = r#"
          schema
            @core(feature: "https://specs.apollo.dev/core/v0.1")
            @core(feature: "https://megacorp.com/auth/v1.0", for: SECURITY)
          {
            query: Query
          }

          type Query { x: Int }

          enum core__Purpose { SECURITY EXECUTION }

          directive @core(feature: String!, as: String, for: core__Purpose) repeatable on SCHEMA
        "#;

        let schema = Schema::parse(schema, "old_core.graphqls").unwrap();
        let error = core_features(&schema).expect_err("@core v0.1 predates the `for:` argument");
        assert!(error.to_string().contains("`for:`"), "{error}");
    }

    #[test]
    fn computes_feature_metadata() {
        let schema = r#"
          extend schema
            @link(url: "https://specs.apollo.dev/link/v1.0", import: ["Import"])
            @link(url: "https://specs.apollo.dev/inaccessible/v0.2", import: ["@inaccessible", { name: "@tag", as: "@myTag" }])
            @link(url: "https://custom.com/someSpec/v0.2", as: "mySpec")
            @link(url: "https://megacorp.com/auth/v1.0", for: SECURITY)

          type Query {
            x: Int
          }

          enum link__Purpose {
            SECURITY
            EXECUTION
          }

          scalar Import

          directive @link(url: String, as: String, import: [Import], for: link__Purpose) repeatable on SCHEMA
        "#;

        let schema = Schema::parse(schema, "testSchema").unwrap();

        let features = core_features(&schema).unwrap().unwrap();
        let names_in_schema = features
            .all_features()
            .iter()
            .map(|l| l.spec_name_in_schema())
            .collect::<Vec<_>>();
        assert_eq!(names_in_schema.len(), 4);
        assert_eq!(names_in_schema[0], "link");
        assert_eq!(names_in_schema[1], "inaccessible");
        assert_eq!(names_in_schema[2], "mySpec");
        assert_eq!(names_in_schema[3], "auth");

        let link_spec = features.for_identity(&Identity::link_identity()).unwrap();
        assert_eq!(
            link_spec.imports.first().unwrap().as_ref(),
            &CoreImport {
                element: name!("Import"),
                is_directive: false,
                alias: None
            }
        );

        let inaccessible_spec = features
            .for_identity(&Identity {
                domain: APOLLO_SPEC_DOMAIN.to_string(),
                name: name!("inaccessible"),
            })
            .unwrap();
        assert_eq!(
            inaccessible_spec.url.version,
            Version { major: 0, minor: 2 }
        );
        assert_eq!(inaccessible_spec.purpose, None);

        let imports = &inaccessible_spec.imports;
        assert_eq!(imports.len(), 2);
        assert_eq!(
            imports.get(1).unwrap().as_ref(),
            &CoreImport {
                element: name!("tag"),
                is_directive: true,
                alias: Some(name!("myTag"))
            }
        );

        let auth_spec = features
            .for_identity(&Identity {
                domain: "https://megacorp.com".to_string(),
                name: name!("auth"),
            })
            .unwrap();
        assert_eq!(auth_spec.purpose, Some(Purpose::SECURITY));

        let import_source = features.source_feature_of_type(&name!("Import")).unwrap();
        assert_eq!(import_source.feature.url.identity.name, "link");
        assert!(!import_source.import.as_ref().unwrap().is_directive);

        // Purpose is not imported, so it is only reachable in prefixed form.
        assert!(features.source_feature_of_type(&name!("Purpose")).is_none());

        let purpose_source = features
            .source_feature_of_type(&name!("link__Purpose"))
            .unwrap();
        assert_eq!(purpose_source.feature.url.identity.name, "link");
        assert_eq!(purpose_source.import, None);

        // tag is imported under an alias, so "tag" itself should not match.
        assert!(
            features
                .source_feature_of_directive(&name!("tag"))
                .is_none()
        );

        let tag_source = features
            .source_feature_of_directive(&name!("myTag"))
            .unwrap();
        assert_eq!(tag_source.feature.url.identity.name, "inaccessible");
        assert_eq!(tag_source.import.as_ref().unwrap().element, "tag");
        assert!(tag_source.import.as_ref().unwrap().is_directive);
    }

    #[test]
    fn errors_on_duplicate_feature_identities() {
        let schema = r#"
            extend schema
              @link(url: "https://specs.apollo.dev/link/v1.0")
              @link(url: "https://example.com/someSpec/v1.0")
              @link(url: "https://example.com/someSpec/v1.1", as: "otherName")

            type Query { q: Int }

            directive @link(url: String, as: String, import: [Import], for: link__Purpose) repeatable on SCHEMA
        "#;

        let schema = Schema::parse(schema, "testSchema").unwrap();
        let errors = core_features(&schema).expect_err("should error");
        insta::assert_snapshot!(errors, @r###"Invalid use of @core/@link in schema: duplicate inclusion of feature "https://example.com/someSpec""###);
    }

    mod link_import {
        use super::*;

        #[test]
        fn errors_on_malformed_values() {
            let schema = r#"
                extend schema @link(url: "https://specs.apollo.dev/link/v1.0")
                extend schema @link(
                  url: "https://specs.apollo.dev/inaccessible/v0.2",
                  import: [
                    2,
                    { foo: "bar" },
                    { name: "@inaccessible", badName: "foo"},
                    { name: 42 },
                    { as: "bar" },
                   ]
                )

                type Query {
                  q: Int
                }

                directive @link(url: String, as: String, import: [Import], for: link__Purpose) repeatable on SCHEMA
            "#;

            let schema = Schema::parse(schema, "testSchema").unwrap();
            let errors = core_features(&schema).expect_err("should error");
            insta::assert_snapshot!(errors, @r###"Invalid use of @core/@link in schema: invalid sub-value for @link(import:) argument: values should be either strings or input object values of the form { name: "<importedElement>", as: "<alias>" }."###);
        }

        #[test]
        fn errors_on_mismatch_between_name_and_alias() {
            let schema = r#"
                extend schema @link(url: "https://specs.apollo.dev/link/v1.0")
                extend schema @link(
                  url: "https://specs.apollo.dev/inaccessible/v0.2",
                  import: [
                    { name: "@inaccessible", as: "myInaccessible" },
                    { name: "SomeType", as: "@someType" },
                  ]
                )

                type Query {
                  q: Int
                }

                directive @link(url: String, as: String, import: [Import], for: link__Purpose) repeatable on SCHEMA
            "#;

            let schema = Schema::parse(schema, "testSchema").unwrap();
            let errors = core_features(&schema).expect_err("should error");
            insta::assert_snapshot!(errors, @"Invalid use of @core/@link in schema: invalid alias 'myInaccessible' for import name '@inaccessible': should start with '@' since the imported name does");
        }
    }
}
