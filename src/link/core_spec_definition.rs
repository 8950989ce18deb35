use std::sync::LazyLock;

use crate::link::spec::Identity;
use crate::link::spec::Url;
use crate::link::spec::Version;
use crate::link::spec_definition::SpecDefinition;
use crate::link::spec_definition::SpecDefinitions;

/// A version of the core specification itself, i.e. of the `@core` or `@link`
/// directive that marks a schema as a core schema.
pub(crate) struct CoreSpecDefinition {
    url: Url,
}

impl CoreSpecDefinition {
    pub(crate) fn new(identity: Identity, version: Version) -> Self {
        Self {
            url: Url { identity, version },
        }
    }

    /// The argument carrying the feature url: `feature:` for `@core`,
    /// `url:` for `@link`.
    pub(crate) fn url_arg_name(&self) -> &'static str {
        if self.url.identity == Identity::core_identity() {
            "feature"
        } else {
            "url"
        }
    }

    /// Whether this version understands the `for:` purpose argument.
    pub(crate) fn supports_purpose(&self) -> bool {
        self.url.identity != Identity::core_identity()
            || self.url.version.satisfies(&Version { major: 0, minor: 2 })
    }

    /// Only `@link` has an import mechanism.
    pub(crate) fn supports_imports(&self) -> bool {
        self.url.identity == Identity::link_identity()
    }
}

impl SpecDefinition for CoreSpecDefinition {
    fn url(&self) -> &Url {
        &self.url
    }
}

pub(crate) static CORE_VERSIONS: LazyLock<SpecDefinitions<CoreSpecDefinition>> =
    LazyLock::new(|| {
        let mut definitions = SpecDefinitions::new(Identity::core_identity());
        definitions.add(CoreSpecDefinition::new(
            Identity::core_identity(),
            Version { major: 0, minor: 1 },
        ));
        definitions.add(CoreSpecDefinition::new(
            Identity::core_identity(),
            Version { major: 0, minor: 2 },
        ));
        definitions
    });

pub(crate) static LINK_VERSIONS: LazyLock<SpecDefinitions<CoreSpecDefinition>> =
    LazyLock::new(|| {
        let mut definitions = SpecDefinitions::new(Identity::link_identity());
        definitions.add(CoreSpecDefinition::new(
            Identity::link_identity(),
            Version { major: 1, minor: 0 },
        ));
        definitions
    });
