//! Identities, versions and urls of core feature specifications.
use std::fmt;
use std::str;

use apollo_compiler::Name;
use apollo_compiler::name;
use thiserror::Error;

use crate::error::SchemaError;

pub const APOLLO_SPEC_DOMAIN: &str = "https://specs.apollo.dev";

#[derive(Error, Debug, PartialEq)]
pub enum SpecError {
    #[error("Parse error: {0}")]
    ParseError(String),
}

impl From<SpecError> for SchemaError {
    fn from(value: SpecError) -> Self {
        SchemaError::FeatureError {
            message: value.to_string(),
        }
    }
}

/// Uniquely identifies a feature specification, irrespective of its version.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub struct Identity {
    /// The "domain" the specification belongs to, e.g. `"https://specs.apollo.dev"`.
    pub domain: String,

    /// The name of the specification, e.g. "core".
    pub name: Name,
}

impl fmt::Display for Identity {
    /// Display a specification identity.
    ///
    ///     # use core_schema::link::spec::Identity;
    ///     use apollo_compiler::name;
    ///     assert_eq!(
    ///         Identity { domain: "https://specs.apollo.dev".to_string(), name: name!("core") }.to_string(),
    ///         "https://specs.apollo.dev/core"
    ///     )
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}/{}", self.domain, self.name)
    }
}

impl Identity {
    pub fn core_identity() -> Identity {
        Identity {
            domain: APOLLO_SPEC_DOMAIN.to_string(),
            name: name!("core"),
        }
    }

    pub fn link_identity() -> Identity {
        Identity {
            domain: APOLLO_SPEC_DOMAIN.to_string(),
            name: name!("link"),
        }
    }

    pub fn inaccessible_identity() -> Identity {
        Identity {
            domain: APOLLO_SPEC_DOMAIN.to_string(),
            name: name!("inaccessible"),
        }
    }
}

/// The version of a feature specification, as major and minor version numbers.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Debug)]
pub struct Version {
    pub major: u32,
    pub minor: u32,
}

impl fmt::Display for Version {
    /// Display a specification version number.
    ///
    ///     # use core_schema::link::spec::Version;
    ///     assert_eq!(Version { major: 0, minor: 2 }.to_string(), "0.2")
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}

impl str::FromStr for Version {
    type Err = SpecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (major, minor) = s.split_once('.').ok_or(SpecError::ParseError(
            "version number is missing a dot (.)".to_string(),
        ))?;

        let major = major.parse::<u32>().map_err(|_| {
            SpecError::ParseError(format!("invalid major version number '{}'", major))
        })?;
        let minor = minor.parse::<u32>().map_err(|_| {
            SpecError::ParseError(format!("invalid minor version number '{}'", minor))
        })?;

        Ok(Version { major, minor })
    }
}

impl Version {
    /// Whether this version satisfies the provided `required` version.
    ///
    /// Majors of zero are experimental and only satisfy themselves; otherwise the
    /// major must match exactly and the minor must be at least the required one.
    ///
    ///     # use core_schema::link::spec::Version;
    ///     assert!(&Version { major: 1, minor: 2 }.satisfies(&Version{ major: 1, minor: 0 }));
    ///     assert!(!(&Version { major: 0, minor: 2 }.satisfies(&Version{ major: 0, minor: 1 })));
    pub fn satisfies(&self, required: &Version) -> bool {
        if self.major == 0 {
            self == required
        } else {
            self.major == required.major && self.minor >= required.minor
        }
    }
}

/// A versioned reference to a feature specification.
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Url {
    /// The identity of the specification pointed to by this url.
    pub identity: Identity,

    /// The version of the specification pointed to by this url.
    pub version: Version,
}

impl fmt::Display for Url {
    /// Display a specification url.
    ///
    ///     # use core_schema::link::spec::*;
    ///     use apollo_compiler::name;
    ///     assert_eq!(
    ///         Url {
    ///           identity: Identity { domain: "https://specs.apollo.dev".to_string(), name: name!("core") },
    ///           version: Version { major: 0, minor: 2 }
    ///         }.to_string(),
    ///         "https://specs.apollo.dev/core/v0.2"
    ///     )
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}/v{}", self.identity, self.version)
    }
}

impl str::FromStr for Url {
    type Err = SpecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match url::Url::parse(s) {
            Ok(url) => {
                if url.query().is_some() || url.fragment().is_some() {
                    return Err(SpecError::ParseError(
                        "invalid specification url: query strings and fragments are not allowed"
                            .to_string(),
                    ));
                }
                let mut segments = url.path_segments().ok_or(SpecError::ParseError(
                    "invalid specification url".to_string(),
                ))?;
                let version = segments.next_back().ok_or(SpecError::ParseError(
                    "invalid specification url: missing specification version".to_string(),
                ))?;
                let version = version
                    .strip_prefix('v')
                    .ok_or(SpecError::ParseError("invalid specification url: the last element of the path should be the version starting with a 'v'".to_string()))?
                    .parse::<Version>()?;
                let name = segments
                    .next_back()
                    .ok_or(SpecError::ParseError(
                        "invalid specification url: missing specification name".to_string(),
                    ))
                    // Spec names are not required to be valid GraphQL names (dashes occur in
                    // the wild). A feature with such a name can only be used through explicit
                    // imports, since its prefixed names would not parse.
                    .map(Name::new_unchecked)?;
                let scheme = url.scheme();
                if !scheme.starts_with("http") {
                    return Err(SpecError::ParseError("invalid specification url: only http(s) urls are supported currently".to_string()));
                }
                let url_domain = url.domain().ok_or(SpecError::ParseError(
                    "invalid specification url".to_string(),
                ))?;
                let path_remainder = segments.collect::<Vec<&str>>();
                let domain = if path_remainder.is_empty() {
                    format!("{}://{}", scheme, url_domain)
                } else {
                    format!("{}://{}/{}", scheme, url_domain, path_remainder.join("/"))
                };
                Ok(Url {
                    identity: Identity { domain, name },
                    version,
                })
            }
            Err(e) => Err(SpecError::ParseError(format!(
                "invalid specification url: {}",
                e
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use apollo_compiler::name;

    use super::*;

    #[test]
    fn versions_compare_correctly() {
        assert!(Version { major: 0, minor: 0 } < Version { major: 0, minor: 1 });
        assert!(Version { major: 0, minor: 1 } < Version { major: 0, minor: 2 });
        assert!(Version { major: 0, minor: 2 } < Version { major: 1, minor: 0 });

        assert_eq!(
            Version { major: 0, minor: 2 },
            Version { major: 0, minor: 2 }
        );
    }

    #[test]
    fn valid_versions_can_be_parsed() {
        assert_eq!(
            "0.1".parse::<Version>().unwrap(),
            Version { major: 0, minor: 1 }
        );
        assert_eq!(
            "1.0".parse::<Version>().unwrap(),
            Version { major: 1, minor: 0 }
        );
        assert_eq!(
            "2.49".parse::<Version>().unwrap(),
            Version {
                major: 2,
                minor: 49
            }
        );
    }

    #[test]
    fn invalid_version_strings_return_meaningful_errors() {
        assert_eq!(
            "foo".parse::<Version>(),
            Err(SpecError::ParseError(
                "version number is missing a dot (.)".to_string()
            ))
        );
        assert_eq!(
            "foo.bar".parse::<Version>(),
            Err(SpecError::ParseError(
                "invalid major version number 'foo'".to_string()
            ))
        );
        assert_eq!(
            "0.bar".parse::<Version>(),
            Err(SpecError::ParseError(
                "invalid minor version number 'bar'".to_string()
            ))
        );
        assert_eq!(
            "0.12.2".parse::<Version>(),
            Err(SpecError::ParseError(
                "invalid minor version number '12.2'".to_string()
            ))
        );
    }

    #[test]
    fn valid_urls_can_be_parsed() {
        assert_eq!(
            "https://specs.apollo.dev/core/v0.2".parse::<Url>().unwrap(),
            Url {
                identity: Identity {
                    domain: "https://specs.apollo.dev".to_string(),
                    name: name!("core")
                },
                version: Version { major: 0, minor: 2 }
            }
        );

        assert_eq!(
            "http://something.com/more/path/my_spec_name/v0.1"
                .parse::<Url>()
                .unwrap(),
            Url {
                identity: Identity {
                    domain: "http://something.com/more/path".to_string(),
                    name: name!("my_spec_name")
                },
                version: Version { major: 0, minor: 1 }
            }
        );
    }

    #[test]
    fn urls_without_a_version_segment_are_rejected() {
        assert!("https://specs.apollo.dev/core".parse::<Url>().is_err());
        assert!("ftp://specs.apollo.dev/core/v0.2".parse::<Url>().is_err());
    }

    #[test]
    fn urls_with_queries_or_fragments_are_rejected() {
        assert!(
            "https://specs.apollo.dev/core/v0.2?k=2"
                .parse::<Url>()
                .is_err()
        );
        assert!(
            "https://specs.apollo.dev/core/v0.2#section"
                .parse::<Url>()
                .is_err()
        );
    }
}
