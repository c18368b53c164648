//! Version requirement translation.

use crate::error::{Error, Result};
use crate::raw::RawVersionRequirement;
use semver::Version;
use xcgraph_graph::VersionRequirement;

/// Parse a version, completing `5` or `5.0` to `5.0.0`.
fn parse_version(version: &str) -> Result<Version> {
    Version::parse(&complete_components(version.trim())).map_err(|source| Error::InvalidVersion {
        version: version.to_string(),
        source,
    })
}

fn complete_components(version: &str) -> String {
    let core_end = version.find(['-', '+']).unwrap_or(version.len());
    let (core, suffix) = version.split_at(core_end);
    match core.split('.').count() {
        1 => format!("{core}.0.0{suffix}"),
        2 => format!("{core}.0{suffix}"),
        _ => version.to_string(),
    }
}

/// Translate a raw requirement. A missing requirement means
/// [`VersionRequirement::unspecified`].
///
/// # Errors
///
/// Returns [`Error::InvalidVersion`] when a version is not valid semver
/// even after completing missing minor and patch components.
pub fn map_requirement(raw: Option<&RawVersionRequirement>) -> Result<VersionRequirement> {
    let Some(raw) = raw else {
        return Ok(VersionRequirement::unspecified());
    };

    let requirement = match raw {
        RawVersionRequirement::UpToNextMajorVersion { minimum_version } => {
            VersionRequirement::UpToNextMajor {
                version: parse_version(minimum_version)?,
            }
        }
        RawVersionRequirement::UpToNextMinorVersion { minimum_version } => {
            VersionRequirement::UpToNextMinor {
                version: parse_version(minimum_version)?,
            }
        }
        RawVersionRequirement::ExactVersion { version } => VersionRequirement::Exact {
            version: parse_version(version)?,
        },
        RawVersionRequirement::VersionRange {
            minimum_version,
            maximum_version,
        } => VersionRequirement::Range {
            lower: parse_version(minimum_version)?,
            upper: parse_version(maximum_version)?,
        },
        RawVersionRequirement::Branch { branch } => VersionRequirement::Branch {
            name: branch.clone(),
        },
        RawVersionRequirement::Revision { revision } => VersionRequirement::Revision {
            hash: revision.clone(),
        },
    };
    Ok(requirement)
}

impl From<&VersionRequirement> for RawVersionRequirement {
    fn from(requirement: &VersionRequirement) -> Self {
        match requirement {
            VersionRequirement::UpToNextMajor { version } => Self::UpToNextMajorVersion {
                minimum_version: version.to_string(),
            },
            VersionRequirement::UpToNextMinor { version } => Self::UpToNextMinorVersion {
                minimum_version: version.to_string(),
            },
            VersionRequirement::Exact { version } => Self::ExactVersion {
                version: version.to_string(),
            },
            VersionRequirement::Range { lower, upper } => Self::VersionRange {
                minimum_version: lower.to_string(),
                maximum_version: upper.to_string(),
            },
            VersionRequirement::Branch { name } => Self::Branch {
                branch: name.clone(),
            },
            VersionRequirement::Revision { hash } => Self::Revision {
                revision: hash.clone(),
            },
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn version(text: &str) -> Version {
        Version::parse(text).unwrap()
    }

    #[test]
    fn test_every_kind_round_trips() {
        let requirements = [
            VersionRequirement::UpToNextMajor {
                version: version("1.0.0"),
            },
            VersionRequirement::UpToNextMinor {
                version: version("2.3.0"),
            },
            VersionRequirement::Exact {
                version: version("0.9.1"),
            },
            VersionRequirement::Range {
                lower: version("1.2.0"),
                upper: version("1.6.0"),
            },
            VersionRequirement::Branch {
                name: "main".to_string(),
            },
            VersionRequirement::Revision {
                hash: "4f1c2a9".to_string(),
            },
        ];

        for requirement in requirements {
            let raw = RawVersionRequirement::from(&requirement);
            assert_eq!(map_requirement(Some(&raw)).unwrap(), requirement);
        }
    }

    #[test]
    fn test_missing_requirement_is_up_to_next_major_from_zero() {
        assert_eq!(
            map_requirement(None).unwrap(),
            VersionRequirement::UpToNextMajor {
                version: version("0.0.0")
            }
        );
    }

    #[test]
    fn test_short_versions_are_completed() {
        let raw = RawVersionRequirement::UpToNextMajorVersion {
            minimum_version: "5.0".to_string(),
        };
        assert_eq!(
            map_requirement(Some(&raw)).unwrap(),
            VersionRequirement::UpToNextMajor {
                version: version("5.0.0")
            }
        );

        let raw = RawVersionRequirement::VersionRange {
            minimum_version: "2".to_string(),
            maximum_version: "3.1-beta.1".to_string(),
        };
        assert_eq!(
            map_requirement(Some(&raw)).unwrap(),
            VersionRequirement::Range {
                lower: version("2.0.0"),
                upper: version("3.1.0-beta.1"),
            }
        );
    }

    #[test]
    fn test_invalid_version() {
        let raw = RawVersionRequirement::ExactVersion {
            version: "latest".to_string(),
        };
        assert!(matches!(
            map_requirement(Some(&raw)).unwrap_err(),
            Error::InvalidVersion { ref version, .. } if version == "latest"
        ));
    }
}
