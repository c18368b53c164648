//! Graph node identity and edge conditions.

use crate::paths;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::path::{Path, PathBuf};

/// Canonical identity of a node in the dependency graph.
///
/// Two references that denote the same artifact must produce equal values;
/// equality is the only deduplication mechanism the graph applies. Paths are
/// normalized on construction and compared byte for byte. The derived
/// ordering is total and gives the graph its deterministic iteration order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum GraphDependency {
    /// A build target inside a specific project.
    Target {
        /// Target name, unique within its project.
        name: String,
        /// Absolute path of the owning project.
        project: PathBuf,
    },
    /// A product exposed by a locally resolved package.
    PackageProduct {
        /// Product name.
        product: String,
        /// Absolute root path of the package.
        package: PathBuf,
    },
    /// A package product that could not be resolved to a local package.
    ExternalProduct {
        /// Product name.
        product: String,
    },
    /// A precompiled `.framework`.
    Framework {
        /// Absolute path of the framework bundle.
        path: PathBuf,
    },
    /// A precompiled `.xcframework`.
    XcFramework {
        /// Absolute path of the xcframework bundle.
        path: PathBuf,
    },
    /// A precompiled static or dynamic library.
    Library {
        /// Absolute path of the library binary.
        path: PathBuf,
    },
    /// A system framework or library referenced by name.
    Sdk {
        /// SDK name, e.g. `UIKit.framework` or `libz.tbd`.
        name: String,
    },
    /// The platform's test-support pseudo-dependency.
    XcTest,
}

impl GraphDependency {
    /// A target node; the project path is normalized.
    pub fn target(name: impl Into<String>, project: impl AsRef<Path>) -> Self {
        Self::Target {
            name: name.into(),
            project: paths::normalize(project.as_ref()),
        }
    }

    /// A package product node; the package path is normalized.
    pub fn package_product(product: impl Into<String>, package: impl AsRef<Path>) -> Self {
        Self::PackageProduct {
            product: product.into(),
            package: paths::normalize(package.as_ref()),
        }
    }

    /// An unresolved package product node.
    pub fn external_product(product: impl Into<String>) -> Self {
        Self::ExternalProduct {
            product: product.into(),
        }
    }

    /// A framework node; the path is normalized.
    pub fn framework(path: impl AsRef<Path>) -> Self {
        Self::Framework {
            path: paths::normalize(path.as_ref()),
        }
    }

    /// An xcframework node; the path is normalized.
    pub fn xcframework(path: impl AsRef<Path>) -> Self {
        Self::XcFramework {
            path: paths::normalize(path.as_ref()),
        }
    }

    /// A library node; the path is normalized.
    pub fn library(path: impl AsRef<Path>) -> Self {
        Self::Library {
            path: paths::normalize(path.as_ref()),
        }
    }

    /// An SDK node.
    pub fn sdk(name: impl Into<String>) -> Self {
        Self::Sdk { name: name.into() }
    }

    /// Returns `true` for target nodes.
    #[must_use]
    pub fn is_target(&self) -> bool {
        matches!(self, Self::Target { .. })
    }

    /// Path of the project or package that owns this node, if any.
    #[must_use]
    pub fn owner_path(&self) -> Option<&Path> {
        match self {
            Self::Target { project, .. } => Some(project),
            Self::PackageProduct { package, .. } => Some(package),
            _ => None,
        }
    }
}

impl fmt::Display for GraphDependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Target { name, project } => {
                write!(f, "target '{name}' ({})", project.display())
            }
            Self::PackageProduct { product, package } => {
                write!(f, "package product '{product}' ({})", package.display())
            }
            Self::ExternalProduct { product } => write!(f, "external product '{product}'"),
            Self::Framework { path } => write!(f, "framework {}", path.display()),
            Self::XcFramework { path } => write!(f, "xcframework {}", path.display()),
            Self::Library { path } => write!(f, "library {}", path.display()),
            Self::Sdk { name } => write!(f, "sdk '{name}'"),
            Self::XcTest => f.write_str("xctest"),
        }
    }
}

/// A platform an edge can be restricted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlatformFilter {
    /// iOS
    Ios,
    /// macOS
    Macos,
    /// tvOS
    Tvos,
    /// watchOS
    Watchos,
    /// visionOS
    Visionos,
    /// Mac Catalyst
    Catalyst,
    /// DriverKit
    Driverkit,
}

impl PlatformFilter {
    /// Look up a filter keyword as it appears in project and package files.
    ///
    /// Matching is case-insensitive. Unknown keywords return `None`.
    #[must_use]
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword.to_ascii_lowercase().as_str() {
            "ios" => Some(Self::Ios),
            "macos" | "osx" => Some(Self::Macos),
            "tvos" => Some(Self::Tvos),
            "watchos" => Some(Self::Watchos),
            "visionos" | "xros" => Some(Self::Visionos),
            "maccatalyst" | "catalyst" => Some(Self::Catalyst),
            "driverkit" => Some(Self::Driverkit),
            _ => None,
        }
    }

    /// The canonical keyword for this filter.
    #[must_use]
    pub fn keyword(self) -> &'static str {
        match self {
            Self::Ios => "ios",
            Self::Macos => "macos",
            Self::Tvos => "tvos",
            Self::Watchos => "watchos",
            Self::Visionos => "visionos",
            Self::Catalyst => "maccatalyst",
            Self::Driverkit => "driverkit",
        }
    }
}

impl fmt::Display for PlatformFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.keyword())
    }
}

/// The set of platforms an edge applies to.
///
/// A condition is never empty: "no condition" is expressed as
/// `Option::<PlatformCondition>::None`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlatformCondition(BTreeSet<PlatformFilter>);

impl PlatformCondition {
    /// Build a condition from a set of filters.
    ///
    /// Returns `None` when the set is empty, which means unconditional.
    pub fn when(filters: impl IntoIterator<Item = PlatformFilter>) -> Option<Self> {
        let filters: BTreeSet<_> = filters.into_iter().collect();
        if filters.is_empty() {
            None
        } else {
            Some(Self(filters))
        }
    }

    /// The filters of this condition, in sorted order.
    #[must_use]
    pub fn filters(&self) -> &BTreeSet<PlatformFilter> {
        &self.0
    }

    /// Whether the edge applies on the given platform.
    #[must_use]
    pub fn applies_to(&self, platform: PlatformFilter) -> bool {
        self.0.contains(&platform)
    }

    /// Merge two conditions declared for the same edge.
    ///
    /// An unconditional declaration wins over any condition.
    #[must_use]
    pub fn merge(lhs: Option<&Self>, rhs: Option<&Self>) -> Option<Self> {
        match (lhs, rhs) {
            (Some(lhs), Some(rhs)) => Some(Self(lhs.0.union(&rhs.0).copied().collect())),
            _ => None,
        }
    }
}

impl fmt::Display for PlatformCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let keywords: Vec<&str> = self.0.iter().map(|filter| filter.keyword()).collect();
        write!(f, "[{}]", keywords.join(", "))
    }
}
