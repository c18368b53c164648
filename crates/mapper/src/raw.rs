//! Raw, already-parsed descriptions handed over by collaborators.
//!
//! These mirror what a project-bundle parser, a workspace parser and a
//! package-description tool produce. They derive `Deserialize` so a
//! collaborator can pass them along as JSON.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use xcgraph_graph::{BuildSettings, DependencyReference};

/// A parsed project bundle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawProject {
    /// Path of the project bundle.
    pub path: PathBuf,
    /// Project name; defaults to the bundle's file stem.
    #[serde(default)]
    pub name: Option<String>,
    /// Targets in file order.
    #[serde(default)]
    pub targets: Vec<RawTarget>,
    /// Package references in file order.
    #[serde(default)]
    pub packages: Vec<RawPackageReference>,
    /// Project-level settings shared by every configuration.
    #[serde(default)]
    pub settings: BuildSettings,
    /// Build configurations.
    #[serde(default)]
    pub configurations: Vec<RawBuildConfiguration>,
    /// Per-user schemes.
    #[serde(default)]
    pub user_schemes: Vec<RawScheme>,
    /// Shared schemes.
    #[serde(default)]
    pub shared_schemes: Vec<RawScheme>,
}

/// A target as it appears in the project file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTarget {
    /// Target name.
    pub name: String,
    /// Raw product type identifier, e.g. `com.apple.product-type.application`.
    pub product_type: String,
    /// Raw destination names, e.g. `iPhone`, `mac`.
    #[serde(default)]
    pub destinations: Vec<String>,
    /// Declared dependencies in declaration order.
    #[serde(default)]
    pub dependencies: Vec<RawDependency>,
    /// Source files.
    #[serde(default)]
    pub sources: Vec<PathBuf>,
    /// Target-level build settings.
    #[serde(default)]
    pub settings: BuildSettings,
}

/// A declared dependency with its platform-filter qualifiers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawDependency {
    /// The reference as declared.
    #[serde(flatten)]
    pub reference: DependencyReference,
    /// Platform-filter keywords, e.g. `ios`, `maccatalyst`.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub platform_filters: Vec<String>,
}

impl RawDependency {
    /// An unconditional dependency.
    #[must_use]
    pub fn new(reference: DependencyReference) -> Self {
        Self {
            reference,
            platform_filters: Vec::new(),
        }
    }

    /// Restrict the dependency to the given platform keywords.
    #[must_use]
    pub fn with_platform_filters<I, S>(mut self, filters: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.platform_filters = filters.into_iter().map(Into::into).collect();
        self
    }
}

/// A package reference as it appears in the project file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum RawPackageReference {
    /// A package fetched from a repository.
    #[serde(rename_all = "camelCase")]
    Remote {
        /// Package name, when the project file records one.
        #[serde(default)]
        name: Option<String>,
        /// Repository URL; a missing URL is a mapping error.
        #[serde(default)]
        repository_url: Option<String>,
        /// Version requirement; absent means up-to-next-major from 0.0.0.
        #[serde(default)]
        requirement: Option<RawVersionRequirement>,
    },
    /// A package checked out on disk.
    Local {
        /// Package root, absolute or relative to the project's source root.
        path: PathBuf,
    },
}

/// A version requirement as written in project and package files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum RawVersionRequirement {
    /// Up to the next major version.
    #[serde(rename_all = "camelCase")]
    UpToNextMajorVersion {
        /// Minimum version.
        minimum_version: String,
    },
    /// Up to the next minor version.
    #[serde(rename_all = "camelCase")]
    UpToNextMinorVersion {
        /// Minimum version.
        minimum_version: String,
    },
    /// An exact version.
    ExactVersion {
        /// The version.
        version: String,
    },
    /// A half-open version range.
    #[serde(rename_all = "camelCase")]
    VersionRange {
        /// Inclusive lower bound.
        minimum_version: String,
        /// Exclusive upper bound.
        maximum_version: String,
    },
    /// A branch.
    Branch {
        /// Branch name.
        branch: String,
    },
    /// A revision.
    Revision {
        /// Commit hash.
        revision: String,
    },
}

/// A build configuration as it appears in the project file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawBuildConfiguration {
    /// Configuration name.
    pub name: String,
    /// Settings of this configuration.
    #[serde(default)]
    pub settings: BuildSettings,
    /// Settings file, absolute or relative to the project's source root.
    #[serde(default)]
    pub xcconfig: Option<PathBuf>,
}

/// A scheme as produced by the scheme parser.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawScheme {
    /// Scheme name.
    pub name: String,
    /// Targets of the build action.
    #[serde(default)]
    pub build_targets: Vec<RawTargetReference>,
    /// Targets of the test action.
    #[serde(default)]
    pub test_targets: Vec<RawTargetReference>,
    /// Target of the run action.
    #[serde(default)]
    pub run_target: Option<RawTargetReference>,
}

/// A scheme's pointer at a target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTargetReference {
    /// Project bundle containing the target, relative to the scheme owner's
    /// source root; `None` means the owning project.
    #[serde(default)]
    pub container: Option<PathBuf>,
    /// Target name.
    pub name: String,
}

/// A parsed workspace bundle.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawWorkspace {
    /// Absolute path of the workspace bundle.
    pub path: PathBuf,
    /// Workspace name; defaults to the bundle's file stem.
    #[serde(default)]
    pub name: Option<String>,
    /// Top-level elements in file order.
    #[serde(default)]
    pub elements: Vec<RawWorkspaceElement>,
}

/// A node of the workspace element tree.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum RawWorkspaceElement {
    /// A file reference.
    File {
        /// Where the file lives.
        location: RawLocation,
    },
    /// A group of elements.
    Group {
        /// Where the group's directory lives.
        location: RawLocation,
        /// Display name of the group.
        #[serde(default)]
        name: Option<String>,
        /// Nested elements.
        #[serde(default)]
        children: Vec<RawWorkspaceElement>,
    },
}

/// The location of a workspace element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "path", rename_all = "camelCase")]
pub enum RawLocation {
    /// An absolute path.
    Absolute(PathBuf),
    /// Relative to the directory containing the workspace bundle.
    Container(PathBuf),
    /// Relative to the enclosing group.
    Group(PathBuf),
    /// Relative to the enclosing group; written by older tools.
    Current(PathBuf),
}

/// Metadata of a package, as reported by the package-description tool.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageInfo {
    /// Package name.
    pub name: String,
    /// Products the package exposes.
    #[serde(default)]
    pub products: Vec<PackageProductInfo>,
    /// Targets the package declares.
    #[serde(default)]
    pub targets: Vec<PackageTargetInfo>,
    /// Packages this package depends on.
    #[serde(default)]
    pub dependencies: Vec<PackageDependencyInfo>,
    /// Supported platform keywords; empty means every platform.
    #[serde(default)]
    pub platforms: Vec<String>,
}

/// A product of a package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageProductInfo {
    /// Product name.
    pub name: String,
    /// Targets that make up the product.
    #[serde(default)]
    pub targets: Vec<String>,
}

/// The kind of a package target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PackageTargetKind {
    /// A regular library target.
    Regular,
    /// An executable target.
    Executable,
    /// A compiler macro target.
    Macro,
    /// A build-tool or command plugin.
    Plugin,
    /// A system library wrapper.
    System,
    /// A prebuilt binary target.
    Binary,
    /// A test target.
    Test,
}

/// A target of a package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageTargetInfo {
    /// Target name.
    pub name: String,
    /// Target kind.
    #[serde(rename = "type")]
    pub kind: PackageTargetKind,
    /// Declared dependencies in declaration order.
    #[serde(default)]
    pub dependencies: Vec<PackageTargetDependency>,
}

/// A platform condition on a package target dependency.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageCondition {
    /// Platform keywords.
    #[serde(default)]
    pub platform_names: Vec<String>,
}

/// A dependency of a package target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum PackageTargetDependency {
    /// An explicit target of the same package.
    Target {
        /// Target name.
        name: String,
        /// Optional platform condition.
        #[serde(default)]
        condition: Option<PackageCondition>,
    },
    /// A target or product resolved by name.
    ByName {
        /// Target or product name.
        name: String,
        /// Optional platform condition.
        #[serde(default)]
        condition: Option<PackageCondition>,
    },
    /// A product of another package.
    Product {
        /// Product name.
        name: String,
        /// Package providing the product.
        package: String,
        /// Optional platform condition.
        #[serde(default)]
        condition: Option<PackageCondition>,
    },
}

impl PackageTargetDependency {
    /// The target or product name the dependency refers to.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Target { name, .. } | Self::ByName { name, .. } | Self::Product { name, .. } => {
                name
            }
        }
    }

    /// The platform condition, if the dependency is conditioned.
    #[must_use]
    pub fn condition(&self) -> Option<&PackageCondition> {
        match self {
            Self::Target { condition, .. }
            | Self::ByName { condition, .. }
            | Self::Product { condition, .. } => condition.as_ref(),
        }
    }
}

/// A package-level dependency on another package.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum PackageDependencyInfo {
    /// A package checked out on disk.
    Local {
        /// Package name.
        name: String,
        /// Package root, absolute or relative to the depending package's root.
        path: PathBuf,
    },
    /// A package fetched from a repository.
    #[serde(rename_all = "camelCase")]
    Remote {
        /// Package name.
        name: String,
        /// Repository URL.
        #[serde(default)]
        url: Option<String>,
        /// Version requirement.
        #[serde(default)]
        requirement: Option<RawVersionRequirement>,
    },
}
