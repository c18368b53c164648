//! Project, package, scheme and workspace descriptors.

use crate::descriptor::TargetDescriptor;
use semver::{Version, VersionReq};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

/// A single build setting value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SettingValue {
    /// A scalar value.
    String(String),
    /// A list value.
    Array(Vec<String>),
}

/// Build settings keyed by setting name.
pub type BuildSettings = BTreeMap<String, SettingValue>;

/// Whether a configuration is a debug or a release configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BuildVariant {
    /// Debug configuration.
    Debug,
    /// Release configuration.
    Release,
}

impl BuildVariant {
    /// Infer the variant from a configuration name.
    ///
    /// Names containing "debug" (any case) are debug; everything else is
    /// release.
    #[must_use]
    pub fn from_configuration_name(name: &str) -> Self {
        if name.to_ascii_lowercase().contains("debug") {
            Self::Debug
        } else {
            Self::Release
        }
    }
}

/// A named build configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildConfiguration {
    /// Configuration name, e.g. `Debug`.
    pub name: String,
    /// Debug or release.
    pub variant: BuildVariant,
    /// Settings specific to this configuration.
    #[serde(default)]
    pub settings: BuildSettings,
    /// Absolute path of the configuration's settings file, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub xcconfig: Option<PathBuf>,
}

/// Project-level build settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    /// Settings shared by every configuration.
    #[serde(default)]
    pub base: BuildSettings,
    /// Configurations sorted by name.
    #[serde(default)]
    pub configurations: Vec<BuildConfiguration>,
}

impl Settings {
    /// Look up a configuration by name.
    #[must_use]
    pub fn configuration(&self, name: &str) -> Option<&BuildConfiguration> {
        self.configurations.iter().find(|c| c.name == name)
    }
}

/// The version constraint recorded for a remote package.
///
/// Constraints are recorded, never solved.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum VersionRequirement {
    /// Any version from `version` up to the next major version.
    UpToNextMajor {
        /// Minimum version.
        version: Version,
    },
    /// Any version from `version` up to the next minor version.
    UpToNextMinor {
        /// Minimum version.
        version: Version,
    },
    /// Exactly `version`.
    Exact {
        /// The version.
        version: Version,
    },
    /// Any version in `lower..upper`.
    Range {
        /// Inclusive lower bound.
        lower: Version,
        /// Exclusive upper bound.
        upper: Version,
    },
    /// The head of a branch.
    Branch {
        /// Branch name.
        name: String,
    },
    /// A fixed revision.
    Revision {
        /// Commit hash.
        hash: String,
    },
}

impl VersionRequirement {
    /// The requirement used when a package declares none.
    #[must_use]
    pub fn unspecified() -> Self {
        Self::UpToNextMajor {
            version: Version::new(0, 0, 0),
        }
    }

    /// The equivalent semver requirement for the version-based kinds.
    ///
    /// Returns `None` for branch and revision requirements.
    #[must_use]
    pub fn to_version_req(&self) -> Option<VersionReq> {
        let text = match self {
            Self::UpToNextMajor { version } => format!("^{version}"),
            Self::UpToNextMinor { version } => format!("~{version}"),
            Self::Exact { version } => format!("={version}"),
            Self::Range { lower, upper } => format!(">={lower}, <{upper}"),
            Self::Branch { .. } | Self::Revision { .. } => return None,
        };
        VersionReq::parse(&text).ok()
    }
}

impl fmt::Display for VersionRequirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UpToNextMajor { version } => write!(f, "up to next major from {version}"),
            Self::UpToNextMinor { version } => write!(f, "up to next minor from {version}"),
            Self::Exact { version } => write!(f, "exactly {version}"),
            Self::Range { lower, upper } => write!(f, "{lower}..<{upper}"),
            Self::Branch { name } => write!(f, "branch {name}"),
            Self::Revision { hash } => write!(f, "revision {hash}"),
        }
    }
}

/// A package a project depends on.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum PackageReference {
    /// A package fetched from a repository.
    Remote {
        /// Repository URL.
        url: String,
        /// Version constraint.
        requirement: VersionRequirement,
    },
    /// A package checked out on disk.
    Local {
        /// Absolute path of the package root.
        path: PathBuf,
    },
}

/// Points at a target in a project.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetReference {
    /// Absolute path of the project bundle.
    pub project: PathBuf,
    /// Target name.
    pub name: String,
}

/// A named bundle of build, test and run actions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Scheme {
    /// Scheme name.
    pub name: String,
    /// Whether the scheme is shared (checked in) or per-user.
    pub shared: bool,
    /// Targets built by the build action.
    #[serde(default)]
    pub build_targets: Vec<TargetReference>,
    /// Targets run by the test action.
    #[serde(default)]
    pub test_targets: Vec<TargetReference>,
    /// Executable launched by the run action.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_target: Option<TargetReference>,
}

/// Where a project came from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum ProjectOrigin {
    /// A first-party project bundle.
    Local,
    /// A project synthesized from a package manifest.
    Package {
        /// Package name.
        name: String,
    },
}

/// A mapped project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectDescriptor {
    /// Absolute path; also the namespace of the project's target nodes.
    pub path: PathBuf,
    /// Directory relative paths inside the project resolve against.
    pub source_root: PathBuf,
    /// Project name.
    pub name: String,
    /// First-party or package-origin.
    pub origin: ProjectOrigin,
    /// Targets keyed, and therefore ordered, by name.
    pub targets: BTreeMap<String, TargetDescriptor>,
    /// Packages referenced by the project.
    #[serde(default)]
    pub packages: Vec<PackageReference>,
    /// User schemes followed by shared schemes.
    #[serde(default)]
    pub schemes: Vec<Scheme>,
    /// Project-level build settings.
    #[serde(default)]
    pub settings: Settings,
}

impl ProjectDescriptor {
    /// Look up a target by name.
    #[must_use]
    pub fn target(&self, name: &str) -> Option<&TargetDescriptor> {
        self.targets.get(name)
    }

    /// Whether the project was synthesized from a package.
    #[must_use]
    pub fn is_package(&self) -> bool {
        matches!(self.origin, ProjectOrigin::Package { .. })
    }

    /// Paths of the local packages this project references.
    pub fn local_packages(&self) -> impl Iterator<Item = &Path> {
        self.packages.iter().filter_map(|package| match package {
            PackageReference::Local { path } => Some(path.as_path()),
            PackageReference::Remote { .. } => None,
        })
    }
}

/// Options recorded on a workspace for downstream generators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationOptions {
    /// Whether Xcode should create schemes automatically.
    pub enable_automatic_xcode_schemes: Option<bool>,
    /// Whether a workspace-wide scheme should be generated.
    pub autogenerated_workspace_schemes: bool,
    /// Whether a markdown readme should be rendered into the workspace.
    pub render_markdown_readme: bool,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            enable_automatic_xcode_schemes: Some(false),
            autogenerated_workspace_schemes: false,
            render_markdown_readme: false,
        }
    }
}

/// A set of projects plus the schemes they share.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Workspace {
    /// Absolute path of the workspace bundle (or of the directory holding
    /// the single project).
    pub path: PathBuf,
    /// Workspace name.
    pub name: String,
    /// Member project paths in discovery order, without duplicates.
    pub projects: Vec<PathBuf>,
    /// Shared workspace schemes.
    #[serde(default)]
    pub schemes: Vec<Scheme>,
    /// Generation options.
    #[serde(default)]
    pub generation_options: GenerationOptions,
}
