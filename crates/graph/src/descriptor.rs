//! Target descriptors and the as-declared dependency references.

use crate::dependency::{GraphDependency, PlatformCondition, PlatformFilter};
use crate::project::BuildSettings;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::path::PathBuf;

/// What a target builds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Product {
    /// An application bundle.
    App,
    /// A static framework.
    StaticFramework,
    /// A dynamic framework.
    Framework,
    /// A static library.
    StaticLibrary,
    /// A dynamic library.
    DynamicLibrary,
    /// A command-line tool.
    CommandLineTool,
    /// A unit test bundle.
    UnitTests,
    /// A UI test bundle.
    UiTests,
    /// A compiler macro.
    Macro,
    /// A plain resource bundle.
    Bundle,
}

impl Product {
    /// Whether this product is a test bundle.
    #[must_use]
    pub fn is_tests(self) -> bool {
        matches!(self, Self::UnitTests | Self::UiTests)
    }

    /// Whether other targets can link against this product.
    #[must_use]
    pub fn is_linkable(self) -> bool {
        matches!(
            self,
            Self::StaticFramework | Self::Framework | Self::StaticLibrary | Self::DynamicLibrary
        )
    }
}

impl fmt::Display for Product {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::App => "app",
            Self::StaticFramework => "static framework",
            Self::Framework => "framework",
            Self::StaticLibrary => "static library",
            Self::DynamicLibrary => "dynamic library",
            Self::CommandLineTool => "command line tool",
            Self::UnitTests => "unit tests",
            Self::UiTests => "ui tests",
            Self::Macro => "macro",
            Self::Bundle => "bundle",
        };
        f.write_str(name)
    }
}

/// A device class a target can run on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Destination {
    /// iPhone
    Iphone,
    /// iPad
    Ipad,
    /// Native Mac
    Mac,
    /// Mac running the iPad build
    MacWithIpadDesign,
    /// Mac Catalyst
    MacCatalyst,
    /// Apple Watch
    AppleWatch,
    /// Apple TV
    AppleTv,
    /// Apple Vision
    AppleVision,
    /// Apple Vision running the iPad build
    AppleVisionWithIpadDesign,
}

impl Destination {
    /// Every destination, in declaration order.
    pub const ALL: [Self; 9] = [
        Self::Iphone,
        Self::Ipad,
        Self::Mac,
        Self::MacWithIpadDesign,
        Self::MacCatalyst,
        Self::AppleWatch,
        Self::AppleTv,
        Self::AppleVision,
        Self::AppleVisionWithIpadDesign,
    ];

    /// Parse a destination name as it appears in raw target descriptions.
    ///
    /// Matching is case-insensitive; unknown names return `None`.
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "iphone" => Some(Self::Iphone),
            "ipad" => Some(Self::Ipad),
            "mac" => Some(Self::Mac),
            "macwithipaddesign" => Some(Self::MacWithIpadDesign),
            "maccatalyst" => Some(Self::MacCatalyst),
            "applewatch" => Some(Self::AppleWatch),
            "appletv" => Some(Self::AppleTv),
            "applevision" => Some(Self::AppleVision),
            "applevisionwithipaddesign" => Some(Self::AppleVisionWithIpadDesign),
            _ => None,
        }
    }

    /// Destinations supported by a platform.
    #[must_use]
    pub fn for_platform(platform: PlatformFilter) -> &'static [Self] {
        match platform {
            PlatformFilter::Ios => &[Self::Iphone, Self::Ipad, Self::MacWithIpadDesign],
            PlatformFilter::Macos | PlatformFilter::Driverkit => &[Self::Mac],
            PlatformFilter::Catalyst => &[Self::MacCatalyst],
            PlatformFilter::Watchos => &[Self::AppleWatch],
            PlatformFilter::Tvos => &[Self::AppleTv],
            PlatformFilter::Visionos => &[Self::AppleVision, Self::AppleVisionWithIpadDesign],
        }
    }

    /// The platform this destination builds for.
    #[must_use]
    pub fn platform(self) -> PlatformFilter {
        match self {
            Self::Iphone | Self::Ipad | Self::MacWithIpadDesign => PlatformFilter::Ios,
            Self::Mac => PlatformFilter::Macos,
            Self::MacCatalyst => PlatformFilter::Catalyst,
            Self::AppleWatch => PlatformFilter::Watchos,
            Self::AppleTv => PlatformFilter::Tvos,
            Self::AppleVision | Self::AppleVisionWithIpadDesign => PlatformFilter::Visionos,
        }
    }
}

/// A dependency as declared on a target, before resolution.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum DependencyReference {
    /// A target in the same project.
    Target {
        /// Target name.
        name: String,
    },
    /// A target in another project.
    Project {
        /// Target name.
        target: String,
        /// Path of the other project bundle.
        path: PathBuf,
    },
    /// A product of a package.
    PackageProduct {
        /// Product name.
        product: String,
        /// Name of the package providing the product, when declared.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        package: Option<String>,
    },
    /// A precompiled artifact; the extension decides its kind.
    Path {
        /// Artifact path, absolute or relative to the project's source root.
        path: PathBuf,
    },
    /// A system framework or library.
    Sdk {
        /// SDK name.
        name: String,
    },
    /// The test-support framework.
    XcTest,
}

/// A declared dependency together with the node it resolved to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetDependency {
    /// The dependency as declared.
    pub reference: DependencyReference,
    /// The node the reference resolved to.
    pub node: GraphDependency,
    /// Platforms the dependency is restricted to; `None` means all.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub condition: Option<PlatformCondition>,
}

/// A mapped build target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetDescriptor {
    /// Target name, unique within its project.
    pub name: String,
    /// What the target builds.
    pub product: Product,
    /// Supported destinations; never empty.
    pub destinations: BTreeSet<Destination>,
    /// Declared dependencies in declaration order.
    pub dependencies: Vec<TargetDependency>,
    /// Source files as supplied by the project parser.
    pub sources: Vec<PathBuf>,
    /// Target-level build settings.
    #[serde(default)]
    pub settings: BuildSettings,
}

impl TargetDescriptor {
    /// Resolved dependency nodes, without duplicates, in sorted order.
    #[must_use]
    pub fn dependency_nodes(&self) -> BTreeSet<&GraphDependency> {
        self.dependencies.iter().map(|dep| &dep.node).collect()
    }

    /// Platforms this target builds for.
    #[must_use]
    pub fn platforms(&self) -> BTreeSet<PlatformFilter> {
        self.destinations.iter().map(|d| d.platform()).collect()
    }
}
