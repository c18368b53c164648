//! Error types for graph mapping operations.

use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for graph mapping operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while mapping projects, packages and workspaces.
///
/// Structural errors abort the whole graph build. Errors raised by
/// collaborators (project parsers, package metadata loaders) travel through
/// [`Error::External`] unchanged.
#[derive(Error, Debug, Diagnostic)]
pub enum Error {
    /// A project bundle did not contain a root project.
    #[error("No root project found in project bundle at {path}")]
    #[diagnostic(
        code(xcgraph::mapper::root_project_not_found),
        help("Ensure the path points to a valid project bundle with a readable project file")
    )]
    RootProjectNotFound {
        /// Path of the project bundle.
        path: PathBuf,
    },

    /// A remote package reference has no repository URL.
    #[error("Remote package{} referenced by {} has no repository URL", package.as_ref().map(|p| format!(" '{p}'")).unwrap_or_default(), owner.display())]
    #[diagnostic(
        code(xcgraph::mapper::missing_repository_url),
        help("Add the repository URL to the remote package reference")
    )]
    MissingRepositoryUrl {
        /// Project or package that declares the reference.
        owner: PathBuf,
        /// Package name, when known.
        package: Option<String>,
    },

    /// A path-based dependency has an extension that is not a known artifact kind.
    #[error("Unsupported artifact extension '{extension}' for dependency {} in project {}", path.display(), project.display())]
    #[diagnostic(
        code(xcgraph::mapper::unsupported_artifact_extension),
        help("Path dependencies must point at a .framework, .xcframework, .a or .dylib")
    )]
    UnsupportedArtifactExtension {
        /// Path of the artifact.
        path: PathBuf,
        /// The extension found, empty when the path has none.
        extension: String,
        /// Project that declares the dependency.
        project: PathBuf,
    },

    /// A target declares a product type the mapper does not know.
    #[error("Target '{target}' in {} has unsupported product type '{product_type}'", project.display())]
    #[diagnostic(
        code(xcgraph::mapper::unsupported_product_type),
        help(
            "Supported product types: application, framework, static framework, static library, dynamic library, tool, unit test bundle, UI test bundle, macro, bundle"
        )
    )]
    UnsupportedProductType {
        /// Target name.
        target: String,
        /// Project that owns the target.
        project: PathBuf,
        /// The raw product type.
        product_type: String,
    },

    /// A target declares no recognizable destination.
    #[error("Target '{target}' in {} has no supported destinations", project.display())]
    #[diagnostic(
        code(xcgraph::mapper::missing_destinations),
        help("Declare at least one destination such as iPhone, iPad, mac or appleTv")
    )]
    MissingDestinations {
        /// Target name.
        target: String,
        /// Project that owns the target.
        project: PathBuf,
    },

    /// Two targets of one project share a name.
    #[error("Target '{target}' is declared more than once in {}", project.display())]
    #[diagnostic(
        code(xcgraph::mapper::duplicate_target),
        help("Target names must be unique within a project")
    )]
    DuplicateTarget {
        /// Target name.
        target: String,
        /// Project that declares the target twice.
        project: PathBuf,
    },

    /// A version in a package requirement is not a semantic version.
    #[error("Invalid package version '{version}': {source}")]
    #[diagnostic(
        code(xcgraph::mapper::invalid_version),
        help("Versions must follow semantic versioning, e.g. 1.4.0")
    )]
    InvalidVersion {
        /// The raw version string.
        version: String,
        /// The parse error.
        #[source]
        source: semver::Error,
    },

    /// A cross-project dependency names a target the project does not declare.
    #[error("Target '{target}' referenced by {referenced_by} does not exist in {}", project.display())]
    #[diagnostic(
        code(xcgraph::mapper::target_not_found),
        help("Check the target name and the project path of the dependency")
    )]
    TargetNotFound {
        /// Missing target name.
        target: String,
        /// Project that was expected to declare it.
        project: PathBuf,
        /// The referencing node.
        referenced_by: String,
    },

    /// The workspace element tree nests deeper than the configured limit.
    #[error("Workspace {} nests groups deeper than {max_depth} levels", path.display())]
    #[diagnostic(
        code(xcgraph::mapper::workspace_too_deep),
        help("The workspace description may contain a cycle; raise max_workspace_depth if it is legitimately this deep")
    )]
    WorkspaceTooDeep {
        /// Path of the workspace.
        path: PathBuf,
        /// The configured limit.
        max_depth: usize,
    },

    /// I/O error occurred.
    #[error("I/O error during {operation}{}: {source}", path.as_ref().map(|p| format!(" at {}", p.display())).unwrap_or_default())]
    #[diagnostic(
        code(xcgraph::mapper::io_error),
        help("Check that the referenced paths exist and that you have permission to read them")
    )]
    Io {
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
        /// Optional path where the error occurred.
        path: Option<PathBuf>,
        /// Description of the operation being performed.
        operation: String,
    },

    /// An error raised by a collaborator, passed through verbatim.
    #[error(transparent)]
    #[diagnostic(code(xcgraph::mapper::external))]
    External(Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
    /// Wrap a collaborator error without altering its message or source chain.
    pub fn external(source: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::External(source.into())
    }
}

impl From<std::io::Error> for Error {
    fn from(source: std::io::Error) -> Self {
        Self::Io {
            source,
            path: None,
            operation: "file operation".to_string(),
        }
    }
}
