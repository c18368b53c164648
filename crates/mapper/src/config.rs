//! Graph builder configuration.

use std::path::PathBuf;

/// Default bound on concurrent collaborator calls.
pub const DEFAULT_MAX_PARALLEL: usize = 8;

/// Default limit on workspace group nesting.
pub const DEFAULT_MAX_WORKSPACE_DEPTH: usize = 64;

/// Where shared schemes live below a workspace or project bundle.
pub const SHARED_SCHEMES_SUBPATH: &str = "xcshareddata/xcschemes";

/// Configuration for the graph builder.
#[derive(Debug, Clone)]
pub struct BuilderConfig {
    /// Maximum concurrent collaborator calls (0 = unlimited).
    pub max_parallel: usize,

    /// Maximum nesting of groups in a workspace element tree.
    pub max_workspace_depth: usize,

    /// Shared scheme directory, relative to the workspace bundle.
    pub shared_schemes_subpath: PathBuf,

    /// Check that cross-project target references name an existing target.
    pub validate_project_references: bool,
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            max_parallel: DEFAULT_MAX_PARALLEL,
            max_workspace_depth: DEFAULT_MAX_WORKSPACE_DEPTH,
            shared_schemes_subpath: PathBuf::from(SHARED_SCHEMES_SUBPATH),
            validate_project_references: true,
        }
    }
}

impl BuilderConfig {
    /// Set the maximum concurrent collaborator calls
    #[must_use]
    pub fn with_max_parallel(mut self, max_parallel: usize) -> Self {
        self.max_parallel = max_parallel;
        self
    }

    /// Set the maximum workspace group nesting
    #[must_use]
    pub fn with_max_workspace_depth(mut self, depth: usize) -> Self {
        self.max_workspace_depth = depth;
        self
    }

    /// Set the shared scheme subpath
    #[must_use]
    pub fn with_shared_schemes_subpath(mut self, subpath: impl Into<PathBuf>) -> Self {
        self.shared_schemes_subpath = subpath.into();
        self
    }

    /// Enable or disable cross-project target validation
    #[must_use]
    pub fn with_validate_project_references(mut self, validate: bool) -> Self {
        self.validate_project_references = validate;
        self
    }

    /// Get the number of semaphore permits to hand out
    #[must_use]
    pub fn effective_parallelism(&self) -> usize {
        if self.max_parallel == 0 {
            tokio::sync::Semaphore::MAX_PERMITS
        } else {
            self.max_parallel
        }
    }
}
