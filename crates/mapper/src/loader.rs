//! Collaborator interfaces.
//!
//! Parsing project bundles, running the package-description tool and reading
//! scheme files all happen outside this crate. The builder reaches them
//! through these traits and only ever awaits them; any error they return is
//! propagated to the caller unchanged.

use crate::error::Result;
use crate::raw::{PackageInfo, RawProject, RawScheme};
use async_trait::async_trait;
use std::path::Path;

/// Parses a project bundle into a [`RawProject`].
#[async_trait]
pub trait ProjectLoader: Send + Sync {
    /// Load the project bundle at `path`.
    ///
    /// Returns `Ok(None)` when the bundle exists but holds no root project.
    async fn load_project(&self, path: &Path) -> Result<Option<RawProject>>;
}

/// Describes a package rooted at a directory.
#[async_trait]
pub trait PackageInfoLoader: Send + Sync {
    /// Load the metadata of the package rooted at `path`.
    async fn load_package_info(&self, path: &Path) -> Result<PackageInfo>;
}

/// Reads the scheme files of a scheme directory.
#[async_trait]
pub trait SchemeLoader: Send + Sync {
    /// Load every scheme in `directory`. Only called when the directory exists.
    async fn load_schemes(&self, directory: &Path) -> Result<Vec<RawScheme>>;
}
