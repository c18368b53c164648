//! Dependency reference resolution.
//!
//! This module provides the [`DependencyResolver`], which turns one declared
//! [`DependencyReference`] into the [`GraphDependency`] it denotes. Resolution
//! is a pure function of the reference and the resolver's context: the same
//! inputs always produce the same node.

use crate::error::{Error, Result};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use xcgraph_graph::{DependencyReference, GraphDependency, paths};

/// The artifact kind a path dependency denotes, decided by its extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactKind {
    /// `.framework`
    Framework,
    /// `.xcframework`
    XcFramework,
    /// `.a` or `.dylib`
    Library,
}

impl ArtifactKind {
    /// Classify an artifact by its file extension, ignoring case.
    #[must_use]
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_ascii_lowercase().as_str() {
            "framework" => Some(Self::Framework),
            "xcframework" => Some(Self::XcFramework),
            "a" | "dylib" => Some(Self::Library),
            _ => None,
        }
    }
}

/// Resolves the dependencies declared inside one project.
#[derive(Debug, Clone, Copy)]
pub struct DependencyResolver<'a> {
    project_path: &'a Path,
    source_root: &'a Path,
    target_names: &'a BTreeSet<String>,
    known_packages: &'a BTreeMap<String, PathBuf>,
}

impl<'a> DependencyResolver<'a> {
    /// Create a resolver for the project at `project_path`.
    ///
    /// `target_names` are the targets the project declares; `known_packages`
    /// maps the names of locally available packages to their root paths.
    #[must_use]
    pub fn new(
        project_path: &'a Path,
        source_root: &'a Path,
        target_names: &'a BTreeSet<String>,
        known_packages: &'a BTreeMap<String, PathBuf>,
    ) -> Self {
        Self {
            project_path,
            source_root,
            target_names,
            known_packages,
        }
    }

    /// Path of the owning project.
    #[must_use]
    pub fn project_path(&self) -> &'a Path {
        self.project_path
    }

    /// Directory relative paths resolve against.
    #[must_use]
    pub fn source_root(&self) -> &'a Path {
        self.source_root
    }

    /// Root path of a locally known package.
    #[must_use]
    pub fn known_package(&self, name: &str) -> Option<&'a Path> {
        self.known_packages.get(name).map(PathBuf::as_path)
    }

    /// Resolve a declared reference to its graph node.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnsupportedArtifactExtension`] when a path dependency
    /// does not end in a known artifact extension. Every other reference kind
    /// resolves infallibly.
    pub fn resolve(&self, reference: &DependencyReference) -> Result<GraphDependency> {
        let node = match reference {
            DependencyReference::Target { name } => {
                if !self.target_names.contains(name) {
                    debug!(
                        target = %name,
                        project = %self.project_path.display(),
                        "Target dependency not declared by the owning project"
                    );
                }
                GraphDependency::target(name, self.project_path)
            }
            DependencyReference::Project { target, path } => {
                GraphDependency::target(target, paths::absolutize(self.source_root, path))
            }
            DependencyReference::PackageProduct { product, package } => {
                let package_name = package.as_deref().unwrap_or(product);
                match self.known_package(package_name) {
                    Some(package_path) => GraphDependency::package_product(product, package_path),
                    None => {
                        warn!(
                            product = %product,
                            package = %package_name,
                            project = %self.project_path.display(),
                            "Package product not available locally, recording it as external"
                        );
                        GraphDependency::external_product(product)
                    }
                }
            }
            DependencyReference::Path { path } => self.resolve_artifact(path)?,
            DependencyReference::Sdk { name } => GraphDependency::sdk(name),
            DependencyReference::XcTest => GraphDependency::XcTest,
        };
        Ok(node)
    }

    fn resolve_artifact(&self, path: &Path) -> Result<GraphDependency> {
        let path = paths::absolutize(self.source_root, path);
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or_default();

        match ArtifactKind::from_extension(extension) {
            Some(ArtifactKind::Framework) => Ok(GraphDependency::framework(path)),
            Some(ArtifactKind::XcFramework) => Ok(GraphDependency::xcframework(path)),
            Some(ArtifactKind::Library) => Ok(GraphDependency::library(path)),
            None => Err(Error::UnsupportedArtifactExtension {
                extension: extension.to_string(),
                path,
                project: self.project_path.to_path_buf(),
            }),
        }
    }
}
