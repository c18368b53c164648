//! In-memory collaborators and raw-description helpers shared by the
//! integration tests.

#![allow(dead_code, clippy::unwrap_used)]

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use xcgraph_graph::DependencyReference;
use xcgraph_mapper::raw::{
    PackageDependencyInfo, PackageInfo, PackageProductInfo, PackageTargetDependency,
    PackageTargetInfo, PackageTargetKind, RawDependency, RawLocation, RawPackageReference,
    RawProject, RawTarget, RawWorkspace, RawWorkspaceElement,
};
use xcgraph_mapper::{Error, GraphBuilder, PackageInfoLoader, ProjectLoader, Result};

/// Serves raw projects and package metadata from memory and counts loads.
#[derive(Default)]
pub struct Fixtures {
    projects: HashMap<PathBuf, Option<RawProject>>,
    packages: HashMap<PathBuf, PackageInfo>,
    project_loads: Mutex<HashMap<PathBuf, usize>>,
    package_loads: Mutex<HashMap<PathBuf, usize>>,
    in_flight: AtomicUsize,
    peak_in_flight: AtomicUsize,
}

impl Fixtures {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_project(mut self, project: RawProject) -> Self {
        self.projects.insert(project.path.clone(), Some(project));
        self
    }

    /// A bundle that exists but holds no root project.
    pub fn with_empty_bundle(mut self, path: &str) -> Self {
        self.projects.insert(PathBuf::from(path), None);
        self
    }

    pub fn with_package(mut self, root: &str, info: PackageInfo) -> Self {
        self.packages.insert(PathBuf::from(root), info);
        self
    }

    pub fn project_loads(&self, path: &str) -> usize {
        self.project_loads
            .lock()
            .unwrap()
            .get(Path::new(path))
            .copied()
            .unwrap_or_default()
    }

    pub fn package_loads(&self, root: &str) -> usize {
        self.package_loads
            .lock()
            .unwrap()
            .get(Path::new(root))
            .copied()
            .unwrap_or_default()
    }

    /// Highest number of loader calls that were running at the same time.
    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

    /// Count one loader call as running while it is suspended.
    async fn in_flight(&self) {
        let running = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak_in_flight.fetch_max(running, Ordering::SeqCst);
        tokio::task::yield_now().await;
        self.in_flight.fetch_sub(1, Ordering::SeqCst);
    }

    pub fn into_shared(self) -> Arc<Self> {
        Arc::new(self)
    }
}

/// A builder backed by `fixtures`.
pub fn builder(fixtures: &Arc<Fixtures>) -> GraphBuilder {
    GraphBuilder::new(fixtures.clone(), fixtures.clone())
}

#[async_trait]
impl ProjectLoader for Fixtures {
    async fn load_project(&self, path: &Path) -> Result<Option<RawProject>> {
        *self
            .project_loads
            .lock()
            .unwrap()
            .entry(path.to_path_buf())
            .or_default() += 1;
        self.in_flight().await;

        match self.projects.get(path) {
            Some(project) => Ok(project.clone()),
            None => Err(Error::external(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("no project bundle at {}", path.display()),
            ))),
        }
    }
}

#[async_trait]
impl PackageInfoLoader for Fixtures {
    async fn load_package_info(&self, path: &Path) -> Result<PackageInfo> {
        *self
            .package_loads
            .lock()
            .unwrap()
            .entry(path.to_path_buf())
            .or_default() += 1;
        self.in_flight().await;

        self.packages.get(path).cloned().ok_or_else(|| {
            Error::external(std::io::Error::other(format!(
                "package description failed for {}",
                path.display()
            )))
        })
    }
}

// =============================================================================
// Raw description helpers
// =============================================================================

pub fn project(path: &str, targets: Vec<RawTarget>) -> RawProject {
    RawProject {
        path: PathBuf::from(path),
        targets,
        ..RawProject::default()
    }
}

pub fn framework(name: &str, dependencies: Vec<RawDependency>) -> RawTarget {
    RawTarget {
        name: name.to_string(),
        product_type: "com.apple.product-type.framework".to_string(),
        destinations: vec!["iPhone".to_string(), "mac".to_string()],
        dependencies,
        ..RawTarget::default()
    }
}

pub fn app(name: &str, dependencies: Vec<RawDependency>) -> RawTarget {
    RawTarget {
        product_type: "com.apple.product-type.application".to_string(),
        ..framework(name, dependencies)
    }
}

pub fn on_target(name: &str) -> RawDependency {
    RawDependency::new(DependencyReference::Target {
        name: name.to_string(),
    })
}

pub fn on_project(target: &str, path: &str) -> RawDependency {
    RawDependency::new(DependencyReference::Project {
        target: target.to_string(),
        path: PathBuf::from(path),
    })
}

pub fn on_product(product: &str, package: Option<&str>) -> RawDependency {
    RawDependency::new(DependencyReference::PackageProduct {
        product: product.to_string(),
        package: package.map(str::to_string),
    })
}

pub fn on_path(path: &str) -> RawDependency {
    RawDependency::new(DependencyReference::Path {
        path: PathBuf::from(path),
    })
}

pub fn on_sdk(name: &str) -> RawDependency {
    RawDependency::new(DependencyReference::Sdk {
        name: name.to_string(),
    })
}

pub fn local_package(path: &str) -> RawPackageReference {
    RawPackageReference::Local {
        path: PathBuf::from(path),
    }
}

pub fn workspace(path: &str, elements: Vec<RawWorkspaceElement>) -> RawWorkspace {
    RawWorkspace {
        path: PathBuf::from(path),
        name: None,
        elements,
    }
}

pub fn file(location: RawLocation) -> RawWorkspaceElement {
    RawWorkspaceElement::File { location }
}

pub fn group(location: RawLocation, children: Vec<RawWorkspaceElement>) -> RawWorkspaceElement {
    RawWorkspaceElement::Group {
        location,
        name: None,
        children,
    }
}

pub fn in_group(path: &str) -> RawLocation {
    RawLocation::Group(PathBuf::from(path))
}

pub fn absolute(path: &str) -> RawLocation {
    RawLocation::Absolute(PathBuf::from(path))
}

pub fn in_container(path: &str) -> RawLocation {
    RawLocation::Container(PathBuf::from(path))
}

// =============================================================================
// Package helpers
// =============================================================================

pub fn package(name: &str, targets: Vec<PackageTargetInfo>) -> PackageInfo {
    PackageInfo {
        name: name.to_string(),
        products: vec![PackageProductInfo {
            name: name.to_string(),
            targets: vec![name.to_string()],
        }],
        targets,
        ..PackageInfo::default()
    }
}

pub fn package_target(name: &str, dependencies: Vec<PackageTargetDependency>) -> PackageTargetInfo {
    PackageTargetInfo {
        name: name.to_string(),
        kind: PackageTargetKind::Regular,
        dependencies,
    }
}

pub fn by_name(name: &str) -> PackageTargetDependency {
    PackageTargetDependency::ByName {
        name: name.to_string(),
        condition: None,
    }
}

pub fn local_dependency(name: &str, path: &str) -> PackageDependencyInfo {
    PackageDependencyInfo::Local {
        name: name.to_string(),
        path: PathBuf::from(path),
    }
}
