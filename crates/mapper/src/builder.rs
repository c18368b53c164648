//! Graph construction.
//!
//! [`GraphBuilder::build`] maps the root (a single project or a workspace),
//! every project reachable from it and every local package those projects
//! use, then walks all targets once to produce the adjacency and condition
//! maps.
//!
//! Mapping is memoized per path for the duration of one build, so a project
//! or package reachable along several routes is loaded and mapped once.
//! Collaborator calls are bounded by a semaphore; the first failure aborts
//! the build and drops every sibling task still in flight.

use crate::cache::PathCache;
use crate::config::BuilderConfig;
use crate::error::{Error, Result};
use crate::loader::{PackageInfoLoader, ProjectLoader, SchemeLoader};
use crate::package::{PackageMapper, local_dependencies};
use crate::project::ProjectMapper;
use crate::raw::{PackageInfo, RawPackageReference, RawWorkspace};
use crate::workspace::WorkspaceMapper;
use async_recursion::async_recursion;
use futures::future::try_join_all;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::{Semaphore, SemaphorePermit};
use tracing::{debug, info, warn};
use xcgraph_graph::{
    DependencyReference, GenerationOptions, Graph, GraphDependency, PlatformCondition,
    ProjectDescriptor, Workspace, paths,
};

/// What a graph is built from.
#[derive(Debug, Clone)]
pub enum RootDescription {
    /// A single project bundle; a one-project workspace is synthesized.
    Project(PathBuf),
    /// A parsed workspace.
    Workspace(RawWorkspace),
}

impl RootDescription {
    /// Path of the project or workspace bundle.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::Project(path) => path,
            Self::Workspace(workspace) => &workspace.path,
        }
    }
}

/// A package together with the metadata it was mapped from.
#[derive(Debug)]
struct MappedPackage {
    info: PackageInfo,
    descriptor: ProjectDescriptor,
}

/// Builds dependency graphs.
pub struct GraphBuilder {
    project_loader: Arc<dyn ProjectLoader>,
    package_loader: Arc<dyn PackageInfoLoader>,
    scheme_loader: Option<Arc<dyn SchemeLoader>>,
    config: BuilderConfig,
}

impl GraphBuilder {
    /// Create a builder with the default configuration and no scheme loader.
    #[must_use]
    pub fn new(
        project_loader: Arc<dyn ProjectLoader>,
        package_loader: Arc<dyn PackageInfoLoader>,
    ) -> Self {
        Self {
            project_loader,
            package_loader,
            scheme_loader: None,
            config: BuilderConfig::default(),
        }
    }

    /// Use the given configuration
    #[must_use]
    pub fn with_config(mut self, config: BuilderConfig) -> Self {
        self.config = config;
        self
    }

    /// Load workspace shared schemes through `loader`
    #[must_use]
    pub fn with_scheme_loader(mut self, loader: Arc<dyn SchemeLoader>) -> Self {
        self.scheme_loader = Some(loader);
        self
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &BuilderConfig {
        &self.config
    }

    /// Build the graph rooted at `root`.
    ///
    /// The graph is produced whole or not at all.
    ///
    /// # Errors
    ///
    /// Returns the first mapping error or collaborator error encountered.
    #[tracing::instrument(
        name = "graph_build",
        fields(root = %root.path().display()),
        skip_all
    )]
    pub async fn build(&self, root: RootDescription) -> Result<Graph> {
        info!(max_parallel = self.config.max_parallel, "Building dependency graph");
        let session = BuildSession::new(self);

        let workspace = match root {
            RootDescription::Workspace(raw) => {
                let workspace = WorkspaceMapper::new(&self.config, self.scheme_loader.as_ref())
                    .map(&raw)
                    .await?;
                try_join_all(workspace.projects.iter().map(|path| session.project(path))).await?;
                workspace
            }
            RootDescription::Project(path) => {
                let path = paths::normalize(&path);
                let project = session.project(&path).await?;
                Workspace {
                    path: project.source_root.clone(),
                    name: project.name.clone(),
                    projects: vec![path],
                    schemes: Vec::new(),
                    generation_options: GenerationOptions::default(),
                }
            }
        };

        let graph = session.finish(workspace)?;
        info!(
            projects = graph.projects.len(),
            packages = graph.packages.len(),
            nodes = graph.dependencies.len(),
            conditioned_edges = graph.dependency_conditions.len(),
            "Dependency graph built"
        );
        Ok(graph)
    }
}

/// State of one [`GraphBuilder::build`] call.
struct BuildSession {
    project_loader: Arc<dyn ProjectLoader>,
    package_loader: Arc<dyn PackageInfoLoader>,
    validate_project_references: bool,
    permits: Semaphore,
    projects: PathCache<ProjectDescriptor>,
    packages: PathCache<MappedPackage>,
}

impl BuildSession {
    fn new(builder: &GraphBuilder) -> Self {
        Self {
            project_loader: Arc::clone(&builder.project_loader),
            package_loader: Arc::clone(&builder.package_loader),
            validate_project_references: builder.config.validate_project_references,
            permits: Semaphore::new(builder.config.effective_parallelism()),
            projects: PathCache::new(),
            packages: PathCache::new(),
        }
    }

    async fn permit(&self) -> Result<SemaphorePermit<'_>> {
        self.permits.acquire().await.map_err(Error::external)
    }

    /// Map the project at `path`, then the projects its targets reference.
    ///
    /// Only the call that mapped the project follows its references, so
    /// reference cycles terminate.
    #[async_recursion]
    async fn project(&self, path: &Path) -> Result<Arc<ProjectDescriptor>> {
        let path = paths::normalize(path);
        let (project, mapped) = self
            .projects
            .get_or_try_init(&path, || self.map_project(&path))
            .await?;

        if mapped {
            let referenced: BTreeSet<&Path> = project
                .targets
                .values()
                .flat_map(|target| &target.dependencies)
                .filter(|dependency| matches!(dependency.reference, DependencyReference::Project { .. }))
                .filter_map(|dependency| dependency.node.owner_path())
                .filter(|owner| *owner != path.as_path())
                .collect();
            try_join_all(referenced.into_iter().map(|owner| self.project(owner))).await?;
        }
        Ok(project)
    }

    async fn map_project(&self, path: &Path) -> Result<ProjectDescriptor> {
        let raw = {
            let _permit = self.permit().await?;
            self.project_loader.load_project(path).await?
        };
        let mut raw = raw.ok_or_else(|| Error::RootProjectNotFound {
            path: path.to_path_buf(),
        })?;
        if paths::normalize(&raw.path) != path {
            debug!(
                requested = %path.display(),
                reported = %raw.path.display(),
                "Loader reported a different project path, keeping the requested one"
            );
            raw.path = path.to_path_buf();
        }

        let source_root = paths::source_root(path);
        let package_roots: Vec<PathBuf> = raw
            .packages
            .iter()
            .filter_map(|package| match package {
                RawPackageReference::Local { path } => Some(paths::absolutize(&source_root, path)),
                RawPackageReference::Remote { .. } => None,
            })
            .collect();
        let packages = try_join_all(package_roots.iter().map(|root| self.package(root))).await?;
        let known_packages = known_packages(
            packages
                .iter()
                .map(|package| (package.info.name.as_str(), package.descriptor.path.clone())),
            path,
        );

        tokio::task::spawn_blocking(move || ProjectMapper::new().map(&raw, &known_packages))
            .await
            .map_err(Error::external)?
    }

    /// Map the package rooted at `root`, then the local packages it depends on.
    #[async_recursion]
    async fn package(&self, root: &Path) -> Result<Arc<MappedPackage>> {
        let root = paths::normalize(root);
        let (package, mapped) = self
            .packages
            .get_or_try_init(&root, || self.map_package(&root))
            .await?;

        if mapped {
            let dependencies: Vec<PathBuf> = local_dependencies(&package.info, &root)
                .map(|(_, path)| path)
                .collect();
            try_join_all(dependencies.iter().map(|dependency| self.package(dependency))).await?;
        }
        Ok(package)
    }

    async fn map_package(&self, root: &Path) -> Result<MappedPackage> {
        let info = {
            let _permit = self.permit().await?;
            self.package_loader.load_package_info(root).await?
        };
        let known_packages = known_packages(local_dependencies(&info, root), root);
        let descriptor = PackageMapper::new().map(&info, &known_packages, root)?;
        Ok(MappedPackage { info, descriptor })
    }

    /// Assemble the graph from everything mapped so far.
    fn finish(self, workspace: Workspace) -> Result<Graph> {
        let mapped_packages = self.packages.entries();
        let mut projects: BTreeMap<PathBuf, ProjectDescriptor> = self
            .projects
            .entries()
            .into_iter()
            .map(|(path, project)| (path, Arc::unwrap_or_clone(project)))
            .collect();

        for (root, package) in &mapped_packages {
            projects
                .entry(root.clone())
                .or_insert_with(|| package.descriptor.clone());
        }
        externalize_missing_package_targets(&mut projects);

        let mut packages = BTreeMap::new();
        for (root, package) in &mapped_packages {
            if let Some(descriptor) = projects.get(root) {
                packages
                    .entry(package.info.name.clone())
                    .or_insert_with(|| descriptor.clone());
            }
        }

        let (mut dependencies, dependency_conditions) = target_edges(&projects);
        for (root, package) in &mapped_packages {
            for product in &package.info.products {
                dependencies
                    .entry(GraphDependency::package_product(&product.name, root))
                    .or_default()
                    .extend(
                        product
                            .targets
                            .iter()
                            .map(|target| GraphDependency::target(target, root)),
                    );
            }
        }

        if self.validate_project_references {
            validate_project_references(&projects)?;
        }

        Ok(Graph {
            name: workspace.name.clone(),
            path: workspace.path.clone(),
            workspace,
            projects,
            dependencies,
            dependency_conditions,
            packages,
        })
    }
}

/// Name-to-root map of a project's or package's local packages.
///
/// When two packages share a name, the first one wins.
fn known_packages<'n>(
    packages: impl IntoIterator<Item = (&'n str, PathBuf)>,
    owner: &Path,
) -> BTreeMap<String, PathBuf> {
    let mut known: BTreeMap<String, PathBuf> = BTreeMap::new();
    let mut sorted: Vec<_> = packages.into_iter().collect();
    sorted.sort_by(|a, b| a.1.cmp(&b.1));
    for (name, path) in sorted {
        if let Some(existing) = known.get(name) {
            warn!(
                package = %name,
                kept = %existing.display(),
                ignored = %path.display(),
                owner = %owner.display(),
                "Two local packages share a name"
            );
            continue;
        }
        known.insert(name.to_string(), path);
    }
    known
}

type Adjacency = BTreeMap<GraphDependency, BTreeSet<GraphDependency>>;
type EdgeConditions = BTreeMap<(GraphDependency, GraphDependency), PlatformCondition>;

/// One adjacency entry per target, one edge per distinct declared node.
fn target_edges(projects: &BTreeMap<PathBuf, ProjectDescriptor>) -> (Adjacency, EdgeConditions) {
    let mut dependencies = Adjacency::new();
    let mut conditions = EdgeConditions::new();

    for project in projects.values() {
        for target in project.targets.values() {
            let source = GraphDependency::target(&target.name, &project.path);

            let mut edges: BTreeMap<&GraphDependency, Option<PlatformCondition>> = BTreeMap::new();
            for dependency in &target.dependencies {
                edges
                    .entry(&dependency.node)
                    .and_modify(|merged| {
                        *merged =
                            PlatformCondition::merge(merged.as_ref(), dependency.condition.as_ref());
                    })
                    .or_insert_with(|| dependency.condition.clone());
            }

            for (node, condition) in &edges {
                if let Some(condition) = condition {
                    conditions.insert((source.clone(), (*node).clone()), condition.clone());
                }
            }
            dependencies.insert(source, edges.into_keys().cloned().collect());
        }
    }

    (dependencies, conditions)
}

/// Package dependencies that matched a sibling package by name but name no
/// target of it become external products.
fn externalize_missing_package_targets(projects: &mut BTreeMap<PathBuf, ProjectDescriptor>) {
    let existing: BTreeSet<GraphDependency> = projects
        .values()
        .flat_map(|project| {
            project
                .targets
                .keys()
                .map(|name| GraphDependency::target(name, &project.path))
        })
        .collect();

    for project in projects.values_mut().filter(|project| project.is_package()) {
        for target in project.targets.values_mut() {
            for dependency in &mut target.dependencies {
                if !matches!(dependency.reference, DependencyReference::Project { .. })
                    || existing.contains(&dependency.node)
                {
                    continue;
                }
                let GraphDependency::Target { name, project: sibling } = &dependency.node else {
                    continue;
                };
                warn!(
                    package = %project.name,
                    target = %target.name,
                    product = %name,
                    sibling = %sibling.display(),
                    "Sibling package has no such target, recording it as external"
                );
                let name = name.clone();
                dependency.reference = DependencyReference::PackageProduct {
                    product: name.clone(),
                    package: None,
                };
                dependency.node = GraphDependency::external_product(name);
            }
        }
    }
}

fn validate_project_references(projects: &BTreeMap<PathBuf, ProjectDescriptor>) -> Result<()> {
    for project in projects.values() {
        for target in project.targets.values() {
            for dependency in &target.dependencies {
                let DependencyReference::Project { .. } = dependency.reference else {
                    continue;
                };
                let GraphDependency::Target {
                    name,
                    project: owner,
                } = &dependency.node
                else {
                    continue;
                };
                let exists = projects
                    .get(owner)
                    .is_some_and(|referenced| referenced.targets.contains_key(name));
                if !exists {
                    return Err(Error::TargetNotFound {
                        target: name.clone(),
                        project: owner.clone(),
                        referenced_by: GraphDependency::target(&target.name, &project.path)
                            .to_string(),
                    });
                }
            }
        }
    }
    Ok(())
}
