//! Package mapping.
//!
//! Packages are expanded into synthetic projects so their targets take part in
//! the graph like any other target. The translation from package target kinds
//! to [`Product`]s is an approximation and lives in [`product_for_target_kind`]
//! alone.

use crate::error::{Error, Result};
use crate::raw::{PackageDependencyInfo, PackageInfo, PackageTargetDependency, PackageTargetInfo, PackageTargetKind};
use crate::requirement::map_requirement;
use crate::target::platform_condition;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use xcgraph_graph::{
    DependencyReference, Destination, GraphDependency, PackageReference, PlatformFilter, Product,
    ProjectDescriptor, ProjectOrigin, Settings, TargetDependency, TargetDescriptor, paths,
};

/// Approximate the product a package target builds.
///
/// Package targets have no product type of their own, so this is lossy:
/// regular library targets become static frameworks, plugins are modelled as
/// command-line tools and system library wrappers as static libraries.
#[must_use]
pub fn product_for_target_kind(kind: PackageTargetKind) -> Product {
    match kind {
        PackageTargetKind::Regular => Product::StaticFramework,
        PackageTargetKind::Executable | PackageTargetKind::Plugin => Product::CommandLineTool,
        PackageTargetKind::Macro => Product::Macro,
        PackageTargetKind::System => Product::StaticLibrary,
        PackageTargetKind::Binary => Product::Framework,
        PackageTargetKind::Test => Product::UnitTests,
    }
}

/// Conventional source directory of a package target.
#[must_use]
pub fn source_directory(package_root: &Path, target: &PackageTargetInfo) -> PathBuf {
    let parent = if target.kind == PackageTargetKind::Test {
        "Tests"
    } else {
        "Sources"
    };
    package_root.join(parent).join(&target.name)
}

/// Local packages a package depends on, as `(name, absolute root)` pairs.
pub fn local_dependencies<'a>(
    info: &'a PackageInfo,
    package_root: &'a Path,
) -> impl Iterator<Item = (&'a str, PathBuf)> + 'a {
    info.dependencies.iter().filter_map(move |dependency| match dependency {
        PackageDependencyInfo::Local { name, path } => {
            Some((name.as_str(), paths::absolutize(package_root, path)))
        }
        PackageDependencyInfo::Remote { .. } => None,
    })
}

/// Maps package metadata into package-origin [`ProjectDescriptor`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct PackageMapper;

impl PackageMapper {
    /// Create a package mapper.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Map the package rooted at `package_root`.
    ///
    /// `known_packages` maps sibling package names to their roots.
    ///
    /// # Errors
    ///
    /// Fails on duplicate target names, on a remote dependency without a URL
    /// and on invalid versions.
    pub fn map(
        &self,
        info: &PackageInfo,
        known_packages: &BTreeMap<String, PathBuf>,
        package_root: &Path,
    ) -> Result<ProjectDescriptor> {
        let root = paths::normalize(package_root);

        let mut target_names = BTreeSet::new();
        for target in &info.targets {
            if !target_names.insert(target.name.as_str()) {
                return Err(Error::DuplicateTarget {
                    target: target.name.clone(),
                    project: root,
                });
            }
        }

        let destinations = package_destinations(info);
        let resolver = PackageDependencyResolver {
            package: &info.name,
            root: &root,
            target_names: &target_names,
            known_packages,
        };

        let targets = info
            .targets
            .iter()
            .map(|target| {
                let descriptor = TargetDescriptor {
                    name: target.name.clone(),
                    product: product_for_target_kind(target.kind),
                    destinations: destinations.clone(),
                    dependencies: target
                        .dependencies
                        .iter()
                        .map(|dependency| resolver.resolve(dependency, &target.name))
                        .collect(),
                    sources: vec![source_directory(&root, target)],
                    settings: BTreeMap::new(),
                };
                (target.name.clone(), descriptor)
            })
            .collect();

        let packages = info
            .dependencies
            .iter()
            .map(|dependency| map_dependency(dependency, &root))
            .collect::<Result<Vec<_>>>()?;

        debug!(
            package = %info.name,
            path = %root.display(),
            targets = info.targets.len(),
            "Mapped package"
        );

        Ok(ProjectDescriptor {
            source_root: root.clone(),
            path: root,
            name: info.name.clone(),
            origin: ProjectOrigin::Package {
                name: info.name.clone(),
            },
            targets,
            packages,
            schemes: Vec::new(),
            settings: Settings::default(),
        })
    }
}

fn package_destinations(info: &PackageInfo) -> BTreeSet<Destination> {
    let destinations: BTreeSet<Destination> = info
        .platforms
        .iter()
        .filter_map(|keyword| {
            let platform = PlatformFilter::from_keyword(keyword);
            if platform.is_none() {
                warn!(package = %info.name, platform = %keyword, "Dropping unrecognized package platform");
            }
            platform
        })
        .flat_map(|platform| Destination::for_platform(platform).iter().copied())
        .collect();

    if destinations.is_empty() {
        Destination::ALL.iter().copied().collect()
    } else {
        destinations
    }
}

fn map_dependency(dependency: &PackageDependencyInfo, root: &Path) -> Result<PackageReference> {
    match dependency {
        PackageDependencyInfo::Local { path, .. } => Ok(PackageReference::Local {
            path: paths::absolutize(root, path),
        }),
        PackageDependencyInfo::Remote {
            name,
            url,
            requirement,
        } => {
            let url = url.clone().ok_or_else(|| Error::MissingRepositoryUrl {
                owner: root.to_path_buf(),
                package: Some(name.clone()),
            })?;
            Ok(PackageReference::Remote {
                url,
                requirement: map_requirement(requirement.as_ref())?,
            })
        }
    }
}

struct PackageDependencyResolver<'a> {
    package: &'a str,
    root: &'a Path,
    target_names: &'a BTreeSet<&'a str>,
    known_packages: &'a BTreeMap<String, PathBuf>,
}

impl PackageDependencyResolver<'_> {
    /// Resolve in order: a target of this package, a target of a sibling
    /// package, an external product.
    fn resolve(&self, dependency: &PackageTargetDependency, owner: &str) -> TargetDependency {
        let name = dependency.name();
        let condition = dependency
            .condition()
            .and_then(|condition| platform_condition(&condition.platform_names, owner));

        let (reference, node) = match dependency {
            _ if self.target_names.contains(name) => (
                DependencyReference::Target {
                    name: name.to_string(),
                },
                GraphDependency::target(name, self.root),
            ),
            PackageTargetDependency::Target { .. } | PackageTargetDependency::ByName { .. } => {
                match self.known_packages.get(name) {
                    Some(sibling) => (
                        DependencyReference::Project {
                            target: name.to_string(),
                            path: sibling.clone(),
                        },
                        GraphDependency::target(name, sibling),
                    ),
                    None => self.external(name, None, owner),
                }
            }
            PackageTargetDependency::Product { package, .. } => {
                match self.known_packages.get(package) {
                    Some(sibling) => (
                        DependencyReference::PackageProduct {
                            product: name.to_string(),
                            package: Some(package.clone()),
                        },
                        GraphDependency::package_product(name, sibling),
                    ),
                    None => self.external(name, Some(package), owner),
                }
            }
        };

        TargetDependency {
            reference,
            node,
            condition,
        }
    }

    fn external(
        &self,
        product: &str,
        package: Option<&String>,
        owner: &str,
    ) -> (DependencyReference, GraphDependency) {
        warn!(
            package = %self.package,
            target = %owner,
            %product,
            "Package dependency not available locally, recording it as external"
        );
        (
            DependencyReference::PackageProduct {
                product: product.to_string(),
                package: package.cloned(),
            },
            GraphDependency::external_product(product),
        )
    }
}
