//! Project mapping.
//!
//! A [`ProjectMapper`] turns one [`RawProject`] into a [`ProjectDescriptor`]:
//! targets are mapped in parallel on the rayon pool and stored by name,
//! package references are translated, and user and shared schemes are merged.
//! Any failure fails the whole project.

use crate::error::{Error, Result};
use crate::raw::{RawBuildConfiguration, RawPackageReference, RawProject, RawScheme, RawTargetReference};
use crate::requirement::map_requirement;
use crate::resolver::DependencyResolver;
use crate::target::TargetMapper;
use rayon::prelude::*;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use xcgraph_graph::{
    BuildConfiguration, BuildVariant, PackageReference, ProjectDescriptor, ProjectOrigin, Scheme,
    Settings, TargetReference, paths,
};

/// Name of a bundle or package root: its file stem.
pub(crate) fn default_name(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Map a raw scheme.
///
/// Target references without a container point into `default_container`;
/// when there is none they are dropped.
pub(crate) fn map_scheme(
    raw: &RawScheme,
    shared: bool,
    default_container: Option<&Path>,
    source_root: &Path,
) -> Scheme {
    let reference = |target: &RawTargetReference| -> Option<TargetReference> {
        let project = match (&target.container, default_container) {
            (Some(container), _) => paths::absolutize(source_root, container),
            (None, Some(owner)) => owner.to_path_buf(),
            (None, None) => {
                warn!(
                    scheme = %raw.name,
                    target = %target.name,
                    "Dropping scheme target without a container"
                );
                return None;
            }
        };
        Some(TargetReference {
            project,
            name: target.name.clone(),
        })
    };

    Scheme {
        name: raw.name.clone(),
        shared,
        build_targets: raw.build_targets.iter().filter_map(reference).collect(),
        test_targets: raw.test_targets.iter().filter_map(reference).collect(),
        run_target: raw.run_target.as_ref().and_then(reference),
    }
}

/// Maps raw projects into [`ProjectDescriptor`]s.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProjectMapper;

impl ProjectMapper {
    /// Create a project mapper.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Map a raw project.
    ///
    /// `known_packages` maps the names of the project's local packages to
    /// their root paths; package products resolve against it.
    ///
    /// # Errors
    ///
    /// Fails on duplicate target names, on any target mapping error, on a
    /// remote package without a repository URL and on invalid versions.
    pub fn map(
        &self,
        raw: &RawProject,
        known_packages: &BTreeMap<String, PathBuf>,
    ) -> Result<ProjectDescriptor> {
        let path = paths::normalize(&raw.path);
        let source_root = paths::source_root(&path);

        let mut target_names = BTreeSet::new();
        for target in &raw.targets {
            if !target_names.insert(target.name.clone()) {
                return Err(Error::DuplicateTarget {
                    target: target.name.clone(),
                    project: path,
                });
            }
        }

        let resolver = DependencyResolver::new(&path, &source_root, &target_names, known_packages);
        let mapper = TargetMapper::new(resolver);
        let targets = raw
            .targets
            .par_iter()
            .map(|target| mapper.map(target))
            .collect::<Result<Vec<_>>>()?
            .into_iter()
            .map(|target| (target.name.clone(), target))
            .collect();

        let packages = raw
            .packages
            .iter()
            .map(|package| map_package_reference(package, &path, &source_root))
            .collect::<Result<Vec<_>>>()?;

        let schemes = raw
            .user_schemes
            .iter()
            .map(|scheme| map_scheme(scheme, false, Some(&path), &source_root))
            .chain(
                raw.shared_schemes
                    .iter()
                    .map(|scheme| map_scheme(scheme, true, Some(&path), &source_root)),
            )
            .collect();

        let settings = map_settings(raw, &source_root);
        let name = raw.name.clone().unwrap_or_else(|| default_name(&path));

        debug!(
            project = %path.display(),
            %name,
            targets = raw.targets.len(),
            packages = raw.packages.len(),
            "Mapped project"
        );

        Ok(ProjectDescriptor {
            path,
            source_root,
            name,
            origin: ProjectOrigin::Local,
            targets,
            packages,
            schemes,
            settings,
        })
    }
}

fn map_package_reference(
    raw: &RawPackageReference,
    owner: &Path,
    source_root: &Path,
) -> Result<PackageReference> {
    match raw {
        RawPackageReference::Remote {
            name,
            repository_url,
            requirement,
        } => {
            let url = repository_url
                .clone()
                .ok_or_else(|| Error::MissingRepositoryUrl {
                    owner: owner.to_path_buf(),
                    package: name.clone(),
                })?;
            Ok(PackageReference::Remote {
                url,
                requirement: map_requirement(requirement.as_ref())?,
            })
        }
        RawPackageReference::Local { path } => Ok(PackageReference::Local {
            path: paths::absolutize(source_root, path),
        }),
    }
}

fn map_settings(raw: &RawProject, source_root: &Path) -> Settings {
    let mut configurations: Vec<BuildConfiguration> = raw
        .configurations
        .iter()
        .map(|configuration| map_configuration(configuration, source_root))
        .collect();
    configurations.sort_by(|a, b| a.name.cmp(&b.name));

    Settings {
        base: raw.settings.clone(),
        configurations,
    }
}

fn map_configuration(raw: &RawBuildConfiguration, source_root: &Path) -> BuildConfiguration {
    BuildConfiguration {
        name: raw.name.clone(),
        variant: BuildVariant::from_configuration_name(&raw.name),
        settings: raw.settings.clone(),
        xcconfig: raw
            .xcconfig
            .as_ref()
            .map(|xcconfig| paths::absolutize(source_root, xcconfig)),
    }
}
