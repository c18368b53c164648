//! Workspace mapping.

use crate::config::BuilderConfig;
use crate::error::{Error, Result};
use crate::loader::SchemeLoader;
use crate::project::{default_name, map_scheme};
use crate::raw::{RawLocation, RawWorkspace, RawWorkspaceElement};
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, trace};
use xcgraph_graph::{GenerationOptions, Scheme, Workspace, paths};

/// Extension of project bundles.
pub const PROJECT_BUNDLE_EXTENSION: &str = "xcodeproj";

/// Resolve an element location.
///
/// `container` is the directory holding the workspace bundle, `group` the
/// directory of the enclosing group.
#[must_use]
pub fn resolve_location(location: &RawLocation, container: &Path, group: &Path) -> PathBuf {
    match location {
        RawLocation::Absolute(path) => paths::normalize(path),
        RawLocation::Container(path) => paths::absolutize(container, path),
        RawLocation::Group(path) | RawLocation::Current(path) => paths::absolutize(group, path),
    }
}

/// Maps raw workspaces into [`Workspace`]s.
pub struct WorkspaceMapper<'a> {
    config: &'a BuilderConfig,
    scheme_loader: Option<&'a Arc<dyn SchemeLoader>>,
}

impl<'a> WorkspaceMapper<'a> {
    /// Create a workspace mapper. Without a scheme loader, workspaces have
    /// no shared schemes.
    #[must_use]
    pub fn new(config: &'a BuilderConfig, scheme_loader: Option<&'a Arc<dyn SchemeLoader>>) -> Self {
        Self {
            config,
            scheme_loader,
        }
    }

    /// Map a raw workspace.
    ///
    /// # Errors
    ///
    /// Fails when groups nest deeper than the configured limit, or when
    /// reading the shared scheme directory fails.
    pub async fn map(&self, raw: &RawWorkspace) -> Result<Workspace> {
        let path = paths::normalize(&raw.path);
        let container = paths::source_root(&path);

        let projects = self.member_projects(raw, &path, &container)?;
        let schemes = self.shared_schemes(&path, &container).await?;
        let name = raw.name.clone().unwrap_or_else(|| default_name(&path));

        debug!(
            workspace = %path.display(),
            projects = projects.len(),
            schemes = schemes.len(),
            "Mapped workspace"
        );

        Ok(Workspace {
            path,
            name,
            projects,
            schemes,
            generation_options: GenerationOptions::default(),
        })
    }

    /// Project bundles referenced by the element tree, in discovery order,
    /// first occurrence kept.
    fn member_projects(
        &self,
        raw: &RawWorkspace,
        path: &Path,
        container: &Path,
    ) -> Result<Vec<PathBuf>> {
        let mut walk = ElementWalk {
            workspace: path,
            container,
            max_depth: self.config.max_workspace_depth,
            seen: HashSet::new(),
            projects: Vec::new(),
        };
        walk.visit(&raw.elements, container, 0)?;
        Ok(walk.projects)
    }

    async fn shared_schemes(&self, path: &Path, container: &Path) -> Result<Vec<Scheme>> {
        let Some(loader) = self.scheme_loader else {
            return Ok(Vec::new());
        };

        let directory = path.join(&self.config.shared_schemes_subpath);
        let exists = tokio::fs::try_exists(&directory)
            .await
            .map_err(|source| Error::Io {
                source,
                path: Some(directory.clone()),
                operation: "checking shared scheme directory".to_string(),
            })?;
        if !exists {
            trace!(directory = %directory.display(), "No shared scheme directory");
            return Ok(Vec::new());
        }

        let raw = loader.load_schemes(&directory).await?;
        Ok(raw
            .iter()
            .map(|scheme| map_scheme(scheme, true, None, container))
            .collect())
    }
}

struct ElementWalk<'a> {
    workspace: &'a Path,
    container: &'a Path,
    max_depth: usize,
    seen: HashSet<PathBuf>,
    projects: Vec<PathBuf>,
}

impl ElementWalk<'_> {
    fn visit(&mut self, elements: &[RawWorkspaceElement], base: &Path, depth: usize) -> Result<()> {
        if depth > self.max_depth {
            return Err(Error::WorkspaceTooDeep {
                path: self.workspace.to_path_buf(),
                max_depth: self.max_depth,
            });
        }

        for element in elements {
            match element {
                RawWorkspaceElement::File { location } => {
                    let path = resolve_location(location, self.container, base);
                    let is_project = path
                        .extension()
                        .is_some_and(|extension| extension == PROJECT_BUNDLE_EXTENSION);
                    if is_project && self.seen.insert(path.clone()) {
                        self.projects.push(path);
                    }
                }
                RawWorkspaceElement::Group {
                    location, children, ..
                } => {
                    let group = resolve_location(location, self.container, base);
                    self.visit(children, &group, depth + 1)?;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::raw::{RawScheme, RawTargetReference};
    use async_trait::async_trait;

    fn file(location: RawLocation) -> RawWorkspaceElement {
        RawWorkspaceElement::File { location }
    }

    fn group(location: RawLocation, children: Vec<RawWorkspaceElement>) -> RawWorkspaceElement {
        RawWorkspaceElement::Group {
            location,
            name: None,
            children,
        }
    }

    fn workspace(elements: Vec<RawWorkspaceElement>) -> RawWorkspace {
        RawWorkspace {
            path: PathBuf::from("/work/App.xcworkspace"),
            name: None,
            elements,
        }
    }

    #[test]
    fn test_resolve_location() {
        let container = Path::new("/work");
        let base = Path::new("/work/Modules");
        assert_eq!(
            resolve_location(&RawLocation::Absolute("/opt/X.xcodeproj".into()), container, base),
            PathBuf::from("/opt/X.xcodeproj")
        );
        assert_eq!(
            resolve_location(&RawLocation::Container("A/A.xcodeproj".into()), container, base),
            PathBuf::from("/work/A/A.xcodeproj")
        );
        assert_eq!(
            resolve_location(&RawLocation::Group("../B/B.xcodeproj".into()), container, base),
            PathBuf::from("/work/B/B.xcodeproj")
        );
    }

    #[tokio::test]
    async fn test_members_in_discovery_order_without_duplicates() {
        let raw = workspace(vec![
            file(RawLocation::Group("App/App.xcodeproj".into())),
            file(RawLocation::Group("README.md".into())),
            group(
                RawLocation::Group("Modules".into()),
                vec![
                    file(RawLocation::Group("Core/Core.xcodeproj".into())),
                    file(RawLocation::Container("App/App.xcodeproj".into())),
                ],
            ),
        ]);

        let config = BuilderConfig::default();
        let mapped = WorkspaceMapper::new(&config, None).map(&raw).await.unwrap();
        assert_eq!(mapped.name, "App");
        assert_eq!(
            mapped.projects,
            vec![
                PathBuf::from("/work/App/App.xcodeproj"),
                PathBuf::from("/work/Modules/Core/Core.xcodeproj"),
            ]
        );
        assert!(mapped.schemes.is_empty());
        assert_eq!(mapped.generation_options, GenerationOptions::default());
    }

    #[tokio::test]
    async fn test_depth_guard() {
        let mut elements = vec![file(RawLocation::Group("Deep.xcodeproj".into()))];
        for _ in 0..4 {
            elements = vec![group(RawLocation::Group("g".into()), elements)];
        }
        let raw = workspace(elements);

        let shallow = BuilderConfig::default().with_max_workspace_depth(3);
        let error = WorkspaceMapper::new(&shallow, None)
            .map(&raw)
            .await
            .unwrap_err();
        assert!(matches!(error, Error::WorkspaceTooDeep { max_depth: 3, .. }));

        let deep_enough = BuilderConfig::default().with_max_workspace_depth(4);
        let mapped = WorkspaceMapper::new(&deep_enough, None)
            .map(&raw)
            .await
            .unwrap();
        assert_eq!(
            mapped.projects,
            vec![PathBuf::from("/work/g/g/g/g/Deep.xcodeproj")]
        );
    }

    struct StaticSchemes;

    #[async_trait]
    impl SchemeLoader for StaticSchemes {
        async fn load_schemes(&self, _directory: &Path) -> Result<Vec<RawScheme>> {
            Ok(vec![RawScheme {
                name: "All".to_string(),
                build_targets: vec![
                    RawTargetReference {
                        container: Some("App/App.xcodeproj".into()),
                        name: "App".to_string(),
                    },
                    RawTargetReference {
                        container: None,
                        name: "Orphan".to_string(),
                    },
                ],
                ..RawScheme::default()
            }])
        }
    }

    #[tokio::test]
    async fn test_shared_schemes_from_disk() {
        let temp = tempfile::tempdir().unwrap();
        let workspace_path = temp.path().join("App.xcworkspace");
        let raw = RawWorkspace {
            path: workspace_path.clone(),
            name: Some("Everything".to_string()),
            elements: Vec::new(),
        };
        let loader: Arc<dyn SchemeLoader> = Arc::new(StaticSchemes);
        let config = BuilderConfig::default();

        let mapped = WorkspaceMapper::new(&config, Some(&loader))
            .map(&raw)
            .await
            .unwrap();
        assert!(mapped.schemes.is_empty());

        std::fs::create_dir_all(workspace_path.join("xcshareddata/xcschemes")).unwrap();
        let mapped = WorkspaceMapper::new(&config, Some(&loader))
            .map(&raw)
            .await
            .unwrap();
        assert_eq!(mapped.name, "Everything");
        assert_eq!(mapped.schemes.len(), 1);
        assert!(mapped.schemes[0].shared);
        assert_eq!(mapped.schemes[0].build_targets.len(), 1);
        assert_eq!(
            mapped.schemes[0].build_targets[0].project,
            temp.path().join("App/App.xcodeproj")
        );
    }
}
