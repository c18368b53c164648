//! The dependency graph produced by a resolution pass.
//!
//! A [`Graph`] is built once and never mutated afterwards. Every map is a
//! `BTreeMap`, so iteration and serialization order only depend on the
//! graph's contents, never on the order mapping tasks finished in.

use crate::dependency::{GraphDependency, PlatformCondition};
use crate::descriptor::TargetDescriptor;
use crate::project::{ProjectDescriptor, Workspace};
use petgraph::algo::is_cyclic_directed;
use petgraph::graph::{DiGraph, NodeIndex};
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use tracing::debug;

/// A petgraph view of a [`Graph`]; edge weights carry the edge condition.
pub type DependencyDiGraph = DiGraph<GraphDependency, Option<PlatformCondition>>;

/// The normalized, cross-referenced dependency graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Graph {
    /// Graph name; the workspace name.
    pub name: String,
    /// Root path; the workspace path.
    pub path: PathBuf,
    /// The workspace the graph was built from.
    pub workspace: Workspace,
    /// Every project encountered, first-party and package-origin, by path.
    pub projects: BTreeMap<PathBuf, ProjectDescriptor>,
    /// Adjacency: every source node and the nodes it depends on.
    #[serde(serialize_with = "crate::serde_pairs::serialize")]
    pub dependencies: BTreeMap<GraphDependency, BTreeSet<GraphDependency>>,
    /// Platform conditions of conditional edges, keyed by `(source, destination)`.
    #[serde(serialize_with = "crate::serde_pairs::serialize")]
    pub dependency_conditions: BTreeMap<(GraphDependency, GraphDependency), PlatformCondition>,
    /// Packages expanded into projects, by package name.
    pub packages: BTreeMap<String, ProjectDescriptor>,
}

impl Graph {
    /// Look up a target by name and project path.
    #[must_use]
    pub fn target(&self, name: &str, project: &Path) -> Option<&TargetDescriptor> {
        self.projects.get(project)?.target(name)
    }

    /// Direct dependencies of a node, in sorted order.
    pub fn direct_dependencies(
        &self,
        node: &GraphDependency,
    ) -> impl Iterator<Item = &GraphDependency> {
        self.dependencies.get(node).into_iter().flatten()
    }

    /// The condition recorded for an edge, `None` when unconditional or absent.
    #[must_use]
    pub fn condition(
        &self,
        from: &GraphDependency,
        to: &GraphDependency,
    ) -> Option<&PlatformCondition> {
        self.dependency_conditions.get(&(from.clone(), to.clone()))
    }

    /// Every node reachable from `node`, excluding `node` itself unless it
    /// sits on a cycle.
    #[must_use]
    pub fn transitive_dependencies(&self, node: &GraphDependency) -> BTreeSet<GraphDependency> {
        let mut visited = BTreeSet::new();
        let mut stack: Vec<&GraphDependency> = self.direct_dependencies(node).collect();

        while let Some(current) = stack.pop() {
            if visited.insert(current.clone()) {
                stack.extend(self.direct_dependencies(current));
            }
        }

        visited
    }

    /// Whether the project at `path` was synthesized from a package.
    #[must_use]
    pub fn is_package_project(&self, path: &Path) -> bool {
        self.projects
            .get(path)
            .is_some_and(ProjectDescriptor::is_package)
    }

    /// Build a petgraph view of the adjacency map.
    ///
    /// Nodes are added in sorted order, so node indices are stable for a
    /// given graph.
    #[must_use]
    pub fn to_petgraph(&self) -> DependencyDiGraph {
        let nodes: BTreeSet<&GraphDependency> = self
            .dependencies
            .iter()
            .flat_map(|(source, destinations)| std::iter::once(source).chain(destinations))
            .collect();

        let mut graph = DependencyDiGraph::with_capacity(nodes.len(), 0);
        let mut indices: HashMap<&GraphDependency, NodeIndex> = HashMap::new();
        for node in nodes {
            indices.insert(node, graph.add_node(node.clone()));
        }

        for (source, destinations) in &self.dependencies {
            let from = indices[source];
            for destination in destinations {
                let condition = self.condition(source, destination).cloned();
                graph.add_edge(from, indices[destination], condition);
            }
        }

        debug!(
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            "Built petgraph view"
        );
        graph
    }

    /// Whether any dependency cycle exists.
    #[must_use]
    pub fn has_cycles(&self) -> bool {
        is_cyclic_directed(&self.to_petgraph())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::dependency::PlatformFilter;
    use crate::project::{GenerationOptions, ProjectOrigin, Settings};

    fn node(name: &str) -> GraphDependency {
        GraphDependency::target(name, "/p/App.xcodeproj")
    }

    fn graph(edges: &[(&str, Vec<&str>)]) -> Graph {
        let mut dependencies = BTreeMap::new();
        for (source, destinations) in edges {
            dependencies.insert(
                node(source),
                destinations.iter().map(|d| node(d)).collect::<BTreeSet<_>>(),
            );
        }
        Graph {
            name: "App".to_string(),
            path: PathBuf::from("/p"),
            workspace: Workspace {
                path: PathBuf::from("/p"),
                name: "App".to_string(),
                projects: vec![PathBuf::from("/p/App.xcodeproj")],
                schemes: vec![],
                generation_options: GenerationOptions::default(),
            },
            projects: BTreeMap::from([(
                PathBuf::from("/p/App.xcodeproj"),
                ProjectDescriptor {
                    path: PathBuf::from("/p/App.xcodeproj"),
                    source_root: PathBuf::from("/p"),
                    name: "App".to_string(),
                    origin: ProjectOrigin::Local,
                    targets: BTreeMap::new(),
                    packages: vec![],
                    schemes: vec![],
                    settings: Settings::default(),
                },
            )]),
            dependencies,
            dependency_conditions: BTreeMap::new(),
            packages: BTreeMap::new(),
        }
    }

    #[test]
    fn test_transitive_dependencies() {
        let graph = graph(&[
            ("App", vec!["Feature"]),
            ("Feature", vec!["Core"]),
            ("Core", vec![]),
        ]);
        let reachable = graph.transitive_dependencies(&node("App"));
        assert_eq!(reachable, BTreeSet::from([node("Feature"), node("Core")]));
        assert!(graph.transitive_dependencies(&node("Core")).is_empty());
    }

    #[test]
    fn test_petgraph_view_carries_conditions() {
        let mut graph = graph(&[("App", vec!["Core"]), ("Core", vec![])]);
        let condition = PlatformCondition::when([PlatformFilter::Ios]).unwrap();
        graph
            .dependency_conditions
            .insert((node("App"), node("Core")), condition.clone());

        let view = graph.to_petgraph();
        assert_eq!(view.node_count(), 2);
        assert_eq!(view.edge_count(), 1);
        let edge = view.edge_indices().next().unwrap();
        assert_eq!(view[edge], Some(condition));
    }

    #[test]
    fn test_cycle_detection() {
        let acyclic = graph(&[("App", vec!["Core"]), ("Core", vec![])]);
        assert!(!acyclic.has_cycles());

        let cyclic = graph(&[("App", vec!["Core"]), ("Core", vec!["App"])]);
        assert!(cyclic.has_cycles());
    }

    #[test]
    fn test_serialization_is_deterministic() {
        let lhs = graph(&[("B", vec!["C", "A"]), ("A", vec![])]);
        let rhs = graph(&[("A", vec![]), ("B", vec!["A", "C"])]);
        assert_eq!(
            serde_json::to_string(&lhs).unwrap(),
            serde_json::to_string(&rhs).unwrap()
        );
    }

    #[test]
    fn test_is_package_project() {
        let graph = graph(&[]);
        assert!(!graph.is_package_project(Path::new("/p/App.xcodeproj")));
        assert!(!graph.is_package_project(Path::new("/missing")));
    }
}
