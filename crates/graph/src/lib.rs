//! Node identity, descriptors and the dependency graph model for xcgraph.
//!
//! This crate holds the immutable values produced by a graph resolution pass.
//! It performs no I/O and has no async surface; the mapping engine lives in
//! `xcgraph-mapper`.
//!
//! # Key Types
//!
//! - [`GraphDependency`]: the canonical identity of every node in the graph
//! - [`PlatformCondition`]: the platform filters attached to an edge
//! - [`TargetDescriptor`] / [`ProjectDescriptor`]: mapped targets and projects
//! - [`Workspace`]: the member projects and shared schemes of a workspace
//! - [`Graph`]: the final cross-referenced adjacency structure
//!
//! # Example
//!
//! ```ignore
//! use xcgraph_graph::{Graph, GraphDependency};
//!
//! let app = GraphDependency::target("App", "/work/App.xcodeproj");
//! for dependency in graph.direct_dependencies(&app) {
//!     println!("{dependency}");
//! }
//! ```

mod dependency;
mod descriptor;
mod graph;
pub mod paths;
mod project;
mod serde_pairs;

pub use dependency::{GraphDependency, PlatformCondition, PlatformFilter};
pub use descriptor::{DependencyReference, Destination, Product, TargetDependency, TargetDescriptor};
pub use graph::{DependencyDiGraph, Graph};
pub use project::{
    BuildConfiguration, BuildSettings, BuildVariant, GenerationOptions, PackageReference,
    ProjectDescriptor, ProjectOrigin, Scheme, SettingValue, Settings, TargetReference,
    VersionRequirement, Workspace,
};
