//! Graph construction and dependency resolution for xcgraph.
//!
//! This crate turns already-parsed project, package and workspace
//! descriptions into an [`xcgraph_graph::Graph`]. Parsing the on-disk formats
//! is left to collaborators, which the builder reaches through the
//! [`ProjectLoader`], [`PackageInfoLoader`] and [`SchemeLoader`] traits.
//!
//! # Architecture
//!
//! Mapping runs leaves first:
//!
//! - [`DependencyResolver`] turns one declared dependency into a node
//! - [`TargetMapper`] maps a raw target and resolves its dependencies
//! - [`ProjectMapper`] maps a raw project, its targets in parallel
//! - [`PackageMapper`] expands package metadata into a synthetic project
//! - [`WorkspaceMapper`] discovers member projects and shared schemes
//! - [`GraphBuilder`] drives all of the above and assembles the graph
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use xcgraph_mapper::{GraphBuilder, RootDescription};
//!
//! let builder = GraphBuilder::new(Arc::new(project_loader), Arc::new(package_loader));
//! let graph = builder
//!     .build(RootDescription::Project("/work/App/App.xcodeproj".into()))
//!     .await?;
//! println!("{} projects", graph.projects.len());
//! ```

mod builder;
mod cache;
mod config;
mod error;
mod loader;
mod package;
mod project;
pub mod raw;
mod requirement;
mod resolver;
mod target;
mod workspace;

pub use builder::{GraphBuilder, RootDescription};
pub use cache::PathCache;
pub use config::{
    BuilderConfig, DEFAULT_MAX_PARALLEL, DEFAULT_MAX_WORKSPACE_DEPTH, SHARED_SCHEMES_SUBPATH,
};
pub use error::{Error, Result};
pub use loader::{PackageInfoLoader, ProjectLoader, SchemeLoader};
pub use package::{PackageMapper, local_dependencies, product_for_target_kind, source_directory};
pub use project::ProjectMapper;
pub use requirement::map_requirement;
pub use resolver::{ArtifactKind, DependencyResolver};
pub use target::{TargetMapper, platform_condition, product_for_type};
pub use workspace::{PROJECT_BUNDLE_EXTENSION, WorkspaceMapper, resolve_location};
