//! Target mapping.

use crate::error::{Error, Result};
use crate::raw::RawTarget;
use crate::resolver::DependencyResolver;
use std::collections::BTreeSet;
use tracing::{debug, warn};
use xcgraph_graph::{
    Destination, PlatformCondition, PlatformFilter, Product, TargetDependency, TargetDescriptor,
    paths,
};

/// Map a raw product type identifier to a [`Product`].
///
/// The table is total over the identifiers listed here; anything else is
/// reported by the caller as [`Error::UnsupportedProductType`].
#[must_use]
pub fn product_for_type(product_type: &str) -> Option<Product> {
    let product = match product_type {
        "com.apple.product-type.application" => Product::App,
        "com.apple.product-type.framework" => Product::Framework,
        "com.apple.product-type.framework.static" => Product::StaticFramework,
        "com.apple.product-type.library.static" => Product::StaticLibrary,
        "com.apple.product-type.library.dynamic" => Product::DynamicLibrary,
        "com.apple.product-type.tool" => Product::CommandLineTool,
        "com.apple.product-type.bundle.unit-test" => Product::UnitTests,
        "com.apple.product-type.bundle.ui-testing" => Product::UiTests,
        "com.apple.product-type.bundle" => Product::Bundle,
        "com.apple.product-type.macro" => Product::Macro,
        _ => return None,
    };
    Some(product)
}

/// Translate platform-filter keywords into a condition.
///
/// Unknown keywords are dropped. When nothing is left the dependency is
/// unconditional.
pub fn platform_condition<S: AsRef<str>>(keywords: &[S], context: &str) -> Option<PlatformCondition> {
    let filters = keywords.iter().filter_map(|keyword| {
        let keyword = keyword.as_ref();
        let filter = PlatformFilter::from_keyword(keyword);
        if filter.is_none() {
            warn!(filter = %keyword, %context, "Dropping unrecognized platform filter");
        }
        filter
    });
    PlatformCondition::when(filters)
}

/// Maps raw targets of one project into [`TargetDescriptor`]s.
#[derive(Debug, Clone, Copy)]
pub struct TargetMapper<'a> {
    resolver: DependencyResolver<'a>,
}

impl<'a> TargetMapper<'a> {
    /// Create a mapper resolving dependencies through `resolver`.
    #[must_use]
    pub fn new(resolver: DependencyResolver<'a>) -> Self {
        Self { resolver }
    }

    /// Map one raw target.
    ///
    /// # Errors
    ///
    /// Fails when the product type is unknown, when no destination is
    /// recognized, or when a dependency cannot be resolved.
    pub fn map(&self, raw: &RawTarget) -> Result<TargetDescriptor> {
        let project = self.resolver.project_path();

        let product =
            product_for_type(&raw.product_type).ok_or_else(|| Error::UnsupportedProductType {
                target: raw.name.clone(),
                project: project.to_path_buf(),
                product_type: raw.product_type.clone(),
            })?;

        let destinations = self.destinations(raw);
        if destinations.is_empty() {
            return Err(Error::MissingDestinations {
                target: raw.name.clone(),
                project: project.to_path_buf(),
            });
        }

        let dependencies = raw
            .dependencies
            .iter()
            .map(|dependency| {
                Ok(TargetDependency {
                    node: self.resolver.resolve(&dependency.reference)?,
                    condition: platform_condition(&dependency.platform_filters, &raw.name),
                    reference: dependency.reference.clone(),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let sources = raw
            .sources
            .iter()
            .map(|source| paths::absolutize(self.resolver.source_root(), source))
            .collect();

        debug!(
            target = %raw.name,
            project = %project.display(),
            %product,
            dependencies = dependencies.len(),
            "Mapped target"
        );

        Ok(TargetDescriptor {
            name: raw.name.clone(),
            product,
            destinations,
            dependencies,
            sources,
            settings: raw.settings.clone(),
        })
    }

    fn destinations(&self, raw: &RawTarget) -> BTreeSet<Destination> {
        raw.destinations
            .iter()
            .filter_map(|name| {
                let destination = Destination::from_name(name);
                if destination.is_none() {
                    warn!(
                        destination = %name,
                        target = %raw.name,
                        project = %self.resolver.project_path().display(),
                        "Dropping unrecognized destination"
                    );
                }
                destination
            })
            .collect()
    }
}
