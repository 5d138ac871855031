//! Geo-coverage resolution and internal link selection.
//!
//! [`Geo`] is built once from the site config and the static datasets and is
//! read-only afterwards. Every lookup normalises its input, so callers can
//! pass raw URL segments straight through.

pub mod coverage;
pub mod cross;
pub mod index;
pub mod links;
pub mod nearby;
pub mod redirect;
pub mod rep;

#[cfg(test)]
pub(crate) mod fixtures;

pub use coverage::Coverage;
pub use cross::{CrossServiceData, CrossServiceItem, CrossServiceMap, LinkSource, ServiceCard};
pub use index::{AreaPath, GeoIndex, SuburbRef};
pub use links::{RelatedLink, RelatedQuery};
pub use nearby::NearbyPick;
pub use redirect::{Redirect, Redirector};

use areakit_core::data::Datasets;
use areakit_core::paths::Paths;
use areakit_core::slug::{norm_slug, uniq_stable};
use areakit_core::types::{LinkSettings, ServiceDef, SiteConfig};
use std::collections::BTreeMap;

type NeighborTable = BTreeMap<String, Vec<String>>;

#[derive(Debug)]
pub struct Geo {
    index: GeoIndex,
    coverage: Coverage,
    /// canonical cluster → suburb → curated neighbours
    neighbors: BTreeMap<String, NeighborTable>,
    services: Vec<ServiceDef>,
    default_service: String,
    paths: Paths,
    links: LinkSettings,
}

impl Geo {
    pub fn new(config: &SiteConfig, data: &Datasets) -> Self {
        let index = GeoIndex::new(&config.clusters.aliases, data);
        let coverage = Coverage::new(&data.coverage);

        let mut neighbors: BTreeMap<String, NeighborTable> = BTreeMap::new();
        for (cluster, table) in &data.neighbors {
            let canonical = index.resolve_cluster_slug(cluster);
            let target = neighbors.entry(canonical).or_default();
            for (suburb, list) in table {
                let entry = target.entry(norm_slug(suburb)).or_default();
                let merged = uniq_stable(entry.iter().cloned().chain(list.iter().map(|s| norm_slug(s))));
                *entry = merged;
            }
        }

        Geo {
            index,
            coverage,
            neighbors,
            services: config.services.clone(),
            default_service: config.site.default_service.clone(),
            paths: config.paths(),
            links: config.links,
        }
    }

    pub fn index(&self) -> &GeoIndex {
        &self.index
    }

    pub fn coverage(&self) -> &Coverage {
        &self.coverage
    }

    pub fn paths(&self) -> &Paths {
        &self.paths
    }

    pub fn services(&self) -> &[ServiceDef] {
        &self.services
    }

    pub fn default_service(&self) -> &str {
        &self.default_service
    }

    pub fn link_settings(&self) -> LinkSettings {
        self.links
    }

    /// Curated neighbour table entry for a suburb, looked up in its own cluster
    pub fn curated_neighbors(&self, suburb: &str) -> &[String] {
        let slug = norm_slug(suburb);
        self.index
            .cluster_for_suburb(&slug)
            .and_then(|cluster| self.neighbors.get(cluster))
            .and_then(|table| table.get(&slug))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Every curated table, across clusters
    pub fn neighbor_tables(&self) -> impl Iterator<Item = (&str, &NeighborTable)> {
        self.neighbors.iter().map(|(k, v)| (k.as_str(), v))
    }
}
