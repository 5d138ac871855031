//! Nearest covered suburb when a service is not offered where the visitor is.

use crate::Geo;
use areakit_core::slug::{norm, norm_slug};
use serde::Serialize;
use std::collections::HashSet;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NearbyPick {
    pub suburb: String,
    /// False when the service is offered in the requested suburb itself
    pub nearby: bool,
}

impl Geo {
    /// Covered suburbs closest to `suburb`, nearest first.
    ///
    /// Candidates come from the suburb's adjacency, then its cluster's curated
    /// neighbour table, then the rest of its cluster, then anywhere the
    /// service is offered. Only strictly covered suburbs are returned and the
    /// suburb itself never is.
    pub fn nearby_covered(&self, service: &str, suburb: &str, limit: usize) -> Vec<String> {
        let service = norm(service);
        let suburb = norm_slug(suburb);
        if limit == 0 || !self.coverage.is_listed(&service) {
            return Vec::new();
        }

        let cluster_list = self
            .index
            .cluster_for_suburb(&suburb)
            .map(|cluster| self.index.list_suburbs_for_cluster(cluster))
            .unwrap_or(&[]);

        let tiers = self
            .index
            .adjacency_of(&suburb)
            .iter()
            .chain(self.curated_neighbors(&suburb))
            .chain(cluster_list)
            .chain(self.coverage.covered_suburbs(&service));

        let mut seen = HashSet::new();
        let picks: Vec<String> = tiers
            .filter(|candidate| **candidate != suburb)
            .filter(|candidate| self.coverage.is_covered(&service, candidate))
            .filter(|candidate| seen.insert(*candidate))
            .take(limit)
            .cloned()
            .collect();

        tracing::debug!(%service, %suburb, ?picks, "nearby covered suburbs");
        picks
    }

    /// The suburb itself when covered, else its nearest covered neighbour
    pub fn nearby_covered_single(&self, suburb: &str, service: &str) -> Option<NearbyPick> {
        let slug = norm_slug(suburb);
        if self.coverage.is_covered(service, &slug) {
            return Some(NearbyPick {
                suburb: slug,
                nearby: false,
            });
        }
        self.nearby_covered(service, &slug, 1)
            .into_iter()
            .next()
            .map(|suburb| NearbyPick {
                suburb,
                nearby: true,
            })
    }
}
