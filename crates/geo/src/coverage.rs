//! Which suburbs each service is offered in.

use crate::Geo;
use areakit_core::slug::{norm, norm_slug};
use std::collections::{BTreeMap, HashSet};

#[derive(Debug, Default)]
struct ServiceCoverage {
    ordered: Vec<String>,
    set: HashSet<String>,
}

#[derive(Debug, Default)]
pub struct Coverage {
    by_service: BTreeMap<String, ServiceCoverage>,
}

impl Coverage {
    pub fn new(raw: &BTreeMap<String, Vec<String>>) -> Self {
        let by_service = raw
            .iter()
            .map(|(service, suburbs)| {
                let mut set = HashSet::new();
                let ordered = suburbs
                    .iter()
                    .map(|s| norm_slug(s))
                    .filter(|s| !s.is_empty() && set.insert(s.clone()))
                    .collect();
                (norm(service), ServiceCoverage { ordered, set })
            })
            .collect();
        Coverage { by_service }
    }

    /// Covered suburbs in data order; empty for unlisted services
    pub fn covered_suburbs(&self, service: &str) -> &[String] {
        self.by_service
            .get(&norm(service))
            .map(|c| c.ordered.as_slice())
            .unwrap_or(&[])
    }

    /// Strict check: the service must list the suburb
    pub fn is_covered(&self, service: &str, suburb: &str) -> bool {
        self.by_service
            .get(&norm(service))
            .is_some_and(|c| c.set.contains(&norm_slug(suburb)))
    }

    pub fn is_listed(&self, service: &str) -> bool {
        self.by_service.contains_key(&norm(service))
    }

    /// Unlisted services are open everywhere
    pub fn allows(&self, service: &str, suburb: &str) -> bool {
        match self.by_service.get(&norm(service)) {
            Some(c) => c.set.contains(suburb),
            None => true,
        }
    }

    pub fn services(&self) -> impl Iterator<Item = &str> {
        self.by_service.keys().map(String::as_str)
    }
}

impl Geo {
    /// Covered suburbs of a cluster, in cluster order
    pub fn covered_in_cluster(&self, service: &str, cluster: &str) -> Vec<String> {
        self.index
            .list_suburbs_for_cluster(cluster)
            .iter()
            .filter(|s| self.coverage.is_covered(service, s))
            .cloned()
            .collect()
    }

    /// True if the suburb has a page and the service is offered there.
    ///
    /// Services missing from the coverage data are treated as open.
    pub fn is_service_covered(&self, service: &str, suburb: &str) -> bool {
        let suburb = norm_slug(suburb);
        self.index.is_known_suburb(&suburb) && self.coverage.allows(service, &suburb)
    }
}
