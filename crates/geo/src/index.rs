//! Cluster and suburb lookup tables.
//!
//! Clusters are keyed by canonical slug: aliases in the source data are
//! resolved at load time and suburbs are stored in slug form, in the order
//! they appear in the data. The suburb → cluster map is built lazily on first
//! use and shared for the life of the index.

use areakit_core::data::{Datasets, SuburbRecord};
use areakit_core::slug::{norm, norm_slug, slugify, uniq_stable, unslug_to_name};
use serde::Serialize;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::OnceLock;

/// A known suburb and the canonical cluster it belongs to
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SuburbRef {
    pub slug: String,
    pub cluster: String,
}

/// `(cluster, suburb)` pair for area pages
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub struct AreaPath {
    pub cluster: String,
    pub suburb: String,
}

#[derive(Debug)]
pub struct GeoIndex {
    aliases: BTreeMap<String, String>,
    /// canonical cluster → suburb slugs (dataset order, de-duplicated)
    clusters: Vec<(String, Vec<String>)>,
    /// Adjacency embedded in the cluster table, merged across clusters
    embedded_adjacency: HashMap<String, Vec<String>>,
    /// `adjacency.json`, preferred over the embedded table
    adjacency: HashMap<String, Vec<String>>,
    /// `cluster_map.json` as loaded (suburb → cluster, normalised)
    explicit_cluster_map: Vec<(String, String)>,
    cluster_map: OnceLock<HashMap<String, String>>,
    known: HashSet<String>,
    display: HashMap<String, String>,
    records: HashMap<String, SuburbRecord>,
}

impl GeoIndex {
    pub fn new(aliases: &BTreeMap<String, String>, data: &Datasets) -> Self {
        let aliases: BTreeMap<String, String> = aliases
            .iter()
            .map(|(alias, canonical)| (norm(alias), norm(canonical)))
            .collect();

        let mut clusters: Vec<(String, Vec<String>)> = Vec::new();
        let mut embedded_adjacency: HashMap<String, Vec<String>> = HashMap::new();
        let mut display = HashMap::new();

        for entry in &data.clusters {
            let canonical = resolve_with(&aliases, &entry.slug);
            if canonical.is_empty() {
                continue;
            }
            let suburbs: Vec<String> = entry
                .suburbs
                .iter()
                .filter_map(|raw| {
                    let slug = slugify(raw);
                    if slug.is_empty() {
                        return None;
                    }
                    if raw.trim() != slug {
                        display.entry(slug.clone()).or_insert_with(|| raw.trim().to_string());
                    }
                    Some(slug)
                })
                .collect();

            match clusters.iter_mut().find(|(slug, _)| *slug == canonical) {
                Some((_, existing)) => {
                    let merged = uniq_stable(existing.iter().cloned().chain(suburbs));
                    *existing = merged;
                }
                None => clusters.push((canonical, uniq_stable(suburbs))),
            }

            for (suburb, neighbours) in &entry.adjacency {
                let list = embedded_adjacency.entry(slugify(suburb)).or_default();
                let merged = uniq_stable(list.iter().cloned().chain(neighbours.iter().map(|n| slugify(n))));
                *list = merged;
            }
        }

        let adjacency = data
            .adjacency
            .as_ref()
            .map(|table| {
                table
                    .iter()
                    .map(|(suburb, entry)| {
                        let list = uniq_stable(entry.adjacent_suburbs.iter().map(|s| norm_slug(s)));
                        (norm_slug(suburb), list)
                    })
                    .collect()
            })
            .unwrap_or_default();

        let explicit_cluster_map: Vec<(String, String)> = data
            .cluster_map
            .as_ref()
            .map(|map| {
                map.iter()
                    .map(|(suburb, cluster)| (norm_slug(suburb), resolve_with(&aliases, cluster)))
                    .filter(|(suburb, cluster)| !suburb.is_empty() && !cluster.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        let mut records = HashMap::new();
        for record in &data.suburbs {
            let slug = record.slug();
            if slug.is_empty() {
                continue;
            }
            display.insert(slug.clone(), record.name.trim().to_string());
            records.entry(slug).or_insert_with(|| record.clone());
        }

        let mut known: HashSet<String> = records.keys().cloned().collect();
        for (_, suburbs) in &clusters {
            known.extend(suburbs.iter().cloned());
        }
        for (suburb, _) in &explicit_cluster_map {
            known.insert(suburb.clone());
        }

        GeoIndex {
            aliases,
            clusters,
            embedded_adjacency,
            adjacency,
            explicit_cluster_map,
            cluster_map: OnceLock::new(),
            known,
            display,
            records,
        }
    }

    /// Alias → canonical cluster. Unknown input is returned normalised.
    pub fn resolve_cluster_slug(&self, input: &str) -> String {
        resolve_with(&self.aliases, input)
    }

    pub fn aliases(&self) -> &BTreeMap<String, String> {
        &self.aliases
    }

    pub fn is_known_cluster(&self, cluster: &str) -> bool {
        let canonical = self.resolve_cluster_slug(cluster);
        self.clusters.iter().any(|(slug, _)| *slug == canonical)
    }

    /// Suburb slugs of a cluster (alias-aware); empty for unknown clusters
    pub fn list_suburbs_for_cluster(&self, cluster: &str) -> &[String] {
        let canonical = self.resolve_cluster_slug(cluster);
        self.clusters
            .iter()
            .find(|(slug, _)| *slug == canonical)
            .map(|(_, suburbs)| suburbs.as_slice())
            .unwrap_or(&[])
    }

    /// Suburb → cluster, memoised on first call.
    ///
    /// Entries from `cluster_map.json` win over the inverted cluster table.
    /// A suburb listed under several clusters maps to the first one.
    pub fn cluster_map(&self) -> &HashMap<String, String> {
        self.cluster_map.get_or_init(|| {
            let mut map = HashMap::new();
            for (cluster, suburbs) in &self.clusters {
                for suburb in suburbs {
                    map.entry(suburb.clone()).or_insert_with(|| cluster.clone());
                }
            }
            for (suburb, cluster) in &self.explicit_cluster_map {
                map.insert(suburb.clone(), cluster.clone());
            }
            tracing::debug!(entries = map.len(), "suburb → cluster map built");
            map
        })
    }

    pub fn cluster_for_suburb(&self, suburb: &str) -> Option<&str> {
        let slug = norm_slug(suburb);
        if slug.is_empty() {
            return None;
        }
        self.cluster_map().get(&slug).map(String::as_str)
    }

    pub fn find_suburb_by_slug(&self, suburb: &str) -> Option<SuburbRef> {
        let slug = norm_slug(suburb);
        let cluster = self.cluster_map().get(&slug)?;
        Some(SuburbRef {
            slug,
            cluster: cluster.clone(),
        })
    }

    pub fn is_same_cluster(&self, a: &str, b: &str) -> bool {
        match (self.cluster_for_suburb(a), self.cluster_for_suburb(b)) {
            (Some(x), Some(y)) => x == y,
            _ => false,
        }
    }

    /// Union of `suburbs.json`, the cluster tables and `cluster_map.json`
    pub fn is_known_suburb(&self, suburb: &str) -> bool {
        self.known.contains(&norm_slug(suburb))
    }

    pub fn known_suburbs(&self) -> Vec<&str> {
        let mut all: Vec<&str> = self.known.iter().map(String::as_str).collect();
        all.sort_unstable();
        all
    }

    pub fn display_name(&self, suburb: &str) -> String {
        let slug = norm_slug(suburb);
        self.display
            .get(&slug)
            .cloned()
            .unwrap_or_else(|| unslug_to_name(&slug))
    }

    pub fn suburb_record(&self, suburb: &str) -> Option<&SuburbRecord> {
        self.records.get(&norm_slug(suburb))
    }

    /// Canonical cluster slugs in dataset order
    pub fn clusters(&self) -> impl Iterator<Item = &str> {
        self.clusters.iter().map(|(slug, _)| slug.as_str())
    }

    /// Canonical cluster slugs, sorted and de-duplicated
    pub fn all_clusters(&self) -> Vec<String> {
        let mut all: Vec<String> = self.clusters.iter().map(|(slug, _)| slug.clone()).collect();
        all.sort();
        all.dedup();
        all
    }

    /// Every `(cluster, suburb)` pair, sorted
    pub fn area_suburb_paths(&self) -> Vec<AreaPath> {
        let mut out = Vec::new();
        for cluster in self.all_clusters() {
            let mut suburbs = self.list_suburbs_for_cluster(&cluster).to_vec();
            suburbs.sort();
            suburbs.dedup();
            out.extend(suburbs.into_iter().map(|suburb| AreaPath {
                cluster: cluster.clone(),
                suburb,
            }));
        }
        out
    }

    /// Adjacent suburbs: `adjacency.json` first, then the cluster's own table
    pub fn adjacency_of(&self, suburb: &str) -> &[String] {
        let slug = norm_slug(suburb);
        match self.adjacency.get(&slug) {
            Some(list) if !list.is_empty() => list,
            _ => self
                .embedded_adjacency
                .get(&slug)
                .map(Vec::as_slice)
                .unwrap_or(&[]),
        }
    }
}

fn resolve_with(aliases: &BTreeMap<String, String>, input: &str) -> String {
    let s = norm(input);
    aliases.get(&s).cloned().unwrap_or(s)
}
