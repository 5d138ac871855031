//! Static JSON datasets.
//!
//! Everything here is read once at startup and never mutated. Several files
//! are accepted in more than one historical shape; the loaders normalise them
//! into the structures below so the lookup layer only sees one form.

use crate::error::{Error, Result};
use crate::slug::slugify;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

pub const CLUSTERS_FILE: &str = "areas.clusters.json";
pub const COVERAGE_FILE: &str = "serviceCoverage.json";
pub const SUBURBS_FILE: &str = "suburbs.json";
pub const CLUSTER_MAP_FILE: &str = "cluster_map.json";
pub const ADJACENCY_FILE: &str = "adjacency.json";
pub const FAQ_FILE: &str = "faq.json";
pub const SEED_REVIEWS_FILE: &str = "reviews.seed.json";
pub const LIVE_REVIEWS_FILE: &str = "reviews.live.json";
pub const RECEIPTS_FILE: &str = "review-receipts.json";

/// File name of the curated neighbour table for a cluster
pub fn neighbors_file(cluster: &str) -> String {
    format!("geo.neighbors.{}.json", cluster)
}

/// One cluster as it appears in the source data (suburbs as written)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClusterEntry {
    pub slug: String,
    pub suburbs: Vec<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub adjacency: BTreeMap<String, Vec<String>>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SuburbRecord {
    #[serde(default)]
    pub slug: Option<String>,
    pub name: String,
    #[serde(default)]
    pub postcode: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default, alias = "area")]
    pub cluster: Option<String>,
}

impl SuburbRecord {
    /// Explicit slug when present, else derived from the name
    pub fn slug(&self) -> String {
        match &self.slug {
            Some(slug) if !slug.trim().is_empty() => slug.trim().to_lowercase(),
            _ => slugify(&self.name),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AdjacencyEntry {
    #[serde(default)]
    pub adjacent_suburbs: Vec<String>,
    #[serde(default)]
    pub nearest_nonsiblings: Vec<String>,
    #[serde(default)]
    pub derived: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FaqItem {
    pub question: String,
    pub answer: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FaqData {
    #[serde(default)]
    pub templates: Vec<FaqItem>,
    /// Keyed by suburb display name or slug
    #[serde(default)]
    pub overrides: BTreeMap<String, Vec<FaqItem>>,
    #[serde(default)]
    pub facts: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Review {
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub body: Option<String>,
    #[serde(default)]
    pub stars: Option<f64>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default, rename = "receiptId")]
    pub receipt_id: Option<String>,
    /// Internal fields (emails, job ids) never leave the loader
    #[serde(default, flatten, skip_serializing)]
    pub extra: BTreeMap<String, Value>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Receipt {
    #[serde(default)]
    pub channel: Option<String>,
    #[serde(default, rename = "sentAt")]
    pub sent_at: Option<String>,
    #[serde(default)]
    pub suburb: Option<String>,
    #[serde(default)]
    pub service: Option<String>,
}

/// Raw review sources, keyed `service:suburb` exactly as written on disk
#[derive(Debug, Clone, Default)]
pub struct ReviewSources {
    pub seed: BTreeMap<String, Vec<Review>>,
    pub live: BTreeMap<String, Vec<Review>>,
    pub receipts: BTreeMap<String, Receipt>,
}

/// All static data the site is generated from
#[derive(Debug, Clone, Default)]
pub struct Datasets {
    pub clusters: Vec<ClusterEntry>,
    /// service → covered suburb slugs, in file order
    pub coverage: BTreeMap<String, Vec<String>>,
    pub suburbs: Vec<SuburbRecord>,
    pub cluster_map: Option<BTreeMap<String, String>>,
    pub adjacency: Option<BTreeMap<String, AdjacencyEntry>>,
    /// cluster → suburb → curated neighbours
    pub neighbors: BTreeMap<String, BTreeMap<String, Vec<String>>>,
    pub faq: FaqData,
    pub reviews: ReviewSources,
}

impl Datasets {
    /// Load every dataset from a data directory.
    ///
    /// `areas.clusters.json` and `serviceCoverage.json` are required; the
    /// rest are optional. `neighbor_clusters` names the clusters whose
    /// `geo.neighbors.<cluster>.json` tables should be picked up in addition
    /// to the clusters found in the data itself.
    pub fn load(dir: &Path, neighbor_clusters: &[String]) -> Result<Self> {
        let clusters_path = dir.join(CLUSTERS_FILE);
        if !clusters_path.exists() {
            return Err(Error::NotFound(format!("{}", clusters_path.display())));
        }
        let clusters = normalize_clusters(&read_json::<Value>(&clusters_path)?);

        let coverage_path = dir.join(COVERAGE_FILE);
        if !coverage_path.exists() {
            return Err(Error::NotFound(format!("{}", coverage_path.display())));
        }
        let coverage = normalize_coverage(read_json(&coverage_path)?);

        let suburbs = read_optional(&dir.join(SUBURBS_FILE))?.unwrap_or_default();
        let cluster_map = read_optional(&dir.join(CLUSTER_MAP_FILE))?;
        let adjacency = read_optional(&dir.join(ADJACENCY_FILE))?;
        let faq = read_optional(&dir.join(FAQ_FILE))?.unwrap_or_default();

        let mut names: Vec<String> = clusters.iter().map(|c| c.slug.clone()).collect();
        names.extend(neighbor_clusters.iter().cloned());
        names.sort();
        names.dedup();

        let mut neighbors = BTreeMap::new();
        for name in names {
            if let Some(table) = read_optional(&dir.join(neighbors_file(&name)))? {
                neighbors.insert(name, table);
            }
        }

        let reviews = ReviewSources {
            seed: read_optional(&dir.join(SEED_REVIEWS_FILE))?.unwrap_or_default(),
            live: read_optional(&dir.join(LIVE_REVIEWS_FILE))?.unwrap_or_default(),
            receipts: read_optional(&dir.join(RECEIPTS_FILE))?.unwrap_or_default(),
        };

        tracing::debug!(
            clusters = clusters.len(),
            services = coverage.len(),
            neighbor_tables = neighbors.len(),
            "datasets loaded from {}",
            dir.display()
        );

        Ok(Datasets {
            clusters,
            coverage,
            suburbs,
            cluster_map,
            adjacency,
            neighbors,
            faq,
            reviews,
        })
    }
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let content = fs::read_to_string(path)?;
    serde_json::from_str(&content).map_err(|source| Error::Json {
        path: PathBuf::from(path),
        source,
    })
}

fn read_optional<T: serde::de::DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    if !path.exists() {
        return Ok(None);
    }
    read_json(path).map(Some)
}

fn entry_slug(value: &Value) -> Option<String> {
    ["slug", "name"]
        .iter()
        .filter_map(|key| value.get(*key).and_then(Value::as_str))
        .map(|s| s.trim().to_string())
        .find(|s| !s.is_empty())
}

fn string_list(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|v| match v {
                    Value::String(s) => Some(s.clone()),
                    Value::Null => None,
                    other => Some(other.to_string()),
                })
                .collect()
        })
        .unwrap_or_default()
}

fn adjacency_table(value: Option<&Value>) -> BTreeMap<String, Vec<String>> {
    value
        .and_then(Value::as_object)
        .map(|obj| {
            obj.iter()
                .map(|(k, v)| (k.clone(), string_list(Some(v))))
                .collect()
        })
        .unwrap_or_default()
}

fn cluster_from(slug: String, value: &Value) -> ClusterEntry {
    ClusterEntry {
        slug,
        suburbs: string_list(value.get("suburbs")),
        adjacency: adjacency_table(value.get("adjacency")),
    }
}

/// Normalise cluster data from any of the accepted shapes:
///
/// - `{ "clusters": { "<slug>": { "suburbs": [..], "adjacency": {..} } } }`
/// - `{ "clusters": [ { "slug": .., "suburbs": [..] } ] }`
/// - `[ { "slug": .., "suburbs": [..] } ]`
pub fn normalize_clusters(raw: &Value) -> Vec<ClusterEntry> {
    match raw {
        Value::Array(items) => items
            .iter()
            .filter_map(|item| {
                let slug = entry_slug(item);
                if slug.is_none() {
                    tracing::warn!("skipping cluster entry without slug or name");
                }
                slug.map(|slug| cluster_from(slug, item))
            })
            .collect(),
        Value::Object(obj) => match obj.get("clusters") {
            Some(arr @ Value::Array(_)) => normalize_clusters(arr),
            Some(Value::Object(map)) => map
                .iter()
                .map(|(key, v)| {
                    let slug = entry_slug(v).unwrap_or_else(|| key.clone());
                    cluster_from(slug, v)
                })
                .collect(),
            _ => Vec::new(),
        },
        _ => Vec::new(),
    }
}

/// Coverage per service: either a suburb list or a `{ suburb: bool }` map
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum CoverageShape {
    List(Vec<String>),
    Flags(BTreeMap<String, bool>),
}

pub fn normalize_coverage(raw: BTreeMap<String, CoverageShape>) -> BTreeMap<String, Vec<String>> {
    raw.into_iter()
        .map(|(service, shape)| {
            let suburbs = match shape {
                CoverageShape::List(list) => list,
                CoverageShape::Flags(flags) => flags
                    .into_iter()
                    .filter(|(_, on)| *on)
                    .map(|(suburb, _)| suburb)
                    .collect(),
            };
            let suburbs = suburbs.iter().map(|s| s.trim().to_lowercase()).collect();
            (service.to_lowercase(), suburbs)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_normalize_clusters_object_map() {
        let raw = json!({
            "clusters": {
                "ipswich": { "suburbs": ["Ipswich", "Goodna"], "adjacency": { "ipswich": ["goodna"] } },
                "brisbane": { "slug": "brisbane-west", "suburbs": ["Oxley"] }
            }
        });
        let clusters = normalize_clusters(&raw);
        assert_eq!(clusters.len(), 2);
        let brisbane = clusters.iter().find(|c| c.suburbs == vec!["Oxley"]).unwrap();
        assert_eq!(brisbane.slug, "brisbane-west");
        let ipswich = clusters.iter().find(|c| c.slug == "ipswich").unwrap();
        assert_eq!(ipswich.adjacency["ipswich"], vec!["goodna"]);
    }

    #[test]
    fn test_normalize_clusters_array_shapes() {
        let nested = json!({ "clusters": [{ "slug": "logan", "suburbs": ["Springwood"] }] });
        let bare = json!([{ "name": "logan", "suburbs": ["Springwood"] }, { "suburbs": ["Nowhere"] }]);
        assert_eq!(normalize_clusters(&nested), normalize_clusters(&bare));
        assert_eq!(normalize_clusters(&bare).len(), 1);
    }

    #[test]
    fn test_normalize_clusters_unknown_shape() {
        assert!(normalize_clusters(&json!("nope")).is_empty());
        assert!(normalize_clusters(&json!({ "regions": [] })).is_empty());
    }

    #[test]
    fn test_normalize_coverage_shapes() {
        let raw: BTreeMap<String, CoverageShape> = serde_json::from_value(json!({
            "Spring-Cleaning": ["A", " y "],
            "bathroom-deep-clean": { "b": true, "c": false }
        }))
        .unwrap();
        let coverage = normalize_coverage(raw);
        assert_eq!(coverage["spring-cleaning"], vec!["a", "y"]);
        assert_eq!(coverage["bathroom-deep-clean"], vec!["b"]);
    }

    #[test]
    fn test_suburb_record_slug() {
        let explicit = SuburbRecord {
            slug: Some("Redbank-Plains".into()),
            name: "Redbank Plains".into(),
            ..Default::default()
        };
        let derived = SuburbRecord {
            name: "Springfield Lakes".into(),
            ..Default::default()
        };
        assert_eq!(explicit.slug(), "redbank-plains");
        assert_eq!(derived.slug(), "springfield-lakes");
    }

    #[test]
    fn test_load_requires_clusters_file() {
        let dir = TempDir::new().unwrap();
        let err = Datasets::load(dir.path(), &[]).unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[test]
    fn test_load_reports_malformed_file() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join(CLUSTERS_FILE), "{ not json").unwrap();
        let err = Datasets::load(dir.path(), &[]).unwrap_err();
        assert!(err.to_string().contains(CLUSTERS_FILE));
    }

    #[test]
    fn test_load_full_directory() {
        let dir = TempDir::new().unwrap();
        let write = |name: &str, value: serde_json::Value| {
            fs::write(dir.path().join(name), value.to_string()).unwrap();
        };
        write(
            CLUSTERS_FILE,
            json!({ "clusters": [{ "slug": "ipswich-region", "suburbs": ["Redbank Plains", "Goodna"] }] }),
        );
        write(COVERAGE_FILE, json!({ "bond-cleaning": ["redbank-plains"] }));
        write(SUBURBS_FILE, json!([{ "name": "Redbank Plains", "postcode": "4301" }]));
        write(&neighbors_file("ipswich"), json!({ "redbank-plains": ["goodna"] }));
        write(
            SEED_REVIEWS_FILE,
            json!({ "bond-cleaning:Redbank Plains": [{ "author": "Sam", "stars": 5, "email": "sam@x.com" }] }),
        );

        let data = Datasets::load(dir.path(), &["ipswich".to_string()]).unwrap();
        assert_eq!(data.clusters.len(), 1);
        assert_eq!(data.coverage["bond-cleaning"], vec!["redbank-plains"]);
        assert_eq!(data.suburbs[0].postcode.as_deref(), Some("4301"));
        assert!(data.cluster_map.is_none());
        assert!(data.adjacency.is_none());
        assert_eq!(data.neighbors["ipswich"]["redbank-plains"], vec!["goodna"]);
        let review = &data.reviews.seed["bond-cleaning:Redbank Plains"][0];
        assert_eq!(review.stars, Some(5.0));
        assert!(review.extra.contains_key("email"));
    }
}
