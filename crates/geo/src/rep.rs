use crate::Geo;

impl Geo {
    /// Representative suburb for a cluster (hub pages, blog cluster landings).
    ///
    /// When `service` covers any suburb of the cluster only those are
    /// considered. The best-connected suburb wins; ties and clusters without
    /// adjacency fall back to alphabetical order.
    pub fn rep_suburb(&self, cluster: &str, service: Option<&str>) -> Option<String> {
        let suburbs = self.index.list_suburbs_for_cluster(cluster);

        let covered: Vec<&String> = match service {
            Some(service) => suburbs
                .iter()
                .filter(|s| self.coverage.is_covered(service, s))
                .collect(),
            None => Vec::new(),
        };
        let candidates: Vec<&String> = if covered.is_empty() {
            suburbs.iter().collect()
        } else {
            covered
        };

        let degree = |s: &str| self.index.adjacency_of(s).len();
        candidates
            .into_iter()
            .min_by(|a, b| degree(b.as_str()).cmp(&degree(a.as_str())).then_with(|| a.cmp(b)))
            .cloned()
    }
}

#[cfg(test)]
mod tests {
    use crate::Geo;
    use crate::fixtures;
    use areakit_core::data::{Datasets, normalize_clusters, normalize_coverage};
    use serde_json::json;

    fn geo(clusters: serde_json::Value) -> Geo {
        let data = Datasets {
            clusters: normalize_clusters(&clusters),
            coverage: normalize_coverage(
                serde_json::from_value(json!({ "spring-cleaning": ["y"] })).unwrap(),
            ),
            ..Default::default()
        };
        Geo::new(&fixtures::config(), &data)
    }

    fn with_adjacency() -> Geo {
        geo(json!([
            { "slug": "ipswich", "suburbs": ["ipswich", "a", "b"], "adjacency": { "ipswich": ["a", "b"], "a": ["ipswich"] } },
            { "slug": "brisbane", "suburbs": ["x", "y"] }
        ]))
    }

    #[test]
    fn test_prefers_highest_adjacency_degree() {
        assert_eq!(with_adjacency().rep_suburb("ipswich", None).as_deref(), Some("ipswich"));
    }

    #[test]
    fn test_prefers_covered_suburb_for_service() {
        assert_eq!(
            with_adjacency().rep_suburb("brisbane", Some("spring-cleaning")).as_deref(),
            Some("y")
        );
    }

    #[test]
    fn test_uncovered_service_falls_back_to_degree() {
        assert_eq!(
            with_adjacency().rep_suburb("ipswich", Some("non-existent")).as_deref(),
            Some("ipswich")
        );
    }

    #[test]
    fn test_alphabetical_without_adjacency() {
        let geo = geo(json!([{ "slug": "logan", "suburbs": ["Springwood", "Beenleigh", "Loganholme"] }]));
        assert_eq!(geo.rep_suburb("logan", None).as_deref(), Some("beenleigh"));
    }

    #[test]
    fn test_alias_and_unknown_cluster() {
        let geo = fixtures::geo();
        assert_eq!(
            geo.rep_suburb("ipswich-region", None),
            geo.rep_suburb("ipswich", None)
        );
        assert_eq!(geo.rep_suburb("ipswich", None).as_deref(), Some("ipswich"));
        assert!(geo.rep_suburb("atlantis", None).is_none());
    }
}
