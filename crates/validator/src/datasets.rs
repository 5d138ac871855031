use crate::ValidationReport;
use areakit_core::data::Datasets;
use areakit_core::types::SiteConfig;
use areakit_geo::Geo;
use std::collections::HashSet;

fn is_slug_key(s: &str) -> bool {
    !s.is_empty()
        && s
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_')
}

/// Check the static datasets against each other and the site config.
///
/// Errors break page generation or produce dead links; warnings are data
/// that will be ignored.
pub fn validate_datasets(config: &SiteConfig, data: &Datasets) -> ValidationReport {
    let mut report = ValidationReport::default();
    let geo = Geo::new(config, data);
    let index = geo.index();

    let canonical: HashSet<&str> = config.clusters.canonical.iter().map(String::as_str).collect();
    let clustered: HashSet<&str> = index
        .clusters()
        .flat_map(|c| index.list_suburbs_for_cluster(c).iter().map(String::as_str))
        .collect();

    // aliases
    for (alias, target) in &config.clusters.aliases {
        if !is_slug_key(alias) {
            report.error(format!("alias '{}' is not a lowercase slug", alias));
        }
        if alias == target {
            report.error(format!("alias '{}' maps to itself", alias));
        }
        if canonical.contains(alias.as_str()) {
            report.error(format!("alias '{}' is also a canonical cluster", alias));
        }
        if !canonical.is_empty() && !canonical.contains(target.as_str()) {
            report.error(format!(
                "alias '{}' maps to '{}', which is not a canonical cluster",
                alias, target
            ));
        }
    }

    // clusters
    for cluster in &config.clusters.canonical {
        if !index.is_known_cluster(cluster) {
            report.error(format!("canonical cluster '{}' has no suburbs in the data", cluster));
        }
    }
    if !canonical.is_empty() {
        for cluster in index.clusters() {
            if !canonical.contains(cluster) {
                report.warn(format!("cluster '{}' in the data is not listed as canonical", cluster));
            }
        }
    }

    // coverage
    for service in geo.coverage().services() {
        if config.service(service).is_none() {
            report.warn(format!("coverage lists unconfigured service '{}'", service));
        }
        for suburb in geo.coverage().covered_suburbs(service) {
            if !clustered.contains(suburb.as_str()) {
                report.error(format!(
                    "{} covers '{}', which is not in any cluster",
                    service, suburb
                ));
            }
        }
    }
    for service in &config.services {
        if !geo.coverage().is_listed(&service.slug) {
            report.note(format!("{} has no coverage list and is offered everywhere", service.slug));
        }
    }

    // curated neighbours
    for (cluster, table) in geo.neighbor_tables() {
        for (suburb, neighbours) in table {
            if !index.is_known_suburb(suburb) {
                report.warn(format!("neighbour table '{}' lists unknown suburb '{}'", cluster, suburb));
            }
            for n in neighbours {
                if !index.is_known_suburb(n) {
                    report.warn(format!("neighbour '{}' of '{}' is not a known suburb", n, suburb));
                }
            }
        }
    }

    report.note(format!(
        "{} clusters, {} suburbs, {} services",
        index.all_clusters().len(),
        index.known_suburbs().len(),
        config.services.len()
    ));
    tracing::debug!(
        errors = report.errors.len(),
        warnings = report.warnings.len(),
        "datasets validated"
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use areakit_core::config::parse_site_toml_str;
    use areakit_core::data::{normalize_clusters, normalize_coverage};
    use serde_json::json;

    const SITE_TOML: &str = r#"
[site]
origin = "https://example.com.au"

[business]
name = "Sparkle Co"
phone = "0400000000"
email = "hi@example.com.au"

[[service]]
slug = "bond-cleaning"
label = "Bond Cleaning"

[clusters]
canonical = ["ipswich", "logan"]

[clusters.aliases]
"ipswich-region" = "ipswich"
"#;

    fn data(coverage: serde_json::Value) -> Datasets {
        Datasets {
            clusters: normalize_clusters(&json!([
                { "slug": "ipswich-region", "suburbs": ["Ipswich", "Goodna"] },
                { "slug": "logan", "suburbs": ["Springwood"] }
            ])),
            coverage: normalize_coverage(serde_json::from_value(coverage).unwrap()),
            ..Default::default()
        }
    }

    #[test]
    fn test_clean_data_passes() {
        let config = parse_site_toml_str(SITE_TOML).unwrap();
        let report = validate_datasets(&config, &data(json!({ "bond-cleaning": ["goodna", "springwood"] })));
        assert!(report.is_ok(), "{:?}", report.errors);
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn test_covered_suburb_outside_clusters() {
        let config = parse_site_toml_str(SITE_TOML).unwrap();
        let report = validate_datasets(&config, &data(json!({ "bond-cleaning": ["goodna", "atlantis"] })));
        assert!(!report.is_ok());
        assert!(report.errors[0].contains("atlantis"));
    }

    #[test]
    fn test_unconfigured_coverage_service_warns() {
        let config = parse_site_toml_str(SITE_TOML).unwrap();
        let report = validate_datasets(&config, &data(json!({ "oven-cleaning": ["goodna"] })));
        assert!(report.is_ok());
        assert!(report.warnings.iter().any(|w| w.contains("oven-cleaning")));
        assert!(report.info.iter().any(|i| i.contains("offered everywhere")));
    }

    #[test]
    fn test_alias_invariants() {
        let mut config = parse_site_toml_str(SITE_TOML).unwrap();
        config.clusters.aliases.insert("logan".into(), "ipswich".into());
        config.clusters.aliases.insert("brisbane-west".into(), "brisbane".into());
        config.clusters.aliases.insert("Bad Key".into(), "ipswich".into());
        let report = validate_datasets(&config, &data(json!({})));
        let joined = report.errors.join("\n");
        assert!(joined.contains("'logan' is also a canonical cluster"));
        assert!(joined.contains("'brisbane', which is not a canonical cluster"));
        assert!(joined.contains("'Bad Key' is not a lowercase slug"));
    }

    #[test]
    fn test_missing_canonical_cluster() {
        let mut config = parse_site_toml_str(SITE_TOML).unwrap();
        config.clusters.canonical.push("brisbane".into());
        let report = validate_datasets(&config, &data(json!({})));
        assert!(report.errors.iter().any(|e| e.contains("'brisbane' has no suburbs")));
    }

    #[test]
    fn test_unknown_curated_neighbours_warn() {
        let config = parse_site_toml_str(SITE_TOML).unwrap();
        let mut d = data(json!({}));
        d.neighbors = serde_json::from_value(json!({ "ipswich": { "goodna": ["ipswich", "nowhere"] } })).unwrap();
        let report = validate_datasets(&config, &d);
        assert!(report.is_ok());
        assert_eq!(report.warnings.len(), 1);
        assert!(report.warnings[0].contains("nowhere"));
    }
}
