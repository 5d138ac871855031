//! Shared test data shaped like the production Ipswich / Brisbane / Logan set.

use crate::Geo;
use areakit_core::config::parse_site_toml_str;
use areakit_core::data::{Datasets, normalize_clusters, normalize_coverage};
use areakit_core::types::SiteConfig;
use serde_json::json;
use std::collections::BTreeMap;

pub const SITE_TOML: &str = r##"
[site]
origin = "https://onendonebondclean.com.au"

[business]
name = "One N Done Bond Clean"
tagline = "Bond Cleaning Experts"
phone = "+61405779420"
email = "info@onendonebondclean.com.au"

[[service]]
slug = "bond-cleaning"
label = "Bond Cleaning"
synonyms = ["bond-cleaners", "end-of-lease-cleaning", "end-of-lease-cleaners"]
cross_link = false

[[service]]
slug = "spring-cleaning"
label = "Spring Cleaning"
synonyms = ["house-cleaning"]

[[service]]
slug = "bathroom-deep-clean"
label = "Bathroom Deep Clean"
synonyms = ["shower-screen-restoration"]

[clusters]
canonical = ["ipswich", "brisbane", "logan"]

[clusters.aliases]
"ipswich-region" = "ipswich"
"brisbane-west" = "brisbane"
"brisbane_west" = "brisbane"
"##;

pub fn config() -> SiteConfig {
    parse_site_toml_str(SITE_TOML).expect("fixture config parses")
}

pub fn aliases() -> BTreeMap<String, String> {
    config().clusters.aliases
}

pub fn datasets() -> Datasets {
    let clusters = normalize_clusters(&json!({
        "clusters": [
            {
                "slug": "ipswich-region",
                "suburbs": ["Ipswich", "Redbank Plains", "Springfield Lakes", "Goodna", "Forest Lake"],
                "adjacency": { "redbank-plains": ["goodna"] }
            },
            {
                "slug": "brisbane-west",
                "suburbs": ["Indooroopilly", "Kenmore", "Oxley", "Ashgrove", "mt-gravatt"]
            },
            { "slug": "logan", "suburbs": ["Loganholme", "Springwood", "Beenleigh"] }
        ]
    }));

    let coverage = normalize_coverage(
        serde_json::from_value(json!({
            "bond-cleaning": [
                "ipswich", "redbank-plains", "springfield-lakes", "goodna", "forest-lake",
                "indooroopilly", "kenmore", "oxley", "ashgrove", "loganholme", "springwood"
            ],
            "spring-cleaning": ["redbank-plains", "goodna", "kenmore", "indooroopilly", "oxley"],
            "bathroom-deep-clean": { "redbank-plains": true, "springfield-lakes": true, "springwood": true, "goodna": false }
        }))
        .expect("fixture coverage parses"),
    );

    let suburbs = serde_json::from_value(json!([
        { "name": "Redbank Plains", "postcode": "4301", "state": "QLD" },
        { "name": "Indooroopilly", "postcode": "4068", "state": "QLD" }
    ]))
    .expect("fixture suburbs parse");

    let adjacency = serde_json::from_value(json!({
        "ipswich": { "adjacent_suburbs": ["redbank-plains", "goodna"] }
    }))
    .expect("fixture adjacency parses");

    let neighbors = serde_json::from_value(json!({
        "ipswich": { "redbank-plains": ["springfield-lakes", "goodna"] },
        "brisbane": { "oxley": ["sherwood", "corinda"] },
        "logan": {}
    }))
    .expect("fixture neighbours parse");

    Datasets {
        clusters,
        coverage,
        suburbs,
        cluster_map: None,
        adjacency: Some(adjacency),
        neighbors,
        ..Default::default()
    }
}

pub fn geo() -> Geo {
    Geo::new(&config(), &datasets())
}
