//! Cross-service navigation: "other services in this suburb" blocks.

use crate::Geo;
use areakit_core::slug::{norm, norm_slug};
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum LinkSource {
    SameSuburb,
    Nearby,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CrossServiceData {
    pub service: String,
    pub suburb: String,
    pub source: LinkSource,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CrossServiceItem {
    pub label: String,
    pub href: String,
    /// True when the link stays in the visitor's suburb
    pub here: bool,
    pub data: CrossServiceData,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceCard {
    pub title: String,
    pub desc: String,
    pub href: String,
    pub nearby: bool,
    pub attrs: BTreeMap<String, String>,
}

/// suburb → current service → items
pub type CrossServiceMap = BTreeMap<String, BTreeMap<String, Vec<CrossServiceItem>>>;

impl Geo {
    /// Links to the other cross-link services from a suburb page.
    ///
    /// Services not offered in the suburb point at the nearest covered
    /// suburb instead; services offered nowhere are left out.
    pub fn cross_service_items(&self, suburb: &str, current_service: &str) -> Vec<CrossServiceItem> {
        let suburb = norm_slug(suburb);
        let current = norm(current_service);

        self.services
            .iter()
            .filter(|s| s.cross_link && s.slug != current)
            .filter_map(|service| {
                let (target, source) = if !self.coverage.is_listed(&service.slug) {
                    if !self.index.is_known_suburb(&suburb) {
                        return None;
                    }
                    (suburb.clone(), LinkSource::SameSuburb)
                } else {
                    let pick = self.nearby_covered_single(&suburb, &service.slug)?;
                    let source = if pick.nearby {
                        LinkSource::Nearby
                    } else {
                        LinkSource::SameSuburb
                    };
                    (pick.suburb, source)
                };

                let label = match source {
                    LinkSource::SameSuburb => service.label.clone(),
                    LinkSource::Nearby => format!("{} (nearby)", service.label),
                };
                Some(CrossServiceItem {
                    label,
                    href: self.paths.suburb_service(&service.slug, &target),
                    here: source == LinkSource::SameSuburb,
                    data: CrossServiceData {
                        service: service.slug.clone(),
                        suburb: target,
                        source,
                    },
                })
            })
            .collect()
    }

    /// Items for every known suburb and configured service
    pub fn cross_service_map(&self) -> CrossServiceMap {
        let mut map = CrossServiceMap::new();
        for suburb in self.index.known_suburbs() {
            let per_service = self
                .services
                .iter()
                .map(|s| (s.slug.clone(), self.cross_service_items(suburb, &s.slug)))
                .collect();
            map.insert(suburb.to_string(), per_service);
        }
        tracing::debug!(suburbs = map.len(), "cross-service map built");
        map
    }

    pub fn to_service_cards(&self, items: &[CrossServiceItem], current_suburb: &str) -> Vec<ServiceCard> {
        let here_name = self.index.display_name(&norm_slug(current_suburb));
        items
            .iter()
            .map(|item| {
                let nearby = !item.here;
                let desc = if nearby {
                    format!("Available nearby in {}", self.index.display_name(&item.data.suburb))
                } else {
                    format!("Available in {}", here_name)
                };
                ServiceCard {
                    title: item.label.clone(),
                    desc,
                    href: item.href.clone(),
                    nearby,
                    attrs: BTreeMap::from([("data-nearby".to_string(), nearby.to_string())]),
                }
            })
            .collect()
    }
}
