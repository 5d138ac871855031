//! Related-link selection for suburb service pages.

use crate::Geo;
use areakit_core::slug::{norm, norm_slug, uniq_stable, unslug_to_name};
use serde::Serialize;

/// Fewer pool entries than this and the curated tables of every cluster are consulted
const MIN_POOL: usize = 3;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RelatedLink {
    pub label: String,
    pub href: String,
    #[serde(rename = "ariaLabel", skip_serializing_if = "Option::is_none")]
    pub aria_label: Option<String>,
}

impl RelatedLink {
    pub fn new(label: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            href: href.into(),
            aria_label: None,
        }
    }

    pub fn with_aria(mut self, aria: impl Into<String>) -> Self {
        self.aria_label = Some(aria.into());
        self
    }
}

type Prioritise<'a> = &'a dyn Fn(Vec<String>) -> Vec<String>;

/// Options for [`Geo::related_service_links`]
pub struct RelatedQuery<'a> {
    pub service: Option<&'a str>,
    pub suburb: &'a str,
    /// Prepend the page's own link when the service is offered there
    pub include_self: bool,
    /// Number of links besides the self link; defaults to `links.related_count`
    pub count: Option<usize>,
    /// Optional re-ordering of candidates (e.g. by map grid distance)
    pub prioritise: Option<Prioritise<'a>>,
}

impl<'a> RelatedQuery<'a> {
    pub fn new(suburb: &'a str) -> Self {
        Self {
            service: None,
            suburb,
            include_self: true,
            count: None,
            prioritise: None,
        }
    }

    pub fn service(mut self, service: &'a str) -> Self {
        self.service = Some(service);
        self
    }

    pub fn include_self(mut self, include: bool) -> Self {
        self.include_self = include;
        self
    }

    pub fn count(mut self, count: usize) -> Self {
        self.count = Some(count);
        self
    }

    pub fn prioritise(mut self, f: Prioritise<'a>) -> Self {
        self.prioritise = Some(f);
        self
    }
}

impl Geo {
    /// Configured label for a service, else a prettified slug
    pub fn service_label(&self, service: &str) -> String {
        let slug = norm(service);
        self.services
            .iter()
            .find(|s| s.slug == slug)
            .map(|s| s.label.clone())
            .unwrap_or_else(|| unslug_to_name(&slug))
    }

    /// Blog landing for the suburb's cluster, or the blog root
    pub fn local_blog_link(&self, suburb: &str) -> String {
        match self.index.cluster_for_suburb(suburb) {
            Some(cluster) => self.paths.blog_cluster(cluster),
            None => self.paths.blog_root(),
        }
    }

    /// Links to the same service in neighbouring suburbs.
    ///
    /// The pool is the suburb's adjacency, else its cluster's curated
    /// neighbours, else the rest of its cluster; a thin pool is topped up
    /// from every curated table. Candidates must have a page and be allowed
    /// by coverage. With `include_self`, `count` still counts the others.
    pub fn related_service_links(&self, query: RelatedQuery<'_>) -> Vec<RelatedLink> {
        let service = query
            .service
            .map(norm)
            .unwrap_or_else(|| self.default_service().to_string());
        let suburb = norm_slug(query.suburb);
        let count = query.count.unwrap_or(self.links.related_count);

        let adjacency = self.index.adjacency_of(&suburb);
        let mut pool: Vec<String> = if !adjacency.is_empty() {
            adjacency.to_vec()
        } else if let Some(cluster) = self.index.cluster_for_suburb(&suburb) {
            let curated = self.curated_neighbors(&suburb);
            if !curated.is_empty() {
                curated.to_vec()
            } else {
                self.index
                    .list_suburbs_for_cluster(cluster)
                    .iter()
                    .filter(|s| **s != suburb)
                    .cloned()
                    .collect()
            }
        } else {
            Vec::new()
        };

        if pool.len() < MIN_POOL {
            let extras = self
                .neighbors
                .values()
                .filter_map(|table| table.get(&suburb))
                .flatten()
                .filter(|s| **s != suburb)
                .cloned();
            pool = uniq_stable(pool.into_iter().chain(extras));
        }

        let mut candidates = uniq_stable(pool.into_iter().filter(|s| {
            *s != suburb && self.index.is_known_suburb(s) && self.coverage.allows(&service, s)
        }));
        if let Some(prioritise) = query.prioritise {
            if !candidates.is_empty() {
                candidates = uniq_stable(prioritise(candidates));
            }
        }

        let label = self.service_label(&service);
        let mut links = Vec::with_capacity(count + 1);
        let mut cap = count;

        if query.include_self && self.is_service_covered(&service, &suburb) {
            links.push(
                RelatedLink::new(label.clone(), self.paths.suburb_service(&service, &suburb))
                    .with_aria(format!("{} in {}", label, self.index.display_name(&suburb))),
            );
            cap += 1;
        }

        for s in candidates {
            if links.len() >= cap {
                break;
            }
            links.push(RelatedLink::new(
                self.index.display_name(&s),
                self.paths.suburb_service(&service, &s),
            ));
        }

        links
    }

    /// Other services in the same suburb, then the local guides link
    pub fn suburb_cross_links(&self, suburb: &str) -> Vec<RelatedLink> {
        let sub = norm_slug(suburb);
        let name = self.index.display_name(&sub);
        let mut out: Vec<RelatedLink> = self
            .services
            .iter()
            .filter(|s| s.cross_link && self.is_service_covered(&s.slug, &sub))
            .map(|s| {
                RelatedLink::new(s.label.clone(), self.paths.suburb_service(&s.slug, &sub))
                    .with_aria(format!("{} in {}", s.label, name))
            })
            .collect();
        out.push(RelatedLink::new("Local guides", self.local_blog_link(&sub)));
        out
    }
}
