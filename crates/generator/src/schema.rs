//! JSON-LD graphs.
//!
//! Node `@id`s are anchors on the site origin or the page URL, so the same
//! entity carries the same id on every page.

use crate::reviews::AggregateRating;
use areakit_core::data::FaqItem;
use areakit_core::paths::absolute_url;
use areakit_core::slug::slugify;
use areakit_core::types::{Business, ServiceDef};
use serde_json::{Value, json};

/// One breadcrumb step; `path` is site-relative
#[derive(Debug, Clone)]
pub struct Crumb {
    pub name: String,
    pub path: String,
}

impl Crumb {
    pub fn new(name: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
        }
    }
}

/// Suburb facts used for `Place` nodes
#[derive(Debug, Clone)]
pub struct PlaceInfo<'a> {
    pub slug: &'a str,
    pub name: &'a str,
    pub postcode: Option<&'a str>,
    pub state: Option<&'a str>,
}

fn id(url: &str, anchor: &str) -> String {
    let base = url.split('#').next().unwrap_or(url);
    format!("{}#{}", base, anchor)
}

fn origin_root(origin: &str) -> String {
    format!("{}/", origin.trim_end_matches('/'))
}

/// Wrap graph nodes in a document with `@context`
pub fn document(nodes: Vec<Value>) -> Value {
    json!({
        "@context": "https://schema.org",
        "@graph": nodes,
    })
}

fn rating_node(rating: &AggregateRating) -> Value {
    json!({
        "@type": "AggregateRating",
        "ratingValue": rating.rating_value,
        "reviewCount": rating.review_count,
    })
}

/// Organization, WebSite and WebPage, plus a BreadcrumbList when crumbs are given
pub fn build_graph(origin: &str, business: &Business, path: &str, crumbs: &[Crumb]) -> Vec<Value> {
    let root = origin_root(origin);
    let page_url = absolute_url(origin, path);

    let mut org = json!({
        "@type": "Organization",
        "@id": id(&root, "organization"),
        "name": business.name,
        "url": root,
    });
    if let Some(logo) = &business.logo {
        org["logo"] = Value::String(absolute_url(origin, logo));
    }

    let mut graph = vec![
        org,
        json!({
            "@type": "WebSite",
            "@id": id(&root, "website"),
            "url": root,
            "publisher": { "@id": id(&root, "organization") },
        }),
        json!({
            "@type": "WebPage",
            "@id": id(&page_url, "webpage"),
            "url": page_url,
            "isPartOf": { "@id": id(&root, "website") },
        }),
    ];

    if !crumbs.is_empty() {
        let items: Vec<Value> = crumbs
            .iter()
            .enumerate()
            .map(|(i, crumb)| {
                json!({
                    "@type": "ListItem",
                    "position": i + 1,
                    "name": crumb.name,
                    "item": { "@id": absolute_url(origin, &crumb.path) },
                })
            })
            .collect();
        graph.push(json!({
            "@type": "BreadcrumbList",
            "@id": id(&page_url, "breadcrumb"),
            "itemListElement": items,
        }));
    }

    graph
}

/// Business, Service, Place and WebPage for a service × suburb page.
///
/// The rating goes on the Service; the business only carries it when
/// `rate_business` is set.
pub fn service_area_graph(
    origin: &str,
    business: &Business,
    service: &ServiceDef,
    place: &PlaceInfo<'_>,
    path: &str,
    rating: Option<&AggregateRating>,
    rate_business: bool,
) -> Vec<Value> {
    let root = origin_root(origin);
    let page_url = absolute_url(origin, path);
    let org_id = id(&root, "organization");
    let service_id = id(&root, &format!("service-{}", service.slug));
    let place_id = id(&root, &format!("suburb-{}", place.slug));

    let mut org = json!({
        "@type": ["Organization", "LocalBusiness"],
        "@id": org_id,
        "name": business.name,
        "url": root,
        "telephone": business.phone,
        "email": business.email,
        "areaServed": { "@id": place_id },
    });
    if let Some(logo) = &business.logo {
        org["logo"] = Value::String(absolute_url(origin, logo));
    }

    let mut service_node = json!({
        "@type": "Service",
        "@id": service_id,
        "name": service.label,
        "serviceType": service.label,
        "provider": { "@id": org_id },
        "areaServed": { "@id": place_id },
    });

    if let Some(rating) = rating {
        service_node["aggregateRating"] = rating_node(rating);
        if rate_business {
            org["aggregateRating"] = rating_node(rating);
        }
    }

    let mut address = json!({
        "@type": "PostalAddress",
        "addressLocality": place.name,
        "addressRegion": place.state.unwrap_or(&business.region),
        "addressCountry": business.country,
    });
    if let Some(postcode) = place.postcode {
        address["postalCode"] = Value::String(postcode.to_string());
    }

    vec![
        org,
        service_node,
        json!({
            "@type": "Place",
            "@id": place_id,
            "name": place.name,
            "address": address,
        }),
        json!({
            "@type": "WebPage",
            "@id": id(&page_url, "webpage"),
            "url": page_url,
            "isPartOf": { "@id": id(&root, "website") },
            "about": [{ "@id": service_id }, { "@id": place_id }],
        }),
    ]
}

/// FAQPage node; each answer links back to its `#faq-…` anchor
pub fn faq_page(origin: &str, path: &str, items: &[FaqItem]) -> Option<Value> {
    if items.is_empty() {
        return None;
    }
    let page_url = absolute_url(origin, path);
    let questions: Vec<Value> = items
        .iter()
        .map(|item| {
            json!({
                "@type": "Question",
                "name": item.question,
                "acceptedAnswer": {
                    "@type": "Answer",
                    "text": item.answer,
                    "url": id(&page_url, &faq_anchor(&item.question)),
                },
            })
        })
        .collect();
    Some(json!({
        "@type": "FAQPage",
        "@id": id(&page_url, "faq"),
        "mainEntity": questions,
    }))
}

pub fn faq_anchor(question: &str) -> String {
    format!("faq-{}", slugify(question))
}
