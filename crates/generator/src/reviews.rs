//! Review lists and aggregate ratings per service × suburb.

use areakit_core::data::{Receipt, Review, ReviewSources};
use areakit_core::slug::{norm, slugify};
use areakit_core::types::{ReviewMode, ReviewSettings};
use serde::Serialize;
use std::collections::{BTreeMap, HashSet};

/// Characters of the body that take part in duplicate detection
const SIGNATURE_BODY_CHARS: usize = 60;

/// Review as published on pages and in JSON-LD; internal fields are gone
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PublicReview {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
    pub stars: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    pub source: String,
    #[serde(rename = "receiptId", skip_serializing_if = "Option::is_none")]
    pub receipt_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receipt: Option<Receipt>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AggregateRating {
    #[serde(rename = "ratingValue")]
    pub rating_value: f64,
    #[serde(rename = "reviewCount")]
    pub review_count: usize,
}

/// `service:suburb-slug`
pub fn review_key(service: &str, suburb: &str) -> String {
    format!("{}:{}", norm(service), slugify(suburb))
}

/// Merge entries whose keys differ only in suburb spelling
fn normalize_keys(raw: &BTreeMap<String, Vec<Review>>) -> BTreeMap<String, Vec<Review>> {
    let mut out: BTreeMap<String, Vec<Review>> = BTreeMap::new();
    for (key, reviews) in raw {
        let (service, suburb) = key.split_once(':').unwrap_or((key.as_str(), ""));
        out.entry(review_key(service, suburb))
            .or_default()
            .extend(reviews.iter().cloned());
    }
    out
}

fn signature(r: &PublicReview) -> String {
    let body: String = r
        .body
        .as_deref()
        .unwrap_or("")
        .chars()
        .take(SIGNATURE_BODY_CHARS)
        .collect();
    let stars = r.stars.map(|s| s.to_string()).unwrap_or_default();
    format!(
        "{}|{}|{}|{}|{}",
        r.author.as_deref().unwrap_or(""),
        r.title.as_deref().unwrap_or(""),
        r.date.as_deref().unwrap_or(""),
        stars,
        body
    )
}

/// Drop repeats, newest first. Undated reviews sort last.
fn dedupe_and_sort(list: Vec<PublicReview>) -> Vec<PublicReview> {
    let mut seen = HashSet::new();
    let mut out: Vec<PublicReview> = list
        .into_iter()
        .filter(|r| seen.insert(signature(r)))
        .collect();
    out.sort_by(|a, b| b.date.cmp(&a.date));
    out
}

fn project(review: &Review, default_source: &str, receipts: &BTreeMap<String, Receipt>) -> PublicReview {
    let receipt = review
        .receipt_id
        .as_ref()
        .filter(|_| default_source == "live")
        .and_then(|id| receipts.get(id))
        .cloned();
    PublicReview {
        author: review.author.clone(),
        title: review.title.clone(),
        body: review.body.clone(),
        stars: review.stars.filter(|s| s.is_finite() && *s > 0.0),
        date: review.date.clone(),
        source: review
            .source
            .clone()
            .unwrap_or_else(|| default_source.to_string()),
        receipt_id: review.receipt_id.clone(),
        receipt,
    }
}

#[derive(Debug, Default)]
pub struct ReviewStore {
    by_key: BTreeMap<String, Vec<PublicReview>>,
    min_for_aggregate: usize,
}

impl ReviewStore {
    pub fn new(sources: &ReviewSources, settings: &ReviewSettings) -> Self {
        let seed = if settings.mode == ReviewMode::Live {
            BTreeMap::new()
        } else {
            normalize_keys(&sources.seed)
        };
        let live = if settings.mode == ReviewMode::Seed {
            BTreeMap::new()
        } else {
            normalize_keys(&sources.live)
        };

        let mut merged: BTreeMap<String, Vec<PublicReview>> = BTreeMap::new();
        for (key, list) in &seed {
            merged
                .entry(key.clone())
                .or_default()
                .extend(list.iter().map(|r| project(r, "seed", &sources.receipts)));
        }
        for (key, list) in &live {
            merged
                .entry(key.clone())
                .or_default()
                .extend(list.iter().map(|r| project(r, "live", &sources.receipts)));
        }

        let by_key: BTreeMap<String, Vec<PublicReview>> = merged
            .into_iter()
            .map(|(key, list)| (key, dedupe_and_sort(list)))
            .collect();

        tracing::debug!(keys = by_key.len(), mode = ?settings.mode, "reviews loaded");
        ReviewStore {
            by_key,
            min_for_aggregate: settings.min_for_aggregate,
        }
    }

    pub fn reviews(&self, service: &str, suburb: &str) -> &[PublicReview] {
        self.by_key
            .get(&review_key(service, suburb))
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Average of positive ratings, one decimal place; `None` below the threshold
    pub fn aggregate(&self, service: &str, suburb: &str) -> Option<AggregateRating> {
        let stars: Vec<f64> = self
            .reviews(service, suburb)
            .iter()
            .filter_map(|r| r.stars)
            .collect();
        if stars.is_empty() || stars.len() < self.min_for_aggregate {
            return None;
        }
        let mean = stars.iter().sum::<f64>() / stars.len() as f64;
        Some(AggregateRating {
            rating_value: (mean * 10.0).round() / 10.0,
            review_count: stars.len(),
        })
    }
}
