use crate::paths::{BlogBase, Paths};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Complete site configuration
#[derive(Debug, Clone)]
pub struct SiteConfig {
    pub site: SiteSettings,
    pub business: Business,
    pub services: Vec<ServiceDef>,
    pub clusters: ClusterSettings,
    pub data: DataSettings,
    pub links: LinkSettings,
    pub reviews: ReviewSettings,
    pub audit: AuditSettings,
}

impl SiteConfig {
    pub fn paths(&self) -> Paths {
        Paths::new(self.site.blog_base.clone())
    }

    pub fn service(&self, slug: &str) -> Option<&ServiceDef> {
        self.services.iter().find(|s| s.slug == slug)
    }

    /// Canonical service for a legacy root segment (`bond-cleaners` → `bond-cleaning`)
    pub fn service_for_synonym(&self, segment: &str) -> Option<&ServiceDef> {
        self.services
            .iter()
            .find(|s| s.synonyms.iter().any(|syn| syn == segment))
    }

    pub fn cross_link_services(&self) -> impl Iterator<Item = &ServiceDef> {
        self.services.iter().filter(|s| s.cross_link)
    }
}

#[derive(Debug, Clone)]
pub struct SiteSettings {
    /// Absolute origin without a trailing slash
    pub origin: String,
    pub blog_base: BlogBase,
    pub default_service: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Business {
    pub name: String,
    #[serde(default)]
    pub tagline: String,
    pub phone: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
    #[serde(default = "default_region")]
    pub region: String,
    #[serde(default = "default_country")]
    pub country: String,
}

fn default_region() -> String {
    "QLD".to_string()
}

fn default_country() -> String {
    "AU".to_string()
}

/// A service offered by the business
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceDef {
    pub slug: String,
    pub label: String,
    /// Legacy root segments that redirect to this service
    #[serde(default)]
    pub synonyms: Vec<String>,
    /// Whether the service shows up in cross-service link blocks
    #[serde(default = "default_true")]
    pub cross_link: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Default)]
pub struct ClusterSettings {
    pub canonical: Vec<String>,
    /// alias → canonical cluster slug
    pub aliases: BTreeMap<String, String>,
}

#[derive(Debug, Clone)]
pub struct DataSettings {
    /// Relative to the site directory
    pub dir: PathBuf,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LinkSettings {
    #[serde(default = "default_related_count")]
    pub related_count: usize,
    #[serde(default = "default_block_cap")]
    pub block_cap: usize,
    #[serde(default = "default_grid_cap")]
    pub grid_cap: usize,
}

fn default_related_count() -> usize {
    4
}

fn default_block_cap() -> usize {
    3
}

fn default_grid_cap() -> usize {
    6
}

impl Default for LinkSettings {
    fn default() -> Self {
        Self {
            related_count: default_related_count(),
            block_cap: default_block_cap(),
            grid_cap: default_grid_cap(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReviewMode {
    #[serde(rename = "seed")]
    Seed,
    #[serde(rename = "live")]
    Live,
    #[serde(rename = "seed+live")]
    SeedAndLive,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ReviewSettings {
    #[serde(default = "default_review_mode")]
    pub mode: ReviewMode,
    #[serde(default = "default_min_for_aggregate")]
    pub min_for_aggregate: usize,
    #[serde(default)]
    pub allow_local_business_ratings: bool,
}

fn default_review_mode() -> ReviewMode {
    ReviewMode::Seed
}

fn default_min_for_aggregate() -> usize {
    5
}

impl Default for ReviewSettings {
    fn default() -> Self {
        Self {
            mode: default_review_mode(),
            min_for_aggregate: default_min_for_aggregate(),
            allow_local_business_ratings: false,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct AuditSettings {
    #[serde(default = "default_min_words")]
    pub min_words: usize,
    #[serde(default = "default_min_links")]
    pub min_links: usize,
}

fn default_min_words() -> usize {
    700
}

fn default_min_links() -> usize {
    3
}

impl Default for AuditSettings {
    fn default() -> Self {
        Self {
            min_words: default_min_words(),
            min_links: default_min_links(),
        }
    }
}
