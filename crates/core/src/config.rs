use crate::error::{Error, Result};
use crate::paths::BlogBase;
use crate::slug::{norm, norm_slug, uniq_stable};
use crate::types::*;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fs;
use std::path::{Path, PathBuf};

/// Raw TOML configuration structure
/// This matches the site.toml file structure exactly
#[derive(Debug, Deserialize)]
struct RawConfig {
    site: RawSite,
    business: Business,
    #[serde(default, rename = "service")]
    services: Vec<ServiceDef>,
    #[serde(default)]
    clusters: RawClusters,
    #[serde(default)]
    data: RawData,
    #[serde(default)]
    links: LinkSettings,
    #[serde(default)]
    reviews: ReviewSettings,
    #[serde(default)]
    audit: AuditSettings,
}

#[derive(Debug, Deserialize)]
struct RawSite {
    origin: String,
    blog_base: Option<String>,
    default_service: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RawClusters {
    #[serde(default)]
    canonical: Vec<String>,
    #[serde(default)]
    aliases: BTreeMap<String, String>,
}

#[derive(Debug, Default, Deserialize)]
struct RawData {
    dir: Option<String>,
}

/// Parse site.toml from a file path
pub fn parse_site_toml<P: AsRef<Path>>(path: P) -> Result<SiteConfig> {
    let content = fs::read_to_string(path)?;
    parse_site_toml_str(&content)
}

/// Parse site.toml from a string (useful for testing)
pub fn parse_site_toml_str(content: &str) -> Result<SiteConfig> {
    let raw: RawConfig = toml::from_str(content)?;

    let origin = validate_origin(&raw.site.origin)?;

    if raw.services.is_empty() {
        return Err(Error::ConfigParse(
            "At least one [[service]] entry is required".to_string(),
        ));
    }

    // Slugs and synonyms are matched against normalised URL segments
    let mut services = raw.services;
    for service in &mut services {
        service.slug = norm_slug(&service.slug);
        service.synonyms = uniq_stable(
            service
                .synonyms
                .iter()
                .map(|s| norm_slug(s))
                .filter(|s| !s.is_empty()),
        );
    }

    let mut seen = HashSet::new();
    for service in &services {
        if service.slug.is_empty() {
            return Err(Error::ConfigParse("Empty service slug".to_string()));
        }
        if !seen.insert(service.slug.as_str()) {
            return Err(Error::ConfigParse(format!(
                "Duplicate service slug '{}'",
                service.slug
            )));
        }
    }
    let mut claimed: HashMap<&str, &str> = HashMap::new();
    for service in &services {
        for synonym in &service.synonyms {
            if seen.contains(synonym.as_str()) {
                return Err(Error::ConfigParse(format!(
                    "Synonym '{}' of service '{}' collides with a service slug",
                    synonym, service.slug
                )));
            }
            if let Some(owner) = claimed.insert(synonym.as_str(), service.slug.as_str()) {
                return Err(Error::ConfigParse(format!(
                    "Synonym '{}' is claimed by both '{}' and '{}'",
                    synonym, owner, service.slug
                )));
            }
        }
    }

    let default_service = match raw.site.default_service.as_deref().map(norm_slug) {
        Some(slug) if seen.contains(slug.as_str()) => slug,
        Some(slug) => {
            return Err(Error::ConfigParse(format!(
                "site.default_service '{}' is not a configured service",
                slug
            )));
        }
        None => services[0].slug.clone(),
    };

    let blog_base = checked_blog_base(raw.site.blog_base.as_deref().unwrap_or("/blog/"))?;

    // Alias keys and targets are compared against normalised URL segments
    let aliases = raw
        .clusters
        .aliases
        .into_iter()
        .map(|(alias, canonical)| (norm(&alias), norm(&canonical)))
        .collect();
    let canonical = raw.clusters.canonical.iter().map(|c| norm(c)).collect();

    let data_dir = match raw.data.dir {
        Some(dir) => validate_path(&dir, "data.dir")?,
        None => PathBuf::from("data"),
    };

    Ok(SiteConfig {
        site: SiteSettings {
            origin,
            blog_base,
            default_service,
        },
        business: raw.business,
        services,
        clusters: ClusterSettings { canonical, aliases },
        data: DataSettings { dir: data_dir },
        links: raw.links,
        reviews: raw.reviews,
        audit: raw.audit,
    })
}

impl SiteConfig {
    /// Apply `SITE` and `BLOG_BASE` overrides from the process environment
    pub fn with_env_overrides(self) -> Result<Self> {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an arbitrary lookup (the environment in production)
    pub fn with_overrides_from<F>(mut self, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(site) = lookup("SITE").filter(|s| !s.trim().is_empty()) {
            tracing::debug!(origin = %site, "SITE override");
            self.site.origin = validate_origin(&site)?;
        }
        if let Some(base) = lookup("BLOG_BASE").filter(|s| !s.trim().is_empty()) {
            tracing::debug!(blog_base = %base, "BLOG_BASE override");
            self.site.blog_base = checked_blog_base(&base)?;
        }
        Ok(self)
    }
}

/// Normalise a blog base, rejecting bases nested under the legacy `/blog/`.
///
/// `/blog/*` is redirected onto a non-default base, so a base such as
/// `/blog/guides/` would redirect into itself.
pub fn checked_blog_base(raw: &str) -> Result<BlogBase> {
    let base = BlogBase::new(raw);
    if base.is_nested_under_default() {
        return Err(Error::ConfigParse(format!(
            "blog_base must not live under /blog/: '{}'",
            raw
        )));
    }
    Ok(base)
}

/// Validate the site origin and strip trailing slashes.
///
/// The origin is used verbatim in canonical URLs, JSON-LD `@id`s and the
/// sitemap, so it must be an absolute http(s) URL with a host.
pub fn validate_origin(origin: &str) -> Result<String> {
    let trimmed = origin.trim().trim_end_matches('/');
    let rest = trimmed
        .strip_prefix("https://")
        .or_else(|| trimmed.strip_prefix("http://"))
        .ok_or_else(|| {
            Error::ConfigParse(format!(
                "site.origin must start with http:// or https://: '{}'",
                origin
            ))
        })?;

    if rest.is_empty() || rest.contains('/') || rest.contains(char::is_whitespace) {
        return Err(Error::ConfigParse(format!(
            "site.origin must be a bare origin like https://example.com: '{}'",
            origin
        )));
    }

    Ok(trimmed.to_string())
}

/// Validate and convert a path string to PathBuf.
///
/// This function prevents path traversal vulnerabilities by rejecting:
/// - Absolute paths (starting with `/` or Windows drive letters)
/// - Paths containing parent directory references (`..`)
///
/// # Examples
///
/// ```text
/// validate_path("data", "data.dir")  → Ok(PathBuf)
/// validate_path("/etc", "data.dir")  → Err("Absolute paths not allowed...")
/// validate_path("../shared", "data.dir")  → Err("Parent directory references...")
/// ```
pub fn validate_path(path_str: &str, field_name: &str) -> Result<PathBuf> {
    let path = Path::new(path_str);

    if path.is_absolute() {
        return Err(Error::ConfigParse(format!(
            "Absolute paths not allowed in '{}': '{}'. Use relative paths only.",
            field_name, path_str
        )));
    }

    for component in path.components() {
        if component == std::path::Component::ParentDir {
            return Err(Error::ConfigParse(format!(
                "Parent directory references (..) not allowed in '{}': '{}'",
                field_name, path_str
            )));
        }
    }

    if path_str.trim().is_empty() {
        return Err(Error::ConfigParse(format!(
            "Empty path in '{}' field",
            field_name
        )));
    }

    Ok(path.to_path_buf())
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r##"
[site]
origin = "https://example.com.au/"

[business]
name = "One N Done Bond Clean"
phone = "+61405779420"
email = "info@example.com.au"

[[service]]
slug = "bond-cleaning"
label = "Bond Cleaning"
synonyms = ["bond-cleaners", "end-of-lease-cleaning"]
cross_link = false

[[service]]
slug = "spring-cleaning"
label = "Spring Cleaning"
synonyms = ["house-cleaning"]

[clusters]
canonical = ["ipswich", "brisbane", "logan"]

[clusters.aliases]
"ipswich-region" = "ipswich"
"Brisbane-West" = "brisbane"
    "##;

    #[test]
    fn test_parse_minimal_config() {
        let config = parse_site_toml_str(MINIMAL).unwrap();
        assert_eq!(config.site.origin, "https://example.com.au");
        assert_eq!(config.site.blog_base.as_str(), "/blog/");
        assert_eq!(config.site.default_service, "bond-cleaning");
        assert_eq!(config.services.len(), 2);
        assert!(!config.services[0].cross_link);
        assert!(config.services[1].cross_link);
        assert_eq!(config.business.region, "QLD");
        assert_eq!(config.links.related_count, 4);
        assert_eq!(config.links.block_cap, 3);
        assert_eq!(config.links.grid_cap, 6);
        assert_eq!(config.reviews.mode, ReviewMode::Seed);
        assert_eq!(config.audit.min_words, 700);
        assert_eq!(config.data.dir, PathBuf::from("data"));
    }

    #[test]
    fn test_aliases_are_normalised() {
        let config = parse_site_toml_str(MINIMAL).unwrap();
        assert_eq!(
            config.clusters.aliases.get("brisbane-west").map(String::as_str),
            Some("brisbane")
        );
        assert_eq!(config.clusters.canonical, vec!["ipswich", "brisbane", "logan"]);
    }

    #[test]
    fn test_service_lookup_by_synonym() {
        let config = parse_site_toml_str(MINIMAL).unwrap();
        assert_eq!(
            config.service_for_synonym("house-cleaning").map(|s| s.slug.as_str()),
            Some("spring-cleaning")
        );
        assert!(config.service_for_synonym("bond-cleaning").is_none());
        assert_eq!(config.cross_link_services().count(), 1);
    }

    #[test]
    fn test_rejects_missing_services() {
        let toml = r##"
[site]
origin = "https://example.com.au"

[business]
name = "X"
phone = "1"
email = "x@example.com"
        "##;
        let result = parse_site_toml_str(toml);
        assert!(result.unwrap_err().to_string().contains("At least one"));
    }

    #[test]
    fn test_rejects_duplicate_service() {
        let toml = MINIMAL.replace("slug = \"spring-cleaning\"", "slug = \"bond-cleaning\"");
        let result = parse_site_toml_str(&toml);
        assert!(result.unwrap_err().to_string().contains("Duplicate service slug"));
    }

    #[test]
    fn test_rejects_synonym_colliding_with_slug() {
        let toml = MINIMAL.replace("[\"house-cleaning\"]", "[\"bond-cleaning\"]");
        let result = parse_site_toml_str(&toml);
        assert!(result.unwrap_err().to_string().contains("collides"));
    }

    #[test]
    fn test_service_slugs_and_synonyms_are_normalised() {
        let toml = MINIMAL
            .replace("slug = \"bond-cleaning\"", "slug = \"Bond-Cleaning\"")
            .replace("\"bond-cleaners\"", "\" Bond Cleaners \", \"bond-cleaners\"");
        let config = parse_site_toml_str(&toml).unwrap();
        assert_eq!(config.services[0].slug, "bond-cleaning");
        assert_eq!(config.services[0].synonyms, vec!["bond-cleaners", "end-of-lease-cleaning"]);
        assert_eq!(config.site.default_service, "bond-cleaning");
        assert_eq!(
            config.service_for_synonym("bond-cleaners").map(|s| s.slug.as_str()),
            Some("bond-cleaning")
        );
    }

    #[test]
    fn test_rejects_synonym_shared_by_two_services() {
        let toml = MINIMAL.replace("[\"house-cleaning\"]", "[\"House-Cleaning\", \"Bond-Cleaners\"]");
        let err = parse_site_toml_str(&toml).unwrap_err().to_string();
        assert!(err.contains("claimed by both"));
        assert!(err.contains("bond-cleaners"));
    }

    #[test]
    fn test_rejects_blog_base_nested_under_blog() {
        let toml = MINIMAL.replace(
            "origin = \"https://example.com.au/\"",
            "origin = \"https://example.com.au/\"\nblog_base = \"/blog/guides/\"",
        );
        assert!(parse_site_toml_str(&toml).unwrap_err().to_string().contains("blog_base"));

        let result = parse_site_toml_str(MINIMAL)
            .unwrap()
            .with_overrides_from(|key| (key == "BLOG_BASE").then(|| "blog/guides".to_string()));
        assert!(result.is_err());

        let config = parse_site_toml_str(MINIMAL)
            .unwrap()
            .with_overrides_from(|key| (key == "BLOG_BASE").then(|| "/resources/guides/".to_string()))
            .unwrap();
        assert_eq!(config.site.blog_base.as_str(), "/resources/guides/");
    }

    #[test]
    fn test_rejects_unknown_default_service() {
        let toml = MINIMAL.replace(
            "origin = \"https://example.com.au/\"",
            "origin = \"https://example.com.au/\"\ndefault_service = \"oven-cleaning\"",
        );
        let result = parse_site_toml_str(&toml);
        assert!(result.unwrap_err().to_string().contains("default_service"));
    }

    #[test]
    fn test_rejects_data_dir_traversal() {
        let toml = format!("{}\n[data]\ndir = \"../../etc\"\n", MINIMAL);
        let result = parse_site_toml_str(&toml);
        let err = result.unwrap_err().to_string();
        assert!(err.contains("Parent directory references"));
        assert!(err.contains("data.dir"));
    }

    #[test]
    fn test_validate_origin() {
        assert_eq!(validate_origin("https://a.com.au///").unwrap(), "https://a.com.au");
        assert_eq!(validate_origin("http://localhost:4322").unwrap(), "http://localhost:4322");
        assert!(validate_origin("example.com").is_err());
        assert!(validate_origin("https://").is_err());
        assert!(validate_origin("https://a.com/sub").is_err());
    }

    #[test]
    fn test_validate_path_rejects_absolute_and_empty() {
        assert!(validate_path("data/json", "data.dir").is_ok());
        assert!(
            validate_path("/etc/passwd", "data.dir")
                .unwrap_err()
                .to_string()
                .contains("Absolute paths not allowed")
        );
        assert!(
            validate_path("   ", "data.dir")
                .unwrap_err()
                .to_string()
                .contains("Empty path")
        );
    }

    #[test]
    fn test_env_overrides() {
        let config = parse_site_toml_str(MINIMAL)
            .unwrap()
            .with_overrides_from(|key| match key {
                "SITE" => Some("https://staging.example.com.au/".to_string()),
                "BLOG_BASE" => Some("guides".to_string()),
                _ => None,
            })
            .unwrap();
        assert_eq!(config.site.origin, "https://staging.example.com.au");
        assert_eq!(config.site.blog_base.as_str(), "/guides/");
    }

    #[test]
    fn test_env_override_rejects_bad_origin() {
        let result = parse_site_toml_str(MINIMAL)
            .unwrap()
            .with_overrides_from(|key| (key == "SITE").then(|| "not a url".to_string()));
        assert!(result.is_err());
    }

    #[test]
    fn test_review_mode_parsing() {
        let toml = format!("{}\n[reviews]\nmode = \"seed+live\"\nmin_for_aggregate = 3\n", MINIMAL);
        let config = parse_site_toml_str(&toml).unwrap();
        assert_eq!(config.reviews.mode, ReviewMode::SeedAndLive);
        assert_eq!(config.reviews.min_for_aggregate, 3);
    }
}
