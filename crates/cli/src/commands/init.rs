use anyhow::{Context, Result};
use areakit_core::config::{parse_site_toml_str, validate_origin};
use areakit_core::data::{
    CLUSTERS_FILE, COVERAGE_FILE, FAQ_FILE, SEED_REVIEWS_FILE, SUBURBS_FILE,
};
use serde_json::{Value, json};
use std::fs;
use std::path::{Path, PathBuf};

/// Escape a string for a TOML basic string
///
/// The template carries comments, so it is assembled by hand rather than
/// serialized with the toml crate.
fn toml_escape_string(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\x08', "\\b")
        .replace('\x0C', "\\f")
        .replace('\n', "\\n")
        .replace('\r', "\\r")
        .replace('\t', "\\t")
}

/// Basic email shape check: one `@`, a dotted domain, a TLD of 2+ chars
fn is_valid_email(email: &str) -> bool {
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if domain.contains('@') {
        return false;
    }
    if local.is_empty() || local.len() > 64 {
        return false;
    }
    if domain.is_empty() || domain.len() > 255 || !domain.contains('.') {
        return false;
    }
    if domain.starts_with(['.', '-']) || domain.ends_with(['.', '-']) || domain.contains("..") {
        return false;
    }
    domain.rsplit('.').next().is_some_and(|tld| tld.len() >= 2)
}

/// Scaffold a new site directory with a site.toml and a small sample dataset.
///
/// The directory is created if needed. Fails if it already holds a site.toml.
pub async fn run(
    path: PathBuf,
    name: Option<String>,
    email: Option<String>,
    origin: Option<String>,
) -> Result<()> {
    println!("Initializing site directory: {}", path.display());

    let site_toml_path = path.join("site.toml");
    if site_toml_path.exists() {
        anyhow::bail!(
            "site.toml already exists at {}\nHint: Delete it first or use a different directory",
            site_toml_path.display()
        );
    }

    fs::create_dir_all(path.join("data")).context("Failed to create site directory")?;

    generate_site_toml(&path, name.as_deref(), email.as_deref(), origin.as_deref())?;
    println!("✓ Wrote site.toml");

    let files = write_sample_data(&path.join("data"))?;
    println!("✓ Wrote {} sample dataset(s)", files.len());

    println!("\n✓ Initialization complete!");
    println!("\nGenerated structure:");
    println!("  {}/", path.display());
    println!("  ├── site.toml                  ← Business details, services, clusters");
    println!("  └── data/");
    for (i, file) in files.iter().enumerate() {
        let branch = if i + 1 == files.len() { "└──" } else { "├──" };
        println!("      {} {}", branch, file);
    }

    println!("\nNext steps:");
    println!("  1. Edit site.toml (business name, phone, origin, services)");
    println!("  2. Replace the sample suburbs and coverage in data/");
    println!("  3. Check: areakit validate {}", path.display());
    println!("  4. Preview: areakit preview {}", path.display());

    Ok(())
}

fn generate_site_toml(
    base: &Path,
    name: Option<&str>,
    email: Option<&str>,
    origin: Option<&str>,
) -> Result<()> {
    if let Some(e) = email
        && !is_valid_email(e)
    {
        anyhow::bail!("Invalid email format: '{}'", e);
    }
    let origin = match origin {
        Some(o) => Some(validate_origin(o).context("Invalid --origin")?),
        None => None,
    };

    let business_name = toml_escape_string(name.unwrap_or("Sparkle Cleaning Co"));
    let business_email = toml_escape_string(email.unwrap_or("hello@example.com.au"));
    let site_origin = toml_escape_string(origin.as_deref().unwrap_or("https://example.com.au"));

    let name_comment = if name.is_some() { "" } else { "  # TODO: Set business name" };
    let email_comment = if email.is_some() { "" } else { "  # TODO: Set contact email" };
    let origin_comment = if origin.is_some() { "" } else { "  # TODO: Set site origin" };

    let toml = format!(
        r##"# Generated by areakit init
# SITE and BLOG_BASE in the environment override [site] at build time

[site]
origin = "{site_origin}"{origin_comment}
blog_base = "/blog/"
default_service = "bond-cleaning"

[business]
name = "{business_name}"{name_comment}
tagline = "Local cleaners you can trust"
phone = "0400 000 000"  # TODO: Set phone
email = "{business_email}"{email_comment}
region = "QLD"
country = "AU"

[[service]]
slug = "bond-cleaning"
label = "Bond Cleaning"
synonyms = ["bond-cleaners", "end-of-lease-cleaning"]

[[service]]
slug = "spring-cleaning"
label = "Spring Cleaning"
synonyms = ["house-cleaning"]

[[service]]
slug = "bathroom-deep-clean"
label = "Bathroom Deep Clean"

[clusters]
canonical = ["ipswich", "brisbane-west"]

[clusters.aliases]
"ipswich-region" = "ipswich"
"brisbane_west" = "brisbane-west"

[data]
dir = "data"

[links]
related_count = 4
block_cap = 3
grid_cap = 6

[reviews]
mode = "seed"
min_for_aggregate = 5
allow_local_business_ratings = false

[audit]
min_words = 700
min_links = 3
"##
    );

    parse_site_toml_str(&toml)
        .context("Generated site.toml is invalid - this is a bug in the template generator")?;

    fs::write(base.join("site.toml"), toml)?;
    Ok(())
}

fn sample_datasets() -> Vec<(&'static str, Value)> {
    vec![
        (
            CLUSTERS_FILE,
            json!({
                "clusters": [
                    {
                        "slug": "ipswich",
                        "suburbs": ["Ipswich", "Goodna", "Redbank Plains", "Springfield Lakes"],
                        "adjacency": {
                            "goodna": ["redbank-plains", "springfield-lakes"],
                            "redbank-plains": ["goodna"]
                        }
                    },
                    {
                        "slug": "brisbane-west",
                        "suburbs": ["Indooroopilly", "Toowong", "Kenmore"]
                    }
                ]
            }),
        ),
        (
            COVERAGE_FILE,
            json!({
                "bond-cleaning": ["ipswich", "goodna", "redbank-plains", "springfield-lakes", "indooroopilly", "toowong"],
                "spring-cleaning": ["goodna", "indooroopilly", "kenmore"],
                "bathroom-deep-clean": ["redbank-plains", "toowong"]
            }),
        ),
        (
            SUBURBS_FILE,
            json!([
                { "name": "Ipswich", "postcode": "4305", "state": "QLD" },
                { "name": "Goodna", "postcode": "4300", "state": "QLD" },
                { "name": "Indooroopilly", "postcode": "4068", "state": "QLD" }
            ]),
        ),
        (
            FAQ_FILE,
            json!({
                "templates": [
                    {
                        "question": "Do you service {{suburb}}?",
                        "answer": "Yes, our team works across {{suburb}} every week. {{fact}}"
                    },
                    {
                        "question": "Is the bond clean guaranteed in {{suburb}}?",
                        "answer": "We return for free if your agent flags anything within 72 hours."
                    }
                ],
                "overrides": {},
                "facts": {
                    "goodna": "Most Goodna jobs are booked two to three days ahead."
                }
            }),
        ),
        (
            SEED_REVIEWS_FILE,
            json!({
                "bond-cleaning:goodna": [
                    {
                        "author": "Jess M.",
                        "title": "Bond back in full",
                        "body": "The agent had no notes at all after the clean.",
                        "stars": 5,
                        "date": "2025-03-14"
                    }
                ]
            }),
        ),
    ]
}

/// Write the sample datasets, returning their file names in write order
fn write_sample_data(dir: &Path) -> Result<Vec<&'static str>> {
    let mut written = Vec::new();
    for (file, value) in sample_datasets() {
        let body = serde_json::to_string_pretty(&value)?;
        fs::write(dir.join(file), body + "\n")
            .with_context(|| format!("Failed to write {}", file))?;
        written.push(file);
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use areakit_core::Datasets;
    use areakit_core::config::parse_site_toml;
    use tempfile::TempDir;

    #[test]
    fn test_toml_escape_string() {
        assert_eq!(toml_escape_string(r#"Test "Quote""#), r#"Test \"Quote\""#);
        assert_eq!(toml_escape_string(r"Test\Back"), r"Test\\Back");
        assert_eq!(toml_escape_string("Test\nNewline"), r"Test\nNewline");
        assert_eq!(toml_escape_string("Normal String"), "Normal String");
    }

    #[test]
    fn test_is_valid_email() {
        assert!(is_valid_email("user@example.com"));
        assert!(is_valid_email("test.user@domain.com.au"));
        assert!(is_valid_email("name+tag@example.org"));

        assert!(!is_valid_email("user"));
        assert!(!is_valid_email(""));
        assert!(!is_valid_email("user@@example.com"));
        assert!(!is_valid_email("user@name@example.com"));
        assert!(!is_valid_email("@example.com"));
        assert!(!is_valid_email("user@"));
        assert!(!is_valid_email("user@domain"));
        assert!(!is_valid_email("user@.com"));
        assert!(!is_valid_email("user@domain."));
        assert!(!is_valid_email("user@domain.c"));
        assert!(!is_valid_email("user@domain..com"));
        assert!(!is_valid_email(&format!("{}@example.com", "a".repeat(65))));
    }

    #[test]
    fn test_generate_site_toml_with_special_characters() {
        let dir = TempDir::new().unwrap();
        generate_site_toml(
            dir.path(),
            Some(r#"Bob's "Best" Clean\Co"#),
            Some("bob@example.com"),
            Some("https://bob.example.com/"),
        )
        .unwrap();

        let config = parse_site_toml(dir.path().join("site.toml")).unwrap();
        assert_eq!(config.business.name, r#"Bob's "Best" Clean\Co"#);
        assert_eq!(config.business.email, "bob@example.com");
        assert_eq!(config.site.origin, "https://bob.example.com");
    }

    #[test]
    fn test_generate_site_toml_rejects_bad_input() {
        let dir = TempDir::new().unwrap();
        assert!(generate_site_toml(dir.path(), None, Some("nope"), None).is_err());
        assert!(generate_site_toml(dir.path(), None, None, Some("ftp://x.com")).is_err());
        assert!(!dir.path().join("site.toml").exists());
    }

    #[tokio::test]
    async fn test_init_scaffolds_loadable_site() {
        let dir = TempDir::new().unwrap();
        let site = dir.path().join("my-site");
        run(site.clone(), None, None, None).await.unwrap();

        let config = parse_site_toml(site.join("site.toml")).unwrap();
        let data = Datasets::load(&site.join("data"), &config.clusters.canonical).unwrap();
        assert_eq!(data.clusters.len(), 2);
        assert_eq!(data.coverage["bond-cleaning"].len(), 6);
        assert_eq!(data.faq.templates.len(), 2);
        assert_eq!(data.reviews.seed["bond-cleaning:goodna"].len(), 1);
    }

    #[tokio::test]
    async fn test_init_refuses_existing_site() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("site.toml"), "").unwrap();
        let err = run(dir.path().to_path_buf(), None, None, None)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("already exists"));
    }
}
