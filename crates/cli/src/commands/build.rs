use anyhow::{Context, Result};
use areakit_core::config::validate_origin;
use areakit_generator::{BuildOptions, generate_site};
use areakit_validator::{audit_content, audit_related_links, validate_datasets};
use chrono::Local;
use std::fs;
use std::path::PathBuf;

use super::site;

/// Build the static site into `output`
pub async fn run(path: PathBuf, output: PathBuf, origin: Option<String>) -> Result<()> {
    println!("🔨 Building static site...");
    println!("   Source: {}", path.display());
    println!("   Output: {}", output.display());
    println!();

    let (mut config, data) = site::load(&path)?;
    if let Some(origin) = origin {
        config.site.origin = validate_origin(&origin).context("Invalid --origin")?;
    }

    println!("✓ Loaded: {}", config.business.name);
    println!("  Origin: {}", config.site.origin);
    println!("  Blog base: {}", config.site.blog_base.as_str());
    println!("  Services: {}", config.services.len());
    println!("  Clusters: {}", data.clusters.len());
    println!();

    println!("🔍 Validating datasets...");
    let report = validate_datasets(&config, &data);
    for warning in &report.warnings {
        eprintln!("   ⚠ Warning: {}", warning);
    }
    if !report.is_ok() {
        for error in &report.errors {
            eprintln!("   ✗ {}", error);
        }
        anyhow::bail!("Dataset validation failed with {} error(s)", report.errors.len());
    }
    println!("   ✓ Datasets valid");

    println!("📄 Generating pages...");
    let options = BuildOptions {
        preview: false,
        lastmod: Some(Local::now().date_naive()),
    };
    let site = generate_site(&config, &data, &options).context("Failed to generate site")?;
    println!("   ✓ Generated {} pages", site.pages.len());

    println!("📁 Writing output...");
    fs::create_dir_all(&output).context("Failed to create output directory")?;
    site.write_to(&output)
        .with_context(|| format!("Failed to write site to {}", output.display()))?;
    for (asset, _) in &site.assets {
        println!("   ✓ {}", asset);
    }

    println!("🔗 Auditing related links...");
    let links = audit_related_links(&output, config.links.block_cap, config.links.grid_cap)
        .context("Related-link audit failed to run")?;
    if !links.is_ok() {
        for error in &links.errors {
            eprintln!("   ✗ {}", error);
        }
        anyhow::bail!("Related links audit failed: {} block(s) exceed caps", links.errors.len());
    }
    println!("   ✓ Related links within caps");

    let content = audit_content(&output, config.audit.min_words, config.audit.min_links)
        .context("Content audit failed to run")?;
    if content.warnings.is_empty() {
        println!("   ✓ Content thresholds met");
    } else {
        println!(
            "   ⚠ {} page(s) below {} words / {} links (run 'areakit validate' for details)",
            content.warnings.len(),
            config.audit.min_words,
            config.audit.min_links
        );
    }

    println!();
    println!("✅ Build complete!");
    println!("   Output: {}", output.display());
    println!();
    println!("To test locally:");
    println!("   areakit preview {}", path.display());
    println!();

    Ok(())
}
