use areakit_generator::{BuildOptions, generate_site};
use areakit_validator::{ValidationReport, audit_content, audit_related_links, validate_datasets};
use std::path::PathBuf;

use super::site;

fn print_report(report: &ValidationReport) {
    for info in &report.info {
        println!("  {}", info);
    }
    for warning in &report.warnings {
        println!("  ⚠ {}", warning);
    }
    for error in &report.errors {
        println!("  ✗ {}", error);
    }
}

/// Validate config and datasets, then audit a throwaway build
pub async fn run(path: PathBuf) -> anyhow::Result<()> {
    println!("Validating site at: {}", path.display());

    let (config, data) = site::load(&path)?;
    println!("✓ site.toml valid");
    println!("  Business: {}", config.business.name);
    println!("  Services: {}", config.services.len());

    println!("\nDatasets:");
    let mut report = validate_datasets(&config, &data);
    print_report(&report);

    if report.is_ok() {
        let site = generate_site(&config, &data, &BuildOptions::default())?;
        let out = tempfile::TempDir::new()?;
        site.write_to(out.path())?;

        println!("\nBuilt pages ({}):", site.pages.len());
        let mut audits = audit_related_links(out.path(), config.links.block_cap, config.links.grid_cap)?;
        audits.merge(audit_content(out.path(), config.audit.min_words, config.audit.min_links)?);
        print_report(&audits);
        report.merge(audits);
    }

    if !report.is_ok() {
        anyhow::bail!("Validation failed with {} error(s)", report.errors.len());
    }
    println!(
        "\n✓ Valid ({} warning(s))",
        report.warnings.len()
    );
    Ok(())
}
