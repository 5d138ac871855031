use anyhow::{Context, Result};
use areakit_core::{Datasets, SiteConfig, parse_site_toml};
use std::path::Path;

/// Load `site.toml` (with environment overrides) and every dataset it points at
pub fn load(path: &Path) -> Result<(SiteConfig, Datasets)> {
    if !path.exists() {
        anyhow::bail!(
            "Site directory does not exist: {}\nRun 'areakit init {}' first",
            path.display(),
            path.display()
        );
    }

    let site_toml_path = path.join("site.toml");
    if !site_toml_path.exists() {
        anyhow::bail!(
            "site.toml not found in {}\nRun 'areakit init {}' first",
            path.display(),
            path.display()
        );
    }

    let config = parse_site_toml(&site_toml_path)
        .context("Failed to parse site.toml")?
        .with_env_overrides()
        .context("Invalid SITE / BLOG_BASE override")?;

    let data_dir = path.join(&config.data.dir);
    let data = Datasets::load(&data_dir, &config.clusters.canonical)
        .with_context(|| format!("Failed to load datasets from {}", data_dir.display()))?;

    Ok((config, data))
}
