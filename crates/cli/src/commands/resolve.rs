use anyhow::Result;
use areakit_core::paths::trim_slashes;
use areakit_geo::Geo;
use std::path::PathBuf;

use super::site;

/// Describe what a service/suburb URL would serve
fn describe(geo: &Geo, path: &str) -> Option<String> {
    let segments: Vec<&str> = trim_slashes(path).split('/').collect();
    let ["services", service, suburb] = segments.as_slice() else {
        return None;
    };
    if !geo.services().iter().any(|s| s.slug == *service) {
        return Some(format!("unknown service '{}'", service));
    }
    if !geo.index().is_known_suburb(suburb) {
        return Some(format!("unknown suburb '{}'", suburb));
    }
    let cluster = geo.index().cluster_for_suburb(suburb).unwrap_or("?");
    Some(match geo.nearby_covered_single(suburb, service) {
        Some(pick) if !pick.nearby => format!(
            "{} is offered in {} (cluster {})",
            geo.service_label(service),
            geo.index().display_name(suburb),
            cluster
        ),
        Some(pick) => format!(
            "{} is not offered in {}; nearest covered suburb is {}",
            geo.service_label(service),
            geo.index().display_name(suburb),
            geo.paths().suburb_service(service, &pick.suburb)
        ),
        None => format!(
            "{} is not offered in or near {}",
            geo.service_label(service),
            geo.index().display_name(suburb)
        ),
    })
}

/// Print the redirect (if any) a URL would receive
pub async fn run(path: PathBuf, url: String) -> Result<()> {
    let (config, data) = site::load(&path)?;
    let geo = Geo::new(&config, &data);

    let (url_path, query) = match url.split_once('?') {
        Some((p, q)) => (p, Some(q)),
        None => (url.as_str(), None),
    };

    match geo.redirector().resolve(url_path, query) {
        Some(redirect) => {
            println!("{} {} → {}", redirect.status, url, redirect.location);
            if let Some(info) = describe(&geo, redirect.location.split('?').next().unwrap_or("")) {
                println!("   {}", info);
            }
        }
        None => {
            println!("{} (no redirect)", url_path);
            if let Some(info) = describe(&geo, url_path) {
                println!("   {}", info);
            }
        }
    }

    Ok(())
}
