use areakit_core::paths::absolute_url;
use chrono::NaiveDate;

fn xml_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

/// `<urlset>` over site paths, made absolute against `origin`
pub fn render_sitemap<'a>(
    origin: &str,
    paths: impl IntoIterator<Item = &'a str>,
    lastmod: Option<NaiveDate>,
) -> String {
    let lastmod = lastmod
        .map(|d| format!("<lastmod>{}</lastmod>", d.format("%Y-%m-%d")))
        .unwrap_or_default();

    let entries: String = paths
        .into_iter()
        .map(|path| {
            format!(
                "  <url><loc>{}</loc>{}</url>\n",
                xml_escape(&absolute_url(origin, path)),
                lastmod
            )
        })
        .collect();

    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n<urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\n{}</urlset>\n",
        entries
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sitemap_absolute_and_escaped() {
        let xml = render_sitemap("https://example.com.au/", ["/", "/areas/a&b/"], None);
        assert!(xml.contains("<loc>https://example.com.au/</loc>"));
        assert!(xml.contains("<loc>https://example.com.au/areas/a&amp;b/</loc>"));
        assert!(!xml.contains("lastmod"));
        assert_eq!(xml.matches("<url>").count(), 2);
    }

    #[test]
    fn test_sitemap_lastmod() {
        let date = NaiveDate::from_ymd_opt(2025, 8, 16);
        let xml = render_sitemap("https://example.com.au", ["/services/"], date);
        assert!(xml.contains("<lastmod>2025-08-16</lastmod>"));
    }
}
