//! Permanent redirects for legacy and alias URLs.

use crate::Geo;
use areakit_core::paths::{BlogBase, looks_like_file, squash_slashes, with_trailing_slash};
use areakit_core::slug::norm_slug;
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Redirect {
    pub status: u16,
    pub location: String,
}

impl Redirect {
    fn permanent(to: &str, query: Option<&str>) -> Self {
        let mut location = squash_slashes(&with_trailing_slash(&format!("/{}", to.trim_start_matches('/'))));
        if let Some(q) = query.map(|q| q.trim_start_matches('?')).filter(|q| !q.is_empty()) {
            location.push('?');
            location.push_str(q);
        }
        Redirect {
            status: 301,
            location,
        }
    }
}

/// Redirect decisions over a [`Geo`]
pub struct Redirector<'a> {
    geo: &'a Geo,
}

impl Geo {
    pub fn redirector(&self) -> Redirector<'_> {
        Redirector { geo: self }
    }
}

/// `/blog/*` moves to a custom base, unless that base sits under `/blog/` itself
fn redirects_legacy_blog(blog_base: &BlogBase) -> bool {
    !blog_base.is_default() && !blog_base.is_nested_under_default()
}

fn with_rest(prefix: &str, rest: &[&str]) -> String {
    if rest.is_empty() {
        format!("{}/", prefix)
    } else {
        format!("{}/{}/", prefix, rest.join("/"))
    }
}

impl Redirector<'_> {
    /// Decide whether `path` should redirect. `None` lets the request through.
    pub fn resolve(&self, path: &str, query: Option<&str>) -> Option<Redirect> {
        let geo = self.geo;
        let index = geo.index();
        let blog_base = geo.paths().blog_base();
        let segs: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();

        // /areas/<alias>/… → /areas/<canonical>/…
        if segs.len() >= 2 && segs[0] == "areas" {
            let canonical = index.resolve_cluster_slug(segs[1]);
            if !canonical.is_empty() && canonical != segs[1] {
                return Some(Redirect::permanent(&with_rest(&format!("/areas/{}", canonical), &segs[2..]), query));
            }
        }

        // legacy /blog/… when the blog lives elsewhere
        if segs.first() == Some(&"blog") && redirects_legacy_blog(blog_base) {
            return Some(Redirect::permanent(
                &with_rest(blog_base.without_trailing(), &segs[1..]),
                query,
            ));
        }

        // <blog_base><alias>/… → <blog_base><canonical>/…
        let base_segs: Vec<&str> = blog_base.segment().split('/').collect();
        if segs.len() > base_segs.len() && segs[..base_segs.len()] == base_segs[..] {
            let cluster = segs[base_segs.len()];
            let canonical = index.resolve_cluster_slug(cluster);
            if !canonical.is_empty() && canonical != cluster {
                let prefix = format!("{}{}", blog_base.as_str(), canonical);
                return Some(Redirect::permanent(&with_rest(&prefix, &segs[base_segs.len() + 1..]), query));
            }
        }

        // /<synonym>/<suburb>/ → /services/<service>/<suburb>/
        if segs.len() >= 2 {
            let head = norm_slug(segs[0]);
            let suburb = norm_slug(segs[1]);
            if let Some(service) = geo.services().iter().find(|s| s.synonyms.contains(&head))
                && index.is_known_suburb(&suburb)
            {
                return Some(Redirect::permanent(&geo.paths().suburb_service(&service.slug, &suburb), query));
            }
        }

        // /services/<svc>/<cluster>/<suburb>/ → /services/<svc>/<suburb>/
        if segs.len() >= 4 && segs[0] == "services" && index.is_known_cluster(segs[2])
            && let Some(suburb) = index.find_suburb_by_slug(segs[3])
        {
            return Some(Redirect::permanent(&geo.paths().suburb_service(segs[1], &suburb.slug), query));
        }

        if !path.ends_with('/') && !looks_like_file(path) {
            return Some(Redirect::permanent(path, query));
        }

        if path.contains("//") {
            return Some(Redirect::permanent(path, query));
        }

        None
    }

    /// `(from, to)` pairs for a static host's redirect file.
    ///
    /// `:splat` carries the rest of the path across wildcard rules.
    pub fn static_rules(&self) -> Vec<(String, String)> {
        let geo = self.geo;
        let index = geo.index();
        let blog_base = geo.paths().blog_base();
        let mut rules = Vec::new();

        for (alias, canonical) in index.aliases() {
            if alias == canonical {
                continue;
            }
            rules.push((format!("/areas/{}/*", alias), format!("/areas/{}/:splat", canonical)));
        }

        if redirects_legacy_blog(blog_base) {
            rules.push(("/blog/*".to_string(), format!("{}:splat", blog_base.as_str())));
        }

        for (alias, canonical) in index.aliases() {
            if alias == canonical {
                continue;
            }
            rules.push((
                format!("{}{}/*", blog_base.as_str(), alias),
                format!("{}{}/:splat", blog_base.as_str(), canonical),
            ));
        }

        for service in geo.services() {
            for synonym in &service.synonyms {
                for suburb in index.known_suburbs() {
                    rules.push((
                        format!("/{}/{}/", synonym, suburb),
                        geo.paths().suburb_service(&service.slug, suburb),
                    ));
                }
            }
        }

        tracing::debug!(rules = rules.len(), "static redirect rules");
        rules
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;
    use areakit_core::data::SuburbRecord;

    fn location(geo: &Geo, path: &str) -> Option<String> {
        geo.redirector().resolve(path, None).map(|r| r.location)
    }

    #[test]
    fn test_legacy_redirect_table() {
        let geo = fixtures::geo();
        let cases = [
            ("/areas/brisbane-west/", "/areas/brisbane/"),
            ("/areas/ipswich-region/", "/areas/ipswich/"),
            ("/areas/ipswich-region/goodna/", "/areas/ipswich/goodna/"),
            ("/blog/brisbane-west/checklist/", "/blog/brisbane/checklist/"),
            ("/blog/ipswich-region/local/", "/blog/ipswich/local/"),
            ("/bond-cleaners/redbank-plains/", "/services/bond-cleaning/redbank-plains/"),
            ("/end-of-lease-cleaning/kenmore/", "/services/bond-cleaning/kenmore/"),
            ("/house-cleaning/indooroopilly/", "/services/spring-cleaning/indooroopilly/"),
            ("/shower-screen-restoration/goodna/", "/services/bathroom-deep-clean/goodna/"),
            (
                "/services/bond-cleaning/brisbane-west/indooroopilly/",
                "/services/bond-cleaning/indooroopilly/",
            ),
        ];
        for (from, to) in cases {
            let redirect = geo.redirector().resolve(from, None);
            assert_eq!(
                redirect,
                Some(Redirect {
                    status: 301,
                    location: to.to_string()
                }),
                "{from}"
            );
        }
    }

    #[test]
    fn test_canonical_paths_pass_through() {
        let geo = fixtures::geo();
        for path in [
            "/",
            "/areas/ipswich/",
            "/blog/brisbane/checklist/",
            "/services/bond-cleaning/redbank-plains/",
            "/sitemap.xml",
        ] {
            assert_eq!(location(&geo, path), None, "{path}");
        }
    }

    #[test]
    fn test_synonym_with_unknown_suburb_is_not_redirected() {
        let geo = fixtures::geo();
        assert_eq!(location(&geo, "/bond-cleaners/atlantis/"), None);
    }

    #[test]
    fn test_query_string_preserved() {
        let geo = fixtures::geo();
        let r = geo
            .redirector()
            .resolve("/areas/brisbane-west/", Some("utm_source=x&b=2"))
            .unwrap();
        assert_eq!(r.location, "/areas/brisbane/?utm_source=x&b=2");
        let r = geo.redirector().resolve("/areas/brisbane-west/", Some("")).unwrap();
        assert_eq!(r.location, "/areas/brisbane/");
    }

    #[test]
    fn test_trailing_slash_and_duplicate_slashes() {
        let geo = fixtures::geo();
        assert_eq!(location(&geo, "/areas/ipswich").as_deref(), Some("/areas/ipswich/"));
        assert_eq!(location(&geo, "/services//bond-cleaning/").as_deref(), Some("/services/bond-cleaning/"));
        assert_eq!(location(&geo, "/areas//brisbane-west").as_deref(), Some("/areas/brisbane/"));
    }

    #[test]
    fn test_cluster_strip_needs_known_cluster() {
        let geo = fixtures::geo();
        assert_eq!(location(&geo, "/services/bond-cleaning/narnia/indooroopilly/"), None);
    }

    #[test]
    fn test_custom_blog_base() {
        let mut config = fixtures::config();
        config.site.blog_base = BlogBase::new("guides");
        let geo = Geo::new(&config, &fixtures::datasets());
        assert_eq!(location(&geo, "/blog/").as_deref(), Some("/guides/"));
        assert_eq!(
            location(&geo, "/blog/ipswich/bond-tips/").as_deref(),
            Some("/guides/ipswich/bond-tips/")
        );
        assert_eq!(
            location(&geo, "/guides/ipswich-region/").as_deref(),
            Some("/guides/ipswich/")
        );
        assert_eq!(location(&geo, "/guides/ipswich/"), None);
    }

    #[test]
    fn test_blog_base_under_legacy_blog_settles() {
        let mut config = fixtures::config();
        config.site.blog_base = BlogBase::new("/blog/guides/");
        let geo = Geo::new(&config, &fixtures::datasets());
        assert_eq!(location(&geo, "/blog/guides/"), None);
        assert_eq!(location(&geo, "/blog/guides/ipswich/"), None);
        assert_eq!(
            location(&geo, "/blog/guides/ipswich-region/tips/").as_deref(),
            Some("/blog/guides/ipswich/tips/")
        );
        assert_eq!(location(&geo, "/blog/guides/ipswich/tips/"), None);
        assert!(!geo.redirector().static_rules().iter().any(|(f, _)| f == "/blog/*"));
    }

    #[test]
    fn test_redirects_always_settle() {
        for base in ["/blog/", "/guides/", "/resources/guides/", "/blog/guides/"] {
            let mut config = fixtures::config();
            config.site.blog_base = BlogBase::new(base);
            let geo = Geo::new(&config, &fixtures::datasets());
            for start in ["/blog/ipswich-region/x/", "/blog/guides/ipswich/", "/areas/brisbane-west"] {
                let mut path = start.to_string();
                let mut hops = 0;
                while let Some(next) = location(&geo, &path) {
                    assert_ne!(next, path, "{base}: {start} redirects to itself");
                    path = next;
                    hops += 1;
                    assert!(hops <= 3, "{base}: {start} did not settle");
                }
            }
        }
    }

    #[test]
    fn test_suburbs_file_only_suburb_matches_static_rules() {
        let mut data = fixtures::datasets();
        data.suburbs.push(SuburbRecord {
            slug: None,
            name: "Sherwood".into(),
            postcode: None,
            state: None,
            cluster: None,
        });
        let geo = Geo::new(&fixtures::config(), &data);
        assert_eq!(
            location(&geo, "/house-cleaning/sherwood/").as_deref(),
            Some("/services/spring-cleaning/sherwood/")
        );

        for (from, to) in geo.redirector().static_rules() {
            if from.contains('*') {
                continue;
            }
            assert_eq!(location(&geo, &from).as_deref(), Some(to.as_str()), "{from}");
        }
    }

    #[test]
    fn test_static_rules() {
        let geo = fixtures::geo();
        let rules = geo.redirector().static_rules();
        let has = |from: &str, to: &str| rules.iter().any(|(f, t)| f == from && t == to);
        assert!(has("/areas/brisbane-west/*", "/areas/brisbane/:splat"));
        assert!(has("/blog/ipswich-region/*", "/blog/ipswich/:splat"));
        assert!(has("/house-cleaning/kenmore/", "/services/spring-cleaning/kenmore/"));
        assert!(!rules.iter().any(|(f, _)| f == "/blog/*"));
    }
}
