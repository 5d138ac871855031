//! The page matrix and companion files for one site build.

use crate::faq::suburb_faq;
use crate::html::{Page, anchor, html_escape, link_list, rel_block, rel_grid, rel_services, render_page};
use crate::reviews::{PublicReview, ReviewStore};
use crate::schema::{Crumb, PlaceInfo, build_graph, document, faq_anchor, faq_page, service_area_graph};
use crate::sitemap::render_sitemap;
use areakit_core::data::{Datasets, FaqItem};
use areakit_core::paths::absolute_url;
use areakit_core::slug::unslug_to_name;
use areakit_core::types::{ServiceDef, SiteConfig};
use areakit_core::{Error, Result};
use areakit_geo::{Geo, RelatedLink, RelatedQuery};
use chrono::NaiveDate;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

/// Reviews shown on a suburb service page
const REVIEWS_SHOWN: usize = 6;

#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    /// Inject the live-reload hook
    pub preview: bool,
    pub lastmod: Option<NaiveDate>,
}

pub struct GeneratedSite {
    pub pages: Vec<(String, String)>,   // (url path, html)
    pub assets: Vec<(String, Vec<u8>)>, // (file path, data)
}

impl GeneratedSite {
    pub fn page_paths(&self) -> impl Iterator<Item = &str> {
        self.pages.iter().map(|(path, _)| path.as_str())
    }

    /// Write every page and asset below `out`, creating directories as needed
    pub fn write_to(&self, out: &Path) -> Result<()> {
        for (path, html) in &self.pages {
            let file = out.join(output_file(path));
            if let Some(parent) = file.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&file, html)?;
        }
        for (path, data) in &self.assets {
            let file = out.join(path.trim_start_matches('/'));
            if let Some(parent) = file.parent() {
                fs::create_dir_all(parent)?;
            }
            fs::write(&file, data)?;
        }
        Ok(())
    }
}

/// `/` → `index.html`, `/areas/ipswich/` → `areas/ipswich/index.html`
pub fn output_file(path: &str) -> PathBuf {
    let trimmed = path.trim_matches('/');
    if trimmed.is_empty() {
        PathBuf::from("index.html")
    } else {
        PathBuf::from(trimmed).join("index.html")
    }
}

struct Builder<'a> {
    config: &'a SiteConfig,
    geo: &'a Geo,
    data: &'a Datasets,
    reviews: ReviewStore,
    options: &'a BuildOptions,
}

/// Build every page of the site plus `sitemap.xml`, `_redirects`,
/// `robots.txt` and `crossServiceMap.json`.
pub fn generate_site(config: &SiteConfig, data: &Datasets, options: &BuildOptions) -> Result<GeneratedSite> {
    let geo = Geo::new(config, data);
    let builder = Builder {
        config,
        geo: &geo,
        data,
        reviews: ReviewStore::new(&data.reviews, &config.reviews),
        options,
    };

    let mut pages = vec![
        builder.home(),
        builder.services_index(),
        builder.areas_index(),
        builder.blog_index(),
    ];

    for service in geo.services() {
        pages.push(builder.service_hub(service));
        for suburb in geo.index().known_suburbs() {
            if geo.is_service_covered(&service.slug, suburb) {
                pages.push(builder.suburb_service(service, suburb));
            }
        }
    }

    for cluster in geo.index().all_clusters() {
        pages.push(builder.area_cluster(&cluster));
        pages.push(builder.blog_cluster(&cluster));
    }
    for area in geo.index().area_suburb_paths() {
        pages.push(builder.area_suburb(&area.cluster, &area.suburb));
    }

    let origin = &config.site.origin;
    let sitemap = render_sitemap(origin, pages.iter().map(|(p, _)| p.as_str()), options.lastmod);

    let redirects: String = geo
        .redirector()
        .static_rules()
        .into_iter()
        .map(|(from, to)| format!("{} {} 301\n", from, to))
        .collect();

    let cross_map = serde_json::to_vec_pretty(&geo.cross_service_map())
        .map_err(|e| Error::InvalidData(format!("crossServiceMap.json: {}", e)))?;

    let robots = format!(
        "User-agent: *\nAllow: /\n\nSitemap: {}\n",
        absolute_url(origin, &config.paths().sitemap())
    );

    let assets = vec![
        ("sitemap.xml".to_string(), sitemap.into_bytes()),
        ("_redirects".to_string(), redirects.into_bytes()),
        ("robots.txt".to_string(), robots.into_bytes()),
        ("crossServiceMap.json".to_string(), cross_map),
    ];

    tracing::info!(pages = pages.len(), assets = assets.len(), "site generated");
    Ok(GeneratedSite { pages, assets })
}

impl Builder<'_> {
    fn origin(&self) -> &str {
        &self.config.site.origin
    }

    fn cluster_name(&self, cluster: &str) -> String {
        unslug_to_name(cluster)
    }

    fn render(
        &self,
        path: String,
        title: &str,
        description: &str,
        json_ld: Vec<Value>,
        main: &str,
        footer: Option<String>,
    ) -> (String, String) {
        let canonical = absolute_url(self.origin(), &path);
        let footer = footer.unwrap_or_else(|| self.footer());
        let html = render_page(
            &Page {
                title,
                description,
                canonical: &canonical,
                json_ld: &json_ld,
                main,
                footer: &footer,
            },
            self.options.preview,
        );
        (path, html)
    }

    fn footer(&self) -> String {
        let paths = self.geo.paths();
        let business = &self.config.business;
        let links = vec![
            RelatedLink::new("Home", paths.home()),
            RelatedLink::new("Services", paths.service_root()),
            RelatedLink::new("Service areas", paths.areas_root()),
            RelatedLink::new("Guides", paths.blog_root()),
        ];
        format!(
            "<nav aria-label=\"Site\">\n{}\n</nav>\n<p>{} · {} · {}</p>",
            link_list(&links),
            html_escape(&business.name),
            html_escape(&business.phone),
            html_escape(&business.email)
        )
    }

    fn graph(&self, path: &str, crumbs: &[Crumb]) -> Vec<Value> {
        vec![document(build_graph(self.origin(), &self.config.business, path, crumbs))]
    }

    fn home(&self) -> (String, String) {
        let paths = self.geo.paths();
        let business = &self.config.business;

        let services: Vec<RelatedLink> = self
            .geo
            .services()
            .iter()
            .map(|s| RelatedLink::new(s.label.clone(), paths.service(&s.slug)))
            .collect();
        let areas: Vec<RelatedLink> = self
            .geo
            .index()
            .all_clusters()
            .iter()
            .map(|c| RelatedLink::new(self.cluster_name(c), paths.area_cluster(c)))
            .collect();

        let main = format!(
            "<h1>{}</h1>\n<p>{}</p>\n<h2>Services</h2>\n{}\n<h2>Service areas</h2>\n{}",
            html_escape(&business.name),
            html_escape(&business.tagline),
            link_list(&services),
            link_list(&areas)
        );
        let title = if business.tagline.is_empty() {
            business.name.clone()
        } else {
            format!("{} | {}", business.tagline, business.name)
        };
        self.render(
            paths.home(),
            &title,
            &business.tagline,
            self.graph(&paths.home(), &[]),
            &main,
            None,
        )
    }

    fn services_index(&self) -> (String, String) {
        let paths = self.geo.paths();
        let path = paths.service_root();
        let links: Vec<RelatedLink> = self
            .geo
            .services()
            .iter()
            .map(|s| RelatedLink::new(s.label.clone(), paths.service(&s.slug)))
            .collect();
        let main = format!("<h1>Our services</h1>\n{}", link_list(&links));
        let crumbs = [Crumb::new("Home", paths.home()), Crumb::new("Services", path.clone())];
        let title = format!("Services | {}", self.config.business.name);
        let json_ld = self.graph(&path, &crumbs);
        self.render(path, &title, "Every cleaning service we offer.", json_ld, &main, None)
    }

    /// One section per cluster listing the suburbs the service covers
    fn service_hub(&self, service: &ServiceDef) -> (String, String) {
        let paths = self.geo.paths();
        let path = paths.service(&service.slug);
        let label = html_escape(&service.label);

        let mut main = format!("<h1>{}</h1>\n", label);
        for cluster in self.geo.index().all_clusters() {
            let covered: Vec<&String> = self
                .geo
                .index()
                .list_suburbs_for_cluster(&cluster)
                .iter()
                .filter(|s| self.geo.is_service_covered(&service.slug, s))
                .collect();
            if covered.is_empty() {
                continue;
            }
            let links: Vec<RelatedLink> = covered
                .iter()
                .map(|s| {
                    RelatedLink::new(
                        self.geo.index().display_name(s),
                        paths.suburb_service(&service.slug, s),
                    )
                })
                .collect();
            main.push_str(&format!(
                "<section>\n<h2>{}</h2>\n",
                html_escape(&self.cluster_name(&cluster))
            ));
            if let Some(rep) = self.geo.rep_suburb(&cluster, Some(&service.slug)) {
                let featured = RelatedLink::new(
                    self.geo.index().display_name(&rep),
                    paths.suburb_service(&service.slug, &rep),
                );
                main.push_str(&format!("<p>Most booked: {}</p>\n", anchor(&featured)));
            }
            main.push_str(&link_list(&links));
            main.push_str("\n</section>\n");
        }

        let crumbs = [
            Crumb::new("Home", paths.home()),
            Crumb::new("Services", paths.service_root()),
            Crumb::new(service.label.clone(), path.clone()),
        ];
        let title = format!("{} | {}", service.label, self.config.business.name);
        let description = format!("{} across every suburb we serve.", service.label);
        let json_ld = self.graph(&path, &crumbs);
        self.render(path, &title, &description, json_ld, &main, None)
    }

    /// The service × suburb page carrying the related-link blocks
    fn suburb_service(&self, service: &ServiceDef, suburb: &str) -> (String, String) {
        let geo = self.geo;
        let paths = geo.paths();
        let links = geo.link_settings();
        let path = paths.suburb_service(&service.slug, suburb);
        let name = geo.index().display_name(suburb);
        let cluster = geo.index().cluster_for_suburb(suburb).map(str::to_string);

        let block = geo.related_service_links(
            RelatedQuery::new(suburb)
                .service(&service.slug)
                .include_self(false)
                .count(links.block_cap),
        );
        let grid = geo.related_service_links(
            RelatedQuery::new(suburb)
                .service(&service.slug)
                .include_self(false)
                .count(links.grid_cap),
        );
        let cards = geo.to_service_cards(&geo.cross_service_items(suburb, &service.slug), suburb);
        let faq = suburb_faq(&self.data.faq, &name, suburb);
        let reviews = self.reviews.reviews(&service.slug, suburb);
        let rating = self.reviews.aggregate(&service.slug, suburb);

        let mut main = format!(
            "<h1>{label} in {name}</h1>\n<p>{business} provides {lower} in {name}{area}. {tagline}</p>\n",
            label = html_escape(&service.label),
            name = html_escape(&name),
            business = html_escape(&self.config.business.name),
            lower = html_escape(&service.label.to_lowercase()),
            area = cluster
                .as_deref()
                .map(|c| format!(" and across the {} area", html_escape(&self.cluster_name(c))))
                .unwrap_or_default(),
            tagline = html_escape(&self.config.business.tagline),
        );
        main.push_str(&rel_block("Nearby areas", &block, links.block_cap));
        main.push('\n');
        main.push_str(&rel_services(&format!("Other services in {}", name), &cards));
        main.push('\n');
        main.push_str(&reviews_section(&reviews[..reviews.len().min(REVIEWS_SHOWN)]));
        main.push_str(&faq_section(&faq));
        main.push_str(&rel_grid(&format!("{} in nearby suburbs", service.label), &grid, links.grid_cap));

        let record = geo.index().suburb_record(suburb);
        let place = PlaceInfo {
            slug: suburb,
            name: &name,
            postcode: record.and_then(|r| r.postcode.as_deref()),
            state: record.and_then(|r| r.state.as_deref()),
        };
        let mut nodes = service_area_graph(
            self.origin(),
            &self.config.business,
            service,
            &place,
            &path,
            rating.as_ref(),
            self.config.reviews.allow_local_business_ratings,
        );
        let crumbs = [
            Crumb::new("Home", paths.home()),
            Crumb::new("Services", paths.service_root()),
            Crumb::new(service.label.clone(), paths.service(&service.slug)),
            Crumb::new(name.clone(), path.clone()),
        ];
        nodes.extend(
            build_graph(self.origin(), &self.config.business, &path, &crumbs)
                .into_iter()
                .filter(|n| n["@type"] == "WebSite" || n["@type"] == "BreadcrumbList"),
        );
        nodes.extend(faq_page(self.origin(), &path, &faq));

        let footer = format!(
            "<nav data-crosslinks aria-label=\"More in {}\">\n{}\n</nav>\n{}",
            html_escape(&name),
            link_list(&geo.suburb_cross_links(suburb)),
            self.footer()
        );
        let title = format!("{} {} | {}", service.label, name, self.config.business.name);
        let description = format!("{} in {}, {}.", service.label, name, self.config.business.region);
        self.render(path, &title, &description, vec![document(nodes)], &main, Some(footer))
    }

    fn areas_index(&self) -> (String, String) {
        let paths = self.geo.paths();
        let path = paths.areas_root();
        let links: Vec<RelatedLink> = self
            .geo
            .index()
            .all_clusters()
            .iter()
            .map(|c| {
                let count = self.geo.index().list_suburbs_for_cluster(c).len();
                RelatedLink::new(
                    format!("{} ({} suburbs)", self.cluster_name(c), count),
                    paths.area_cluster(c),
                )
            })
            .collect();
        let main = format!("<h1>Service areas</h1>\n{}", link_list(&links));
        let crumbs = [Crumb::new("Home", paths.home()), Crumb::new("Areas", path.clone())];
        let title = format!("Service areas | {}", self.config.business.name);
        let json_ld = self.graph(&path, &crumbs);
        self.render(path, &title, "Suburbs we clean in.", json_ld, &main, None)
    }

    fn area_cluster(&self, cluster: &str) -> (String, String) {
        let paths = self.geo.paths();
        let path = paths.area_cluster(cluster);
        let cluster_name = self.cluster_name(cluster);
        let links: Vec<RelatedLink> = self
            .geo
            .index()
            .list_suburbs_for_cluster(cluster)
            .iter()
            .map(|s| RelatedLink::new(self.geo.index().display_name(s), paths.area_suburb(cluster, s)))
            .collect();

        let mut main = format!("<h1>{} service areas</h1>\n", html_escape(&cluster_name));
        if let Some(rep) = self.geo.rep_suburb(cluster, None) {
            let hub = RelatedLink::new(self.geo.index().display_name(&rep), paths.area_suburb(cluster, &rep));
            main.push_str(&format!("<p>Start with {}.</p>\n", anchor(&hub)));
        }
        main.push_str(&link_list(&links));
        main.push_str(&format!(
            "\n<p>{}</p>",
            anchor(&RelatedLink::new(format!("{} cleaning guides", cluster_name), paths.blog_cluster(cluster)))
        ));

        let crumbs = [
            Crumb::new("Home", paths.home()),
            Crumb::new("Areas", paths.areas_root()),
            Crumb::new(cluster_name.clone(), path.clone()),
        ];
        let title = format!("{} | {}", cluster_name, self.config.business.name);
        let description = format!("Cleaning services across {}.", cluster_name);
        let json_ld = self.graph(&path, &crumbs);
        self.render(path, &title, &description, json_ld, &main, None)
    }

    /// Suburb hub: every service, here or at the nearest covered suburb
    fn area_suburb(&self, cluster: &str, suburb: &str) -> (String, String) {
        let geo = self.geo;
        let paths = geo.paths();
        let path = paths.area_suburb(cluster, suburb);
        let name = geo.index().display_name(suburb);
        let cluster_name = self.cluster_name(cluster);

        let services: Vec<RelatedLink> = geo
            .services()
            .iter()
            .filter_map(|s| {
                if geo.is_service_covered(&s.slug, suburb) {
                    return Some(RelatedLink::new(s.label.clone(), paths.suburb_service(&s.slug, suburb)));
                }
                let pick = geo.nearby_covered_single(suburb, &s.slug)?;
                Some(RelatedLink::new(
                    format!("{} (nearby in {})", s.label, geo.index().display_name(&pick.suburb)),
                    paths.suburb_service(&s.slug, &pick.suburb),
                ))
            })
            .collect();
        let siblings: Vec<RelatedLink> = geo
            .index()
            .list_suburbs_for_cluster(cluster)
            .iter()
            .filter(|s| s.as_str() != suburb)
            .map(|s| RelatedLink::new(geo.index().display_name(s), paths.area_suburb(cluster, s)))
            .collect();
        let faq = suburb_faq(&self.data.faq, &name, suburb);

        let main = format!(
            "<h1>Cleaning in {}</h1>\n<h2>Services</h2>\n{}\n{}<h2>Also in {}</h2>\n{}",
            html_escape(&name),
            link_list(&services),
            faq_section(&faq),
            html_escape(&cluster_name),
            link_list(&siblings)
        );

        let crumbs = [
            Crumb::new("Home", paths.home()),
            Crumb::new("Areas", paths.areas_root()),
            Crumb::new(cluster_name.clone(), paths.area_cluster(cluster)),
            Crumb::new(name.clone(), path.clone()),
        ];
        let mut nodes = build_graph(self.origin(), &self.config.business, &path, &crumbs);
        nodes.extend(faq_page(self.origin(), &path, &faq));
        let title = format!("{} | {}", name, self.config.business.name);
        let description = format!("Cleaning services in {}, {}.", name, cluster_name);
        self.render(path, &title, &description, vec![document(nodes)], &main, None)
    }

    fn blog_index(&self) -> (String, String) {
        let paths = self.geo.paths();
        let path = paths.blog_root();
        let links: Vec<RelatedLink> = self
            .geo
            .index()
            .all_clusters()
            .iter()
            .map(|c| RelatedLink::new(format!("{} guides", self.cluster_name(c)), paths.blog_cluster(c)))
            .collect();
        let main = format!("<h1>Cleaning guides</h1>\n{}", link_list(&links));
        let crumbs = [Crumb::new("Home", paths.home()), Crumb::new("Guides", path.clone())];
        let title = format!("Guides | {}", self.config.business.name);
        let json_ld = self.graph(&path, &crumbs);
        self.render(path, &title, "Local cleaning guides.", json_ld, &main, None)
    }

    /// Cluster guide landing, pointing each service at the cluster's best-connected suburb
    fn blog_cluster(&self, cluster: &str) -> (String, String) {
        let geo = self.geo;
        let paths = geo.paths();
        let path = paths.blog_cluster(cluster);
        let cluster_name = self.cluster_name(cluster);

        let links: Vec<RelatedLink> = geo
            .services()
            .iter()
            .filter(|s| !geo.covered_in_cluster(&s.slug, cluster).is_empty())
            .filter_map(|s| {
                let rep = geo.rep_suburb(cluster, Some(&s.slug))?;
                Some(RelatedLink::new(
                    format!("{} in {}", s.label, geo.index().display_name(&rep)),
                    paths.suburb_service(&s.slug, &rep),
                ))
            })
            .collect();

        let main = format!(
            "<h1>{} cleaning guides</h1>\n<h2>Popular services</h2>\n{}\n<p>{}</p>",
            html_escape(&cluster_name),
            link_list(&links),
            anchor(&RelatedLink::new(format!("All {} suburbs", cluster_name), paths.area_cluster(cluster)))
        );
        let crumbs = [
            Crumb::new("Home", paths.home()),
            Crumb::new("Guides", paths.blog_root()),
            Crumb::new(cluster_name.clone(), path.clone()),
        ];
        let title = format!("{} guides | {}", cluster_name, self.config.business.name);
        let description = format!("Cleaning guides for {}.", cluster_name);
        let json_ld = self.graph(&path, &crumbs);
        self.render(path, &title, &description, json_ld, &main, None)
    }
}

fn faq_section(items: &[FaqItem]) -> String {
    if items.is_empty() {
        return String::new();
    }
    let entries: String = items
        .iter()
        .map(|item| {
            format!(
                "<details id=\"{}\"><summary>{}</summary><p>{}</p></details>\n",
                faq_anchor(&item.question),
                html_escape(&item.question),
                html_escape(&item.answer)
            )
        })
        .collect();
    format!("<section id=\"faq\">\n<h2>Frequently asked questions</h2>\n{}</section>\n", entries)
}

fn reviews_section(reviews: &[PublicReview]) -> String {
    if reviews.is_empty() {
        return String::new();
    }
    let entries: String = reviews
        .iter()
        .map(|r| {
            let stars = r.stars.map(|s| format!(" ({}★)", s)).unwrap_or_default();
            format!(
                "<li><blockquote>{}</blockquote><cite>{}{}</cite></li>\n",
                html_escape(r.body.as_deref().unwrap_or("")),
                html_escape(r.author.as_deref().unwrap_or("Verified customer")),
                stars
            )
        })
        .collect();
    format!("<section id=\"reviews\">\n<h2>Reviews</h2>\n<ul>\n{}</ul>\n</section>\n", entries)
}
