//! Site URL builders.
//!
//! Every page path ends with a slash; file-like paths (`/sitemap.xml`) never do.

use crate::slug::slugify;

pub fn trim_slashes(s: &str) -> &str {
    s.trim_matches('/')
}

/// Collapse runs of `/` into one
pub fn squash_slashes(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut prev_slash = false;
    for c in s.chars() {
        if c == '/' {
            if !prev_slash {
                out.push(c);
            }
            prev_slash = true;
        } else {
            out.push(c);
            prev_slash = false;
        }
    }
    out
}

/// True when the last path segment carries a file extension
pub fn looks_like_file(path: &str) -> bool {
    let last = path.rsplit('/').next().unwrap_or("");
    match last.rsplit_once('.') {
        Some((stem, ext)) => {
            !stem.is_empty() && !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric())
        }
        None => false,
    }
}

pub fn with_trailing_slash(path: &str) -> String {
    if path.is_empty()
        || path.ends_with('/')
        || path.contains('?')
        || path.contains('#')
        || looks_like_file(path)
    {
        return path.to_string();
    }
    format!("{}/", path)
}

/// Join segments into `/a/b/c/`, ignoring stray slashes in the parts
pub fn join(parts: &[&str]) -> String {
    let inner: Vec<&str> = parts
        .iter()
        .map(|p| trim_slashes(p))
        .filter(|p| !p.is_empty())
        .collect();
    if inner.is_empty() {
        return "/".to_string();
    }
    with_trailing_slash(&squash_slashes(&format!("/{}", inner.join("/"))))
}

/// Absolute URL for a site path. Already-absolute URLs pass through.
pub fn absolute_url(origin: &str, path: &str) -> String {
    if path.starts_with("http://") || path.starts_with("https://") {
        return path.to_string();
    }
    let origin = origin.trim_end_matches('/');
    if path.is_empty() {
        return origin.to_string();
    }
    let path = path.trim_start_matches('/');
    format!("{}/{}", origin, path)
}

/// Normalised blog base, always of the form `/<segment>/`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlogBase(String);

impl BlogBase {
    pub fn new(raw: &str) -> Self {
        let seg = trim_slashes(raw.trim());
        if seg.is_empty() {
            return BlogBase("/blog/".to_string());
        }
        BlogBase(squash_slashes(&format!("/{}/", seg)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// `blog` for `/blog/`, `resources/guides` for `/resources/guides/`
    pub fn segment(&self) -> &str {
        trim_slashes(&self.0)
    }

    pub fn without_trailing(&self) -> &str {
        self.0.trim_end_matches('/')
    }

    pub fn is_default(&self) -> bool {
        self.0 == "/blog/"
    }

    /// True for bases like `/blog/guides/` that sit inside the legacy blog
    pub fn is_nested_under_default(&self) -> bool {
        !self.is_default() && self.0.starts_with("/blog/")
    }
}

impl Default for BlogBase {
    fn default() -> Self {
        BlogBase("/blog/".to_string())
    }
}

/// Relative path builders for every page kind on the site
#[derive(Debug, Clone, Default)]
pub struct Paths {
    blog_base: BlogBase,
}

impl Paths {
    pub fn new(blog_base: BlogBase) -> Self {
        Self { blog_base }
    }

    pub fn blog_base(&self) -> &BlogBase {
        &self.blog_base
    }

    pub fn home(&self) -> String {
        "/".to_string()
    }

    pub fn blog_root(&self) -> String {
        join(&[self.blog_base.segment()])
    }

    pub fn blog_cluster(&self, cluster: &str) -> String {
        join(&[self.blog_base.segment(), &slugify(cluster)])
    }

    pub fn blog_category(&self, cluster: &str, category: &str) -> String {
        join(&[
            self.blog_base.segment(),
            &slugify(cluster),
            "category",
            &slugify(category),
        ])
    }

    pub fn blog_post(&self, cluster: &str, slug: &str) -> String {
        join(&[self.blog_base.segment(), &slugify(cluster), &slugify(slug)])
    }

    pub fn service_root(&self) -> String {
        "/services/".to_string()
    }

    pub fn service(&self, service: &str) -> String {
        join(&["services", service])
    }

    pub fn suburb_service(&self, service: &str, suburb: &str) -> String {
        join(&["services", service, suburb])
    }

    pub fn areas_root(&self) -> String {
        "/areas/".to_string()
    }

    pub fn area_cluster(&self, cluster: &str) -> String {
        join(&["areas", &slugify(cluster)])
    }

    pub fn area_suburb(&self, cluster: &str, suburb: &str) -> String {
        join(&["areas", &slugify(cluster), suburb])
    }

    pub fn privacy(&self) -> String {
        "/privacy/".to_string()
    }

    pub fn terms(&self) -> String {
        "/terms/".to_string()
    }

    pub fn gallery(&self) -> String {
        "/gallery/".to_string()
    }

    pub fn quote(&self) -> String {
        "/quote/".to_string()
    }

    pub fn sitemap(&self) -> String {
        "/sitemap.xml".to_string()
    }
}
