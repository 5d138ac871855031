//! Audits over a built site directory.

use crate::ValidationReport;
use areakit_core::{Error, Result};
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

fn html_files(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter(|e| e.path().extension().is_some_and(|ext| ext == "html"))
        .map(|e| e.into_path())
        .collect();
    files.sort();
    files
}

fn display(dir: &Path, file: &Path) -> String {
    file.strip_prefix(dir).unwrap_or(file).display().to_string()
}

/// Tag patterns shared by both audits, compiled once per run
struct Patterns {
    relblock_open: Regex,
    relgrid_open: Regex,
    nav_close: Regex,
    section_close: Regex,
    anchor: Regex,
    quoted_anchor: Regex,
    main_block: Regex,
    tag: Regex,
}

impl Patterns {
    fn new() -> Result<Self> {
        let re = |pattern: &str| {
            Regex::new(pattern)
                .map_err(|e| Error::InvalidData(format!("audit pattern '{}': {}", pattern, e)))
        };
        Ok(Patterns {
            relblock_open: re(r"(?i)<nav[^>]*data-relblock[^>]*>")?,
            relgrid_open: re(r"(?i)<section[^>]*data-relgrid[^>]*>")?,
            nav_close: re(r"(?i)</nav>")?,
            section_close: re(r"(?i)</section>")?,
            anchor: re(r"(?i)<a\s+[^>]*href=")?,
            quoted_anchor: re(r#"(?i)<a\s+[^>]*href=['"][^'"]+['"][^>]*>"#)?,
            main_block: re(r"(?is)<main[^>]*>.*?</main>")?,
            tag: re(r"<[^>]*>")?,
        })
    }

    fn count_anchors(&self, segment: &str) -> usize {
        self.anchor.find_iter(segment).count()
    }

    /// `<main>…</main>`, or empty when the page has none
    fn main<'a>(&self, html: &'a str) -> &'a str {
        self.main_block.find(html).map(|m| m.as_str()).unwrap_or("")
    }

    /// Words left once every tag is replaced by a space
    fn word_count(&self, html: &str) -> usize {
        self.tag.replace_all(html, " ").split_whitespace().count()
    }
}

/// Everything after each opening tag, up to the first closing tag
fn blocks_after<'a>(html: &'a str, open: &Regex, close: &Regex) -> Vec<&'a str> {
    open.find_iter(html)
        .map(|m| {
            let body = &html[m.end()..];
            match close.find(body) {
                Some(end) => &body[..end.start()],
                None => body,
            }
        })
        .collect()
}

/// Fail any page whose related-link nav or grid carries more anchors than allowed
pub fn audit_related_links(dir: &Path, block_cap: usize, grid_cap: usize) -> Result<ValidationReport> {
    let patterns = Patterns::new()?;
    let mut report = ValidationReport::default();
    let files = html_files(dir);

    for file in &files {
        let html = fs::read_to_string(file)?;
        for block in blocks_after(&html, &patterns.relblock_open, &patterns.nav_close) {
            let anchors = patterns.count_anchors(block);
            if anchors > block_cap {
                report.error(format!(
                    "Too many related links ({}) in {}",
                    anchors,
                    display(dir, file)
                ));
            }
        }
        for grid in blocks_after(&html, &patterns.relgrid_open, &patterns.section_close) {
            let anchors = patterns.count_anchors(grid);
            if anchors > grid_cap {
                report.error(format!(
                    "Too many related grid links ({}) in {}",
                    anchors,
                    display(dir, file)
                ));
            }
        }
    }

    report.note(format!("{} pages checked for related-link caps", files.len()));
    Ok(report)
}

/// Warn about thin pages: too few words or links inside `<main>`
pub fn audit_content(dir: &Path, min_words: usize, min_links: usize) -> Result<ValidationReport> {
    let patterns = Patterns::new()?;
    let mut report = ValidationReport::default();
    let files = html_files(dir);
    let mut thin = 0;

    for file in &files {
        let html = fs::read_to_string(file)?;
        let main = patterns.main(&html);
        let words = patterns.word_count(main);
        let links = patterns.quoted_anchor.find_iter(main).count();
        if words < min_words || links < min_links {
            thin += 1;
            report.warn(format!(
                "{}: {} words, {} links in <main>",
                display(dir, file),
                words,
                links
            ));
        }
    }

    tracing::debug!(pages = files.len(), thin, "content audit");
    report.note(format!("{} of {} pages below content thresholds", thin, files.len()));
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn anchors(n: usize) -> String {
        (0..n)
            .map(|i| format!("<li><a href=\"/s{i}/\">S{i}</a></li>"))
            .collect()
    }

    fn write(dir: &TempDir, rel: &str, html: &str) {
        let path = dir.path().join(rel);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, html).unwrap();
    }

    #[test]
    fn test_count_anchors() {
        let patterns = Patterns::new().unwrap();
        assert_eq!(patterns.count_anchors(&anchors(4)), 4);
        assert_eq!(patterns.count_anchors("<abbr>x</abbr><a name=\"x\">"), 0);
        assert_eq!(patterns.count_anchors("<a\nhref='/x/'>x</a>"), 1);
        assert_eq!(patterns.count_anchors("<A CLASS=\"c\" HREF=\"/x/\">x</A>"), 1);
    }

    #[test]
    fn test_blocks_stop_at_first_close() {
        let patterns = Patterns::new().unwrap();
        let html = format!(
            "<nav data-relblock>{}</nav>{}<NAV class=\"r\" data-relblock>{}",
            anchors(2),
            anchors(5),
            anchors(1)
        );
        let blocks = blocks_after(&html, &patterns.relblock_open, &patterns.nav_close);
        let counts: Vec<usize> = blocks.iter().map(|b| patterns.count_anchors(b)).collect();
        assert_eq!(counts, vec![2, 1]);
    }

    #[test]
    fn test_related_links_within_caps() {
        let dir = TempDir::new().unwrap();
        let html = format!(
            "<main><nav data-relblock>{}</nav><section data-relgrid>{}</section></main>",
            anchors(3),
            anchors(6)
        );
        write(&dir, "services/x/y/index.html", &html);
        let report = audit_related_links(dir.path(), 3, 6).unwrap();
        assert!(report.is_ok());
    }

    #[test]
    fn test_related_links_over_caps() {
        let dir = TempDir::new().unwrap();
        let html = format!(
            "<nav aria-label=\"x\" data-relblock>{}</nav><nav>{}</nav><SECTION class=\"g\" data-relgrid>{}</SECTION>",
            anchors(4),
            anchors(10),
            anchors(7)
        );
        write(&dir, "a/index.html", &html);
        let report = audit_related_links(dir.path(), 3, 6).unwrap();
        assert_eq!(report.errors.len(), 2);
        assert!(report.errors[0].contains("(4)"));
        assert!(report.errors[1].contains("(7)"));
    }

    #[test]
    fn test_content_audit() {
        let dir = TempDir::new().unwrap();
        let long = "word ".repeat(720);
        write(
            &dir,
            "rich/index.html",
            &format!("<main><p>{}</p>{}</main>", long, anchors(3)),
        );
        write(
            &dir,
            "thin/index.html",
            "<header><a href=\"/\">Home</a></header><main><p>Short page</p><a href=\"\">x</a></main>",
        );
        let report = audit_content(dir.path(), 700, 3).unwrap();
        assert_eq!(report.warnings.len(), 1);
        assert!(report.warnings[0].contains("thin"));
        assert!(report.warnings[0].contains("3 words, 0 links"));
    }

    #[test]
    fn test_word_count_and_main() {
        let patterns = Patterns::new().unwrap();
        assert_eq!(patterns.word_count("<h1>Bond Cleaning</h1><p>in <b>Goodna</b></p>"), 4);
        assert_eq!(patterns.word_count("one<br/>two"), 2);
        assert_eq!(
            patterns.main("<body>x<MAIN id=\"m\">a b</MAIN>y</body>"),
            "<MAIN id=\"m\">a b</MAIN>"
        );
        assert_eq!(patterns.main("<body>no main</body>"), "");
    }
}
