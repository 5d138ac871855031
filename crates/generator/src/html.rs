//! Minimal HTML shell and the link-block fragments placed inside it.

use areakit_geo::{RelatedLink, ServiceCard};
use serde_json::Value;

/// HTML-escape a string to prevent XSS attacks
///
/// Escapes: & < > " '
pub fn html_escape(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            '&' => "&amp;".to_string(),
            '<' => "&lt;".to_string(),
            '>' => "&gt;".to_string(),
            '"' => "&quot;".to_string(),
            '\'' => "&#x27;".to_string(),
            _ => c.to_string(),
        })
        .collect()
}

/// JSON for a `<script>` element; `</` is split so the payload cannot close the tag
fn script_json(value: &Value) -> String {
    value.to_string().replace("</", "<\\/")
}

pub struct Page<'a> {
    pub title: &'a str,
    pub description: &'a str,
    /// Absolute canonical URL
    pub canonical: &'a str,
    pub json_ld: &'a [Value],
    /// Inner HTML of `<main>`
    pub main: &'a str,
    pub footer: &'a str,
}

/// Render the complete document.
///
/// Preview builds get an SSE reload hook so edits to the site directory
/// refresh the open tab.
pub fn render_page(page: &Page<'_>, is_preview: bool) -> String {
    let json_ld: String = page
        .json_ld
        .iter()
        .map(|v| format!("    <script type=\"application/ld+json\">{}</script>\n", script_json(v)))
        .collect();

    let reload_script = if is_preview {
        r#"<script>
        const eventSource = new EventSource('/_reload');
        eventSource.onmessage = () => location.reload();
        eventSource.onerror = () => eventSource.close();
    </script>"#
    } else {
        ""
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="en-AU">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <meta name="description" content="{description}">
    <link rel="canonical" href="{canonical}">
{json_ld}</head>
<body>
<main>
{main}
</main>
<footer>
{footer}
</footer>
{reload_script}
</body>
</html>
"#,
        title = html_escape(page.title),
        description = html_escape(page.description),
        canonical = html_escape(page.canonical),
        json_ld = json_ld,
        main = page.main,
        footer = page.footer,
        reload_script = reload_script,
    )
}

pub fn anchor(link: &RelatedLink) -> String {
    match &link.aria_label {
        Some(aria) => format!(
            r#"<a href="{}" aria-label="{}">{}</a>"#,
            html_escape(&link.href),
            html_escape(aria),
            html_escape(&link.label)
        ),
        None => format!(
            r#"<a href="{}">{}</a>"#,
            html_escape(&link.href),
            html_escape(&link.label)
        ),
    }
}

fn list_items(links: &[RelatedLink]) -> String {
    links
        .iter()
        .map(|l| format!("<li>{}</li>", anchor(l)))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Compact "nearby areas" nav. Never renders more than `cap` anchors.
pub fn rel_block(heading: &str, links: &[RelatedLink], cap: usize) -> String {
    if links.is_empty() {
        return String::new();
    }
    let shown = &links[..links.len().min(cap)];
    format!(
        "<nav data-relblock aria-label=\"{}\">\n<ul>\n{}\n</ul>\n</nav>",
        html_escape(heading),
        list_items(shown)
    )
}

/// Larger grid of related pages. Never renders more than `cap` anchors.
pub fn rel_grid(heading: &str, links: &[RelatedLink], cap: usize) -> String {
    if links.is_empty() {
        return String::new();
    }
    let shown = &links[..links.len().min(cap)];
    format!(
        "<section data-relgrid>\n<h2>{}</h2>\n<ul>\n{}\n</ul>\n</section>",
        html_escape(heading),
        list_items(shown)
    )
}

pub fn rel_services(heading: &str, cards: &[ServiceCard]) -> String {
    if cards.is_empty() {
        return String::new();
    }
    let items: Vec<String> = cards
        .iter()
        .map(|card| {
            let attrs: String = card
                .attrs
                .iter()
                .map(|(k, v)| format!(" {}=\"{}\"", html_escape(k), html_escape(v)))
                .collect();
            format!(
                "<li{}><a href=\"{}\">{}</a><p>{}</p></li>",
                attrs,
                html_escape(&card.href),
                html_escape(&card.title),
                html_escape(&card.desc)
            )
        })
        .collect();
    format!(
        "<section data-relservices>\n<h2>{}</h2>\n<ul>\n{}\n</ul>\n</section>",
        html_escape(heading),
        items.join("\n")
    )
}

/// Plain link list without audit markers (hubs, indexes, footers)
pub fn link_list(links: &[RelatedLink]) -> String {
    if links.is_empty() {
        return String::new();
    }
    format!("<ul>\n{}\n</ul>", list_items(links))
}
