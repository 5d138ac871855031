//! Slug and name canonicalization shared by every lookup table.
//!
//! Three normal forms are in play:
//! - [`slugify`] turns display names ("Redbank Plains", "Brisbane & Bay")
//!   into URL slugs and is applied when datasets are loaded.
//! - [`norm`] is applied to incoming URL segments: percent-decoded, trimmed,
//!   lowercased.
//! - [`norm_slug`] additionally folds whitespace into `-`, so a lookup by
//!   display name still lands on the slug.

use std::collections::HashSet;
use std::hash::Hash;
use unicode_normalization::UnicodeNormalization;

/// Get a URL-safe slug from a display name
pub fn slugify(text: &str) -> String {
    let stripped: String = text
        .nfkd()
        .filter(|c| !('\u{0300}'..='\u{036f}').contains(c))
        .collect();

    let expanded = stripped
        .replace('&', " and ")
        .replace(['@', '+'], " ")
        .to_lowercase();

    let mut slug = String::with_capacity(expanded.len());
    let mut pending_dash = false;
    for c in expanded.chars() {
        if c.is_ascii_lowercase() || c.is_ascii_digit() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c);
        } else {
            pending_dash = true;
        }
    }
    slug
}

/// Percent-decode, trim and lowercase a raw URL segment.
///
/// Undecodable input is kept as-is rather than rejected.
pub fn norm(raw: &str) -> String {
    let trimmed = raw.trim();
    match urlencoding::decode(trimmed) {
        Ok(decoded) => decoded.trim().to_lowercase(),
        Err(_) => trimmed.to_lowercase(),
    }
}

/// [`norm`] plus whitespace runs folded into a single `-`
pub fn norm_slug(raw: &str) -> String {
    norm(raw).split_whitespace().collect::<Vec<_>>().join("-")
}

/// Fallback prettifier: `redbank-plains` → `Redbank Plains`
pub fn unslug_to_name(slug: &str) -> String {
    norm(slug)
        .split('-')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Order-preserving de-duplication
pub fn uniq_stable<T, I>(items: I) -> Vec<T>
where
    T: Eq + Hash + Clone,
    I: IntoIterator<Item = T>,
{
    let mut seen = HashSet::new();
    items
        .into_iter()
        .filter(|item| seen.insert(item.clone()))
        .collect()
}
