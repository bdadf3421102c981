//! Anchor href harvesting from directory listing markup.

use scraper::{Html, Selector};
use std::collections::BTreeSet;

/// Return the distinct `href` values of every `<a>` tag in `html`.
///
/// Values are returned verbatim (not resolved against any base), so a
/// directory listing yields the file names exactly as the server lists them.
/// Malformed markup is parsed leniently; empty hrefs are skipped.
pub fn extract_hrefs(html: &str) -> BTreeSet<String> {
    let document = Html::parse_document(html);
    let selector = Selector::parse("a[href]").expect("invalid selector");

    document
        .select(&selector)
        .filter_map(|element| element.value().attr("href"))
        .filter(|href| !href.is_empty())
        .map(str::to_string)
        .collect()
}
