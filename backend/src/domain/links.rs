//! Event link blocks.
//!
//! Administrators enter links as free text, one link per line:
//! `url, label, ...`. Only lines with at least three comma-separated fields
//! produce an entry; a line with a single comma is dropped. Stored events keep
//! the parsed map, keyed by URL, and the edit form re-renders it as text.

use std::collections::BTreeMap;

/// Ordered mapping from link URL to display label.
pub type LinkMap = BTreeMap<String, String>;

const LINE_SEPARATOR: char = '\n';
const FIELD_SEPARATOR: char = ',';
const MIN_FIELDS: usize = 3;

/// Parse a link block into a URL to label map.
///
/// The URL field is kept verbatim; the label is trimmed. Later lines with the
/// same URL replace earlier ones.
///
/// # Examples
/// ```
/// use cw_backend::domain::parse_links;
///
/// let links = parse_links("http://a.com, LabelA, extra\nhttp://b.com, LabelB\n");
/// assert_eq!(links.len(), 1);
/// assert_eq!(links.get("http://a.com").map(String::as_str), Some("LabelA"));
/// ```
#[must_use]
pub fn parse_links(text: &str) -> LinkMap {
    let mut links = LinkMap::new();
    for line in text.split(LINE_SEPARATOR) {
        let fields: Vec<&str> = line.split(FIELD_SEPARATOR).collect();
        if fields.len() < MIN_FIELDS {
            continue;
        }
        let [url, label, ..] = fields.as_slice() else {
            continue;
        };
        links.insert((*url).to_owned(), label.trim().to_owned());
    }
    links
}

/// Render a link map as an editable block that parses back to the same map.
///
/// Each line carries a trailing comma so it has the three fields
/// [`parse_links`] requires.
///
/// # Examples
/// ```
/// use cw_backend::domain::{format_links_block, parse_links};
///
/// let links = parse_links("http://a.com, Map, \n");
/// let block = format_links_block(&links);
/// assert_eq!(block, "http://a.com, Map,\n");
/// assert_eq!(parse_links(&block), links);
/// ```
#[must_use]
pub fn format_links_block(links: &LinkMap) -> String {
    links
        .iter()
        .map(|(url, label)| format!("{url}, {label},{LINE_SEPARATOR}"))
        .collect()
}
