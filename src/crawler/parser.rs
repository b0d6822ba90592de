//! Processer contract and the default HTML link processer
//!
//! `LinkProcesser` parses HTML content to extract:
//! - One record per page (url, status, title)
//! - Links to follow (from <a> tags and canonical links), as child work items

use crate::item::{FetchResult, Record, Yield};
use scraper::{Html, Selector};
use std::collections::HashSet;
use url::Url;

/// Turns a fetch result into discovered work and records
///
/// Called once per successfully fetched item, possibly from many tasks at once.
/// The yield is task-local and must not be retained after returning.
pub trait Processer: Send + Sync {
    fn process(&self, result: &FetchResult, out: &mut Yield);
}

impl<F> Processer for F
where
    F: Fn(&FetchResult, &mut Yield) + Send + Sync,
{
    fn process(&self, result: &FetchResult, out: &mut Yield) {
        self(result, out)
    }
}

/// Extracted information from an HTML page
#[derive(Debug, Clone)]
pub struct ParsedPage {
    /// The page title (from <title> tag)
    pub title: Option<String>,

    /// All links found on the page (absolute URLs)
    pub links: Vec<String>,
}

/// Parses HTML content and extracts links and metadata
///
/// # Link Extraction Rules
///
/// **Include:**
/// - `<a href="...">` tags
/// - `<link rel="canonical" href="...">`
///
/// **Exclude:**
/// - `<a href="..." download>`
/// - `javascript:`, `mailto:`, `tel:` links
/// - Data URIs and fragment-only links
///
/// # Example
///
/// ```no_run
/// use skein::crawler::parse_html;
/// use url::Url;
///
/// let html = r#"<html><head><title>Test</title></head><body><a href="/page">Link</a></body></html>"#;
/// let base_url = Url::parse("https://example.com/").unwrap();
/// let parsed = parse_html(html, &base_url);
/// assert_eq!(parsed.title, Some("Test".to_string()));
/// ```
pub fn parse_html(html: &str, base_url: &Url) -> ParsedPage {
    let document = Html::parse_document(html);

    ParsedPage {
        title: extract_title(&document),
        links: extract_links(&document, base_url),
    }
}

/// Extracts the page title from the HTML document
fn extract_title(document: &Html) -> Option<String> {
    let title_selector = Selector::parse("title").ok()?;

    document
        .select(&title_selector)
        .next()
        .map(|element| element.text().collect::<String>().trim().to_string())
        .filter(|s| !s.is_empty())
}

/// Extracts all valid links from the HTML document
fn extract_links(document: &Html, base_url: &Url) -> Vec<String> {
    let mut links = Vec::new();

    if let Ok(a_selector) = Selector::parse("a[href]") {
        for element in document.select(&a_selector) {
            if element.value().attr("download").is_some() {
                continue;
            }

            if let Some(absolute_url) = element
                .value()
                .attr("href")
                .and_then(|href| resolve_link(href, base_url))
            {
                links.push(absolute_url);
            }
        }
    }

    if let Ok(canonical_selector) = Selector::parse("link[rel='canonical'][href]") {
        for element in document.select(&canonical_selector) {
            if let Some(absolute_url) = element
                .value()
                .attr("href")
                .and_then(|href| resolve_link(href, base_url))
            {
                links.push(absolute_url);
            }
        }
    }

    links
}

/// Resolves a link href to an absolute HTTP(S) URL, or `None` if it should be skipped
fn resolve_link(href: &str, base_url: &Url) -> Option<String> {
    let href = href.trim();

    if href.is_empty() || href.starts_with('#') {
        return None;
    }

    if href.starts_with("javascript:")
        || href.starts_with("mailto:")
        || href.starts_with("tel:")
        || href.starts_with("data:")
    {
        return None;
    }

    let mut absolute_url = base_url.join(href).ok()?;
    if absolute_url.scheme() != "http" && absolute_url.scheme() != "https" {
        return None;
    }
    absolute_url.set_fragment(None);
    Some(absolute_url.to_string())
}

/// Processer that records every page and follows its links up to a depth limit
#[derive(Debug, Clone, Default)]
pub struct LinkProcesser {
    max_depth: u32,
    same_host: bool,
}

impl LinkProcesser {
    /// Creates a processer following links while the page depth is below `max_depth`
    pub fn new(max_depth: u32) -> Self {
        Self {
            max_depth,
            same_host: false,
        }
    }

    /// Restricts discovered links to the host of the page they were found on
    pub fn same_host(mut self, same_host: bool) -> Self {
        self.same_host = same_host;
        self
    }
}

impl Processer for LinkProcesser {
    fn process(&self, result: &FetchResult, out: &mut Yield) {
        let mut record = Record::new()
            .with("url", result.final_url.as_str())
            .with("status", result.status_code.to_string());

        let base_url = match Url::parse(&result.final_url) {
            Ok(url) => url,
            Err(e) => {
                tracing::debug!("Cannot resolve links against {}: {}", result.final_url, e);
                out.push_record(record);
                return;
            }
        };

        if result.content_type.is_some() && !result.is_html() {
            out.push_record(record);
            return;
        }

        let parsed = parse_html(&result.body, &base_url);
        if let Some(title) = &parsed.title {
            record.set("title", title.as_str());
        }
        out.push_record(record);

        if result.request.depth >= self.max_depth {
            return;
        }

        let mut seen = HashSet::new();
        for link in parsed.links {
            if self.same_host && !shares_host(&link, &base_url) {
                continue;
            }
            if seen.insert(link.clone()) {
                out.push_work(result.request.child(link));
            }
        }
    }
}

fn shares_host(link: &str, base_url: &Url) -> bool {
    Url::parse(link)
        .map(|url| url.host_str() == base_url.host_str())
        .unwrap_or(false)
}
