//! Web page fetching and boilerplate removal

use crate::error::ExtractError;
use reqwest::header::CONTENT_TYPE;
use scraper::{ElementRef, Html, Selector};
use tracing::debug;
use url::Url;

/// Elements whose content never counts as page text
const SKIPPED_ELEMENTS: [&str; 15] = [
    "script", "style", "noscript", "nav", "header", "footer", "aside", "form", "iframe", "svg",
    "template", "button", "select", "head", "menu",
];

/// Elements that start and end a line of text
const BLOCK_ELEMENTS: [&str; 28] = [
    "p", "div", "section", "article", "main", "h1", "h2", "h3", "h4", "h5", "h6", "li", "ul",
    "ol", "tr", "table", "blockquote", "pre", "br", "hr", "dd", "dt", "dl", "figcaption",
    "figure", "address", "details", "summary",
];

/// Where main content is looked for, most specific first
const CONTENT_ROOTS: [&str; 4] = ["article", "main", "[role=main]", "body"];

/// Text and title of a fetched page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageText {
    /// Readable text, one block per line
    pub text: String,
    /// Contents of `<title>`, if any
    pub title: Option<String>,
}

/// Fetch a page with a single GET and reduce it to readable text
pub async fn fetch_page(
    client: &reqwest::Client,
    url: &Url,
    timeout_secs: u64,
) -> Result<PageText, ExtractError> {
    let response = client.get(url.clone()).send().await.map_err(|e| {
        if e.is_timeout() {
            ExtractError::Network(format!("timed out after {}s fetching {}", timeout_secs, url))
        } else {
            ExtractError::Network(format!("could not fetch {}: {}", url, e))
        }
    })?;

    let status = response.status();
    if !status.is_success() {
        return Err(ExtractError::Network(format!(
            "HTTP {} fetching {}",
            status.as_u16(),
            url
        )));
    }

    let content_type = response
        .headers()
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.to_ascii_lowercase())
        .unwrap_or_default();

    let body = response
        .text()
        .await
        .map_err(|e| ExtractError::Network(format!("failed reading body of {}: {}", url, e)))?;
    debug!(%url, bytes = body.len(), content_type = %content_type, "Fetched page");

    if content_type.starts_with("text/plain") {
        return Ok(PageText {
            text: body,
            title: None,
        });
    }

    Ok(html_to_text(&body))
}

/// Reduce an HTML document to its main readable text
pub fn html_to_text(html: &str) -> PageText {
    let document = Html::parse_document(html);

    let title = selector("title")
        .and_then(|sel| document.select(&sel).next())
        .map(|el| collapse_whitespace(&el.text().collect::<String>()))
        .filter(|t| !t.is_empty());

    for root in CONTENT_ROOTS {
        let Some(sel) = selector(root) else {
            continue;
        };
        if let Some(element) = document.select(&sel).next() {
            let text = element_text(element);
            if !text.is_empty() {
                return PageText { text, title };
            }
        }
    }

    PageText {
        text: element_text(document.root_element()),
        title,
    }
}

fn selector(css: &str) -> Option<Selector> {
    Selector::parse(css).ok()
}

/// Block-separated text under `root`, skipping boilerplate elements
fn element_text(root: ElementRef<'_>) -> String {
    let mut lines = Vec::new();
    let mut current = String::new();
    collect_text(root, &mut lines, &mut current);
    flush_line(&mut lines, &mut current);
    lines.join("\n")
}

fn collect_text(element: ElementRef<'_>, lines: &mut Vec<String>, current: &mut String) {
    for child in element.children() {
        if let Some(text) = child.value().as_text() {
            current.push_str(text);
            continue;
        }

        let Some(child_element) = ElementRef::wrap(child) else {
            continue;
        };
        let name = child_element.value().name();
        if SKIPPED_ELEMENTS.contains(&name) {
            continue;
        }

        let block = BLOCK_ELEMENTS.contains(&name);
        if block {
            flush_line(lines, current);
        } else {
            current.push(' ');
        }
        collect_text(child_element, lines, current);
        if block {
            flush_line(lines, current);
        } else {
            current.push(' ');
        }
    }
}

fn flush_line(lines: &mut Vec<String>, current: &mut String) {
    let line = collapse_whitespace(current);
    if !line.is_empty() {
        lines.push(line);
    }
    current.clear();
}

fn collapse_whitespace(s: &str) -> String {
    s.split_whitespace().collect::<Vec<_>>().join(" ")
}
