//! Article parsing: link extraction, topic filtering, word counting
//!
//! Link validity and topic filtering both happen here, before anything
//! reaches the scheduler, so the scheduler can treat every returned link as
//! already filtered.

use scraper::{Html, Selector};
use std::collections::HashSet;

/// Extracted content of one article page
#[derive(Debug, Clone)]
pub struct ParsedArticle {
    /// Valid, topic-matched article paths, deduplicated in first-seen order
    pub links: Vec<String>,

    /// Rough word count of the article body
    pub word_count: usize,
}

/// An internal article link: under `/wiki/`, no namespace marker, no
/// fragment.
pub fn is_valid_article_link(href: &str) -> bool {
    href.starts_with("/wiki/") && !href.contains(':') && !href.contains('#')
}

/// Case-insensitive substring match of any topic against the href or the
/// anchor text. An empty topic set matches everything.
pub fn matches_topic(href: &str, text: &str, topics: &[String]) -> bool {
    if topics.is_empty() {
        return true;
    }
    let href = href.to_lowercase();
    let text = text.to_lowercase();
    topics
        .iter()
        .any(|topic| href.contains(topic.as_str()) || text.contains(topic.as_str()))
}

/// Parses an article page into its outbound links and word count.
///
/// Extraction is best-effort: malformed markup never fails, it just yields
/// whatever links and text survive parsing.
pub fn parse_article(html: &str, topics: &[String]) -> ParsedArticle {
    let document = Html::parse_document(html);

    ParsedArticle {
        links: extract_article_links(&document, topics),
        word_count: count_words(&document),
    }
}

/// Collects hrefs of valid article anchors that pass the topic filter.
///
/// An href appears at most once; a topic match on any of its anchor texts
/// admits it.
fn extract_article_links(document: &Html, topics: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut links = Vec::new();

    if let Ok(selector) = Selector::parse("a[href]") {
        for element in document.select(&selector) {
            let Some(href) = element.value().attr("href") else {
                continue;
            };
            if !is_valid_article_link(href) {
                continue;
            }

            let text = element.text().collect::<String>();
            if !matches_topic(href, text.trim(), topics) {
                continue;
            }

            if seen.insert(href.to_string()) {
                links.push(href.to_string());
            }
        }
    }

    links
}

/// Rough article word count: whitespace-split tokens that are entirely
/// alphabetic, taken from the main content root when present, otherwise
/// the whole document.
fn count_words(document: &Html) -> usize {
    let content = Selector::parse("#mw-content-text")
        .ok()
        .and_then(|selector| {
            document
                .select(&selector)
                .next()
                .map(|root| root.text().collect::<Vec<_>>().join(" "))
        });

    let text = match content {
        Some(text) => text,
        None => document.root_element().text().collect::<Vec<_>>().join(" "),
    };

    text.split_whitespace()
        .filter(|word| word.chars().all(|c| c.is_alphabetic()))
        .count()
}
