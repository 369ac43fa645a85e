//! Bare-domain link detection for assistant replies.
//!
//! Replies often mention sites as `example.com` without a scheme. These are
//! split out as [`Segment::Link`]s pointing at `https://…` so the chat panel
//! can render them as hyperlinks.

use std::sync::OnceLock;
use regex::Regex;

const DOMAIN_SUFFIXES: &[&str] = &[
    "com", "net", "org", "edu", "gov", "mil", "int", "co", "io", "ai", "tech",
    "dev", "app", "blog", "info", "biz", "name", "pro", "museum", "aero", "coop",
    "jobs", "travel", "xxx", "post", "tel", "asia", "cat", "mobi", "arpa",
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    Text(String),
    Link { label: String, url: String },
}

fn domain_regex() -> &'static Regex {
    static DOMAIN: OnceLock<Regex> = OnceLock::new();
    DOMAIN.get_or_init(|| {
        let pattern = format!(
            r"(?i)\b(?:https?://)?(?:[a-z0-9](?:[a-z0-9-]{{0,61}}[a-z0-9])?\.)+(?:{})\b(?:/[^\s]*[^\s.,;:!?)\]])?",
            DOMAIN_SUFFIXES.join("|")
        );
        Regex::new(&pattern).expect("valid regex")
    })
}

/// Split `text` into plain runs and links, in order. Concatenating every
/// segment's text (link labels included) gives back `text`.
pub fn segments(text: &str) -> Vec<Segment> {
    let mut out = Vec::new();
    let mut last = 0;

    for m in domain_regex().find_iter(text) {
        if m.start() > last {
            out.push(Segment::Text(text[last..m.start()].to_string()));
        }
        let label = m.as_str().to_string();
        let url = if label.to_ascii_lowercase().starts_with("http") {
            label.clone()
        } else {
            format!("https://{}", label)
        };
        out.push(Segment::Link { label, url });
        last = m.end();
    }

    if last < text.len() {
        out.push(Segment::Text(text[last..].to_string()));
    }
    out
}

pub fn has_links(text: &str) -> bool {
    domain_regex().is_match(text)
}
