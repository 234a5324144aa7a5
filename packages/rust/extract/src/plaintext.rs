//! Markdown/HTML to plain-text reduction.
//!
//! The remote index receives searchable text only, so document bodies are
//! reduced in two passes: embedded HTML tags are removed first, then the
//! remaining markdown is walked as a pulldown-cmark event stream and only
//! textual content is kept. HTML must go first — tag fragments would
//! otherwise survive the markdown pass as literal text.

use std::sync::LazyLock;

use pulldown_cmark::{Event, Options, Parser, TagEnd};
use regex::Regex;

static TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]+>").expect("valid regex"));

/// Reduce a markdown body to plain searchable text.
///
/// Headings, emphasis, links, lists, and code fences are reduced to their
/// textual content; whitespace is collapsed to single spaces. Idempotent on
/// its own output.
pub fn strip(body: &str) -> String {
    let without_tags = TAG_RE.replace_all(body, " ");

    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_FOOTNOTES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);

    let mut text = String::with_capacity(without_tags.len());
    for event in Parser::new_ext(&without_tags, options) {
        match event {
            Event::Text(t) => text.push_str(&t),
            Event::Code(c) => text.push_str(&c),
            Event::SoftBreak | Event::HardBreak | Event::Rule => text.push(' '),
            Event::End(tag) => match tag {
                // Inline styling ends mid-word; everything else closes a block.
                TagEnd::Emphasis
                | TagEnd::Strong
                | TagEnd::Strikethrough
                | TagEnd::Link
                | TagEnd::Image => {}
                _ => text.push(' '),
            },
            _ => {}
        }
    }

    collapse_whitespace(&text)
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
