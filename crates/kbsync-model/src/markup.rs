//! Markup filter for article bodies
//!
//! Article bodies are authored as Markdown. Uses pulldown-cmark to render
//! them to HTML for the helpdesk and to a plain-text summary.

use once_cell::sync::Lazy;
use pulldown_cmark::{html, Event, Options, Parser, TagEnd};
use regex::Regex;

static TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").expect("valid tag pattern"));

fn options() -> Options {
    let mut opts = Options::empty();
    opts.insert(Options::ENABLE_TABLES);
    opts.insert(Options::ENABLE_STRIKETHROUGH);
    opts
}

/// Render Markdown to HTML
#[must_use]
pub fn render_markup(text: &str) -> String {
    let parser = Parser::new_ext(text, options());
    let mut out = String::new();
    html::push_html(&mut out, parser);
    out
}

/// Plain-text summary of Markdown (or HTML) content
///
/// Inline markup is dropped, raw HTML tags are stripped, block boundaries
/// become single spaces and the result is trimmed.
#[must_use]
pub fn textify(text: &str) -> String {
    let mut out = String::new();
    for event in Parser::new_ext(text, options()) {
        match event {
            Event::Text(t) | Event::Code(t) => out.push_str(&t),
            Event::Html(raw) | Event::InlineHtml(raw) => {
                out.push_str(&TAG.replace_all(&raw, " "));
            }
            Event::SoftBreak | Event::HardBreak | Event::Rule => out.push(' '),
            Event::End(
                TagEnd::Paragraph
                | TagEnd::Heading(_)
                | TagEnd::Item
                | TagEnd::CodeBlock
                | TagEnd::TableCell
                | TagEnd::BlockQuote(_),
            ) => out.push(' '),
            _ => {}
        }
    }
    out.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_lists() {
        let html = render_markup("- one\n- two\n");
        assert!(html.contains("<ul>"));
        assert!(html.contains("<li>one</li>"));
    }

    #[test]
    fn textify_drops_inline_markup() {
        assert_eq!(textify("Open *Settings* then `Reset`."), "Open Settings then Reset.");
    }

    #[test]
    fn textify_separates_blocks() {
        assert_eq!(textify("# Title\n\nFirst.\n\n- a\n- b"), "Title First. a b");
    }

    #[test]
    fn textify_strips_html() {
        assert_eq!(textify("<p>Hello <b>there</b></p>"), "Hello there");
    }

    #[test]
    fn textify_empty() {
        assert_eq!(textify(""), "");
        assert_eq!(render_markup(""), "");
    }
}
