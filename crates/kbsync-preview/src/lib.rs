//! kbsync Preview Renderer
//!
//! Renders a [`Portal`] as one static HTML page: a collapsible block per
//! category holding its folders and articles. Every primary node is followed
//! by its translations side by side, each linking back to the spreadsheet
//! cell it was read from.
//!
//! Rendering is pure: no network access, no mutation of the tree.

#![warn(unreachable_pub)]

use kbsync_model::{Category, ContentNode, NodeRef, Portal};
use serde::{Deserialize, Serialize};
use std::fmt::{self, Write};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// External references of the generated page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PreviewOptions {
    /// Stylesheet URL
    pub stylesheet: String,
    /// Script URLs, loaded in order
    pub scripts: Vec<String>,
}

impl Default for PreviewOptions {
    fn default() -> Self {
        Self {
            stylesheet: "static/preview.css".to_string(),
            scripts: vec!["https://cdn.plot.ly/plotly-latest.min.js".to_string()],
        }
    }
}

impl PreviewOptions {
    /// With stylesheet URL
    #[inline]
    #[must_use]
    pub fn with_stylesheet(mut self, url: impl Into<String>) -> Self {
        self.stylesheet = url.into();
        self
    }
}

/// Escape text for HTML element and attribute content
#[must_use]
pub fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Render the portal as a complete HTML document
#[must_use]
pub fn render_preview(portal: &Portal, options: &PreviewOptions) -> String {
    let mut out = String::new();
    // fmt::Write for String never fails
    let _ = write_preview(&mut out, portal, options);
    out
}

/// Render the portal into any formatter sink
pub fn write_preview<W: Write>(out: &mut W, portal: &Portal, options: &PreviewOptions) -> fmt::Result {
    let width = widest_row(portal);
    writeln!(out, "<!DOCTYPE html>")?;
    writeln!(out, "<html lang=\"en\">")?;
    writeln!(out, "<head>")?;
    writeln!(out, "    <meta charset=\"UTF-8\">")?;
    writeln!(out, "    <title>Articles Preview: {}</title>", escape_html(&portal.name))?;
    for script in &options.scripts {
        writeln!(out, "    <script src=\"{}\"></script>", escape_html(script))?;
    }
    writeln!(
        out,
        "    <link rel=\"stylesheet\" href=\"{}\">",
        escape_html(&options.stylesheet)
    )?;
    writeln!(out, "</head>")?;
    writeln!(out, "<body>")?;
    writeln!(out, "<div class=\"article-preview\" nlang=\"{width}\">")?;
    writeln!(out, "<div class=\"accordion\">")?;
    for (id, category) in portal.categories() {
        write_category(out, portal, id.into(), category)?;
    }
    writeln!(out, "</div>")?;
    writeln!(out, "</div>")?;
    writeln!(out, "<script>{TOGGLE_SCRIPT}</script>")?;
    writeln!(out, "</body>")?;
    writeln!(out, "</html>")
}

const TOGGLE_SCRIPT: &str = r#"
document.querySelectorAll(".accordion-header").forEach(function (header) {
    header.addEventListener("click", function () {
        var item = header.parentElement;
        var open = item.getAttribute("accordion-state") === "open";
        item.setAttribute("accordion-state", open ? "closed" : "open");
    });
});
"#;

/// Largest number of side-by-side language blocks in any row
fn widest_row(portal: &Portal) -> usize {
    let mut width = 1;
    for (_, category) in portal.categories() {
        width = width.max(category.translations().len() + 1);
        for folder_id in category.folders() {
            width = width.max(portal.translations_of((*folder_id).into()).len() + 1);
            for article_id in portal.folder(*folder_id).map(|f| f.articles()).unwrap_or_default() {
                width = width.max(portal.translations_of((*article_id).into()).len() + 1);
            }
        }
    }
    width
}

fn slug(name: &str) -> String {
    name.to_lowercase().split_whitespace().collect::<Vec<_>>().join("_")
}

fn href(portal: &Portal, node: NodeRef) -> String {
    portal
        .link(node)
        .map(|url| escape_html(&url))
        .unwrap_or_else(|| "#".to_string())
}

/// Primary node followed by its translations
fn row(portal: &Portal, node: NodeRef) -> Vec<NodeRef> {
    std::iter::once(node)
        .chain(portal.translations_of(node).into_iter().map(|(_, t)| t))
        .collect()
}

fn write_category<W: Write>(
    out: &mut W,
    portal: &Portal,
    node: NodeRef,
    category: &Category,
) -> fmt::Result {
    writeln!(
        out,
        "<div class=\"accordion-item\" id=\"{}\" accordion-state=\"closed\">",
        escape_html(&slug(&category.name))
    )?;
    writeln!(out, "<div class=\"accordion-header\">")?;
    writeln!(out, "<div class=\"accordion-icon\"></div>")?;
    writeln!(out, "<div class=\"h1\">{}</div>", escape_html(&category.name))?;
    writeln!(out, "</div>")?;
    writeln!(out, "<div class=\"accordion-collapsible\">")?;
    writeln!(out, "<div class=\"category-container\">")?;

    writeln!(out, "<div class=\"row-category\">")?;
    for block in row(portal, node) {
        let NodeRef::Category(id) = block else { continue };
        let Some(c) = portal.category(id) else { continue };
        writeln!(out, "<div class=\"translation-block\"{}>", lang_attr(c))?;
        writeln!(
            out,
            "<div class=\"h1\"><a class=\"gs-link\" href=\"{}\">{}</a></div>",
            href(portal, block),
            escape_html(&c.name)
        )?;
        writeln!(
            out,
            "<div class=\"category-desc\">{}</div>",
            escape_html(c.description.as_deref().unwrap_or_default())
        )?;
        writeln!(out, "</div>")?;
    }
    writeln!(out, "</div>")?;

    for folder_id in category.folders() {
        write_folder(out, portal, (*folder_id).into())?;
    }

    writeln!(out, "</div>")?;
    writeln!(out, "</div>")?;
    writeln!(out, "</div>")
}

fn write_folder<W: Write>(out: &mut W, portal: &Portal, node: NodeRef) -> fmt::Result {
    writeln!(out, "<div class=\"row-folder\">")?;
    for block in row(portal, node) {
        let NodeRef::Folder(id) = block else { continue };
        let Some(f) = portal.folder(id) else { continue };
        writeln!(out, "<div class=\"translation-block\"{}>", lang_attr(f))?;
        writeln!(
            out,
            "<h2 class=\"h2\"><a class=\"gs-link\" href=\"{}\">{}</a></h2>",
            href(portal, block),
            escape_html(&f.name)
        )?;
        writeln!(out, "</div>")?;
    }
    writeln!(out, "</div>")?;

    let NodeRef::Folder(id) = node else {
        return Ok(());
    };
    for article_id in portal.folder(id).map(|f| f.articles()).unwrap_or_default() {
        writeln!(out, "<div class=\"row-article\">")?;
        for block in row(portal, (*article_id).into()) {
            let NodeRef::Article(aid) = block else { continue };
            let Some(a) = portal.article(aid) else { continue };
            writeln!(out, "<div class=\"translation-block\"{}>", lang_attr(a))?;
            writeln!(
                out,
                "<h3 class=\"h3\"><a class=\"gs-link\" href=\"{}\">{}</a></h3>",
                href(portal, block),
                escape_html(&a.title)
            )?;
            // article bodies are already rendered HTML
            writeln!(out, "<div class=\"article-desc\">{}</div>", a.description)?;
            writeln!(out, "</div>")?;
        }
        writeln!(out, "</div>")?;
    }
    Ok(())
}

fn lang_attr(node: &dyn ContentNode) -> String {
    node.meta()
        .source_lang
        .map(|lang| format!(" lang=\"{lang}\""))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use kbsync_model::{Article, CellRef, Folder, Language, Origin};
    use pretty_assertions::assert_eq;

    #[test]
    fn escapes_markup_characters() {
        assert_eq!(
            escape_html(r#"<a href="x">Q&A</a>"#),
            "&lt;a href=&quot;x&quot;&gt;Q&amp;A&lt;/a&gt;"
        );
    }

    #[test]
    fn renders_rows_with_translations_and_links() {
        let mut portal = Portal::new("Help & Support").with_workbook("wb1");
        let billing = portal.add_category(
            Category::new("Billing")
                .with_description("Money <matters>")
                .with_origin(Origin::new(None, "Billing", Some(7), CellRef::new(1, 0))),
        );
        portal
            .add_category_translation(billing, Language::Fr, Category::new("Facturation"))
            .unwrap();
        let folder = portal.add_folder(billing, Folder::new("Invoices")).unwrap();
        portal
            .add_article(folder, Article::from_markdown("Download", "Click **here**"))
            .unwrap();

        let html = render_preview(&portal, &PreviewOptions::default());
        assert!(html.contains("<title>Articles Preview: Help &amp; Support</title>"));
        assert!(html.contains("id=\"billing\""));
        assert!(html.contains("nlang=\"2\""));
        assert!(html.contains(
            "href=\"https://docs.google.com/spreadsheets/d/wb1/edit#gid=7&amp;range=A2\">Billing</a>"
        ));
        assert!(html.contains("Money &lt;matters&gt;"));
        assert!(html.contains("lang=\"fr\""));
        assert!(html.contains("<strong>here</strong>"));
        assert!(html.find("Billing</a>").unwrap() < html.find("Facturation</a>").unwrap());
        assert!(html.contains("href=\"#\">Invoices</a>"));
    }

    #[test]
    fn workbook_fixture_renders_every_category() {
        let html = render_preview(&kbsync_test_utils::billing_portal(), &PreviewOptions::default());
        assert_eq!(html.matches("class=\"accordion-item\"").count(), 2);
        assert_eq!(html.matches("class=\"row-article\"").count(), 4);
        assert!(html.contains("nlang=\"3\""));
        assert!(html.contains("id=\"cat_a\""));
    }

    #[test]
    fn empty_portal_is_a_valid_page() {
        let html = render_preview(&Portal::new("Empty"), &PreviewOptions::default());
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.trim_end().ends_with("</html>"));
        assert!(!html.contains("accordion-item"));
    }
}
