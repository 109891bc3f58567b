//! Text projections over a parsed document
//!
//! `scraper` concatenates text nodes verbatim, so `<td>5 Oct<br>Valid</td>`
//! reads as `"5 OctValid"`. The helpers here insert the separators a
//! browser would render.

use scraper::{ElementRef, Html, Node};

use crate::utils::normalize_whitespace;

const HIDDEN_ELEMENTS: &[&str] = &["script", "style", "noscript", "template", "head"];

/// Elements that start a new line of rendered text
const BLOCK_ELEMENTS: &[&str] = &[
    "address", "article", "aside", "blockquote", "body", "caption", "center", "dd", "details",
    "div", "dl", "dt", "fieldset", "figcaption", "figure", "footer", "form", "h1", "h2", "h3",
    "h4", "h5", "h6", "header", "hr", "html", "li", "main", "menu", "nav", "ol", "p", "pre",
    "section", "table", "tbody", "td", "tfoot", "th", "thead", "tr", "ul",
];

/// Visible text of one element, `<br>` read as a space
pub fn element_text(element: &ElementRef<'_>) -> String {
    let mut text = String::new();

    for node in element.descendants() {
        match node.value() {
            Node::Text(t) => text.push_str(t),
            Node::Element(e) if e.name() == "br" => text.push(' '),
            _ => {}
        }
    }

    normalize_whitespace(&text)
}

/// Visible text of a whole document, laid out the way a browser reads it
///
/// Inline markup is joined without a separator, so `3<sup>rd</sup>` stays
/// `3rd`. Block elements and `<br>` break words apart.
pub fn document_text(document: &Html) -> String {
    let mut text = String::new();
    push_visible_text(&document.root_element(), &mut text);
    normalize_whitespace(&text)
}

fn push_visible_text(element: &ElementRef<'_>, out: &mut String) {
    for child in element.children() {
        match child.value() {
            Node::Text(t) => out.push_str(t),
            Node::Element(e) => {
                let name = e.name();
                if HIDDEN_ELEMENTS.contains(&name) {
                    continue;
                }
                if name == "br" {
                    out.push(' ');
                    continue;
                }

                let block = BLOCK_ELEMENTS.contains(&name);
                if block {
                    out.push(' ');
                }
                if let Some(inner) = ElementRef::wrap(child) {
                    push_visible_text(&inner, out);
                }
                if block {
                    out.push(' ');
                }
            }
            _ => {}
        }
    }
}

/// Direct `<td>` children of a table row
pub fn row_cells<'a>(row: &ElementRef<'a>) -> Vec<ElementRef<'a>> {
    row.children()
        .filter_map(ElementRef::wrap)
        .filter(|cell| cell.value().name() == "td")
        .collect()
}
