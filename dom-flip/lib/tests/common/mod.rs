//! Common test utilities for replacement integration tests.
//!
//! Provides fixture loading and an attribute-order independent rendering of
//! HTML for comparing documents.

#![allow(dead_code)]

use std::fs;
use std::path::PathBuf;

use ego_tree::NodeRef;
use scraper::{Html, Node};

/// Loads a fixture from the `tests/fixtures/` directory.
///
/// ## Panics
///
/// Panics if the fixture file cannot be read or does not exist.
pub fn load_fixture(path: &str) -> String {
    let mut fixture_path = PathBuf::from(env!("CARGO_MANIFEST_DIR"));
    fixture_path.push("tests");
    fixture_path.push("fixtures");
    fixture_path.push(path);

    fs::read_to_string(&fixture_path).unwrap_or_else(|e| {
        panic!(
            "Failed to read fixture at {:?}: {}",
            fixture_path.display(),
            e
        )
    })
}

/// Wraps body markup the way a serialized document looks.
pub fn wrap_body(body: &str) -> String {
    format!("<html><head></head><body>{body}</body></html>")
}

/// Renders a document with attributes sorted by name, so two documents that
/// differ only in attribute order render identically.
pub fn canonical(html: &str) -> String {
    let document = Html::parse_document(html);
    let mut out = String::new();
    render(document.tree.root(), &mut out);
    out
}

fn render(node: NodeRef<'_, Node>, out: &mut String) {
    match node.value() {
        Node::Element(element) => {
            let mut attrs: Vec<(&str, &str)> = element.attrs().collect();
            attrs.sort();

            out.push('<');
            out.push_str(element.name());
            for (name, value) in attrs {
                out.push_str(&format!(" {name}={value:?}"));
            }
            out.push('>');
            for child in node.children() {
                render(child, out);
            }
            out.push_str(&format!("</{}>", element.name()));
        }
        Node::Text(text) => out.push_str(&format!("{:?}", &*text.text)),
        Node::Comment(comment) => out.push_str(&format!("<!--{}-->", &*comment.comment)),
        _ => {
            for child in node.children() {
                render(child, out);
            }
        }
    }
}

/// Visible text of every element carrying `class`, in document order.
pub fn marker_texts(html: &str, class: &str) -> Vec<String> {
    let document = Html::parse_document(html);
    let Ok(selector) = scraper::Selector::parse(&format!(".{class}")) else {
        return Vec::new();
    };
    document
        .select(&selector)
        .map(|element| element.text().collect::<String>())
        .collect()
}
