//! HTML5 Parser implementation
//!
//! Uses html5ever's RcDom and converts it to the arena tree.

use eal_dom::{Document, DomTree, NodeId};
use html5ever::parse_document;
use html5ever::tendril::TendrilSink;
use markup5ever_rcdom::{Handle, NodeData as RcNodeData, RcDom};

use crate::HtmlError;

/// HTML5 parser
#[derive(Debug, Default, Clone, Copy)]
pub struct HtmlParser;

impl HtmlParser {
    pub fn new() -> Self {
        Self
    }

    /// Parse HTML string into a Document at `about:blank`
    pub fn parse(&self, html: &str) -> Result<Document, HtmlError> {
        self.parse_with_url(html, "about:blank")
    }

    /// Parse HTML with a document URL
    pub fn parse_with_url(&self, html: &str, url: &str) -> Result<Document, HtmlError> {
        tracing::debug!("Parsing HTML document: {}", url);

        let dom = parse_document(RcDom::default(), Default::default())
            .from_utf8()
            .read_from(&mut html.as_bytes())?;

        let mut tree = DomTree::new();
        self.convert_node(&dom.document, &mut tree, NodeId::ROOT)?;

        let document = Document::from_tree(tree, url);
        tracing::debug!("Parsed {} nodes", document.tree().len());
        Ok(document)
    }

    /// Convert an RcDom node and its subtree
    fn convert_node(&self, handle: &Handle, tree: &mut DomTree, parent: NodeId) -> Result<(), HtmlError> {
        match &handle.data {
            RcNodeData::Document => {
                for child in handle.children.borrow().iter() {
                    self.convert_node(child, tree, parent)?;
                }
            }
            RcNodeData::Text { contents } => {
                let text = contents.borrow();
                if !text.trim().is_empty() {
                    let id = tree.create_text(&text);
                    tree.append_child(parent, id)?;
                }
            }
            RcNodeData::Comment { contents } => {
                let id = tree.create_comment(contents);
                tree.append_child(parent, id)?;
            }
            RcNodeData::Element { name, attrs, .. } => {
                let id = tree.create_element(&name.local);
                for attr in attrs.borrow().iter() {
                    tree.set_attr(id, &attr.name.local, &attr.value)?;
                }
                tree.append_child(parent, id)?;

                for child in handle.children.borrow().iter() {
                    self.convert_node(child, tree, id)?;
                }
            }
            // Doctype and processing instructions carry nothing the page needs
            RcNodeData::Doctype { .. } | RcNodeData::ProcessingInstruction { .. } => {}
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple() {
        let html = "<html><head><title>Home | Empower Ability Labs</title></head><body><p>Hello</p></body></html>";
        let doc = HtmlParser::new().parse(html).unwrap();

        assert_eq!(doc.title(), "Home | Empower Ability Labs");
        assert_eq!(doc.tree().tag(doc.body()), Some("body"));
        let p = doc.tree().find_first(doc.body(), |e| e.tag == "p").unwrap();
        assert_eq!(doc.tree().text_content(p), "Hello");
    }

    #[test]
    fn test_attributes_preserved() {
        let html = r##"<nav><ul class="nav-list" role="menubar"><li><a class="nav-link" data-route="home" href="#home">Home</a></li></ul></nav>"##;
        let doc = HtmlParser::new().parse(html).unwrap();

        let link = doc.tree().find_first(doc.body(), |e| e.has_class("nav-link")).unwrap();
        assert_eq!(doc.tree().get_attr(link, "data-route"), Some("home"));
        assert_eq!(doc.tree().get_attr(link, "href"), Some("#home"));
    }

    #[test]
    fn test_fragment_gets_skeleton() {
        let doc = HtmlParser::new().parse("<div id=\"x\">Text</div>").unwrap();
        assert!(doc.head().is_valid());
        assert!(doc.get_element_by_id("x").is_some());
    }

    #[test]
    fn test_whitespace_text_dropped() {
        let doc = HtmlParser::new().parse("<ul>\n  <li>a</li>\n  <li>b</li>\n</ul>").unwrap();
        let ul = doc.tree().find_first(doc.body(), |e| e.tag == "ul").unwrap();
        assert_eq!(doc.tree().children(ul).count(), 2);
    }
}
