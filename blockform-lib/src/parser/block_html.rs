//! This module parses authored block markup into the crate's DOM tree.
//!
//! It uses html5ever as the HTML parser and builds a DOM tree defined in the
//! `crate::dom::dom_tree` module. Decorators then read the block's rows and
//! cells positionally from that tree.

use crate::dom::dom_tree;
use crate::error::{FormError, Result};
use html5ever::tendril::{StrTendril, TendrilSink};
use html5ever::{
    interface::{ElemName, NodeOrText, QuirksMode, TreeSink},
    LocalName, Namespace, QualName,
};
use std::cell::RefCell;
use std::rc::Rc;

/// Creates a DOM tree from the provided HTML content.
///
/// # Arguments
///
/// * `html_content` - A string slice containing the HTML to parse.
///
/// # Returns
///
/// A `dom_tree::Document` representing the parsed HTML.
pub fn create_dom_tree(html_content: &str) -> dom_tree::Document {
    let tree_sink = BlockTreeSink::new();
    html5ever::parse_document(tree_sink, Default::default()).one(html_content.to_string())
}

/// Parses block markup and returns the block element: the first element
/// child of `<body>`.
///
/// The document is returned alongside so the block keeps a live parent chain.
pub fn parse_block(html_content: &str) -> Result<(dom_tree::Document, dom_tree::NodeRef)> {
    let document = create_dom_tree(html_content);
    let body = dom_tree::find_first(&document.root, |e| e.tag == "body")
        .ok_or(FormError::MissingBlockContent("a <body> element"))?;
    let block = dom_tree::element_child(&body, 0)
        .ok_or(FormError::MissingBlockContent("a block element"))?;
    Ok((document, block))
}

/// A custom TreeSink for building the DOM tree used by the parser.
///
/// It holds the Document being built and the current quirks mode.
pub struct BlockTreeSink {
    document: dom_tree::Document,
    quirks_mode: RefCell<QuirksMode>,
}

impl BlockTreeSink {
    pub fn new() -> Self {
        Self {
            document: dom_tree::new_document(),
            quirks_mode: RefCell::new(QuirksMode::NoQuirks),
        }
    }
}

impl Default for BlockTreeSink {
    fn default() -> Self {
        Self::new()
    }
}

/// A simple implementation of the `ElemName` trait for our elements.
#[derive(Debug)]
pub struct BlockElemName {
    ns: Namespace,
    local: LocalName,
}

impl ElemName for BlockElemName {
    fn local_name(&self) -> &LocalName {
        &self.local
    }

    fn ns(&self) -> &Namespace {
        &self.ns
    }
}

impl TreeSink for BlockTreeSink {
    type Handle = dom_tree::NodeRef;
    type Output = dom_tree::Document;
    type ElemName<'a>
        = BlockElemName
    where
        Self: 'a;

    fn finish(self) -> Self::Output {
        self.document
    }

    fn parse_error(&self, msg: std::borrow::Cow<'static, str>) {
        log::trace!("html parse error: {}", msg);
    }

    fn get_document(&self) -> Self::Handle {
        self.document.root.clone()
    }

    fn elem_name<'a>(&'a self, target: &'a Self::Handle) -> Self::ElemName<'a> {
        if let dom_tree::Node::Element(ref elem) = *target.borrow() {
            return BlockElemName {
                ns: elem.qual_name.ns.clone(),
                local: elem.qual_name.local.clone(),
            };
        }
        panic!("elem_name called on non-element node")
    }

    fn create_element(
        &self,
        name: QualName,
        attrs: Vec<html5ever::Attribute>,
        _flags: html5ever::interface::ElementFlags,
    ) -> Self::Handle {
        let mut element_node = dom_tree::ElementNode::new(&name.local);
        element_node.qual_name = name;
        element_node.attributes = attrs
            .into_iter()
            .map(|attr| (attr.name.local.to_string(), attr.value.to_string()))
            .collect();
        Rc::new(RefCell::new(dom_tree::Node::Element(element_node)))
    }

    /// Comments carry no content for decorators; they become empty text.
    fn create_comment(&self, _text: StrTendril) -> Self::Handle {
        dom_tree::text("")
    }

    fn create_pi(&self, target: StrTendril, data: StrTendril) -> Self::Handle {
        dom_tree::text(&format!("{} {}", target, data))
    }

    fn append(&self, parent: &Self::Handle, child: NodeOrText<Self::Handle>) {
        match child {
            NodeOrText::AppendNode(node) => dom_tree::append_child(parent, &node),
            NodeOrText::AppendText(text) => dom_tree::append_text(parent, &text),
        }
    }

    fn append_based_on_parent_node(
        &self,
        element: &Self::Handle,
        prev_element: &Self::Handle,
        child: NodeOrText<Self::Handle>,
    ) {
        if dom_tree::parent_of(element).is_some() {
            self.append_before_sibling(element, child);
        } else {
            self.append(prev_element, child);
        }
    }

    fn append_doctype_to_document(
        &self,
        name: StrTendril,
        public_id: StrTendril,
        system_id: StrTendril,
    ) {
        *self.document.doctype.borrow_mut() = Some(dom_tree::Doctype {
            name: name.to_string(),
            public_id: public_id.to_string(),
            system_id: system_id.to_string(),
        });
    }

    fn get_template_contents(&self, target: &Self::Handle) -> Self::Handle {
        target.clone()
    }

    fn same_node(&self, x: &Self::Handle, y: &Self::Handle) -> bool {
        Rc::ptr_eq(x, y)
    }

    fn set_quirks_mode(&self, mode: QuirksMode) {
        *self.quirks_mode.borrow_mut() = mode;
    }

    fn append_before_sibling(&self, sibling: &Self::Handle, child: NodeOrText<Self::Handle>) {
        let Some(parent) = dom_tree::parent_of(sibling) else {
            return;
        };
        let node = match child {
            NodeOrText::AppendNode(node) => node,
            NodeOrText::AppendText(text) => dom_tree::text(&text),
        };
        dom_tree::insert_before(&parent, &node, sibling);
    }

    fn add_attrs_if_missing(&self, target: &Self::Handle, attrs: Vec<html5ever::Attribute>) {
        dom_tree::with_element_mut(target, |elem| {
            for attr in attrs {
                let key = attr.name.local.to_string();
                if !elem.has_attribute(&key) {
                    elem.attributes.push((key, attr.value.to_string()));
                }
            }
        });
    }

    fn remove_from_parent(&self, target: &Self::Handle) {
        dom_tree::detach(target);
    }

    fn reparent_children(&self, node: &Self::Handle, new_parent: &Self::Handle) {
        for child in dom_tree::take_children(node) {
            dom_tree::append_child(new_parent, &child);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn block_is_first_body_element() {
        let html = r#"<div class="customform"><div><div><p><a title="/forms/contact.json" href="/forms/contact.json">Contact</a></p></div></div></div>"#;
        let (_document, block) = parse_block(html).unwrap();

        assert_eq!(dom_tree::get_attr(&block, "class").as_deref(), Some("customform"));
        let link = dom_tree::find_first(&block, |e| e.tag == "a").unwrap();
        assert_eq!(
            dom_tree::get_attr(&link, "title").as_deref(),
            Some("/forms/contact.json")
        );
    }

    #[test]
    fn empty_body_is_reported() {
        let err = parse_block("<html><body></body></html>").unwrap_err();
        assert!(matches!(err, FormError::MissingBlockContent(_)));
    }

    #[test]
    fn misnested_markup_keeps_text_once() {
        let (_document, block) = parse_block(r#"<div><a href="/x"><p>hello</a></p></div>"#).unwrap();
        assert_eq!(dom_tree::text_content(&block), "hello");
    }

    #[test]
    fn text_runs_are_merged() {
        let (_document, block) = parse_block("<div><p>Hello &amp; welcome</p></div>").unwrap();
        let p = dom_tree::element_child(&block, 0).unwrap();
        assert_eq!(dom_tree::children_of(&p).len(), 1);
        assert_eq!(dom_tree::text_content(&p), "Hello & welcome");
    }
}
