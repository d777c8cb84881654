use std::collections::HashMap;

use crate::dom::dom_tree::{self, NodeRef};

/// Indexes over one subtree for fast lookups while wiring a form.
///
/// Indices are a snapshot: rebuild after moving nodes around.
#[derive(Debug, Default)]
pub struct DomIndices {
    /// Maps a "name" attribute to all nodes carrying it, in tree order.
    pub name_map: HashMap<String, Vec<NodeRef>>,
    /// Maps a lowercase tag name (e.g., "fieldset") to all nodes with that tag.
    pub tag_map: HashMap<String, Vec<NodeRef>>,
    /// Maps a `data-fieldset` reference to the wrappers that point at it.
    pub fieldset_refs: HashMap<String, Vec<NodeRef>>,
}

impl DomIndices {
    /// Build the indices for every element below `root`.
    pub fn build(root: &NodeRef) -> Self {
        let mut indices = DomIndices::default();
        for node in dom_tree::descendants(root) {
            indices.index(&node);
        }
        indices
    }

    fn index(&mut self, node: &NodeRef) {
        dom_tree::with_element(node, |elem| {
            self.tag_map
                .entry(elem.tag.to_lowercase())
                .or_default()
                .push(node.clone());

            if let Some(name) = elem.attribute("name") {
                self.name_map
                    .entry(name.to_string())
                    .or_default()
                    .push(node.clone());
            }
            if let Some(fieldset) = elem.attribute("data-fieldset") {
                self.fieldset_refs
                    .entry(fieldset.to_string())
                    .or_default()
                    .push(node.clone());
            }
        });
    }

    /// First element with the given tag and name, like `tag[name="..."]`.
    pub fn by_tag_and_name(&self, tag: &str, name: &str) -> Option<&NodeRef> {
        self.name_map.get(name)?.iter().find(|node| {
            dom_tree::tag_name(node)
                .map(|t| t.eq_ignore_ascii_case(tag))
                .unwrap_or(false)
        })
    }

    pub fn by_tag(&self, tag: &str) -> &[NodeRef] {
        self.tag_map
            .get(&tag.to_lowercase())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn fieldset_members(&self, fieldset_name: &str) -> &[NodeRef] {
        self.fieldset_refs
            .get(fieldset_name)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}
