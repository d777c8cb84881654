use html5ever::{namespace_url, ns, LocalName, QualName};
use std::cell::RefCell;
use std::rc::{Rc, Weak};

pub mod dom_tree {
    use super::*;

    /// Shared handle to a node. Every tree operation works on handles.
    pub type NodeRef = Rc<RefCell<Node>>;

    #[derive(Debug, Clone)]
    pub enum Node {
        DocumentRoot(DocumentRootNode),
        Element(ElementNode),
        Text(String),
    }

    #[derive(Debug, Clone)]
    pub struct DocumentRootNode {
        pub children: Vec<NodeRef>,
    }

    #[derive(Debug, Clone)]
    pub struct ElementNode {
        pub tag: String,
        pub qual_name: QualName,
        /// Attributes in insertion order, so serialized markup is stable.
        pub attributes: Vec<(String, String)>,
        pub children: Vec<NodeRef>,
        pub parent: Option<Weak<RefCell<Node>>>,
    }

    #[derive(Debug)]
    pub struct Document {
        pub root: NodeRef,
        pub doctype: RefCell<Option<Doctype>>,
    }

    #[derive(Debug)]
    pub struct Doctype {
        pub name: String,
        pub public_id: String,
        pub system_id: String,
    }

    impl DocumentRootNode {
        pub fn new() -> Self {
            DocumentRootNode {
                children: Vec::new(),
            }
        }
    }

    impl Default for DocumentRootNode {
        fn default() -> Self {
            Self::new()
        }
    }

    impl ElementNode {
        pub fn new(tag: &str) -> Self {
            ElementNode {
                tag: tag.to_string(),
                qual_name: QualName::new(None, ns!(html), LocalName::from(tag)),
                attributes: Vec::new(),
                children: Vec::new(),
                parent: None,
            }
        }

        pub fn attribute(&self, name: &str) -> Option<&str> {
            self.attributes
                .iter()
                .find(|(k, _)| k == name)
                .map(|(_, v)| v.as_str())
        }

        pub fn has_attribute(&self, name: &str) -> bool {
            self.attributes.iter().any(|(k, _)| k == name)
        }

        /// Sets an attribute, replacing the old value in place.
        pub fn set_attribute(&mut self, name: &str, value: &str) {
            match self.attributes.iter_mut().find(|(k, _)| k == name) {
                Some((_, v)) => *v = value.to_string(),
                None => self
                    .attributes
                    .push((name.to_string(), value.to_string())),
            }
        }

        pub fn remove_attribute(&mut self, name: &str) {
            self.attributes.retain(|(k, _)| k != name);
        }

        pub fn has_class(&self, class_name: &str) -> bool {
            self.attribute("class")
                .map(|c| c.split_whitespace().any(|c| c == class_name))
                .unwrap_or(false)
        }

        pub fn add_class(&mut self, class_name: &str) {
            if self.has_class(class_name) {
                return;
            }
            let classes = match self.attribute("class") {
                Some(existing) if !existing.trim().is_empty() => {
                    format!("{} {}", existing.trim(), class_name)
                }
                _ => class_name.to_string(),
            };
            self.set_attribute("class", &classes);
        }
    }

    pub fn new_document() -> Document {
        Document {
            root: Rc::new(RefCell::new(Node::DocumentRoot(DocumentRootNode::new()))),
            doctype: RefCell::new(None),
        }
    }

    /// Creates a detached element handle.
    pub fn element(tag: &str) -> NodeRef {
        Rc::new(RefCell::new(Node::Element(ElementNode::new(tag))))
    }

    /// Creates a detached element carrying the given attributes.
    pub fn element_with(tag: &str, attributes: &[(&str, &str)]) -> NodeRef {
        let node = element(tag);
        for (name, value) in attributes {
            set_attr(&node, name, value);
        }
        node
    }

    pub fn text(content: &str) -> NodeRef {
        Rc::new(RefCell::new(Node::Text(content.to_string())))
    }

    pub fn is_element(node: &NodeRef) -> bool {
        matches!(*node.borrow(), Node::Element(_))
    }

    /// Runs `f` against the element behind `node`. Returns `None` for non-elements.
    pub fn with_element<R>(node: &NodeRef, f: impl FnOnce(&ElementNode) -> R) -> Option<R> {
        match &*node.borrow() {
            Node::Element(elem) => Some(f(elem)),
            _ => None,
        }
    }

    pub fn with_element_mut<R>(
        node: &NodeRef,
        f: impl FnOnce(&mut ElementNode) -> R,
    ) -> Option<R> {
        match &mut *node.borrow_mut() {
            Node::Element(elem) => Some(f(elem)),
            _ => None,
        }
    }

    pub fn tag_name(node: &NodeRef) -> Option<String> {
        with_element(node, |e| e.tag.clone())
    }

    pub fn get_attr(node: &NodeRef, name: &str) -> Option<String> {
        with_element(node, |e| e.attribute(name).map(str::to_string)).flatten()
    }

    pub fn has_attr(node: &NodeRef, name: &str) -> bool {
        with_element(node, |e| e.has_attribute(name)).unwrap_or(false)
    }

    pub fn set_attr(node: &NodeRef, name: &str, value: &str) {
        with_element_mut(node, |e| e.set_attribute(name, value));
    }

    pub fn remove_attr(node: &NodeRef, name: &str) {
        with_element_mut(node, |e| e.remove_attribute(name));
    }

    /// Sets or removes a boolean attribute such as `checked` or `disabled`.
    pub fn toggle_attr(node: &NodeRef, name: &str, on: bool) {
        if on {
            set_attr(node, name, "");
        } else {
            remove_attr(node, name);
        }
    }

    pub fn add_class(node: &NodeRef, class_name: &str) {
        with_element_mut(node, |e| e.add_class(class_name));
    }

    pub fn has_class(node: &NodeRef, class_name: &str) -> bool {
        with_element(node, |e| e.has_class(class_name)).unwrap_or(false)
    }

    pub fn parent_of(node: &NodeRef) -> Option<NodeRef> {
        with_element(node, |e| e.parent.as_ref().and_then(Weak::upgrade)).flatten()
    }

    /// Removes `child` from its current parent. Only elements track their parent.
    pub fn detach(child: &NodeRef) {
        let Some(parent) = parent_of(child) else {
            return;
        };
        children_mut(&parent, |children| {
            children.retain(|c| !Rc::ptr_eq(c, child));
        });
        with_element_mut(child, |e| e.parent = None);
    }

    fn children_mut<R>(node: &NodeRef, f: impl FnOnce(&mut Vec<NodeRef>) -> R) -> Option<R> {
        match &mut *node.borrow_mut() {
            Node::DocumentRoot(root) => Some(f(&mut root.children)),
            Node::Element(elem) => Some(f(&mut elem.children)),
            Node::Text(_) => None,
        }
    }

    fn adopt(parent: &NodeRef, child: &NodeRef) {
        detach(child);
        with_element_mut(child, |e| e.parent = Some(Rc::downgrade(parent)));
    }

    /// Appends `child` to `parent`, moving it out of its previous parent first.
    pub fn append_child(parent: &NodeRef, child: &NodeRef) {
        adopt(parent, child);
        children_mut(parent, |children| children.push(child.clone()));
    }

    pub fn prepend_child(parent: &NodeRef, child: &NodeRef) {
        adopt(parent, child);
        children_mut(parent, |children| children.insert(0, child.clone()));
    }

    /// Inserts `child` right before `reference`. Appends when `reference`
    /// is not a child of `parent`.
    pub fn insert_before(parent: &NodeRef, child: &NodeRef, reference: &NodeRef) {
        adopt(parent, child);
        children_mut(parent, |children| {
            match children.iter().position(|c| Rc::ptr_eq(c, reference)) {
                Some(index) => children.insert(index, child.clone()),
                None => children.push(child.clone()),
            }
        });
    }

    /// Removes every child of `node` and hands them back in order. Text
    /// children have no parent link, so this is the only way to move them.
    pub fn take_children(node: &NodeRef) -> Vec<NodeRef> {
        let children = children_mut(node, std::mem::take).unwrap_or_default();
        for child in &children {
            with_element_mut(child, |e| e.parent = None);
        }
        children
    }

    /// Drops every current child and appends `new_children` in order.
    pub fn replace_children(parent: &NodeRef, new_children: &[NodeRef]) {
        take_children(parent);
        for child in new_children {
            append_child(parent, child);
        }
    }

    pub fn children_of(node: &NodeRef) -> Vec<NodeRef> {
        match &*node.borrow() {
            Node::DocumentRoot(root) => root.children.clone(),
            Node::Element(elem) => elem.children.clone(),
            Node::Text(_) => Vec::new(),
        }
    }

    pub fn element_children(node: &NodeRef) -> Vec<NodeRef> {
        children_of(node).into_iter().filter(is_element).collect()
    }

    /// Positional element-child access, like `children.item(index)`.
    pub fn element_child(node: &NodeRef, index: usize) -> Option<NodeRef> {
        element_children(node).into_iter().nth(index)
    }

    /// All descendant elements of `node` in tree order, `node` excluded.
    pub fn descendants(node: &NodeRef) -> Vec<NodeRef> {
        let mut out = Vec::new();
        collect_descendants(node, &mut out);
        out
    }

    fn collect_descendants(node: &NodeRef, out: &mut Vec<NodeRef>) {
        for child in element_children(node) {
            out.push(child.clone());
            collect_descendants(&child, out);
        }
    }

    pub fn find_first(node: &NodeRef, pred: impl Fn(&ElementNode) -> bool) -> Option<NodeRef> {
        descendants(node)
            .into_iter()
            .find(|n| with_element(n, &pred).unwrap_or(false))
    }

    pub fn find_all(node: &NodeRef, pred: impl Fn(&ElementNode) -> bool) -> Vec<NodeRef> {
        descendants(node)
            .into_iter()
            .filter(|n| with_element(n, &pred).unwrap_or(false))
            .collect()
    }

    pub fn find_by_id(node: &NodeRef, id: &str) -> Option<NodeRef> {
        find_first(node, |e| e.attribute("id") == Some(id))
    }

    /// Concatenated text of `node` and all of its descendants.
    pub fn text_content(node: &NodeRef) -> String {
        match &*node.borrow() {
            Node::Text(t) => t.clone(),
            Node::DocumentRoot(root) => root.children.iter().map(text_content).collect(),
            Node::Element(elem) => elem.children.iter().map(text_content).collect(),
        }
    }

    pub fn set_text_content(node: &NodeRef, content: &str) {
        replace_children(node, &[]);
        children_mut(node, |children| children.push(text(content)));
    }

    /// Appends text to `node`, merging with a trailing text child.
    pub fn append_text(node: &NodeRef, content: &str) {
        let last = children_of(node).pop();
        if let Some(last) = last {
            if let Node::Text(ref mut t) = *last.borrow_mut() {
                t.push_str(content);
                return;
            }
        }
        children_mut(node, |children| children.push(text(content)));
    }

    /// A list of void (self-closing) elements in HTML.
    const VOID_ELEMENTS: &[&str] = &[
        "meta", "img", "br", "hr", "input", "link", "area", "base", "col", "embed", "param",
        "source", "track", "wbr",
    ];

    /// Elements whose text is emitted verbatim.
    const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

    /// Serializes `node` (and its subtree) to markup.
    pub fn to_html(node: &NodeRef) -> String {
        let mut out = String::new();
        write_html(node, false, &mut out);
        out
    }

    fn write_html(node: &NodeRef, raw: bool, out: &mut String) {
        match &*node.borrow() {
            Node::DocumentRoot(root) => {
                for child in &root.children {
                    write_html(child, false, out);
                }
            }
            Node::Text(t) => {
                if raw {
                    out.push_str(t);
                } else {
                    out.push_str(&escape(t, false));
                }
            }
            Node::Element(elem) => {
                out.push('<');
                out.push_str(&elem.tag);
                for (k, v) in &elem.attributes {
                    if v.is_empty() {
                        out.push_str(&format!(" {}", k));
                    } else {
                        out.push_str(&format!(" {}=\"{}\"", k, escape(v, true)));
                    }
                }
                out.push('>');
                if VOID_ELEMENTS.contains(&elem.tag.as_str()) {
                    return;
                }
                let raw = RAW_TEXT_ELEMENTS.contains(&elem.tag.as_str());
                for child in &elem.children {
                    write_html(child, raw, out);
                }
                out.push_str(&format!("</{}>", elem.tag));
            }
        }
    }

    fn escape(value: &str, attribute: bool) -> String {
        let mut out = String::with_capacity(value.len());
        for c in value.chars() {
            match c {
                '&' => out.push_str("&amp;"),
                '<' if !attribute => out.push_str("&lt;"),
                '>' if !attribute => out.push_str("&gt;"),
                '"' if attribute => out.push_str("&quot;"),
                _ => out.push(c),
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::dom_tree::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn append_moves_node_between_parents() {
        let first = element("div");
        let second = element("fieldset");
        let child = element_with("input", &[("name", "a")]);

        append_child(&first, &child);
        append_child(&second, &child);

        assert!(element_children(&first).is_empty());
        assert_eq!(element_children(&second).len(), 1);
        assert!(std::rc::Rc::ptr_eq(&parent_of(&child).unwrap(), &second));
    }

    #[test]
    fn serializes_void_and_boolean_attributes() {
        let wrapper = element_with("div", &[("class", "field-wrapper")]);
        let input = element_with("input", &[("type", "checkbox"), ("checked", "")]);
        let label = element_with("label", &[("for", "x")]);
        set_text_content(&label, "A & B");
        append_child(&wrapper, &input);
        prepend_child(&wrapper, &label);

        assert_eq!(
            to_html(&wrapper),
            r#"<div class="field-wrapper"><label for="x">A &amp; B</label><input type="checkbox" checked></div>"#
        );
    }

    #[test]
    fn add_class_does_not_duplicate() {
        let node = element_with("div", &[("class", "switch")]);
        add_class(&node, "switch");
        add_class(&node, "open");
        assert_eq!(get_attr(&node, "class").as_deref(), Some("switch open"));
    }
}
