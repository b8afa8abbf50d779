pub mod attrs;
mod markup;

pub use markup::load_page;

use std::collections::{BTreeMap, BTreeSet};

/// Index of an element inside a [`Document`]
pub type NodeId = usize;

/// CSS display value as far as the scripts care about it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Display {
    /// Inline style cleared, element uses its stylesheet display
    #[default]
    Default,
    None,
    Flex,
}

impl Display {
    pub fn as_str(&self) -> &'static str {
        match self {
            Display::Default => "",
            Display::None => "none",
            Display::Flex => "flex",
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Element {
    pub tag: String,
    pub attrs: BTreeMap<String, String>,
    pub text: String,
    pub display: Display,
    pub styles: BTreeMap<String, String>,
    pub classes: BTreeSet<String>,
    pub children: Vec<NodeId>,
    pub parent: Option<NodeId>,
}

impl Element {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            ..Default::default()
        }
    }

    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.insert(name.into(), value.into());
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.classes.insert(class.into());
        self
    }
}

/// In-memory page tree the engine reads attributes from and writes display state to.
///
/// All setters compare before assigning, so repeated projections of an unchanged
/// state leave `write_count` untouched.
#[derive(Debug, Clone)]
pub struct Document {
    nodes: Vec<Element>,
    location: String,
    hidden: bool,
    writes: u64,
}

impl Document {
    pub fn new(location: impl Into<String>) -> Self {
        Self {
            nodes: vec![Element::new("body")],
            location: location.into(),
            hidden: false,
            writes: 0,
        }
    }

    pub fn root(&self) -> NodeId {
        0
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn set_location(&mut self, location: impl Into<String>) {
        self.location = location.into();
    }

    pub fn is_hidden(&self) -> bool {
        self.hidden
    }

    pub fn set_hidden(&mut self, hidden: bool) {
        self.hidden = hidden;
    }

    /// Number of writes that actually changed something
    pub fn write_count(&self) -> u64 {
        self.writes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn element(&self, id: NodeId) -> Option<&Element> {
        self.nodes.get(id)
    }

    pub fn append_child(&mut self, parent: NodeId, mut element: Element) -> NodeId {
        let id = self.nodes.len();
        element.parent = Some(parent);
        element.children.clear();
        self.nodes.push(element);
        if let Some(p) = self.nodes.get_mut(parent) {
            p.children.push(id);
        }
        id
    }

    // ==================== Queries ====================

    pub fn attr(&self, id: NodeId, name: &str) -> Option<&str> {
        self.nodes.get(id)?.attrs.get(name).map(String::as_str)
    }

    pub fn has_attr(&self, id: NodeId, name: &str) -> bool {
        self.attr(id, name).is_some()
    }

    pub fn text(&self, id: NodeId) -> &str {
        self.nodes.get(id).map(|e| e.text.as_str()).unwrap_or("")
    }

    pub fn display(&self, id: NodeId) -> Display {
        self.nodes.get(id).map(|e| e.display).unwrap_or_default()
    }

    pub fn style(&self, id: NodeId, prop: &str) -> Option<&str> {
        self.nodes.get(id)?.styles.get(prop).map(String::as_str)
    }

    pub fn has_class(&self, id: NodeId, class: &str) -> bool {
        self.nodes
            .get(id)
            .map(|e| e.classes.contains(class))
            .unwrap_or(false)
    }

    pub fn tag(&self, id: NodeId) -> &str {
        self.nodes.get(id).map(|e| e.tag.as_str()).unwrap_or("")
    }

    /// Descendants of `scope` (scope excluded) in document order
    pub fn descendants(&self, scope: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        let mut stack: Vec<NodeId> = match self.nodes.get(scope) {
            Some(e) => e.children.iter().rev().copied().collect(),
            None => return out,
        };
        while let Some(id) = stack.pop() {
            out.push(id);
            if let Some(e) = self.nodes.get(id) {
                stack.extend(e.children.iter().rev().copied());
            }
        }
        out
    }

    /// All descendants of `scope` carrying `attr`, like `querySelectorAll('[attr]')`
    pub fn query_all(&self, scope: NodeId, attr: &str) -> Vec<NodeId> {
        self.descendants(scope)
            .into_iter()
            .filter(|&id| self.has_attr(id, attr))
            .collect()
    }

    pub fn query(&self, scope: NodeId, attr: &str) -> Option<NodeId> {
        self.descendants(scope)
            .into_iter()
            .find(|&id| self.has_attr(id, attr))
    }

    /// First descendant whose `attr` equals `value`
    pub fn query_value(&self, scope: NodeId, attr: &str, value: &str) -> Option<NodeId> {
        self.descendants(scope)
            .into_iter()
            .find(|&id| self.attr(id, attr) == Some(value))
    }

    pub fn query_tag(&self, scope: NodeId, tag: &str) -> Option<NodeId> {
        self.descendants(scope)
            .into_iter()
            .find(|&id| self.tag(id).eq_ignore_ascii_case(tag))
    }

    /// Nearest ancestor-or-self carrying `class`
    pub fn closest_with_class(&self, id: NodeId, class: &str) -> Option<NodeId> {
        let mut current = Some(id);
        while let Some(node) = current {
            if self.has_class(node, class) {
                return Some(node);
            }
            current = self.nodes.get(node).and_then(|e| e.parent);
        }
        None
    }

    /// True when neither the node nor any ancestor is `display: none`
    pub fn is_rendered(&self, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(node) = current {
            match self.nodes.get(node) {
                Some(e) if e.display == Display::None => return false,
                Some(e) => current = e.parent,
                None => return false,
            }
        }
        true
    }

    // ==================== Writes ====================

    pub fn set_text(&mut self, id: NodeId, text: &str) -> bool {
        let Some(e) = self.nodes.get_mut(id) else {
            return false;
        };
        if e.text == text {
            return false;
        }
        e.text = text.to_string();
        self.writes += 1;
        true
    }

    pub fn set_display(&mut self, id: NodeId, display: Display) -> bool {
        let Some(e) = self.nodes.get_mut(id) else {
            return false;
        };
        if e.display == display {
            return false;
        }
        e.display = display;
        self.writes += 1;
        true
    }

    pub fn set_attr(&mut self, id: NodeId, name: &str, value: &str) -> bool {
        let Some(e) = self.nodes.get_mut(id) else {
            return false;
        };
        if e.attrs.get(name).map(String::as_str) == Some(value) {
            return false;
        }
        e.attrs.insert(name.to_string(), value.to_string());
        self.writes += 1;
        true
    }

    pub fn set_style(&mut self, id: NodeId, prop: &str, value: &str) -> bool {
        let Some(e) = self.nodes.get_mut(id) else {
            return false;
        };
        if e.styles.get(prop).map(String::as_str) == Some(value) {
            return false;
        }
        e.styles.insert(prop.to_string(), value.to_string());
        self.writes += 1;
        true
    }

    pub fn add_class(&mut self, id: NodeId, class: &str) -> bool {
        let Some(e) = self.nodes.get_mut(id) else {
            return false;
        };
        if !e.classes.insert(class.to_string()) {
            return false;
        }
        self.writes += 1;
        true
    }

    pub fn remove_class(&mut self, id: NodeId, class: &str) -> bool {
        let Some(e) = self.nodes.get_mut(id) else {
            return false;
        };
        if !e.classes.remove(class) {
            return false;
        }
        self.writes += 1;
        true
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new("about:blank")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> (Document, NodeId, NodeId, NodeId) {
        let mut doc = Document::new("https://example.com/sessions/a");
        let root = doc.root();
        let list = doc.append_child(root, Element::new("div").with_class("w-dyn-item"));
        let a = doc.append_child(list, Element::new("div").with_attr("data-agenda-item", "a"));
        let b = doc.append_child(root, Element::new("div").with_attr("data-agenda-item", "b"));
        (doc, list, a, b)
    }

    #[test]
    fn test_query_all_document_order() {
        let (doc, _, a, b) = sample();
        assert_eq!(doc.query_all(doc.root(), "data-agenda-item"), vec![a, b]);
        assert_eq!(doc.query_value(doc.root(), "data-agenda-item", "b"), Some(b));
        assert_eq!(doc.query_value(doc.root(), "data-agenda-item", "c"), None);
    }

    #[test]
    fn test_query_excludes_scope() {
        let (doc, _, a, _) = sample();
        assert!(doc.query_all(a, "data-agenda-item").is_empty());
    }

    #[test]
    fn test_writes_only_on_change() {
        let (mut doc, _, a, _) = sample();
        assert!(doc.set_text(a, "hello"));
        assert!(!doc.set_text(a, "hello"));
        assert!(doc.set_display(a, Display::None));
        assert!(!doc.set_display(a, Display::None));
        assert!(doc.add_class(a, "session-before"));
        assert!(!doc.add_class(a, "session-before"));
        assert!(!doc.remove_class(a, "session-after"));
        assert_eq!(doc.write_count(), 3);
    }

    #[test]
    fn test_is_rendered_follows_ancestors() {
        let (mut doc, list, a, b) = sample();
        assert!(doc.is_rendered(a));
        doc.set_display(list, Display::None);
        assert!(!doc.is_rendered(a));
        assert!(doc.is_rendered(b));
    }

    #[test]
    fn test_closest_with_class() {
        let (doc, list, a, b) = sample();
        assert_eq!(doc.closest_with_class(a, "w-dyn-item"), Some(list));
        assert_eq!(doc.closest_with_class(b, "w-dyn-item"), None);
    }
}
