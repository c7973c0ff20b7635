//! The model root: arena, index and tree mutation.

use std::collections::HashMap;

use crate::math::Bounds;

use super::element::{Element, ElementId};

/// Errors raised by structural tree mutations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    /// An element with this id is already part of the tree.
    #[error("duplicate element id: {0}")]
    DuplicateId(ElementId),
    /// The requested parent is not part of the tree.
    #[error("unknown parent: {0}")]
    UnknownParent(ElementId),
    /// The requested element is not part of the tree.
    #[error("unknown element: {0}")]
    UnknownElement(ElementId),
    /// The root element cannot be removed.
    #[error("cannot remove the root element")]
    RootRemoval,
}

/// The mutable diagram model.
///
/// Every element, the root included, lives in a single map keyed by
/// [`ElementId`]. The map doubles as the identifier index, so lookups are
/// O(1) and membership changes keep it up to date without a rebuild.
#[derive(Debug, Clone)]
pub struct ModelRoot {
    root_id: ElementId,
    elements: HashMap<ElementId, Element>,
    /// Canvas bounds in page coordinates, reported by the rendering side.
    pub canvas_bounds: Bounds,
    next_seq: u64,
}

impl ModelRoot {
    /// Creates a tree containing only the root element.
    pub fn new(id: impl Into<ElementId>, type_tag: impl Into<String>) -> Self {
        let root = Element::new(id, type_tag);
        let root_id = root.id.clone();
        let mut elements = HashMap::new();
        elements.insert(root_id.clone(), root);
        Self {
            root_id,
            elements,
            canvas_bounds: Bounds::EMPTY,
            next_seq: 0,
        }
    }

    /// Id of the root element.
    pub fn id(&self) -> &ElementId {
        &self.root_id
    }

    /// The root element itself.
    pub fn root_element(&self) -> &Element {
        &self.elements[&self.root_id]
    }

    /// Number of elements, root included.
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Always `false`: the root element is always present.
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.elements.contains_key(id)
    }

    pub fn get(&self, id: &str) -> Option<&Element> {
        self.elements.get(id)
    }

    pub fn get_mut(&mut self, id: &str) -> Option<&mut Element> {
        self.elements.get_mut(id)
    }

    /// Iterates over all elements in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = &Element> {
        self.elements.values()
    }

    /// Iterates over the direct children of `id`, in child order.
    ///
    /// Yields nothing if `id` is unknown.
    pub fn children_of<'a>(&'a self, id: &str) -> impl Iterator<Item = &'a Element> + use<'a> {
        self.elements
            .get(id)
            .map(|e| e.children.as_slice())
            .unwrap_or_default()
            .iter()
            .filter_map(|child| self.elements.get(child))
    }

    /// Attaches `element` as the last child of `parent`.
    ///
    /// Any parent or child links already present on `element` are
    /// discarded; only the tree decides them.
    pub fn add(&mut self, parent: &str, mut element: Element) -> Result<(), ModelError> {
        if self.elements.contains_key(element.id.as_str()) {
            return Err(ModelError::DuplicateId(element.id));
        }
        let Some(parent_element) = self.elements.get_mut(parent) else {
            return Err(ModelError::UnknownParent(ElementId::from(parent)));
        };
        parent_element.children.push(element.id.clone());
        element.parent = Some(parent_element.id.clone());
        element.children.clear();
        self.elements.insert(element.id.clone(), element);
        Ok(())
    }

    /// Detaches `id` and its whole subtree, returning the removed elements
    /// depth-first with `id` first.
    pub fn remove(&mut self, id: &str) -> Result<Vec<Element>, ModelError> {
        if id == self.root_id.as_str() {
            return Err(ModelError::RootRemoval);
        }
        let Some(parent) = self.elements.get(id).and_then(|e| e.parent.clone()) else {
            return Err(ModelError::UnknownElement(ElementId::from(id)));
        };
        if let Some(parent) = self.elements.get_mut(&parent) {
            parent.children.retain(|child| child.as_str() != id);
        }
        let mut removed = Vec::new();
        self.remove_subtree(id, &mut removed);
        Ok(removed)
    }

    fn remove_subtree(&mut self, id: &str, removed: &mut Vec<Element>) {
        let Some(element) = self.elements.remove(id) else {
            return;
        };
        let children = element.children.clone();
        removed.push(element);
        for child in children {
            self.remove_subtree(child.as_str(), removed);
        }
    }

    /// Removes every direct child of `parent` matching `predicate`,
    /// together with its subtree. Returns the removed elements in child
    /// order, each subtree depth-first, ready for [`restore`](Self::restore).
    pub fn remove_children_where(
        &mut self,
        parent: &str,
        predicate: impl Fn(&Element) -> bool,
    ) -> Vec<Element> {
        let doomed: Vec<ElementId> = self
            .children_of(parent)
            .filter(|child| predicate(*child))
            .map(|child| child.id.clone())
            .collect();
        let mut removed = Vec::new();
        for id in &doomed {
            // Children of a known parent are always present.
            if let Ok(subtree) = self.remove(id.as_str()) {
                removed.extend(subtree);
            }
        }
        removed
    }

    /// Re-attaches previously removed elements under the parents they
    /// record, in the given order. Parents must precede their children.
    pub fn restore(
        &mut self,
        elements: impl IntoIterator<Item = Element>,
    ) -> Result<(), ModelError> {
        for element in elements {
            let parent = element.parent.clone().unwrap_or_else(|| self.root_id.clone());
            self.add(parent.as_str(), element)?;
        }
        Ok(())
    }

    /// Returns a fresh identifier of the form `<prefix>_n<seq>` that is not
    /// yet used in the tree.
    pub fn allocate_id(&mut self, prefix: &str) -> ElementId {
        loop {
            let candidate = ElementId::new(format!("{prefix}_n{}", self.next_seq));
            self.next_seq += 1;
            if !self.elements.contains_key(candidate.as_str()) {
                return candidate;
            }
        }
    }
}

/// Structural equality: same root, same canvas bounds, same elements.
///
/// The id allocator is bookkeeping and does not take part.
impl PartialEq for ModelRoot {
    fn eq(&self, other: &Self) -> bool {
        self.root_id == other.root_id
            && self.canvas_bounds == other.canvas_bounds
            && self.elements == other.elements
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::point;

    fn sample() -> ModelRoot {
        let mut root = ModelRoot::new("graph", "graph");
        root.add("graph", Element::node("n0", "node", point(0.0, 0.0)))
            .unwrap();
        root.add("graph", Element::node("n1", "node", point(5.0, 5.0)))
            .unwrap();
        root.add("graph", Element::edge("e0", "edge", "n0", "n1"))
            .unwrap();
        root.add("e0", Element::new("e0_label", "label")).unwrap();
        root
    }

    #[test]
    fn add_links_parent_and_child() {
        let root = sample();
        assert_eq!(root.len(), 5);
        let label = root.get("e0_label").unwrap();
        assert_eq!(label.parent(), Some(&ElementId::from("e0")));
        let ids: Vec<&str> = root.children_of("graph").map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["n0", "n1", "e0"]);
    }

    #[test]
    fn add_rejects_duplicates_and_unknown_parents() {
        let mut root = sample();
        assert_eq!(
            root.add("graph", Element::new("n0", "node")),
            Err(ModelError::DuplicateId("n0".into()))
        );
        assert_eq!(
            root.add("missing", Element::new("x", "node")),
            Err(ModelError::UnknownParent("missing".into()))
        );
    }

    #[test]
    fn remove_takes_subtree() {
        let mut root = sample();
        let removed = root.remove("e0").unwrap();
        let ids: Vec<&str> = removed.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, vec!["e0", "e0_label"]);
        assert!(!root.contains("e0_label"));
        assert_eq!(root.children_of("graph").count(), 2);
    }

    #[test]
    fn remove_root_is_rejected() {
        let mut root = sample();
        assert_eq!(root.remove("graph"), Err(ModelError::RootRemoval));
        assert_eq!(
            root.remove("nope"),
            Err(ModelError::UnknownElement("nope".into()))
        );
    }

    #[test]
    fn remove_children_where_filters() {
        let mut root = sample();
        let removed = root.remove_children_where("graph", |e| e.is_moveable());
        assert_eq!(removed.len(), 2);
        assert!(root.contains("e0"));
        assert!(!root.contains("n0"));
    }

    #[test]
    fn restore_puts_removed_children_back() {
        let mut root = sample();
        root.add("e0", Element::new("label", "label")).unwrap();
        root.add("label", Element::new("text", "text")).unwrap();
        let before = root.clone();

        let removed = root.remove_children_where("e0", |_| true);
        let ids: Vec<&str> = removed.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, ["label", "text"]);
        assert!(!root.contains("text"));

        root.restore(removed).unwrap();
        assert_eq!(root, before);
    }

    #[test]
    fn allocate_id_skips_taken_ids() {
        let mut root = sample();
        root.add("graph", Element::new("h_n0", "x")).unwrap();
        assert_eq!(root.allocate_id("h"), ElementId::from("h_n1"));
        assert_eq!(root.allocate_id("h"), ElementId::from("h_n2"));
    }

    #[test]
    fn equality_ignores_allocator() {
        let a = sample();
        let mut b = sample();
        let _ = b.allocate_id("x");
        assert_eq!(a, b);
        b.canvas_bounds = Bounds::new(0.0, 0.0, 100.0, 100.0);
        assert_ne!(a, b);
    }
}
