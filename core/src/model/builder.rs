//! Fluent construction of graph models.

use crate::math::{Bounds, Point};

use super::element::{Element, ElementId};
use super::root::{ModelError, ModelRoot};

/// Builds a [`ModelRoot`] from nodes and edges.
///
/// Elements are attached to the root in the order they were declared.
///
/// # Example
///
/// ```
/// use linework_core::math::point;
/// use linework_core::model::GraphBuilder;
///
/// let root = GraphBuilder::new("graph", "graph")
///     .node("node0", "node:circle", point(100.0, 100.0))
///     .node("node1", "node:circle", point(200.0, 150.0))
///     .edge("edge0", "edge:straight", "node0", "node1")
///     .build()
///     .unwrap();
/// assert_eq!(root.len(), 4);
/// ```
#[derive(Debug)]
pub struct GraphBuilder {
    root: ModelRoot,
    elements: Vec<(ElementId, Element)>,
}

impl GraphBuilder {
    pub fn new(id: impl Into<ElementId>, type_tag: impl Into<String>) -> Self {
        Self {
            root: ModelRoot::new(id, type_tag),
            elements: Vec::new(),
        }
    }

    /// Sets the canvas bounds of the root.
    #[must_use]
    pub fn canvas_bounds(mut self, bounds: Bounds) -> Self {
        self.root.canvas_bounds = bounds;
        self
    }

    /// Adds a node under the root.
    #[must_use]
    pub fn node(self, id: &str, type_tag: &str, position: Point) -> Self {
        self.element(Element::node(id, type_tag, position))
    }

    /// Adds an edge without routing points under the root.
    #[must_use]
    pub fn edge(self, id: &str, type_tag: &str, source: &str, target: &str) -> Self {
        self.element(Element::edge(id, type_tag, source, target))
    }

    /// Adds an edge with the given routing points under the root.
    #[must_use]
    pub fn routed_edge(
        self,
        id: &str,
        type_tag: &str,
        source: &str,
        target: &str,
        routing_points: Vec<Point>,
    ) -> Self {
        self.element(Element::edge(id, type_tag, source, target).with_routing_points(routing_points))
    }

    /// Adds an arbitrary element under the root.
    #[must_use]
    pub fn element(mut self, element: Element) -> Self {
        let parent = self.root.id().clone();
        self.elements.push((parent, element));
        self
    }

    /// Adds an arbitrary element under `parent`, which must be declared
    /// earlier.
    #[must_use]
    pub fn child(mut self, parent: &str, element: Element) -> Self {
        self.elements.push((ElementId::from(parent), element));
        self
    }

    /// Assembles the tree.
    ///
    /// Fails on the first duplicate id or undeclared parent.
    pub fn build(self) -> Result<ModelRoot, ModelError> {
        let mut root = self.root;
        for (parent, element) in self.elements {
            root.add(parent.as_str(), element)?;
        }
        Ok(root)
    }
}
