//! Elements of the model tree.
//!
//! An [`Element`] is a flat record stored in the [`ModelRoot`](super::ModelRoot)
//! arena. Parent and child links are identifiers, never references, so the
//! tree can be mutated in place without fighting ownership cycles.

use std::borrow::Borrow;
use std::fmt;

use bitflags::bitflags;

use crate::math::{Bounds, Point};

/// Identifier of an element, unique across the whole tree.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(String);

impl ElementId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for ElementId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ElementId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl From<String> for ElementId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

bitflags! {
    /// Capabilities an element opts into.
    ///
    /// Commands check features before touching an element, so a move
    /// command never repositions an edge and an edit-mode switch never
    /// decorates a node.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct Features: u32 {
        /// Has a position that [`MoveCommand`](crate::features::MoveCommand) may change.
        const MOVEABLE = 1 << 0;
        /// Carries bounds measured by the rendering collaborator.
        const BOUNDS = 1 << 1;
        /// Lays out its children before its own bounds are known.
        const LAYOUT = 1 << 2;
        /// Owns an ordered sequence of routing points.
        const ROUTABLE = 1 << 3;
        /// Routing points may be edited through routing handles.
        const EDIT_ROUTING = 1 << 4;
        /// Can be selected by the user.
        const SELECTABLE = 1 << 5;
    }
}

/// Routing handle flavour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandleKind {
    /// Sits on a persisted routing point.
    Junction,
    /// Volatile midpoint marker between two routing points.
    Line,
}

impl HandleKind {
    /// Type tag used for handle elements of this kind.
    pub fn type_tag(self) -> &'static str {
        match self {
            Self::Junction => "routing-point",
            Self::Line => "volatile-routing-point",
        }
    }
}

impl fmt::Display for HandleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Junction => f.write_str("junction"),
            Self::Line => f.write_str("line"),
        }
    }
}

/// Handle data attached to a routing-handle element.
///
/// `point_index` addresses the parent's routing points. A `Line` handle at
/// index `i` sits between point `i` and point `i + 1`; index `-1` is the
/// segment before the first point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RoutingHandle {
    pub kind: HandleKind,
    pub point_index: i32,
}

/// A node in the model tree.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub id: ElementId,
    pub type_tag: String,
    pub features: Features,
    pub(crate) parent: Option<ElementId>,
    pub(crate) children: Vec<ElementId>,
    /// Position of moveable elements.
    pub position: Option<Point>,
    /// Measured bounds of bounds-aware elements.
    pub bounds: Option<Bounds>,
    /// Set when the bounds are stale and need another measuring pass.
    pub revalidate_bounds: bool,
    /// Ordered routing points of routable elements.
    pub routing_points: Option<Vec<Point>>,
    /// Edge source, for routable elements.
    pub source: Option<ElementId>,
    /// Edge target, for routable elements.
    pub target: Option<ElementId>,
    /// Present on routing-handle elements only.
    pub handle: Option<RoutingHandle>,
}

impl Element {
    /// Creates a bare element with no features.
    pub fn new(id: impl Into<ElementId>, type_tag: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            type_tag: type_tag.into(),
            features: Features::empty(),
            parent: None,
            children: Vec::new(),
            position: None,
            bounds: None,
            revalidate_bounds: false,
            routing_points: None,
            source: None,
            target: None,
            handle: None,
        }
    }

    /// Creates a moveable, selectable, bounds-aware node at `position`.
    ///
    /// Bounds start out unmeasured and flagged for revalidation.
    pub fn node(id: impl Into<ElementId>, type_tag: impl Into<String>, position: Point) -> Self {
        let mut element = Self::new(id, type_tag);
        element.features = Features::MOVEABLE | Features::BOUNDS | Features::SELECTABLE;
        element.position = Some(position);
        element.bounds = Some(Bounds::EMPTY);
        element.revalidate_bounds = true;
        element
    }

    /// Creates a routable edge with editable routing and no routing points.
    pub fn edge(
        id: impl Into<ElementId>,
        type_tag: impl Into<String>,
        source: impl Into<ElementId>,
        target: impl Into<ElementId>,
    ) -> Self {
        let mut element = Self::new(id, type_tag);
        element.features = Features::ROUTABLE | Features::EDIT_ROUTING | Features::SELECTABLE;
        element.routing_points = Some(Vec::new());
        element.source = Some(source.into());
        element.target = Some(target.into());
        element
    }

    /// Creates a routing handle element.
    pub fn routing_handle(id: impl Into<ElementId>, kind: HandleKind, point_index: i32) -> Self {
        let mut element = Self::new(id, kind.type_tag());
        element.features = Features::SELECTABLE;
        element.handle = Some(RoutingHandle { kind, point_index });
        element
    }

    #[must_use]
    pub fn with_features(mut self, features: Features) -> Self {
        self.features = features;
        self
    }

    #[must_use]
    pub fn with_bounds(mut self, bounds: Bounds) -> Self {
        self.bounds = Some(bounds);
        self.revalidate_bounds = false;
        self
    }

    #[must_use]
    pub fn with_routing_points(mut self, points: Vec<Point>) -> Self {
        self.routing_points = Some(points);
        self
    }

    pub fn parent(&self) -> Option<&ElementId> {
        self.parent.as_ref()
    }

    pub fn children(&self) -> &[ElementId] {
        &self.children
    }

    pub fn has_feature(&self, feature: Features) -> bool {
        self.features.contains(feature)
    }

    pub fn is_moveable(&self) -> bool {
        self.has_feature(Features::MOVEABLE) && self.position.is_some()
    }

    pub fn is_bounds_aware(&self) -> bool {
        self.has_feature(Features::BOUNDS) && self.bounds.is_some()
    }

    pub fn is_routable(&self) -> bool {
        self.has_feature(Features::ROUTABLE) && self.routing_points.is_some()
    }

    /// Routable and open to interactive routing edits.
    pub fn can_edit_routing(&self) -> bool {
        self.is_routable() && self.has_feature(Features::EDIT_ROUTING)
    }

    pub fn is_routing_handle(&self) -> bool {
        self.handle.is_some()
    }
}
