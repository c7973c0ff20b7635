//! Canonical routing handle sets.
//!
//! An edge with `n` routing points in edit mode carries `2n + 1` handles:
//! a line handle before the first point (index `-1`), then a junction and a
//! line handle for every point. The canonical set is always derivable from
//! the point count, which is what lets undo rebuild it from a snapshot.

use crate::model::{Element, ElementId, HandleKind, ModelError, ModelRoot};

/// Deterministic id of the canonical handle in `slot` of `edge`.
pub fn canonical_handle_id(edge: &str, slot: usize) -> ElementId {
    ElementId::new(format!("{edge}_rh{slot}"))
}

/// Prefix for handle ids handed out by the allocator.
pub(crate) fn allocated_handle_prefix(edge: &str) -> String {
    format!("{edge}_rh")
}

/// `(kind, point_index)` of every handle in the canonical set for `count`
/// routing points, in slot order.
pub fn canonical_layout(count: usize) -> impl Iterator<Item = (HandleKind, i32)> {
    std::iter::once((HandleKind::Line, -1)).chain((0..count as i32).flat_map(|index| {
        [(HandleKind::Junction, index), (HandleKind::Line, index)]
    }))
}

/// Attaches the canonical handle set to `edge`. Returns the number of
/// handles created; zero if `edge` is not routable.
///
/// Expects `edge` to carry no handles yet. A slot whose canonical id is
/// taken falls back to an allocated id.
pub fn create_routing_handles(root: &mut ModelRoot, edge: &str) -> Result<usize, ModelError> {
    let Some(element) = root.get(edge) else {
        return Err(ModelError::UnknownElement(ElementId::from(edge)));
    };
    if !element.is_routable() {
        return Ok(0);
    }
    let count = element.routing_points.as_ref().map_or(0, Vec::len);
    let mut created = 0;
    for (slot, (kind, index)) in canonical_layout(count).enumerate() {
        let mut id = canonical_handle_id(edge, slot);
        if root.contains(id.as_str()) {
            id = root.allocate_id(&allocated_handle_prefix(edge));
        }
        root.add(edge, Element::routing_handle(id, kind, index))?;
        created += 1;
    }
    Ok(created)
}

/// Removes every routing handle child of `edge` and returns them in child
/// order.
pub fn remove_routing_handles(root: &mut ModelRoot, edge: &str) -> Vec<Element> {
    root.remove_children_where(edge, Element::is_routing_handle)
}

/// Drops the handles of `edge` and recreates the canonical set from its
/// current routing points.
pub fn reset_routing_handles(root: &mut ModelRoot, edge: &str) -> Result<usize, ModelError> {
    remove_routing_handles(root, edge);
    create_routing_handles(root, edge)
}

/// Returns `true` if `edge` has at least one routing handle child.
pub fn has_routing_handles(root: &ModelRoot, edge: &str) -> bool {
    root.children_of(edge).any(Element::is_routing_handle)
}

/// Finds the handle of `edge` with the given kind and point index.
pub fn find_handle(
    root: &ModelRoot,
    edge: &str,
    kind: HandleKind,
    point_index: i32,
) -> Option<ElementId> {
    root.children_of(edge)
        .find(|child| {
            child
                .handle
                .is_some_and(|h| h.kind == kind && h.point_index == point_index)
        })
        .map(|child| child.id.clone())
}
