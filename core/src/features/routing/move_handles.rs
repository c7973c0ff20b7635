//! Dragging routing handles.
//!
//! Moving a junction handle overwrites its routing point. Moving a line
//! handle upgrades it: a new routing point is inserted after its index, the
//! handle becomes the junction for that point, later handles shift up by
//! one and two fresh line handles flank the new junction.

use crate::action::Action;
use crate::animation::{Animation, RoutingPointTrack};
use crate::command::{Command, CommandOutcome, CommandResult};
use crate::math::Point;
use crate::model::{Element, ElementId, HandleKind, ModelError, ModelRoot};

use super::handles::{allocated_handle_prefix, find_handle, reset_routing_handles};

/// One handle drag.
#[derive(Debug, Clone, PartialEq)]
pub struct HandleMove {
    pub element_id: ElementId,
    /// Where the drag started. Seeds the point created by a line handle
    /// upgrade.
    pub from_position: Option<Point>,
    pub to_position: Point,
}

impl HandleMove {
    pub fn new(element_id: impl Into<ElementId>, to_position: Point) -> Self {
        Self {
            element_id: element_id.into(),
            from_position: None,
            to_position,
        }
    }

    #[must_use]
    pub fn starting_at(mut self, from_position: Point) -> Self {
        self.from_position = Some(from_position);
        self
    }
}

/// Moves a batch of routing handles, animated by default.
#[derive(Debug, Clone, PartialEq)]
pub struct MoveRoutingHandleAction {
    pub moves: Vec<HandleMove>,
    pub animate: bool,
}

impl MoveRoutingHandleAction {
    pub const KIND: &'static str = "moveHandle";

    pub fn new(moves: Vec<HandleMove>) -> Self {
        Self {
            moves,
            animate: true,
        }
    }

    #[must_use]
    pub fn without_animation(mut self) -> Self {
        self.animate = false;
        self
    }
}

impl Action for MoveRoutingHandleAction {
    fn kind(&self) -> &str {
        Self::KIND
    }
}

/// A move whose handle was found in the tree.
///
/// `(edge, kind, point_index)` is the handle's address at resolve time;
/// redo uses it to find the handle again after undo rebuilt the set.
#[derive(Debug, Clone)]
struct ResolvedMove {
    handle: ElementId,
    edge: ElementId,
    kind: HandleKind,
    point_index: i32,
    from_position: Option<Point>,
    to_position: Point,
}

/// A point that was moved, addressed by its handle until the whole batch
/// has been applied.
struct MovedPoint {
    handle: ElementId,
    edge: ElementId,
    from: Point,
    to: Point,
}

/// Applies a [`MoveRoutingHandleAction`].
///
/// Moves whose element is missing or not a routing handle are dropped
/// silently, as are moves addressing a point index outside the edge's
/// point sequence. Undo restores the routing points captured before the
/// first move and rebuilds the canonical handle set; when animated, the
/// points first travel back and the restore happens at `t = 1`.
#[derive(Debug)]
pub struct MoveRoutingHandleCommand {
    action: MoveRoutingHandleAction,
    resolved: Vec<ResolvedMove>,
    original_points: Vec<(ElementId, Vec<Point>)>,
    tracks: Vec<RoutingPointTrack>,
}

impl MoveRoutingHandleCommand {
    pub fn new(action: &MoveRoutingHandleAction) -> Self {
        Self {
            action: action.clone(),
            resolved: Vec::new(),
            original_points: Vec::new(),
            tracks: Vec::new(),
        }
    }

    fn resolve(root: &ModelRoot, handle_move: &HandleMove) -> Option<ResolvedMove> {
        let element = root.get(handle_move.element_id.as_str())?;
        let Some(handle) = element.handle else {
            log::debug!("Not a routing handle: {}", handle_move.element_id);
            return None;
        };
        let edge = element.parent()?;
        if !root.get(edge.as_str())?.is_routable() {
            return None;
        }
        Some(ResolvedMove {
            handle: element.id.clone(),
            edge: edge.clone(),
            kind: handle.kind,
            point_index: handle.point_index,
            from_position: handle_move.from_position,
            to_position: handle_move.to_position,
        })
    }

    fn forward(&mut self, root: &mut ModelRoot, moves: &[ResolvedMove]) -> CommandResult {
        self.original_points = snapshot(root, moves);
        let mut moved = Vec::new();
        for resolved in moves {
            if let Some(point) = apply(root, resolved, !self.action.animate)? {
                moved.push(point);
            }
        }
        self.tracks = moved
            .into_iter()
            .filter_map(|point| track_for(root, point))
            .collect();
        if self.action.animate && !self.tracks.is_empty() {
            return Ok(CommandOutcome::Animate(Animation::MoveRoutingPoints {
                tracks: self.tracks.clone(),
                restore: None,
            }));
        }
        Ok(CommandOutcome::Done)
    }
}

impl Command for MoveRoutingHandleCommand {
    fn description(&self) -> &str {
        "Move routing handle"
    }

    fn execute(&mut self, root: &mut ModelRoot) -> CommandResult {
        self.resolved = self
            .action
            .moves
            .iter()
            .filter_map(|handle_move| Self::resolve(root, handle_move))
            .collect();
        let moves = self.resolved.clone();
        self.forward(root, &moves)
    }

    fn undo(&mut self, root: &mut ModelRoot) -> CommandResult {
        if self.original_points.is_empty() {
            return Ok(CommandOutcome::Done);
        }
        if self.action.animate {
            let tracks = self
                .tracks
                .iter()
                .map(|track| RoutingPointTrack {
                    edge: track.edge.clone(),
                    point_index: track.point_index,
                    from: track.to,
                    to: track.from,
                })
                .collect();
            return Ok(CommandOutcome::Animate(Animation::MoveRoutingPoints {
                tracks,
                restore: Some(self.original_points.clone()),
            }));
        }
        for (edge, points) in &self.original_points {
            let Some(element) = root.get_mut(edge.as_str()) else {
                continue;
            };
            if !element.is_routable() {
                continue;
            }
            element.routing_points = Some(points.clone());
            reset_routing_handles(root, edge.as_str())?;
        }
        Ok(CommandOutcome::Done)
    }

    fn redo(&mut self, root: &mut ModelRoot) -> CommandResult {
        let moves: Vec<ResolvedMove> = self
            .resolved
            .iter()
            .filter_map(|resolved| {
                let handle = find_handle(
                    root,
                    resolved.edge.as_str(),
                    resolved.kind,
                    resolved.point_index,
                )?;
                Some(ResolvedMove {
                    handle,
                    ..resolved.clone()
                })
            })
            .collect();
        self.forward(root, &moves)
    }
}

/// Routing points of every touched edge, in first-touch order.
fn snapshot(root: &ModelRoot, moves: &[ResolvedMove]) -> Vec<(ElementId, Vec<Point>)> {
    let mut original: Vec<(ElementId, Vec<Point>)> = Vec::new();
    for resolved in moves {
        if original.iter().any(|(edge, _)| *edge == resolved.edge) {
            continue;
        }
        if let Some(points) = root
            .get(resolved.edge.as_str())
            .and_then(|edge| edge.routing_points.clone())
        {
            original.push((resolved.edge.clone(), points));
        }
    }
    original
}

/// Applies one move. With `write` unset the structure changes but the
/// moved point keeps its pre-move position for the animation to drive.
fn apply(
    root: &mut ModelRoot,
    resolved: &ResolvedMove,
    write: bool,
) -> Result<Option<MovedPoint>, ModelError> {
    let Some(handle) = root
        .get(resolved.handle.as_str())
        .and_then(|element| element.handle)
    else {
        return Ok(None);
    };
    let Some(points) = root
        .get(resolved.edge.as_str())
        .and_then(|edge| edge.routing_points.as_ref())
    else {
        return Ok(None);
    };
    let len = points.len();
    let mut index = handle.point_index;
    let from;

    if handle.kind == HandleKind::Line {
        let insert_at = index + 1;
        if insert_at < 0 || insert_at as usize > len {
            log::debug!(
                "Skipping line handle {} with stale index {index}",
                resolved.handle
            );
            return Ok(None);
        }
        let seed = resolved
            .from_position
            .or_else(|| points.get(index.max(0) as usize).copied())
            .unwrap_or(resolved.to_position);
        upgrade(root, resolved, index, seed)?;
        index = insert_at;
        from = seed;
    } else {
        let Some(current) = usize::try_from(index).ok().and_then(|i| points.get(i)) else {
            log::debug!(
                "Skipping junction handle {} with stale index {index}",
                resolved.handle
            );
            return Ok(None);
        };
        from = *current;
    }

    if write
        && let Some(point) = root
            .get_mut(resolved.edge.as_str())
            .and_then(|edge| edge.routing_points.as_mut())
            .and_then(|points| points.get_mut(index as usize))
    {
        *point = resolved.to_position;
    }
    Ok(Some(MovedPoint {
        handle: resolved.handle.clone(),
        edge: resolved.edge.clone(),
        from,
        to: resolved.to_position,
    }))
}

/// Turns the line handle at `index` into the junction of a new point
/// inserted at `index + 1`.
fn upgrade(
    root: &mut ModelRoot,
    resolved: &ResolvedMove,
    index: i32,
    seed: Point,
) -> Result<(), ModelError> {
    let edge = resolved.edge.as_str();
    if let Some(points) = root.get_mut(edge).and_then(|e| e.routing_points.as_mut()) {
        points.insert((index + 1) as usize, seed);
    }

    let renumbered: Vec<ElementId> = root
        .children_of(edge)
        .filter(|child| {
            child.id == resolved.handle
                || child.handle.is_some_and(|h| h.point_index > index)
        })
        .map(|child| child.id.clone())
        .collect();
    for id in renumbered {
        if let Some(handle) = root.get_mut(id.as_str()).and_then(|e| e.handle.as_mut()) {
            handle.point_index += 1;
        }
    }
    if let Some(upgraded) = root.get_mut(resolved.handle.as_str()) {
        upgraded.type_tag = HandleKind::Junction.type_tag().to_owned();
        if let Some(handle) = upgraded.handle.as_mut() {
            handle.kind = HandleKind::Junction;
        }
    }

    let prefix = allocated_handle_prefix(edge);
    for line_index in [index, index + 1] {
        let id = root.allocate_id(&prefix);
        root.add(edge, Element::routing_handle(id, HandleKind::Line, line_index))?;
    }
    Ok(())
}

fn track_for(root: &ModelRoot, point: MovedPoint) -> Option<RoutingPointTrack> {
    let index = root.get(point.handle.as_str())?.handle?.point_index;
    Some(RoutingPointTrack {
        edge: point.edge,
        point_index: usize::try_from(index).ok()?,
        from: point.from,
        to: point.to,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::routing::create_routing_handles;
    use crate::math::point;
    use crate::model::GraphBuilder;

    fn model(points: Vec<Point>) -> ModelRoot {
        let mut root = GraphBuilder::new("graph", "graph")
            .node("a", "node", point(0.0, 0.0))
            .node("b", "node", point(100.0, 0.0))
            .routed_edge("e0", "edge", "a", "b", points)
            .build()
            .unwrap();
        create_routing_handles(&mut root, "e0").unwrap();
        root
    }

    fn points(root: &ModelRoot) -> Vec<Point> {
        root.get("e0").unwrap().routing_points.clone().unwrap()
    }

    fn handles(root: &ModelRoot) -> Vec<(HandleKind, i32)> {
        let mut handles: Vec<(HandleKind, i32)> = root
            .children_of("e0")
            .filter_map(|e| e.handle.map(|h| (h.kind, h.point_index)))
            .collect();
        handles.sort_by_key(|(kind, index)| (*index, *kind == HandleKind::Line));
        handles
    }

    fn run(root: &mut ModelRoot, action: MoveRoutingHandleAction) -> MoveRoutingHandleCommand {
        let mut command = MoveRoutingHandleCommand::new(&action);
        let outcome = command.execute(root).unwrap();
        if let CommandOutcome::Animate(animation) = outcome {
            animation.tween(1.0, root);
        }
        command
    }

    #[test]
    fn junction_move_overwrites_point() {
        let mut root = model(vec![point(0.0, 0.0), point(10.0, 0.0)]);
        let junction = find_handle(&root, "e0", HandleKind::Junction, 1).unwrap();
        run(
            &mut root,
            MoveRoutingHandleAction::new(vec![HandleMove::new(junction, point(10.0, 7.0))])
                .without_animation(),
        );
        assert_eq!(points(&root), vec![point(0.0, 0.0), point(10.0, 7.0)]);
        assert_eq!(handles(&root).len(), 5);
    }

    #[test]
    fn line_move_upgrades_handle() {
        let mut root = model(vec![point(0.0, 0.0), point(10.0, 0.0)]);
        let line = find_handle(&root, "e0", HandleKind::Line, 0).unwrap();
        let later_junction = find_handle(&root, "e0", HandleKind::Junction, 1).unwrap();
        run(
            &mut root,
            MoveRoutingHandleAction::new(vec![HandleMove::new(line.clone(), point(5.0, 5.0))])
                .without_animation(),
        );

        assert_eq!(
            points(&root),
            vec![point(0.0, 0.0), point(5.0, 5.0), point(10.0, 0.0)]
        );
        let upgraded = root.get(line.as_str()).unwrap();
        assert_eq!(upgraded.type_tag, "routing-point");
        assert_eq!(
            upgraded.handle.map(|h| (h.kind, h.point_index)),
            Some((HandleKind::Junction, 1))
        );
        assert_eq!(
            root.get(later_junction.as_str()).unwrap().handle.map(|h| h.point_index),
            Some(2)
        );
        assert_eq!(
            handles(&root),
            vec![
                (HandleKind::Line, -1),
                (HandleKind::Junction, 0),
                (HandleKind::Line, 0),
                (HandleKind::Junction, 1),
                (HandleKind::Line, 1),
                (HandleKind::Junction, 2),
                (HandleKind::Line, 2),
            ]
        );
    }

    #[test]
    fn upgrade_seeds_with_from_position() {
        let mut root = model(vec![point(0.0, 0.0), point(10.0, 0.0)]);
        let line = find_handle(&root, "e0", HandleKind::Line, -1).unwrap();
        let mut command = MoveRoutingHandleCommand::new(&MoveRoutingHandleAction::new(vec![
            HandleMove::new(line, point(-5.0, 0.0)).starting_at(point(-1.0, 0.0)),
        ]));
        let CommandOutcome::Animate(animation) = command.execute(&mut root).unwrap() else {
            panic!("expected an animation");
        };
        assert_eq!(points(&root)[0], point(-1.0, 0.0));
        animation.tween(0.5, &mut root);
        assert_eq!(points(&root)[0], point(-3.0, 0.0));
        animation.tween(1.0, &mut root);
        assert_eq!(
            points(&root),
            vec![point(-5.0, 0.0), point(0.0, 0.0), point(10.0, 0.0)]
        );
    }

    #[test]
    fn unresolvable_moves_are_skipped() {
        let mut root = model(vec![point(0.0, 0.0)]);
        let junction = find_handle(&root, "e0", HandleKind::Junction, 0).unwrap();
        run(
            &mut root,
            MoveRoutingHandleAction::new(vec![
                HandleMove::new("gone", point(1.0, 1.0)),
                HandleMove::new("a", point(1.0, 1.0)),
                HandleMove::new(junction, point(2.0, 2.0)),
            ])
            .without_animation(),
        );
        assert_eq!(points(&root), vec![point(2.0, 2.0)]);
        assert_eq!(root.get("a").unwrap().position, Some(point(0.0, 0.0)));
    }

    #[test]
    fn stale_index_is_skipped() {
        let mut root = model(vec![point(0.0, 0.0)]);
        let junction = find_handle(&root, "e0", HandleKind::Junction, 0).unwrap();
        root.get_mut(junction.as_str())
            .unwrap()
            .handle
            .as_mut()
            .unwrap()
            .point_index = 4;
        run(
            &mut root,
            MoveRoutingHandleAction::new(vec![HandleMove::new(junction, point(9.0, 9.0))])
                .without_animation(),
        );
        assert_eq!(points(&root), vec![point(0.0, 0.0)]);
    }

    #[test]
    fn undo_restores_points_and_handles() {
        for animate in [false, true] {
            let mut root = model(vec![point(0.0, 0.0), point(10.0, 0.0)]);
            let before = root.clone();
            let line = find_handle(&root, "e0", HandleKind::Line, 0).unwrap();
            let junction = find_handle(&root, "e0", HandleKind::Junction, 0).unwrap();
            let mut action = MoveRoutingHandleAction::new(vec![
                HandleMove::new(line, point(5.0, 5.0)),
                HandleMove::new(junction, point(0.0, 3.0)),
            ]);
            action.animate = animate;
            let mut command = run(&mut root, action);
            assert_eq!(
                points(&root),
                vec![point(0.0, 3.0), point(5.0, 5.0), point(10.0, 0.0)]
            );

            if let CommandOutcome::Animate(animation) = command.undo(&mut root).unwrap() {
                animation.tween(0.5, &mut root);
                assert_eq!(points(&root)[1], point(2.5, 2.5));
                animation.tween(1.0, &mut root);
            }
            assert_eq!(root, before);
        }
    }

    #[test]
    fn redo_finds_handles_again() {
        let mut root = model(vec![point(0.0, 0.0), point(10.0, 0.0)]);
        let line = find_handle(&root, "e0", HandleKind::Line, 0).unwrap();
        let mut command = run(
            &mut root,
            MoveRoutingHandleAction::new(vec![HandleMove::new(line, point(5.0, 5.0))])
                .without_animation(),
        );
        let moved = root.clone();
        command.undo(&mut root).unwrap();
        command.redo(&mut root).unwrap();
        assert_eq!(points(&root), points(&moved));
        assert_eq!(handles(&root), handles(&moved));
    }

    #[test]
    fn edge_without_points_upgrades_at_target() {
        let mut root = model(Vec::new());
        let line = find_handle(&root, "e0", HandleKind::Line, -1).unwrap();
        run(
            &mut root,
            MoveRoutingHandleAction::new(vec![HandleMove::new(line, point(3.0, 4.0))])
                .without_animation(),
        );
        assert_eq!(points(&root), vec![point(3.0, 4.0)]);
        assert_eq!(handles(&root).len(), 3);
    }
}
