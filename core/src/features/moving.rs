//! Moving elements.

use crate::action::Action;
use crate::animation::{Animation, PositionTrack};
use crate::command::{Command, CommandOutcome, CommandResult};
use crate::math::Point;
use crate::model::{ElementId, ModelRoot};

/// One element relocation.
#[derive(Debug, Clone, PartialEq)]
pub struct ElementMove {
    pub element_id: ElementId,
    pub to_position: Point,
}

/// Moves elements to new positions, animated by default.
#[derive(Debug, Clone, PartialEq)]
pub struct MoveAction {
    pub moves: Vec<ElementMove>,
    pub animate: bool,
}

impl MoveAction {
    pub const KIND: &'static str = "move";

    pub fn new(moves: Vec<ElementMove>) -> Self {
        Self {
            moves,
            animate: true,
        }
    }

    pub fn single(element_id: impl Into<ElementId>, to_position: Point) -> Self {
        Self::new(vec![ElementMove {
            element_id: element_id.into(),
            to_position,
        }])
    }

    #[must_use]
    pub fn without_animation(mut self) -> Self {
        self.animate = false;
        self
    }
}

impl Action for MoveAction {
    fn kind(&self) -> &str {
        Self::KIND
    }
}

/// Applies a [`MoveAction`] to moveable elements; anything else is skipped.
///
/// Consecutive non-animated moves of the same elements merge into one
/// history entry, so a drag gesture undoes in a single step.
#[derive(Debug)]
pub struct MoveCommand {
    action: MoveAction,
    tracks: Vec<PositionTrack>,
}

impl MoveCommand {
    pub fn new(action: &MoveAction) -> Self {
        Self {
            action: action.clone(),
            tracks: Vec::new(),
        }
    }

    fn play(&self, root: &mut ModelRoot, reverse: bool) -> CommandResult {
        if self.tracks.is_empty() {
            return Ok(CommandOutcome::Done);
        }
        let tracks: Vec<PositionTrack> = self
            .tracks
            .iter()
            .map(|track| {
                if reverse {
                    PositionTrack {
                        element: track.element.clone(),
                        from: track.to,
                        to: track.from,
                    }
                } else {
                    track.clone()
                }
            })
            .collect();
        let animation = Animation::MoveElements { tracks };
        if self.action.animate {
            return Ok(CommandOutcome::Animate(animation));
        }
        animation.tween(1.0, root);
        Ok(CommandOutcome::Done)
    }

    fn moves_same_elements(&self, other: &MoveCommand) -> bool {
        self.tracks.len() == other.tracks.len()
            && self
                .tracks
                .iter()
                .zip(&other.tracks)
                .all(|(a, b)| a.element == b.element)
    }
}

impl Command for MoveCommand {
    fn description(&self) -> &str {
        "Move"
    }

    fn execute(&mut self, root: &mut ModelRoot) -> CommandResult {
        self.tracks = self
            .action
            .moves
            .iter()
            .filter_map(|element_move| {
                let element = root.get(element_move.element_id.as_str())?;
                if !element.is_moveable() {
                    log::debug!("Not moveable: {}", element_move.element_id);
                    return None;
                }
                Some(PositionTrack {
                    element: element.id.clone(),
                    from: element.position?,
                    to: element_move.to_position,
                })
            })
            .collect();
        self.play(root, false)
    }

    fn undo(&mut self, root: &mut ModelRoot) -> CommandResult {
        self.play(root, true)
    }

    fn redo(&mut self, root: &mut ModelRoot) -> CommandResult {
        self.play(root, false)
    }

    fn merge(&mut self, candidate: Box<dyn Command>) -> Option<Box<dyn Command>> {
        let Some(next) = candidate.as_ref().downcast_ref::<MoveCommand>() else {
            return Some(candidate);
        };
        if self.action.animate || next.action.animate || !self.moves_same_elements(next) {
            return Some(candidate);
        }
        for (track, later) in self.tracks.iter_mut().zip(&next.tracks) {
            track.to = later.to;
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::point;
    use crate::model::GraphBuilder;

    fn model() -> ModelRoot {
        GraphBuilder::new("graph", "graph")
            .node("a", "node", point(0.0, 0.0))
            .node("b", "node", point(10.0, 0.0))
            .edge("e0", "edge", "a", "b")
            .build()
            .unwrap()
    }

    fn position(root: &ModelRoot, id: &str) -> Option<Point> {
        root.get(id).and_then(|e| e.position)
    }

    #[test]
    fn moves_only_moveable_elements() {
        let mut root = model();
        let action = MoveAction::new(vec![
            ElementMove {
                element_id: "a".into(),
                to_position: point(5.0, 5.0),
            },
            ElementMove {
                element_id: "e0".into(),
                to_position: point(5.0, 5.0),
            },
            ElementMove {
                element_id: "gone".into(),
                to_position: point(5.0, 5.0),
            },
        ])
        .without_animation();
        let mut command = MoveCommand::new(&action);
        command.execute(&mut root).unwrap();
        assert_eq!(position(&root, "a"), Some(point(5.0, 5.0)));
        assert_eq!(position(&root, "e0"), None);

        command.undo(&mut root).unwrap();
        assert_eq!(root, model());
    }

    #[test]
    fn animated_move_returns_tracks() {
        let mut root = model();
        let mut command = MoveCommand::new(&MoveAction::single("b", point(20.0, 0.0)));
        let CommandOutcome::Animate(animation) = command.execute(&mut root).unwrap() else {
            panic!("expected an animation");
        };
        assert_eq!(position(&root, "b"), Some(point(10.0, 0.0)));
        animation.tween(0.5, &mut root);
        assert_eq!(position(&root, "b"), Some(point(15.0, 0.0)));
    }

    #[test]
    fn consecutive_drags_merge() {
        let mut root = model();
        let mut first = MoveCommand::new(&MoveAction::single("a", point(1.0, 0.0)).without_animation());
        first.execute(&mut root).unwrap();
        let mut second: Box<dyn Command> =
            Box::new(MoveCommand::new(&MoveAction::single("a", point(2.0, 0.0)).without_animation()));
        second.execute(&mut root).unwrap();

        assert!(first.merge(second).is_none());
        first.undo(&mut root).unwrap();
        assert_eq!(position(&root, "a"), Some(point(0.0, 0.0)));
        first.redo(&mut root).unwrap();
        assert_eq!(position(&root, "a"), Some(point(2.0, 0.0)));
    }

    #[test]
    fn different_elements_do_not_merge() {
        let mut root = model();
        let mut first = MoveCommand::new(&MoveAction::single("a", point(1.0, 0.0)).without_animation());
        first.execute(&mut root).unwrap();
        let mut second: Box<dyn Command> =
            Box::new(MoveCommand::new(&MoveAction::single("b", point(2.0, 0.0)).without_animation()));
        second.execute(&mut root).unwrap();
        assert!(first.merge(second).is_some());
    }
}
