//! Animations as data.
//!
//! An [`Animation`] records the start and end state of everything it
//! touches. [`Animation::tween`] is a pure function of `t` that writes the
//! interpolated state into the model, so the [`AnimationScheduler`] only
//! needs to decide *when* to call it.

mod scheduler;

use serde::Deserialize;

use crate::features::routing::reset_routing_handles;
use crate::math::{Point, lerp_point};
use crate::model::{ElementId, ModelRoot};

pub use scheduler::{AnimationScheduler, Tick};

/// Maps linear progress to eased progress. Both ends are fixed points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Easing {
    #[default]
    Linear,
    /// Quadratic ease-in-out.
    EaseInOut,
}

impl Easing {
    pub fn apply(self, t: f64) -> f64 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Self::Linear => t,
            Self::EaseInOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    let u = 1.0 - t;
                    1.0 - 2.0 * u * u
                }
            }
        }
    }
}

/// Interpolates the position of one moveable element.
#[derive(Debug, Clone, PartialEq)]
pub struct PositionTrack {
    pub element: ElementId,
    pub from: Point,
    pub to: Point,
}

/// Interpolates one routing point of an edge.
#[derive(Debug, Clone, PartialEq)]
pub struct RoutingPointTrack {
    pub edge: ElementId,
    pub point_index: usize,
    pub from: Point,
    pub to: Point,
}

/// A transition between two model states.
#[derive(Debug, Clone, PartialEq)]
pub enum Animation {
    /// Moves elements between positions.
    MoveElements { tracks: Vec<PositionTrack> },
    /// Moves routing points between positions.
    ///
    /// When `restore` is set, reaching `t = 1` replaces each listed edge's
    /// routing points with the stored sequence and rebuilds its canonical
    /// handle set, so a reversal lands exactly on the snapshot.
    MoveRoutingPoints {
        tracks: Vec<RoutingPointTrack>,
        restore: Option<Vec<(ElementId, Vec<Point>)>>,
    },
}

impl Animation {
    /// Writes the state at progress `t` into `root`.
    ///
    /// Elements or points that no longer exist are skipped.
    pub fn tween(&self, t: f64, root: &mut ModelRoot) {
        match self {
            Self::MoveElements { tracks } => {
                for track in tracks {
                    if let Some(position) = root
                        .get_mut(track.element.as_str())
                        .and_then(|element| element.position.as_mut())
                    {
                        *position = lerp_point(&track.from, &track.to, t);
                    }
                }
            }
            Self::MoveRoutingPoints { tracks, restore } => {
                for track in tracks {
                    if let Some(point) = root
                        .get_mut(track.edge.as_str())
                        .and_then(|edge| edge.routing_points.as_mut())
                        .and_then(|points| points.get_mut(track.point_index))
                    {
                        *point = lerp_point(&track.from, &track.to, t);
                    }
                }
                if t >= 1.0
                    && let Some(restore) = restore
                {
                    restore_routing(root, restore);
                }
            }
        }
    }

    /// Ids of the elements this animation writes to.
    pub fn affected(&self) -> Vec<ElementId> {
        let mut ids: Vec<ElementId> = match self {
            Self::MoveElements { tracks } => tracks.iter().map(|t| t.element.clone()).collect(),
            Self::MoveRoutingPoints { tracks, restore } => tracks
                .iter()
                .map(|t| t.edge.clone())
                .chain(restore.iter().flatten().map(|(edge, _)| edge.clone()))
                .collect(),
        };
        ids.sort();
        ids.dedup();
        ids
    }

    /// Returns `true` if the animation has nothing to interpolate or restore.
    pub fn is_empty(&self) -> bool {
        match self {
            Self::MoveElements { tracks } => tracks.is_empty(),
            Self::MoveRoutingPoints { tracks, restore } => {
                tracks.is_empty() && restore.as_ref().is_none_or(Vec::is_empty)
            }
        }
    }
}

fn restore_routing(root: &mut ModelRoot, restore: &[(ElementId, Vec<Point>)]) {
    for (edge, points) in restore {
        let Some(element) = root.get_mut(edge.as_str()) else {
            log::debug!("Skipping routing restore of missing edge {edge}");
            continue;
        };
        element.routing_points = Some(points.clone());
        if let Err(err) = reset_routing_handles(root, edge.as_str()) {
            log::warn!("Failed to rebuild routing handles of {edge}: {err}");
        }
    }
}
