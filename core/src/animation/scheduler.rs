//! Frame-driven animation scheduler.

use std::time::{Duration, Instant};

use crate::command::{Settlement, Settler, pending};
use crate::config::AnimationConfig;
use crate::model::ModelRoot;

use super::{Animation, Easing};

/// Result of one [`AnimationScheduler::tick`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Tick {
    /// No animation is running.
    Idle,
    /// The animation advanced to this linear progress, still below 1.
    Running(f64),
    /// The animation reached `t = 1` on this tick and its settlement resolved.
    Finished,
}

struct Active {
    animation: Animation,
    started: Option<Instant>,
    settler: Option<Settler>,
}

/// Drives at most one [`Animation`] from `t = 0` to `t = 1`.
///
/// The scheduler owns no thread and no timer. The host calls
/// [`tick`](Self::tick) once per frame with the frame timestamp; the first
/// tick after [`start`](Self::start) stamps the start time. There is no
/// mid-flight cancellation: an animation always runs to completion or is
/// jumped there by [`finish`](Self::finish).
pub struct AnimationScheduler {
    duration: Duration,
    easing: Easing,
    active: Option<Active>,
}

impl AnimationScheduler {
    pub fn new(duration: Duration, easing: Easing) -> Self {
        Self {
            duration,
            easing,
            active: None,
        }
    }

    /// A scheduler whose animations complete on the first tick.
    pub fn instant() -> Self {
        Self::new(Duration::ZERO, Easing::Linear)
    }

    pub fn from_config(config: &AnimationConfig) -> Self {
        Self::new(config.duration(), config.easing)
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn easing(&self) -> Easing {
        self.easing
    }

    /// Returns `true` if animations complete without spanning frames.
    pub fn is_instant(&self) -> bool {
        self.duration.is_zero()
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// Begins driving `animation`.
    ///
    /// The returned settlement resolves to the model as it stands on the
    /// frame where `t` reaches 1. Starting while another animation runs
    /// drops the previous one unfinished; its settlement resolves to `None`.
    pub fn start(&mut self, animation: Animation) -> Settlement {
        let (settler, settlement) = pending();
        self.begin(animation, Some(settler));
        settlement
    }

    /// Begins driving `animation` for an owner that tracks completion
    /// through [`tick`](Self::tick) and [`finish`](Self::finish) alone.
    pub(crate) fn drive(&mut self, animation: Animation) {
        self.begin(animation, None);
    }

    fn begin(&mut self, animation: Animation, settler: Option<Settler>) {
        if self.active.is_some() {
            log::warn!("Animation started while another was running; dropping the previous one");
        }
        log::trace!(
            "Starting animation over {} element(s), {:?}",
            animation.affected().len(),
            self.duration
        );
        self.active = Some(Active {
            animation,
            started: None,
            settler,
        });
    }

    /// Advances the running animation to frame time `now`.
    pub fn tick(&mut self, now: Instant, root: &mut ModelRoot) -> Tick {
        let Some(active) = self.active.as_mut() else {
            return Tick::Idle;
        };
        let started = *active.started.get_or_insert(now);
        let progress = if self.duration.is_zero() {
            1.0
        } else {
            let elapsed = now.saturating_duration_since(started);
            (elapsed.as_secs_f64() / self.duration.as_secs_f64()).min(1.0)
        };
        if progress < 1.0 {
            active.animation.tween(self.easing.apply(progress), root);
            return Tick::Running(progress);
        }
        self.complete(root);
        Tick::Finished
    }

    /// Jumps the running animation to `t = 1`. Returns `false` if idle.
    pub fn finish(&mut self, root: &mut ModelRoot) -> bool {
        if self.active.is_none() {
            return false;
        }
        self.complete(root);
        true
    }

    fn complete(&mut self, root: &mut ModelRoot) {
        if let Some(active) = self.active.take() {
            active.animation.tween(1.0, root);
            if let Some(settler) = active.settler {
                settler.settle(root.clone());
            }
        }
    }
}

impl Default for AnimationScheduler {
    fn default() -> Self {
        Self::from_config(&AnimationConfig::default())
    }
}

impl std::fmt::Debug for AnimationScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnimationScheduler")
            .field("duration", &self.duration)
            .field("easing", &self.easing)
            .field("active", &self.active.as_ref().map(|a| &a.animation))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::PositionTrack;
    use crate::math::point;
    use crate::model::Element;

    fn setup() -> (ModelRoot, Animation) {
        let mut root = ModelRoot::new("graph", "graph");
        root.add("graph", Element::node("n0", "node", point(0.0, 0.0)))
            .unwrap();
        let animation = Animation::MoveElements {
            tracks: vec![PositionTrack {
                element: "n0".into(),
                from: point(0.0, 0.0),
                to: point(10.0, 10.0),
            }],
        };
        (root, animation)
    }

    fn position(root: &ModelRoot) -> crate::math::Point {
        root.get("n0").unwrap().position.unwrap()
    }

    #[test]
    fn ticks_through_the_duration() {
        let (mut root, animation) = setup();
        let mut scheduler = AnimationScheduler::new(Duration::from_secs(1), Easing::Linear);
        let mut settlement = scheduler.start(animation);
        let t0 = Instant::now();

        assert_eq!(scheduler.tick(t0, &mut root), Tick::Running(0.0));
        assert_eq!(position(&root), point(0.0, 0.0));

        assert_eq!(
            scheduler.tick(t0 + Duration::from_millis(500), &mut root),
            Tick::Running(0.5)
        );
        assert_eq!(position(&root), point(5.0, 5.0));
        assert!(!settlement.is_settled());

        assert_eq!(
            scheduler.tick(t0 + Duration::from_millis(1200), &mut root),
            Tick::Finished
        );
        assert_eq!(position(&root), point(10.0, 10.0));
        assert_eq!(position(settlement.peek().unwrap()), point(10.0, 10.0));
        assert!(!scheduler.is_active());
        assert_eq!(scheduler.tick(t0, &mut root), Tick::Idle);
    }

    #[test]
    fn zero_duration_finishes_on_first_tick() {
        let (mut root, animation) = setup();
        let mut scheduler = AnimationScheduler::instant();
        let mut settlement = scheduler.start(animation);
        assert_eq!(scheduler.tick(Instant::now(), &mut root), Tick::Finished);
        assert!(settlement.is_settled());
    }

    #[test]
    fn finish_jumps_to_the_end() {
        let (mut root, animation) = setup();
        let mut scheduler = AnimationScheduler::new(Duration::from_secs(10), Easing::EaseInOut);
        let mut settlement = scheduler.start(animation);
        assert!(scheduler.finish(&mut root));
        assert_eq!(position(&root), point(10.0, 10.0));
        assert!(settlement.is_settled());
        assert!(!scheduler.finish(&mut root));
    }

    #[test]
    fn driven_animations_run_without_a_settlement() {
        let (mut root, animation) = setup();
        let mut scheduler = AnimationScheduler::new(Duration::from_secs(1), Easing::Linear);
        scheduler.drive(animation);
        assert!(scheduler.is_active());
        assert!(scheduler.active.as_ref().is_some_and(|a| a.settler.is_none()));

        let t0 = Instant::now();
        assert_eq!(scheduler.tick(t0, &mut root), Tick::Running(0.0));
        assert_eq!(
            scheduler.tick(t0 + Duration::from_secs(1), &mut root),
            Tick::Finished
        );
        assert_eq!(position(&root), point(10.0, 10.0));
        assert!(!scheduler.is_active());
    }

    #[test]
    fn restarting_drops_the_previous_animation() {
        let (mut root, animation) = setup();
        let mut scheduler = AnimationScheduler::instant();
        let mut first = scheduler.start(animation.clone());
        let mut second = scheduler.start(animation);
        scheduler.tick(Instant::now(), &mut root);
        assert!(second.is_settled());
        assert!(!first.is_settled());
    }
}
