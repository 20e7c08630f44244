//! Position tween owned by a single entity.
//!
//! Entities never run two of these at once: starting a new move cancels the
//! previous tween first. Completion snaps to the exact target so repeated
//! moves cannot accumulate floating-point drift.

use glam::Vec2;

use super::easing::{ease, Easing};

/// A timed interpolation between two positions.
#[derive(Debug, Clone, PartialEq)]
pub struct MoveTween {
    pub from: Vec2,
    pub to: Vec2,
    /// Duration in seconds. Zero-duration tweens complete on the first tick.
    pub duration: f32,
    pub elapsed: f32,
    pub easing: Easing,
    /// Event id fired when the tween completes.
    pub on_complete: Option<u32>,
}

impl MoveTween {
    pub fn new(from: Vec2, to: Vec2, duration_ms: u32, easing: Easing) -> Self {
        Self {
            from,
            to,
            duration: duration_ms as f32 / 1000.0,
            elapsed: 0.0,
            easing,
            on_complete: None,
        }
    }

    pub fn with_on_complete(mut self, event: u32) -> Self {
        self.on_complete = Some(event);
        self
    }

    /// Normalized progress in [0, 1].
    pub fn progress(&self) -> f32 {
        if self.duration <= 0.0 {
            1.0
        } else {
            (self.elapsed / self.duration).clamp(0.0, 1.0)
        }
    }

    /// Advance by `dt` seconds. Returns the current position and whether
    /// the tween finished this tick. The final position is exactly `to`.
    pub fn tick(&mut self, dt: f32) -> (Vec2, bool) {
        self.elapsed += dt;
        if self.elapsed >= self.duration {
            return (self.to, true);
        }
        let t = self.progress();
        let pos = Vec2::new(
            ease(self.from.x, self.to.x, t, self.easing),
            ease(self.from.y, self.to.y, t, self.easing),
        );
        (pos, false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reaches_exact_target() {
        let mut tween = MoveTween::new(Vec2::ZERO, Vec2::new(100.0, 33.3), 1000, Easing::Linear);
        // Step with an awkward dt that never divides the duration evenly.
        let mut done = false;
        let mut pos = Vec2::ZERO;
        for _ in 0..64 {
            let (p, d) = tween.tick(0.017);
            pos = p;
            if d {
                done = true;
                break;
            }
        }
        assert!(done);
        assert_eq!(pos, Vec2::new(100.0, 33.3));
    }

    #[test]
    fn midpoint_linear() {
        let mut tween = MoveTween::new(Vec2::ZERO, Vec2::new(100.0, 0.0), 1000, Easing::Linear);
        let (pos, done) = tween.tick(0.5);
        assert!(!done);
        assert!((pos.x - 50.0).abs() < 0.01);
    }

    #[test]
    fn zero_duration_completes_immediately() {
        let mut tween = MoveTween::new(Vec2::ZERO, Vec2::new(5.0, 5.0), 0, Easing::QuadOut);
        let (pos, done) = tween.tick(0.0);
        assert!(done);
        assert_eq!(pos, Vec2::new(5.0, 5.0));
    }
}
