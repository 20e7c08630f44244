//! Easing curves for movement interpolation. Pure math, no entity coupling.

use std::f32::consts::PI;

/// Easing curve applied to a normalized time value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Easing {
    /// Constant velocity.
    #[default]
    Linear,
    /// Slow start.
    QuadIn,
    /// Slow end.
    QuadOut,
    /// Slow start and end.
    QuadInOut,
    /// Stronger slow end.
    CubicOut,
    /// Smooth sine start and end.
    SineInOut,
    /// Overshoot the target, then settle.
    BackOut,
    /// Bouncy finish.
    BounceOut,
}

impl Easing {
    /// Apply the curve to `t` in [0, 1]. BackOut may exceed 1 mid-curve.
    #[inline]
    pub fn apply(self, t: f32) -> f32 {
        let t = t.clamp(0.0, 1.0);
        match self {
            Easing::Linear => t,
            Easing::QuadIn => t * t,
            Easing::QuadOut => 1.0 - (1.0 - t) * (1.0 - t),
            Easing::QuadInOut => {
                if t < 0.5 {
                    2.0 * t * t
                } else {
                    1.0 - (-2.0 * t + 2.0).powi(2) / 2.0
                }
            }
            Easing::CubicOut => 1.0 - (1.0 - t).powi(3),
            Easing::SineInOut => -((PI * t).cos() - 1.0) / 2.0,
            Easing::BackOut => {
                const C1: f32 = 1.70158;
                const C3: f32 = C1 + 1.0;
                1.0 + C3 * (t - 1.0).powi(3) + C1 * (t - 1.0).powi(2)
            }
            Easing::BounceOut => {
                const N1: f32 = 7.5625;
                const D1: f32 = 2.75;
                if t < 1.0 / D1 {
                    N1 * t * t
                } else if t < 2.0 / D1 {
                    let t = t - 1.5 / D1;
                    N1 * t * t + 0.75
                } else if t < 2.5 / D1 {
                    let t = t - 2.25 / D1;
                    N1 * t * t + 0.9375
                } else {
                    let t = t - 2.625 / D1;
                    N1 * t * t + 0.984375
                }
            }
        }
    }
}

/// Linear interpolation.
#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

/// Interpolate with easing.
#[inline]
pub fn ease(a: f32, b: f32, t: f32, easing: Easing) -> f32 {
    lerp(a, b, easing.apply(t))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoints_are_exact() {
        for curve in [
            Easing::Linear,
            Easing::QuadIn,
            Easing::QuadOut,
            Easing::QuadInOut,
            Easing::CubicOut,
            Easing::SineInOut,
            Easing::BackOut,
            Easing::BounceOut,
        ] {
            assert!((curve.apply(0.0)).abs() < 1e-5, "{:?} at 0", curve);
            assert!((curve.apply(1.0) - 1.0).abs() < 1e-5, "{:?} at 1", curve);
        }
    }

    #[test]
    fn quad_out_leads_linear() {
        assert!(Easing::QuadOut.apply(0.5) > 0.5);
        assert!(Easing::QuadIn.apply(0.5) < 0.5);
    }

    #[test]
    fn back_out_overshoots() {
        assert!(Easing::BackOut.apply(0.6) > 0.6);
    }

    #[test]
    fn ease_interpolates() {
        let mid = ease(100.0, 200.0, 0.5, Easing::Linear);
        assert!((mid - 150.0).abs() < 1e-4);
    }

    #[test]
    fn input_is_clamped() {
        assert_eq!(Easing::Linear.apply(-1.0), 0.0);
        assert_eq!(Easing::Linear.apply(2.0), 1.0);
    }
}
