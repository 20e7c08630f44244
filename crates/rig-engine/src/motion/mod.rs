pub mod easing;
pub mod tween;
