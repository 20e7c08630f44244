//! Visual state, the last-applied snapshot, and cache-diffed redraw.
//!
//! Redraw runs after every mutation, so it must not re-issue backend calls
//! for properties that did not change. `AppliedVisual` remembers the last
//! value pushed to the backend per property (`None` = never applied) and
//! `sync` applies only the differences.

use glam::Vec2;

use crate::api::types::Direction;
use crate::backend::traits::{RenderBackend, SpriteHandle};

/// Absolute value or relative delta for one coordinate, decided at the call
/// site instead of parsed from strings in the hot path.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Coord {
    Abs(f32),
    Delta(f32),
}

impl Coord {
    /// Resolve against the current value.
    pub fn resolve(self, current: f32) -> f32 {
        match self {
            Coord::Abs(v) => v,
            Coord::Delta(d) => current + d,
        }
    }

    /// Keep the current value.
    pub fn keep() -> Self {
        Coord::Delta(0.0)
    }
}

/// Desired visual state of an entity.
///
/// `z` on the position is a layering offset added to `depth`, not a third
/// spatial axis.
#[derive(Debug, Clone, PartialEq)]
pub struct VisualState {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub direction: Direction,
    pub variant: String,
    pub frame: u32,
    pub texture: String,
    pub origin: Vec2,
    pub alpha: f32,
    pub tint: Option<u32>,
    pub scale: f32,
    pub depth: f32,
    pub visible: bool,
}

impl Default for VisualState {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            z: 0.0,
            direction: Direction::Right,
            variant: "base".to_string(),
            frame: 0,
            texture: String::new(),
            origin: Vec2::ZERO,
            alpha: 1.0,
            tint: None,
            scale: 1.0,
            depth: 1.0,
            visible: true,
        }
    }
}

/// One flattened frame of visual properties as the backend sees them.
/// Entities and composite layers both produce these for `sync`.
#[derive(Debug, Clone, Copy)]
pub struct VisualFrame<'a> {
    pub x: f32,
    pub y: f32,
    pub depth: f32,
    pub frame: u32,
    pub texture: &'a str,
    pub origin: Vec2,
    pub alpha: f32,
    pub tint: Option<u32>,
    pub scale: f32,
    pub visible: bool,
}

/// Last-applied snapshot, one `Option` per property. Strict equality per
/// field decides whether a backend call is issued.
#[derive(Debug, Clone, Default)]
pub struct AppliedVisual {
    position: Option<(f32, f32)>,
    depth: Option<f32>,
    frame: Option<u32>,
    texture: Option<String>,
    origin: Option<Vec2>,
    alpha: Option<f32>,
    tint: Option<Option<u32>>,
    scale: Option<f32>,
    visible: Option<bool>,
}

impl AppliedVisual {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget everything; the next sync reapplies every property.
    pub fn invalidate(&mut self) {
        *self = Self::default();
    }

    /// Seed the snapshot with what sprite creation already established, so
    /// the first sync does not re-issue texture and position calls.
    pub fn prime(&mut self, texture: &str, x: f32, y: f32) {
        self.texture = Some(texture.to_string());
        self.frame = Some(0);
        self.position = Some((x, y));
    }

    /// Push the differences between this snapshot and `target` to the
    /// backend, then remember `target`. Returns the number of backend calls
    /// issued; zero when nothing changed.
    pub fn sync(
        &mut self,
        sprite: SpriteHandle,
        target: &VisualFrame<'_>,
        backend: &mut dyn RenderBackend,
    ) -> usize {
        let mut issued = 0;

        if self.visible != Some(target.visible) {
            backend.set_visible(sprite, target.visible);
            self.visible = Some(target.visible);
            issued += 1;
        }
        let texture_changed = self.texture.as_deref() != Some(target.texture);
        if texture_changed {
            backend.set_texture(sprite, target.texture, target.frame);
            self.texture = Some(target.texture.to_string());
            self.frame = Some(target.frame);
            issued += 1;
        }
        if self.position != Some((target.x, target.y)) {
            backend.set_position(sprite, target.x, target.y);
            self.position = Some((target.x, target.y));
            issued += 1;
        }
        if self.depth != Some(target.depth) {
            backend.set_depth(sprite, target.depth);
            self.depth = Some(target.depth);
            issued += 1;
        }
        if !texture_changed && self.frame != Some(target.frame) {
            backend.set_frame(sprite, target.frame);
            self.frame = Some(target.frame);
            issued += 1;
        }
        if self.origin != Some(target.origin) {
            backend.set_origin(sprite, target.origin);
            self.origin = Some(target.origin);
            issued += 1;
        }
        if self.alpha != Some(target.alpha) {
            backend.set_alpha(sprite, target.alpha);
            self.alpha = Some(target.alpha);
            issued += 1;
        }
        if self.tint != Some(target.tint) {
            backend.set_tint(sprite, target.tint);
            self.tint = Some(target.tint);
            issued += 1;
        }
        if self.scale != Some(target.scale) {
            backend.set_scale(sprite, target.scale);
            self.scale = Some(target.scale);
            issued += 1;
        }

        issued
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::headless::HeadlessBackend;

    fn frame(texture: &str) -> VisualFrame<'_> {
        VisualFrame {
            x: 10.0,
            y: 20.0,
            depth: 1.0,
            frame: 0,
            texture,
            origin: Vec2::ZERO,
            alpha: 1.0,
            tint: None,
            scale: 1.0,
            visible: true,
        }
    }

    #[test]
    fn second_sync_is_free() {
        let mut backend = HeadlessBackend::new();
        let sprite = backend.create_sprite("tex", 0.0, 0.0);
        let mut applied = AppliedVisual::new();

        let first = applied.sync(sprite, &frame("tex"), &mut backend);
        assert!(first > 0);

        let before = backend.call_count();
        let second = applied.sync(sprite, &frame("tex"), &mut backend);
        assert_eq!(second, 0);
        assert_eq!(backend.call_count(), before);
    }

    #[test]
    fn only_changed_property_is_reapplied() {
        let mut backend = HeadlessBackend::new();
        let sprite = backend.create_sprite("tex", 0.0, 0.0);
        let mut applied = AppliedVisual::new();
        applied.sync(sprite, &frame("tex"), &mut backend);

        let mut next = frame("tex");
        next.alpha = 0.5;
        let before = backend.call_count();
        let issued = applied.sync(sprite, &next, &mut backend);
        assert_eq!(issued, 1);
        assert_eq!(backend.call_count(), before + 1);
    }

    #[test]
    fn texture_change_carries_frame() {
        let mut backend = HeadlessBackend::new();
        let sprite = backend.create_sprite("a", 0.0, 0.0);
        let mut applied = AppliedVisual::new();
        applied.sync(sprite, &frame("a"), &mut backend);

        let mut next = frame("b");
        next.frame = 3;
        applied.sync(sprite, &next, &mut backend);
        // set_texture carried the frame; no separate set_frame call.
        use crate::backend::headless::BackendCall;
        assert!(backend
            .calls()
            .iter()
            .any(|c| matches!(c, BackendCall::SetTexture { frame: 3, .. })));
        assert!(!backend
            .calls()
            .iter()
            .any(|c| matches!(c, BackendCall::SetFrame { frame: 3, .. })));
    }

    #[test]
    fn tint_none_vs_unset_are_distinct() {
        let mut backend = HeadlessBackend::new();
        let sprite = backend.create_sprite("tex", 0.0, 0.0);
        let mut applied = AppliedVisual::new();

        // First sync applies tint=None (never applied before).
        let mut target = frame("tex");
        target.tint = None;
        applied.sync(sprite, &target, &mut backend);

        // Changing to a real tint and back each issue one call.
        target.tint = Some(0xff0000);
        assert_eq!(applied.sync(sprite, &target, &mut backend), 1);
        target.tint = None;
        assert_eq!(applied.sync(sprite, &target, &mut backend), 1);
    }

    #[test]
    fn coord_resolution() {
        assert_eq!(Coord::Abs(5.0).resolve(100.0), 5.0);
        assert_eq!(Coord::Delta(5.0).resolve(100.0), 105.0);
        assert_eq!(Coord::Delta(-5.0).resolve(100.0), 95.0);
        assert_eq!(Coord::keep().resolve(42.0), 42.0);
    }
}
