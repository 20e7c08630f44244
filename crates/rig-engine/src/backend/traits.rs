//! Rendering backend contract.
//!
//! The core treats the renderer as an opaque capability set: any backend
//! that can create sprites, mutate their visual properties, load sheets
//! asynchronously and play named frame animations is substitutable. The
//! in-crate [`HeadlessBackend`](crate::backend::headless::HeadlessBackend)
//! implements it for hosts without a GPU surface and for tests.

use glam::Vec2;

/// Opaque handle to a backend-owned sprite or rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SpriteHandle(pub u32);

/// Playback rate for a frame animation: either frames-per-second or a
/// total duration spread evenly across the sequence.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlaybackRate {
    Fps(f32),
    DurationMs(u32),
}

/// Repeat behavior for a frame animation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Repeat {
    Once,
    Loop,
    Times(u32),
}

/// Request to realize a named animation against a loaded sheet.
///
/// Queued in the asset registry until the sheet it references has finished
/// loading, then handed to the backend.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationRequest {
    pub key: String,
    pub sheet_key: String,
    pub frames: Vec<u32>,
    pub rate: PlaybackRate,
    pub repeat: Repeat,
}

/// Primitive operations the core issues against the renderer.
///
/// Loads are asynchronous: `load_sheet` starts a load, and completed keys
/// are reported through `poll_loaded` on a later tick. Everything else is
/// immediate. Implementations must tolerate redundant `set_*` calls, but the
/// core diffs against a last-applied cache so it never issues them.
pub trait RenderBackend {
    /// Create a sprite showing `texture` at the given position.
    fn create_sprite(&mut self, texture: &str, x: f32, y: f32) -> SpriteHandle;

    /// Create a solid rectangle (hitboxes, placeholders without art).
    fn create_rect(&mut self, width: f32, height: f32, color: u32, x: f32, y: f32) -> SpriteHandle;

    /// Destroy a sprite. The handle is invalid afterwards.
    fn destroy(&mut self, sprite: SpriteHandle);

    fn set_position(&mut self, sprite: SpriteHandle, x: f32, y: f32);
    fn set_depth(&mut self, sprite: SpriteHandle, depth: f32);
    fn set_frame(&mut self, sprite: SpriteHandle, frame: u32);
    fn set_texture(&mut self, sprite: SpriteHandle, texture: &str, frame: u32);
    fn set_origin(&mut self, sprite: SpriteHandle, origin: Vec2);
    fn set_alpha(&mut self, sprite: SpriteHandle, alpha: f32);
    fn set_tint(&mut self, sprite: SpriteHandle, tint: Option<u32>);
    fn set_scale(&mut self, sprite: SpriteHandle, scale: f32);
    fn set_visible(&mut self, sprite: SpriteHandle, visible: bool);
    fn set_interactive(&mut self, sprite: SpriteHandle, enabled: bool);

    /// Whether a texture key has been realized (loaded) in the backend.
    fn texture_exists(&self, key: &str) -> bool;

    /// Whether a named animation has been created in the backend.
    fn animation_exists(&self, key: &str) -> bool;

    /// Begin loading a sprite sheet. Completion is reported via `poll_loaded`.
    fn load_sheet(&mut self, key: &str, path: &str, frame_size: (u32, u32));

    /// Drain the keys whose loads completed since the last poll.
    fn poll_loaded(&mut self) -> Vec<String>;

    /// Create a named animation against an already-loaded sheet.
    fn create_animation(&mut self, request: &AnimationRequest);

    /// Play a named animation on a sprite.
    fn play_animation(&mut self, sprite: SpriteHandle, key: &str);

    /// Stop whatever animation a sprite is playing.
    fn stop_animation(&mut self, sprite: SpriteHandle);
}
