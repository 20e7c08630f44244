//! Headless backend: a complete in-process renderer stand-in.
//!
//! Records every call it receives and simulates deferred sheet loading —
//! `load_sheet` leaves a key in flight until the host calls
//! [`HeadlessBackend::complete_loads`] (or `complete_load` for one key).
//! Used by hosts running without a GPU surface and by every
//! backend-observing test in this crate.

use std::collections::HashSet;

use glam::Vec2;

use super::traits::{AnimationRequest, RenderBackend, SpriteHandle};

/// One recorded backend call. Payloads carry enough to assert on ordering
/// and values in tests.
#[derive(Debug, Clone, PartialEq)]
pub enum BackendCall {
    CreateSprite { sprite: SpriteHandle, texture: String, x: f32, y: f32 },
    CreateRect { sprite: SpriteHandle, width: f32, height: f32 },
    Destroy(SpriteHandle),
    SetPosition { sprite: SpriteHandle, x: f32, y: f32 },
    SetDepth { sprite: SpriteHandle, depth: f32 },
    SetFrame { sprite: SpriteHandle, frame: u32 },
    SetTexture { sprite: SpriteHandle, texture: String, frame: u32 },
    SetOrigin { sprite: SpriteHandle, origin: Vec2 },
    SetAlpha { sprite: SpriteHandle, alpha: f32 },
    SetTint { sprite: SpriteHandle, tint: Option<u32> },
    SetScale { sprite: SpriteHandle, scale: f32 },
    SetVisible { sprite: SpriteHandle, visible: bool },
    SetInteractive { sprite: SpriteHandle, enabled: bool },
    LoadSheet { key: String, path: String, frame_size: (u32, u32) },
    CreateAnimation { key: String, sheet_key: String },
    PlayAnimation { sprite: SpriteHandle, key: String },
    StopAnimation(SpriteHandle),
}

#[derive(Debug, Default)]
pub struct HeadlessBackend {
    calls: Vec<BackendCall>,
    next_handle: u32,
    alive: HashSet<SpriteHandle>,
    textures: HashSet<String>,
    animations: HashSet<String>,
    loading: Vec<String>,
    ready: Vec<String>,
}

impl HeadlessBackend {
    pub fn new() -> Self {
        Self {
            next_handle: 1,
            ..Self::default()
        }
    }

    /// Backend with a set of textures already realized, as if preloaded.
    pub fn with_textures<I, S>(textures: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut backend = Self::new();
        for key in textures {
            backend.textures.insert(key.into());
        }
        backend
    }

    /// Mark a texture as realized without going through a load.
    pub fn add_texture(&mut self, key: impl Into<String>) {
        self.textures.insert(key.into());
    }

    /// Finish every in-flight load. Keys become realized textures and are
    /// reported by the next `poll_loaded`.
    pub fn complete_loads(&mut self) {
        for key in self.loading.drain(..) {
            self.textures.insert(key.clone());
            self.ready.push(key);
        }
    }

    /// Finish one in-flight load by key. Returns false if it was not loading.
    pub fn complete_load(&mut self, key: &str) -> bool {
        if let Some(idx) = self.loading.iter().position(|k| k == key) {
            let key = self.loading.remove(idx);
            self.textures.insert(key.clone());
            self.ready.push(key);
            true
        } else {
            false
        }
    }

    /// Every call recorded so far, in issue order.
    pub fn calls(&self) -> &[BackendCall] {
        &self.calls
    }

    /// Number of recorded calls. Tests snapshot this to count calls between
    /// two points.
    pub fn call_count(&self) -> usize {
        self.calls.len()
    }

    /// Forget the recorded history (alive sprites and textures persist).
    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }

    /// Whether a handle refers to a live (not destroyed) sprite.
    pub fn is_alive(&self, sprite: SpriteHandle) -> bool {
        self.alive.contains(&sprite)
    }

    /// Keys currently loading.
    pub fn loading_keys(&self) -> &[String] {
        &self.loading
    }

    fn alloc(&mut self) -> SpriteHandle {
        let handle = SpriteHandle(self.next_handle);
        self.next_handle += 1;
        self.alive.insert(handle);
        handle
    }
}

impl RenderBackend for HeadlessBackend {
    fn create_sprite(&mut self, texture: &str, x: f32, y: f32) -> SpriteHandle {
        let sprite = self.alloc();
        self.calls.push(BackendCall::CreateSprite {
            sprite,
            texture: texture.to_string(),
            x,
            y,
        });
        sprite
    }

    fn create_rect(&mut self, width: f32, height: f32, _color: u32, _x: f32, _y: f32) -> SpriteHandle {
        let sprite = self.alloc();
        self.calls.push(BackendCall::CreateRect { sprite, width, height });
        sprite
    }

    fn destroy(&mut self, sprite: SpriteHandle) {
        self.alive.remove(&sprite);
        self.calls.push(BackendCall::Destroy(sprite));
    }

    fn set_position(&mut self, sprite: SpriteHandle, x: f32, y: f32) {
        self.calls.push(BackendCall::SetPosition { sprite, x, y });
    }

    fn set_depth(&mut self, sprite: SpriteHandle, depth: f32) {
        self.calls.push(BackendCall::SetDepth { sprite, depth });
    }

    fn set_frame(&mut self, sprite: SpriteHandle, frame: u32) {
        self.calls.push(BackendCall::SetFrame { sprite, frame });
    }

    fn set_texture(&mut self, sprite: SpriteHandle, texture: &str, frame: u32) {
        self.calls.push(BackendCall::SetTexture {
            sprite,
            texture: texture.to_string(),
            frame,
        });
    }

    fn set_origin(&mut self, sprite: SpriteHandle, origin: Vec2) {
        self.calls.push(BackendCall::SetOrigin { sprite, origin });
    }

    fn set_alpha(&mut self, sprite: SpriteHandle, alpha: f32) {
        self.calls.push(BackendCall::SetAlpha { sprite, alpha });
    }

    fn set_tint(&mut self, sprite: SpriteHandle, tint: Option<u32>) {
        self.calls.push(BackendCall::SetTint { sprite, tint });
    }

    fn set_scale(&mut self, sprite: SpriteHandle, scale: f32) {
        self.calls.push(BackendCall::SetScale { sprite, scale });
    }

    fn set_visible(&mut self, sprite: SpriteHandle, visible: bool) {
        self.calls.push(BackendCall::SetVisible { sprite, visible });
    }

    fn set_interactive(&mut self, sprite: SpriteHandle, enabled: bool) {
        self.calls.push(BackendCall::SetInteractive { sprite, enabled });
    }

    fn texture_exists(&self, key: &str) -> bool {
        self.textures.contains(key)
    }

    fn animation_exists(&self, key: &str) -> bool {
        self.animations.contains(key)
    }

    fn load_sheet(&mut self, key: &str, path: &str, frame_size: (u32, u32)) {
        self.calls.push(BackendCall::LoadSheet {
            key: key.to_string(),
            path: path.to_string(),
            frame_size,
        });
        if !self.textures.contains(key) && !self.loading.iter().any(|k| k == key) {
            self.loading.push(key.to_string());
        }
    }

    fn poll_loaded(&mut self) -> Vec<String> {
        std::mem::take(&mut self.ready)
    }

    fn create_animation(&mut self, request: &AnimationRequest) {
        self.animations.insert(request.key.clone());
        self.calls.push(BackendCall::CreateAnimation {
            key: request.key.clone(),
            sheet_key: request.sheet_key.clone(),
        });
    }

    fn play_animation(&mut self, sprite: SpriteHandle, key: &str) {
        self.calls.push(BackendCall::PlayAnimation {
            sprite,
            key: key.to_string(),
        });
    }

    fn stop_animation(&mut self, sprite: SpriteHandle) {
        self.calls.push(BackendCall::StopAnimation(sprite));
    }
}
