//! Entity base: generic lifecycle for a visual game object.
//!
//! An entity is constructed from the content index plus caller overrides.
//! With visual parameters it creates its sprite in two phases: the real
//! sheet if the backend already has it, otherwise a placeholder plus a
//! queued load — the entity is visually present immediately and never
//! blocks the caller. Mutators that need the real sheet (movement,
//! animation, frame/variant changes) queue as commands while loading and
//! replay FIFO exactly once when the load lands.

use glam::Vec2;

use crate::api::types::{Bounds, Direction, EntityId, EntityKind, SpriteInfo};
use crate::assets::content::ContentIndex;
use crate::assets::index::{self, AssetIndex};
use crate::backend::traits::{AnimationRequest, PlaybackRate, Repeat, RenderBackend, SpriteHandle};
use crate::entity::command::{Command, CommandQueue};
use crate::entity::data::{EntityData, Overrides};
use crate::entity::visual::{AppliedVisual, VisualFrame, VisualState};
use crate::input::queue::PointerEvent;
use crate::motion::easing::Easing;
use crate::motion::tween::MoveTween;

/// Layer kind under which an entity's own sheet is registered.
pub const SPRITE_LAYER: &str = "sprite";

/// Rendering parameters for entity construction. Entities constructed
/// without these are pure data records and never touch the backend.
#[derive(Debug, Clone)]
pub struct SpriteParams {
    pub x: f32,
    pub y: f32,
    pub z: f32,
    pub direction: Direction,
    pub variant: String,
    pub frame: u32,
    pub depth: f32,
    pub alpha: f32,
    pub scale: f32,
    pub origin: Vec2,
}

impl Default for SpriteParams {
    fn default() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            z: 0.0,
            direction: Direction::Right,
            variant: "base".to_string(),
            frame: 0,
            depth: 1.0,
            alpha: 1.0,
            scale: 1.0,
            origin: Vec2::ZERO,
        }
    }
}

impl SpriteParams {
    pub fn at(x: f32, y: f32) -> Self {
        Self { x, y, ..Self::default() }
    }

    pub fn with_z(mut self, z: f32) -> Self {
        self.z = z;
        self
    }

    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    pub fn with_variant(mut self, variant: impl Into<String>) -> Self {
        self.variant = variant.into();
        self
    }

    pub fn with_frame(mut self, frame: u32) -> Self {
        self.frame = frame;
        self
    }

    pub fn with_depth(mut self, depth: f32) -> Self {
        self.depth = depth;
        self
    }

    pub fn with_alpha(mut self, alpha: f32) -> Self {
        self.alpha = alpha;
        self
    }

    pub fn with_scale(mut self, scale: f32) -> Self {
        self.scale = scale;
        self
    }

    pub fn with_origin(mut self, origin: Vec2) -> Self {
        self.origin = origin;
        self
    }
}

/// Resource-loading state of an entity's sprite.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadState {
    /// True while the entity's real sheet has not finished loading.
    pub loading: bool,
    /// True while the sprite still shows the kind's generic fallback.
    pub placeholder: bool,
}

#[derive(Debug)]
pub struct Entity {
    id: EntityId,
    kind: EntityKind,
    token: String,
    pub data: EntityData,
    pub visual: VisualState,
    applied: AppliedVisual,
    sprite: Option<SpriteHandle>,
    load: LoadState,
    queue: CommandQueue,
    /// In-flight movement/animation operations; `when_done` waits on zero.
    busy: u32,
    motion: Option<MoveTween>,
    /// One-shot animation timer: remaining seconds + completion event.
    one_shot: Option<(f32, Option<u32>)>,
    idle_key: Option<String>,
    events: Vec<u32>,
    interactive: bool,
    on_click: Option<u32>,
    on_hover: Option<u32>,
    hovered: bool,
    hit_size: Vec2,
    destroyed: bool,
}

impl Entity {
    /// Construct a data-only entity: merged record, no sprite. All sprite
    /// mutators on such an entity are no-ops.
    pub fn new(
        id: EntityId,
        kind: EntityKind,
        token: impl Into<String>,
        overrides: Overrides,
        content: &ContentIndex,
    ) -> Self {
        let token = token.into();
        let record = content.get(kind, &token);
        if record.is_none() {
            log::warn!("no content record for {} {:?}", kind.key(), token);
        }
        let data = EntityData::merged(record, overrides);
        let hit = data.frame_size();
        Self {
            id,
            kind,
            token,
            data,
            visual: VisualState::default(),
            applied: AppliedVisual::new(),
            sprite: None,
            load: LoadState::default(),
            queue: CommandQueue::new(),
            busy: 0,
            motion: None,
            one_shot: None,
            idle_key: None,
            events: Vec::new(),
            interactive: false,
            on_click: None,
            on_hover: None,
            hovered: false,
            hit_size: Vec2::new(hit.0 as f32, hit.1 as f32),
            destroyed: false,
        }
    }

    /// Construct an entity with a sprite. Resolution is two-phase: the real
    /// sheet if already loaded, otherwise a placeholder plus a queued load.
    pub fn spawn(
        id: EntityId,
        kind: EntityKind,
        token: impl Into<String>,
        overrides: Overrides,
        params: SpriteParams,
        content: &ContentIndex,
        assets: &mut AssetIndex,
        backend: &mut dyn RenderBackend,
    ) -> Self {
        let mut entity = Self::new(id, kind, token, overrides, content);
        entity.create_sprite(params, assets, backend);
        entity
    }

    fn create_sprite(
        &mut self,
        params: SpriteParams,
        assets: &mut AssetIndex,
        backend: &mut dyn RenderBackend,
    ) {
        self.visual.x = params.x;
        self.visual.y = params.y;
        self.visual.z = params.z;
        self.visual.direction = params.direction;
        self.visual.variant = params.variant;
        self.visual.frame = params.frame;
        self.visual.depth = params.depth;
        self.visual.alpha = params.alpha;
        self.visual.scale = params.scale;
        self.visual.origin = params.origin;

        let frame_size = self.data.frame_size();
        let key = assets.register_sheet(
            self.kind,
            &self.token,
            &self.visual.variant,
            SPRITE_LAYER,
            self.visual.direction,
            frame_size,
        );

        let sprite = if backend.texture_exists(&key) {
            let sprite = backend.create_sprite(&key, self.visual.x, self.visual.y);
            self.visual.texture = key.clone();
            sprite
        } else {
            let placeholder = self.kind.placeholder_key();
            let sprite = backend.create_sprite(placeholder, self.visual.x, self.visual.y);
            self.visual.texture = placeholder.to_string();
            self.load = LoadState { loading: true, placeholder: true };
            let path = assets
                .path_for(
                    self.kind,
                    &self.token,
                    SPRITE_LAYER,
                    self.visual.direction,
                    &self.visual.variant,
                )
                .unwrap_or_default()
                .to_string();
            assets.queue_sheet(&key, &path, frame_size);
            sprite
        };
        self.applied.prime(&self.visual.texture, self.visual.x, self.visual.y);
        self.sprite = Some(sprite);

        // Register the token's named animations against this sheet; they
        // are created once the sheet (and any other pending sheet) lands.
        for (name, spec) in &self.data.animations {
            let anim_key = assets.register_animation(
                self.kind,
                &self.token,
                &self.visual.variant,
                SPRITE_LAYER,
                self.visual.direction,
                name,
            );
            assets.queue_animation(AnimationRequest {
                key: anim_key,
                sheet_key: key.clone(),
                frames: spec.frames.clone(),
                rate: PlaybackRate::Fps(spec.fps),
                repeat: if spec.looping { Repeat::Loop } else { Repeat::Once },
            });
        }

        self.refresh(backend);
    }

    // -- Accessors --

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn kind(&self) -> EntityKind {
        self.kind
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn is_loading(&self) -> bool {
        self.load.loading
    }

    pub fn is_placeholder(&self) -> bool {
        self.load.placeholder
    }

    pub fn busy(&self) -> u32 {
        self.busy
    }

    pub fn has_sprite(&self) -> bool {
        self.sprite.is_some()
    }

    pub fn sprite_handle(&self) -> Option<SpriteHandle> {
        self.sprite
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    pub fn queued_commands(&self) -> usize {
        self.queue.len()
    }

    /// Axis-aligned bounds for layout reads.
    pub fn bounds(&self) -> Bounds {
        let width = self.hit_size.x * self.visual.scale;
        let height = self.hit_size.y * self.visual.scale;
        Bounds {
            x: self.visual.x - self.visual.origin.x * width,
            y: self.visual.y - self.visual.origin.y * height,
            width,
            height,
        }
    }

    /// Snapshot of the sprite's render state.
    pub fn sprite_info(&self) -> SpriteInfo {
        SpriteInfo {
            texture: self.visual.texture.clone(),
            frame: self.visual.frame,
            direction: self.visual.direction,
            size: self.hit_size * self.visual.scale,
            loading: self.load.loading,
            placeholder: self.load.placeholder,
        }
    }

    /// Events fired since the last drain (move completions, ready/done
    /// notifications, click/hover wiring).
    pub fn drain_events(&mut self) -> Vec<u32> {
        std::mem::take(&mut self.events)
    }

    // -- Redraw --

    /// Push changed visual properties to the backend. Idempotent: a second
    /// call with no intervening change issues zero backend calls.
    pub fn refresh(&mut self, backend: &mut dyn RenderBackend) {
        let Some(sprite) = self.sprite else { return };
        let target = VisualFrame {
            x: self.visual.x,
            y: self.visual.y,
            depth: self.visual.depth + self.visual.z,
            frame: self.visual.frame,
            texture: &self.visual.texture,
            origin: self.visual.origin,
            alpha: self.visual.alpha,
            tint: self.visual.tint,
            scale: self.visual.scale,
            visible: self.visual.visible,
        };
        self.applied.sync(sprite, &target, backend);
    }

    // -- Loading --

    /// Swap the real sheet in once the backend has it, then replay queued
    /// commands FIFO. Safe to call every tick; does nothing until the sheet
    /// has actually landed.
    pub fn finish_loading(&mut self, assets: &mut AssetIndex, backend: &mut dyn RenderBackend) {
        if !self.load.loading || self.sprite.is_none() {
            return;
        }
        let key = index::sheet_key(
            self.kind,
            &self.token,
            &self.visual.variant,
            SPRITE_LAYER,
            self.visual.direction,
        );
        if !backend.texture_exists(&key) {
            return;
        }
        self.visual.texture = key;
        self.load = LoadState { loading: false, placeholder: false };
        self.refresh(backend);
        for command in self.queue.drain() {
            self.apply_command(command, assets, backend);
        }
    }

    /// Dispatch one deferred command. Routes through the public mutators,
    /// so a command that re-enters a loading state re-queues itself.
    fn apply_command(
        &mut self,
        command: Command,
        assets: &mut AssetIndex,
        backend: &mut dyn RenderBackend,
    ) {
        match command {
            Command::SetPosition { x, y, z } => self.set_position(x, y, z, backend),
            Command::TranslateBy { dx, dy } => self.translate(dx, dy, backend),
            Command::MoveTo { x, y, duration_ms, easing, on_complete } => {
                self.move_to_eased(x, y, duration_ms, easing, on_complete, backend)
            }
            Command::StopMoving => self.stop_moving(),
            Command::SetFrame(frame) => self.set_frame(frame, backend),
            Command::SetDirection(direction) => self.set_direction(direction, assets, backend),
            Command::SetVariant(variant) => self.set_variant(&variant, assets, backend),
            Command::PlayIdle { name } => self.play_idle(&name, assets, backend),
            Command::StopIdle => self.stop_idle(backend),
            Command::PlayAnimation { name, duration_ms, on_complete } => {
                self.play_animation(&name, duration_ms, on_complete, assets, backend)
            }
            Command::NotifyReady(event) => self.when_ready(event),
            Command::NotifyDone(event) => self.when_done(event),
        }
    }

    /// Fire `event` once the entity has finished loading.
    pub fn when_ready(&mut self, event: u32) {
        if self.load.loading {
            self.queue.push(Command::NotifyReady(event));
        } else {
            self.events.push(event);
        }
    }

    /// Fire `event` once no movement or one-shot animation is in flight.
    pub fn when_done(&mut self, event: u32) {
        if self.load.loading || self.busy > 0 {
            self.queue.push(Command::NotifyDone(event));
        } else {
            self.events.push(event);
        }
    }

    /// Release NotifyDone entries when the busy count reaches zero.
    fn drain_done_notifications(&mut self) {
        if self.load.loading || self.busy > 0 {
            return;
        }
        for command in self.queue.drain() {
            match command {
                Command::NotifyDone(event) => self.events.push(event),
                other => self.queue.push(other),
            }
        }
    }

    // -- Movement --

    /// Set the position immediately (z is the layering offset).
    pub fn set_position(&mut self, x: f32, y: f32, z: f32, backend: &mut dyn RenderBackend) {
        if self.sprite.is_none() {
            return;
        }
        if self.load.loading {
            self.queue.push(Command::SetPosition { x, y, z });
            return;
        }
        self.visual.x = x;
        self.visual.y = y;
        self.visual.z = z;
        self.refresh(backend);
    }

    /// Shift the position by a delta. Queued as a relative command while
    /// loading so it composes with queued absolute moves.
    pub fn translate(&mut self, dx: f32, dy: f32, backend: &mut dyn RenderBackend) {
        if self.sprite.is_none() {
            return;
        }
        if self.load.loading {
            self.queue.push(Command::TranslateBy { dx, dy });
            return;
        }
        self.visual.x += dx;
        self.visual.y += dy;
        self.refresh(backend);
    }

    /// Move to (x, y). Zero duration applies synchronously and fires the
    /// completion immediately; otherwise a tween runs via `tick`.
    pub fn move_to(&mut self, x: f32, y: f32, duration_ms: u32, backend: &mut dyn RenderBackend) {
        self.move_to_eased(x, y, duration_ms, Easing::default(), None, backend);
    }

    pub fn move_to_eased(
        &mut self,
        x: f32,
        y: f32,
        duration_ms: u32,
        easing: Easing,
        on_complete: Option<u32>,
        backend: &mut dyn RenderBackend,
    ) {
        if self.sprite.is_none() {
            return;
        }
        if self.load.loading {
            self.queue.push(Command::MoveTo { x, y, duration_ms, easing, on_complete });
            return;
        }
        // Never two position tweens at once.
        self.stop_moving();
        if duration_ms == 0 {
            self.visual.x = x;
            self.visual.y = y;
            self.refresh(backend);
            if let Some(event) = on_complete {
                self.events.push(event);
            }
            return;
        }
        let from = Vec2::new(self.visual.x, self.visual.y);
        let mut tween = MoveTween::new(from, Vec2::new(x, y), duration_ms, easing);
        tween.on_complete = on_complete;
        self.motion = Some(tween);
        self.busy += 1;
    }

    /// Cancel the in-flight movement, if any. Idempotent.
    pub fn stop_moving(&mut self) {
        if self.motion.take().is_some() {
            self.busy = self.busy.saturating_sub(1);
            self.drain_done_notifications();
        }
    }

    // -- Frame / skin --

    pub fn set_frame(&mut self, frame: u32, backend: &mut dyn RenderBackend) {
        if self.sprite.is_none() {
            return;
        }
        if self.load.loading {
            self.queue.push(Command::SetFrame(frame));
            return;
        }
        self.visual.frame = frame;
        self.refresh(backend);
    }

    /// Face the other way. Changes the resolved sheet; if the sheet for the
    /// new facing is not loaded yet the entity re-enters the loading state
    /// and keeps its current texture until the swap.
    pub fn set_direction(
        &mut self,
        direction: Direction,
        assets: &mut AssetIndex,
        backend: &mut dyn RenderBackend,
    ) {
        if self.sprite.is_none() {
            return;
        }
        if self.load.loading {
            self.queue.push(Command::SetDirection(direction));
            return;
        }
        if self.visual.direction == direction {
            return;
        }
        self.visual.direction = direction;
        self.retexture(assets, backend);
    }

    /// Switch to a named visual variant ("alt" skin).
    pub fn set_variant(
        &mut self,
        variant: &str,
        assets: &mut AssetIndex,
        backend: &mut dyn RenderBackend,
    ) {
        if self.sprite.is_none() {
            return;
        }
        if self.load.loading {
            self.queue.push(Command::SetVariant(variant.to_string()));
            return;
        }
        if self.visual.variant == variant {
            return;
        }
        self.visual.variant = variant.to_string();
        self.retexture(assets, backend);
    }

    fn retexture(&mut self, assets: &mut AssetIndex, backend: &mut dyn RenderBackend) {
        let frame_size = self.data.frame_size();
        let key = assets.register_sheet(
            self.kind,
            &self.token,
            &self.visual.variant,
            SPRITE_LAYER,
            self.visual.direction,
            frame_size,
        );
        if backend.texture_exists(&key) {
            self.visual.texture = key;
            self.refresh(backend);
        } else {
            let path = assets
                .path_for(
                    self.kind,
                    &self.token,
                    SPRITE_LAYER,
                    self.visual.direction,
                    &self.visual.variant,
                )
                .unwrap_or_default()
                .to_string();
            assets.queue_sheet(&key, &path, frame_size);
            // Keep showing the current texture until the new sheet lands.
            self.load.loading = true;
        }
    }

    // -- Visibility / blending (apply live, even to a placeholder) --

    pub fn set_alpha(&mut self, alpha: f32, backend: &mut dyn RenderBackend) {
        if self.sprite.is_none() {
            return;
        }
        self.visual.alpha = alpha;
        self.refresh(backend);
    }

    pub fn set_tint(&mut self, tint: Option<u32>, backend: &mut dyn RenderBackend) {
        if self.sprite.is_none() {
            return;
        }
        self.visual.tint = tint;
        self.refresh(backend);
    }

    pub fn set_visible(&mut self, visible: bool, backend: &mut dyn RenderBackend) {
        if self.sprite.is_none() {
            return;
        }
        self.visual.visible = visible;
        self.refresh(backend);
    }

    // -- Animation --

    /// Resolve the animation key for `name` on this entity's current sheet.
    pub fn animation_key(&self, assets: &AssetIndex, name: &str) -> String {
        self.animation_key_for(assets, SPRITE_LAYER, name, None, None, None)
    }

    /// Resolve an animation key with explicit axes; omitted axes default
    /// from the entity's current state. Returns the `~` sentinel when the
    /// tuple has never been registered.
    pub fn animation_key_for(
        &self,
        assets: &AssetIndex,
        layer: &str,
        name: &str,
        direction: Option<Direction>,
        variant: Option<&str>,
        token: Option<&str>,
    ) -> String {
        assets.resolve_animation(
            self.kind,
            token.unwrap_or(&self.token),
            layer,
            direction.unwrap_or(self.visual.direction),
            variant.unwrap_or(&self.visual.variant),
            name,
        )
    }

    /// Start the named looping animation. Unresolved keys warn and skip —
    /// never a hard failure.
    pub fn play_idle(&mut self, name: &str, assets: &AssetIndex, backend: &mut dyn RenderBackend) {
        let Some(sprite) = self.sprite else { return };
        if self.load.loading {
            self.queue.push(Command::PlayIdle { name: name.to_string() });
            return;
        }
        let key = self.animation_key(assets, name);
        if index::is_unresolved(&key) {
            log::warn!("cannot play unresolved animation {}", key);
            return;
        }
        backend.play_animation(sprite, &key);
        self.idle_key = Some(key);
    }

    /// Stop the looping animation, if one is playing.
    pub fn stop_idle(&mut self, backend: &mut dyn RenderBackend) {
        let Some(sprite) = self.sprite else { return };
        if self.load.loading {
            self.queue.push(Command::StopIdle);
            return;
        }
        if self.idle_key.take().is_some() {
            backend.stop_animation(sprite);
        }
    }

    /// Play a one-shot animation. Holds the busy count for `duration_ms`,
    /// then fires `on_complete`. An unresolved key warns and completes
    /// immediately so callers never hang on missing content.
    pub fn play_animation(
        &mut self,
        name: &str,
        duration_ms: u32,
        on_complete: Option<u32>,
        assets: &AssetIndex,
        backend: &mut dyn RenderBackend,
    ) {
        let Some(sprite) = self.sprite else { return };
        if self.load.loading {
            self.queue.push(Command::PlayAnimation {
                name: name.to_string(),
                duration_ms,
                on_complete,
            });
            return;
        }
        let key = self.animation_key(assets, name);
        if index::is_unresolved(&key) {
            log::warn!("cannot play unresolved animation {}", key);
            if let Some(event) = on_complete {
                self.events.push(event);
            }
            return;
        }
        backend.play_animation(sprite, &key);
        self.busy += 1;
        self.one_shot = Some((duration_ms as f32 / 1000.0, on_complete));
    }

    // -- Interaction --

    pub fn set_interactive(&mut self, enabled: bool, backend: &mut dyn RenderBackend) {
        let Some(sprite) = self.sprite else { return };
        self.interactive = enabled;
        backend.set_interactive(sprite, enabled);
    }

    pub fn set_on_click(&mut self, event: u32) {
        self.on_click = Some(event);
    }

    pub fn set_on_hover(&mut self, event: u32) {
        self.on_hover = Some(event);
    }

    pub fn contains_point(&self, x: f32, y: f32) -> bool {
        self.bounds().contains(x, y)
    }

    /// Basic click/hover wiring: clicks inside the bounds fire `on_click`,
    /// pointer moves fire `on_hover` on enter.
    pub fn handle_pointer(&mut self, event: &PointerEvent) {
        if !self.interactive || self.sprite.is_none() {
            return;
        }
        match *event {
            PointerEvent::Down { x, y } => {
                if self.contains_point(x, y) {
                    if let Some(click) = self.on_click {
                        self.events.push(click);
                    }
                }
            }
            PointerEvent::Move { x, y } => {
                let inside = self.contains_point(x, y);
                if inside != self.hovered {
                    self.hovered = inside;
                    if inside {
                        if let Some(hover) = self.on_hover {
                            self.events.push(hover);
                        }
                    }
                }
            }
            PointerEvent::Up { .. } => {}
        }
    }

    // -- Per-tick advancement --

    /// Advance the in-flight movement tween and one-shot animation timer.
    pub fn tick(&mut self, dt: f32, backend: &mut dyn RenderBackend) {
        if self.sprite.is_none() {
            return;
        }

        if let Some(mut tween) = self.motion.take() {
            let (pos, done) = tween.tick(dt);
            let on_complete = tween.on_complete;
            self.visual.x = pos.x;
            self.visual.y = pos.y;
            if !done {
                self.motion = Some(tween);
            }
            self.refresh(backend);
            if done {
                self.busy = self.busy.saturating_sub(1);
                if let Some(event) = on_complete {
                    self.events.push(event);
                }
                self.drain_done_notifications();
            }
        }

        if let Some((remaining, on_complete)) = self.one_shot.take() {
            let remaining = remaining - dt;
            if remaining > 0.0 {
                self.one_shot = Some((remaining, on_complete));
            } else {
                self.busy = self.busy.saturating_sub(1);
                if let Some(event) = on_complete {
                    self.events.push(event);
                }
                self.drain_done_notifications();
            }
        }
    }

    // -- Teardown --

    /// Halt every movement and animation this entity owns; optionally also
    /// drop its interaction wiring.
    pub fn stop_all(&mut self, backend: &mut dyn RenderBackend, remove_interaction: bool) {
        let Some(sprite) = self.sprite else { return };
        self.stop_moving();
        if self.one_shot.take().is_some() {
            self.busy = self.busy.saturating_sub(1);
            self.drain_done_notifications();
        }
        if self.idle_key.take().is_some() {
            backend.stop_animation(sprite);
        }
        if remove_interaction && self.interactive {
            backend.set_interactive(sprite, false);
            self.interactive = false;
        }
    }

    /// Stop everything, hide, destroy the sprite and null the handle.
    /// A second call is a safe no-op.
    pub fn destroy(&mut self, backend: &mut dyn RenderBackend) {
        let Some(sprite) = self.sprite else {
            self.destroyed = true;
            return;
        };
        self.stop_all(backend, true);
        backend.set_visible(sprite, false);
        backend.destroy(sprite);
        self.sprite = None;
        self.queue.clear();
        self.busy = 0;
        self.load = LoadState::default();
        self.destroyed = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::content::{AnimationSpec, ContentRecord};
    use crate::backend::headless::{BackendCall, HeadlessBackend};

    const REAL_KEY: &str = "sprites.robots.mega-man.base.sprite-right";

    fn content() -> ContentIndex {
        let mut record = ContentRecord::new("mega-man");
        record.name = "Mega Man".into();
        record.image_size = 40;
        record.animations.insert(
            "idle".into(),
            AnimationSpec { frames: vec![0, 1], fps: 4.0, looping: true },
        );
        let mut index = ContentIndex::new();
        index.insert(EntityKind::Robot, record);
        index
    }

    fn spawn_loading() -> (Entity, AssetIndex, HeadlessBackend) {
        let content = content();
        let mut assets = AssetIndex::new();
        let mut backend = HeadlessBackend::new();
        let entity = Entity::spawn(
            EntityId(1),
            EntityKind::Robot,
            "mega-man",
            Overrides::default(),
            SpriteParams::at(100.0, 50.0),
            &content,
            &mut assets,
            &mut backend,
        );
        (entity, assets, backend)
    }

    fn finish(entity: &mut Entity, assets: &mut AssetIndex, backend: &mut HeadlessBackend) {
        assets.flush_pending(backend);
        backend.complete_loads();
        assets.pump(backend);
        entity.finish_loading(assets, backend);
    }

    #[test]
    fn data_only_entity_ignores_sprite_mutators() {
        let content = content();
        let mut backend = HeadlessBackend::new();
        let mut assets = AssetIndex::new();
        let mut entity = Entity::new(
            EntityId(1),
            EntityKind::Robot,
            "mega-man",
            Overrides::default(),
            &content,
        );
        assert!(!entity.has_sprite());

        entity.set_frame(3, &mut backend);
        entity.move_to(10.0, 10.0, 500, &mut backend);
        entity.play_idle("idle", &assets, &mut backend);
        entity.set_direction(Direction::Left, &mut assets, &mut backend);
        entity.refresh(&mut backend);

        assert_eq!(backend.call_count(), 0);
        assert_eq!(entity.queued_commands(), 0);
        assert_eq!(entity.data.name, "Mega Man");
    }

    #[test]
    fn preloaded_sheet_creates_real_sprite() {
        let content = content();
        let mut assets = AssetIndex::new();
        let mut backend = HeadlessBackend::with_textures([REAL_KEY]);
        let entity = Entity::spawn(
            EntityId(1),
            EntityKind::Robot,
            "mega-man",
            Overrides::default(),
            SpriteParams::at(0.0, 0.0),
            &content,
            &mut assets,
            &mut backend,
        );
        assert!(!entity.is_loading());
        assert!(!entity.is_placeholder());
        assert_eq!(entity.visual.texture, REAL_KEY);
    }

    #[test]
    fn missing_sheet_spawns_placeholder_and_queues_load() {
        let (entity, mut assets, mut backend) = spawn_loading();
        assert!(entity.is_loading());
        assert!(entity.is_placeholder());
        assert_eq!(entity.visual.texture, "sprites.robots.placeholder");

        assets.flush_pending(&mut backend);
        assert_eq!(backend.loading_keys(), &[REAL_KEY.to_string()]);
    }

    #[test]
    fn deferred_commands_replay_in_order_exactly_once() {
        let (mut entity, mut assets, mut backend) = spawn_loading();

        // Issued before the load completes: queue, do not apply.
        entity.move_to(200.0, 50.0, 0, &mut backend);
        entity.set_frame(3, &mut backend);
        assert_eq!(entity.queued_commands(), 2);
        assert_eq!(entity.visual.x, 100.0);

        finish(&mut entity, &mut assets, &mut backend);
        assert!(!entity.is_loading());
        assert_eq!(entity.visual.x, 200.0);
        assert_eq!(entity.visual.frame, 3);
        assert_eq!(entity.queued_commands(), 0);

        // Backend saw position before frame, in issue order.
        let pos_at = backend
            .calls()
            .iter()
            .position(|c| matches!(c, BackendCall::SetPosition { x, y, .. } if *x == 200.0 && *y == 50.0))
            .expect("position applied");
        let frame_at = backend
            .calls()
            .iter()
            .position(|c| matches!(c, BackendCall::SetFrame { frame: 3, .. }))
            .expect("frame applied");
        assert!(pos_at < frame_at);

        // A second finish_loading replays nothing.
        let before = backend.call_count();
        entity.finish_loading(&mut assets, &mut backend);
        assert_eq!(backend.call_count(), before);
    }

    #[test]
    fn refresh_is_idempotent() {
        let (mut entity, _assets, mut backend) = spawn_loading();
        entity.refresh(&mut backend);
        let before = backend.call_count();
        entity.refresh(&mut backend);
        assert_eq!(backend.call_count(), before);
    }

    #[test]
    fn zero_duration_move_applies_synchronously() {
        let content = content();
        let mut assets = AssetIndex::new();
        let mut backend = HeadlessBackend::with_textures([REAL_KEY]);
        let mut entity = Entity::spawn(
            EntityId(1),
            EntityKind::Robot,
            "mega-man",
            Overrides::default(),
            SpriteParams::at(0.0, 0.0),
            &content,
            &mut assets,
            &mut backend,
        );
        entity.move_to_eased(30.0, 40.0, 0, Easing::Linear, Some(9), &mut backend);
        assert_eq!(entity.visual.x, 30.0);
        assert_eq!(entity.busy(), 0);
        assert_eq!(entity.drain_events(), vec![9]);
    }

    #[test]
    fn new_move_cancels_the_previous_tween() {
        let content = content();
        let mut assets = AssetIndex::new();
        let mut backend = HeadlessBackend::with_textures([REAL_KEY]);
        let mut entity = Entity::spawn(
            EntityId(1),
            EntityKind::Robot,
            "mega-man",
            Overrides::default(),
            SpriteParams::at(0.0, 0.0),
            &content,
            &mut assets,
            &mut backend,
        );

        entity.move_to_eased(100.0, 0.0, 1000, Easing::Linear, Some(1), &mut backend);
        entity.move_to_eased(0.0, 50.0, 1000, Easing::Linear, Some(2), &mut backend);
        assert_eq!(entity.busy(), 1);

        for _ in 0..70 {
            entity.tick(1.0 / 60.0, &mut backend);
        }
        assert_eq!(entity.busy(), 0);
        // Exact target, no drift; only the second completion fired.
        assert_eq!(entity.visual.x, 0.0);
        assert_eq!(entity.visual.y, 50.0);
        assert_eq!(entity.drain_events(), vec![2]);
    }

    #[test]
    fn when_done_waits_for_busy_zero() {
        let content = content();
        let mut assets = AssetIndex::new();
        let mut backend = HeadlessBackend::with_textures([REAL_KEY]);
        let mut entity = Entity::spawn(
            EntityId(1),
            EntityKind::Robot,
            "mega-man",
            Overrides::default(),
            SpriteParams::at(0.0, 0.0),
            &content,
            &mut assets,
            &mut backend,
        );

        entity.move_to(10.0, 0.0, 100, &mut backend);
        entity.when_done(42);
        assert!(entity.drain_events().is_empty());

        for _ in 0..12 {
            entity.tick(1.0 / 60.0, &mut backend);
        }
        assert_eq!(entity.drain_events(), vec![42]);

        // Immediate when idle.
        entity.when_done(43);
        assert_eq!(entity.drain_events(), vec![43]);
    }

    #[test]
    fn stop_all_releases_pending_done_events() {
        let content = content();
        let mut assets = AssetIndex::new();
        let mut backend = HeadlessBackend::with_textures([REAL_KEY]);
        let mut entity = Entity::spawn(
            EntityId(1),
            EntityKind::Robot,
            "mega-man",
            Overrides::default(),
            SpriteParams::at(0.0, 0.0),
            &content,
            &mut assets,
            &mut backend,
        );

        entity.play_animation("idle", 500, None, &assets, &mut backend);
        assert_eq!(entity.busy(), 1);
        entity.when_done(42);
        assert!(entity.drain_events().is_empty());

        // Cancelling the animation must fire the waiting done-event, same
        // as cancelling a movement does.
        entity.stop_all(&mut backend, false);
        assert_eq!(entity.busy(), 0);
        assert_eq!(entity.drain_events(), vec![42]);
    }

    #[test]
    fn when_ready_defers_until_load_completes() {
        let (mut entity, mut assets, mut backend) = spawn_loading();
        entity.when_ready(5);
        assert!(entity.drain_events().is_empty());

        finish(&mut entity, &mut assets, &mut backend);
        assert_eq!(entity.drain_events(), vec![5]);

        entity.when_ready(6);
        assert_eq!(entity.drain_events(), vec![6]);
    }

    #[test]
    fn idle_animation_plays_once_resolved() {
        let (mut entity, mut assets, mut backend) = spawn_loading();
        entity.play_idle("idle", &assets, &mut backend);
        assert_eq!(entity.queued_commands(), 1);

        finish(&mut entity, &mut assets, &mut backend);
        let key = format!("{}.idle", REAL_KEY);
        assert!(backend
            .calls()
            .iter()
            .any(|c| matches!(c, BackendCall::PlayAnimation { key: k, .. } if k == &key)));
    }

    #[test]
    fn unresolved_animation_is_skipped_not_fatal() {
        let content = content();
        let mut assets = AssetIndex::new();
        let mut backend = HeadlessBackend::with_textures([REAL_KEY]);
        let mut entity = Entity::spawn(
            EntityId(1),
            EntityKind::Robot,
            "mega-man",
            Overrides::default(),
            SpriteParams::at(0.0, 0.0),
            &content,
            &mut assets,
            &mut backend,
        );

        entity.play_idle("victory-dance", &assets, &mut backend);
        assert!(!backend
            .calls()
            .iter()
            .any(|c| matches!(c, BackendCall::PlayAnimation { .. })));

        // One-shot completes immediately so callers never hang.
        entity.play_animation("victory-dance", 500, Some(3), &assets, &mut backend);
        assert_eq!(entity.busy(), 0);
        assert_eq!(entity.drain_events(), vec![3]);
    }

    #[test]
    fn direction_change_reenters_loading_and_swaps() {
        let content = content();
        let mut assets = AssetIndex::new();
        let mut backend = HeadlessBackend::with_textures([REAL_KEY]);
        let mut entity = Entity::spawn(
            EntityId(1),
            EntityKind::Robot,
            "mega-man",
            Overrides::default(),
            SpriteParams::at(0.0, 0.0),
            &content,
            &mut assets,
            &mut backend,
        );

        entity.set_direction(Direction::Left, &mut assets, &mut backend);
        assert!(entity.is_loading());
        // Still showing the old texture until the left sheet lands.
        assert_eq!(entity.visual.texture, REAL_KEY);

        finish(&mut entity, &mut assets, &mut backend);
        assert_eq!(entity.visual.texture, "sprites.robots.mega-man.base.sprite-left");
        assert!(!entity.is_loading());
    }

    #[test]
    fn destroy_is_idempotent() {
        let (mut entity, _assets, mut backend) = spawn_loading();
        entity.destroy(&mut backend);
        assert!(entity.is_destroyed());
        assert!(!entity.has_sprite());

        let before = backend.call_count();
        entity.destroy(&mut backend);
        assert_eq!(backend.call_count(), before);

        // Mutators after destroy are guarded no-ops.
        entity.set_frame(5, &mut backend);
        entity.move_to(1.0, 1.0, 100, &mut backend);
        assert_eq!(backend.call_count(), before);
    }

    #[test]
    fn click_and_hover_wiring() {
        let content = content();
        let mut assets = AssetIndex::new();
        let mut backend = HeadlessBackend::with_textures([REAL_KEY]);
        let mut entity = Entity::spawn(
            EntityId(1),
            EntityKind::Robot,
            "mega-man",
            Overrides::default(),
            SpriteParams::at(0.0, 0.0),
            &content,
            &mut assets,
            &mut backend,
        );
        entity.set_interactive(true, &mut backend);
        entity.set_on_click(100);
        entity.set_on_hover(101);

        entity.handle_pointer(&PointerEvent::Move { x: 10.0, y: 10.0 });
        entity.handle_pointer(&PointerEvent::Move { x: 11.0, y: 10.0 });
        entity.handle_pointer(&PointerEvent::Down { x: 10.0, y: 10.0 });
        entity.handle_pointer(&PointerEvent::Down { x: 500.0, y: 500.0 });

        // Hover fired once on enter, click once inside.
        assert_eq!(entity.drain_events(), vec![101, 100]);
    }

    #[test]
    fn bounds_respect_origin_and_scale() {
        let content = content();
        let mut assets = AssetIndex::new();
        let mut backend = HeadlessBackend::with_textures([REAL_KEY]);
        let entity = Entity::spawn(
            EntityId(1),
            EntityKind::Robot,
            "mega-man",
            Overrides::default(),
            SpriteParams::at(100.0, 100.0)
                .with_origin(Vec2::new(0.5, 0.5))
                .with_scale(2.0),
            &content,
            &mut assets,
            &mut backend,
        );
        let bounds = entity.bounds();
        assert_eq!(bounds.width, 80.0);
        assert_eq!(bounds.height, 80.0);
        assert_eq!(bounds.x, 60.0);
        assert_eq!(bounds.y, 60.0);
    }
}
