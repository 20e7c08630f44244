//! Layered composite entity.
//!
//! A field is drawn as a stack of sub-sprites (background, foreground,
//! preview, gridlines, avatar) from its kind's static layer table, each
//! with its own last-applied snapshot. Other entities anchor to a named
//! layer; moving a layer translates its anchored children by exactly the
//! layer's movement delta, so children keep their own offsets within the
//! layer.

use glam::Vec2;

use crate::api::types::{EntityId, EntityKind, LayerSpec};
use crate::assets::content::ContentIndex;
use crate::assets::index::{self, AssetIndex};
use crate::backend::traits::{RenderBackend, SpriteHandle};
use crate::entity::base::{Entity, SpriteParams};
use crate::entity::data::Overrides;
use crate::entity::grid::grid_offset;
use crate::entity::visual::{AppliedVisual, Coord, VisualFrame};

/// One sub-sprite of a composite, created from a [`LayerSpec`] row.
#[derive(Debug)]
pub struct Layer {
    spec: LayerSpec,
    sprite: Option<SpriteHandle>,
    /// Current offset from the composite's position, initially the spec's
    /// configured offset plus the centering correction.
    offset: Vec2,
    offset_z: f32,
    texture: String,
    visible: bool,
    alpha: f32,
    loading: bool,
    applied: AppliedVisual,
}

impl Layer {
    pub fn name(&self) -> &str {
        self.spec.name
    }

    pub fn offset(&self) -> Vec2 {
        self.offset
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    fn frame_size(&self) -> (u32, u32) {
        (self.spec.width as u32, self.spec.height as u32)
    }
}

/// Identity of an anchored child within its composite.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChildKey {
    pub kind: EntityKind,
    pub token: String,
    pub id: EntityId,
}

#[derive(Debug)]
struct Anchor {
    layer: String,
    entity: Entity,
}

/// A composite entity: a base data record plus a stack of layer sprites and
/// the children anchored to them. Only kinds with a non-empty layer table
/// (fields) may be constructed as composites.
#[derive(Debug)]
pub struct LayeredEntity {
    base: Entity,
    layers: Vec<Layer>,
    children: Vec<Anchor>,
}

impl LayeredEntity {
    /// Construct a composite and create its layer sprites. Panics if the
    /// kind has no layer table; that is a caller bug, not bad content.
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
        assert!(
            !kind.layer_specs().is_empty(),
            "kind {:?} has no layer table",
            kind
        );
        let mut base = Entity::new(id, kind, token, overrides, content);
        base.visual.x = params.x;
        base.visual.y = params.y;
        base.visual.z = params.z;
        base.visual.direction = params.direction;
        base.visual.variant = params.variant;
        base.visual.depth = params.depth;

        let mut composite = Self {
            base,
            layers: Vec::new(),
            children: Vec::new(),
        };
        composite.prepare_layers(assets, backend);
        composite
    }

    /// Create one sub-sprite per layer-table row. Layers smaller than the
    /// composite frame are centered within it; the configured offset is
    /// applied on top of that correction.
    fn prepare_layers(&mut self, assets: &mut AssetIndex, backend: &mut dyn RenderBackend) {
        let (frame_w, frame_h) = self.base.data.frame_size();
        let parent = Vec2::new(frame_w as f32, frame_h as f32);

        for spec in self.base.kind().layer_specs() {
            let centering = (parent - Vec2::new(spec.width, spec.height)) * 0.5;
            let offset = Vec2::new(spec.offset_x, spec.offset_y) + centering;
            let mut layer = Layer {
                spec: *spec,
                sprite: None,
                offset,
                offset_z: spec.offset_z,
                texture: String::new(),
                visible: spec.visible,
                alpha: spec.alpha,
                loading: false,
                applied: AppliedVisual::new(),
            };

            let key = assets.register_sheet(
                self.base.kind(),
                self.base.token(),
                &self.base.visual.variant,
                layer.spec.name,
                self.base.visual.direction,
                layer.frame_size(),
            );
            let pos = self.position() + layer.offset;
            let sprite = if backend.texture_exists(&key) {
                layer.texture = key;
                backend.create_sprite(&layer.texture, pos.x, pos.y)
            } else {
                layer.texture = self.base.kind().placeholder_key().to_string();
                layer.loading = true;
                let path = assets
                    .path_for(
                        self.base.kind(),
                        self.base.token(),
                        layer.spec.name,
                        self.base.visual.direction,
                        &self.base.visual.variant,
                    )
                    .unwrap_or_default()
                    .to_string();
                assets.queue_sheet(&key, &path, layer.frame_size());
                backend.create_sprite(&layer.texture, pos.x, pos.y)
            };
            layer.applied.prime(&layer.texture, pos.x, pos.y);
            layer.sprite = Some(sprite);
            self.layers.push(layer);
        }
        self.refresh_layers(backend);
    }

    // -- Accessors --

    pub fn id(&self) -> EntityId {
        self.base.id()
    }

    pub fn kind(&self) -> EntityKind {
        self.base.kind()
    }

    pub fn token(&self) -> &str {
        self.base.token()
    }

    pub fn base(&self) -> &Entity {
        &self.base
    }

    pub fn base_mut(&mut self) -> &mut Entity {
        &mut self.base
    }

    pub fn position(&self) -> Vec2 {
        Vec2::new(self.base.visual.x, self.base.visual.y)
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn layer(&self, name: &str) -> Option<&Layer> {
        self.layers.iter().find(|l| l.spec.name == name)
    }

    fn layer_mut(&mut self, name: &str) -> Option<&mut Layer> {
        self.layers.iter_mut().find(|l| l.spec.name == name)
    }

    /// True while any layer still waits on its sheet.
    pub fn is_loading(&self) -> bool {
        self.layers.iter().any(|l| l.loading)
    }

    // -- Redraw --

    /// Push changed properties of every layer to the backend. Idempotent
    /// per layer, like the base entity's refresh.
    pub fn refresh_layers(&mut self, backend: &mut dyn RenderBackend) {
        let pos = Vec2::new(self.base.visual.x, self.base.visual.y);
        let depth = self.base.visual.depth;
        for layer in &mut self.layers {
            let Some(sprite) = layer.sprite else { continue };
            let at = pos + layer.offset;
            let target = VisualFrame {
                x: at.x,
                y: at.y,
                depth: depth + layer.offset_z,
                frame: 0,
                texture: &layer.texture,
                origin: Vec2::ZERO,
                alpha: layer.alpha,
                tint: None,
                scale: 1.0,
                visible: layer.visible,
            };
            layer.applied.sync(sprite, &target, backend);
        }
    }

    // -- Loading --

    /// Swap real sheets into layers whose loads have landed, then let
    /// loading children finish too. Safe to call every tick.
    pub fn finish_loading(&mut self, assets: &mut AssetIndex, backend: &mut dyn RenderBackend) {
        let kind = self.base.kind();
        let token = self.base.token().to_string();
        let variant = self.base.visual.variant.clone();
        let direction = self.base.visual.direction;
        for layer in &mut self.layers {
            if !layer.loading {
                continue;
            }
            let key = index::sheet_key(kind, &token, &variant, layer.spec.name, direction);
            if backend.texture_exists(&key) {
                layer.texture = key;
                layer.loading = false;
            }
        }
        self.refresh_layers(backend);
        for anchor in &mut self.children {
            anchor.entity.finish_loading(assets, backend);
        }
    }

    // -- Position and layer offsets --

    /// Move the composite. Layers follow their offsets; every anchored
    /// child is translated by the same delta.
    pub fn set_position(&mut self, x: f32, y: f32, backend: &mut dyn RenderBackend) {
        let dx = x - self.base.visual.x;
        let dy = y - self.base.visual.y;
        if dx == 0.0 && dy == 0.0 {
            return;
        }
        self.base.visual.x = x;
        self.base.visual.y = y;
        self.refresh_layers(backend);
        for anchor in &mut self.children {
            anchor.entity.translate(dx, dy, backend);
        }
    }

    /// Adjust one layer's offset. Children anchored to that layer move by
    /// exactly the old-to-new delta, so their placement within the layer is
    /// preserved. A missing layer name warns and does nothing.
    pub fn set_layer_offset(
        &mut self,
        name: &str,
        x: Coord,
        y: Coord,
        z: Coord,
        backend: &mut dyn RenderBackend,
    ) {
        let Some(layer) = self.layer_mut(name) else {
            log::warn!("no layer {:?} on {}", name, self.base.token());
            return;
        };
        let new_x = x.resolve(layer.offset.x);
        let new_y = y.resolve(layer.offset.y);
        let new_z = z.resolve(layer.offset_z);
        let dx = new_x - layer.offset.x;
        let dy = new_y - layer.offset.y;
        layer.offset = Vec2::new(new_x, new_y);
        layer.offset_z = new_z;
        self.refresh_layers(backend);

        if dx == 0.0 && dy == 0.0 {
            return;
        }
        for anchor in &mut self.children {
            if anchor.layer == name {
                anchor.entity.translate(dx, dy, backend);
            }
        }
    }

    /// Show or hide one layer. A missing layer name warns and does nothing.
    pub fn set_layer_visible(&mut self, name: &str, visible: bool, backend: &mut dyn RenderBackend) {
        let Some(layer) = self.layer_mut(name) else {
            log::warn!("no layer {:?} on {}", name, self.base.token());
            return;
        };
        layer.visible = visible;
        self.refresh_layers(backend);
    }

    /// Set one layer's alpha. A missing layer name warns and does nothing.
    pub fn set_layer_alpha(&mut self, name: &str, alpha: f32, backend: &mut dyn RenderBackend) {
        let Some(layer) = self.layer_mut(name) else {
            log::warn!("no layer {:?} on {}", name, self.base.token());
            return;
        };
        layer.alpha = alpha;
        self.refresh_layers(backend);
    }

    // -- Children --

    /// Anchor an entity to a named layer. Kinds outside the anchor
    /// allow-list and unknown layers are rejected and the entity handed
    /// back. An existing child with the same (kind, token, id) is replaced
    /// and returned.
    pub fn add_child(&mut self, entity: Entity, layer: &str) -> Result<Option<Entity>, Entity> {
        if !entity.kind().anchorable() {
            log::warn!(
                "kind {:?} cannot anchor to a composite",
                entity.kind()
            );
            return Err(entity);
        }
        if self.layer(layer).is_none() {
            log::warn!("no layer {:?} on {}", layer, self.base.token());
            return Err(entity);
        }
        let key = ChildKey {
            kind: entity.kind(),
            token: entity.token().to_string(),
            id: entity.id(),
        };
        let replaced = self
            .children
            .iter()
            .position(|a| self.anchor_key(a) == key)
            .map(|idx| self.children.remove(idx).entity);
        self.children.push(Anchor {
            layer: layer.to_string(),
            entity,
        });
        Ok(replaced)
    }

    /// Detach and return a child. None if no such child is anchored.
    pub fn remove_child(&mut self, kind: EntityKind, token: &str, id: EntityId) -> Option<Entity> {
        let idx = self
            .children
            .iter()
            .position(|a| {
                a.entity.kind() == kind && a.entity.token() == token && a.entity.id() == id
            })?;
        Some(self.children.remove(idx).entity)
    }

    pub fn child(&self, kind: EntityKind, token: &str, id: EntityId) -> Option<&Entity> {
        self.children
            .iter()
            .find(|a| a.entity.kind() == kind && a.entity.token() == token && a.entity.id() == id)
            .map(|a| &a.entity)
    }

    pub fn child_mut(
        &mut self,
        kind: EntityKind,
        token: &str,
        id: EntityId,
    ) -> Option<&mut Entity> {
        self.children
            .iter_mut()
            .find(|a| a.entity.kind() == kind && a.entity.token() == token && a.entity.id() == id)
            .map(|a| &mut a.entity)
    }

    pub fn children(&self) -> impl Iterator<Item = &Entity> {
        self.children.iter().map(|a| &a.entity)
    }

    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    fn anchor_key(&self, anchor: &Anchor) -> ChildKey {
        ChildKey {
            kind: anchor.entity.kind(),
            token: anchor.entity.token().to_string(),
            id: anchor.entity.id(),
        }
    }

    /// Place an anchored child at a battle-grid cell of its layer. The cell
    /// offset is measured from the layer's center.
    pub fn place_child_at_cell(
        &mut self,
        kind: EntityKind,
        token: &str,
        id: EntityId,
        col: i32,
        row: i32,
        backend: &mut dyn RenderBackend,
    ) {
        let base = Vec2::new(self.base.visual.x, self.base.visual.y);
        let Some(anchor) = self.children.iter_mut().find(|a| {
            a.entity.kind() == kind && a.entity.token() == token && a.entity.id() == id
        }) else {
            log::warn!("no anchored child {} {:?}", kind.key(), token);
            return;
        };
        let layer_offset = self
            .layers
            .iter()
            .find(|l| l.spec.name == anchor.layer)
            .map(|l| l.offset)
            .unwrap_or(Vec2::ZERO);
        let cell = grid_offset(col, row);
        let at = base + layer_offset + cell;
        let z = anchor.entity.visual.z;
        anchor.entity.set_position(at.x, at.y, z, backend);
    }

    // -- Per-tick advancement --

    /// Advance anchored children's tweens and timers.
    pub fn tick(&mut self, dt: f32, backend: &mut dyn RenderBackend) {
        for anchor in &mut self.children {
            anchor.entity.tick(dt, backend);
        }
    }

    /// Events fired by the composite and its children since the last drain.
    pub fn drain_events(&mut self) -> Vec<u32> {
        let mut events = self.base.drain_events();
        for anchor in &mut self.children {
            events.extend(anchor.entity.drain_events());
        }
        events
    }

    // -- Teardown --

    /// Destroy every layer sprite and anchored child, then the base record.
    /// Idempotent like the base entity's destroy.
    pub fn destroy(&mut self, backend: &mut dyn RenderBackend) {
        for layer in &mut self.layers {
            if let Some(sprite) = layer.sprite.take() {
                backend.set_visible(sprite, false);
                backend.destroy(sprite);
            }
        }
        for anchor in &mut self.children {
            anchor.entity.destroy(backend);
        }
        self.children.clear();
        self.base.destroy(backend);
    }

    pub fn is_destroyed(&self) -> bool {
        self.base.is_destroyed()
    }
}
