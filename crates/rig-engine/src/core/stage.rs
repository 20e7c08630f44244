//! Stage: the host-loop container.
//!
//! Flat-Vec storage for small object counts (a battle holds tens of
//! objects, not thousands). The host drives it once per frame: push
//! pointer events, call `tick`, drain events. `tick` pumps the asset
//! registry, finishes loading objects whose sheets arrived, dispatches
//! input and advances every tween and timer.

use crate::api::types::{EntityId, EntityKind};
use crate::assets::content::ContentIndex;
use crate::assets::index::AssetIndex;
use crate::backend::traits::RenderBackend;
use crate::entity::base::SpriteParams;
use crate::entity::data::Overrides;
use crate::entity::factory::{self, GameObject};
use crate::input::queue::{InputQueue, PointerEvent};

pub struct Stage {
    objects: Vec<GameObject>,
    input: InputQueue,
    next_id: u32,
    events: Vec<u32>,
}

impl Stage {
    pub fn new() -> Self {
        Self {
            objects: Vec::with_capacity(64),
            input: InputQueue::new(),
            next_id: 1,
            events: Vec::new(),
        }
    }

    /// Allocate the next entity id. Ids are unique per stage, never reused.
    pub fn next_id(&mut self) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Spawn a game object of any kind through the factory and keep it on
    /// the stage. Returns its id.
    pub fn spawn(
        &mut self,
        kind: EntityKind,
        token: impl Into<String>,
        overrides: Overrides,
        params: SpriteParams,
        content: &ContentIndex,
        assets: &mut AssetIndex,
        backend: &mut dyn RenderBackend,
    ) -> EntityId {
        let id = self.next_id();
        let object = factory::spawn(id, kind, token, overrides, params, content, assets, backend);
        self.objects.push(object);
        id
    }

    /// Keep an externally constructed object on the stage.
    pub fn insert(&mut self, object: GameObject) {
        self.next_id = self.next_id.max(object.id().0 + 1);
        self.objects.push(object);
    }

    /// Remove an object by id, destroying its sprites. Returns whether
    /// anything was removed.
    pub fn despawn(&mut self, id: EntityId, backend: &mut dyn RenderBackend) -> bool {
        if let Some(idx) = self.objects.iter().position(|o| o.id() == id) {
            let mut object = self.objects.swap_remove(idx);
            object.destroy(backend);
            true
        } else {
            false
        }
    }

    pub fn get(&self, id: EntityId) -> Option<&GameObject> {
        self.objects.iter().find(|o| o.id() == id)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut GameObject> {
        self.objects.iter_mut().find(|o| o.id() == id)
    }

    /// First object matching a kind and token.
    pub fn find_by_token(&self, kind: EntityKind, token: &str) -> Option<&GameObject> {
        self.objects
            .iter()
            .find(|o| o.kind() == kind && o.token() == token)
    }

    pub fn find_by_token_mut(&mut self, kind: EntityKind, token: &str) -> Option<&mut GameObject> {
        self.objects
            .iter_mut()
            .find(|o| o.kind() == kind && o.token() == token)
    }

    pub fn iter(&self) -> impl Iterator<Item = &GameObject> {
        self.objects.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut GameObject> {
        self.objects.iter_mut()
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Queue a pointer event for the next tick.
    pub fn push_input(&mut self, event: PointerEvent) {
        self.input.push(event);
    }

    /// One frame: flush and pump the registry, finish loads that landed,
    /// dispatch queued input, advance tweens and timers, collect events.
    pub fn tick(&mut self, dt: f32, assets: &mut AssetIndex, backend: &mut dyn RenderBackend) {
        assets.flush_pending(backend);
        let completed = assets.pump(backend);
        if !completed.is_empty() {
            for object in &mut self.objects {
                object.finish_loading(assets, backend);
            }
        }

        for event in self.input.drain() {
            for object in &mut self.objects {
                if let GameObject::Sprite(entity) = object {
                    entity.handle_pointer(&event);
                }
            }
        }

        for object in &mut self.objects {
            object.tick(dt, backend);
            self.events.extend(object.drain_events());
        }
    }

    /// Events fired by stage objects since the last drain, in tick order.
    pub fn drain_events(&mut self) -> Vec<u32> {
        std::mem::take(&mut self.events)
    }

    /// Destroy every object and clear the stage.
    pub fn clear(&mut self, backend: &mut dyn RenderBackend) {
        for object in &mut self.objects {
            object.destroy(backend);
        }
        self.objects.clear();
    }
}

impl Default for Stage {
    fn default() -> Self {
        Self::new()
    }
}
