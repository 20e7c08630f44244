//! Entity factory.
//!
//! One spawn path for every kind: kinds with a layer table come back as
//! composites, everything else as a plain sprite entity. Callers hold a
//! [`GameObject`] and match when they need kind-specific behavior.

use crate::api::types::{EntityId, EntityKind};
use crate::assets::content::ContentIndex;
use crate::assets::index::AssetIndex;
use crate::backend::traits::RenderBackend;
use crate::entity::base::{Entity, SpriteParams};
use crate::entity::composite::LayeredEntity;
use crate::entity::data::Overrides;

/// A spawned game object: a plain sprite entity or a layered composite.
#[derive(Debug)]
pub enum GameObject {
    Sprite(Entity),
    Layered(LayeredEntity),
}

impl GameObject {
    pub fn id(&self) -> EntityId {
        match self {
            GameObject::Sprite(entity) => entity.id(),
            GameObject::Layered(composite) => composite.id(),
        }
    }

    pub fn kind(&self) -> EntityKind {
        match self {
            GameObject::Sprite(entity) => entity.kind(),
            GameObject::Layered(composite) => composite.kind(),
        }
    }

    pub fn token(&self) -> &str {
        match self {
            GameObject::Sprite(entity) => entity.token(),
            GameObject::Layered(composite) => composite.token(),
        }
    }

    pub fn is_loading(&self) -> bool {
        match self {
            GameObject::Sprite(entity) => entity.is_loading(),
            GameObject::Layered(composite) => composite.is_loading(),
        }
    }

    pub fn is_destroyed(&self) -> bool {
        match self {
            GameObject::Sprite(entity) => entity.is_destroyed(),
            GameObject::Layered(composite) => composite.is_destroyed(),
        }
    }

    /// The plain entity, if this object is one.
    pub fn as_sprite(&self) -> Option<&Entity> {
        match self {
            GameObject::Sprite(entity) => Some(entity),
            GameObject::Layered(_) => None,
        }
    }

    pub fn as_sprite_mut(&mut self) -> Option<&mut Entity> {
        match self {
            GameObject::Sprite(entity) => Some(entity),
            GameObject::Layered(_) => None,
        }
    }

    /// The composite, if this object is one.
    pub fn as_layered(&self) -> Option<&LayeredEntity> {
        match self {
            GameObject::Sprite(_) => None,
            GameObject::Layered(composite) => Some(composite),
        }
    }

    pub fn as_layered_mut(&mut self) -> Option<&mut LayeredEntity> {
        match self {
            GameObject::Sprite(_) => None,
            GameObject::Layered(composite) => Some(composite),
        }
    }

    /// Swap real textures in once their loads land, then replay deferred
    /// commands.
    pub fn finish_loading(&mut self, assets: &mut AssetIndex, backend: &mut dyn RenderBackend) {
        match self {
            GameObject::Sprite(entity) => entity.finish_loading(assets, backend),
            GameObject::Layered(composite) => composite.finish_loading(assets, backend),
        }
    }

    /// Advance tweens and timers.
    pub fn tick(&mut self, dt: f32, backend: &mut dyn RenderBackend) {
        match self {
            GameObject::Sprite(entity) => entity.tick(dt, backend),
            GameObject::Layered(composite) => composite.tick(dt, backend),
        }
    }

    /// Events fired since the last drain.
    pub fn drain_events(&mut self) -> Vec<u32> {
        match self {
            GameObject::Sprite(entity) => entity.drain_events(),
            GameObject::Layered(composite) => composite.drain_events(),
        }
    }

    pub fn destroy(&mut self, backend: &mut dyn RenderBackend) {
        match self {
            GameObject::Sprite(entity) => entity.destroy(backend),
            GameObject::Layered(composite) => composite.destroy(backend),
        }
    }
}

/// Spawn a game object of any kind. Kinds with a static layer table come
/// back layered; the rest are plain sprite entities.
pub fn spawn(
    id: EntityId,
    kind: EntityKind,
    token: impl Into<String>,
    overrides: Overrides,
    params: SpriteParams,
    content: &ContentIndex,
    assets: &mut AssetIndex,
    backend: &mut dyn RenderBackend,
) -> GameObject {
    if kind.layer_specs().is_empty() {
        GameObject::Sprite(Entity::spawn(
            id, kind, token, overrides, params, content, assets, backend,
        ))
    } else {
        GameObject::Layered(LayeredEntity::spawn(
            id, kind, token, overrides, params, content, assets, backend,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::content::ContentRecord;
    use crate::backend::headless::HeadlessBackend;

    fn content() -> ContentIndex {
        let mut field = ContentRecord::new("light-lab");
        field.image_width = Some(780);
        field.image_height = Some(248);
        let mut index = ContentIndex::new();
        index.insert(EntityKind::Field, field);
        index.insert(EntityKind::Robot, ContentRecord::new("mega-man"));
        index
    }

    #[test]
    fn kind_routes_to_the_right_variant() {
        let content = content();
        let mut assets = AssetIndex::new();
        let mut backend = HeadlessBackend::new();

        let robot = spawn(
            EntityId(1),
            EntityKind::Robot,
            "mega-man",
            Overrides::default(),
            SpriteParams::default(),
            &content,
            &mut assets,
            &mut backend,
        );
        assert!(robot.as_sprite().is_some());
        assert!(robot.as_layered().is_none());

        let field = spawn(
            EntityId(2),
            EntityKind::Field,
            "light-lab",
            Overrides::default(),
            SpriteParams::default(),
            &content,
            &mut assets,
            &mut backend,
        );
        assert!(field.as_layered().is_some());
        assert_eq!(field.kind(), EntityKind::Field);
        assert_eq!(field.token(), "light-lab");
    }
}
