pub mod api;
pub mod assets;
pub mod backend;
pub mod core;
pub mod entity;
pub mod input;
pub mod motion;

// Re-export key types at crate root for convenience
pub use api::types::{Bounds, Direction, EntityId, EntityKind, LayerSpec, SpriteInfo};
pub use assets::content::{AnimationSpec, ContentIndex, ContentRecord};
pub use assets::index::{animation_key, is_unresolved, sheet_key, AssetIndex};
pub use backend::headless::{BackendCall, HeadlessBackend};
pub use backend::traits::{AnimationRequest, PlaybackRate, Repeat, RenderBackend, SpriteHandle};
pub use crate::core::stage::Stage;
pub use entity::base::{Entity, LoadState, SpriteParams};
pub use entity::command::{Command, CommandQueue};
pub use entity::composite::{Layer, LayeredEntity};
pub use entity::data::{Counter, EntityData, Overrides};
pub use entity::factory::{spawn, GameObject};
pub use entity::grid::{grid_offset, ROW_SPAN};
pub use entity::visual::{AppliedVisual, Coord, VisualState};
pub use input::queue::{InputQueue, PointerEvent};
pub use motion::easing::{ease, lerp, Easing};
pub use motion::tween::MoveTween;
