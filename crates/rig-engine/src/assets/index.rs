//! Asset index registry.
//!
//! Maps (kind, token, variant, layer, direction) tuples to resource keys,
//! paths and animation keys. Keys are derived deterministically so any
//! component can recompute them and cache them independently. Lookups never
//! fail: an unregistered tuple resolves to a sentinel key prefixed with `~`
//! which degrades to a placeholder at the consuming entity.
//!
//! The registry is an explicit instance passed by reference to every entity
//! factory — never ambient global state. It persists for the session and is
//! add-only; all writes are create-if-absent, so same-tick resolution of one
//! key by several entities is harmless.

use std::collections::{HashMap, HashSet};

use crate::api::types::{Direction, EntityKind};
use crate::backend::traits::{AnimationRequest, RenderBackend};

/// Prefix marking a key that has no registered resource behind it.
pub const UNRESOLVED_PREFIX: &str = "~";

/// Whether a key returned by the registry is the unresolved sentinel.
pub fn is_unresolved(key: &str) -> bool {
    key.starts_with(UNRESOLVED_PREFIX)
}

/// Derive the sheet key for a tuple. Pure; identical inputs always produce
/// the identical string.
pub fn sheet_key(
    kind: EntityKind,
    token: &str,
    variant: &str,
    layer: &str,
    direction: Direction,
) -> String {
    format!(
        "sprites.{}.{}.{}.{}-{}",
        kind.group_key(),
        token,
        variant,
        layer,
        direction.key()
    )
}

/// Derive the animation key for a tuple plus animation name.
pub fn animation_key(
    kind: EntityKind,
    token: &str,
    variant: &str,
    layer: &str,
    direction: Direction,
    name: &str,
) -> String {
    format!("{}.{}", sheet_key(kind, token, variant, layer, direction), name)
}

/// Derive the image path a sheet loads from.
pub fn sheet_path(
    kind: EntityKind,
    token: &str,
    variant: &str,
    layer: &str,
    direction: Direction,
    frame_size: (u32, u32),
) -> String {
    format!(
        "images/{}/{}/{}/{}-{}_{}x{}.png",
        kind.group_key(),
        token,
        variant,
        layer,
        direction.key(),
        frame_size.0,
        frame_size.1
    )
}

/// Composite table key for the sheet and path tables.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct SheetSlot {
    kind: EntityKind,
    token: String,
    variant: String,
    /// Layer kind plus direction, e.g. "sprite-right".
    layer_key: String,
}

impl SheetSlot {
    fn new(kind: EntityKind, token: &str, variant: &str, layer: &str, direction: Direction) -> Self {
        Self {
            kind,
            token: token.to_string(),
            variant: variant.to_string(),
            layer_key: format!("{}-{}", layer, direction.key()),
        }
    }
}

/// Composite table key for the animation table.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct AnimSlot {
    sheet: SheetSlot,
    name: String,
}

/// A sheet load waiting to be issued to the backend.
#[derive(Debug, Clone, PartialEq)]
struct PendingSheet {
    key: String,
    path: String,
    frame_size: (u32, u32),
}

#[derive(Debug, Default)]
pub struct AssetIndex {
    sheets: HashMap<SheetSlot, String>,
    paths: HashMap<SheetSlot, String>,
    anims: HashMap<AnimSlot, String>,
    pending_sheets: Vec<PendingSheet>,
    pending_anims: Vec<AnimationRequest>,
    in_flight: HashSet<String>,
}

impl AssetIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a sheet for a tuple, deriving its key and path. Idempotent:
    /// re-registering returns the already-stored key.
    pub fn register_sheet(
        &mut self,
        kind: EntityKind,
        token: &str,
        variant: &str,
        layer: &str,
        direction: Direction,
        frame_size: (u32, u32),
    ) -> String {
        let slot = SheetSlot::new(kind, token, variant, layer, direction);
        if let Some(key) = self.sheets.get(&slot) {
            return key.clone();
        }
        let key = sheet_key(kind, token, variant, layer, direction);
        let path = sheet_path(kind, token, variant, layer, direction, frame_size);
        self.sheets.insert(slot.clone(), key.clone());
        self.paths.insert(slot, path);
        key
    }

    /// Register an animation key for a tuple plus name. Idempotent.
    pub fn register_animation(
        &mut self,
        kind: EntityKind,
        token: &str,
        variant: &str,
        layer: &str,
        direction: Direction,
        name: &str,
    ) -> String {
        let slot = AnimSlot {
            sheet: SheetSlot::new(kind, token, variant, layer, direction),
            name: name.to_string(),
        };
        if let Some(key) = self.anims.get(&slot) {
            return key.clone();
        }
        let key = animation_key(kind, token, variant, layer, direction, name);
        self.anims.insert(slot, key.clone());
        key
    }

    /// Resolve a sheet tuple to its registered key, or the `~` sentinel if
    /// nothing has been registered for it. Never fails.
    pub fn resolve_sheet(
        &self,
        kind: EntityKind,
        token: &str,
        layer: &str,
        direction: Direction,
        variant: &str,
    ) -> String {
        let slot = SheetSlot::new(kind, token, variant, layer, direction);
        match self.sheets.get(&slot) {
            Some(key) => key.clone(),
            None => format!(
                "{}{}",
                UNRESOLVED_PREFIX,
                sheet_key(kind, token, variant, layer, direction)
            ),
        }
    }

    /// Resolve an animation tuple to its registered key, or the sentinel.
    pub fn resolve_animation(
        &self,
        kind: EntityKind,
        token: &str,
        layer: &str,
        direction: Direction,
        variant: &str,
        name: &str,
    ) -> String {
        let slot = AnimSlot {
            sheet: SheetSlot::new(kind, token, variant, layer, direction),
            name: name.to_string(),
        };
        match self.anims.get(&slot) {
            Some(key) => key.clone(),
            None => format!(
                "{}{}",
                UNRESOLVED_PREFIX,
                animation_key(kind, token, variant, layer, direction, name)
            ),
        }
    }

    /// Registered path for a sheet tuple, if any.
    pub fn path_for(
        &self,
        kind: EntityKind,
        token: &str,
        layer: &str,
        direction: Direction,
        variant: &str,
    ) -> Option<&str> {
        let slot = SheetSlot::new(kind, token, variant, layer, direction);
        self.paths.get(&slot).map(String::as_str)
    }

    /// Queue a sheet load. Idempotent: a key already queued or in flight is
    /// skipped, and keys the backend has already realized are skipped again
    /// at flush time.
    pub fn queue_sheet(&mut self, key: &str, path: &str, frame_size: (u32, u32)) {
        if self.in_flight.contains(key) || self.pending_sheets.iter().any(|p| p.key == key) {
            return;
        }
        log::debug!("queueing sheet load {}", key);
        self.pending_sheets.push(PendingSheet {
            key: key.to_string(),
            path: path.to_string(),
            frame_size,
        });
    }

    /// Queue an animation to be created once every pending sheet has
    /// loaded. Idempotent by key.
    pub fn queue_animation(&mut self, request: AnimationRequest) {
        if self.pending_anims.iter().any(|r| r.key == request.key) {
            return;
        }
        self.pending_anims.push(request);
    }

    /// Issue load requests for every queued sheet. Sheets the backend has
    /// already realized are dropped without a load. If nothing ends up in
    /// flight, queued animations are created immediately.
    pub fn flush_pending(&mut self, backend: &mut dyn RenderBackend) {
        for pending in std::mem::take(&mut self.pending_sheets) {
            if backend.texture_exists(&pending.key) {
                continue;
            }
            backend.load_sheet(&pending.key, &pending.path, pending.frame_size);
            self.in_flight.insert(pending.key);
        }
        if self.in_flight.is_empty() {
            self.create_pending_animations(backend);
        }
    }

    /// Drain the backend's completed-load signals. When the last in-flight
    /// sheet lands, queued animations are created — the single serialization
    /// point guaranteeing no animation targets a half-loaded sheet. Returns
    /// the keys that completed this pump.
    pub fn pump(&mut self, backend: &mut dyn RenderBackend) -> Vec<String> {
        let completed = backend.poll_loaded();
        for key in &completed {
            self.in_flight.remove(key);
        }
        if self.in_flight.is_empty() && !completed.is_empty() {
            self.create_pending_animations(backend);
        }
        completed
    }

    /// No loads in flight and nothing queued.
    pub fn is_settled(&self) -> bool {
        self.in_flight.is_empty() && self.pending_sheets.is_empty() && self.pending_anims.is_empty()
    }

    /// Number of sheet loads currently in flight.
    pub fn loads_in_flight(&self) -> usize {
        self.in_flight.len()
    }

    fn create_pending_animations(&mut self, backend: &mut dyn RenderBackend) {
        for request in std::mem::take(&mut self.pending_anims) {
            if backend.animation_exists(&request.key) {
                continue;
            }
            backend.create_animation(&request);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::headless::HeadlessBackend;
    use crate::backend::traits::{PlaybackRate, Repeat};

    fn anim_request(key: &str, sheet: &str) -> AnimationRequest {
        AnimationRequest {
            key: key.to_string(),
            sheet_key: sheet.to_string(),
            frames: vec![0, 1, 2],
            rate: PlaybackRate::Fps(8.0),
            repeat: Repeat::Loop,
        }
    }

    #[test]
    fn key_derivation_is_deterministic() {
        let a = sheet_key(EntityKind::Robot, "mega-man", "base", "sprite", Direction::Right);
        let b = sheet_key(EntityKind::Robot, "mega-man", "base", "sprite", Direction::Right);
        assert_eq!(a, b);
        assert_eq!(a, "sprites.robots.mega-man.base.sprite-right");
    }

    #[test]
    fn unresolved_then_registered() {
        let mut index = AssetIndex::new();
        let key = index.resolve_sheet(EntityKind::Robot, "mega-man", "sprite", Direction::Right, "base");
        assert_eq!(key, "~sprites.robots.mega-man.base.sprite-right");
        assert!(is_unresolved(&key));

        let registered =
            index.register_sheet(EntityKind::Robot, "mega-man", "base", "sprite", Direction::Right, (40, 40));
        assert_eq!(registered, "sprites.robots.mega-man.base.sprite-right");

        let resolved = index.resolve_sheet(EntityKind::Robot, "mega-man", "sprite", Direction::Right, "base");
        assert_eq!(resolved, registered);
        assert!(!is_unresolved(&resolved));

        // Re-resolution at any later time returns the identical string.
        let again = index.resolve_sheet(EntityKind::Robot, "mega-man", "sprite", Direction::Right, "base");
        assert_eq!(again, resolved);
    }

    #[test]
    fn register_is_create_if_absent() {
        let mut index = AssetIndex::new();
        let first =
            index.register_sheet(EntityKind::Item, "energy-tank", "base", "icon", Direction::Left, (20, 20));
        let second =
            index.register_sheet(EntityKind::Item, "energy-tank", "base", "icon", Direction::Left, (20, 20));
        assert_eq!(first, second);
        assert_eq!(
            index.path_for(EntityKind::Item, "energy-tank", "icon", Direction::Left, "base"),
            Some("images/items/energy-tank/base/icon-left_20x20.png")
        );
    }

    #[test]
    fn animation_keys_resolve_like_sheets() {
        let mut index = AssetIndex::new();
        let sentinel =
            index.resolve_animation(EntityKind::Robot, "mega-man", "sprite", Direction::Right, "base", "idle");
        assert!(is_unresolved(&sentinel));

        let key = index.register_animation(
            EntityKind::Robot,
            "mega-man",
            "base",
            "sprite",
            Direction::Right,
            "idle",
        );
        assert_eq!(key, "sprites.robots.mega-man.base.sprite-right.idle");
        assert_eq!(
            index.resolve_animation(EntityKind::Robot, "mega-man", "sprite", Direction::Right, "base", "idle"),
            key
        );
    }

    #[test]
    fn flush_and_pump_serialize_animation_creation() {
        let mut index = AssetIndex::new();
        let mut backend = HeadlessBackend::new();

        index.queue_sheet("sheet.a", "a.png", (40, 40));
        index.queue_sheet("sheet.b", "b.png", (40, 40));
        index.queue_animation(anim_request("sheet.a.idle", "sheet.a"));

        index.flush_pending(&mut backend);
        assert_eq!(index.loads_in_flight(), 2);
        // No animation may exist before both sheets land.
        assert!(!backend.animation_exists("sheet.a.idle"));

        backend.complete_load("sheet.a");
        index.pump(&mut backend);
        assert!(!backend.animation_exists("sheet.a.idle"));

        backend.complete_load("sheet.b");
        let completed = index.pump(&mut backend);
        assert_eq!(completed, vec!["sheet.b".to_string()]);
        assert!(backend.animation_exists("sheet.a.idle"));
        assert!(index.is_settled());
    }

    #[test]
    fn queue_sheet_is_idempotent() {
        let mut index = AssetIndex::new();
        let mut backend = HeadlessBackend::new();
        index.queue_sheet("sheet.a", "a.png", (40, 40));
        index.queue_sheet("sheet.a", "a.png", (40, 40));
        index.flush_pending(&mut backend);
        assert_eq!(index.loads_in_flight(), 1);

        // Re-queueing an in-flight key is also a no-op.
        index.queue_sheet("sheet.a", "a.png", (40, 40));
        index.flush_pending(&mut backend);
        assert_eq!(index.loads_in_flight(), 1);
    }

    #[test]
    fn already_loaded_sheets_skip_the_load() {
        let mut index = AssetIndex::new();
        let mut backend = HeadlessBackend::with_textures(["sheet.a"]);
        index.queue_sheet("sheet.a", "a.png", (40, 40));
        index.queue_animation(anim_request("sheet.a.idle", "sheet.a"));

        index.flush_pending(&mut backend);
        // Nothing in flight, so the animation was created immediately.
        assert_eq!(index.loads_in_flight(), 0);
        assert!(backend.animation_exists("sheet.a.idle"));
        assert!(index.is_settled());
    }

    #[test]
    fn existing_backend_animation_is_not_recreated() {
        let mut index = AssetIndex::new();
        let mut backend = HeadlessBackend::with_textures(["sheet.a"]);
        backend.create_animation(&anim_request("sheet.a.idle", "sheet.a"));
        let before = backend.call_count();

        index.queue_animation(anim_request("sheet.a.idle", "sheet.a"));
        index.flush_pending(&mut backend);
        assert_eq!(backend.call_count(), before);
    }
}
