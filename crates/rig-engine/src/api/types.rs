use glam::Vec2;

/// Unique identifier for an entity on the stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntityId(pub u32);

/// Facing direction of an entity's sprite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Direction {
    Left,
    #[default]
    Right,
}

impl Direction {
    /// Key fragment used in resource keys and paths.
    pub fn key(self) -> &'static str {
        match self {
            Direction::Left => "left",
            Direction::Right => "right",
        }
    }

    /// The opposite direction.
    pub fn flip(self) -> Self {
        match self {
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    /// Parse from a key fragment. Returns None for unknown strings.
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "left" => Some(Direction::Left),
            "right" => Some(Direction::Right),
            _ => None,
        }
    }
}

/// Metadata for one visual layer of a composite entity.
///
/// Tables of these are static per kind; a composite creates its sub-sprites
/// from them on first use.
#[derive(Debug, Clone, Copy)]
pub struct LayerSpec {
    pub name: &'static str,
    pub width: f32,
    pub height: f32,
    pub offset_x: f32,
    pub offset_y: f32,
    pub offset_z: f32,
    pub visible: bool,
    pub alpha: f32,
}

/// Layer table for field entities: a battle stage composed of a backdrop,
/// an overlay drawn in front of anchored entities, a preview strip, the
/// grid guides, and an avatar badge.
const FIELD_LAYERS: [LayerSpec; 5] = [
    LayerSpec { name: "background", width: 780.0, height: 248.0, offset_x: 0.0, offset_y: 0.0, offset_z: 10.0, visible: true, alpha: 1.0 },
    LayerSpec { name: "foreground", width: 780.0, height: 248.0, offset_x: 0.0, offset_y: 0.0, offset_z: 40.0, visible: true, alpha: 1.0 },
    LayerSpec { name: "preview", width: 780.0, height: 120.0, offset_x: 0.0, offset_y: -64.0, offset_z: 20.0, visible: false, alpha: 1.0 },
    LayerSpec { name: "gridlines", width: 780.0, height: 180.0, offset_x: 0.0, offset_y: 34.0, offset_z: 15.0, visible: false, alpha: 0.35 },
    LayerSpec { name: "avatar", width: 100.0, height: 100.0, offset_x: -340.0, offset_y: -74.0, offset_z: 5.0, visible: false, alpha: 1.0 },
];

/// Category of entity. Each kind carries its own constant configuration:
/// resource-key fragments, layer metadata, anchoring rules and the generic
/// fallback texture shown while real resources load.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Player,
    Robot,
    Ability,
    Item,
    Field,
    Skill,
    Type,
}

impl EntityKind {
    /// All kinds, in declaration order.
    pub const ALL: [EntityKind; 7] = [
        EntityKind::Player,
        EntityKind::Robot,
        EntityKind::Ability,
        EntityKind::Item,
        EntityKind::Field,
        EntityKind::Skill,
        EntityKind::Type,
    ];

    /// Singular key (e.g. "robot").
    pub fn key(self) -> &'static str {
        match self {
            EntityKind::Player => "player",
            EntityKind::Robot => "robot",
            EntityKind::Ability => "ability",
            EntityKind::Item => "item",
            EntityKind::Field => "field",
            EntityKind::Skill => "skill",
            EntityKind::Type => "type",
        }
    }

    /// Plural group key used in resource keys and paths (e.g. "robots").
    pub fn group_key(self) -> &'static str {
        match self {
            EntityKind::Player => "players",
            EntityKind::Robot => "robots",
            EntityKind::Ability => "abilities",
            EntityKind::Item => "items",
            EntityKind::Field => "fields",
            EntityKind::Skill => "skills",
            EntityKind::Type => "types",
        }
    }

    /// Parse a kind from either its singular or plural key.
    pub fn from_key(key: &str) -> Option<Self> {
        EntityKind::ALL
            .into_iter()
            .find(|k| k.key() == key || k.group_key() == key)
    }

    /// Generic fallback texture shown while a kind's real sheet loads.
    pub fn placeholder_key(self) -> &'static str {
        match self {
            EntityKind::Player => "sprites.players.placeholder",
            EntityKind::Robot => "sprites.robots.placeholder",
            EntityKind::Ability => "sprites.abilities.placeholder",
            EntityKind::Item => "sprites.items.placeholder",
            EntityKind::Field => "sprites.fields.placeholder",
            EntityKind::Skill => "sprites.skills.placeholder",
            EntityKind::Type => "sprites.types.placeholder",
        }
    }

    /// Static layer table for composite kinds. Empty for plain sprites.
    pub fn layer_specs(self) -> &'static [LayerSpec] {
        match self {
            EntityKind::Field => &FIELD_LAYERS,
            _ => &[],
        }
    }

    /// Whether entities of this kind may be anchored to a composite's layer.
    pub fn anchorable(self) -> bool {
        matches!(
            self,
            EntityKind::Player | EntityKind::Robot | EntityKind::Ability | EntityKind::Item
        )
    }
}

/// Axis-aligned bounds of a sprite, for layout reads by the scene/UI layer.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Bounds {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Bounds {
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.x && x < self.x + self.width && y >= self.y && y < self.y + self.height
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.width * 0.5, self.y + self.height * 0.5)
    }
}

/// Snapshot of a sprite's render state, for layout reads.
#[derive(Debug, Clone, PartialEq)]
pub struct SpriteInfo {
    pub texture: String,
    pub frame: u32,
    pub direction: Direction,
    pub size: Vec2,
    pub loading: bool,
    pub placeholder: bool,
}
