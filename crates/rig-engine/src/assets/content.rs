use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::api::types::EntityKind;

/// One content record: everything the index knows about a token within a
/// kind — display name, image metadata, named animations and the seed data
/// (flags, counters, values) entities start from.
///
/// Loaded from JSON at runtime; the core reads these at entity-construction
/// time only and never mutates them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentRecord {
    #[serde(default)]
    pub token: String,
    #[serde(default)]
    pub name: String,
    /// Edge of one square sprite frame, in pixels.
    #[serde(default = "default_image_size")]
    pub image_size: u32,
    /// Non-square frame size override (composite kinds like fields).
    #[serde(default)]
    pub image_width: Option<u32>,
    #[serde(default)]
    pub image_height: Option<u32>,
    /// Named visual skins beyond the implicit "base".
    #[serde(default)]
    pub image_variants: Vec<String>,
    #[serde(default)]
    pub flags: Vec<String>,
    #[serde(default)]
    pub counters: HashMap<String, CounterDef>,
    #[serde(default)]
    pub values: HashMap<String, serde_json::Value>,
    /// Named frame animations on the token's sprite sheet.
    #[serde(default)]
    pub animations: HashMap<String, AnimationSpec>,
}

impl ContentRecord {
    /// Minimal record for tests and ad-hoc content.
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            name: String::new(),
            image_size: default_image_size(),
            image_width: None,
            image_height: None,
            image_variants: Vec::new(),
            flags: Vec::new(),
            counters: HashMap::new(),
            values: HashMap::new(),
            animations: HashMap::new(),
        }
    }

    /// Frame size in pixels, honoring non-square overrides.
    pub fn frame_size(&self) -> (u32, u32) {
        (
            self.image_width.unwrap_or(self.image_size),
            self.image_height.unwrap_or(self.image_size),
        )
    }
}

/// A named integer counter with optional clamping bounds.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct CounterDef {
    #[serde(default)]
    pub value: i64,
    #[serde(default)]
    pub min: Option<i64>,
    #[serde(default)]
    pub max: Option<i64>,
}

/// A named frame-animation sequence on a token's sheet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnimationSpec {
    pub frames: Vec<u32>,
    #[serde(default = "default_fps")]
    pub fps: f32,
    #[serde(default = "default_true")]
    pub looping: bool,
}

fn default_image_size() -> u32 {
    40
}

fn default_fps() -> f32 {
    10.0
}

fn default_true() -> bool {
    true
}

/// Content index: per kind, token → content record.
///
/// This is the boundary to the external content loader. Unknown kind keys in
/// the source JSON are skipped with a warning rather than failing the parse.
#[derive(Debug, Clone, Default)]
pub struct ContentIndex {
    records: HashMap<EntityKind, HashMap<String, ContentRecord>>,
}

impl ContentIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a content index from a JSON string.
    ///
    /// Expected shape: `{ "robots": { "mega-man": { ... } } }` — kind keys
    /// accept both singular and plural forms.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let raw: HashMap<String, HashMap<String, ContentRecord>> = serde_json::from_str(json)?;
        let mut index = Self::new();
        for (kind_key, tokens) in raw {
            let Some(kind) = EntityKind::from_key(&kind_key) else {
                log::warn!("content index: skipping unknown kind {:?}", kind_key);
                continue;
            };
            for (token, mut record) in tokens {
                if record.token.is_empty() {
                    record.token = token;
                }
                index.insert(kind, record);
            }
        }
        Ok(index)
    }

    /// Insert a record under its token.
    pub fn insert(&mut self, kind: EntityKind, record: ContentRecord) {
        self.records
            .entry(kind)
            .or_default()
            .insert(record.token.clone(), record);
    }

    /// Look up a record. Returns None if the token is not indexed.
    pub fn get(&self, kind: EntityKind, token: &str) -> Option<&ContentRecord> {
        self.records.get(&kind).and_then(|m| m.get(token))
    }

    /// All indexed tokens for a kind.
    pub fn tokens(&self, kind: EntityKind) -> impl Iterator<Item = &str> {
        self.records
            .get(&kind)
            .into_iter()
            .flat_map(|m| m.keys().map(String::as_str))
    }

    /// Number of records across all kinds.
    pub fn len(&self) -> usize {
        self.records.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
