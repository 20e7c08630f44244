//! Entity data model: the merged record of indexed content plus
//! caller-supplied overrides.

use std::collections::{HashMap, HashSet};

use crate::assets::content::{AnimationSpec, ContentRecord};

/// A named integer counter, clamped to optional bounds on every write.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Counter {
    pub value: i64,
    pub min: Option<i64>,
    pub max: Option<i64>,
}

impl Counter {
    pub fn new(value: i64) -> Self {
        Self { value, min: None, max: None }
    }

    pub fn bounded(value: i64, min: i64, max: i64) -> Self {
        let mut counter = Self { value: 0, min: Some(min), max: Some(max) };
        counter.set(value);
        counter
    }

    /// Set the value, clamped to the counter's bounds.
    pub fn set(&mut self, value: i64) {
        let mut v = value;
        if let Some(min) = self.min {
            v = v.max(min);
        }
        if let Some(max) = self.max {
            v = v.min(max);
        }
        self.value = v;
    }

    pub fn add(&mut self, delta: i64) {
        self.set(self.value.saturating_add(delta));
    }
}

/// Caller-supplied overrides merged over the indexed content record at
/// entity construction.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub flags: Vec<String>,
    pub counters: HashMap<String, i64>,
    pub values: HashMap<String, serde_json::Value>,
}

/// Merged data record of an entity. Always carries flags, counters and
/// values even when both the content record and the overrides were empty.
#[derive(Debug, Clone, Default)]
pub struct EntityData {
    pub name: String,
    /// Edge of one square sprite frame, in pixels.
    pub image_size: u32,
    /// Non-square frame size for composite kinds.
    pub image_width: Option<u32>,
    pub image_height: Option<u32>,
    pub image_variants: Vec<String>,
    pub animations: HashMap<String, AnimationSpec>,
    flags: HashSet<String>,
    counters: HashMap<String, Counter>,
    values: HashMap<String, serde_json::Value>,
}

impl EntityData {
    /// Merge an indexed record (if any) with overrides. A missing record is
    /// not an error: the entity degrades to defaults.
    pub fn merged(record: Option<&ContentRecord>, overrides: Overrides) -> Self {
        let mut data = match record {
            Some(rec) => Self {
                name: rec.name.clone(),
                image_size: rec.image_size,
                image_width: rec.image_width,
                image_height: rec.image_height,
                image_variants: rec.image_variants.clone(),
                animations: rec.animations.clone(),
                flags: rec.flags.iter().cloned().collect(),
                counters: rec
                    .counters
                    .iter()
                    .map(|(name, def)| {
                        (
                            name.clone(),
                            Counter { value: def.value, min: def.min, max: def.max },
                        )
                    })
                    .collect(),
                values: rec.values.clone(),
            },
            None => Self {
                image_size: 40,
                ..Self::default()
            },
        };
        for flag in overrides.flags {
            data.flags.insert(flag);
        }
        for (name, value) in overrides.counters {
            data.set_counter(&name, value);
        }
        for (name, value) in overrides.values {
            data.values.insert(name, value);
        }
        data
    }

    /// Frame size in pixels, honoring non-square overrides.
    pub fn frame_size(&self) -> (u32, u32) {
        (
            self.image_width.unwrap_or(self.image_size),
            self.image_height.unwrap_or(self.image_size),
        )
    }

    pub fn has_flag(&self, flag: &str) -> bool {
        self.flags.contains(flag)
    }

    pub fn set_flag(&mut self, flag: impl Into<String>) {
        self.flags.insert(flag.into());
    }

    pub fn clear_flag(&mut self, flag: &str) -> bool {
        self.flags.remove(flag)
    }

    /// Current value of a counter, zero if it was never set.
    pub fn counter(&self, name: &str) -> i64 {
        self.counters.get(name).map(|c| c.value).unwrap_or(0)
    }

    /// Set a counter, creating it unbounded if absent. Existing bounds clamp.
    pub fn set_counter(&mut self, name: &str, value: i64) {
        self.counters
            .entry(name.to_string())
            .or_default()
            .set(value);
    }

    pub fn add_counter(&mut self, name: &str, delta: i64) {
        self.counters
            .entry(name.to_string())
            .or_default()
            .add(delta);
    }

    pub fn value(&self, name: &str) -> Option<&serde_json::Value> {
        self.values.get(name)
    }

    pub fn set_value(&mut self, name: impl Into<String>, value: serde_json::Value) {
        self.values.insert(name.into(), value);
    }
}
