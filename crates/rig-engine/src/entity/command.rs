//! Deferred command queue.
//!
//! Mutators that need a fully-resolved sprite are recorded as small value
//! objects while the entity is still loading, then replayed FIFO exactly
//! once by a single dispatcher when loading completes. Value objects keep
//! the queue inspectable and avoid closures capturing the entity.

use std::collections::VecDeque;

use crate::api::types::Direction;
use crate::motion::easing::Easing;

/// One deferred mutator call.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    SetPosition { x: f32, y: f32, z: f32 },
    TranslateBy { dx: f32, dy: f32 },
    MoveTo { x: f32, y: f32, duration_ms: u32, easing: Easing, on_complete: Option<u32> },
    StopMoving,
    SetFrame(u32),
    SetDirection(Direction),
    SetVariant(String),
    PlayIdle { name: String },
    StopIdle,
    PlayAnimation { name: String, duration_ms: u32, on_complete: Option<u32> },
    /// Fire an event id once the entity has finished loading.
    NotifyReady(u32),
    /// Fire an event id once no movement or animation is in flight.
    NotifyDone(u32),
}

/// FIFO queue of deferred commands.
#[derive(Debug, Clone, Default)]
pub struct CommandQueue {
    items: VecDeque<Command>,
}

impl CommandQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, command: Command) {
        self.items.push_back(command);
    }

    /// Take every queued command, leaving the queue empty.
    pub fn drain(&mut self) -> Vec<Command> {
        self.items.drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drain_preserves_fifo_order() {
        let mut queue = CommandQueue::new();
        queue.push(Command::SetFrame(1));
        queue.push(Command::SetDirection(Direction::Left));
        queue.push(Command::SetFrame(2));

        let drained = queue.drain();
        assert_eq!(
            drained,
            vec![
                Command::SetFrame(1),
                Command::SetDirection(Direction::Left),
                Command::SetFrame(2),
            ]
        );
        assert!(queue.is_empty());
    }

    #[test]
    fn drain_empties_exactly_once() {
        let mut queue = CommandQueue::new();
        queue.push(Command::StopMoving);
        assert_eq!(queue.drain().len(), 1);
        assert_eq!(queue.drain().len(), 0);
    }
}
