//! Command stream between input capture and the player

use neon_core::{NeonError, Result};
use std::collections::VecDeque;

/// Something that can carry out player commands
pub trait CommandTarget {
    /// Apply an instantaneous upward impulse
    fn ascend(&mut self);
}

/// A queued player command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Ascend,
}

impl Command {
    pub fn execute(&self, target: &mut dyn CommandTarget) {
        match self {
            Command::Ascend => target.ascend(),
        }
    }
}

/// FIFO of commands. Filled by the controller, drained by the player.
#[derive(Debug, Default)]
pub struct CommandStream {
    queue: VecDeque<Command>,
}

impl CommandStream {
    pub fn new() -> Self {
        Self {
            queue: VecDeque::with_capacity(8),
        }
    }

    pub fn enqueue(&mut self, command: Command) {
        self.queue.push_back(command);
    }

    /// Remove and return the oldest command, if any
    pub fn try_dequeue(&mut self) -> Option<Command> {
        self.queue.pop_front()
    }

    /// Remove and return the oldest command, failing when the stream is empty
    pub fn dequeue(&mut self) -> Result<Command> {
        self.queue.pop_front().ok_or(NeonError::EmptyCommandStream)
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Drop every pending command
    pub fn clear(&mut self) {
        self.queue.clear();
    }
}
