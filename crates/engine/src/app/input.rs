use tracing::debug;
use winit::event::{ElementState, KeyEvent};
use winit::keyboard::{KeyCode, PhysicalKey};

use super::queue::MessageSink;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

/// Capture-domain input. Only recognized keys ever become an intent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Intent {
    Move(Direction),
}

/// Turns key-down events into intents on the message queue.
///
/// Holds an append-only handle; it never reads or drains the queue.
#[derive(Debug)]
pub struct InputCapture {
    sink: MessageSink,
    quit_requested: bool,
}

impl InputCapture {
    pub fn new(sink: MessageSink) -> Self {
        Self {
            sink,
            quit_requested: false,
        }
    }

    pub fn quit_requested(&self) -> bool {
        self.quit_requested
    }

    pub fn handle_key_event(&mut self, key_event: &KeyEvent) -> Option<u64> {
        self.handle_key(key_event.physical_key, key_event.state)
    }

    /// Returns the sequence number of the appended message, if one was queued.
    pub(crate) fn handle_key(&mut self, key: PhysicalKey, state: ElementState) -> Option<u64> {
        if state != ElementState::Pressed {
            return None;
        }
        if matches!(key, PhysicalKey::Code(KeyCode::Escape)) {
            self.quit_requested = true;
            return None;
        }

        let intent = intent_for_key(key)?;
        let seq = self.sink.append(intent);
        debug!(seq, ?intent, "intent_captured");
        Some(seq)
    }
}

pub(crate) fn intent_for_key(key: PhysicalKey) -> Option<Intent> {
    let direction = match key {
        PhysicalKey::Code(KeyCode::KeyW) | PhysicalKey::Code(KeyCode::ArrowUp) => Direction::Up,
        PhysicalKey::Code(KeyCode::KeyS) | PhysicalKey::Code(KeyCode::ArrowDown) => {
            Direction::Down
        }
        PhysicalKey::Code(KeyCode::KeyA) | PhysicalKey::Code(KeyCode::ArrowLeft) => {
            Direction::Left
        }
        PhysicalKey::Code(KeyCode::KeyD) | PhysicalKey::Code(KeyCode::ArrowRight) => {
            Direction::Right
        }
        _ => return None,
    };
    Some(Intent::Move(direction))
}
