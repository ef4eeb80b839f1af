use tracing::debug;

use super::config::ConfigError;
use super::input::{Direction, Intent};
use super::queue::{DrainQueue, Message};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GridSize {
    columns: u32,
    rows: u32,
}

impl GridSize {
    pub fn new(columns: u32, rows: u32) -> Result<Self, ConfigError> {
        if columns == 0 || rows == 0 {
            return Err(ConfigError::EmptyGrid { columns, rows });
        }
        Ok(Self { columns, rows })
    }

    pub fn columns(self) -> u32 {
        self.columns
    }

    pub fn rows(self) -> u32 {
        self.rows
    }

    pub fn contains(self, position: Position) -> bool {
        position.col < self.columns && position.row < self.rows
    }

    pub fn clamp(self, position: Position) -> Position {
        Position {
            col: position.col.min(self.columns - 1),
            row: position.row.min(self.rows - 1),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Position {
    pub col: u32,
    pub row: u32,
}

impl Position {
    pub const fn new(col: u32, row: u32) -> Self {
        Self { col, row }
    }

    /// One cell toward `direction`, truncated at the grid edge.
    pub fn stepped(self, direction: Direction, grid: GridSize) -> Self {
        let moved = match direction {
            Direction::Up => Self::new(self.col, self.row.saturating_sub(1)),
            Direction::Down => Self::new(self.col, self.row.saturating_add(1)),
            Direction::Left => Self::new(self.col.saturating_sub(1), self.row),
            Direction::Right => Self::new(self.col.saturating_add(1), self.row),
        };
        grid.clamp(moved)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SimAction {
    Move(Direction),
}

/// Tick-domain form of a captured intent. Applied once, inside a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimEvent {
    pub seq: u64,
    pub action: SimAction,
}

impl From<Message> for SimEvent {
    fn from(message: Message) -> Self {
        let action = match message.intent {
            Intent::Move(direction) => SimAction::Move(direction),
        };
        Self {
            seq: message.seq,
            action,
        }
    }
}

#[derive(Debug)]
pub struct SimulationState {
    grid: GridSize,
    position: Position,
    events: DrainQueue<SimEvent>,
    tick_count: u64,
}

impl SimulationState {
    pub fn new(grid: GridSize, start: Position) -> Self {
        Self {
            grid,
            position: grid.clamp(start),
            events: DrainQueue::new(),
            tick_count: 0,
        }
    }

    pub fn grid(&self) -> GridSize {
        self.grid
    }

    pub fn position(&self) -> Position {
        self.position
    }

    pub fn pending_events(&self) -> usize {
        self.events.len()
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn promote(&mut self, message: Message) {
        self.events.push(SimEvent::from(message));
    }

    /// Drains every pending event and applies them in order.
    /// Returns how many events were applied.
    pub fn run_tick(&mut self) -> usize {
        let batch = self.events.drain_all();
        let applied = batch.len();
        for event in batch {
            self.apply(event);
        }
        self.tick_count = self.tick_count.saturating_add(1);
        applied
    }

    fn apply(&mut self, event: SimEvent) {
        match event.action {
            SimAction::Move(direction) => {
                let from = self.position;
                self.position = from.stepped(direction, self.grid);
                debug!(
                    seq = event.seq,
                    ?direction,
                    from_col = from.col,
                    from_row = from.row,
                    col = self.position.col,
                    row = self.position.row,
                    tick = self.tick_count,
                    "move_applied"
                );
            }
        }
    }
}
