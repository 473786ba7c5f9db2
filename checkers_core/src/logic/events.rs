use crate::engine::Move;
use crate::logic::board::{Color, Piece};
use serde::{Deserialize, Serialize};

/// Something that happened on the board, reported to the host as it happens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    PiecePlaced { row: usize, col: usize, piece: Piece },
    PieceMoved { mv: Move },
    PieceCaptured { row: usize, col: usize, piece: Piece },
    Promoted { row: usize, col: usize, color: Color },
    TurnPassed { to: Color },
    GameEnded { winner: Color },
}

pub trait GameObserver {
    fn on_event(&mut self, event: &GameEvent);
}

impl<F> GameObserver for F
where
    F: FnMut(&GameEvent),
{
    fn on_event(&mut self, event: &GameEvent) {
        self(event);
    }
}

/// Observer that keeps every event it receives.
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    pub events: Vec<GameEvent>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn drain(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}

impl GameObserver for EventLog {
    fn on_event(&mut self, event: &GameEvent) {
        self.events.push(event.clone());
    }
}
