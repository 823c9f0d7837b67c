use std::fmt;

use serde::{Deserialize, Serialize};

/// Discrete grid position expressed in square coordinates.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Position {
    pub x: i32,
    pub y: i32,
}

impl Position {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Roster discriminator. Doubles as the winner type at combat end.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    Party,
    Enemy,
}

impl Side {
    /// The roster an actor on this side fights against.
    pub fn opponent(self) -> Self {
        match self {
            Side::Party => Side::Enemy,
            Side::Enemy => Side::Party,
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Side::Party => write!(f, "party"),
            Side::Enemy => write!(f, "enemy"),
        }
    }
}

/// Addresses an actor by roster and position within it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorId {
    pub side: Side,
    pub index: usize,
}

impl ActorId {
    pub const fn party(index: usize) -> Self {
        Self { side: Side::Party, index }
    }

    pub const fn enemy(index: usize) -> Self {
        Self { side: Side::Enemy, index }
    }
}

impl fmt::Display for ActorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.side, self.index)
    }
}

/// One slot in the fixed initiative order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct InitiativeEntry {
    pub kind: Side,
    pub index: usize,
}

impl InitiativeEntry {
    pub fn actor_id(&self) -> ActorId {
        ActorId { side: self.kind, index: self.index }
    }
}

/// Per-turn resource flags gating what the active actor may still do.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionEconomy {
    pub standard: bool,
    #[serde(rename = "move")]
    pub movement: bool,
    pub bonus: bool,
    pub reaction: bool,
}

impl ActionEconomy {
    /// Restores the flags for a fresh turn.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// True once neither a standard action nor movement remains.
    pub fn exhausted(&self) -> bool {
        !self.standard && !self.movement
    }
}

impl Default for ActionEconomy {
    fn default() -> Self {
        Self { standard: true, movement: true, bonus: false, reaction: true }
    }
}
