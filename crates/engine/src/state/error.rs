//! State validation errors.

use super::{ActorId, Position};

/// Structural faults in an initial state. Surfaced at environment reset;
/// the engine refuses to run a malformed scenario.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum StateError {
    #[error("{actor} at {pos} is outside the {width}x{height} grid")]
    OutOfBounds { actor: ActorId, pos: Position, width: i32, height: i32 },

    #[error("{actor} occupies impassable terrain at {pos}")]
    BlockedTerrain { actor: ActorId, pos: Position },

    #[error("{first} and {second} both occupy {pos}")]
    DuplicateOccupation { first: ActorId, second: ActorId, pos: Position },

    #[error("initiative entry {entry} references missing {actor}")]
    DanglingInitiative { entry: usize, actor: ActorId },

    #[error("{actor} has hp {hp} outside [0, {max_hp}]")]
    HpOutOfRange { actor: ActorId, hp: i32, max_hp: i32 },

    #[error("initiative order is empty")]
    EmptyInitiative,

    #[error("grid cell array is {rows}x{cols}, expected {height}x{width}")]
    MalformedGrid { rows: usize, cols: usize, width: i32, height: i32 },
}
