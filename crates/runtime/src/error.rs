//! Runtime error types.

use skirmish_engine::StateError;

/// Scenario construction failures.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ScenarioError {
    #[error("scenario requires at least one actor per roster")]
    EmptyRoster,

    #[error("grid {width}x{height} is too small for the requested rosters")]
    GridTooSmall { width: i32, height: i32 },

    #[error("generated state is malformed: {0}")]
    Invalid(#[from] StateError),
}

/// Environment driver failures.
///
/// Only lifecycle misuse and malformed scenarios surface as errors; invalid
/// action indices are part of normal stepping and are reported through
/// reward components instead.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum EnvError {
    #[error("environment has not been reset")]
    NotReset,

    #[error("episode is over; call reset to start a new one")]
    EpisodeOver,

    #[error(transparent)]
    Scenario(#[from] ScenarioError),
}
