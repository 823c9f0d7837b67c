//! Schema constants shared by the action space and the featurizer.
//!
//! These constants are the compatibility contract with trained policies:
//! changing any of them changes `N_ACT`/`N_OBS` and invalidates existing
//! checkpoints and rollout logs. [`SCHEMA_VERSION`] must be bumped whenever
//! they move, and the rollout logger stamps it into every session header.

/// Engine crate version, recorded in the rollout log session header.
pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Version tag for the observation/action layout.
pub const SCHEMA_VERSION: u32 = 1;

/// Maximum addressable target slots (nearest-first over the opposing roster).
pub const MAX_TARGETS: usize = 6;

/// Maximum attack records considered per actor.
pub const MAX_ATTACKS: usize = 6;

/// Maximum spell records considered per actor.
pub const MAX_SPELLS: usize = 6;

/// Maximum special-ability records considered per actor.
pub const MAX_ABILITIES: usize = 6;

/// Radius of the local window used for both MOVE offsets and terrain features.
pub const LOCAL_GRID_RADIUS: i32 = 5;

/// Side length of the local window.
pub const LOCAL_GRID_SIDE: usize = 2 * LOCAL_GRID_RADIUS as usize + 1;

/// Cell count of the local window.
pub const LOCAL_GRID_CELLS: usize = LOCAL_GRID_SIDE * LOCAL_GRID_SIDE;

/// Nearest allies exposed in the ally-awareness observation block.
pub const MAX_ALLIES: usize = 4;

// ----------------------------------------------------------------------------
// Feature scaling maxima
// ----------------------------------------------------------------------------
// Every scalar observation component is divided by one of these so the whole
// vector lands in [0, 1].

pub const MAX_HP: f32 = 500.0;
pub const MAX_AC: f32 = 30.0;
pub const MAX_SPEED_FT: f32 = 120.0;
pub const MAX_GRID_DIM: f32 = 50.0;
pub const MAX_ROUND: f32 = 50.0;
pub const MAX_DISTANCE: f32 = 50.0;
pub const MAX_DAMAGE: f32 = 100.0;
pub const MAX_DC: f32 = 30.0;

/// To-hit modifiers are shifted by this before scaling (modifiers down to -5
/// are representable).
pub const TO_HIT_SHIFT: f32 = 5.0;
pub const TO_HIT_SCALE: f32 = 20.0;

/// Flat reward component charged on every step.
pub const STEP_PENALTY: f32 = -0.2;
