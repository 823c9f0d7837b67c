//! Discrete action space.
//!
//! The space is a fixed concatenation of contiguous sub-ranges: local MOVE
//! offsets, then target x slot grids for attacks, attack spells, save spells,
//! and special abilities, then four singleton actions. The sub-range layout
//! is part of the model-compatibility contract alongside the observation
//! layout; see [`crate::config::SCHEMA_VERSION`].

mod apply;
mod mask;
mod targeting;

pub use apply::{ActionOutcome, RewardComponents, StepInfo, apply_action};
pub use mask::{action_mask, movement_budget, valid_move_offsets};
pub use targeting::{TargetSlot, sorted_targets};

use serde::{Deserialize, Serialize};
use strum::Display;

use crate::config::{
    LOCAL_GRID_CELLS, LOCAL_GRID_RADIUS, LOCAL_GRID_SIDE, MAX_ABILITIES, MAX_ATTACKS, MAX_SPELLS,
    MAX_TARGETS,
};

// ----------------------------------------------------------------------------
// Sub-range boundaries
// ----------------------------------------------------------------------------

pub const MOVE_START: usize = 0;
pub const MOVE_COUNT: usize = LOCAL_GRID_CELLS - 1;

pub const ATTACK_START: usize = MOVE_START + MOVE_COUNT;
pub const ATTACK_COUNT: usize = MAX_TARGETS * MAX_ATTACKS;

pub const SPELL_ATTACK_START: usize = ATTACK_START + ATTACK_COUNT;
pub const SPELL_ATTACK_COUNT: usize = MAX_TARGETS * MAX_SPELLS;

pub const SPELL_SAVE_START: usize = SPELL_ATTACK_START + SPELL_ATTACK_COUNT;
pub const SPELL_SAVE_COUNT: usize = MAX_TARGETS * MAX_SPELLS;

pub const ABILITY_START: usize = SPELL_SAVE_START + SPELL_SAVE_COUNT;
pub const ABILITY_COUNT: usize = MAX_TARGETS * MAX_ABILITIES;

pub const DODGE_INDEX: usize = ABILITY_START + ABILITY_COUNT;
pub const DASH_INDEX: usize = DODGE_INDEX + 1;
pub const DISENGAGE_INDEX: usize = DASH_INDEX + 1;
pub const END_TURN_INDEX: usize = DISENGAGE_INDEX + 1;

/// Total size of the discrete action space.
pub const N_ACT: usize = END_TURN_INDEX + 1;

// Checkpoint compatibility: with the default schema constants the space has
// exactly this many indices. A drifted constant fails here instead of
// silently desynchronizing trained policies.
const _: () = assert!(N_ACT == 268);

/// The local window cell representing the zero offset, which MOVE skips.
const MOVE_CENTER: usize = LOCAL_GRID_CELLS / 2;

/// Coarse action classification, used in step info and logs.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, Display)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    Move,
    Attack,
    SpellAttack,
    SpellSave,
    Ability,
    Dodge,
    Dash,
    Disengage,
    EndTurn,
}

/// A structured action, bidirectionally mapped to an index in `[0, N_ACT)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action_type", rename_all = "snake_case")]
pub enum ActionSpec {
    Move { move_offset: (i32, i32) },
    Attack { target_slot: usize, attack_slot: usize },
    SpellAttack { target_slot: usize, spell_slot: usize },
    SpellSave { target_slot: usize, spell_slot: usize },
    Ability { target_slot: usize, ability_slot: usize },
    Dodge,
    Dash,
    Disengage,
    EndTurn,
}

impl ActionSpec {
    pub fn kind(&self) -> ActionType {
        match self {
            ActionSpec::Move { .. } => ActionType::Move,
            ActionSpec::Attack { .. } => ActionType::Attack,
            ActionSpec::SpellAttack { .. } => ActionType::SpellAttack,
            ActionSpec::SpellSave { .. } => ActionType::SpellSave,
            ActionSpec::Ability { .. } => ActionType::Ability,
            ActionSpec::Dodge => ActionType::Dodge,
            ActionSpec::Dash => ActionType::Dash,
            ActionSpec::Disengage => ActionType::Disengage,
            ActionSpec::EndTurn => ActionType::EndTurn,
        }
    }

    /// Decodes an action index. `None` outside `[0, N_ACT)`.
    pub fn from_index(index: usize) -> Option<Self> {
        match index {
            i if i < ATTACK_START => {
                let (dx, dy) = move_index_to_offset(i - MOVE_START);
                Some(ActionSpec::Move { move_offset: (dx, dy) })
            }
            i if i < SPELL_ATTACK_START => {
                let slot = i - ATTACK_START;
                Some(ActionSpec::Attack {
                    target_slot: slot / MAX_ATTACKS,
                    attack_slot: slot % MAX_ATTACKS,
                })
            }
            i if i < SPELL_SAVE_START => {
                let slot = i - SPELL_ATTACK_START;
                Some(ActionSpec::SpellAttack {
                    target_slot: slot / MAX_SPELLS,
                    spell_slot: slot % MAX_SPELLS,
                })
            }
            i if i < ABILITY_START => {
                let slot = i - SPELL_SAVE_START;
                Some(ActionSpec::SpellSave {
                    target_slot: slot / MAX_SPELLS,
                    spell_slot: slot % MAX_SPELLS,
                })
            }
            i if i < DODGE_INDEX => {
                let slot = i - ABILITY_START;
                Some(ActionSpec::Ability {
                    target_slot: slot / MAX_ABILITIES,
                    ability_slot: slot % MAX_ABILITIES,
                })
            }
            DODGE_INDEX => Some(ActionSpec::Dodge),
            DASH_INDEX => Some(ActionSpec::Dash),
            DISENGAGE_INDEX => Some(ActionSpec::Disengage),
            END_TURN_INDEX => Some(ActionSpec::EndTurn),
            _ => None,
        }
    }

    /// Encodes this action back to its index.
    pub fn index(&self) -> usize {
        match *self {
            ActionSpec::Move { move_offset: (dx, dy) } => {
                MOVE_START + offset_to_move_index(dx, dy).expect("offset within the local window")
            }
            ActionSpec::Attack { target_slot, attack_slot } => {
                ATTACK_START + target_slot * MAX_ATTACKS + attack_slot
            }
            ActionSpec::SpellAttack { target_slot, spell_slot } => {
                SPELL_ATTACK_START + target_slot * MAX_SPELLS + spell_slot
            }
            ActionSpec::SpellSave { target_slot, spell_slot } => {
                SPELL_SAVE_START + target_slot * MAX_SPELLS + spell_slot
            }
            ActionSpec::Ability { target_slot, ability_slot } => {
                ABILITY_START + target_slot * MAX_ABILITIES + ability_slot
            }
            ActionSpec::Dodge => DODGE_INDEX,
            ActionSpec::Dash => DASH_INDEX,
            ActionSpec::Disengage => DISENGAGE_INDEX,
            ActionSpec::EndTurn => END_TURN_INDEX,
        }
    }
}

/// Maps a nonzero local offset to its MOVE sub-index, skipping the center
/// cell.
pub fn offset_to_move_index(dx: i32, dy: i32) -> Option<usize> {
    if dx == 0 && dy == 0 {
        return None;
    }
    if dx.abs() > LOCAL_GRID_RADIUS || dy.abs() > LOCAL_GRID_RADIUS {
        return None;
    }
    let raw =
        ((dy + LOCAL_GRID_RADIUS) * LOCAL_GRID_SIDE as i32 + (dx + LOCAL_GRID_RADIUS)) as usize;
    Some(if raw > MOVE_CENTER { raw - 1 } else { raw })
}

/// Inverse of [`offset_to_move_index`].
fn move_index_to_offset(index: usize) -> (i32, i32) {
    debug_assert!(index < MOVE_COUNT);
    let raw = if index >= MOVE_CENTER { index + 1 } else { index };
    let dx = (raw % LOCAL_GRID_SIDE) as i32 - LOCAL_GRID_RADIUS;
    let dy = (raw / LOCAL_GRID_SIDE) as i32 - LOCAL_GRID_RADIUS;
    (dx, dy)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_index_round_trips() {
        for index in 0..N_ACT {
            let spec = ActionSpec::from_index(index).expect("index in range decodes");
            assert_eq!(spec.index(), index, "round trip failed at {index} ({spec:?})");
        }
        assert_eq!(ActionSpec::from_index(N_ACT), None);
    }

    #[test]
    fn move_encoding_skips_the_zero_offset() {
        assert_eq!(offset_to_move_index(0, 0), None);
        assert_eq!(offset_to_move_index(LOCAL_GRID_RADIUS + 1, 0), None);

        let mut seen = vec![false; MOVE_COUNT];
        for dy in -LOCAL_GRID_RADIUS..=LOCAL_GRID_RADIUS {
            for dx in -LOCAL_GRID_RADIUS..=LOCAL_GRID_RADIUS {
                if dx == 0 && dy == 0 {
                    continue;
                }
                let index = offset_to_move_index(dx, dy).unwrap();
                assert!(!seen[index], "offset ({dx},{dy}) collides");
                seen[index] = true;
                assert_eq!(move_index_to_offset(index), (dx, dy));
            }
        }
        assert!(seen.iter().all(|&s| s));
    }

    #[test]
    fn sub_ranges_tile_the_space() {
        assert_eq!(MOVE_COUNT, 120);
        assert_eq!(ATTACK_START, 120);
        assert_eq!(SPELL_ATTACK_START, 156);
        assert_eq!(SPELL_SAVE_START, 192);
        assert_eq!(ABILITY_START, 228);
        assert_eq!(DODGE_INDEX, 264);
        assert_eq!(END_TURN_INDEX, 267);
        assert_eq!(N_ACT, 268);
    }

    #[test]
    fn specs_serialize_with_a_type_tag() {
        let json = serde_json::to_value(ActionSpec::Attack { target_slot: 1, attack_slot: 2 })
            .unwrap();
        assert_eq!(json["action_type"], "attack");
        assert_eq!(json["target_slot"], 1);

        let json = serde_json::to_value(ActionSpec::EndTurn).unwrap();
        assert_eq!(json["action_type"], "end_turn");
    }
}
