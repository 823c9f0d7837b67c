//! Deterministic mechanics kernel: dice, geometry, resolution, upkeep, and
//! the scripted party turn.

mod dice;
mod grid;
mod party;
mod resolve;
mod upkeep;

pub use dice::{Dice, DiceExpr, average_damage};
pub use grid::{chebyshev, dijkstra_reachable, range_squares};
pub use party::{PartyTurn, party_scripted_turn};
pub use resolve::{
    AbilityOutcome, AttackRoll, DamageReport, SaveRoll, apply_damage, attack_roll, resolve_ability,
    resolve_attack, resolve_spell_attack, resolve_spell_save, save_roll,
};
pub use upkeep::{check_ability_recharge, process_start_of_turn};
