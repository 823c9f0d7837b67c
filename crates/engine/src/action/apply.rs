//! Atomic action application.
//!
//! `apply_action` clones the state, re-validates the requested action against
//! the same rules the mask encodes (callers are not trusted), resolves it,
//! and returns the successor state with shaped reward components. Invalid
//! actions leave the clone untouched: no economy is consumed and no dice are
//! rolled.

use serde::{Deserialize, Serialize};

use crate::config::{MAX_ABILITIES, MAX_ATTACKS, MAX_SPELLS, STEP_PENALTY};
use crate::mechanics::{
    AbilityOutcome, Dice, apply_damage, range_squares, resolve_ability, resolve_attack,
    resolve_spell_attack, resolve_spell_save,
};
use crate::state::{ActorId, Condition, GameState, Position};

use super::mask::movement_budget;
use super::targeting::sorted_targets;
use super::{ActionSpec, ActionType};

/// Named addends of the per-step shaped reward.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct RewardComponents {
    pub damage_dealt: f32,
    pub damage_taken: f32,
    pub kills: u32,
    pub invalid_action: bool,
    pub step_penalty: f32,
    pub condition_applied: bool,
}

impl Default for RewardComponents {
    fn default() -> Self {
        Self {
            damage_dealt: 0.0,
            damage_taken: 0.0,
            kills: 0,
            invalid_action: false,
            step_penalty: STEP_PENALTY,
            condition_applied: false,
        }
    }
}

/// What the resolved action did, for logs and diagnostics.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ActionOutcome {
    Moved {
        from: Position,
        to: Position,
        squares: i32,
    },
    Attack {
        name: String,
        target: String,
        roll: i32,
        total: i32,
        target_ac: i32,
        hit: bool,
        crit: bool,
        crit_miss: bool,
        damage: i32,
    },
    Save {
        name: String,
        target: String,
        dc: i32,
        roll: i32,
        total: i32,
        saved: bool,
        damage: i32,
        #[serde(skip_serializing_if = "Option::is_none")]
        condition: Option<Condition>,
    },
    Utility {
        name: String,
    },
}

/// Per-application metadata surfaced through the environment's info record.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StepInfo {
    pub action_type: Option<ActionType>,
    pub action_valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<ActionOutcome>,
}

impl StepInfo {
    fn pending() -> Self {
        Self { action_type: None, action_valid: true, outcome: None }
    }

    fn invalid(&mut self) {
        self.action_valid = false;
    }
}

/// Applies one action for the acting enemy against a clone of `state`.
///
/// Returns `(next_state, reward_components, done, info)`. `done` reflects
/// whether either roster is fully down after the action.
pub fn apply_action(
    state: &GameState,
    enemy_idx: usize,
    action_index: usize,
    dice: &mut Dice,
) -> (GameState, RewardComponents, bool, StepInfo) {
    let mut next = state.clone();
    let mut components = RewardComponents::default();
    let mut info = StepInfo::pending();

    apply_inner(&mut next, enemy_idx, action_index, dice, &mut components, &mut info);
    if !info.action_valid {
        components.invalid_action = true;
    }

    let done = next.is_combat_over();
    (next, components, done, info)
}

fn apply_inner(
    next: &mut GameState,
    enemy_idx: usize,
    action_index: usize,
    dice: &mut Dice,
    components: &mut RewardComponents,
    info: &mut StepInfo,
) {
    if enemy_idx >= next.enemies.len() {
        return info.invalid();
    }
    let Some(spec) = ActionSpec::from_index(action_index) else {
        return info.invalid();
    };
    info.action_type = Some(spec.kind());

    let enemy_id = ActorId::enemy(enemy_idx);
    let enemy_pos = next.enemies[enemy_idx].pos;
    let square = next.grid.square_size_ft;

    match spec {
        ActionSpec::Move { move_offset: (dx, dy) } => {
            let step = dx.abs().max(dy.abs());
            let dest = Position::new(enemy_pos.x + dx, enemy_pos.y + dy);
            if !next.action_economy.movement
                || step > movement_budget(next, &next.enemies[enemy_idx])
                || next.is_blocked(dest.x, dest.y, Some(enemy_id))
            {
                return info.invalid();
            }

            next.enemies[enemy_idx].pos = dest;
            next.movement_used += step;
            let max_move = next.grid.squares_of_speed(next.enemies[enemy_idx].speed_ft);
            if next.movement_used >= max_move {
                next.action_economy.movement = false;
            }
            info.outcome = Some(ActionOutcome::Moved { from: enemy_pos, to: dest, squares: step });
        }

        ActionSpec::Attack { target_slot, attack_slot } => {
            let targets = sorted_targets(next, enemy_pos);
            if !next.action_economy.standard
                || target_slot >= targets.len()
                || attack_slot >= next.enemies[enemy_idx].attacks.len().min(MAX_ATTACKS)
            {
                return info.invalid();
            }
            let target = targets[target_slot];
            let attack = next.enemies[enemy_idx].attacks[attack_slot].clone();
            if target.distance > range_squares(attack.range_ft, square) {
                return info.invalid();
            }

            next.action_economy.standard = false;
            let outcome = resolve_attack(&next.party[target.index], &attack, dice);
            if outcome.hit {
                let report = apply_damage(&mut next.party[target.index], outcome.damage);
                components.damage_dealt = outcome.damage as f32;
                if report.downed {
                    components.kills = 1;
                }
            }
            info.outcome = Some(ActionOutcome::Attack {
                name: attack.name,
                target: next.party[target.index].name.clone(),
                roll: outcome.roll,
                total: outcome.total,
                target_ac: outcome.target_ac,
                hit: outcome.hit,
                crit: outcome.crit,
                crit_miss: outcome.crit_miss,
                damage: outcome.damage,
            });
        }

        ActionSpec::SpellAttack { target_slot, spell_slot } => {
            let targets = sorted_targets(next, enemy_pos);
            if !next.action_economy.standard
                || target_slot >= targets.len()
                || spell_slot >= next.enemies[enemy_idx].spells.len().min(MAX_SPELLS)
            {
                return info.invalid();
            }
            let target = targets[target_slot];
            let spell = next.enemies[enemy_idx].spells[spell_slot].clone();
            if !spell.is_attack() || target.distance > range_squares(spell.range_ft, square) {
                return info.invalid();
            }

            next.action_economy.standard = false;
            let outcome = resolve_spell_attack(&next.party[target.index], &spell, dice)
                .expect("type gate checked above");
            if outcome.hit {
                let report = apply_damage(&mut next.party[target.index], outcome.damage);
                components.damage_dealt = outcome.damage as f32;
                if report.downed {
                    components.kills = 1;
                }
            }
            info.outcome = Some(ActionOutcome::Attack {
                name: spell.name,
                target: next.party[target.index].name.clone(),
                roll: outcome.roll,
                total: outcome.total,
                target_ac: outcome.target_ac,
                hit: outcome.hit,
                crit: outcome.crit,
                crit_miss: outcome.crit_miss,
                damage: outcome.damage,
            });
        }

        ActionSpec::SpellSave { target_slot, spell_slot } => {
            let targets = sorted_targets(next, enemy_pos);
            if !next.action_economy.standard
                || target_slot >= targets.len()
                || spell_slot >= next.enemies[enemy_idx].spells.len().min(MAX_SPELLS)
            {
                return info.invalid();
            }
            let target = targets[target_slot];
            let spell = next.enemies[enemy_idx].spells[spell_slot].clone();
            if !spell.is_save() || target.distance > range_squares(spell.range_ft, square) {
                return info.invalid();
            }

            next.action_economy.standard = false;
            let outcome = resolve_spell_save(&next.party[target.index], &spell, dice)
                .expect("type gate checked above");
            let report = apply_damage(&mut next.party[target.index], outcome.damage);
            components.damage_dealt = outcome.damage as f32;
            if report.downed {
                components.kills = 1;
            }
            info.outcome = Some(ActionOutcome::Save {
                name: spell.name,
                target: next.party[target.index].name.clone(),
                dc: outcome.dc,
                roll: outcome.roll,
                total: outcome.total,
                saved: outcome.saved,
                damage: outcome.damage,
                condition: None,
            });
        }

        ActionSpec::Ability { target_slot, ability_slot } => {
            let targets = sorted_targets(next, enemy_pos);
            if !next.action_economy.standard
                || target_slot >= targets.len()
                || ability_slot >= next.enemies[enemy_idx].special_abilities.len().min(MAX_ABILITIES)
            {
                return info.invalid();
            }
            let target = targets[target_slot];
            let ability = next.enemies[enemy_idx].special_abilities[ability_slot].clone();
            if !next.enemies[enemy_idx].ability_available(&ability)
                || target.distance > range_squares(ability.range_ft, square)
            {
                return info.invalid();
            }

            next.action_economy.standard = false;
            match resolve_ability(&next.party[target.index], &ability, dice) {
                AbilityOutcome::Attack(outcome) => {
                    if outcome.hit {
                        let report = apply_damage(&mut next.party[target.index], outcome.damage);
                        components.damage_dealt = outcome.damage as f32;
                        if report.downed {
                            components.kills = 1;
                        }
                    }
                    info.outcome = Some(ActionOutcome::Attack {
                        name: ability.name.clone(),
                        target: next.party[target.index].name.clone(),
                        roll: outcome.roll,
                        total: outcome.total,
                        target_ac: outcome.target_ac,
                        hit: outcome.hit,
                        crit: outcome.crit,
                        crit_miss: outcome.crit_miss,
                        damage: outcome.damage,
                    });
                }
                AbilityOutcome::Save { roll, condition } => {
                    if roll.damage > 0 {
                        let report = apply_damage(&mut next.party[target.index], roll.damage);
                        components.damage_dealt = roll.damage as f32;
                        if report.downed {
                            components.kills = 1;
                        }
                    }
                    if let Some(condition) = condition {
                        components.condition_applied =
                            next.party[target.index].add_condition(condition);
                    }
                    info.outcome = Some(ActionOutcome::Save {
                        name: ability.name.clone(),
                        target: next.party[target.index].name.clone(),
                        dc: roll.dc,
                        roll: roll.roll,
                        total: roll.total,
                        saved: roll.saved,
                        damage: roll.damage,
                        condition,
                    });
                }
                AbilityOutcome::Utility => {
                    info.outcome = Some(ActionOutcome::Utility { name: ability.name.clone() });
                }
            }

            if ability.recharge {
                next.enemies[enemy_idx].expend_recharge(&ability.name);
            }
            if let Some(total) = ability.uses {
                next.enemies[enemy_idx].expend_use(&ability.name, total);
            }
        }

        ActionSpec::Dodge => {
            if !next.action_economy.standard {
                return info.invalid();
            }
            next.action_economy.standard = false;
            next.enemies[enemy_idx].dodging = true;
        }

        ActionSpec::Dash => {
            if !next.action_economy.standard {
                return info.invalid();
            }
            next.action_economy.standard = false;
            next.enemies[enemy_idx].dashing = true;
            // A dash buys a fresh movement allotment rather than scaling the
            // budget formula.
            next.movement_used = 0;
            next.action_economy.movement = true;
        }

        ActionSpec::Disengage => {
            if !next.action_economy.standard {
                return info.invalid();
            }
            next.action_economy.standard = false;
            next.enemies[enemy_idx].disengaging = true;
        }

        ActionSpec::EndTurn => {
            // No state change; the environment advances initiative.
        }
    }
}
