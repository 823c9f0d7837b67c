//! Featurization: game state to a fixed-size observation vector.
//!
//! `featurize` is a pure function of `(state, active enemy)`. The block
//! layout below is the other half of the model-compatibility contract (the
//! action space is the first); every component is scaled into `[0, 1]`.

use strum::{EnumCount, IntoEnumIterator};

use crate::config::{
    LOCAL_GRID_CELLS, LOCAL_GRID_RADIUS, LOCAL_GRID_SIDE, MAX_ABILITIES, MAX_AC, MAX_ALLIES,
    MAX_ATTACKS, MAX_DAMAGE, MAX_DC, MAX_DISTANCE, MAX_GRID_DIM, MAX_HP, MAX_ROUND, MAX_SPEED_FT,
    MAX_SPELLS, MAX_TARGETS, TO_HIT_SCALE, TO_HIT_SHIFT,
};
use crate::mechanics::{average_damage, chebyshev, range_squares};
use crate::state::{
    AbilityEffect, Actor, AttackKind, BLOCKED_MOVE_COST, Condition, GameState, Position, Side,
    SpellEffect,
};
use crate::traits::{NUM_TRAIT_FLAGS, trait_flags};

// ----------------------------------------------------------------------------
// Observation layout
// ----------------------------------------------------------------------------

pub const GLOBAL_START: usize = 0;
pub const GLOBAL_SIZE: usize = 4;

pub const SELF_START: usize = GLOBAL_START + GLOBAL_SIZE;
pub const NUM_CONDITIONS: usize = Condition::COUNT;
pub const SELF_SIZE: usize = 10 + NUM_CONDITIONS + NUM_TRAIT_FLAGS;

pub const TERRAIN_START: usize = SELF_START + SELF_SIZE;
pub const TERRAIN_FEATURES_PER_CELL: usize = 3;
pub const TERRAIN_SIZE: usize = LOCAL_GRID_CELLS * TERRAIN_FEATURES_PER_CELL;

pub const TARGETS_START: usize = TERRAIN_START + TERRAIN_SIZE;
pub const TARGET_FEATURES: usize = 8;
pub const TARGETS_SIZE: usize = MAX_TARGETS * TARGET_FEATURES;

pub const ATTACKS_START: usize = TARGETS_START + TARGETS_SIZE;
pub const ATTACK_FEATURES: usize = 4;
pub const ATTACKS_SIZE: usize = MAX_ATTACKS * ATTACK_FEATURES;

pub const SPELLS_START: usize = ATTACKS_START + ATTACKS_SIZE;
pub const SPELL_FEATURES: usize = 5;
pub const SPELLS_SIZE: usize = MAX_SPELLS * SPELL_FEATURES;

pub const ABILITIES_START: usize = SPELLS_START + SPELLS_SIZE;
pub const ABILITY_FEATURES: usize = 5;
pub const ABILITIES_SIZE: usize = MAX_ABILITIES * ABILITY_FEATURES;

pub const ALLIES_START: usize = ABILITIES_START + ABILITIES_SIZE;
pub const ALLY_FEATURES: usize = 3;
pub const ALLIES_SIZE: usize = MAX_ALLIES * ALLY_FEATURES;

/// Total observation size.
pub const N_OBS: usize = ALLIES_START + ALLIES_SIZE;

// Checkpoint compatibility: the default schema constants produce exactly this
// layout. See `config::SCHEMA_VERSION`.
const _: () = assert!(SELF_SIZE == 30);
const _: () = assert!(N_OBS == 541);

fn clamp01(value: f32) -> f32 {
    value.clamp(0.0, 1.0)
}

fn scale(value: f32, max: f32) -> f32 {
    if max <= 0.0 {
        return 0.0;
    }
    clamp01(value / max)
}

fn scale_to_hit(to_hit: i32) -> f32 {
    clamp01((to_hit as f32 + TO_HIT_SHIFT) / TO_HIT_SCALE)
}

fn flag(value: bool) -> f32 {
    if value { 1.0 } else { 0.0 }
}

fn hp_fraction(actor: &Actor) -> f32 {
    clamp01(actor.hp as f32 / actor.max_hp.max(1) as f32)
}

/// Longest melee reach among the actor's attacks, in squares, floored at one.
fn best_melee_range(actor: &Actor, square: i32) -> i32 {
    actor
        .attacks
        .iter()
        .filter(|a| a.attack_type.is_melee())
        .map(|a| range_squares(a.range_ft, square))
        .max()
        .unwrap_or(1)
        .max(1)
}

/// Highest average damage among the actor's attacks.
fn best_attack_damage(actor: &Actor) -> f32 {
    actor
        .attacks
        .iter()
        .map(|a| average_damage(&a.damage))
        .fold(0.0, f32::max)
}

/// Alive allies of the acting enemy adjacent to a target position.
fn allies_adjacent_to(state: &GameState, active_enemy_idx: usize, target_pos: Position) -> usize {
    state
        .alive(Side::Enemy)
        .filter(|&(i, _)| i != active_enemy_idx)
        .filter(|(_, ally)| chebyshev(ally.pos, target_pos) <= 1)
        .count()
}

/// Converts the state, seen by the active enemy, into the observation vector.
///
/// Deterministic, allocation-light, and total: an out-of-range enemy index
/// yields the all-zero vector.
pub fn featurize(state: &GameState, active_enemy_idx: usize) -> Vec<f32> {
    let mut obs = vec![0.0f32; N_OBS];

    let Some(enemy) = state.enemies.get(active_enemy_idx) else {
        return obs;
    };
    let square = state.grid.square_size_ft;

    // Global.
    obs[GLOBAL_START] = scale(state.round as f32, MAX_ROUND);
    obs[GLOBAL_START + 1] = flag(state.in_combat);
    obs[GLOBAL_START + 2] = scale(state.grid.width as f32, MAX_GRID_DIM);
    obs[GLOBAL_START + 3] = scale(state.grid.height as f32, MAX_GRID_DIM);

    // Self.
    let idx = SELF_START;
    obs[idx] = hp_fraction(enemy);
    obs[idx + 1] = scale(enemy.ac as f32, MAX_AC);
    obs[idx + 2] = scale(enemy.speed_ft as f32, MAX_SPEED_FT);
    obs[idx + 3] = scale(enemy.pos.x as f32, MAX_GRID_DIM);
    obs[idx + 4] = scale(enemy.pos.y as f32, MAX_GRID_DIM);
    obs[idx + 5] = flag(state.action_economy.standard);
    obs[idx + 6] = flag(state.action_economy.movement);
    obs[idx + 7] = flag(state.action_economy.bonus);
    obs[idx + 8] = flag(state.action_economy.reaction);
    let max_move = state.grid.squares_of_speed(enemy.speed_ft);
    let remaining = (max_move - state.movement_used).max(0);
    obs[idx + 9] = if max_move > 0 { remaining as f32 / max_move as f32 } else { 0.0 };
    for (i, condition) in Condition::iter().enumerate() {
        obs[idx + 10 + i] = flag(enemy.has_condition(condition));
    }
    for (i, set) in trait_flags(&enemy.traits).into_iter().enumerate() {
        obs[idx + 10 + NUM_CONDITIONS + i] = flag(set);
    }

    // Local terrain, row-major with the top-left at (x - R, y - R).
    for local_y in 0..LOCAL_GRID_SIDE as i32 {
        for local_x in 0..LOCAL_GRID_SIDE as i32 {
            let world_x = enemy.pos.x + local_x - LOCAL_GRID_RADIUS;
            let world_y = enemy.pos.y + local_y - LOCAL_GRID_RADIUS;
            let cell_idx = (local_y * LOCAL_GRID_SIDE as i32 + local_x) as usize;
            let base = TERRAIN_START + cell_idx * TERRAIN_FEATURES_PER_CELL;

            match state.grid.cell(world_x, world_y) {
                None => {
                    obs[base] = 1.0;
                    obs[base + 1] = 1.0;
                }
                Some(cell) => {
                    let cost = cell.tile.move_cost();
                    obs[base] = flag(cell.tile.is_blocked());
                    obs[base + 1] =
                        clamp01((cost - 1) as f32 / (BLOCKED_MOVE_COST - 1) as f32);
                    obs[base + 2] = flag(cell.hazard.is_some());
                }
            }
        }
    }

    // Target slots, nearest first.
    let targets = crate::action::sorted_targets(state, enemy.pos);
    let melee_reach = best_melee_range(enemy, square);
    let own_best_damage = best_attack_damage(enemy);
    for (slot, target) in targets.iter().enumerate() {
        let base = TARGETS_START + slot * TARGET_FEATURES;
        let actor = &state.party[target.index];
        obs[base] = hp_fraction(actor);
        obs[base + 1] = scale(actor.ac as f32, MAX_AC);
        obs[base + 2] = scale(target.distance as f32, MAX_DISTANCE);
        obs[base + 3] = flag(target.distance <= max_move + melee_reach);
        obs[base + 4] = flag(target.distance <= melee_reach);
        obs[base + 5] = scale(own_best_damage, MAX_DAMAGE);
        let adjacent = allies_adjacent_to(state, active_enemy_idx, actor.pos);
        obs[base + 6] = clamp01(adjacent as f32 / 3.0);
        obs[base + 7] = scale(best_attack_damage(actor), MAX_DAMAGE);
    }

    // Attack options.
    for (slot, attack) in enemy.attacks.iter().take(MAX_ATTACKS).enumerate() {
        let base = ATTACKS_START + slot * ATTACK_FEATURES;
        obs[base] = scale(attack.range_ft as f32 / square.max(1) as f32, MAX_DISTANCE);
        obs[base + 1] = scale(average_damage(&attack.damage), MAX_DAMAGE);
        obs[base + 2] = scale_to_hit(attack.to_hit);
        obs[base + 3] = flag(attack.attack_type == AttackKind::Ranged);
    }

    // Spell options.
    for (slot, spell) in enemy.spells.iter().take(MAX_SPELLS).enumerate() {
        let base = SPELLS_START + slot * SPELL_FEATURES;
        obs[base + 1] = scale(spell.range_ft as f32 / square.max(1) as f32, MAX_DISTANCE);
        obs[base + 2] = scale(average_damage(&spell.damage), MAX_DAMAGE);
        match spell.effect {
            SpellEffect::Attack { to_hit } => {
                obs[base] = 0.0;
                obs[base + 3] = scale_to_hit(to_hit);
            }
            SpellEffect::Save { dc, .. } => {
                obs[base] = 1.0;
                obs[base + 3] = scale(dc as f32, MAX_DC);
            }
        }
        obs[base + 4] = 1.0;
    }

    // Special-ability options.
    for (slot, ability) in enemy.special_abilities.iter().take(MAX_ABILITIES).enumerate() {
        let base = ABILITIES_START + slot * ABILITY_FEATURES;
        let (kind, dc) = match ability.effect {
            AbilityEffect::Attack { .. } => (0.0, 0),
            AbilityEffect::Save { dc, .. } => (0.5, dc),
            AbilityEffect::Utility => (1.0, 0),
        };
        obs[base] = kind;
        obs[base + 1] = scale(ability.range_ft as f32 / square.max(1) as f32, MAX_DISTANCE);
        obs[base + 2] = scale(average_damage(&ability.damage), MAX_DAMAGE);
        obs[base + 3] = scale(dc as f32, MAX_DC);
        obs[base + 4] = flag(enemy.ability_available(ability));
    }

    // Ally awareness: nearest alive allies.
    let mut allies: Vec<(i32, &Actor)> = state
        .alive(Side::Enemy)
        .filter(|&(i, _)| i != active_enemy_idx)
        .map(|(_, ally)| (chebyshev(enemy.pos, ally.pos), ally))
        .collect();
    allies.sort_by_key(|&(dist, _)| dist);
    for (slot, (dist, ally)) in allies.into_iter().take(MAX_ALLIES).enumerate() {
        let base = ALLIES_START + slot * ALLY_FEATURES;
        obs[base] = scale(dist as f32, MAX_DISTANCE);
        obs[base + 1] = hp_fraction(ally);
        obs[base + 2] = 1.0;
    }

    obs
}
