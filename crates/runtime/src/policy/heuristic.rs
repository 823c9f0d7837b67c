//! Utility-scored heuristic policy.
//!
//! The baseline non-learned opponent. It works purely from the public
//! contract — validity mask, target ranking, and average-damage estimates —
//! in three phases: pick the best-expected-damage attack or spell, otherwise
//! close distance (or open it, for hit-and-run actors that already attacked),
//! otherwise dodge or end the turn.

use skirmish_engine::action::{
    DODGE_INDEX, END_TURN_INDEX, MOVE_START, offset_to_move_index, valid_move_offsets,
};
use skirmish_engine::config::{MAX_ATTACKS, MAX_SPELLS};
use skirmish_engine::{
    ActionSpec, Actor, AttackKind, AttackRecord, Dice, GameState, Position, SpellEffect,
    SpellRecord, TraitCatalog, TraitModifiers, action_mask, average_damage, chebyshev,
    range_squares, sorted_targets,
};

use super::EnemyPolicy;

const KILL_BONUS: f32 = 1.5;
const TYPE_PREFERENCE_BONUS: f32 = 1.2;
const DAMAGE_PREFERENCE_BONUS: f32 = 1.1;
const CONTROL_PREFERENCE_BONUS: f32 = 1.2;
const RANGED_STANDOFF_BONUS: f32 = 1.1;

/// Catalog-configured heuristic enemy.
#[derive(Clone, Debug, Default)]
pub struct HeuristicPolicy {
    catalog: TraitCatalog,
}

impl HeuristicPolicy {
    pub fn new(catalog: TraitCatalog) -> Self {
        Self { catalog }
    }
}

/// Probability that `d20 + to_hit` clears `ac`, clamped to the nat-1/nat-20
/// band.
fn hit_probability(to_hit: i32, ac: i32) -> f32 {
    let needed = ac - to_hit;
    ((21 - needed) as f32 / 20.0).clamp(0.05, 0.95)
}

/// Probability that the target fails a save against `dc`.
fn fail_probability(dc: i32, save_mod: i32) -> f32 {
    let needed = dc - save_mod;
    ((needed - 1) as f32 / 20.0).clamp(0.05, 0.95)
}

/// Expected damage of a weapon attack, zero when out of range.
fn attack_utility(attack: &AttackRecord, target: &Actor, distance: i32, square: i32) -> f32 {
    if distance > range_squares(attack.range_ft, square) {
        return 0.0;
    }
    let mut expected = average_damage(&attack.damage) * hit_probability(attack.to_hit, target.ac);
    if expected >= target.hp as f32 {
        expected *= KILL_BONUS;
    }
    if attack.attack_type == AttackKind::Ranged && distance > 2 {
        expected *= RANGED_STANDOFF_BONUS;
    }
    expected
}

/// Expected damage of a spell, blending full and half damage for saves.
fn spell_utility(spell: &SpellRecord, target: &Actor, distance: i32, square: i32) -> f32 {
    if distance > range_squares(spell.range_ft, square) {
        return 0.0;
    }
    let avg = average_damage(&spell.damage);
    let mut expected = match spell.effect {
        SpellEffect::Attack { to_hit } => avg * hit_probability(to_hit, target.ac),
        SpellEffect::Save { dc, save } => {
            let fail = fail_probability(dc, target.abilities.modifier(save));
            avg * fail + (avg / 2.0) * (1.0 - fail)
        }
    };
    if expected >= target.hp as f32 {
        expected *= KILL_BONUS;
    }
    expected
}

impl EnemyPolicy for HeuristicPolicy {
    fn select(&self, state: &GameState, enemy_idx: usize, _dice: &mut Dice) -> usize {
        let Some(enemy) = state.enemies.get(enemy_idx) else {
            return END_TURN_INDEX;
        };
        let mask = action_mask(state, enemy_idx);
        let targets = sorted_targets(state, enemy.pos);
        let mods: TraitModifiers = self.catalog.modifiers_for(&enemy.traits);
        let square = state.grid.square_size_ft;
        let has_standard = state.action_economy.standard;
        let has_move = state.action_economy.movement;

        // Phase 1: best attack or spell by expected damage.
        let mut best_action = None;
        let mut best_utility = 0.0f32;
        if has_standard {
            for (target_slot, target) in targets.iter().enumerate() {
                let victim = &state.party[target.index];

                for (attack_slot, attack) in enemy.attacks.iter().take(MAX_ATTACKS).enumerate() {
                    let mut utility = attack_utility(attack, victim, target.distance, square);
                    if mods.prefer_melee && attack.attack_type == AttackKind::Melee {
                        utility *= TYPE_PREFERENCE_BONUS;
                    }
                    if mods.prefer_ranged && attack.attack_type == AttackKind::Ranged {
                        utility *= TYPE_PREFERENCE_BONUS;
                    }
                    if mods.prefer_damage {
                        utility *= DAMAGE_PREFERENCE_BONUS;
                    }
                    if utility > best_utility {
                        let index = ActionSpec::Attack { target_slot, attack_slot }.index();
                        if mask[index] {
                            best_utility = utility;
                            best_action = Some(index);
                        }
                    }
                }

                for (spell_slot, spell) in enemy.spells.iter().take(MAX_SPELLS).enumerate() {
                    let mut utility = spell_utility(spell, victim, target.distance, square);
                    if spell.is_save() && mods.prefer_control {
                        utility *= CONTROL_PREFERENCE_BONUS;
                    }
                    if utility > best_utility {
                        let index = match spell.effect {
                            SpellEffect::Attack { .. } => {
                                ActionSpec::SpellAttack { target_slot, spell_slot }.index()
                            }
                            SpellEffect::Save { .. } => {
                                ActionSpec::SpellSave { target_slot, spell_slot }.index()
                            }
                        };
                        if mask[index] {
                            best_utility = utility;
                            best_action = Some(index);
                        }
                    }
                }
            }
        }
        if let Some(index) = best_action {
            return index;
        }

        // Phase 2: reposition toward the nearest target, or away from it for
        // hit-and-run actors that have spent their standard action.
        if has_move {
            if let Some(nearest) = targets.first() {
                let target_pos = state.party[nearest.index].pos;
                let current_dist = nearest.distance;

                let mut best_move = None;
                let mut best_score = f32::MIN;
                for (dx, dy) in valid_move_offsets(state, enemy_idx) {
                    let dest = Position::new(enemy.pos.x + dx, enemy.pos.y + dy);
                    let new_dist = chebyshev(dest, target_pos);
                    let score = if mods.hit_and_run && !has_standard {
                        (new_dist - current_dist) as f32
                    } else {
                        (current_dist - new_dist) as f32
                    };
                    if score > best_score {
                        best_score = score;
                        best_move = offset_to_move_index(dx, dy).map(|i| MOVE_START + i);
                    }
                }
                if best_score > 0.0 {
                    if let Some(index) = best_move {
                        return index;
                    }
                }
            }
        }

        // Phase 3: fallback.
        if has_standard && mask[DODGE_INDEX] {
            return DODGE_INDEX;
        }
        END_TURN_INDEX
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use skirmish_engine::action::ATTACK_START;
    use skirmish_engine::{
        ActionEconomy, Grid, InitiativeEntry, Side,
    };

    fn arena(enemy_pos: Position, hero_pos: Position) -> GameState {
        let mut hero = Actor::new("hero", 20, 12, 30, hero_pos);
        hero.attacks.push(AttackRecord {
            name: "Mace".into(),
            to_hit: 4,
            damage: "1d6+2".into(),
            range_ft: 5,
            attack_type: AttackKind::Melee,
        });
        let mut wolf = Actor::new("wolf", 11, 13, 30, enemy_pos);
        wolf.attacks.push(AttackRecord {
            name: "Bite".into(),
            to_hit: 4,
            damage: "2d4+2".into(),
            range_ft: 5,
            attack_type: AttackKind::Melee,
        });
        GameState {
            grid: Grid::open(16, 16),
            party: vec![hero],
            enemies: vec![wolf],
            initiative: vec![
                InitiativeEntry { kind: Side::Enemy, index: 0 },
                InitiativeEntry { kind: Side::Party, index: 0 },
            ],
            turn_index: 0,
            round: 1,
            in_combat: true,
            action_economy: ActionEconomy::default(),
            movement_used: 0,
        }
    }

    #[test]
    fn attacks_when_a_target_is_in_reach() {
        let state = arena(Position::new(5, 5), Position::new(6, 5));
        let mut dice = Dice::new(0);
        let action = HeuristicPolicy::default().select(&state, 0, &mut dice);
        assert_eq!(action, ATTACK_START);
    }

    #[test]
    fn closes_distance_when_out_of_reach() {
        let state = arena(Position::new(2, 2), Position::new(10, 2));
        let mut dice = Dice::new(0);
        let action = HeuristicPolicy::default().select(&state, 0, &mut dice);
        let spec = ActionSpec::from_index(action).unwrap();
        match spec {
            ActionSpec::Move { move_offset: (dx, dy) } => {
                let dest = Position::new(2 + dx, 2 + dy);
                assert!(chebyshev(dest, Position::new(10, 2)) < 8);
            }
            other => panic!("expected a move, got {other:?}"),
        }
    }

    #[test]
    fn hit_and_run_actors_retreat_after_attacking() {
        let mut state = arena(Position::new(5, 5), Position::new(6, 5));
        state.enemies[0].traits = "Skirmisher".into();
        state.action_economy.standard = false;

        let mut dice = Dice::new(0);
        let action = HeuristicPolicy::default().select(&state, 0, &mut dice);
        match ActionSpec::from_index(action).unwrap() {
            ActionSpec::Move { move_offset: (dx, dy) } => {
                let dest = Position::new(5 + dx, 5 + dy);
                assert!(chebyshev(dest, Position::new(6, 5)) > 1);
            }
            other => panic!("expected a retreat move, got {other:?}"),
        }
    }

    #[test]
    fn dodges_when_nothing_is_useful() {
        let mut state = arena(Position::new(5, 5), Position::new(6, 5));
        // No attacks and no reachable improvement: adjacent already, but the
        // wolf has nothing to swing with.
        state.enemies[0].attacks.clear();
        let mut dice = Dice::new(0);
        let action = HeuristicPolicy::default().select(&state, 0, &mut dice);
        assert_eq!(action, DODGE_INDEX);
    }

    #[test]
    fn prefers_the_kill_shot() {
        let mut state = arena(Position::new(5, 5), Position::new(6, 5));
        // A second, wounded hero: expected damage exceeds its hp, so the
        // policy favors it despite equal weapons.
        let mut wounded = Actor::new("wounded", 20, 12, 30, Position::new(4, 5));
        wounded.hp = 2;
        wounded.attacks = state.party[0].attacks.clone();
        state.party.push(wounded);

        let mut dice = Dice::new(0);
        let action = HeuristicPolicy::default().select(&state, 0, &mut dice);
        let spec = ActionSpec::from_index(action).unwrap();
        match spec {
            ActionSpec::Attack { target_slot, .. } => {
                let targets = sorted_targets(&state, Position::new(5, 5));
                assert_eq!(state.party[targets[target_slot].index].name, "wounded");
            }
            other => panic!("expected an attack, got {other:?}"),
        }
    }

    #[test]
    fn ends_turn_when_fully_spent() {
        let mut state = arena(Position::new(5, 5), Position::new(6, 5));
        state.action_economy.standard = false;
        state.action_economy.movement = false;
        let mut dice = Dice::new(0);
        let action = HeuristicPolicy::default().select(&state, 0, &mut dice);
        assert_eq!(action, END_TURN_INDEX);
    }
}
