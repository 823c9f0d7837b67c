//! Per-state validity mask over the action space.

use crate::config::{LOCAL_GRID_RADIUS, MAX_ABILITIES, MAX_ATTACKS, MAX_SPELLS};
use crate::mechanics::range_squares;
use crate::state::{Actor, ActorId, GameState};

use super::targeting::sorted_targets;
use super::{
    ABILITY_START, ATTACK_START, DASH_INDEX, DISENGAGE_INDEX, DODGE_INDEX, END_TURN_INDEX,
    MOVE_START, N_ACT, SPELL_ATTACK_START, SPELL_SAVE_START, offset_to_move_index,
};

/// Squares of movement the enemy still has this turn.
pub fn movement_budget(state: &GameState, enemy: &Actor) -> i32 {
    let max_move = state.grid.squares_of_speed(enemy.speed_ft);
    (max_move - state.movement_used).max(0)
}

/// Local offsets the enemy can legally step to: within the remaining budget
/// (Chebyshev) and onto an unblocked cell.
pub fn valid_move_offsets(state: &GameState, enemy_idx: usize) -> Vec<(i32, i32)> {
    let Some(enemy) = state.enemies.get(enemy_idx) else {
        return Vec::new();
    };
    let budget = movement_budget(state, enemy);
    let exclude = Some(ActorId::enemy(enemy_idx));

    let mut offsets = Vec::new();
    for dy in -LOCAL_GRID_RADIUS..=LOCAL_GRID_RADIUS {
        for dx in -LOCAL_GRID_RADIUS..=LOCAL_GRID_RADIUS {
            if dx == 0 && dy == 0 {
                continue;
            }
            if dx.abs().max(dy.abs()) > budget {
                continue;
            }
            if !state.is_blocked(enemy.pos.x + dx, enemy.pos.y + dy, exclude) {
                offsets.push((dx, dy));
            }
        }
    }
    offsets
}

/// Builds the validity mask for the acting enemy. END_TURN is always legal;
/// everything else is gated on action economy, slot existence, range, and
/// (for special abilities) availability.
pub fn action_mask(state: &GameState, enemy_idx: usize) -> Vec<bool> {
    let mut mask = vec![false; N_ACT];
    mask[END_TURN_INDEX] = true;

    let Some(enemy) = state.enemies.get(enemy_idx) else {
        return mask;
    };

    let square = state.grid.square_size_ft;
    let has_standard = state.action_economy.standard;
    let has_move = state.action_economy.movement;
    let targets = sorted_targets(state, enemy.pos);

    if has_move {
        for (dx, dy) in valid_move_offsets(state, enemy_idx) {
            if let Some(local) = offset_to_move_index(dx, dy) {
                mask[MOVE_START + local] = true;
            }
        }
    }

    if has_standard {
        for (target_slot, target) in targets.iter().enumerate() {
            for (attack_slot, attack) in enemy.attacks.iter().take(MAX_ATTACKS).enumerate() {
                if target.distance <= range_squares(attack.range_ft, square) {
                    mask[ATTACK_START + target_slot * MAX_ATTACKS + attack_slot] = true;
                }
            }

            for (spell_slot, spell) in enemy.spells.iter().take(MAX_SPELLS).enumerate() {
                if target.distance > range_squares(spell.range_ft, square) {
                    continue;
                }
                if spell.is_attack() {
                    mask[SPELL_ATTACK_START + target_slot * MAX_SPELLS + spell_slot] = true;
                } else {
                    mask[SPELL_SAVE_START + target_slot * MAX_SPELLS + spell_slot] = true;
                }
            }

            for (ability_slot, ability) in
                enemy.special_abilities.iter().take(MAX_ABILITIES).enumerate()
            {
                if !enemy.ability_available(ability) {
                    continue;
                }
                if target.distance <= range_squares(ability.range_ft, square) {
                    mask[ABILITY_START + target_slot * MAX_ABILITIES + ability_slot] = true;
                }
            }
        }

        mask[DODGE_INDEX] = true;
        mask[DASH_INDEX] = true;
        mask[DISENGAGE_INDEX] = true;
    }

    mask
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{
        Ability, ActionEconomy, AttackKind, AttackRecord, Grid, GridCell, InitiativeEntry,
        Position, Side, SpecialAbility, SpellEffect, SpellRecord, TileKind,
    };
    use crate::state::AbilityEffect;

    fn skirmish(enemy_pos: Position, hero_pos: Position) -> GameState {
        let hero = Actor::new("hero", 20, 14, 30, hero_pos);
        let mut goblin = Actor::new("goblin", 7, 13, 30, enemy_pos);
        goblin.attacks.push(AttackRecord {
            name: "Scimitar".into(),
            to_hit: 4,
            damage: "1d6+2".into(),
            range_ft: 5,
            attack_type: AttackKind::Melee,
        });
        GameState {
            grid: Grid::open(20, 20),
            party: vec![hero],
            enemies: vec![goblin],
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
    fn melee_attack_valid_only_when_adjacent() {
        let state = skirmish(Position::new(1, 2), Position::new(0, 2));
        let mask = action_mask(&state, 0);
        assert!(mask[ATTACK_START]);

        let state = skirmish(Position::new(0, 0), Position::new(10, 10));
        let mask = action_mask(&state, 0);
        assert!(!mask[ATTACK_START]);
    }

    #[test]
    fn end_turn_is_always_legal() {
        let mut state = skirmish(Position::new(1, 2), Position::new(0, 2));
        state.action_economy.standard = false;
        state.action_economy.movement = false;
        let mask = action_mask(&state, 0);
        assert!(mask[END_TURN_INDEX]);
        assert_eq!(mask.iter().filter(|&&m| m).count(), 1);
    }

    #[test]
    fn moves_respect_budget_blocking_and_economy() {
        let mut state = skirmish(Position::new(10, 10), Position::new(0, 0));
        state.grid.cells[10][11] = GridCell::of(TileKind::Wall);

        let mask = action_mask(&state, 0);
        let blocked = offset_to_move_index(1, 0).unwrap();
        let open = offset_to_move_index(-1, 0).unwrap();
        assert!(!mask[MOVE_START + blocked]);
        assert!(mask[MOVE_START + open]);

        // Speed 30 reaches 6 squares, within the 5-square window; using up
        // four squares leaves offsets past Chebyshev 2 invalid.
        state.movement_used = 4;
        let mask = action_mask(&state, 0);
        assert!(mask[MOVE_START + offset_to_move_index(-2, 0).unwrap()]);
        assert!(!mask[MOVE_START + offset_to_move_index(-3, 0).unwrap()]);

        state.action_economy.movement = false;
        let mask = action_mask(&state, 0);
        assert!((0..super::super::MOVE_COUNT).all(|i| !mask[MOVE_START + i]));
    }

    #[test]
    fn spells_split_by_type_gate() {
        let mut state = skirmish(Position::new(4, 4), Position::new(8, 4));
        state.enemies[0].spells = vec![
            SpellRecord {
                name: "Fire Bolt".into(),
                range_ft: 120,
                damage: "1d10".into(),
                effect: SpellEffect::Attack { to_hit: 5 },
            },
            SpellRecord {
                name: "Sacred Flame".into(),
                range_ft: 60,
                damage: "1d8".into(),
                effect: SpellEffect::Save { dc: 13, save: Ability::Dex },
            },
        ];
        let mask = action_mask(&state, 0);
        assert!(mask[SPELL_ATTACK_START]);
        assert!(!mask[SPELL_ATTACK_START + 1]);
        assert!(!mask[SPELL_SAVE_START]);
        assert!(mask[SPELL_SAVE_START + 1]);
    }

    #[test]
    fn spent_recharge_abilities_mask_out() {
        let mut state = skirmish(Position::new(4, 4), Position::new(6, 4));
        state.enemies[0].special_abilities.push(SpecialAbility {
            name: "Fire Breath".into(),
            range_ft: 30,
            damage: "7d6".into(),
            effect: AbilityEffect::Save { dc: 15, save: Ability::Dex, condition: None },
            recharge: true,
            uses: None,
        });
        let mask = action_mask(&state, 0);
        assert!(mask[ABILITY_START]);

        state.enemies[0].expend_recharge("Fire Breath");
        let mask = action_mask(&state, 0);
        assert!(!mask[ABILITY_START]);
    }

    #[test]
    fn no_alive_targets_leaves_only_stances_and_movement() {
        let mut state = skirmish(Position::new(1, 2), Position::new(0, 2));
        state.party[0].hp = 0;
        let mask = action_mask(&state, 0);
        assert!(!mask[ATTACK_START]);
        assert!(mask[DODGE_INDEX] && mask[DASH_INDEX] && mask[DISENGAGE_INDEX]);
        assert!(mask[END_TURN_INDEX]);
    }
}
