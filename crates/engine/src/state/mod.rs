//! Game state container.
//!
//! [`GameState`] is a plain value: serializable, deep-clonable, and mutated
//! only through the action-application path. The scenario generator builds
//! it, the environment drives it, and every record type here round-trips
//! through serde as the canonical nested representation used by the rollout
//! log.

mod actor;
mod common;
mod error;
mod grid;

pub use actor::{
    Ability, AbilityEffect, AbilityScores, Actor, AttackKind, AttackRecord, Condition,
    SpecialAbility, SpellEffect, SpellRecord,
};
pub use common::{ActionEconomy, ActorId, InitiativeEntry, Position, Side};
pub use error::StateError;
pub use grid::{BLOCKED_MOVE_COST, Grid, GridCell, TileKind};

use serde::{Deserialize, Serialize};

/// Complete combat state for one episode.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GameState {
    pub grid: Grid,
    pub party: Vec<Actor>,
    pub enemies: Vec<Actor>,
    pub initiative: Vec<InitiativeEntry>,
    /// Cursor into `initiative`.
    pub turn_index: usize,
    /// Rounds start at 1 and advance when the cursor wraps.
    pub round: u32,
    pub in_combat: bool,
    pub action_economy: ActionEconomy,
    /// Squares of movement spent by the active actor this turn.
    pub movement_used: i32,
}

impl GameState {
    pub fn roster(&self, side: Side) -> &[Actor] {
        match side {
            Side::Party => &self.party,
            Side::Enemy => &self.enemies,
        }
    }

    pub fn roster_mut(&mut self, side: Side) -> &mut Vec<Actor> {
        match side {
            Side::Party => &mut self.party,
            Side::Enemy => &mut self.enemies,
        }
    }

    pub fn actor(&self, id: ActorId) -> Option<&Actor> {
        self.roster(id.side).get(id.index)
    }

    pub fn actor_mut(&mut self, id: ActorId) -> Option<&mut Actor> {
        self.roster_mut(id.side).get_mut(id.index)
    }

    /// The initiative entry whose turn it currently is.
    pub fn current_entry(&self) -> Option<InitiativeEntry> {
        self.initiative.get(self.turn_index).copied()
    }

    /// Advances the initiative cursor, wrapping into a new round, and resets
    /// the per-turn action economy and movement counter.
    pub fn advance_turn(&mut self) {
        self.turn_index += 1;
        if self.turn_index >= self.initiative.len() {
            self.turn_index = 0;
            self.round += 1;
        }
        self.action_economy.reset();
        self.movement_used = 0;
    }

    /// True once either roster has no alive actors.
    pub fn is_combat_over(&self) -> bool {
        let party_alive = self.party.iter().any(Actor::is_alive);
        let enemies_alive = self.enemies.iter().any(Actor::is_alive);
        !party_alive || !enemies_alive
    }

    /// The side with survivors, once combat is over.
    pub fn winner(&self) -> Option<Side> {
        if !self.is_combat_over() {
            return None;
        }
        if self.party.iter().any(Actor::is_alive) {
            Some(Side::Party)
        } else {
            Some(Side::Enemy)
        }
    }

    /// Iterates alive actors of one roster with their indices.
    pub fn alive(&self, side: Side) -> impl Iterator<Item = (usize, &Actor)> {
        self.roster(side).iter().enumerate().filter(|(_, a)| a.is_alive())
    }

    /// Whether `(x, y)` can be entered: in bounds, passable terrain, and not
    /// occupied by any alive actor other than `exclude`. Downed actors do not
    /// block.
    pub fn is_blocked(&self, x: i32, y: i32, exclude: Option<ActorId>) -> bool {
        if !self.grid.contains(x, y) {
            return true;
        }
        if self.grid.tile(x, y).is_blocked() {
            return true;
        }
        for side in [Side::Party, Side::Enemy] {
            for (index, actor) in self.alive(side) {
                if exclude == Some(ActorId { side, index }) {
                    continue;
                }
                if actor.pos.x == x && actor.pos.y == y {
                    return true;
                }
            }
        }
        false
    }

    /// Structural validation of a freshly built scenario.
    pub fn validate(&self) -> Result<(), StateError> {
        if self.initiative.is_empty() {
            return Err(StateError::EmptyInitiative);
        }
        let rows = self.grid.cells.len();
        let cols = self.grid.cells.first().map_or(0, Vec::len);
        if rows != self.grid.height as usize
            || self.grid.cells.iter().any(|row| row.len() != self.grid.width as usize)
        {
            return Err(StateError::MalformedGrid {
                rows,
                cols,
                width: self.grid.width,
                height: self.grid.height,
            });
        }

        for (entry, slot) in self.initiative.iter().enumerate() {
            if self.actor(slot.actor_id()).is_none() {
                return Err(StateError::DanglingInitiative { entry, actor: slot.actor_id() });
            }
        }

        let mut seen: Vec<(Position, ActorId)> = Vec::new();
        for side in [Side::Party, Side::Enemy] {
            for (index, actor) in self.roster(side).iter().enumerate() {
                let id = ActorId { side, index };
                if actor.hp < 0 || actor.hp > actor.max_hp {
                    return Err(StateError::HpOutOfRange {
                        actor: id,
                        hp: actor.hp,
                        max_hp: actor.max_hp,
                    });
                }
                if !actor.is_alive() {
                    continue;
                }
                if !self.grid.contains(actor.pos.x, actor.pos.y) {
                    return Err(StateError::OutOfBounds {
                        actor: id,
                        pos: actor.pos,
                        width: self.grid.width,
                        height: self.grid.height,
                    });
                }
                if self.grid.tile_at(actor.pos).is_blocked() {
                    return Err(StateError::BlockedTerrain { actor: id, pos: actor.pos });
                }
                if let Some((pos, first)) = seen.iter().find(|(p, _)| *p == actor.pos) {
                    return Err(StateError::DuplicateOccupation {
                        first: *first,
                        second: id,
                        pos: *pos,
                    });
                }
                seen.push((actor.pos, id));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_sided_state() -> GameState {
        let mut hero = Actor::new("hero", 10, 14, 30, Position::new(1, 1));
        hero.attacks.push(AttackRecord {
            name: "Sword".into(),
            to_hit: 4,
            damage: "1d8".into(),
            range_ft: 5,
            attack_type: AttackKind::Melee,
        });
        let goblin = Actor::new("goblin", 7, 13, 30, Position::new(3, 1));
        GameState {
            grid: Grid::open(6, 6),
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
    fn advance_turn_wraps_and_counts_rounds() {
        let mut state = two_sided_state();
        state.action_economy.standard = false;
        state.movement_used = 3;

        state.advance_turn();
        assert_eq!(state.turn_index, 1);
        assert_eq!(state.round, 1);
        assert!(state.action_economy.standard);
        assert_eq!(state.movement_used, 0);

        state.advance_turn();
        assert_eq!(state.turn_index, 0);
        assert_eq!(state.round, 2);
    }

    #[test]
    fn winner_requires_a_downed_roster() {
        let mut state = two_sided_state();
        assert!(!state.is_combat_over());
        assert_eq!(state.winner(), None);

        state.enemies[0].hp = 0;
        assert!(state.is_combat_over());
        assert_eq!(state.winner(), Some(Side::Party));

        state.enemies[0].hp = 7;
        state.party[0].hp = 0;
        assert_eq!(state.winner(), Some(Side::Enemy));
    }

    #[test]
    fn downed_actors_do_not_block() {
        let mut state = two_sided_state();
        let goblin_pos = state.enemies[0].pos;
        assert!(state.is_blocked(goblin_pos.x, goblin_pos.y, None));

        state.enemies[0].hp = 0;
        assert!(!state.is_blocked(goblin_pos.x, goblin_pos.y, None));
    }

    #[test]
    fn validate_rejects_duplicate_occupation() {
        let mut state = two_sided_state();
        assert!(state.validate().is_ok());

        state.enemies[0].pos = state.party[0].pos;
        assert!(matches!(state.validate(), Err(StateError::DuplicateOccupation { .. })));
    }

    #[test]
    fn validate_rejects_out_of_bounds_and_dangling_initiative() {
        let mut state = two_sided_state();
        state.party[0].pos = Position::new(40, 1);
        assert!(matches!(state.validate(), Err(StateError::OutOfBounds { .. })));

        let mut state = two_sided_state();
        state.initiative.push(InitiativeEntry { kind: Side::Enemy, index: 9 });
        assert!(matches!(state.validate(), Err(StateError::DanglingInitiative { .. })));
    }

    #[test]
    fn state_round_trips_through_serde() {
        let state = two_sided_state();
        let json = serde_json::to_string(&state).unwrap();
        let back: GameState = serde_json::from_str(&json).unwrap();
        assert_eq!(state, back);
    }
}
