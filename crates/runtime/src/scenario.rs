//! Scenario construction seam.
//!
//! The engine consumes fully formed initial states; how they are sampled is
//! a collaborator's concern. [`ScenarioBuilder`] is the trait at that seam,
//! and [`SimpleScenario`] is the baseline builder used by the harness and
//! the test suite: party on the left, enemies on the right, alternating
//! initiative with enemies first.

use skirmish_engine::{
    ActionEconomy, Actor, AttackKind, AttackRecord, Dice, GameState, Grid, InitiativeEntry,
    Position, Side,
};

use crate::error::ScenarioError;

/// Builds the initial state for one episode. Implementations draw any
/// randomness from the environment's dice so episodes stay reproducible.
pub trait ScenarioBuilder: Send + Sync {
    fn build(&self, dice: &mut Dice) -> Result<GameState, ScenarioError>;
}

/// Shape parameters for [`SimpleScenario`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ScenarioConfig {
    pub num_party: usize,
    pub num_enemies: usize,
    pub grid_width: i32,
    pub grid_height: i32,
}

impl Default for ScenarioConfig {
    fn default() -> Self {
        Self { num_party: 2, num_enemies: 2, grid_width: 15, grid_height: 15 }
    }
}

/// Deterministic baseline scenario: longsword heroes against goblins with
/// scimitars and shortbows.
#[derive(Clone, Debug, Default)]
pub struct SimpleScenario {
    pub config: ScenarioConfig,
}

impl SimpleScenario {
    pub fn new(config: ScenarioConfig) -> Self {
        Self { config }
    }

    fn hero(&self, index: usize, height: i32) -> Actor {
        let y = height / 2 - self.config.num_party as i32 / 2 + index as i32;
        let mut hero =
            Actor::new(format!("Hero {}", index + 1), 30, 15, 30, Position::new(2, y));
        hero.attacks.push(AttackRecord {
            name: "Longsword".into(),
            to_hit: 5,
            damage: "1d8+3".into(),
            range_ft: 5,
            attack_type: AttackKind::Melee,
        });
        hero
    }

    fn goblin(&self, index: usize, width: i32, height: i32) -> Actor {
        let y = height / 2 - self.config.num_enemies as i32 / 2 + index as i32;
        let mut goblin =
            Actor::new(format!("Goblin {}", index + 1), 7, 15, 30, Position::new(width - 3, y));
        goblin.attacks.push(AttackRecord {
            name: "Scimitar".into(),
            to_hit: 4,
            damage: "1d6+2".into(),
            range_ft: 5,
            attack_type: AttackKind::Melee,
        });
        goblin.attacks.push(AttackRecord {
            name: "Shortbow".into(),
            to_hit: 4,
            damage: "1d6+2".into(),
            range_ft: 80,
            attack_type: AttackKind::Ranged,
        });
        goblin
    }
}

impl ScenarioBuilder for SimpleScenario {
    fn build(&self, _dice: &mut Dice) -> Result<GameState, ScenarioError> {
        let ScenarioConfig { num_party, num_enemies, grid_width, grid_height } = self.config;
        if num_party == 0 || num_enemies == 0 {
            return Err(ScenarioError::EmptyRoster);
        }
        let tallest = num_party.max(num_enemies) as i32;
        if grid_width < 6 || grid_height < tallest {
            return Err(ScenarioError::GridTooSmall { width: grid_width, height: grid_height });
        }

        let party: Vec<Actor> =
            (0..num_party).map(|i| self.hero(i, grid_height)).collect();
        let enemies: Vec<Actor> =
            (0..num_enemies).map(|i| self.goblin(i, grid_width, grid_height)).collect();

        // Alternating initiative, enemies first within each pair.
        let mut initiative = Vec::new();
        for i in 0..num_party.max(num_enemies) {
            if i < num_enemies {
                initiative.push(InitiativeEntry { kind: Side::Enemy, index: i });
            }
            if i < num_party {
                initiative.push(InitiativeEntry { kind: Side::Party, index: i });
            }
        }

        let state = GameState {
            grid: Grid::open(grid_width, grid_height),
            party,
            enemies,
            initiative,
            turn_index: 0,
            round: 1,
            in_combat: true,
            action_economy: ActionEconomy::default(),
            movement_used: 0,
        };
        state.validate()?;
        Ok(state)
    }
}
