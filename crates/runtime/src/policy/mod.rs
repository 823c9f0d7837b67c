//! Baseline enemy policies.
//!
//! Policies are stateless with respect to the episode: they see the current
//! state, the acting enemy, and the environment's dice stream, and return an
//! action index. Anything they return is safe — the environment treats
//! indices that fail validation as penalized no-ops.

mod heuristic;
mod random;

pub use heuristic::HeuristicPolicy;
pub use random::RandomPolicy;

use skirmish_engine::action::END_TURN_INDEX;
use skirmish_engine::{Dice, GameState};

/// An enemy decision function over the public environment contract.
pub trait EnemyPolicy: Send + Sync {
    /// Picks an action index for the acting enemy.
    fn select(&self, state: &GameState, enemy_idx: usize, dice: &mut Dice) -> usize;
}

/// Plays a whole turn with a policy by repeated application, returning the
/// action indices taken. Useful for driving the engine stateless, without an
/// environment.
pub fn play_out_turn(
    policy: &dyn EnemyPolicy,
    state: &GameState,
    enemy_idx: usize,
    dice: &mut Dice,
    max_actions: usize,
) -> Vec<usize> {
    let mut current = state.clone();
    let mut taken = Vec::new();

    for _ in 0..max_actions {
        let action = policy.select(&current, enemy_idx, dice);
        taken.push(action);
        if action == END_TURN_INDEX {
            break;
        }
        let (next, _, done, _) = skirmish_engine::apply_action(&current, enemy_idx, action, dice);
        current = next;
        if done || current.action_economy.exhausted() {
            break;
        }
    }
    taken
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scenario::{ScenarioBuilder, SimpleScenario};

    #[test]
    fn a_played_out_turn_is_bounded_and_nonempty() {
        let mut dice = Dice::new(5);
        let state = SimpleScenario::default().build(&mut dice).unwrap();
        let policy = HeuristicPolicy::default();

        let actions = play_out_turn(&policy, &state, 0, &mut dice, 10);
        assert!(!actions.is_empty());
        assert!(actions.len() <= 10);
        assert!(actions.iter().all(|&a| a < skirmish_engine::N_ACT));
    }
}
