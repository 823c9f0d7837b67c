//! Uniform-random baseline over the validity mask.

use skirmish_engine::action::END_TURN_INDEX;
use skirmish_engine::{Dice, GameState, action_mask};

use super::EnemyPolicy;

/// Picks uniformly among currently valid actions. The comparison floor for
/// anything smarter.
#[derive(Clone, Copy, Debug, Default)]
pub struct RandomPolicy;

impl EnemyPolicy for RandomPolicy {
    fn select(&self, state: &GameState, enemy_idx: usize, dice: &mut Dice) -> usize {
        let mask = action_mask(state, enemy_idx);
        let valid: Vec<usize> =
            mask.iter().enumerate().filter(|&(_, &m)| m).map(|(i, _)| i).collect();
        if valid.is_empty() {
            return END_TURN_INDEX;
        }
        valid[dice.index(valid.len())]
    }
}
