//! Target ranking: which opposing actors the slot grid can address.

use arrayvec::ArrayVec;

use crate::config::MAX_TARGETS;
use crate::mechanics::chebyshev;
use crate::state::{GameState, Position, Side};

/// One addressable target: a party roster index and its distance from the
/// acting enemy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TargetSlot {
    pub index: usize,
    pub distance: i32,
}

/// Alive party members sorted ascending by Chebyshev distance from `from`,
/// ties broken by roster order, truncated to the slot capacity. Targets past
/// the capacity are unaddressable this turn.
pub fn sorted_targets(state: &GameState, from: Position) -> ArrayVec<TargetSlot, MAX_TARGETS> {
    let mut ranked: Vec<TargetSlot> = state
        .alive(Side::Party)
        .map(|(index, actor)| TargetSlot { index, distance: chebyshev(from, actor.pos) })
        .collect();
    ranked.sort_by_key(|t| t.distance);

    ranked.into_iter().take(MAX_TARGETS).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{ActionEconomy, Actor, Grid, InitiativeEntry};

    fn state_with_party(positions: &[(i32, i32)]) -> GameState {
        let party = positions
            .iter()
            .enumerate()
            .map(|(i, &(x, y))| Actor::new(format!("hero-{i}"), 10, 12, 30, Position::new(x, y)))
            .collect();
        GameState {
            grid: Grid::open(20, 20),
            party,
            enemies: vec![Actor::new("ogre", 40, 11, 30, Position::new(0, 0))],
            initiative: vec![InitiativeEntry { kind: Side::Enemy, index: 0 }],
            turn_index: 0,
            round: 1,
            in_combat: true,
            action_economy: ActionEconomy::default(),
            movement_used: 0,
        }
    }

    #[test]
    fn ranks_by_distance_with_roster_order_ties() {
        let state = state_with_party(&[(5, 0), (2, 0), (0, 2), (9, 9)]);
        let targets = sorted_targets(&state, Position::new(0, 0));
        // (2,0) and (0,2) tie at distance 2; roster order keeps index 1 first.
        let order: Vec<usize> = targets.iter().map(|t| t.index).collect();
        assert_eq!(order, vec![1, 2, 0, 3]);
        assert_eq!(targets[0].distance, 2);
    }

    #[test]
    fn downed_members_are_not_targets() {
        let mut state = state_with_party(&[(1, 0), (2, 0)]);
        state.party[0].hp = 0;
        let targets = sorted_targets(&state, Position::new(0, 0));
        assert_eq!(targets.len(), 1);
        assert_eq!(targets[0].index, 1);
    }

    #[test]
    fn slot_capacity_truncates_the_list() {
        let positions: Vec<(i32, i32)> = (0..9).map(|i| (i + 1, 0)).collect();
        let state = state_with_party(&positions);
        let targets = sorted_targets(&state, Position::new(0, 0));
        assert_eq!(targets.len(), MAX_TARGETS);
        assert_eq!(targets.last().unwrap().distance, MAX_TARGETS as i32);
    }
}
