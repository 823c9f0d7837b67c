//! Grid geometry: Chebyshev distance and weighted reachability.

use std::cmp::Reverse;
use std::collections::BTreeMap;
use std::collections::BinaryHeap;

use crate::state::{ActorId, GameState, Position};

/// 8-connected neighborhood offsets.
const DIRECTIONS: [(i32, i32); 8] =
    [(-1, 0), (1, 0), (0, -1), (0, 1), (-1, -1), (-1, 1), (1, -1), (1, 1)];

/// Chebyshev distance: the natural metric on an 8-connected grid.
pub fn chebyshev(a: Position, b: Position) -> i32 {
    (a.x - b.x).abs().max((a.y - b.y).abs())
}

/// Converts a range in feet to grid squares, with a melee-reach floor of one
/// square.
pub fn range_squares(range_ft: i32, square_size_ft: i32) -> i32 {
    if square_size_ft <= 0 {
        return 1;
    }
    (range_ft / square_size_ft).max(1)
}

/// Dijkstra over the 8-connected grid weighted by tile move cost.
///
/// Returns every cell reachable from `start` within `max_cost`, mapped to its
/// accumulated cost. The start cell is included at cost zero. Cells blocked by
/// terrain or by alive actors (other than `exclude`) are never entered.
pub fn dijkstra_reachable(
    state: &GameState,
    start: Position,
    max_cost: i32,
    exclude: Option<ActorId>,
) -> BTreeMap<(i32, i32), i32> {
    let mut visited: BTreeMap<(i32, i32), i32> = BTreeMap::new();
    let mut queue: BinaryHeap<Reverse<(i32, i32, i32)>> = BinaryHeap::new();
    queue.push(Reverse((0, start.x, start.y)));

    while let Some(Reverse((cost, x, y))) = queue.pop() {
        if visited.contains_key(&(x, y)) {
            continue;
        }
        visited.insert((x, y), cost);

        for (dx, dy) in DIRECTIONS {
            let (nx, ny) = (x + dx, y + dy);
            if visited.contains_key(&(nx, ny)) {
                continue;
            }
            if state.is_blocked(nx, ny, exclude) {
                continue;
            }
            let next_cost = cost + state.grid.tile(nx, ny).move_cost();
            if next_cost <= max_cost {
                queue.push(Reverse((next_cost, nx, ny)));
            }
        }
    }

    visited
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{
        ActionEconomy, Actor, GameState, Grid, GridCell, InitiativeEntry, Side, TileKind,
    };

    fn empty_state(width: i32, height: i32) -> GameState {
        GameState {
            grid: Grid::open(width, height),
            party: vec![],
            enemies: vec![Actor::new("scout", 5, 12, 30, Position::new(0, 0))],
            initiative: vec![InitiativeEntry { kind: Side::Enemy, index: 0 }],
            turn_index: 0,
            round: 1,
            in_combat: true,
            action_economy: ActionEconomy::default(),
            movement_used: 0,
        }
    }

    #[test]
    fn chebyshev_is_the_max_axis_delta() {
        assert_eq!(chebyshev(Position::new(0, 0), Position::new(3, 1)), 3);
        assert_eq!(chebyshev(Position::new(2, 2), Position::new(2, 2)), 0);
        assert_eq!(chebyshev(Position::new(5, 1), Position::new(1, 7)), 6);
    }

    #[test]
    fn range_floors_at_one_square() {
        assert_eq!(range_squares(5, 5), 1);
        assert_eq!(range_squares(3, 5), 1);
        assert_eq!(range_squares(30, 5), 6);
        assert_eq!(range_squares(80, 5), 16);
    }

    #[test]
    fn reachability_respects_budget_and_diagonals() {
        let state = empty_state(9, 9);
        let reachable = dijkstra_reachable(&state, Position::new(4, 4), 2, None);

        assert_eq!(reachable.get(&(4, 4)), Some(&0));
        assert_eq!(reachable.get(&(5, 5)), Some(&1));
        assert_eq!(reachable.get(&(6, 6)), Some(&2));
        assert!(!reachable.contains_key(&(7, 7)));
        // Every open cell within Chebyshev 2 of the start is reachable.
        assert_eq!(reachable.len(), 25);
    }

    #[test]
    fn walls_and_difficult_terrain_shape_the_frontier() {
        let mut state = empty_state(5, 3);
        // A vertical wall at x=2 with no gap.
        for y in 0..3 {
            state.grid.cells[y][2] = GridCell::of(TileKind::Wall);
        }
        let reachable = dijkstra_reachable(&state, Position::new(0, 1), 4, None);
        assert!(reachable.keys().all(|&(x, _)| x < 2));

        let mut state = empty_state(5, 1);
        state.grid.cells[0][1] = GridCell::of(TileKind::Difficult);
        let reachable = dijkstra_reachable(&state, Position::new(0, 0), 3, None);
        // Entering the difficult square costs 2, the next open square 1 more.
        assert_eq!(reachable.get(&(1, 0)), Some(&2));
        assert_eq!(reachable.get(&(2, 0)), Some(&3));
        assert!(!reachable.contains_key(&(3, 0)));
    }

    #[test]
    fn occupied_cells_are_not_entered_unless_excluded() {
        let mut state = empty_state(5, 1);
        state.enemies[0].pos = Position::new(2, 0);
        let reachable = dijkstra_reachable(&state, Position::new(0, 0), 4, None);
        assert!(!reachable.contains_key(&(2, 0)));

        let reachable =
            dijkstra_reachable(&state, Position::new(0, 0), 4, Some(ActorId::enemy(0)));
        assert!(reachable.contains_key(&(2, 0)));
    }
}
