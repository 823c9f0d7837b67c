//! Scripted party turns.
//!
//! Party members follow a fixed script: close on the nearest alive enemy and
//! swing with their first attack. This keeps the environment's non-controlled
//! side deterministic-by-policy so training signal comes from the enemy side.

use serde::{Deserialize, Serialize};

use crate::state::{ActorId, GameState, Position};

use super::dice::Dice;
use super::grid::{chebyshev, dijkstra_reachable, range_squares};
use super::resolve::{apply_damage, resolve_attack};

/// What a scripted party turn did, for logs and tests.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum PartyTurn {
    /// Downed, no target, or no attacks.
    Idle,
    /// Moved but ended out of range.
    MoveOnly { to: Position },
    /// Attacked (after moving if needed).
    Attack { target: usize, moved: bool, hit: bool, damage: i32, downed: bool },
}

/// Runs one party member's scripted turn: step toward the nearest alive
/// enemy along the cheapest path, then attack with the first attack record
/// if in range.
pub fn party_scripted_turn(state: &mut GameState, party_idx: usize, dice: &mut Dice) -> PartyTurn {
    let Some(member) = state.party.get(party_idx) else {
        return PartyTurn::Idle;
    };
    if !member.is_alive() || member.attacks.is_empty() {
        return PartyTurn::Idle;
    }
    let member_pos = member.pos;

    // Nearest alive enemy, ties broken by roster order.
    let Some((target_idx, mut target_dist)) = state
        .alive(crate::state::Side::Enemy)
        .map(|(i, e)| (i, chebyshev(member_pos, e.pos)))
        .min_by_key(|&(i, d)| (d, i))
    else {
        return PartyTurn::Idle;
    };

    let attack = state.party[party_idx].attacks[0].clone();
    let reach = range_squares(attack.range_ft, state.grid.square_size_ft);
    let target_pos = state.enemies[target_idx].pos;

    let mut moved = false;
    if target_dist > reach {
        let budget = state.grid.squares_of_speed(state.party[party_idx].speed_ft);
        let exclude = Some(ActorId::party(party_idx));
        let reachable = dijkstra_reachable(state, member_pos, budget, exclude);

        // Reachable cell minimizing distance to the target; ties broken by
        // path cost, then scan order.
        let mut best: Option<(i32, i32, (i32, i32))> = None;
        for (&(x, y), &cost) in &reachable {
            if (x, y) == (member_pos.x, member_pos.y) {
                continue;
            }
            if state.is_blocked(x, y, exclude) {
                continue;
            }
            let dist = chebyshev(Position::new(x, y), target_pos);
            if dist >= target_dist {
                continue;
            }
            let candidate = (dist, cost, (x, y));
            if best.is_none() || candidate < best.unwrap() {
                best = Some(candidate);
            }
        }

        if let Some((dist, _, (x, y))) = best {
            state.party[party_idx].pos = Position::new(x, y);
            target_dist = dist;
            moved = true;
        }
    }

    if target_dist <= reach {
        let outcome = resolve_attack(&state.enemies[target_idx], &attack, dice);
        if outcome.hit {
            let report = apply_damage(&mut state.enemies[target_idx], outcome.damage);
            return PartyTurn::Attack {
                target: target_idx,
                moved,
                hit: true,
                damage: outcome.damage,
                downed: report.downed,
            };
        }
        return PartyTurn::Attack { target: target_idx, moved, hit: false, damage: 0, downed: false };
    }

    match moved {
        true => PartyTurn::MoveOnly { to: state.party[party_idx].pos },
        false => PartyTurn::Idle,
    }
}
