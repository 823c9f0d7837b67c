//! Deterministic tactical combat core.
//!
//! `skirmish-engine` defines the canonical rules of the simulator: the state
//! container, the mechanics kernel (dice, geometry, resolution), the discrete
//! action space with validity masking and atomic application, and the
//! featurizer that turns a state into a fixed-size observation vector. The
//! runtime crate layers the step-based environment, policies, and rollout
//! tooling on top of these pure APIs.
//!
//! Everything here is deterministic given a seed: all randomness flows
//! through [`mechanics::Dice`], and collection iteration orders are fixed.

pub mod action;
pub mod config;
pub mod featurize;
pub mod mechanics;
pub mod state;
pub mod traits;

pub use action::{
    ActionOutcome, ActionSpec, ActionType, N_ACT, RewardComponents, StepInfo, action_mask,
    apply_action, sorted_targets,
};
pub use config::{ENGINE_VERSION, SCHEMA_VERSION};
pub use featurize::{N_OBS, featurize};
pub use mechanics::{
    Dice, DiceExpr, PartyTurn, average_damage, chebyshev, dijkstra_reachable,
    party_scripted_turn, process_start_of_turn, range_squares,
};
pub use state::{
    Ability, AbilityEffect, AbilityScores, ActionEconomy, Actor, ActorId, AttackKind,
    AttackRecord, Condition, GameState, Grid, GridCell, InitiativeEntry, Position, Side,
    SpecialAbility, SpellEffect, SpellRecord, StateError, TileKind,
};
pub use traits::{TRAIT_KEYWORDS, TraitCatalog, TraitModifiers, trait_flags};
