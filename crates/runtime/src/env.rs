//! Step-based combat environment.
//!
//! [`CombatEnv`] drives one episode at a time: it owns the state and the
//! seeded dice, exposes enemy decisions to the caller one atomic sub-action
//! per step, and runs the scripted party policy in between enemy turns. The
//! caller sees the standard `reset`/`step` contract with observation vectors,
//! validity masks, shaped rewards, and done/truncated flags.

use serde::{Deserialize, Serialize};

use skirmish_engine::action::END_TURN_INDEX;
use skirmish_engine::{
    ActionOutcome, ActionSpec, ActionType, Dice, GameState, RewardComponents, Side, action_mask,
    apply_action, featurize, party_scripted_turn, process_start_of_turn,
};

use crate::error::EnvError;
use crate::scenario::ScenarioBuilder;

/// Reward shaping weights.
const DAMAGE_WEIGHT: f32 = 0.1;
const KILL_BONUS: f32 = 5.0;
const INVALID_PENALTY: f32 = 1.0;
const TERMINAL_BONUS: f32 = 10.0;

/// How the non-controlled side behaves.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PartyPolicy {
    /// Scripted: close on the nearest enemy and attack.
    #[default]
    Simple,
    /// The party passes every turn.
    Passive,
}

/// Environment configuration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EnvConfig {
    /// Hard step cap; reaching it sets `truncated`.
    pub max_steps: u32,
    pub party_policy: PartyPolicy,
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self { max_steps: 100, party_policy: PartyPolicy::Simple }
    }
}

/// Info returned by `reset`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct EnvInfo {
    pub action_mask: Vec<bool>,
    pub current_enemy_idx: usize,
    pub round: u32,
    pub step_count: u32,
}

/// Info returned by `step`: the reset fields plus per-action metadata.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct StepEnvInfo {
    pub action_mask: Vec<bool>,
    pub current_enemy_idx: usize,
    pub round: u32,
    pub step_count: u32,
    pub reward_components: RewardComponents,
    pub action_spec: Option<ActionSpec>,
    pub action_type: Option<ActionType>,
    pub action_valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcome: Option<ActionOutcome>,
}

/// One step's results.
#[derive(Clone, Debug, PartialEq)]
pub struct Transition {
    pub obs: Vec<f32>,
    pub reward: f32,
    pub done: bool,
    pub truncated: bool,
    pub info: StepEnvInfo,
}

/// The step-based environment around one episode of combat.
pub struct CombatEnv {
    builder: Box<dyn ScenarioBuilder>,
    config: EnvConfig,
    seed: u64,
    dice: Dice,
    state: Option<GameState>,
    current_enemy: usize,
    step_count: u32,
    finished: bool,
}

impl CombatEnv {
    pub fn new(builder: impl ScenarioBuilder + 'static, config: EnvConfig) -> Self {
        Self {
            builder: Box::new(builder),
            config,
            seed: 0,
            dice: Dice::new(0),
            state: None,
            current_enemy: 0,
            step_count: 0,
            finished: false,
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn state(&self) -> Option<&GameState> {
        self.state.as_ref()
    }

    pub fn current_enemy(&self) -> usize {
        self.current_enemy
    }

    pub fn step_count(&self) -> u32 {
        self.step_count
    }

    /// Starts a new episode. Builds the scenario with a fresh seeded dice
    /// stream and advances initiative to the first enemy turn, running
    /// scripted party turns along the way. Refuses malformed scenarios.
    pub fn reset(&mut self, seed: Option<u64>) -> Result<(Vec<f32>, EnvInfo), EnvError> {
        if let Some(seed) = seed {
            self.seed = seed;
        }
        self.dice = Dice::new(self.seed);
        self.step_count = 0;
        self.finished = false;

        let state = self.builder.build(&mut self.dice)?;
        tracing::debug!(
            seed = self.seed,
            party = state.party.len(),
            enemies = state.enemies.len(),
            "episode reset"
        );
        self.state = Some(state);
        self.current_enemy = 0;
        self.advance_to_enemy_turn();

        Ok((self.observation(), self.reset_info()))
    }

    /// Executes one enemy sub-action. Invalid indices are penalized, never
    /// fatal; the only errors are lifecycle misuse.
    pub fn step(&mut self, action_index: usize) -> Result<Transition, EnvError> {
        if self.state.is_none() {
            return Err(EnvError::NotReset);
        }
        if self.finished {
            return Err(EnvError::EpisodeOver);
        }
        self.step_count += 1;

        let state = self.state.as_ref().expect("checked above");
        let (next, components, mut done, info) =
            apply_action(state, self.current_enemy, action_index, &mut self.dice);
        self.state = Some(next);

        let mut reward = shaped_reward(&components);

        // Turn boundary: an explicit END_TURN or an exhausted economy hands
        // control onward until the next enemy turn (or the end of combat).
        let exhausted = self.state.as_ref().expect("set above").action_economy.exhausted();
        if action_index == END_TURN_INDEX || exhausted {
            let state = self.state.as_mut().expect("set above");
            state.advance_turn();
            self.advance_to_enemy_turn();
        }

        let state = self.state.as_ref().expect("set above");
        if state.is_combat_over() {
            done = true;
            self.finished = true;
            reward += match state.winner() {
                Some(Side::Enemy) => TERMINAL_BONUS,
                _ => -TERMINAL_BONUS,
            };
        }

        let truncated = !done && self.step_count >= self.config.max_steps;
        if truncated {
            self.finished = true;
        }

        let obs = self.observation();
        let mask = self.mask();
        let state = self.state.as_ref().expect("set above");
        Ok(Transition {
            obs,
            reward,
            done,
            truncated,
            info: StepEnvInfo {
                action_mask: mask,
                current_enemy_idx: self.current_enemy,
                round: state.round,
                step_count: self.step_count,
                reward_components: components,
                action_spec: ActionSpec::from_index(action_index),
                action_type: info.action_type,
                action_valid: info.action_valid,
                outcome: info.outcome,
            },
        })
    }

    /// The current observation for the acting enemy.
    pub fn observation(&self) -> Vec<f32> {
        match &self.state {
            Some(state) => featurize(state, self.current_enemy),
            None => vec![0.0; skirmish_engine::N_OBS],
        }
    }

    /// The current validity mask for the acting enemy.
    pub fn mask(&self) -> Vec<bool> {
        match &self.state {
            Some(state) => action_mask(state, self.current_enemy),
            None => vec![false; skirmish_engine::N_ACT],
        }
    }

    /// Splits the borrow for policy calls: the state to read, the acting
    /// enemy, and the dice stream to draw from.
    pub fn decision_context(&mut self) -> Result<(&GameState, usize, &mut Dice), EnvError> {
        match &self.state {
            Some(state) => Ok((state, self.current_enemy, &mut self.dice)),
            None => Err(EnvError::NotReset),
        }
    }

    fn reset_info(&self) -> EnvInfo {
        let state = self.state.as_ref().expect("reset populated the state");
        EnvInfo {
            action_mask: self.mask(),
            current_enemy_idx: self.current_enemy,
            round: state.round,
            step_count: self.step_count,
        }
    }

    /// Walks initiative until an alive enemy is up, running scripted party
    /// turns (and skipping downed actors) along the way. Stops early when
    /// combat ends.
    fn advance_to_enemy_turn(&mut self) {
        let state = self.state.as_mut().expect("caller ensured state");
        let max_iterations = state.initiative.len() * 2 + 1;

        for _ in 0..max_iterations {
            if state.is_combat_over() {
                break;
            }
            let Some(entry) = state.current_entry() else {
                break;
            };
            let alive = state.actor(entry.actor_id()).is_some_and(|a| a.is_alive());
            if !alive {
                state.advance_turn();
                continue;
            }

            match entry.kind {
                Side::Enemy => {
                    self.current_enemy = entry.index;
                    state.action_economy.reset();
                    state.movement_used = 0;
                    process_start_of_turn(&mut state.enemies[entry.index], &mut self.dice);
                    break;
                }
                Side::Party => {
                    if matches!(self.config.party_policy, PartyPolicy::Simple) {
                        process_start_of_turn(&mut state.party[entry.index], &mut self.dice);
                        let turn = party_scripted_turn(state, entry.index, &mut self.dice);
                        tracing::debug!(member = entry.index, ?turn, "party turn");
                    }
                    state.advance_turn();
                }
            }
        }
    }
}

fn shaped_reward(components: &RewardComponents) -> f32 {
    let mut reward = DAMAGE_WEIGHT * components.damage_dealt + KILL_BONUS * components.kills as f32
        - DAMAGE_WEIGHT * components.damage_taken
        + components.step_penalty;
    if components.invalid_action {
        reward -= INVALID_PENALTY;
    }
    reward
}
