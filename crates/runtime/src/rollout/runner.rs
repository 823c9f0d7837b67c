//! Headless episode runner and batch aggregation.

use serde::Serialize;

use skirmish_engine::{ActionSpec, Side};

use crate::env::CombatEnv;
use crate::error::EnvError;
use crate::policy::EnemyPolicy;
use crate::rollout::{InfoExcerpt, RolloutLogger, StepRecord};

/// Per-episode outcome statistics.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct EpisodeStats {
    pub seed: u64,
    pub total_reward: f32,
    pub steps: u32,
    pub damage_dealt: f32,
    pub damage_taken: f32,
    pub kills: u32,
    pub invalid_actions: u32,
    pub winner: Option<Side>,
    pub done: bool,
    pub truncated: bool,
}

/// Aggregates over a batch of episodes.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct BatchStats {
    pub episodes: usize,
    pub mean_reward: f32,
    pub std_reward: f32,
    pub mean_steps: f32,
    pub mean_damage_dealt: f32,
    pub mean_kills: f32,
    /// Invalid actions per step across the whole batch.
    pub invalid_action_rate: f32,
    pub enemy_win_rate: f32,
    pub party_win_rate: f32,
    pub results: Vec<EpisodeStats>,
}

/// Runs one episode under `policy`, optionally logging every transition.
pub fn run_episode(
    env: &mut CombatEnv,
    policy: &dyn EnemyPolicy,
    seed: u64,
    mut logger: Option<&mut RolloutLogger>,
) -> Result<EpisodeStats, EnvError> {
    let (mut obs, _info) = env.reset(Some(seed))?;
    if let Some(logger) = logger.as_deref_mut() {
        logger.start_episode(seed, None);
    }

    let mut stats = EpisodeStats {
        seed,
        total_reward: 0.0,
        steps: 0,
        damage_dealt: 0.0,
        damage_taken: 0.0,
        kills: 0,
        invalid_actions: 0,
        winner: None,
        done: false,
        truncated: false,
    };

    loop {
        let (state, enemy_idx, dice) = env.decision_context()?;
        let action_index = policy.select(state, enemy_idx, dice);

        let transition = env.step(action_index)?;
        let components = transition.info.reward_components;

        if let Some(logger) = logger.as_deref_mut() {
            logger.log_step(StepRecord {
                obs: &obs,
                action_index,
                action_spec: ActionSpec::from_index(action_index),
                reward: transition.reward,
                reward_components: &components,
                done: transition.done,
                truncated: transition.truncated,
                info: InfoExcerpt {
                    action_type: transition.info.action_type,
                    action_valid: transition.info.action_valid,
                },
                next_obs: Some(&transition.obs),
            });
        }

        stats.total_reward += transition.reward;
        stats.steps += 1;
        stats.damage_dealt += components.damage_dealt;
        stats.damage_taken += components.damage_taken;
        stats.kills += components.kills;
        if components.invalid_action {
            stats.invalid_actions += 1;
        }

        obs = transition.obs;
        if transition.done || transition.truncated {
            stats.done = transition.done;
            stats.truncated = transition.truncated;
            break;
        }
    }

    stats.winner = env.state().and_then(|state| state.winner());
    if let Some(logger) = logger {
        logger.end_episode(stats.total_reward, stats.winner);
    }
    Ok(stats)
}

/// Runs `episodes` episodes with seeds `base_seed..base_seed + episodes` and
/// aggregates the results.
pub fn run_batch(
    env: &mut CombatEnv,
    policy: &dyn EnemyPolicy,
    episodes: usize,
    base_seed: u64,
    mut logger: Option<&mut RolloutLogger>,
) -> Result<BatchStats, EnvError> {
    let mut results = Vec::with_capacity(episodes);
    for i in 0..episodes {
        let seed = base_seed + i as u64;
        let stats = run_episode(env, policy, seed, logger.as_deref_mut())?;
        tracing::debug!(
            episode = i,
            seed,
            reward = stats.total_reward,
            steps = stats.steps,
            winner = ?stats.winner,
            "episode finished"
        );
        results.push(stats);
    }
    Ok(aggregate(results))
}

fn aggregate(results: Vec<EpisodeStats>) -> BatchStats {
    let n = results.len().max(1) as f32;
    let mean = |f: &dyn Fn(&EpisodeStats) -> f32| results.iter().map(f).sum::<f32>() / n;

    let mean_reward = mean(&|r| r.total_reward);
    let variance =
        results.iter().map(|r| (r.total_reward - mean_reward).powi(2)).sum::<f32>() / n;
    let total_steps: u32 = results.iter().map(|r| r.steps).sum();
    let total_invalid: u32 = results.iter().map(|r| r.invalid_actions).sum();

    BatchStats {
        episodes: results.len(),
        mean_reward,
        std_reward: variance.sqrt(),
        mean_steps: mean(&|r| r.steps as f32),
        mean_damage_dealt: mean(&|r| r.damage_dealt),
        mean_kills: mean(&|r| r.kills as f32),
        invalid_action_rate: if total_steps > 0 {
            total_invalid as f32 / total_steps as f32
        } else {
            0.0
        },
        enemy_win_rate: results.iter().filter(|r| r.winner == Some(Side::Enemy)).count() as f32 / n,
        party_win_rate: results.iter().filter(|r| r.winner == Some(Side::Party)).count() as f32 / n,
        results,
    }
}
