//! Append-only JSONL rollout logger.
//!
//! One line per record, each self-describing via a `type` field. A session
//! header carrying the engine version and the observation/action dimensions
//! opens every file so downstream consumers can validate compatibility
//! before parsing trajectories. Write failures are warnings, never errors:
//! a full disk must not kill a training run.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use chrono::Utc;
use serde::Serialize;

use skirmish_engine::{
    ActionSpec, ActionType, ENGINE_VERSION, N_ACT, N_OBS, RewardComponents, SCHEMA_VERSION, Side,
};

/// Excerpt of step info carried in each step record.
#[derive(Clone, Debug, Serialize)]
pub struct InfoExcerpt {
    pub action_type: Option<ActionType>,
    pub action_valid: bool,
}

/// One environment transition, ready to log.
#[derive(Clone, Debug, Serialize)]
pub struct StepRecord<'a> {
    pub obs: &'a [f32],
    pub action_index: usize,
    pub action_spec: Option<ActionSpec>,
    pub reward: f32,
    pub reward_components: &'a RewardComponents,
    pub done: bool,
    pub truncated: bool,
    pub info: InfoExcerpt,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_obs: Option<&'a [f32]>,
}

#[derive(Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum Record<'a> {
    SessionStart {
        timestamp: String,
        engine_version: &'static str,
        schema_version: u32,
        n_obs: usize,
        n_act: usize,
    },
    EpisodeStart {
        timestamp: String,
        episode_id: String,
        seed: u64,
    },
    Step {
        timestamp: String,
        episode_id: String,
        seed: u64,
        step_idx: u64,
        #[serde(flatten)]
        step: StepRecord<'a>,
    },
    EpisodeEnd {
        timestamp: String,
        episode_id: String,
        total_steps: u64,
        total_reward: f32,
        winner: Option<Side>,
    },
}

/// Rollout writer partitioning records by episode within one session file.
pub struct RolloutLogger {
    path: PathBuf,
    file: Option<fs::File>,
    episode_id: Option<String>,
    seed: u64,
    step_idx: u64,
}

impl RolloutLogger {
    /// Opens a new session file under `dir` and writes the header record.
    /// Filesystem trouble is reported and swallowed; the logger then drops
    /// everything silently.
    pub fn create(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        let stamp = Utc::now().format("%Y%m%d_%H%M%S%.3f");
        let path = dir.join(format!("rollout_{stamp}.jsonl"));

        let file = fs::create_dir_all(dir)
            .and_then(|_| fs::OpenOptions::new().create(true).append(true).open(&path))
            .map_err(|err| {
                tracing::warn!(path = %path.display(), %err, "rollout log unavailable");
                err
            })
            .ok();

        let mut logger = Self { path, file, episode_id: None, seed: 0, step_idx: 0 };
        logger.write(&Record::SessionStart {
            timestamp: Utc::now().to_rfc3339(),
            engine_version: ENGINE_VERSION,
            schema_version: SCHEMA_VERSION,
            n_obs: N_OBS,
            n_act: N_ACT,
        });
        logger
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Marks an episode boundary. The episode id defaults to a timestamp.
    pub fn start_episode(&mut self, seed: u64, episode_id: Option<String>) {
        let episode_id =
            episode_id.unwrap_or_else(|| Utc::now().format("%Y%m%d_%H%M%S%.6f").to_string());
        self.seed = seed;
        self.step_idx = 0;
        self.write(&Record::EpisodeStart {
            timestamp: Utc::now().to_rfc3339(),
            episode_id: episode_id.clone(),
            seed,
        });
        self.episode_id = Some(episode_id);
    }

    /// Appends one transition to the current episode.
    pub fn log_step(&mut self, step: StepRecord<'_>) {
        let Some(episode_id) = self.episode_id.clone() else {
            tracing::warn!("step logged outside an episode, dropping");
            return;
        };
        let record = Record::Step {
            timestamp: Utc::now().to_rfc3339(),
            episode_id,
            seed: self.seed,
            step_idx: self.step_idx,
            step,
        };
        self.write(&record);
        self.step_idx += 1;
    }

    /// Closes the current episode with its summary record.
    pub fn end_episode(&mut self, total_reward: f32, winner: Option<Side>) {
        if let Some(episode_id) = self.episode_id.take() {
            self.write(&Record::EpisodeEnd {
                timestamp: Utc::now().to_rfc3339(),
                episode_id,
                total_steps: self.step_idx,
                total_reward,
                winner,
            });
        }
        self.step_idx = 0;
    }

    fn write<T: Serialize>(&mut self, record: &T) {
        let Some(file) = self.file.as_mut() else {
            return;
        };
        let line = match serde_json::to_string(record) {
            Ok(line) => line,
            Err(err) => {
                tracing::warn!(%err, "failed to serialize rollout record");
                return;
            }
        };
        if let Err(err) = writeln!(file, "{line}") {
            tracing::warn!(path = %self.path.display(), %err, "failed to write rollout record");
        }
    }
}
