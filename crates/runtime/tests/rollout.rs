//! Rollout logger and runner integration tests.

use std::fs;

use serde_json::Value;

use skirmish_runtime::{
    CombatEnv, EnvConfig, HeuristicPolicy, PartyPolicy, RandomPolicy, RolloutLogger,
    SimpleScenario, run_batch, run_episode,
};

fn test_env() -> CombatEnv {
    CombatEnv::new(
        SimpleScenario::default(),
        EnvConfig { max_steps: 60, party_policy: PartyPolicy::Simple },
    )
}

#[test]
fn episodes_produce_coherent_stats() {
    let mut env = test_env();
    let stats = run_episode(&mut env, &RandomPolicy, 42, None).unwrap();

    assert!(stats.steps > 0);
    assert!(stats.steps <= 60);
    assert!(stats.total_reward.is_finite());
    assert!(stats.done || stats.truncated);
    if stats.done {
        assert!(stats.winner.is_some());
    }
}

#[test]
fn batches_aggregate_across_distinct_seeds() {
    let mut env = test_env();
    let batch = run_batch(&mut env, &HeuristicPolicy::default(), 5, 100, None).unwrap();

    assert_eq!(batch.episodes, 5);
    assert_eq!(batch.results.len(), 5);
    let seeds: Vec<u64> = batch.results.iter().map(|r| r.seed).collect();
    assert_eq!(seeds, vec![100, 101, 102, 103, 104]);

    assert!(batch.mean_steps > 0.0);
    assert!(batch.std_reward >= 0.0);
    assert!((0.0..=1.0).contains(&batch.enemy_win_rate));
    assert!((0.0..=1.0).contains(&batch.party_win_rate));
    assert!(batch.enemy_win_rate + batch.party_win_rate <= 1.0 + f32::EPSILON);
    assert!((0.0..=1.0).contains(&batch.invalid_action_rate));
}

#[test]
fn same_seed_same_stats() {
    let mut env = test_env();
    let policy = HeuristicPolicy::default();
    let first = run_episode(&mut env, &policy, 7, None).unwrap();
    let second = run_episode(&mut env, &policy, 7, None).unwrap();
    assert_eq!(first, second);
}

#[test]
fn log_file_carries_header_episode_and_step_records() {
    let dir = tempfile::tempdir().unwrap();
    let mut logger = RolloutLogger::create(dir.path());
    let mut env = test_env();
    run_episode(&mut env, &HeuristicPolicy::default(), 9, Some(&mut logger)).unwrap();

    let contents = fs::read_to_string(logger.path()).unwrap();
    let lines: Vec<Value> = contents
        .lines()
        .map(|line| serde_json::from_str(line).expect("every record is one JSON line"))
        .collect();
    assert!(lines.len() >= 4);

    let header = &lines[0];
    assert_eq!(header["type"], "session_start");
    assert_eq!(header["n_obs"].as_u64().unwrap() as usize, skirmish_engine::N_OBS);
    assert_eq!(header["n_act"].as_u64().unwrap() as usize, skirmish_engine::N_ACT);
    assert!(header["engine_version"].is_string());
    assert!(header["schema_version"].is_u64());

    let start = &lines[1];
    assert_eq!(start["type"], "episode_start");
    assert_eq!(start["seed"], 9);

    let step = &lines[2];
    assert_eq!(step["type"], "step");
    assert_eq!(step["step_idx"], 0);
    assert_eq!(step["obs"].as_array().unwrap().len(), skirmish_engine::N_OBS);
    assert!(step["action_spec"]["action_type"].is_string());
    assert!(step["reward"].is_number());
    assert!(step["info"]["action_valid"].is_boolean());
    assert!(step["reward_components"]["step_penalty"].is_number());

    let end = lines.last().unwrap();
    assert_eq!(end["type"], "episode_end");
    assert!(end["total_steps"].as_u64().unwrap() > 0);
    assert!(end["timestamp"].is_string());
}

#[test]
fn logger_survives_an_unwritable_directory() {
    // Opening a file under a path that exists as a file fails; the logger
    // downgrades to a no-op instead of failing the episode.
    let dir = tempfile::tempdir().unwrap();
    let clobber = dir.path().join("not_a_dir");
    fs::write(&clobber, b"x").unwrap();

    let mut logger = RolloutLogger::create(&clobber);
    let mut env = test_env();
    let stats = run_episode(&mut env, &HeuristicPolicy::default(), 3, Some(&mut logger)).unwrap();
    assert!(stats.steps > 0);
}
