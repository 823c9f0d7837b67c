//! Headless batch runner.
//!
//! Runs N combat episodes under a chosen enemy policy, optionally recording
//! JSONL rollouts, and prints aggregate statistics. The comparison mode
//! re-runs the same batch under the random baseline.

use anyhow::Result;
use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

use skirmish_runtime::{
    BatchStats, CombatEnv, EnemyPolicy, EnvConfig, HeuristicPolicy, PartyPolicy, RandomPolicy,
    RolloutLogger, ScenarioConfig, SimpleScenario, run_batch,
};

#[derive(Clone, Copy, Debug, ValueEnum)]
enum PolicyArg {
    Heuristic,
    Random,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum PartyArg {
    Simple,
    Passive,
}

#[derive(Parser, Debug)]
#[command(name = "skirmish", about = "Headless tactical combat rollouts")]
struct Args {
    /// Number of episodes to run.
    #[arg(short = 'n', long, default_value_t = 10)]
    episodes: usize,

    /// Base seed; episode i uses seed base + i.
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Enemy policy driving the controlled side.
    #[arg(long, value_enum, default_value_t = PolicyArg::Heuristic)]
    policy: PolicyArg,

    /// Scripted behavior of the party side.
    #[arg(long, value_enum, default_value_t = PartyArg::Simple)]
    party: PartyArg,

    /// Step cap per episode before truncation.
    #[arg(long, default_value_t = 100)]
    max_steps: u32,

    #[arg(long, default_value_t = 2)]
    num_party: usize,

    #[arg(long, default_value_t = 2)]
    num_enemies: usize,

    #[arg(long, default_value_t = 15)]
    grid_width: i32,

    #[arg(long, default_value_t = 15)]
    grid_height: i32,

    /// Directory for JSONL rollout logs; logging is off without it.
    #[arg(long)]
    log_dir: Option<std::path::PathBuf>,

    /// Also run the batch under the random policy for comparison.
    #[arg(long)]
    compare: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let args = Args::parse();

    let scenario = SimpleScenario::new(ScenarioConfig {
        num_party: args.num_party,
        num_enemies: args.num_enemies,
        grid_width: args.grid_width,
        grid_height: args.grid_height,
    });
    let config = EnvConfig {
        max_steps: args.max_steps,
        party_policy: match args.party {
            PartyArg::Simple => PartyPolicy::Simple,
            PartyArg::Passive => PartyPolicy::Passive,
        },
    };

    let mut logger = args.log_dir.as_ref().map(RolloutLogger::create);
    if let Some(logger) = &logger {
        tracing::info!(path = %logger.path().display(), "recording rollouts");
    }

    let policy: Box<dyn EnemyPolicy> = match args.policy {
        PolicyArg::Heuristic => Box::new(HeuristicPolicy::default()),
        PolicyArg::Random => Box::new(RandomPolicy),
    };

    let mut env = CombatEnv::new(scenario.clone(), config);
    let batch = run_batch(&mut env, policy.as_ref(), args.episodes, args.seed, logger.as_mut())?;
    print_report(&format!("{:?} policy", args.policy), &batch);

    if args.compare {
        let mut env = CombatEnv::new(scenario, config);
        let baseline = run_batch(&mut env, &RandomPolicy, args.episodes, args.seed, None)?;
        print_report("Random baseline", &baseline);
    }

    Ok(())
}

fn print_report(label: &str, batch: &BatchStats) {
    println!("== {label} ({} episodes) ==", batch.episodes);
    println!("  reward          {:>8.2} ± {:.2}", batch.mean_reward, batch.std_reward);
    println!("  steps           {:>8.1}", batch.mean_steps);
    println!("  damage dealt    {:>8.1}", batch.mean_damage_dealt);
    println!("  kills           {:>8.2}", batch.mean_kills);
    println!("  invalid rate    {:>8.3}", batch.invalid_action_rate);
    println!("  enemy win rate  {:>7.1}%", batch.enemy_win_rate * 100.0);
    println!("  party win rate  {:>7.1}%", batch.party_win_rate * 100.0);
}
