//! CLI entrypoint for Hydra Consensus
//!
//! This is the main binary that wires together all layers using
//! dependency injection.

mod args;

use anyhow::{Context, Result, anyhow, bail};
use args::{CheckpointsCommand, Cli, Command, ConfigCommand, RunArgs};
use clap::Parser;
use hydra_application::use_cases::refine_candidate::EvolutionaryRefiner;
use hydra_application::{ConsensusEngine, EpisodeRecorder, TaskDispatcher};
use hydra_domain::{AgentRole, CheckpointSnapshot, Router, Task, TaskPriority};
use hydra_infrastructure::{
    CheckpointManager, ConfigLoader, FileConfig, JsonlKnowledgeStore, LlamaGateway, ProcessSandbox,
};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use uuid::Uuid;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity level
    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"), // -vvv or more
    };

    // Keep the appender guard alive for the whole run
    let _guard = match &cli.log_dir {
        Some(dir) => {
            let appender = tracing_appender::rolling::daily(dir, "hydra.log");
            let (writer, guard) = tracing_appender::non_blocking(appender);
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_writer(writer)
                .with_ansi(false)
                .with_target(false)
                .init();
            Some(guard)
        }
        None => {
            tracing_subscriber::fmt()
                .with_env_filter(filter)
                .with_target(false)
                .init();
            None
        }
    };

    info!("Starting Hydra Consensus");

    let config = if cli.no_config {
        ConfigLoader::load_defaults()
    } else {
        ConfigLoader::load(cli.config.as_ref()).map_err(|e| anyhow!("config error: {e}"))?
    };
    for warning in config.validate() {
        warn!("config: {}", warning);
    }

    match cli.command {
        Command::Run(run_args) => run(run_args, &config).await,
        Command::Checkpoints { command } => checkpoints(command, &config).await,
        Command::Config { command } => match command {
            ConfigCommand::Sources => {
                ConfigLoader::print_config_sources();
                Ok(())
            }
        },
    }
}

fn build_task(args: &RunArgs) -> Result<Task> {
    if let Some(path) = &args.file {
        let body = std::fs::read_to_string(path)
            .with_context(|| format!("reading task file {}", path.display()))?;
        let task = serde_json::from_str(&body)
            .with_context(|| format!("parsing task file {}", path.display()))?;
        return Ok(task);
    }

    let title = args.title.as_ref().ok_or_else(|| anyhow!("--title is required"))?;
    let description = args
        .description
        .as_ref()
        .ok_or_else(|| anyhow!("--description is required"))?;
    let id = args
        .id
        .clone()
        .unwrap_or_else(|| Uuid::new_v4().to_string());

    let mut task = Task::new(id, title.clone(), description.clone())
        .with_priority(TaskPriority::from(args.priority));

    if let Some(role) = &args.role {
        let role: AgentRole = role.parse().map_err(|e: String| anyhow!(e))?;
        task = task.with_assigned_agent(role);
    }
    if !args.requirements.is_empty() {
        task = task.with_metadata("requirements", serde_json::json!(args.requirements));
    }

    Ok(task)
}

async fn run(args: RunArgs, config: &FileConfig) -> Result<()> {
    let mut task = build_task(&args)?;

    // === Dependency Injection ===
    let (profiles, _) = config.agents.to_profile_registry();
    let gateway = Arc::new(LlamaGateway::new(profiles)?);
    let knowledge = Arc::new(JsonlKnowledgeStore::new(&config.knowledge.dir));
    let episodes = Arc::new(EpisodeRecorder::new(Arc::clone(&knowledge)));

    let engine = ConsensusEngine::new(Arc::clone(&gateway), config.consensus.to_consensus_config());
    let dispatcher = TaskDispatcher::new(engine, Arc::clone(&knowledge), episodes, Router::default());

    println!("Dispatching task: {} ({})", task.title, task.id);
    let report = dispatcher.execute(&mut task).await?;

    if !report.success {
        if args.checkpoint {
            write_checkpoint(&task, &report.episode_id, config).await?;
        }
        bail!(
            "task failed: {}",
            report.error.as_deref().unwrap_or("unknown error")
        );
    }

    println!();
    println!("Consensus reached over {} candidates", report.iterations);
    if let Some(consensus) = &report.consensus {
        println!("Winning score: {:.3}", consensus.winning_score);
        println!("Reasoning: {}", consensus.reasoning);
    }
    if let Some(winner) = &report.winner {
        println!();
        println!("--- Winning solution ({}) ---", winner.approach);
        println!("{}", winner.content);
    }

    if args.refine
        && let Some(winner) = &report.winner
    {
        println!();
        println!("Refining winning candidate...");

        let sandbox = Arc::new(ProcessSandbox::default());
        let refiner = EvolutionaryRefiner::new(
            Arc::clone(&gateway),
            sandbox,
            config.refiner.to_refiner_config(),
        )
        .with_weights(config.refiner.to_fitness_weights());

        let outcome = refiner.refine(&task, winner, winner.agent_role).await;
        println!(
            "Refinement: {} generations, fitness {:.3} -> {:.3}",
            outcome.generations, outcome.seed_fitness, outcome.fitness
        );
        if outcome.improved() {
            println!();
            println!("--- Refined solution ---");
            println!("{}", outcome.best.content);
        } else {
            println!("No improvement found; keeping the consensus winner.");
        }
    }

    if args.checkpoint {
        write_checkpoint(&task, &report.episode_id, config).await?;
    }

    Ok(())
}

async fn write_checkpoint(task: &Task, episode_id: &str, config: &FileConfig) -> Result<()> {
    let manager = CheckpointManager::new(&config.checkpoint.dir)
        .with_retention(config.checkpoint.retention);

    let snapshot = CheckpointSnapshot::new(
        vec![task.clone()],
        serde_json::json!({ "last_episode_id": episode_id }),
        HashMap::new(),
    );
    let id = manager.create(&snapshot).await?;
    println!("Checkpoint written: {id}");
    Ok(())
}

async fn checkpoints(command: CheckpointsCommand, config: &FileConfig) -> Result<()> {
    let manager = CheckpointManager::new(&config.checkpoint.dir)
        .with_retention(config.checkpoint.retention);

    match command {
        CheckpointsCommand::List => {
            let infos = manager.list().await?;
            if infos.is_empty() {
                println!("No checkpoints in {}", config.checkpoint.dir);
                return Ok(());
            }
            println!("{:<17} {:<27} {:>5} {:>9}", "ID", "CREATED", "TASKS", "SIZE");
            for info in infos {
                println!(
                    "{:<17} {:<27} {:>5} {:>8}B",
                    info.id, info.created_at, info.task_count, info.file_size
                );
            }
        }
        CheckpointsCommand::Restore { id } => {
            let Some(restored) = manager.restore(id.as_deref()).await? else {
                bail!("no matching checkpoint found");
            };
            println!(
                "Restored {} tasks from checkpoint {}",
                restored.tasks.len(),
                restored.checkpoint_id
            );
            for task in &restored.tasks {
                println!("  {} [{}] {}", task.id, task.status, task.title);
            }
        }
    }
    Ok(())
}
