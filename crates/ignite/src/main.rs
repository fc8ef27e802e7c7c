mod cli;
mod demo;
mod logging;
mod manifest;

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Args, Parser, Subcommand};
use ignite_core::registry::resolver;
use ignite_core::{
    BootstrapConfig, BootstrapOutcome, BootstrapScheduler, ComponentRegistry, FrameLoop, KernelError,
    LifecycleState, LoggingHost, StateTracker, TimerManager,
};
use log::{error, info};

use crate::demo::SimulatedComponent;
use crate::manifest::Manifest;

const EXIT_INCOMPLETE: u8 = 2;

/// Ignite: dependency-driven bootstrap scheduler
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct CliArgs {
    /// Simple ping command for testing
    #[arg(long)]
    ping: bool,

    /// Log filter directives (overrides RUST_LOG)
    #[arg(long, global = true)]
    log: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run one bootstrap over the demo set or a manifest
    Run(RunArgs),
    /// Print the dependency table, start waves and cycles
    Graph {
        /// Component manifest (.json, .yaml, .toml)
        #[arg(long)]
        manifest: Option<PathBuf>,
    },
}

#[derive(Args, Debug, Default)]
struct RunArgs {
    /// Component manifest (.json, .yaml, .toml)
    #[arg(long)]
    manifest: Option<PathBuf>,

    /// Scheduler config file (.json, .yaml, .toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Maximum dispatches per tick
    #[arg(long)]
    batch_cap: Option<usize>,

    /// Timeout guard duration in milliseconds
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Frame length in milliseconds
    #[arg(long)]
    frame_ms: Option<u64>,

    /// Refuse manifests containing dependency cycles
    #[arg(long)]
    reject_cycles: bool,

    /// Pace frames in wall-clock time
    #[arg(long)]
    realtime: bool,

    /// Print the final snapshot as JSON
    #[arg(long)]
    json: bool,

    /// Give up after this many frames
    #[arg(long)]
    max_frames: Option<u64>,
}

impl RunArgs {
    fn resolve_config(&self) -> Result<BootstrapConfig, KernelError> {
        let mut config = match &self.config {
            Some(path) => BootstrapConfig::load(path)?,
            None => BootstrapConfig::default(),
        };
        if let Some(batch_cap) = self.batch_cap {
            config.batch_cap = batch_cap;
        }
        if let Some(timeout_ms) = self.timeout_ms {
            config.timeout_ms = timeout_ms;
        }
        if let Some(frame_ms) = self.frame_ms {
            config.frame_ms = frame_ms;
        }
        if self.reject_cycles {
            config.reject_cycles = true;
        }
        config.validate()?;
        Ok(config)
    }
}

fn load_manifest(path: Option<&PathBuf>) -> Result<Manifest, KernelError> {
    match path {
        Some(path) => Ok(Manifest::load(path)?),
        None => Ok(Manifest::demo()),
    }
}

async fn run(args: RunArgs) -> Result<ExitCode, KernelError> {
    let config = args.resolve_config()?;
    let manifest = load_manifest(args.manifest.as_ref())?;

    let timers = Arc::new(TimerManager::new());
    let mut scheduler = BootstrapScheduler::new(config.clone(), timers.clone(), Arc::new(LoggingHost))?;
    for spec in manifest.components {
        scheduler.register(Arc::new(SimulatedComponent::new(spec, Arc::clone(&timers))))?;
    }
    scheduler.subscribe(|event| log::debug!("{}", event));

    scheduler.on_game_start();
    scheduler.start_bootstrap(|| info!("Bootstrap completion callback fired"))?;

    let mut frame_loop = FrameLoop::from_config(&config).realtime(args.realtime);
    if let Some(max_frames) = args.max_frames {
        frame_loop = frame_loop.with_max_frames(max_frames);
    }
    let report = frame_loop.drive(&mut scheduler, Some(&timers)).await;

    let snapshot = scheduler.snapshot();
    if args.json {
        let text = serde_json::to_string_pretty(&snapshot).map_err(|e| KernelError::Other(e.to_string()))?;
        println!("{}", text);
    } else {
        cli::print_status(&snapshot);
    }

    match report.outcome {
        Some(outcome) => {
            if !args.json {
                cli::print_outcome(&outcome, report.frames);
            }
            match outcome {
                BootstrapOutcome::Complete { .. } => Ok(ExitCode::SUCCESS),
                BootstrapOutcome::Incomplete { .. } => Ok(ExitCode::from(EXIT_INCOMPLETE)),
            }
        }
        None => {
            if !args.json {
                println!(
                    "Bootstrap still running after {} frames: {}",
                    report.frames,
                    scheduler.progress()
                );
            }
            Ok(ExitCode::from(EXIT_INCOMPLETE))
        }
    }
}

fn graph(manifest_path: Option<&PathBuf>) -> Result<ExitCode, KernelError> {
    let manifest = load_manifest(manifest_path)?;
    let timers = Arc::new(TimerManager::new());
    let mut registry = ComponentRegistry::new();
    let mut tracker = StateTracker::new();
    for spec in manifest.components {
        let id = registry.register(Arc::new(SimulatedComponent::new(spec, Arc::clone(&timers))))?;
        tracker.track(id);
    }

    println!("{:<24} DEPENDS ON", "COMPONENT");
    for descriptor in registry.descriptors() {
        cli::print_graph_row(descriptor.id(), descriptor.dependencies());
    }

    // Assume every component succeeds and replay the resolver wave by wave
    println!("Start order:");
    let mut wave = 0;
    loop {
        let ready = resolver::eligible(&registry, &tracker);
        if ready.is_empty() {
            break;
        }
        wave += 1;
        cli::print_wave(wave, &ready);
        for id in &ready {
            for next in [
                LifecycleState::Queued,
                LifecycleState::Initializing,
                LifecycleState::Initialized,
            ] {
                tracker.transition(id.as_str(), next)?;
            }
        }
    }

    let blocked = resolver::diagnose(&registry, &tracker);
    for entry in &blocked {
        println!("  {}", entry);
    }
    match resolver::find_cycle(&registry) {
        Some(cycle) => {
            let path: Vec<&str> = cycle.iter().map(|id| id.as_str()).collect();
            println!("Dependency cycle: {}", path.join(" -> "));
        }
        None => println!("No dependency cycles"),
    }

    if blocked.is_empty() {
        Ok(ExitCode::SUCCESS)
    } else {
        Ok(ExitCode::from(EXIT_INCOMPLETE))
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = CliArgs::parse();

    // Handle simple ping command
    if args.ping {
        println!("pong");
        return ExitCode::SUCCESS;
    }

    logging::init(args.log.as_deref());

    let result = match args.command {
        Some(Commands::Run(run_args)) => run(run_args).await,
        Some(Commands::Graph { manifest }) => graph(manifest.as_ref()),
        None => run(RunArgs::default()).await,
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            error!("{}", e);
            eprintln!("ignite: {}", e);
            ExitCode::FAILURE
        }
    }
}
