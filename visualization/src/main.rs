//! `labelflow` command line front end
//!
//! Copyright (c) 2025 Mohammad Atashi <mohammadaliatashi@icloud.com>

use std::io::{self, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use log::info;

use labelflow_core::{
    infer_node_count, read_edge_list, Capacity, CapacityMatrix, ExecutionHistory, MaxFlowAlgorithm,
    MaxFlowSolver, ObserverChain, SolverConfig, StepRecorder,
};
use labelflow_visualization::{render_history, DotFrameWriter, GraphView, DEFAULT_FPS};

#[derive(Debug, Parser)]
#[command(name = "labelflow")]
#[command(version, about = "Maximum flow by the labeling method", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Solve a network read from an edge list
    Solve(SolveArgs),
    /// Replay a recorded trace into DOT frames
    Render(RenderArgs),
}

#[derive(Debug, Args)]
struct SolveArgs {
    /// Edge list file, one `start end capacity` per line
    edges: PathBuf,
    /// Number of nodes (default: highest referenced index + 1)
    #[arg(long)]
    nodes: Option<usize>,
    /// labeling or edmonds-karp, overrides the config file
    #[arg(long)]
    algorithm: Option<MaxFlowAlgorithm>,
    /// Check flow invariants after solving
    #[arg(long)]
    verify: bool,
    /// Read capacities as floating point numbers
    #[arg(long)]
    float: bool,
    /// Solver configuration (JSON)
    #[arg(long)]
    config: Option<PathBuf>,
    /// Write one DOT frame per step into this directory
    #[arg(long)]
    frames: Option<PathBuf>,
    /// Frame rate recorded in the frame manifest
    #[arg(long, default_value_t = DEFAULT_FPS)]
    fps: u32,
    /// Record every step into a JSON trace
    #[arg(long)]
    trace: Option<PathBuf>,
    /// Print the full result as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Args)]
struct RenderArgs {
    /// JSON trace written by `solve --trace`
    trace: PathBuf,
    /// Output directory for the frames
    #[arg(long)]
    frames: PathBuf,
    #[arg(long, default_value_t = DEFAULT_FPS)]
    fps: u32,
    /// The trace holds floating point capacities
    #[arg(long)]
    float: bool,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();
    let stdout = io::stdout();
    let mut out = stdout.lock();
    run(cli.command, &mut out)
}

fn run(command: Commands, out: &mut impl Write) -> Result<()> {
    match command {
        Commands::Solve(args) if args.float => solve::<f64>(&args, out),
        Commands::Solve(args) => solve::<i64>(&args, out),
        Commands::Render(args) if args.float => render::<f64>(&args, out),
        Commands::Render(args) => render::<i64>(&args, out),
    }
}

fn solver_config(args: &SolveArgs) -> Result<SolverConfig> {
    let mut config = match &args.config {
        Some(path) => SolverConfig::from_file(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => SolverConfig::default(),
    };
    if let Some(algorithm) = args.algorithm {
        config.algorithm = algorithm;
    }
    config.verify |= args.verify;
    Ok(config)
}

fn solve<C: Capacity>(args: &SolveArgs, out: &mut impl Write) -> Result<()> {
    let config = solver_config(args)?;
    let edges = read_edge_list::<C>(&args.edges)
        .with_context(|| format!("failed to read edge list {}", args.edges.display()))?;
    let nodes = args.nodes.unwrap_or_else(|| infer_node_count(&edges));
    let network = CapacityMatrix::from_edges(nodes, edges)?;
    let solver = MaxFlowSolver::from_config(&config);

    let mut frames = match &args.frames {
        Some(dir) => Some(DotFrameWriter::new(dir)?.with_fps(args.fps)?),
        None => None,
    };
    let mut recorder = args.trace.as_ref().map(|_| StepRecorder::<C>::new());

    let result = {
        let mut chain: ObserverChain<'_, C> = ObserverChain::new();
        if let Some(writer) = frames.as_mut() {
            chain.push(writer);
        }
        if let Some(recorder) = recorder.as_mut() {
            chain.push(recorder);
        }
        if chain.is_empty() {
            solver.solve(&network)?
        } else {
            solver.solve_with_observer(&network, Some(&mut chain))?
        }
    };

    if let Some(writer) = frames {
        let dir = writer.dir().to_path_buf();
        let manifest = writer.finish()?;
        info!("{} frames in {}", manifest.frames.len(), dir.display());
    }
    if let (Some(recorder), Some(path)) = (recorder, &args.trace) {
        recorder
            .into_history(config.algorithm.as_str())
            .write_to(path)
            .with_context(|| format!("failed to write trace {}", path.display()))?;
    }

    if args.json {
        writeln!(out, "{}", serde_json::to_string_pretty(&result)?)?;
    } else {
        writeln!(out, "{}", result.net_flow)?;
        writeln!(out, "{}", result.max_flow)?;
    }
    Ok(())
}

fn render<C: Capacity>(args: &RenderArgs, out: &mut impl Write) -> Result<()> {
    let history = ExecutionHistory::<C>::read_from(&args.trace)
        .with_context(|| format!("failed to load trace {}", args.trace.display()))?;
    let manifest = render_history(&history, &args.frames, GraphView::default(), args.fps)?;
    writeln!(
        out,
        "rendered {} frames of {} into {}",
        manifest.frames.len(),
        history.metadata().algorithm_name,
        args.frames.display()
    )?;
    Ok(())
}
