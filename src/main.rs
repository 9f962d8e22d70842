use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::Parser;
use tracing::info;

use rs_errand_robot::camera::Camera;
use rs_errand_robot::config::BehaviorConfig;
use rs_errand_robot::interaction::PointerEvent;
use rs_errand_robot::render_traits::DrawLog;
use rs_errand_robot::simulation::Simulation;
use rs_errand_robot::state::BatteryPhase;
use rs_errand_robot::utils::dump_point;

#[derive(Parser)]
#[command(version, about = "Errand robot: picks up what you drop and brings it to the receptacle")]
struct Args {
    /// YAML file with behavior parameters overriding the defaults.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Frames to run headless.
    #[arg(long, default_value_t = 5000)]
    frames: u64,
    /// Canvas position "x,y" (512x512) to drag the object to before releasing it.
    /// Without it the object is dropped straight down.
    #[arg(long, value_parser = parse_canvas_point)]
    drop_at: Option<PointerEvent>,
    /// Log filter, for instance "info" or "rs_errand_robot=debug".
    #[arg(long, default_value = "info")]
    log_level: String,
    /// Print the effective configuration as YAML and exit.
    #[arg(long)]
    print_config: bool,
    /// Open an interactive window instead of running headless.
    #[arg(long)]
    visualize: bool,
}

fn parse_canvas_point(text: &str) -> Result<PointerEvent, String> {
    let (x, y) = text.split_once(',')
        .ok_or_else(|| format!("expected x,y (got '{}')", text))?;
    let x: f64 = x.trim().parse().map_err(|e| format!("bad x '{}': {}", x, e))?;
    let y: f64 = y.trim().parse().map_err(|e| format!("bad y '{}': {}", y, e))?;
    Ok(PointerEvent::new(x, y))
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::new(&args.log_level))
        .init();

    let config = match &args.config {
        Some(path) => BehaviorConfig::from_yaml_file(path)
            .with_context(|| format!("Cannot read configuration from {}", path.display()))?,
        None => BehaviorConfig::default(),
    };

    if args.print_config {
        print!("{}", config.to_yaml());
        return Ok(());
    }

    let simulation = Simulation::new(config).context("Invalid configuration")?;

    if args.visualize {
        return visualize(simulation);
    }
    run_headless(simulation, args.frames, args.drop_at)
}

#[cfg(feature = "visualization")]
fn visualize(simulation: Simulation) -> anyhow::Result<()> {
    rs_errand_robot::visualization::visualize(simulation);
    Ok(())
}

#[cfg(not(feature = "visualization"))]
fn visualize(_simulation: Simulation) -> anyhow::Result<()> {
    bail!("Built without the 'visualization' feature");
}

/// Runs the frame loop, dropping the object whenever the robot waits for it, and prints
/// how many frames each phase took.
fn run_headless(mut simulation: Simulation, frames: u64, drop_at: Option<PointerEvent>) -> anyhow::Result<()> {
    let camera = Camera::default();
    let mut log = DrawLog::new();
    let mut phase_frames: BTreeMap<String, u64> = BTreeMap::new();

    for _ in 0..frames {
        if simulation.awaiting_drop() && !simulation.drag_and_release(&camera, drop_at) {
            bail!("The object at {:?} cannot be picked with the default camera",
                simulation.state.object.position);
        }
        simulation.frame(&camera, &mut log);

        let state = &simulation.state;
        let phase = if state.battery == BatteryPhase::Normal {
            format!("errand {:?}", state.errand)
        } else {
            format!("battery {:?}", state.battery)
        };
        *phase_frames.entry(phase).or_default() += 1;
    }

    let state = &simulation.state;
    info!(frames = simulation.frames, draws = log.calls.len(), "Headless run finished");
    println!("Frames per phase:");
    for (phase, count) in &phase_frames {
        println!("  {:<40} {:>8}", phase, count);
    }
    println!("Errands completed: {}", state.total_cycles);
    println!("Objects in the receptacle: {}", state.collection.len());
    println!("Charges: {}", state.charges);
    dump_point("Robot", &state.root.position);
    dump_point("Object", &state.object.position);
    Ok(())
}
