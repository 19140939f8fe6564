#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that boots the Sky-Bridge Siege experience.

mod scene;

use std::{path::PathBuf, time::Instant};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use sky_bridge_siege_core::{Control, Event};
use sky_bridge_siege_rendering::{
    Color, FrameSimulationBreakdown, Presentation, RenderingBackend, Scene,
};
use sky_bridge_siege_rendering_macroquad::MacroquadBackend;
use sky_bridge_siege_simulation::{GameConfig, Simulation};
use sky_bridge_siege_world::query;
use tracing_subscriber::filter::EnvFilter;

const WINDOW_TITLE: &str = "Sky-Bridge Siege";
const CLEAR_COLOR: Color = Color::rgb(0.05, 0.05, 0.1);

/// Presentation synchronisation requested from the platform.
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum VsyncMode {
    /// Wait for the display refresh.
    On,
    /// Present frames as fast as possible.
    Off,
}

#[derive(Debug, Parser)]
#[command(name = "sky-bridge-siege")]
#[command(about = "Stack the tower, hold the wall, slice what wobbles")]
struct Args {
    /// TOML file with game tuning; built-in defaults are used when omitted
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Seed overriding the configured one
    #[arg(long)]
    seed: Option<u64>,
    /// Log filter directive, takes precedence over RUST_LOG
    #[arg(long, value_name = "DIRECTIVE")]
    log_filter: Option<String>,
    /// Display synchronisation
    #[arg(long, value_enum, default_value_t = VsyncMode::On)]
    vsync: VsyncMode,
    /// Log frame timing once per second
    #[arg(long)]
    show_fps: bool,
}

/// Entry point for the Sky-Bridge Siege command-line interface.
fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.log_filter.as_deref())?;

    let mut config = match &args.config {
        Some(path) => GameConfig::load(path)
            .with_context(|| format!("failed to load configuration from {}", path.display()))?,
        None => GameConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.seed = seed;
    }

    let mut simulation = Simulation::new(config).context("invalid game configuration")?;
    tracing::info!("{}", query::welcome_banner(simulation.world()));

    let mut initial_scene = Scene::new(scene::arena()?, scene::camera(simulation.world()));
    scene::populate(&mut initial_scene, simulation.world());
    let presentation = Presentation::new(WINDOW_TITLE, CLEAR_COLOR, initial_scene);

    MacroquadBackend::new()
        .with_vsync(args.vsync == VsyncMode::On)
        .with_show_fps(args.show_fps)
        .run(presentation, move |dt, input, scene| {
            let simulation_start = Instant::now();
            for control in Control::ALL {
                simulation.set_control(control, input.held.is_held(control));
            }
            let mut events = Vec::new();
            for action in input.actions {
                events.extend(simulation.trigger(action));
            }
            events.extend(simulation.step(dt));
            report(&events, query::counters(simulation.world()).score);
            let simulation_time = simulation_start.elapsed();

            let scene_start = Instant::now();
            scene::populate(scene, simulation.world());
            FrameSimulationBreakdown {
                simulation: simulation_time,
                scene_population: scene_start.elapsed(),
            }
        })
}

/// Session line for the events a player would want in the log.
fn headline(event: &Event) -> Option<String> {
    match event {
        Event::GameOver { reason } => Some(format!("game over: {}", reason.message())),
        Event::LayerSliced { layer } => Some(format!("layer {layer} sliced")),
        Event::LayerCollapsed { layer } => Some(format!("layer {layer} collapsed")),
        Event::PlayerDamaged { lives_remaining } => {
            Some(format!("hit by an enemy, {lives_remaining} lives left"))
        }
        Event::NukeArmed => Some("nuke ready".to_owned()),
        Event::NukeDetonated => Some("nuke detonated".to_owned()),
        Event::Restarted => Some("new game started".to_owned()),
        _ => None,
    }
}

fn report(events: &[Event], score: u32) {
    for line in events.iter().filter_map(headline) {
        tracing::info!(target: "session", score, "{line}");
    }
}

fn init_logging(directive: Option<&str>) -> Result<()> {
    let filter = match directive {
        Some(directive) => EnvFilter::try_new(directive)
            .with_context(|| format!("invalid log filter `{directive}`"))?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();
    Ok(())
}
