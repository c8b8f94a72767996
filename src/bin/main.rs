use std::{fs::File, io, path::PathBuf};

use clap::{Parser, Subcommand};
use simulation::{
    init::{self, Episode},
    normalize_rotation, App, CommandProvider, Control, DriverConfig, LanderStatus,
    SimulationState,
};
use tracing::info;

#[derive(Parser)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Fly one episode with the built-in autopilot
    Run {
        /// Episode json file path
        #[arg(long, value_name = "FILE")]
        sim: Option<PathBuf>,

        /// Terrain seed, overrides the episode file
        #[arg(long)]
        seed: Option<u64>,

        /// Step with a fixed time step instead of the real-time driver
        #[arg(long)]
        headless: bool,

        /// Fixed time step for headless runs, in seconds
        #[arg(long, default_value = "0.03")]
        time_step: f64,

        /// Maximal number of ticks for headless runs
        #[arg(long, short, default_value = "100000")]
        ticks: usize,
    },
    /// Write the generated terrain as tab separated x/y lines
    Terrain {
        #[arg(long, default_value = "42")]
        seed: u64,

        /// Output file, stdout when missing
        #[arg(long, value_name = "FILE")]
        out: Option<PathBuf>,
    },
}

/// Keeps the nose up and fires the engine while sinking faster than the target rate.
struct Autopilot {
    target_vy: f64,
    rotation_rate: f64,
}

impl Default for Autopilot {
    fn default() -> Self {
        Self {
            target_vy: -1.,
            rotation_rate: 35.,
        }
    }
}

impl CommandProvider for Autopilot {
    fn get_cmd(&mut self, state: &SimulationState) -> Control {
        let lander = &state.lander;
        let tilt = normalize_rotation(lander.rotation);
        let rotation_rate = if tilt.abs() < 1. {
            0.
        } else {
            -tilt.signum() * self.rotation_rate
        };
        Control::new(rotation_rate, lander.vy < self.target_vy)
    }
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let json = matches!(std::env::var("LOG_FORMAT").as_deref(), Ok("json"));
    if json {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .json()
            .with_current_span(true)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .compact()
            .init();
    }

    std::panic::set_hook(Box::new(|info| {
        let backtrace = std::backtrace::Backtrace::capture();
        tracing::error!(%info, ?backtrace, "panic");
    }));
}

fn load_episode(sim: Option<PathBuf>, seed: Option<u64>) -> Result<Episode, String> {
    let episode = match sim {
        Some(path) => init::json::parse_episode(path).map_err(|e| e.to_string())?,
        None => Episode::default(),
    };
    Ok(match seed {
        Some(seed) => episode.with_seed(seed),
        None => episode,
    })
}

async fn run_live(app: App) -> Result<SimulationState, String> {
    let session = app.start();
    let mut updates = session.subscribe();
    let mut autopilot = Autopilot::default();

    while updates.changed().await.is_ok() {
        let state = updates.borrow_and_update().clone();
        if state.lander_status.is_terminal() {
            break;
        }
        let Control {
            rotation_rate,
            engine_on,
        } = autopilot.get_cmd(&state);
        session.set_control(rotation_rate, engine_on);
        if state.tick % 30 == 0 {
            info!(
                tick = state.tick,
                x = state.lander.x,
                y = state.lander.y,
                vx = state.lander.vx,
                vy = state.lander.vy,
                fps = session.frame_rate(),
                "flying"
            );
        }
    }
    session.finished().await.map_err(|e| e.to_string())
}

fn report(state: &SimulationState) {
    match state.lander_status {
        LanderStatus::Landed => info!(tick = state.tick, "LANDED!"),
        LanderStatus::Crushed => info!(tick = state.tick, landing = ?state.landing, "CRASHED!"),
        LanderStatus::InAir => info!(tick = state.tick, "still in the air"),
    }
}

#[tokio::main]
async fn main() -> Result<(), String> {
    let _ = dotenvy::dotenv();
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Command::Run {
            sim,
            seed,
            headless,
            time_step,
            ticks,
        } => {
            let episode = load_episode(sim, seed)?;
            let app = App::try_new(episode, DriverConfig::from_env()).map_err(|e| e.to_string())?;
            let state = if headless {
                let now = std::time::Instant::now();
                let (state, history) = app.run_headless(&mut Autopilot::default(), time_step, ticks);
                println!("{}", history.pretty_to_string());
                info!(elapsed = ?now.elapsed(), "headless run");
                state
            } else {
                run_live(app).await?
            };
            report(&state);
        }
        Command::Terrain { seed, out } => {
            let terrain = Episode::default()
                .with_seed(seed)
                .terrain_generator()
                .generate()
                .map_err(|e| e.to_string())?;
            let result = match out {
                Some(path) => File::create(&path)
                    .and_then(|file| init::dat::write_terrain(&terrain, file)),
                None => init::dat::write_terrain(&terrain, io::stdout().lock()),
            };
            result.map_err(|e| format!("Failed to write terrain: {e}"))?;
        }
    }
    Ok(())
}
