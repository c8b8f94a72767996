use std::sync::Arc;

use tokio::{
    sync::{watch, Notify},
    task::JoinHandle,
    time::{Instant, MissedTickBehavior},
};
use tracing::{debug, info, warn};

use crate::init::Episode;
use crate::simulation::*;
use crate::{DriverConfig, Error};

/// Source of control input for a headless run.
pub trait CommandProvider {
    fn get_cmd(&mut self, state: &SimulationState) -> Control;
}

impl CommandProvider for Control {
    fn get_cmd(&mut self, _: &SimulationState) -> Control {
        *self
    }
}

pub struct App {
    runner: LanderRunner,
    config: DriverConfig,
}

impl App {
    pub fn try_new(episode: Episode, config: DriverConfig) -> Result<Self, Error> {
        let terrain = Arc::new(episode.terrain_generator().generate()?);
        let runner = LanderRunner::try_new(
            episode.lander,
            terrain,
            Physics::default().with_gravity(episode.gravity),
            episode.collision_checker,
        )?;
        Ok(Self { runner, config })
    }

    pub fn current_state(&self) -> SimulationState {
        self.runner.current_state()
    }

    pub fn terrain(&self) -> &Arc<Terrain> {
        self.runner.terrain()
    }

    /// Runs the episode on the calling thread with a fixed time step. Stops at
    /// the first terminal status or after `max_ticks`.
    pub fn run_headless<P: CommandProvider>(
        mut self,
        provider: &mut P,
        time: f64,
        max_ticks: usize,
    ) -> (SimulationState, LanderHistory) {
        let mut history = LanderHistory::with_initial_state(self.runner.state().lander);
        for _ in 0..max_ticks {
            let control = provider.get_cmd(self.runner.state());
            match self.runner.iterate(control, time) {
                ExecutionStatus::InProgress => {
                    history.append_lander_state(&self.runner.state().lander)
                }
                ExecutionStatus::Finished => break,
            }
        }
        let state = self.runner.current_state();
        info!(ticks = state.tick, status = ?state.lander_status, "headless run ended");
        (state, history)
    }

    /// Spawns the frame-rate timer and the tick loop on the current tokio
    /// runtime.
    pub fn start(self) -> Session {
        let Self { runner, config } = self;
        let (control_tx, control_rx) = watch::channel(Control::default());
        let (state_tx, state_rx) = watch::channel(runner.current_state());
        let (fps_tx, fps_rx) = watch::channel(config.nominal_fps());
        let shutdown = Arc::new(Notify::new());

        let timer_task = tokio::spawn(frame_rate_task(
            state_rx.clone(),
            fps_tx,
            config.frame_rate_window,
        ));
        let tick_task = tokio::spawn(tick_task(
            runner,
            control_rx,
            fps_rx.clone(),
            state_tx,
            config,
            shutdown.clone(),
        ));

        Session {
            control: ControlHandle {
                tx: Arc::new(control_tx),
            },
            state_rx,
            fps_rx,
            shutdown,
            tick_task,
            timer_task,
        }
    }
}

/// Write side of the control cell; the tick loop reads the latest value.
#[derive(Clone)]
pub struct ControlHandle {
    tx: Arc<watch::Sender<Control>>,
}

impl ControlHandle {
    pub fn set_control(&self, rotation_rate: f64, engine_on: bool) {
        self.tx
            .send_replace(Control::new(rotation_rate, engine_on));
    }

    pub fn control(&self) -> Control {
        *self.tx.borrow()
    }
}

pub struct Session {
    control: ControlHandle,
    state_rx: watch::Receiver<SimulationState>,
    fps_rx: watch::Receiver<f64>,
    shutdown: Arc<Notify>,
    tick_task: JoinHandle<SimulationState>,
    timer_task: JoinHandle<()>,
}

impl Session {
    pub fn control(&self) -> ControlHandle {
        self.control.clone()
    }

    pub fn set_control(&self, rotation_rate: f64, engine_on: bool) {
        self.control.set_control(rotation_rate, engine_on)
    }

    /// Receiver notified once per published snapshot.
    pub fn subscribe(&self) -> watch::Receiver<SimulationState> {
        self.state_rx.clone()
    }

    pub fn current_state(&self) -> SimulationState {
        self.state_rx.borrow().clone()
    }

    pub fn frame_rate(&self) -> f64 {
        *self.fps_rx.borrow()
    }

    /// Stops the tick loop before the next tick; the last published state stays.
    pub fn shutdown(&self) {
        self.shutdown.notify_one();
    }

    /// Resolves once the episode is over and the settle delay has passed.
    pub async fn finished(self) -> Result<SimulationState, Error> {
        let state = self
            .tick_task
            .await
            .map_err(|e| Error::Driver(format!("tick loop failed: {e}")))?;
        self.timer_task
            .await
            .map_err(|e| Error::Driver(format!("frame-rate timer failed: {e}")))?;
        Ok(state)
    }
}

async fn frame_rate_task(
    state_rx: watch::Receiver<SimulationState>,
    fps_tx: watch::Sender<f64>,
    window: std::time::Duration,
) {
    let mut estimator = FrameRateEstimator::new(window, Instant::now().into_std());
    let mut interval = tokio::time::interval(window);
    loop {
        interval.tick().await;
        // Closed channel: the tick loop is gone.
        if state_rx.has_changed().is_err() {
            break;
        }
        let (frames, terminal) = {
            let state = state_rx.borrow();
            (state.tick, state.lander_status.is_terminal())
        };
        if terminal {
            break;
        }
        if let Some(fps) = estimator.sample(frames, Instant::now().into_std()) {
            if fps < MIN_FPS {
                warn!(fps, "frame rate below minimum, time step clamped");
            }
            debug!(fps, "frame rate");
            fps_tx.send_replace(fps);
        }
    }
}

async fn tick_task(
    mut runner: LanderRunner,
    control_rx: watch::Receiver<Control>,
    fps_rx: watch::Receiver<f64>,
    state_tx: watch::Sender<SimulationState>,
    config: DriverConfig,
    shutdown: Arc<Notify>,
) -> SimulationState {
    let mut interval = tokio::time::interval(config.tick_interval);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = shutdown.notified() => {
                info!(tick = runner.state().tick, "episode cancelled");
                return runner.current_state();
            }
            _ = interval.tick() => {}
        }

        let control = *control_rx.borrow();
        let time = time_step(*fps_rx.borrow(), config.max_fps);
        let status = runner.iterate(control, time);
        state_tx.send_replace(runner.current_state());

        if let ExecutionStatus::Finished = status {
            break;
        }
    }

    let state = runner.current_state();
    info!(
        tick = state.tick,
        status = ?state.lander_status,
        settle_ms = config.settle_delay.as_millis() as u64,
        "episode finished"
    );
    tokio::select! {
        _ = shutdown.notified() => {}
        _ = tokio::time::sleep(config.settle_delay) => {}
    }
    state
}

#[cfg(test)]
mod app_tests {
    use super::*;

    fn app() -> App {
        App::try_new(Episode::default(), DriverConfig::default()).unwrap()
    }

    #[test]
    fn builds_default_episode() {
        let app = app();
        let state = app.current_state();
        assert_eq!(state.lander_status, LanderStatus::InAir);
        assert_eq!(state.lander, Lander::default());
        assert_eq!(app.terrain().max_x(), 1000.);
    }

    #[test]
    fn rejects_invalid_lander() {
        let episode = Episode {
            lander: Lander::default().with_mass(-5.),
            ..Episode::default()
        };
        assert!(matches!(
            App::try_new(episode, DriverConfig::default()),
            Err(Error::InvalidLander { .. })
        ));
    }

    #[test]
    fn headless_free_fall_ends() {
        let (state, history) = app().run_headless(&mut Control::default(), 0.03, 100_000);
        assert!(state.lander_status.is_terminal());
        assert_eq!(history.len() as u64, state.tick);
    }

    #[test]
    fn headless_respects_tick_limit() {
        let (state, history) = app().run_headless(&mut Control::new(0., true), 0.03, 10);
        assert_eq!(state.tick, 10);
        assert_eq!(state.lander_status, LanderStatus::InAir);
        assert_eq!(history.len(), 11);
    }
}
