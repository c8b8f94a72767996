use std::sync::Arc;

use tracing::{debug, info, warn};

use super::{wrap_x, CollisionChecker, Lander, Landing, Physics, Terrain};
use crate::Error;

mod defaults {
    pub const MAX_ROTATION_RATE: f64 = 360.;
    pub const MIN_TIME_STEP: f64 = 1e-3;
    pub const MAX_TIME_STEP: f64 = 1.;
}

/// Shell input sampled at the start of a tick.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Control {
    pub rotation_rate: f64,
    pub engine_on: bool,
}

impl Control {
    pub fn new(rotation_rate: f64, engine_on: bool) -> Self {
        Self {
            rotation_rate,
            engine_on,
        }
    }

    /// Non-finite rates become 0, the rest is clamped to ±360 deg/s.
    pub fn sanitized(self) -> Self {
        let rotation_rate = if self.rotation_rate.is_finite() {
            self.rotation_rate
                .clamp(-defaults::MAX_ROTATION_RATE, defaults::MAX_ROTATION_RATE)
        } else {
            0.
        };
        Self {
            rotation_rate,
            ..self
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LanderStatus {
    InAir,
    Landed,
    Crushed,
}

impl LanderStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, LanderStatus::InAir)
    }
}

impl From<&Landing> for LanderStatus {
    fn from(landing: &Landing) -> Self {
        if landing.is_safe() {
            LanderStatus::Landed
        } else {
            LanderStatus::Crushed
        }
    }
}

#[derive(Debug)]
pub enum ExecutionStatus {
    InProgress,
    Finished,
}

/// Snapshot published once per tick. The terrain is shared, never copied.
#[derive(Clone, Debug)]
pub struct SimulationState {
    pub tick: u64,
    pub lander: Lander,
    pub terrain: Arc<Terrain>,
    pub engine_in_use: bool,
    pub lander_status: LanderStatus,
    pub landing: Option<Landing>,
}

pub fn sanitize_time_step(time: f64) -> f64 {
    if time.is_finite() && time > 0. {
        time.clamp(defaults::MIN_TIME_STEP, defaults::MAX_TIME_STEP)
    } else {
        defaults::MIN_TIME_STEP
    }
}

pub struct LanderRunner {
    state: SimulationState,
    physics: Physics,
    collision_checker: CollisionChecker,
}

impl LanderRunner {
    pub fn try_new(
        initial_lander: Lander,
        terrain: Arc<Terrain>,
        physics: Physics,
        collision_checker: CollisionChecker,
    ) -> Result<Self, Error> {
        initial_lander.validate()?;
        let physics = physics.with_max_x(terrain.max_x());
        let lander = initial_lander.with_x(wrap_x(initial_lander.x, terrain.max_x()));
        info!(
            x = lander.x,
            y = lander.y,
            points = terrain.len(),
            max_x = terrain.max_x(),
            "episode starting"
        );
        Ok(Self {
            state: SimulationState {
                tick: 0,
                lander,
                terrain,
                engine_in_use: false,
                lander_status: LanderStatus::InAir,
                landing: None,
            },
            physics,
            collision_checker,
        })
    }

    pub fn current_state(&self) -> SimulationState {
        self.state.clone()
    }

    pub fn state(&self) -> &SimulationState {
        &self.state
    }

    pub fn lander_status(&self) -> LanderStatus {
        self.state.lander_status
    }

    pub fn terrain(&self) -> &Arc<Terrain> {
        &self.state.terrain
    }

    /// Checks the current pose against the terrain; on contact the episode ends
    /// without a further physics step, otherwise the lander is advanced by `time`.
    pub fn iterate(&mut self, control: Control, time: f64) -> ExecutionStatus {
        if self.state.lander_status.is_terminal() {
            return ExecutionStatus::Finished;
        }

        let sanitized = control.sanitized();
        if sanitized != control {
            warn!(?control, "control input clamped");
        }
        let time = sanitize_time_step(time);

        let state = &self.state;
        let next = match self
            .collision_checker
            .check(&state.terrain, &state.lander)
        {
            Some(landing) => {
                let lander_status = LanderStatus::from(&landing);
                info!(
                    tick = state.tick,
                    ?lander_status,
                    ?landing,
                    x = state.lander.x,
                    y = state.lander.y,
                    vx = state.lander.vx,
                    vy = state.lander.vy,
                    rotation = state.lander.rotation,
                    "touchdown"
                );
                SimulationState {
                    tick: state.tick + 1,
                    engine_in_use: false,
                    lander_status,
                    landing: Some(landing),
                    ..state.clone()
                }
            }
            None => {
                let lander = self.physics.iterate(state.lander, sanitized, time);
                debug!(
                    tick = state.tick,
                    time,
                    x = lander.x,
                    y = lander.y,
                    vx = lander.vx,
                    vy = lander.vy,
                    rotation = lander.rotation,
                    "tick"
                );
                SimulationState {
                    tick: state.tick + 1,
                    lander,
                    engine_in_use: sanitized.engine_on,
                    ..state.clone()
                }
            }
        };
        self.state = next;

        if self.state.lander_status.is_terminal() {
            ExecutionStatus::Finished
        } else {
            ExecutionStatus::InProgress
        }
    }
}

#[derive(Clone, Default)]
pub struct LanderHistory {
    landers: Vec<Lander>,
}

impl LanderHistory {
    pub fn with_initial_state(lander: Lander) -> Self {
        Self {
            landers: vec![lander],
        }
    }

    pub fn append_lander_state(&mut self, lander: &Lander) {
        self.landers.push(*lander);
    }

    pub fn len(&self) -> usize {
        self.landers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.landers.is_empty()
    }

    pub fn last(&self) -> Option<&Lander> {
        self.landers.last()
    }

    pub fn iter_history(&self) -> impl Iterator<Item = Lander> + '_ {
        self.landers.iter().copied()
    }

    pub fn pretty_to_string(&self) -> String {
        self.iter_history().fold(
            format!(
                "{:>9}{:>9}{:>9}{:>9}{:>9}",
                "X", "Y", "VX", "VY", "ROT"
            ),
            |out,
             Lander {
                 x,
                 y,
                 vx,
                 vy,
                 rotation,
                 ..
             }| {
                out + &format!("\n{x:9.2}{y:9.2}{vx:9.2}{vy:9.2}{rotation:9.2}")
            },
        )
    }
}
