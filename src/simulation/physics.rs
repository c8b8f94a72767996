use std::f64::consts::PI;

use super::Control;
use crate::Error;

pub const GRAVITATIONAL_CONSTANT: f64 = 6.67430e-11;

mod defaults {
    pub const GRAVITY: f64 = -1.67;
    pub const MOON_MASS: f64 = 7.34767309e22;
    pub const MOON_RADIUS: f64 = 1737000.;
    pub const MAX_X: f64 = 1000.;
    pub const MIN_HEIGHT: f64 = 1e-6;
}

pub fn acceleration(mass: f64, force: f64) -> f64 {
    force / mass
}

pub fn to_radians(degrees: f64) -> f64 {
    degrees / 180. * PI
}

/// Splits a thrust acceleration into (horizontal, vertical) parts; 0 degrees
/// points straight up and positive angles tilt towards +x.
pub fn decompose_acceleration(acceleration: f64, rotation: f64) -> (f64, f64) {
    let (sin, cos) = to_radians(rotation).sin_cos();
    (acceleration * sin, acceleration * cos)
}

pub fn acceleration_to_delta_velocity(acceleration: f64, time: f64) -> f64 {
    acceleration * time
}

// Inverse square of (radius * height), not (radius + height).
pub fn gravitational_acceleration(body_mass: f64, body_radius: f64, height: f64) -> f64 {
    -GRAVITATIONAL_CONSTANT * body_mass / (body_radius * height).powi(2)
}

pub fn apply_delta_velocity(delta_velocity: f64, velocity: f64) -> f64 {
    delta_velocity + velocity
}

pub fn calculate_position(coordinate: f64, velocity: f64, time: f64) -> f64 {
    coordinate + velocity * time
}

/// Maps `x` into `[0, max_x)`. Non-finite input lands on 0.
pub fn wrap_x(x: f64, max_x: f64) -> f64 {
    if !x.is_finite() {
        return 0.;
    }
    let wrapped = x.rem_euclid(max_x);
    // rem_euclid of a tiny negative value can round up to max_x itself
    if wrapped >= max_x {
        0.
    } else {
        wrapped
    }
}

pub fn rotate(rotation: f64, rotation_rate: f64, time: f64) -> f64 {
    (rotation + rotation_rate * time) % 360.
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Lander {
    pub x: f64,
    pub y: f64,
    pub rotation: f64,
    pub engine_power: f64,
    pub mass: f64,
    pub vx: f64,
    pub vy: f64,
}

impl Default for Lander {
    fn default() -> Self {
        Self {
            x: 100.,
            y: 40.,
            rotation: 0.,
            engine_power: 70000.,
            mass: 14900.,
            vx: 1.,
            vy: 0.,
        }
    }
}

impl Lander {
    pub fn with_x(self, x: f64) -> Self {
        Self { x, ..self }
    }

    pub fn with_y(self, y: f64) -> Self {
        Self { y, ..self }
    }

    pub fn with_rotation(self, rotation: f64) -> Self {
        Self { rotation, ..self }
    }

    pub fn with_engine_power(self, engine_power: f64) -> Self {
        Self {
            engine_power,
            ..self
        }
    }

    pub fn with_mass(self, mass: f64) -> Self {
        Self { mass, ..self }
    }

    pub fn with_vx(self, vx: f64) -> Self {
        Self { vx, ..self }
    }

    pub fn with_vy(self, vy: f64) -> Self {
        Self { vy, ..self }
    }

    pub fn validate(&self) -> Result<(), Error> {
        if !(self.mass.is_finite() && self.mass > 0.) {
            return Err(Error::invalid_lander(format!(
                "mass has to be positive, got {}",
                self.mass
            )));
        }
        let fields = [
            ("x", self.x),
            ("y", self.y),
            ("rotation", self.rotation),
            ("engine_power", self.engine_power),
            ("vx", self.vx),
            ("vy", self.vy),
        ];
        match fields.iter().find(|(_, v)| !v.is_finite()) {
            Some((name, value)) => Err(Error::invalid_lander(format!(
                "{name} has to be finite, got {value}"
            ))),
            None => Ok(()),
        }
    }

    pub fn thrust_acceleration(&self) -> f64 {
        acceleration(self.mass, self.engine_power)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Body {
    pub mass: f64,
    pub radius: f64,
}

impl Default for Body {
    fn default() -> Self {
        Self {
            mass: defaults::MOON_MASS,
            radius: defaults::MOON_RADIUS,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Gravity {
    Constant(f64),
    Body(Body),
}

impl Default for Gravity {
    fn default() -> Self {
        Gravity::Constant(defaults::GRAVITY)
    }
}

impl Gravity {
    pub fn acceleration_at(&self, height: f64) -> f64 {
        match self {
            Gravity::Constant(g) => *g,
            Gravity::Body(Body { mass, radius }) => {
                gravitational_acceleration(*mass, *radius, height.abs().max(defaults::MIN_HEIGHT))
            }
        }
    }
}

#[derive(Clone, Debug)]
pub struct Physics {
    gravity: Gravity,
    max_x: f64,
}

impl Default for Physics {
    fn default() -> Self {
        Self {
            gravity: Gravity::default(),
            max_x: defaults::MAX_X,
        }
    }
}

impl Physics {
    pub fn with_gravity(self, gravity: Gravity) -> Self {
        Self { gravity, ..self }
    }

    pub fn with_max_x(self, max_x: f64) -> Self {
        assert!(max_x > 0.);
        Self { max_x, ..self }
    }

    pub fn calculate_velocity(&self, lander: &Lander, time: f64, use_engine: bool) -> (f64, f64) {
        let engine_acceleration = if use_engine {
            lander.thrust_acceleration()
        } else {
            0.
        };
        let (a_x, a_y) = decompose_acceleration(engine_acceleration, lander.rotation);
        let g = self.gravity.acceleration_at(lander.y);

        (
            apply_delta_velocity(acceleration_to_delta_velocity(a_x, time), lander.vx),
            apply_delta_velocity(
                acceleration_to_delta_velocity(a_y, time) + acceleration_to_delta_velocity(g, time),
                lander.vy,
            ),
        )
    }

    /// One explicit step: velocity first, then position from the new velocity.
    pub fn iterate(&self, lander: Lander, control: Control, time: f64) -> Lander {
        let (vx, vy) = self.calculate_velocity(&lander, time, control.engine_on);
        Lander {
            x: wrap_x(calculate_position(lander.x, vx, time), self.max_x),
            y: calculate_position(lander.y, vy, time),
            rotation: rotate(lander.rotation, control.rotation_rate, time),
            vx,
            vy,
            ..lander
        }
    }
}
