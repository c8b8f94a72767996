use rand::{rngs::StdRng, Rng, SeedableRng};

use super::NoiseGenerator;
use crate::Error;

mod defaults {
    pub const SEED: u64 = 42;
    pub const BOUNDARY: usize = 100;
    pub const WIDTH: f64 = 100.;
    pub const SCALE: f64 = 10.;
    pub const HEIGHT_SCALE: f64 = 10.;
    pub const PERSISTENCE: f64 = 0.5;
    pub const OCTAVES: u32 = 16;
    pub const FIXED_STEP: f64 = 0.1;
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TerrainPoint {
    pub x: f64,
    pub y: f64,
}

impl TerrainPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Cyclic height profile over `[0, max_x)`. The last point is followed by the
/// first one, shifted by `max_x`.
#[derive(Clone, Debug, PartialEq)]
pub struct Terrain {
    points: Vec<TerrainPoint>,
    max_x: f64,
}

impl Terrain {
    pub fn try_new(points: Vec<TerrainPoint>, max_x: f64) -> Result<Self, Error> {
        if !max_x.is_finite() || max_x <= 0. {
            return Err(Error::invalid_terrain(format!(
                "domain width has to be positive, got {max_x}"
            )));
        }
        if points.len() < 2 {
            return Err(Error::invalid_terrain(format!(
                "at least 2 points required, got {}",
                points.len()
            )));
        }
        if let Some((id, p)) = points.iter().enumerate().find(|(_, p)| !p.y.is_finite()) {
            return Err(Error::invalid_terrain(format!(
                "point {id} at x = {} has non-finite height {}",
                p.x, p.y
            )));
        }
        if let Some((id, p)) = points
            .iter()
            .enumerate()
            .find(|(_, p)| !p.x.is_finite() || p.x < 0. || p.x >= max_x)
        {
            return Err(Error::invalid_terrain(format!(
                "point {id} ({}, {}) outside of [0, {max_x})",
                p.x, p.y
            )));
        }
        if let Some(id) = points.windows(2).position(|w| w[1].x <= w[0].x) {
            return Err(Error::invalid_terrain(format!(
                "x not strictly increasing at point {}",
                id + 1
            )));
        }
        Ok(Self { points, max_x })
    }

    pub fn points(&self) -> &[TerrainPoint] {
        &self.points
    }

    pub fn max_x(&self) -> f64 {
        self.max_x
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn get(&self, id: usize) -> Option<TerrainPoint> {
        self.points.get(id).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TerrainPoint> {
        self.points.iter()
    }
}

#[derive(Clone, Debug)]
pub struct TerrainGenerator {
    seed: u64,
    boundary: usize,
    width: f64,
    scale: f64,
    height_scale: f64,
    persistence: f64,
    octaves: u32,
}

impl Default for TerrainGenerator {
    fn default() -> Self {
        Self {
            seed: defaults::SEED,
            boundary: defaults::BOUNDARY,
            width: defaults::WIDTH,
            scale: defaults::SCALE,
            height_scale: defaults::HEIGHT_SCALE,
            persistence: defaults::PERSISTENCE,
            octaves: defaults::OCTAVES,
        }
    }
}

impl TerrainGenerator {
    pub fn with_seed(self, seed: u64) -> Self {
        Self { seed, ..self }
    }

    pub fn with_boundary(self, boundary: usize) -> Self {
        assert!(boundary > 0);
        Self { boundary, ..self }
    }

    pub fn with_width(self, width: f64) -> Self {
        assert!(width > 0.);
        Self { width, ..self }
    }

    pub fn with_scale(self, scale: f64) -> Self {
        assert!(scale > 0.);
        Self { scale, ..self }
    }

    pub fn with_height_scale(self, height_scale: f64) -> Self {
        Self {
            height_scale,
            ..self
        }
    }

    pub fn with_persistence(self, persistence: f64) -> Self {
        Self {
            persistence,
            ..self
        }
    }

    pub fn with_octaves(self, octaves: u32) -> Self {
        Self { octaves, ..self }
    }

    pub fn max_x(&self) -> f64 {
        self.width * self.scale
    }

    /// Emits two points per step: one at the sampled x and one a random
    /// 0.1 or 0.2 further, both at the same height, which leaves short flat pads.
    pub fn generate(&self) -> Result<Terrain, Error> {
        let noise = NoiseGenerator::new(self.seed, self.boundary);
        let mut steps = StdRng::seed_from_u64(self.seed.wrapping_add(1));
        let max_x = self.max_x();

        let mut samples = Vec::new();
        let mut i = 0.;
        while i < self.width {
            let height = noise.perlin(i, self.persistence, self.octaves) * self.height_scale;
            samples.push(TerrainPoint::new(i * self.scale, height));
            i += steps.gen_range(1..=2) as f64 / 10.;
            samples.push(TerrainPoint::new(i * self.scale, height));
            i += defaults::FIXED_STEP;
        }

        Terrain::try_new(keep_advancing(samples, max_x), max_x)
    }
}

/// Keeps the points whose x strictly increases and stays below `max_x`.
fn keep_advancing(samples: Vec<TerrainPoint>, max_x: f64) -> Vec<TerrainPoint> {
    let mut points: Vec<TerrainPoint> = Vec::with_capacity(samples.len());
    for p in samples {
        let advances = points.last().map_or(true, |last| p.x > last.x);
        if advances && p.x < max_x {
            points.push(p);
        }
    }
    points
}
