use rand::{rngs::StdRng, Rng, SeedableRng};

mod defaults {
    pub const BOUNDARY: usize = 10;
}

/// Seeded 1-D value noise over a wrapping lattice of `boundary` samples.
///
/// Octaves are summed with amplitude `persistence^i` at frequency `2^i` and the
/// result is divided by the amplitude sum, so output stays in `[0, 1)`.
#[derive(Clone, Debug)]
pub struct NoiseGenerator {
    samples: Vec<f64>,
}

impl NoiseGenerator {
    pub fn new(seed: u64, boundary: usize) -> Self {
        assert!(boundary > 0);
        let mut rng = StdRng::seed_from_u64(seed);
        Self {
            samples: (0..boundary).map(|_| rng.gen::<f64>()).collect(),
        }
    }

    pub fn boundary(&self) -> usize {
        self.samples.len()
    }

    pub fn perlin(&self, x: f64, persistence: f64, octaves: u32) -> f64 {
        if octaves == 0 {
            return self.noise(x);
        }
        let (total, amplitude_sum) = (0..octaves).fold((0., 0.), |(total, sum), i| {
            let amplitude = persistence.powi(i as i32);
            let frequency = 2f64.powi(i as i32);
            (total + amplitude * self.noise(x * frequency), sum + amplitude)
        });
        total / amplitude_sum
    }

    fn noise(&self, t: f64) -> f64 {
        let floor = t.floor();
        let boundary = self.samples.len() as i64;
        // Casting saturates for huge t; rem_euclid keeps the index in range either way.
        let x0 = (floor as i64).rem_euclid(boundary) as usize;
        let x1 = (x0 + 1) % self.samples.len();
        lerp(self.samples[x0], self.samples[x1], t - floor)
    }
}

impl Default for NoiseGenerator {
    fn default() -> Self {
        Self::new(0, defaults::BOUNDARY)
    }
}

fn lerp(a: f64, b: f64, alpha: f64) -> f64 {
    a + alpha * (b - a)
}
