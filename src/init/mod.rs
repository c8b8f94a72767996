mod app;
pub mod dat;
pub mod json;

use crate::simulation::{CollisionChecker, Gravity, Lander, TerrainGenerator};

/// Everything fixed at episode start.
#[derive(Clone, Debug)]
pub struct Episode {
    pub seed: u64,
    pub lander: Lander,
    pub gravity: Gravity,
    pub collision_checker: CollisionChecker,
}

impl Default for Episode {
    fn default() -> Self {
        Self {
            seed: 42,
            lander: Lander::default(),
            gravity: Gravity::default(),
            collision_checker: CollisionChecker::default(),
        }
    }
}

impl Episode {
    pub fn with_seed(self, seed: u64) -> Self {
        Self { seed, ..self }
    }

    pub fn terrain_generator(&self) -> TerrainGenerator {
        TerrainGenerator::default().with_seed(self.seed)
    }
}
