mod clock;
mod collision;
mod lander_runner;
mod noise;
mod physics;
mod terrain;

pub use clock::*;
pub use collision::*;
pub use lander_runner::*;
pub use noise::*;
pub use physics::*;
pub use terrain::*;
