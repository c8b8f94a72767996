//! Lunar lander simulation core: terrain generation, lander physics and the
//! touchdown check, plus a tokio driver that runs an episode against a shell.

mod app;
mod config;
mod error;
pub mod init;
mod simulation;

pub use app::*;
pub use config::*;
pub use error::Error;
pub use simulation::*;
