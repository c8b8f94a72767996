use std::path::Path;

use super::json;
use crate::{App, DriverConfig, Error};

impl App {
    pub fn try_from_file<P: AsRef<Path>>(
        episode_file_path: P,
        config: DriverConfig,
    ) -> Result<Self, Error> {
        let episode = json::parse_episode(episode_file_path)?;
        Self::try_new(episode, config)
    }
}
