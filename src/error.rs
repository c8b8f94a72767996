use std::fmt::Display;

#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    InvalidTerrain { reason: String },
    InvalidLander { reason: String },
    Config(String),
    Driver(String),
}

impl Error {
    pub(crate) fn invalid_terrain(reason: impl Into<String>) -> Self {
        Self::InvalidTerrain {
            reason: reason.into(),
        }
    }

    pub(crate) fn invalid_lander(reason: impl Into<String>) -> Self {
        Self::InvalidLander {
            reason: reason.into(),
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::InvalidTerrain { reason } => write!(f, "invalid terrain: {reason}"),
            Error::InvalidLander { reason } => write!(f, "invalid lander: {reason}"),
            Error::Config(reason) => write!(f, "configuration error: {reason}"),
            Error::Driver(reason) => write!(f, "driver error: {reason}"),
        }
    }
}

impl std::error::Error for Error {}
