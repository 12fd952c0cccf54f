use std::collections::TryReserveError;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum GalaxyError {
    #[error("{0} points exceed the mesh limit of {max}", max = super::GalaxyParameters::MAX_POINTS)]
    TooManyPoints(usize),
    #[error("a galaxy needs at least one branch")]
    ZeroBranches,
    #[error("radius must be finite and non-negative, got {0}")]
    InvalidRadius(f32),
    #[error("point size must be finite and positive, got {0}")]
    InvalidSize(f32),
    #[error("spin must be finite, got {0}")]
    InvalidSpin(f32),
    #[error("randomness must be finite and non-negative, got {0}")]
    InvalidRandomness(f32),
    #[error("randomness power must be finite and non-negative, got {0}")]
    InvalidRandomnessPower(f32),
    #[error("could not allocate buffers for {count} points")]
    Allocation {
        count: usize,
        #[source]
        source: TryReserveError,
    },
}
