use bevy::prelude::*;

use super::{ColorRamp, GalaxyError};

/// The authoritative galaxy shape. The parameter panel writes a fresh
/// snapshot here whenever an edit is finished, which triggers a rebuild.
#[derive(Resource, Clone, PartialEq, Debug)]
pub struct GalaxyParameters {
    pub count: usize,
    pub size: f32,
    pub inside_color: Srgba,
    pub outside_color: Srgba,
    pub radius: f32,
    pub branches: u32,
    pub spin: f32,
    pub randomness: f32,
    pub randomness_power: f32,
}

impl Default for GalaxyParameters {
    fn default() -> Self {
        Self {
            count: 100_000,
            size: 0.01,
            inside_color: Srgba::rgb_u8(0xff, 0x60, 0x30),
            outside_color: Srgba::rgb_u8(0x1b, 0x39, 0x84),
            radius: 5.0,
            branches: 3,
            spin: 1.0,
            randomness: 0.2,
            randomness_power: 3.0,
        }
    }
}

impl GalaxyParameters {
    /// Lower bounds offered by the parameter panel
    pub const MIN: Self = Self {
        count: 100,
        size: 0.001,
        inside_color: Srgba::BLACK,
        outside_color: Srgba::BLACK,
        radius: 0.01,
        branches: 2,
        spin: -5.0,
        randomness: 0.0,
        randomness_power: 0.0,
    };
    /// Upper bounds offered by the parameter panel
    pub const MAX: Self = Self {
        count: 1_000_000,
        size: 0.2,
        inside_color: Srgba::WHITE,
        outside_color: Srgba::WHITE,
        radius: 20.0,
        branches: 20,
        spin: 5.0,
        randomness: 2.0,
        randomness_power: 10.0,
    };

    /// Every point becomes four vertices addressed by `u32` indices
    pub const MAX_POINTS: usize = 1 << 30;

    /// Rejects values the generator or the renderer cannot work with.
    /// Anything outside the panel ranges but still well-formed is accepted.
    pub fn validate(&self) -> Result<(), GalaxyError> {
        if self.count > Self::MAX_POINTS {
            return Err(GalaxyError::TooManyPoints(self.count));
        }
        if self.branches == 0 {
            return Err(GalaxyError::ZeroBranches);
        }
        if !self.radius.is_finite() || self.radius < 0.0 {
            return Err(GalaxyError::InvalidRadius(self.radius));
        }
        if !self.size.is_finite() || self.size <= 0.0 {
            return Err(GalaxyError::InvalidSize(self.size));
        }
        if !self.spin.is_finite() {
            return Err(GalaxyError::InvalidSpin(self.spin));
        }
        if !self.randomness.is_finite() || self.randomness < 0.0 {
            return Err(GalaxyError::InvalidRandomness(self.randomness));
        }
        if !self.randomness_power.is_finite() || self.randomness_power < 0.0 {
            return Err(GalaxyError::InvalidRandomnessPower(self.randomness_power));
        }
        Ok(())
    }

    /// Core-to-rim colour ramp, converted to linear space once per build
    pub fn color_ramp(&self) -> ColorRamp {
        ColorRamp::new(self.inside_color.into(), self.outside_color.into())
    }
}
