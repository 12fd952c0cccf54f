use std::f32::consts::TAU;

use bevy::prelude::*;
use rand::Rng;

use super::{GalaxyError, GalaxyParameters};

/// Uniform floats in [0, 1). Anything implementing [`rand::Rng`] qualifies,
/// tests can plug in hand-written sequences.
pub trait RandomSource {
    fn next_unit(&mut self) -> f32;
}

impl<R: Rng + ?Sized> RandomSource for R {
    fn next_unit(&mut self) -> f32 {
        self.random::<f32>()
    }
}

/// Linear-space colour blend from the galaxy core to its rim
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ColorRamp {
    inside: [f32; 3],
    outside: [f32; 3],
}

impl ColorRamp {
    pub fn new(inside: LinearRgba, outside: LinearRgba) -> Self {
        Self {
            inside: [inside.red, inside.green, inside.blue],
            outside: [outside.red, outside.green, outside.blue],
        }
    }

    pub fn at(&self, t: f32) -> [f32; 3] {
        std::array::from_fn(|c| self.inside[c] + (self.outside[c] - self.inside[c]) * t)
    }
}

/// Parallel position and colour buffers, one entry per point
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PointSet {
    pub positions: Vec<[f32; 3]>,
    pub colors: Vec<[f32; 3]>,
}

impl PointSet {
    fn with_capacity(count: usize) -> Result<Self, GalaxyError> {
        let mut points = Self::default();
        let reserve = |buffer: &mut Vec<[f32; 3]>| {
            buffer
                .try_reserve_exact(count)
                .map_err(|source| GalaxyError::Allocation { count, source })
        };
        reserve(&mut points.positions)?;
        reserve(&mut points.colors)?;
        Ok(points)
    }

    fn push(&mut self, position: [f32; 3], color: [f32; 3]) {
        self.positions.push(position);
        self.colors.push(color);
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&[f32; 3], &[f32; 3])> {
        self.positions.iter().zip(self.colors.iter())
    }
}

/// Places `params.count` points on a spiral with `params.branches` arms.
///
/// Each point draws a distance from the centre, which fixes its colour and how
/// far its arm has wound (`spin`). Points cycle through the arms in index
/// order, then every axis gets a signed jitter scaled by the distance;
/// `randomness_power` pulls that jitter towards zero.
///
/// Draw order per point: distance, then magnitude and sign for x, y and z.
pub fn generate_galaxy<R: RandomSource + ?Sized>(
    params: &GalaxyParameters,
    rng: &mut R,
) -> Result<PointSet, GalaxyError> {
    params.validate()?;

    let mut points = PointSet::with_capacity(params.count)?;
    let ramp = params.color_ramp();
    let branches = params.branches as usize;

    for i in 0..params.count {
        let radius = rng.next_unit() * params.radius;

        // a zero-sized galaxy keeps everything at the core colour
        let t = if params.radius > 0.0 {
            radius / params.radius
        } else {
            0.0
        };

        let spin_angle = radius * params.spin;
        let branch_angle = (i % branches) as f32 / branches as f32 * TAU;

        let mut jitter = || {
            let magnitude = rng.next_unit().powf(params.randomness_power);
            let sign = if rng.next_unit() < 0.5 { 1.0 } else { -1.0 };
            magnitude * sign * params.randomness * radius
        };
        let offset_x = jitter();
        let offset_y = jitter();
        let offset_z = jitter();

        let angle = branch_angle + spin_angle;
        points.push(
            [
                angle.cos() * radius + offset_x,
                offset_y,
                angle.sin() * radius + offset_z,
            ],
            ramp.at(t),
        );
    }

    Ok(points)
}
