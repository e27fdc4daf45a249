mod elevation_angle;
mod linspace;

pub(crate) use {
    elevation_angle::{elevation_angle, flat_elevation_angle},
    linspace::linspace,
};

/// Mean earth radius (meters).
pub const MEAN_EARTH_RADIUS: f64 = 6_371_008.8;
