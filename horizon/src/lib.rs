//! # Horizon
//!
//! `horizon` casts a fan of rays across a stitched terrain grid and
//! reports the highest elevation angle visible along each one.

mod cardinal;
mod error;
mod horizon;
mod math;

pub use {
    crate::{
        cardinal::Cardinal,
        error::HorizonError,
        horizon::{compute_horizon, HorizonBuilder, HorizonPoint, HorizonProfile, NO_HORIZON_DEG},
        math::MEAN_EARTH_RADIUS,
    },
    geo, terrain,
};

/// Floating point type used for angles and distances.
pub type C = f64;
