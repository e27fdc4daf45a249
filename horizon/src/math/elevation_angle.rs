use num_traits::{Float, FloatConst};

/// Returns the up/down angle (in radians) from a to b over a flat
/// earth.
pub fn flat_elevation_angle<T>(start_elev_m: T, distance_m: T, end_elev_m: T) -> T
where
    T: Float,
{
    (end_elev_m - start_elev_m).atan2(distance_m)
}

/// Returns the up/down angle (in radians) from a to b.
pub fn elevation_angle<T>(start_elev_m: T, distance_m: T, end_elev_m: T, earth_radius: T) -> T
where
    T: Float + FloatConst,
{
    let a = distance_m;
    let b = start_elev_m + earth_radius;
    let c = end_elev_m + earth_radius;
    let inner = {
        let inner = (a.powi(2) + b.powi(2) - c.powi(2)) / ((T::one() + T::one()) * a * b);
        if inner < -T::one() {
            -T::one()
        } else if inner > T::one() {
            T::one()
        } else {
            inner
        }
    };
    inner.acos() - T::FRAC_PI_2()
}

#[cfg(test)]
mod tests {
    use super::{elevation_angle, flat_elevation_angle};
    use crate::math::MEAN_EARTH_RADIUS;
    use approx::assert_relative_eq;

    #[test]
    fn test_elevation_angle() {
        assert_relative_eq!(
            0.100_167_342_359_641_42,
            elevation_angle(1.0, 1.0, 1.1, MEAN_EARTH_RADIUS),
            epsilon = 1e-6
        );
    }

    #[test]
    fn test_flat_elevation_angle() {
        assert_relative_eq!(
            flat_elevation_angle(100.0, 1000.0, 1100.0_f64).to_degrees(),
            45.0
        );
        assert_relative_eq!(
            flat_elevation_angle(100.0, 1000.0, 100.0_f64).to_degrees(),
            0.0
        );
        assert!(flat_elevation_angle(2801.7, 92.5, 2800.0_f64) < 0.0);
    }

    #[test]
    fn test_curvature_lowers_distant_targets() {
        let flat = flat_elevation_angle(100.0, 40_000.0, 500.0_f64);
        let curved = elevation_angle(100.0, 40_000.0, 500.0_f64, MEAN_EARTH_RADIUS);
        assert!(curved < flat);
        assert_relative_eq!(flat, curved, epsilon = 1e-2);
    }
}
