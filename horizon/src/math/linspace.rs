use num_traits::{Float, FromPrimitive};

/// Returns `n` evenly spaced values from `y_start` to `y_end`,
/// inclusive of both ends.
///
/// A single value is `y_start`.
pub fn linspace<T>(y_start: T, y_end: T, n: usize) -> impl Iterator<Item = T>
where
    T: Float + FromPrimitive,
{
    // Unwraps are fine as every usize converts to a float.
    let dy = if n > 1 {
        (y_end - y_start) / T::from_usize(n - 1).unwrap()
    } else {
        T::zero()
    };
    (0..n).map(move |x| {
        if n > 1 && x == n - 1 {
            y_end
        } else {
            y_start + T::from_usize(x).unwrap() * dy
        }
    })
}

#[cfg(test)]
mod tests {
    use super::linspace;

    #[test]
    fn test_linspace() {
        assert_eq!(
            linspace(45.0, 135.0, 3).collect::<Vec<f64>>(),
            vec![45.0, 90.0, 135.0]
        );
        assert_eq!(
            linspace(-30.0_f32, 30.0, 5).collect::<Vec<_>>(),
            vec![-30.0, -15.0, 0.0, 15.0, 30.0]
        );
    }

    #[test]
    fn test_linspace_endpoints() {
        let values: Vec<f64> = linspace(60.0, 120.0, 360).collect();
        assert_eq!(values.len(), 360);
        assert_eq!(values.first(), Some(&60.0));
        assert_eq!(values.last(), Some(&120.0));
        assert!(values.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_linspace_degenerate() {
        assert_eq!(linspace(10.0, 20.0, 1).collect::<Vec<f64>>(), vec![10.0]);
        assert_eq!(linspace(10.0, 20.0, 0).count(), 0);
    }
}
