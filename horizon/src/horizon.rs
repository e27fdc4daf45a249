use crate::{
    error::HorizonError,
    math::{elevation_angle, flat_elevation_angle, linspace, MEAN_EARTH_RADIUS},
    C,
};
use geo::geometry::Coord;
use log::debug;
use terrain::{ElevationGrid, TerrainStore};

/// Elevation angle reported by a ray that found no terrain.
pub const NO_HORIZON_DEG: C = -90.0;

/// The visible horizon across a fan of rays from one observer.
///
/// The three vectors are parallel, one entry per ray, ordered by
/// azimuth as the rays were cast.
#[derive(Debug, Clone, PartialEq)]
pub struct HorizonProfile {
    /// Grid (row, column) of the observer.
    pub observer_cell: (usize, usize),

    /// Terrain elevation under the observer plus observer height
    /// (meters).
    pub eye_elev_m: C,

    /// Compass bearing of each ray (degrees).
    pub azimuths_deg: Box<[C]>,

    /// Highest elevation angle seen along each ray (degrees).
    pub elevation_angles_deg: Box<[C]>,

    /// Distance to the point that set each ray's elevation angle
    /// (meters).
    pub distances_m: Box<[C]>,
}

/// One ray of a [`HorizonProfile`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HorizonPoint {
    pub azimuth_deg: C,
    pub elevation_angle_deg: C,
    pub distance_m: C,
}

impl HorizonProfile {
    pub fn builder() -> HorizonBuilder {
        HorizonBuilder {
            observer: None,
            azimuth_deg: None,
            field_of_view_deg: 60.0,
            observer_height_m: 1.7,
            max_distance_km: 50.0,
            ray_count: 360,
            earth_curve: false,
        }
    }

    /// Returns the number of rays.
    pub fn len(&self) -> usize {
        self.azimuths_deg.len()
    }

    pub fn is_empty(&self) -> bool {
        self.azimuths_deg.is_empty()
    }

    pub fn points(&self) -> impl Iterator<Item = HorizonPoint> + '_ {
        self.azimuths_deg
            .iter()
            .zip(self.elevation_angles_deg.iter())
            .zip(self.distances_m.iter())
            .map(|((&azimuth_deg, &elevation_angle_deg), &distance_m)| HorizonPoint {
                azimuth_deg,
                elevation_angle_deg,
                distance_m,
            })
    }

    /// Returns the ray with the highest elevation angle, the first
    /// one on ties.
    pub fn highest(&self) -> Option<HorizonPoint> {
        self.points().fold(None, |best, point| match best {
            Some(HorizonPoint {
                elevation_angle_deg,
                ..
            }) if elevation_angle_deg >= point.elevation_angle_deg => best,
            _ => Some(point),
        })
    }
}

pub struct HorizonBuilder {
    /// Observer location (required).
    observer: Option<Coord<C>>,

    /// Bearing the view is centered on (degrees, required).
    azimuth_deg: Option<C>,

    /// Width of the fan of rays (degrees, defaults to 60).
    field_of_view_deg: C,

    /// Eye height above ground (meters, defaults to 1.7).
    observer_height_m: C,

    /// How far each ray travels (kilometers, defaults to 50).
    max_distance_km: C,

    /// Number of rays (defaults to 360).
    ray_count: usize,

    /// Add earth curvature (defaults to false).
    earth_curve: bool,
}

impl HorizonBuilder {
    /// Observer location (required).
    #[must_use]
    pub fn observer(mut self, coord: Coord<C>) -> Self {
        self.observer = Some(coord);
        self
    }

    /// Bearing the view is centered on (degrees, required).
    #[must_use]
    pub fn azimuth(mut self, degrees: C) -> Self {
        self.azimuth_deg = Some(degrees);
        self
    }

    /// Width of the fan of rays (degrees, defaults to 60).
    #[must_use]
    pub fn field_of_view(mut self, degrees: C) -> Self {
        self.field_of_view_deg = degrees;
        self
    }

    /// Eye height above ground (meters, defaults to 1.7).
    #[must_use]
    pub fn observer_height(mut self, meters: C) -> Self {
        self.observer_height_m = meters;
        self
    }

    /// How far each ray travels (kilometers, defaults to 50).
    #[must_use]
    pub fn max_distance(mut self, km: C) -> Self {
        self.max_distance_km = km;
        self
    }

    /// Number of rays (defaults to 360).
    #[must_use]
    pub fn ray_count(mut self, count: usize) -> Self {
        self.ray_count = count;
        self
    }

    /// Add earth curvature (defaults to false).
    #[must_use]
    pub fn earth_curve(mut self, add_curve: bool) -> Self {
        self.earth_curve = add_curve;
        self
    }

    pub fn build(&self, store: &TerrainStore) -> Result<HorizonProfile, HorizonError> {
        let observer = self.observer.ok_or(HorizonError::Builder("observer"))?;
        let azimuth_deg = self.azimuth_deg.ok_or(HorizonError::Builder("azimuth"))?;

        let grid = store.grid()?;
        let observer_cell @ (row, col) = grid.coords_to_indices(observer)?;
        let ground_m = grid.get(row, col).ok_or(HorizonError::NoData {
            lat: observer.y,
            lon: observer.x,
        })?;
        let eye_elev_m = C::from(ground_m) + self.observer_height_m;

        let step_m = grid.cell_size_m();
        let max_distance_m = self.max_distance_km * 1000.0;
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let max_steps = (max_distance_m / step_m) as usize;

        let half_fov = self.field_of_view_deg / 2.0;
        let azimuths_deg: Box<[C]> =
            linspace(azimuth_deg - half_fov, azimuth_deg + half_fov, self.ray_count).collect();

        let now = std::time::Instant::now();
        let (elevation_angles_deg, distances_m): (Vec<C>, Vec<C>) = azimuths_deg
            .iter()
            .map(|&azimuth| {
                let ray = Ray {
                    grid,
                    origin: observer_cell,
                    eye_elev_m,
                    step_m,
                    max_steps,
                    max_distance_m,
                    earth_curve: self.earth_curve,
                };
                ray.cast(azimuth)
            })
            .unzip();

        debug!(
            "horizon; observer: {observer_cell:?}, eye: {eye_elev_m} m, rays: {}, steps: {max_steps}, exec: {:?}",
            azimuths_deg.len(),
            now.elapsed()
        );

        Ok(HorizonProfile {
            observer_cell,
            eye_elev_m,
            azimuths_deg,
            elevation_angles_deg: elevation_angles_deg.into_boxed_slice(),
            distances_m: distances_m.into_boxed_slice(),
        })
    }
}

/// Computes a horizon profile with the default field of view (60°),
/// observer height (1.7 m), reach (50 km) and ray count (360).
pub fn compute_horizon(
    store: &TerrainStore,
    observer: Coord<C>,
    azimuth_deg: C,
) -> Result<HorizonProfile, HorizonError> {
    HorizonProfile::builder()
        .observer(observer)
        .azimuth(azimuth_deg)
        .build(store)
}

/// Parameters shared by every ray of one profile.
struct Ray<'a> {
    grid: &'a ElevationGrid,
    origin: (usize, usize),
    eye_elev_m: C,
    step_m: C,
    max_steps: usize,
    max_distance_m: C,
    earth_curve: bool,
}

impl Ray<'_> {
    /// Walks outward along `azimuth_deg` one cell at a time and
    /// returns the (elevation angle, distance) of the highest point
    /// seen.
    ///
    /// Rows grow southward and columns eastward, so a bearing of θ
    /// moves (-cos θ, sin θ) cells per step. The walk ends at the
    /// grid's edge; void cells are skipped. Distances are clamped to
    /// the maximum distance to absorb float rounding in the last step.
    fn cast(&self, azimuth_deg: C) -> (C, C) {
        let (sin, cos) = azimuth_deg.to_radians().sin_cos();
        let (d_row, d_col) = (-cos, sin);
        #[allow(clippy::cast_precision_loss)]
        let (row0, col0) = (self.origin.0 as C, self.origin.1 as C);

        let mut best = (NO_HORIZON_DEG, 0.0);
        for step in 1..=self.max_steps {
            #[allow(clippy::cast_precision_loss)]
            let step = step as C;
            #[allow(clippy::cast_possible_truncation)]
            let (row, col) = ((row0 + d_row * step) as isize, (col0 + d_col * step) as isize);
            if !self.grid.contains(row, col) {
                break;
            }
            #[allow(clippy::cast_sign_loss)]
            let Some(elev) = self.grid.get(row as usize, col as usize) else {
                continue;
            };
            let distance_m = (step * self.step_m).min(self.max_distance_m);
            let angle = self.elevation_angle_deg(distance_m, C::from(elev));
            // Strict comparison keeps the nearest point on ties.
            if angle > best.0 {
                best = (angle, distance_m);
            }
        }
        best
    }

    fn elevation_angle_deg(&self, distance_m: C, elev_m: C) -> C {
        let radians = if self.earth_curve {
            elevation_angle(self.eye_elev_m, distance_m, elev_m, MEAN_EARTH_RADIUS)
        } else {
            flat_elevation_angle(self.eye_elev_m, distance_m, elev_m)
        };
        radians.to_degrees()
    }
}
