use geo::geometry::Coord;

/// The fixed set of candidate tile origins a store scans on load.
///
/// Origins are the southwest corners, in whole degrees, of the tiles
/// that may exist on disk. Candidates without a file are not an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Region {
    lats: Vec<i16>,
    lons: Vec<i16>,
}

impl Region {
    pub fn new<L, M>(lats: L, lons: M) -> Self
    where
        L: IntoIterator<Item = i16>,
        M: IntoIterator<Item = i16>,
    {
        Self {
            lats: lats.into_iter().collect(),
            lons: lons.into_iter().collect(),
        }
    }

    /// Tiles covering continental Ecuador and its coastal waters.
    pub fn ecuador() -> Self {
        Self::new((-8..=3).rev(), -82..=-73)
    }

    pub fn lats(&self) -> &[i16] {
        &self.lats
    }

    pub fn lons(&self) -> &[i16] {
        &self.lons
    }

    /// Returns every candidate southwest corner, latitude-major.
    pub fn origins(&self) -> impl Iterator<Item = Coord<i16>> + '_ {
        self.lats
            .iter()
            .flat_map(move |&y| self.lons.iter().map(move |&x| Coord { x, y }))
    }
}

impl Default for Region {
    fn default() -> Self {
        Self::ecuador()
    }
}

#[cfg(test)]
mod tests {
    use super::{Coord, Region};

    #[test]
    fn test_ecuador_candidates() {
        let region = Region::ecuador();
        assert_eq!(region.lats().first(), Some(&3));
        assert_eq!(region.lats().last(), Some(&-8));
        assert_eq!(region.lons(), &(-82..=-73).collect::<Vec<_>>()[..]);
        assert_eq!(region.origins().count(), 12 * 10);
    }

    #[test]
    fn test_origins_order() {
        let region = Region::new([1, 0], [5, 6]);
        let origins: Vec<_> = region.origins().collect();
        assert_eq!(
            origins,
            vec![
                Coord { x: 5, y: 1 },
                Coord { x: 6, y: 1 },
                Coord { x: 5, y: 0 },
                Coord { x: 6, y: 0 },
            ]
        );
    }
}
