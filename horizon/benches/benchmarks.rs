use criterion::{criterion_group, criterion_main, Criterion};
use horizon::{
    geo::geometry::Coord,
    terrain::{srtm, Region, TerrainStore, TileMode},
    HorizonProfile,
};

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

const SIDE: usize = srtm::THREE_ARCSECOND_SIDE;

/// Writes a rolling synthetic S01W079 tile.
fn synthetic_tile(dir: &std::path::Path) {
    #[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
    let samples = (0..SIDE * SIDE).map(|idx| {
        let (row, col) = ((idx / SIDE) as f64, (idx % SIDE) as f64);
        (2800.0 + 400.0 * (row / 90.0).sin() * (col / 70.0).cos()) as i16
    });
    srtm::write_hgt(
        dir.join(srtm::file_name(Coord { x: -79, y: -1 })),
        samples,
    )
    .unwrap();
}

fn horizon_profile(c: &mut Criterion) {
    let mut group = c.benchmark_group("Horizon Profile");

    let dir = tempfile::tempdir().unwrap();
    synthetic_tile(dir.path());
    let store = TerrainStore::builder()
        .tile_dir(dir.path())
        .region(Region::new([-1], [-79]))
        .tile_mode(TileMode::MemMap)
        .build()
        .unwrap();
    store.grid().unwrap();

    let observer = Coord {
        x: -78.4678,
        y: -0.1807,
    };

    for rays in [60, 360] {
        group.bench_with_input(format!("{rays} rays"), &rays, |b, &rays| {
            b.iter(|| {
                HorizonProfile::builder()
                    .observer(observer)
                    .azimuth(90.0)
                    .ray_count(rays)
                    .build(&store)
                    .unwrap()
            })
        });
    }
}

criterion_group!(benches, horizon_profile);
criterion_main!(benches);
