mod options;

use anyhow::Error as AnyError;
use clap::Parser;
use horizon::{Cardinal, HorizonProfile};
use log::info;
use options::{Cli, Command as CliCmd, LatLon};
use serde::Serialize;
use std::io::Write;
use terrain::{TerrainPatch, TerrainStore, TileMode};
use textplots::{Chart, Plot, Shape};

fn main() -> Result<(), AnyError> {
    let Cli {
        tile_dir,
        observer: LatLon(observer),
        azimuth,
        fov,
        height,
        max_distance,
        rays,
        resolution,
        memmap,
        earth_curve,
        cmd,
    } = Cli::parse();

    env_logger::init();

    let mut store = TerrainStore::builder()
        .tile_dir(tile_dir)
        .resolution(resolution)
        .tile_mode(if memmap {
            TileMode::MemMap
        } else {
            TileMode::InMem
        })
        .build()?;
    let grid = store.load()?;
    let (rows, cols) = grid.dimensions();
    info!(
        "grid {rows}x{cols}, {} valid samples, {} m cells",
        grid.valid_len(),
        grid.cell_size_m()
    );

    let profile = || {
        HorizonProfile::builder()
            .observer(observer)
            .azimuth(azimuth)
            .field_of_view(fov)
            .observer_height(height)
            .max_distance(max_distance)
            .ray_count(rays)
            .earth_curve(earth_curve)
            .build(&store)
    };

    match cmd {
        CliCmd::Display => display(&profile()?),
        CliCmd::Csv => print_csv(&profile()?),
        CliCmd::Json => print_json(&profile()?),
        CliCmd::Plot => {
            plot_ascii(&profile()?);
            Ok(())
        }
        CliCmd::Patch { radius, stride } => {
            print_patch(&store, &store.patch(observer, radius, stride)?)
        }
    }
}

fn display(profile: &HorizonProfile) -> Result<(), AnyError> {
    let mut stdout = std::io::stdout().lock();
    writeln!(
        stdout,
        "observer cell {:?}, eye {:.1} m",
        profile.observer_cell, profile.eye_elev_m
    )?;
    for point in profile.points() {
        let cardinal = Cardinal::from_azimuth(point.azimuth_deg);
        writeln!(
            stdout,
            "{:8.2}° {:>2}  {:7.3}°  {:9.1} m",
            point.azimuth_deg,
            cardinal.abbreviation(),
            point.elevation_angle_deg,
            point.distance_m
        )?;
    }
    if let Some(peak) = profile.highest() {
        writeln!(
            stdout,
            "highest: {:.3}° toward {} at {:.1} km",
            peak.elevation_angle_deg,
            Cardinal::from_azimuth(peak.azimuth_deg),
            peak.distance_m / 1000.0
        )?;
    }
    Ok(())
}

/// # Example with gnuplot
///
/// ```sh
/// cargo run --bin skyline -- --tile-dir=data/srtm --observer=-0.1807,-78.4678 csv | tr ',' ' ' | tail -n +2 > ~/.tmp/horizon && gnuplot -p -e "plot '~/.tmp/horizon' using 1:2 with lines"
/// ```
fn print_csv(profile: &HorizonProfile) -> Result<(), AnyError> {
    let mut stdout = std::io::stdout().lock();
    writeln!(stdout, "Azimuth,ElevationAngle,Distance")?;
    for point in profile.points() {
        writeln!(
            stdout,
            "{},{},{}",
            point.azimuth_deg, point.elevation_angle_deg, point.distance_m
        )?;
    }
    Ok(())
}

fn print_json(profile: &HorizonProfile) -> Result<(), AnyError> {
    #[derive(Serialize)]
    struct JsonProfile<'a> {
        observer_cell: [usize; 2],
        eye_elev_m: f64,
        azimuths_deg: &'a [f64],
        elevation_angles_deg: &'a [f64],
        distances_m: &'a [f64],
    }

    let json = serde_json::to_string(&JsonProfile {
        observer_cell: [profile.observer_cell.0, profile.observer_cell.1],
        eye_elev_m: profile.eye_elev_m,
        azimuths_deg: &profile.azimuths_deg,
        elevation_angles_deg: &profile.elevation_angles_deg,
        distances_m: &profile.distances_m,
    })?;
    println!("{json}");
    Ok(())
}

fn plot_ascii(profile: &HorizonProfile) {
    #[allow(clippy::cast_possible_truncation)]
    let plot_data: Vec<(f32, f32)> = profile
        .points()
        .map(|point| (point.azimuth_deg as f32, point.elevation_angle_deg as f32))
        .collect();
    let (Some(first), Some(last)) = (plot_data.first(), plot_data.last()) else {
        return;
    };
    if first.0 < last.0 {
        Chart::new(300, 150, first.0, last.0)
            .lineplot(&Shape::Lines(&plot_data))
            .display();
    }
}

fn print_patch(store: &TerrainStore, patch: &TerrainPatch) -> Result<(), AnyError> {
    let mut stdout = std::io::stdout().lock();
    writeln!(
        stdout,
        "patch {}x{} around cell {:?}, stride {}, {:.1} m spacing, {} valid samples",
        patch.rows,
        patch.cols,
        patch.center,
        patch.stride,
        patch.spacing_m,
        patch.valid().count()
    )?;
    for (label, sample) in [
        ("highest", patch.highest()),
        ("lowest above sea", patch.lowest_above_sea()),
    ] {
        let Some((row, col, elev)) = sample else {
            writeln!(stdout, "{label}: none")?;
            continue;
        };
        let (east, north) = patch.offset_m(row, col);
        write!(stdout, "{label}: {elev} m, {east:.0} m east {north:.0} m north")?;
        // The grid's final row and column have no coordinates.
        match store.indices_to_coords(patch.grid_index(row, col)) {
            Ok(coord) => writeln!(stdout, " ({:.5}, {:.5})", coord.y, coord.x)?,
            Err(_) => writeln!(stdout)?,
        }
    }
    Ok(())
}
