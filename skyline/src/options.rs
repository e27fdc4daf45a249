use anyhow::{anyhow, Error as AnyError};
use clap::{Parser, Subcommand};
use geo::geometry::Coord;
use std::{path::PathBuf, str::FromStr};

/// Compute the terrain horizon seen from a point.
#[derive(Parser, Debug, Clone)]
pub struct Cli {
    /// Directory of SRTM .hgt tiles.
    #[arg(short, long)]
    pub tile_dir: PathBuf,

    /// Observer "lat,lon".
    #[arg(short, long, allow_hyphen_values = true)]
    pub observer: LatLon,

    /// Bearing the view is centered on, in degrees.
    #[arg(short, long, default_value_t = 90.0)]
    pub azimuth: f64,

    /// Width of the view, in degrees.
    #[arg(long, default_value_t = 60.0)]
    pub fov: f64,

    /// Observer eye height above ground, in meters.
    #[arg(long, default_value_t = 1.7)]
    pub height: f64,

    /// How far each ray travels, in kilometers.
    #[arg(short, long, default_value_t = 50.0)]
    pub max_distance: f64,

    /// Number of rays cast across the view.
    #[arg(short, long, default_value_t = 360)]
    pub rays: usize,

    /// Samples per tile side (1201 for 3 arc-second, 3601 for 1
    /// arc-second).
    #[arg(long, default_value_t = 1201)]
    pub resolution: usize,

    /// Memory-map tiles instead of reading them into memory.
    #[arg(long, default_value_t = false)]
    pub memmap: bool,

    /// Add earth curvature to elevation angles.
    #[arg(short, long, default_value_t = false)]
    pub earth_curve: bool,

    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Clone, Debug, Copy)]
pub struct LatLon(pub Coord<f64>);

impl FromStr for LatLon {
    type Err = AnyError;
    fn from_str(s: &str) -> Result<Self, AnyError> {
        let (lat_str, lon_str) = s
            .split_once(',')
            .ok_or_else(|| anyhow!("not a valid lat,lon"))?;
        let lat = f64::from_str(lat_str.trim())?;
        let lon = f64::from_str(lon_str.trim())?;
        if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lon) {
            return Err(anyhow!("lat,lon out of range"));
        }
        Ok(Self(Coord { y: lat, x: lon }))
    }
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Print a table of the horizon to stdout.
    Display,

    /// Print horizon values as CSV to stdout.
    Csv,

    /// Print horizon values as JSON to stdout.
    Json,

    /// Plot the horizon to terminal.
    Plot,

    /// Summarize the terrain around the observer.
    Patch {
        /// Patch radius, in kilometers.
        #[arg(long)]
        radius: f64,

        /// Keep every Nth grid sample.
        #[arg(long)]
        stride: Option<usize>,
    },
}

#[cfg(test)]
mod tests {
    use super::{Cli, Command, LatLon};
    use clap::Parser;
    use std::str::FromStr;

    #[test]
    fn test_parse_lat_lon() {
        let LatLon(coord) = LatLon::from_str("-0.1807,-78.4678").unwrap();
        assert_eq!(coord.y, -0.1807);
        assert_eq!(coord.x, -78.4678);
        assert!(LatLon::from_str(" 1.5 , 2").is_ok());
        assert!(LatLon::from_str("1.5").is_err());
        assert!(LatLon::from_str("a,b").is_err());
        assert!(LatLon::from_str("91,0").is_err());
    }

    #[test]
    fn test_defaults() {
        let cli = Cli::try_parse_from([
            "skyline",
            "--tile-dir",
            "/tmp",
            "--observer",
            "-0.1807,-78.4678",
            "display",
        ])
        .unwrap();
        assert_eq!(cli.azimuth, 90.0);
        assert_eq!(cli.fov, 60.0);
        assert_eq!(cli.height, 1.7);
        assert_eq!(cli.max_distance, 50.0);
        assert_eq!(cli.rays, 360);
        assert_eq!(cli.resolution, 1201);
        assert!(!cli.earth_curve);
        assert!(matches!(cli.cmd, Command::Display));
    }

    #[test]
    fn test_patch_command() {
        let cli = Cli::try_parse_from([
            "skyline",
            "-t",
            "/tmp",
            "-o",
            "0,0",
            "patch",
            "--radius",
            "20",
        ])
        .unwrap();
        assert!(matches!(
            cli.cmd,
            Command::Patch {
                radius,
                stride: None
            } if radius == 20.0
        ));
        assert!(Cli::try_parse_from(["skyline", "-t", "/tmp", "-o", "0,0", "patch"]).is_err());
    }
}
