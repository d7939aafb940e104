use std::error::Error;
use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use saferoute::hazard::{FileFormat, FileHazardSource};
use saferoute::{Coordinates, MemoryHazardSource, Router, RouterOptions, SafetyScorer};

#[derive(Debug, thiserror::Error)]
#[error("{0}: {1}")]
struct RequestError(&'static str, #[source] saferoute::InputError);

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Format {
    Auto,
    Json,
    JsonGz,
    JsonBz2,
}

impl From<Format> for FileFormat {
    fn from(value: Format) -> Self {
        match value {
            Format::Auto => FileFormat::Unknown,
            Format::Json => FileFormat::Json,
            Format::JsonGz => FileFormat::JsonGz,
            Format::JsonBz2 => FileFormat::JsonBz2,
        }
    }
}

#[derive(Parser)]
struct Cli {
    /// Path to a JSON array of hazards (optionally gzip or bzip2 compressed).
    /// Without it, routing assumes no hazards.
    #[arg(long, global = true)]
    hazards: Option<PathBuf>,

    /// Format of the hazards file
    #[arg(long, value_enum, default_value_t = Format::Auto, global = true)]
    format: Format,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Compute the safest route between two points
    Route {
        /// Latitude of the start point
        #[arg(allow_negative_numbers = true)]
        start_lat: f64,

        /// Longitude of the start point
        #[arg(allow_negative_numbers = true)]
        start_lon: f64,

        /// Latitude of the end point
        #[arg(allow_negative_numbers = true)]
        end_lat: f64,

        /// Longitude of the end point
        #[arg(allow_negative_numbers = true)]
        end_lon: f64,

        /// Number of segments between start and end; generates one less waypoint
        #[arg(long, default_value_t = saferoute::DEFAULT_WAYPOINT_COUNT)]
        waypoints: usize,

        /// Cost added for entering a node, multiplied by its safety deficit
        #[arg(
            long,
            default_value_t = saferoute::DEFAULT_PENALTY_FACTOR,
            value_parser = parse_penalty_factor
        )]
        penalty_factor: f64,
    },

    /// Score the safety of a single location
    Score {
        /// Latitude of the location
        #[arg(allow_negative_numbers = true)]
        lat: f64,

        /// Longitude of the location
        #[arg(allow_negative_numbers = true)]
        lon: f64,

        /// Type of the closest hazard
        #[arg(long, default_value = saferoute::scorer::UNKNOWN_HAZARD)]
        hazard_type: String,
    },
}

fn parse_penalty_factor(s: &str) -> Result<f64, String> {
    let value: f64 = s.parse().map_err(|e| format!("{}", e))?;
    if value.is_finite() && value >= 0.0 {
        Ok(value)
    } else {
        Err(format!("expected a finite, non-negative number, got {}", value))
    }
}

pub fn main() -> Result<(), Box<dyn Error>> {
    colog::init();
    let cli = Cli::parse();

    let source: Box<dyn saferoute::HazardSource> = match cli.hazards {
        Some(path) => Box::new(FileHazardSource::new(path, cli.format.into())),
        None => Box::new(MemoryHazardSource::new()),
    };

    let output = match cli.command {
        Command::Route {
            start_lat,
            start_lon,
            end_lat,
            end_lon,
            waypoints,
            penalty_factor,
        } => {
            let router = Router::new(
                SafetyScorer::default(),
                RouterOptions {
                    waypoint_count: waypoints,
                    penalty_factor,
                    ..RouterOptions::default()
                },
            );
            let route = router
                .compute_route(
                    source.as_ref(),
                    Coordinates::new(start_lat, start_lon),
                    Coordinates::new(end_lat, end_lon),
                )
                .map_err(|e| RequestError("route", e))?;
            serde_json::to_string_pretty(&route)?
        }

        Command::Score {
            lat,
            lon,
            hazard_type,
        } => {
            let score = Router::default()
                .score_location(source.as_ref(), lat, lon, &hazard_type)
                .map_err(|e| RequestError("score", e))?;
            serde_json::to_string_pretty(&score)?
        }
    };

    println!("{}", output);
    Ok(())
}
