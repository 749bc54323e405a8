// geotag/src/cli.rs
use crate::processors::Hemisphere;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Read GPS position and capture time from photos and look up where they were taken
#[derive(Parser, Debug)]
#[command(name = "geotag", version, about)]
pub struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// TOML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run a photo through extraction and reverse geocoding
    Ingest {
        /// Photo to ingest (JPEG, PNG, WebP or TIFF)
        input: PathBuf,

        /// Skip the reverse-geocoding lookup
        #[arg(long)]
        no_geocode: bool,

        /// Save the record as JSON to this path after confirmation
        #[arg(short, long)]
        save: Option<PathBuf>,

        /// Save without asking for confirmation
        #[arg(short, long, requires = "save")]
        yes: bool,

        /// Reverse-geocoding endpoint
        #[arg(long)]
        endpoint: Option<String>,

        /// Geocoding request timeout in seconds
        #[arg(long)]
        timeout: Option<u64>,
    },

    /// Show the raw GPS and capture-time tags of a photo
    Info {
        input: PathBuf,
    },

    /// Convert degrees/minutes/seconds to signed decimal degrees
    Convert {
        degrees: f64,
        minutes: f64,
        seconds: f64,
        /// Hemisphere reference: N, S, E or W
        reference: Hemisphere,
    },

    /// Show the map view for a coordinate pair
    Map {
        #[arg(long, allow_negative_numbers = true, requires = "lon")]
        lat: Option<f64>,
        #[arg(long, allow_negative_numbers = true, requires = "lat")]
        lon: Option<f64>,
    },
}
