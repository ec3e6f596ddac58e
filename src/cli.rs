use clap::Parser;

use crate::config::{FieldConfig, PairScan};

/// An interactive particle field that drifts, links up and shies away from the cursor
#[derive(Parser, Debug)]
#[command()]
pub struct Args {
    /// Surface area, in pixels², per particle
    #[arg(short, long, default_value_t = 10_000)]
    pub pixels_per_particle: u64,

    /// Cap the framerate
    ///
    /// if not set the field runs at the display refresh rate
    #[arg(short, long)]
    pub framerate: Option<u32>,

    /// Seed for particle placement, random if not set
    #[arg(short, long)]
    pub seed: Option<u64>,

    /// How close particle pairs are found
    #[arg(long, value_enum, default_value_t = PairScan::Brute)]
    pub pair_scan: PairScan,

    /// Show the settings overlay on start [F1]
    #[arg(long)]
    pub overlay: bool,
}

impl Args {
    pub fn field_config(&self) -> FieldConfig {
        FieldConfig {
            pixels_per_particle: self.pixels_per_particle,
            pair_scan: self.pair_scan,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let args = Args::parse_from(["particle_field"]);
        let config = args.field_config();
        assert_eq!(config.pixels_per_particle, 10_000);
        assert_eq!(config.pair_scan, PairScan::Brute);
        assert!(args.framerate.is_none());
        assert!(args.seed.is_none());
        assert!(!args.overlay);
    }

    #[test]
    fn overrides() {
        let args = Args::parse_from([
            "particle_field",
            "-p",
            "2500",
            "--pair-scan",
            "grid",
            "-f",
            "30",
            "--seed",
            "5",
        ]);
        let config = args.field_config();
        assert_eq!(config.pixels_per_particle, 2500);
        assert_eq!(config.pair_scan, PairScan::Grid);
        assert_eq!(args.framerate, Some(30));
        assert_eq!(args.seed, Some(5));
    }
}
