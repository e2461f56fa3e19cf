//! CLI argument definitions.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "hx711", version, about = "HX711 scale utility")]
pub struct Cli {
    /// Path to config TOML
    #[arg(long, value_name = "FILE", default_value = "hx711.toml")]
    pub config: PathBuf,

    /// Console log level (error|warn|info|debug|trace)
    #[arg(long = "log-level", value_name = "LEVEL", default_value = "warn")]
    pub log_level: String,

    /// Command to execute
    #[command(subcommand)]
    pub cmd: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Guided two-point calibration; prints recommended adjust values
    Calibrate {
        /// First reference weight (prompted for when omitted)
        #[arg(long)]
        weight1: Option<f64>,
        /// Second reference weight (prompted for when omitted)
        #[arg(long)]
        weight2: Option<f64>,
        /// HX711 SCK pin (overrides config)
        #[arg(long, value_name = "PIN")]
        clock_pin: Option<u8>,
        /// HX711 DT pin (overrides config)
        #[arg(long, value_name = "PIN")]
        data_pin: Option<u8>,
    },
    /// Continuously print the moving-average reading until Ctrl-C
    Monitor {
        /// Raw readings per median
        #[arg(long)]
        readings: Option<usize>,
        /// Moving-average window size
        #[arg(long)]
        window: Option<usize>,
        /// Print interval in milliseconds
        #[arg(long, value_name = "MS", default_value_t = 500)]
        interval_ms: u64,
        /// HX711 SCK pin (overrides config)
        #[arg(long, value_name = "PIN")]
        clock_pin: Option<u8>,
        /// HX711 DT pin (overrides config)
        #[arg(long, value_name = "PIN")]
        data_pin: Option<u8>,
    },
    /// Take a single median reading and print it
    Read {
        /// Raw readings per median
        #[arg(long)]
        readings: Option<usize>,
        /// Print the raw median instead of the adjusted reading
        #[arg(long, action = clap::ArgAction::SetTrue)]
        raw: bool,
        /// HX711 SCK pin (overrides config)
        #[arg(long, value_name = "PIN")]
        clock_pin: Option<u8>,
        /// HX711 DT pin (overrides config)
        #[arg(long, value_name = "PIN")]
        data_pin: Option<u8>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_calibrate_with_pins() {
        let cli = Cli::parse_from([
            "hx711",
            "calibrate",
            "--weight1",
            "50",
            "--weight2",
            "100",
            "--clock-pin",
            "6",
            "--data-pin",
            "5",
        ]);
        match cli.cmd {
            Commands::Calibrate {
                weight1,
                weight2,
                clock_pin,
                data_pin,
            } => {
                assert_eq!(weight1, Some(50.0));
                assert_eq!(weight2, Some(100.0));
                assert_eq!(clock_pin, Some(6));
                assert_eq!(data_pin, Some(5));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }
}
