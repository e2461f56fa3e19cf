//! Interactive HX711 utility: guided calibration, continuous monitoring,
//! and one-shot reads.
//!
//! Builds against the Raspberry Pi GPIO backend with `--features hardware`;
//! the default build runs against the simulated chip so every subcommand
//! can be exercised off-target.

mod cli;
mod config;

use std::io::Write;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use clap::Parser;
use eyre::WrapErr;
use hx711_core::{BackgroundSampler, Hx711};
use tracing::warn;

use crate::cli::{Cli, Commands};
use crate::config::{Config, PinsCfg, ScaleCfg};

#[cfg(feature = "hardware")]
type Session = Hx711<hx711_hardware::rpi::RpiClockPin, hx711_hardware::rpi::RpiDataPin>;

#[cfg(not(feature = "hardware"))]
type Session = Hx711<hx711_hardware::sim::SimClockPin, hx711_hardware::sim::SimDataPin>;

fn main() -> eyre::Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    init_logging(&cli.log_level);

    let cfg = config::load(&cli.config)?;

    match cli.cmd {
        Commands::Calibrate {
            weight1,
            weight2,
            clock_pin,
            data_pin,
        } => calibrate(&cfg, weight1, weight2, clock_pin, data_pin),
        Commands::Monitor {
            readings,
            window,
            interval_ms,
            clock_pin,
            data_pin,
        } => monitor(&cfg, readings, window, interval_ms, clock_pin, data_pin),
        Commands::Read {
            readings,
            raw,
            clock_pin,
            data_pin,
        } => read(&cfg, readings, raw, clock_pin, data_pin),
    }
}

fn init_logging(level: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

#[cfg(feature = "hardware")]
fn open_session(pins: PinsCfg, scale: &ScaleCfg) -> eyre::Result<Session> {
    let mut hx = hx711_hardware::rpi::open(pins.clock, pins.data)
        .wrap_err("failed to open HX711 pins")?;
    apply_scale(&mut hx, scale)?;
    Ok(hx)
}

#[cfg(not(feature = "hardware"))]
fn open_session(pins: PinsCfg, scale: &ScaleCfg) -> eyre::Result<Session> {
    let _ = pins; // the simulated chip has no real pins to claim
    eprintln!("note: built without the hardware feature, using the simulated chip");
    let (clk, dt) = hx711_hardware::sim::simulated_pair(123_456, 40);
    let mut hx = Hx711::new(clk, dt);
    apply_scale(&mut hx, scale)?;
    Ok(hx)
}

fn apply_scale(hx: &mut Session, scale: &ScaleCfg) -> eyre::Result<()> {
    hx.set_gain(scale.gain);
    hx.set_adjust(scale.zero_offset, scale.scale_factor)
        .wrap_err("invalid calibration values in config")?;
    Ok(())
}

/// Flags win over the config file; whatever is still missing is prompted.
fn resolve_pins(
    cfg: &Config,
    clock_flag: Option<u8>,
    data_flag: Option<u8>,
) -> eyre::Result<PinsCfg> {
    let from_cfg = cfg.pins;
    let clock = match clock_flag.or(from_cfg.map(|p| p.clock)) {
        Some(p) => p,
        None => prompt_number("HX711 clock (SCK) pin")?,
    };
    let data = match data_flag.or(from_cfg.map(|p| p.data)) {
        Some(p) => p,
        None => prompt_number("HX711 data (DT) pin")?,
    };
    Ok(PinsCfg { clock, data })
}

fn prompt_number<T: std::str::FromStr>(label: &str) -> eyre::Result<T> {
    print!("{label}: ");
    std::io::stdout().flush()?;
    let mut line = String::new();
    std::io::stdin().read_line(&mut line)?;
    let entry = line.trim();
    if entry.is_empty() {
        eyre::bail!("invalid input: nothing entered for {label}");
    }
    entry
        .parse()
        .map_err(|_| eyre::eyre!("invalid input: {entry:?} is not a valid number for {label}"))
}

fn resolve_weight(flag: Option<f64>, label: &str) -> eyre::Result<f64> {
    let weight = match flag {
        Some(w) => w,
        None => prompt_number(label)?,
    };
    if !(weight.is_finite() && weight > 0.0) {
        eyre::bail!("invalid input: {label} must be positive");
    }
    Ok(weight)
}

fn calibrate(
    cfg: &Config,
    weight1: Option<f64>,
    weight2: Option<f64>,
    clock_pin: Option<u8>,
    data_pin: Option<u8>,
) -> eyre::Result<()> {
    let weight1 = resolve_weight(weight1, "first reference weight")?;
    let weight2 = resolve_weight(weight2, "second reference weight")?;
    let pins = resolve_pins(cfg, clock_pin, data_pin)?;
    let mut hx = open_session(pins, &cfg.scale)?;

    let mut stdout = std::io::stdout();
    let values = hx
        .get_adjust_values(weight1, weight2, &mut stdout)
        .wrap_err("calibration failed")?;

    println!("zero_offset should be set to: {}", values.zero_offset);
    println!(
        "scale_factor should be set to a value between {:.6} and {:.6}",
        values.scale_min(),
        values.scale_max()
    );
    Ok(())
}

fn monitor(
    cfg: &Config,
    readings: Option<usize>,
    window: Option<usize>,
    interval_ms: u64,
    clock_pin: Option<u8>,
    data_pin: Option<u8>,
) -> eyre::Result<()> {
    let readings = readings.unwrap_or(cfg.scale.readings);
    let window = window.unwrap_or(cfg.scale.window);
    let pins = resolve_pins(cfg, clock_pin, data_pin)?;
    let hx = open_session(pins, &cfg.scale)?;

    let running = Arc::new(AtomicBool::new(true));
    let running_in_handler = running.clone();
    ctrlc::set_handler(move || running_in_handler.store(false, Ordering::Relaxed))
        .wrap_err("failed to install Ctrl-C handler")?;

    let sampler = BackgroundSampler::spawn(hx, readings, window);
    println!("monitoring; press Ctrl-C to stop");
    while running.load(Ordering::Relaxed) {
        std::thread::sleep(Duration::from_millis(interval_ms.max(1)));
        println!("{:>12.3}", sampler.latest());
    }

    if !sampler.stop_and_wait(Duration::from_secs(2)) {
        warn!("sampler did not confirm shutdown in time");
    }
    println!("stopped");
    Ok(())
}

fn read(
    cfg: &Config,
    readings: Option<usize>,
    raw: bool,
    clock_pin: Option<u8>,
    data_pin: Option<u8>,
) -> eyre::Result<()> {
    let readings = readings.unwrap_or(cfg.scale.readings);
    let pins = resolve_pins(cfg, clock_pin, data_pin)?;
    let mut hx = open_session(pins, &cfg.scale)?;

    if raw {
        println!("{}", hx.read_median_raw(readings)?);
    } else {
        println!("{:.3}", hx.read_median(readings)?);
    }
    Ok(())
}
