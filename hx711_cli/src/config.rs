//! Config schema and validation.

use eyre::WrapErr;
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct Config {
    pub pins: Option<PinsCfg>,
    #[serde(default)]
    pub scale: ScaleCfg,
}

#[derive(Debug, Deserialize, Clone, Copy)]
#[serde(deny_unknown_fields)]
pub struct PinsCfg {
    /// SCK / clock GPIO number
    pub clock: u8,
    /// DT / data GPIO number
    pub data: u8,
}

#[derive(Debug, Deserialize, Clone, Copy)]
#[serde(default, deny_unknown_fields)]
pub struct ScaleCfg {
    /// Gain setting: 128, 64, or 32
    pub gain: u32,
    /// Raw readings per median
    pub readings: usize,
    /// Raw value corresponding to zero load
    pub zero_offset: i32,
    /// Raw counts per output unit
    pub scale_factor: f64,
    /// Moving-average window for `monitor`
    pub window: usize,
}

impl Default for ScaleCfg {
    fn default() -> Self {
        Self {
            gain: 128,
            readings: 11,
            zero_offset: 0,
            scale_factor: 1.0,
            window: 5,
        }
    }
}

/// Parse and validate config text.
pub fn parse(text: &str) -> eyre::Result<Config> {
    let cfg: Config = toml::from_str(text).wrap_err("invalid config TOML")?;
    if cfg.scale.scale_factor == 0.0 || !cfg.scale.scale_factor.is_finite() {
        eyre::bail!("scale.scale_factor must be finite and non-zero");
    }
    if cfg.scale.readings == 0 {
        eyre::bail!("scale.readings must be at least 1");
    }
    if cfg.scale.window == 0 {
        eyre::bail!("scale.window must be at least 1");
    }
    Ok(cfg)
}

/// Load config from `path`; a missing file yields the defaults so the CLI
/// works with flags and prompts alone.
pub fn load(path: &Path) -> eyre::Result<Config> {
    if !path.exists() {
        return Ok(Config::default());
    }
    let text = std::fs::read_to_string(path)
        .wrap_err_with(|| format!("failed to read config file {}", path.display()))?;
    parse(&text)
}
