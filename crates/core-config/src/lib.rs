//! Configuration loading and parsing for the prompter.
//!
//! Parses `prompter.toml` (or an override path provided by the binary)
//! into scroll, text, color, and tick sections, all optional. Unknown
//! fields are ignored and a parse failure falls back to defaults so a
//! stale config never blocks startup. Raw values are retained; the
//! clamped effective values are computed by `apply_limits` and logged
//! when they differ from what the file asked for.

use anyhow::Result;
use core_scroll::{SPEED_DEFAULT, SPEED_MAX, SPEED_MIN};
use core_state::{FONT_DEFAULT, FONT_MIN, LINE_SPACING_DEFAULT, LINE_SPACING_MAX};
use serde::Deserialize;
use std::{fs, path::PathBuf};
use tracing::info;

/// Smallest accepted tick interval in milliseconds.
pub const TICK_INTERVAL_MIN_MS: u64 = 1;
/// Largest accepted tick interval in milliseconds.
pub const TICK_INTERVAL_MAX_MS: u64 = 100;
/// Default tick interval in milliseconds (125 Hz).
pub const TICK_INTERVAL_DEFAULT_MS: u64 = 8;

#[derive(Debug, Deserialize, Clone)]
pub struct ScrollSection {
    #[serde(default = "defaults::speed")]
    pub speed: f64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct TextSection {
    #[serde(default = "defaults::font_size")]
    pub font_size: f64,
    #[serde(default = "defaults::line_spacing")]
    pub line_spacing: f64,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ColorSection {
    #[serde(default = "defaults::background")]
    pub background: String,
    #[serde(default = "defaults::foreground")]
    pub foreground: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct TickSection {
    #[serde(default = "defaults::tick_interval_ms")]
    pub interval_ms: u64,
}

mod defaults {
    use super::*;

    pub fn speed() -> f64 {
        SPEED_DEFAULT
    }
    pub fn font_size() -> f64 {
        FONT_DEFAULT
    }
    pub fn line_spacing() -> f64 {
        LINE_SPACING_DEFAULT
    }
    pub fn background() -> String {
        "black".to_string()
    }
    pub fn foreground() -> String {
        "white".to_string()
    }
    pub fn tick_interval_ms() -> u64 {
        TICK_INTERVAL_DEFAULT_MS
    }
}

impl Default for ScrollSection {
    fn default() -> Self {
        Self {
            speed: defaults::speed(),
        }
    }
}

impl Default for TextSection {
    fn default() -> Self {
        Self {
            font_size: defaults::font_size(),
            line_spacing: defaults::line_spacing(),
        }
    }
}

impl Default for ColorSection {
    fn default() -> Self {
        Self {
            background: defaults::background(),
            foreground: defaults::foreground(),
        }
    }
}

impl Default for TickSection {
    fn default() -> Self {
        Self {
            interval_ms: defaults::tick_interval_ms(),
        }
    }
}

#[derive(Debug, Deserialize, Default, Clone)]
pub struct ConfigFile {
    #[serde(default)]
    pub scroll: ScrollSection,
    #[serde(default)]
    pub text: TextSection,
    #[serde(default)]
    pub color: ColorSection,
    #[serde(default)]
    pub tick: TickSection,
}

/// Values after clamping into the ranges the runtime supports.
#[derive(Debug, Clone, PartialEq)]
pub struct EffectiveSettings {
    pub speed: f64,
    pub font_size: f64,
    pub line_spacing: f64,
    pub background: String,
    pub foreground: String,
    pub tick_interval_ms: u64,
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Original file content, when one was read.
    pub raw: Option<String>,
    /// Parsed (or default) data, pre-clamp.
    pub file: ConfigFile,
}

/// Best-effort config path: a local `prompter.toml` wins, then the
/// platform config dir.
pub fn discover() -> PathBuf {
    let local = PathBuf::from("prompter.toml");
    if local.exists() {
        return local;
    }
    if let Some(dir) = dirs::config_dir() {
        return dir.join("prompter").join("prompter.toml");
    }
    PathBuf::from("prompter.toml")
}

pub fn load_from(path: Option<PathBuf>) -> Result<Config> {
    let path = path.unwrap_or_else(discover);
    let Ok(content) = fs::read_to_string(&path) else {
        return Ok(Config::default());
    };
    match toml::from_str::<ConfigFile>(&content) {
        Ok(file) => Ok(Config {
            raw: Some(content),
            file,
        }),
        Err(err) => {
            info!(target: "config", %err, file = %path.display(), "parse_failed_using_defaults");
            Ok(Config::default())
        }
    }
}

impl Config {
    /// Clamp raw values into supported ranges, logging each adjustment.
    pub fn apply_limits(&self) -> EffectiveSettings {
        let speed = clamp_logged("scroll.speed", self.file.scroll.speed, SPEED_MIN, SPEED_MAX);
        let font_size = clamp_logged(
            "text.font_size",
            self.file.text.font_size,
            FONT_MIN,
            f64::MAX,
        );
        let line_spacing = clamp_logged(
            "text.line_spacing",
            self.file.text.line_spacing,
            0.0,
            LINE_SPACING_MAX,
        );
        let tick_interval_ms = self
            .file
            .tick
            .interval_ms
            .clamp(TICK_INTERVAL_MIN_MS, TICK_INTERVAL_MAX_MS);
        if tick_interval_ms != self.file.tick.interval_ms {
            info!(
                target: "config",
                raw = self.file.tick.interval_ms,
                clamped = tick_interval_ms,
                "tick_interval_clamped"
            );
        }
        EffectiveSettings {
            speed,
            font_size,
            line_spacing,
            background: self.file.color.background.clone(),
            foreground: self.file.color.foreground.clone(),
            tick_interval_ms,
        }
    }
}

fn clamp_logged(key: &'static str, raw: f64, min: f64, max: f64) -> f64 {
    // Non-finite values fall back to the lower bound rather than poisoning
    // downstream math.
    let clamped = if raw.is_finite() {
        raw.clamp(min, max)
    } else {
        min
    };
    if clamped != raw {
        info!(target: "config", key, raw, clamped, "value_clamped");
    }
    clamped
}
