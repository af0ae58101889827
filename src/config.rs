//! Runtime configuration
//!
//! Loaded from JSON (camelCase keys); every field has a default so partial
//! files are fine.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::gestures::ClassifierConfig;
use crate::processing::pointer_smoothing::MAX_SMOOTHING_LEVEL;
use crate::processing::zone::{MAX_SENSITIVITY, MIN_SENSITIVITY};
use crate::processing::{ControlZone, FilterParams, ScreenRect, ZoneMapper};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid value for {key}: {value} ({reason})")]
    Invalid {
        key: &'static str,
        value: String,
        reason: &'static str,
    },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PointerConfig {
    pub pinch_threshold: f64,
    pub pinch_release_threshold: f64,
    pub click_hold_frames: u32,
    pub click_hold_ms: u32,
    pub click_max_ms: u32,
    pub double_click_interval_ms: u32,
    /// Palm frames required before pause toggles
    pub pause_hold_frames: u32,
    pub scroll_threshold: f64,
    pub scroll_speed: i32,
    pub sensitivity: f64,
    pub control_zone: ControlZone,
    pub min_cutoff: f64,
    pub beta: f64,
    pub d_cutoff: f64,
    /// Single 0–0.99 knob; overrides `min_cutoff` and `beta` when set
    #[serde(skip_serializing_if = "Option::is_none")]
    pub smoothing: Option<f64>,
    pub smoothing_enabled: bool,
    pub screen: ScreenRect,
}

impl Default for PointerConfig {
    fn default() -> Self {
        let classifier = ClassifierConfig::default();
        let filter = FilterParams::default();
        Self {
            pinch_threshold: classifier.pinch_threshold,
            pinch_release_threshold: classifier.pinch_release_threshold,
            click_hold_frames: classifier.click_hold_frames,
            click_hold_ms: 250,
            click_max_ms: 300,
            double_click_interval_ms: 350,
            pause_hold_frames: 10,
            scroll_threshold: classifier.scroll_threshold,
            scroll_speed: 5,
            sensitivity: 1.5,
            control_zone: ControlZone::default(),
            min_cutoff: filter.min_cutoff,
            beta: filter.beta,
            d_cutoff: filter.d_cutoff,
            smoothing: None,
            smoothing_enabled: true,
            screen: ScreenRect::default(),
        }
    }
}

impl PointerConfig {
    /// Parse and validate
    pub fn from_json_str(json: &str) -> ConfigResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&content)?;
        tracing::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Report the first out-of-range value
    pub fn validate(&self) -> ConfigResult<()> {
        check(
            "pinchThreshold",
            self.pinch_threshold,
            self.pinch_threshold > 0.0 && self.pinch_threshold < 0.5,
            "must be in (0, 0.5)",
        )?;
        check(
            "pinchReleaseThreshold",
            self.pinch_release_threshold,
            self.pinch_release_threshold > self.pinch_threshold
                && self.pinch_release_threshold < 0.5,
            "must be above pinchThreshold and below 0.5",
        )?;
        check(
            "clickHoldFrames",
            self.click_hold_frames,
            self.click_hold_frames >= 1,
            "must be at least 1",
        )?;
        check(
            "clickHoldMs",
            self.click_hold_ms,
            (50..=2000).contains(&self.click_hold_ms),
            "must be in 50..=2000",
        )?;
        check(
            "clickMaxMs",
            self.click_max_ms,
            (50..=2000).contains(&self.click_max_ms),
            "must be in 50..=2000",
        )?;
        check(
            "doubleClickIntervalMs",
            self.double_click_interval_ms,
            (100..=1000).contains(&self.double_click_interval_ms),
            "must be in 100..=1000",
        )?;
        check(
            "pauseHoldFrames",
            self.pause_hold_frames,
            self.pause_hold_frames >= 1,
            "must be at least 1",
        )?;
        check(
            "scrollThreshold",
            self.scroll_threshold,
            self.scroll_threshold > 0.0 && self.scroll_threshold < 0.5,
            "must be in (0, 0.5)",
        )?;
        check(
            "scrollSpeed",
            self.scroll_speed,
            (1..=20).contains(&self.scroll_speed),
            "must be in 1..=20",
        )?;
        check(
            "sensitivity",
            self.sensitivity,
            (MIN_SENSITIVITY..=MAX_SENSITIVITY).contains(&self.sensitivity),
            "must be in 0.1..=5.0",
        )?;

        let zone = &self.control_zone;
        check(
            "controlZone.xMin",
            zone.x_min,
            (0.0..=0.5).contains(&zone.x_min),
            "must be in 0..=0.5",
        )?;
        check(
            "controlZone.xMax",
            zone.x_max,
            (0.5..=1.0).contains(&zone.x_max) && zone.x_max > zone.x_min,
            "must be in 0.5..=1 and above xMin",
        )?;
        check(
            "controlZone.yMin",
            zone.y_min,
            (0.0..=0.5).contains(&zone.y_min),
            "must be in 0..=0.5",
        )?;
        check(
            "controlZone.yMax",
            zone.y_max,
            (0.5..=1.0).contains(&zone.y_max) && zone.y_max > zone.y_min,
            "must be in 0.5..=1 and above yMin",
        )?;

        check("minCutoff", self.min_cutoff, self.min_cutoff > 0.0, "must be positive")?;
        check("beta", self.beta, self.beta >= 0.0, "must not be negative")?;
        check("dCutoff", self.d_cutoff, self.d_cutoff > 0.0, "must be positive")?;
        if let Some(level) = self.smoothing {
            check(
                "smoothing",
                level,
                (0.0..=MAX_SMOOTHING_LEVEL).contains(&level),
                "must be in 0..=0.99",
            )?;
        }

        check(
            "screen.width",
            self.screen.width,
            self.screen.width >= 1 && fits_i32(self.screen.x, self.screen.width),
            "must be at least 1 and keep the right edge within i32",
        )?;
        check(
            "screen.height",
            self.screen.height,
            self.screen.height >= 1 && fits_i32(self.screen.y, self.screen.height),
            "must be at least 1 and keep the bottom edge within i32",
        )?;

        Ok(())
    }

    pub fn classifier(&self) -> ClassifierConfig {
        ClassifierConfig {
            pinch_threshold: self.pinch_threshold,
            pinch_release_threshold: self.pinch_release_threshold,
            click_hold_frames: self.click_hold_frames,
            click_hold_duration: ms_to_secs(self.click_hold_ms),
            click_max_duration: ms_to_secs(self.click_max_ms),
            double_click_interval: ms_to_secs(self.double_click_interval_ms),
            scroll_threshold: self.scroll_threshold,
        }
    }

    /// The smoothing knob wins over explicit cutoff/beta when present
    pub fn filter_params(&self) -> FilterParams {
        match self.smoothing {
            Some(level) => FilterParams {
                d_cutoff: self.d_cutoff,
                ..FilterParams::from_level(level)
            },
            None => FilterParams {
                min_cutoff: self.min_cutoff,
                beta: self.beta,
                d_cutoff: self.d_cutoff,
            },
        }
    }

    pub fn zone_mapper(&self) -> ZoneMapper {
        ZoneMapper::new(self.control_zone, self.sensitivity, self.screen)
    }
}

fn ms_to_secs(ms: u32) -> f64 {
    f64::from(ms) / 1000.0
}

fn fits_i32(origin: i32, extent: u32) -> bool {
    i64::from(origin) + i64::from(extent) <= i64::from(i32::MAX)
}

fn check<T: ToString>(
    key: &'static str,
    value: T,
    ok: bool,
    reason: &'static str,
) -> ConfigResult<()> {
    if ok {
        Ok(())
    } else {
        Err(ConfigError::Invalid {
            key,
            value: value.to_string(),
            reason,
        })
    }
}
