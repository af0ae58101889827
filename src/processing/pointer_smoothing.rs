//! Two-axis pointer smoothing
//!
//! Runs an independent One Euro filter per axis over the pointer landmark
//! and exposes the single 0–1 "smoothing" knob used by the configuration.

use crate::processing::one_euro::{CoordinateSmoother, DEFAULT_BETA, DEFAULT_D_CUTOFF, DEFAULT_MIN_CUTOFF};
use serde::{Deserialize, Serialize};

/// Upper bound of the smoothing knob
pub const MAX_SMOOTHING_LEVEL: f64 = 0.99;

/// Pointer position with both raw and smoothed coordinates (normalized camera space)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SmoothedPoint {
    /// Filter output; what the zone mapper consumes
    pub x: f64,
    pub y: f64,
    /// Index fingertip as captured, kept for recordings and debugging
    pub raw_x: f64,
    pub raw_y: f64,
}

/// Filter parameters shared by both axes
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterParams {
    pub min_cutoff: f64,
    pub beta: f64,
    pub d_cutoff: f64,
}

impl FilterParams {
    /// Map a smoothing level in `[0, 0.99]` to filter parameters.
    ///
    /// Higher levels lower the minimum cutoff (smoother at rest) and raise
    /// beta slightly so fast motion still tracks.
    pub fn from_level(level: f64) -> Self {
        let s = level.clamp(0.0, MAX_SMOOTHING_LEVEL);
        Self {
            min_cutoff: 0.05 + (1.0 - s) * 0.5,
            beta: 0.001 + s * 0.01,
            d_cutoff: DEFAULT_D_CUTOFF,
        }
    }
}

impl Default for FilterParams {
    fn default() -> Self {
        Self {
            min_cutoff: DEFAULT_MIN_CUTOFF,
            beta: DEFAULT_BETA,
            d_cutoff: DEFAULT_D_CUTOFF,
        }
    }
}

/// Pair of coordinate smoothers for the x and y pointer axes
#[derive(Debug, Clone)]
pub struct PointerSmoother {
    pub x: CoordinateSmoother,
    pub y: CoordinateSmoother,
    enabled: bool,
}

impl PointerSmoother {
    pub fn new(params: FilterParams) -> Self {
        Self {
            x: CoordinateSmoother::new(params.min_cutoff, params.beta, params.d_cutoff),
            y: CoordinateSmoother::new(params.min_cutoff, params.beta, params.d_cutoff),
            enabled: true,
        }
    }

    /// Smooth one pointer sample. When disabled the raw point is returned.
    pub fn smooth(&mut self, x: f64, y: f64, timestamp: f64) -> SmoothedPoint {
        if !self.enabled {
            return SmoothedPoint {
                x,
                y,
                raw_x: x,
                raw_y: y,
            };
        }

        SmoothedPoint {
            x: self.x.filter(x, timestamp),
            y: self.y.filter(y, timestamp),
            raw_x: x,
            raw_y: y,
        }
    }

    pub fn reset(&mut self) {
        self.x.reset();
        self.y.reset();
    }

    pub fn set_params(&mut self, params: FilterParams) {
        for axis in [&mut self.x, &mut self.y] {
            axis.set_min_cutoff(params.min_cutoff);
            axis.set_beta(params.beta);
            axis.set_d_cutoff(params.d_cutoff);
        }
    }

    pub fn params(&self) -> FilterParams {
        FilterParams {
            min_cutoff: self.x.min_cutoff(),
            beta: self.x.beta(),
            d_cutoff: self.x.d_cutoff(),
        }
    }

    /// Disabling also drops the filter history so re-enabling starts clean
    pub fn set_enabled(&mut self, enabled: bool) {
        if self.enabled != enabled {
            self.reset();
        }
        self.enabled = enabled;
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }
}

impl Default for PointerSmoother {
    fn default() -> Self {
        Self::new(FilterParams::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FRAME: f64 = 1.0 / 30.0;

    #[test]
    fn test_axes_are_independent() {
        let mut smoother = PointerSmoother::default();
        smoother.smooth(0.2, 0.8, 0.0);

        // Only x moves; y must stay exactly where it was
        let p = smoother.smooth(0.6, 0.8, FRAME);
        assert!(p.x > 0.2 && p.x < 0.6, "x {} should lag toward 0.6", p.x);
        assert!((p.y - 0.8).abs() < 1e-12);
        assert_eq!(p.raw_x, 0.6);
    }

    #[test]
    fn test_smoothing_reduces_jitter() {
        let mut smoother = PointerSmoother::default();

        let mut raw_spread = 0.0f64;
        let mut smooth_spread = 0.0f64;
        for i in 0..120 {
            let jitter = if i % 2 == 0 { 0.01 } else { -0.01 };
            let p = smoother.smooth(0.5 + jitter, 0.5, i as f64 * FRAME);
            if i > 10 {
                raw_spread = raw_spread.max((p.raw_x - 0.5).abs());
                smooth_spread = smooth_spread.max((p.x - 0.5).abs());
            }
        }

        assert!(
            smooth_spread < raw_spread / 2.0,
            "Smoothed spread {} should be well below raw spread {}",
            smooth_spread,
            raw_spread
        );
    }

    #[test]
    fn test_disabled_passes_raw() {
        let mut smoother = PointerSmoother::default();
        smoother.set_enabled(false);
        smoother.smooth(0.1, 0.1, 0.0);
        let p = smoother.smooth(0.9, 0.3, FRAME);
        assert_eq!((p.x, p.y), (0.9, 0.3));
    }

    #[test]
    fn test_level_mapping() {
        let smooth = FilterParams::from_level(0.9);
        let sharp = FilterParams::from_level(0.1);
        assert!(smooth.min_cutoff < sharp.min_cutoff);
        assert!(smooth.beta > sharp.beta);

        let clamped = FilterParams::from_level(4.0);
        assert_eq!(clamped, FilterParams::from_level(MAX_SMOOTHING_LEVEL));
    }

    #[test]
    fn test_set_params_applies_to_both_axes() {
        let mut smoother = PointerSmoother::default();
        let params = FilterParams::from_level(0.5);
        smoother.set_params(params);
        assert_eq!(smoother.params(), params);
        assert_eq!(smoother.y.beta(), params.beta);
    }
}
