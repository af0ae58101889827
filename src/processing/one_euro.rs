//! One Euro filter for pointer coordinates
//!
//! An exponential low-pass filter whose cutoff rises with the estimated speed
//! of the signal: heavy smoothing while the hand is nearly still, low lag
//! while it moves deliberately.

use std::f64::consts::PI;

/// Default minimum cutoff frequency (Hz)
pub const DEFAULT_MIN_CUTOFF: f64 = 1.0;
/// Default speed coefficient
pub const DEFAULT_BETA: f64 = 0.007;
/// Default cutoff for the derivative filter (Hz)
pub const DEFAULT_D_CUTOFF: f64 = 1.0;

/// Substitute for non-positive time deltas (seconds)
pub const MIN_TIME_DELTA: f64 = 1e-6;

const MIN_CUTOFF_FLOOR: f64 = 1e-6;

/// Filter history for one axis, held as `Option<SmoothingState>` by the
/// smoother and absent until the first sample after a reset.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SmoothingState {
    pub last_raw: f64,
    pub last_filtered: f64,
    pub last_derivative: f64,
    pub last_timestamp: f64,
}

/// Adaptive low-pass filter for a single axis
#[derive(Debug, Clone)]
pub struct CoordinateSmoother {
    min_cutoff: f64,
    beta: f64,
    d_cutoff: f64,
    state: Option<SmoothingState>,
}

impl CoordinateSmoother {
    pub fn new(min_cutoff: f64, beta: f64, d_cutoff: f64) -> Self {
        let mut smoother = Self {
            min_cutoff: DEFAULT_MIN_CUTOFF,
            beta: DEFAULT_BETA,
            d_cutoff: DEFAULT_D_CUTOFF,
            state: None,
        };
        smoother.set_min_cutoff(min_cutoff);
        smoother.set_beta(beta);
        smoother.set_d_cutoff(d_cutoff);
        smoother
    }

    /// Smoothing coefficient for a cutoff frequency and time step.
    ///
    /// `alpha = 1 / (1 + tau / dt)` with `tau = 1 / (2π·cutoff)`; always in `(0, 1]`
    /// for positive inputs.
    pub fn alpha(cutoff: f64, dt: f64) -> f64 {
        let tau = 1.0 / (2.0 * PI * cutoff);
        1.0 / (1.0 + tau / dt)
    }

    /// Filter one sample.
    ///
    /// - `value`: raw coordinate
    /// - `timestamp`: sample time in seconds
    ///
    /// NaN or infinite input is not corrected and propagates into the output.
    pub fn filter(&mut self, value: f64, timestamp: f64) -> f64 {
        let Some(prev) = self.state else {
            self.state = Some(SmoothingState {
                last_raw: value,
                last_filtered: value,
                last_derivative: 0.0,
                last_timestamp: timestamp,
            });
            return value;
        };

        let mut dt = timestamp - prev.last_timestamp;
        if dt <= 0.0 {
            dt = MIN_TIME_DELTA;
        }

        // 1. Velocity estimate, low-passed at the fixed derivative cutoff
        let dx = (value - prev.last_raw) / dt;
        let a_d = Self::alpha(self.d_cutoff, dt);
        let edx = a_d * dx + (1.0 - a_d) * prev.last_derivative;

        // 2. Cutoff grows with speed
        let cutoff = self.min_cutoff + self.beta * edx.abs();
        let a = Self::alpha(cutoff, dt);

        // 3. Blend
        let filtered = a * value + (1.0 - a) * prev.last_filtered;

        self.state = Some(SmoothingState {
            last_raw: value,
            last_filtered: filtered,
            last_derivative: edx,
            last_timestamp: timestamp,
        });

        filtered
    }

    /// Forget all history; the next sample passes through unchanged
    pub fn reset(&mut self) {
        self.state = None;
    }

    pub fn is_initialized(&self) -> bool {
        self.state.is_some()
    }

    pub fn state(&self) -> Option<&SmoothingState> {
        self.state.as_ref()
    }

    pub fn min_cutoff(&self) -> f64 {
        self.min_cutoff
    }

    pub fn beta(&self) -> f64 {
        self.beta
    }

    pub fn d_cutoff(&self) -> f64 {
        self.d_cutoff
    }

    /// Must be positive; smaller values are raised to a tiny positive floor
    pub fn set_min_cutoff(&mut self, min_cutoff: f64) {
        self.min_cutoff = min_cutoff.max(MIN_CUTOFF_FLOOR);
    }

    /// Negative values are treated as zero
    pub fn set_beta(&mut self, beta: f64) {
        self.beta = beta.max(0.0);
    }

    pub fn set_d_cutoff(&mut self, d_cutoff: f64) {
        self.d_cutoff = d_cutoff.max(MIN_CUTOFF_FLOOR);
    }
}

impl Default for CoordinateSmoother {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_CUTOFF, DEFAULT_BETA, DEFAULT_D_CUTOFF)
    }
}
