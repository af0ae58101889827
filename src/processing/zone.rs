//! Control zone remapping
//!
//! Maps a sub-rectangle of the camera image onto the whole primary display,
//! with a sensitivity warp about the zone center.

use serde::{Deserialize, Serialize};

pub const MIN_SENSITIVITY: f64 = 0.1;
pub const MAX_SENSITIVITY: f64 = 5.0;
pub const DEFAULT_SENSITIVITY: f64 = 1.5;

/// Camera-space rectangle (normalized) that drives the pointer
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ControlZone {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
}

impl ControlZone {
    pub fn new(x_min: f64, x_max: f64, y_min: f64, y_max: f64) -> Self {
        Self {
            x_min,
            x_max,
            y_min,
            y_max,
        }
    }

    pub fn width(&self) -> f64 {
        self.x_max - self.x_min
    }

    pub fn height(&self) -> f64 {
        self.y_max - self.y_min
    }

    pub fn contains(&self, x: f64, y: f64) -> bool {
        self.x_min <= x && x <= self.x_max && self.y_min <= y && y <= self.y_max
    }
}

impl Default for ControlZone {
    fn default() -> Self {
        Self::new(0.15, 0.85, 0.15, 0.85)
    }
}

/// Pixel rectangle of the primary display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScreenRect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl ScreenRect {
    pub fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }
}

impl Default for ScreenRect {
    fn default() -> Self {
        Self::new(0, 0, 1920, 1080)
    }
}

#[derive(Debug, Clone)]
pub struct ZoneMapper {
    zone: ControlZone,
    sensitivity: f64,
    screen: ScreenRect,
}

impl ZoneMapper {
    pub fn new(zone: ControlZone, sensitivity: f64, screen: ScreenRect) -> Self {
        let mut mapper = Self {
            zone,
            sensitivity: DEFAULT_SENSITIVITY,
            screen,
        };
        mapper.set_sensitivity(sensitivity);
        mapper
    }

    /// Rescale a camera point from the zone to `[0, 1]²`, then warp about the center.
    ///
    /// Sensitivity above 1 lets small hand motion cover more of the screen.
    pub fn normalize_to_zone(&self, x: f64, y: f64) -> (f64, f64) {
        let nx = rescale(x, self.zone.x_min, self.zone.width());
        let ny = rescale(y, self.zone.y_min, self.zone.height());

        (self.warp(nx), self.warp(ny))
    }

    /// Boundary test against the unwarped zone
    pub fn is_in_control_zone(&self, x: f64, y: f64) -> bool {
        self.zone.contains(x, y)
    }

    /// Camera point to display pixel. The camera image is mirrored, so x is flipped.
    pub fn camera_to_screen(&self, x: f64, y: f64) -> (i32, i32) {
        let (nx, ny) = self.normalize_to_zone(x, y);
        let nx = 1.0 - nx;

        let screen = self.screen;
        (
            to_pixel(nx, screen.x, screen.width),
            to_pixel(ny, screen.y, screen.height),
        )
    }

    fn warp(&self, v: f64) -> f64 {
        (0.5 + (v - 0.5) * self.sensitivity).clamp(0.0, 1.0)
    }

    pub fn zone(&self) -> ControlZone {
        self.zone
    }

    pub fn set_zone(&mut self, zone: ControlZone) {
        self.zone = zone;
    }

    pub fn sensitivity(&self) -> f64 {
        self.sensitivity
    }

    /// Clamped to `[0.1, 5.0]`
    pub fn set_sensitivity(&mut self, sensitivity: f64) {
        self.sensitivity = sensitivity.clamp(MIN_SENSITIVITY, MAX_SENSITIVITY);
    }

    pub fn screen(&self) -> ScreenRect {
        self.screen
    }

    pub fn set_screen(&mut self, screen: ScreenRect) {
        self.screen = screen;
    }
}

impl Default for ZoneMapper {
    fn default() -> Self {
        Self::new(ControlZone::default(), DEFAULT_SENSITIVITY, ScreenRect::default())
    }
}

/// Widened to i64 so extreme display rects cannot overflow
fn to_pixel(n: f64, origin: i32, extent: u32) -> i32 {
    let min = i64::from(origin);
    let max = min + i64::from(extent.max(1)) - 1;
    let p = (min as f64 + n * f64::from(extent)).floor() as i64;
    p.clamp(min, max).min(i64::from(i32::MAX)) as i32
}

fn rescale(v: f64, min: f64, span: f64) -> f64 {
    if span <= 0.0 {
        return 0.5;
    }
    (v - min) / span
}
