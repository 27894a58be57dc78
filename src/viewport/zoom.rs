//! Clamped zoom stepping.

use serde::Deserialize;

/// Zoom limits and step size.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ZoomConfig {
    pub min: f32,
    pub max: f32,
    pub step: f32,
}

impl Default for ZoomConfig {
    fn default() -> Self {
        Self {
            min: 0.1,
            max: 2.0,
            step: 0.1,
        }
    }
}

impl ZoomConfig {
    /// Finite positive bounds in order and a positive step. Bounds given
    /// the wrong way round are swapped; unusable values take the defaults.
    pub fn normalized(self) -> Self {
        let defaults = Self::default();
        let positive = |value: f32, fallback: f32| {
            if value.is_finite() && value > 0.0 { value } else { fallback }
        };
        let min = positive(self.min, defaults.min);
        let max = positive(self.max, defaults.max);
        let (min, max) = if min <= max { (min, max) } else { (max, min) };
        Self {
            min,
            max,
            step: positive(self.step.abs(), defaults.step),
        }
    }
}

/// Current zoom factor (1.0 = 100%).
#[derive(Debug, Clone, PartialEq)]
pub struct ZoomState {
    factor: f32,
    config: ZoomConfig,
}

impl ZoomState {
    /// Start at 100%, or the nearest bound when 100% is out of range.
    pub fn new(config: ZoomConfig) -> Self {
        let mut zoom = Self {
            factor: 1.0,
            config: config.normalized(),
        };
        zoom.set(1.0);
        zoom
    }

    #[inline]
    pub fn factor(&self) -> f32 {
        self.factor
    }

    /// Integer percentage, as shown next to the zoom buttons.
    pub fn percent(&self) -> u32 {
        (self.factor * 100.0).round() as u32
    }

    pub fn zoom_in(&mut self) -> f32 {
        self.set(self.factor + self.config.step)
    }

    pub fn zoom_out(&mut self) -> f32 {
        self.set(self.factor - self.config.step)
    }

    pub fn reset(&mut self) -> f32 {
        self.set(1.0)
    }

    /// Set an explicit factor, clamped to the configured range and rounded
    /// to two decimals so repeated stepping does not drift.
    pub fn set(&mut self, factor: f32) -> f32 {
        let factor = if factor.is_finite() { factor } else { 1.0 };
        let clamped = factor.clamp(self.config.min, self.config.max);
        self.factor = (clamped * 100.0).round() / 100.0;
        self.factor
    }
}

impl Default for ZoomState {
    fn default() -> Self {
        Self::new(ZoomConfig::default())
    }
}
