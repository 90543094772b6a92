// src/config.rs
use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::drivers::StreamError;
use crate::types::SensorGroup;

/// Upper bound on `window_seconds / nominal_period`; each series keeps this many points at most.
pub const MAX_WINDOW_SAMPLES: usize = 1_000_000;

/// Proportional y-axis padding with a lower bound.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct AxisScale {
    pub margin_fraction: f64,
    /// Keeps a flat signal from collapsing to a zero-height axis.
    pub floor_margin: f64,
}

impl AxisScale {
    pub const ACCEL: AxisScale = AxisScale {
        margin_fraction: 0.1,
        floor_margin: 0.5,
    };
    pub const GYRO: AxisScale = AxisScale {
        margin_fraction: 0.1,
        floor_margin: 10.0,
    };

    pub fn margin(&self, min: f64, max: f64) -> f64 {
        ((max - min) * self.margin_fraction).max(self.floor_margin)
    }
}

/// Where raw notification buffers come from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportKind {
    /// Built-in synthetic peripheral.
    Simulated,
    /// Raw little-endian records piped on stdin by an external BLE bridge.
    Stdin,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StreamConfig {
    /// Seconds between consecutive samples.
    pub nominal_period: f64,
    pub window_seconds: f64,
    pub render_interval_ms: u64,
    pub recorder_interval_ms: u64,
    pub accel: AxisScale,
    pub gyro: AxisScale,
    pub max_runtime_secs: u64,
    pub transport: TransportKind,
    pub samples_per_packet: usize,
    pub publisher_addr: Option<String>,
    pub csv_path: Option<String>,
    pub plot_path: Option<String>,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            nominal_period: 0.01,
            window_seconds: 5.0,
            render_interval_ms: 200,
            recorder_interval_ms: 500,
            accel: AxisScale::ACCEL,
            gyro: AxisScale::GYRO,
            max_runtime_secs: 600,
            transport: TransportKind::Simulated,
            samples_per_packet: 4,
            publisher_addr: Some("127.0.0.1:8765".to_owned()),
            csv_path: Some("out.csv".to_owned()),
            plot_path: Some("live_plot.png".to_owned()),
        }
    }
}

impl StreamConfig {
    /// Reads a JSON config. Missing fields fall back to their defaults.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, StreamError> {
        let text = fs::read_to_string(path)?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self, StreamError> {
        let config: StreamConfig = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), StreamError> {
        if !(self.nominal_period > 0.0) {
            return Err(StreamError::InvalidConfig(format!(
                "nominal_period must be positive, got {}",
                self.nominal_period
            )));
        }
        if self.window_seconds < self.nominal_period {
            return Err(StreamError::InvalidConfig(format!(
                "window_seconds ({}) must cover at least one sample period ({})",
                self.window_seconds, self.nominal_period
            )));
        }
        let samples = self.window_seconds / self.nominal_period;
        if !(samples <= MAX_WINDOW_SAMPLES as f64) {
            return Err(StreamError::InvalidConfig(format!(
                "window of {} s at {} s per sample exceeds {MAX_WINDOW_SAMPLES} samples",
                self.window_seconds, self.nominal_period
            )));
        }
        if self.render_interval_ms == 0 || self.recorder_interval_ms == 0 {
            return Err(StreamError::InvalidConfig(
                "tick intervals must be non-zero".into(),
            ));
        }
        if self.samples_per_packet == 0 {
            return Err(StreamError::InvalidConfig(
                "samples_per_packet must be non-zero".into(),
            ));
        }
        for (group, scale) in [(SensorGroup::Accel, self.accel), (SensorGroup::Gyro, self.gyro)] {
            if scale.margin_fraction < 0.0 || scale.floor_margin < 0.0 {
                return Err(StreamError::InvalidConfig(format!(
                    "{group} axis margins must not be negative"
                )));
            }
        }
        Ok(())
    }

    /// Rolling window length in samples, `floor(window_seconds / nominal_period)`,
    /// clamped to `1..=MAX_WINDOW_SAMPLES`.
    pub fn window_capacity(&self) -> usize {
        // Absorb representation error, e.g. 5.0 / 0.01.
        let samples = ((self.window_seconds / self.nominal_period) + 1e-9).floor();
        samples.clamp(1.0, MAX_WINDOW_SAMPLES as f64) as usize
    }

    pub fn render_interval(&self) -> Duration {
        Duration::from_millis(self.render_interval_ms)
    }

    pub fn recorder_interval(&self) -> Duration {
        Duration::from_millis(self.recorder_interval_ms)
    }

    pub fn max_runtime(&self) -> Duration {
        Duration::from_secs(self.max_runtime_secs)
    }

    pub fn axis_scale(&self, group: SensorGroup) -> AxisScale {
        match group {
            SensorGroup::Accel => self.accel,
            SensorGroup::Gyro => self.gyro,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn defaults_are_valid() {
        let config = StreamConfig::default();
        config.validate().unwrap();
        assert_eq!(config.window_capacity(), 500);
    }
    #[test]
    fn partial_json_keeps_defaults() {
        let config =
            StreamConfig::from_json(r#"{"nominal_period": 0.02, "csv_path": null}"#).unwrap();
        assert_eq!(config.nominal_period, 0.02);
        assert_eq!(config.window_capacity(), 250);
        assert_eq!(config.csv_path, None);
        assert_eq!(config.gyro, AxisScale::GYRO);
        assert_eq!(config.transport, TransportKind::Simulated);
    }
    #[test]
    fn transport_parses_snake_case() {
        let config = StreamConfig::from_json(r#"{"transport": "stdin"}"#).unwrap();
        assert_eq!(config.transport, TransportKind::Stdin);
    }
    #[test]
    fn rejects_window_shorter_than_period() {
        let err = StreamConfig::from_json(r#"{"window_seconds": 0.001}"#).unwrap_err();
        assert!(matches!(err, StreamError::InvalidConfig(_)));
    }
    #[test]
    fn rejects_non_positive_period() {
        let config = StreamConfig {
            nominal_period: 0.0,
            ..StreamConfig::default()
        };
        assert!(config.validate().is_err());
    }
    #[test]
    fn rejects_window_too_long_for_the_period() {
        let config = StreamConfig {
            nominal_period: 1e-9,
            ..StreamConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(StreamError::InvalidConfig(_))
        ));
        assert_eq!(config.window_capacity(), MAX_WINDOW_SAMPLES);
    }
    #[test]
    fn floor_margin_applies_to_flat_signal() {
        assert_eq!(AxisScale::ACCEL.margin(1.0, 1.0), 0.5);
        assert!((AxisScale::GYRO.margin(-500.0, 500.0) - 100.0).abs() < 1e-9);
    }
}
