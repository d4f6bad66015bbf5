//! Configuration for the waypoint updater
//!
//! Values can come from a TOML file or from flat numeric parameters
//! (the form ROS parameters arrive in).

use crate::error::ConfigError;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

/// Largest accepted `lookahead_wps`
pub const MAX_LOOKAHEAD_WPS: usize = 10_000;

/// Tunables of the trajectory window generator
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct UpdaterConfig {
    /// Number of route points in a cruise window
    pub lookahead_wps: usize,
    /// Deceleration limit used to decide whether a stop is still feasible (m/s^2)
    pub max_decel: f64,
    /// Margin kept before the stop point (m)
    pub stop_buffer: f64,
    /// Rate of the acceleration ramp (m/s^2)
    pub accel_rate: f64,
    /// Rate of the deceleration ramp (m/s^2)
    pub decel_rate: f64,
    /// Speed at or below which the vehicle counts as stopped (m/s)
    pub standstill_speed: f64,
    /// Cycle cadence (Hz)
    pub rate_hz: f64,
    /// Frame stamped on every published window
    pub frame_id: String,
}

impl Default for UpdaterConfig {
    fn default() -> Self {
        Self {
            lookahead_wps: 100,
            max_decel: 4.0,
            stop_buffer: 2.5,
            accel_rate: 1.0,
            decel_rate: 1.0,
            standstill_speed: 1e-4,
            rate_hz: 30.0,
            frame_id: "/world".to_string(),
        }
    }
}

impl UpdaterConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: UpdaterConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml_str(&contents)
    }

    /// Apply numeric overrides by parameter name; unknown names are ignored
    pub fn configure(&mut self, params: &HashMap<String, f64>) -> Result<(), ConfigError> {
        if let Some(&lookahead) = params.get("lookahead_wps") {
            if !(1.0..=MAX_LOOKAHEAD_WPS as f64).contains(&lookahead) {
                return Err(invalid("lookahead_wps", "must be between 1 and 10000"));
            }
            self.lookahead_wps = lookahead as usize;
        }
        if let Some(&max_decel) = params.get("max_decel") {
            self.max_decel = max_decel;
        }
        if let Some(&stop_buffer) = params.get("stop_buffer") {
            self.stop_buffer = stop_buffer;
        }
        if let Some(&accel_rate) = params.get("accel_rate") {
            self.accel_rate = accel_rate;
        }
        if let Some(&decel_rate) = params.get("decel_rate") {
            self.decel_rate = decel_rate;
        }
        if let Some(&standstill) = params.get("standstill_speed") {
            self.standstill_speed = standstill;
        }
        if let Some(&rate_hz) = params.get("rate_hz") {
            self.rate_hz = rate_hz;
        }
        self.validate()
    }

    /// Check every value is usable
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=MAX_LOOKAHEAD_WPS).contains(&self.lookahead_wps) {
            return Err(invalid("lookahead_wps", "must be between 1 and 10000"));
        }
        positive("max_decel", self.max_decel)?;
        positive("accel_rate", self.accel_rate)?;
        positive("decel_rate", self.decel_rate)?;
        positive("rate_hz", self.rate_hz)?;
        if period_for(self.rate_hz).is_none() {
            return Err(invalid("rate_hz", "cycle period must be a non-zero duration"));
        }
        if self.stop_buffer < 0.0 || self.stop_buffer.is_nan() {
            return Err(invalid("stop_buffer", "must be non-negative"));
        }
        if self.standstill_speed < 0.0 || self.standstill_speed.is_nan() {
            return Err(invalid("standstill_speed", "must be non-negative"));
        }
        Ok(())
    }

    /// Time between two cycles
    pub fn cycle_period(&self) -> Result<Duration, ConfigError> {
        period_for(self.rate_hz)
            .ok_or_else(|| invalid("rate_hz", "cycle period must be a non-zero duration"))
    }
}

fn period_for(rate_hz: f64) -> Option<Duration> {
    Duration::try_from_secs_f64(1.0 / rate_hz)
        .ok()
        .filter(|period| !period.is_zero())
}

fn positive(name: &'static str, value: f64) -> Result<(), ConfigError> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(invalid(name, "must be positive"))
    }
}

fn invalid(name: &'static str, reason: &str) -> ConfigError {
    ConfigError::Invalid {
        name,
        reason: reason.to_string(),
    }
}
