//! System sensor utilities for reading CPU and GPU temperatures.
//!
//! This module provides a wrapper around `sysinfo` for detecting and reading
//! the temperature sensors a speed profile can follow.

use sysinfo::Components;

use crate::cooling::TempSource;

const CPU_PATTERNS: [&str; 5] = ["cpu", "package", "core", "tdie", "computer"];
const GPU_PATTERNS: [&str; 4] = ["gpu", "nvidia", "amd", "edge"];

// =============================================================================
// Sensor Info
// =============================================================================

/// Information about a detected sensor.
#[derive(Debug, Clone)]
pub struct SensorInfo {
    /// Sensor label/name.
    pub label: String,
    /// Current temperature in Celsius.
    pub temperature: Option<f32>,
    /// Critical temperature threshold (if available).
    pub critical: Option<f32>,
}

// =============================================================================
// System Sensors
// =============================================================================

/// Wrapper for system sensor access with caching.
pub struct SystemSensors {
    components: Components,
}

impl SystemSensors {
    /// Create a new SystemSensors instance with refreshed sensor list.
    pub fn new() -> Self {
        Self {
            components: Components::new_with_refreshed_list(),
        }
    }

    /// Refresh all sensor values.
    pub fn refresh(&mut self) {
        self.components.refresh(true);
    }

    /// Get the total number of detected sensors.
    pub fn count(&self) -> usize {
        self.components.len()
    }

    /// Temperature of the first sensor matching `source`.
    pub fn temperature(&self, source: TempSource) -> Option<f32> {
        self.find(source).and_then(|s| s.temperature)
    }

    /// First sensor whose label matches `source`.
    pub fn find(&self, source: TempSource) -> Option<SensorInfo> {
        let patterns: &[&str] = match source {
            TempSource::Cpu => &CPU_PATTERNS,
            TempSource::Gpu => &GPU_PATTERNS,
        };
        self.list_all()
            .into_iter()
            .find(|s| label_matches(&s.label, patterns))
    }

    /// Get all detected sensors as a list of SensorInfo.
    pub fn list_all(&self) -> Vec<SensorInfo> {
        self.components
            .iter()
            .map(|c| SensorInfo {
                label: c.label().to_string(),
                temperature: c.temperature(),
                critical: c.critical(),
            })
            .collect()
    }
}

impl Default for SystemSensors {
    fn default() -> Self {
        Self::new()
    }
}

fn label_matches(label: &str, patterns: &[&str]) -> bool {
    let label = label.to_lowercase();
    patterns.iter().any(|p| label.contains(p))
}

/// Round a sensor reading to a whole-degree profile temperature.
pub fn to_profile_temp(celsius: f32) -> i32 {
    celsius.round() as i32
}

// =============================================================================
// Tests
// =============================================================================
