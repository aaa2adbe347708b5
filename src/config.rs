//! # Configuration Management
//!
//! This module handles loading and parsing configuration from the uti-config.toml file.
//! It covers the UTI frame layout, the GPIO line the UTI output is wired to, and
//! where measurement results are reported.

use crate::error::DecodeError;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Default configuration file name, relative to the working directory
pub const CONFIG_FILE: &str = "uti-config.toml";

/// Application configuration loaded from uti-config.toml
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct Config {
    /// UTI frame and decoder settings
    pub uti: UtiConfig,
    /// GPIO line the UTI output is connected to
    pub gpio: GpioConfig,
    /// Measurement interval and output files
    pub report: ReportConfig,
}

/// Decoder settings describing the UTI pulse stream
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct UtiConfig {
    /// Durations captured per measurement session (N)
    pub capacity: usize,
    /// Durations per UTI cycle (L); 4 for the three-signal PT100 mode
    pub cycle_length: usize,
    /// On-board reference resistor in ohms (Rref)
    pub reference_resistance: f64,
    /// Samples scanned for the start of frame, defaults to two cycles
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_window: Option<usize>,
}

/// Raspberry Pi GPIO character-device settings
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct GpioConfig {
    /// GPIO character device (e.g., "/dev/gpiochip0")
    pub chip: String,
    /// Line offset on the chip (BCM numbering)
    pub line: u32,
    /// Give up on a session when no edge arrives for this long
    pub edge_timeout_ms: u64,
}

/// Reporting configuration
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct ReportConfig {
    /// Seconds between measurement sessions
    pub interval_secs: u64,
    /// Single-line temperature file read by the web front end
    pub temperature_file: PathBuf,
    /// Full JSON record of the last successful reading
    pub reading_file: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            uti: UtiConfig::default(),
            gpio: GpioConfig {
                chip: "/dev/gpiochip0".to_string(),
                line: 23, // wiringPi pin 4
                edge_timeout_ms: 500,
            },
            report: ReportConfig {
                interval_secs: 10,
                temperature_file: PathBuf::from("temperature.txt"),
                reading_file: PathBuf::from("/tmp/uti_reading.json"),
            },
        }
    }
}

impl Default for UtiConfig {
    fn default() -> Self {
        UtiConfig {
            capacity: 64,
            cycle_length: 4,
            reference_resistance: 100.0,
            search_window: None,
        }
    }
}

impl UtiConfig {
    /// Samples scanned by the cycle locator
    pub fn search_window(&self) -> usize {
        self.search_window.unwrap_or(2 * self.cycle_length)
    }

    /// Check that a session with these settings can decode at all
    pub fn validate(&self) -> Result<(), DecodeError> {
        if self.cycle_length < 4 {
            return Err(DecodeError::InvalidConfig(format!(
                "cycle_length must be at least 4, got {}",
                self.cycle_length
            )));
        }
        if self.capacity == 0 {
            return Err(DecodeError::InvalidConfig(
                "capacity must be greater than 0".to_string(),
            ));
        }
        if !(self.reference_resistance.is_finite() && self.reference_resistance > 0.0) {
            return Err(DecodeError::InvalidConfig(format!(
                "reference_resistance must be positive, got {}",
                self.reference_resistance
            )));
        }
        if self.search_window() == 0 {
            return Err(DecodeError::InvalidConfig(
                "search_window must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }
}

impl Config {
    /// Load configuration from uti-config.toml file
    /// Falls back to default configuration if file doesn't exist or is invalid
    pub fn load() -> Self {
        Self::load_from_path(CONFIG_FILE)
    }

    /// Load configuration from specified path
    /// Falls back to default configuration if file doesn't exist or is invalid
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(contents) => match toml::from_str::<Config>(&contents) {
                Ok(config) => {
                    info!(
                        "Loaded configuration: N={}, L={}, Rref={} Ω",
                        config.uti.capacity, config.uti.cycle_length, config.uti.reference_resistance
                    );
                    config
                }
                Err(e) => {
                    warn!("Invalid config file format in {}: {}", path.display(), e);
                    warn!("Using default configuration");
                    Self::default()
                }
            },
            Err(_) => {
                info!("No config file at {}, using default configuration", path.display());
                Self::default()
            }
        }
    }

    /// Save current configuration to the given path
    pub fn save_to_path<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        let contents = toml::to_string_pretty(self)?;
        fs::write(path.as_ref(), contents)?;
        info!("Configuration saved to {}", path.as_ref().display());
        Ok(())
    }

    /// Save current configuration to uti-config.toml
    pub fn save(&self) -> anyhow::Result<()> {
        self.save_to_path(CONFIG_FILE)
    }
}
