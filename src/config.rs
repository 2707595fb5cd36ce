/*
 * @file config.rs
 * @brief Runtime configuration loaded from config.json
 * @author Kevin Thomas
 * @date 2025
 *
 * MIT License
 *
 * Copyright (c) 2025 Kevin Thomas
 *
 * Permission is hereby granted, free of charge, to any person obtaining a copy
 * of this software and associated documentation files (the "Software"), to deal
 * in the Software without restriction, including without limitation the rights
 * to use, copy, modify, merge, publish, distribute, sublicense, and/or sell
 * copies of the Software, and to permit persons to whom the Software is
 * furnished to do so, subject to the following conditions:
 *
 * The above copyright notice and this permission notice shall be included in all
 * copies or substantial portions of the Software.
 *
 * THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND, EXPRESS OR
 * IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF MERCHANTABILITY,
 * FITNESS FOR A PARTICULAR PURPOSE AND NONINFRINGEMENT. IN NO EVENT SHALL THE
 * AUTHORS OR COPYRIGHT HOLDERS BE LIABLE FOR ANY CLAIM, DAMAGES OR OTHER
 * LIABILITY, WHETHER IN AN ACTION OF CONTRACT, TORT OR OTHERWISE, ARISING FROM,
 * OUT OF OR IN CONNECTION WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE
 * SOFTWARE.
 */

//! Runtime configuration loaded from `config.json`.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::buffer::{BufferRules, DigitSixMode, EmptyRemovePolicy};
use crate::controller::{ControllerOptions, RestartPolicy};
use crate::events::DEFAULT_EVENT_CAPACITY;
use crate::monitor::DEFAULT_PROBE_INTERVAL;

/// Default location of the configuration file.
pub const CONFIG_PATH: &str = "config.json";

/// Environment variable that overrides [`CONFIG_PATH`].
pub const CONFIG_ENV: &str = "VOCALC_CONFIG";

/// Strongly typed representation of `config.json`.
///
/// # Details
/// Every field is optional; anything missing falls back to the defaults
/// below.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    #[serde(default = "default_monitor_interval_ms")]
    pub monitor_interval_ms: u64,
    #[serde(default = "default_event_capacity")]
    pub event_capacity: usize,
    #[serde(default)]
    pub digit_six: DigitSixMode,
    #[serde(default)]
    pub empty_remove: EmptyRemovePolicy,
    #[serde(default)]
    pub restart: RestartPolicy,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            monitor_interval_ms: default_monitor_interval_ms(),
            event_capacity: default_event_capacity(),
            digit_six: DigitSixMode::default(),
            empty_remove: EmptyRemovePolicy::default(),
            restart: RestartPolicy::default(),
        }
    }
}

impl AppConfig {
    pub fn monitor_interval(&self) -> Duration {
        Duration::from_millis(self.monitor_interval_ms)
    }

    /// Controller settings derived from this configuration.
    pub fn controller_options(&self) -> ControllerOptions {
        ControllerOptions {
            rules: BufferRules {
                digit_six: self.digit_six,
                empty_remove: self.empty_remove,
            },
            restart: self.restart,
        }
    }
}

/// Resolves which configuration file to read.
///
/// # Arguments
/// * `explicit` - A path given on the command line, if any.
///
/// # Returns
/// The explicit path, else `$VOCALC_CONFIG`, else [`CONFIG_PATH`].
pub fn config_path(explicit: Option<&Path>) -> PathBuf {
    explicit
        .map(Path::to_path_buf)
        .or_else(|| env::var_os(CONFIG_ENV).map(PathBuf::from))
        .unwrap_or_else(|| PathBuf::from(CONFIG_PATH))
}

/// Reads and parses a configuration file.
///
/// # Errors
/// Returns an error if the file cannot be read or is not valid configuration.
pub fn load_config_from_file(path: &Path) -> Result<AppConfig> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&raw).with_context(|| format!("Failed to parse {}", path.display()))
}

/// Loads configuration, falling back to defaults when the file is missing
/// or invalid.
///
/// # Details
/// A missing file is expected and only logged at debug level; a file that
/// exists but cannot be parsed is reported as a warning.
pub fn load_config(path: &Path) -> AppConfig {
    if !path.exists() {
        log::debug!("No configuration at {}, using defaults", path.display());
        return AppConfig::default();
    }
    load_config_from_file(path).unwrap_or_else(|err| {
        log::warn!("Config load error: {:#}. Using defaults.", err);
        AppConfig::default()
    })
}

fn default_monitor_interval_ms() -> u64 {
    DEFAULT_PROBE_INTERVAL.as_millis() as u64
}

fn default_event_capacity() -> usize {
    DEFAULT_EVENT_CAPACITY
}
