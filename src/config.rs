/*
 * @file config.rs
 * @brief Runtime configuration loading and validation
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

//! Runtime configuration.
//!
//! # Details
//! Settings come from a JSON file with every field optional, then a few
//! environment variables override individual values. Without any file the
//! daemon runs with the stock wiring: LEDs on BCM 17, 18 and 27, a 200 ms
//! animation tick, and `sudo reboot` / `sudo shutdown`.

use std::env;
use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::Deserialize;
use tracing::warn;

use crate::error::{Error, Result};

/// Config file picked up from the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_PATH: &str = "config.json";

/// Comma-separated BCM pin list overriding `pins`.
pub const ENV_PINS: &str = "ASSISTANT_LIGHTS_PINS";

/// Tick period in milliseconds overriding `tick_interval_ms`.
pub const ENV_TICK_MS: &str = "ASSISTANT_LIGHTS_TICK_MS";

/// Whitespace-separated bridge command overriding `bridge_command`.
pub const ENV_BRIDGE: &str = "ASSISTANT_LIGHTS_BRIDGE";

/// Strongly typed representation of the config file.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// BCM numbers of the LED pins, in animation order.
    #[serde(default = "default_pins")]
    pub pins: Vec<u8>,
    /// Delay between two animation frames.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
    /// Program and arguments run for the reboot phrase.
    #[serde(default = "default_reboot_command")]
    pub reboot_command: Vec<String>,
    /// Program and arguments run for the shutdown phrases.
    #[serde(default = "default_shutdown_command")]
    pub shutdown_command: Vec<String>,
    /// Program and arguments of the assistant bridge process.
    #[serde(default = "default_bridge_command")]
    pub bridge_command: Vec<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            pins: default_pins(),
            tick_interval_ms: default_tick_interval_ms(),
            reboot_command: default_reboot_command(),
            shutdown_command: default_shutdown_command(),
            bridge_command: default_bridge_command(),
        }
    }
}

impl AppConfig {
    /// Resolves the effective configuration.
    ///
    /// # Details
    /// An explicit `path` must load cleanly. Without one, `config.json` in
    /// the working directory is used when present; if it cannot be read or
    /// parsed the defaults apply and a warning is logged. Environment
    /// overrides are applied last and the result is validated.
    ///
    /// # Errors
    /// Fails when an explicit file is unusable, an override is malformed,
    /// or the final configuration is invalid.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::from_default_file(),
        };
        config.apply_overrides(|key| env::var(key).ok())?;
        config.validate()?;
        Ok(config)
    }

    /// Reads and parses a config file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path).map_err(|source| Error::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&raw).map_err(|source| Error::ConfigParse {
            path: path.to_path_buf(),
            source,
        })
    }

    fn from_default_file() -> Self {
        let path = Path::new(DEFAULT_CONFIG_PATH);
        if !path.exists() {
            return Self::default();
        }
        Self::from_file(path).unwrap_or_else(|err| {
            warn!(error = %err, "using default configuration");
            Self::default()
        })
    }

    /// Applies environment-style overrides read through `lookup`.
    ///
    /// # Errors
    /// Returns [`Error::InvalidConfig`] when a value cannot be parsed.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup(ENV_PINS) {
            self.pins = parse_pin_list(&raw)?;
        }
        if let Some(raw) = lookup(ENV_TICK_MS) {
            self.tick_interval_ms = raw.trim().parse().map_err(|_| {
                Error::InvalidConfig(format!("{ENV_TICK_MS} is not a number: {raw:?}"))
            })?;
        }
        if let Some(raw) = lookup(ENV_BRIDGE) {
            self.bridge_command = raw.split_whitespace().map(str::to_string).collect();
        }
        Ok(())
    }

    /// Checks constraints serde cannot express.
    ///
    /// # Errors
    /// Returns [`Error::InvalidConfig`] naming the first violated rule.
    pub fn validate(&self) -> Result<()> {
        if self.pins.is_empty() {
            return Err(Error::InvalidConfig("pins must not be empty".to_string()));
        }
        for (index, pin) in self.pins.iter().enumerate() {
            if self.pins[..index].contains(pin) {
                return Err(Error::InvalidConfig(format!("pin {pin} is listed twice")));
            }
        }
        if self.tick_interval_ms == 0 {
            return Err(Error::InvalidConfig(
                "tick_interval_ms must be positive".to_string(),
            ));
        }
        for (name, argv) in [
            ("reboot_command", &self.reboot_command),
            ("shutdown_command", &self.shutdown_command),
            ("bridge_command", &self.bridge_command),
        ] {
            if argv.first().is_none_or(|program| program.is_empty()) {
                return Err(Error::InvalidConfig(format!("{name} must name a program")));
            }
        }
        Ok(())
    }

    /// Tick period as a [`Duration`].
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}

fn parse_pin_list(raw: &str) -> Result<Vec<u8>> {
    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            part.parse().map_err(|_| {
                Error::InvalidConfig(format!("{ENV_PINS} has an invalid pin: {part:?}"))
            })
        })
        .collect()
}

fn default_pins() -> Vec<u8> {
    vec![17, 18, 27]
}

fn default_tick_interval_ms() -> u64 {
    200
}

fn default_reboot_command() -> Vec<String> {
    vec!["/usr/bin/sudo".to_string(), "reboot".to_string()]
}

fn default_shutdown_command() -> Vec<String> {
    vec!["/usr/bin/sudo".to_string(), "shutdown".to_string()]
}

fn default_bridge_command() -> Vec<String> {
    vec!["assistant-bridge".to_string()]
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_match_stock_wiring() {
        let config = AppConfig::default();
        assert_eq!(config.pins, vec![17, 18, 27]);
        assert_eq!(config.tick_interval(), Duration::from_millis(200));
        assert_eq!(config.reboot_command, vec!["/usr/bin/sudo", "reboot"]);
        assert_eq!(config.shutdown_command, vec!["/usr/bin/sudo", "shutdown"]);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"pins": [5, 6], "tick_interval_ms": 50}}"#).unwrap();
        let config = AppConfig::from_file(file.path()).unwrap();
        assert_eq!(config.pins, vec![5, 6]);
        assert_eq!(config.tick_interval_ms, 50);
        assert_eq!(config.bridge_command, default_bridge_command());
    }

    #[test]
    fn explicit_file_errors_are_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.json");
        assert!(matches!(
            AppConfig::load(Some(&missing)),
            Err(Error::ConfigRead { .. })
        ));

        let mut file = NamedTempFile::new().unwrap();
        write!(file, r#"{{"pinz": [1]}}"#).unwrap();
        assert!(matches!(
            AppConfig::from_file(file.path()),
            Err(Error::ConfigParse { .. })
        ));
    }

    #[test]
    fn overrides_replace_values() {
        let mut config = AppConfig::default();
        config
            .apply_overrides(lookup_from(&[
                (ENV_PINS, "22, 23 ,24"),
                (ENV_TICK_MS, "100"),
                (ENV_BRIDGE, "python3 bridge.py --verbose"),
            ]))
            .unwrap();
        assert_eq!(config.pins, vec![22, 23, 24]);
        assert_eq!(config.tick_interval_ms, 100);
        assert_eq!(config.bridge_command, vec!["python3", "bridge.py", "--verbose"]);
    }

    #[test]
    fn malformed_overrides_are_rejected() {
        let mut config = AppConfig::default();
        assert!(config.apply_overrides(lookup_from(&[(ENV_PINS, "17,x")])).is_err());
        assert!(config.apply_overrides(lookup_from(&[(ENV_TICK_MS, "soon")])).is_err());
    }

    #[test]
    fn validation_catches_bad_values() {
        let duplicate = AppConfig {
            pins: vec![17, 18, 17],
            ..AppConfig::default()
        };
        assert!(duplicate.validate().is_err());

        let empty = AppConfig {
            pins: Vec::new(),
            ..AppConfig::default()
        };
        assert!(empty.validate().is_err());

        let zero_tick = AppConfig {
            tick_interval_ms: 0,
            ..AppConfig::default()
        };
        assert!(zero_tick.validate().is_err());

        let no_bridge = AppConfig {
            bridge_command: vec![String::new()],
            ..AppConfig::default()
        };
        assert!(no_bridge.validate().is_err());
    }
}
