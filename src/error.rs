/*
 * @file error.rs
 * @brief Library error types
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

//! Error taxonomy shared by the library modules.
//!
//! Every failure here is fatal to the daemon: callers propagate with `?`
//! and the binary exits. Nothing is retried.

use std::path::PathBuf;

use thiserror::Error;

/// Convenience alias used throughout the library.
pub type Result<T> = std::result::Result<T, Error>;

/// All failures the library can surface.
#[derive(Debug, Error)]
pub enum Error {
    /// The OAuth2 credentials file does not exist.
    #[error("credentials file {} does not exist", path.display())]
    CredentialsMissing { path: PathBuf },

    /// The credentials file exists but could not be read.
    #[error("failed to read credentials file {}", path.display())]
    CredentialsRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The credentials file is not a valid OAuth2 credentials object.
    #[error("malformed credentials file {}", path.display())]
    CredentialsParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The runtime configuration file could not be read.
    #[error("failed to read config file {}", path.display())]
    ConfigRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The runtime configuration file is not valid JSON for [`crate::config::AppConfig`].
    #[error("malformed config file {}", path.display())]
    ConfigParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// The configuration parsed but violates a constraint.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The GPIO peripheral is not accessible on this host.
    #[error("GPIO peripheral unavailable")]
    GpioUnavailable(#[source] rppal::gpio::Error),

    /// A GPIO line could not be acquired or configured.
    #[error("failed to set up GPIO {pin} as output")]
    Gpio {
        pin: u8,
        #[source]
        source: rppal::gpio::Error,
    },

    /// Writing a level to an output pin failed.
    #[error("failed to drive output pin #{index}: {kind:?}")]
    PinWrite {
        index: usize,
        kind: embedded_hal::digital::ErrorKind,
    },

    /// The lights task panicked or was aborted.
    #[error("lights task failed")]
    LightsTask(#[from] tokio::task::JoinError),

    /// The external bridge process could not be started.
    #[error("failed to start assistant bridge `{program}`")]
    BridgeSpawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// Reading from or writing to the assistant session failed.
    #[error("assistant session I/O failed")]
    SessionIo(#[from] std::io::Error),

    /// An inbound line from the assistant session is not a valid event.
    #[error("malformed event line {line:?}")]
    MalformedEvent {
        line: String,
        #[source]
        source: serde_json::Error,
    },

    /// Writing the human-readable event log failed.
    #[error("failed to write event log")]
    EventLog(#[source] std::io::Error),

    /// A power command could not be spawned.
    #[error("failed to run `{program}`")]
    CommandSpawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
}
