/*
 * @file app.rs
 * @brief Daemon startup and task wiring
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

//! Daemon wiring: configuration, hardware, assistant session, and tasks.

use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::info;

use crate::commands::SystemCommandRunner;
use crate::config::AppConfig;
use crate::credentials::{Credentials, default_credentials_path};
use crate::dispatcher::Dispatcher;
use crate::gpio;
use crate::lights::{self, IntervalTicker, Lights};
use crate::mode::ModeCell;
use crate::session::BridgeSession;

/// Startup options collected from the command line.
#[derive(Clone, Debug, Default)]
pub struct Options {
    /// OAuth2 credentials file; the oauthlib tool's default when absent.
    pub credentials: Option<PathBuf>,
    /// Explicit JSON config file.
    pub config: Option<PathBuf>,
    /// Device model registered for this board, forwarded to the bridge.
    pub device_model_id: Option<String>,
}

/// Runs the daemon until the assistant stream ends or something fails.
///
/// # Details
/// Startup order: configuration, credentials, GPIO, lights task, power
/// command runner, bridge. Any failure there aborts before events are read.
/// Afterwards the event loop and the lights task race: the first error from
/// either ends the daemon. Ctrl-C stops both cleanly.
///
/// # Errors
/// Returns the first startup, session, command, or pin failure.
pub async fn run_daemon(options: Options) -> Result<()> {
    let config =
        AppConfig::load(options.config.as_deref()).context("failed to load configuration")?;
    let credentials_path = options
        .credentials
        .unwrap_or_else(default_credentials_path);
    let credentials = Credentials::load(&credentials_path)?;
    info!(path = %credentials_path.display(), "credentials loaded");

    let pins = gpio::open_output_pins(&config.pins)?;
    let mode = ModeCell::new();
    let handle = lights::spawn(
        Lights::new(pins, mode.clone())?,
        IntervalTicker::new(config.tick_interval()),
    );
    let stop = handle.stop_signal();

    let runner = SystemCommandRunner::new(
        config.reboot_command.clone(),
        config.shutdown_command.clone(),
    )?;
    let mut session = BridgeSession::spawn(&config.bridge_command)?;
    session
        .start(&credentials, options.device_model_id.as_deref())
        .await
        .context("failed to start assistant session")?;
    info!(pid = ?session.id(), "listening for assistant events");

    let mut dispatcher = Dispatcher::new(mode, runner, std::io::stdout());
    let lights_done = handle.join();
    tokio::pin!(lights_done);

    tokio::select! {
        handled = dispatcher.run(&mut session) => {
            stop.stop();
            lights_done.await.context("lights task failed")?;
            handled.context("assistant session failed")?;
            Ok(())
        }
        finished = &mut lights_done => {
            finished.context("lights task failed")?;
            anyhow::bail!("lights task exited before the assistant session")
        }
        interrupted = tokio::signal::ctrl_c() => {
            interrupted.context("failed to listen for Ctrl-C")?;
            info!("interrupted, stopping");
            stop.stop();
            lights_done.await.context("lights task failed")?;
            Ok(())
        }
    }
}
