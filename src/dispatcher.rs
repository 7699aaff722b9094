/*
 * @file dispatcher.rs
 * @brief Assistant event dispatcher
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

//! Maps assistant events to LED modes and power commands.
//!
//! # Details
//! Each event is handled to completion before the next one is read, so a
//! power command has been started and the turn stop requested by the time
//! the dispatcher asks the session for more events.

use std::io::Write;

use tracing::{debug, info};

use crate::commands::{CommandRunner, find_power_command};
use crate::error::{Error, Result};
use crate::events::{Event, EventType};
use crate::mode::{Mode, ModeCell};
use crate::session::Session;

/// Event handler that owns the write side of the shared mode.
pub struct Dispatcher<C, W> {
    mode: ModeCell,
    runner: C,
    log: W,
}

impl<C, W> Dispatcher<C, W>
where
    C: CommandRunner,
    W: Write + Send,
{
    /// Creates a dispatcher.
    ///
    /// # Arguments
    /// * `mode` - Shared mode, also held by the lights task.
    /// * `runner` - Executes reboot and shutdown.
    /// * `log` - Sink for the human-readable event log.
    pub fn new(mode: ModeCell, runner: C, log: W) -> Self {
        Self { mode, runner, log }
    }

    /// Current mode as last written by either side.
    pub fn mode(&self) -> Mode {
        self.mode.get()
    }

    /// Applies the side effects of a single event.
    ///
    /// # Details
    /// * `ON_START_FINISHED` - blink.
    /// * `ON_CONVERSATION_TURN_STARTED` - running lights, blank log line first.
    /// * `ON_RECOGNIZING_SPEECH_FINISHED` with a power phrase - shutting down,
    ///   run the command, then stop the current turn.
    /// * `ON_CONVERSATION_TURN_FINISHED` with arguments and no follow-on
    ///   turn - idle, blank log line after the event.
    ///
    /// Every event is written to the log.
    ///
    /// # Errors
    /// Propagates command, session, and log failures untouched.
    pub async fn handle<S>(&mut self, event: &Event, session: &mut S) -> Result<()>
    where
        S: Session + ?Sized,
    {
        match event.event_type {
            EventType::StartFinished => self.set_mode(Mode::Blink),
            EventType::ConversationTurnStarted => {
                self.blank_line()?;
                self.set_mode(Mode::RunningLights);
            }
            EventType::RecognizingSpeechFinished => {
                if let Some(command) = event.text().and_then(find_power_command) {
                    info!(?command, "power phrase recognized");
                    self.set_mode(Mode::ShuttingDown);
                    self.runner.run(command).await?;
                    session.stop_conversation().await?;
                }
            }
            _ => {}
        }

        writeln!(self.log, "{event}").map_err(Error::EventLog)?;

        if event.event_type == EventType::ConversationTurnFinished
            && event.has_args()
            && !event.with_follow_on_turn()
        {
            self.blank_line()?;
            self.set_mode(Mode::Idle);
        }
        self.log.flush().map_err(Error::EventLog)
    }

    /// Handles events until the session ends.
    ///
    /// # Returns
    /// * `usize` - Number of events handled.
    ///
    /// # Errors
    /// Stops at the first failure from the session or [`Dispatcher::handle`].
    pub async fn run<S>(&mut self, session: &mut S) -> Result<usize>
    where
        S: Session + ?Sized,
    {
        let mut handled = 0;
        while let Some(event) = session.next_event().await? {
            self.handle(&event, session).await?;
            handled += 1;
        }
        info!(handled, "assistant event stream ended");
        Ok(handled)
    }

    fn set_mode(&self, mode: Mode) {
        debug!(%mode, "dispatcher set mode");
        self.mode.set(mode);
    }

    fn blank_line(&mut self) -> Result<()> {
        writeln!(self.log).map_err(Error::EventLog)
    }
}
