/*
 * @file session.rs
 * @brief Assistant bridge session protocol
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

//! Connection to the assistant.
//!
//! # Details
//! The assistant SDK runs in a separate bridge process. The daemon talks to
//! it over newline-delimited JSON: it writes commands to the bridge's stdin
//! and reads one [`Event`] per line from its stdout.
//!
//! Outbound commands:
//! - `{"command":"start","credentials":{...},"device_model_id":...}`
//! - `{"command":"stop_conversation"}`

use std::io;
use std::process::Stdio;

use async_trait::async_trait;
use serde_json::{Value, json};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader, Lines};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tracing::{debug, info};

use crate::credentials::Credentials;
use crate::error::{Error, Result};
use crate::events::Event;

/// Live assistant session as seen by the dispatcher.
#[async_trait]
pub trait Session: Send {
    /// Waits for the next event.
    ///
    /// # Returns
    /// * `Ok(Some(event))` - The next event in order.
    /// * `Ok(None)` - The assistant closed the stream.
    async fn next_event(&mut self) -> Result<Option<Event>>;

    /// Asks the assistant to end the current conversation turn early.
    async fn stop_conversation(&mut self) -> Result<()>;
}

/// [`Session`] over any line-oriented reader/writer pair.
pub struct LineSession<R, W> {
    lines: Lines<R>,
    writer: W,
}

impl<R, W> LineSession<R, W>
where
    R: AsyncBufRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    /// Wraps `reader` (events in) and `writer` (commands out).
    pub fn new(reader: R, writer: W) -> Self {
        Self {
            lines: reader.lines(),
            writer,
        }
    }

    /// Sends the start command carrying the OAuth2 credentials.
    pub async fn start(
        &mut self,
        credentials: &Credentials,
        device_model_id: Option<&str>,
    ) -> Result<()> {
        self.send(json!({
            "command": "start",
            "credentials": credentials,
            "device_model_id": device_model_id,
        }))
        .await
    }

    async fn send(&mut self, message: Value) -> Result<()> {
        let mut line = message.to_string();
        line.push('\n');
        self.writer.write_all(line.as_bytes()).await?;
        self.writer.flush().await?;
        Ok(())
    }
}

#[async_trait]
impl<R, W> Session for LineSession<R, W>
where
    R: AsyncBufRead + Unpin + Send,
    W: AsyncWrite + Unpin + Send,
{
    async fn next_event(&mut self) -> Result<Option<Event>> {
        while let Some(line) = self.lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }
            let event = serde_json::from_str(&line)
                .map_err(|source| Error::MalformedEvent { line, source })?;
            return Ok(Some(event));
        }
        Ok(None)
    }

    async fn stop_conversation(&mut self) -> Result<()> {
        debug!("requesting stop of current conversation turn");
        self.send(json!({"command": "stop_conversation"})).await
    }
}

/// Session backed by a spawned bridge process.
///
/// The bridge is killed when the session is dropped.
pub struct BridgeSession {
    child: Child,
    inner: LineSession<BufReader<ChildStdout>, ChildStdin>,
}

impl BridgeSession {
    /// Spawns the bridge from `argv` (program first) with piped stdio.
    ///
    /// # Errors
    /// Returns [`Error::BridgeSpawn`] if the program cannot be started.
    pub fn spawn(argv: &[String]) -> Result<Self> {
        let (program, args) = argv
            .split_first()
            .ok_or_else(|| Error::InvalidConfig("bridge command is empty".to_string()))?;
        let spawn_error = |source: io::Error| Error::BridgeSpawn {
            program: program.clone(),
            source,
        };
        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .map_err(spawn_error)?;
        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| spawn_error(io::Error::other("bridge stdin not captured")))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| spawn_error(io::Error::other("bridge stdout not captured")))?;
        info!(program = %program, pid = ?child.id(), "assistant bridge started");
        Ok(Self {
            child,
            inner: LineSession::new(BufReader::new(stdout), stdin),
        })
    }

    /// Sends the start command to the bridge.
    pub async fn start(
        &mut self,
        credentials: &Credentials,
        device_model_id: Option<&str>,
    ) -> Result<()> {
        self.inner.start(credentials, device_model_id).await
    }

    /// OS process id of the bridge, if it is still running.
    pub fn id(&self) -> Option<u32> {
        self.child.id()
    }
}

#[async_trait]
impl Session for BridgeSession {
    async fn next_event(&mut self) -> Result<Option<Event>> {
        self.inner.next_event().await
    }

    async fn stop_conversation(&mut self) -> Result<()> {
        self.inner.stop_conversation().await
    }
}
