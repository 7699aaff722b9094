/*
 * @file commands.rs
 * @brief Power command matching and execution
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

//! Power command matching and execution.

use std::process::Stdio;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::error::{Error, Result};

/// Host-level command that ends the daemon's life.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PowerCommand {
    /// Restart the host.
    Reboot,
    /// Power the host off.
    Shutdown,
}

/// Recognized phrases and the command each one triggers.
///
/// # Details
/// Matching is exact and case-sensitive, which is how the assistant reports
/// a lone spoken keyword.
const PHRASES: &[(&str, PowerCommand)] = &[
    ("reboot", PowerCommand::Reboot),
    ("shutdown", PowerCommand::Shutdown),
    ("shut down", PowerCommand::Shutdown),
];

/// Finds the power command for a recognized utterance.
///
/// # Arguments
/// * `text` - Recognized speech text exactly as reported by the assistant.
///
/// # Returns
/// * `Some(PowerCommand)` - The utterance is one of the power phrases.
/// * `None` - Any other text.
pub fn find_power_command(text: &str) -> Option<PowerCommand> {
    PHRASES
        .iter()
        .find(|(phrase, _)| *phrase == text)
        .map(|(_, command)| *command)
}

/// Executes power commands on behalf of the dispatcher.
#[async_trait]
pub trait CommandRunner: Send {
    /// Runs `command` and waits for it to return.
    ///
    /// # Errors
    /// Fails only if the command could not be started.
    async fn run(&mut self, command: PowerCommand) -> Result<()>;
}

/// Runs the configured reboot/shutdown programs on the host.
#[derive(Clone, Debug)]
pub struct SystemCommandRunner {
    reboot: Vec<String>,
    shutdown: Vec<String>,
}

impl SystemCommandRunner {
    /// Creates a runner from two argument vectors, program first.
    ///
    /// # Errors
    /// Returns [`Error::InvalidConfig`] if either vector is empty.
    pub fn new(reboot: Vec<String>, shutdown: Vec<String>) -> Result<Self> {
        if reboot.is_empty() || shutdown.is_empty() {
            return Err(Error::InvalidConfig(
                "power commands need at least a program name".to_string(),
            ));
        }
        Ok(Self { reboot, shutdown })
    }

    /// Argument vector configured for `command`.
    pub fn argv(&self, command: PowerCommand) -> &[String] {
        match command {
            PowerCommand::Reboot => &self.reboot,
            PowerCommand::Shutdown => &self.shutdown,
        }
    }
}

#[async_trait]
impl CommandRunner for SystemCommandRunner {
    async fn run(&mut self, command: PowerCommand) -> Result<()> {
        let (program, args) = self
            .argv(command)
            .split_first()
            .ok_or_else(|| Error::InvalidConfig(format!("no program for {command:?}")))?;
        info!(?command, program = %program, "running power command");
        let status = tokio::process::Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .status()
            .await
            .map_err(|source| Error::CommandSpawn {
                program: program.clone(),
                source,
            })?;
        if !status.success() {
            warn!(?command, %status, "power command exited unsuccessfully");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(words: &[&str]) -> Vec<String> {
        words.iter().map(|word| word.to_string()).collect()
    }

    #[test]
    fn matches_power_phrases_exactly() {
        assert_eq!(find_power_command("reboot"), Some(PowerCommand::Reboot));
        assert_eq!(find_power_command("shutdown"), Some(PowerCommand::Shutdown));
        assert_eq!(find_power_command("shut down"), Some(PowerCommand::Shutdown));
    }

    #[test]
    fn ignores_other_text() {
        assert_eq!(find_power_command("Reboot"), None);
        assert_eq!(find_power_command("please reboot"), None);
        assert_eq!(find_power_command("shut down now"), None);
        assert_eq!(find_power_command(""), None);
    }

    #[test]
    fn runner_requires_programs() {
        assert!(SystemCommandRunner::new(Vec::new(), argv(&["true"])).is_err());
        assert!(SystemCommandRunner::new(argv(&["true"]), Vec::new()).is_err());
    }

    #[tokio::test]
    async fn runner_ignores_exit_status() {
        let mut runner = SystemCommandRunner::new(argv(&["true"]), argv(&["false"])).unwrap();
        assert!(runner.run(PowerCommand::Reboot).await.is_ok());
        assert!(runner.run(PowerCommand::Shutdown).await.is_ok());
    }

    #[tokio::test]
    async fn runner_reports_missing_program() {
        let mut runner = SystemCommandRunner::new(
            argv(&["/nonexistent/assistant-lights-reboot"]),
            argv(&["true"]),
        )
        .unwrap();
        let err = runner.run(PowerCommand::Reboot).await.unwrap_err();
        assert!(matches!(err, Error::CommandSpawn { .. }));
    }
}
