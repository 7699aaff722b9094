/*
 * @file mode.rs
 * @brief Shared LED mode state
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

//! Shared LED mode state.
//!
//! The dispatcher writes the mode when assistant events arrive and the
//! lights task reads it on every tick. Both hold a clone of the same
//! [`ModeCell`], so no lock is involved.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};

/// Visual state rendered by the lights task.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Mode {
    /// All LEDs off.
    #[default]
    Idle = 0,
    /// One LED lit at a time, walking through the pin set.
    RunningLights = 1,
    /// First LED blinks, then the mode falls back to idle.
    Blink = 2,
    /// A reboot or shutdown has been requested. No animation is assigned.
    ShuttingDown = 3,
}

impl Mode {
    /// Decodes the raw value stored in a [`ModeCell`].
    ///
    /// Unknown values decode as [`Mode::Idle`]; only [`Mode::as_u8`]
    /// output is ever stored, so this never happens in practice.
    pub fn from_u8(raw: u8) -> Self {
        match raw {
            1 => Self::RunningLights,
            2 => Self::Blink,
            3 => Self::ShuttingDown,
            _ => Self::Idle,
        }
    }

    /// Raw discriminant stored in the atomic cell.
    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::RunningLights => "running-lights",
            Self::Blink => "blink",
            Self::ShuttingDown => "shutting-down",
        };
        f.write_str(name)
    }
}

/// Cloneable handle to the process-wide mode.
#[derive(Clone, Debug, Default)]
pub struct ModeCell {
    inner: Arc<AtomicU8>,
}

impl ModeCell {
    /// Creates a cell starting in [`Mode::Idle`].
    pub fn new() -> Self {
        Self::default()
    }

    /// Current mode.
    pub fn get(&self) -> Mode {
        Mode::from_u8(self.inner.load(Ordering::Acquire))
    }

    /// Unconditionally replaces the mode.
    pub fn set(&self, mode: Mode) {
        self.inner.store(mode.as_u8(), Ordering::Release);
    }

    /// Replaces the mode only if it still equals `current`.
    ///
    /// Returns `true` when the swap happened. The lights task uses this to
    /// fall back from [`Mode::Blink`] without overwriting a mode the
    /// dispatcher set in the meantime.
    pub fn replace_if(&self, current: Mode, next: Mode) -> bool {
        self.inner
            .compare_exchange(
                current.as_u8(),
                next.as_u8(),
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_idle() {
        assert_eq!(ModeCell::new().get(), Mode::Idle);
    }

    #[test]
    fn raw_values_match_mode_numbers() {
        assert_eq!(Mode::Idle.as_u8(), 0);
        assert_eq!(Mode::RunningLights.as_u8(), 1);
        assert_eq!(Mode::Blink.as_u8(), 2);
        assert_eq!(Mode::ShuttingDown.as_u8(), 3);
        assert_eq!(Mode::from_u8(2), Mode::Blink);
        assert_eq!(Mode::from_u8(42), Mode::Idle);
    }

    #[test]
    fn clones_share_state() {
        let cell = ModeCell::new();
        let other = cell.clone();
        cell.set(Mode::RunningLights);
        assert_eq!(other.get(), Mode::RunningLights);
    }

    #[test]
    fn replace_if_respects_concurrent_write() {
        let cell = ModeCell::new();
        cell.set(Mode::Blink);
        assert!(cell.replace_if(Mode::Blink, Mode::Idle));
        assert_eq!(cell.get(), Mode::Idle);

        cell.set(Mode::RunningLights);
        assert!(!cell.replace_if(Mode::Blink, Mode::Idle));
        assert_eq!(cell.get(), Mode::RunningLights);
    }
}
