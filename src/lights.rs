/*
 * @file lights.rs
 * @brief LED animation task
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

//! LED animation task.
//!
//! # Details
//! [`Lights`] owns the output pins and a cursor. On every tick it reads the
//! shared [`ModeCell`] and renders the current [`Mode`] onto the pins. The
//! task runs on its own tokio task, decoupled from event timing, and is
//! driven by a [`Ticker`] so tests can step it without waiting on a clock.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use embedded_hal::digital::{Error as _, OutputPin};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Interval, MissedTickBehavior};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::mode::{Mode, ModeCell};

/// Number of blink ticks before the mode falls back to idle.
///
/// Odd ticks light the first pin, so nine ticks give four flashes and
/// end dark.
pub const BLINK_TICKS: usize = 9;

/// Default delay between two animation frames.
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(200);

/// Source of animation ticks.
#[async_trait]
pub trait Ticker: Send {
    /// Resolves when the next frame should be rendered.
    async fn tick(&mut self);
}

/// Wall-clock ticker backed by [`tokio::time::interval`].
pub struct IntervalTicker {
    interval: Interval,
}

impl IntervalTicker {
    /// Creates a ticker firing every `period`.
    ///
    /// Missed ticks are delayed rather than bunched up, so a stalled
    /// runtime never replays a burst of frames.
    pub fn new(period: Duration) -> Self {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Self { interval }
    }
}

#[async_trait]
impl Ticker for IntervalTicker {
    async fn tick(&mut self) {
        self.interval.tick().await;
    }
}

/// Renders the shared mode onto a fixed set of output pins.
pub struct Lights<P> {
    pins: Vec<P>,
    mode: ModeCell,
    cursor: usize,
    last_mode: Mode,
}

impl<P: OutputPin> Lights<P> {
    /// Creates a controller over `pins`, reading `mode` every tick.
    ///
    /// # Arguments
    /// * `pins` - Output pins in animation order. Must not be empty.
    /// * `mode` - Shared mode written by the dispatcher.
    ///
    /// # Errors
    /// Returns [`Error::InvalidConfig`] when `pins` is empty.
    pub fn new(pins: Vec<P>, mode: ModeCell) -> Result<Self> {
        if pins.is_empty() {
            return Err(Error::InvalidConfig(
                "the lights need at least one output pin".to_string(),
            ));
        }
        Ok(Self {
            pins,
            mode,
            cursor: 0,
            last_mode: Mode::Idle,
        })
    }

    /// Output pins in animation order.
    pub fn pins(&self) -> &[P] {
        &self.pins
    }

    /// Current position of the running light or blink phase.
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Renders one animation frame.
    ///
    /// # Details
    /// Entering an animation from another mode restarts it at cursor 0.
    /// Idle only writes on the first idle tick after an animation, turning
    /// every pin off once. [`Mode::ShuttingDown`] leaves the pins untouched.
    ///
    /// # Errors
    /// Returns [`Error::PinWrite`] if any pin rejects a level.
    pub fn step(&mut self) -> Result<()> {
        let mode = self.mode.get();
        if mode != self.last_mode && matches!(mode, Mode::RunningLights | Mode::Blink) {
            self.cursor = 0;
        }
        match mode {
            Mode::RunningLights => self.show_running_light()?,
            Mode::Blink => self.show_blink()?,
            Mode::Idle if self.last_mode != Mode::Idle => {
                self.all_off()?;
                self.cursor = 0;
            }
            Mode::Idle | Mode::ShuttingDown => {}
        }
        if mode != self.last_mode {
            debug!(from = %self.last_mode, to = %mode, "lights mode changed");
        }
        self.last_mode = mode;
        Ok(())
    }

    /// Lights the pin under the cursor and advances it circularly.
    fn show_running_light(&mut self) -> Result<()> {
        let lit = self.cursor;
        for index in 0..self.pins.len() {
            self.drive(index, index == lit)?;
        }
        self.cursor = (self.cursor + 1) % self.pins.len();
        Ok(())
    }

    /// Toggles the first pin and falls back to idle after [`BLINK_TICKS`].
    fn show_blink(&mut self) -> Result<()> {
        self.drive(0, self.cursor % 2 == 1)?;
        self.cursor += 1;
        if self.cursor >= BLINK_TICKS && self.mode.replace_if(Mode::Blink, Mode::Idle) {
            self.cursor = 0;
        }
        Ok(())
    }

    fn all_off(&mut self) -> Result<()> {
        for index in 0..self.pins.len() {
            self.drive(index, false)?;
        }
        Ok(())
    }

    fn drive(&mut self, index: usize, high: bool) -> Result<()> {
        let pin = &mut self.pins[index];
        let written = if high { pin.set_high() } else { pin.set_low() };
        written.map_err(|err| Error::PinWrite {
            index,
            kind: err.kind(),
        })
    }

    /// Renders a frame on every tick until `stop` fires.
    ///
    /// # Returns
    /// The controller itself, so callers can inspect the final pin state.
    ///
    /// # Errors
    /// Stops at the first pin write failure and returns it.
    pub async fn run<T: Ticker>(
        mut self,
        mut ticker: T,
        mut stop: watch::Receiver<bool>,
    ) -> Result<Self> {
        loop {
            if *stop.borrow_and_update() {
                break;
            }
            tokio::select! {
                biased;
                changed = stop.changed() => {
                    if changed.is_err() {
                        break;
                    }
                }
                _ = ticker.tick() => self.step()?,
            }
        }
        info!("lights task stopped");
        Ok(self)
    }
}

/// Cloneable trigger that asks a running lights task to exit.
#[derive(Clone, Debug)]
pub struct StopSignal {
    tx: Arc<watch::Sender<bool>>,
}

impl StopSignal {
    /// Requests the task to stop after its current frame.
    pub fn stop(&self) {
        self.tx.send_replace(true);
    }
}

/// Handle to a lights task started with [`spawn`].
pub struct LightsHandle<P> {
    stop: StopSignal,
    task: JoinHandle<Result<Lights<P>>>,
}

impl<P> LightsHandle<P> {
    /// Trigger that stops the task, usable after the handle is consumed.
    pub fn stop_signal(&self) -> StopSignal {
        self.stop.clone()
    }

    /// Requests the task to stop.
    pub fn stop(&self) {
        self.stop.stop();
    }

    /// Waits for the task to exit, returning the controller.
    ///
    /// # Errors
    /// Returns the task's pin error, or [`Error::LightsTask`] if it panicked.
    pub async fn join(self) -> Result<Lights<P>> {
        self.task.await?
    }

    /// Stops the task and waits for it.
    pub async fn shutdown(self) -> Result<Lights<P>> {
        self.stop();
        self.join().await
    }
}

/// Starts `lights` on a background task paced by `ticker`.
pub fn spawn<P, T>(lights: Lights<P>, ticker: T) -> LightsHandle<P>
where
    P: OutputPin + Send + 'static,
    T: Ticker + 'static,
{
    let (tx, rx) = watch::channel(false);
    info!(pins = lights.pins.len(), "starting lights task");
    let task = tokio::spawn(lights.run(ticker, rx));
    LightsHandle {
        stop: StopSignal { tx: Arc::new(tx) },
        task,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_hal::digital::{ErrorKind, ErrorType};
    use std::convert::Infallible;
    use tokio::sync::oneshot;

    /// In-memory pin that records every level written to it.
    #[derive(Debug, Default)]
    struct RecordingPin {
        writes: Vec<bool>,
    }

    impl RecordingPin {
        fn is_high(&self) -> bool {
            self.writes.last().copied().unwrap_or(false)
        }
    }

    impl ErrorType for RecordingPin {
        type Error = Infallible;
    }

    impl OutputPin for RecordingPin {
        fn set_low(&mut self) -> std::result::Result<(), Self::Error> {
            self.writes.push(false);
            Ok(())
        }

        fn set_high(&mut self) -> std::result::Result<(), Self::Error> {
            self.writes.push(true);
            Ok(())
        }
    }

    #[derive(Debug)]
    struct BrokenPinError;

    impl embedded_hal::digital::Error for BrokenPinError {
        fn kind(&self) -> ErrorKind {
            ErrorKind::Other
        }
    }

    struct BrokenPin;

    impl ErrorType for BrokenPin {
        type Error = BrokenPinError;
    }

    impl OutputPin for BrokenPin {
        fn set_low(&mut self) -> std::result::Result<(), Self::Error> {
            Err(BrokenPinError)
        }

        fn set_high(&mut self) -> std::result::Result<(), Self::Error> {
            Err(BrokenPinError)
        }
    }

    /// Yields a fixed number of ticks, reports exhaustion, then stalls.
    struct CountedTicker {
        remaining: usize,
        exhausted: Option<oneshot::Sender<()>>,
    }

    #[async_trait]
    impl Ticker for CountedTicker {
        async fn tick(&mut self) {
            if self.remaining == 0 {
                if let Some(tx) = self.exhausted.take() {
                    tx.send(()).ok();
                }
                std::future::pending::<()>().await;
            }
            self.remaining -= 1;
        }
    }

    fn three_pins(mode: &ModeCell) -> Lights<RecordingPin> {
        let pins = (0..3).map(|_| RecordingPin::default()).collect();
        Lights::new(pins, mode.clone()).expect("lights")
    }

    fn levels(lights: &Lights<RecordingPin>) -> Vec<bool> {
        lights.pins().iter().map(RecordingPin::is_high).collect()
    }

    fn write_count(lights: &Lights<RecordingPin>) -> usize {
        lights.pins().iter().map(|pin| pin.writes.len()).sum()
    }

    #[test]
    fn rejects_empty_pin_set() {
        assert!(Lights::<RecordingPin>::new(Vec::new(), ModeCell::new()).is_err());
    }

    #[test]
    fn idle_from_start_writes_nothing() {
        let mode = ModeCell::new();
        let mut lights = three_pins(&mode);
        for _ in 0..5 {
            lights.step().unwrap();
        }
        assert_eq!(write_count(&lights), 0);
    }

    #[test]
    fn running_lights_walk_pin_set() {
        let mode = ModeCell::new();
        mode.set(Mode::RunningLights);
        let mut lights = three_pins(&mode);
        for k in 0..10 {
            lights.step().unwrap();
            let expected: Vec<bool> = (0..3).map(|i| i == k % 3).collect();
            assert_eq!(levels(&lights), expected, "tick {k}");
            assert_eq!(lights.cursor(), (k + 1) % 3);
        }
    }

    #[test]
    fn blink_toggles_first_pin_then_reverts() {
        let mode = ModeCell::new();
        mode.set(Mode::Blink);
        let mut lights = three_pins(&mode);
        for tick in 0..BLINK_TICKS {
            assert_eq!(mode.get(), Mode::Blink, "tick {tick}");
            lights.step().unwrap();
            assert_eq!(lights.pins()[0].is_high(), tick % 2 == 1, "tick {tick}");
        }
        assert_eq!(mode.get(), Mode::Idle);
        assert_eq!(
            lights.pins()[0].writes,
            vec![false, true, false, true, false, true, false, true, false]
        );
        assert!(lights.pins()[1].writes.is_empty());

        lights.step().unwrap();
        assert_eq!(levels(&lights), vec![false, false, false]);
        assert_eq!(lights.cursor(), 0);
        assert_eq!(lights.pins()[1].writes, vec![false]);
    }

    #[test]
    fn blink_restarted_before_next_tick_plays_in_full() {
        let mode = ModeCell::new();
        mode.set(Mode::Blink);
        let mut lights = three_pins(&mode);
        for _ in 0..BLINK_TICKS {
            lights.step().unwrap();
        }
        assert_eq!(mode.get(), Mode::Idle);
        assert_eq!(lights.cursor(), 0);

        mode.set(Mode::Blink);
        let mut ticks = 0;
        while mode.get() == Mode::Blink {
            lights.step().unwrap();
            ticks += 1;
            assert!(ticks <= BLINK_TICKS, "blink never reverted");
        }
        assert_eq!(ticks, BLINK_TICKS);
        assert_eq!(
            lights.pins()[0].writes[BLINK_TICKS..],
            [false, true, false, true, false, true, false, true, false]
        );
    }

    #[test]
    fn idle_cleanup_happens_once() {
        let mode = ModeCell::new();
        mode.set(Mode::RunningLights);
        let mut lights = three_pins(&mode);
        lights.step().unwrap();
        lights.step().unwrap();
        let before = write_count(&lights);

        mode.set(Mode::Idle);
        for _ in 0..6 {
            lights.step().unwrap();
        }
        assert_eq!(write_count(&lights) - before, 3);
        assert_eq!(levels(&lights), vec![false, false, false]);
        assert_eq!(lights.cursor(), 0);
    }

    #[test]
    fn shutting_down_leaves_pins_untouched() {
        let mode = ModeCell::new();
        mode.set(Mode::RunningLights);
        let mut lights = three_pins(&mode);
        lights.step().unwrap();
        let before = write_count(&lights);
        let lit = levels(&lights);

        mode.set(Mode::ShuttingDown);
        for _ in 0..4 {
            lights.step().unwrap();
        }
        assert_eq!(write_count(&lights), before);
        assert_eq!(levels(&lights), lit);
    }

    #[test]
    fn entering_running_lights_mid_blink_restarts_cursor() {
        let mode = ModeCell::new();
        mode.set(Mode::Blink);
        let mut lights = three_pins(&mode);
        for _ in 0..5 {
            lights.step().unwrap();
        }
        mode.set(Mode::RunningLights);
        lights.step().unwrap();
        assert_eq!(levels(&lights), vec![true, false, false]);
        assert_eq!(lights.cursor(), 1);
    }

    #[test]
    fn blink_fallback_does_not_clobber_new_mode() {
        let mode = ModeCell::new();
        mode.set(Mode::Blink);
        let mut lights = three_pins(&mode);
        for _ in 0..BLINK_TICKS - 1 {
            lights.step().unwrap();
        }
        mode.set(Mode::RunningLights);
        lights.step().unwrap();
        assert_eq!(mode.get(), Mode::RunningLights);
    }

    #[test]
    fn pin_failure_is_reported() {
        let mode = ModeCell::new();
        mode.set(Mode::RunningLights);
        let mut lights = Lights::new(vec![BrokenPin], mode).unwrap();
        let err = lights.step().unwrap_err();
        assert!(matches!(err, Error::PinWrite { index: 0, kind: ErrorKind::Other }));
    }

    #[tokio::test]
    async fn run_renders_one_frame_per_tick() {
        let mode = ModeCell::new();
        mode.set(Mode::RunningLights);
        let (tx, rx) = oneshot::channel();
        let ticker = CountedTicker {
            remaining: 4,
            exhausted: Some(tx),
        };
        let handle = spawn(three_pins(&mode), ticker);
        rx.await.unwrap();
        let lights = handle.shutdown().await.unwrap();
        assert_eq!(levels(&lights), vec![true, false, false]);
        assert_eq!(lights.cursor(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn interval_ticker_completes_blink_sequence() {
        let mode = ModeCell::new();
        mode.set(Mode::Blink);
        let handle = spawn(
            three_pins(&mode),
            IntervalTicker::new(DEFAULT_TICK_INTERVAL),
        );
        tokio::time::sleep(DEFAULT_TICK_INTERVAL * 15).await;
        let lights = handle.shutdown().await.unwrap();
        assert_eq!(mode.get(), Mode::Idle);
        assert_eq!(levels(&lights), vec![false, false, false]);
        assert_eq!(lights.pins()[0].writes.iter().filter(|high| **high).count(), 4);
    }

    #[tokio::test]
    async fn run_surfaces_pin_errors() {
        let mode = ModeCell::new();
        mode.set(Mode::Blink);
        let lights = Lights::new(vec![BrokenPin], mode).unwrap();
        let handle = spawn(lights, IntervalTicker::new(Duration::from_millis(1)));
        assert!(matches!(handle.join().await, Err(Error::PinWrite { .. })));
    }

    #[tokio::test]
    async fn stop_before_first_tick_exits_cleanly() {
        let mode = ModeCell::new();
        mode.set(Mode::RunningLights);
        let ticker = CountedTicker {
            remaining: 0,
            exhausted: None,
        };
        let handle = spawn(three_pins(&mode), ticker);
        let signal = handle.stop_signal();
        signal.stop();
        let lights = handle.join().await.unwrap();
        assert_eq!(write_count(&lights), 0);
    }
}
