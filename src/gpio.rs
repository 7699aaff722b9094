//! Raspberry Pi GPIO setup.

use rppal::gpio::{Gpio, OutputPin};
use tracing::info;

use crate::error::{Error, Result};

/// Claims `pins` (BCM numbering) as outputs, initially low.
///
/// # Details
/// Reset-on-drop is disabled so the lines keep their level when the daemon
/// exits and no warning is raised when another process used them before.
///
/// # Arguments
/// * `pins` - BCM pin numbers in animation order.
///
/// # Returns
/// * `Vec<OutputPin>` - Output handles in the same order as `pins`.
///
/// # Errors
/// Returns [`Error::GpioUnavailable`] if the GPIO peripheral cannot be
/// opened and [`Error::Gpio`] naming the first pin that cannot be claimed.
pub fn open_output_pins(pins: &[u8]) -> Result<Vec<OutputPin>> {
    let gpio = Gpio::new().map_err(Error::GpioUnavailable)?;
    let outputs = pins
        .iter()
        .map(|&pin| {
            let mut output = gpio
                .get(pin)
                .map_err(|source| Error::Gpio { pin, source })?
                .into_output_low();
            output.set_reset_on_drop(false);
            Ok(output)
        })
        .collect::<Result<Vec<_>>>()?;
    info!(?pins, "GPIO outputs ready");
    Ok(outputs)
}
