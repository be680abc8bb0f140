//! Serial port transmission.

use std::fmt::Display;
use std::io::{self, Write};
use std::time::Duration;

use serialport::{DataBits, FlowControl, Parity, SerialPort, StopBits};
use uart_log::{Timeout, Transmit};

/// A writer whose blocking writes can be bounded by a timeout.
pub trait TimeoutWrite: Write {
    /// Applies `timeout` to subsequent writes.
    fn set_write_timeout(&mut self, timeout: Duration) -> io::Result<()>;
}

impl TimeoutWrite for Box<dyn SerialPort> {
    fn set_write_timeout(&mut self, timeout: Duration) -> io::Result<()> {
        // serialport shares one timeout between reads and writes.
        self.set_timeout(timeout).map_err(io::Error::from)
    }
}

/// Opens `path` as an 8N1 serial port without flow control.
pub fn open_port(
    path: &str,
    baud_rate: u32,
    timeout: Duration,
) -> serialport::Result<Box<dyn SerialPort>> {
    serialport::new(path, baud_rate)
        .data_bits(DataBits::Eight)
        .parity(Parity::None)
        .stop_bits(StopBits::One)
        .flow_control(FlowControl::None)
        .timeout(timeout)
        .open()
}

/// Calls `open` until it succeeds, giving up after `retries` failed retries.
///
/// Sleeps `delay` between attempts and returns the last error once all `1 + retries` attempts failed.
pub fn open_with_retries<P, E>(
    retries: u32,
    delay: Duration,
    mut open: impl FnMut() -> Result<P, E>,
) -> Result<P, E>
where
    E: Display,
{
    let mut failed = 0;
    loop {
        match open() {
            Ok(port) => {
                tracing::debug!(attempts = failed + 1, "port open");
                return Ok(port);
            }
            Err(error) if failed < retries => {
                failed += 1;
                tracing::error!(
                    %error,
                    ?delay,
                    tries_left = retries - failed,
                    "opening port failed, retrying"
                );
                std::thread::sleep(delay);
            }
            Err(error) => return Err(error),
        }
    }
}

/// Implements [`Transmit`] by writing to a [`TimeoutWrite`], usually a serial port from [`open_port`].
#[derive(Debug)]
pub struct SerialTransmit<P> {
    port: P,
    /// Timeout currently applied to `port`, to avoid reconfiguring it for every frame.
    applied: Option<Timeout>,
}

impl<P> SerialTransmit<P> {
    /// Wraps `port`.
    pub fn new(port: P) -> Self {
        Self {
            port,
            applied: None,
        }
    }

    /// Returns the wrapped port.
    pub fn into_inner(self) -> P {
        self.port
    }
}

impl<P> Transmit for SerialTransmit<P>
where
    P: TimeoutWrite,
{
    type Error = io::Error;

    fn transmit(&mut self, bytes: &[u8], timeout: Timeout) -> Result<(), Self::Error> {
        if self.applied != Some(timeout) {
            self.port.set_write_timeout(timeout.into())?;
            self.applied = Some(timeout);
        }

        tracing::trace!(len = bytes.len(), ?timeout, "transmitting frame");

        self.port.write_all(bytes)?;
        self.port.flush()
    }
}
