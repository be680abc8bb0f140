//! # `uart-log`
//!
//! Tagged remote logging over a blocking serial transmitter.
//!
//! A [`LogChannel`] formats a message as `"<tag> <text>\r"` into a fixed-capacity buffer, checks that it fits and
//! hands it to a [`Transmit`] implementation together with a [`Timeout`]. Two literal control messages complete the
//! wire protocol: a periodic presence heartbeat (`is_present\r`) and a shutdown notice (`end\r`).
//!
//! The transmit primitive, peripheral initialization and the timer that drives the heartbeat all belong to the
//! integrating application.
//!
//! ## Feature Flags
//!
//! - `embedded-io` - Implements [`Transmit`] for [`embedded_io::Write`] drivers, see [`io::IoTransmit`].
//! - `critical-section` - Provides [`shared::SharedLogChannel`] for channels stored in a `static`.
//!
//! ## Usage
//!
//! ```rust
//! use uart_log::{LogChannel, Severity, Timeout, Transmit};
//!
//! struct Uart(Vec<u8>);
//!
//! impl Transmit for Uart {
//!     type Error = core::convert::Infallible;
//!
//!     fn transmit(&mut self, bytes: &[u8], _timeout: Timeout) -> Result<(), Self::Error> {
//!         self.0.extend_from_slice(bytes);
//!         Ok(())
//!     }
//! }
//!
//! let mut channel: LogChannel<_> = LogChannel::new(Uart(Vec::new()));
//!
//! channel.emit("battery low", Severity::Warning)?;
//! channel.emit_presence();
//!
//! assert_eq!(channel.transmit_mut().0, b"W battery low\ris_present\r");
//! # Ok::<(), uart_log::FormatError>(())
//! ```

#![no_std]
#![forbid(unsafe_code)]

#[cfg(test)]
extern crate std;

mod channel;
mod error;
pub mod frame;
#[cfg(feature = "embedded-io")]
pub mod io;
mod severity;
#[cfg(feature = "critical-section")]
pub mod shared;
mod time;
mod transmit;

pub use channel::{DEFAULT_CAPACITY, LogChannel};
pub use error::FormatError;
pub use severity::{Level, Severity, UNKNOWN_TAG};
pub use time::{DEFAULT_TIMEOUT, Timeout};
pub use transmit::{Delivery, Transmit};
