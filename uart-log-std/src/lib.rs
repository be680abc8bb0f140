//! `std` support for `uart-log`.
//!
//! This provides the pieces a hosted target or the receiving end of the link needs on top of the `no_std` core:
//!
//! - [`SerialTransmit`], a [`Transmit`](uart_log::Transmit) implementation over a [`serialport`] port (or any
//!   [`TimeoutWrite`]).
//! - [`heartbeat::Heartbeat`], a thread emitting the presence heartbeat periodically.
//! - [`listener::Listener`], which decodes the byte stream of a remote [`LogChannel`](uart_log::LogChannel) and
//!   reports every frame through [`tracing`].

#![forbid(unsafe_code)]

pub mod config;
pub mod heartbeat;
pub mod listener;
mod serial;

pub use serial::{SerialTransmit, TimeoutWrite, open_port, open_with_retries};
pub use uart_log;
