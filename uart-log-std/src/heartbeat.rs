//! Periodic presence heartbeat on a background thread.

use std::fmt::Debug;
use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use uart_log::{LogChannel, Transmit};

/// Handle to a thread that calls [`LogChannel::emit_presence`] every period.
///
/// The channel is shared with the application through a mutex, so heartbeats never interleave with other frames.
/// Dropping the handle stops the thread and waits for it to exit.
#[derive(Debug)]
pub struct Heartbeat {
    stop: Option<Sender<()>>,
    thread: Option<JoinHandle<()>>,
}

impl Heartbeat {
    /// Starts emitting a heartbeat on `channel` every `period`, the first one after one `period`.
    pub fn spawn<T, const N: usize>(
        channel: Arc<Mutex<LogChannel<T, N>>>,
        period: Duration,
    ) -> std::io::Result<Self>
    where
        T: Transmit + Send + 'static,
        T::Error: Debug,
    {
        let (stop, stopped) = mpsc::channel::<()>();

        let thread = thread::Builder::new()
            .name("uart-log-heartbeat".into())
            .spawn(move || {
                tracing::debug!(?period, "heartbeat started");

                while let Err(RecvTimeoutError::Timeout) = stopped.recv_timeout(period) {
                    let delivery = channel
                        .lock()
                        .unwrap_or_else(PoisonError::into_inner)
                        .emit_presence();

                    if let Some(error) = delivery.error() {
                        tracing::warn!(?error, "heartbeat not delivered");
                    }
                }

                tracing::debug!("heartbeat stopped");
            })?;

        Ok(Self {
            stop: Some(stop),
            thread: Some(thread),
        })
    }

    /// Stops the heartbeat and waits for the thread to exit.
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        // Dropping the sender wakes the thread.
        self.stop.take();

        if let Some(thread) = self.thread.take()
            && thread.join().is_err()
        {
            tracing::error!("heartbeat thread panicked");
        }
    }
}

impl Drop for Heartbeat {
    fn drop(&mut self) {
        self.shutdown();
    }
}
