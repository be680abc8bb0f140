//! The receiving end of the link.
//!
//! A [`Listener`] reads the byte stream produced by a remote [`LogChannel`](uart_log::LogChannel), splits it into
//! frames and reports each one as a [`tracing`] event. Remote messages use the `remote` target, so they can be told
//! apart from the listener's own diagnostics.

use std::io::{self, BufReader, Read};

use uart_log::frame::{Frame, FrameDecoder};
use uart_log::{Level, Severity};

use crate::config::ListenerConfig;

/// Target of the events carrying remote log messages.
pub const REMOTE_TARGET: &str = "remote";

/// An error that ended a [`Listener::run`].
#[derive(Debug, thiserror::Error)]
pub enum ListenError {
    /// Reading from the link failed.
    #[error("reading from the link")]
    Io(#[from] io::Error),
    /// Neither data nor a heartbeat arrived for too many consecutive read timeouts.
    #[error("target is not present after {missed} read timeouts")]
    TargetLost {
        /// Consecutive read timeouts observed.
        missed: u32,
    },
}

/// Why a [`Listener::run`] returned successfully.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndReason {
    /// The target sent the shutdown notice.
    Shutdown,
    /// The link reached end of file.
    Disconnected,
}

/// Statistics of a finished [`Listener::run`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    /// Log messages received.
    pub messages: usize,
    /// Presence heartbeats received.
    pub presences: usize,
    /// Frames dropped because they could not be decoded.
    pub rejected: usize,
    /// Partial frames dropped because the link went quiet mid-frame.
    pub interrupted: usize,
    /// How the run ended.
    pub ended_by: EndReason,
}

#[derive(Debug, Default)]
struct Counters {
    messages: usize,
    presences: usize,
    rejected: usize,
    interrupted: usize,
}

impl Counters {
    fn finish(self, ended_by: EndReason) -> Summary {
        Summary {
            messages: self.messages,
            presences: self.presences,
            rejected: self.rejected,
            interrupted: self.interrupted,
            ended_by,
        }
    }
}

/// Decodes frames from a link and reports them through [`tracing`].
#[derive(Debug, Clone)]
pub struct Listener {
    config: ListenerConfig,
}

impl Listener {
    /// Creates a listener with the frame size limit and ping tolerance from `config`.
    pub fn new(config: ListenerConfig) -> Self {
        Self { config }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &ListenerConfig {
        &self.config
    }

    /// Reads frames from `link` until the target shuts down or the link closes.
    ///
    /// Read errors of kind [`TimedOut`](io::ErrorKind::TimedOut) or [`WouldBlock`](io::ErrorKind::WouldBlock) are
    /// missed pings. Any byte received resets the count; exceeding
    /// [`no_ping_tries`](ListenerConfig::no_ping_tries) consecutive misses fails with [`ListenError::TargetLost`].
    #[tracing::instrument(skip_all)]
    pub fn run(&self, link: impl Read) -> Result<Summary, ListenError> {
        let mut decoder = FrameDecoder::new(vec![0; self.config.max_frame_len]);
        let mut counters = Counters::default();
        let mut missed = 0;

        for byte in BufReader::new(link).bytes() {
            let byte = match byte {
                Ok(byte) => byte,
                Err(error) if is_timeout(&error) => {
                    missed += 1;
                    if missed > self.config.no_ping_tries {
                        tracing::error!(missed, "target is not present, giving up");
                        return Err(ListenError::TargetLost { missed });
                    }

                    let tries_left = self.config.no_ping_tries - missed;
                    if decoder.is_idle() {
                        tracing::error!(
                            wait_secs = self.config.read_timeout_secs,
                            tries_left,
                            "target is not present"
                        );
                    } else {
                        tracing::error!(tries_left, "transmission failed, dropping partial frame");
                        decoder.reset();
                        counters.interrupted += 1;
                    }
                    continue;
                }
                Err(error) => return Err(error.into()),
            };
            missed = 0;

            match decoder.push(byte) {
                None => {}
                Some(Ok(Frame::Shutdown)) => {
                    tracing::info!("logging terminated by the target");
                    return Ok(counters.finish(EndReason::Shutdown));
                }
                Some(Ok(Frame::Presence)) => {
                    counters.presences += 1;
                    if counters.presences == 1 {
                        tracing::info!("target is present");
                    } else {
                        tracing::trace!("heartbeat");
                    }
                }
                Some(Ok(Frame::Log { level, text })) => {
                    counters.messages += 1;
                    report(level, text);
                }
                Some(Err(error)) => {
                    counters.rejected += 1;
                    tracing::warn!(%error, "dropping frame");
                }
            }
        }

        tracing::info!("link closed");
        Ok(counters.finish(EndReason::Disconnected))
    }
}

fn is_timeout(error: &io::Error) -> bool {
    matches!(
        error.kind(),
        io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock
    )
}

/// Emits a remote log message at the matching `tracing` level.
fn report(level: Level, text: &str) {
    match level {
        Level::Known(Severity::Debug) => tracing::debug!(target: REMOTE_TARGET, "{text}"),
        Level::Known(Severity::Info) => tracing::info!(target: REMOTE_TARGET, "{text}"),
        Level::Known(Severity::Warning) => tracing::warn!(target: REMOTE_TARGET, "{text}"),
        Level::Known(Severity::Error) => tracing::error!(target: REMOTE_TARGET, "{text}"),
        Level::Known(Severity::Critical) => {
            tracing::error!(target: REMOTE_TARGET, critical = true, "{text}")
        }
        Level::Unknown => tracing::warn!(target: REMOTE_TARGET, unknown_level = true, "{text}"),
    }
}
