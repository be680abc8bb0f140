//! [`Transmit`] for serial drivers implementing [`embedded_io::Write`].

use crate::time::Timeout;
use crate::transmit::Transmit;

/// Adapts an [`embedded_io::Write`] serial driver to [`Transmit`].
///
/// `embedded-io` has no notion of a timeout, so the timeout handed to [`Transmit::transmit`] is not applied. Drivers
/// that support one should be configured with it up front, or implement [`Transmit`] directly.
#[derive(Debug)]
pub struct IoTransmit<W> {
    writer: W,
}

impl<W> IoTransmit<W> {
    /// Wraps `writer`.
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Returns the wrapped writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}

impl<W> Transmit for IoTransmit<W>
where
    W: embedded_io::Write,
{
    type Error = W::Error;

    fn transmit(&mut self, bytes: &[u8], _timeout: Timeout) -> Result<(), Self::Error> {
        self.writer.write_all(bytes)?;
        self.writer.flush()
    }
}
