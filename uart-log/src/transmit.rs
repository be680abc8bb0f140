//! The blocking serial transmit primitive a [`LogChannel`](crate::LogChannel) writes through.

use crate::time::Timeout;

/// `Transmit` is used to push bytes onto a serial link in a platform-agnostic manner.
///
/// Implementations block until every byte has been handed to the peripheral or `timeout` has elapsed.
pub trait Transmit {
    /// The error reported when a transmission fails or times out.
    type Error;

    /// Writes all of `bytes` to the serial output, giving up after `timeout`.
    fn transmit(&mut self, bytes: &[u8], timeout: Timeout) -> Result<(), Self::Error>;
}

impl<T> Transmit for &mut T
where
    T: Transmit + ?Sized,
{
    type Error = T::Error;

    fn transmit(&mut self, bytes: &[u8], timeout: Timeout) -> Result<(), Self::Error> {
        T::transmit(self, bytes, timeout)
    }
}

/// The outcome of handing a message to the transmitter.
///
/// Remote logging is best effort: a channel never retries and dropping a `Delivery` is fine. It is returned so callers
/// that care about link failures can observe them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery<E> {
    result: Result<(), E>,
}

impl<E> Delivery<E> {
    pub(crate) fn new(result: Result<(), E>) -> Self {
        Self { result }
    }

    /// Returns whether the transmitter reported success.
    pub fn is_delivered(&self) -> bool {
        self.result.is_ok()
    }

    /// Returns the transmitter error, if any.
    pub fn error(&self) -> Option<&E> {
        self.result.as_ref().err()
    }

    /// Converts this into the transmitter's result.
    pub fn into_result(self) -> Result<(), E> {
        self.result
    }
}
