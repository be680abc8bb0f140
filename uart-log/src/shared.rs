//! A [`LogChannel`] that can live in a `static`.

use core::cell::RefCell;

use critical_section::Mutex;

use crate::channel::{DEFAULT_CAPACITY, LogChannel};

/// A [`LogChannel`] behind a [`critical_section::Mutex`], for applications that log from more than one execution
/// context.
///
/// Every access runs inside a critical section, which also covers the blocking transmission. Keep the configured
/// timeout short when interrupt latency matters.
///
/// ```
/// use uart_log::shared::SharedLogChannel;
/// use uart_log::{LogChannel, Severity, Timeout, Transmit};
///
/// # #[derive(Debug)]
/// struct Uart;
///
/// impl Transmit for Uart {
///     type Error = ();
///
///     fn transmit(&mut self, _bytes: &[u8], _timeout: Timeout) -> Result<(), ()> {
///         Ok(())
///     }
/// }
///
/// static LOG: SharedLogChannel<Uart> = SharedLogChannel::new();
///
/// assert!(LOG.with(|channel| channel.emit_presence()).is_none());
///
/// LOG.init(LogChannel::new(Uart));
/// let sent = LOG.with(|channel| channel.emit("ready", Severity::Info).is_ok());
/// assert_eq!(sent, Some(true));
/// ```
pub struct SharedLogChannel<T, const N: usize = DEFAULT_CAPACITY> {
    inner: Mutex<RefCell<Option<LogChannel<T, N>>>>,
}

impl<T, const N: usize> SharedLogChannel<T, N> {
    /// Creates an uninitialized shared channel.
    pub const fn new() -> Self {
        Self {
            inner: Mutex::new(RefCell::new(None)),
        }
    }

    /// Installs `channel`, returning the previously installed one.
    pub fn init(&self, channel: LogChannel<T, N>) -> Option<LogChannel<T, N>> {
        critical_section::with(|cs| self.inner.borrow_ref_mut(cs).replace(channel))
    }

    /// Removes the installed channel.
    pub fn take(&self) -> Option<LogChannel<T, N>> {
        critical_section::with(|cs| self.inner.borrow_ref_mut(cs).take())
    }

    /// Runs `f` on the installed channel inside a critical section.
    ///
    /// Returns `None` if no channel is installed, or if called re-entrantly from within `f`.
    pub fn with<R>(&self, f: impl FnOnce(&mut LogChannel<T, N>) -> R) -> Option<R> {
        critical_section::with(|cs| {
            let mut slot = self.inner.borrow(cs).try_borrow_mut().ok()?;
            slot.as_mut().map(f)
        })
    }
}

impl<T, const N: usize> core::fmt::Debug for SharedLogChannel<T, N> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("SharedLogChannel").finish_non_exhaustive()
    }
}

impl<T, const N: usize> Default for SharedLogChannel<T, N> {
    fn default() -> Self {
        Self::new()
    }
}
