//! Timeouts handed to the transmit primitive.

use core::fmt;

/// The timeout a [`LogChannel`](crate::LogChannel) passes to its transmitter when none is configured.
pub const DEFAULT_TIMEOUT: Timeout = Timeout::from_millis(0xFFFF);

/// How long a blocking transmit may wait before giving up, with millisecond precision.
#[derive(Default, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timeout {
    millis: u32,
}

impl Timeout {
    /// The longest timeout, which most serial drivers treat as "wait forever".
    ///
    /// # Examples
    ///
    /// ```
    /// use uart_log::Timeout;
    ///
    /// assert!(Timeout::MAX.is_max());
    /// assert_eq!(Timeout::MAX, Timeout::from_millis(u32::MAX));
    /// ```
    pub const MAX: Timeout = Timeout { millis: u32::MAX };

    /// Do not wait at all.
    pub const ZERO: Timeout = Timeout { millis: 0 };

    /// Creates a timeout from the specified number of milliseconds.
    pub const fn from_millis(millis: u32) -> Timeout {
        Timeout { millis }
    }

    /// Creates a timeout from the specified number of seconds, saturating at [`Timeout::MAX`].
    ///
    /// # Examples
    ///
    /// ```
    /// use uart_log::Timeout;
    ///
    /// assert_eq!(Timeout::from_secs(2), Timeout::from_millis(2000));
    /// assert_eq!(Timeout::from_secs(u32::MAX), Timeout::MAX);
    /// ```
    pub const fn from_secs(secs: u32) -> Timeout {
        Timeout {
            millis: secs.saturating_mul(1000),
        }
    }

    /// Returns the total amount of milliseconds.
    pub const fn as_millis(&self) -> u32 {
        self.millis
    }

    /// Returns whether this is [`Timeout::MAX`].
    pub const fn is_max(&self) -> bool {
        self.millis == u32::MAX
    }
}

impl From<Timeout> for core::time::Duration {
    fn from(timeout: Timeout) -> Self {
        core::time::Duration::from_millis(u64::from(timeout.millis))
    }
}

impl fmt::Debug for Timeout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_max() {
            f.write_str("Timeout::MAX")
        } else {
            write!(f, "{}ms", self.millis)
        }
    }
}
