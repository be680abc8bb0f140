//! Message severities and their single-byte wire tags.

/// Tag sent for levels outside the known [`Severity`] range.
pub const UNKNOWN_TAG: u8 = b'u';

/// The criticality of a log message.
///
/// The discriminants match the integer values embedded callers traditionally pass around, which [`Level`] accepts
/// through its `From<i32>` implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(u8)]
pub enum Severity {
    /// Verbose diagnostic output.
    Debug = 0,
    /// Normal operation.
    Info = 1,
    /// Something unexpected that the application can cope with.
    Warning = 2,
    /// An operation failed.
    Error = 3,
    /// The application may not be able to continue.
    Critical = 4,
}

impl Severity {
    /// Number of severities; raw values at or above this are unknown.
    pub const COUNT: usize = 5;

    /// All severities, ordered from least to most critical.
    pub const ALL: [Severity; Self::COUNT] = [
        Severity::Debug,
        Severity::Info,
        Severity::Warning,
        Severity::Error,
        Severity::Critical,
    ];

    /// Returns the wire tag of this severity.
    pub const fn tag(self) -> u8 {
        match self {
            Severity::Debug => b'D',
            Severity::Info => b'I',
            Severity::Warning => b'W',
            Severity::Error => b'E',
            Severity::Critical => b'C',
        }
    }

    /// Returns the severity carrying `tag`, if any.
    pub const fn from_tag(tag: u8) -> Option<Self> {
        Some(match tag {
            b'D' => Severity::Debug,
            b'I' => Severity::Info,
            b'W' => Severity::Warning,
            b'E' => Severity::Error,
            b'C' => Severity::Critical,
            _ => return None,
        })
    }
}

/// The level a message is emitted with.
///
/// Unlike [`Severity`], a level can be out of range, which happens when it is built from a raw integer.
/// Every level has a tag, unknown ones are sent as [`UNKNOWN_TAG`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Level {
    /// One of the defined severities.
    Known(Severity),
    /// A value outside the defined severities.
    Unknown,
}

impl Level {
    /// Returns the wire tag of this level.
    ///
    /// # Examples
    ///
    /// ```
    /// use uart_log::{Level, Severity};
    ///
    /// assert_eq!(Level::from(Severity::Error).tag(), b'E');
    /// assert_eq!(Level::from(99).tag(), b'u');
    /// ```
    pub const fn tag(self) -> u8 {
        match self {
            Level::Known(severity) => severity.tag(),
            Level::Unknown => UNKNOWN_TAG,
        }
    }

    /// Returns the level carrying `tag`, if the tag is part of the wire protocol.
    pub const fn from_tag(tag: u8) -> Option<Self> {
        match Severity::from_tag(tag) {
            Some(severity) => Some(Level::Known(severity)),
            None if tag == UNKNOWN_TAG => Some(Level::Unknown),
            None => None,
        }
    }

    /// Returns the severity, if this level is known.
    pub const fn severity(self) -> Option<Severity> {
        match self {
            Level::Known(severity) => Some(severity),
            Level::Unknown => None,
        }
    }
}

impl From<Severity> for Level {
    fn from(severity: Severity) -> Self {
        Level::Known(severity)
    }
}

impl From<i32> for Level {
    fn from(raw: i32) -> Self {
        usize::try_from(raw)
            .ok()
            .and_then(|index| Severity::ALL.get(index))
            .map_or(Level::Unknown, |&severity| Level::Known(severity))
    }
}
