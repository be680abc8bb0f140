//! Wire framing shared by the sending and the listening side.
//!
//! ```txt
//! | tag | ' ' | text ...       | '\r' |   log message
//! | "is_present"               | '\r' |   presence heartbeat
//! | "end"                      | '\r' |   shutdown notice
//! ```
//!
//! Frames carry no length prefix or checksum; the carriage return is the only delimiter.

use core::borrow::{Borrow, BorrowMut};

use crate::severity::Level;

/// Terminates every frame.
pub const TERMINATOR: u8 = b'\r';

/// The presence heartbeat, including its terminator.
pub const PRESENCE: &[u8] = b"is_present\r";

/// The shutdown notice, including its terminator.
pub const SHUTDOWN: &[u8] = b"end\r";

/// A decoded frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Frame<'a> {
    /// A tagged log message.
    Log {
        /// Level decoded from the tag.
        level: Level,
        /// Message text without tag and terminator.
        text: &'a str,
    },
    /// The sender is alive.
    Presence,
    /// The sender stops logging.
    Shutdown,
}

impl Frame<'_> {
    /// Returns the number of bytes this frame occupies on the wire, terminator included.
    pub fn encoded_len(&self) -> usize {
        match self {
            Frame::Log { text, .. } => 2 + text.len() + 1,
            Frame::Presence => PRESENCE.len(),
            Frame::Shutdown => SHUTDOWN.len(),
        }
    }
}

/// An error while decoding a frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    /// A terminator arrived without any content.
    #[error("empty frame")]
    Empty,
    /// The frame outgrew the decoder storage, the rest of it is discarded.
    #[error("frame exceeds {capacity} bytes")]
    TooLong {
        /// Size of the decoder storage.
        capacity: usize,
    },
    /// The frame content is not valid UTF-8.
    #[error("frame is not valid UTF-8")]
    Utf8,
    /// The frame is neither a tagged message nor a control literal.
    #[error("undefined frame")]
    Undefined,
}

/// Splits a byte stream into [`Frame`]s.
///
/// Frame content is collected in caller-provided storage, which bounds the longest accepted frame.
///
/// # Examples
///
/// ```
/// use uart_log::frame::{Frame, FrameDecoder};
/// use uart_log::{Level, Severity};
///
/// let mut decoder = FrameDecoder::new([0; 64]);
/// let mut frames = 0;
///
/// for &byte in b"W battery low\ris_present\r" {
///     match decoder.push(byte) {
///         Some(Ok(Frame::Log { level, text })) => {
///             assert_eq!(level, Level::Known(Severity::Warning));
///             assert_eq!(text, "battery low");
///             frames += 1;
///         }
///         Some(Ok(frame)) => {
///             assert_eq!(frame, Frame::Presence);
///             frames += 1;
///         }
///         Some(Err(error)) => panic!("{error}"),
///         None => {}
///     }
/// }
///
/// assert_eq!(frames, 2);
/// ```
#[derive(Debug)]
pub struct FrameDecoder<B> {
    storage: B,
    len: usize,
    state: State,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Collecting bytes of the current frame.
    Collecting,
    /// The previous call returned a frame borrowing the storage; start over on the next byte.
    Complete,
    /// The current frame overflowed; drop bytes until the terminator.
    Discarding,
}

impl<B> FrameDecoder<B>
where
    B: BorrowMut<[u8]>,
{
    /// Creates a decoder collecting frames in `storage`.
    pub fn new(storage: B) -> Self {
        Self {
            storage,
            len: 0,
            state: State::Collecting,
        }
    }

    /// Returns the longest frame content, without terminator, this decoder accepts.
    pub fn capacity(&self) -> usize {
        self.bytes().len()
    }

    /// Returns whether no frame is partially received.
    pub fn is_idle(&self) -> bool {
        match self.state {
            State::Collecting => self.len == 0,
            State::Complete => true,
            State::Discarding => false,
        }
    }

    /// Drops any partially received frame.
    pub fn reset(&mut self) {
        self.len = 0;
        self.state = State::Collecting;
    }

    /// Feeds one byte into the decoder.
    ///
    /// Returns `None` while a frame is in progress. A frame that does not fit produces a single
    /// [`DecodeError::TooLong`] as soon as it overflows; its remaining bytes up to the terminator are skipped.
    pub fn push(&mut self, byte: u8) -> Option<Result<Frame<'_>, DecodeError>> {
        if self.state == State::Complete {
            self.reset();
        }

        if self.state == State::Discarding {
            if byte == TERMINATOR {
                self.reset();
            }
            return None;
        }

        if byte == TERMINATOR {
            self.state = State::Complete;
            let len = self.len;
            return Some(parse(&self.bytes()[..len]));
        }

        let capacity = self.capacity();
        if self.len == capacity {
            self.len = 0;
            self.state = State::Discarding;
            return Some(Err(DecodeError::TooLong { capacity }));
        }

        let len = self.len;
        self.bytes_mut()[len] = byte;
        self.len += 1;
        None
    }

    fn bytes(&self) -> &[u8] {
        Borrow::<[u8]>::borrow(&self.storage)
    }

    fn bytes_mut(&mut self) -> &mut [u8] {
        BorrowMut::<[u8]>::borrow_mut(&mut self.storage)
    }
}

/// Parses frame content, without terminator.
fn parse(content: &[u8]) -> Result<Frame<'_>, DecodeError> {
    if content.is_empty() {
        return Err(DecodeError::Empty);
    }
    let content = core::str::from_utf8(content).map_err(|_| DecodeError::Utf8)?;

    match content {
        "is_present" => return Ok(Frame::Presence),
        "end" => return Ok(Frame::Shutdown),
        _ => {}
    }

    match content.as_bytes() {
        [tag, b' ', ..] => {
            let level = Level::from_tag(*tag).ok_or(DecodeError::Undefined)?;
            Ok(Frame::Log {
                level,
                text: &content[2..],
            })
        }
        _ => Err(DecodeError::Undefined),
    }
}
