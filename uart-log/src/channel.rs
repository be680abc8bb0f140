use core::fmt::{self, Write};

use crate::error::FormatError;
use crate::frame::{PRESENCE, SHUTDOWN};
use crate::severity::Level;
use crate::time::{DEFAULT_TIMEOUT, Timeout};
use crate::transmit::{Delivery, Transmit};

/// Buffer capacity of a [`LogChannel`] when none is specified, in bytes.
pub const DEFAULT_CAPACITY: usize = 100;

/// Formats tagged messages into a fixed-capacity buffer and sends them through a [`Transmit`] implementation.
///
/// The buffer is owned by the channel and reused for every message. All emitting operations take `&mut self`, so a
/// channel shared between execution contexts has to be serialized by the owner, for example with
/// [`SharedLogChannel`](crate::shared::SharedLogChannel) or a mutex.
///
/// `N` is the buffer capacity and bounds the full wire message: tag, space, text and terminator.
#[derive(Debug)]
pub struct LogChannel<T, const N: usize = DEFAULT_CAPACITY> {
    transmit: T,
    timeout: Timeout,
    buffer: [u8; N],
}

impl<T, const N: usize> LogChannel<T, N>
where
    T: Transmit,
{
    /// Creates a channel that waits up to [`DEFAULT_TIMEOUT`] for every transmission.
    pub fn new(transmit: T) -> Self {
        Self::with_timeout(transmit, DEFAULT_TIMEOUT)
    }

    /// Creates a channel that waits up to `timeout` for every transmission.
    pub fn with_timeout(transmit: T, timeout: Timeout) -> Self {
        Self {
            transmit,
            timeout,
            buffer: [0; N],
        }
    }

    /// Sends `message` tagged with `level` as `"<tag> <message>\r"`.
    ///
    /// Returns [`FormatError`] without transmitting anything if the wire message does not fit in `N` bytes. Otherwise
    /// the message is transmitted exactly once and the transmitter's outcome is returned as a [`Delivery`].
    ///
    /// # Examples
    ///
    /// ```
    /// # use uart_log::{LogChannel, Severity, Timeout, Transmit};
    /// # #[derive(Default)]
    /// # struct Uart(Vec<u8>);
    /// # impl Transmit for Uart {
    /// #     type Error = ();
    /// #     fn transmit(&mut self, bytes: &[u8], _: Timeout) -> Result<(), ()> {
    /// #         self.0.extend_from_slice(bytes);
    /// #         Ok(())
    /// #     }
    /// # }
    /// let mut channel: LogChannel<_> = LogChannel::new(Uart::default());
    ///
    /// channel.emit("x", 99)?;
    /// assert_eq!(channel.transmit_mut().0, b"u x\r");
    /// # Ok::<(), uart_log::FormatError>(())
    /// ```
    pub fn emit(
        &mut self,
        message: &str,
        level: impl Into<Level>,
    ) -> Result<Delivery<T::Error>, FormatError> {
        self.emit_fmt(level, format_args!("{message}"))
    }

    /// Like [`emit`](Self::emit), with the message text produced by `args`.
    ///
    /// ```
    /// # use uart_log::{LogChannel, Severity, Timeout, Transmit};
    /// # #[derive(Default)]
    /// # struct Uart(Vec<u8>);
    /// # impl Transmit for Uart {
    /// #     type Error = ();
    /// #     fn transmit(&mut self, bytes: &[u8], _: Timeout) -> Result<(), ()> {
    /// #         self.0.extend_from_slice(bytes);
    /// #         Ok(())
    /// #     }
    /// # }
    /// let mut channel: LogChannel<_> = LogChannel::new(Uart::default());
    ///
    /// channel.emit_fmt(Severity::Info, format_args!("vbat={}mV", 3712))?;
    /// assert_eq!(channel.transmit_mut().0, b"I vbat=3712mV\r");
    /// # Ok::<(), uart_log::FormatError>(())
    /// ```
    pub fn emit_fmt(
        &mut self,
        level: impl Into<Level>,
        args: fmt::Arguments<'_>,
    ) -> Result<Delivery<T::Error>, FormatError> {
        let tag = char::from(level.into().tag());

        let mut writer = BoundedWriter::new(&mut self.buffer);
        write!(writer, "{tag} {args}\r").map_err(|_| FormatError::Formatter)?;
        let required = writer.required;

        if required > N {
            return Err(FormatError::TooLong {
                required,
                capacity: N,
            });
        }

        Ok(Delivery::new(
            self.transmit
                .transmit(&self.buffer[..required], self.timeout),
        ))
    }

    /// Sends the `is_present\r` heartbeat.
    ///
    /// Meant to be called periodically by a timer owned by the application.
    pub fn emit_presence(&mut self) -> Delivery<T::Error> {
        Delivery::new(self.transmit.transmit(PRESENCE, self.timeout))
    }

    /// Sends the `end\r` notice telling the remote listener that logging stops.
    pub fn emit_shutdown(&mut self) -> Delivery<T::Error> {
        Delivery::new(self.transmit.transmit(SHUTDOWN, self.timeout))
    }
}

impl<T, const N: usize> LogChannel<T, N> {
    /// Returns the buffer capacity in bytes.
    pub const fn capacity(&self) -> usize {
        N
    }

    /// Returns the timeout passed to every transmission.
    pub fn timeout(&self) -> Timeout {
        self.timeout
    }

    /// Returns the underlying transmitter.
    pub fn transmit_mut(&mut self) -> &mut T {
        &mut self.transmit
    }

    /// Consumes the channel, returning the underlying transmitter.
    pub fn into_inner(self) -> T {
        self.transmit
    }
}

/// A [`fmt::Write`] sink that stores at most `buffer.len()` bytes but counts everything written to it.
struct BoundedWriter<'a> {
    buffer: &'a mut [u8],
    /// Bytes the full output needs, which may exceed the buffer length.
    required: usize,
}

impl<'a> BoundedWriter<'a> {
    fn new(buffer: &'a mut [u8]) -> Self {
        Self {
            buffer,
            required: 0,
        }
    }
}

impl Write for BoundedWriter<'_> {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        let start = self.required.min(self.buffer.len());
        let count = s.len().min(self.buffer.len() - start);

        self.buffer[start..start + count].copy_from_slice(&s.as_bytes()[..count]);
        self.required = self.required.saturating_add(s.len());

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use core::fmt;
    use std::string::String;
    use std::vec::Vec;
    use std::{format, vec};

    use pretty_assertions::assert_eq;
    use test_case::test_case;

    use super::{BoundedWriter, DEFAULT_CAPACITY, LogChannel};
    use crate::frame::{Frame, FrameDecoder};
    use crate::{DEFAULT_TIMEOUT, FormatError, Level, Severity, Timeout, Transmit};

    /// Records every transmission instead of sending it.
    #[derive(Debug, Default)]
    struct Recorder {
        sent: Vec<(Vec<u8>, Timeout)>,
        fail: bool,
    }

    impl Recorder {
        fn wire(&self) -> Vec<u8> {
            self.sent.iter().flat_map(|(bytes, _)| bytes.clone()).collect()
        }
    }

    #[derive(Debug, Clone, PartialEq, Eq)]
    struct LinkDown;

    impl Transmit for Recorder {
        type Error = LinkDown;

        fn transmit(&mut self, bytes: &[u8], timeout: Timeout) -> Result<(), Self::Error> {
            self.sent.push((bytes.to_vec(), timeout));
            if self.fail { Err(LinkDown) } else { Ok(()) }
        }
    }

    fn channel() -> LogChannel<Recorder> {
        LogChannel::new(Recorder::default())
    }

    #[test_case(Severity::Debug, "D booting\r")]
    #[test_case(Severity::Info, "I booting\r")]
    #[test_case(Severity::Warning, "W booting\r")]
    #[test_case(Severity::Error, "E booting\r")]
    #[test_case(Severity::Critical, "C booting\r")]
    fn tags_every_severity(severity: Severity, expected: &str) {
        let mut channel = channel();

        let delivery = channel.emit("booting", severity).unwrap();

        assert!(delivery.is_delivered());
        assert_eq!(channel.transmit_mut().wire(), expected.as_bytes());
    }

    #[test]
    fn battery_low_warning() {
        let mut channel = channel();

        channel.emit("battery low", Severity::Warning).unwrap();

        let recorder = channel.into_inner();
        assert_eq!(recorder.sent.len(), 1);
        assert_eq!(recorder.sent[0].0, b"W battery low\r");
        assert_eq!(recorder.sent[0].0.len(), 2 + "battery low".len() + 1);
        assert_eq!(recorder.sent[0].1, DEFAULT_TIMEOUT);
    }

    #[test_case(99)]
    #[test_case(5)]
    #[test_case(-3)]
    fn invalid_level_is_tagged_unknown(raw: i32) {
        let mut channel = channel();

        channel.emit("x", raw).unwrap();

        assert_eq!(channel.transmit_mut().wire(), b"u x\r");
    }

    #[test]
    fn oversized_message_is_not_sent() {
        let mut channel = channel();
        let message = "a".repeat(101);

        let error = channel.emit(&message, Severity::Error).unwrap_err();

        assert_eq!(
            error,
            FormatError::TooLong {
                required: 104,
                capacity: DEFAULT_CAPACITY,
            }
        );
        assert!(channel.transmit_mut().sent.is_empty());
    }

    #[test]
    fn message_filling_the_buffer_exactly_is_sent() {
        let mut channel = channel();
        let message = "m".repeat(DEFAULT_CAPACITY - 3);

        channel.emit(&message, Severity::Info).unwrap();

        let wire = channel.transmit_mut().wire();
        assert_eq!(wire.len(), DEFAULT_CAPACITY);
        assert_eq!(wire, format!("I {message}\r").into_bytes());
    }

    #[test]
    fn one_byte_over_capacity_is_rejected() {
        let mut channel = channel();
        let message = "m".repeat(DEFAULT_CAPACITY - 2);

        assert!(channel.emit(&message, Severity::Info).is_err());
        assert!(channel.transmit_mut().sent.is_empty());
    }

    #[test]
    fn rejection_does_not_leak_into_next_message() {
        let mut channel: LogChannel<_, 16> = LogChannel::new(Recorder::default());

        channel.emit("this does not fit at all", Severity::Debug).unwrap_err();
        channel.emit("fits", Severity::Debug).unwrap();

        assert_eq!(channel.transmit_mut().wire(), b"D fits\r");
    }

    #[test]
    fn repeated_emits_are_identical() {
        let mut channel = channel();

        channel.emit("same", Severity::Info).unwrap();
        channel.emit("same", Severity::Info).unwrap();

        let recorder = channel.into_inner();
        assert_eq!(recorder.sent.len(), 2);
        assert_eq!(recorder.sent[0], recorder.sent[1]);
    }

    #[test]
    fn shorter_message_after_longer_one_has_no_leftovers() {
        let mut channel = channel();

        channel.emit("a much longer message", Severity::Info).unwrap();
        channel.emit("short", Severity::Info).unwrap();

        assert_eq!(channel.into_inner().sent[1].0, b"I short\r");
    }

    #[test]
    fn message_bytes_are_sent_verbatim() {
        let mut channel = channel();

        channel.emit("temp 21°C, 100% {ok}", Severity::Info).unwrap();

        assert_eq!(
            channel.transmit_mut().wire(),
            "I temp 21°C, 100% {ok}\r".as_bytes()
        );
    }

    #[test]
    fn empty_message() {
        let mut channel = channel();

        channel.emit("", Severity::Debug).unwrap();

        assert_eq!(channel.transmit_mut().wire(), b"D \r");
    }

    #[test]
    fn presence_and_shutdown_literals() {
        let mut channel = channel();

        channel.emit_presence();
        channel.emit("in between", Severity::Info).unwrap();
        channel.emit_presence();
        channel.emit_shutdown();

        let recorder = channel.into_inner();
        let frames: Vec<&[u8]> = recorder.sent.iter().map(|(bytes, _)| &bytes[..]).collect();
        assert_eq!(
            frames,
            vec![
                &b"is_present\r"[..],
                &b"I in between\r"[..],
                &b"is_present\r"[..],
                &b"end\r"[..],
            ]
        );
        assert_eq!(recorder.sent[0].0.len(), 11);
        assert_eq!(recorder.sent[3].0.len(), 4);
    }

    #[test]
    fn configured_timeout_is_passed_through() {
        let timeout = Timeout::from_millis(250);
        let mut channel: LogChannel<_> = LogChannel::with_timeout(Recorder::default(), timeout);

        channel.emit("a", Severity::Info).unwrap();
        channel.emit_presence();
        channel.emit_shutdown();

        assert_eq!(channel.timeout(), timeout);
        assert!(channel.into_inner().sent.iter().all(|(_, t)| *t == timeout));
    }

    #[test]
    fn transmit_failure_is_reported_not_raised() {
        let mut channel: LogChannel<_> = LogChannel::new(Recorder {
            fail: true,
            ..Recorder::default()
        });

        let delivery = channel.emit("lost", Severity::Error).unwrap();
        assert!(!delivery.is_delivered());
        assert_eq!(delivery.error(), Some(&LinkDown));
    }

    #[test]
    fn formats_arguments_in_place() {
        let mut channel = channel();

        channel
            .emit_fmt(Severity::Info, format_args!("{}/{} tasks", 3, 4))
            .unwrap();

        assert_eq!(channel.transmit_mut().wire(), b"I 3/4 tasks\r");
    }

    #[test]
    fn failing_display_is_a_format_error() {
        struct Broken;

        impl fmt::Display for Broken {
            fn fmt(&self, _: &mut fmt::Formatter<'_>) -> fmt::Result {
                Err(fmt::Error)
            }
        }

        let mut channel = channel();

        let error = channel
            .emit_fmt(Severity::Info, format_args!("{}", Broken))
            .unwrap_err();

        assert_eq!(error, FormatError::Formatter);
        assert!(channel.transmit_mut().sent.is_empty());
    }

    #[test]
    fn borrowed_transmitter() {
        let mut recorder = Recorder::default();

        {
            let mut channel: LogChannel<_, 32> = LogChannel::new(&mut recorder);
            channel.emit("borrowed", Severity::Debug).unwrap();
            assert_eq!(channel.capacity(), 32);
        }

        assert_eq!(recorder.wire(), b"D borrowed\r");
    }

    #[test]
    fn bounded_writer_counts_past_capacity() {
        let mut buffer = [0; 4];
        let mut writer = BoundedWriter::new(&mut buffer);

        fmt::Write::write_str(&mut writer, "abc").unwrap();
        fmt::Write::write_str(&mut writer, "defg").unwrap();

        assert_eq!(writer.required, 7);
        assert_eq!(&buffer, b"abcd");
    }

    #[test]
    fn emitted_frames_decode_back() {
        let mut channel = channel();
        channel.emit("vbat low", Severity::Warning).unwrap();
        channel.emit_presence();
        channel.emit("?", 7).unwrap();
        channel.emit_shutdown();
        let wire = channel.into_inner().wire();

        let expected = [
            Frame::Log {
                level: Level::Known(Severity::Warning),
                text: "vbat low",
            },
            Frame::Presence,
            Frame::Log {
                level: Level::Unknown,
                text: "?",
            },
            Frame::Shutdown,
        ];
        let mut expected = expected.iter();
        let mut decoded_len = 0;

        let mut decoder = FrameDecoder::new([0; DEFAULT_CAPACITY]);
        for byte in wire.iter().copied() {
            if let Some(result) = decoder.push(byte) {
                let frame = result.unwrap();
                decoded_len += frame.encoded_len();
                assert_eq!(Some(&frame), expected.next());
            }
        }

        assert_eq!(expected.next(), None);
        assert_eq!(decoded_len, wire.len());
    }

    #[test]
    fn format_error_messages() {
        let error = FormatError::TooLong {
            required: 104,
            capacity: 100,
        };
        assert_eq!(
            format!("{error}"),
            String::from("formatted message needs 104 bytes but the buffer holds 100")
        );
    }
}
