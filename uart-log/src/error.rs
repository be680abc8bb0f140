/// An error that prevented a message from being formatted for the wire.
///
/// Nothing is transmitted when this is returned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum FormatError {
    /// The tagged message does not fit in the channel buffer.
    #[error("formatted message needs {required} bytes but the buffer holds {capacity}")]
    TooLong {
        /// Bytes the full wire message would occupy.
        required: usize,
        /// Capacity of the channel buffer.
        capacity: usize,
    },
    /// A formatting implementation of one of the arguments reported an error.
    #[error("message formatting failed")]
    Formatter,
}
