//! Error types that can be emitted from this library

use miette::Diagnostic;
use thiserror::Error;

/// Error type for library
#[derive(Error, Diagnostic, Debug)]
pub enum Error {
    /// Transparent warpper for [`std::io::Error`]
    #[error(transparent)]
    IOError(#[from] std::io::Error),

    /// A read or seek left the bounds of the underlying stream
    #[error("{count} bytes at offset {offset:#x} are out of bounds for a stream of length {len:#x}")]
    OutOfBounds { offset: u64, count: u64, len: u64 },

    /// A value read from the stream did not match one of the constants the format requires
    #[error("expected {expected} at offset {offset:#x}, found {actual}")]
    AssertionFailed {
        offset: u64,
        expected: String,
        actual: String,
    },

    /// An integer read from the stream has no matching enum variant
    #[error("{value} at offset {offset:#x} is not a valid {name}")]
    InvalidEnum {
        offset: u64,
        name: &'static str,
        value: String,
    },

    /// [`crate::read::BinaryReader::step_out`] or [`crate::write::BinaryWriter::step_out`]
    /// was called without a matching `step_in`
    #[error("step out called with an empty position stack")]
    StepOutOfEmptyStack,

    /// A reservation with the same name and kind is still waiting to be filled
    #[error("reservation {0} is already pending")]
    DuplicateReservation(String),

    /// The reservation handle was produced by a different writer
    #[error("reservation does not belong to this writer")]
    ForeignReservation,

    /// The reservation has already been filled
    #[error("reservation {0} has already been filled")]
    AlreadyFilled(String),

    /// The writer was finished while reservations were still pending
    #[error("unfilled reservations: {}", .0.join(", "))]
    UnfilledReservations(Vec<String>),

    /// The value given to a varint reservation does not fit its width
    #[error("varint {value} does not fit in {width} bytes")]
    VarintOverflow { value: i64, width: usize },

    /// The bytes given to a byte reservation are not the reserved length
    #[error("reservation {name} holds {width} bytes, got {actual}")]
    ReservationWidth {
        name: String,
        width: usize,
        actual: usize,
    },

    /// Text could not be represented in the requested encoding
    #[error("unable to encode {0:?} as {1}")]
    EncodingFailed(String, &'static str),

    /// Bytes are not valid text in the requested encoding
    #[error("unable to decode {0} text")]
    DecodingFailed(&'static str),

    /// The stream ended before a string terminator was found
    #[error("string starting at offset {0:#x} has no terminator")]
    UnterminatedString(u64),
}

/// Generic result type with crate's Error as its error variant
pub type Result<T> = core::result::Result<T, Error>;
