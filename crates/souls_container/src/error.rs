//! Error types that can be emitted from this library

use miette::Diagnostic;
use thiserror::Error;

/// Error type for library
#[derive(Error, Diagnostic, Debug)]
pub enum Error {
    /// Transparent warpper for [`std::io::Error`]
    #[error(transparent)]
    IOError(#[from] std::io::Error),

    /// Transparent warpper for [`binrw::Error`]
    #[error(transparent)]
    BinRWError(#[from] binrw::Error),

    /// Transparent warpper for [`souls_io::error::Error`]
    #[error(transparent)]
    #[diagnostic(transparent)]
    Codec(#[from] souls_io::error::Error),

    /// The Adler-32 trailing a zlib frame does not match the inflated data
    #[error("zlib checksum mismatch: stored {stored:#010x}, computed {computed:#010x}")]
    ChecksumMismatch { stored: u32, computed: u32 },

    /// A zlib frame is too short to hold its header and checksum
    #[error("zlib frame of {0} bytes is too short")]
    FrameTooShort(usize),

    /// The size declared by a container header differs from the decompressed data
    #[error("container declares {declared} bytes but holds {actual}")]
    SizeMismatch { declared: u64, actual: u64 },

    /// A payload is too large for the 32-bit size fields of a container header
    #[error("{0} bytes do not fit in a 32-bit size field")]
    PayloadTooLarge(u64),

    /// The container uses a compression this library cannot process
    #[error("unsupported compression {0}")]
    #[diagnostic(help("only DFLT compressed DCX containers are supported"))]
    UnsupportedCompression(String),

    /// AES keys must be 16, 24 or 32 bytes
    #[error("invalid key length {0}, expected 16, 24 or 32 bytes")]
    InvalidKeyLength(usize),

    /// Unpadded encryption requires whole blocks
    #[error("{0} bytes is not a multiple of the 16 byte block size")]
    UnalignedData(usize),

    /// Decrypted data does not end in valid padding, usually because the key is wrong
    #[error("decrypted data has invalid padding")]
    InvalidPadding,

    /// A format rejected its own contents before writing
    #[error("validation failed: {0}")]
    ValidationFailed(String),
}

/// Generic result type with crate's Error as its error variant
pub type Result<T> = core::result::Result<T, Error>;
