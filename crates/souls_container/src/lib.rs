//! This library handles the containers wrapped around FromSoftware asset files and the entry points
//! shared by every format built on [`souls_io`].
//!
//! # Container Format Documentation
//!
//! Asset files rarely sit on disk as their bare structure. They are compressed, encrypted, or both,
//! and a tool must write them back in the same envelope they were read from.
//!
//! ## DCX
//!
//! A DCX file wraps one compressed payload. All fields are big endian.
//!
//! | Offset (bytes) | Field                  | Description                                                |
//! |----------------|------------------------|------------------------------------------------------------|
//! | 0x0000         | Magic number           | 4 bytes: "DCX\0"                                           |
//! | 0x0004         | Version                | 4 bytes: 0x10000 or 0x11000                                |
//! | 0x0008         | Header constants       | 4 bytes each: 0x18, 0x24                                   |
//! | 0x0010         | Header sizes           | 4 bytes each: 0x24/0x2C or 0x44/0x4C                       |
//! | 0x0018         | Size block             | "DCS\0", uncompressed size, compressed size                |
//! | 0x0024         | Parameter block        | "DCP\0", algorithm ("DFLT"), 0x20, level, flags, 0x10100   |
//! | 0x0044         | Data block             | "DCA\0", 8                                                 |
//! | 0x004C         | Payload                | Zlib frame of the compressed size                          |
//!
//! Only the `DFLT` algorithm is supported. See [`dcx::DfltVariant`] for the combinations of header
//! values in use.
//!
//! ## Zlib Frame
//!
//! - **Header**: `0x78` followed by one of `0x01`, `0x5E`, `0x9C`, `0xDA`.
//! - **Body**: raw deflate data.
//! - **Trailer**: Adler-32 of the uncompressed data, in the byte order of the surrounding stream.
//!
//! ## Encrypted Containers
//!
//! | Container     | Layout                                          | Cipher              |
//! |---------------|-------------------------------------------------|---------------------|
//! | Save entry    | MD5 (16) + IV (16) + ciphertext                 | AES-CBC, no padding |
//! | Regulation    | IV (16) + ciphertext, DCX inside                | AES-CBC, PKCS#7     |
//!
//! ## Path Hashes
//!
//! Paths are lowercased, given forward slashes and a leading slash, then folded over their UTF-16
//! code units with a multiplier of 37 (32-bit) or 0x85 (64-bit).
//!

pub mod crypto;
pub mod dcx;
pub mod error;
pub mod format;
pub mod hash;
pub mod zlib;

pub use dcx::{Compression, DfltVariant};
pub use format::SoulsFormat;
