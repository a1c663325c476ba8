//! This library provides the byte-level codec shared by the FromSoftware asset formats.
//!
//! # Binary Codec Documentation
//!
//! Every asset format (parameter tables, archives, models, save files) is a tree of fixed-width
//! values, strings and offsets. This crate supplies the two halves used to process them:
//!
//! - [`BinaryReader`] decodes primitives, strings and aggregates from any seekable stream, checks
//!   the constants a format requires, and can visit an offset and come back through a position stack.
//! - [`BinaryWriter`] encodes the same values and can **reserve** a slot for a value that is only
//!   known later, such as an offset to a block that has not been written yet.
//!
//! ## Stream Options
//!
//! | Option         | Values                    | Default  | Applies to                           |
//! |----------------|---------------------------|----------|--------------------------------------|
//! | Endianness     | `Little`, `Big`           | `Little` | Every multi-byte value               |
//! | Varint width   | `Four`, `Eight`           | `Four`   | `read_varint`, `write_varint`        |
//!
//! Both options can change mid-stream, which formats use when a header flag selects the byte order of
//! the rest of the file.
//!
//! ## Reservations
//!
//! | Kind           | Reserve                         | Fill                         | Slot width          |
//! |----------------|---------------------------------|------------------------------|---------------------|
//! | Primitive      | `reserve::<T>(name)`            | `fill(handle, value)`        | `T`                 |
//! | Varint         | `reserve_varint(name)`          | `fill_varint(handle, value)` | Varint width        |
//! | Bytes          | `reserve_bytes(name, len)`      | `fill_bytes(handle, bytes)`  | `len`               |
//!
//! - A reserved slot holds `0xFE` bytes until it is filled.
//! - Filling writes at the slot and returns to the current position.
//! - A fill uses the byte order that was active when the slot was reserved.
//! - [`BinaryWriter::finish`] fails and lists every unfilled slot by name.
//!
//! ## Text
//!
//! Strings are either fixed-width fields or null terminated, in ASCII, Shift-JIS or UTF-16 of
//! either byte order. See [`TextEncoding`].
//!

pub mod error;
pub mod primitive;
pub mod read;
pub mod text;
pub mod types;
pub mod write;

pub use primitive::{CodecOptions, Endian, Primitive, VarintWidth};
pub use read::BinaryReader;
pub use text::TextEncoding;
pub use types::{Color, Vec2, Vec3, Vec4};
pub use write::{BinaryWriter, Bytes, Reservation, Varint, RESERVED_BYTE};
