//! Shared entry points for every concrete file format.
//!
//! A format implements [`SoulsFormat`] to describe its own structure; the free functions in this
//! module take care of the DCX envelope around it so that a file is always written back with the
//! compression it was read with.

use std::fs;
use std::io::{Read, Seek, Write};
use std::path::Path;

use souls_io::{BinaryReader, BinaryWriter, CodecOptions};
use tracing::{debug, instrument};

use crate::dcx::{self, Compression};
use crate::error::Result;

/// A file format that can be probed, read and written through the binary codec
pub trait SoulsFormat: Sized {
    /// Options the reader and writer start with
    fn options() -> CodecOptions {
        CodecOptions::default()
    }

    /// Whether the stream holds this format, usually by checking its magic
    fn is_format<R: Read + Seek>(reader: &mut BinaryReader<R>) -> bool;

    /// Reads the structure from an uncompressed stream
    fn read_body<R: Read + Seek>(reader: &mut BinaryReader<R>) -> Result<Self>;

    /// Writes the structure to an uncompressed stream
    fn write_body<W: Write + Seek>(&self, writer: &mut BinaryWriter<W>) -> Result<()>;

    /// Checks the structure before anything is written
    ///
    /// Return [`crate::error::Error::ValidationFailed`] describing the problem.
    fn validate(&self) -> Result<()> {
        Ok(())
    }

    /// Compression the value was read with, reapplied by [`write`]
    fn compression(&self) -> Compression;

    fn set_compression(&mut self, compression: Compression);
}

/// Whether `data` holds a `T`, looking through any DCX wrapper.
pub fn is<T: SoulsFormat>(data: &[u8]) -> Result<bool> {
    let (data, _) = dcx::decompress(data)?;
    let mut reader = BinaryReader::from_bytes_with_options(&data, T::options());
    Ok(T::is_format(&mut reader))
}

/// Reads a `T`, remembering its compression.
#[instrument(skip(data), fields(len = data.len()), err)]
pub fn read<T: SoulsFormat>(data: &[u8]) -> Result<T> {
    let (data, compression) = dcx::decompress(data)?;
    read_decompressed(&data, compression)
}

fn read_decompressed<T: SoulsFormat>(data: &[u8], compression: Compression) -> Result<T> {
    let mut reader = BinaryReader::from_bytes_with_options(data, T::options());
    let mut value = T::read_body(&mut reader)?;
    value.set_compression(compression);
    debug!(%compression, "read {} bytes", data.len());
    Ok(value)
}

/// Reads a `T` if `data` holds one, decompressing only once.
#[instrument(skip(data), fields(len = data.len()), err)]
pub fn is_read<T: SoulsFormat>(data: &[u8]) -> Result<Option<T>> {
    let (data, compression) = dcx::decompress(data)?;
    let mut reader = BinaryReader::from_bytes_with_options(&data, T::options());
    if !T::is_format(&mut reader) {
        return Ok(None);
    }
    read_decompressed(&data, compression).map(Some)
}

/// Validates and writes `value` with the compression it was read with.
pub fn write<T: SoulsFormat>(value: &T) -> Result<Vec<u8>> {
    write_with(value, value.compression())
}

/// Validates and writes `value` with an explicit compression.
#[instrument(skip(value), err)]
pub fn write_with<T: SoulsFormat>(value: &T, compression: Compression) -> Result<Vec<u8>> {
    value.validate()?;

    let mut writer = BinaryWriter::in_memory(T::options());
    value.write_body(&mut writer)?;
    let data = writer.into_bytes()?;

    debug!(%compression, "wrote {} bytes", data.len());
    dcx::compress(&data, compression)
}

/// Reads a `T` from a file.
pub fn read_file<T: SoulsFormat>(path: impl AsRef<Path>) -> Result<T> {
    read(&fs::read(path)?)
}

/// Writes `value` to a file with the compression it was read with.
pub fn write_file<T: SoulsFormat>(value: &T, path: impl AsRef<Path>) -> Result<()> {
    let data = write(value)?;
    fs::write(path, data)?;
    Ok(())
}
