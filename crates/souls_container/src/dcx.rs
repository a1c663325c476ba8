//! DCX wrapped container.
//!
//! A DCX file is a big endian header describing the compression followed by the compressed
//! payload. Only the `DFLT` (zlib) algorithm is handled; the header constants that differ between
//! game releases are captured by [`DfltVariant`] so that a file can be written back exactly as it
//! was read.

use std::fmt;
use std::io::{Read, Seek, Write};

use souls_io::{BinaryReader, BinaryWriter, CodecOptions, Endian};
use tracing::{debug, instrument};

use crate::error::{Error, Result};
use crate::zlib::{self, ZlibLevel};

/// Signature at the start of every DCX file
pub const DCX_MAGIC: &[u8; 4] = b"DCX\0";

/// Size of the DFLT header preceding the zlib frame
pub const DFLT_HEADER_LEN: usize = 0x4C;

/// Header constants of a DFLT compressed DCX, named after the release family that uses them
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum DfltVariant {
    /// Dark Souls: Prepare to Die Edition
    V10000_24_9,

    /// Dark Souls Remastered
    V10000_44_9,

    /// Dark Souls II: Scholar of the First Sin
    V11000_44_8,

    /// Dark Souls III and Sekiro
    V11000_44_9,

    /// Elden Ring and Armored Core VI
    V11000_44_9_15,
}

impl DfltVariant {
    pub const ALL: [DfltVariant; 5] = [
        DfltVariant::V10000_24_9,
        DfltVariant::V10000_44_9,
        DfltVariant::V11000_44_8,
        DfltVariant::V11000_44_9,
        DfltVariant::V11000_44_9_15,
    ];

    fn version(self) -> u32 {
        match self {
            DfltVariant::V10000_24_9 | DfltVariant::V10000_44_9 => 0x10000,
            _ => 0x11000,
        }
    }

    fn header_sizes(self) -> (u32, u32) {
        match self {
            DfltVariant::V10000_24_9 => (0x24, 0x2C),
            _ => (0x44, 0x4C),
        }
    }

    fn level(self) -> u8 {
        match self {
            DfltVariant::V11000_44_8 => 8,
            _ => 9,
        }
    }

    fn flags(self) -> u8 {
        match self {
            DfltVariant::V11000_44_9_15 => 0xF,
            _ => 0,
        }
    }

    fn from_header(version: u32, unk10: u32, level: u8, flags: u8) -> Option<Self> {
        DfltVariant::ALL.into_iter().find(|variant| {
            variant.version() == version
                && variant.header_sizes().0 == unk10
                && variant.level() == level
                && variant.flags() == flags
        })
    }
}

impl fmt::Display for DfltVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DfltVariant::V10000_24_9 => "DFLT 10000_24_9",
            DfltVariant::V10000_44_9 => "DFLT 10000_44_9",
            DfltVariant::V11000_44_8 => "DFLT 11000_44_8",
            DfltVariant::V11000_44_9 => "DFLT 11000_44_9",
            DfltVariant::V11000_44_9_15 => "DFLT 11000_44_9_15",
        };
        f.write_str(name)
    }
}

/// Compression envelope detected on read and reapplied on write
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Hash)]
pub enum Compression {
    /// Stored as it is
    #[default]
    None,

    /// Wrapped in a DFLT compressed DCX
    DcxDflt(DfltVariant),
}

impl fmt::Display for Compression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Compression::None => f.write_str("none"),
            Compression::DcxDflt(variant) => write!(f, "DCX {variant}"),
        }
    }
}

fn size_field(len: usize) -> Result<u32> {
    u32::try_from(len).map_err(|_| Error::PayloadTooLarge(len as u64))
}

fn big_endian() -> CodecOptions {
    CodecOptions::builder().endian(Endian::Big).build()
}

/// Whether `data` starts with a DCX header
pub fn is(data: &[u8]) -> bool {
    data.starts_with(DCX_MAGIC)
}

/// Reads a DFLT compressed DCX and returns the payload with the variant it was written with.
#[instrument(skip(reader), err)]
pub fn read_dcx<R: Read + Seek>(reader: &mut BinaryReader<R>) -> Result<(Vec<u8>, DfltVariant)> {
    reader.set_endian(Endian::Big);

    reader.assert_magic(DCX_MAGIC)?;
    let version = reader.assert_u32(&[0x10000, 0x11000])?;
    reader.assert_u32(&[0x18])?;
    reader.assert_u32(&[0x24])?;
    let unk10 = reader.assert_u32(&[0x24, 0x44])?;
    reader.assert_u32(&[0x2C, 0x4C])?;

    reader.assert_magic(b"DCS\0")?;
    let uncompressed = reader.read_u32()?;
    let compressed = reader.read_u32()?;

    reader.assert_magic(b"DCP\0")?;
    let algorithm = reader.read_bytes(4)?;
    if algorithm != b"DFLT" {
        return Err(Error::UnsupportedCompression(
            String::from_utf8_lossy(&algorithm).into_owned(),
        ));
    }
    reader.assert_u32(&[0x20])?;
    let level = reader.assert_u8(&[8, 9])?;
    reader.assert_pattern(3, 0)?;
    reader.assert_u32(&[0])?;
    let flags = reader.assert_u8(&[0, 0xF])?;
    reader.assert_pattern(3, 0)?;
    reader.assert_u32(&[0])?;
    reader.assert_u32(&[0x0001_0100])?;

    reader.assert_magic(b"DCA\0")?;
    reader.assert_u32(&[8])?;

    let variant = DfltVariant::from_header(version, unk10, level, flags).ok_or_else(|| {
        Error::UnsupportedCompression(format!(
            "DFLT {version:#x}_{unk10:#x}_{level}_{flags}"
        ))
    })?;

    let data = zlib::read_zlib(reader, compressed as usize)?;
    if data.len() as u64 != uncompressed as u64 {
        return Err(Error::SizeMismatch {
            declared: uncompressed as u64,
            actual: data.len() as u64,
        });
    }

    debug!(%variant, uncompressed, compressed, "read DCX");
    Ok((data, variant))
}

/// Writes `data` as a DFLT compressed DCX.
#[instrument(skip(writer, data), fields(len = data.len()), err)]
pub fn write_dcx<W: Write + Seek>(
    writer: &mut BinaryWriter<W>,
    variant: DfltVariant,
    data: &[u8],
) -> Result<()> {
    writer.set_endian(Endian::Big);
    let (unk10, unk14) = variant.header_sizes();

    writer.write_bytes(DCX_MAGIC)?;
    writer.write_u32(variant.version())?;
    writer.write_u32(0x18)?;
    writer.write_u32(0x24)?;
    writer.write_u32(unk10)?;
    writer.write_u32(unk14)?;

    writer.write_bytes(b"DCS\0")?;
    writer.write_u32(size_field(data.len())?)?;
    let compressed = writer.reserve::<u32>("CompressedSize")?;

    writer.write_bytes(b"DCP\0")?;
    writer.write_bytes(b"DFLT")?;
    writer.write_u32(0x20)?;
    writer.write_u8(variant.level())?;
    writer.write_pattern(3, 0)?;
    writer.write_u32(0)?;
    writer.write_u8(variant.flags())?;
    writer.write_pattern(3, 0)?;
    writer.write_u32(0)?;
    writer.write_u32(0x0001_0100)?;

    writer.write_bytes(b"DCA\0")?;
    writer.write_u32(8)?;

    let len = zlib::write_zlib(writer, ZlibLevel::Best, data)?;
    writer.fill(compressed, size_field(len)?)?;
    Ok(())
}

/// Unwraps `data` if it is a DCX, passing anything else through unchanged.
///
/// ```
/// use souls_container::dcx::{self, Compression};
///
/// let (data, compression) = dcx::decompress(b"BND4").unwrap();
/// assert_eq!(data, b"BND4");
/// assert_eq!(compression, Compression::None);
/// ```
#[instrument(skip(data), fields(len = data.len()), err)]
pub fn decompress(data: &[u8]) -> Result<(Vec<u8>, Compression)> {
    if !is(data) {
        return Ok((data.to_vec(), Compression::None));
    }

    let mut reader = BinaryReader::from_bytes_with_options(data, big_endian());
    let (data, variant) = read_dcx(&mut reader)?;
    Ok((data, Compression::DcxDflt(variant)))
}

/// Wraps `data` with `compression`.
#[instrument(skip(data), fields(len = data.len()), err)]
pub fn compress(data: &[u8], compression: Compression) -> Result<Vec<u8>> {
    match compression {
        Compression::None => Ok(data.to_vec()),
        Compression::DcxDflt(variant) => {
            let mut writer = BinaryWriter::in_memory(big_endian());
            write_dcx(&mut writer, variant, data)?;
            Ok(writer.into_bytes()?)
        }
    }
}
