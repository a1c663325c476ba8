//! Zlib framing with an explicit Adler-32 trailer.
//!
//! Frames are a two byte header, a raw deflate body and the Adler-32 of the uncompressed data. The
//! trailer follows the byte order of the surrounding stream, which is big endian in every container
//! seen so far but is kept configurable through the reader and writer.

use std::io::{Read, Seek, Write};

use adler2::Adler32;
use flate2::{read::DeflateDecoder, write::DeflateEncoder, Compression};
use num_enum::{IntoPrimitive, TryFromPrimitive};
use souls_io::{BinaryReader, BinaryWriter, CodecOptions, Endian};
use tracing::{instrument, trace};

use crate::error::{Error, Result};

/// First byte of every zlib frame: deflate with a 32K window
pub const ZLIB_METHOD: u8 = 0x78;

/// Second byte of a zlib frame, hinting at the level the body was compressed with
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, TryFromPrimitive, IntoPrimitive)]
#[repr(u8)]
pub enum ZlibLevel {
    /// Levels 0 and 1
    Fastest = 0x01,

    /// Levels 2 to 5
    Fast = 0x5E,

    /// Level 6
    #[default]
    Default = 0x9C,

    /// Levels 7 to 9
    Best = 0xDA,
}

impl ZlibLevel {
    /// Deflate level used when compressing with this marker
    pub fn compression(self) -> Compression {
        match self {
            ZlibLevel::Fastest => Compression::fast(),
            ZlibLevel::Fast => Compression::new(5),
            ZlibLevel::Default => Compression::default(),
            ZlibLevel::Best => Compression::best(),
        }
    }
}

/// Adler-32 checksum of `data`
pub fn adler32(data: &[u8]) -> u32 {
    let mut hasher = Adler32::new();
    hasher.write_slice(data);
    hasher.checksum()
}

/// Reads a zlib frame of `compressed_len` bytes, verifying its header and checksum.
#[instrument(skip(reader), err)]
pub fn read_zlib<R: Read + Seek>(
    reader: &mut BinaryReader<R>,
    compressed_len: usize,
) -> Result<Vec<u8>> {
    if compressed_len < 6 {
        return Err(Error::FrameTooShort(compressed_len));
    }

    reader.assert_u8(&[ZLIB_METHOD])?;
    let level = reader.read_enum::<ZlibLevel>()?;
    let body = reader.read_bytes(compressed_len - 6)?;
    let stored = reader.read_u32()?;
    trace!(?level, "inflating zlib frame");

    let mut data = Vec::new();
    DeflateDecoder::new(body.as_slice()).read_to_end(&mut data)?;

    let computed = adler32(&data);
    if stored != computed {
        return Err(Error::ChecksumMismatch { stored, computed });
    }
    Ok(data)
}

/// Writes `data` as a zlib frame and returns the number of bytes written.
#[instrument(skip(writer, data), fields(len = data.len()), err)]
pub fn write_zlib<W: Write + Seek>(
    writer: &mut BinaryWriter<W>,
    level: ZlibLevel,
    data: &[u8],
) -> Result<usize> {
    let start = writer.position();

    let mut encoder = DeflateEncoder::new(Vec::new(), level.compression());
    encoder.write_all(data)?;
    let body = encoder.finish()?;

    writer.write_u8(ZLIB_METHOD)?;
    writer.write_enum(level)?;
    writer.write_bytes(&body)?;
    writer.write_u32(adler32(data))?;

    Ok((writer.position() - start) as usize)
}

fn big_endian() -> CodecOptions {
    CodecOptions::builder().endian(Endian::Big).build()
}

/// Compresses `data` into a standard zlib stream.
pub fn compress(data: &[u8], level: ZlibLevel) -> Result<Vec<u8>> {
    let mut writer = BinaryWriter::in_memory(big_endian());
    write_zlib(&mut writer, level, data)?;
    Ok(writer.into_bytes()?)
}

/// Decompresses a standard zlib stream.
pub fn decompress(data: &[u8]) -> Result<Vec<u8>> {
    let mut reader = BinaryReader::from_bytes_with_options(data, big_endian());
    read_zlib(&mut reader, data.len())
}

#[cfg(test)]
mod test {
    use std::io::{Read, Write};

    use flate2::{read::ZlibDecoder, write::ZlibEncoder};
    use pretty_assertions::assert_eq;
    use souls_io::{BinaryReader, BinaryWriter, CodecOptions};
    use tracing_test::traced_test;

    use super::{adler32, compress, decompress, read_zlib, write_zlib, ZlibLevel};
    use crate::error::{Error, Result};

    const TEXT: &[u8] = b"ParamDef ParamDef ParamDef ParamDef ParamDef ParamDef";

    #[test]
    fn adler32_known_values() {
        assert_eq!(adler32(b""), 1);
        assert_eq!(adler32(b"Wikipedia"), 0x11E6_0398);
    }

    #[test]
    fn adler32_reduces_modulo() {
        // 0xFF * 5552 pushes the first sum past the modulus
        let data = vec![0xFFu8; 5552];
        let expected = {
            let (mut a, mut b) = (1u64, 0u64);
            for &byte in &data {
                a = (a + byte as u64) % 65521;
                b = (b + a) % 65521;
            }
            ((b << 16) | a) as u32
        };
        assert_eq!(adler32(&data), expected);
    }

    #[traced_test]
    #[test]
    fn frames_are_standard_zlib() -> Result<()> {
        for level in [
            ZlibLevel::Fastest,
            ZlibLevel::Fast,
            ZlibLevel::Default,
            ZlibLevel::Best,
        ] {
            let frame = compress(TEXT, level)?;
            assert_eq!(frame[0], 0x78);
            assert_eq!(frame[1], u8::from(level));

            let mut inflated = Vec::new();
            ZlibDecoder::new(frame.as_slice()).read_to_end(&mut inflated)?;
            assert_eq!(inflated, TEXT);
        }
        Ok(())
    }

    #[traced_test]
    #[test]
    fn reads_frames_from_flate2() -> Result<()> {
        let mut encoder = ZlibEncoder::new(Vec::new(), flate2::Compression::default());
        encoder.write_all(TEXT)?;
        let frame = encoder.finish()?;
        assert_eq!(decompress(&frame)?, TEXT);
        Ok(())
    }

    #[test]
    fn checksum_follows_stream_byte_order() -> Result<()> {
        let mut writer = BinaryWriter::in_memory(CodecOptions::default());
        let written = write_zlib(&mut writer, ZlibLevel::Best, TEXT)?;
        let frame = writer.into_bytes()?;
        assert_eq!(written, frame.len());
        assert_eq!(&frame[frame.len() - 4..], &adler32(TEXT).to_le_bytes());

        let mut reader = BinaryReader::from_bytes(&frame);
        assert_eq!(read_zlib(&mut reader, frame.len())?, TEXT);
        assert_eq!(reader.remaining(), 0);
        Ok(())
    }

    #[test]
    fn corrupt_checksum_is_rejected() -> Result<()> {
        let mut frame = compress(TEXT, ZlibLevel::Default)?;
        let last = frame.len() - 1;
        frame[last] ^= 0xFF;
        assert!(matches!(
            decompress(&frame),
            Err(Error::ChecksumMismatch { .. })
        ));
        Ok(())
    }

    #[test]
    fn invalid_headers_are_rejected() -> Result<()> {
        let frame = compress(TEXT, ZlibLevel::Default)?;

        let mut bad_method = frame.clone();
        bad_method[0] = 0x79;
        assert!(matches!(
            decompress(&bad_method),
            Err(Error::Codec(souls_io::error::Error::AssertionFailed { offset: 0, .. }))
        ));

        let mut bad_level = frame;
        bad_level[1] = 0x00;
        assert!(matches!(
            decompress(&bad_level),
            Err(Error::Codec(souls_io::error::Error::InvalidEnum { offset: 1, .. }))
        ));

        assert!(matches!(decompress(&[0x78, 0x9C]), Err(Error::FrameTooShort(2))));
        Ok(())
    }
}
