//! Fixed-width numeric values and the stream options that govern how they are laid out.

use bon::Builder;
use byteorder::{BigEndian, LittleEndian, ReadBytesExt, WriteBytesExt};
use std::fmt::Debug;
use std::io::{self, Read, Write};

/// Byte order used for every multi-byte value
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum Endian {
    /// Least significant byte first
    #[default]
    Little,

    /// Most significant byte first
    Big,
}

/// On-disk width of a varint
///
/// Formats shared between 32-bit and 64-bit releases store offsets and counts with a width that
/// depends on the release rather than on the value.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum VarintWidth {
    /// Stored as an `i32`
    #[default]
    Four,

    /// Stored as an `i64`
    Eight,
}

impl VarintWidth {
    /// Number of bytes a varint occupies
    pub const fn bytes(self) -> usize {
        match self {
            VarintWidth::Four => 4,
            VarintWidth::Eight => 8,
        }
    }
}

/// Options shared by [`crate::BinaryReader`] and [`crate::BinaryWriter`]
///
/// ```
/// use souls_io::{CodecOptions, Endian, VarintWidth};
///
/// let options = CodecOptions::builder()
///     .endian(Endian::Big)
///     .varint_width(VarintWidth::Eight)
///     .build();
/// assert_eq!(options.endian, Endian::Big);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Builder)]
pub struct CodecOptions {
    /// Byte order of multi-byte values
    #[builder(default)]
    pub endian: Endian,

    /// Width used by varint reads and writes
    #[builder(default)]
    pub varint_width: VarintWidth,
}

/// A fixed-width value that can be read or written in either byte order
pub trait Primitive: Copy + PartialEq + Debug {
    /// Size of the value on disk in bytes
    const WIDTH: usize;

    /// Name used in diagnostics and reservation keys
    const NAME: &'static str;

    /// Reads one value
    fn read_from<R: Read>(reader: &mut R, endian: Endian) -> io::Result<Self>;

    /// Writes one value
    fn write_to<W: Write>(self, writer: &mut W, endian: Endian) -> io::Result<()>;

    /// Encodes the value into a new buffer of exactly [`Primitive::WIDTH`] bytes
    fn to_bytes(self, endian: Endian) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(Self::WIDTH);
        // Writing into a Vec cannot fail.
        let _ = self.write_to(&mut bytes, endian);
        bytes
    }
}

macro_rules! byte_primitive {
    ($ty:ty, $read:ident, $write:ident) => {
        impl Primitive for $ty {
            const WIDTH: usize = 1;
            const NAME: &'static str = stringify!($ty);

            fn read_from<R: Read>(reader: &mut R, _endian: Endian) -> io::Result<Self> {
                reader.$read()
            }

            fn write_to<W: Write>(self, writer: &mut W, _endian: Endian) -> io::Result<()> {
                writer.$write(self)
            }
        }
    };
}

macro_rules! endian_primitive {
    ($ty:ty, $read:ident, $write:ident) => {
        impl Primitive for $ty {
            const WIDTH: usize = std::mem::size_of::<$ty>();
            const NAME: &'static str = stringify!($ty);

            fn read_from<R: Read>(reader: &mut R, endian: Endian) -> io::Result<Self> {
                match endian {
                    Endian::Little => reader.$read::<LittleEndian>(),
                    Endian::Big => reader.$read::<BigEndian>(),
                }
            }

            fn write_to<W: Write>(self, writer: &mut W, endian: Endian) -> io::Result<()> {
                match endian {
                    Endian::Little => writer.$write::<LittleEndian>(self),
                    Endian::Big => writer.$write::<BigEndian>(self),
                }
            }
        }
    };
}

byte_primitive!(u8, read_u8, write_u8);
byte_primitive!(i8, read_i8, write_i8);
endian_primitive!(u16, read_u16, write_u16);
endian_primitive!(i16, read_i16, write_i16);
endian_primitive!(u32, read_u32, write_u32);
endian_primitive!(i32, read_i32, write_i32);
endian_primitive!(u64, read_u64, write_u64);
endian_primitive!(i64, read_i64, write_i64);
endian_primitive!(f32, read_f32, write_f32);
endian_primitive!(f64, read_f64, write_f64);

#[cfg(test)]
mod test {
    use std::io::Cursor;

    use pretty_assertions::assert_eq;
    use quickcheck_macros::quickcheck;

    use super::{CodecOptions, Endian, Primitive, VarintWidth};
    use crate::read::BinaryReader;
    use crate::write::BinaryWriter;

    fn round_trip<T: Primitive>(value: T, endian: Endian) -> T {
        let bytes = value.to_bytes(endian);
        assert_eq!(bytes.len(), T::WIDTH);
        T::read_from(&mut Cursor::new(bytes), endian).unwrap()
    }

    #[test]
    fn encode_u16() {
        assert_eq!(vec![0x14, 0xFE], 0xFE14u16.to_bytes(Endian::Little));
        assert_eq!(vec![0xFE, 0x14], 0xFE14u16.to_bytes(Endian::Big));
    }

    #[test]
    fn encode_u32() {
        assert_eq!(
            vec![0x13, 0x12, 0x14, 0xFE],
            0xFE141213u32.to_bytes(Endian::Little)
        );
        assert_eq!(
            vec![0xFE, 0x14, 0x12, 0x13],
            0xFE141213u32.to_bytes(Endian::Big)
        );
    }

    #[test]
    fn encode_f32() {
        assert_eq!(vec![0x00, 0x00, 0x00, 0x3F], 0.5f32.to_bytes(Endian::Little));
        assert_eq!(vec![0x3F, 0x00, 0x00, 0x00], 0.5f32.to_bytes(Endian::Big));
    }

    #[test]
    fn decode_i64() {
        let bytes = [0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x88];
        assert_eq!(
            i64::read_from(&mut Cursor::new(bytes), Endian::Big).unwrap(),
            0x0102030405060788
        );
        assert_eq!(
            i64::read_from(&mut Cursor::new(bytes), Endian::Little).unwrap(),
            0x8807060504030201u64 as i64
        );
    }

    #[test]
    fn varint_widths() {
        assert_eq!(VarintWidth::Four.bytes(), 4);
        assert_eq!(VarintWidth::Eight.bytes(), 8);
    }

    fn endian(big: bool) -> Endian {
        if big {
            Endian::Big
        } else {
            Endian::Little
        }
    }

    /// Writes `value` through a [`BinaryWriter`] and reads it back through a [`BinaryReader`].
    fn through_codec<T: Primitive>(value: T, big: bool) -> T {
        let options = CodecOptions::builder().endian(endian(big)).build();
        let mut writer = BinaryWriter::in_memory(options);
        writer.write(value).unwrap();
        let bytes = writer.into_bytes().unwrap();
        assert_eq!(bytes, value.to_bytes(options.endian));

        let mut reader = BinaryReader::from_bytes_with_options(&bytes, options);
        let read = reader.read::<T>().unwrap();
        assert_eq!(reader.remaining(), 0);
        read
    }

    macro_rules! symmetric {
        ($($name:ident => $ty:ty),* $(,)?) => {
            $(
                #[quickcheck]
                fn $name(value: $ty, big: bool) -> bool {
                    round_trip(value, endian(big)) == value && through_codec(value, big) == value
                }
            )*
        };
    }

    symmetric! {
        symmetric_u8 => u8,
        symmetric_i8 => i8,
        symmetric_u16 => u16,
        symmetric_i16 => i16,
        symmetric_u32 => u32,
        symmetric_i32 => i32,
        symmetric_u64 => u64,
        symmetric_i64 => i64,
    }

    #[quickcheck]
    fn symmetric_f32(value: f32, big: bool) -> bool {
        round_trip(value, endian(big)).to_bits() == value.to_bits()
            && through_codec(value, big).to_bits() == value.to_bits()
    }

    #[quickcheck]
    fn symmetric_f64(value: f64, big: bool) -> bool {
        round_trip(value, endian(big)).to_bits() == value.to_bits()
            && through_codec(value, big).to_bits() == value.to_bits()
    }

    #[quickcheck]
    fn symmetric_varint(value: i64, big: bool, wide: bool) -> bool {
        let width = if wide { VarintWidth::Eight } else { VarintWidth::Four };
        // Four byte varints hold the i32 range only
        let value = if wide { value } else { value as i32 as i64 };
        let options = CodecOptions::builder()
            .endian(endian(big))
            .varint_width(width)
            .build();

        let mut writer = BinaryWriter::in_memory(options);
        writer.write_varint(value).unwrap();
        let bytes = writer.into_bytes().unwrap();

        let mut reader = BinaryReader::from_bytes_with_options(&bytes, options);
        bytes.len() == width.bytes() && reader.read_varint().unwrap() == value
    }
}
