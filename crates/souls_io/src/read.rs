//! Types for reading binary structures
//!

use num_enum::TryFromPrimitive;
use std::io::{Cursor, Read, Seek, SeekFrom};
use tracing::instrument;

use crate::error::{Error, Result};
use crate::primitive::{CodecOptions, Endian, Primitive, VarintWidth};
use crate::text::TextEncoding;
use crate::types::{Color, Vec2, Vec3, Vec4};

/// Position-aware reader over a seekable byte source
///
/// Every multi-byte value honours the current [`Endian`], which can be switched at any point
/// (many formats announce their byte order in the header).
///
/// ```
/// # fn doit() -> souls_io::error::Result<()>
/// # {
/// use souls_io::{BinaryReader, Endian};
///
/// let bytes = [0x00, 0x00, 0x00, 0x08, 0xAA, 0xBB, 0xCC, 0xDD, 0x2A, 0x00];
/// let mut reader = BinaryReader::from_bytes(&bytes);
/// reader.set_endian(Endian::Big);
///
/// let offset = reader.read_u32()?;
/// reader.step_in(offset as u64)?;
/// reader.set_endian(Endian::Little);
/// assert_eq!(reader.read_u16()?, 42);
/// reader.step_out()?;
///
/// assert_eq!(reader.position(), 4);
/// # Ok(())
/// # }
/// # doit().unwrap();
/// ```
#[derive(Debug)]
pub struct BinaryReader<R> {
    inner: R,
    options: CodecOptions,
    position: u64,
    len: u64,
    steps: Vec<u64>,
}

impl<'a> BinaryReader<Cursor<&'a [u8]>> {
    /// Reads from an in-memory buffer with default options.
    pub fn from_bytes(bytes: &'a [u8]) -> Self {
        Self::from_bytes_with_options(bytes, CodecOptions::default())
    }

    /// Reads from an in-memory buffer.
    pub fn from_bytes_with_options(bytes: &'a [u8], options: CodecOptions) -> Self {
        BinaryReader {
            len: bytes.len() as u64,
            inner: Cursor::new(bytes),
            options,
            position: 0,
            steps: Vec::new(),
        }
    }
}

macro_rules! named_reads {
    ($($name:ident => $ty:ty),* $(,)?) => {
        $(
            #[doc = concat!("Reads one `", stringify!($ty), "`")]
            pub fn $name(&mut self) -> Result<$ty> {
                self.read::<$ty>()
            }
        )*
    };
}

macro_rules! named_asserts {
    ($($name:ident => $ty:ty),* $(,)?) => {
        $(
            #[doc = concat!("Reads one `", stringify!($ty), "` and fails unless it is one of `options`")]
            pub fn $name(&mut self, options: &[$ty]) -> Result<$ty> {
                self.assert_value::<$ty>(options)
            }
        )*
    };
}

impl<R: Read + Seek> BinaryReader<R> {
    /// Wraps `inner` with default options, starting at its current position.
    pub fn new(inner: R) -> Result<Self> {
        Self::with_options(inner, CodecOptions::default())
    }

    /// Wraps `inner`, starting at its current position.
    pub fn with_options(mut inner: R, options: CodecOptions) -> Result<Self> {
        let position = inner.stream_position()?;
        let len = inner.seek(SeekFrom::End(0))?;
        inner.seek(SeekFrom::Start(position))?;

        Ok(BinaryReader {
            inner,
            options,
            position,
            len,
            steps: Vec::new(),
        })
    }

    /// Unwrap and return the inner reader object
    ///
    /// The position of the reader is undefined.
    pub fn into_inner(self) -> R {
        self.inner
    }

    pub fn options(&self) -> CodecOptions {
        self.options
    }

    /// Sets the byte order, for chaining after construction.
    pub fn with_endian(mut self, endian: Endian) -> Self {
        self.options.endian = endian;
        self
    }

    /// Sets the varint width, for chaining after construction.
    pub fn with_varint_width(mut self, width: VarintWidth) -> Self {
        self.options.varint_width = width;
        self
    }

    pub fn endian(&self) -> Endian {
        self.options.endian
    }

    /// Changes the byte order of every following read.
    pub fn set_endian(&mut self, endian: Endian) {
        self.options.endian = endian;
    }

    pub fn varint_width(&self) -> VarintWidth {
        self.options.varint_width
    }

    /// Changes the width of every following varint read.
    pub fn set_varint_width(&mut self, width: VarintWidth) {
        self.options.varint_width = width;
    }

    /// Current absolute offset
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Total length of the stream
    pub fn len(&self) -> u64 {
        self.len
    }

    /// Whether the stream contains no bytes at all
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Bytes left between the current position and the end of the stream
    pub fn remaining(&self) -> u64 {
        self.len.saturating_sub(self.position)
    }

    /// Number of saved positions on the position stack
    pub fn depth(&self) -> usize {
        self.steps.len()
    }

    fn check_bounds(&self, offset: u64, count: u64) -> Result<()> {
        match offset.checked_add(count) {
            Some(end) if end <= self.len => Ok(()),
            _ => Err(Error::OutOfBounds {
                offset,
                count,
                len: self.len,
            }),
        }
    }

    /// Moves to an absolute offset, which may be the end of the stream but not past it.
    pub fn seek(&mut self, offset: u64) -> Result<()> {
        self.check_bounds(offset, 0)?;
        self.inner.seek(SeekFrom::Start(offset))?;
        self.position = offset;
        Ok(())
    }

    /// Moves forward by `count` bytes.
    pub fn skip(&mut self, count: u64) -> Result<()> {
        self.check_bounds(self.position, count)?;
        self.seek(self.position + count)
    }

    /// Skips forward to the next multiple of `align`. An alignment of 0 or 1 is a no-op.
    pub fn pad(&mut self, align: u64) -> Result<()> {
        let misalignment = self.position.checked_rem(align).unwrap_or(0);
        if misalignment != 0 {
            self.skip(align - misalignment)?;
        }
        Ok(())
    }

    /// Saves the current position and moves to `offset`.
    #[instrument(level = "trace", skip(self), err)]
    pub fn step_in(&mut self, offset: u64) -> Result<()> {
        let position = self.position;
        self.seek(offset)?;
        self.steps.push(position);
        Ok(())
    }

    /// Returns to the position saved by the most recent [`BinaryReader::step_in`].
    #[instrument(level = "trace", skip(self), err)]
    pub fn step_out(&mut self) -> Result<()> {
        let position = self.steps.pop().ok_or(Error::StepOutOfEmptyStack)?;
        self.seek(position)
    }

    fn read_exact(&mut self, buf: &mut [u8]) -> Result<()> {
        self.check_bounds(self.position, buf.len() as u64)?;
        self.inner.read_exact(buf)?;
        self.position += buf.len() as u64;
        Ok(())
    }

    /// Reads one fixed-width value in the current byte order.
    pub fn read<T: Primitive>(&mut self) -> Result<T> {
        self.check_bounds(self.position, T::WIDTH as u64)?;
        let value = T::read_from(&mut self.inner, self.options.endian)?;
        self.position += T::WIDTH as u64;
        Ok(value)
    }

    /// Reads `count` consecutive values.
    pub fn read_array<T: Primitive>(&mut self, count: usize) -> Result<Vec<T>> {
        let size = count.checked_mul(T::WIDTH).ok_or(Error::OutOfBounds {
            offset: self.position,
            count: u64::MAX,
            len: self.len,
        })?;
        self.check_bounds(self.position, size as u64)?;
        (0..count).map(|_| self.read::<T>()).collect()
    }

    /// Reads one value at `offset` without moving.
    pub fn get<T: Primitive>(&mut self, offset: u64) -> Result<T> {
        self.step_in(offset)?;
        let value = self.read::<T>();
        self.step_out()?;
        value
    }

    named_reads! {
        read_u8 => u8,
        read_i8 => i8,
        read_u16 => u16,
        read_i16 => i16,
        read_u32 => u32,
        read_i32 => i32,
        read_u64 => u64,
        read_i64 => i64,
        read_f32 => f32,
        read_f64 => f64,
    }

    /// Reads an integer whose width is set by [`BinaryReader::set_varint_width`].
    pub fn read_varint(&mut self) -> Result<i64> {
        match self.options.varint_width {
            VarintWidth::Four => Ok(self.read_i32()? as i64),
            VarintWidth::Eight => self.read_i64(),
        }
    }

    /// Reads a one byte boolean, anything other than 0 or 1 is rejected.
    pub fn read_bool(&mut self) -> Result<bool> {
        let offset = self.position;
        match self.read_u8()? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(Error::AssertionFailed {
                offset,
                expected: "a boolean (0 or 1)".to_string(),
                actual: format!("{other:#04x}"),
            }),
        }
    }

    /// Reads `count` raw bytes.
    pub fn read_bytes(&mut self, count: usize) -> Result<Vec<u8>> {
        self.check_bounds(self.position, count as u64)?;
        let mut buffer = vec![0; count];
        self.read_exact(&mut buffer)?;
        Ok(buffer)
    }

    /// Reads `count` raw bytes at `offset` without moving.
    pub fn get_bytes(&mut self, offset: u64, count: usize) -> Result<Vec<u8>> {
        self.step_in(offset)?;
        let bytes = self.read_bytes(count);
        self.step_out()?;
        bytes
    }

    /// Reads one value and fails unless it equals one of `options`.
    pub fn assert_value<T: Primitive>(&mut self, options: &[T]) -> Result<T> {
        let offset = self.position;
        let value = self.read::<T>()?;
        if options.contains(&value) {
            return Ok(value);
        }

        let expected = options
            .iter()
            .map(|option| format!("{option:?}"))
            .collect::<Vec<_>>()
            .join(" or ");
        Err(Error::AssertionFailed {
            offset,
            expected: format!("{} {}", T::NAME, expected),
            actual: format!("{value:?}"),
        })
    }

    named_asserts! {
        assert_u8 => u8,
        assert_i8 => i8,
        assert_u16 => u16,
        assert_i16 => i16,
        assert_u32 => u32,
        assert_i32 => i32,
        assert_u64 => u64,
        assert_i64 => i64,
    }

    /// Reads `magic.len()` bytes and fails unless they equal `magic`.
    pub fn assert_magic(&mut self, magic: &[u8]) -> Result<()> {
        let offset = self.position;
        let actual = self.read_bytes(magic.len())?;
        if actual == magic {
            Ok(())
        } else {
            Err(Error::AssertionFailed {
                offset,
                expected: format!("{:?}", String::from_utf8_lossy(magic)),
                actual: format!("{:?}", String::from_utf8_lossy(&actual)),
            })
        }
    }

    /// Reads `count` bytes and fails unless every one of them is `byte`.
    pub fn assert_pattern(&mut self, count: usize, byte: u8) -> Result<()> {
        let offset = self.position;
        let actual = self.read_bytes(count)?;
        match actual.iter().position(|&b| b != byte) {
            None => Ok(()),
            Some(index) => Err(Error::AssertionFailed {
                offset: offset + index as u64,
                expected: format!("{count} bytes of {byte:#04x}"),
                actual: format!("{:#04x}", actual[index]),
            }),
        }
    }

    /// Reads the backing integer of `E` and maps it onto a variant.
    ///
    /// ```
    /// use num_enum::TryFromPrimitive;
    /// use souls_io::BinaryReader;
    ///
    /// #[derive(Debug, PartialEq, TryFromPrimitive)]
    /// #[repr(u8)]
    /// enum Slot {
    ///     Head = 0,
    ///     Core = 1,
    /// }
    ///
    /// let mut reader = BinaryReader::from_bytes(&[1, 7]);
    /// assert_eq!(reader.read_enum::<Slot>().unwrap(), Slot::Core);
    /// assert!(reader.read_enum::<Slot>().is_err());
    /// ```
    pub fn read_enum<E>(&mut self) -> Result<E>
    where
        E: TryFromPrimitive,
        E::Primitive: Primitive,
    {
        let offset = self.position;
        let raw = self.read::<E::Primitive>()?;
        E::try_from_primitive(raw).map_err(|_| Error::InvalidEnum {
            offset,
            name: E::NAME,
            value: format!("{raw:?}"),
        })
    }

    /// Reads a string field occupying exactly `width` bytes.
    ///
    /// Text ends at the first terminator; bytes after it are padding and ignored.
    pub fn read_fixed_str(&mut self, width: usize, encoding: TextEncoding) -> Result<String> {
        let bytes = self.read_bytes(width)?;
        let end = encoding.terminated_len(&bytes).unwrap_or_else(|| {
            // Unterminated fields use the whole width, minus a dangling half code unit.
            width - width % encoding.terminator_width()
        });
        encoding.decode(&bytes[..end])
    }

    /// Reads a null-terminated string and moves past its terminator.
    pub fn read_terminated_str(&mut self, encoding: TextEncoding) -> Result<String> {
        let start = self.position;
        let unit = encoding.terminator_width();
        let mut bytes = Vec::new();
        loop {
            if self.remaining() < unit as u64 {
                return Err(Error::UnterminatedString(start));
            }
            let chunk = self.read_bytes(unit)?;
            if chunk.iter().all(|&b| b == 0) {
                break;
            }
            bytes.extend(chunk);
        }
        encoding.decode(&bytes)
    }

    /// Reads a null-terminated string at `offset` without moving.
    pub fn get_terminated_str(&mut self, offset: u64, encoding: TextEncoding) -> Result<String> {
        self.step_in(offset)?;
        let text = self.read_terminated_str(encoding);
        self.step_out()?;
        text
    }

    pub fn read_vector2(&mut self) -> Result<Vec2> {
        Ok(Vec2::new(self.read_f32()?, self.read_f32()?))
    }

    pub fn read_vector3(&mut self) -> Result<Vec3> {
        Ok(Vec3::new(self.read_f32()?, self.read_f32()?, self.read_f32()?))
    }

    pub fn read_vector4(&mut self) -> Result<Vec4> {
        Ok(Vec4::new(
            self.read_f32()?,
            self.read_f32()?,
            self.read_f32()?,
            self.read_f32()?,
        ))
    }

    fn read_color_bytes(&mut self) -> Result<[u8; 4]> {
        let mut bytes = [0; 4];
        self.read_exact(&mut bytes)?;
        Ok(bytes)
    }

    /// Reads a color stored as red, green, blue, alpha.
    pub fn read_rgba(&mut self) -> Result<Color> {
        Ok(Color::from_rgba(self.read_color_bytes()?))
    }

    /// Reads a color stored as alpha, red, green, blue.
    pub fn read_argb(&mut self) -> Result<Color> {
        Ok(Color::from_argb(self.read_color_bytes()?))
    }

    /// Reads a color stored as blue, green, red, alpha.
    pub fn read_bgra(&mut self) -> Result<Color> {
        Ok(Color::from_bgra(self.read_color_bytes()?))
    }

    /// Reads a color stored as alpha, blue, green, red.
    pub fn read_abgr(&mut self) -> Result<Color> {
        Ok(Color::from_abgr(self.read_color_bytes()?))
    }
}
