//! Types for writing binary structures
//!
//! Besides the primitive writes mirroring [`crate::read::BinaryReader`], the writer can reserve
//! space for a value that is only known later (an offset, a count, a digest) and fill it in once
//! the rest of the structure has been written.

use indexmap::IndexMap;
use num_enum::TryFromPrimitive;
use std::io::{Cursor, Seek, SeekFrom, Write};
use std::marker::PhantomData;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{error, instrument, trace};

use crate::error::{Error, Result};
use crate::primitive::{CodecOptions, Endian, Primitive, VarintWidth};
use crate::text::TextEncoding;
use crate::types::{Color, Vec2, Vec3, Vec4};

/// Byte written over every reserved slot until it is filled
///
/// Chosen so that a forgotten slot stands out in a hex dump.
pub const RESERVED_BYTE: u8 = 0xFE;

static NEXT_WRITER_ID: AtomicU64 = AtomicU64::new(0);

fn encode_varint(value: i64, width: usize, endian: Endian) -> Result<Vec<u8>> {
    Ok(match width {
        4 => i32::try_from(value)
            .map_err(|_| Error::VarintOverflow { value, width })?
            .to_bytes(endian),
        _ => value.to_bytes(endian),
    })
}

/// Marker for reservations made with [`BinaryWriter::reserve_varint`]
#[derive(Debug)]
pub struct Varint;

/// Marker for reservations made with [`BinaryWriter::reserve_bytes`]
#[derive(Debug)]
pub struct Bytes;

/// Handle to a reserved slot
///
/// The handle is consumed when the slot is filled, so a slot cannot be filled twice through it.
#[must_use = "a reservation must be filled before the writer is finished"]
#[derive(Debug)]
pub struct Reservation<T> {
    writer: u64,
    index: usize,
    _kind: PhantomData<fn() -> T>,
}

#[derive(Debug, Clone)]
struct Slot {
    name: String,
    kind: &'static str,
    offset: u64,
    width: usize,
    endian: Endian,
    filled: bool,
}

impl Slot {
    fn label(&self) -> String {
        format!("{} ({})", self.name, self.kind)
    }
}

#[derive(Debug)]
struct Reservations {
    writer: u64,
    slots: Vec<Slot>,
    pending: IndexMap<(String, &'static str), usize>,
    checked: bool,
}

impl Reservations {
    fn new() -> Self {
        Reservations {
            writer: NEXT_WRITER_ID.fetch_add(1, Ordering::Relaxed),
            slots: Vec::new(),
            pending: IndexMap::new(),
            checked: false,
        }
    }

    fn insert<T>(
        &mut self,
        name: String,
        kind: &'static str,
        offset: u64,
        width: usize,
        endian: Endian,
    ) -> Result<Reservation<T>> {
        let key = (name, kind);
        if self.pending.contains_key(&key) {
            return Err(Error::DuplicateReservation(format!("{} ({})", key.0, kind)));
        }

        let index = self.slots.len();
        self.slots.push(Slot {
            name: key.0.clone(),
            kind,
            offset,
            width,
            endian,
            filled: false,
        });
        self.pending.insert(key, index);

        Ok(Reservation {
            writer: self.writer,
            index,
            _kind: PhantomData,
        })
    }

    fn slot<T>(&self, reservation: &Reservation<T>) -> Result<&Slot> {
        if reservation.writer != self.writer {
            return Err(Error::ForeignReservation);
        }
        let slot = self
            .slots
            .get(reservation.index)
            .ok_or(Error::ForeignReservation)?;
        if slot.filled {
            return Err(Error::AlreadyFilled(slot.label()));
        }
        Ok(slot)
    }

    /// Marks a slot filled once its bytes have been patched.
    fn complete<T>(&mut self, reservation: Reservation<T>) -> Result<()> {
        self.slot(&reservation)?;
        let slot = &mut self.slots[reservation.index];
        slot.filled = true;
        self.pending.shift_remove(&(slot.name.clone(), slot.kind));
        Ok(())
    }

    fn unfilled(&self) -> Vec<String> {
        self.pending
            .values()
            .map(|&index| self.slots[index].label())
            .collect()
    }

    fn check(&mut self) -> Result<()> {
        self.checked = true;
        if self.pending.is_empty() {
            Ok(())
        } else {
            Err(Error::UnfilledReservations(self.unfilled()))
        }
    }
}

impl Drop for Reservations {
    fn drop(&mut self) {
        if !self.checked && !self.pending.is_empty() {
            error!(
                unfilled = ?self.unfilled(),
                "writer dropped without finishing while reservations were pending"
            );
        }
    }
}

/// Position-aware writer over a seekable byte sink
///
/// The inner stream is only handed back by [`BinaryWriter::finish`], which fails when any
/// reservation is still unfilled.
///
/// ```
/// # fn doit() -> souls_io::error::Result<()>
/// # {
/// use souls_io::BinaryWriter;
///
/// let mut writer = BinaryWriter::in_memory(Default::default());
/// let count = writer.reserve::<u32>("Count")?;
/// for value in [10u16, 20, 30] {
///     writer.write_u16(value)?;
/// }
/// writer.fill(count, 3)?;
///
/// let bytes = writer.into_bytes()?;
/// assert_eq!(&bytes[..4], &[3, 0, 0, 0]);
/// # Ok(())
/// # }
/// # doit().unwrap();
/// ```
#[derive(Debug)]
pub struct BinaryWriter<W: Write + Seek> {
    inner: W,
    options: CodecOptions,
    position: u64,
    len: u64,
    steps: Vec<u64>,
    reservations: Reservations,
}

impl BinaryWriter<Cursor<Vec<u8>>> {
    /// Writes into a growable in-memory buffer.
    pub fn in_memory(options: CodecOptions) -> Self {
        BinaryWriter {
            inner: Cursor::new(Vec::new()),
            options,
            position: 0,
            len: 0,
            steps: Vec::new(),
            reservations: Reservations::new(),
        }
    }

    /// Finishes the writer and returns the bytes written.
    pub fn into_bytes(self) -> Result<Vec<u8>> {
        Ok(self.finish()?.into_inner())
    }
}

macro_rules! named_writes {
    ($($name:ident => $ty:ty),* $(,)?) => {
        $(
            #[doc = concat!("Writes one `", stringify!($ty), "`")]
            pub fn $name(&mut self, value: $ty) -> Result<()> {
                self.write::<$ty>(value)
            }
        )*
    };
}

impl<W: Write + Seek> BinaryWriter<W> {
    /// Wraps `inner` with default options, starting at its current position.
    pub fn new(inner: W) -> Result<Self> {
        Self::with_options(inner, CodecOptions::default())
    }

    /// Wraps `inner`, starting at its current position.
    pub fn with_options(mut inner: W, options: CodecOptions) -> Result<Self> {
        let position = inner.stream_position()?;
        let len = inner.seek(SeekFrom::End(0))?;
        inner.seek(SeekFrom::Start(position))?;

        Ok(BinaryWriter {
            inner,
            options,
            position,
            len,
            steps: Vec::new(),
            reservations: Reservations::new(),
        })
    }

    /// Borrows the inner stream, for inspecting output before finishing.
    pub fn get_ref(&self) -> &W {
        &self.inner
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

    /// Changes the byte order of every following write.
    pub fn set_endian(&mut self, endian: Endian) {
        self.options.endian = endian;
    }

    pub fn varint_width(&self) -> VarintWidth {
        self.options.varint_width
    }

    /// Changes the width of every following varint write.
    pub fn set_varint_width(&mut self, width: VarintWidth) {
        self.options.varint_width = width;
    }

    /// Current absolute offset
    pub fn position(&self) -> u64 {
        self.position
    }

    /// Total length written so far
    pub fn len(&self) -> u64 {
        self.len
    }

    /// Whether nothing has been written yet
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of saved positions on the position stack
    pub fn depth(&self) -> usize {
        self.steps.len()
    }

    /// Moves to an absolute offset.
    pub fn seek(&mut self, offset: u64) -> Result<()> {
        self.inner.seek(SeekFrom::Start(offset))?;
        self.position = offset;
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

    /// Returns to the position saved by the most recent [`BinaryWriter::step_in`].
    #[instrument(level = "trace", skip(self), err)]
    pub fn step_out(&mut self) -> Result<()> {
        let position = self.steps.pop().ok_or(Error::StepOutOfEmptyStack)?;
        self.seek(position)
    }

    fn advance(&mut self, count: usize) {
        self.position += count as u64;
        self.len = self.len.max(self.position);
    }

    /// Writes one fixed-width value in the current byte order.
    pub fn write<T: Primitive>(&mut self, value: T) -> Result<()> {
        value.write_to(&mut self.inner, self.options.endian)?;
        self.advance(T::WIDTH);
        Ok(())
    }

    /// Writes every value of `values` in order.
    pub fn write_array<T: Primitive>(&mut self, values: &[T]) -> Result<()> {
        values.iter().try_for_each(|&value| self.write(value))
    }

    named_writes! {
        write_u8 => u8,
        write_i8 => i8,
        write_u16 => u16,
        write_i16 => i16,
        write_u32 => u32,
        write_i32 => i32,
        write_u64 => u64,
        write_i64 => i64,
        write_f32 => f32,
        write_f64 => f64,
    }

    /// Writes an integer whose width is set by [`BinaryWriter::set_varint_width`].
    pub fn write_varint(&mut self, value: i64) -> Result<()> {
        let bytes = encode_varint(value, self.options.varint_width.bytes(), self.options.endian)?;
        self.write_bytes(&bytes)
    }

    pub fn write_bool(&mut self, value: bool) -> Result<()> {
        self.write_u8(value as u8)
    }

    /// Writes raw bytes.
    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.inner.write_all(bytes)?;
        self.advance(bytes.len());
        Ok(())
    }

    /// Writes `count` copies of `byte`.
    pub fn write_pattern(&mut self, count: usize, byte: u8) -> Result<()> {
        self.write_bytes(&vec![byte; count])
    }

    /// Writes zero bytes up to the next multiple of `align`. An alignment of 0 or 1 is a no-op.
    pub fn pad(&mut self, align: u64) -> Result<()> {
        let misalignment = self.position.checked_rem(align).unwrap_or(0);
        if misalignment != 0 {
            self.write_pattern((align - misalignment) as usize, 0)?;
        }
        Ok(())
    }

    /// Writes the backing integer of an enum variant.
    pub fn write_enum<E>(&mut self, value: E) -> Result<()>
    where
        E: TryFromPrimitive + Into<<E as TryFromPrimitive>::Primitive>,
        E::Primitive: Primitive,
    {
        self.write::<E::Primitive>(value.into())
    }

    /// Writes a string field occupying exactly `width` bytes.
    ///
    /// Text that does not fit is truncated; the terminator is written when there is room and the
    /// rest of the field is filled with `padding`.
    pub fn write_fixed_str(
        &mut self,
        text: &str,
        width: usize,
        encoding: TextEncoding,
        padding: u8,
    ) -> Result<()> {
        let bytes = encoding.fixed(text, width, padding)?;
        self.write_bytes(&bytes)
    }

    /// Writes a string followed by its terminator.
    pub fn write_terminated_str(&mut self, text: &str, encoding: TextEncoding) -> Result<()> {
        let mut bytes = encoding.encode(text)?;
        bytes.resize(bytes.len() + encoding.terminator_width(), 0);
        self.write_bytes(&bytes)
    }

    pub fn write_vector2(&mut self, value: Vec2) -> Result<()> {
        self.write_array(&value.to_array())
    }

    pub fn write_vector3(&mut self, value: Vec3) -> Result<()> {
        self.write_array(&value.to_array())
    }

    pub fn write_vector4(&mut self, value: Vec4) -> Result<()> {
        self.write_array(&value.to_array())
    }

    /// Writes a color as red, green, blue, alpha.
    pub fn write_rgba(&mut self, color: Color) -> Result<()> {
        self.write_bytes(&color.to_rgba())
    }

    /// Writes a color as alpha, red, green, blue.
    pub fn write_argb(&mut self, color: Color) -> Result<()> {
        self.write_bytes(&color.to_argb())
    }

    /// Writes a color as blue, green, red, alpha.
    pub fn write_bgra(&mut self, color: Color) -> Result<()> {
        self.write_bytes(&color.to_bgra())
    }

    /// Writes a color as alpha, blue, green, red.
    pub fn write_abgr(&mut self, color: Color) -> Result<()> {
        self.write_bytes(&color.to_abgr())
    }

    fn reserve_slot<T>(
        &mut self,
        name: String,
        kind: &'static str,
        width: usize,
    ) -> Result<Reservation<T>> {
        let reservation =
            self.reservations
                .insert(name, kind, self.position, width, self.options.endian)?;
        self.write_pattern(width, RESERVED_BYTE)?;
        Ok(reservation)
    }

    /// Overwrites an earlier slot, returning to the current position afterwards.
    fn patch(&mut self, slot: &Slot, bytes: &[u8]) -> Result<()> {
        trace!(name = %slot.name, kind = slot.kind, offset = slot.offset, "filling reservation");
        self.step_in(slot.offset)?;
        let written = self.write_bytes(bytes);
        self.step_out()?;
        written
    }

    /// Writes a placeholder for a `T` to be filled later.
    ///
    /// A name may only be pending once for each value type.
    #[instrument(level = "trace", skip(self, name), fields(name = %name.as_ref()), err)]
    pub fn reserve<T: Primitive>(&mut self, name: impl AsRef<str>) -> Result<Reservation<T>> {
        self.reserve_slot(name.as_ref().to_string(), T::NAME, T::WIDTH)
    }

    /// Fills a slot created by [`BinaryWriter::reserve`].
    ///
    /// The value is written with the byte order that was active when the slot was reserved.
    pub fn fill<T: Primitive>(&mut self, reservation: Reservation<T>, value: T) -> Result<()> {
        let slot = self.reservations.slot(&reservation)?.clone();
        self.patch(&slot, &value.to_bytes(slot.endian))?;
        self.reservations.complete(reservation)
    }

    /// Writes a placeholder for a varint, fixing its width at the current setting.
    #[instrument(level = "trace", skip(self, name), fields(name = %name.as_ref()), err)]
    pub fn reserve_varint(&mut self, name: impl AsRef<str>) -> Result<Reservation<Varint>> {
        let width = self.options.varint_width.bytes();
        self.reserve_slot(name.as_ref().to_string(), "varint", width)
    }

    /// Fills a slot created by [`BinaryWriter::reserve_varint`].
    pub fn fill_varint(&mut self, reservation: Reservation<Varint>, value: i64) -> Result<()> {
        let slot = self.reservations.slot(&reservation)?.clone();
        let bytes = encode_varint(value, slot.width, slot.endian)?;
        self.patch(&slot, &bytes)?;
        self.reservations.complete(reservation)
    }

    /// Writes a placeholder of `len` bytes, typically for a digest over later data.
    #[instrument(level = "trace", skip(self, name), fields(name = %name.as_ref()), err)]
    pub fn reserve_bytes(&mut self, name: impl AsRef<str>, len: usize) -> Result<Reservation<Bytes>> {
        self.reserve_slot(name.as_ref().to_string(), "bytes", len)
    }

    /// Fills a slot created by [`BinaryWriter::reserve_bytes`] with exactly as many bytes.
    pub fn fill_bytes(&mut self, reservation: Reservation<Bytes>, bytes: &[u8]) -> Result<()> {
        let slot = self.reservations.slot(&reservation)?.clone();
        if slot.width != bytes.len() {
            return Err(Error::ReservationWidth {
                name: slot.name,
                width: slot.width,
                actual: bytes.len(),
            });
        }
        self.patch(&slot, bytes)?;
        self.reservations.complete(reservation)
    }

    /// Names of the reservations still waiting to be filled
    pub fn unfilled(&self) -> Vec<String> {
        self.reservations.unfilled()
    }

    /// Checks every reservation was filled, flushes, and returns the inner writer.
    ///
    /// On failure the error lists every unfilled reservation and the inner writer is dropped, so
    /// the partially written output cannot be mistaken for a valid file.
    #[instrument(skip(self), err)]
    pub fn finish(self) -> Result<W> {
        let BinaryWriter {
            mut inner,
            mut reservations,
            ..
        } = self;

        reservations.check()?;
        inner.flush()?;
        Ok(inner)
    }
}

#[cfg(test)]
mod test {
    use pretty_assertions::assert_eq;
    use std::cell::Cell;
    use std::io::{self, Cursor, Seek, SeekFrom, Write};
    use std::rc::Rc;
    use tracing_test::traced_test;

    use crate::error::{Error, Result};
    use crate::primitive::{CodecOptions, Endian, VarintWidth};
    use crate::read::BinaryReader;
    use crate::text::TextEncoding;
    use crate::types::{Color, Vec2};
    use crate::write::{BinaryWriter, RESERVED_BYTE};

    fn big_endian() -> CodecOptions {
        CodecOptions::builder().endian(Endian::Big).build()
    }

    /// In-memory sink whose writes fail while `broken` is set
    #[derive(Debug, Default)]
    struct FlakySink {
        inner: Cursor<Vec<u8>>,
        broken: Rc<Cell<bool>>,
    }

    impl Write for FlakySink {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            if self.broken.get() {
                Err(io::Error::other("sink unavailable"))
            } else {
                self.inner.write(buf)
            }
        }

        fn flush(&mut self) -> io::Result<()> {
            self.inner.flush()
        }
    }

    impl Seek for FlakySink {
        fn seek(&mut self, pos: SeekFrom) -> io::Result<u64> {
            self.inner.seek(pos)
        }
    }

    #[test]
    fn write_both_byte_orders() -> Result<()> {
        let mut writer = BinaryWriter::in_memory(CodecOptions::default());
        writer.write_u16(0x1234)?;
        writer.set_endian(Endian::Big);
        writer.write_u16(0x1234)?;
        writer.write_f32(1.0)?;

        #[rustfmt::skip]
        let expected = vec![
            0x34, 0x12,
            0x12, 0x34,
            0x3F, 0x80, 0x00, 0x00,
        ];
        assert_eq!(writer.into_bytes()?, expected);
        Ok(())
    }

    #[traced_test]
    #[test]
    fn reserve_count_then_fill() -> Result<()> {
        let mut writer = BinaryWriter::in_memory(big_endian());
        let count = writer.reserve::<u32>("Count")?;
        assert_eq!(writer.position(), 4);
        writer.write_u16(0x0A)?;
        writer.write_u16(0x0B)?;
        writer.write_u16(0x0C)?;
        writer.fill(count, 3)?;
        assert_eq!(writer.position(), 10);

        let bytes = writer.into_bytes()?;
        #[rustfmt::skip]
        let expected = vec![
            0x00, 0x00, 0x00, 0x03,
            0x00, 0x0A, 0x00, 0x0B, 0x00, 0x0C,
        ];
        assert_eq!(bytes, expected);

        let mut reader = BinaryReader::from_bytes_with_options(&bytes, big_endian());
        assert_eq!(reader.read_u32()?, 3);
        assert_eq!(reader.read_array::<u16>(3)?, vec![0x0A, 0x0B, 0x0C]);
        Ok(())
    }

    #[test]
    fn reserved_slot_uses_sentinel() -> Result<()> {
        let mut writer = BinaryWriter::in_memory(CodecOptions::default());
        writer.write_u8(0)?;
        let slot = writer.reserve::<i32>("Slot")?;
        assert_eq!(
            writer.get_ref().get_ref(),
            &vec![0, RESERVED_BYTE, RESERVED_BYTE, RESERVED_BYTE, RESERVED_BYTE]
        );

        writer.fill(slot, -1)?;
        assert_eq!(writer.into_bytes()?, vec![0, 0xFF, 0xFF, 0xFF, 0xFF]);
        Ok(())
    }

    #[traced_test]
    #[test]
    fn finish_names_every_unfilled_reservation() -> Result<()> {
        let mut writer = BinaryWriter::in_memory(CodecOptions::default());
        let _names = writer.reserve::<u32>("NamesOffset")?;
        let _count = writer.reserve_varint("EntryCount")?;
        let _hash = writer.reserve_bytes("Checksum", 16)?;
        assert_eq!(writer.unfilled().len(), 3);

        match writer.into_bytes() {
            Err(Error::UnfilledReservations(names)) => assert_eq!(
                names,
                vec![
                    "NamesOffset (u32)".to_string(),
                    "EntryCount (varint)".to_string(),
                    "Checksum (bytes)".to_string(),
                ]
            ),
            other => panic!("unexpected result {other:?}"),
        }
        Ok(())
    }

    #[traced_test]
    #[test]
    fn dropping_unfinished_writer_logs_unfilled() -> Result<()> {
        {
            let mut writer = BinaryWriter::in_memory(CodecOptions::default());
            let _lost = writer.reserve::<u32>("LostOffset")?;
        }
        assert!(logs_contain("LostOffset (u32)"));
        Ok(())
    }

    #[test]
    fn duplicate_pending_name_is_rejected() -> Result<()> {
        let mut writer = BinaryWriter::in_memory(CodecOptions::default());
        let first = writer.reserve::<u32>("Offset")?;
        assert!(matches!(
            writer.reserve::<u32>("Offset"),
            Err(Error::DuplicateReservation(name)) if name == "Offset (u32)"
        ));

        // Same name with another type is a different key.
        let other = writer.reserve::<u16>("Offset")?;
        writer.fill(first, 1)?;
        writer.fill(other, 2)?;

        // Once filled, the name can be reserved again.
        let again = writer.reserve::<u32>("Offset")?;
        writer.fill(again, 3)?;
        writer.finish()?;
        Ok(())
    }

    #[test]
    fn foreign_reservation_is_rejected() -> Result<()> {
        let mut first = BinaryWriter::in_memory(CodecOptions::default());
        let mut second = BinaryWriter::in_memory(CodecOptions::default());
        let handle = first.reserve::<u32>("Offset")?;
        let keep = second.reserve::<u32>("Offset")?;

        assert!(matches!(
            second.fill(handle, 1),
            Err(Error::ForeignReservation)
        ));
        second.fill(keep, 1)?;
        second.finish()?;
        assert!(first.finish().is_err());
        Ok(())
    }

    #[test]
    fn fill_uses_reservation_byte_order() -> Result<()> {
        let mut writer = BinaryWriter::in_memory(big_endian());
        let size = writer.reserve::<u16>("Size")?;
        writer.set_endian(Endian::Little);
        writer.write_u16(0x0102)?;
        writer.fill(size, 0x0304)?;
        assert_eq!(writer.into_bytes()?, vec![0x03, 0x04, 0x02, 0x01]);
        Ok(())
    }

    #[traced_test]
    #[test]
    fn failed_patch_leaves_slot_pending() -> Result<()> {
        let sink = FlakySink::default();
        let broken = sink.broken.clone();
        let mut writer = BinaryWriter::new(sink)?;

        let size = writer.reserve::<u32>("Size")?;
        let digest = writer.reserve_bytes("Digest", 2)?;
        let count = writer.reserve_varint("Count")?;
        writer.write_u8(0xAA)?;

        broken.set(true);
        assert!(matches!(writer.fill(size, 4), Err(Error::IOError(_))));
        assert!(matches!(
            writer.fill_bytes(digest, &[1, 2]),
            Err(Error::IOError(_))
        ));
        assert!(matches!(writer.fill_varint(count, 1), Err(Error::IOError(_))));
        broken.set(false);

        assert_eq!(writer.position(), 11);
        assert_eq!(writer.depth(), 0);
        assert_eq!(
            writer.unfilled(),
            vec![
                "Size (u32)".to_string(),
                "Digest (bytes)".to_string(),
                "Count (varint)".to_string(),
            ]
        );
        assert!(matches!(
            writer.finish(),
            Err(Error::UnfilledReservations(names)) if names.len() == 3
        ));
        Ok(())
    }

    #[test]
    fn pad_to_zero_or_one_does_nothing() -> Result<()> {
        let mut writer = BinaryWriter::in_memory(CodecOptions::default());
        writer.write_u8(1)?;
        writer.pad(0)?;
        writer.pad(1)?;
        assert_eq!(writer.position(), 1);
        writer.pad(4)?;
        assert_eq!(writer.into_bytes()?, vec![1, 0, 0, 0]);
        Ok(())
    }

    #[test]
    fn varint_reservation_keeps_width() -> Result<()> {
        let mut writer = BinaryWriter::in_memory(CodecOptions::default());
        let short = writer.reserve_varint("Short")?;
        writer.set_varint_width(VarintWidth::Eight);
        let long = writer.reserve_varint("Long")?;
        writer.fill_varint(short, 7)?;
        writer.fill_varint(long, -1)?;

        #[rustfmt::skip]
        let expected = vec![
            0x07, 0x00, 0x00, 0x00,
            0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF,
        ];
        assert_eq!(writer.into_bytes()?, expected);
        Ok(())
    }

    #[test]
    fn overflowing_varint_fill_leaves_slot_pending() -> Result<()> {
        let mut writer = BinaryWriter::in_memory(CodecOptions::default());
        let count = writer.reserve_varint("Count")?;
        assert!(matches!(
            writer.fill_varint(count, i64::MAX),
            Err(Error::VarintOverflow { width: 4, .. })
        ));
        assert_eq!(writer.unfilled(), vec!["Count (varint)".to_string()]);
        assert!(matches!(
            writer.write_varint(i64::from(i32::MIN) - 1),
            Err(Error::VarintOverflow { .. })
        ));
        assert!(writer.finish().is_err());
        Ok(())
    }

    #[test]
    fn big_endian_varint_fill() -> Result<()> {
        let mut writer = BinaryWriter::in_memory(big_endian());
        let count = writer.reserve_varint("Count")?;
        writer.fill_varint(count, 0x0102)?;
        assert_eq!(writer.into_bytes()?, vec![0x00, 0x00, 0x01, 0x02]);
        Ok(())
    }

    #[test]
    fn byte_reservation_checks_length() -> Result<()> {
        let mut writer = BinaryWriter::in_memory(CodecOptions::default());
        let digest = writer.reserve_bytes("Digest", 4)?;
        writer.write_bytes(b"data")?;
        writer.fill_bytes(digest, &[1, 2, 3, 4])?;
        assert_eq!(writer.into_bytes()?, b"\x01\x02\x03\x04data".to_vec());

        let mut writer = BinaryWriter::in_memory(CodecOptions::default());
        let digest = writer.reserve_bytes("Digest", 4)?;
        assert!(matches!(
            writer.fill_bytes(digest, b"toolong"),
            Err(Error::ReservationWidth { width: 4, actual: 7, .. })
        ));
        assert!(writer.finish().is_err());
        Ok(())
    }

    #[test]
    fn writer_steps_and_extends() -> Result<()> {
        let mut writer = BinaryWriter::in_memory(CodecOptions::default());
        writer.write_pattern(4, 0)?;
        writer.step_in(1)?;
        writer.write_u8(0xAA)?;
        writer.step_out()?;
        assert_eq!(writer.position(), 4);
        writer.write_u8(0xBB)?;
        assert!(matches!(writer.step_out(), Err(Error::StepOutOfEmptyStack)));
        assert_eq!(writer.len(), 5);
        assert_eq!(writer.into_bytes()?, vec![0, 0xAA, 0, 0, 0xBB]);
        Ok(())
    }

    #[test]
    fn fixed_strings_are_exact_width() -> Result<()> {
        let mut writer = BinaryWriter::in_memory(CodecOptions::default());
        writer.write_fixed_str("CORE", 8, TextEncoding::Ascii, 0x20)?;
        writer.write_fixed_str("OVERFLOWING", 4, TextEncoding::Ascii, 0)?;
        writer.write_fixed_str("ab", 6, TextEncoding::Utf16Le, 0xFF)?;
        assert_eq!(writer.position(), 18);

        let bytes = writer.into_bytes()?;
        assert_eq!(&bytes[..8], b"CORE\0   ");
        assert_eq!(&bytes[8..12], b"OVER");
        assert_eq!(&bytes[12..], &[0x61, 0x00, 0x62, 0x00, 0x00, 0x00]);

        let mut reader = BinaryReader::from_bytes(&bytes);
        assert_eq!(reader.read_fixed_str(8, TextEncoding::Ascii)?, "CORE");
        assert_eq!(reader.read_fixed_str(4, TextEncoding::Ascii)?, "OVER");
        assert_eq!(reader.read_fixed_str(6, TextEncoding::Utf16Le)?, "ab");
        Ok(())
    }

    #[test]
    fn aggregates_round_trip() -> Result<()> {
        let mut writer = BinaryWriter::in_memory(big_endian());
        writer.write_vector2(Vec2::new(0.5, -2.0))?;
        writer.write_bgra(Color::new(1, 2, 3, 4))?;
        writer.write_terminated_str("ブースター", TextEncoding::ShiftJis)?;
        writer.write_bool(true)?;
        let bytes = writer.into_bytes()?;

        let mut reader = BinaryReader::from_bytes_with_options(&bytes, big_endian());
        assert_eq!(reader.read_vector2()?, Vec2::new(0.5, -2.0));
        assert_eq!(reader.read_bgra()?, Color::new(1, 2, 3, 4));
        assert_eq!(
            reader.read_terminated_str(TextEncoding::ShiftJis)?,
            "ブースター"
        );
        assert!(reader.read_bool()?);
        Ok(())
    }

    #[test]
    fn writer_over_existing_stream() -> Result<()> {
        let mut cursor = Cursor::new(vec![0xAA, 0xBB]);
        cursor.set_position(2);
        let mut writer = BinaryWriter::new(&mut cursor)?;
        assert_eq!(writer.position(), 2);
        let size = writer.reserve::<u8>("Size")?;
        writer.write_u8(0xCC)?;
        writer.fill(size, 1)?;
        writer.finish()?;
        assert_eq!(cursor.into_inner(), vec![0xAA, 0xBB, 0x01, 0xCC]);
        Ok(())
    }
}
