//! Byte-level primitives shared by the transaction codec.
//!
//! Decoding works over an in-memory slice through [`Reader`], which reads each field with
//! `zcash_encoding` and `byteorder` and tags every failure with the name of that field.
//! Encoding writes through any [`std::io::Write`], so the same writers serve both
//! `Vec<u8>` buffers and hash states.

use std::io::{self, Read};

use byteorder::{LittleEndian, ReadBytesExt};
use zcash_encoding::{CompactSize, Vector};

use crate::transaction::Error;

/// Maps an I/O failure while reading `field` onto the codec's error taxonomy.
///
/// Reads from a slice fail only by running out of input, or by `zcash_encoding`
/// rejecting a CompactSize that is non-canonical or too large.
fn field_error(e: io::Error, field: &'static str) -> Error {
    match e.kind() {
        io::ErrorKind::UnexpectedEof => Error::UnexpectedEof { field },
        _ => Error::MalformedLength { field },
    }
}

/// Bounds a preallocation by the number of items the remaining input could hold.
pub(crate) fn capacity_hint(count: u64, remaining: usize, min_item_size: u64) -> usize {
    let fits = remaining as u64 / min_item_size.max(1);
    usize::try_from(count.min(fits)).unwrap_or(0)
}

/// A cursor over an in-memory byte slice.
pub(crate) struct Reader<'a> {
    data: &'a [u8],
    rest: &'a [u8],
}

impl<'a> Reader<'a> {
    pub(crate) fn new(data: &'a [u8]) -> Self {
        Reader { data, rest: data }
    }

    pub(crate) fn remaining(&self) -> usize {
        self.rest.len()
    }

    /// Returns the bytes consumed so far.
    pub(crate) fn consumed(&self) -> &'a [u8] {
        &self.data[..self.data.len() - self.rest.len()]
    }

    fn read_field<T>(
        &mut self,
        field: &'static str,
        read: impl FnOnce(&mut &'a [u8]) -> io::Result<T>,
    ) -> Result<T, Error> {
        read(&mut self.rest).map_err(|e| field_error(e, field))
    }

    pub(crate) fn read_array<const N: usize>(
        &mut self,
        field: &'static str,
    ) -> Result<[u8; N], Error> {
        self.read_field(field, |r| {
            let mut repr = [0u8; N];
            r.read_exact(&mut repr)?;
            Ok(repr)
        })
    }

    pub(crate) fn read_u32_le(&mut self, field: &'static str) -> Result<u32, Error> {
        self.read_field(field, |r| r.read_u32::<LittleEndian>())
    }

    pub(crate) fn read_u64_le(&mut self, field: &'static str) -> Result<u64, Error> {
        self.read_field(field, |r| r.read_u64::<LittleEndian>())
    }

    pub(crate) fn read_i64_le(&mut self, field: &'static str) -> Result<i64, Error> {
        self.read_field(field, |r| r.read_i64::<LittleEndian>())
    }

    /// Reads a canonically-encoded CompactSize no larger than `0x02000000`.
    pub(crate) fn read_compact_size(&mut self, field: &'static str) -> Result<u64, Error> {
        self.read_field(field, |r| CompactSize::read(r))
    }

    /// Reads a CompactSize length prefix followed by that many bytes.
    pub(crate) fn read_vector(&mut self, field: &'static str) -> Result<Vec<u8>, Error> {
        self.read_field(field, |r| Vector::read(r, |r| r.read_u8()))
    }

    pub(crate) fn skip(&mut self, len: u64, field: &'static str) -> Result<(), Error> {
        let len = usize::try_from(len).map_err(|_| Error::MalformedLength { field })?;
        if len > self.rest.len() {
            return Err(Error::UnexpectedEof { field });
        }
        self.rest = &self.rest[len..];
        Ok(())
    }

    /// Discards `count` fixed-size items.
    pub(crate) fn skip_items(
        &mut self,
        count: u64,
        item_size: u64,
        field: &'static str,
    ) -> Result<(), Error> {
        let len = count
            .checked_mul(item_size)
            .ok_or(Error::MalformedLength { field })?;
        tracing::trace!(field, len, "skipping shielded data");
        self.skip(len, field)
    }

    /// Fails if any input is left unconsumed.
    pub(crate) fn finish(self) -> Result<(), Error> {
        match self.remaining() {
            0 => Ok(()),
            remaining => Err(Error::TrailingData { remaining }),
        }
    }
}
