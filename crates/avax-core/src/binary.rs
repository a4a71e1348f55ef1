//! Big-endian binary reader/writer for the node wire format
//!
//! Every multi-byte integer is big-endian. Variable-length collections are
//! preceded by a u32 element count. Decoding never reads past the end of the
//! buffer; truncated input fails with [`Error::BufferUnderflow`].

use crate::{Error, Result};

/// Pack `value` into exactly `width` big-endian bytes.
///
/// Fails with [`Error::OutOfRange`] if `width` is not in `1..=8` or the value
/// does not fit.
pub fn pack_uint(value: u64, width: usize) -> Result<Vec<u8>> {
    if width == 0 || width > 8 {
        return Err(Error::OutOfRange(format!(
            "byte width {} not in 1..=8",
            width
        )));
    }
    if width < 8 && value >> (8 * width) != 0 {
        return Err(Error::OutOfRange(format!(
            "{} does not fit in {} bytes",
            value, width
        )));
    }
    Ok(value.to_be_bytes()[8 - width..].to_vec())
}

/// Append-only big-endian writer
#[derive(Debug, Default, Clone)]
pub struct Writer {
    buf: Vec<u8>,
}

impl Writer {
    /// Create an empty writer
    pub fn new() -> Self {
        Self { buf: Vec::new() }
    }

    /// Create a writer with preallocated capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
        }
    }

    /// Write a single byte
    pub fn write_u8(&mut self, value: u8) {
        self.buf.push(value);
    }

    /// Write a u16
    pub fn write_u16(&mut self, value: u16) {
        self.buf.extend_from_slice(&value.to_be_bytes());
    }

    /// Write a u32
    pub fn write_u32(&mut self, value: u32) {
        self.buf.extend_from_slice(&value.to_be_bytes());
    }

    /// Write a u64
    pub fn write_u64(&mut self, value: u64) {
        self.buf.extend_from_slice(&value.to_be_bytes());
    }

    /// Write raw bytes with no prefix
    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.buf.extend_from_slice(bytes);
    }

    /// Write a u32 element count
    pub fn write_len(&mut self, len: usize) -> Result<()> {
        let len = u32::try_from(len)
            .map_err(|_| Error::OutOfRange(format!("collection length {} exceeds u32", len)))?;
        self.write_u32(len);
        Ok(())
    }

    /// Write u32-length-prefixed bytes
    pub fn write_sized_bytes(&mut self, bytes: &[u8]) -> Result<()> {
        self.write_len(bytes.len())?;
        self.write_bytes(bytes);
        Ok(())
    }

    /// Bytes written so far
    pub fn len(&self) -> usize {
        self.buf.len()
    }

    /// Whether nothing has been written
    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    /// Borrow the written bytes
    pub fn as_slice(&self) -> &[u8] {
        &self.buf
    }

    /// Consume the writer
    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }
}

/// Offset-tracking big-endian reader
#[derive(Debug, Clone)]
pub struct Reader<'a> {
    bytes: &'a [u8],
    offset: usize,
}

impl<'a> Reader<'a> {
    /// Read from the start of `bytes`
    pub fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, offset: 0 }
    }

    /// Read from `offset` into `bytes`
    pub fn at(bytes: &'a [u8], offset: usize) -> Result<Self> {
        if offset > bytes.len() {
            return Err(Error::BufferUnderflow(format!(
                "offset {} past end of {}-byte buffer",
                offset,
                bytes.len()
            )));
        }
        Ok(Self { bytes, offset })
    }

    /// Next unread offset
    pub fn offset(&self) -> usize {
        self.offset
    }

    /// Bytes left to read
    pub fn remaining(&self) -> usize {
        self.bytes.len() - self.offset
    }

    /// Whether all bytes have been consumed
    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    fn take(&mut self, len: usize, what: &str) -> Result<&'a [u8]> {
        let end = self
            .offset
            .checked_add(len)
            .filter(|end| *end <= self.bytes.len())
            .ok_or_else(|| {
                Error::BufferUnderflow(format!(
                    "reading {} ({} bytes) at offset {}, {} remaining",
                    what,
                    len,
                    self.offset,
                    self.remaining()
                ))
            })?;
        let slice = &self.bytes[self.offset..end];
        self.offset = end;
        Ok(slice)
    }

    /// Read a single byte
    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.take(1, "u8")?[0])
    }

    /// Read a u16
    pub fn read_u16(&mut self) -> Result<u16> {
        Ok(u16::from_be_bytes(self.read_array()?))
    }

    /// Read a u32
    pub fn read_u32(&mut self) -> Result<u32> {
        Ok(u32::from_be_bytes(self.read_array()?))
    }

    /// Read a u64
    pub fn read_u64(&mut self) -> Result<u64> {
        Ok(u64::from_be_bytes(self.read_array()?))
    }

    /// Read a fixed-size array
    pub fn read_array<const N: usize>(&mut self) -> Result<[u8; N]> {
        let slice = self.take(N, "fixed array")?;
        let mut out = [0u8; N];
        out.copy_from_slice(slice);
        Ok(out)
    }

    /// Read `len` raw bytes
    pub fn read_bytes(&mut self, len: usize) -> Result<&'a [u8]> {
        self.take(len, "bytes")
    }

    /// Read a u32 element count.
    ///
    /// `min_element_size` bounds the count by the bytes left so a corrupt
    /// count cannot trigger a huge allocation.
    pub fn read_len(&mut self, min_element_size: usize) -> Result<usize> {
        let len = self.read_u32()? as usize;
        let needed = len.saturating_mul(min_element_size.max(1));
        if min_element_size > 0 && needed > self.remaining() {
            return Err(Error::BufferUnderflow(format!(
                "count {} needs at least {} bytes, {} remaining",
                len,
                needed,
                self.remaining()
            )));
        }
        Ok(len)
    }

    /// Read u32-length-prefixed bytes
    pub fn read_sized_bytes(&mut self) -> Result<&'a [u8]> {
        let len = self.read_len(1)?;
        self.take(len, "sized bytes")
    }

    /// Fail if unread bytes remain
    pub fn finish(&self) -> Result<()> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(Error::InvalidEncoding(format!(
                "{} trailing bytes after offset {}",
                self.remaining(),
                self.offset
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pack_uint_widths() {
        assert_eq!(pack_uint(0x0102, 2).unwrap(), vec![0x01, 0x02]);
        assert_eq!(pack_uint(0x0102, 4).unwrap(), vec![0, 0, 0x01, 0x02]);
        assert_eq!(pack_uint(u64::MAX, 8).unwrap(), vec![0xff; 8]);
        assert_eq!(pack_uint(255, 1).unwrap(), vec![0xff]);
    }

    #[test]
    fn test_pack_uint_out_of_range() {
        assert!(matches!(pack_uint(256, 1), Err(Error::OutOfRange(_))));
        assert!(matches!(pack_uint(1 << 32, 4), Err(Error::OutOfRange(_))));
        assert!(matches!(pack_uint(1, 0), Err(Error::OutOfRange(_))));
        assert!(matches!(pack_uint(1, 9), Err(Error::OutOfRange(_))));
    }

    #[test]
    fn test_writer_big_endian() {
        let mut w = Writer::new();
        w.write_u8(0xaa);
        w.write_u16(0x0102);
        w.write_u32(0x03040506);
        w.write_u64(0x0708090a0b0c0d0e);
        w.write_sized_bytes(&[0xee, 0xff]).unwrap();
        assert_eq!(
            w.into_bytes(),
            vec![
                0xaa, 0x01, 0x02, 0x03, 0x04, 0x05, 0x06, 0x07, 0x08, 0x09, 0x0a, 0x0b, 0x0c,
                0x0d, 0x0e, 0x00, 0x00, 0x00, 0x02, 0xee, 0xff
            ]
        );
    }

    #[test]
    fn test_reader_tracks_offset() {
        let bytes = [0x00, 0x01, 0x00, 0x00, 0x00, 0x02, 0xab];
        let mut r = Reader::new(&bytes);
        assert_eq!(r.read_u16().unwrap(), 1);
        assert_eq!(r.offset(), 2);
        assert_eq!(r.read_u32().unwrap(), 2);
        assert_eq!(r.read_u8().unwrap(), 0xab);
        assert!(r.is_empty());
        assert!(r.finish().is_ok());
    }

    #[test]
    fn test_reader_at_offset() {
        let bytes = [0xff, 0xff, 0x00, 0x07];
        let mut r = Reader::at(&bytes, 2).unwrap();
        assert_eq!(r.read_u16().unwrap(), 7);
        assert!(Reader::at(&bytes, 5).is_err());
    }

    #[test]
    fn test_reader_underflow() {
        let mut r = Reader::new(&[0x00, 0x01]);
        assert!(matches!(r.read_u32(), Err(Error::BufferUnderflow(_))));
        // Failed reads do not advance
        assert_eq!(r.offset(), 0);
    }

    #[test]
    fn test_read_len_guards_allocation() {
        let bytes = [0xff, 0xff, 0xff, 0xff, 0x00];
        let mut r = Reader::new(&bytes);
        assert!(matches!(r.read_len(20), Err(Error::BufferUnderflow(_))));
    }

    #[test]
    fn test_finish_rejects_trailing() {
        let r = Reader::new(&[0x01]);
        assert!(matches!(r.finish(), Err(Error::InvalidEncoding(_))));
    }
}
