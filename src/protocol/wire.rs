//! Little-endian primitive encoding shared by every message layout.
//!
//! Fields are fixed-width and written back to back with no padding, no
//! length prefixes and no alignment. Optional doubles use the [`ABSENT`]
//! sentinel instead of a presence byte.

use crate::error::ProtocolError;

/// Sentinel written in place of an absent optional double.
///
/// A genuine value of exactly `-1.0` is indistinguishable from "absent" and
/// decodes as `None`.
pub const ABSENT: f64 = -1.0;

/// Sentinel written in place of an absent optional signed byte.
pub const ABSENT_I8: i8 = -1;

pub(crate) const I32_LEN: usize = 4;
pub(crate) const I64_LEN: usize = 8;
pub(crate) const F64_LEN: usize = 8;
pub(crate) const U8_LEN: usize = 1;

/// Appends primitives to an owned buffer.
#[derive(Debug, Default)]
pub struct WireWriter {
    buf: Vec<u8>,
}

impl WireWriter {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buf: Vec::with_capacity(capacity),
        }
    }

    #[inline]
    pub fn put_u8(&mut self, value: u8) {
        self.buf.push(value);
    }

    #[inline]
    pub fn put_i8(&mut self, value: i8) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    #[inline]
    pub fn put_i32(&mut self, value: i32) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    #[inline]
    pub fn put_i64(&mut self, value: i64) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    #[inline]
    pub fn put_f64(&mut self, value: f64) {
        self.buf.extend_from_slice(&value.to_le_bytes());
    }

    #[inline]
    pub fn put_opt_f64(&mut self, value: Option<f64>) {
        self.put_f64(value.unwrap_or(ABSENT));
    }

    #[inline]
    pub fn put_opt_i8(&mut self, value: Option<i8>) {
        self.put_i8(value.unwrap_or(ABSENT_I8));
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }
}

/// Cursor over a received payload.
///
/// Every read checks the remaining length first, so a short buffer always
/// yields [`ProtocolError::Truncated`] and never a partially filled value.
#[derive(Debug)]
pub struct WireReader<'a> {
    buf: &'a [u8],
    pos: usize,
    opcode: u8,
}

impl<'a> WireReader<'a> {
    /// `opcode` is only used to label truncation errors.
    pub fn new(opcode: u8, buf: &'a [u8]) -> Self {
        Self { buf, pos: 0, opcode }
    }

    pub fn opcode(&self) -> u8 {
        self.opcode
    }

    pub fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    /// Fails unless `len` more bytes are available.
    pub fn require(&self, len: usize) -> Result<(), ProtocolError> {
        if self.remaining() < len {
            return Err(ProtocolError::Truncated {
                opcode: self.opcode,
                needed: self.pos + len,
                available: self.buf.len(),
            });
        }
        Ok(())
    }

    fn take<const N: usize>(&mut self) -> Result<[u8; N], ProtocolError> {
        self.require(N)?;
        let mut out = [0u8; N];
        out.copy_from_slice(&self.buf[self.pos..self.pos + N]);
        self.pos += N;
        Ok(out)
    }

    #[inline]
    pub fn u8(&mut self) -> Result<u8, ProtocolError> {
        Ok(self.take::<1>()?[0])
    }

    #[inline]
    pub fn i8(&mut self) -> Result<i8, ProtocolError> {
        Ok(i8::from_le_bytes(self.take::<1>()?))
    }

    #[inline]
    pub fn i32(&mut self) -> Result<i32, ProtocolError> {
        Ok(i32::from_le_bytes(self.take::<4>()?))
    }

    #[inline]
    pub fn i64(&mut self) -> Result<i64, ProtocolError> {
        Ok(i64::from_le_bytes(self.take::<8>()?))
    }

    #[inline]
    pub fn f64(&mut self) -> Result<f64, ProtocolError> {
        Ok(f64::from_le_bytes(self.take::<8>()?))
    }

    #[inline]
    pub fn opt_f64(&mut self) -> Result<Option<f64>, ProtocolError> {
        let value = self.f64()?;
        Ok(if value == ABSENT { None } else { Some(value) })
    }

    #[inline]
    pub fn opt_i8(&mut self) -> Result<Option<i8>, ProtocolError> {
        let value = self.i8()?;
        Ok(if value == ABSENT_I8 { None } else { Some(value) })
    }
}
