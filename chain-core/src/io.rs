//! Binary wire codec
//!
//! All fixed-width integers are little-endian. Collection lengths use the
//! variable-length integer form: values below `0xfd` take one byte, larger
//! values are prefixed with `0xfd` (u16), `0xfe` (u32) or `0xff` (u64).

use crate::{CoreError, CoreResult, Fixed8, Hash160, Hash256};
use bytes::{Buf, BufMut, BytesMut};

/// Types with a canonical binary encoding
pub trait Serializable: Sized {
    /// Append the encoding of `self` to the writer
    fn serialize(&self, writer: &mut BinaryWriter);

    /// Read one value from the reader
    fn deserialize(reader: &mut BinaryReader<'_>) -> CoreResult<Self>;

    /// Encode into a fresh byte vector
    fn to_bytes(&self) -> Vec<u8> {
        let mut writer = BinaryWriter::new();
        self.serialize(&mut writer);
        writer.into_bytes()
    }

    /// Decode from a byte slice, rejecting trailing bytes
    fn from_bytes(bytes: &[u8]) -> CoreResult<Self> {
        let mut reader = BinaryReader::new(bytes);
        let value = Self::deserialize(&mut reader)?;
        reader.finish()?;
        Ok(value)
    }
}

/// Growable output buffer
#[derive(Debug, Default)]
pub struct BinaryWriter {
    buf: BytesMut,
}

impl BinaryWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn write_u8(&mut self, value: u8) {
        self.buf.put_u8(value);
    }

    pub fn write_u16(&mut self, value: u16) {
        self.buf.put_u16_le(value);
    }

    pub fn write_u32(&mut self, value: u32) {
        self.buf.put_u32_le(value);
    }

    pub fn write_u64(&mut self, value: u64) {
        self.buf.put_u64_le(value);
    }

    pub fn write_i64(&mut self, value: i64) {
        self.buf.put_i64_le(value);
    }

    /// Write raw bytes without a length prefix
    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.buf.put_slice(bytes);
    }

    pub fn write_var_int(&mut self, value: u64) {
        if value < 0xfd {
            self.write_u8(value as u8);
        } else if value <= 0xffff {
            self.write_u8(0xfd);
            self.write_u16(value as u16);
        } else if value <= 0xffff_ffff {
            self.write_u8(0xfe);
            self.write_u32(value as u32);
        } else {
            self.write_u8(0xff);
            self.write_u64(value);
        }
    }

    pub fn write_var_bytes(&mut self, bytes: &[u8]) {
        self.write_var_int(bytes.len() as u64);
        self.write_bytes(bytes);
    }

    pub fn write_var_string(&mut self, value: &str) {
        self.write_var_bytes(value.as_bytes());
    }

    pub fn write_fixed8(&mut self, value: Fixed8) {
        self.write_i64(value.raw());
    }

    pub fn write_hash256(&mut self, hash: &Hash256) {
        self.write_bytes(hash.as_bytes());
    }

    pub fn write_hash160(&mut self, hash: &Hash160) {
        self.write_bytes(hash.as_bytes());
    }

    /// Write a length-prefixed array of serializable items
    pub fn write_array<T: Serializable>(&mut self, items: &[T]) {
        self.write_var_int(items.len() as u64);
        for item in items {
            item.serialize(self);
        }
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buf.is_empty()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf.to_vec()
    }
}

/// Cursor over an input slice
#[derive(Debug)]
pub struct BinaryReader<'a> {
    buf: &'a [u8],
}

impl<'a> BinaryReader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf }
    }

    /// Number of unread bytes
    pub fn remaining(&self) -> usize {
        self.buf.remaining()
    }

    fn ensure(&self, needed: usize) -> CoreResult<()> {
        if self.buf.remaining() < needed {
            return Err(CoreError::UnexpectedEof {
                needed,
                remaining: self.buf.remaining(),
            });
        }
        Ok(())
    }

    pub fn read_u8(&mut self) -> CoreResult<u8> {
        self.ensure(1)?;
        Ok(self.buf.get_u8())
    }

    pub fn read_u16(&mut self) -> CoreResult<u16> {
        self.ensure(2)?;
        Ok(self.buf.get_u16_le())
    }

    pub fn read_u32(&mut self) -> CoreResult<u32> {
        self.ensure(4)?;
        Ok(self.buf.get_u32_le())
    }

    pub fn read_u64(&mut self) -> CoreResult<u64> {
        self.ensure(8)?;
        Ok(self.buf.get_u64_le())
    }

    pub fn read_i64(&mut self) -> CoreResult<i64> {
        self.ensure(8)?;
        Ok(self.buf.get_i64_le())
    }

    /// Read exactly `len` raw bytes
    pub fn read_bytes(&mut self, len: usize) -> CoreResult<Vec<u8>> {
        self.ensure(len)?;
        let mut bytes = vec![0u8; len];
        self.buf.copy_to_slice(&mut bytes);
        Ok(bytes)
    }

    /// Read a fixed-size array
    pub fn read_array_of<const N: usize>(&mut self) -> CoreResult<[u8; N]> {
        self.ensure(N)?;
        let mut bytes = [0u8; N];
        self.buf.copy_to_slice(&mut bytes);
        Ok(bytes)
    }

    /// Read a variable-length integer, rejecting values above `max`
    pub fn read_var_int(&mut self, max: u64) -> CoreResult<u64> {
        let value = match self.read_u8()? {
            0xfd => u64::from(self.read_u16()?),
            0xfe => u64::from(self.read_u32()?),
            0xff => self.read_u64()?,
            small => u64::from(small),
        };
        if value > max {
            return Err(CoreError::Format(format!(
                "var int {} exceeds maximum {}",
                value, max
            )));
        }
        Ok(value)
    }

    pub fn read_var_bytes(&mut self, max: usize) -> CoreResult<Vec<u8>> {
        let len = self.read_var_int(max as u64)? as usize;
        self.read_bytes(len)
    }

    pub fn read_var_string(&mut self, max: usize) -> CoreResult<String> {
        let bytes = self.read_var_bytes(max)?;
        String::from_utf8(bytes).map_err(|e| CoreError::Format(e.to_string()))
    }

    pub fn read_fixed8(&mut self) -> CoreResult<Fixed8> {
        Ok(Fixed8::from_raw(self.read_i64()?))
    }

    pub fn read_hash256(&mut self) -> CoreResult<Hash256> {
        Ok(Hash256::new(self.read_array_of::<32>()?))
    }

    pub fn read_hash160(&mut self) -> CoreResult<Hash160> {
        Ok(Hash160::new(self.read_array_of::<20>()?))
    }

    /// Read a length-prefixed array of serializable items
    pub fn read_array<T: Serializable>(&mut self, max: usize) -> CoreResult<Vec<T>> {
        let count = self.read_var_int(max as u64)? as usize;
        let mut items = Vec::with_capacity(count.min(self.remaining()));
        for _ in 0..count {
            items.push(T::deserialize(self)?);
        }
        Ok(items)
    }

    /// Fail unless the whole input has been consumed
    pub fn finish(&self) -> CoreResult<()> {
        if self.buf.has_remaining() {
            return Err(CoreError::Format(format!(
                "{} trailing bytes",
                self.buf.remaining()
            )));
        }
        Ok(())
    }
}
