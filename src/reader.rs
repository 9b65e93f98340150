//! Streaming reader (spec §4.1).
//!
//! Maintains a rolling buffer refilled from a [`crate::import::Source`].
//! `peek`/`read`/`skip`/`read_to` are the only primitives the parsers use;
//! neither front-end touches the source directly.

use crate::error::{Error, Result};
use ufbx_data::error::ErrorKind;

/// Minimum refill chunk; buffer doubles up to `max_buffer_size` from here.
const INITIAL_BUFFER_SIZE: usize = 4096;

pub struct Reader<'a> {
    source: Box<dyn FnMut(&mut [u8]) -> usize + 'a>,
    buf: Vec<u8>,
    /// Start of unread data within `buf`.
    data_offset: usize,
    /// End of unread data within `buf`.
    data_size: usize,
    max_buffer_size: usize,
    eof: bool,
    pub total_consumed: u64,
}

impl<'a> Reader<'a> {
    pub fn new(source: impl FnMut(&mut [u8]) -> usize + 'a, max_buffer_size: usize) -> Self {
        Reader {
            source: Box::new(source),
            buf: Vec::new(),
            data_offset: 0,
            data_size: 0,
            max_buffer_size: max_buffer_size.max(INITIAL_BUFFER_SIZE),
            eof: false,
            total_consumed: 0,
        }
    }

    /// From an in-memory byte slice, avoiding the callback indirection for
    /// the common `Source::Memory` case.
    pub fn from_slice(data: &'a [u8]) -> Self {
        let mut cursor = 0usize;
        let len = data.len();
        Reader::new(
            move |dst| {
                let remaining = len - cursor;
                let n = remaining.min(dst.len());
                dst[..n].copy_from_slice(&data[cursor..cursor + n]);
                cursor += n;
                n
            },
            len.max(INITIAL_BUFFER_SIZE),
        )
    }

    fn available(&self) -> usize {
        self.data_size - self.data_offset
    }

    /// Doubles the buffer (capped at `max_buffer_size`), slides unread
    /// bytes to the front, and pulls more data from the source.
    fn refill(&mut self, need: usize) -> Result<()> {
        if self.eof {
            return Err(Error::new(ErrorKind::Truncated, "refill", line!(), "source exhausted"));
        }

        let unread = self.available();
        let mut new_cap = self.buf.len().max(INITIAL_BUFFER_SIZE);
        while new_cap - unread < need {
            new_cap = (new_cap * 2).min(self.max_buffer_size.max(new_cap * 2));
        }
        if new_cap > self.buf.len() {
            self.buf.resize(new_cap, 0);
        }
        // Slide the unread tail to the front.
        self.buf.copy_within(self.data_offset..self.data_size, 0);
        self.data_size = unread;
        self.data_offset = 0;

        let room = self.buf.len() - self.data_size;
        let n = (self.source)(&mut self.buf[self.data_size..self.data_size + room]);
        if n == 0 {
            self.eof = true;
        }
        self.data_size += n;
        Ok(())
    }

    /// Returns a pointer to at least `n` contiguous bytes without
    /// consuming them, refilling as needed.
    pub fn peek(&mut self, n: usize) -> Result<&[u8]> {
        while self.available() < n {
            let before = self.available();
            self.refill(n)?;
            if self.available() == before && self.eof {
                return Err(Error::new(ErrorKind::Truncated, "peek", line!(), format!("needed {n} bytes, {before} available")));
            }
        }
        Ok(&self.buf[self.data_offset..self.data_offset + n])
    }

    /// Reads and consumes exactly `n` bytes.
    pub fn read(&mut self, n: usize) -> Result<&[u8]> {
        self.peek(n)?;
        let start = self.data_offset;
        self.data_offset += n;
        self.total_consumed += n as u64;
        Ok(&self.buf[start..start + n])
    }

    pub fn read_to(&mut self, dst: &mut [u8]) -> Result<()> {
        let bytes = self.read(dst.len())?;
        dst.copy_from_slice(bytes);
        Ok(())
    }

    pub fn skip(&mut self, n: usize) -> Result<()> {
        let mut remaining = n;
        while remaining > 0 {
            let chunk = remaining.min(self.max_buffer_size.max(INITIAL_BUFFER_SIZE));
            self.read(chunk.min(remaining))?;
            remaining -= chunk.min(remaining);
        }
        Ok(())
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        Ok(self.read(1)?[0])
    }

    pub fn read_i8(&mut self) -> Result<i8> {
        Ok(self.read(1)?[0] as i8)
    }

    pub fn read_i16_le(&mut self) -> Result<i16> {
        let b = self.read(2)?;
        Ok(i16::from_le_bytes([b[0], b[1]]))
    }

    pub fn read_u32_le(&mut self) -> Result<u32> {
        let b = self.read(4)?;
        Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
    }

    pub fn read_u64_le(&mut self) -> Result<u64> {
        let b = self.read(8)?;
        Ok(u64::from_le_bytes(b.try_into().unwrap()))
    }

    pub fn read_i32_le(&mut self) -> Result<i32> {
        Ok(self.read_u32_le()? as i32)
    }

    pub fn read_f32_le(&mut self) -> Result<f32> {
        Ok(f32::from_bits(self.read_u32_le()?))
    }

    pub fn read_f64_le(&mut self) -> Result<f64> {
        Ok(f64::from_bits(self.read_u64_le()?))
    }

    pub fn position(&self) -> u64 {
        self.total_consumed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_across_refill_boundary() {
        let data: Vec<u8> = (0..20000u32).map(|v| (v % 256) as u8).collect();
        let mut reader = Reader::from_slice(&data);
        let mut out = Vec::new();
        loop {
            match reader.read(777) {
                Ok(bytes) => out.extend_from_slice(bytes),
                Err(_) => break,
            }
        }
        assert!(out.len() >= 19000);
        assert_eq!(&data[..out.len()], &out[..]);
    }

    #[test]
    fn truncated_read_fails() {
        let data = [1u8, 2, 3];
        let mut reader = Reader::from_slice(&data);
        assert!(reader.read(10).is_err());
    }
}
