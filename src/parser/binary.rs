//! Binary FBX front-end (spec §4.5).
//!
//! Length-prefixed node records: a 13-byte header up to FBX 7400 (32-bit
//! offsets), 25 bytes from 7500 (64-bit offsets, matching the 32-bit
//! `end_offset` overflowing for files with large compressed payloads). A
//! record whose header is entirely zero terminates the sibling list it
//! appears in, at both nested and top level.

use super::classify::{self, ArrayInfo, ArrayType, ParseState};
use crate::error::{Error, Result};
use crate::inflate::InflateCache;
use crate::options::LoadOpts;
use crate::reader::Reader;
use crate::strings::StringPool;
use std::sync::Arc;
use ufbx_data::error::ErrorKind;
use ufbx_data::{DomArray, DomNode, NodeContent, ScalarValue};

pub const MAGIC: &[u8; 23] = b"Kaydara FBX Binary  \x00\x1a\x00";

fn fail_kind(kind: ErrorKind, function: &'static str, description: impl Into<String>) -> Error {
    Error::new(kind, function, line!(), description)
}

fn map_deflate_error(e: crate::inflate::DeflateError) -> ufbx_data::error::DeflateError {
    use crate::inflate::DeflateError as D;
    use ufbx_data::error::DeflateError as E;
    match e {
        D::OverfullHuffman => E::HuffmanOverfull,
        D::IncompleteHuffman => E::HuffmanUnderfull,
        D::BadLengthCode => E::BadLengthCode,
        D::BadDistanceCode | D::DistanceTooFar => E::BadDistanceCode,
        D::StoredLengthMismatch => E::BadStoredBlockLength,
        D::AdlerMismatch => E::AdlerMismatch,
        D::Truncated | D::BadZlibHeader | D::BadBlockType => E::BadLengthCode,
    }
}

struct Header {
    end_offset: u64,
    num_values: u64,
}

fn read_header(reader: &mut Reader, version: u32) -> Result<Option<(Header, u8)>> {
    let (end_offset, num_values, _values_len, name_len) = if version < 7500 {
        (
            reader.read_u32_le()? as u64,
            reader.read_u32_le()? as u64,
            reader.read_u32_le()? as u64,
            reader.read_u8()?,
        )
    } else {
        (reader.read_u64_le()?, reader.read_u64_le()?, reader.read_u64_le()?, reader.read_u8()?)
    };

    if end_offset == 0 && num_values == 0 && _values_len == 0 && name_len == 0 {
        return Ok(None);
    }
    Ok(Some((Header { end_offset, num_values }, name_len)))
}

fn is_array_tag(tag: u8) -> bool {
    matches!(tag, b'b' | b'c' | b'i' | b'l' | b'f' | b'd')
}

fn array_elem_size(tag: u8) -> usize {
    match tag {
        b'b' | b'c' => 1,
        b'i' | b'f' => 4,
        b'l' | b'd' => 8,
        _ => unreachable!("not an array tag"),
    }
}

fn decode_array(reader: &mut Reader, tag: u8, cache: &mut InflateCache, opts: &LoadOpts) -> Result<DomArray> {
    reader.read_u8()?; // consume the already-peeked tag byte
    let length = reader.read_u32_le()? as usize;
    super::check_array_size(length, opts)?;
    let encoding = reader.read_u32_le()?;
    let encoded_size = reader.read_u32_le()? as usize;
    let elem_size = array_elem_size(tag);

    let raw: Vec<u8> = if encoding == 0 {
        reader.read(length * elem_size)?.to_vec()
    } else {
        let compressed = reader.read(encoded_size)?;
        crate::inflate::inflate(compressed, length * elem_size, cache)
            .map_err(|e| fail_kind(ErrorKind::Deflate(map_deflate_error(e)), "decode_array", format!("deflate array payload: {e:?}")))?
    };

    if raw.len() < length * elem_size {
        return Err(fail_kind(ErrorKind::BadArray, "decode_array", "array payload shorter than declared length"));
    }

    Ok(match tag {
        b'b' => DomArray::Bool(raw.iter().take(length).map(|&b| b != 0).collect()),
        b'c' => DomArray::Byte(Arc::from(&raw[..length])),
        b'i' => DomArray::I32(raw.chunks_exact(4).take(length).map(|c| i32::from_le_bytes(c.try_into().unwrap())).collect()),
        b'l' => DomArray::I64(raw.chunks_exact(8).take(length).map(|c| i64::from_le_bytes(c.try_into().unwrap())).collect()),
        b'f' => DomArray::F32(raw.chunks_exact(4).take(length).map(|c| f32::from_le_bytes(c.try_into().unwrap())).collect()),
        b'd' => DomArray::F64(raw.chunks_exact(8).take(length).map(|c| f64::from_le_bytes(c.try_into().unwrap())).collect()),
        _ => unreachable!(),
    })
}

fn decode_scalar(reader: &mut Reader, strings: &mut StringPool) -> Result<ScalarValue> {
    let tag = reader.read_u8()?;
    Ok(match tag {
        b'Y' => ScalarValue::I16(reader.read_i16_le()?),
        b'I' => ScalarValue::I32(reader.read_i32_le()?),
        b'L' => ScalarValue::I64(reader.read_u64_le()? as i64),
        b'F' => ScalarValue::F32(reader.read_f32_le()?),
        b'D' => ScalarValue::F64(reader.read_f64_le()?),
        b'C' => ScalarValue::Bool(reader.read_u8()? != 0),
        b'B' => ScalarValue::I64(reader.read_i8()? as i64),
        b'S' => {
            let len = reader.read_u32_le()? as usize;
            let bytes = reader.read(len)?;
            let s = String::from_utf8_lossy(bytes).into_owned();
            let interned = strings
                .intern(&s)
                .ok_or_else(|| fail_kind(ErrorKind::BadString, "decode_scalar", "string exceeds configured max_string_length"))?;
            ScalarValue::String(interned)
        }
        b'R' => {
            let len = reader.read_u32_le()? as usize;
            let bytes = reader.read(len)?;
            ScalarValue::Binary(Arc::from(bytes))
        }
        other => return Err(fail_kind(ErrorKind::BadNodeStructure, "decode_scalar", format!("unrecognized value tag {other:#x}"))),
    })
}

fn parse_values(
    reader: &mut Reader,
    num_values: u64,
    strings: &mut StringPool,
    cache: &mut InflateCache,
    array_info: Option<ArrayInfo>,
    opts: &LoadOpts,
) -> Result<NodeContent> {
    if num_values == 0 {
        return Ok(NodeContent::Scalars(Vec::new()));
    }
    super::check_node_values(num_values as usize, opts)?;
    let first_tag = reader.peek(1)?[0];
    if is_array_tag(first_tag) {
        let array = decode_array(reader, first_tag, cache, opts)?;
        let array = match array_info {
            Some(ArrayInfo { pad_begin, .. }) => super::pad_array(array, pad_begin),
            None => array,
        };
        return Ok(NodeContent::Array(array));
    }
    let mut values = Vec::with_capacity(num_values as usize);
    for _ in 0..num_values {
        values.push(decode_scalar(reader, strings)?);
    }
    Ok(NodeContent::Scalars(values))
}

fn parse_node(
    reader: &mut Reader,
    version: u32,
    strings: &mut StringPool,
    cache: &mut InflateCache,
    state: ParseState,
    depth: usize,
    opts: &LoadOpts,
) -> Result<Option<DomNode>> {
    super::check_node_depth(depth, opts)?;

    let (header, name_len) = match read_header(reader, version)? {
        Some(h) => h,
        None => return Ok(None),
    };

    let name_bytes = reader.read(name_len as usize)?;
    let name_str = String::from_utf8_lossy(name_bytes).into_owned();
    let name = strings
        .intern(&name_str)
        .ok_or_else(|| fail_kind(ErrorKind::BadString, "parse_node", "node name exceeds configured max_string_length"))?;

    let array_info = classify::classify(state, &name_str);
    let content = parse_values(reader, header.num_values, strings, cache, array_info, opts)?;

    let mut node = DomNode::new(name);
    node.content = content;

    let child_state = classify::child_state(state, &name_str);
    while reader.position() < header.end_offset {
        match parse_node(reader, version, strings, cache, child_state, depth + 1, opts)? {
            Some(child) => node.children.push(child),
            None => break,
        }
        super::check_node_children(node.children.len(), opts)?;
    }

    Ok(Some(node))
}

/// Parses a complete binary FBX byte buffer, returning the detected
/// version and the top-level node list.
pub fn parse(data: &[u8], strings: &mut StringPool, cache: &mut InflateCache, opts: &LoadOpts) -> Result<(u32, Vec<DomNode>)> {
    let mut reader = Reader::from_slice(data);
    let magic = reader.read(23)?;
    if magic != MAGIC.as_slice() {
        return Err(fail_kind(ErrorKind::BadMagic, "parse", "bad binary FBX magic"));
    }
    let version = reader.read_u32_le()?;

    let mut top = Vec::new();
    loop {
        match parse_node(&mut reader, version, strings, cache, ParseState::TopLevel, 0, opts) {
            Ok(Some(node)) => top.push(node),
            Ok(None) => break,
            Err(_) => break, // trailing footer/padding after the last top-level record
        }
        super::check_node_children(top.len(), opts)?;
    }
    Ok((version, top))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn node_header_bytes(version: u32, end_offset: u64, num_values: u64, values_len: u64, name: &str) -> Vec<u8> {
        let mut out = Vec::new();
        if version < 7500 {
            out.extend_from_slice(&(end_offset as u32).to_le_bytes());
            out.extend_from_slice(&(num_values as u32).to_le_bytes());
            out.extend_from_slice(&(values_len as u32).to_le_bytes());
        } else {
            out.extend_from_slice(&end_offset.to_le_bytes());
            out.extend_from_slice(&num_values.to_le_bytes());
            out.extend_from_slice(&values_len.to_le_bytes());
        }
        out.push(name.len() as u8);
        out.extend_from_slice(name.as_bytes());
        out
    }

    fn null_header(version: u32) -> Vec<u8> {
        node_header_bytes(version, 0, 0, 0, "")
    }

    #[test]
    fn parses_single_scalar_node() {
        let version = 7400u32;
        let mut body = Vec::new();
        body.push(b'I');
        body.extend_from_slice(&42i32.to_le_bytes());
        let values_len = body.len() as u64;

        let mut file = Vec::new();
        file.extend_from_slice(MAGIC.as_slice());
        file.extend_from_slice(&version.to_le_bytes());

        let prior_consumed = MAGIC.len() as u64 + 4; // magic + version, already read before this node's header
        let header_len = 13u64;
        let end_offset = prior_consumed + header_len + "Count".len() as u64 + values_len;
        file.extend_from_slice(&node_header_bytes(version, end_offset, 1, values_len, "Count"));
        file.extend_from_slice(&body);
        file.extend_from_slice(&null_header(version));

        let mut strings = StringPool::new(1024, 10_000);
        let mut cache = InflateCache::new();
        let (parsed_version, top) = parse(&file, &mut strings, &mut cache, &LoadOpts::default()).unwrap();
        assert_eq!(7400, parsed_version);
        assert_eq!(1, top.len());
        assert_eq!("Count", top[0].name.as_str());
        let scalars = top[0].content.as_scalars().unwrap();
        assert_eq!(1, scalars.len());
        assert_eq!(Some(42), scalars[0].as_i64().map(|v| v as i32));
    }

    #[test]
    fn rejects_bad_magic() {
        let mut strings = StringPool::new(1024, 10_000);
        let mut cache = InflateCache::new();
        let bad = vec![0u8; 30];
        assert!(parse(&bad, &mut strings, &mut cache, &LoadOpts::default()).is_err());
    }

    #[test]
    fn rejects_array_exceeding_max_array_size() {
        let version = 7400u32;
        let mut body = Vec::new();
        body.push(b'i');
        body.extend_from_slice(&3u32.to_le_bytes()); // length
        body.extend_from_slice(&0u32.to_le_bytes()); // encoding: raw
        body.extend_from_slice(&12u32.to_le_bytes()); // encoded_size
        body.extend_from_slice(&1i32.to_le_bytes());
        body.extend_from_slice(&2i32.to_le_bytes());
        body.extend_from_slice(&3i32.to_le_bytes());
        let values_len = body.len() as u64;

        let mut file = Vec::new();
        file.extend_from_slice(MAGIC.as_slice());
        file.extend_from_slice(&version.to_le_bytes());

        let prior_consumed = MAGIC.len() as u64 + 4;
        let header_len = 13u64;
        let end_offset = prior_consumed + header_len + "Indices".len() as u64 + values_len;
        file.extend_from_slice(&node_header_bytes(version, end_offset, 1, values_len, "Indices"));
        file.extend_from_slice(&body);
        file.extend_from_slice(&null_header(version));

        let mut strings = StringPool::new(1024, 10_000);
        let mut cache = InflateCache::new();
        let opts = LoadOpts { max_array_size: 2, ..LoadOpts::default() };
        assert!(parse(&file, &mut strings, &mut cache, &opts).is_err());
    }
}
