//! Low-level framing over a read cursor (`&mut &[u8]`) and a write buffer.
//!
//! Varints and field keys come from prost's encoding primitives; everything
//! built on top of them (length prefixes, fixed-width runs, bounds checks)
//! lives here so the value and list codecs share one set of rules.

use bytes::BufMut;
use prost::encoding::{encode_key, encode_varint, encoded_len_varint, key_len};

pub use prost::encoding::WireType;

use crate::error::{Result, ValueError};

/// Largest field number the wire format can carry (2^29 - 1)
pub const MAX_TAG: u32 = (1 << 29) - 1;

pub(crate) fn decode_key(buf: &mut &[u8]) -> Result<(u32, WireType)> {
    Ok(prost::encoding::decode_key(buf)?)
}

pub(crate) fn decode_varint(buf: &mut &[u8]) -> Result<u64> {
    Ok(prost::encoding::decode_varint(buf)?)
}

/// Read a length prefix and split that many bytes off the cursor.
pub(crate) fn take_length_delimited<'a>(buf: &mut &'a [u8]) -> Result<&'a [u8]> {
    let len = decode_varint(buf)?;
    if len > buf.len() as u64 {
        return Err(ValueError::malformed(format!(
            "length prefix {} exceeds remaining {} bytes",
            len,
            buf.len()
        )));
    }
    let (body, rest) = buf.split_at(len as usize);
    *buf = rest;
    Ok(body)
}

/// Split exactly `width` bytes off the cursor.
pub(crate) fn take_fixed<'a>(buf: &mut &'a [u8], width: usize) -> Result<&'a [u8]> {
    if buf.len() < width {
        return Err(ValueError::malformed(format!(
            "truncated fixed{} field: {} bytes remaining",
            width * 8,
            buf.len()
        )));
    }
    let (body, rest) = buf.split_at(width);
    *buf = rest;
    Ok(body)
}

/// Read a varint and hand back the exact bytes it occupied.
pub(crate) fn take_varint_bytes<'a>(buf: &mut &'a [u8]) -> Result<&'a [u8]> {
    let start: &'a [u8] = *buf;
    decode_varint(buf)?;
    let consumed = start.len() - buf.len();
    Ok(&start[..consumed])
}

pub(crate) fn unsupported_group(tag: u32, wire_type: WireType) -> ValueError {
    ValueError::malformed(format!(
        "field {} uses unsupported group wire type {:?}",
        tag, wire_type
    ))
}

pub(crate) fn wire_type_mismatch(tag: u32, expected: WireType, actual: WireType) -> ValueError {
    ValueError::malformed(format!(
        "field {} expects wire type {:?}, found {:?}",
        tag, expected, actual
    ))
}

pub(crate) fn encode_length_delimited(tag: u32, body_len: usize, buf: &mut impl BufMut) {
    encode_key(tag, WireType::LengthDelimited, buf);
    encode_varint(body_len as u64, buf);
}

/// Size of key + length prefix + body for a length-delimited field.
pub(crate) fn length_delimited_len(tag: u32, body_len: usize) -> usize {
    key_len(tag) + encoded_len_varint(body_len as u64) + body_len
}
