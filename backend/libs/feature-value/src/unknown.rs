//! Unknown field side channel
//!
//! Fields whose tag the decoder does not recognize are kept as opaque
//! `(tag, wire type, raw bytes)` records and written back verbatim on encode,
//! so a value passed through an older build keeps a newer producer's data.

use bytes::{BufMut, Bytes};
use prost::encoding::{encode_key, key_len};
use tracing::trace;

use crate::error::{Result, ValueError};
use crate::wire::{self, WireType, MAX_TAG};

/// One unrecognized field, as it appeared on the wire
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownField {
    tag: u32,
    wire_type: WireType,
    /// Raw value bytes. Length-delimited fields store the body without its
    /// length prefix; varint and fixed-width fields store their exact bytes.
    data: Bytes,
}

impl UnknownField {
    /// Build an unknown field by hand (proxies, tests). The raw bytes must be a
    /// well-formed value for the given wire type.
    pub fn new(tag: u32, wire_type: WireType, data: impl Into<Bytes>) -> Result<Self> {
        if tag == 0 || tag > MAX_TAG {
            return Err(ValueError::malformed(format!("invalid field tag {}", tag)));
        }
        let data = data.into();
        match wire_type {
            WireType::StartGroup | WireType::EndGroup => {
                return Err(wire::unsupported_group(tag, wire_type));
            }
            WireType::Varint => {
                let mut cursor = &data[..];
                wire::decode_varint(&mut cursor)?;
                if !cursor.is_empty() {
                    return Err(ValueError::malformed(format!(
                        "field {}: trailing bytes after varint",
                        tag
                    )));
                }
            }
            WireType::SixtyFourBit | WireType::ThirtyTwoBit => {
                let width = if wire_type == WireType::SixtyFourBit { 8 } else { 4 };
                if data.len() != width {
                    return Err(ValueError::malformed(format!(
                        "field {}: expected {} bytes, got {}",
                        tag,
                        width,
                        data.len()
                    )));
                }
            }
            WireType::LengthDelimited => {}
        }

        Ok(Self {
            tag,
            wire_type,
            data,
        })
    }

    pub fn tag(&self) -> u32 {
        self.tag
    }

    pub fn wire_type(&self) -> WireType {
        self.wire_type
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    fn encode(&self, buf: &mut impl BufMut) {
        match self.wire_type {
            WireType::LengthDelimited => {
                wire::encode_length_delimited(self.tag, self.data.len(), buf);
            }
            _ => encode_key(self.tag, self.wire_type, buf),
        }
        buf.put_slice(&self.data);
    }

    fn encoded_len(&self) -> usize {
        match self.wire_type {
            WireType::LengthDelimited => wire::length_delimited_len(self.tag, self.data.len()),
            _ => key_len(self.tag) + self.data.len(),
        }
    }
}

/// Unknown fields of one message, in the order they were read
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnknownFields {
    fields: Vec<UnknownField>,
}

impl UnknownFields {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, UnknownField> {
        self.fields.iter()
    }

    /// All captured occurrences of `tag`, oldest first
    pub fn by_tag(&self, tag: u32) -> impl Iterator<Item = &UnknownField> {
        self.fields.iter().filter(move |field| field.tag == tag)
    }

    pub fn push(&mut self, field: UnknownField) {
        self.fields.push(field);
    }

    /// Fail if any captured field uses a tag the enclosing message decodes
    /// itself. Re-emitting such a field would produce bytes that decode to a
    /// different value, or not at all.
    pub(crate) fn check_not_owned(&self, owned: impl Fn(u32) -> bool) -> Result<()> {
        match self.fields.iter().find(|field| owned(field.tag)) {
            Some(field) => Err(ValueError::ConflictingUnknownField { tag: field.tag }),
            None => Ok(()),
        }
    }

    /// Capture the value of a field whose key has already been read.
    pub(crate) fn read_field(
        &mut self,
        tag: u32,
        wire_type: WireType,
        buf: &mut &[u8],
    ) -> Result<()> {
        let raw = match wire_type {
            WireType::Varint => wire::take_varint_bytes(buf)?,
            WireType::LengthDelimited => wire::take_length_delimited(buf)?,
            WireType::SixtyFourBit => wire::take_fixed(buf, 8)?,
            WireType::ThirtyTwoBit => wire::take_fixed(buf, 4)?,
            WireType::StartGroup | WireType::EndGroup => {
                return Err(wire::unsupported_group(tag, wire_type));
            }
        };

        trace!(tag, ?wire_type, len = raw.len(), "preserving unknown field");
        self.fields.push(UnknownField {
            tag,
            wire_type,
            data: Bytes::copy_from_slice(raw),
        });
        Ok(())
    }

    pub(crate) fn encode(&self, buf: &mut impl BufMut) {
        for field in &self.fields {
            field.encode(buf);
        }
    }

    pub(crate) fn encoded_len(&self) -> usize {
        self.fields.iter().map(UnknownField::encoded_len).sum()
    }
}

impl<'a> IntoIterator for &'a UnknownFields {
    type Item = &'a UnknownField;
    type IntoIter = std::slice::Iter<'a, UnknownField>;

    fn into_iter(self) -> Self::IntoIter {
        self.fields.iter()
    }
}
