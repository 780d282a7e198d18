//! Homogeneous list containers
//!
//! Each container wraps one repeated field (`val`, tag 1) of a single scalar
//! type. Numeric elements are written packed; bytes and strings repeat the
//! length-prefixed element per entry.

use std::fmt;

use bytes::BufMut;
use prost::encoding::{encode_key, encode_varint, encoded_len_varint, key_len};
use serde::{Deserialize, Serialize};

use crate::error::{Result, ValueError};
use crate::unknown::UnknownFields;
use crate::wire::{self, WireType};

/// Field tag of the repeated `val` field inside every list container
pub const LIST_VAL_TAG: u32 = 1;

mod sealed {
    pub trait Sealed {}

    impl Sealed for Vec<u8> {}
    impl Sealed for String {}
    impl Sealed for i32 {}
    impl Sealed for i64 {}
    impl Sealed for f64 {}
    impl Sealed for f32 {}
    impl Sealed for bool {}
}

/// A scalar payload with a fixed wire representation.
///
/// `encode` writes only the value part of a field (no key); keys and
/// framing are the caller's job.
pub trait Scalar: sealed::Sealed + Clone + PartialEq + fmt::Debug {
    const WIRE_TYPE: WireType;
    /// Whether a repeated field of this type is written as one packed run
    const PACKED: bool;
    /// Payload name used in error messages
    const TYPE_NAME: &'static str;

    fn encode(&self, buf: &mut impl BufMut);
    fn encoded_len(&self) -> usize;
    fn decode(buf: &mut &[u8]) -> Result<Self>;
}

impl Scalar for Vec<u8> {
    const WIRE_TYPE: WireType = WireType::LengthDelimited;
    const PACKED: bool = false;
    const TYPE_NAME: &'static str = "bytes";

    fn encode(&self, buf: &mut impl BufMut) {
        encode_varint(self.len() as u64, buf);
        buf.put_slice(self);
    }

    fn encoded_len(&self) -> usize {
        encoded_len_varint(self.len() as u64) + self.len()
    }

    fn decode(buf: &mut &[u8]) -> Result<Self> {
        Ok(wire::take_length_delimited(buf)?.to_vec())
    }
}

impl Scalar for String {
    const WIRE_TYPE: WireType = WireType::LengthDelimited;
    const PACKED: bool = false;
    const TYPE_NAME: &'static str = "string";

    fn encode(&self, buf: &mut impl BufMut) {
        encode_varint(self.len() as u64, buf);
        buf.put_slice(self.as_bytes());
    }

    fn encoded_len(&self) -> usize {
        encoded_len_varint(self.len() as u64) + self.len()
    }

    fn decode(buf: &mut &[u8]) -> Result<Self> {
        let raw = wire::take_length_delimited(buf)?;
        std::str::from_utf8(raw)
            .map(str::to_owned)
            .map_err(|e| ValueError::malformed(format!("invalid UTF-8 in string: {}", e)))
    }
}

// int32 is sign-extended to 64 bits on the wire, so negatives take 10 bytes.
impl Scalar for i32 {
    const WIRE_TYPE: WireType = WireType::Varint;
    const PACKED: bool = true;
    const TYPE_NAME: &'static str = "int32";

    fn encode(&self, buf: &mut impl BufMut) {
        encode_varint(i64::from(*self) as u64, buf);
    }

    fn encoded_len(&self) -> usize {
        encoded_len_varint(i64::from(*self) as u64)
    }

    fn decode(buf: &mut &[u8]) -> Result<Self> {
        Ok(wire::decode_varint(buf)? as i32)
    }
}

impl Scalar for i64 {
    const WIRE_TYPE: WireType = WireType::Varint;
    const PACKED: bool = true;
    const TYPE_NAME: &'static str = "int64";

    fn encode(&self, buf: &mut impl BufMut) {
        encode_varint(*self as u64, buf);
    }

    fn encoded_len(&self) -> usize {
        encoded_len_varint(*self as u64)
    }

    fn decode(buf: &mut &[u8]) -> Result<Self> {
        Ok(wire::decode_varint(buf)? as i64)
    }
}

impl Scalar for f64 {
    const WIRE_TYPE: WireType = WireType::SixtyFourBit;
    const PACKED: bool = true;
    const TYPE_NAME: &'static str = "double";

    fn encode(&self, buf: &mut impl BufMut) {
        buf.put_f64_le(*self);
    }

    fn encoded_len(&self) -> usize {
        8
    }

    fn decode(buf: &mut &[u8]) -> Result<Self> {
        let raw = wire::take_fixed(buf, 8)?;
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(raw);
        Ok(f64::from_le_bytes(bytes))
    }
}

impl Scalar for f32 {
    const WIRE_TYPE: WireType = WireType::ThirtyTwoBit;
    const PACKED: bool = true;
    const TYPE_NAME: &'static str = "float";

    fn encode(&self, buf: &mut impl BufMut) {
        buf.put_f32_le(*self);
    }

    fn encoded_len(&self) -> usize {
        4
    }

    fn decode(buf: &mut &[u8]) -> Result<Self> {
        let raw = wire::take_fixed(buf, 4)?;
        let mut bytes = [0u8; 4];
        bytes.copy_from_slice(raw);
        Ok(f32::from_le_bytes(bytes))
    }
}

impl Scalar for bool {
    const WIRE_TYPE: WireType = WireType::Varint;
    const PACKED: bool = true;
    const TYPE_NAME: &'static str = "bool";

    fn encode(&self, buf: &mut impl BufMut) {
        encode_varint(u64::from(*self), buf);
    }

    fn encoded_len(&self) -> usize {
        1
    }

    fn decode(buf: &mut &[u8]) -> Result<Self> {
        Ok(wire::decode_varint(buf)? != 0)
    }
}

/// Ordered sequence of one scalar type, with its own unknown fields.
///
/// Equality compares only the elements.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ScalarList<T> {
    pub val: Vec<T>,
    #[serde(skip)]
    pub unknown_fields: UnknownFields,
}

pub type BytesList = ScalarList<Vec<u8>>;
pub type StringList = ScalarList<String>;
pub type Int32List = ScalarList<i32>;
pub type Int64List = ScalarList<i64>;
pub type DoubleList = ScalarList<f64>;
pub type FloatList = ScalarList<f32>;
pub type BoolList = ScalarList<bool>;

impl<T> ScalarList<T> {
    pub fn new(val: Vec<T>) -> Self {
        Self {
            val,
            unknown_fields: UnknownFields::default(),
        }
    }

    pub fn len(&self) -> usize {
        self.val.len()
    }

    pub fn is_empty(&self) -> bool {
        self.val.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.val.iter()
    }
}

impl<T: Scalar> ScalarList<T> {
    fn packed_len(&self) -> usize {
        self.val.iter().map(Scalar::encoded_len).sum()
    }

    /// Length of the container body (what follows its length prefix)
    pub(crate) fn body_len(&self) -> usize {
        let elements = if T::PACKED {
            if self.val.is_empty() {
                0
            } else {
                wire::length_delimited_len(LIST_VAL_TAG, self.packed_len())
            }
        } else {
            self.val
                .iter()
                .map(|v| key_len(LIST_VAL_TAG) + v.encoded_len())
                .sum()
        };
        elements + self.unknown_fields.encoded_len()
    }

    /// Unknown fields may not reuse the element tag.
    pub(crate) fn check_unknown_fields(&self) -> Result<()> {
        self.unknown_fields.check_not_owned(|tag| tag == LIST_VAL_TAG)
    }

    pub(crate) fn encode_body(&self, buf: &mut impl BufMut) {
        if T::PACKED {
            if !self.val.is_empty() {
                wire::encode_length_delimited(LIST_VAL_TAG, self.packed_len(), buf);
                for v in &self.val {
                    v.encode(buf);
                }
            }
        } else {
            for v in &self.val {
                encode_key(LIST_VAL_TAG, T::WIRE_TYPE, buf);
                v.encode(buf);
            }
        }
        self.unknown_fields.encode(buf);
    }

    /// Decode a container body. Packed and unpacked occurrences of `val`
    /// may be mixed; elements are appended in encounter order.
    pub(crate) fn decode_body(mut buf: &[u8]) -> Result<Self> {
        let mut list = Self::new(Vec::new());

        while !buf.is_empty() {
            let (tag, wire_type) = wire::decode_key(&mut buf)?;
            if tag != LIST_VAL_TAG {
                list.unknown_fields.read_field(tag, wire_type, &mut buf)?;
                continue;
            }

            if wire_type == T::WIRE_TYPE {
                list.val.push(T::decode(&mut buf)?);
            } else if T::PACKED && wire_type == WireType::LengthDelimited {
                let mut run = wire::take_length_delimited(&mut buf)?;
                while !run.is_empty() {
                    list.val.push(T::decode(&mut run)?);
                }
            } else {
                return Err(wire::wire_type_mismatch(tag, T::WIRE_TYPE, wire_type));
            }
        }

        Ok(list)
    }
}

impl<T: PartialEq> PartialEq for ScalarList<T> {
    fn eq(&self, other: &Self) -> bool {
        self.val == other.val
    }
}

impl<T> From<Vec<T>> for ScalarList<T> {
    fn from(val: Vec<T>) -> Self {
        Self::new(val)
    }
}

impl<T> FromIterator<T> for ScalarList<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a, T> IntoIterator for &'a ScalarList<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.val.iter()
    }
}
