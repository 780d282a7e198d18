//! Wire codec for `Value` and `RepeatedValue`
//!
//! The layout is protobuf-compatible: every populated field is a key
//! (`tag << 3 | wire_type`) followed by its value. Scalars are varints or
//! little-endian fixed-width words, strings/bytes and list containers are
//! length-prefixed. An unset value encodes to an empty buffer.

use bytes::BufMut;
use prost::encoding::{encode_key, key_len};
use tracing::debug;

use crate::config::CodecConfig;
use crate::error::{Result, ValueError};
use crate::list::{Scalar, ScalarList};
use crate::unknown::UnknownField;
use crate::value::{RepeatedValue, Val, Value, ValueType};
use crate::wire::{self, WireType};

/// Field tag of `RepeatedValue.val`
pub const REPEATED_VAL_TAG: u32 = 1;

// ============================================================================
// Encoding
// ============================================================================

/// Encode a value into a new buffer.
pub fn encode(value: &Value) -> Result<Vec<u8>> {
    let mut buf = Vec::with_capacity(encoded_len(value));
    encode_to(value, &mut buf)?;
    Ok(buf)
}

/// Encode a value onto the end of `buf`. Nothing is written on error.
pub fn encode_to(value: &Value, buf: &mut impl BufMut) -> Result<()> {
    check_value(value)?;
    encode_value_body(value, buf);
    Ok(())
}

/// Exact number of bytes `encode` produces for `value`.
pub fn encoded_len(value: &Value) -> usize {
    value.val.as_ref().map_or(0, val_len) + value.unknown_fields.encoded_len()
}

/// Encode a sequence of values as repeated length-prefixed entries.
pub fn encode_repeated(values: &RepeatedValue) -> Result<Vec<u8>> {
    values
        .unknown_fields
        .check_not_owned(|tag| tag == REPEATED_VAL_TAG)?;
    for value in values {
        check_value(value)?;
    }

    let mut buf = Vec::with_capacity(repeated_encoded_len(values));
    for value in values {
        wire::encode_length_delimited(REPEATED_VAL_TAG, encoded_len(value), &mut buf);
        encode_value_body(value, &mut buf);
    }
    values.unknown_fields.encode(&mut buf);
    Ok(buf)
}

pub fn repeated_encoded_len(values: &RepeatedValue) -> usize {
    values
        .iter()
        .map(|value| wire::length_delimited_len(REPEATED_VAL_TAG, encoded_len(value)))
        .sum::<usize>()
        + values.unknown_fields.encoded_len()
}

/// A single value must never put more than one variant tag on the wire.
/// The only way to get there is an unknown field that carries an assigned
/// variant tag next to a populated variant (or next to another such field).
fn check_oneof(value: &Value) -> Result<()> {
    let mut assigned = value.val.iter().map(Val::tag).chain(
        value
            .unknown_fields
            .iter()
            .map(UnknownField::tag)
            .filter(|tag| ValueType::from_tag(*tag).is_some()),
    );

    match (assigned.next(), assigned.next()) {
        (Some(first), Some(second)) => Err(ValueError::MultipleVariantsSet { first, second }),
        _ => Ok(()),
    }
}

/// Everything written for `value` must decode back to it: one variant at
/// most, and no unknown field reusing a tag that the decoder interprets.
fn check_value(value: &Value) -> Result<()> {
    check_oneof(value)?;
    value
        .unknown_fields
        .check_not_owned(|tag| ValueType::from_tag(tag).is_some())?;

    match &value.val {
        Some(Val::BytesListVal(list)) => list.check_unknown_fields(),
        Some(Val::StringListVal(list)) => list.check_unknown_fields(),
        Some(Val::Int32ListVal(list)) => list.check_unknown_fields(),
        Some(Val::Int64ListVal(list)) => list.check_unknown_fields(),
        Some(Val::DoubleListVal(list)) => list.check_unknown_fields(),
        Some(Val::FloatListVal(list)) => list.check_unknown_fields(),
        Some(Val::BoolListVal(list)) => list.check_unknown_fields(),
        Some(Val::UnixTimestampListVal(list)) => list.check_unknown_fields(),
        _ => Ok(()),
    }
}

fn encode_value_body(value: &Value, buf: &mut impl BufMut) {
    if let Some(val) = &value.val {
        encode_val(val, buf);
    }
    value.unknown_fields.encode(buf);
}

fn encode_val(val: &Val, buf: &mut impl BufMut) {
    let tag = val.tag();
    match val {
        Val::BytesVal(v) => encode_scalar(tag, v, buf),
        Val::StringVal(v) => encode_scalar(tag, v, buf),
        Val::Int32Val(v) => encode_scalar(tag, v, buf),
        Val::Int64Val(v) => encode_scalar(tag, v, buf),
        Val::DoubleVal(v) => encode_scalar(tag, v, buf),
        Val::FloatVal(v) => encode_scalar(tag, v, buf),
        Val::BoolVal(v) => encode_scalar(tag, v, buf),
        Val::UnixTimestampVal(v) => encode_scalar(tag, v, buf),
        Val::BytesListVal(list) => encode_list(tag, list, buf),
        Val::StringListVal(list) => encode_list(tag, list, buf),
        Val::Int32ListVal(list) => encode_list(tag, list, buf),
        Val::Int64ListVal(list) => encode_list(tag, list, buf),
        Val::DoubleListVal(list) => encode_list(tag, list, buf),
        Val::FloatListVal(list) => encode_list(tag, list, buf),
        Val::BoolListVal(list) => encode_list(tag, list, buf),
        Val::UnixTimestampListVal(list) => encode_list(tag, list, buf),
        // Enums travel as int32 varints
        Val::NullVal(v) => encode_scalar(tag, v, buf),
    }
}

fn val_len(val: &Val) -> usize {
    let tag = val.tag();
    match val {
        Val::BytesVal(v) => scalar_len(tag, v),
        Val::StringVal(v) => scalar_len(tag, v),
        Val::Int32Val(v) => scalar_len(tag, v),
        Val::Int64Val(v) => scalar_len(tag, v),
        Val::DoubleVal(v) => scalar_len(tag, v),
        Val::FloatVal(v) => scalar_len(tag, v),
        Val::BoolVal(v) => scalar_len(tag, v),
        Val::UnixTimestampVal(v) => scalar_len(tag, v),
        Val::BytesListVal(list) => list_len(tag, list),
        Val::StringListVal(list) => list_len(tag, list),
        Val::Int32ListVal(list) => list_len(tag, list),
        Val::Int64ListVal(list) => list_len(tag, list),
        Val::DoubleListVal(list) => list_len(tag, list),
        Val::FloatListVal(list) => list_len(tag, list),
        Val::BoolListVal(list) => list_len(tag, list),
        Val::UnixTimestampListVal(list) => list_len(tag, list),
        Val::NullVal(v) => scalar_len(tag, v),
    }
}

fn encode_scalar<T: Scalar>(tag: u32, value: &T, buf: &mut impl BufMut) {
    encode_key(tag, T::WIRE_TYPE, buf);
    value.encode(buf);
}

fn scalar_len<T: Scalar>(tag: u32, value: &T) -> usize {
    key_len(tag) + value.encoded_len()
}

fn encode_list<T: Scalar>(tag: u32, list: &ScalarList<T>, buf: &mut impl BufMut) {
    wire::encode_length_delimited(tag, list.body_len(), buf);
    list.encode_body(buf);
}

fn list_len<T: Scalar>(tag: u32, list: &ScalarList<T>) -> usize {
    wire::length_delimited_len(tag, list.body_len())
}

// ============================================================================
// Decoding
// ============================================================================

/// Decode a value. An empty buffer yields an unset value.
pub fn decode(buf: &[u8]) -> Result<Value> {
    decode_value_body(buf)
}

/// Decode a sequence of values, keeping encounter order.
pub fn decode_repeated(mut buf: &[u8]) -> Result<RepeatedValue> {
    let mut values = RepeatedValue::default();

    while !buf.is_empty() {
        let (tag, wire_type) = wire::decode_key(&mut buf)?;
        if tag != REPEATED_VAL_TAG {
            values.unknown_fields.read_field(tag, wire_type, &mut buf)?;
            continue;
        }
        if wire_type != WireType::LengthDelimited {
            return Err(wire::wire_type_mismatch(
                tag,
                WireType::LengthDelimited,
                wire_type,
            ));
        }
        let body = wire::take_length_delimited(&mut buf)?;
        values.val.push(decode_value_body(body)?);
    }

    Ok(values)
}

fn decode_value_body(mut buf: &[u8]) -> Result<Value> {
    let mut value = Value::unset();

    while !buf.is_empty() {
        let (tag, wire_type) = wire::decode_key(&mut buf)?;
        let Some(val) = decode_val(tag, wire_type, &mut buf)? else {
            value.unknown_fields.read_field(tag, wire_type, &mut buf)?;
            continue;
        };

        let current = val.value_type();
        if let Some(previous) = value.val.replace(val) {
            debug!(
                previous = previous.value_type().as_str_name(),
                current = current.as_str_name(),
                "oneof field repeated, last occurrence wins"
            );
        }
    }

    Ok(value)
}

/// Decode the field at `tag` if it is a variant. `Ok(None)` leaves `buf`
/// untouched so the caller can keep the field as unknown.
fn decode_val(tag: u32, wire_type: WireType, buf: &mut &[u8]) -> Result<Option<Val>> {
    let Some(variant) = ValueType::from_tag(tag) else {
        return Ok(None);
    };
    let val = match variant {
        ValueType::Bytes => Val::BytesVal(decode_scalar(tag, wire_type, buf)?),
        ValueType::String => Val::StringVal(decode_scalar(tag, wire_type, buf)?),
        ValueType::Int32 => Val::Int32Val(decode_scalar(tag, wire_type, buf)?),
        ValueType::Int64 => Val::Int64Val(decode_scalar(tag, wire_type, buf)?),
        ValueType::Double => Val::DoubleVal(decode_scalar(tag, wire_type, buf)?),
        ValueType::Float => Val::FloatVal(decode_scalar(tag, wire_type, buf)?),
        ValueType::Bool => Val::BoolVal(decode_scalar(tag, wire_type, buf)?),
        ValueType::UnixTimestamp => Val::UnixTimestampVal(decode_scalar(tag, wire_type, buf)?),
        ValueType::BytesList => Val::BytesListVal(decode_list(tag, wire_type, buf)?),
        ValueType::StringList => Val::StringListVal(decode_list(tag, wire_type, buf)?),
        ValueType::Int32List => Val::Int32ListVal(decode_list(tag, wire_type, buf)?),
        ValueType::Int64List => Val::Int64ListVal(decode_list(tag, wire_type, buf)?),
        ValueType::DoubleList => Val::DoubleListVal(decode_list(tag, wire_type, buf)?),
        ValueType::FloatList => Val::FloatListVal(decode_list(tag, wire_type, buf)?),
        ValueType::BoolList => Val::BoolListVal(decode_list(tag, wire_type, buf)?),
        ValueType::UnixTimestampList => {
            Val::UnixTimestampListVal(decode_list(tag, wire_type, buf)?)
        }
        // Unknown enum numbers are kept as-is
        ValueType::Null => Val::NullVal(decode_scalar(tag, wire_type, buf)?),
        // from_tag never yields it; treat like any other unassigned tag
        ValueType::Invalid => return Ok(None),
    };
    Ok(Some(val))
}

fn decode_scalar<T: Scalar>(tag: u32, wire_type: WireType, buf: &mut &[u8]) -> Result<T> {
    if wire_type != T::WIRE_TYPE {
        return Err(wire::wire_type_mismatch(tag, T::WIRE_TYPE, wire_type));
    }
    T::decode(buf)
}

fn decode_list<T: Scalar>(
    tag: u32,
    wire_type: WireType,
    buf: &mut &[u8],
) -> Result<ScalarList<T>> {
    if wire_type != WireType::LengthDelimited {
        return Err(wire::wire_type_mismatch(
            tag,
            WireType::LengthDelimited,
            wire_type,
        ));
    }
    let body = wire::take_length_delimited(buf)?;
    ScalarList::decode_body(body)
}

// ============================================================================
// Size-limited codec
// ============================================================================

/// Codec that enforces `CodecConfig` limits around the free functions
#[derive(Debug, Clone, Default)]
pub struct ValueCodec {
    config: CodecConfig,
}

impl ValueCodec {
    pub fn new(config: CodecConfig) -> Self {
        Self { config }
    }

    /// Build a codec from `FEATURE_VALUE_*` environment settings
    pub fn from_env() -> std::result::Result<Self, ::config::ConfigError> {
        Ok(Self::new(CodecConfig::from_env()?))
    }

    pub fn config(&self) -> &CodecConfig {
        &self.config
    }

    fn check_size(&self, size: usize) -> Result<()> {
        if self.config.is_unlimited() {
            return Ok(());
        }
        let limit = self.config.max_message_bytes;
        if size > limit {
            return Err(ValueError::MessageTooLarge { size, limit });
        }
        Ok(())
    }

    pub fn encode(&self, value: &Value) -> Result<Vec<u8>> {
        self.check_size(encoded_len(value))?;
        encode(value)
    }

    pub fn decode(&self, buf: &[u8]) -> Result<Value> {
        self.check_size(buf.len())?;
        decode(buf)
    }

    pub fn encode_repeated(&self, values: &RepeatedValue) -> Result<Vec<u8>> {
        self.check_size(repeated_encoded_len(values))?;
        encode_repeated(values)
    }

    pub fn decode_repeated(&self, buf: &[u8]) -> Result<RepeatedValue> {
        self.check_size(buf.len())?;
        decode_repeated(buf)
    }
}
