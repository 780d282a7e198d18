//! Value model: the feature value oneof and its tag table

use serde::{Deserialize, Serialize};

use crate::error::{Result, ValueError};
use crate::list::{
    BoolList, BytesList, DoubleList, FloatList, Int32List, Int64List, ScalarList, StringList,
};
use crate::unknown::UnknownFields;

/// Field numbers that must never be assigned to a variant
pub const RESERVED_TAGS: [u32; 2] = [9, 10];

/// Which variant a `Value` holds.
///
/// The discriminant of every member except `Invalid` is the variant's field
/// tag on the wire. `Invalid` (0) stands for an unset value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(i32)]
pub enum ValueType {
    Invalid = 0,
    Bytes = 1,
    String = 2,
    Int32 = 3,
    Int64 = 4,
    Double = 5,
    Float = 6,
    Bool = 7,
    UnixTimestamp = 8,
    BytesList = 11,
    StringList = 12,
    Int32List = 13,
    Int64List = 14,
    DoubleList = 15,
    FloatList = 16,
    BoolList = 17,
    UnixTimestampList = 18,
    Null = 19,
}

impl ValueType {
    /// Every assignable variant, in tag order
    pub const VARIANTS: [ValueType; 17] = [
        ValueType::Bytes,
        ValueType::String,
        ValueType::Int32,
        ValueType::Int64,
        ValueType::Double,
        ValueType::Float,
        ValueType::Bool,
        ValueType::UnixTimestamp,
        ValueType::BytesList,
        ValueType::StringList,
        ValueType::Int32List,
        ValueType::Int64List,
        ValueType::DoubleList,
        ValueType::FloatList,
        ValueType::BoolList,
        ValueType::UnixTimestampList,
        ValueType::Null,
    ];

    /// Wire field tag (0 for `Invalid`)
    pub fn tag(self) -> u32 {
        self as i32 as u32
    }

    /// Variant carried by a field tag; `None` for unassigned and reserved tags
    pub fn from_tag(tag: u32) -> Option<Self> {
        let variant = match tag {
            1 => ValueType::Bytes,
            2 => ValueType::String,
            3 => ValueType::Int32,
            4 => ValueType::Int64,
            5 => ValueType::Double,
            6 => ValueType::Float,
            7 => ValueType::Bool,
            8 => ValueType::UnixTimestamp,
            11 => ValueType::BytesList,
            12 => ValueType::StringList,
            13 => ValueType::Int32List,
            14 => ValueType::Int64List,
            15 => ValueType::DoubleList,
            16 => ValueType::FloatList,
            17 => ValueType::BoolList,
            18 => ValueType::UnixTimestampList,
            19 => ValueType::Null,
            _ => return None,
        };
        Some(variant)
    }

    pub fn as_str_name(self) -> &'static str {
        match self {
            ValueType::Invalid => "INVALID",
            ValueType::Bytes => "BYTES",
            ValueType::String => "STRING",
            ValueType::Int32 => "INT32",
            ValueType::Int64 => "INT64",
            ValueType::Double => "DOUBLE",
            ValueType::Float => "FLOAT",
            ValueType::Bool => "BOOL",
            ValueType::UnixTimestamp => "UNIX_TIMESTAMP",
            ValueType::BytesList => "BYTES_LIST",
            ValueType::StringList => "STRING_LIST",
            ValueType::Int32List => "INT32_LIST",
            ValueType::Int64List => "INT64_LIST",
            ValueType::DoubleList => "DOUBLE_LIST",
            ValueType::FloatList => "FLOAT_LIST",
            ValueType::BoolList => "BOOL_LIST",
            ValueType::UnixTimestampList => "UNIX_TIMESTAMP_LIST",
            ValueType::Null => "NULL",
        }
    }

    pub fn from_str_name(name: &str) -> Option<Self> {
        if name == "INVALID" {
            return Some(ValueType::Invalid);
        }
        Self::VARIANTS
            .into_iter()
            .find(|variant| variant.as_str_name() == name)
    }
}

impl TryFrom<i32> for ValueType {
    type Error = i32;

    fn try_from(value: i32) -> std::result::Result<Self, Self::Error> {
        match value {
            0 => Ok(ValueType::Invalid),
            v if v > 0 => ValueType::from_tag(v as u32).ok_or(value),
            _ => Err(value),
        }
    }
}

/// Payload of the null variant. Only `NULL = 0` is defined; the null variant
/// stores the raw number so values from newer producers survive decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[repr(i32)]
pub enum Null {
    #[default]
    Null = 0,
}

impl TryFrom<i32> for Null {
    type Error = i32;

    fn try_from(value: i32) -> std::result::Result<Self, Self::Error> {
        match value {
            0 => Ok(Null::Null),
            other => Err(other),
        }
    }
}

impl From<Null> for i32 {
    fn from(value: Null) -> Self {
        value as i32
    }
}

/// The populated variant of a `Value`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Val {
    BytesVal(Vec<u8>),
    StringVal(String),
    Int32Val(i32),
    Int64Val(i64),
    DoubleVal(f64),
    FloatVal(f32),
    BoolVal(bool),
    /// Seconds since the Unix epoch
    UnixTimestampVal(i64),
    BytesListVal(BytesList),
    StringListVal(StringList),
    Int32ListVal(Int32List),
    Int64ListVal(Int64List),
    DoubleListVal(DoubleList),
    FloatListVal(FloatList),
    BoolListVal(BoolList),
    UnixTimestampListVal(Int64List),
    /// Raw `Null` enum number
    NullVal(i32),
}

impl Val {
    pub fn value_type(&self) -> ValueType {
        match self {
            Val::BytesVal(_) => ValueType::Bytes,
            Val::StringVal(_) => ValueType::String,
            Val::Int32Val(_) => ValueType::Int32,
            Val::Int64Val(_) => ValueType::Int64,
            Val::DoubleVal(_) => ValueType::Double,
            Val::FloatVal(_) => ValueType::Float,
            Val::BoolVal(_) => ValueType::Bool,
            Val::UnixTimestampVal(_) => ValueType::UnixTimestamp,
            Val::BytesListVal(_) => ValueType::BytesList,
            Val::StringListVal(_) => ValueType::StringList,
            Val::Int32ListVal(_) => ValueType::Int32List,
            Val::Int64ListVal(_) => ValueType::Int64List,
            Val::DoubleListVal(_) => ValueType::DoubleList,
            Val::FloatListVal(_) => ValueType::FloatList,
            Val::BoolListVal(_) => ValueType::BoolList,
            Val::UnixTimestampListVal(_) => ValueType::UnixTimestampList,
            Val::NullVal(_) => ValueType::Null,
        }
    }

    pub fn tag(&self) -> u32 {
        self.value_type().tag()
    }
}

/// Untyped payload handed to `Value::construct`.
///
/// Several variants share a payload type (`int64` and `unix_timestamp` both
/// take `Int64`), so the variant is chosen separately.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Bytes(Vec<u8>),
    String(String),
    Int32(i32),
    Int64(i64),
    Double(f64),
    Float(f32),
    Bool(bool),
    BytesList(Vec<Vec<u8>>),
    StringList(Vec<String>),
    Int32List(Vec<i32>),
    Int64List(Vec<i64>),
    DoubleList(Vec<f64>),
    FloatList(Vec<f32>),
    BoolList(Vec<bool>),
    Null,
}

impl Payload {
    pub fn type_name(&self) -> &'static str {
        match self {
            Payload::Bytes(_) => "bytes",
            Payload::String(_) => "string",
            Payload::Int32(_) => "int32",
            Payload::Int64(_) => "int64",
            Payload::Double(_) => "double",
            Payload::Float(_) => "float",
            Payload::Bool(_) => "bool",
            Payload::BytesList(_) => "bytes list",
            Payload::StringList(_) => "string list",
            Payload::Int32List(_) => "int32 list",
            Payload::Int64List(_) => "int64 list",
            Payload::DoubleList(_) => "double list",
            Payload::FloatList(_) => "float list",
            Payload::BoolList(_) => "bool list",
            Payload::Null => "null",
        }
    }
}

impl From<Vec<u8>> for Payload {
    fn from(v: Vec<u8>) -> Self {
        Payload::Bytes(v)
    }
}

impl From<&[u8]> for Payload {
    fn from(v: &[u8]) -> Self {
        Payload::Bytes(v.to_vec())
    }
}

impl From<String> for Payload {
    fn from(v: String) -> Self {
        Payload::String(v)
    }
}

impl From<&str> for Payload {
    fn from(v: &str) -> Self {
        Payload::String(v.to_owned())
    }
}

impl From<i32> for Payload {
    fn from(v: i32) -> Self {
        Payload::Int32(v)
    }
}

impl From<i64> for Payload {
    fn from(v: i64) -> Self {
        Payload::Int64(v)
    }
}

impl From<f64> for Payload {
    fn from(v: f64) -> Self {
        Payload::Double(v)
    }
}

impl From<f32> for Payload {
    fn from(v: f32) -> Self {
        Payload::Float(v)
    }
}

impl From<bool> for Payload {
    fn from(v: bool) -> Self {
        Payload::Bool(v)
    }
}

impl From<Vec<Vec<u8>>> for Payload {
    fn from(v: Vec<Vec<u8>>) -> Self {
        Payload::BytesList(v)
    }
}

impl From<Vec<String>> for Payload {
    fn from(v: Vec<String>) -> Self {
        Payload::StringList(v)
    }
}

impl From<Vec<&str>> for Payload {
    fn from(v: Vec<&str>) -> Self {
        Payload::StringList(v.into_iter().map(str::to_owned).collect())
    }
}

impl From<Vec<i32>> for Payload {
    fn from(v: Vec<i32>) -> Self {
        Payload::Int32List(v)
    }
}

impl From<Vec<i64>> for Payload {
    fn from(v: Vec<i64>) -> Self {
        Payload::Int64List(v)
    }
}

impl From<Vec<f64>> for Payload {
    fn from(v: Vec<f64>) -> Self {
        Payload::DoubleList(v)
    }
}

impl From<Vec<f32>> for Payload {
    fn from(v: Vec<f32>) -> Self {
        Payload::FloatList(v)
    }
}

impl From<Vec<bool>> for Payload {
    fn from(v: Vec<bool>) -> Self {
        Payload::BoolList(v)
    }
}

impl From<Null> for Payload {
    fn from(_: Null) -> Self {
        Payload::Null
    }
}

/// A feature value: at most one populated variant plus any unknown fields
/// picked up while decoding.
///
/// Two values are equal iff they hold the same variant with equal payloads.
/// Floats use IEEE-754 `==`, so a value holding NaN is not equal to itself.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Value {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub val: Option<Val>,
    #[serde(skip)]
    pub unknown_fields: UnknownFields,
}

impl Value {
    /// A value with no variant set
    pub fn unset() -> Self {
        Self::default()
    }

    /// Build a value holding `variant`, checking that the payload fits it.
    pub fn construct(variant: ValueType, payload: impl Into<Payload>) -> Result<Self> {
        let payload = payload.into();
        let val = match (variant, payload) {
            (ValueType::Bytes, Payload::Bytes(v)) => Val::BytesVal(v),
            (ValueType::String, Payload::String(v)) => Val::StringVal(v),
            (ValueType::Int32, Payload::Int32(v)) => Val::Int32Val(v),
            (ValueType::Int64, Payload::Int64(v)) => Val::Int64Val(v),
            (ValueType::Double, Payload::Double(v)) => Val::DoubleVal(v),
            (ValueType::Float, Payload::Float(v)) => Val::FloatVal(v),
            (ValueType::Bool, Payload::Bool(v)) => Val::BoolVal(v),
            (ValueType::UnixTimestamp, Payload::Int64(v)) => Val::UnixTimestampVal(v),
            (ValueType::BytesList, Payload::BytesList(v)) => Val::BytesListVal(ScalarList::new(v)),
            (ValueType::StringList, Payload::StringList(v)) => {
                Val::StringListVal(ScalarList::new(v))
            }
            (ValueType::Int32List, Payload::Int32List(v)) => Val::Int32ListVal(ScalarList::new(v)),
            (ValueType::Int64List, Payload::Int64List(v)) => Val::Int64ListVal(ScalarList::new(v)),
            (ValueType::DoubleList, Payload::DoubleList(v)) => {
                Val::DoubleListVal(ScalarList::new(v))
            }
            (ValueType::FloatList, Payload::FloatList(v)) => Val::FloatListVal(ScalarList::new(v)),
            (ValueType::BoolList, Payload::BoolList(v)) => Val::BoolListVal(ScalarList::new(v)),
            (ValueType::UnixTimestampList, Payload::Int64List(v)) => {
                Val::UnixTimestampListVal(ScalarList::new(v))
            }
            (ValueType::Null, Payload::Null) => Val::NullVal(Null::Null.into()),
            (variant, payload) => {
                return Err(ValueError::InvalidVariant {
                    variant,
                    payload: payload.type_name(),
                })
            }
        };

        Ok(Self::from(val))
    }

    /// Which variant is populated (`ValueType::Invalid` when unset)
    pub fn discriminant(&self) -> ValueType {
        self.val
            .as_ref()
            .map_or(ValueType::Invalid, Val::value_type)
    }

    pub fn is_set(&self) -> bool {
        self.val.is_some()
    }

    /// The payload if `variant` is the populated one, `None` otherwise.
    pub fn access_as(&self, variant: ValueType) -> Option<&Val> {
        self.val
            .as_ref()
            .filter(|val| val.value_type() == variant)
    }
}

impl From<Val> for Value {
    fn from(val: Val) -> Self {
        Self {
            val: Some(val),
            unknown_fields: UnknownFields::default(),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.val == other.val
    }
}

/// Ordered sequence of independent values (field `val`, tag 1)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RepeatedValue {
    pub val: Vec<Value>,
    #[serde(skip)]
    pub unknown_fields: UnknownFields,
}

impl RepeatedValue {
    pub fn new(val: Vec<Value>) -> Self {
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

    pub fn iter(&self) -> std::slice::Iter<'_, Value> {
        self.val.iter()
    }
}

impl PartialEq for RepeatedValue {
    fn eq(&self, other: &Self) -> bool {
        self.val == other.val
    }
}

impl From<Vec<Value>> for RepeatedValue {
    fn from(val: Vec<Value>) -> Self {
        Self::new(val)
    }
}

impl FromIterator<Value> for RepeatedValue {
    fn from_iter<I: IntoIterator<Item = Value>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a RepeatedValue {
    type Item = &'a Value;
    type IntoIter = std::slice::Iter<'a, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.val.iter()
    }
}

impl IntoIterator for RepeatedValue {
    type Item = Value;
    type IntoIter = std::vec::IntoIter<Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.val.into_iter()
    }
}
