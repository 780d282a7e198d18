//! Typed feature values and their wire codec
//!
//! A `Value` holds at most one of seventeen variants (scalars, homogeneous
//! lists, or an explicit null) and travels between feature store clients and
//! servers as a protobuf-compatible byte buffer. Field tags are a
//! compatibility contract: tags 9 and 10 stay reserved, and unknown fields
//! from newer producers are carried through decode/encode untouched.
//!
//! # Example
//!
//! ```rust
//! use feature_value::{codec, Val, Value, ValueType};
//!
//! let value = Value::construct(ValueType::StringList, vec!["a", "bb", "ccc"]).unwrap();
//! let buf = codec::encode(&value).unwrap();
//!
//! let decoded = codec::decode(&buf).unwrap();
//! assert_eq!(decoded.discriminant(), ValueType::StringList);
//! assert_eq!(decoded, value);
//! assert!(decoded.access_as(ValueType::Int32).is_none());
//!
//! match decoded.val {
//!     Some(Val::StringListVal(list)) => assert_eq!(list.val, ["a", "bb", "ccc"]),
//!     other => panic!("unexpected variant: {:?}", other),
//! }
//! ```

pub mod codec;
pub mod config;
pub mod error;
pub mod list;
pub mod unknown;
pub mod value;
mod wire;

// Re-export main types for convenience
pub use codec::{decode, decode_repeated, encode, encode_repeated, encoded_len, ValueCodec};
pub use crate::config::CodecConfig;
pub use error::{Result, ValueError};
pub use list::{
    BoolList, BytesList, DoubleList, FloatList, Int32List, Int64List, Scalar, ScalarList,
    StringList,
};
pub use unknown::{UnknownField, UnknownFields};
pub use value::{Null, Payload, RepeatedValue, Val, Value, ValueType, RESERVED_TAGS};
pub use wire::{WireType, MAX_TAG};
