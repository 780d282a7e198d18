//! Error types for the feature value codec

use thiserror::Error;

use crate::value::ValueType;

/// Result type for value construction and wire codec operations
pub type Result<T> = std::result::Result<T, ValueError>;

/// Errors that can occur while building, encoding or decoding a `Value`
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValueError {
    /// Payload type does not match the payload type declared for the variant
    #[error("Invalid variant: {variant:?} cannot hold a {payload} payload")]
    InvalidVariant {
        variant: ValueType,
        payload: &'static str,
    },

    /// More than one variant tag would be written for a single value
    #[error("Multiple variants set: field tags {first} and {second}")]
    MultipleVariantsSet { first: u32, second: u32 },

    /// An unknown field carries a tag that its container decodes itself, so
    /// the encoded bytes would not decode back
    #[error("Conflicting unknown field: tag {tag} belongs to a known field")]
    ConflictingUnknownField { tag: u32 },

    /// Truncated buffer, runaway varint, length prefix overflow, bad UTF-8, ...
    #[error("Malformed wire data: {0}")]
    MalformedWire(String),

    /// Message rejected by a size-limited codec before encoding or decoding
    #[error("Message too large: {size} bytes exceeds limit of {limit} bytes")]
    MessageTooLarge { size: usize, limit: usize },
}

impl ValueError {
    pub(crate) fn malformed(msg: impl Into<String>) -> Self {
        ValueError::MalformedWire(msg.into())
    }

    /// Check if the error was caused by bad wire data. Size limit rejections
    /// are policy, not corruption, and do not count.
    pub fn is_malformed(&self) -> bool {
        matches!(self, ValueError::MalformedWire(_))
    }

    /// Check if the error indicates a bug at the call site (never worth retrying)
    pub fn is_programming_error(&self) -> bool {
        matches!(
            self,
            ValueError::InvalidVariant { .. }
                | ValueError::MultipleVariantsSet { .. }
                | ValueError::ConflictingUnknownField { .. }
        )
    }
}

impl From<prost::DecodeError> for ValueError {
    fn from(err: prost::DecodeError) -> Self {
        ValueError::MalformedWire(err.to_string())
    }
}
