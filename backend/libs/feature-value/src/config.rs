use serde::Deserialize;

/// Default decode/encode limit, matching the usual RPC transport message cap
pub const DEFAULT_MAX_MESSAGE_BYTES: usize = 4 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CodecConfig {
    /// Largest buffer a `ValueCodec` will encode or decode (0 = unlimited)
    pub max_message_bytes: usize,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            max_message_bytes: DEFAULT_MAX_MESSAGE_BYTES,
        }
    }
}

impl CodecConfig {
    /// Load from defaults overridden by `FEATURE_VALUE_*` environment variables
    pub fn from_env() -> Result<Self, ::config::ConfigError> {
        let config = ::config::Config::builder()
            .set_default("max_message_bytes", DEFAULT_MAX_MESSAGE_BYTES as i64)?
            .add_source(::config::Environment::with_prefix("FEATURE_VALUE").try_parsing(true))
            .build()?;

        config.try_deserialize()
    }

    pub fn unlimited() -> Self {
        Self {
            max_message_bytes: 0,
        }
    }

    pub fn is_unlimited(&self) -> bool {
        self.max_message_bytes == 0
    }
}
