//! Decoder configuration

use serde::{Deserialize, Serialize};

use crate::error::{DecodeResult, DecoderError};

/// Default upper bound of a PDU length (2 MiB)
pub const DEFAULT_MAX_PDU_SIZE: usize = 2 * 1024 * 1024;

/// How BOOLEAN values other than `0x00`/`0xFF` are handled
///
/// BER accepts any non-zero octet as TRUE, DER and CER only `0xFF`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BooleanPolicy {
    /// Any non-zero octet is TRUE, non canonical ones are logged
    #[default]
    Lenient,
    /// Only `0xFF` is TRUE, any other non-zero octet is a decoding error
    Strict,
}

/// Decoder configuration
///
/// Carried by every container. Deserializable so that a host application can
/// embed it in its own configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecoderConfig {
    /// Largest TLV length accepted; protects against hostile declared lengths
    pub max_pdu_size: usize,
    /// BOOLEAN decoding policy
    pub boolean_policy: BooleanPolicy,
}

impl Default for DecoderConfig {
    fn default() -> Self {
        Self {
            max_pdu_size: DEFAULT_MAX_PDU_SIZE,
            boolean_policy: BooleanPolicy::default(),
        }
    }
}

impl DecoderConfig {
    /// Create a builder starting from the default configuration
    pub fn builder() -> DecoderConfigBuilder {
        DecoderConfigBuilder::new()
    }
}

/// Decoder configuration builder
pub struct DecoderConfigBuilder {
    max_pdu_size: usize,
    boolean_policy: BooleanPolicy,
}

impl DecoderConfigBuilder {
    /// Create a new builder with the default configuration
    pub fn new() -> Self {
        Self {
            max_pdu_size: DEFAULT_MAX_PDU_SIZE,
            boolean_policy: BooleanPolicy::default(),
        }
    }

    /// Set the maximum PDU size
    pub fn set_max_pdu_size(mut self, max_pdu_size: usize) -> Self {
        self.max_pdu_size = max_pdu_size;
        self
    }

    /// Set the BOOLEAN decoding policy
    pub fn set_boolean_policy(mut self, policy: BooleanPolicy) -> Self {
        self.boolean_policy = policy;
        self
    }

    /// Build the configuration
    ///
    /// # Errors
    /// Returns error if the maximum PDU size is zero
    pub fn build(self) -> DecodeResult<DecoderConfig> {
        if self.max_pdu_size == 0 {
            return Err(DecoderError::invalid_value(
                "The maximum PDU size must be greater than zero",
            ));
        }

        Ok(DecoderConfig {
            max_pdu_size: self.max_pdu_size,
            boolean_policy: self.boolean_policy,
        })
    }
}

impl Default for DecoderConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = DecoderConfig::default();
        assert_eq!(config.max_pdu_size, DEFAULT_MAX_PDU_SIZE);
        assert_eq!(config.boolean_policy, BooleanPolicy::Lenient);
    }

    #[test]
    fn test_builder() {
        let config = DecoderConfig::builder()
            .set_max_pdu_size(1024)
            .set_boolean_policy(BooleanPolicy::Strict)
            .build()
            .unwrap();
        assert_eq!(config.max_pdu_size, 1024);
        assert_eq!(config.boolean_policy, BooleanPolicy::Strict);
    }

    #[test]
    fn test_builder_rejects_zero_pdu_size() {
        assert!(DecoderConfig::builder().set_max_pdu_size(0).build().is_err());
    }
}
