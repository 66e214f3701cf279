use thiserror::Error;

use crate::result_code::ResultCode;

/// Errors raised while decoding a BER stream into a PDU
///
/// Every variant except [`DecoderError::ResponseCarrying`] is fatal to the
/// PDU being decoded: the container that produced it must be discarded.
/// `ResponseCarrying` is fatal too, but the peer can be answered with a
/// well-formed LDAP error response instead of having its connection closed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecoderError {
    #[error("Indefinite length encoding is not supported")]
    IndefiniteLength,

    #[error("Length encoded on {0} octets, at most 4 are supported")]
    LengthTooLong(usize),

    #[error("TLV length {length} is above the maximum PDU size {max}")]
    LengthAboveMaximum { length: usize, max: usize },

    #[error("TLV of {actual} bytes does not fit in the {expected} bytes left in its enclosing TLV")]
    ExpectedLengthExceeded { expected: usize, actual: usize },

    #[error("Unsupported tag 0x{0:02X}: multi-octet tags are not supported")]
    UnsupportedTag(u8),

    #[error("Empty INTEGER encoding")]
    EmptyInteger,

    #[error("Invalid INTEGER encoding: {0}")]
    InvalidInteger(String),

    #[error("INTEGER encoded on {0} octets overflows the target type")]
    IntegerOverflow(usize),

    #[error("INTEGER {value} is out of range [{min}, {max}]")]
    IntegerOutOfRange { value: i64, min: i64, max: i64 },

    #[error("Invalid BOOLEAN encoding: expected 1 octet, got {0}")]
    InvalidBoolean(usize),

    #[error("Non canonical BOOLEAN value 0x{0:02X}")]
    NonCanonicalBoolean(u8),

    #[error("Unexpected tag 0x{tag:02X} in state {state} of the {grammar}")]
    UnexpectedTag {
        grammar: &'static str,
        state: String,
        tag: u8,
    },

    #[error("PDU incomplete: the {grammar} cannot end in state {state}")]
    PduIncomplete { grammar: &'static str, state: String },

    #[error("Tag 0x{tag:02X} is not allowed inside {construct} in the {grammar}")]
    MisplacedTlv {
        grammar: &'static str,
        construct: String,
        tag: u8,
    },

    #[error("Constructed TLV {construct} of the {grammar} cannot end after {state}")]
    ConstructIncomplete {
        grammar: &'static str,
        construct: String,
        state: String,
    },

    #[error("Truncated PDU: the input ended before the PDU was complete")]
    TruncatedPdu,

    #[error("{0} trailing bytes after the end of the PDU")]
    TrailingBytes(usize),

    #[error("Invalid value: {0}")]
    InvalidValue(String),

    #[error("{reason}")]
    ResponseCarrying {
        reason: String,
        result_code: ResultCode,
        matched_dn: Option<String>,
    },

    #[error("The decoding container failed earlier and cannot be reused")]
    ContainerFailed,
}

impl DecoderError {
    /// Build an [`DecoderError::InvalidValue`] from any message
    pub fn invalid_value(message: impl Into<String>) -> Self {
        DecoderError::InvalidValue(message.into())
    }

    /// Build a [`DecoderError::ResponseCarrying`] error
    ///
    /// # Arguments
    /// * `reason` - Human readable reason, sent back as the diagnostic message
    /// * `result_code` - Result code of the error response
    pub fn response_carrying(reason: impl Into<String>, result_code: ResultCode) -> Self {
        DecoderError::ResponseCarrying {
            reason: reason.into(),
            result_code,
            matched_dn: None,
        }
    }

    /// Whether the peer can be answered with an LDAP error response
    pub fn is_response_carrying(&self) -> bool {
        matches!(self, DecoderError::ResponseCarrying { .. })
    }
}

/// Errors raised while encoding a PDU
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EncoderError {
    #[error("Buffer overflow: {needed} bytes needed, {available} available")]
    BufferOverflow { needed: usize, available: usize },

    #[error("Invalid value: {0}")]
    InvalidValue(String),
}

/// Result type alias for decoding operations
pub type DecodeResult<T> = Result<T, DecoderError>;

/// Result type alias for encoding operations
pub type EncodeResult<T> = Result<T, EncoderError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_response_carrying_display() {
        let err = DecoderError::response_carrying("bad DN", ResultCode::InvalidDnSyntax);
        assert!(err.is_response_carrying());
        assert_eq!(err.to_string(), "bad DN");
    }

    #[test]
    fn test_unexpected_tag_display() {
        let err = DecoderError::UnexpectedTag {
            grammar: "LDAP message grammar",
            state: "MessageId".to_string(),
            tag: 0x99,
        };
        assert_eq!(
            err.to_string(),
            "Unexpected tag 0x99 in state MessageId of the LDAP message grammar"
        );
        assert!(!err.is_response_carrying());
    }

    #[test]
    fn test_nesting_errors_display() {
        let err = DecoderError::MisplacedTlv {
            grammar: "LDAP message grammar",
            construct: "Controls".to_string(),
            tag: 0x01,
        };
        assert_eq!(
            err.to_string(),
            "Tag 0x01 is not allowed inside Controls in the LDAP message grammar"
        );

        let err = DecoderError::ConstructIncomplete {
            grammar: "LDAP message grammar",
            construct: "ModifyChange".to_string(),
            state: "ModifyOperation".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Constructed TLV ModifyChange of the LDAP message grammar cannot end after ModifyOperation"
        );
    }
}
