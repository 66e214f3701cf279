//! Error types of the LDAP message layer

use thiserror::Error;

pub use ldap_core::error::{DecodeResult, DecoderError, EncodeResult, EncoderError};

use crate::message::LdapMessage;

/// Errors returned by the LDAP decoder and encoder
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// The PDU is malformed; the connection should be closed
    #[error("Decoding error: {0}")]
    Decoder(#[from] DecoderError),

    #[error("Encoding error: {0}")]
    Encoder(#[from] EncoderError),

    /// The PDU is rejected, but the peer can be answered with `response`
    #[error("{reason}")]
    ResponseCarrying {
        reason: String,
        response: Box<LdapMessage>,
    },
}

impl CodecError {
    /// The LDAP response to send back, if any
    pub fn response(&self) -> Option<&LdapMessage> {
        match self {
            CodecError::ResponseCarrying { response, .. } => Some(response),
            _ => None,
        }
    }
}

/// Result type alias for LDAP codec operations
pub type CodecResult<T> = Result<T, CodecError>;
