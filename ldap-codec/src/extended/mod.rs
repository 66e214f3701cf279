//! Extended operation value codecs
//!
//! An [`ExtendedOperationFactory`] decodes and encodes the `requestValue` and
//! `responseValue` of one extended operation. Operations without registered
//! factory keep their raw values.

pub mod cancel;
pub mod start_tls;
pub mod who_am_i;

use bytes::Bytes;

use ldap_asn1::DecoderConfig;

use crate::error::{DecodeResult, DecoderError, EncodeResult, EncoderError};
use crate::message::ExtendedValue;

pub use cancel::CancelFactory;
pub use start_tls::StartTlsFactory;
pub use who_am_i::WhoAmIFactory;

/// Codec of the values of one extended operation
///
/// The default methods reject any value, which suits operations carrying
/// none. Decoders are never called for an absent value.
pub trait ExtendedOperationFactory: Send + Sync {
    /// `requestName` of the operation
    fn oid(&self) -> &'static str;

    fn decode_request_value(
        &self,
        value: &[u8],
        config: &DecoderConfig,
    ) -> DecodeResult<ExtendedValue> {
        let _ = config;
        Err(unexpected_value(self.oid(), "request", value))
    }

    fn encode_request_value(&self, value: &ExtendedValue) -> EncodeResult<Bytes> {
        Err(unencodable_value(self.oid(), "request", value))
    }

    fn decode_response_value(
        &self,
        value: &[u8],
        config: &DecoderConfig,
    ) -> DecodeResult<ExtendedValue> {
        let _ = config;
        Err(unexpected_value(self.oid(), "response", value))
    }

    fn encode_response_value(&self, value: &ExtendedValue) -> EncodeResult<Bytes> {
        Err(unencodable_value(self.oid(), "response", value))
    }
}

fn unexpected_value(oid: &str, kind: &str, value: &[u8]) -> DecoderError {
    DecoderError::invalid_value(format!(
        "Extended operation {} expects no {} value, got {} bytes",
        oid,
        kind,
        value.len()
    ))
}

fn unencodable_value(oid: &str, kind: &str, value: &ExtendedValue) -> EncoderError {
    EncoderError::InvalidValue(format!(
        "Extended operation {} cannot encode {} value {:?}",
        oid, kind, value
    ))
}
