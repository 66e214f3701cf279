//! Control value codecs
//!
//! A [`ControlFactory`] decodes and encodes the `controlValue` of one control
//! type. Factories are registered by OID in the
//! [`LdapCodecService`](crate::codec::LdapCodecService); controls without
//! factory keep their raw value.

pub mod manage_dsa_it;
pub mod paged_results;
pub mod subentries;

use bytes::Bytes;

use ldap_asn1::DecoderConfig;

use crate::error::{DecodeResult, DecoderError, EncodeResult, EncoderError};
use crate::message::ControlValue;

pub use manage_dsa_it::ManageDsaItFactory;
pub use paged_results::PagedResultsFactory;
pub use subentries::SubentriesFactory;

/// Codec of the value of one control type
pub trait ControlFactory: Send + Sync {
    /// OID of the control type handled by this factory
    fn oid(&self) -> &'static str;

    /// Decode the content of the `controlValue` OCTET STRING
    ///
    /// Never called when the control has no value.
    fn decode_value(&self, value: &[u8], config: &DecoderConfig) -> DecodeResult<ControlValue> {
        let _ = config;
        Err(DecoderError::invalid_value(format!(
            "Control {} expects no value, got {} bytes",
            self.oid(),
            value.len()
        )))
    }

    /// Encode `value` as the content of the `controlValue` OCTET STRING
    fn encode_value(&self, value: &ControlValue) -> EncodeResult<Bytes> {
        Err(EncoderError::InvalidValue(format!(
            "Control {} cannot encode {:?}",
            self.oid(),
            value
        )))
    }
}
