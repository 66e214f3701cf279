//! "Who am I?" operation (RFC 4532)
//!
//! The request has no value; the response value is the authzId itself, not
//! wrapped in any ASN.1 element.

use bytes::Bytes;

use ldap_asn1::DecoderConfig;
use ldap_asn1::ber::decoder::decode_utf8;

use super::ExtendedOperationFactory;
use crate::constants::extended_oids;
use crate::error::{DecodeResult, EncodeResult, EncoderError};
use crate::message::ExtendedValue;

#[derive(Debug, Default, Clone, Copy)]
pub struct WhoAmIFactory;

impl ExtendedOperationFactory for WhoAmIFactory {
    fn oid(&self) -> &'static str {
        extended_oids::WHO_AM_I
    }

    fn decode_response_value(
        &self,
        value: &[u8],
        _config: &DecoderConfig,
    ) -> DecodeResult<ExtendedValue> {
        Ok(ExtendedValue::AuthzId(decode_utf8(value)?))
    }

    fn encode_response_value(&self, value: &ExtendedValue) -> EncodeResult<Bytes> {
        match value {
            ExtendedValue::AuthzId(authz_id) => Ok(Bytes::copy_from_slice(authz_id.as_bytes())),
            _ => Err(EncoderError::InvalidValue(format!(
                "Not an authzId: {:?}",
                value
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_authz_id() {
        let factory = WhoAmIFactory;
        let config = DecoderConfig::default();
        let value = factory
            .decode_response_value(b"dn:cn=admin,dc=example,dc=com", &config)
            .unwrap();
        assert_eq!(
            value,
            ExtendedValue::AuthzId("dn:cn=admin,dc=example,dc=com".to_string())
        );
        assert_eq!(
            &factory.encode_response_value(&value).unwrap()[..],
            b"dn:cn=admin,dc=example,dc=com"
        );

        // anonymous
        assert_eq!(
            factory.decode_response_value(b"", &config).unwrap(),
            ExtendedValue::AuthzId(String::new())
        );
        assert!(factory.decode_request_value(b"x", &config).is_err());
        assert!(factory.decode_response_value(&[0xFF], &config).is_err());
    }
}
