//! StartTLS (RFC 4511 section 4.14): neither request nor response value

use super::ExtendedOperationFactory;
use crate::constants::extended_oids;

#[derive(Debug, Default, Clone, Copy)]
pub struct StartTlsFactory;

impl ExtendedOperationFactory for StartTlsFactory {
    fn oid(&self) -> &'static str {
        extended_oids::START_TLS
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ldap_asn1::DecoderConfig;

    #[test]
    fn test_values_rejected() {
        let factory = StartTlsFactory;
        let config = DecoderConfig::default();
        assert!(factory.decode_request_value(b"x", &config).is_err());
        assert!(factory.decode_response_value(b"x", &config).is_err());
    }
}
