//! ManageDsaIT control (RFC 3296): no value

use super::ControlFactory;
use crate::constants::control_oids;

#[derive(Debug, Default, Clone, Copy)]
pub struct ManageDsaItFactory;

impl ControlFactory for ManageDsaItFactory {
    fn oid(&self) -> &'static str {
        control_oids::MANAGE_DSA_IT
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::ControlValue;
    use ldap_asn1::DecoderConfig;

    #[test]
    fn test_value_rejected() {
        let factory = ManageDsaItFactory;
        assert!(factory.decode_value(&[0x01], &DecoderConfig::default()).is_err());
        assert!(factory.encode_value(&ControlValue::Raw(vec![1])).is_err());
    }
}
