//! Subentries control (RFC 3672)
//!
//! The control value is a BOOLEAN `visibility`.

use bytes::Bytes;
use once_cell::sync::Lazy;

use ldap_asn1::ber::decoder::decode_boolean;
use ldap_asn1::ber::types::tags;
use ldap_asn1::{Asn1Container, BerEncoder, DecoderConfig, Grammar, Transition, decode_complete};

use super::ControlFactory;
use crate::constants::control_oids;
use crate::error::{DecodeResult, EncodeResult, EncoderError};
use crate::message::ControlValue;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum SubentriesState {
    Start,
    Visibility,
}

static SUBENTRIES_GRAMMAR: Lazy<Grammar<SubentriesState, bool>> = Lazy::new(|| {
    let mut builder = Grammar::builder("subentries grammar", SubentriesState::Start);
    builder.add(
        Transition::new(
            "visibility",
            SubentriesState::Start,
            tags::BOOLEAN,
            SubentriesState::Visibility,
        )
        .optional_end()
        .with_action(store_visibility),
    );
    builder.build()
});

fn store_visibility(container: &mut Asn1Container<SubentriesState, bool>) -> DecodeResult<()> {
    let policy = container.config().boolean_policy;
    let visibility = decode_boolean(container.current_value()?, policy)?;
    *container.value_mut() = visibility;
    Ok(())
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SubentriesFactory;

impl ControlFactory for SubentriesFactory {
    fn oid(&self) -> &'static str {
        control_oids::SUBENTRIES
    }

    fn decode_value(&self, value: &[u8], config: &DecoderConfig) -> DecodeResult<ControlValue> {
        let mut container = Asn1Container::with_config(&*SUBENTRIES_GRAMMAR, config.clone());
        decode_complete(value, &mut container)?;
        Ok(ControlValue::Subentries {
            visibility: container.into_value(),
        })
    }

    fn encode_value(&self, value: &ControlValue) -> EncodeResult<Bytes> {
        match value {
            ControlValue::Subentries { visibility } => {
                let mut encoder = BerEncoder::with_capacity(3);
                encoder.encode_boolean(*visibility)?;
                Ok(encoder.into_bytes())
            }
            _ => Err(EncoderError::InvalidValue(format!(
                "Not a subentries value: {:?}",
                value
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ldap_asn1::BooleanPolicy;

    #[test]
    fn test_visibility() {
        let factory = SubentriesFactory;
        let config = DecoderConfig::default();
        assert_eq!(
            factory.decode_value(&[0x01, 0x01, 0xFF], &config).unwrap(),
            ControlValue::Subentries { visibility: true }
        );
        assert_eq!(
            factory.decode_value(&[0x01, 0x01, 0x00], &config).unwrap(),
            ControlValue::Subentries { visibility: false }
        );
        assert_eq!(
            &factory
                .encode_value(&ControlValue::Subentries { visibility: true })
                .unwrap()[..],
            &[0x01, 0x01, 0xFF]
        );
    }

    #[test]
    fn test_boolean_policy() {
        let factory = SubentriesFactory;
        let lenient = DecoderConfig::default();
        assert_eq!(
            factory.decode_value(&[0x01, 0x01, 0x01], &lenient).unwrap(),
            ControlValue::Subentries { visibility: true }
        );

        let strict = DecoderConfig::builder()
            .set_boolean_policy(BooleanPolicy::Strict)
            .build()
            .unwrap();
        assert!(factory.decode_value(&[0x01, 0x01, 0x01], &strict).is_err());
        assert!(factory.decode_value(&[0x04, 0x01, 0xFF], &strict).is_err());
    }
}
