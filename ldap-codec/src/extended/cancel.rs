//! Cancel operation (RFC 3909)
//!
//! ```text
//! cancelRequestValue ::= SEQUENCE {
//!     cancelID        MessageID }
//! ```

use bytes::Bytes;
use once_cell::sync::Lazy;

use ldap_asn1::ber::decoder::decode_int_in_range;
use ldap_asn1::ber::types::tags;
use ldap_asn1::{Asn1Container, BerEncoder, DecoderConfig, Grammar, Transition, decode_complete};

use super::ExtendedOperationFactory;
use crate::constants::{MAX_MESSAGE_ID, extended_oids};
use crate::error::{DecodeResult, EncodeResult, EncoderError};
use crate::message::ExtendedValue;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum CancelState {
    Start,
    Value,
    CancelId,
}

static CANCEL_GRAMMAR: Lazy<Grammar<CancelState, i32>> = Lazy::new(|| {
    let mut builder = Grammar::builder("cancel grammar", CancelState::Start);
    builder
        .add(Transition::new(
            "cancelRequestValue",
            CancelState::Start,
            tags::SEQUENCE,
            CancelState::Value,
        ))
        .add(
            Transition::new("cancelID", CancelState::Value, tags::INTEGER, CancelState::CancelId)
                .optional_end()
                .with_action(store_cancel_id),
        );
    builder.build()
});

fn store_cancel_id(container: &mut Asn1Container<CancelState, i32>) -> DecodeResult<()> {
    let cancel_id = decode_int_in_range(container.current_value()?, 0, MAX_MESSAGE_ID)?;
    *container.value_mut() = cancel_id;
    Ok(())
}

#[derive(Debug, Default, Clone, Copy)]
pub struct CancelFactory;

impl ExtendedOperationFactory for CancelFactory {
    fn oid(&self) -> &'static str {
        extended_oids::CANCEL
    }

    fn decode_request_value(
        &self,
        value: &[u8],
        config: &DecoderConfig,
    ) -> DecodeResult<ExtendedValue> {
        let mut container = Asn1Container::with_config(&*CANCEL_GRAMMAR, config.clone());
        decode_complete(value, &mut container)?;
        Ok(ExtendedValue::Cancel {
            cancel_id: container.into_value(),
        })
    }

    fn encode_request_value(&self, value: &ExtendedValue) -> EncodeResult<Bytes> {
        let ExtendedValue::Cancel { cancel_id } = value else {
            return Err(EncoderError::InvalidValue(format!(
                "Not a cancel request value: {:?}",
                value
            )));
        };

        let mut encoder = BerEncoder::with_capacity(8);
        encoder.encode_sequence(|encoder| encoder.encode_integer(*cancel_id))?;
        Ok(encoder.into_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancel_request_value() {
        let factory = CancelFactory;
        let config = DecoderConfig::default();
        let value = [0x30, 0x03, 0x02, 0x01, 0x2A];

        let decoded = factory.decode_request_value(&value, &config).unwrap();
        assert_eq!(decoded, ExtendedValue::Cancel { cancel_id: 42 });
        assert_eq!(&factory.encode_request_value(&decoded).unwrap()[..], &value[..]);
    }

    #[test]
    fn test_invalid_cancel_values() {
        let factory = CancelFactory;
        let config = DecoderConfig::default();
        assert!(factory.decode_request_value(&[0x30, 0x00], &config).is_err());
        assert!(factory
            .decode_request_value(&[0x30, 0x03, 0x02, 0x01, 0x80], &config)
            .is_err());
        assert!(factory.decode_response_value(&[0x00], &config).is_err());
    }
}
