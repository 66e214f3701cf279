//! Simple Paged Results control (RFC 2696)
//!
//! ```text
//! realSearchControlValue ::= SEQUENCE {
//!         size            INTEGER (0..maxInt),
//!         cookie          OCTET STRING }
//! ```

use bytes::Bytes;
use once_cell::sync::Lazy;

use ldap_asn1::ber::decoder::decode_int_in_range;
use ldap_asn1::ber::types::tags;
use ldap_asn1::{Asn1Container, BerEncoder, DecoderConfig, Grammar, Transition, decode_complete};

use super::ControlFactory;
use crate::constants::{MAX_MESSAGE_ID, control_oids};
use crate::error::{DecodeResult, EncodeResult, EncoderError};
use crate::message::ControlValue;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum PagedResultsState {
    Start,
    Value,
    Size,
    Cookie,
}

#[derive(Debug, Default)]
struct PagedResultsValue {
    size: i32,
    cookie: Vec<u8>,
}

type PagedResultsContainer = Asn1Container<PagedResultsState, PagedResultsValue>;

static PAGED_RESULTS_GRAMMAR: Lazy<Grammar<PagedResultsState, PagedResultsValue>> =
    Lazy::new(|| {
        use PagedResultsState::*;

        let mut builder = Grammar::builder("paged results grammar", Start);
        builder
            .add(Transition::new("realSearchControlValue", Start, tags::SEQUENCE, Value))
            .add(Transition::new("size", Value, tags::INTEGER, Size).with_action(store_size))
            .add(
                Transition::new("cookie", Size, tags::OCTET_STRING, Cookie)
                    .optional_end()
                    .with_action(store_cookie),
            );
        builder.build()
    });

fn store_size(container: &mut PagedResultsContainer) -> DecodeResult<()> {
    container.value_mut().size = decode_int_in_range(container.current_value()?, 0, MAX_MESSAGE_ID)?;
    Ok(())
}

fn store_cookie(container: &mut PagedResultsContainer) -> DecodeResult<()> {
    let cookie = container.current_value()?.to_vec();
    container.value_mut().cookie = cookie;
    Ok(())
}

#[derive(Debug, Default, Clone, Copy)]
pub struct PagedResultsFactory;

impl ControlFactory for PagedResultsFactory {
    fn oid(&self) -> &'static str {
        control_oids::PAGED_RESULTS
    }

    fn decode_value(&self, value: &[u8], config: &DecoderConfig) -> DecodeResult<ControlValue> {
        let mut container = Asn1Container::with_config(&*PAGED_RESULTS_GRAMMAR, config.clone());
        decode_complete(value, &mut container)?;
        let PagedResultsValue { size, cookie } = container.into_value();
        Ok(ControlValue::PagedResults { size, cookie })
    }

    fn encode_value(&self, value: &ControlValue) -> EncodeResult<Bytes> {
        let ControlValue::PagedResults { size, cookie } = value else {
            return Err(EncoderError::InvalidValue(format!(
                "Not a paged results value: {:?}",
                value
            )));
        };

        let mut encoder = BerEncoder::with_capacity(cookie.len() + 16);
        encoder.encode_sequence(|encoder| {
            encoder.encode_octet_string(cookie)?;
            encoder.encode_integer(*size)
        })?;
        Ok(encoder.into_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_value() {
        let factory = PagedResultsFactory;
        let value = [0x30, 0x07, 0x02, 0x01, 0x64, 0x04, 0x02, 0xAB, 0xCD];
        let decoded = factory
            .decode_value(&value, &DecoderConfig::default())
            .unwrap();
        assert_eq!(
            decoded,
            ControlValue::PagedResults {
                size: 100,
                cookie: vec![0xAB, 0xCD],
            }
        );

        let encoded = factory.encode_value(&decoded).unwrap();
        assert_eq!(&encoded[..], &value[..]);
    }

    #[test]
    fn test_empty_cookie() {
        let factory = PagedResultsFactory;
        let value = [0x30, 0x05, 0x02, 0x01, 0x00, 0x04, 0x00];
        assert_eq!(
            factory.decode_value(&value, &DecoderConfig::default()).unwrap(),
            ControlValue::PagedResults {
                size: 0,
                cookie: Vec::new(),
            }
        );
    }

    #[test]
    fn test_invalid_values() {
        let factory = PagedResultsFactory;
        let config = DecoderConfig::default();
        // missing cookie
        assert!(factory.decode_value(&[0x30, 0x03, 0x02, 0x01, 0x05], &config).is_err());
        // negative size
        assert!(factory
            .decode_value(&[0x30, 0x05, 0x02, 0x01, 0xFF, 0x04, 0x00], &config)
            .is_err());
        // trailing bytes
        assert!(factory
            .decode_value(&[0x30, 0x05, 0x02, 0x01, 0x01, 0x04, 0x00, 0x00], &config)
            .is_err());
        assert!(factory.encode_value(&ControlValue::Absent).is_err());
    }
}
