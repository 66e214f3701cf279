//! LDAP message encoder
//!
//! Messages are encoded backward into an [`Asn1Buffer`](ldap_asn1::Asn1Buffer):
//! every constructed element writes its last child first, then prefixes its
//! own length and tag once the content size is known. Values of controls and
//! extended operations go through the factories of the codec service.

use std::sync::Arc;

use bytes::Bytes;

use ldap_asn1::BerEncoder;

use crate::codec::LdapCodecService;
use crate::constants::{MAX_FILTER_DEPTH, context_tags, filter_tags, op_tags};
use crate::error::{CodecResult, EncodeResult, EncoderError};
use crate::message::{
    AttributeValueAssertion, BindAuthentication, Control, Filter, LdapMessage, LdapResult,
    PartialAttribute, ProtocolOp,
};

/// Initial buffer size; the buffer grows as needed
const INITIAL_CAPACITY: usize = 256;

/// One-shot LDAP message encoder
#[derive(Debug, Clone)]
pub struct LdapEncoder {
    service: Arc<LdapCodecService>,
}

impl LdapEncoder {
    /// Create an encoder with the built-in factories
    pub fn new() -> Self {
        Self::with_service(Arc::new(LdapCodecService::new()))
    }

    pub fn with_service(service: Arc<LdapCodecService>) -> Self {
        Self { service }
    }

    /// Encode a complete LDAPMessage PDU
    pub fn encode(&self, message: &LdapMessage) -> CodecResult<Bytes> {
        Ok(encode_message(&self.service, message)?)
    }
}

impl Default for LdapEncoder {
    fn default() -> Self {
        Self::new()
    }
}

/// Encode `message` with the factories of `service`
pub(crate) fn encode_message(
    service: &LdapCodecService,
    message: &LdapMessage,
) -> EncodeResult<Bytes> {
    if message.message_id < 0 {
        return Err(EncoderError::InvalidValue(format!(
            "Negative message id {}",
            message.message_id
        )));
    }

    let mut encoder = BerEncoder::with_capacity(INITIAL_CAPACITY);
    encoder.encode_sequence(|e| {
        if !message.controls.is_empty() {
            e.encode_tlv_with(context_tags::CONTROLS, |e| {
                for control in message.controls.iter().rev() {
                    encode_control(e, service, control)?;
                }
                Ok(())
            })?;
        }
        encode_protocol_op(e, service, &message.protocol_op)?;
        e.encode_integer(message.message_id)
    })?;

    log::trace!(
        "Encoded {} message {} on {} bytes",
        message.message_type(),
        message.message_id,
        encoder.position()
    );
    Ok(encoder.into_bytes())
}

/// `criticality` is DEFAULT FALSE, so it is only written when TRUE
fn encode_control(e: &mut BerEncoder, service: &LdapCodecService, control: &Control) -> EncodeResult<()> {
    e.encode_sequence(|e| {
        if let Some(value) = service.encode_control_value(&control.control_type, &control.value)? {
            e.encode_octet_string(&value)?;
        }
        if control.criticality {
            e.encode_boolean(true)?;
        }
        e.encode_octet_string(control.control_type.as_bytes())
    })
}

fn encode_protocol_op(e: &mut BerEncoder, service: &LdapCodecService, op: &ProtocolOp) -> EncodeResult<()> {
    match op {
        ProtocolOp::BindRequest(request) => e.encode_tlv_with(op_tags::BIND_REQUEST, |e| {
            match &request.authentication {
                BindAuthentication::Simple(password) => {
                    e.encode_octet_string_with_tag(context_tags::SIMPLE_AUTH, password)?
                }
                BindAuthentication::Sasl {
                    mechanism,
                    credentials,
                } => e.encode_tlv_with(context_tags::SASL_AUTH, |e| {
                    if let Some(credentials) = credentials {
                        e.encode_octet_string(credentials)?;
                    }
                    e.encode_octet_string(mechanism.as_bytes())
                })?,
            }
            e.encode_octet_string(request.name.as_bytes())?;
            e.encode_integer(request.version)
        }),
        ProtocolOp::BindResponse(response) => e.encode_tlv_with(op_tags::BIND_RESPONSE, |e| {
            if let Some(creds) = &response.server_sasl_creds {
                e.encode_octet_string_with_tag(context_tags::SERVER_SASL_CREDS, creds)?;
            }
            encode_ldap_result(e, &response.result)
        }),
        ProtocolOp::UnbindRequest => e.encode_tlv(op_tags::UNBIND_REQUEST, &[]),
        ProtocolOp::SearchRequest(request) => e.encode_tlv_with(op_tags::SEARCH_REQUEST, |e| {
            e.encode_sequence(|e| {
                for attribute in request.attributes.iter().rev() {
                    e.encode_octet_string(attribute.as_bytes())?;
                }
                Ok(())
            })?;
            encode_filter(e, &request.filter)?;
            e.encode_boolean(request.types_only)?;
            e.encode_integer(request.time_limit)?;
            e.encode_integer(request.size_limit)?;
            e.encode_enumerated(request.deref_aliases as i32)?;
            e.encode_enumerated(request.scope as i32)?;
            e.encode_octet_string(request.base_object.as_bytes())
        }),
        ProtocolOp::SearchResultEntry(entry) => {
            e.encode_tlv_with(op_tags::SEARCH_RESULT_ENTRY, |e| {
                encode_attribute_list(e, &entry.attributes)?;
                e.encode_octet_string(entry.object_name.as_bytes())
            })
        }
        ProtocolOp::SearchResultDone(result) => {
            e.encode_tlv_with(op_tags::SEARCH_RESULT_DONE, |e| encode_ldap_result(e, result))
        }
        ProtocolOp::SearchResultReference(uris) => {
            e.encode_tlv_with(op_tags::SEARCH_RESULT_REFERENCE, |e| {
                for uri in uris.iter().rev() {
                    e.encode_octet_string(uri.as_bytes())?;
                }
                Ok(())
            })
        }
        ProtocolOp::ModifyRequest(request) => e.encode_tlv_with(op_tags::MODIFY_REQUEST, |e| {
            e.encode_sequence(|e| {
                for change in request.changes.iter().rev() {
                    e.encode_sequence(|e| {
                        encode_partial_attribute(e, &change.modification)?;
                        e.encode_enumerated(change.operation as i32)
                    })?;
                }
                Ok(())
            })?;
            e.encode_octet_string(request.object.as_bytes())
        }),
        ProtocolOp::ModifyResponse(result) => {
            e.encode_tlv_with(op_tags::MODIFY_RESPONSE, |e| encode_ldap_result(e, result))
        }
        ProtocolOp::AddRequest(request) => e.encode_tlv_with(op_tags::ADD_REQUEST, |e| {
            encode_attribute_list(e, &request.attributes)?;
            e.encode_octet_string(request.entry.as_bytes())
        }),
        ProtocolOp::AddResponse(result) => {
            e.encode_tlv_with(op_tags::ADD_RESPONSE, |e| encode_ldap_result(e, result))
        }
        ProtocolOp::DelRequest(entry) => e.encode_tlv(op_tags::DEL_REQUEST, entry.as_bytes()),
        ProtocolOp::DelResponse(result) => {
            e.encode_tlv_with(op_tags::DEL_RESPONSE, |e| encode_ldap_result(e, result))
        }
        ProtocolOp::ModifyDnRequest(request) => {
            e.encode_tlv_with(op_tags::MODIFY_DN_REQUEST, |e| {
                if let Some(new_superior) = &request.new_superior {
                    e.encode_octet_string_with_tag(
                        context_tags::NEW_SUPERIOR,
                        new_superior.as_bytes(),
                    )?;
                }
                e.encode_boolean(request.delete_old_rdn)?;
                e.encode_octet_string(request.new_rdn.as_bytes())?;
                e.encode_octet_string(request.entry.as_bytes())
            })
        }
        ProtocolOp::ModifyDnResponse(result) => {
            e.encode_tlv_with(op_tags::MODIFY_DN_RESPONSE, |e| encode_ldap_result(e, result))
        }
        ProtocolOp::CompareRequest(request) => {
            e.encode_tlv_with(op_tags::COMPARE_REQUEST, |e| {
                e.encode_sequence(|e| encode_ava(e, &request.ava))?;
                e.encode_octet_string(request.entry.as_bytes())
            })
        }
        ProtocolOp::CompareResponse(result) => {
            e.encode_tlv_with(op_tags::COMPARE_RESPONSE, |e| encode_ldap_result(e, result))
        }
        ProtocolOp::AbandonRequest(message_id) => {
            e.encode_tagged_integer(op_tags::ABANDON_REQUEST, *message_id)
        }
        ProtocolOp::ExtendedRequest(request) => {
            e.encode_tlv_with(op_tags::EXTENDED_REQUEST, |e| {
                let value = service
                    .encode_extended_request_value(&request.request_name, &request.request_value)?;
                if let Some(value) = value {
                    e.encode_octet_string_with_tag(context_tags::EXTENDED_REQUEST_VALUE, &value)?;
                }
                e.encode_octet_string_with_tag(
                    context_tags::EXTENDED_REQUEST_NAME,
                    request.request_name.as_bytes(),
                )
            })
        }
        ProtocolOp::ExtendedResponse(response) => {
            e.encode_tlv_with(op_tags::EXTENDED_RESPONSE, |e| {
                let name = response.response_name.as_deref();
                if let Some(value) =
                    service.encode_extended_response_value(name, &response.response_value)?
                {
                    e.encode_octet_string_with_tag(context_tags::EXTENDED_RESPONSE_VALUE, &value)?;
                }
                if let Some(name) = name {
                    e.encode_octet_string_with_tag(
                        context_tags::EXTENDED_RESPONSE_NAME,
                        name.as_bytes(),
                    )?;
                }
                encode_ldap_result(e, &response.result)
            })
        }
        ProtocolOp::IntermediateResponse(response) => {
            e.encode_tlv_with(op_tags::INTERMEDIATE_RESPONSE, |e| {
                let name = response.response_name.as_deref();
                if let Some(value) =
                    service.encode_extended_response_value(name, &response.response_value)?
                {
                    e.encode_octet_string_with_tag(
                        context_tags::INTERMEDIATE_RESPONSE_VALUE,
                        &value,
                    )?;
                }
                if let Some(name) = name {
                    e.encode_octet_string_with_tag(
                        context_tags::INTERMEDIATE_RESPONSE_NAME,
                        name.as_bytes(),
                    )?;
                }
                Ok(())
            })
        }
    }
}

/// LDAPResult components, without enclosing tag
fn encode_ldap_result(e: &mut BerEncoder, result: &LdapResult) -> EncodeResult<()> {
    if !result.referrals.is_empty() {
        e.encode_tlv_with(context_tags::REFERRAL, |e| {
            for uri in result.referrals.iter().rev() {
                e.encode_octet_string(uri.as_bytes())?;
            }
            Ok(())
        })?;
    }
    e.encode_octet_string(result.diagnostic_message.as_bytes())?;
    e.encode_octet_string(result.matched_dn.as_bytes())?;
    e.encode_enumerated(result.result_code.to_i32())
}

/// AttributeValueAssertion components, without enclosing tag
fn encode_ava(e: &mut BerEncoder, ava: &AttributeValueAssertion) -> EncodeResult<()> {
    e.encode_octet_string(&ava.assertion_value)?;
    e.encode_octet_string(ava.attribute_desc.as_bytes())
}

fn encode_partial_attribute(e: &mut BerEncoder, attribute: &PartialAttribute) -> EncodeResult<()> {
    e.encode_sequence(|e| {
        e.encode_set(|e| {
            for value in attribute.values.iter().rev() {
                e.encode_octet_string(value)?;
            }
            Ok(())
        })?;
        e.encode_octet_string(attribute.attribute_type.as_bytes())
    })
}

fn encode_attribute_list(e: &mut BerEncoder, attributes: &[PartialAttribute]) -> EncodeResult<()> {
    e.encode_sequence(|e| {
        for attribute in attributes.iter().rev() {
            encode_partial_attribute(e, attribute)?;
        }
        Ok(())
    })
}

fn encode_filter(e: &mut BerEncoder, filter: &Filter) -> EncodeResult<()> {
    let depth = filter.depth();
    if depth > MAX_FILTER_DEPTH {
        return Err(EncoderError::InvalidValue(format!(
            "Filter nested on {} levels, at most {} are supported",
            depth, MAX_FILTER_DEPTH
        )));
    }
    encode_filter_item(e, filter)
}

fn encode_filter_item(e: &mut BerEncoder, filter: &Filter) -> EncodeResult<()> {
    match filter {
        Filter::And(filters) => encode_filter_set(e, filter_tags::AND, filters),
        Filter::Or(filters) => encode_filter_set(e, filter_tags::OR, filters),
        Filter::Not(filter) => e.encode_tlv_with(filter_tags::NOT, |e| encode_filter_item(e, filter)),
        Filter::EqualityMatch(ava) => {
            e.encode_tlv_with(filter_tags::EQUALITY_MATCH, |e| encode_ava(e, ava))
        }
        Filter::Substrings(substrings) => e.encode_tlv_with(filter_tags::SUBSTRINGS, |e| {
            e.encode_sequence(|e| {
                if let Some(value) = &substrings.final_ {
                    e.encode_octet_string_with_tag(filter_tags::SUBSTRING_FINAL, value)?;
                }
                for value in substrings.any.iter().rev() {
                    e.encode_octet_string_with_tag(filter_tags::SUBSTRING_ANY, value)?;
                }
                if let Some(value) = &substrings.initial {
                    e.encode_octet_string_with_tag(filter_tags::SUBSTRING_INITIAL, value)?;
                }
                Ok(())
            })?;
            e.encode_octet_string(substrings.attribute_type.as_bytes())
        }),
        Filter::GreaterOrEqual(ava) => {
            e.encode_tlv_with(filter_tags::GREATER_OR_EQUAL, |e| encode_ava(e, ava))
        }
        Filter::LessOrEqual(ava) => {
            e.encode_tlv_with(filter_tags::LESS_OR_EQUAL, |e| encode_ava(e, ava))
        }
        Filter::Present(attribute) => e.encode_tlv(filter_tags::PRESENT, attribute.as_bytes()),
        Filter::ApproxMatch(ava) => {
            e.encode_tlv_with(filter_tags::APPROX_MATCH, |e| encode_ava(e, ava))
        }
        Filter::ExtensibleMatch(assertion) => {
            e.encode_tlv_with(filter_tags::EXTENSIBLE_MATCH, |e| {
                // dnAttributes is DEFAULT FALSE
                if assertion.dn_attributes {
                    e.encode_boolean_with_tag(filter_tags::DN_ATTRIBUTES, true)?;
                }
                e.encode_octet_string_with_tag(filter_tags::MATCH_VALUE, &assertion.match_value)?;
                if let Some(attribute_type) = &assertion.attribute_type {
                    e.encode_octet_string_with_tag(
                        filter_tags::MATCHING_TYPE,
                        attribute_type.as_bytes(),
                    )?;
                }
                if let Some(rule) = &assertion.matching_rule {
                    e.encode_octet_string_with_tag(filter_tags::MATCHING_RULE, rule.as_bytes())?;
                }
                Ok(())
            })
        }
    }
}

fn encode_filter_set(e: &mut BerEncoder, tag: u8, filters: &[Filter]) -> EncodeResult<()> {
    e.encode_tlv_with(tag, |e| {
        for filter in filters.iter().rev() {
            encode_filter_item(e, filter)?;
        }
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{control_oids, extended_oids};
    use crate::decoder::LdapDecoder;
    use crate::decoder::tests::{abandon_with_controls, expected_search, search_with_controls};
    use crate::error::CodecError;
    use crate::message::{
        BindRequest, BindResponse, Change, CompareRequest, ControlValue, ExtendedRequest,
        ExtendedResponse, ExtendedValue, IntermediateResponse, MatchingRuleAssertion,
        ModifyDnRequest, ModifyOperation, ModifyRequest, AddRequest, SearchRequest,
        SearchResultEntry, SubstringFilter,
    };
    use ldap_core::ResultCode;

    fn modify_request_bytes() -> Vec<u8> {
        let mut bytes = vec![0x30, 0x20, 0x02, 0x01, 0x05, 0x66, 0x1B, 0x04, 0x07];
        bytes.extend_from_slice(b"cn=test");
        bytes.extend_from_slice(&[
            0x30, 0x10, 0x30, 0x0E, 0x0A, 0x01, 0x02, 0x30, 0x09, 0x04, 0x02, b's', b'n', 0x31,
            0x03, 0x04, 0x01, b'x',
        ]);
        bytes
    }

    fn round_trip(message: &LdapMessage) -> LdapMessage {
        let bytes = LdapEncoder::new().encode(message).unwrap();
        let mut decoder = LdapDecoder::new();
        let mut buf = &bytes[..];
        let decoded = decoder.decode(&mut buf).unwrap().unwrap();
        assert!(buf.is_empty());
        decoded
    }

    #[test]
    fn test_encode_abandon_request() {
        let message = LdapMessage::new(32787, ProtocolOp::AbandonRequest(2));
        let bytes = LdapEncoder::new().encode(&message).unwrap();
        assert_eq!(
            &bytes[..],
            &[0x30, 0x08, 0x02, 0x03, 0x00, 0x80, 0x13, 0x50, 0x01, 0x02]
        );
    }

    #[test]
    fn test_reencode_reference_vectors() {
        let mut del = vec![0x30, 0x1E, 0x02, 0x01, 0x03, 0x4A, 0x19];
        del.extend_from_slice(b"cn=test,dc=example,dc=com");

        for bytes in [
            abandon_with_controls(),
            search_with_controls(),
            del,
            modify_request_bytes(),
        ] {
            let message = LdapDecoder::new().decode(&mut &bytes[..]).unwrap().unwrap();
            let encoded = LdapEncoder::new().encode(&message).unwrap();
            assert_eq!(&encoded[..], &bytes[..]);
        }
    }

    #[test]
    fn test_encode_modify_request() {
        let message = LdapMessage::new(
            5,
            ProtocolOp::ModifyRequest(ModifyRequest {
                object: "cn=test".to_string(),
                changes: vec![Change {
                    operation: ModifyOperation::Replace,
                    modification: PartialAttribute::new("sn").with_value("x"),
                }],
            }),
        );
        let bytes = LdapEncoder::new().encode(&message).unwrap();
        assert_eq!(&bytes[..], &modify_request_bytes()[..]);
    }

    #[test]
    fn test_search_request_round_trip() {
        let message = expected_search();
        assert_eq!(round_trip(&message), message);
    }

    #[test]
    fn test_filters_round_trip() {
        let filters = [
            Filter::Or(vec![
                Filter::Not(Box::new(Filter::Present("mail".to_string()))),
                Filter::GreaterOrEqual(AttributeValueAssertion::new("age", "18")),
                Filter::LessOrEqual(AttributeValueAssertion::new("age", "65")),
                Filter::ApproxMatch(AttributeValueAssertion::new("cn", "jon")),
            ]),
            Filter::And(Vec::new()),
            Filter::And(vec![Filter::Or(Vec::new()), Filter::Present("cn".to_string())]),
            Filter::Substrings(SubstringFilter {
                attribute_type: "cn".to_string(),
                initial: None,
                any: vec![b"b".to_vec(), b"c".to_vec()],
                final_: Some(b"d".to_vec()),
            }),
            Filter::ExtensibleMatch(MatchingRuleAssertion {
                matching_rule: Some("2.5.13.2".to_string()),
                attribute_type: Some("cn".to_string()),
                match_value: b"Fred".to_vec(),
                dn_attributes: true,
            }),
            Filter::Not(Box::new(Filter::And(vec![Filter::ExtensibleMatch(
                MatchingRuleAssertion {
                    matching_rule: None,
                    attribute_type: Some("ou".to_string()),
                    match_value: b"x".to_vec(),
                    dn_attributes: false,
                },
            )]))),
        ];

        for filter in filters {
            let message = LdapMessage::new(
                1,
                ProtocolOp::SearchRequest(SearchRequest {
                    filter,
                    ..SearchRequest::default()
                }),
            );
            assert_eq!(round_trip(&message), message);
        }
    }

    #[test]
    fn test_requests_round_trip() {
        let messages = [
            LdapMessage::new(
                1,
                ProtocolOp::BindRequest(BindRequest {
                    version: 3,
                    name: "cn=admin,dc=example,dc=com".to_string(),
                    authentication: BindAuthentication::Simple(b"secret".to_vec()),
                }),
            ),
            LdapMessage::new(
                2,
                ProtocolOp::BindRequest(BindRequest {
                    version: 3,
                    name: String::new(),
                    authentication: BindAuthentication::Sasl {
                        mechanism: "DIGEST-MD5".to_string(),
                        credentials: Some(b"response".to_vec()),
                    },
                }),
            ),
            LdapMessage::new(3, ProtocolOp::UnbindRequest),
            LdapMessage::new(
                4,
                ProtocolOp::AddRequest(AddRequest {
                    entry: "cn=new,dc=example,dc=com".to_string(),
                    attributes: vec![
                        PartialAttribute::new("objectClass")
                            .with_value("top")
                            .with_value("person"),
                        PartialAttribute::new("cn").with_value("new"),
                    ],
                }),
            ),
            LdapMessage::new(
                5,
                ProtocolOp::ModifyDnRequest(ModifyDnRequest {
                    entry: "cn=old,dc=example,dc=com".to_string(),
                    new_rdn: "cn=new".to_string(),
                    delete_old_rdn: true,
                    new_superior: Some("ou=people,dc=example,dc=com".to_string()),
                }),
            ),
            LdapMessage::new(
                6,
                ProtocolOp::CompareRequest(CompareRequest {
                    entry: "cn=test,dc=example,dc=com".to_string(),
                    ava: AttributeValueAssertion::new("sn", "Test"),
                }),
            ),
            LdapMessage::new(
                7,
                ProtocolOp::ExtendedRequest(ExtendedRequest {
                    request_name: extended_oids::CANCEL.to_string(),
                    request_value: ExtendedValue::Cancel { cancel_id: 3 },
                }),
            ),
            LdapMessage::new(
                8,
                ProtocolOp::ExtendedRequest(ExtendedRequest {
                    request_name: extended_oids::START_TLS.to_string(),
                    request_value: ExtendedValue::Absent,
                }),
            ),
            LdapMessage::new(
                9,
                ProtocolOp::ModifyRequest(ModifyRequest {
                    object: "cn=test".to_string(),
                    changes: vec![
                        Change {
                            operation: ModifyOperation::Delete,
                            modification: PartialAttribute::new("description"),
                        },
                        Change {
                            operation: ModifyOperation::Increment,
                            modification: PartialAttribute::new("uidNumber").with_value("1"),
                        },
                    ],
                }),
            )
            .with_control(
                Control::new(control_oids::SUBENTRIES)
                    .with_value(ControlValue::Subentries { visibility: true }),
            ),
        ];

        for message in messages {
            assert_eq!(round_trip(&message), message);
        }
    }

    #[test]
    fn test_responses_round_trip() {
        let result = LdapResult::new(ResultCode::Referral)
            .with_matched_dn("dc=example,dc=com")
            .with_diagnostic_message("see elsewhere");
        let mut referral = result.clone();
        referral.referrals = vec![
            "ldap://a.example.com/".to_string(),
            "ldap://b.example.com/".to_string(),
        ];

        let messages = [
            LdapMessage::new(
                1,
                ProtocolOp::BindResponse(BindResponse {
                    result: LdapResult::new(ResultCode::SaslBindInProgress),
                    server_sasl_creds: Some(b"challenge".to_vec()),
                }),
            ),
            LdapMessage::new(2, ProtocolOp::SearchResultDone(referral.clone())),
            LdapMessage::new(3, ProtocolOp::ModifyResponse(result.clone())),
            LdapMessage::new(4, ProtocolOp::AddResponse(LdapResult::default())),
            LdapMessage::new(5, ProtocolOp::DelResponse(referral)),
            LdapMessage::new(6, ProtocolOp::ModifyDnResponse(result.clone())),
            LdapMessage::new(7, ProtocolOp::CompareResponse(LdapResult::new(ResultCode::CompareTrue))),
            LdapMessage::new(
                8,
                ProtocolOp::SearchResultEntry(SearchResultEntry {
                    object_name: "cn=test,dc=example,dc=com".to_string(),
                    attributes: vec![
                        PartialAttribute::new("cn").with_value("test"),
                        PartialAttribute::new("jpegPhoto").with_value(vec![0xFF, 0xD8, 0x00]),
                        PartialAttribute::new("member"),
                    ],
                }),
            ),
            LdapMessage::new(
                9,
                ProtocolOp::SearchResultReference(vec![
                    "ldap://c.example.com/dc=example,dc=com".to_string(),
                ]),
            ),
            LdapMessage::new(
                10,
                ProtocolOp::ExtendedResponse(ExtendedResponse {
                    result: LdapResult::default(),
                    response_name: Some(extended_oids::WHO_AM_I.to_string()),
                    response_value: ExtendedValue::AuthzId("dn:cn=test".to_string()),
                }),
            ),
            LdapMessage::new(
                0,
                ProtocolOp::ExtendedResponse(ExtendedResponse {
                    result: LdapResult::new(ResultCode::Unavailable),
                    response_name: Some(extended_oids::NOTICE_OF_DISCONNECTION.to_string()),
                    response_value: ExtendedValue::Absent,
                }),
            ),
            LdapMessage::new(
                11,
                ProtocolOp::IntermediateResponse(IntermediateResponse {
                    response_name: Some("1.3.6.1.4.1.4203.1.9.1.4".to_string()),
                    response_value: ExtendedValue::Raw(vec![0x30, 0x00]),
                }),
            ),
            LdapMessage::new(12, ProtocolOp::IntermediateResponse(IntermediateResponse::default())),
        ];

        for message in messages {
            assert_eq!(round_trip(&message), message);
        }
    }

    #[test]
    fn test_encoding_errors() {
        let encoder = LdapEncoder::new();

        let message = LdapMessage::new(-1, ProtocolOp::UnbindRequest);
        assert!(matches!(
            encoder.encode(&message),
            Err(CodecError::Encoder(EncoderError::InvalidValue(_)))
        ));

        let message = LdapMessage::new(1, ProtocolOp::UnbindRequest).with_control(
            Control::new("1.2.3.4").with_value(ControlValue::Subentries { visibility: false }),
        );
        assert!(encoder.encode(&message).is_err());

        let mut filter = Filter::Present("cn".to_string());
        for _ in 0..MAX_FILTER_DEPTH {
            filter = Filter::Not(Box::new(filter));
        }
        let message = LdapMessage::new(
            1,
            ProtocolOp::SearchRequest(SearchRequest {
                filter,
                ..SearchRequest::default()
            }),
        );
        assert!(encoder.encode(&message).is_err());
    }
}
