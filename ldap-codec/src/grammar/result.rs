//! LDAPResult and the responses made only of it
//!
//! ```text
//! LDAPResult ::= SEQUENCE {
//!      resultCode         ENUMERATED,
//!      matchedDN          LDAPDN,
//!      diagnosticMessage  LDAPString,
//!      referral           [3] Referral OPTIONAL }
//! ```
//!
//! The same element sequence is registered three times: for the plain
//! responses, for BindResponse and for ExtendedResponse, since each of them
//! continues differently once the result is decoded.

use ldap_asn1::Transition;
use ldap_asn1::ber::decoder::decode_enumerated;
use ldap_asn1::ber::types::tags;
use ldap_core::ResultCode;

use super::envelope::add_controls_from;
use super::{LdapGrammarBuilder, LdapState as S, current_string, set_protocol_op};
use crate::constants::{context_tags, op_tags};
use crate::container::LdapMessageContainer;
use crate::error::{DecodeResult, DecoderError};
use crate::message::{LdapResult, ProtocolOp};

/// States of one LDAPResult element sequence
pub(crate) struct LdapResultStates {
    pub start: S,
    pub result_code: S,
    pub matched_dn: S,
    pub diagnostic_message: S,
    pub referrals: S,
    pub referral: S,
}

pub(crate) const RESPONSE_RESULT: LdapResultStates = LdapResultStates {
    start: S::Response,
    result_code: S::ResponseResultCode,
    matched_dn: S::ResponseMatchedDn,
    diagnostic_message: S::ResponseDiagnosticMessage,
    referrals: S::ResponseReferrals,
    referral: S::ResponseReferral,
};

pub(crate) const BIND_RESULT: LdapResultStates = LdapResultStates {
    start: S::BindResponse,
    result_code: S::BindResultCode,
    matched_dn: S::BindMatchedDn,
    diagnostic_message: S::BindDiagnosticMessage,
    referrals: S::BindReferrals,
    referral: S::BindReferral,
};

pub(crate) const EXTENDED_RESULT: LdapResultStates = LdapResultStates {
    start: S::ExtendedResponse,
    result_code: S::ExtendedResultCode,
    matched_dn: S::ExtendedMatchedDn,
    diagnostic_message: S::ExtendedDiagnosticMessage,
    referrals: S::ExtendedReferrals,
    referral: S::ExtendedReferral,
};

pub(crate) fn add_transitions(builder: &mut LdapGrammarBuilder) {
    let responses: [(&'static str, u8, fn(&mut LdapMessageContainer) -> DecodeResult<()>); 6] = [
        ("SearchResultDone", op_tags::SEARCH_RESULT_DONE, init_search_result_done),
        ("ModifyResponse", op_tags::MODIFY_RESPONSE, init_modify_response),
        ("AddResponse", op_tags::ADD_RESPONSE, init_add_response),
        ("DelResponse", op_tags::DEL_RESPONSE, init_del_response),
        ("ModifyDNResponse", op_tags::MODIFY_DN_RESPONSE, init_modify_dn_response),
        ("CompareResponse", op_tags::COMPARE_RESPONSE, init_compare_response),
    ];
    for (name, tag, action) in responses {
        builder.add(Transition::new(name, S::MessageId, tag, S::Response).with_action(action));
    }

    add_ldap_result(builder, &RESPONSE_RESULT);
    add_controls_from(
        builder,
        &[S::ResponseDiagnosticMessage, S::ResponseReferral],
    );
}

/// Register the LDAPResult elements between `states.start` and
/// `states.diagnostic_message`/`states.referral`, both optional ends
///
/// The response TLV may end after the diagnostic message or the referrals;
/// operations with trailing elements declare them on top.
pub(crate) fn add_ldap_result(builder: &mut LdapGrammarBuilder, states: &LdapResultStates) {
    builder
        .add(
            Transition::new("resultCode", states.start, tags::ENUMERATED, states.result_code)
                .with_action(store_result_code),
        )
        .add(
            Transition::new(
                "matchedDN",
                states.result_code,
                tags::OCTET_STRING,
                states.matched_dn,
            )
            .with_action(store_matched_dn),
        )
        .add(
            Transition::new(
                "diagnosticMessage",
                states.matched_dn,
                tags::OCTET_STRING,
                states.diagnostic_message,
            )
            .optional_end()
            .with_action(store_diagnostic_message),
        )
        .add(Transition::new(
            "referral",
            states.diagnostic_message,
            context_tags::REFERRAL,
            states.referrals,
        ))
        .add_from_each(
            &[states.referrals, states.referral],
            Transition::new("referral URI", states.referrals, tags::OCTET_STRING, states.referral)
                .optional_end()
                .with_action(store_referral),
        );

    builder
        .add_content(
            &[states.start],
            &[
                states.result_code,
                states.matched_dn,
                states.diagnostic_message,
                states.referrals,
            ],
        )
        .add_end(&[states.start], &[states.diagnostic_message, states.referrals])
        .add_content(&[states.referrals], &[states.referral])
        .add_end(&[states.referrals], &[states.referral]);
}

fn init_response(container: &mut LdapMessageContainer, op: fn(LdapResult) -> ProtocolOp) -> DecodeResult<()> {
    set_protocol_op(container, op(LdapResult::default()))
}

fn init_search_result_done(container: &mut LdapMessageContainer) -> DecodeResult<()> {
    init_response(container, ProtocolOp::SearchResultDone)
}

fn init_modify_response(container: &mut LdapMessageContainer) -> DecodeResult<()> {
    init_response(container, ProtocolOp::ModifyResponse)
}

fn init_add_response(container: &mut LdapMessageContainer) -> DecodeResult<()> {
    init_response(container, ProtocolOp::AddResponse)
}

fn init_del_response(container: &mut LdapMessageContainer) -> DecodeResult<()> {
    init_response(container, ProtocolOp::DelResponse)
}

fn init_modify_dn_response(container: &mut LdapMessageContainer) -> DecodeResult<()> {
    init_response(container, ProtocolOp::ModifyDnResponse)
}

fn init_compare_response(container: &mut LdapMessageContainer) -> DecodeResult<()> {
    init_response(container, ProtocolOp::CompareResponse)
}

fn ldap_result_mut(container: &mut LdapMessageContainer) -> DecodeResult<&mut LdapResult> {
    container
        .value_mut()
        .protocol_op
        .as_mut()
        .and_then(ProtocolOp::ldap_result_mut)
        .ok_or_else(|| DecoderError::invalid_value("No LDAPResult under construction"))
}

fn store_result_code(container: &mut LdapMessageContainer) -> DecodeResult<()> {
    let code = decode_enumerated(container.current_value()?, 0, i32::MAX)?;
    let result_code = ResultCode::from_i32(code);
    if let ResultCode::Unknown(code) = result_code {
        log::debug!("Unknown result code {}", code);
    }
    ldap_result_mut(container)?.result_code = result_code;
    Ok(())
}

fn store_matched_dn(container: &mut LdapMessageContainer) -> DecodeResult<()> {
    let matched_dn = current_string(container)?;
    ldap_result_mut(container)?.matched_dn = matched_dn;
    Ok(())
}

fn store_diagnostic_message(container: &mut LdapMessageContainer) -> DecodeResult<()> {
    let message = current_string(container)?;
    ldap_result_mut(container)?.diagnostic_message = message;
    Ok(())
}

fn store_referral(container: &mut LdapMessageContainer) -> DecodeResult<()> {
    let uri = current_string(container)?;
    if uri.is_empty() {
        return Err(DecoderError::invalid_value("Empty referral URI"));
    }
    ldap_result_mut(container)?.referrals.push(uri);
    Ok(())
}
