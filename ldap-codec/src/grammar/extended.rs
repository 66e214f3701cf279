//! ExtendedRequest, ExtendedResponse and IntermediateResponse
//!
//! ```text
//! ExtendedRequest ::= [APPLICATION 23] SEQUENCE {
//!      requestName      [0] LDAPOID,
//!      requestValue     [1] OCTET STRING OPTIONAL }
//!
//! ExtendedResponse ::= [APPLICATION 24] SEQUENCE {
//!      COMPONENTS OF LDAPResult,
//!      responseName     [10] LDAPOID OPTIONAL,
//!      responseValue    [11] OCTET STRING OPTIONAL }
//!
//! IntermediateResponse ::= [APPLICATION 25] SEQUENCE {
//!      responseName     [0] LDAPOID OPTIONAL,
//!      responseValue    [1] OCTET STRING OPTIONAL }
//! ```
//!
//! Values are decoded by the factory registered for the operation name;
//! operations without factory keep their raw value.

use std::sync::Arc;

use ldap_asn1::Transition;
use ldap_core::ResultCode;

use super::envelope::add_controls_from;
use super::result::{EXTENDED_RESULT, add_ldap_result};
use super::{LdapGrammarBuilder, LdapState as S, current_string, op_mut, set_protocol_op};
use crate::constants::{context_tags, op_tags};
use crate::container::LdapMessageContainer;
use crate::error::{DecodeResult, DecoderError};
use crate::message::{
    ExtendedRequest, ExtendedResponse, ExtendedValue, IntermediateResponse, ProtocolOp,
};
use crate::validation;

op_mut!(extended_request_mut, ExtendedRequest, ExtendedRequest);
op_mut!(extended_response_mut, ExtendedResponse, ExtendedResponse);
op_mut!(intermediate_response_mut, IntermediateResponse, IntermediateResponse);

pub(crate) fn add_transitions(builder: &mut LdapGrammarBuilder) {
    add_extended_request(builder);
    add_extended_response(builder);
    add_intermediate_response(builder);
}

fn add_extended_request(builder: &mut LdapGrammarBuilder) {
    builder
        .add(
            Transition::new(
                "ExtendedRequest",
                S::MessageId,
                op_tags::EXTENDED_REQUEST,
                S::ExtendedRequest,
            )
            .with_action(init_extended_request),
        )
        .add(
            Transition::new(
                "requestName",
                S::ExtendedRequest,
                context_tags::EXTENDED_REQUEST_NAME,
                S::ExtendedRequestName,
            )
            .optional_end()
            .with_action(store_request_name),
        )
        .add(
            Transition::new(
                "requestValue",
                S::ExtendedRequestName,
                context_tags::EXTENDED_REQUEST_VALUE,
                S::ExtendedRequestValue,
            )
            .optional_end()
            .with_action(store_request_value),
        );

    add_controls_from(builder, &[S::ExtendedRequestName, S::ExtendedRequestValue]);
    let request_content = [S::ExtendedRequestName, S::ExtendedRequestValue];
    builder
        .add_content(&[S::ExtendedRequest], &request_content)
        .add_end(&[S::ExtendedRequest], &request_content);
}

fn add_extended_response(builder: &mut LdapGrammarBuilder) {
    builder.add(
        Transition::new(
            "ExtendedResponse",
            S::MessageId,
            op_tags::EXTENDED_RESPONSE,
            S::ExtendedResponse,
        )
        .with_action(init_extended_response),
    );
    add_ldap_result(builder, &EXTENDED_RESULT);
    builder
        .add_from_each(
            &[S::ExtendedDiagnosticMessage, S::ExtendedReferral],
            Transition::new(
                "responseName",
                S::ExtendedDiagnosticMessage,
                context_tags::EXTENDED_RESPONSE_NAME,
                S::ExtendedResponseName,
            )
            .optional_end()
            .with_action(store_response_name),
        )
        .add_from_each(
            &[
                S::ExtendedDiagnosticMessage,
                S::ExtendedReferral,
                S::ExtendedResponseName,
            ],
            Transition::new(
                "responseValue",
                S::ExtendedDiagnosticMessage,
                context_tags::EXTENDED_RESPONSE_VALUE,
                S::ExtendedResponseValue,
            )
            .optional_end()
            .with_action(store_response_value),
        );

    add_controls_from(
        builder,
        &[
            S::ExtendedDiagnosticMessage,
            S::ExtendedReferral,
            S::ExtendedResponseName,
            S::ExtendedResponseValue,
        ],
    );
    let response_trailer = [S::ExtendedResponseName, S::ExtendedResponseValue];
    builder
        .add_content(&[S::ExtendedResponse], &response_trailer)
        .add_end(&[S::ExtendedResponse], &response_trailer);
}

fn add_intermediate_response(builder: &mut LdapGrammarBuilder) {
    builder
        .add(
            Transition::new(
                "IntermediateResponse",
                S::MessageId,
                op_tags::INTERMEDIATE_RESPONSE,
                S::IntermediateResponse,
            )
            .optional_end()
            .with_action(init_intermediate_response),
        )
        .add(
            Transition::new(
                "responseName",
                S::IntermediateResponse,
                context_tags::INTERMEDIATE_RESPONSE_NAME,
                S::IntermediateResponseName,
            )
            .optional_end()
            .with_action(store_intermediate_name),
        )
        .add_from_each(
            &[S::IntermediateResponse, S::IntermediateResponseName],
            Transition::new(
                "responseValue",
                S::IntermediateResponse,
                context_tags::INTERMEDIATE_RESPONSE_VALUE,
                S::IntermediateResponseValue,
            )
            .optional_end()
            .with_action(store_intermediate_value),
        );

    add_controls_from(
        builder,
        &[
            S::IntermediateResponse,
            S::IntermediateResponseName,
            S::IntermediateResponseValue,
        ],
    );
    let intermediate_content = [S::IntermediateResponseName, S::IntermediateResponseValue];
    builder
        .add_content(&[S::IntermediateResponse], &intermediate_content)
        .add_end(&[S::IntermediateResponse], &intermediate_content);
}

fn init_extended_request(container: &mut LdapMessageContainer) -> DecodeResult<()> {
    set_protocol_op(
        container,
        ProtocolOp::ExtendedRequest(ExtendedRequest::default()),
    )
}

fn store_request_name(container: &mut LdapMessageContainer) -> DecodeResult<()> {
    let name = current_string(container)?;
    if !validation::is_valid_oid(&name) {
        return Err(DecoderError::response_carrying(
            format!("Invalid extended operation name '{}'", name),
            ResultCode::ProtocolError,
        ));
    }
    extended_request_mut(container)?.request_name = name;
    Ok(())
}

fn store_request_value(container: &mut LdapMessageContainer) -> DecodeResult<()> {
    let service = Arc::clone(container.value().service());
    let name = extended_request_mut(container)?.request_name.clone();
    let value = service.decode_extended_request_value(&name, container.current_value()?)?;
    log::trace!("Decoded value of extended request {}: {:?}", name, value);
    extended_request_mut(container)?.request_value = value;
    Ok(())
}

fn init_extended_response(container: &mut LdapMessageContainer) -> DecodeResult<()> {
    set_protocol_op(
        container,
        ProtocolOp::ExtendedResponse(ExtendedResponse::default()),
    )
}

fn checked_oid(container: &LdapMessageContainer) -> DecodeResult<String> {
    let name = current_string(container)?;
    if !validation::is_valid_oid(&name) {
        return Err(DecoderError::invalid_value(format!(
            "Invalid response name '{}'",
            name
        )));
    }
    Ok(name)
}

fn store_response_name(container: &mut LdapMessageContainer) -> DecodeResult<()> {
    let name = checked_oid(container)?;
    extended_response_mut(container)?.response_name = Some(name);
    Ok(())
}

/// Decode a response value with the factory of `name`, raw without name
fn decode_response_value(
    container: &LdapMessageContainer,
    name: Option<&str>,
) -> DecodeResult<ExtendedValue> {
    let value = container.current_value()?;
    match name {
        Some(name) => container
            .value()
            .service()
            .decode_extended_response_value(name, value),
        None => Ok(ExtendedValue::Raw(value.to_vec())),
    }
}

fn store_response_value(container: &mut LdapMessageContainer) -> DecodeResult<()> {
    let name = extended_response_mut(container)?.response_name.clone();
    let value = decode_response_value(container, name.as_deref())?;
    extended_response_mut(container)?.response_value = value;
    Ok(())
}

fn init_intermediate_response(container: &mut LdapMessageContainer) -> DecodeResult<()> {
    set_protocol_op(
        container,
        ProtocolOp::IntermediateResponse(IntermediateResponse::default()),
    )
}

fn store_intermediate_name(container: &mut LdapMessageContainer) -> DecodeResult<()> {
    let name = checked_oid(container)?;
    intermediate_response_mut(container)?.response_name = Some(name);
    Ok(())
}

fn store_intermediate_value(container: &mut LdapMessageContainer) -> DecodeResult<()> {
    let name = intermediate_response_mut(container)?.response_name.clone();
    let value = decode_response_value(container, name.as_deref())?;
    intermediate_response_mut(container)?.response_value = value;
    Ok(())
}
