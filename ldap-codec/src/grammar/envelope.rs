//! LDAPMessage envelope: message id, controls and the operations without
//! content (UnbindRequest, AbandonRequest)

use std::sync::Arc;

use ldap_asn1::Transition;
use ldap_asn1::ber::decoder::{decode_boolean, decode_int_in_range};
use ldap_asn1::ber::types::tags;

use super::{LdapGrammarBuilder, LdapState as S, current_string, set_protocol_op};
use crate::constants::{MAX_MESSAGE_ID, context_tags, op_tags};
use crate::container::LdapMessageContainer;
use crate::error::{DecodeResult, DecoderError};
use crate::message::{Control, ProtocolOp};
use crate::validation;

pub(crate) fn add_transitions(builder: &mut LdapGrammarBuilder) {
    builder
        .add(Transition::new("LDAPMessage", S::Start, tags::SEQUENCE, S::LdapMessage))
        .add(
            Transition::new("messageID", S::LdapMessage, tags::INTEGER, S::MessageId)
                .with_action(store_message_id),
        )
        .add(
            Transition::new(
                "UnbindRequest",
                S::MessageId,
                op_tags::UNBIND_REQUEST,
                S::UnbindRequest,
            )
            .optional_end()
            .with_action(init_unbind_request),
        )
        .add(
            Transition::new(
                "AbandonRequest",
                S::MessageId,
                op_tags::ABANDON_REQUEST,
                S::AbandonRequest,
            )
            .optional_end()
            .with_action(init_abandon_request),
        );

    add_controls_from(builder, &[S::UnbindRequest, S::AbandonRequest]);

    // Controls ::= SEQUENCE OF Control
    let control = Transition::new("Control", S::Controls, tags::SEQUENCE, S::Control)
        .with_action(new_control);
    builder
        .add_from_each(
            &[S::Controls, S::ControlType, S::ControlCriticality, S::ControlValue],
            control,
        )
        .add(
            Transition::new("controlType", S::Control, tags::OCTET_STRING, S::ControlType)
                .optional_end()
                .with_action(store_control_type),
        )
        .add(
            Transition::new(
                "criticality",
                S::ControlType,
                tags::BOOLEAN,
                S::ControlCriticality,
            )
            .optional_end()
            .with_action(store_control_criticality),
        )
        .add_from_each(
            &[S::ControlType, S::ControlCriticality],
            Transition::new("controlValue", S::ControlType, tags::OCTET_STRING, S::ControlValue)
                .optional_end()
                .with_action(store_control_value),
        );

    let control_content = [S::ControlType, S::ControlCriticality, S::ControlValue];
    builder
        .add_content(&[S::LdapMessage], &[S::MessageId, S::Controls])
        .add_content(&[S::Controls], &[S::Control])
        .add_end(&[S::Controls], &[S::Control])
        .add_content(&[S::Control], &control_content)
        .add_end(&[S::Control], &control_content);
}

/// Let the message carry controls after any of `states`
pub(crate) fn add_controls_from(builder: &mut LdapGrammarBuilder, states: &[S]) {
    builder.add_from_each(
        states,
        Transition::new("controls", S::MessageId, context_tags::CONTROLS, S::Controls).optional_end(),
    );
}

fn store_message_id(container: &mut LdapMessageContainer) -> DecodeResult<()> {
    let message_id = decode_int_in_range(container.current_value()?, 0, MAX_MESSAGE_ID)?;
    container.value_mut().message_id = message_id;
    Ok(())
}

fn init_unbind_request(container: &mut LdapMessageContainer) -> DecodeResult<()> {
    if !container.current_value()?.is_empty() {
        return Err(DecoderError::invalid_value("UnbindRequest must be empty"));
    }
    set_protocol_op(container, ProtocolOp::UnbindRequest)
}

fn init_abandon_request(container: &mut LdapMessageContainer) -> DecodeResult<()> {
    let abandoned_id = decode_int_in_range(container.current_value()?, 0, MAX_MESSAGE_ID)?;
    set_protocol_op(container, ProtocolOp::AbandonRequest(abandoned_id))
}

fn new_control(container: &mut LdapMessageContainer) -> DecodeResult<()> {
    container.value_mut().controls.push(Control::default());
    Ok(())
}

fn last_control_mut(container: &mut LdapMessageContainer) -> DecodeResult<&mut Control> {
    container
        .value_mut()
        .controls
        .last_mut()
        .ok_or_else(|| DecoderError::invalid_value("No control under construction"))
}

fn store_control_type(container: &mut LdapMessageContainer) -> DecodeResult<()> {
    let control_type = current_string(container)?;
    if !validation::is_valid_oid(&control_type) {
        return Err(DecoderError::invalid_value(format!(
            "Invalid control type '{}'",
            control_type
        )));
    }
    last_control_mut(container)?.control_type = control_type;
    Ok(())
}

fn store_control_criticality(container: &mut LdapMessageContainer) -> DecodeResult<()> {
    let policy = container.config().boolean_policy;
    let criticality = decode_boolean(container.current_value()?, policy)?;
    let service = Arc::clone(container.value().service());
    let control = last_control_mut(container)?;
    control.criticality = criticality;
    if criticality && service.control_factory(&control.control_type).is_none() {
        log::warn!("Unknown critical control {}", control.control_type);
    }
    Ok(())
}

fn store_control_value(container: &mut LdapMessageContainer) -> DecodeResult<()> {
    let service = Arc::clone(container.value().service());
    let control_type = last_control_mut(container)?.control_type.clone();
    let value = service.decode_control_value(&control_type, container.current_value()?)?;
    log::trace!("Decoded value of control {}: {:?}", control_type, value);
    last_control_mut(container)?.value = value;
    Ok(())
}
