//! Update operations: ModifyRequest, AddRequest, DelRequest,
//! ModifyDNRequest and CompareRequest

use ldap_asn1::Transition;
use ldap_asn1::ber::decoder::{decode_boolean, decode_enumerated};
use ldap_asn1::ber::types::tags;
use ldap_core::ResultCode;

use super::envelope::add_controls_from;
use super::{
    LdapGrammarBuilder, LdapState as S, check_attribute_description, check_dn, current_bytes,
    current_string, op_mut, set_protocol_op,
};
use crate::constants::{context_tags, op_tags};
use crate::container::LdapMessageContainer;
use crate::error::{DecodeResult, DecoderError};
use crate::message::{
    AddRequest, Change, CompareRequest, ModifyDnRequest, ModifyOperation, ModifyRequest,
    PartialAttribute, ProtocolOp,
};
use crate::validation;

op_mut!(modify_request_mut, ModifyRequest, ModifyRequest);
op_mut!(add_request_mut, AddRequest, AddRequest);
op_mut!(modify_dn_request_mut, ModifyDnRequest, ModifyDnRequest);
op_mut!(compare_request_mut, CompareRequest, CompareRequest);

pub(crate) fn add_transitions(builder: &mut LdapGrammarBuilder) {
    add_modify_request(builder);
    add_add_request(builder);
    add_del_request(builder);
    add_modify_dn_request(builder);
    add_compare_request(builder);
}

/// ```text
/// ModifyRequest ::= [APPLICATION 6] SEQUENCE {
///      object          LDAPDN,
///      changes         SEQUENCE OF change SEQUENCE {
///           operation       ENUMERATED { add (0), delete (1), replace (2), ... },
///           modification    PartialAttribute } }
/// ```
fn add_modify_request(builder: &mut LdapGrammarBuilder) {
    builder
        .add(
            Transition::new(
                "ModifyRequest",
                S::MessageId,
                op_tags::MODIFY_REQUEST,
                S::ModifyRequest,
            )
            .with_action(init_modify_request),
        )
        .add(
            Transition::new("object", S::ModifyRequest, tags::OCTET_STRING, S::ModifyObject)
                .with_action(store_object),
        )
        .add(
            Transition::new("changes", S::ModifyObject, tags::SEQUENCE, S::ModifyChanges)
                .optional_end(),
        )
        .add_from_each(
            &[S::ModifyChanges, S::ModifyAttributeVals, S::ModifyAttributeValue],
            Transition::new("change", S::ModifyChanges, tags::SEQUENCE, S::ModifyChange)
                .with_action(new_change),
        )
        .add(
            Transition::new("operation", S::ModifyChange, tags::ENUMERATED, S::ModifyOperation)
                .with_action(store_operation),
        )
        .add(Transition::new(
            "modification",
            S::ModifyOperation,
            tags::SEQUENCE,
            S::ModifyAttribute,
        ))
        .add(
            Transition::new(
                "type",
                S::ModifyAttribute,
                tags::OCTET_STRING,
                S::ModifyAttributeType,
            )
            .with_action(store_modification_type),
        )
        .add(
            Transition::new("vals", S::ModifyAttributeType, tags::SET, S::ModifyAttributeVals)
                .optional_end(),
        )
        .add_from_each(
            &[S::ModifyAttributeVals, S::ModifyAttributeValue],
            Transition::new(
                "value",
                S::ModifyAttributeVals,
                tags::OCTET_STRING,
                S::ModifyAttributeValue,
            )
            .optional_end()
            .with_action(store_modification_value),
        );

    add_controls_from(
        builder,
        &[S::ModifyChanges, S::ModifyAttributeVals, S::ModifyAttributeValue],
    );
    builder
        .add_content(&[S::ModifyRequest], &[S::ModifyObject, S::ModifyChanges])
        .add_end(&[S::ModifyRequest], &[S::ModifyChanges])
        .add_content(&[S::ModifyChanges], &[S::ModifyChange])
        .add_end(&[S::ModifyChanges], &[S::ModifyChange])
        .add_content(&[S::ModifyChange], &[S::ModifyOperation, S::ModifyAttribute])
        .add_end(&[S::ModifyChange], &[S::ModifyAttribute])
        .add_content(&[S::ModifyAttribute], &[S::ModifyAttributeType, S::ModifyAttributeVals])
        .add_end(&[S::ModifyAttribute], &[S::ModifyAttributeVals])
        .add_content(&[S::ModifyAttributeVals], &[S::ModifyAttributeValue])
        .add_end(&[S::ModifyAttributeVals], &[S::ModifyAttributeValue]);
}

/// ```text
/// AddRequest ::= [APPLICATION 8] SEQUENCE {
///      entry           LDAPDN,
///      attributes      AttributeList }
///
/// Attribute ::= PartialAttribute(WITH COMPONENTS {
///      ...,
///      vals (SIZE(1..MAX))})
/// ```
fn add_add_request(builder: &mut LdapGrammarBuilder) {
    builder
        .add(
            Transition::new("AddRequest", S::MessageId, op_tags::ADD_REQUEST, S::AddRequest)
                .with_action(init_add_request),
        )
        .add(
            Transition::new("entry", S::AddRequest, tags::OCTET_STRING, S::AddEntry)
                .with_action(store_add_entry),
        )
        .add(
            Transition::new("attributes", S::AddEntry, tags::SEQUENCE, S::AddAttributes)
                .optional_end(),
        )
        .add_from_each(
            &[S::AddAttributes, S::AddAttributeValue],
            Transition::new("attribute", S::AddAttributes, tags::SEQUENCE, S::AddAttribute),
        )
        .add(
            Transition::new("type", S::AddAttribute, tags::OCTET_STRING, S::AddAttributeType)
                .with_action(store_add_attribute_type),
        )
        .add(Transition::new(
            "vals",
            S::AddAttributeType,
            tags::SET,
            S::AddAttributeVals,
        ))
        .add_from_each(
            &[S::AddAttributeVals, S::AddAttributeValue],
            Transition::new(
                "value",
                S::AddAttributeVals,
                tags::OCTET_STRING,
                S::AddAttributeValue,
            )
            .optional_end()
            .with_action(store_add_attribute_value),
        );

    add_controls_from(builder, &[S::AddAttributes, S::AddAttributeValue]);
    builder
        .add_content(&[S::AddRequest], &[S::AddEntry, S::AddAttributes])
        .add_end(&[S::AddRequest], &[S::AddAttributes])
        .add_content(&[S::AddAttributes], &[S::AddAttribute])
        .add_end(&[S::AddAttributes], &[S::AddAttribute])
        .add_content(&[S::AddAttribute], &[S::AddAttributeType, S::AddAttributeVals])
        .add_end(&[S::AddAttribute], &[S::AddAttributeVals])
        .add_content(&[S::AddAttributeVals], &[S::AddAttributeValue])
        .add_end(&[S::AddAttributeVals], &[S::AddAttributeValue]);
}

/// `DelRequest ::= [APPLICATION 10] LDAPDN`
fn add_del_request(builder: &mut LdapGrammarBuilder) {
    builder.add(
        Transition::new("DelRequest", S::MessageId, op_tags::DEL_REQUEST, S::DelRequest)
            .optional_end()
            .with_action(init_del_request),
    );

    add_controls_from(builder, &[S::DelRequest]);
}

/// ```text
/// ModifyDNRequest ::= [APPLICATION 12] SEQUENCE {
///      entry           LDAPDN,
///      newrdn          RelativeLDAPDN,
///      deleteoldrdn    BOOLEAN,
///      newSuperior     [0] LDAPDN OPTIONAL }
/// ```
fn add_modify_dn_request(builder: &mut LdapGrammarBuilder) {
    builder
        .add(
            Transition::new(
                "ModifyDNRequest",
                S::MessageId,
                op_tags::MODIFY_DN_REQUEST,
                S::ModifyDnRequest,
            )
            .with_action(init_modify_dn_request),
        )
        .add(
            Transition::new("entry", S::ModifyDnRequest, tags::OCTET_STRING, S::ModifyDnEntry)
                .with_action(store_modify_dn_entry),
        )
        .add(
            Transition::new("newrdn", S::ModifyDnEntry, tags::OCTET_STRING, S::ModifyDnNewRdn)
                .with_action(store_new_rdn),
        )
        .add(
            Transition::new(
                "deleteoldrdn",
                S::ModifyDnNewRdn,
                tags::BOOLEAN,
                S::ModifyDnDeleteOldRdn,
            )
            .optional_end()
            .with_action(store_delete_old_rdn),
        )
        .add(
            Transition::new(
                "newSuperior",
                S::ModifyDnDeleteOldRdn,
                context_tags::NEW_SUPERIOR,
                S::ModifyDnNewSuperior,
            )
            .optional_end()
            .with_action(store_new_superior),
        );

    add_controls_from(builder, &[S::ModifyDnDeleteOldRdn, S::ModifyDnNewSuperior]);
    builder
        .add_content(
            &[S::ModifyDnRequest],
            &[
                S::ModifyDnEntry,
                S::ModifyDnNewRdn,
                S::ModifyDnDeleteOldRdn,
                S::ModifyDnNewSuperior,
            ],
        )
        .add_end(
            &[S::ModifyDnRequest],
            &[S::ModifyDnDeleteOldRdn, S::ModifyDnNewSuperior],
        );
}

/// ```text
/// CompareRequest ::= [APPLICATION 14] SEQUENCE {
///      entry           LDAPDN,
///      ava             AttributeValueAssertion }
/// ```
fn add_compare_request(builder: &mut LdapGrammarBuilder) {
    builder
        .add(
            Transition::new(
                "CompareRequest",
                S::MessageId,
                op_tags::COMPARE_REQUEST,
                S::CompareRequest,
            )
            .with_action(init_compare_request),
        )
        .add(
            Transition::new("entry", S::CompareRequest, tags::OCTET_STRING, S::CompareEntry)
                .with_action(store_compare_entry),
        )
        .add(Transition::new("ava", S::CompareEntry, tags::SEQUENCE, S::CompareAva))
        .add(
            Transition::new(
                "attributeDesc",
                S::CompareAva,
                tags::OCTET_STRING,
                S::CompareAttributeDesc,
            )
            .with_action(store_compare_attribute_desc),
        )
        .add(
            Transition::new(
                "assertionValue",
                S::CompareAttributeDesc,
                tags::OCTET_STRING,
                S::CompareAssertionValue,
            )
            .optional_end()
            .with_action(store_compare_assertion_value),
        );

    add_controls_from(builder, &[S::CompareAssertionValue]);
    builder
        .add_content(&[S::CompareRequest], &[S::CompareEntry, S::CompareAva])
        .add_end(&[S::CompareRequest], &[S::CompareAva])
        .add_content(&[S::CompareAva], &[S::CompareAttributeDesc, S::CompareAssertionValue])
        .add_end(&[S::CompareAva], &[S::CompareAssertionValue]);
}

fn init_modify_request(container: &mut LdapMessageContainer) -> DecodeResult<()> {
    set_protocol_op(container, ProtocolOp::ModifyRequest(ModifyRequest::default()))
}

fn store_object(container: &mut LdapMessageContainer) -> DecodeResult<()> {
    let object = current_string(container)?;
    modify_request_mut(container)?.object = object.clone();
    check_dn(&object)
}

fn new_change(container: &mut LdapMessageContainer) -> DecodeResult<()> {
    modify_request_mut(container)?.changes.push(Change::default());
    Ok(())
}

fn last_change_mut(container: &mut LdapMessageContainer) -> DecodeResult<&mut Change> {
    modify_request_mut(container)?
        .changes
        .last_mut()
        .ok_or_else(|| DecoderError::invalid_value("No change under construction"))
}

fn store_operation(container: &mut LdapMessageContainer) -> DecodeResult<()> {
    let value = decode_enumerated(container.current_value()?, 0, 3)?;
    let operation = ModifyOperation::from_i32(value)
        .ok_or_else(|| DecoderError::invalid_value(format!("Invalid modify operation {}", value)))?;
    last_change_mut(container)?.operation = operation;
    Ok(())
}

fn store_modification_type(container: &mut LdapMessageContainer) -> DecodeResult<()> {
    let attribute_type = current_string(container)?;
    last_change_mut(container)?.modification.attribute_type = attribute_type.clone();
    check_attribute_description(&attribute_type)
}

fn store_modification_value(container: &mut LdapMessageContainer) -> DecodeResult<()> {
    let value = current_bytes(container)?;
    last_change_mut(container)?.modification.values.push(value);
    Ok(())
}

fn init_add_request(container: &mut LdapMessageContainer) -> DecodeResult<()> {
    set_protocol_op(container, ProtocolOp::AddRequest(AddRequest::default()))
}

fn store_add_entry(container: &mut LdapMessageContainer) -> DecodeResult<()> {
    let entry = current_string(container)?;
    add_request_mut(container)?.entry = entry.clone();
    check_dn(&entry)
}

fn last_add_attribute_mut(
    container: &mut LdapMessageContainer,
) -> DecodeResult<&mut PartialAttribute> {
    add_request_mut(container)?
        .attributes
        .last_mut()
        .ok_or_else(|| DecoderError::invalid_value("No attribute under construction"))
}

fn store_add_attribute_type(container: &mut LdapMessageContainer) -> DecodeResult<()> {
    let attribute_type = current_string(container)?;
    add_request_mut(container)?
        .attributes
        .push(PartialAttribute::new(attribute_type.clone()));
    check_attribute_description(&attribute_type)
}

fn store_add_attribute_value(container: &mut LdapMessageContainer) -> DecodeResult<()> {
    let value = current_bytes(container)?;
    last_add_attribute_mut(container)?.values.push(value);
    Ok(())
}

/// The DN is stored before it is checked so the error response can be built
fn init_del_request(container: &mut LdapMessageContainer) -> DecodeResult<()> {
    let entry = current_string(container)?;
    set_protocol_op(container, ProtocolOp::DelRequest(entry.clone()))?;
    check_dn(&entry)
}

fn init_modify_dn_request(container: &mut LdapMessageContainer) -> DecodeResult<()> {
    set_protocol_op(
        container,
        ProtocolOp::ModifyDnRequest(ModifyDnRequest::default()),
    )
}

fn store_modify_dn_entry(container: &mut LdapMessageContainer) -> DecodeResult<()> {
    let entry = current_string(container)?;
    modify_dn_request_mut(container)?.entry = entry.clone();
    check_dn(&entry)
}

fn store_new_rdn(container: &mut LdapMessageContainer) -> DecodeResult<()> {
    let new_rdn = current_string(container)?;
    if !validation::is_valid_rdn(&new_rdn) {
        return Err(DecoderError::response_carrying(
            format!("Invalid RDN '{}'", new_rdn),
            ResultCode::InvalidDnSyntax,
        ));
    }
    modify_dn_request_mut(container)?.new_rdn = new_rdn;
    Ok(())
}

fn store_delete_old_rdn(container: &mut LdapMessageContainer) -> DecodeResult<()> {
    let policy = container.config().boolean_policy;
    let delete_old_rdn = decode_boolean(container.current_value()?, policy)?;
    modify_dn_request_mut(container)?.delete_old_rdn = delete_old_rdn;
    Ok(())
}

fn store_new_superior(container: &mut LdapMessageContainer) -> DecodeResult<()> {
    let new_superior = current_string(container)?;
    modify_dn_request_mut(container)?.new_superior = Some(new_superior.clone());
    check_dn(&new_superior)
}

fn init_compare_request(container: &mut LdapMessageContainer) -> DecodeResult<()> {
    set_protocol_op(container, ProtocolOp::CompareRequest(CompareRequest::default()))
}

fn store_compare_entry(container: &mut LdapMessageContainer) -> DecodeResult<()> {
    let entry = current_string(container)?;
    compare_request_mut(container)?.entry = entry.clone();
    check_dn(&entry)
}

fn store_compare_attribute_desc(container: &mut LdapMessageContainer) -> DecodeResult<()> {
    let description = current_string(container)?;
    compare_request_mut(container)?.ava.attribute_desc = description.clone();
    check_attribute_description(&description)
}

fn store_compare_assertion_value(container: &mut LdapMessageContainer) -> DecodeResult<()> {
    let value = current_bytes(container)?;
    compare_request_mut(container)?.ava.assertion_value = value;
    Ok(())
}
