//! SearchRequest, SearchResultEntry and SearchResultReference
//!
//! ```text
//! SearchRequest ::= [APPLICATION 3] SEQUENCE {
//!      baseObject      LDAPDN,
//!      scope           ENUMERATED { ... },
//!      derefAliases    ENUMERATED { ... },
//!      sizeLimit       INTEGER (0 ..  maxInt),
//!      timeLimit       INTEGER (0 ..  maxInt),
//!      typesOnly       BOOLEAN,
//!      filter          Filter,
//!      attributes      AttributeSelection }
//!
//! SearchResultEntry ::= [APPLICATION 4] SEQUENCE {
//!      objectName      LDAPDN,
//!      attributes      PartialAttributeList }
//!
//! SearchResultReference ::= [APPLICATION 19] SEQUENCE
//!                           SIZE (1..MAX) OF uri URI
//! ```

use ldap_asn1::Transition;
use ldap_asn1::ber::decoder::{decode_boolean, decode_enumerated, decode_int_in_range};
use ldap_asn1::ber::types::tags;

use super::envelope::add_controls_from;
use super::filter::{FILTER_END, FILTER_ITEMS, take_filter};
use super::{
    LdapGrammarBuilder, LdapState as S, check_dn, current_bytes, current_string, op_mut,
    set_protocol_op,
};
use crate::constants::{MAX_MESSAGE_ID, op_tags};
use crate::container::LdapMessageContainer;
use crate::error::{DecodeResult, DecoderError};
use crate::message::{
    DerefAliases, PartialAttribute, ProtocolOp, SearchRequest, SearchResultEntry, SearchScope,
};

op_mut!(search_request_mut, SearchRequest, SearchRequest);
op_mut!(search_entry_mut, SearchResultEntry, SearchResultEntry);
op_mut!(search_reference_mut, SearchResultReference, Vec<String>);

pub(crate) fn add_transitions(builder: &mut LdapGrammarBuilder) {
    add_search_request(builder);
    add_search_result_entry(builder);
    add_search_result_reference(builder);
}

fn add_search_request(builder: &mut LdapGrammarBuilder) {
    builder
        .add(
            Transition::new(
                "SearchRequest",
                S::MessageId,
                op_tags::SEARCH_REQUEST,
                S::SearchRequest,
            )
            .with_action(init_search_request),
        )
        .add(
            Transition::new("baseObject", S::SearchRequest, tags::OCTET_STRING, S::SearchBase)
                .with_action(store_base_object),
        )
        .add(
            Transition::new("scope", S::SearchBase, tags::ENUMERATED, S::SearchScope)
                .with_action(store_scope),
        )
        .add(
            Transition::new(
                "derefAliases",
                S::SearchScope,
                tags::ENUMERATED,
                S::SearchDerefAliases,
            )
            .with_action(store_deref_aliases),
        )
        .add(
            Transition::new("sizeLimit", S::SearchDerefAliases, tags::INTEGER, S::SearchSizeLimit)
                .with_action(store_size_limit),
        )
        .add(
            Transition::new("timeLimit", S::SearchSizeLimit, tags::INTEGER, S::SearchTimeLimit)
                .with_action(store_time_limit),
        )
        .add(
            Transition::new("typesOnly", S::SearchTimeLimit, tags::BOOLEAN, S::SearchTypesOnly)
                .with_action(store_types_only),
        );

    // The filter transitions start from SearchTypesOnly, see the filter module
    let filter_ends: Vec<S> = FILTER_END.into_iter().chain([S::FilterSet]).collect();
    builder
        .add_from_each(
            &filter_ends,
            Transition::new("attributes", S::FilterSet, tags::SEQUENCE, S::SearchAttributes)
                .optional_end()
                .with_action(init_attributes),
        )
        .add_from_each(
            &[S::SearchAttributes, S::SearchAttribute],
            Transition::new(
                "attribute",
                S::SearchAttributes,
                tags::OCTET_STRING,
                S::SearchAttribute,
            )
            .optional_end()
            .with_action(store_attribute),
        );

    add_controls_from(builder, &[S::SearchAttributes, S::SearchAttribute]);

    let request_content: Vec<S> = [
        S::SearchBase,
        S::SearchScope,
        S::SearchDerefAliases,
        S::SearchSizeLimit,
        S::SearchTimeLimit,
        S::SearchTypesOnly,
        S::SearchAttributes,
    ]
    .into_iter()
    .chain(FILTER_ITEMS)
    .collect();
    builder
        .add_content(&[S::SearchRequest], &request_content)
        .add_end(&[S::SearchRequest], &[S::SearchAttributes])
        .add_content(&[S::SearchAttributes], &[S::SearchAttribute])
        .add_end(&[S::SearchAttributes], &[S::SearchAttribute]);
}

fn add_search_result_entry(builder: &mut LdapGrammarBuilder) {
    builder
        .add(
            Transition::new(
                "SearchResultEntry",
                S::MessageId,
                op_tags::SEARCH_RESULT_ENTRY,
                S::SearchEntry,
            )
            .with_action(init_search_entry),
        )
        .add(
            Transition::new("objectName", S::SearchEntry, tags::OCTET_STRING, S::EntryName)
                .with_action(store_object_name),
        )
        .add(
            Transition::new("attributes", S::EntryName, tags::SEQUENCE, S::EntryAttributes)
                .optional_end(),
        )
        .add_from_each(
            &[S::EntryAttributes, S::EntryAttributeVals, S::EntryAttributeValue],
            Transition::new(
                "partialAttribute",
                S::EntryAttributes,
                tags::SEQUENCE,
                S::EntryAttribute,
            ),
        )
        .add(
            Transition::new(
                "type",
                S::EntryAttribute,
                tags::OCTET_STRING,
                S::EntryAttributeType,
            )
            .with_action(store_entry_attribute_type),
        )
        .add(
            Transition::new("vals", S::EntryAttributeType, tags::SET, S::EntryAttributeVals)
                .optional_end(),
        )
        .add_from_each(
            &[S::EntryAttributeVals, S::EntryAttributeValue],
            Transition::new(
                "value",
                S::EntryAttributeVals,
                tags::OCTET_STRING,
                S::EntryAttributeValue,
            )
            .optional_end()
            .with_action(store_entry_attribute_value),
        );

    add_controls_from(
        builder,
        &[S::EntryAttributes, S::EntryAttributeVals, S::EntryAttributeValue],
    );
    builder
        .add_content(&[S::SearchEntry], &[S::EntryName, S::EntryAttributes])
        .add_end(&[S::SearchEntry], &[S::EntryAttributes])
        .add_content(&[S::EntryAttributes], &[S::EntryAttribute])
        .add_end(&[S::EntryAttributes], &[S::EntryAttribute])
        .add_content(&[S::EntryAttribute], &[S::EntryAttributeType, S::EntryAttributeVals])
        .add_end(&[S::EntryAttribute], &[S::EntryAttributeVals])
        .add_content(&[S::EntryAttributeVals], &[S::EntryAttributeValue])
        .add_end(&[S::EntryAttributeVals], &[S::EntryAttributeValue]);
}

fn add_search_result_reference(builder: &mut LdapGrammarBuilder) {
    builder
        .add(
            Transition::new(
                "SearchResultReference",
                S::MessageId,
                op_tags::SEARCH_RESULT_REFERENCE,
                S::SearchReference,
            )
            .with_action(init_search_reference),
        )
        .add_from_each(
            &[S::SearchReference, S::SearchReferenceUri],
            Transition::new(
                "uri",
                S::SearchReference,
                tags::OCTET_STRING,
                S::SearchReferenceUri,
            )
            .optional_end()
            .with_action(store_reference_uri),
        );

    add_controls_from(builder, &[S::SearchReferenceUri]);
    builder
        .add_content(&[S::SearchReference], &[S::SearchReferenceUri])
        .add_end(&[S::SearchReference], &[S::SearchReferenceUri]);
}

fn init_search_request(container: &mut LdapMessageContainer) -> DecodeResult<()> {
    set_protocol_op(container, ProtocolOp::SearchRequest(SearchRequest::default()))
}

fn store_base_object(container: &mut LdapMessageContainer) -> DecodeResult<()> {
    let base_object = current_string(container)?;
    search_request_mut(container)?.base_object = base_object.clone();
    check_dn(&base_object)
}

fn store_scope(container: &mut LdapMessageContainer) -> DecodeResult<()> {
    let value = decode_enumerated(container.current_value()?, 0, 2)?;
    let scope = SearchScope::from_i32(value)
        .ok_or_else(|| DecoderError::invalid_value(format!("Invalid search scope {}", value)))?;
    search_request_mut(container)?.scope = scope;
    Ok(())
}

fn store_deref_aliases(container: &mut LdapMessageContainer) -> DecodeResult<()> {
    let value = decode_enumerated(container.current_value()?, 0, 3)?;
    let deref_aliases = DerefAliases::from_i32(value)
        .ok_or_else(|| DecoderError::invalid_value(format!("Invalid derefAliases {}", value)))?;
    search_request_mut(container)?.deref_aliases = deref_aliases;
    Ok(())
}

fn store_size_limit(container: &mut LdapMessageContainer) -> DecodeResult<()> {
    let size_limit = decode_int_in_range(container.current_value()?, 0, MAX_MESSAGE_ID)?;
    search_request_mut(container)?.size_limit = size_limit;
    Ok(())
}

fn store_time_limit(container: &mut LdapMessageContainer) -> DecodeResult<()> {
    let time_limit = decode_int_in_range(container.current_value()?, 0, MAX_MESSAGE_ID)?;
    search_request_mut(container)?.time_limit = time_limit;
    Ok(())
}

fn store_types_only(container: &mut LdapMessageContainer) -> DecodeResult<()> {
    let policy = container.config().boolean_policy;
    let types_only = decode_boolean(container.current_value()?, policy)?;
    search_request_mut(container)?.types_only = types_only;
    Ok(())
}

/// The filter is complete once the attribute selection starts
fn init_attributes(container: &mut LdapMessageContainer) -> DecodeResult<()> {
    let filter = take_filter(container)?;
    log::trace!("Search filter {}", filter);
    search_request_mut(container)?.filter = filter;
    Ok(())
}

fn store_attribute(container: &mut LdapMessageContainer) -> DecodeResult<()> {
    let attribute = current_string(container)?;
    search_request_mut(container)?.attributes.push(attribute);
    Ok(())
}

fn init_search_entry(container: &mut LdapMessageContainer) -> DecodeResult<()> {
    set_protocol_op(
        container,
        ProtocolOp::SearchResultEntry(SearchResultEntry::default()),
    )
}

fn store_object_name(container: &mut LdapMessageContainer) -> DecodeResult<()> {
    let object_name = current_string(container)?;
    search_entry_mut(container)?.object_name = object_name;
    Ok(())
}

fn store_entry_attribute_type(container: &mut LdapMessageContainer) -> DecodeResult<()> {
    let attribute_type = current_string(container)?;
    search_entry_mut(container)?
        .attributes
        .push(PartialAttribute::new(attribute_type));
    Ok(())
}

fn store_entry_attribute_value(container: &mut LdapMessageContainer) -> DecodeResult<()> {
    let value = current_bytes(container)?;
    search_entry_mut(container)?
        .attributes
        .last_mut()
        .ok_or_else(|| DecoderError::invalid_value("No attribute under construction"))?
        .values
        .push(value);
    Ok(())
}

fn init_search_reference(container: &mut LdapMessageContainer) -> DecodeResult<()> {
    set_protocol_op(container, ProtocolOp::SearchResultReference(Vec::new()))
}

fn store_reference_uri(container: &mut LdapMessageContainer) -> DecodeResult<()> {
    let uri = current_string(container)?;
    if uri.is_empty() {
        return Err(DecoderError::invalid_value("Empty search result reference URI"));
    }
    search_reference_mut(container)?.push(uri);
    Ok(())
}
