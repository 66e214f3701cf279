//! LDAPMessage grammar
//!
//! One grammar covers every LDAPv3 message. States are named after the
//! element last decoded; transitions are registered per operation family
//! by the submodules.
//!
//! ```text
//! Start --0x30--> LdapMessage --0x02--> MessageId --op tag--> <operation>
//!                                                   ...
//! <end of operation> --0xA0--> Controls --0x30--> Control ...
//! ```

pub mod bind;
pub mod envelope;
pub mod extended;
pub mod filter;
pub mod result;
pub mod search;
pub mod update;

use once_cell::sync::Lazy;

use ldap_asn1::ber::decoder::decode_utf8;
use ldap_asn1::{Grammar, GrammarBuilder};
use ldap_core::ResultCode;

use crate::container::{LdapMessageContainer, LdapMessageContext};
use crate::error::{DecodeResult, DecoderError};
use crate::message::ProtocolOp;
use crate::validation;

/// States of the LDAPMessage grammar
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LdapState {
    Start,
    LdapMessage,
    MessageId,

    Controls,
    Control,
    ControlType,
    ControlCriticality,
    ControlValue,

    BindRequest,
    BindVersion,
    BindName,
    BindSimple,
    BindSasl,
    BindSaslMechanism,
    BindSaslCredentials,

    BindResponse,
    BindResultCode,
    BindMatchedDn,
    BindDiagnosticMessage,
    BindReferrals,
    BindReferral,
    BindServerSaslCreds,

    Response,
    ResponseResultCode,
    ResponseMatchedDn,
    ResponseDiagnosticMessage,
    ResponseReferrals,
    ResponseReferral,

    ExtendedResponse,
    ExtendedResultCode,
    ExtendedMatchedDn,
    ExtendedDiagnosticMessage,
    ExtendedReferrals,
    ExtendedReferral,
    ExtendedResponseName,
    ExtendedResponseValue,

    UnbindRequest,
    AbandonRequest,
    DelRequest,

    SearchRequest,
    SearchBase,
    SearchScope,
    SearchDerefAliases,
    SearchSizeLimit,
    SearchTimeLimit,
    SearchTypesOnly,
    SearchAttributes,
    SearchAttribute,

    FilterSet,
    FilterNot,
    FilterAva,
    FilterAvaDesc,
    FilterAvaValue,
    FilterPresent,
    FilterSubstrings,
    FilterSubstringsType,
    FilterSubstringsSeq,
    SubstringInitial,
    SubstringAny,
    SubstringFinal,
    FilterExtensible,
    ExtensibleRule,
    ExtensibleType,
    ExtensibleValue,
    ExtensibleDnAttributes,

    SearchEntry,
    EntryName,
    EntryAttributes,
    EntryAttribute,
    EntryAttributeType,
    EntryAttributeVals,
    EntryAttributeValue,

    SearchReference,
    SearchReferenceUri,

    ModifyRequest,
    ModifyObject,
    ModifyChanges,
    ModifyChange,
    ModifyOperation,
    ModifyAttribute,
    ModifyAttributeType,
    ModifyAttributeVals,
    ModifyAttributeValue,

    AddRequest,
    AddEntry,
    AddAttributes,
    AddAttribute,
    AddAttributeType,
    AddAttributeVals,
    AddAttributeValue,

    ModifyDnRequest,
    ModifyDnEntry,
    ModifyDnNewRdn,
    ModifyDnDeleteOldRdn,
    ModifyDnNewSuperior,

    CompareRequest,
    CompareEntry,
    CompareAva,
    CompareAttributeDesc,
    CompareAssertionValue,

    ExtendedRequest,
    ExtendedRequestName,
    ExtendedRequestValue,

    IntermediateResponse,
    IntermediateResponseName,
    IntermediateResponseValue,
}

pub(crate) type LdapGrammarBuilder = GrammarBuilder<LdapState, LdapMessageContext>;

/// The LDAPMessage grammar, shared by every container
pub static LDAP_MESSAGE_GRAMMAR: Lazy<Grammar<LdapState, LdapMessageContext>> = Lazy::new(|| {
    let mut builder = Grammar::builder("LDAPMessage grammar", LdapState::Start);

    envelope::add_transitions(&mut builder);
    bind::add_transitions(&mut builder);
    result::add_transitions(&mut builder);
    search::add_transitions(&mut builder);
    filter::add_transitions(&mut builder);
    update::add_transitions(&mut builder);
    extended::add_transitions(&mut builder);

    builder.build()
});

/// Accessor to the operation under construction, failing on any other
macro_rules! op_mut {
    ($name:ident, $variant:ident, $ty:ty) => {
        pub(crate) fn $name(
            container: &mut crate::container::LdapMessageContainer,
        ) -> crate::error::DecodeResult<&mut $ty> {
            match container.value_mut().protocol_op.as_mut() {
                Some(crate::message::ProtocolOp::$variant(op)) => Ok(op),
                _ => Err(crate::error::DecoderError::invalid_value(concat!(
                    "No ",
                    stringify!($variant),
                    " under construction"
                ))),
            }
        }
    };
}

pub(crate) use op_mut;

/// Install the operation whose tag has just been read
pub(crate) fn set_protocol_op(container: &mut LdapMessageContainer, op: ProtocolOp) -> DecodeResult<()> {
    let context = container.value_mut();
    if context.protocol_op.is_some() {
        return Err(DecoderError::invalid_value("The message already has a protocol operation"));
    }
    context.protocol_op = Some(op);
    Ok(())
}

/// Value of the current TLV as an LDAPString
pub(crate) fn current_string(container: &LdapMessageContainer) -> DecodeResult<String> {
    decode_utf8(container.current_value()?)
}

/// Value of the current TLV as raw octets
pub(crate) fn current_bytes(container: &LdapMessageContainer) -> DecodeResult<Vec<u8>> {
    Ok(container.current_value()?.to_vec())
}

/// Id of the current TLV
pub(crate) fn current_tlv_id(container: &LdapMessageContainer) -> DecodeResult<usize> {
    container
        .current_tlv()
        .map(|tlv| tlv.id())
        .ok_or_else(|| DecoderError::invalid_value("No current TLV"))
}

/// Check a DN of a request, answering `invalidDNSyntax` when it is wrong
pub(crate) fn check_dn(dn: &str) -> DecodeResult<()> {
    if validation::is_valid_dn(dn) {
        Ok(())
    } else {
        Err(DecoderError::response_carrying(
            format!("Invalid DN '{}'", dn),
            ResultCode::InvalidDnSyntax,
        ))
    }
}

/// Check an attribute description of a request, answering
/// `invalidAttributeSyntax` when it is wrong
pub(crate) fn check_attribute_description(description: &str) -> DecodeResult<()> {
    if validation::is_valid_attribute_description(description) {
        Ok(())
    } else {
        Err(DecoderError::response_carrying(
            format!("Invalid attribute description '{}'", description),
            ResultCode::InvalidAttributeSyntax,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_grammar_builds() {
        let grammar = &*LDAP_MESSAGE_GRAMMAR;
        assert_eq!(grammar.initial_state(), LdapState::Start);
        assert!(grammar.transition(LdapState::Start, 0x30).is_some());
        assert!(grammar.transition(LdapState::MessageId, 0x50).is_some());
        assert!(grammar.transition(LdapState::SearchAttribute, 0xA0).is_some());
        assert!(grammar.transition(LdapState::FilterAvaValue, 0xA0).is_some());
    }
}
