//! LDAPv3 message model (RFC 4511)
//!
//! Plain data types built by the grammar actions and consumed by the
//! encoder. DNs, attribute descriptions and OIDs are kept as strings; the
//! codec only checks their syntax.

pub mod control;
pub mod extended;
pub mod filter;
pub mod request;
pub mod response;

use serde::{Deserialize, Serialize};
use std::fmt;

pub use control::{Control, ControlValue};
pub use extended::ExtendedValue;
pub use filter::{AttributeValueAssertion, Filter, MatchingRuleAssertion, SubstringFilter};
pub use request::{
    AddRequest, BindAuthentication, BindRequest, Change, CompareRequest, DerefAliases,
    ExtendedRequest, ModifyDnRequest, ModifyOperation, ModifyRequest, PartialAttribute,
    SearchRequest, SearchScope,
};
pub use response::{
    BindResponse, ExtendedResponse, IntermediateResponse, LdapResult, SearchResultEntry,
};

/// `protocolOp` CHOICE
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ProtocolOp {
    BindRequest(BindRequest),
    BindResponse(BindResponse),
    UnbindRequest,
    SearchRequest(SearchRequest),
    SearchResultEntry(SearchResultEntry),
    SearchResultDone(LdapResult),
    SearchResultReference(Vec<String>),
    ModifyRequest(ModifyRequest),
    ModifyResponse(LdapResult),
    AddRequest(AddRequest),
    AddResponse(LdapResult),
    DelRequest(String),
    DelResponse(LdapResult),
    ModifyDnRequest(ModifyDnRequest),
    ModifyDnResponse(LdapResult),
    CompareRequest(CompareRequest),
    CompareResponse(LdapResult),
    AbandonRequest(i32),
    ExtendedRequest(ExtendedRequest),
    ExtendedResponse(ExtendedResponse),
    IntermediateResponse(IntermediateResponse),
}

/// Kind of a protocol operation, without its content
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MessageType {
    BindRequest,
    BindResponse,
    UnbindRequest,
    SearchRequest,
    SearchResultEntry,
    SearchResultDone,
    SearchResultReference,
    ModifyRequest,
    ModifyResponse,
    AddRequest,
    AddResponse,
    DelRequest,
    DelResponse,
    ModifyDnRequest,
    ModifyDnResponse,
    CompareRequest,
    CompareResponse,
    AbandonRequest,
    ExtendedRequest,
    ExtendedResponse,
    IntermediateResponse,
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl ProtocolOp {
    pub fn message_type(&self) -> MessageType {
        match self {
            ProtocolOp::BindRequest(_) => MessageType::BindRequest,
            ProtocolOp::BindResponse(_) => MessageType::BindResponse,
            ProtocolOp::UnbindRequest => MessageType::UnbindRequest,
            ProtocolOp::SearchRequest(_) => MessageType::SearchRequest,
            ProtocolOp::SearchResultEntry(_) => MessageType::SearchResultEntry,
            ProtocolOp::SearchResultDone(_) => MessageType::SearchResultDone,
            ProtocolOp::SearchResultReference(_) => MessageType::SearchResultReference,
            ProtocolOp::ModifyRequest(_) => MessageType::ModifyRequest,
            ProtocolOp::ModifyResponse(_) => MessageType::ModifyResponse,
            ProtocolOp::AddRequest(_) => MessageType::AddRequest,
            ProtocolOp::AddResponse(_) => MessageType::AddResponse,
            ProtocolOp::DelRequest(_) => MessageType::DelRequest,
            ProtocolOp::DelResponse(_) => MessageType::DelResponse,
            ProtocolOp::ModifyDnRequest(_) => MessageType::ModifyDnRequest,
            ProtocolOp::ModifyDnResponse(_) => MessageType::ModifyDnResponse,
            ProtocolOp::CompareRequest(_) => MessageType::CompareRequest,
            ProtocolOp::CompareResponse(_) => MessageType::CompareResponse,
            ProtocolOp::AbandonRequest(_) => MessageType::AbandonRequest,
            ProtocolOp::ExtendedRequest(_) => MessageType::ExtendedRequest,
            ProtocolOp::ExtendedResponse(_) => MessageType::ExtendedResponse,
            ProtocolOp::IntermediateResponse(_) => MessageType::IntermediateResponse,
        }
    }

    /// The `LDAPResult` of a response operation
    pub fn ldap_result(&self) -> Option<&LdapResult> {
        match self {
            ProtocolOp::BindResponse(response) => Some(&response.result),
            ProtocolOp::ExtendedResponse(response) => Some(&response.result),
            ProtocolOp::SearchResultDone(result)
            | ProtocolOp::ModifyResponse(result)
            | ProtocolOp::AddResponse(result)
            | ProtocolOp::DelResponse(result)
            | ProtocolOp::ModifyDnResponse(result)
            | ProtocolOp::CompareResponse(result) => Some(result),
            _ => None,
        }
    }

    pub fn ldap_result_mut(&mut self) -> Option<&mut LdapResult> {
        match self {
            ProtocolOp::BindResponse(response) => Some(&mut response.result),
            ProtocolOp::ExtendedResponse(response) => Some(&mut response.result),
            ProtocolOp::SearchResultDone(result)
            | ProtocolOp::ModifyResponse(result)
            | ProtocolOp::AddResponse(result)
            | ProtocolOp::DelResponse(result)
            | ProtocolOp::ModifyDnResponse(result)
            | ProtocolOp::CompareResponse(result) => Some(result),
            _ => None,
        }
    }

    /// Response operation answering this request with `result`
    ///
    /// Returns `None` for responses and for requests without response
    /// (unbind, abandon).
    pub fn error_response(&self, result: LdapResult) -> Option<ProtocolOp> {
        let response = match self {
            ProtocolOp::BindRequest(_) => ProtocolOp::BindResponse(BindResponse {
                result,
                server_sasl_creds: None,
            }),
            ProtocolOp::SearchRequest(_) => ProtocolOp::SearchResultDone(result),
            ProtocolOp::ModifyRequest(_) => ProtocolOp::ModifyResponse(result),
            ProtocolOp::AddRequest(_) => ProtocolOp::AddResponse(result),
            ProtocolOp::DelRequest(_) => ProtocolOp::DelResponse(result),
            ProtocolOp::ModifyDnRequest(_) => ProtocolOp::ModifyDnResponse(result),
            ProtocolOp::CompareRequest(_) => ProtocolOp::CompareResponse(result),
            ProtocolOp::ExtendedRequest(_) => ProtocolOp::ExtendedResponse(ExtendedResponse {
                result,
                response_name: None,
                response_value: ExtendedValue::Absent,
            }),
            _ => return None,
        };
        Some(response)
    }
}

/// `LDAPMessage`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LdapMessage {
    pub message_id: i32,
    pub protocol_op: ProtocolOp,
    pub controls: Vec<Control>,
}

impl LdapMessage {
    pub fn new(message_id: i32, protocol_op: ProtocolOp) -> Self {
        Self {
            message_id,
            protocol_op,
            controls: Vec::new(),
        }
    }

    pub fn with_control(mut self, control: Control) -> Self {
        self.controls.push(control);
        self
    }

    pub fn message_type(&self) -> MessageType {
        self.protocol_op.message_type()
    }

    /// First control of the given type
    pub fn control(&self, control_type: &str) -> Option<&Control> {
        self.controls
            .iter()
            .find(|control| control.control_type == control_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ldap_core::ResultCode;

    #[test]
    fn test_error_response() {
        let request = ProtocolOp::SearchRequest(SearchRequest::default());
        let response = request
            .error_response(LdapResult::new(ResultCode::InvalidDnSyntax))
            .unwrap();
        assert_eq!(response.message_type(), MessageType::SearchResultDone);
        assert_eq!(
            response.ldap_result().map(|result| result.result_code),
            Some(ResultCode::InvalidDnSyntax)
        );

        assert!(ProtocolOp::AbandonRequest(1)
            .error_response(LdapResult::default())
            .is_none());
    }

    #[test]
    fn test_control_lookup() {
        let message = LdapMessage::new(1, ProtocolOp::UnbindRequest)
            .with_control(Control::new("1.2.3").critical(true));
        assert!(message.control("1.2.3").unwrap().criticality);
        assert!(message.control("1.2.4").is_none());
    }
}
