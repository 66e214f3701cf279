//! Decoding context of one LDAP message
//!
//! The value a [`LdapMessageContainer`] builds. The message envelope fields
//! are filled as their TLVs arrive; the operation is created by the action of
//! its tag and completed in place by the following actions.

use std::sync::Arc;

use ldap_asn1::Asn1Container;

use crate::codec::LdapCodecService;
use crate::error::{DecodeResult, DecoderError};
use crate::grammar::LdapState;
use crate::grammar::filter::FilterBuilder;
use crate::message::{Control, LdapMessage, ProtocolOp};

/// Container decoding LDAP messages
pub type LdapMessageContainer = Asn1Container<LdapState, LdapMessageContext>;

/// LDAP message under construction
#[derive(Debug)]
pub struct LdapMessageContext {
    service: Arc<LdapCodecService>,
    pub(crate) message_id: i32,
    pub(crate) protocol_op: Option<ProtocolOp>,
    pub(crate) controls: Vec<Control>,
    pub(crate) filters: FilterBuilder,
}

impl LdapMessageContext {
    pub fn new(service: Arc<LdapCodecService>) -> Self {
        Self {
            service,
            message_id: 0,
            protocol_op: None,
            controls: Vec::new(),
            filters: FilterBuilder::default(),
        }
    }

    /// Registry used to decode control and extended operation values
    pub fn service(&self) -> &Arc<LdapCodecService> {
        &self.service
    }

    pub fn message_id(&self) -> i32 {
        self.message_id
    }

    /// Operation decoded so far, possibly incomplete
    pub fn protocol_op(&self) -> Option<&ProtocolOp> {
        self.protocol_op.as_ref()
    }

    pub fn controls(&self) -> &[Control] {
        &self.controls
    }

    /// Fresh context sharing the same registry
    pub fn renew(&self) -> Self {
        Self::new(Arc::clone(&self.service))
    }

    /// Build the message once the PDU is decoded
    pub fn into_message(self) -> DecodeResult<LdapMessage> {
        let protocol_op = self
            .protocol_op
            .ok_or_else(|| DecoderError::invalid_value("The message has no protocol operation"))?;

        Ok(LdapMessage {
            message_id: self.message_id,
            protocol_op,
            controls: self.controls,
        })
    }
}

/// Create a container decoding with `service`
pub fn new_container(service: Arc<LdapCodecService>) -> LdapMessageContainer {
    let config = service.config().clone();
    Asn1Container::with_value(
        &*crate::grammar::LDAP_MESSAGE_GRAMMAR,
        config,
        LdapMessageContext::new(service),
    )
}
