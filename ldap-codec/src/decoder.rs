//! Streaming LDAP message decoder
//!
//! [`LdapDecoder`] accepts the bytes of a connection in chunks of any size
//! and yields every LDAPMessage as soon as its last byte arrives. Bytes
//! following a PDU stay in the caller's buffer for the next call.
//!
//! After a decoding error the decoder refuses any further input until
//! [`LdapDecoder::reset`] is called. When the error is
//! [`CodecError::ResponseCarrying`], the error holds the LDAP response the
//! peer can be answered with.

use std::sync::Arc;

use bytes::Buf;

use ldap_asn1::{DecodeStatus, decode};

use crate::codec::LdapCodecService;
use crate::container::{LdapMessageContainer, new_container};
use crate::error::{CodecError, CodecResult, DecoderError};
use crate::message::{LdapMessage, LdapResult};

/// Streaming LDAP message decoder
#[derive(Debug)]
pub struct LdapDecoder {
    container: LdapMessageContainer,
}

impl LdapDecoder {
    /// Create a decoder with the built-in factories
    pub fn new() -> Self {
        Self::with_service(Arc::new(LdapCodecService::new()))
    }

    pub fn with_service(service: Arc<LdapCodecService>) -> Self {
        Self {
            container: new_container(service),
        }
    }

    pub fn service(&self) -> &Arc<LdapCodecService> {
        self.container.value().service()
    }

    /// Decode bytes from `stream`
    ///
    /// Consumes bytes up to the end of the current PDU at most.
    ///
    /// # Returns
    /// The message when its PDU is complete, `None` when more bytes are
    /// needed (every byte of `stream` has then been consumed)
    pub fn decode<B: Buf>(&mut self, stream: &mut B) -> CodecResult<Option<LdapMessage>> {
        match decode(stream, &mut self.container) {
            Ok(DecodeStatus::NeedMoreData) => Ok(None),
            Ok(DecodeStatus::PduDecoded) => {
                let fresh = self.container.value().renew();
                let context = self.container.reset_with(fresh);
                let message = context.into_message()?;
                log::debug!(
                    "Decoded {} message {}",
                    message.message_type(),
                    message.message_id
                );
                Ok(Some(message))
            }
            Err(error) => Err(self.codec_error(error)),
        }
    }

    /// Decode every message completed by `bytes`
    ///
    /// The bytes of an incomplete trailing PDU are kept in the decoder.
    /// Messages completed before an error are lost with it.
    pub fn feed(&mut self, bytes: &[u8]) -> CodecResult<Vec<LdapMessage>> {
        let mut stream = bytes;
        let mut messages = Vec::new();
        while stream.has_remaining() {
            match self.decode(&mut stream)? {
                Some(message) => messages.push(message),
                None => break,
            }
        }
        Ok(messages)
    }

    /// Drop any partial PDU and make a failed decoder usable again
    pub fn reset(&mut self) {
        let fresh = self.container.value().renew();
        self.container.reset_with(fresh);
    }

    /// Whether a PDU is partially decoded
    pub fn is_in_progress(&self) -> bool {
        self.container.decoded_bytes() > 0 && !self.container.is_failed()
    }

    /// Turn a decoding error into a codec error, building the LDAP error
    /// response when the request allows it
    fn codec_error(&self, error: DecoderError) -> CodecError {
        let (reason, result_code, matched_dn) = match error {
            DecoderError::ResponseCarrying {
                reason,
                result_code,
                matched_dn,
            } => (reason, result_code, matched_dn),
            error => {
                log::error!("LDAP decoding failed: {}", error);
                return CodecError::Decoder(error);
            }
        };

        let context = self.container.value();
        let result = LdapResult {
            result_code,
            matched_dn: matched_dn.clone().unwrap_or_default(),
            diagnostic_message: reason.clone(),
            referrals: Vec::new(),
        };
        match context
            .protocol_op()
            .and_then(|op| op.error_response(result))
        {
            Some(response) => {
                log::warn!(
                    "LDAP request {} rejected with {}: {}",
                    context.message_id(),
                    result_code,
                    reason
                );
                CodecError::ResponseCarrying {
                    reason,
                    response: Box::new(LdapMessage::new(context.message_id(), response)),
                }
            }
            None => {
                log::error!("LDAP decoding failed: {}", reason);
                CodecError::Decoder(DecoderError::ResponseCarrying {
                    reason,
                    result_code,
                    matched_dn,
                })
            }
        }
    }
}

impl Default for LdapDecoder {
    fn default() -> Self {
        Self::new()
    }
}
