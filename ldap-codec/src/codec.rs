//! Codec service: the registry of control and extended operation factories
//!
//! A service is configured once, then shared read-only through an `Arc` by
//! every decoder and encoder using it.
//!
//! # Example
//! ```ignore
//! let mut service = LdapCodecService::new();
//! service.register_control(Arc::new(MyControlFactory));
//! let service = Arc::new(service);
//!
//! let mut decoder = service.new_decoder();
//! for message in decoder.feed(&bytes)? {
//!     // ...
//! }
//! ```

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use bytes::Bytes;

use ldap_asn1::DecoderConfig;

use crate::controls::{ControlFactory, ManageDsaItFactory, PagedResultsFactory, SubentriesFactory};
use crate::decoder::LdapDecoder;
use crate::encoder;
use crate::error::{CodecResult, DecodeResult, DecoderError, EncodeResult, EncoderError};
use crate::extended::{CancelFactory, ExtendedOperationFactory, StartTlsFactory, WhoAmIFactory};
use crate::message::{ControlValue, ExtendedValue, LdapMessage};

/// Registry of the control and extended operation factories
pub struct LdapCodecService {
    config: DecoderConfig,
    controls: HashMap<String, Arc<dyn ControlFactory>>,
    extended_operations: HashMap<String, Arc<dyn ExtendedOperationFactory>>,
}

impl LdapCodecService {
    /// Create a service with the default configuration and the built-in
    /// factories
    pub fn new() -> Self {
        Self::with_config(DecoderConfig::default())
    }

    /// Create a service with the built-in factories
    pub fn with_config(config: DecoderConfig) -> Self {
        let mut service = Self::empty(config);

        service.register_control(Arc::new(ManageDsaItFactory));
        service.register_control(Arc::new(PagedResultsFactory));
        service.register_control(Arc::new(SubentriesFactory));

        service.register_extended_operation(Arc::new(StartTlsFactory));
        service.register_extended_operation(Arc::new(WhoAmIFactory));
        service.register_extended_operation(Arc::new(CancelFactory));

        service
    }

    /// Create a service without any factory: every value is kept raw
    pub fn empty(config: DecoderConfig) -> Self {
        Self {
            config,
            controls: HashMap::new(),
            extended_operations: HashMap::new(),
        }
    }

    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    /// Register a control factory
    ///
    /// # Returns
    /// The factory previously registered for the same OID, if any
    pub fn register_control(
        &mut self,
        factory: Arc<dyn ControlFactory>,
    ) -> Option<Arc<dyn ControlFactory>> {
        log::debug!("Registering control {}", factory.oid());
        self.controls.insert(factory.oid().to_string(), factory)
    }

    /// Register an extended operation factory
    ///
    /// # Returns
    /// The factory previously registered for the same OID, if any
    pub fn register_extended_operation(
        &mut self,
        factory: Arc<dyn ExtendedOperationFactory>,
    ) -> Option<Arc<dyn ExtendedOperationFactory>> {
        log::debug!("Registering extended operation {}", factory.oid());
        self.extended_operations
            .insert(factory.oid().to_string(), factory)
    }

    pub fn control_factory(&self, oid: &str) -> Option<&Arc<dyn ControlFactory>> {
        self.controls.get(oid)
    }

    pub fn extended_operation_factory(
        &self,
        oid: &str,
    ) -> Option<&Arc<dyn ExtendedOperationFactory>> {
        self.extended_operations.get(oid)
    }

    /// Decode the value of control `oid`, raw when no factory is registered
    pub fn decode_control_value(&self, oid: &str, value: &[u8]) -> DecodeResult<ControlValue> {
        match self.controls.get(oid) {
            Some(factory) => factory.decode_value(value, &self.config),
            None => Ok(ControlValue::Raw(value.to_vec())),
        }
    }

    /// Encode the value of control `oid`
    ///
    /// # Returns
    /// `None` when the control has no value
    pub fn encode_control_value(
        &self,
        oid: &str,
        value: &ControlValue,
    ) -> EncodeResult<Option<Bytes>> {
        match value {
            ControlValue::Absent => Ok(None),
            ControlValue::Raw(raw) => Ok(Some(Bytes::copy_from_slice(raw))),
            _ => self
                .controls
                .get(oid)
                .ok_or_else(|| missing_factory("control", oid))?
                .encode_value(value)
                .map(Some),
        }
    }

    /// Decode the requestValue of extended operation `oid`
    pub fn decode_extended_request_value(
        &self,
        oid: &str,
        value: &[u8],
    ) -> DecodeResult<ExtendedValue> {
        match self.extended_operations.get(oid) {
            Some(factory) => factory.decode_request_value(value, &self.config),
            None => Ok(ExtendedValue::Raw(value.to_vec())),
        }
    }

    /// Decode the responseValue of extended operation `oid`
    pub fn decode_extended_response_value(
        &self,
        oid: &str,
        value: &[u8],
    ) -> DecodeResult<ExtendedValue> {
        match self.extended_operations.get(oid) {
            Some(factory) => factory.decode_response_value(value, &self.config),
            None => Ok(ExtendedValue::Raw(value.to_vec())),
        }
    }

    pub fn encode_extended_request_value(
        &self,
        oid: &str,
        value: &ExtendedValue,
    ) -> EncodeResult<Option<Bytes>> {
        match value {
            ExtendedValue::Absent => Ok(None),
            ExtendedValue::Raw(raw) => Ok(Some(Bytes::copy_from_slice(raw))),
            _ => self
                .extended_operations
                .get(oid)
                .ok_or_else(|| missing_factory("extended operation", oid))?
                .encode_request_value(value)
                .map(Some),
        }
    }

    pub fn encode_extended_response_value(
        &self,
        oid: Option<&str>,
        value: &ExtendedValue,
    ) -> EncodeResult<Option<Bytes>> {
        match value {
            ExtendedValue::Absent => Ok(None),
            ExtendedValue::Raw(raw) => Ok(Some(Bytes::copy_from_slice(raw))),
            _ => {
                let oid = oid.ok_or_else(|| {
                    EncoderError::InvalidValue(format!(
                        "Typed response value {:?} without response name",
                        value
                    ))
                })?;
                self.extended_operations
                    .get(oid)
                    .ok_or_else(|| missing_factory("extended operation", oid))?
                    .encode_response_value(value)
                    .map(Some)
            }
        }
    }

    /// Create a streaming decoder sharing this registry
    pub fn new_decoder(self: &Arc<Self>) -> LdapDecoder {
        LdapDecoder::with_service(Arc::clone(self))
    }

    /// Decode one complete PDU
    ///
    /// Fails with `TruncatedPdu` when `bytes` ends before the PDU, and with
    /// `TrailingBytes` when bytes follow it.
    pub fn decode_message(self: &Arc<Self>, bytes: &[u8]) -> CodecResult<LdapMessage> {
        let mut decoder = self.new_decoder();
        let mut stream = bytes;
        match decoder.decode(&mut stream)? {
            Some(_) if !stream.is_empty() => {
                Err(DecoderError::TrailingBytes(stream.len()).into())
            }
            Some(message) => Ok(message),
            None => Err(DecoderError::TruncatedPdu.into()),
        }
    }

    /// Encode one message
    pub fn encode_message(&self, message: &LdapMessage) -> CodecResult<Bytes> {
        Ok(encoder::encode_message(self, message)?)
    }
}

fn missing_factory(kind: &str, oid: &str) -> EncoderError {
    EncoderError::InvalidValue(format!("No factory registered for {} {}", kind, oid))
}

impl Default for LdapCodecService {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for LdapCodecService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut controls: Vec<&str> = self.controls.keys().map(String::as_str).collect();
        controls.sort_unstable();
        let mut extended_operations: Vec<&str> = self
            .extended_operations
            .keys()
            .map(String::as_str)
            .collect();
        extended_operations.sort_unstable();

        f.debug_struct("LdapCodecService")
            .field("config", &self.config)
            .field("controls", &controls)
            .field("extended_operations", &extended_operations)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{control_oids, extended_oids};

    #[test]
    fn test_built_in_factories() {
        let service = LdapCodecService::new();
        assert!(service.control_factory(control_oids::MANAGE_DSA_IT).is_some());
        assert!(service.control_factory(control_oids::PAGED_RESULTS).is_some());
        assert!(service.control_factory(control_oids::SUBENTRIES).is_some());
        assert!(service.extended_operation_factory(extended_oids::START_TLS).is_some());
        assert!(service.extended_operation_factory(extended_oids::WHO_AM_I).is_some());
        assert!(service.extended_operation_factory(extended_oids::CANCEL).is_some());

        let empty = LdapCodecService::empty(DecoderConfig::default());
        assert!(empty.control_factory(control_oids::PAGED_RESULTS).is_none());
    }

    #[test]
    fn test_unknown_values_stay_raw() {
        let service = LdapCodecService::new();
        assert_eq!(
            service.decode_control_value("1.2.3.4", &[0x01, 0x02]).unwrap(),
            ControlValue::Raw(vec![0x01, 0x02])
        );
        assert_eq!(
            service
                .decode_extended_response_value("1.2.3.4", b"abc")
                .unwrap(),
            ExtendedValue::Raw(b"abc".to_vec())
        );
        assert_eq!(
            service
                .encode_control_value("1.2.3.4", &ControlValue::Raw(vec![0x01]))
                .unwrap()
                .as_deref(),
            Some(&[0x01][..])
        );
        assert_eq!(
            service
                .encode_control_value("1.2.3.4", &ControlValue::Absent)
                .unwrap(),
            None
        );
    }

    #[test]
    fn test_typed_value_needs_factory() {
        let service = LdapCodecService::empty(DecoderConfig::default());
        let value = ControlValue::Subentries { visibility: true };
        assert!(service
            .encode_control_value(control_oids::SUBENTRIES, &value)
            .is_err());
        assert!(service
            .encode_extended_response_value(None, &ExtendedValue::AuthzId(String::new()))
            .is_err());
    }

    #[test]
    fn test_register_replaces() {
        let mut service = LdapCodecService::new();
        let previous = service.register_control(Arc::new(SubentriesFactory));
        assert!(previous.is_some());
        assert!(service.register_control(Arc::new(SubentriesFactory)).is_some());
    }

    #[test]
    fn test_debug_lists_oids() {
        let output = format!("{:?}", LdapCodecService::new());
        assert!(output.contains(control_oids::PAGED_RESULTS));
        assert!(output.contains(extended_oids::CANCEL));
    }
}
