//! LDAP response operations

use ldap_core::ResultCode;
use serde::{Deserialize, Serialize};

use super::extended::ExtendedValue;
use super::request::PartialAttribute;

/// `LDAPResult`, shared by most responses
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct LdapResult {
    pub result_code: ResultCode,
    pub matched_dn: String,
    pub diagnostic_message: String,
    /// Referral URIs; empty when the referral element is absent
    pub referrals: Vec<String>,
}

impl LdapResult {
    pub fn new(result_code: ResultCode) -> Self {
        Self {
            result_code,
            ..Default::default()
        }
    }

    pub fn with_diagnostic_message(mut self, message: impl Into<String>) -> Self {
        self.diagnostic_message = message.into();
        self
    }

    pub fn with_matched_dn(mut self, matched_dn: impl Into<String>) -> Self {
        self.matched_dn = matched_dn.into();
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BindResponse {
    pub result: LdapResult,
    #[serde(with = "serde_bytes")]
    pub server_sasl_creds: Option<Vec<u8>>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SearchResultEntry {
    pub object_name: String,
    pub attributes: Vec<PartialAttribute>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ExtendedResponse {
    pub result: LdapResult,
    pub response_name: Option<String>,
    pub response_value: ExtendedValue,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct IntermediateResponse {
    pub response_name: Option<String>,
    pub response_value: ExtendedValue,
}
