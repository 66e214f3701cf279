//! Values carried by extended and intermediate operations

use serde::{Deserialize, Serialize};

/// Decoded value of an extended request, extended response or intermediate
/// response
///
/// Operations whose OID has a registered factory get a typed value; the
/// others keep their raw octets.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ExtendedValue {
    /// No value element
    #[default]
    Absent,
    /// Cancel request: id of the operation to cancel
    Cancel { cancel_id: i32 },
    /// Who am I? response: the authorization identity, possibly empty
    AuthzId(String),
    /// Value of an operation without registered factory
    Raw(#[serde(with = "serde_bytes")] Vec<u8>),
}

impl ExtendedValue {
    pub fn is_absent(&self) -> bool {
        matches!(self, ExtendedValue::Absent)
    }
}
