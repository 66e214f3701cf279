//! Controls attached to an LDAP message (RFC 4511 section 4.1.11)

use serde::{Deserialize, Serialize};

/// Decoded value of a control
///
/// Controls whose OID has a registered factory get a typed value; the others
/// keep their raw octets so they can be re-encoded untouched.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ControlValue {
    /// No controlValue element
    #[default]
    Absent,
    /// Simple Paged Results: page size and server cookie
    PagedResults {
        size: i32,
        #[serde(with = "serde_bytes")]
        cookie: Vec<u8>,
    },
    /// Subentries visibility
    Subentries { visibility: bool },
    /// Value of a control without registered factory
    Raw(#[serde(with = "serde_bytes")] Vec<u8>),
}

/// A control
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Control {
    pub control_type: String,
    pub criticality: bool,
    pub value: ControlValue,
}

impl Control {
    /// Create a non critical control without value
    pub fn new(control_type: impl Into<String>) -> Self {
        Self {
            control_type: control_type.into(),
            criticality: false,
            value: ControlValue::Absent,
        }
    }

    pub fn critical(mut self, criticality: bool) -> Self {
        self.criticality = criticality;
        self
    }

    pub fn with_value(mut self, value: ControlValue) -> Self {
        self.value = value;
        self
    }
}
