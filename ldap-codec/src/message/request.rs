//! LDAP request operations

use serde::{Deserialize, Serialize};

use super::extended::ExtendedValue;
use super::filter::{AttributeValueAssertion, Filter};

/// Authentication choice of a BindRequest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum BindAuthentication {
    /// `simple [0] OCTET STRING`
    Simple(#[serde(with = "serde_bytes")] Vec<u8>),
    /// `sasl [3] SaslCredentials`
    Sasl {
        mechanism: String,
        #[serde(with = "serde_bytes")]
        credentials: Option<Vec<u8>>,
    },
}

impl Default for BindAuthentication {
    fn default() -> Self {
        BindAuthentication::Simple(Vec::new())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BindRequest {
    pub version: i32,
    pub name: String,
    pub authentication: BindAuthentication,
}

impl Default for BindRequest {
    fn default() -> Self {
        Self {
            version: 3,
            name: String::new(),
            authentication: BindAuthentication::default(),
        }
    }
}

/// Search scope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SearchScope {
    BaseObject = 0,
    SingleLevel = 1,
    #[default]
    WholeSubtree = 2,
}

impl SearchScope {
    pub fn from_i32(value: i32) -> Option<Self> {
        match value {
            0 => Some(SearchScope::BaseObject),
            1 => Some(SearchScope::SingleLevel),
            2 => Some(SearchScope::WholeSubtree),
            _ => None,
        }
    }
}

/// Alias dereferencing policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DerefAliases {
    NeverDerefAliases = 0,
    DerefInSearching = 1,
    DerefFindingBaseObj = 2,
    #[default]
    DerefAlways = 3,
}

impl DerefAliases {
    pub fn from_i32(value: i32) -> Option<Self> {
        match value {
            0 => Some(DerefAliases::NeverDerefAliases),
            1 => Some(DerefAliases::DerefInSearching),
            2 => Some(DerefAliases::DerefFindingBaseObj),
            3 => Some(DerefAliases::DerefAlways),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SearchRequest {
    pub base_object: String,
    pub scope: SearchScope,
    pub deref_aliases: DerefAliases,
    pub size_limit: i32,
    pub time_limit: i32,
    pub types_only: bool,
    pub filter: Filter,
    pub attributes: Vec<String>,
}

/// Attribute with its values; `vals` may be empty
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PartialAttribute {
    pub attribute_type: String,
    pub values: Vec<Vec<u8>>,
}

impl PartialAttribute {
    pub fn new(attribute_type: impl Into<String>) -> Self {
        Self {
            attribute_type: attribute_type.into(),
            values: Vec::new(),
        }
    }

    pub fn with_value(mut self, value: impl Into<Vec<u8>>) -> Self {
        self.values.push(value.into());
        self
    }
}

/// Modification operation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ModifyOperation {
    #[default]
    Add = 0,
    Delete = 1,
    Replace = 2,
    /// RFC 4525
    Increment = 3,
}

impl ModifyOperation {
    pub fn from_i32(value: i32) -> Option<Self> {
        match value {
            0 => Some(ModifyOperation::Add),
            1 => Some(ModifyOperation::Delete),
            2 => Some(ModifyOperation::Replace),
            3 => Some(ModifyOperation::Increment),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Change {
    pub operation: ModifyOperation,
    pub modification: PartialAttribute,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ModifyRequest {
    pub object: String,
    pub changes: Vec<Change>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AddRequest {
    pub entry: String,
    pub attributes: Vec<PartialAttribute>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ModifyDnRequest {
    pub entry: String,
    pub new_rdn: String,
    pub delete_old_rdn: bool,
    pub new_superior: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CompareRequest {
    pub entry: String,
    pub ava: AttributeValueAssertion,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ExtendedRequest {
    pub request_name: String,
    pub request_value: ExtendedValue,
}
