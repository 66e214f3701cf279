//! LDAPv3 tag octets and well-known OIDs (RFC 4511)

/// Application tags of the protocolOp CHOICE
pub mod op_tags {
    pub const BIND_REQUEST: u8 = 0x60;
    pub const BIND_RESPONSE: u8 = 0x61;
    pub const UNBIND_REQUEST: u8 = 0x42;
    pub const SEARCH_REQUEST: u8 = 0x63;
    pub const SEARCH_RESULT_ENTRY: u8 = 0x64;
    pub const SEARCH_RESULT_DONE: u8 = 0x65;
    pub const MODIFY_REQUEST: u8 = 0x66;
    pub const MODIFY_RESPONSE: u8 = 0x67;
    pub const ADD_REQUEST: u8 = 0x68;
    pub const ADD_RESPONSE: u8 = 0x69;
    pub const DEL_REQUEST: u8 = 0x4A;
    pub const DEL_RESPONSE: u8 = 0x6B;
    pub const MODIFY_DN_REQUEST: u8 = 0x6C;
    pub const MODIFY_DN_RESPONSE: u8 = 0x6D;
    pub const COMPARE_REQUEST: u8 = 0x6E;
    pub const COMPARE_RESPONSE: u8 = 0x6F;
    pub const ABANDON_REQUEST: u8 = 0x50;
    pub const SEARCH_RESULT_REFERENCE: u8 = 0x73;
    pub const EXTENDED_REQUEST: u8 = 0x77;
    pub const EXTENDED_RESPONSE: u8 = 0x78;
    pub const INTERMEDIATE_RESPONSE: u8 = 0x79;
}

/// Context tags used inside the operations
pub mod context_tags {
    /// `controls [0]` of LDAPMessage
    pub const CONTROLS: u8 = 0xA0;
    /// `simple [0]` authentication
    pub const SIMPLE_AUTH: u8 = 0x80;
    /// `sasl [3]` authentication
    pub const SASL_AUTH: u8 = 0xA3;
    /// `referral [3]` of LDAPResult
    pub const REFERRAL: u8 = 0xA3;
    /// `serverSaslCreds [7]` of BindResponse
    pub const SERVER_SASL_CREDS: u8 = 0x87;
    /// `newSuperior [0]` of ModifyDNRequest
    pub const NEW_SUPERIOR: u8 = 0x80;
    /// `requestName [0]` of ExtendedRequest
    pub const EXTENDED_REQUEST_NAME: u8 = 0x80;
    /// `requestValue [1]` of ExtendedRequest
    pub const EXTENDED_REQUEST_VALUE: u8 = 0x81;
    /// `responseName [10]` of ExtendedResponse
    pub const EXTENDED_RESPONSE_NAME: u8 = 0x8A;
    /// `responseValue [11]` of ExtendedResponse
    pub const EXTENDED_RESPONSE_VALUE: u8 = 0x8B;
    /// `responseName [0]` of IntermediateResponse
    pub const INTERMEDIATE_RESPONSE_NAME: u8 = 0x80;
    /// `responseValue [1]` of IntermediateResponse
    pub const INTERMEDIATE_RESPONSE_VALUE: u8 = 0x81;
}

/// Tags of the Filter CHOICE and of its components
pub mod filter_tags {
    pub const AND: u8 = 0xA0;
    pub const OR: u8 = 0xA1;
    pub const NOT: u8 = 0xA2;
    pub const EQUALITY_MATCH: u8 = 0xA3;
    pub const SUBSTRINGS: u8 = 0xA4;
    pub const GREATER_OR_EQUAL: u8 = 0xA5;
    pub const LESS_OR_EQUAL: u8 = 0xA6;
    pub const PRESENT: u8 = 0x87;
    pub const APPROX_MATCH: u8 = 0xA8;
    pub const EXTENSIBLE_MATCH: u8 = 0xA9;

    pub const SUBSTRING_INITIAL: u8 = 0x80;
    pub const SUBSTRING_ANY: u8 = 0x81;
    pub const SUBSTRING_FINAL: u8 = 0x82;

    pub const MATCHING_RULE: u8 = 0x81;
    pub const MATCHING_TYPE: u8 = 0x82;
    pub const MATCH_VALUE: u8 = 0x83;
    pub const DN_ATTRIBUTES: u8 = 0x84;
}

/// Control OIDs with a built-in factory
pub mod control_oids {
    /// Manage DSA IT (RFC 3296)
    pub const MANAGE_DSA_IT: &str = "2.16.840.1.113730.3.4.2";
    /// Simple Paged Results (RFC 2696)
    pub const PAGED_RESULTS: &str = "1.2.840.113556.1.4.319";
    /// Subentries (RFC 3672)
    pub const SUBENTRIES: &str = "1.3.6.1.4.1.4203.1.10.1";
}

/// Extended operation OIDs with a built-in factory
pub mod extended_oids {
    /// StartTLS (RFC 4511 section 4.14)
    pub const START_TLS: &str = "1.3.6.1.4.1.1466.20037";
    /// Who am I? (RFC 4532)
    pub const WHO_AM_I: &str = "1.3.6.1.4.1.4203.1.11.3";
    /// Cancel (RFC 3909)
    pub const CANCEL: &str = "1.3.6.1.1.8";
    /// Notice of Disconnection (RFC 4511 section 4.4.1)
    pub const NOTICE_OF_DISCONNECTION: &str = "1.3.6.1.4.1.1466.20036";
}

/// Highest LDAP protocol version accepted in a BindRequest
pub const MAX_PROTOCOL_VERSION: i32 = 127;

/// Highest message id (`maxInt`)
pub const MAX_MESSAGE_ID: i32 = i32::MAX;

/// Deepest filter nesting accepted by the decoder
pub const MAX_FILTER_DEPTH: usize = 256;
