//! ldap_rs - Rust implementation of the LDAPv3 BER codec
//!
//! This library decodes and encodes LDAPv3 messages (RFC 4511) from and to
//! their BER wire form. Decoding is incremental: bytes can be fed in chunks
//! of any size, and a message is returned as soon as its last byte arrives.
//!
//! # Architecture
//!
//! This library is organized as a workspace with multiple crates:
//!
//! - `ldap-core`: Error types and LDAP result codes
//! - `ldap-asn1`: BER primitives, TLV stream decoder, grammar engine and reverse encoder
//! - `ldap-codec`: LDAPMessage grammar, message model, controls and extended operations
//!
//! # Usage
//!
//! ```no_run
//! use ldap::{LdapDecoder, LdapEncoder, LdapMessage, ProtocolOp};
//!
//! let bytes = LdapEncoder::new()
//!     .encode(&LdapMessage::new(1, ProtocolOp::UnbindRequest))
//!     .unwrap();
//! let messages = LdapDecoder::new().feed(&bytes).unwrap();
//! assert_eq!(messages.len(), 1);
//! ```

// Re-export core types
pub use ldap_core::{DecoderError, EncoderError, ResultCode};

// Re-export the message layer
pub use ldap_codec::{
    CodecError, CodecResult, ControlFactory, ExtendedOperationFactory, LdapCodecService,
    LdapDecoder, LdapEncoder,
};
pub use ldap_codec::message::*;

// Re-export the BER engine
pub mod asn1 {
    pub use ldap_asn1::*;
}

// Re-export the well-known tags and OIDs
pub mod constants {
    pub use ldap_codec::constants::*;
}

// Re-export built-in control and extended operation codecs
pub mod controls {
    pub use ldap_codec::controls::*;
}

pub mod extended {
    pub use ldap_codec::extended::*;
}
