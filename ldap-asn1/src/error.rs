//! Error types of the BER engine (shared with the rest of the workspace)

pub use ldap_core::error::{DecodeResult, DecoderError, EncodeResult, EncoderError};
