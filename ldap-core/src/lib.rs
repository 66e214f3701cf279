//! Core types and utilities for the LDAP codec
//!
//! This crate provides the error taxonomy shared by the generic BER engine
//! (`ldap-asn1`) and the LDAP message layer (`ldap-codec`), together with the
//! LDAP result codes both layers need to build protocol error responses.

pub mod error;
pub mod result_code;

pub use error::{DecodeResult, DecoderError, EncodeResult, EncoderError};
pub use result_code::ResultCode;
