//! LDAPv3 message codec
//!
//! This crate implements the LDAP message layer (RFC 4511) on top of the
//! `ldap-asn1` BER engine: the LDAPMessage grammar, the message model, the
//! reverse encoder and the pluggable control and extended operation codecs.
//!
//! # Usage
//!
//! ```ignore
//! use ldap_codec::{LdapDecoder, LdapEncoder};
//!
//! let mut decoder = LdapDecoder::new();
//! for message in decoder.feed(&received)? {
//!     let bytes = LdapEncoder::new().encode(&message)?;
//! }
//! ```
//!
//! # Implementation Status
//!
//! ## ✅ 已完成
//! - 全部 LDAPv3 协议操作的解码与编码
//! - 过滤器（含嵌套 and/or/not、子串、可扩展匹配）
//! - 控件：ManageDsaIT、分页结果、Subentries
//! - 扩展操作：StartTLS、Who am I?、Cancel
//! - 可返回给对端的错误响应（ResponseCarrying）
//!
//! ## 📋 待实现
//! - DN 的完整语法解析（目前仅做语法检查）

pub mod codec;
pub mod constants;
pub mod container;
pub mod controls;
pub mod decoder;
pub mod encoder;
pub mod error;
pub mod extended;
pub mod grammar;
pub mod message;
pub mod validation;

pub use codec::LdapCodecService;
pub use container::{LdapMessageContainer, LdapMessageContext};
pub use controls::ControlFactory;
pub use decoder::LdapDecoder;
pub use encoder::LdapEncoder;
pub use error::{CodecError, CodecResult};
pub use extended::ExtendedOperationFactory;
pub use message::{
    AddRequest, AttributeValueAssertion, BindAuthentication, BindRequest, BindResponse, Change,
    CompareRequest, Control, ControlValue, DerefAliases, ExtendedRequest, ExtendedResponse,
    ExtendedValue, Filter, IntermediateResponse, LdapMessage, LdapResult, MatchingRuleAssertion,
    MessageType, ModifyDnRequest, ModifyOperation, ModifyRequest, PartialAttribute, ProtocolOp,
    SearchRequest, SearchResultEntry, SearchScope, SubstringFilter,
};
