//! Incremental ASN.1 BER decoding engine and reverse encoder
//!
//! This crate provides the protocol independent half of the LDAP codec:
//! a byte-resumable TLV decoder driven by grammar transition tables, the
//! primitive value decoders, and a BER encoder writing backward so that
//! constructed lengths never have to be computed up front.
//!
//! # TODO
//!
//! ## BER 解码
//! - [x] TLV 逐字节增量解码（可在任意字节处中断与恢复）
//! - [x] 短格式 / 长格式长度（最多 4 字节）
//! - [x] 嵌套长度校验（子 TLV 超出父 TLV 时报错）
//! - [x] 最大 PDU 长度限制
//! - [ ] 多字节 tag 支持
//!
//! ## BER 编码
//! - [x] 反向缓冲区编码
//! - [x] 固定容量缓冲区
//!
//! ## 语法引擎
//! - [x] (状态, tag) 转移表
//! - [x] 语义动作与可选结束
//! - [x] 构造 TLV 的内容与结束校验

pub mod ber;
pub mod config;
pub mod container;
pub mod decoder;
pub mod error;
pub mod grammar;
pub mod tlv;

pub use ber::{Asn1Buffer, BerEncoder, BerTag, TagClass};
pub use config::{BooleanPolicy, DecoderConfig, DecoderConfigBuilder};
pub use container::{Asn1Container, TlvState};
pub use decoder::{DecodeStatus, decode, decode_complete};
pub use error::{DecodeResult, DecoderError, EncodeResult, EncoderError};
pub use grammar::{Action, FollowUp, Grammar, GrammarBuilder, GrammarState, Transition};
pub use tlv::Tlv;
