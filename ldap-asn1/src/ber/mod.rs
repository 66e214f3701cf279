//! BER (Basic Encoding Rules) building blocks
//!
//! Each ASN.1 value is encoded as a TLV (Tag-Length-Value) triplet:
//!
//! ```text
//! [Tag] [Length] [Value]
//! ```
//!
//! ## Tag Encoding
//!
//! ```text
//! Bits: 8 7 6 5 4 3 2 1
//!       C C P T T T T T
//! ```
//! - CC = Class (00=Universal, 01=Application, 10=Context, 11=Private)
//! - P = Primitive (0) or Constructed (1)
//! - TTTTT = Tag number (0-30). LDAP never needs the multi-octet form
//!   (11111), which is rejected.
//!
//! ## Length Encoding
//!
//! - **Short form** (1 byte): lengths 0-127
//! - **Long form** (2-5 bytes): `0x80 | n` followed by `n` (1-4) big-endian
//!   length octets
//! - **Indefinite form** (`0x80`): not supported, LDAP only uses definite
//!   lengths
//!
//! # Modules
//!
//! - [`types`]: tags, tag classes and length octets
//! - [`decoder`]: primitive value decoders (INTEGER, BOOLEAN, ENUMERATED, strings)
//! - [`encoder`]: the backward-writing [`Asn1Buffer`] and [`BerEncoder`]

pub mod decoder;
pub mod encoder;
pub mod types;

pub use encoder::{Asn1Buffer, BerEncoder};
pub use types::{BerTag, TagClass};
