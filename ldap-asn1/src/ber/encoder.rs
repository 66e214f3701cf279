//! BER encoder for ASN.1 structures
//!
//! Encoding runs backward: the value of a TLV is written first, then its
//! length, then its tag, each in front of what is already in the buffer. A
//! constructed TLV therefore never needs its length computed ahead of time,
//! it is simply the number of bytes its children added.
//!
//! The consequence for callers is that the children of a SEQUENCE must be
//! encoded last one first.
//!
//! # Usage Example
//!
//! ```rust
//! use ldap_asn1::ber::BerEncoder;
//!
//! let mut encoder = BerEncoder::new();
//! encoder
//!     .encode_sequence(|enc| {
//!         enc.encode_tagged_integer(0x50, 2)?;
//!         enc.encode_integer(32787)
//!     })
//!     .unwrap();
//! assert_eq!(
//!     encoder.as_bytes(),
//!     &[0x30, 0x08, 0x02, 0x03, 0x00, 0x80, 0x13, 0x50, 0x01, 0x02]
//! );
//! ```

use bytes::Bytes;

use crate::ber::types::{self, tags};
use crate::error::{EncodeResult, EncoderError};

/// Default capacity of a growable buffer
const DEFAULT_CAPACITY: usize = 1024;

/// Byte buffer filled from its end toward its start
///
/// `pos` is the number of bytes written; they occupy the last `pos` bytes of
/// the backing vector. A growable buffer doubles its capacity (or more if a
/// single write needs it) and moves the written bytes to the end of the new
/// storage. A fixed buffer refuses to grow.
#[derive(Debug, Clone)]
pub struct Asn1Buffer {
    buffer: Vec<u8>,
    pos: usize,
    fixed: bool,
}

impl Asn1Buffer {
    /// Create a growable buffer
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CAPACITY)
    }

    /// Create a growable buffer with an initial capacity
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: vec![0; capacity],
            pos: 0,
            fixed: false,
        }
    }

    /// Create a buffer that never grows beyond `capacity`
    pub fn with_fixed_capacity(capacity: usize) -> Self {
        Self {
            buffer: vec![0; capacity],
            pos: 0,
            fixed: true,
        }
    }

    /// Number of bytes written so far
    pub fn pos(&self) -> usize {
        self.pos
    }

    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_fixed(&self) -> bool {
        self.fixed
    }

    /// Write one byte in front of the current content
    pub fn put(&mut self, byte: u8) -> EncodeResult<()> {
        self.reserve(1)?;
        let start = self.start() - 1;
        self.buffer[start] = byte;
        self.pos += 1;
        Ok(())
    }

    /// Write `bytes` in front of the current content, keeping their order
    pub fn put_slice(&mut self, bytes: &[u8]) -> EncodeResult<()> {
        if bytes.is_empty() {
            return Ok(());
        }
        self.reserve(bytes.len())?;
        let end = self.start();
        self.buffer[end - bytes.len()..end].copy_from_slice(bytes);
        self.pos += bytes.len();
        Ok(())
    }

    /// Written bytes, in wire order
    pub fn bytes(&self) -> &[u8] {
        &self.buffer[self.start()..]
    }

    /// Consume the buffer and return the written bytes without copying them
    pub fn into_bytes(self) -> Bytes {
        let start = self.start();
        Bytes::from(self.buffer).slice(start..)
    }

    /// Forget the written bytes, keeping the storage
    pub fn clear(&mut self) {
        self.pos = 0;
    }

    fn start(&self) -> usize {
        self.buffer.len() - self.pos
    }

    fn reserve(&mut self, needed: usize) -> EncodeResult<()> {
        let available = self.buffer.len() - self.pos;
        if needed <= available {
            return Ok(());
        }

        if self.fixed {
            return Err(EncoderError::BufferOverflow { needed, available });
        }

        let new_capacity = (self.buffer.len() * 2).max(self.pos + needed);
        let mut grown = vec![0; new_capacity];
        grown[new_capacity - self.pos..].copy_from_slice(self.bytes());
        self.buffer = grown;
        Ok(())
    }
}

impl Default for Asn1Buffer {
    fn default() -> Self {
        Self::new()
    }
}

/// Minimal two's complement encoding of an `i32`
///
/// Returns the big-endian octets and the number of significant ones; they are
/// the last `len` octets of the array.
pub fn encode_int_value(value: i32) -> ([u8; 4], usize) {
    let bytes = value.to_be_bytes();

    let mut start = 0;
    if value >= 0 {
        while start < 3 && bytes[start] == 0x00 && bytes[start + 1] & 0x80 == 0 {
            start += 1;
        }
    } else {
        while start < 3 && bytes[start] == 0xFF && bytes[start + 1] & 0x80 != 0 {
            start += 1;
        }
    }

    (bytes, 4 - start)
}

/// BER encoder for ASN.1 structures
///
/// Thin typed layer over an [`Asn1Buffer`]. Every method prepends one
/// complete TLV (or part of one for `encode_tag`/`encode_length`).
#[derive(Debug, Clone, Default)]
pub struct BerEncoder {
    buffer: Asn1Buffer,
}

impl BerEncoder {
    /// Create a new BER encoder
    pub fn new() -> Self {
        Self {
            buffer: Asn1Buffer::new(),
        }
    }

    /// Create a new BER encoder with initial capacity
    ///
    /// # Arguments
    /// * `capacity` - Initial buffer capacity in bytes
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: Asn1Buffer::with_capacity(capacity),
        }
    }

    /// Create a BER encoder whose output can not exceed `capacity` bytes
    pub fn with_fixed_capacity(capacity: usize) -> Self {
        Self {
            buffer: Asn1Buffer::with_fixed_capacity(capacity),
        }
    }

    pub fn encode_tag(&mut self, tag: u8) -> EncodeResult<()> {
        self.buffer.put(tag)
    }

    pub fn encode_length(&mut self, length: usize) -> EncodeResult<()> {
        self.buffer.put_slice(&types::encode_length(length)?)
    }

    /// Encode a TLV (Tag-Length-Value) triplet
    ///
    /// # Arguments
    /// * `tag` - Tag octet
    /// * `value` - Value bytes (already encoded)
    pub fn encode_tlv(&mut self, tag: u8, value: &[u8]) -> EncodeResult<()> {
        self.buffer.put_slice(value)?;
        self.encode_length(value.len())?;
        self.encode_tag(tag)
    }

    /// Encode a constructed TLV whose content is produced by `f`
    ///
    /// `f` must encode the children last one first.
    pub fn encode_tlv_with<F>(&mut self, tag: u8, f: F) -> EncodeResult<()>
    where
        F: FnOnce(&mut Self) -> EncodeResult<()>,
    {
        let start = self.buffer.pos();
        f(self)?;
        let length = self.buffer.pos() - start;
        self.encode_length(length)?;
        self.encode_tag(tag)
    }

    /// Encode a SEQUENCE
    pub fn encode_sequence<F>(&mut self, f: F) -> EncodeResult<()>
    where
        F: FnOnce(&mut Self) -> EncodeResult<()>,
    {
        self.encode_tlv_with(tags::SEQUENCE, f)
    }

    /// Encode a SET
    pub fn encode_set<F>(&mut self, f: F) -> EncodeResult<()>
    where
        F: FnOnce(&mut Self) -> EncodeResult<()>,
    {
        self.encode_tlv_with(tags::SET, f)
    }

    /// Encode an INTEGER with its minimal two's complement value
    pub fn encode_integer(&mut self, value: i32) -> EncodeResult<()> {
        self.encode_tagged_integer(tags::INTEGER, value)
    }

    /// Encode an INTEGER under an implicit tag
    pub fn encode_tagged_integer(&mut self, tag: u8, value: i32) -> EncodeResult<()> {
        let (bytes, len) = encode_int_value(value);
        self.encode_tlv(tag, &bytes[4 - len..])
    }

    /// Encode an ENUMERATED
    pub fn encode_enumerated(&mut self, value: i32) -> EncodeResult<()> {
        self.encode_tagged_integer(tags::ENUMERATED, value)
    }

    /// Encode a BOOLEAN, TRUE as `0xFF`
    pub fn encode_boolean(&mut self, value: bool) -> EncodeResult<()> {
        self.encode_boolean_with_tag(tags::BOOLEAN, value)
    }

    /// Encode a BOOLEAN under an implicit tag
    pub fn encode_boolean_with_tag(&mut self, tag: u8, value: bool) -> EncodeResult<()> {
        self.encode_tlv(tag, &[if value { 0xFF } else { 0x00 }])
    }

    /// Encode an OCTET STRING
    pub fn encode_octet_string(&mut self, value: &[u8]) -> EncodeResult<()> {
        self.encode_tlv(tags::OCTET_STRING, value)
    }

    /// Encode an OCTET STRING under an implicit tag
    pub fn encode_octet_string_with_tag(&mut self, tag: u8, value: &[u8]) -> EncodeResult<()> {
        self.encode_tlv(tag, value)
    }

    /// Encode a NULL
    pub fn encode_null(&mut self) -> EncodeResult<()> {
        self.encode_tlv(tags::NULL, &[])
    }

    /// Number of bytes encoded so far
    pub fn position(&self) -> usize {
        self.buffer.pos()
    }

    /// Encoded bytes, in wire order
    pub fn as_bytes(&self) -> &[u8] {
        self.buffer.bytes()
    }

    /// Get the encoded bytes
    pub fn into_bytes(self) -> Bytes {
        self.buffer.into_bytes()
    }

    /// Forget everything encoded so far
    pub fn clear(&mut self) {
        self.buffer.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_writes_backward() {
        let mut buffer = Asn1Buffer::with_capacity(8);
        buffer.put(0x03).unwrap();
        buffer.put_slice(&[0x01, 0x02]).unwrap();
        buffer.put(0x00).unwrap();
        assert_eq!(buffer.pos(), 4);
        assert_eq!(buffer.bytes(), &[0x00, 0x01, 0x02, 0x03]);
    }

    #[test]
    fn test_buffer_grows_keeping_content() {
        let mut buffer = Asn1Buffer::with_capacity(2);
        buffer.put_slice(&[0x05, 0x06]).unwrap();
        buffer.put(0x04).unwrap();
        assert_eq!(buffer.capacity(), 4);
        buffer.put_slice(&[0x00, 0x01, 0x02, 0x03]).unwrap();
        assert_eq!(buffer.capacity(), 8);
        assert_eq!(buffer.bytes(), &[0, 1, 2, 3, 4, 5, 6]);
        assert_eq!(buffer.into_bytes().as_ref(), &[0, 1, 2, 3, 4, 5, 6]);
    }

    #[test]
    fn test_buffer_grows_from_zero_capacity() {
        let mut buffer = Asn1Buffer::with_capacity(0);
        buffer.put(0x01).unwrap();
        assert_eq!(buffer.bytes(), &[0x01]);
    }

    #[test]
    fn test_fixed_buffer_overflow() {
        let mut buffer = Asn1Buffer::with_fixed_capacity(3);
        buffer.put_slice(&[1, 2]).unwrap();
        assert_eq!(
            buffer.put_slice(&[3, 4]),
            Err(EncoderError::BufferOverflow {
                needed: 2,
                available: 1
            })
        );
        buffer.put(0).unwrap();
        assert_eq!(buffer.bytes(), &[0, 1, 2]);
        assert!(buffer.put(9).is_err());
    }

    #[test]
    fn test_clear() {
        let mut buffer = Asn1Buffer::with_capacity(4);
        buffer.put_slice(&[1, 2, 3]).unwrap();
        buffer.clear();
        assert_eq!(buffer.pos(), 0);
        assert!(buffer.bytes().is_empty());
    }

    #[test]
    fn test_encode_int_value_minimal() {
        let cases: &[(i32, &[u8])] = &[
            (0, &[0x00]),
            (1, &[0x01]),
            (-1, &[0xFF]),
            (127, &[0x7F]),
            (128, &[0x00, 0x80]),
            (-128, &[0x80]),
            (-129, &[0xFF, 0x7F]),
            (256, &[0x01, 0x00]),
            (32787, &[0x00, 0x80, 0x13]),
            (i32::MAX, &[0x7F, 0xFF, 0xFF, 0xFF]),
            (i32::MIN, &[0x80, 0x00, 0x00, 0x00]),
        ];

        for (value, expected) in cases {
            let (bytes, len) = encode_int_value(*value);
            assert_eq!(&bytes[4 - len..], *expected, "value {}", value);
        }
    }

    #[test]
    fn test_encode_primitives() {
        let mut encoder = BerEncoder::new();
        encoder.encode_boolean(true).unwrap();
        assert_eq!(encoder.as_bytes(), &[0x01, 0x01, 0xFF]);

        encoder.clear();
        encoder.encode_enumerated(2).unwrap();
        assert_eq!(encoder.as_bytes(), &[0x0A, 0x01, 0x02]);

        encoder.clear();
        encoder.encode_octet_string(b"abc").unwrap();
        assert_eq!(encoder.as_bytes(), &[0x04, 0x03, b'a', b'b', b'c']);

        encoder.clear();
        encoder.encode_null().unwrap();
        assert_eq!(encoder.as_bytes(), &[0x05, 0x00]);
    }

    #[test]
    fn test_encode_nested_constructed() {
        let mut encoder = BerEncoder::with_capacity(4);
        encoder
            .encode_sequence(|enc| {
                enc.encode_set(|enc| enc.encode_octet_string(b"x"))?;
                enc.encode_integer(5)
            })
            .unwrap();
        assert_eq!(
            encoder.as_bytes(),
            &[0x30, 0x08, 0x02, 0x01, 0x05, 0x31, 0x03, 0x04, 0x01, b'x']
        );
    }

    #[test]
    fn test_encode_long_length() {
        let value = vec![0xAB; 300];
        let mut encoder = BerEncoder::new();
        encoder.encode_octet_string(&value).unwrap();
        let bytes = encoder.into_bytes();
        assert_eq!(&bytes[..4], &[0x04, 0x82, 0x01, 0x2C]);
        assert_eq!(bytes.len(), 304);
    }

    #[test]
    fn test_fixed_encoder_overflow() {
        let mut encoder = BerEncoder::with_fixed_capacity(4);
        assert!(matches!(
            encoder.encode_octet_string(b"abcd"),
            Err(EncoderError::BufferOverflow { .. })
        ));
    }
}
