//! TLV (Tag-Length-Value) node assembled incrementally by the stream decoder

use bytes::BytesMut;

use crate::ber::types::{self, CONSTRUCTED_FLAG};
use crate::error::{DecodeResult, DecoderError, EncodeResult};

/// Maximum number of octets following the first length octet (32-bit lengths)
pub const MAX_LENGTH_OCTETS: usize = 4;

/// One TLV node of a BER stream
///
/// The length is assembled octet by octet so that a chunk boundary in the
/// middle of a long-form length can be resumed: `length_bytes_read` counts
/// the length octets consumed so far (the first octet included) and
/// `length_nb_bytes` the total, known once the first octet has been read.
///
/// For a constructed TLV, `consumed` accumulates the total size (tag, length
/// and value) of the children decoded so far. It can never exceed the
/// declared length: a child claiming more than what is left is rejected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tlv {
    id: usize,
    tag: u8,
    length: usize,
    length_nb_bytes: usize,
    length_bytes_read: usize,
    value: BytesMut,
    consumed: usize,
}

impl Tlv {
    /// Create a new TLV whose tag octet has just been read
    ///
    /// # Arguments
    /// * `id` - Identifier unique within the PDU being decoded
    /// * `tag` - Tag octet
    pub fn new(id: usize, tag: u8) -> Self {
        Self {
            id,
            tag,
            length: 0,
            length_nb_bytes: 0,
            length_bytes_read: 0,
            value: BytesMut::new(),
            consumed: 0,
        }
    }

    /// Check if a tag octet denotes a constructed TLV
    pub fn is_constructed_tag(tag: u8) -> bool {
        tag & CONSTRUCTED_FLAG != 0
    }

    /// Check if a tag octet denotes a primitive TLV
    pub fn is_primitive_tag(tag: u8) -> bool {
        !Self::is_constructed_tag(tag)
    }

    /// Number of octets used by the BER encoding of `length`
    pub fn nb_bytes_for_length(length: usize) -> usize {
        types::nb_bytes_for_length(length)
    }

    /// Canonical BER length octets of `length`
    pub fn encode_length(length: usize) -> EncodeResult<Vec<u8>> {
        types::encode_length(length)
    }

    pub fn id(&self) -> usize {
        self.id
    }

    pub fn tag(&self) -> u8 {
        self.tag
    }

    pub fn is_constructed(&self) -> bool {
        Self::is_constructed_tag(self.tag)
    }

    /// Declared length of the value
    pub fn length(&self) -> usize {
        self.length
    }

    pub fn length_nb_bytes(&self) -> usize {
        self.length_nb_bytes
    }

    pub fn length_bytes_read(&self) -> usize {
        self.length_bytes_read
    }

    /// Raw value octets read so far (always empty for a constructed TLV)
    pub fn value(&self) -> &[u8] {
        &self.value
    }

    /// Take the value octets out of the TLV
    pub fn take_value(&mut self) -> BytesMut {
        std::mem::take(&mut self.value)
    }

    /// Total size of the TLV: tag, length octets and value
    pub fn size(&self) -> usize {
        1 + self.length_nb_bytes + self.length
    }

    /// Bytes of the declared length not yet claimed by children
    pub fn remaining(&self) -> usize {
        self.length - self.consumed
    }

    /// Bytes of the declared length already claimed by children
    pub fn consumed(&self) -> usize {
        self.consumed
    }

    /// Whether all the length octets have been read
    pub fn is_length_complete(&self) -> bool {
        self.length_nb_bytes != 0 && self.length_bytes_read == self.length_nb_bytes
    }

    /// Whether all the value octets of a primitive TLV have been read
    pub fn is_value_complete(&self) -> bool {
        self.value.len() == self.length
    }

    /// Number of value octets still to be read
    pub fn missing_value_bytes(&self) -> usize {
        self.length - self.value.len()
    }

    /// Process the first length octet
    ///
    /// Short form sets the length right away; long form announces how many
    /// octets follow, they are then fed through [`Tlv::read_length_byte`].
    ///
    /// # Error Handling
    /// Returns error for the indefinite form (`0x80`) and for long forms of
    /// more than four octets.
    pub fn read_first_length_byte(&mut self, byte: u8) -> DecodeResult<()> {
        if byte & 0x80 == 0 {
            self.length = byte as usize;
            self.length_nb_bytes = 1;
            self.length_bytes_read = 1;
            return Ok(());
        }

        let num_octets = (byte & 0x7F) as usize;
        if num_octets == 0 {
            return Err(DecoderError::IndefiniteLength);
        }
        if num_octets > MAX_LENGTH_OCTETS {
            return Err(DecoderError::LengthTooLong(num_octets));
        }

        self.length = 0;
        self.length_nb_bytes = num_octets + 1;
        self.length_bytes_read = 1;
        Ok(())
    }

    /// Process one of the octets following a long-form first length octet
    ///
    /// # Returns
    /// `true` once the length is complete
    pub fn read_length_byte(&mut self, byte: u8) -> bool {
        debug_assert!(self.length_bytes_read < self.length_nb_bytes);
        self.length = (self.length << 8) | byte as usize;
        self.length_bytes_read += 1;
        self.is_length_complete()
    }

    /// Append value octets
    pub fn append_value(&mut self, bytes: &[u8]) {
        self.value.extend_from_slice(bytes);
    }

    /// Account for a child of `increment` bytes in this constructed TLV
    ///
    /// # Error Handling
    /// Returns [`DecoderError::ExpectedLengthExceeded`] if the child does not
    /// fit in what is left of the declared length.
    pub fn add_length(&mut self, increment: usize) -> DecodeResult<()> {
        let remaining = self.remaining();
        if increment > remaining {
            return Err(DecoderError::ExpectedLengthExceeded {
                expected: remaining,
                actual: increment,
            });
        }
        self.consumed += increment;
        Ok(())
    }

    /// Clear the node so it can be reused for another TLV
    pub fn reset(&mut self) {
        self.id = 0;
        self.tag = 0;
        self.length = 0;
        self.length_nb_bytes = 0;
        self.length_bytes_read = 0;
        self.value.clear();
        self.consumed = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read_length(octets: &[u8]) -> DecodeResult<Tlv> {
        let mut tlv = Tlv::new(1, 0x04);
        tlv.read_first_length_byte(octets[0])?;
        for &byte in &octets[1..] {
            tlv.read_length_byte(byte);
        }
        Ok(tlv)
    }

    #[test]
    fn test_constructed_bit() {
        assert!(Tlv::is_constructed_tag(0x30));
        assert!(Tlv::is_constructed_tag(0xA0));
        assert!(Tlv::is_primitive_tag(0x04));
        assert!(Tlv::is_primitive_tag(0x80));
    }

    #[test]
    fn test_short_form_length() {
        let tlv = read_length(&[0x05]).unwrap();
        assert!(tlv.is_length_complete());
        assert_eq!(tlv.length(), 5);
        assert_eq!(tlv.length_nb_bytes(), 1);
        assert_eq!(tlv.size(), 7);
    }

    #[test]
    fn test_long_form_length_resumes_octet_by_octet() {
        let mut tlv = Tlv::new(1, 0x04);
        tlv.read_first_length_byte(0x82).unwrap();
        assert!(!tlv.is_length_complete());
        assert_eq!(tlv.length_nb_bytes(), 3);
        assert_eq!(tlv.length_bytes_read(), 1);

        assert!(!tlv.read_length_byte(0x01));
        assert_eq!(tlv.length_bytes_read(), 2);
        assert!(tlv.read_length_byte(0x00));
        assert_eq!(tlv.length(), 256);
        assert_eq!(tlv.size(), 1 + 3 + 256);
    }

    #[test]
    fn test_length_round_trip() {
        for length in [0usize, 1, 127, 128, 255, 256, 65535, 65536, 16777215, 16777216] {
            let encoded = Tlv::encode_length(length).unwrap();
            assert_eq!(encoded.len(), Tlv::nb_bytes_for_length(length));
            let tlv = read_length(&encoded).unwrap();
            assert_eq!(tlv.length(), length);
            assert_eq!(tlv.length_nb_bytes(), encoded.len());
        }
    }

    #[test]
    fn test_indefinite_length_rejected() {
        assert_eq!(read_length(&[0x80]), Err(DecoderError::IndefiniteLength));
    }

    #[test]
    fn test_too_many_length_octets_rejected() {
        assert_eq!(
            read_length(&[0x85, 1, 2, 3, 4, 5]),
            Err(DecoderError::LengthTooLong(5))
        );
    }

    #[test]
    fn test_add_length_overrun() {
        let mut tlv = read_length(&[0x06]).unwrap();
        tlv.add_length(3).unwrap();
        assert_eq!(tlv.remaining(), 3);
        tlv.add_length(3).unwrap();
        assert_eq!(tlv.remaining(), 0);
        assert_eq!(
            tlv.add_length(1),
            Err(DecoderError::ExpectedLengthExceeded {
                expected: 0,
                actual: 1
            })
        );
    }

    #[test]
    fn test_value_accumulation() {
        let mut tlv = read_length(&[0x04]).unwrap();
        tlv.append_value(&[1, 2]);
        assert_eq!(tlv.missing_value_bytes(), 2);
        assert!(!tlv.is_value_complete());
        tlv.append_value(&[3, 4]);
        assert!(tlv.is_value_complete());
        assert_eq!(tlv.value(), &[1, 2, 3, 4]);
    }

    #[test]
    fn test_reset() {
        let mut tlv = read_length(&[0x02]).unwrap();
        tlv.append_value(&[1, 2]);
        tlv.reset();
        assert_eq!(tlv.length(), 0);
        assert!(tlv.value().is_empty());
        assert!(!tlv.is_length_complete());
    }
}
