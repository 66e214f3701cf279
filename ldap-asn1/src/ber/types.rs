//! BER encoding types (Tag, Length, etc.)

use crate::error::{DecodeResult, DecoderError, EncodeResult, EncoderError};

/// Universal class tags used by LDAP
pub mod tags {
    pub const BOOLEAN: u8 = 0x01;
    pub const INTEGER: u8 = 0x02;
    pub const OCTET_STRING: u8 = 0x04;
    pub const NULL: u8 = 0x05;
    pub const ENUMERATED: u8 = 0x0A;
    pub const SEQUENCE: u8 = 0x30;
    pub const SET: u8 = 0x31;
}

/// Bit set in the tag octet of a constructed TLV
pub const CONSTRUCTED_FLAG: u8 = 0x20;

/// Low five bits of a tag octet set to 1 announce a multi-octet tag number
const HIGH_TAG_NUMBER: u8 = 0x1F;

/// BER Tag Class
///
/// ASN.1 defines four tag classes:
/// - **Universal**: Standard ASN.1 types (INTEGER, OCTET STRING, etc.)
/// - **Application**: Application-specific types (LDAP protocol operations)
/// - **Context-specific**: Context-dependent types (used in SEQUENCE/SET/CHOICE)
/// - **Private**: Private/implementation-specific types
///
/// # Why Keep the Class?
/// LDAP reuses small tag numbers across classes: `[APPLICATION 3]` is a
/// SearchRequest while `[3]` inside a filter is an equality match. The
/// class octet bits are what tells them apart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TagClass {
    /// Universal class (00)
    Universal = 0,
    /// Application class (01)
    Application = 1,
    /// Context-specific class (10)
    ContextSpecific = 2,
    /// Private class (11)
    Private = 3,
}

impl TagClass {
    /// Get tag class from bits 8-7 of a tag octet
    pub const fn from_tag(tag: u8) -> Self {
        match (tag >> 6) & 0x03 {
            0 => TagClass::Universal,
            1 => TagClass::Application,
            2 => TagClass::ContextSpecific,
            _ => TagClass::Private,
        }
    }

    /// Convert tag class to bits (for encoding)
    pub const fn to_bits(self) -> u8 {
        (self as u8) << 6
    }
}

/// BER Tag
///
/// A single-octet BER tag: class, constructed/primitive bit and a tag number
/// in the range 0-30. Every tag of RFC 4511 fits in this form.
///
/// ```text
/// Bits: 8 7 6 5 4 3 2 1
///       C C P T T T T T
/// ```
///
/// # Why a Single Octet?
/// Grammars are keyed by the raw tag octet, so the decoder compares one
/// byte per TLV. Multi-octet tags are rejected by [`BerTag::from_byte`].
///
/// # Optimization Considerations
/// `BerTag` is `Copy` and every constructor is `const`, so tag constants
/// cost nothing at run time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BerTag {
    class: TagClass,
    constructed: bool,
    number: u8,
}

impl BerTag {
    /// Create a new BER tag
    ///
    /// # Arguments
    /// * `class` - Tag class
    /// * `constructed` - Whether this is a constructed type
    /// * `number` - Tag number, masked to its five low bits
    pub const fn new(class: TagClass, constructed: bool, number: u8) -> Self {
        Self {
            class,
            constructed,
            number: number & 0x1F,
        }
    }

    /// Create a Universal class tag
    pub const fn universal(constructed: bool, number: u8) -> Self {
        Self::new(TagClass::Universal, constructed, number)
    }

    /// Create an Application class tag
    pub const fn application(constructed: bool, number: u8) -> Self {
        Self::new(TagClass::Application, constructed, number)
    }

    /// Create a Context-specific class tag
    pub const fn context_specific(constructed: bool, number: u8) -> Self {
        Self::new(TagClass::ContextSpecific, constructed, number)
    }

    /// Create a Private class tag
    pub const fn private(constructed: bool, number: u8) -> Self {
        Self::new(TagClass::Private, constructed, number)
    }

    /// Get tag class
    pub const fn class(&self) -> TagClass {
        self.class
    }

    /// Check if tag is constructed
    pub const fn is_constructed(&self) -> bool {
        self.constructed
    }

    /// Get tag number
    pub const fn number(&self) -> u8 {
        self.number
    }

    /// Encode tag to its single octet
    pub const fn to_byte(&self) -> u8 {
        let constructed_bit = if self.constructed { CONSTRUCTED_FLAG } else { 0x00 };
        self.class.to_bits() | constructed_bit | self.number
    }

    /// Decode tag from its octet
    ///
    /// # Error Handling
    /// Returns [`DecoderError::UnsupportedTag`] for the multi-octet form.
    pub fn from_byte(byte: u8) -> DecodeResult<Self> {
        if byte & HIGH_TAG_NUMBER == HIGH_TAG_NUMBER {
            return Err(DecoderError::UnsupportedTag(byte));
        }

        Ok(Self::new(
            TagClass::from_tag(byte),
            byte & CONSTRUCTED_FLAG != 0,
            byte & 0x1F,
        ))
    }
}

/// Largest length the decoder accepts: four long-form length octets
pub const MAX_LENGTH: usize = u32::MAX as usize;

/// Number of octets needed to encode `length` as BER length octets
///
/// 1 for lengths below 128 (short form), otherwise 1 plus the number of
/// significant big-endian octets: 2 below 256, 3 below 65536, 4 below
/// 16777216 and 5 for anything that fits in 32 bits. Lengths above
/// [`MAX_LENGTH`] are counted as 5 octets too; [`encode_length`] refuses them.
///
/// # Why Cap at Five?
/// Encoders size their output with this function before writing, and no
/// peer of ours can read more than four length octets back.
pub fn nb_bytes_for_length(length: usize) -> usize {
    if length < 0x80 {
        1
    } else {
        let length = length.min(MAX_LENGTH);
        let significant = (usize::BITS - length.leading_zeros()).div_ceil(8);
        1 + significant as usize
    }
}

/// Encode a length to its canonical BER length octets
///
/// # Error Handling
/// Returns [`EncoderError::InvalidValue`] for lengths above [`MAX_LENGTH`].
pub fn encode_length(length: usize) -> EncodeResult<Vec<u8>> {
    let length = u32::try_from(length).map_err(|_| {
        EncoderError::InvalidValue(format!(
            "Length {} does not fit in four length octets",
            length
        ))
    })?;
    Ok(encode_length_octets(length))
}

fn encode_length_octets(length: u32) -> Vec<u8> {
    if length < 0x80 {
        return vec![length as u8];
    }

    let octets = length.to_be_bytes();
    let skip = octets.iter().take_while(|&&octet| octet == 0).count();
    let mut result = Vec::with_capacity(1 + octets.len() - skip);
    result.push(0x80 | (octets.len() - skip) as u8);
    result.extend_from_slice(&octets[skip..]);
    result
}

/// Encode a signed length to BER length octets
///
/// # Why Signed?
/// Existing encodings of negative lengths take the four-octet form, and
/// this keeps them bit for bit.
///
/// A negative length always takes the full four-octet long form
/// (`0x84` followed by the two's complement octets). LDAP never produces such
/// a length; this only keeps the encoder total over `i32`.
pub fn encode_signed_length(length: i32) -> Vec<u8> {
    if length < 0 {
        let mut result = vec![0x84];
        result.extend_from_slice(&length.to_be_bytes());
        result
    } else {
        encode_length_octets(length as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ber_tag_short_form() {
        let tag = BerTag::universal(false, 2); // INTEGER tag
        assert_eq!(tag.to_byte(), tags::INTEGER);
    }

    #[test]
    fn test_ber_tag_constructed() {
        let tag = BerTag::application(true, 0); // BindRequest tag
        assert_eq!(tag.to_byte(), 0x60);
        let tag = BerTag::context_specific(true, 3);
        assert_eq!(tag.to_byte(), 0xA3);
    }

    #[test]
    fn test_ber_tag_decode() {
        let tag = BerTag::from_byte(0x4A).unwrap();
        assert_eq!(tag.class(), TagClass::Application);
        assert!(!tag.is_constructed());
        assert_eq!(tag.number(), 10);
        assert_eq!(tag.to_byte(), 0x4A);
    }

    #[test]
    fn test_ber_tag_high_tag_number_rejected() {
        assert_eq!(BerTag::from_byte(0x1F), Err(DecoderError::UnsupportedTag(0x1F)));
        assert_eq!(BerTag::from_byte(0xBF), Err(DecoderError::UnsupportedTag(0xBF)));
    }

    #[test]
    fn test_nb_bytes_for_length() {
        assert_eq!(nb_bytes_for_length(0), 1);
        assert_eq!(nb_bytes_for_length(127), 1);
        assert_eq!(nb_bytes_for_length(128), 2);
        assert_eq!(nb_bytes_for_length(255), 2);
        assert_eq!(nb_bytes_for_length(256), 3);
        assert_eq!(nb_bytes_for_length(65535), 3);
        assert_eq!(nb_bytes_for_length(65536), 4);
        assert_eq!(nb_bytes_for_length(16777215), 4);
        assert_eq!(nb_bytes_for_length(16777216), 5);
        assert_eq!(nb_bytes_for_length(u32::MAX as usize), 5);
    }

    #[test]
    #[cfg(target_pointer_width = "64")]
    fn test_length_above_four_octets() {
        assert_eq!(nb_bytes_for_length(MAX_LENGTH + 1), 5);
        assert_eq!(nb_bytes_for_length(usize::MAX), 5);
        assert!(matches!(
            encode_length(MAX_LENGTH + 1),
            Err(EncoderError::InvalidValue(_))
        ));
        assert_eq!(
            encode_length(MAX_LENGTH).unwrap(),
            vec![0x84, 0xFF, 0xFF, 0xFF, 0xFF]
        );
    }

    #[test]
    fn test_encode_length() {
        assert_eq!(encode_length(0).unwrap(), vec![0x00]);
        assert_eq!(encode_length(100).unwrap(), vec![100]);
        assert_eq!(encode_length(127).unwrap(), vec![0x7F]);
        assert_eq!(encode_length(128).unwrap(), vec![0x81, 0x80]);
        assert_eq!(encode_length(255).unwrap(), vec![0x81, 0xFF]);
        assert_eq!(encode_length(256).unwrap(), vec![0x82, 0x01, 0x00]);
        assert_eq!(encode_length(65536).unwrap(), vec![0x83, 0x01, 0x00, 0x00]);
        assert_eq!(encode_length(16777216).unwrap(), vec![0x84, 0x01, 0x00, 0x00, 0x00]);
    }

    #[test]
    fn test_encode_signed_length() {
        assert_eq!(encode_signed_length(5), vec![0x05]);
        assert_eq!(encode_signed_length(-1), vec![0x84, 0xFF, 0xFF, 0xFF, 0xFF]);
        assert_eq!(
            encode_signed_length(i32::MIN),
            vec![0x84, 0x80, 0x00, 0x00, 0x00]
        );
    }
}
