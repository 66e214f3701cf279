//! BER primitive value decoders
//!
//! These functions work on the value octets of a primitive TLV, once the
//! stream decoder has assembled them. They never see the tag or the length.
//!
//! # Usage Example
//!
//! ```rust
//! use ldap_asn1::ber::decoder::decode_int_in_range;
//!
//! let message_id = decode_int_in_range(&[0x00, 0x80, 0x13], 0, i32::MAX).unwrap();
//! assert_eq!(message_id, 32787);
//! ```

use crate::config::BooleanPolicy;
use crate::error::{DecodeResult, DecoderError};
use crate::tlv::Tlv;

/// Decode an INTEGER value into an `i32`
///
/// The value is big-endian two's complement. Up to four octets are sign
/// extended into the result. A fifth octet is only legal as a leading `0x00`
/// in front of an octet with its high bit set, which means the value is above
/// `i32::MAX`.
///
/// # Error Handling
/// Returns error if:
/// - The value is empty
/// - Five octets start with a redundant `0x00`/`0xFF`
/// - The value does not fit in an `i32`
pub fn decode_int(value: &[u8]) -> DecodeResult<i32> {
    match value.len() {
        0 => Err(DecoderError::EmptyInteger),
        1..=4 => {
            let mut result: i32 = if value[0] & 0x80 != 0 { -1 } else { 0 };
            for &byte in value {
                result = (result << 8) | byte as i32;
            }
            Ok(result)
        }
        5 => {
            let redundant = (value[0] == 0x00 && value[1] & 0x80 == 0)
                || (value[0] == 0xFF && value[1] & 0x80 != 0);
            if redundant {
                Err(DecoderError::InvalidInteger(format!(
                    "redundant leading octet 0x{:02X} in a 5 octets INTEGER",
                    value[0]
                )))
            } else {
                Err(DecoderError::IntegerOverflow(5))
            }
        }
        len => Err(DecoderError::IntegerOverflow(len)),
    }
}

/// Decode an INTEGER value and check it is within `[min, max]`
pub fn decode_int_in_range(value: &[u8], min: i32, max: i32) -> DecodeResult<i32> {
    let result = decode_int(value)?;

    if result < min || result > max {
        return Err(DecoderError::IntegerOutOfRange {
            value: result as i64,
            min: min as i64,
            max: max as i64,
        });
    }

    Ok(result)
}

/// Decode an ENUMERATED value
///
/// ENUMERATED shares the INTEGER encoding; `[min, max]` are the valid
/// enumeration values.
pub fn decode_enumerated(value: &[u8], min: i32, max: i32) -> DecodeResult<i32> {
    decode_int_in_range(value, min, max)
}

/// Decode a BOOLEAN value
///
/// `0x00` is FALSE and `0xFF` TRUE. Any other non-zero octet is handled
/// according to `policy`.
///
/// # Error Handling
/// Returns error if the value is not exactly one octet long, or if it is non
/// canonical under [`BooleanPolicy::Strict`].
pub fn decode_boolean(value: &[u8], policy: BooleanPolicy) -> DecodeResult<bool> {
    if value.len() != 1 {
        return Err(DecoderError::InvalidBoolean(value.len()));
    }

    match value[0] {
        0x00 => Ok(false),
        0xFF => Ok(true),
        other => match policy {
            BooleanPolicy::Lenient => {
                log::warn!("Accepting non canonical BOOLEAN value 0x{:02X} as TRUE", other);
                Ok(true)
            }
            BooleanPolicy::Strict => Err(DecoderError::NonCanonicalBoolean(other)),
        },
    }
}

/// Decode a UTF-8 string value (LDAPString)
pub fn decode_utf8(value: &[u8]) -> DecodeResult<String> {
    String::from_utf8(value.to_vec())
        .map_err(|e| DecoderError::invalid_value(format!("Invalid UTF-8 string: {}", e)))
}

/// Decode complete length octets
///
/// # Returns
/// Returns `(length, octets_consumed)`
///
/// # Error Handling
/// Returns error if the buffer is too short or the encoding is not supported.
pub fn decode_length(data: &[u8]) -> DecodeResult<(usize, usize)> {
    let Some((&first, rest)) = data.split_first() else {
        return Err(DecoderError::TruncatedPdu);
    };

    let mut tlv = Tlv::new(0, 0);
    tlv.read_first_length_byte(first)?;

    let following = tlv.length_nb_bytes() - 1;
    if rest.len() < following {
        return Err(DecoderError::TruncatedPdu);
    }
    for &byte in &rest[..following] {
        tlv.read_length_byte(byte);
    }

    Ok((tlv.length(), tlv.length_nb_bytes()))
}
