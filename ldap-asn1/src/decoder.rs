//! Incremental BER stream decoder
//!
//! [`decode`] consumes as many bytes as available from a [`Buf`], advancing
//! the container byte by byte through the TLV states and firing the grammar
//! each time a TLV is ready. It returns as soon as the input is exhausted or
//! a PDU is complete, leaving any byte after the PDU in the buffer.
//!
//! Constructed TLVs are never recursed into: their header is reported to the
//! grammar and they are pushed on the container's open TLV stack. Each child
//! is charged, header and value, to the innermost open TLV as soon as its
//! length is known, so a child overrunning its parent is detected before any
//! of its value is read.
//!
//! An exhausted TLV stays open until the grammar has seen its last child,
//! then it is closed and checked against the ends its grammar declares.
//!
//! # Usage Example
//!
//! ```rust,ignore
//! let mut container = Asn1Container::new(&LDAP_MESSAGE_GRAMMAR);
//! while decode(&mut socket_buffer, &mut container)? == DecodeStatus::NeedMoreData {
//!     socket_buffer = read_more()?;
//! }
//! let message = container.take_value();
//! ```

use bytes::Buf;

use crate::ber::types::BerTag;
use crate::container::{Asn1Container, TlvState};
use crate::error::{DecodeResult, DecoderError};
use crate::grammar::GrammarState;
use crate::tlv::Tlv;

/// Outcome of a [`decode`] call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecodeStatus {
    /// The input was exhausted before the end of the PDU
    NeedMoreData,
    /// A PDU is complete; the container holds its value
    PduDecoded,
}

/// Decode bytes from `stream` into `container`
///
/// # Error Handling
/// Any error marks the container as failed; feeding it again returns
/// [`DecoderError::ContainerFailed`] until it is reset.
pub fn decode<B, S, T>(stream: &mut B, container: &mut Asn1Container<S, T>) -> DecodeResult<DecodeStatus>
where
    B: Buf,
    S: GrammarState,
    T: 'static,
{
    if container.is_failed() {
        return Err(DecoderError::ContainerFailed);
    }

    match decode_tlvs(stream, container) {
        Ok(status) => Ok(status),
        Err(e) => {
            log::error!(
                "{}: decoding failed after {} bytes in state {:?}: {}",
                container.grammar().name(),
                container.decoded_bytes(),
                container.state(),
                e
            );
            container.mark_failed();
            Err(e)
        }
    }
}

/// Decode exactly one PDU from a complete buffer
///
/// # Error Handling
/// Returns [`DecoderError::TruncatedPdu`] if the buffer ends before the PDU
/// and [`DecoderError::TrailingBytes`] if bytes are left after it.
pub fn decode_complete<S, T>(data: &[u8], container: &mut Asn1Container<S, T>) -> DecodeResult<()>
where
    S: GrammarState,
    T: 'static,
{
    let mut stream = data;
    let result = match decode(&mut stream, container)? {
        DecodeStatus::NeedMoreData => Err(DecoderError::TruncatedPdu),
        DecodeStatus::PduDecoded if stream.has_remaining() => {
            Err(DecoderError::TrailingBytes(stream.remaining()))
        }
        DecodeStatus::PduDecoded => Ok(()),
    };

    if result.is_err() {
        container.mark_failed();
    }
    result
}

fn decode_tlvs<B, S, T>(stream: &mut B, container: &mut Asn1Container<S, T>) -> DecodeResult<DecodeStatus>
where
    B: Buf,
    S: GrammarState,
    T: 'static,
{
    loop {
        match container.tlv_state() {
            TlvState::TagStart => {
                if !stream.has_remaining() {
                    return Ok(DecodeStatus::NeedMoreData);
                }
                let tag = stream.get_u8();
                container.add_decoded_bytes(1);
                BerTag::from_byte(tag)?;

                let id = container.allocate_tlv_id();
                container.set_current_tlv(Tlv::new(id, tag));
                container.set_tlv_state(TlvState::LengthStart);
            }
            TlvState::LengthStart => {
                if !stream.has_remaining() {
                    return Ok(DecodeStatus::NeedMoreData);
                }
                let byte = stream.get_u8();
                container.add_decoded_bytes(1);

                let tlv = current_tlv_mut(container)?;
                tlv.read_first_length_byte(byte)?;
                let next = if tlv.is_length_complete() {
                    TlvState::LengthEnd
                } else {
                    TlvState::LengthPending
                };
                container.set_tlv_state(next);
            }
            TlvState::LengthPending => {
                let mut complete = false;
                let mut read = 0;
                {
                    let tlv = current_tlv_mut(container)?;
                    while !complete && stream.has_remaining() {
                        complete = tlv.read_length_byte(stream.get_u8());
                        read += 1;
                    }
                }
                container.add_decoded_bytes(read);

                if !complete {
                    return Ok(DecodeStatus::NeedMoreData);
                }
                container.set_tlv_state(TlvState::LengthEnd);
            }
            TlvState::LengthEnd => end_of_length(container)?,
            TlvState::ValueStart | TlvState::ValuePending => {
                let mut read = 0;
                let complete = {
                    let tlv = current_tlv_mut(container)?;
                    while tlv.missing_value_bytes() > 0 && stream.has_remaining() {
                        let chunk = stream.chunk();
                        let count = chunk.len().min(tlv.missing_value_bytes());
                        tlv.append_value(&chunk[..count]);
                        stream.advance(count);
                        read += count;
                    }
                    tlv.is_value_complete()
                };
                container.add_decoded_bytes(read);

                if !complete {
                    container.set_tlv_state(TlvState::ValuePending);
                    return Ok(DecodeStatus::NeedMoreData);
                }
                container.set_tlv_state(TlvState::TlvDone);
            }
            TlvState::TlvDone => {
                let grammar = container.grammar();
                grammar.execute_action(container)?;
                container.clear_current_tlv();
                close_exhausted(container)?;

                if !container.open_tlvs().is_empty() {
                    container.set_tlv_state(TlvState::TagStart);
                    continue;
                }

                if !container.grammar_end_allowed() {
                    return Err(DecoderError::PduIncomplete {
                        grammar: grammar.name(),
                        state: format!("{:?}", container.state()),
                    });
                }

                log::trace!(
                    "{}: PDU decoded, {} bytes",
                    grammar.name(),
                    container.decoded_bytes()
                );
                container.set_tlv_state(TlvState::PduDecoded);
                return Ok(DecodeStatus::PduDecoded);
            }
            TlvState::PduDecoded => return Ok(DecodeStatus::PduDecoded),
        }
    }
}

/// Length complete: check it, update the open TLV stack, pick the next state
fn end_of_length<S, T>(container: &mut Asn1Container<S, T>) -> DecodeResult<()>
where
    S: GrammarState,
    T: 'static,
{
    let max = container.config().max_pdu_size;
    let tlv = current_tlv_mut(container)?.clone();

    if tlv.length() > max {
        return Err(DecoderError::LengthAboveMaximum {
            length: tlv.length(),
            max,
        });
    }

    log::trace!(
        "{}: TLV #{} tag 0x{:02X} length {}, {} open TLVs",
        container.grammar().name(),
        tlv.id(),
        tlv.tag(),
        tlv.length(),
        container.open_tlvs().len()
    );

    if let Some(parent) = container.parent_tlv_mut() {
        parent.add_length(tlv.size())?;
    }

    let next = if tlv.is_constructed() {
        if tlv.length() > 0 {
            container.push_parent(tlv);
        }
        TlvState::TlvDone
    } else if tlv.length() == 0 {
        TlvState::TlvDone
    } else {
        TlvState::ValueStart
    };
    container.set_tlv_state(next);
    Ok(())
}

/// Close the open TLVs whose children have all been through the grammar
fn close_exhausted<S, T>(container: &mut Asn1Container<S, T>) -> DecodeResult<()>
where
    S: GrammarState,
    T: 'static,
{
    let grammar = container.grammar();
    while container
        .parent_tlv()
        .is_some_and(|parent| parent.remaining() == 0)
    {
        let Some((tlv, states)) = container.pop_parent() else {
            break;
        };
        log::trace!(
            "{}: TLV #{} tag 0x{:02X} closed",
            grammar.name(),
            tlv.id(),
            tlv.tag()
        );
        grammar.check_end(&states)?;
    }
    Ok(())
}

fn current_tlv_mut<S, T>(container: &mut Asn1Container<S, T>) -> DecodeResult<&mut Tlv>
where
    S: GrammarState,
    T: 'static,
{
    container
        .current_tlv_mut()
        .ok_or_else(|| DecoderError::invalid_value("No current TLV"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ber::decoder::{decode_int, decode_utf8};
    use crate::config::DecoderConfig;
    use crate::grammar::{Grammar, GrammarBuilder, Transition};
    use once_cell::sync::Lazy;

    // Record ::= SEQUENCE {
    //     id    INTEGER,
    //     name  OCTET STRING,
    //     tags  [0] SEQUENCE OF OCTET STRING OPTIONAL }
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    enum RecordState {
        Start,
        Record,
        Id,
        Name,
        Tags,
        Tag,
    }

    #[derive(Debug, Default, PartialEq)]
    struct Record {
        id: i32,
        name: String,
        tags: Vec<String>,
    }

    type RecordContainer = Asn1Container<RecordState, Record>;

    fn store_id(container: &mut RecordContainer) -> DecodeResult<()> {
        container.value_mut().id = decode_int(container.current_value()?)?;
        Ok(())
    }

    fn store_name(container: &mut RecordContainer) -> DecodeResult<()> {
        container.value_mut().name = decode_utf8(container.current_value()?)?;
        Ok(())
    }

    fn store_tag(container: &mut RecordContainer) -> DecodeResult<()> {
        let tag = decode_utf8(container.current_value()?)?;
        container.value_mut().tags.push(tag);
        Ok(())
    }

    fn record_grammar(name: &'static str) -> GrammarBuilder<RecordState, Record> {
        use RecordState::*;

        let mut builder = Grammar::builder(name, Start);
        builder
            .add(Transition::new("record", Start, 0x30, Record))
            .add(Transition::new("id", Record, 0x02, Id).with_action(store_id))
            .add(
                Transition::new("name", Id, 0x04, Name)
                    .optional_end()
                    .with_action(store_name),
            )
            .add(Transition::new("tags", Name, 0xA0, Tags).optional_end())
            .add(
                Transition::new("first tag", Tags, 0x04, Tag)
                    .optional_end()
                    .with_action(store_tag),
            )
            .add(
                Transition::new("next tag", Tag, 0x04, Tag)
                    .optional_end()
                    .with_action(store_tag),
            );
        builder
    }

    static RECORD_GRAMMAR: Lazy<Grammar<RecordState, Record>> =
        Lazy::new(|| record_grammar("record grammar").build());

    // Same grammar, with the content of its constructed TLVs declared
    static CHECKED_RECORD_GRAMMAR: Lazy<Grammar<RecordState, Record>> = Lazy::new(|| {
        use RecordState::*;

        let mut builder = record_grammar("checked record grammar");
        builder
            .add_content(&[Record], &[Id, Name, Tags])
            .add_end(&[Record], &[Name, Tags])
            .add_content(&[Tags], &[Tag])
            .add_end(&[Tags], &[Tag]);
        builder.build()
    });

    const RECORD: &[u8] = &[
        0x30, 0x13, // Record
        0x02, 0x01, 0x07, // id
        0x04, 0x03, b'b', b'o', b'b', // name
        0xA0, 0x09, // tags
        0x04, 0x02, b'a', b'b', // tag
        0x04, 0x03, b'x', b'y', b'z', // tag
    ];

    fn expected() -> Record {
        Record {
            id: 7,
            name: "bob".to_string(),
            tags: vec!["ab".to_string(), "xyz".to_string()],
        }
    }

    fn container() -> RecordContainer {
        Asn1Container::new(&*RECORD_GRAMMAR)
    }

    #[test]
    fn test_decode_whole_pdu() {
        let mut container = container();
        decode_complete(RECORD, &mut container).unwrap();
        assert!(container.is_decoded());
        assert_eq!(container.decoded_bytes(), RECORD.len());
        assert_eq!(container.into_value(), expected());
    }

    #[test]
    fn test_decode_at_every_split() {
        for split in 0..=RECORD.len() {
            let mut container = container();
            let (first, second) = RECORD.split_at(split);

            let mut stream = first;
            let status = decode(&mut stream, &mut container).unwrap();
            if split < RECORD.len() {
                assert_eq!(status, DecodeStatus::NeedMoreData, "split at {}", split);
            }

            let mut stream = second;
            let status = decode(&mut stream, &mut container).unwrap();
            assert_eq!(status, DecodeStatus::PduDecoded, "split at {}", split);
            assert_eq!(container.take_value(), expected());
        }
    }

    #[test]
    fn test_decode_byte_by_byte() {
        let mut container = container();
        let mut status = DecodeStatus::NeedMoreData;
        for byte in RECORD {
            let mut stream = std::slice::from_ref(byte);
            status = decode(&mut stream, &mut container).unwrap();
        }
        assert_eq!(status, DecodeStatus::PduDecoded);
        assert_eq!(container.into_value(), expected());
    }

    #[test]
    fn test_decode_chained_buf() {
        let mut container = container();
        let mut stream = (&RECORD[..5]).chain(&RECORD[5..]);
        assert_eq!(
            decode(&mut stream, &mut container).unwrap(),
            DecodeStatus::PduDecoded
        );
        assert_eq!(container.into_value(), expected());
    }

    #[test]
    fn test_optional_element_absent() {
        let pdu = [0x30, 0x08, 0x02, 0x01, 0x01, 0x04, 0x03, b'a', b'b', b'c'];
        let mut container = container();
        decode_complete(&pdu, &mut container).unwrap();
        assert_eq!(container.value().name, "abc");
        assert!(container.value().tags.is_empty());
    }

    #[test]
    fn test_empty_constructed_child() {
        let pdu = [0x30, 0x0A, 0x02, 0x01, 0x01, 0x04, 0x03, b'a', b'b', b'c', 0xA0, 0x00];
        let mut container = container();
        decode_complete(&pdu, &mut container).unwrap();
        assert!(container.value().tags.is_empty());
    }

    #[test]
    fn test_mandatory_element_missing() {
        let pdu = [0x30, 0x03, 0x02, 0x01, 0x01];
        let mut container = container();
        assert_eq!(
            decode_complete(&pdu, &mut container),
            Err(DecoderError::PduIncomplete {
                grammar: "record grammar",
                state: "Id".to_string()
            })
        );
        assert!(container.is_failed());
    }

    #[test]
    fn test_child_overruns_parent() {
        let pdu = [0x30, 0x04, 0x02, 0x01, 0x01, 0x04, 0x03, b'a', b'b', b'c'];
        let mut container = container();
        assert_eq!(
            decode_complete(&pdu, &mut container),
            Err(DecoderError::ExpectedLengthExceeded {
                expected: 1,
                actual: 5
            })
        );
    }

    #[test]
    fn test_children_shorter_than_parent() {
        let pdu = [
            0x30, 0x0D, 0x02, 0x01, 0x07, 0x04, 0x03, b'b', b'o', b'b', 0xA0, 0x03, 0x04, 0x00,
        ];
        let mut container = container();
        assert_eq!(
            decode_complete(&pdu, &mut container),
            Err(DecoderError::TruncatedPdu)
        );
        assert!(container.is_failed());
    }

    #[test]
    fn test_unexpected_tag() {
        let pdu = [0x30, 0x03, 0x04, 0x01, 0x01];
        let mut container = container();
        assert_eq!(
            decode_complete(&pdu, &mut container),
            Err(DecoderError::UnexpectedTag {
                grammar: "record grammar",
                state: "Record".to_string(),
                tag: 0x04
            })
        );
    }

    #[test]
    fn test_truncated_and_trailing() {
        let mut container = container();
        assert_eq!(
            decode_complete(&RECORD[..RECORD.len() - 1], &mut container),
            Err(DecoderError::TruncatedPdu)
        );

        let mut data = RECORD.to_vec();
        data.extend_from_slice(&[0x30, 0x00]);
        let mut container = self::container();
        assert_eq!(
            decode_complete(&data, &mut container),
            Err(DecoderError::TrailingBytes(2))
        );
    }

    #[test]
    fn test_bytes_after_pdu_are_left_in_stream() {
        let mut data = RECORD.to_vec();
        data.extend_from_slice(RECORD);
        let mut stream = &data[..];

        let mut container = container();
        assert_eq!(
            decode(&mut stream, &mut container).unwrap(),
            DecodeStatus::PduDecoded
        );
        assert_eq!(stream.remaining(), RECORD.len());

        container.reset();
        assert_eq!(
            decode(&mut stream, &mut container).unwrap(),
            DecodeStatus::PduDecoded
        );
        assert!(!stream.has_remaining());
        assert_eq!(container.into_value(), expected());
    }

    #[test]
    fn test_length_above_maximum() {
        let config = DecoderConfig::builder().set_max_pdu_size(16).build().unwrap();
        let mut container = Asn1Container::with_config(&*RECORD_GRAMMAR, config);
        assert_eq!(
            decode_complete(RECORD, &mut container),
            Err(DecoderError::LengthAboveMaximum { length: 19, max: 16 })
        );
    }

    #[test]
    fn test_hostile_length_rejected_before_value() {
        let pdu = [0x30, 0x84, 0x7F, 0xFF, 0xFF, 0xFF];
        let mut container = container();
        let mut stream = &pdu[..];
        assert!(matches!(
            decode(&mut stream, &mut container),
            Err(DecoderError::LengthAboveMaximum { .. })
        ));
    }

    #[test]
    fn test_unsupported_length_forms() {
        let mut container = container();
        let mut stream = &[0x30, 0x80][..];
        assert_eq!(
            decode(&mut stream, &mut container),
            Err(DecoderError::IndefiniteLength)
        );

        let mut container = self::container();
        let mut stream = &[0x30, 0x85, 0, 0, 0, 0, 1][..];
        assert_eq!(
            decode(&mut stream, &mut container),
            Err(DecoderError::LengthTooLong(5))
        );

        let mut container = self::container();
        let mut stream = &[0x3F, 0x01][..];
        assert_eq!(
            decode(&mut stream, &mut container),
            Err(DecoderError::UnsupportedTag(0x3F))
        );
    }

    #[test]
    fn test_failed_container_refuses_input() {
        let mut container = container();
        let mut stream = &[0x04, 0x00][..];
        assert!(decode(&mut stream, &mut container).is_err());

        let mut stream = RECORD;
        assert_eq!(
            decode(&mut stream, &mut container),
            Err(DecoderError::ContainerFailed)
        );

        container.reset();
        let mut stream = RECORD;
        assert_eq!(
            decode(&mut stream, &mut container).unwrap(),
            DecodeStatus::PduDecoded
        );
    }

    #[test]
    fn test_empty_input_needs_more_data() {
        let mut container = container();
        let mut stream = &[][..];
        assert_eq!(
            decode(&mut stream, &mut container).unwrap(),
            DecodeStatus::NeedMoreData
        );
    }

    #[test]
    fn test_checked_grammar_decodes_at_every_split() {
        for split in 0..=RECORD.len() {
            let mut container = Asn1Container::new(&*CHECKED_RECORD_GRAMMAR);
            let (first, second) = RECORD.split_at(split);
            let mut stream = first;
            decode(&mut stream, &mut container).unwrap();
            let mut stream = second;
            assert_eq!(
                decode(&mut stream, &mut container).unwrap(),
                DecodeStatus::PduDecoded,
                "split at {}",
                split
            );
            assert_eq!(container.take_value(), expected());
        }
    }

    #[test]
    fn test_constructed_tlv_ends_too_early() {
        let pdu = [0x30, 0x03, 0x02, 0x01, 0x01];
        let mut container = Asn1Container::new(&*CHECKED_RECORD_GRAMMAR);
        assert_eq!(
            decode_complete(&pdu, &mut container),
            Err(DecoderError::ConstructIncomplete {
                grammar: "checked record grammar",
                construct: "Record".to_string(),
                state: "Id".to_string()
            })
        );
        assert!(container.is_failed());
    }

    #[test]
    fn test_sibling_of_closed_construct_rejected() {
        // The second tag follows the [0] TLV instead of being inside it
        let pdu = [
            0x30, 0x10, // Record
            0x02, 0x01, 0x07, // id
            0x04, 0x03, b'b', b'o', b'b', // name
            0xA0, 0x02, // tags
            0x04, 0x00, // tag
            0x04, 0x02, b'x', b'y', // misplaced tag
        ];

        let mut container = container();
        decode_complete(&pdu, &mut container).unwrap();
        assert_eq!(container.value().tags, vec!["".to_string(), "xy".to_string()]);

        let mut container = Asn1Container::new(&*CHECKED_RECORD_GRAMMAR);
        assert_eq!(
            decode_complete(&pdu, &mut container),
            Err(DecoderError::MisplacedTlv {
                grammar: "checked record grammar",
                construct: "Record".to_string(),
                tag: 0x04
            })
        );
    }

    #[test]
    fn test_construct_stays_open_until_last_child_decoded() {
        // Both TLVs are exhausted once the last tag header is read
        let mut container = container();
        let mut stream = &RECORD[..RECORD.len() - 1];
        assert_eq!(
            decode(&mut stream, &mut container).unwrap(),
            DecodeStatus::NeedMoreData
        );
        assert_eq!(container.open_tlvs().len(), 2);
        assert!(container.open_tlvs().iter().all(|tlv| tlv.remaining() == 0));

        let mut stream = &RECORD[RECORD.len() - 1..];
        assert_eq!(
            decode(&mut stream, &mut container).unwrap(),
            DecodeStatus::PduDecoded
        );
        assert!(container.open_tlvs().is_empty());
    }
}
