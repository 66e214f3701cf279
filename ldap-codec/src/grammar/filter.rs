//! Search filter
//!
//! ```text
//! Filter ::= CHOICE {
//!      and             [0] SET SIZE (1..MAX) OF filter Filter,
//!      or              [1] SET SIZE (1..MAX) OF filter Filter,
//!      not             [2] Filter,
//!      equalityMatch   [3] AttributeValueAssertion,
//!      substrings      [4] SubstringFilter,
//!      greaterOrEqual  [5] AttributeValueAssertion,
//!      lessOrEqual     [6] AttributeValueAssertion,
//!      present         [7] AttributeDescription,
//!      approxMatch     [8] AttributeValueAssertion,
//!      extensibleMatch [9] MatchingRuleAssertion,
//!      ...  }
//! ```
//!
//! The grammar is flat, so the filter tree is rebuilt with a stack of
//! frames, one per filter TLV. Frames whose TLV the container has closed
//! are folded into their parent when the next filter starts and when the
//! attribute selection ends the filter.

use ldap_asn1::ber::decoder::decode_boolean;
use ldap_asn1::ber::types::tags;
use ldap_asn1::{Tlv, Transition};

use super::{LdapGrammarBuilder, LdapState as S, current_bytes, current_string, current_tlv_id};
use crate::constants::{MAX_FILTER_DEPTH, filter_tags};
use crate::container::LdapMessageContainer;
use crate::error::{DecodeResult, DecoderError};
use crate::message::{
    AttributeValueAssertion, Filter, MatchingRuleAssertion, SubstringFilter,
};

/// States after which a complete filter item may be followed by anything
pub(crate) const FILTER_END: [S; 7] = [
    S::FilterAvaValue,
    S::FilterPresent,
    S::SubstringInitial,
    S::SubstringAny,
    S::SubstringFinal,
    S::ExtensibleValue,
    S::ExtensibleDnAttributes,
];

/// States entered by the TLV of a filter
pub(crate) const FILTER_ITEMS: [S; 6] = [
    S::FilterSet,
    S::FilterNot,
    S::FilterAva,
    S::FilterSubstrings,
    S::FilterPresent,
    S::FilterExtensible,
];

/// Filter TLV being decoded
#[derive(Debug, Clone, PartialEq)]
enum FrameKind {
    And(Vec<Filter>),
    Or(Vec<Filter>),
    Not(Option<Filter>),
    Item(Filter),
}

#[derive(Debug, Clone, PartialEq)]
struct FilterFrame {
    tlv_id: usize,
    kind: FrameKind,
}

/// Rebuilds a filter tree out of the flat sequence of filter TLVs
#[derive(Debug, Default, Clone, PartialEq)]
pub struct FilterBuilder {
    frames: Vec<FilterFrame>,
    root: Option<Filter>,
}

impl FilterBuilder {
    /// Open the frame of the filter TLV `tlv_id`
    fn push(&mut self, tlv_id: usize, kind: FrameKind) -> DecodeResult<()> {
        if self.frames.is_empty() && self.root.is_some() {
            return Err(DecoderError::invalid_value(
                "A search request carries more than one filter",
            ));
        }
        if self.frames.len() >= MAX_FILTER_DEPTH {
            return Err(DecoderError::invalid_value(format!(
                "Filter nested deeper than {} levels",
                MAX_FILTER_DEPTH
            )));
        }
        self.frames.push(FilterFrame { tlv_id, kind });
        Ok(())
    }

    /// Filter item under construction
    fn current_item_mut(&mut self) -> DecodeResult<&mut Filter> {
        match self.frames.last_mut() {
            Some(FilterFrame {
                kind: FrameKind::Item(filter),
                ..
            }) => Ok(filter),
            _ => Err(DecoderError::invalid_value("No filter item under construction")),
        }
    }

    /// Fold every frame on top of the stack whose TLV is closed
    fn fold_closed(&mut self, is_open: impl Fn(usize) -> bool) -> DecodeResult<()> {
        while let Some(frame) = self.frames.last() {
            if is_open(frame.tlv_id) {
                break;
            }
            let Some(frame) = self.frames.pop() else {
                break;
            };
            let filter = match frame.kind {
                FrameKind::And(filters) => Filter::And(filters),
                FrameKind::Or(filters) => Filter::Or(filters),
                FrameKind::Not(Some(filter)) => Filter::Not(Box::new(filter)),
                FrameKind::Not(None) => {
                    return Err(DecoderError::invalid_value("Empty not filter"));
                }
                FrameKind::Item(filter) => filter,
            };
            self.attach(filter)?;
        }
        Ok(())
    }

    fn attach(&mut self, filter: Filter) -> DecodeResult<()> {
        match self.frames.last_mut() {
            Some(parent) => match &mut parent.kind {
                FrameKind::And(filters) | FrameKind::Or(filters) => {
                    filters.push(filter);
                    Ok(())
                }
                FrameKind::Not(child @ None) => {
                    *child = Some(filter);
                    Ok(())
                }
                FrameKind::Not(Some(_)) => Err(DecoderError::invalid_value(
                    "A not filter holds more than one filter",
                )),
                FrameKind::Item(_) => Err(DecoderError::invalid_value(
                    "A filter item cannot hold another filter",
                )),
            },
            None if self.root.is_some() => Err(DecoderError::invalid_value(
                "A search request carries more than one filter",
            )),
            None => {
                self.root = Some(filter);
                Ok(())
            }
        }
    }

    /// The decoded filter, once every frame is folded
    fn take_root(&mut self) -> DecodeResult<Filter> {
        if !self.frames.is_empty() {
            return Err(DecoderError::invalid_value("Incomplete search filter"));
        }
        self.root
            .take()
            .ok_or_else(|| DecoderError::invalid_value("Missing search filter"))
    }
}

pub(crate) fn add_transitions(builder: &mut LdapGrammarBuilder) {
    let filter_starts: Vec<S> = [S::SearchTypesOnly, S::FilterSet, S::FilterNot]
        .into_iter()
        .chain(FILTER_END)
        .collect();

    builder
        .add_from_each(
            &filter_starts,
            Transition::new("and", S::SearchTypesOnly, filter_tags::AND, S::FilterSet)
                .with_action(init_and),
        )
        .add_from_each(
            &filter_starts,
            Transition::new("or", S::SearchTypesOnly, filter_tags::OR, S::FilterSet)
                .with_action(init_or),
        )
        .add_from_each(
            &filter_starts,
            Transition::new("not", S::SearchTypesOnly, filter_tags::NOT, S::FilterNot)
                .with_action(init_not),
        )
        .add_from_each(
            &filter_starts,
            Transition::new(
                "equalityMatch",
                S::SearchTypesOnly,
                filter_tags::EQUALITY_MATCH,
                S::FilterAva,
            )
            .with_action(init_equality_match),
        )
        .add_from_each(
            &filter_starts,
            Transition::new(
                "greaterOrEqual",
                S::SearchTypesOnly,
                filter_tags::GREATER_OR_EQUAL,
                S::FilterAva,
            )
            .with_action(init_greater_or_equal),
        )
        .add_from_each(
            &filter_starts,
            Transition::new(
                "lessOrEqual",
                S::SearchTypesOnly,
                filter_tags::LESS_OR_EQUAL,
                S::FilterAva,
            )
            .with_action(init_less_or_equal),
        )
        .add_from_each(
            &filter_starts,
            Transition::new(
                "approxMatch",
                S::SearchTypesOnly,
                filter_tags::APPROX_MATCH,
                S::FilterAva,
            )
            .with_action(init_approx_match),
        )
        .add_from_each(
            &filter_starts,
            Transition::new(
                "substrings",
                S::SearchTypesOnly,
                filter_tags::SUBSTRINGS,
                S::FilterSubstrings,
            )
            .with_action(init_substrings),
        )
        .add_from_each(
            &filter_starts,
            Transition::new("present", S::SearchTypesOnly, filter_tags::PRESENT, S::FilterPresent)
                .with_action(store_present),
        )
        .add_from_each(
            &filter_starts,
            Transition::new(
                "extensibleMatch",
                S::SearchTypesOnly,
                filter_tags::EXTENSIBLE_MATCH,
                S::FilterExtensible,
            )
            .with_action(init_extensible_match),
        );

    // AttributeValueAssertion
    builder
        .add(
            Transition::new("attributeDesc", S::FilterAva, tags::OCTET_STRING, S::FilterAvaDesc)
                .with_action(store_ava_desc),
        )
        .add(
            Transition::new(
                "assertionValue",
                S::FilterAvaDesc,
                tags::OCTET_STRING,
                S::FilterAvaValue,
            )
            .with_action(store_ava_value),
        );

    // SubstringFilter
    builder
        .add(
            Transition::new(
                "type",
                S::FilterSubstrings,
                tags::OCTET_STRING,
                S::FilterSubstringsType,
            )
            .with_action(store_substrings_type),
        )
        .add(Transition::new(
            "substrings",
            S::FilterSubstringsType,
            tags::SEQUENCE,
            S::FilterSubstringsSeq,
        ))
        .add(
            Transition::new(
                "initial",
                S::FilterSubstringsSeq,
                filter_tags::SUBSTRING_INITIAL,
                S::SubstringInitial,
            )
            .with_action(store_substring_initial),
        )
        .add_from_each(
            &[S::FilterSubstringsSeq, S::SubstringInitial, S::SubstringAny],
            Transition::new(
                "any",
                S::FilterSubstringsSeq,
                filter_tags::SUBSTRING_ANY,
                S::SubstringAny,
            )
            .with_action(store_substring_any),
        )
        .add_from_each(
            &[S::FilterSubstringsSeq, S::SubstringInitial, S::SubstringAny],
            Transition::new(
                "final",
                S::FilterSubstringsSeq,
                filter_tags::SUBSTRING_FINAL,
                S::SubstringFinal,
            )
            .with_action(store_substring_final),
        );

    // MatchingRuleAssertion
    builder
        .add(
            Transition::new(
                "matchingRule",
                S::FilterExtensible,
                filter_tags::MATCHING_RULE,
                S::ExtensibleRule,
            )
            .with_action(store_matching_rule),
        )
        .add_from_each(
            &[S::FilterExtensible, S::ExtensibleRule],
            Transition::new(
                "type",
                S::FilterExtensible,
                filter_tags::MATCHING_TYPE,
                S::ExtensibleType,
            )
            .with_action(store_matching_type),
        )
        .add_from_each(
            &[S::FilterExtensible, S::ExtensibleRule, S::ExtensibleType],
            Transition::new(
                "matchValue",
                S::FilterExtensible,
                filter_tags::MATCH_VALUE,
                S::ExtensibleValue,
            )
            .with_action(store_match_value),
        )
        .add(
            Transition::new(
                "dnAttributes",
                S::ExtensibleValue,
                filter_tags::DN_ATTRIBUTES,
                S::ExtensibleDnAttributes,
            )
            .with_action(store_dn_attributes),
        );

    let substrings = [S::SubstringInitial, S::SubstringAny, S::SubstringFinal];
    let extensible = [
        S::ExtensibleRule,
        S::ExtensibleType,
        S::ExtensibleValue,
        S::ExtensibleDnAttributes,
    ];
    builder
        .add_content(&[S::FilterSet, S::FilterNot], &FILTER_ITEMS)
        .add_end(&[S::FilterSet, S::FilterNot], &FILTER_ITEMS)
        .add_content(&[S::FilterAva], &[S::FilterAvaDesc, S::FilterAvaValue])
        .add_end(&[S::FilterAva], &[S::FilterAvaValue])
        .add_content(&[S::FilterSubstrings], &[S::FilterSubstringsType, S::FilterSubstringsSeq])
        .add_end(&[S::FilterSubstrings], &[S::FilterSubstringsSeq])
        .add_content(&[S::FilterSubstringsSeq], &substrings)
        .add_end(&[S::FilterSubstringsSeq], &substrings)
        .add_content(&[S::FilterExtensible], &extensible)
        .add_end(&[S::FilterExtensible], &[S::ExtensibleValue, S::ExtensibleDnAttributes]);
}

/// Fold the frames whose TLV the container has closed
fn fold_filters(container: &mut LdapMessageContainer) -> DecodeResult<()> {
    let open: Vec<usize> = container.open_tlvs().iter().map(Tlv::id).collect();
    container
        .value_mut()
        .filters
        .fold_closed(|id| open.contains(&id))
}

/// Take the filter of the search request once all its TLVs are decoded
pub(crate) fn take_filter(container: &mut LdapMessageContainer) -> DecodeResult<Filter> {
    fold_filters(container)?;
    container.value_mut().filters.take_root()
}

/// Open the frame of the current filter TLV
///
/// The previous sibling is folded first, so that the new frame never lands
/// on top of a closed one. A primitive or empty filter is folded right away.
fn push_frame(container: &mut LdapMessageContainer, kind: FrameKind) -> DecodeResult<()> {
    fold_filters(container)?;
    let tlv_id = current_tlv_id(container)?;
    container.value_mut().filters.push(tlv_id, kind)?;
    fold_filters(container)
}

fn init_and(container: &mut LdapMessageContainer) -> DecodeResult<()> {
    push_frame(container, FrameKind::And(Vec::new()))
}

fn init_or(container: &mut LdapMessageContainer) -> DecodeResult<()> {
    push_frame(container, FrameKind::Or(Vec::new()))
}

fn init_not(container: &mut LdapMessageContainer) -> DecodeResult<()> {
    push_frame(container, FrameKind::Not(None))
}

fn init_equality_match(container: &mut LdapMessageContainer) -> DecodeResult<()> {
    let filter = Filter::EqualityMatch(AttributeValueAssertion::default());
    push_frame(container, FrameKind::Item(filter))
}

fn init_greater_or_equal(container: &mut LdapMessageContainer) -> DecodeResult<()> {
    let filter = Filter::GreaterOrEqual(AttributeValueAssertion::default());
    push_frame(container, FrameKind::Item(filter))
}

fn init_less_or_equal(container: &mut LdapMessageContainer) -> DecodeResult<()> {
    let filter = Filter::LessOrEqual(AttributeValueAssertion::default());
    push_frame(container, FrameKind::Item(filter))
}

fn init_approx_match(container: &mut LdapMessageContainer) -> DecodeResult<()> {
    let filter = Filter::ApproxMatch(AttributeValueAssertion::default());
    push_frame(container, FrameKind::Item(filter))
}

fn init_substrings(container: &mut LdapMessageContainer) -> DecodeResult<()> {
    let filter = Filter::Substrings(SubstringFilter::default());
    push_frame(container, FrameKind::Item(filter))
}

fn store_present(container: &mut LdapMessageContainer) -> DecodeResult<()> {
    let attribute = current_string(container)?;
    push_frame(container, FrameKind::Item(Filter::Present(attribute)))
}

fn init_extensible_match(container: &mut LdapMessageContainer) -> DecodeResult<()> {
    let filter = Filter::ExtensibleMatch(MatchingRuleAssertion::default());
    push_frame(container, FrameKind::Item(filter))
}

fn ava_mut(container: &mut LdapMessageContainer) -> DecodeResult<&mut AttributeValueAssertion> {
    match container.value_mut().filters.current_item_mut()? {
        Filter::EqualityMatch(ava)
        | Filter::GreaterOrEqual(ava)
        | Filter::LessOrEqual(ava)
        | Filter::ApproxMatch(ava) => Ok(ava),
        _ => Err(DecoderError::invalid_value("No assertion under construction")),
    }
}

fn substrings_mut(container: &mut LdapMessageContainer) -> DecodeResult<&mut SubstringFilter> {
    match container.value_mut().filters.current_item_mut()? {
        Filter::Substrings(substrings) => Ok(substrings),
        _ => Err(DecoderError::invalid_value("No substrings filter under construction")),
    }
}

fn extensible_mut(container: &mut LdapMessageContainer) -> DecodeResult<&mut MatchingRuleAssertion> {
    match container.value_mut().filters.current_item_mut()? {
        Filter::ExtensibleMatch(assertion) => Ok(assertion),
        _ => Err(DecoderError::invalid_value("No extensible match under construction")),
    }
}

fn store_ava_desc(container: &mut LdapMessageContainer) -> DecodeResult<()> {
    let description = current_string(container)?;
    ava_mut(container)?.attribute_desc = description;
    Ok(())
}

fn store_ava_value(container: &mut LdapMessageContainer) -> DecodeResult<()> {
    let value = current_bytes(container)?;
    ava_mut(container)?.assertion_value = value;
    Ok(())
}

fn store_substrings_type(container: &mut LdapMessageContainer) -> DecodeResult<()> {
    let attribute_type = current_string(container)?;
    substrings_mut(container)?.attribute_type = attribute_type;
    Ok(())
}

fn store_substring_initial(container: &mut LdapMessageContainer) -> DecodeResult<()> {
    let value = current_bytes(container)?;
    substrings_mut(container)?.initial = Some(value);
    Ok(())
}

fn store_substring_any(container: &mut LdapMessageContainer) -> DecodeResult<()> {
    let value = current_bytes(container)?;
    substrings_mut(container)?.any.push(value);
    Ok(())
}

fn store_substring_final(container: &mut LdapMessageContainer) -> DecodeResult<()> {
    let value = current_bytes(container)?;
    substrings_mut(container)?.final_ = Some(value);
    Ok(())
}

fn store_matching_rule(container: &mut LdapMessageContainer) -> DecodeResult<()> {
    let rule = current_string(container)?;
    extensible_mut(container)?.matching_rule = Some(rule);
    Ok(())
}

fn store_matching_type(container: &mut LdapMessageContainer) -> DecodeResult<()> {
    let attribute_type = current_string(container)?;
    extensible_mut(container)?.attribute_type = Some(attribute_type);
    Ok(())
}

fn store_match_value(container: &mut LdapMessageContainer) -> DecodeResult<()> {
    let value = current_bytes(container)?;
    let assertion = extensible_mut(container)?;
    // RFC 4511 4.5.1.7.7: the rule may only be omitted when the type is given
    if assertion.matching_rule.is_none() && assertion.attribute_type.is_none() {
        return Err(DecoderError::invalid_value(
            "Extensible match without matching rule nor type",
        ));
    }
    assertion.match_value = value;
    Ok(())
}

fn store_dn_attributes(container: &mut LdapMessageContainer) -> DecodeResult<()> {
    let policy = container.config().boolean_policy;
    let dn_attributes = decode_boolean(container.current_value()?, policy)?;
    extensible_mut(container)?.dn_attributes = dn_attributes;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(attribute: &str) -> FrameKind {
        FrameKind::Item(Filter::Present(attribute.to_string()))
    }

    fn present(attribute: &str) -> Filter {
        Filter::Present(attribute.to_string())
    }

    #[test]
    fn test_fold_nested_filter() {
        // (&(a=*)(!(b=*)))
        let mut builder = FilterBuilder::default();
        builder.push(1, FrameKind::And(Vec::new())).unwrap();
        builder.push(2, item("a")).unwrap();
        builder.fold_closed(|id| id == 1).unwrap();
        builder.push(3, FrameKind::Not(None)).unwrap();
        builder.push(4, item("b")).unwrap();
        builder.fold_closed(|_| false).unwrap();

        assert_eq!(
            builder.take_root().unwrap(),
            Filter::And(vec![present("a"), Filter::Not(Box::new(present("b")))])
        );
    }

    #[test]
    fn test_open_frames_stay() {
        let mut builder = FilterBuilder::default();
        builder.push(1, FrameKind::Or(Vec::new())).unwrap();
        builder.push(2, item("a")).unwrap();
        builder.fold_closed(|id| id == 1).unwrap();

        assert!(builder.take_root().is_err());
    }

    #[test]
    fn test_empty_set_is_kept() {
        let mut builder = FilterBuilder::default();
        builder.push(1, FrameKind::And(Vec::new())).unwrap();
        builder.fold_closed(|_| false).unwrap();
        assert_eq!(builder.take_root().unwrap(), Filter::And(Vec::new()));
    }

    #[test]
    fn test_invalid_trees() {
        let mut builder = FilterBuilder::default();
        builder.push(1, FrameKind::Not(None)).unwrap();
        assert!(builder.fold_closed(|_| false).is_err());

        let mut builder = FilterBuilder::default();
        builder.push(1, FrameKind::Not(None)).unwrap();
        builder.push(2, item("a")).unwrap();
        builder.fold_closed(|id| id == 1).unwrap();
        builder.push(3, item("b")).unwrap();
        assert!(builder.fold_closed(|id| id == 1).is_err());

        let mut builder = FilterBuilder::default();
        builder.push(1, item("a")).unwrap();
        builder.fold_closed(|_| false).unwrap();
        assert!(builder.push(2, item("b")).is_err());

        let mut builder = FilterBuilder::default();
        assert!(builder.take_root().is_err());
    }

    #[test]
    fn test_depth_limit() {
        let mut builder = FilterBuilder::default();
        for id in 0..MAX_FILTER_DEPTH {
            builder.push(id, FrameKind::Not(None)).unwrap();
        }
        assert!(builder.push(MAX_FILTER_DEPTH, item("a")).is_err());
    }
}
