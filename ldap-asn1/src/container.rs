//! Decoding container
//!
//! The container is the whole state of one PDU decoding: where the stream
//! decoder is within the current TLV, which constructed TLVs are still open,
//! which grammar state has been reached and the semantic value built so far
//! by the grammar actions. Since all of it lives here, decoding can stop at
//! any byte and resume with the next chunk.
//!
//! Each open constructed TLV also records the grammar state its own
//! transition entered and the state entered by its last direct child, which
//! is what the grammar checks content and ends against.

use crate::config::DecoderConfig;
use crate::error::{DecodeResult, DecoderError};
use crate::grammar::{Grammar, GrammarState};
use crate::tlv::Tlv;

/// Byte-level position of the stream decoder within the current TLV
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TlvState {
    /// Expecting a tag octet
    #[default]
    TagStart,
    /// Expecting the first length octet
    LengthStart,
    /// Inside a long-form length
    LengthPending,
    /// Length complete, enclosing TLVs not yet updated
    LengthEnd,
    /// Expecting the first value octet
    ValueStart,
    /// Inside a value
    ValuePending,
    /// TLV ready for the grammar
    TlvDone,
    /// The outermost TLV is complete and accepted
    PduDecoded,
}

/// Grammar states seen inside one open constructed TLV
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ConstructStates<S> {
    /// State entered by the TLV's own transition
    pub(crate) entered: Option<S>,
    /// State entered by its last direct child so far
    pub(crate) last_child: Option<S>,
}

impl<S> Default for ConstructStates<S> {
    fn default() -> Self {
        Self {
            entered: None,
            last_child: None,
        }
    }
}

/// Decoding state of one PDU
///
/// `S` is the grammar state type, `T` the value the grammar actions build.
#[derive(Debug)]
pub struct Asn1Container<S: GrammarState, T: 'static> {
    grammar: &'static Grammar<S, T>,
    state: S,
    tlv_state: TlvState,
    current_tlv: Option<Tlv>,
    parents: Vec<Tlv>,
    // Parallel to `parents`
    constructs: Vec<ConstructStates<S>>,
    grammar_end_allowed: bool,
    decoded_bytes: usize,
    next_tlv_id: usize,
    config: DecoderConfig,
    failed: bool,
    value: T,
}

impl<S: GrammarState, T: Default + 'static> Asn1Container<S, T> {
    /// Create a container in the grammar initial state
    pub fn new(grammar: &'static Grammar<S, T>) -> Self {
        Self::with_config(grammar, DecoderConfig::default())
    }

    /// Create a container with a specific configuration
    pub fn with_config(grammar: &'static Grammar<S, T>, config: DecoderConfig) -> Self {
        Self::with_value(grammar, config, T::default())
    }

    /// Move the value out, leaving a default one in place
    pub fn take_value(&mut self) -> T {
        std::mem::take(&mut self.value)
    }

    /// Reset the container so it can decode another PDU
    pub fn reset(&mut self) {
        self.clear_decoding_state();
        self.value = T::default();
    }
}

impl<S: GrammarState, T: 'static> Asn1Container<S, T> {
    /// Create a container starting from an explicit value
    pub fn with_value(grammar: &'static Grammar<S, T>, config: DecoderConfig, value: T) -> Self {
        Self {
            grammar,
            state: grammar.initial_state(),
            tlv_state: TlvState::TagStart,
            current_tlv: None,
            parents: Vec::new(),
            constructs: Vec::new(),
            grammar_end_allowed: false,
            decoded_bytes: 0,
            next_tlv_id: 0,
            config,
            failed: false,
            value,
        }
    }

    /// Reset the decoding state and replace the value
    ///
    /// # Returns
    /// The value built so far
    pub fn reset_with(&mut self, value: T) -> T {
        self.clear_decoding_state();
        std::mem::replace(&mut self.value, value)
    }

    fn clear_decoding_state(&mut self) {
        self.state = self.grammar.initial_state();
        self.tlv_state = TlvState::TagStart;
        self.current_tlv = None;
        self.parents.clear();
        self.constructs.clear();
        self.grammar_end_allowed = false;
        self.decoded_bytes = 0;
        self.next_tlv_id = 0;
        self.failed = false;
    }

    pub fn grammar(&self) -> &'static Grammar<S, T> {
        self.grammar
    }

    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    /// Current grammar state
    pub fn state(&self) -> S {
        self.state
    }

    /// Override the grammar state; used by actions resolving a CHOICE
    pub fn set_state(&mut self, state: S) {
        self.state = state;
    }

    pub fn tlv_state(&self) -> TlvState {
        self.tlv_state
    }

    pub(crate) fn set_tlv_state(&mut self, tlv_state: TlvState) {
        self.tlv_state = tlv_state;
    }

    /// Whether the PDU may end in the current state
    pub fn grammar_end_allowed(&self) -> bool {
        self.grammar_end_allowed
    }

    pub fn set_grammar_end_allowed(&mut self, allowed: bool) {
        self.grammar_end_allowed = allowed;
    }

    /// TLV being decoded, if any
    pub fn current_tlv(&self) -> Option<&Tlv> {
        self.current_tlv.as_ref()
    }

    pub(crate) fn current_tlv_mut(&mut self) -> Option<&mut Tlv> {
        self.current_tlv.as_mut()
    }

    pub(crate) fn set_current_tlv(&mut self, tlv: Tlv) {
        self.current_tlv = Some(tlv);
    }

    pub(crate) fn clear_current_tlv(&mut self) {
        self.current_tlv = None;
    }

    /// Value octets of the current TLV
    ///
    /// # Error Handling
    /// Returns error if there is no current TLV.
    pub fn current_value(&self) -> DecodeResult<&[u8]> {
        self.current_tlv
            .as_ref()
            .map(|tlv| tlv.value())
            .ok_or_else(|| DecoderError::invalid_value("No current TLV"))
    }

    /// Current TLV and mutable value at once
    pub fn current_tlv_and_value_mut(&mut self) -> DecodeResult<(&Tlv, &mut T)> {
        match self.current_tlv.as_ref() {
            Some(tlv) => Ok((tlv, &mut self.value)),
            None => Err(DecoderError::invalid_value("No current TLV")),
        }
    }

    /// Innermost open constructed TLV
    ///
    /// While the action of a non-empty constructed TLV runs, this is that
    /// TLV itself.
    pub fn parent_tlv(&self) -> Option<&Tlv> {
        self.parents.last()
    }

    pub(crate) fn parent_tlv_mut(&mut self) -> Option<&mut Tlv> {
        self.parents.last_mut()
    }

    /// Open constructed TLVs, outermost first
    ///
    /// A TLV whose length is used up stays open until the grammar has seen
    /// its last child.
    pub fn open_tlvs(&self) -> &[Tlv] {
        &self.parents
    }

    /// Whether the constructed TLV with this id still has children to come
    pub fn is_tlv_open(&self, id: usize) -> bool {
        self.parents.iter().any(|tlv| tlv.id() == id)
    }

    pub(crate) fn push_parent(&mut self, tlv: Tlv) {
        self.parents.push(tlv);
        self.constructs.push(ConstructStates::default());
    }

    pub(crate) fn pop_parent(&mut self) -> Option<(Tlv, ConstructStates<S>)> {
        let tlv = self.parents.pop()?;
        let states = self.constructs.pop().unwrap_or_default();
        Some((tlv, states))
    }

    /// State entered by the innermost open TLV enclosing the current one
    ///
    /// `None` at the top level of the PDU.
    pub fn enclosing_state(&self) -> Option<S> {
        let current = self.current_tlv.as_ref().map(Tlv::id);
        self.parents
            .iter()
            .zip(&self.constructs)
            .rev()
            .find(|(tlv, _)| Some(tlv.id()) != current)
            .and_then(|(_, states)| states.entered)
    }

    /// Record the state just reached for the current TLV
    ///
    /// If the current TLV is open, it becomes the state it entered; in any
    /// case it becomes the last child state of the enclosing TLV.
    pub(crate) fn record_transition(&mut self) {
        let Some(id) = self.current_tlv.as_ref().map(Tlv::id) else {
            return;
        };
        let state = self.state;
        let mut enclosing = self.constructs.len();
        if self.parents.last().is_some_and(|tlv| tlv.id() == id) {
            enclosing = enclosing.saturating_sub(1);
            if let Some(states) = self.constructs.get_mut(enclosing) {
                states.entered = Some(state);
            }
        }
        if let Some(states) = enclosing
            .checked_sub(1)
            .and_then(|index| self.constructs.get_mut(index))
        {
            states.last_child = Some(state);
        }
    }

    /// Number of bytes consumed for the current PDU
    pub fn decoded_bytes(&self) -> usize {
        self.decoded_bytes
    }

    pub(crate) fn add_decoded_bytes(&mut self, count: usize) {
        self.decoded_bytes += count;
    }

    pub(crate) fn allocate_tlv_id(&mut self) -> usize {
        self.next_tlv_id += 1;
        self.next_tlv_id
    }

    /// Whether a complete PDU has been decoded
    pub fn is_decoded(&self) -> bool {
        self.tlv_state == TlvState::PduDecoded
    }

    /// Whether a decoding error occurred; the container must be reset
    pub fn is_failed(&self) -> bool {
        self.failed
    }

    pub(crate) fn mark_failed(&mut self) {
        self.failed = true;
    }

    pub fn value(&self) -> &T {
        &self.value
    }

    pub fn value_mut(&mut self) -> &mut T {
        &mut self.value
    }

    pub fn into_value(self) -> T {
        self.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grammar::Grammar;
    use once_cell::sync::Lazy;

    static EMPTY: Lazy<Grammar<u8, Vec<u8>>> = Lazy::new(|| Grammar::builder("empty grammar", 0).build());

    #[test]
    fn test_new_container() {
        let container = Asn1Container::new(&*EMPTY);
        assert_eq!(container.state(), 0);
        assert_eq!(container.tlv_state(), TlvState::TagStart);
        assert!(container.current_tlv().is_none());
        assert!(container.parent_tlv().is_none());
        assert!(!container.grammar_end_allowed());
        assert!(!container.is_decoded());
        assert!(!container.is_failed());
        assert!(container.current_value().is_err());
    }

    #[test]
    fn test_open_tlvs() {
        let mut container = Asn1Container::new(&*EMPTY);
        let outer = container.allocate_tlv_id();
        let inner = container.allocate_tlv_id();
        container.push_parent(Tlv::new(outer, 0x30));
        container.push_parent(Tlv::new(inner, 0xA0));

        assert!(container.is_tlv_open(outer));
        assert!(container.is_tlv_open(inner));
        assert_eq!(container.parent_tlv().map(|tlv| tlv.tag()), Some(0xA0));
        assert_eq!(container.open_tlvs().len(), 2);

        container.pop_parent();
        assert!(!container.is_tlv_open(inner));
        assert_eq!(container.parent_tlv().map(|tlv| tlv.id()), Some(outer));
    }

    #[test]
    fn test_record_transition() {
        let mut container = Asn1Container::new(&*EMPTY);
        let outer = container.allocate_tlv_id();
        let outer_tlv = Tlv::new(outer, 0x30);
        container.push_parent(outer_tlv.clone());
        container.set_current_tlv(outer_tlv);
        container.set_state(1);
        container.record_transition();
        assert_eq!(container.enclosing_state(), None);

        let inner = container.allocate_tlv_id();
        let inner_tlv = Tlv::new(inner, 0xA0);
        container.push_parent(inner_tlv.clone());
        container.set_current_tlv(inner_tlv);
        assert_eq!(container.enclosing_state(), Some(1));
        container.set_state(2);
        container.record_transition();

        let leaf = container.allocate_tlv_id();
        container.set_current_tlv(Tlv::new(leaf, 0x04));
        assert_eq!(container.enclosing_state(), Some(2));
        container.set_state(3);
        container.record_transition();

        let (tlv, states) = container.pop_parent().unwrap();
        assert_eq!(tlv.id(), inner);
        assert_eq!(states.entered, Some(2));
        assert_eq!(states.last_child, Some(3));

        let (_, states) = container.pop_parent().unwrap();
        assert_eq!(states.entered, Some(1));
        assert_eq!(states.last_child, Some(2));
        assert!(container.pop_parent().is_none());
    }

    #[test]
    fn test_split_borrow() {
        let mut container = Asn1Container::new(&*EMPTY);
        let mut tlv = Tlv::new(1, 0x04);
        tlv.read_first_length_byte(2).unwrap();
        tlv.append_value(&[7, 8]);
        container.set_current_tlv(tlv);

        let (tlv, value) = container.current_tlv_and_value_mut().unwrap();
        value.extend_from_slice(tlv.value());
        assert_eq!(container.value(), &vec![7, 8]);
    }

    #[test]
    fn test_reset() {
        let mut container = Asn1Container::new(&*EMPTY);
        container.value_mut().push(1);
        container.set_state(3);
        container.set_grammar_end_allowed(true);
        container.add_decoded_bytes(10);
        container.push_parent(Tlv::new(1, 0x30));
        container.mark_failed();

        container.reset();
        assert_eq!(container.state(), 0);
        assert!(container.value().is_empty());
        assert!(!container.grammar_end_allowed());
        assert_eq!(container.decoded_bytes(), 0);
        assert!(container.open_tlvs().is_empty());
        assert!(!container.is_failed());
    }

    #[test]
    fn test_take_value() {
        let mut container = Asn1Container::new(&*EMPTY);
        container.value_mut().push(5);
        assert_eq!(container.take_value(), vec![5]);
        assert!(container.value().is_empty());
    }
}
