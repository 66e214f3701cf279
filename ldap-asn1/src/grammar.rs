//! Grammar: the transition table driving a decoding container
//!
//! A grammar maps `(state, tag)` to a [`Transition`]. Each time the stream
//! decoder completes a TLV header (constructed TLV) or a whole TLV
//! (primitive TLV), [`Grammar::execute_action`] looks up the transition for
//! the container's current state and the TLV tag, moves the container to the
//! target state and runs the transition action, if any.
//!
//! Grammars are immutable once built and meant to live in `static`s shared
//! by every container.
//!
//! A flat transition table cannot tell a child from a sibling, so a grammar
//! may also declare the content of its constructed TLVs: the states their
//! direct children enter, and the ones allowed last. A TLV entering a
//! declared child state anywhere else is rejected when its transition
//! fires, and a constructed TLV is checked against its declared last
//! children when it closes.

use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;

use crate::container::{Asn1Container, ConstructStates};
use crate::error::{DecodeResult, DecoderError};

/// Marker trait for the state type of a grammar
pub trait GrammarState: Copy + Eq + Hash + Debug + Send + Sync + 'static {}

impl<S> GrammarState for S where S: Copy + Eq + Hash + Debug + Send + Sync + 'static {}

/// Semantic action run when a transition fires
///
/// The action reads the current TLV from the container and updates the
/// value under construction. It may override the state and the end flag set
/// by the transition.
pub type Action<S, T> = fn(&mut Asn1Container<S, T>) -> DecodeResult<()>;

/// Whether the PDU may end right after a transition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FollowUp {
    /// More TLVs are required
    #[default]
    Mandatory,
    /// The PDU may end here
    Optional,
}

/// One edge of the grammar
///
/// # Why a Function Pointer Action?
/// Grammars live in statics shared across threads. A plain `fn` keeps the
/// transition `Send` and `Sync` without boxing closures.
pub struct Transition<S: GrammarState, T: 'static> {
    name: &'static str,
    from: S,
    to: S,
    tag: u8,
    follow_up: FollowUp,
    action: Option<Action<S, T>>,
}

impl<S: GrammarState, T: 'static> Transition<S, T> {
    /// Create a transition without action, after which more TLVs are required
    pub fn new(name: &'static str, from: S, tag: u8, to: S) -> Self {
        Self {
            name,
            from,
            to,
            tag,
            follow_up: FollowUp::Mandatory,
            action: None,
        }
    }

    /// Allow the PDU to end after this transition
    pub fn optional_end(mut self) -> Self {
        self.follow_up = FollowUp::Optional;
        self
    }

    /// Attach an action
    pub fn with_action(mut self, action: Action<S, T>) -> Self {
        self.action = Some(action);
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn from(&self) -> S {
        self.from
    }

    pub fn to(&self) -> S {
        self.to
    }

    pub fn tag(&self) -> u8 {
        self.tag
    }

    pub fn follow_up(&self) -> FollowUp {
        self.follow_up
    }
}

// Manual impls: `T` only appears behind a function pointer.
impl<S: GrammarState, T: 'static> Clone for Transition<S, T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name,
            from: self.from,
            to: self.to,
            tag: self.tag,
            follow_up: self.follow_up,
            action: self.action,
        }
    }
}

impl<S: GrammarState, T: 'static> Debug for Transition<S, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Transition")
            .field("name", &self.name)
            .field("from", &self.from)
            .field("to", &self.to)
            .field("tag", &format_args!("0x{:02X}", self.tag))
            .field("follow_up", &self.follow_up)
            .field("has_action", &self.action.is_some())
            .finish()
    }
}

/// Immutable transition table
///
/// # Why a Hash Map Keyed by `(state, tag)`?
/// Every TLV costs exactly one lookup, whatever the number of states, and
/// fan-in edges (the same tag leaving several states) need no special case.
///
/// # Optimization Considerations
/// The table is built once per grammar and only read afterwards, so lookups
/// never lock. Content and end declarations are only consulted for the
/// states that have some.
pub struct Grammar<S: GrammarState, T: 'static> {
    name: &'static str,
    initial_state: S,
    transitions: HashMap<(S, u8), Transition<S, T>>,
    /// Child state -> states of the constructed TLVs allowed to hold it
    enclosing: HashMap<S, Vec<S>>,
    /// Construct state -> states its last direct child may have entered
    last_children: HashMap<S, Vec<S>>,
}

impl<S: GrammarState, T: 'static> Grammar<S, T> {
    /// Start building a grammar
    pub fn builder(name: &'static str, initial_state: S) -> GrammarBuilder<S, T> {
        GrammarBuilder::new(name, initial_state)
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// State of a fresh container
    pub fn initial_state(&self) -> S {
        self.initial_state
    }

    /// Look up the transition leaving `state` on `tag`
    pub fn transition(&self, state: S, tag: u8) -> Option<&Transition<S, T>> {
        self.transitions.get(&(state, tag))
    }

    /// Number of transitions
    pub fn len(&self) -> usize {
        self.transitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }

    /// Fire the transition matching the container state and current TLV tag
    ///
    /// The container moves to the target state and its end flag is set from
    /// the transition follow-up before the action runs. Once the action
    /// succeeds, the state reached is recorded on the open TLVs.
    ///
    /// # Error Handling
    /// Returns [`DecoderError::UnexpectedTag`] when no transition leaves the
    /// current state on the TLV tag, [`DecoderError::MisplacedTlv`] when the
    /// target state is declared as the child of other constructed TLVs than
    /// the enclosing one, or any error raised by the action.
    pub fn execute_action(&self, container: &mut Asn1Container<S, T>) -> DecodeResult<()> {
        let tag = container
            .current_tlv()
            .map(|tlv| tlv.tag())
            .ok_or_else(|| DecoderError::invalid_value("No current TLV to execute an action on"))?;
        let state = container.state();

        let Some(transition) = self.transition(state, tag) else {
            log::debug!(
                "{}: no transition from {:?} on tag 0x{:02X}",
                self.name,
                state,
                tag
            );
            return Err(DecoderError::UnexpectedTag {
                grammar: self.name,
                state: format!("{:?}", state),
                tag,
            });
        };

        log::debug!(
            "{}: {:?} -> {:?} on 0x{:02X} ({})",
            self.name,
            transition.from,
            transition.to,
            tag,
            transition.name
        );

        self.check_enclosing(container, transition)?;

        container.set_state(transition.to);
        container.set_grammar_end_allowed(transition.follow_up == FollowUp::Optional);

        if let Some(action) = transition.action {
            action(container)?;
        }
        container.record_transition();
        Ok(())
    }

    fn check_enclosing(
        &self,
        container: &Asn1Container<S, T>,
        transition: &Transition<S, T>,
    ) -> DecodeResult<()> {
        let Some(allowed) = self.enclosing.get(&transition.to) else {
            return Ok(());
        };
        let enclosing = container.enclosing_state();
        if enclosing.is_some_and(|state| allowed.contains(&state)) {
            return Ok(());
        }

        log::debug!(
            "{}: {:?} is not allowed inside {:?}",
            self.name,
            transition.to,
            enclosing
        );
        Err(DecoderError::MisplacedTlv {
            grammar: self.name,
            construct: enclosing
                .map_or_else(|| "the top level".to_string(), |state| format!("{:?}", state)),
            tag: transition.tag,
        })
    }

    /// Check a constructed TLV that just closed against its declared ends
    ///
    /// # Error Handling
    /// Returns [`DecoderError::ConstructIncomplete`] when the state entered
    /// by its last direct child is not one it may end with.
    pub(crate) fn check_end(&self, states: &ConstructStates<S>) -> DecodeResult<()> {
        let Some(entered) = states.entered else {
            return Ok(());
        };
        let Some(allowed) = self.last_children.get(&entered) else {
            return Ok(());
        };
        if states.last_child.is_some_and(|state| allowed.contains(&state)) {
            return Ok(());
        }

        Err(DecoderError::ConstructIncomplete {
            grammar: self.name,
            construct: format!("{:?}", entered),
            state: states
                .last_child
                .map_or_else(|| "no child".to_string(), |state| format!("{:?}", state)),
        })
    }
}

impl<S: GrammarState, T: 'static> Debug for Grammar<S, T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Grammar")
            .field("name", &self.name)
            .field("initial_state", &self.initial_state)
            .field("transitions", &self.transitions.len())
            .finish()
    }
}

/// Grammar builder
pub struct GrammarBuilder<S: GrammarState, T: 'static> {
    name: &'static str,
    initial_state: S,
    transitions: HashMap<(S, u8), Transition<S, T>>,
    enclosing: HashMap<S, Vec<S>>,
    last_children: HashMap<S, Vec<S>>,
}

impl<S: GrammarState, T: 'static> GrammarBuilder<S, T> {
    pub fn new(name: &'static str, initial_state: S) -> Self {
        Self {
            name,
            initial_state,
            transitions: HashMap::new(),
            enclosing: HashMap::new(),
            last_children: HashMap::new(),
        }
    }

    /// Add a transition
    ///
    /// A `(from, tag)` pair may appear only once in a grammar.
    pub fn add(&mut self, transition: Transition<S, T>) -> &mut Self {
        let key = (transition.from, transition.tag);
        let previous = self.transitions.insert(key, transition);
        debug_assert!(
            previous.is_none(),
            "{}: duplicate transition from {:?} on tag 0x{:02X}",
            self.name,
            key.0,
            key.1
        );
        self
    }

    /// Add the same edge leaving each of `from`
    pub fn add_from_each(&mut self, from: &[S], transition: Transition<S, T>) -> &mut Self {
        for &state in from {
            let mut edge = transition.clone();
            edge.from = state;
            self.add(edge);
        }
        self
    }

    /// Declare the states entered by the direct children of the
    /// constructed TLVs entered in `constructs`
    ///
    /// Declarations add up. Once a state is declared as a child, a TLV
    /// entering it is only accepted directly inside one of its constructs.
    ///
    /// # Why Opt-In?
    /// Top level elements and CHOICE alternatives need no declaration, and
    /// a grammar without any keeps the plain transition table behavior.
    pub fn add_content(&mut self, constructs: &[S], children: &[S]) -> &mut Self {
        for &child in children {
            let enclosing = self.enclosing.entry(child).or_default();
            for &construct in constructs {
                if !enclosing.contains(&construct) {
                    enclosing.push(construct);
                }
            }
        }
        self
    }

    /// Declare the states the last direct child of the constructed TLVs
    /// entered in `constructs` may have entered
    pub fn add_end(&mut self, constructs: &[S], last_children: &[S]) -> &mut Self {
        for &construct in constructs {
            let ends = self.last_children.entry(construct).or_default();
            for &child in last_children {
                if !ends.contains(&child) {
                    ends.push(child);
                }
            }
        }
        self
    }

    pub fn build(self) -> Grammar<S, T> {
        log::trace!(
            "{}: built with {} transitions, {} declared constructs",
            self.name,
            self.transitions.len(),
            self.last_children.len()
        );
        Grammar {
            name: self.name,
            initial_state: self.initial_state,
            transitions: self.transitions,
            enclosing: self.enclosing,
            last_children: self.last_children,
        }
    }
}
