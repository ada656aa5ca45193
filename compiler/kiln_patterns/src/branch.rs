//! Abstract branch instructions and single-pattern compilation.
//!
//! A compiled match is a flat sequence of instructions over opaque
//! [`Label`]s and evaluation [`Slot`]s. The code emitter maps labels to
//! jump targets and slots to locals.

use std::fmt;

use kiln_ir::{Literal, Name};

use crate::{PatId, PatKind, PatternArena, PatternState};

/// An opaque jump target.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub struct Label(u32);

impl Label {
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "L{}", self.0)
    }
}

/// A local holding an intermediate value during matching.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub struct Slot(u32);

impl Slot {
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "s{}", self.0)
    }
}

/// One step of a compiled match.
///
/// `Compare` and `InstanceOf` set the match condition that the following
/// conditional jump consumes.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub enum BranchInstruction {
    Compare { slot: Slot, value: Literal },
    InstanceOf { slot: Slot, class: Name },
    /// Drop the subject from the evaluation stack.
    Discard,
    /// Move the subject from the evaluation stack into `slot`.
    Store(Slot),
    /// Load component `index` of the value in `from` into `into`.
    Project { from: Slot, index: u32, into: Slot },
    Bind { name: Name, slot: Slot },
    JumpIfMismatch(Label),
    JumpIfMatch(Label),
    Jump(Label),
    Mark(Label),
    /// No arm matched.
    MatchError,
}

impl BranchInstruction {
    pub fn is_branch(&self) -> bool {
        matches!(
            self,
            BranchInstruction::JumpIfMismatch(_)
                | BranchInstruction::JumpIfMatch(_)
                | BranchInstruction::Jump(_)
        )
    }
}

/// Receives instructions and hands out fresh labels and slots.
pub trait BranchSink {
    fn emit(&mut self, instruction: BranchInstruction);
    fn fresh_label(&mut self) -> Label;
    fn fresh_slot(&mut self) -> Slot;
}

#[derive(Clone, Default, Debug, Eq, PartialEq)]
pub struct BranchBuffer {
    instructions: Vec<BranchInstruction>,
    next_label: u32,
    next_slot: u32,
}

impl BranchBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn instructions(&self) -> &[BranchInstruction] {
        &self.instructions
    }

    pub fn into_instructions(self) -> Vec<BranchInstruction> {
        self.instructions
    }

    pub fn branch_count(&self) -> usize {
        self.instructions.iter().filter(|i| i.is_branch()).count()
    }

    pub fn len(&self) -> usize {
        self.instructions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instructions.is_empty()
    }

    /// An empty buffer continuing this one's label and slot numbering.
    pub(crate) fn fork(&self) -> BranchBuffer {
        BranchBuffer {
            instructions: Vec::new(),
            next_label: self.next_label,
            next_slot: self.next_slot,
        }
    }

    /// Take back the numbering of a fork, returning its instructions.
    pub(crate) fn join(&mut self, fork: BranchBuffer) -> Vec<BranchInstruction> {
        self.next_label = self.next_label.max(fork.next_label);
        self.next_slot = self.next_slot.max(fork.next_slot);
        fork.instructions
    }
}

impl BranchSink for BranchBuffer {
    fn emit(&mut self, instruction: BranchInstruction) {
        self.instructions.push(instruction);
    }

    fn fresh_label(&mut self) -> Label {
        let label = Label(self.next_label);
        self.next_label += 1;
        label
    }

    fn fresh_slot(&mut self) -> Slot {
        let slot = Slot(self.next_slot);
        self.next_slot += 1;
        slot
    }
}

impl PatternArena {
    /// Emit the tests and bindings of `id`.
    ///
    /// With no `slot` the subject is on the evaluation stack. Any failing
    /// test jumps to `on_mismatch`; falling through means the pattern
    /// matched.
    ///
    /// # Panics
    /// Panics if a refutable pattern is compiled before it was typed.
    pub fn compile_pattern(
        &mut self,
        id: PatId,
        slot: Option<Slot>,
        on_mismatch: Label,
        sink: &mut dyn BranchSink,
    ) {
        if self.state(id) == PatternState::Unbound {
            panic!("internal compiler error: pattern {id:?} compiled before it was typed");
        }
        match self.kind(id).clone() {
            PatKind::Wildcard => {
                if slot.is_none() {
                    sink.emit(BranchInstruction::Discard);
                }
            }
            PatKind::Constant(value) => {
                let slot = ensure_slot(slot, sink);
                sink.emit(BranchInstruction::Compare { slot, value });
                sink.emit(BranchInstruction::JumpIfMismatch(on_mismatch));
            }
            PatKind::Binding { name, inner } => {
                let slot = ensure_slot(slot, sink);
                sink.emit(BranchInstruction::Bind { name, slot });
                if let Some(inner) = inner {
                    self.compile_pattern(inner, Some(slot), on_mismatch, sink);
                }
            }
            PatKind::Deconstruct { class, fields } => {
                let slot = ensure_slot(slot, sink);
                if !self.is_own_class(id, class) {
                    sink.emit(BranchInstruction::InstanceOf { slot, class });
                    sink.emit(BranchInstruction::JumpIfMismatch(on_mismatch));
                }
                self.compile_fields(slot, &fields, Some(on_mismatch), sink);
            }
        }
        self.mark_compiled(id);
    }

    /// Emit only the projections and bindings of an irrefutable-below-the-
    /// root pattern whose root test was emitted elsewhere.
    pub(crate) fn compile_bindings(&mut self, id: PatId, slot: Slot, sink: &mut dyn BranchSink) {
        match self.kind(id).clone() {
            PatKind::Wildcard | PatKind::Constant(_) => {}
            PatKind::Binding { name, inner } => {
                sink.emit(BranchInstruction::Bind { name, slot });
                if let Some(inner) = inner {
                    self.compile_bindings(inner, slot, sink);
                }
            }
            PatKind::Deconstruct { fields, .. } => self.compile_fields(slot, &fields, None, sink),
        }
        self.mark_compiled(id);
    }

    fn compile_fields(
        &mut self,
        slot: Slot,
        fields: &[PatId],
        on_mismatch: Option<Label>,
        sink: &mut dyn BranchSink,
    ) {
        for (index, &field) in (0u32..).zip(fields) {
            if self.is_wildcard(field) {
                continue;
            }
            let into = sink.fresh_slot();
            sink.emit(BranchInstruction::Project {
                from: slot,
                index,
                into,
            });
            match on_mismatch {
                Some(label) => self.compile_pattern(field, Some(into), label, sink),
                None => self.compile_bindings(field, into, sink),
            }
        }
    }
}

fn ensure_slot(slot: Option<Slot>, sink: &mut dyn BranchSink) -> Slot {
    slot.unwrap_or_else(|| {
        let fresh = sink.fresh_slot();
        sink.emit(BranchInstruction::Store(fresh));
        fresh
    })
}
