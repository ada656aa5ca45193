//! Match groups: typing, analysis, diagnostics and lowering of one match.

use kiln_diagnostic::{Diagnostic, DiagnosticSink, ErrorCode};
use kiln_ir::{Span, StringInterner};
use kiln_types::{ClassHierarchy, Idx, Pool};

use crate::exhaustive::{analyze, Coverage};
use crate::{
    BranchBuffer, BranchInstruction, BranchSink, Label, PatId, PatKind, PatternArena, Slot,
};

/// One arm of a match group.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct GroupArm {
    /// The typed pattern, or `None` if typing failed and was reported.
    pub pattern: Option<PatId>,
    pub span: Span,
}

/// All arms of one match construct over one subject.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub struct MatchGroup {
    pub subject: Idx,
    pub arms: Vec<GroupArm>,
    pub span: Span,
}

impl MatchGroup {
    pub fn new(subject: Idx, span: Span) -> Self {
        MatchGroup {
            subject,
            arms: Vec::new(),
            span,
        }
    }

    fn patterns(&self) -> Vec<Option<PatId>> {
        self.arms.iter().map(|arm| arm.pattern).collect()
    }
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum LoweringStrategy {
    /// One test per arm on the subject, jumping to the arm on a match.
    BranchChain,
    /// Each arm's full test sequence, falling through to the next on a
    /// mismatch.
    IfChain,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct GroupAnalysis {
    pub coverage: Coverage,
    pub switchable: bool,
}

impl GroupAnalysis {
    pub fn is_exhaustive(&self) -> bool {
        self.coverage.is_exhaustive()
    }
}

/// Entry point of one arm.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ArmTarget {
    pub label: Label,
    /// Bindings to perform on entry, before the arm body.
    pub bindings: Vec<BranchInstruction>,
}

/// The lowered form of a match group.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct LoweredMatch {
    pub strategy: LoweringStrategy,
    /// Dispatch sequence; the subject is on the evaluation stack on entry.
    pub instructions: Vec<BranchInstruction>,
    /// One target per arm, indexed like the group's arms.
    pub arms: Vec<ArmTarget>,
}

/// Types, analyses and lowers match groups against one type model.
pub struct PatternCompiler<'a> {
    pub pool: &'a Pool,
    pub hierarchy: &'a dyn ClassHierarchy,
    pub interner: &'a StringInterner,
}

impl<'a> PatternCompiler<'a> {
    pub fn new(pool: &'a Pool, hierarchy: &'a dyn ClassHierarchy, interner: &'a StringInterner) -> Self {
        PatternCompiler {
            pool,
            hierarchy,
            interner,
        }
    }

    /// Type one arm's pattern, reporting a failure instead of returning it.
    pub fn type_arm(
        &self,
        arena: &mut PatternArena,
        pattern: PatId,
        subject: Idx,
        sink: &mut dyn DiagnosticSink,
    ) -> Option<PatId> {
        match arena.with_type(pattern, subject, self.pool, self.hierarchy) {
            Ok(typed) => Some(typed),
            Err(err) => {
                sink.report(err.to_diagnostic(self.pool, self.interner));
                None
            }
        }
    }

    /// Judge exhaustiveness and reachability, reporting both.
    ///
    /// A subject whose type failed to resolve is not judged for
    /// exhaustiveness; that failure was already reported.
    #[tracing::instrument(level = "trace", skip_all, fields(arms = group.arms.len()))]
    pub fn check_group(
        &self,
        arena: &PatternArena,
        group: &MatchGroup,
        sink: &mut dyn DiagnosticSink,
    ) -> GroupAnalysis {
        let mut coverage = analyze(
            arena,
            &group.patterns(),
            group.subject,
            self.pool,
            self.hierarchy,
            self.interner,
        );
        if self.pool.contains_unresolved(group.subject) {
            coverage.witnesses.clear();
        }
        for &index in &coverage.unreachable {
            sink.report(Diagnostic::of(ErrorCode::E3002, group.arms[index].span));
        }
        if !coverage.is_exhaustive() {
            let witnesses: Vec<String> =
                coverage.witnesses.iter().map(|w| format!("`{w}`")).collect();
            sink.report(Diagnostic::of(ErrorCode::E3001, group.span).with_arg(witnesses.join(", ")));
        }
        let switchable = group
            .arms
            .iter()
            .all(|arm| arm.pattern.map_or(true, |p| arena.is_switchable(p)));
        tracing::trace!(
            exhaustive = coverage.is_exhaustive(),
            switchable,
            "analysed match group"
        );
        GroupAnalysis {
            coverage,
            switchable,
        }
    }

    /// Lower an analysed group to branch instructions.
    pub fn lower_group(
        &self,
        arena: &mut PatternArena,
        group: &MatchGroup,
        analysis: &GroupAnalysis,
    ) -> LoweredMatch {
        let mut buffer = BranchBuffer::new();
        let mut arms: Vec<ArmTarget> = group
            .arms
            .iter()
            .map(|_| ArmTarget {
                label: buffer.fresh_label(),
                bindings: Vec::new(),
            })
            .collect();
        let live: Vec<(usize, PatId)> = group
            .arms
            .iter()
            .enumerate()
            .filter_map(|(i, arm)| arm.pattern.map(|p| (i, p)))
            .collect();
        let exhaustive = analysis.is_exhaustive();

        // A leading wildcard needs no subject slot.
        if let Some(&(index, first)) = live.first() {
            if arena.is_wildcard(first) {
                arena.compile_pattern(first, None, arms[index].label, &mut buffer);
                buffer.emit(BranchInstruction::Jump(arms[index].label));
                return LoweredMatch {
                    strategy: LoweringStrategy::BranchChain,
                    instructions: buffer.into_instructions(),
                    arms,
                };
            }
        }

        let subject = buffer.fresh_slot();
        buffer.emit(BranchInstruction::Store(subject));

        let strategy = if analysis.switchable {
            LoweringStrategy::BranchChain
        } else {
            LoweringStrategy::IfChain
        };
        let mut terminated = false;
        for (position, &(index, pattern)) in live.iter().enumerate() {
            let target = arms[index].label;
            let last = position + 1 == live.len();
            if arena.is_irrefutable(pattern) || (last && exhaustive) {
                let bindings = entry_bindings(arena, pattern, subject, &mut buffer);
                match strategy {
                    LoweringStrategy::BranchChain => arms[index].bindings = bindings,
                    LoweringStrategy::IfChain => {
                        for instruction in bindings {
                            buffer.emit(instruction);
                        }
                    }
                }
                buffer.emit(BranchInstruction::Jump(target));
                terminated = true;
                break;
            }
            match strategy {
                LoweringStrategy::BranchChain => {
                    self.emit_switch_test(arena, pattern, subject, &mut buffer);
                    buffer.emit(BranchInstruction::JumpIfMatch(target));
                    arms[index].bindings = entry_bindings(arena, pattern, subject, &mut buffer);
                }
                LoweringStrategy::IfChain => {
                    let next = buffer.fresh_label();
                    arena.compile_pattern(pattern, Some(subject), next, &mut buffer);
                    buffer.emit(BranchInstruction::Jump(target));
                    buffer.emit(BranchInstruction::Mark(next));
                }
            }
        }
        if !terminated {
            buffer.emit(BranchInstruction::MatchError);
        }

        LoweredMatch {
            strategy,
            instructions: buffer.into_instructions(),
            arms,
        }
    }

    /// The single root test of a switchable pattern.
    fn emit_switch_test(
        &self,
        arena: &PatternArena,
        pattern: PatId,
        slot: Slot,
        buffer: &mut BranchBuffer,
    ) {
        match arena.kind(pattern) {
            PatKind::Constant(value) => buffer.emit(BranchInstruction::Compare {
                slot,
                value: *value,
            }),
            PatKind::Binding {
                inner: Some(inner), ..
            } => self.emit_switch_test(arena, *inner, slot, buffer),
            PatKind::Deconstruct { class, .. } => buffer.emit(BranchInstruction::InstanceOf {
                slot,
                class: *class,
            }),
            PatKind::Wildcard | PatKind::Binding { inner: None, .. } => {}
        }
    }

    /// Analyse, report and lower in one step.
    pub fn compile_match(
        &self,
        arena: &mut PatternArena,
        group: &MatchGroup,
        sink: &mut dyn DiagnosticSink,
    ) -> (GroupAnalysis, LoweredMatch) {
        let analysis = self.check_group(arena, group, sink);
        let lowered = self.lower_group(arena, group, &analysis);
        (analysis, lowered)
    }
}

/// Bindings performed on arm entry, numbered after the dispatch code.
fn entry_bindings(
    arena: &mut PatternArena,
    pattern: PatId,
    subject: Slot,
    buffer: &mut BranchBuffer,
) -> Vec<BranchInstruction> {
    let mut entry = buffer.fork();
    arena.compile_bindings(pattern, subject, &mut entry);
    buffer.join(entry)
}
