//! A compilation unit: one source file's members plus everything the
//! pipeline records about them.

use rustc_hash::FxHashMap;

use kiln_diagnostic::DiagnosticBuffer;
use kiln_ir::{ExprArena, ExprId, Name, Span};
use kiln_patterns::{LoweredMatch, MatchGroup, PatternArena};
use kiln_types::member::{MemberArena, MemberId, MemberKind, ResolutionState};
use kiln_types::Idx;

use crate::SymbolId;

/// Index of a unit within its session, also its position in output order.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug, Default)]
#[repr(transparent)]
pub struct UnitId(u32);

impl UnitId {
    #[inline]
    pub const fn new(raw: u32) -> Self {
        UnitId(raw)
    }

    #[inline]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// What an identifier, field access, call or `new` refers to.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Resolution {
    /// Parameter, `let` binding or pattern binding.
    Local(Name),
    Field(SymbolId),
    Method(SymbolId),
    Class(SymbolId),
    /// Reported; the expression has the `unresolved` type.
    Unresolved,
}

/// A generic type written in source, kept for bound checking once every
/// unit's bounds are resolved.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct BoundUse {
    pub member: MemberId,
    pub span: Span,
    pub ty: Idx,
}

/// One source file being compiled.
///
/// The unit exclusively owns its trees; the pipeline never touches two
/// units' trees from one stage invocation.
#[derive(Debug)]
pub struct CompilationUnit {
    pub id: UnitId,
    pub name: String,
    pub members: MemberArena,
    /// Top-level classes in declaration order.
    pub classes: Vec<MemberId>,
    /// Symbol of every member, indexed by [`MemberId`].
    pub symbols: Vec<SymbolId>,
    pub arena: ExprArena,
    pub patterns: PatternArena,
    pub expr_types: FxHashMap<ExprId, Idx>,
    pub resolutions: FxHashMap<ExprId, Resolution>,
    /// Typed arms of every match expression, keyed by the match node.
    pub match_groups: FxHashMap<ExprId, MatchGroup>,
    /// Branch lowering of every match expression, produced by check.
    pub lowered: FxHashMap<ExprId, LoweredMatch>,
    pub bound_uses: Vec<BoundUse>,
    pub diagnostics: DiagnosticBuffer,
    /// Last stage every member of the unit completed.
    pub progress: ResolutionState,
}

impl CompilationUnit {
    pub fn new(id: UnitId, name: impl Into<String>, arena: ExprArena) -> Self {
        CompilationUnit {
            id,
            name: name.into(),
            members: MemberArena::new(),
            classes: Vec::new(),
            symbols: Vec::new(),
            arena,
            patterns: PatternArena::new(),
            expr_types: FxHashMap::default(),
            resolutions: FxHashMap::default(),
            match_groups: FxHashMap::default(),
            lowered: FxHashMap::default(),
            bound_uses: Vec::new(),
            diagnostics: DiagnosticBuffer::new(),
            progress: ResolutionState::Unresolved,
        }
    }

    pub fn symbol(&self, member: MemberId) -> SymbolId {
        self.symbols[member.index()]
    }

    /// Type recorded for `expr` by resolve; `any` if none was recorded.
    pub fn type_of(&self, expr: ExprId) -> Idx {
        self.expr_types.get(&expr).copied().unwrap_or(Idx::ANY)
    }

    pub fn resolution(&self, expr: ExprId) -> Option<Resolution> {
        self.resolutions.get(&expr).copied()
    }

    /// Find a member by name, searching classes first.
    pub fn find(&self, name: Name) -> Option<MemberId> {
        self.members
            .iter()
            .find(|(_, m)| m.is_class() && m.name == name)
            .or_else(|| self.members.iter().find(|(_, m)| m.name == name))
            .map(|(id, _)| id)
    }

    /// The member of `class` named `name`.
    pub fn member_of(&self, class: MemberId, name: Name) -> Option<MemberId> {
        let MemberKind::Class { members, .. } = &self.members.get(class).kind else {
            return None;
        };
        members
            .iter()
            .copied()
            .find(|&m| self.members.get(m).name == name)
    }

    /// Whether every member reached `state`.
    pub fn all_members_at(&self, state: ResolutionState) -> bool {
        self.members.iter().all(|(_, m)| m.state == state)
    }
}
