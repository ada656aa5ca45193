//! Kiln patterns - typing, exhaustiveness and lowering of match arms.
//!
//! A pattern moves through three states. It is imported from syntax
//! *unbound*, becomes *typed* once checked against its subject (which
//! yields a new node), and is *compiled* once branch instructions have been
//! emitted for it.
//!
//! A [`MatchGroup`] collects the typed arms of one match. The
//! [`PatternCompiler`] judges the group for exhaustiveness and reachability,
//! then lowers it either as a branch chain (every arm decided by one test)
//! or as an if-chain (arbitrary nested tests).

mod arena;
mod branch;
mod exhaustive;
mod group;
mod typing;

#[cfg(test)]
mod test_support;

pub use arena::{PatId, PatKind, PatternArena, PatternNode, PatternState};
pub use branch::{BranchBuffer, BranchInstruction, BranchSink, Label, Slot};
pub use exhaustive::Coverage;
pub use group::{
    ArmTarget, GroupAnalysis, GroupArm, LoweredMatch, LoweringStrategy, MatchGroup,
    PatternCompiler,
};
pub use typing::{literal_type, PatternError};
