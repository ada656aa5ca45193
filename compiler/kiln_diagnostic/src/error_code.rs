//! Error codes: the message keys of every diagnostic.
//!
//! The first digit names the category:
//! - E2xxx: type diagnostics
//! - E3xxx: pattern diagnostics
//! - E4xxx: semantic diagnostics
//! - E9xxx: internal compiler errors

use std::fmt;

use crate::Severity;

/// Diagnostic category, derived from the code's range.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Category {
    Type,
    Pattern,
    Semantic,
    Internal,
}

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ErrorCode {
    // Type diagnostics (E2xxx)
    /// Type mismatch
    E2001,
    /// Unresolvable type name
    E2002,
    /// Unresolvable identifier
    E2003,
    /// No applicable overload
    E2004,
    /// Type argument could not be inferred
    E2005,
    /// Ambiguous overload
    E2006,
    /// Wrong number of type arguments
    E2007,
    /// Type argument outside its bound
    E2008,
    /// Variance violation
    E2009,
    /// Unknown member
    E2010,

    // Pattern diagnostics (E3xxx)
    /// Non-exhaustive match
    E3001,
    /// Unreachable pattern
    E3002,
    /// Pattern can never match the scrutinee type
    E3003,
    /// Deconstruction arity mismatch
    E3004,

    // Semantic diagnostics (E4xxx)
    /// Inaccessible member
    E4001,
    /// Duplicate declaration
    E4002,
    /// Incompatible override
    E4003,
    /// Override of a final method
    E4004,
    /// `@Override` without an overridden method
    E4005,
    /// Missing implementation of an abstract method
    E4006,
    /// Unknown annotation
    E4007,
    /// Use of a deprecated member
    E4008,
    /// Instantiation of an abstract class
    E4009,

    // Internal (E9xxx)
    /// Internal compiler error
    E9001,
}

impl ErrorCode {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorCode::E2001 => "E2001",
            ErrorCode::E2002 => "E2002",
            ErrorCode::E2003 => "E2003",
            ErrorCode::E2004 => "E2004",
            ErrorCode::E2005 => "E2005",
            ErrorCode::E2006 => "E2006",
            ErrorCode::E2007 => "E2007",
            ErrorCode::E2008 => "E2008",
            ErrorCode::E2009 => "E2009",
            ErrorCode::E2010 => "E2010",
            ErrorCode::E3001 => "E3001",
            ErrorCode::E3002 => "E3002",
            ErrorCode::E3003 => "E3003",
            ErrorCode::E3004 => "E3004",
            ErrorCode::E4001 => "E4001",
            ErrorCode::E4002 => "E4002",
            ErrorCode::E4003 => "E4003",
            ErrorCode::E4004 => "E4004",
            ErrorCode::E4005 => "E4005",
            ErrorCode::E4006 => "E4006",
            ErrorCode::E4007 => "E4007",
            ErrorCode::E4008 => "E4008",
            ErrorCode::E4009 => "E4009",
            ErrorCode::E9001 => "E9001",
        }
    }

    pub fn category(self) -> Category {
        match self.as_str().as_bytes()[1] {
            b'2' => Category::Type,
            b'3' => Category::Pattern,
            b'4' => Category::Semantic,
            _ => Category::Internal,
        }
    }

    /// Severity a diagnostic with this code gets unless overridden.
    pub fn default_severity(self) -> Severity {
        match self {
            ErrorCode::E3002 | ErrorCode::E4008 => Severity::Warning,
            _ => Severity::Error,
        }
    }

    /// Message template; `{0}`, `{1}`, ... are filled from the diagnostic's
    /// arguments.
    pub fn template(self) -> &'static str {
        match self {
            ErrorCode::E2001 => "type mismatch: expected `{0}`, found `{1}`",
            ErrorCode::E2002 => "cannot resolve type `{0}`",
            ErrorCode::E2003 => "cannot resolve symbol `{0}`",
            ErrorCode::E2004 => "no applicable overload of `{0}` for arguments ({1})",
            ErrorCode::E2005 => "cannot infer type argument `{0}` of `{1}`",
            ErrorCode::E2006 => "ambiguous call to `{0}`: {1} candidates apply",
            ErrorCode::E2007 => "`{0}` expects {1} type argument(s), found {2}",
            ErrorCode::E2008 => "type argument `{0}` is not within bound `{1}` of `{2}`",
            ErrorCode::E2009 => "{0} type parameter `{1}` appears in {2} position",
            ErrorCode::E2010 => "`{0}` has no member named `{1}`",
            ErrorCode::E3001 => "non-exhaustive match: {0} not covered",
            ErrorCode::E3002 => "unreachable pattern",
            ErrorCode::E3003 => "pattern of type `{0}` can never match `{1}`",
            ErrorCode::E3004 => "`{0}` has {1} component(s), pattern has {2}",
            ErrorCode::E4001 => "`{0}` is {1} in `{2}`",
            ErrorCode::E4002 => "duplicate declaration of `{0}`",
            ErrorCode::E4003 => "`{0}` cannot override `{1}`: {2}",
            ErrorCode::E4004 => "`{0}` overrides final method of `{1}`",
            ErrorCode::E4005 => "`{0}` is annotated `@Override` but overrides nothing",
            ErrorCode::E4006 => "`{0}` must implement abstract method `{1}` of `{2}`",
            ErrorCode::E4007 => "cannot resolve annotation `@{0}`",
            ErrorCode::E4008 => "`{0}` is deprecated",
            ErrorCode::E4009 => "cannot instantiate abstract class `{0}`",
            ErrorCode::E9001 => "internal compiler error: {0}",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests;
