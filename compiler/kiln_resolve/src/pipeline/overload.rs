//! Overload selection.
//!
//! Candidates are narrowed in four steps: arity, applicability (after
//! receiver and inferred method substitution), exact match, and finally
//! most specific. Anything left over is ambiguous.

use smallvec::SmallVec;

use kiln_ir::Name;
use kiln_types::{
    ancestors, concrete_type, is_same_type, is_super_type_of, Idx, TypeContext, TypeError,
};

use super::Pipeline;
use crate::{Symbol, SymbolId, SymbolKind};

/// A method visible through some receiver, with its parameter types
/// instantiated for that receiver.
#[derive(Clone, Debug)]
pub(super) struct Candidate {
    pub id: SymbolId,
    pub symbol: Symbol,
    /// The receiver's instantiation of the declaring class.
    pub owner_ty: Idx,
    pub params: SmallVec<[Idx; 4]>,
}

#[derive(Clone, Debug)]
pub(super) struct Selected {
    pub id: SymbolId,
    pub ret: Idx,
    /// Method type parameters inference could not determine.
    pub unbound: Vec<TypeError>,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub(super) enum OverloadError {
    /// No method of that name anywhere in the receiver's hierarchy.
    NoSuchMethod,
    NoneApplicable,
    Ambiguous(usize),
}

/// Methods named `name` visible on `receiver`, subclass first. A method
/// overridden further down the hierarchy is not listed again.
pub(super) fn visible_methods(pipeline: &Pipeline<'_>, receiver: Idx, name: Name) -> Vec<Candidate> {
    let Pipeline { pool, symbols, .. } = *pipeline;
    let mut out: Vec<Candidate> = Vec::new();
    for anc in ancestors(pool, symbols, receiver) {
        let Some(base) = pool.base_name(anc) else {
            continue;
        };
        let ctx = TypeContext::from_class_args(symbols, base, &pool.args(anc));
        for (id, symbol) in symbols.members_named(base, name, SymbolKind::Method) {
            let params: SmallVec<[Idx; 4]> = symbol
                .signature
                .as_ref()
                .map(|s| s.params.iter().map(|&p| concrete_type(pool, p, &ctx)).collect())
                .unwrap_or_default();
            if out.iter().any(|c| c.params == params) {
                continue;
            }
            out.push(Candidate {
                id,
                symbol,
                owner_ty: anc,
                params,
            });
        }
    }
    out
}

pub(super) fn select(
    pipeline: &Pipeline<'_>,
    receiver: Idx,
    name: Name,
    args: &[Idx],
) -> Result<Selected, OverloadError> {
    let Pipeline { pool, symbols, .. } = *pipeline;
    let visible = visible_methods(pipeline, receiver, name);
    if visible.is_empty() {
        return Err(OverloadError::NoSuchMethod);
    }

    let mut applicable: Vec<(Candidate, Selected)> = Vec::new();
    for candidate in visible {
        if candidate.symbol.arity != args.len() {
            continue;
        }
        let Some(signature) = candidate.symbol.signature.clone() else {
            continue;
        };
        let Some(base) = pool.base_name(candidate.owner_ty) else {
            continue;
        };
        let mut ctx = TypeContext::from_class_args(symbols, base, &pool.args(candidate.owner_ty));
        for (&param, &arg) in signature.params.iter().zip(args) {
            ctx.infer(pool, symbols, param, arg);
        }
        let unbound = ctx.fill_unbound(&signature.type_params);
        let fits = signature
            .params
            .iter()
            .zip(args)
            .all(|(&param, &arg)| is_super_type_of(pool, symbols, concrete_type(pool, param, &ctx), arg));
        tracing::trace!(
            method = %pipeline.interner.lookup(name),
            candidate = ?candidate.id,
            fits,
            "overload applicability"
        );
        if fits {
            let selected = Selected {
                id: candidate.id,
                ret: concrete_type(pool, signature.ty, &ctx),
                unbound,
            };
            applicable.push((candidate, selected));
        }
    }

    match applicable.len() {
        0 => return Err(OverloadError::NoneApplicable),
        1 => return Ok(applicable.remove(0).1),
        _ => {}
    }

    let exact: Vec<usize> = applicable
        .iter()
        .enumerate()
        .filter(|(_, (c, _))| c.params.iter().zip(args).all(|(&p, &a)| is_same_type(p, a)))
        .map(|(i, _)| i)
        .collect();
    if let [only] = exact[..] {
        tracing::trace!(candidate = ?applicable[only].0.id, "exact overload match");
        return Ok(applicable.swap_remove(only).1);
    }

    let most_specific: Vec<usize> = (0..applicable.len())
        .filter(|&i| {
            (0..applicable.len())
                .filter(|&j| j != i)
                .all(|j| more_specific(pipeline, &applicable[i].0, &applicable[j].0))
        })
        .collect();
    match most_specific[..] {
        [only] => {
            tracing::trace!(candidate = ?applicable[only].0.id, "most specific overload");
            Ok(applicable.swap_remove(only).1)
        }
        _ => Err(OverloadError::Ambiguous(applicable.len())),
    }
}

/// `a` accepts nothing `b` does not: each parameter of `a` is a subtype of
/// the corresponding parameter of `b`.
fn more_specific(pipeline: &Pipeline<'_>, a: &Candidate, b: &Candidate) -> bool {
    a.params
        .iter()
        .zip(&b.params)
        .all(|(&pa, &pb)| is_super_type_of(pipeline.pool, pipeline.symbols, pb, pa))
}
