//! Exhaustiveness and reachability via pattern-matrix usefulness.
//!
//! A row vector `v` is *useful* with respect to a matrix `P` when some
//! value matches `v` but no row of `P`. Then:
//!
//! - the group is exhaustive iff `_` is not useful w.r.t. all arms;
//! - arm `i` is reachable iff it is useful w.r.t. arms `0..i`.
//!
//! Constructor domains: `bool` has two constants; a sealed class has its
//! permitted variants, plus itself unless it is abstract; any other class
//! has the single constructor of deconstructing the class itself; every
//! other constant domain is infinite.
//!
//! # References
//!
//! - Maranget (2007) "Warnings for pattern matching"

use kiln_ir::{Literal, Name, StringInterner, Variance};
use kiln_types::{components_of, variant_type, ClassHierarchy, Idx, Pool, TypeData};

use crate::{PatId, PatKind, PatternArena};

/// A constructor heading a pattern.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub(crate) enum Ctor {
    Bool(bool),
    Literal(Literal),
    Class(Name),
}

/// Simplified pattern used by the matrix algorithm. Also used for witnesses.
#[derive(Clone, Eq, PartialEq, Hash, Debug)]
pub(crate) enum Pat {
    Wild,
    Ctor(Ctor, Vec<Pat>),
}

impl Pat {
    /// Flatten a typed pattern. Bindings are transparent.
    pub(crate) fn from_arena(arena: &PatternArena, id: PatId) -> Pat {
        match arena.kind(id) {
            PatKind::Wildcard => Pat::Wild,
            PatKind::Binding { inner, .. } => inner.map_or(Pat::Wild, |p| Pat::from_arena(arena, p)),
            PatKind::Constant(Literal::Bool(b)) => Pat::Ctor(Ctor::Bool(*b), Vec::new()),
            PatKind::Constant(lit) => Pat::Ctor(Ctor::Literal(*lit), Vec::new()),
            PatKind::Deconstruct { class, fields } => Pat::Ctor(
                Ctor::Class(*class),
                fields.iter().map(|&f| Pat::from_arena(arena, f)).collect(),
            ),
        }
    }

    pub(crate) fn render(&self, interner: &StringInterner) -> String {
        match self {
            Pat::Wild => "_".to_string(),
            Pat::Ctor(Ctor::Bool(b), _) => b.to_string(),
            Pat::Ctor(Ctor::Literal(lit), _) => render_literal(*lit, interner),
            Pat::Ctor(Ctor::Class(name), fields) => {
                let name = interner.lookup(*name);
                if fields.is_empty() {
                    return name.to_string();
                }
                let fields: Vec<String> = fields.iter().map(|f| f.render(interner)).collect();
                format!("{name}({})", fields.join(", "))
            }
        }
    }
}

pub(crate) fn render_literal(lit: Literal, interner: &StringInterner) -> String {
    match lit {
        Literal::Int(v) => v.to_string(),
        Literal::Float(bits) => f64::from_bits(bits).to_string(),
        Literal::Bool(b) => b.to_string(),
        Literal::Char(c) => format!("'{c}'"),
        Literal::Str(s) => format!("\"{}\"", interner.lookup(s)),
    }
}

/// All constructors of a type, when there are finitely many.
enum Domain {
    Finite(Vec<Ctor>),
    Infinite,
}

pub(crate) struct Usefulness<'a> {
    pub pool: &'a Pool,
    pub hierarchy: &'a dyn ClassHierarchy,
}

impl Usefulness<'_> {
    /// A witness row if `v` is useful w.r.t. `rows`, else `None`.
    ///
    /// `tys[i]` is the type of column `i`.
    pub(crate) fn useful(&self, rows: &[Vec<Pat>], v: &[Pat], tys: &[Idx]) -> Option<Vec<Pat>> {
        let Some((head, rest)) = v.split_first() else {
            return rows.is_empty().then(Vec::new);
        };
        let ty = tys.first().copied().unwrap_or(Idx::ANY);
        let rest_tys = tys.get(1..).unwrap_or(&[]);

        kiln_types::ensure_sufficient_stack(|| match head {
            Pat::Ctor(ctor, args) => {
                self.useful_ctor(rows, *ctor, args.clone(), rest, ty, rest_tys)
            }
            Pat::Wild => {
                let used = head_ctors(rows);
                match self.domain(ty) {
                    Domain::Finite(all) if all.iter().all(|c| used.contains(c)) => {
                        all.into_iter().find_map(|ctor| {
                            let arity = self.arg_types(ctor, ty).len();
                            self.useful_ctor(rows, ctor, vec![Pat::Wild; arity], rest, ty, rest_tys)
                        })
                    }
                    domain => {
                        let defaults: Vec<Vec<Pat>> = rows
                            .iter()
                            .filter(|row| matches!(row.first(), Some(Pat::Wild)))
                            .map(|row| row[1..].to_vec())
                            .collect();
                        let witness = self.useful(&defaults, rest, rest_tys)?;
                        let missing_head = match domain {
                            Domain::Finite(all) if !used.is_empty() => all
                                .into_iter()
                                .find(|c| !used.contains(c))
                                .map_or(Pat::Wild, |c| {
                                    let arity = self.arg_types(c, ty).len();
                                    Pat::Ctor(c, vec![Pat::Wild; arity])
                                }),
                            _ => Pat::Wild,
                        };
                        Some(std::iter::once(missing_head).chain(witness).collect())
                    }
                }
            }
        })
    }

    fn useful_ctor(
        &self,
        rows: &[Vec<Pat>],
        ctor: Ctor,
        args: Vec<Pat>,
        rest: &[Pat],
        ty: Idx,
        rest_tys: &[Idx],
    ) -> Option<Vec<Pat>> {
        let arity = args.len();
        let specialized: Vec<Vec<Pat>> = rows
            .iter()
            .filter_map(|row| specialize(row, ctor, arity))
            .collect();
        let mut arg_tys = self.arg_types(ctor, ty);
        arg_tys.resize(arity, Idx::ANY);
        let tys: Vec<Idx> = arg_tys.into_iter().chain(rest_tys.iter().copied()).collect();
        let v: Vec<Pat> = args.into_iter().chain(rest.iter().cloned()).collect();

        let witness = self.useful(&specialized, &v, &tys)?;
        let (fields, tail) = witness.split_at(arity.min(witness.len()));
        Some(
            std::iter::once(Pat::Ctor(ctor, fields.to_vec()))
                .chain(tail.iter().cloned())
                .collect(),
        )
    }

    fn domain(&self, ty: Idx) -> Domain {
        if self.pool.is_lenient(ty) || ty.is_none() {
            return Domain::Infinite;
        }
        match self.pool.get(ty) {
            TypeData::Bool => Domain::Finite(vec![Ctor::Bool(true), Ctor::Bool(false)]),
            TypeData::Class(name) | TypeData::Applied { base: name, .. } => {
                match self.hierarchy.closed_variants(name) {
                    Some(variants) => {
                        let mut ctors: Vec<Ctor> = variants.into_iter().map(Ctor::Class).collect();
                        // A concrete sealed class has direct instances of its own.
                        if !self.hierarchy.is_abstract(name) {
                            ctors.push(Ctor::Class(name));
                        }
                        Domain::Finite(ctors)
                    }
                    None => Domain::Finite(vec![Ctor::Class(name)]),
                }
            }
            TypeData::Var { param, .. } => self.domain(self.pool.upper_bound(param)),
            TypeData::Wildcard {
                variance: Variance::Covariant,
                bound,
            } => self.domain(bound),
            _ => Domain::Infinite,
        }
    }

    fn arg_types(&self, ctor: Ctor, ty: Idx) -> Vec<Idx> {
        match ctor {
            Ctor::Class(name) => {
                let variant = variant_type(self.pool, self.hierarchy, name, ty);
                components_of(self.pool, self.hierarchy, variant)
            }
            Ctor::Bool(_) | Ctor::Literal(_) => Vec::new(),
        }
    }
}

fn head_ctors(rows: &[Vec<Pat>]) -> Vec<Ctor> {
    let mut out = Vec::new();
    for row in rows {
        if let Some(Pat::Ctor(ctor, _)) = row.first() {
            if !out.contains(ctor) {
                out.push(*ctor);
            }
        }
    }
    out
}

/// Row specialized by `ctor` of `arity`, or `None` if the row cannot match.
fn specialize(row: &[Pat], ctor: Ctor, arity: usize) -> Option<Vec<Pat>> {
    let (head, rest) = row.split_first()?;
    let mut out = match head {
        Pat::Wild => vec![Pat::Wild; arity],
        Pat::Ctor(c, args) if *c == ctor => {
            let mut args = args.clone();
            args.resize(arity, Pat::Wild);
            args
        }
        Pat::Ctor(..) => return None,
    };
    out.extend(rest.iter().cloned());
    Some(out)
}

/// Result of analysing one match group.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Coverage {
    /// Rendered values no arm matches. Empty iff the group is exhaustive.
    pub witnesses: Vec<String>,
    /// Indices of arms no value can reach.
    pub unreachable: Vec<usize>,
}

impl Coverage {
    pub fn is_exhaustive(&self) -> bool {
        self.witnesses.is_empty()
    }
}

/// Analyse `arms` (in order) for a subject of type `subject`.
///
/// `None` entries are arms that failed typing; they match nothing and are
/// never reported as unreachable.
pub(crate) fn analyze(
    arena: &PatternArena,
    arms: &[Option<PatId>],
    subject: Idx,
    pool: &Pool,
    hierarchy: &dyn ClassHierarchy,
    interner: &StringInterner,
) -> Coverage {
    let checker = Usefulness { pool, hierarchy };
    let tys = [subject];
    let mut rows: Vec<Vec<Pat>> = Vec::new();
    let mut unreachable = Vec::new();
    for (index, arm) in arms.iter().enumerate() {
        let Some(arm) = arm else { continue };
        let row = vec![Pat::from_arena(arena, *arm)];
        if checker.useful(&rows, &row, &tys).is_none() {
            tracing::trace!(arm = index, "arm is unreachable");
            unreachable.push(index);
        }
        rows.push(row);
    }

    let witnesses = missing_values(&checker, &rows, subject)
        .into_iter()
        .map(|w| w.render(interner))
        .collect();
    Coverage {
        witnesses,
        unreachable,
    }
}

/// Every top-level constructor left uncovered, or a single witness for an
/// infinite domain.
fn missing_values(checker: &Usefulness<'_>, rows: &[Vec<Pat>], subject: Idx) -> Vec<Pat> {
    let tys = [subject];
    let Some(first) = checker.useful(rows, &[Pat::Wild], &tys) else {
        return Vec::new();
    };
    let Domain::Finite(all) = checker.domain(subject) else {
        return first.into_iter().take(1).collect();
    };
    let mut out: Vec<Pat> = all
        .into_iter()
        .filter_map(|ctor| {
            let arity = checker.arg_types(ctor, subject).len();
            let probe = [Pat::Ctor(ctor, vec![Pat::Wild; arity])];
            checker
                .useful(rows, &probe, &tys)
                .and_then(|w| w.into_iter().next())
        })
        .collect();
    if out.is_empty() {
        out.extend(first.into_iter().take(1));
    }
    out
}
