//! Symbolic algebra: the subset of a CAS this verifier actually needs
//! (spec §9 Design Notes — "implement an explicit-normal-form over the
//! subset actually needed (polynomial × log × exp). Do not reimplement a
//! full CAS.").
//!
//! `Sym` is the value/size/cost expression tree produced while walking the
//! AST (spec §3's "Function call record" argmap values, size and cost
//! templates). `to_affine` is the one genuinely algebraic operation we
//! perform on it: recognising `a*x + b` shapes so that a recursive call's
//! argument can be related back to the caller's own size variable (the
//! "solve n = phi(...) for a free variable" step of the symbolic bridge,
//! spec §4.2).

use crate::ast::{self, BinOp};
use crate::error::Error;
use std::collections::BTreeMap;
use std::fmt;

static FRESH_COUNTER: std::sync::atomic::AtomicU64 = std::sync::atomic::AtomicU64::new(0);

/// Allocate a globally unique fresh symbol name (spec §3 invariant I1).
pub fn fresh(prefix: &str) -> String {
    let id = FRESH_COUNTER.fetch_add(1, std::sync::atomic::Ordering::Relaxed);
    format!("{prefix}{id}")
}

#[derive(Clone, Debug, PartialEq)]
pub enum Sym {
    Int(i64),
    Bool(bool),
    Symbol(String),
    BinOp(BinOp, Box<Sym>, Box<Sym>),
    Not(Box<Sym>),
    /// Measure application, e.g. `len(xs)`. `len` is the only measure the
    /// verifier interprets; others are rejected before reaching here.
    Call(String, Box<Sym>),
    Ite(Box<Sym>, Box<Sym>, Box<Sym>),
}

impl fmt::Display for Sym {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sym::Int(n) => write!(f, "{n}"),
            Sym::Bool(b) => write!(f, "{b}"),
            Sym::Symbol(s) => write!(f, "{s}"),
            Sym::BinOp(op, l, r) => write!(f, "({l} {} {r})", op_str(*op)),
            Sym::Not(e) => write!(f, "not {e}"),
            Sym::Call(name, arg) => write!(f, "{name}({arg})"),
            Sym::Ite(c, t, e) => write!(f, "if {c} then {t} else {e}"),
        }
    }
}

fn op_str(op: BinOp) -> &'static str {
    match op {
        BinOp::Add => "+",
        BinOp::Sub => "-",
        BinOp::Mul => "*",
        BinOp::Div => "/",
        BinOp::Mod => "mod",
        BinOp::Pow => "^",
        BinOp::Eq => "=",
        BinOp::Neq => "<>",
        BinOp::Lt => "<",
        BinOp::Gt => ">",
        BinOp::Le => "<=",
        BinOp::Ge => ">=",
        BinOp::And => "&&",
        BinOp::Or => "||",
    }
}

pub fn sym(name: impl Into<String>) -> Sym {
    Sym::Symbol(name.into())
}

pub fn len_of(e: Sym) -> Sym {
    Sym::Call("len".to_string(), Box::new(e))
}

/// Replace every occurrence of `needle` (structural equality) inside
/// `haystack` with `replacement`. Used to install the size→n substitution
/// of spec §4.5 step 1 before a cost template is translated: wherever the
/// declared cost spec mentions the exact expression the function declared
/// as its size, that subtree becomes the canonical variable `n`.
pub fn substitute_subtree(haystack: &Sym, needle: &Sym, replacement: &Sym) -> Sym {
    if haystack == needle {
        return replacement.clone();
    }
    match haystack {
        Sym::Int(_) | Sym::Bool(_) | Sym::Symbol(_) => haystack.clone(),
        Sym::BinOp(op, l, r) => Sym::BinOp(
            *op,
            Box::new(substitute_subtree(l, needle, replacement)),
            Box::new(substitute_subtree(r, needle, replacement)),
        ),
        Sym::Not(e) => Sym::Not(Box::new(substitute_subtree(e, needle, replacement))),
        Sym::Call(name, arg) => {
            Sym::Call(name.clone(), Box::new(substitute_subtree(arg, needle, replacement)))
        }
        Sym::Ite(c, t, e) => Sym::Ite(
            Box::new(substitute_subtree(c, needle, replacement)),
            Box::new(substitute_subtree(t, needle, replacement)),
            Box::new(substitute_subtree(e, needle, replacement)),
        ),
    }
}

/// Replace every free symbol named in `subst` with its bound expression
/// (call-site argument binding, spec §4.5 step 2a: "re-expressed in terms
/// of the caller's n").
pub fn substitute_vars(e: &Sym, subst: &BTreeMap<String, Sym>) -> Sym {
    match e {
        Sym::Symbol(name) => subst.get(name).cloned().unwrap_or_else(|| e.clone()),
        Sym::Int(_) | Sym::Bool(_) => e.clone(),
        Sym::BinOp(op, l, r) => Sym::BinOp(
            *op,
            Box::new(substitute_vars(l, subst)),
            Box::new(substitute_vars(r, subst)),
        ),
        Sym::Not(inner) => Sym::Not(Box::new(substitute_vars(inner, subst))),
        Sym::Call(name, arg) => Sym::Call(name.clone(), Box::new(substitute_vars(arg, subst))),
        Sym::Ite(c, t, f) => Sym::Ite(
            Box::new(substitute_vars(c, subst)),
            Box::new(substitute_vars(t, subst)),
            Box::new(substitute_vars(f, subst)),
        ),
    }
}

/// Direct homomorphism from a logical predicate / size expression to `Sym`
/// (spec §4.4 "Spec-to-expression translation"). `forall`/`exists` are
/// rejected per the Open Question in spec §9.
pub fn spec_to_sym(spec: &ast::Spec, env: &BTreeMap<String, Sym>) -> Result<Sym, Error> {
    match spec {
        ast::Spec::Var(name) => env
            .get(name)
            .cloned()
            .ok_or_else(|| Error::UnsupportedConstruct {
                what: format!("unbound identifier `{name}` in spec"),
                span: crate::span::Span::dummy(),
            }),
        ast::Spec::Int(n) => Ok(Sym::Int(*n)),
        ast::Spec::Bool(b) => Ok(Sym::Bool(*b)),
        ast::Spec::Not(inner) => Ok(Sym::Not(Box::new(spec_to_sym(inner, env)?))),
        ast::Spec::BinOp(op, l, r) => Ok(Sym::BinOp(
            *op,
            Box::new(spec_to_sym(l, env)?),
            Box::new(spec_to_sym(r, env)?),
        )),
        ast::Spec::ForAll(..) | ast::Spec::Exists(..) => Err(Error::UnsupportedConstruct {
            what: "forall/exists in a spec expression".to_string(),
            span: crate::span::Span::dummy(),
        }),
        ast::Spec::MeasureCall(name, arg) => {
            if name != "len" && name != "log" {
                return Err(Error::UnsupportedConstruct {
                    what: format!("custom measure `{name}` (only `len` is supported)"),
                    span: crate::span::Span::dummy(),
                });
            }
            Ok(Sym::Call(name.clone(), Box::new(spec_to_sym(arg, env)?)))
        }
        ast::Spec::Ite(c, t, e) => Ok(Sym::Ite(
            Box::new(spec_to_sym(c, env)?),
            Box::new(spec_to_sym(t, env)?),
            Box::new(spec_to_sym(e, env)?),
        )),
    }
}

/// A linear combination `constant + sum(coeff * symbol)` — the one
/// algebraic normal form this module actually computes. Division by a
/// non-constant or multiplication of two non-constant symbols falls
/// outside the supported subset and yields `None`.
#[derive(Clone, Debug, PartialEq)]
pub struct Affine {
    pub terms: BTreeMap<String, f64>,
    pub constant: f64,
}

impl Affine {
    pub fn constant(c: f64) -> Self {
        Affine {
            terms: BTreeMap::new(),
            constant: c,
        }
    }

    pub fn symbol(name: &str) -> Self {
        let mut terms = BTreeMap::new();
        terms.insert(name.to_string(), 1.0);
        Affine {
            terms,
            constant: 0.0,
        }
    }

    fn scale(mut self, factor: f64) -> Self {
        for v in self.terms.values_mut() {
            *v *= factor;
        }
        self.constant *= factor;
        self
    }

    fn add(mut self, other: Affine) -> Self {
        for (k, v) in other.terms {
            *self.terms.entry(k).or_insert(0.0) += v;
        }
        self.constant += other.constant;
        self
    }

    /// `self` restricted to a single symbol `var`, if it depends on
    /// exactly that one free symbol: returns `(scale, offset)` such that
    /// `self == scale * var + offset`.
    pub fn as_univariate(&self, var: &str) -> Option<(f64, f64)> {
        if self.terms.len() > 1 || (self.terms.len() == 1 && !self.terms.contains_key(var)) {
            return None;
        }
        Some((self.terms.get(var).copied().unwrap_or(0.0), self.constant))
    }

    /// Is `self` a scalar multiple of `base` plus a constant offset, i.e.
    /// `self == scale * base + offset`? Used to relate a call's argument
    /// back to the caller's own size expression when the two are not
    /// literally the same symbol (spec §4.5 step 2a).
    pub fn proportional_to(&self, base: &Affine) -> Option<(f64, f64)> {
        let (pivot, pivot_coeff) = base.terms.iter().find(|(_, v)| **v != 0.0)?;
        let scale = self.terms.get(pivot).copied().unwrap_or(0.0) / pivot_coeff;
        for (k, v) in &base.terms {
            let expected = scale * v;
            if (self.terms.get(k).copied().unwrap_or(0.0) - expected).abs() > 1e-9 {
                return None;
            }
        }
        for (k, v) in &self.terms {
            if !base.terms.contains_key(k) && v.abs() > 1e-9 {
                return None;
            }
        }
        let offset = self.constant - scale * base.constant;
        Some((scale, offset))
    }
}

/// Expand `e` into affine normal form, if it stays within the supported
/// subset (spec §9: "implement an explicit-normal-form over the subset
/// actually needed"). Anything involving `len`, booleans, or a genuine
/// product/quotient of two non-constant terms returns `None`.
pub fn to_affine(e: &Sym) -> Option<Affine> {
    match e {
        Sym::Int(n) => Some(Affine::constant(*n as f64)),
        Sym::Symbol(s) => Some(Affine::symbol(s)),
        Sym::BinOp(BinOp::Add, l, r) => Some(to_affine(l)?.add(to_affine(r)?)),
        Sym::BinOp(BinOp::Sub, l, r) => Some(to_affine(l)?.add(to_affine(r)?.scale(-1.0))),
        Sym::BinOp(BinOp::Mul, l, r) => {
            let (la, ra) = (to_affine(l)?, to_affine(r)?);
            if la.terms.is_empty() {
                Some(ra.scale(la.constant))
            } else if ra.terms.is_empty() {
                Some(la.scale(ra.constant))
            } else {
                None
            }
        }
        Sym::BinOp(BinOp::Div, l, r) => {
            let ra = to_affine(r)?;
            if !ra.terms.is_empty() || ra.constant == 0.0 {
                return None;
            }
            Some(to_affine(l)?.scale(1.0 / ra.constant))
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn affine_recognises_halving() {
        // (len(xs)) / 2, expressed over a bound symbol `m`
        let e = Sym::BinOp(BinOp::Div, Box::new(sym("m")), Box::new(Sym::Int(2)));
        let a = to_affine(&e).unwrap();
        assert_eq!(a.as_univariate("m"), Some((0.5, 0.0)));
    }

    #[test]
    fn affine_recognises_decrement() {
        let e = Sym::BinOp(BinOp::Sub, Box::new(sym("m")), Box::new(Sym::Int(1)));
        let a = to_affine(&e).unwrap();
        assert_eq!(a.as_univariate("m"), Some((1.0, -1.0)));
    }

    #[test]
    fn affine_rejects_nonlinear() {
        let e = Sym::BinOp(BinOp::Mul, Box::new(sym("m")), Box::new(sym("m")));
        assert!(to_affine(&e).is_none());
    }
}
