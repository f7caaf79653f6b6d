//! Cost algebra: a normalised representation of symbolic cost terms with
//! smart constructors and basis expansion (spec §4.1).
//!
//! Every variant is reachable only through the `make_*`/`val`/`one` smart
//! constructors in this module — they are the only place simplification
//! happens, so a `CostExpr` value is always already in normal form.

use std::collections::HashSet;
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CostOp {
    Add,
    Sub,
    Mul,
}

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum CostExpr {
    Int(i64),
    Var(String),
    Binary(CostOp, Box<CostExpr>, Box<CostExpr>),
    Log(Box<CostExpr>),
    /// `base^degree` with a known, fixed, integer `degree >= 2`.
    Poly(Box<CostExpr>, u32),
    /// `base^exponent` where `exponent` is itself symbolic.
    Exp(i64, Box<CostExpr>),
    BigO(Box<CostExpr>),
}

impl fmt::Display for CostExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CostExpr::Int(n) => write!(f, "{n}"),
            CostExpr::Var(x) => write!(f, "{x}"),
            CostExpr::Binary(op, l, r) => {
                let sym = match op {
                    CostOp::Add => "+",
                    CostOp::Sub => "-",
                    CostOp::Mul => "*",
                };
                write!(f, "({l} {sym} {r})")
            }
            CostExpr::Log(b) => write!(f, "log({b})"),
            CostExpr::Poly(b, d) => write!(f, "({b}^{d})"),
            CostExpr::Exp(b, e) => write!(f, "({b}^{e})"),
            CostExpr::BigO(b) => write!(f, "O({b})"),
        }
    }
}

pub fn val(x: i64) -> CostExpr {
    CostExpr::Int(x)
}

pub fn one() -> CostExpr {
    CostExpr::Int(1)
}

pub fn var(name: impl Into<String>) -> CostExpr {
    CostExpr::Var(name.into())
}

pub fn big_o(body: CostExpr) -> CostExpr {
    CostExpr::BigO(Box::new(body))
}

pub fn make_add(a: CostExpr, b: CostExpr) -> CostExpr {
    if let CostExpr::Int(0) = a {
        return b;
    }
    if let CostExpr::Int(0) = b {
        return a;
    }
    if let (CostExpr::Int(x), CostExpr::Int(y)) = (&a, &b) {
        return val(x + y);
    }
    CostExpr::Binary(CostOp::Add, Box::new(a), Box::new(b))
}

pub fn make_sub(a: CostExpr, b: CostExpr) -> CostExpr {
    if let CostExpr::Int(0) = b {
        return a;
    }
    if let (CostExpr::Int(x), CostExpr::Int(y)) = (&a, &b) {
        return val(x - y);
    }
    CostExpr::Binary(CostOp::Sub, Box::new(a), Box::new(b))
}

/// `(base, degree)` if `e` is a monomial in some base, else `None`.
fn base_degree(e: &CostExpr) -> Option<(CostExpr, u32)> {
    match e {
        CostExpr::Var(_) => Some((e.clone(), 1)),
        CostExpr::Poly(b, d) => Some(((**b).clone(), *d)),
        _ => None,
    }
}

pub fn make_mul(a: CostExpr, b: CostExpr) -> CostExpr {
    if let CostExpr::Int(0) = a {
        return val(0);
    }
    if let CostExpr::Int(1) = a {
        return b;
    }
    if let CostExpr::Int(0) = b {
        return val(0);
    }
    if let CostExpr::Int(1) = b {
        return a;
    }
    if let (CostExpr::Int(x), CostExpr::Int(y)) = (&a, &b) {
        return val(x * y);
    }

    if let (Some((base_a, deg_a)), Some((base_b, deg_b))) = (base_degree(&a), base_degree(&b)) {
        if base_a == base_b {
            return make_poly(base_a, deg_a + deg_b);
        }
    }

    CostExpr::Binary(CostOp::Mul, Box::new(a), Box::new(b))
}

pub fn make_poly(base: CostExpr, degree: u32) -> CostExpr {
    if degree == 0 {
        return one();
    }
    if degree == 1 {
        return base;
    }
    if let CostExpr::Int(b) = base {
        return val(b.pow(degree));
    }
    CostExpr::Poly(Box::new(base), degree)
}

pub fn make_exp(base: i64, exponent: CostExpr) -> CostExpr {
    CostExpr::Exp(base, Box::new(exponent))
}

pub fn make_log(body: CostExpr) -> CostExpr {
    if let CostExpr::Int(1) = body {
        return val(0);
    }
    if let CostExpr::Poly(base, degree) = body {
        return make_mul(val(degree as i64), make_log(*base));
    }
    CostExpr::Log(Box::new(body))
}

/// Set of monomials needed to upper-bound linear combinations of `t`
/// under `O(.)` (spec §4.1).
pub fn expand_basis(expr: &CostExpr) -> HashSet<CostExpr> {
    match expr {
        CostExpr::Int(_) => HashSet::from([one()]),
        CostExpr::Var(_) => HashSet::from([expr.clone(), one()]),
        CostExpr::Log(_) => HashSet::from([expr.clone(), one()]),
        CostExpr::Poly(base, degree) => (0..=*degree)
            .map(|i| make_poly((**base).clone(), i))
            .collect(),
        CostExpr::Exp(..) => HashSet::from([expr.clone(), one()]),
        CostExpr::Binary(CostOp::Mul, l, r) => {
            let left = expand_basis(l);
            let right = expand_basis(r);
            let mut out = HashSet::new();
            for u in &left {
                for v in &right {
                    out.insert(make_mul(u.clone(), v.clone()));
                }
            }
            out
        }
        CostExpr::Binary(CostOp::Add, l, r) | CostExpr::Binary(CostOp::Sub, l, r) => {
            expand_basis(l).into_iter().chain(expand_basis(r)).collect()
        }
        CostExpr::BigO(_) => HashSet::from([expr.clone(), one()]),
    }
}

/// Result of `decompose`: a deterministic `fixed` part plus a `basis` of
/// monomials whose coefficients are left free for the SMT encoding.
#[derive(Clone, Debug)]
pub struct DecomposedCost {
    pub fixed: CostExpr,
    pub basis: HashSet<CostExpr>,
}

impl fmt::Display for DecomposedCost {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut sorted: Vec<String> = self.basis.iter().map(|b| b.to_string()).collect();
        sorted.sort_by_key(|s| std::cmp::Reverse(s.len()));
        write!(f, "[Fixed: {} | Basis: {{{}}}]", self.fixed, sorted.join(", "))
    }
}

/// `decompose(t)` (spec §4.1): splits a cost term into a known fixed part
/// and a basis of monomials with free coefficients.
pub fn decompose(expr: &CostExpr) -> DecomposedCost {
    match expr {
        CostExpr::BigO(body) => DecomposedCost {
            fixed: val(0),
            basis: expand_basis(body),
        },
        CostExpr::Binary(CostOp::Add, l, r) => {
            let left = decompose(l);
            let right = decompose(r);
            DecomposedCost {
                fixed: make_add(left.fixed, right.fixed),
                basis: left.basis.into_iter().chain(right.basis).collect(),
            }
        }
        CostExpr::Binary(CostOp::Sub, l, r) => {
            let left = decompose(l);
            let right = decompose(r);
            DecomposedCost {
                fixed: make_sub(left.fixed, right.fixed),
                basis: left.basis.into_iter().chain(right.basis).collect(),
            }
        }
        CostExpr::Binary(CostOp::Mul, l, r) => {
            let left = decompose(l);
            let right = decompose(r);
            let new_fixed = make_mul(left.fixed.clone(), right.fixed.clone());
            let mut new_basis = HashSet::new();

            let left_fixed_zero = matches!(left.fixed, CostExpr::Int(0));
            let right_fixed_zero = matches!(right.fixed, CostExpr::Int(0));

            if !left_fixed_zero {
                for b in &right.basis {
                    new_basis.insert(make_mul(left.fixed.clone(), b.clone()));
                }
            }
            if !right_fixed_zero {
                for b in &left.basis {
                    new_basis.insert(make_mul(b.clone(), right.fixed.clone()));
                }
            }
            for b1 in &left.basis {
                for b2 in &right.basis {
                    new_basis.insert(make_mul(b1.clone(), b2.clone()));
                }
            }

            DecomposedCost {
                fixed: new_fixed,
                basis: new_basis,
            }
        }
        other => DecomposedCost {
            fixed: other.clone(),
            basis: HashSet::new(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn n() -> CostExpr {
        var("n")
    }

    #[test]
    fn add_absorbs_zero() {
        assert_eq!(make_add(n(), val(0)), n());
        assert_eq!(make_add(val(0), n()), n());
    }

    #[test]
    fn mul_absorbs_zero_and_one() {
        assert_eq!(make_mul(n(), val(1)), n());
        assert_eq!(make_mul(n(), val(0)), val(0));
    }

    #[test]
    fn log_of_one_is_zero() {
        assert_eq!(make_log(val(1)), val(0));
    }

    #[test]
    fn log_of_power_pulls_out_degree() {
        let n_cubed = make_poly(n(), 3);
        assert_eq!(make_log(n_cubed), make_mul(val(3), make_log(n())));
    }

    #[test]
    fn mul_folds_same_monomial_base() {
        let n2 = make_poly(n(), 2);
        assert_eq!(make_mul(n(), n()), n2.clone());
        assert_eq!(make_mul(n2, n()), make_poly(n(), 3));
    }

    #[test]
    fn decompose_big_o_log_n() {
        let d = decompose(&big_o(make_log(n())));
        assert_eq!(d.fixed, val(0));
        assert_eq!(d.basis, HashSet::from([make_log(n()), one()]));
    }

    #[test]
    fn decompose_big_o_n_log_n() {
        let body = make_mul(n(), make_log(n()));
        let d = decompose(&big_o(body));
        assert_eq!(d.fixed, val(0));
        assert_eq!(
            d.basis,
            HashSet::from([make_mul(n(), make_log(n())), n(), make_log(n()), one()])
        );
    }

    #[test]
    fn decompose_big_o_two_to_the_n() {
        let d = decompose(&big_o(make_exp(2, n())));
        assert_eq!(d.fixed, val(0));
        assert_eq!(d.basis, HashSet::from([make_exp(2, n()), one()]));
    }

    #[test]
    fn decompose_const_plus_big_o_n() {
        let d = decompose(&make_add(val(100), big_o(n())));
        assert_eq!(d.fixed, val(100));
        assert_eq!(d.basis, HashSet::from([n(), one()]));
    }

    #[test]
    fn decompose_n_times_big_o_n() {
        let d = decompose(&make_mul(n(), big_o(n())));
        assert_eq!(d.fixed, val(0));
        assert_eq!(d.basis, HashSet::from([make_poly(n(), 2), n()]));
    }

    #[test]
    fn decompose_big_o_n_squared() {
        let d = decompose(&big_o(make_poly(n(), 2)));
        assert_eq!(d.fixed, val(0));
        assert_eq!(d.basis, HashSet::from([make_poly(n(), 2), n(), one()]));
    }

    #[test]
    fn basis_monotonicity_under_product() {
        let b_only = expand_basis(&var("b"));
        let c_only = expand_basis(&var("c"));
        let product = expand_basis(&make_mul(var("b"), var("c")));
        for m in b_only.union(&c_only) {
            assert!(
                product.contains(m) || m == &one(),
                "missing basis element {m}"
            );
        }
    }
}
