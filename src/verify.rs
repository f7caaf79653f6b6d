//! Verifier (spec §4.5): discharges one SMT obligation per enumerated
//! path and accepts a function iff every one of its paths is accepted.

use crate::error::Error;
use crate::pathenum::CallRecord;
use crate::smt::{
    term_vars, AffineNCall, Monomial, Obligation, OrderOracle, SatResult, SmtOracle,
    SymbolicBridge, Term,
};
use crate::sym::{self, Sym};
use crate::vcgen::{FuncDefs, FuncInfo, FunctionTest};
use std::collections::BTreeMap;

/// Outcome for a single enumerated path.
#[derive(Debug, Clone)]
pub struct PathResult {
    pub path_index: usize,
    pub accepted: bool,
}

/// Outcome for a whole `FunctionTest`: accepted iff every path is (spec
/// §4.5, closing paragraph: "A function is accepted iff all its paths are
/// accepted").
#[derive(Debug, Clone)]
pub struct VerificationResult {
    pub func_name: String,
    pub accepted: bool,
    pub paths: Vec<PathResult>,
}

/// Verify every `FunctionTest` against a fresh `OrderOracle` per function.
pub fn verify_all(
    defs: &FuncDefs,
    tests: &[FunctionTest],
) -> Result<Vec<VerificationResult>, Error> {
    tests
        .iter()
        .map(|t| verify_function(defs, t, &mut OrderOracle::new()))
        .collect()
}

/// Verify one function (spec §4.5 steps 1-7).
pub fn verify_function(
    defs: &FuncDefs,
    test: &FunctionTest,
    oracle: &mut dyn SmtOracle,
) -> Result<VerificationResult, Error> {
    // Step 1: build the main translator once, ahead of the per-path loop.
    let mut main_bridge = SymbolicBridge::new(test.name.clone());
    let (_, rhs_monomials) = main_bridge.decompose_to_linear_combination(&test.info.timespec, None)?;

    let mut paths = Vec::with_capacity(test.paths.len());
    for (path_index, path) in test.paths.iter().enumerate() {
        let accepted = verify_path(defs, test, path, &rhs_monomials, oracle, path_index)?;
        paths.push(PathResult { path_index, accepted });
    }
    let accepted = paths.iter().all(|p| p.accepted);
    Ok(VerificationResult {
        func_name: test.name.clone(),
        accepted,
        paths,
    })
}

fn verify_path(
    defs: &FuncDefs,
    test: &FunctionTest,
    path: &[CallRecord],
    rhs_monomials: &[Monomial],
    oracle: &mut dyn SmtOracle,
    path_index: usize,
) -> Result<bool, Error> {
    let mut lhs_monomials: Vec<Monomial> = Vec::new();

    // Step 2: one callee translator per call, cached by name within the
    // path (spec §4.5 step 2a: "ensure a translator exists for its
    // callee, caching one per function name").
    let mut bridges: BTreeMap<String, SymbolicBridge> = BTreeMap::new();

    for call in path {
        let callee_info = defs.infos.get(&call.callee).ok_or_else(|| {
            Error::UnsupportedConstruct {
                what: format!("call to undeclared function `{}`", call.callee),
                span: crate::span::Span::dummy(),
            }
        })?;

        let n_call = resolve_n_call(&test.info, callee_info, call)?;
        oracle.assert_domain_fact(&format!("n_call({}) >= 0", call.callee));

        let bridge = bridges
            .entry(call.callee.clone())
            .or_insert_with(|| SymbolicBridge::new(call.callee.clone()));
        let (_, mut monomials) =
            bridge.decompose_to_linear_combination(&callee_info.timespec, Some(n_call))?;
        lhs_monomials.append(&mut monomials);
    }

    // Step 4: a free positive constant absorbs big-O's hidden additive
    // constant. Dominant only when it is the sole LHS term (the constant-
    // cost edge case).
    lhs_monomials.push(Monomial {
        coeff_name: format!("c_{}_const", test.name),
        dominant: lhs_monomials.is_empty(),
        order: Default::default(),
        weight: 1.0,
        display: "1".to_string(),
        term: Term::Const(1.0),
    });

    // Step 3: domain constraints.
    declare_domain(oracle, &lhs_monomials);
    declare_domain(oracle, rhs_monomials);

    // Step 5-6: assemble the obligation; dominant/non-dominant tagging was
    // already attached by `decompose_to_linear_combination`.
    let obligation = Obligation {
        lhs: lhs_monomials,
        rhs: rhs_monomials.to_vec(),
    };

    // Step 7: discharge.
    match oracle.discharge(&obligation) {
        SatResult::Sat => Ok(true),
        SatResult::Unsat => Ok(false),
        SatResult::Unknown => Err(Error::SolverUnknown {
            func: test.name.clone(),
            path_index,
        }),
    }
}

/// Declare every basis variable a set of monomials depends on as a
/// non-negative real, plus the domain facts `log_n < n` and `pow_b_n > n`
/// for whichever logarithm/exponential bases appear (spec §4.5 step 3).
fn declare_domain(oracle: &mut dyn SmtOracle, monomials: &[Monomial]) {
    for m in monomials {
        oracle.declare_real(&m.coeff_name);
        if m.dominant {
            oracle.assert_positive(&m.coeff_name);
        } else {
            oracle.assert_nonneg(&m.coeff_name);
        }
        for v in term_vars(&m.term) {
            oracle.declare_real(&v);
            if v == "n" {
                oracle.assert_positive(&v);
            } else if v == "log_n" {
                oracle.assert_domain_fact("log_n < n");
            } else if let Some(base) = v.strip_prefix("pow_").and_then(|s| s.strip_suffix("_n")) {
                oracle.assert_domain_fact(&format!("pow_{base}_n > n"));
            } else {
                oracle.assert_nonneg(&v);
            }
        }
    }
}

/// Relate a call's arguments back to the caller's own size variable (spec
/// §4.2 "Substitution at a call site", §4.5 step 2a). The callee's size
/// template is instantiated with the call's actual argument values, then
/// recognised as an affine function of the caller's own size expression.
/// A leading measure-call wrapper shared by both sides (`len(...)`) is
/// peeled off first so the affine match operates on its argument, since
/// `to_affine` does not reach inside a `Sym::Call`.
fn resolve_n_call(
    caller: &FuncInfo,
    callee: &FuncInfo,
    call: &CallRecord,
) -> Result<AffineNCall, Error> {
    if callee.args.len() != call.argmap.len() {
        return Err(Error::UnsupportedConstruct {
            what: format!("argument count mismatch calling `{}`", call.callee),
            span: crate::span::Span::dummy(),
        });
    }

    let mut subst = BTreeMap::new();
    for (formal, actual) in callee.args.iter().zip(&call.argmap) {
        let value = actual.clone().ok_or_else(|| Error::UnsupportedConstruct {
            what: format!(
                "call to `{}`: argument value is not statically known",
                call.callee
            ),
            span: crate::span::Span::dummy(),
        })?;
        subst.insert(formal.clone(), value);
    }
    let n_call_raw = sym::substitute_vars(&callee.size, &subst);

    // A callee whose size is a bare constant (every stdlib function: `len`
    // itself excepted) contributes a constant `n_call` regardless of the
    // caller's own size shape, so no relation to the caller's `n` needs to
    // be established at all.
    if let Some(constant) = sym::to_affine(&n_call_raw).filter(|a| a.terms.is_empty()) {
        return Ok(AffineNCall { scale: 0.0, offset: constant.constant });
    }

    let (n_call_cmp, size_cmp) = strip_common_wrapper(&n_call_raw, &caller.size);

    let n_call_affine = sym::to_affine(&n_call_cmp);
    let size_affine = sym::to_affine(&size_cmp);
    match (n_call_affine, size_affine) {
        (Some(nc), Some(sz)) => match nc.proportional_to(&sz) {
            Some((scale, offset)) => Ok(AffineNCall { scale, offset }),
            None => Err(Error::UnsupportedConstruct {
                what: format!(
                    "call to `{}`: `{n_call_raw}` is not an affine function of the caller's size `{}`",
                    call.callee, caller.size
                ),
                span: crate::span::Span::dummy(),
            }),
        },
        _ => Err(Error::UnsupportedConstruct {
            what: format!(
                "call to `{}`: non-affine size relationship `{n_call_raw}`",
                call.callee
            ),
            span: crate::span::Span::dummy(),
        }),
    }
}

/// If both sides are applications of the same named measure (`len(...)`),
/// peel it off both so the affine comparison runs on the measured value
/// rather than the opaque wrapper.
fn strip_common_wrapper(a: &Sym, b: &Sym) -> (Sym, Sym) {
    match (a, b) {
        (Sym::Call(na, ia), Sym::Call(nb, ib)) if na == nb => {
            (ia.as_ref().clone(), ib.as_ref().clone())
        }
        _ => (a.clone(), b.clone()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::BinOp;
    use crate::cost;

    fn linear_scan() -> (FuncDefs, FunctionTest) {
        // scan(xs) = if len xs = 0 then 0 else 1 + scan(tail xs)
        // declared O(len xs), one recursive call with n_call = n - 1.
        let info = FuncInfo {
            args: vec!["scan_xs".to_string()],
            timespec: cost::big_o(cost::var("n")),
            size: sym::len_of(sym::sym("scan_xs")),
        };
        let mut defs = FuncDefs::new();
        defs.arities.insert("scan".to_string(), 1);
        defs.infos.insert(
            "scan".to_string(),
            FuncInfo {
                args: info.args.clone(),
                timespec: info.timespec.clone(),
                size: info.size.clone(),
            },
        );
        let call = CallRecord {
            callee: "scan".to_string(),
            argmap: vec![Some(Sym::BinOp(
                BinOp::Sub,
                Box::new(sym::len_of(sym::sym("scan_xs"))),
                Box::new(Sym::Int(1)),
            ))],
        };
        let test = FunctionTest {
            name: "scan".to_string(),
            info,
            paths: vec![vec![], vec![call]],
        };
        (defs, test)
    }

    #[test]
    fn linear_scan_is_accepted_as_on() {
        let (defs, test) = linear_scan();
        let result = verify_function(&defs, &test, &mut OrderOracle::new()).unwrap();
        assert!(result.accepted);
        assert!(result.paths.iter().all(|p| p.accepted));
    }

    #[test]
    fn linear_scan_rejected_against_o1() {
        let (defs, mut test) = linear_scan();
        test.info.timespec = cost::big_o(cost::one());
        let result = verify_function(&defs, &test, &mut OrderOracle::new()).unwrap();
        assert!(!result.accepted);
    }

    fn naive_fib() -> (FuncDefs, FunctionTest) {
        let info = FuncInfo {
            args: vec!["fib_n".to_string()],
            timespec: cost::big_o(cost::make_exp(2, cost::var("n"))),
            size: sym::sym("fib_n"),
        };
        let mut defs = FuncDefs::new();
        defs.arities.insert("fib".to_string(), 1);
        defs.infos.insert(
            "fib".to_string(),
            FuncInfo {
                args: info.args.clone(),
                timespec: info.timespec.clone(),
                size: info.size.clone(),
            },
        );
        let minus = |k: i64| {
            Some(Sym::BinOp(
                BinOp::Sub,
                Box::new(sym::sym("fib_n")),
                Box::new(Sym::Int(k)),
            ))
        };
        let path = vec![
            CallRecord { callee: "fib".to_string(), argmap: vec![minus(1)] },
            CallRecord { callee: "fib".to_string(), argmap: vec![minus(2)] },
        ];
        let test = FunctionTest { name: "fib".to_string(), info, paths: vec![path] };
        (defs, test)
    }

    #[test]
    fn naive_fibonacci_is_accepted_as_o_2_to_n() {
        let (defs, test) = naive_fib();
        let result = verify_function(&defs, &test, &mut OrderOracle::new()).unwrap();
        assert!(result.accepted);
    }

    #[test]
    fn naive_fibonacci_rejected_against_on() {
        let (defs, mut test) = naive_fib();
        test.info.timespec = cost::big_o(cost::var("n"));
        let result = verify_function(&defs, &test, &mut OrderOracle::new()).unwrap();
        assert!(!result.accepted);
    }

    #[test]
    fn unresolvable_argument_value_is_rejected() {
        let (defs, mut test) = linear_scan();
        test.paths[1][0].argmap = vec![None];
        let err = verify_function(&defs, &test, &mut OrderOracle::new());
        assert!(err.is_err());
    }
}
