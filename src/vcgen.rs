//! VC generator (spec §4.4): turns a parsed program into a `FuncDefs`
//! table and one `FunctionTest` per user-defined function.

use crate::ast::{self, BinOp, Def, Expr, TimeSpec, Type};
use crate::cost::{self, CostExpr};
use crate::error::Error;
use crate::pathenum::{self, CallRecord};
use crate::span::{Span, Spanned};
use crate::sym::{self, Sym};
use std::collections::BTreeMap;

/// Produced by walking a function's curried type (spec §3).
pub struct FuncInfo {
    pub args: Vec<String>,
    pub timespec: CostExpr,
    pub size: Sym,
}

/// `(name, info, paths)` (spec §3).
pub struct FunctionTest {
    pub name: String,
    pub info: FuncInfo,
    pub paths: Vec<Vec<CallRecord>>,
}

/// Global function table, accumulated during VC generation and immutable
/// afterwards (spec §5).
#[derive(Default)]
pub struct FuncDefs {
    pub arities: BTreeMap<String, usize>,
    pub infos: BTreeMap<String, FuncInfo>,
}

impl FuncDefs {
    pub fn new() -> Self {
        Self::default()
    }

    fn insert(&mut self, name: String, info: FuncInfo) {
        self.arities.insert(name.clone(), info.args.len());
        self.infos.insert(name, info);
    }
}

/// `readArray`, `writeArray`, `readList`, `newArray` are constant-time;
/// `len` is the builtin size measure, declared `O(1)` with itself as the
/// size driver (spec §4.4 "a hard-coded standard library program string
/// is parsed to pre-populate `FuncDefs`").
const STDLIB_SOURCE: &str = "\
let readArray (a : int array) (i : int) : int @ O(1) measure 0 = 0;
let writeArray (a : int array) (i : int) (v : int) : int @ O(1) measure 0 = 0;
let readList (xs : int list) (i : int) : int @ O(1) measure 0 = 0;
let newArray (n : int) : int array @ O(1) measure 0 = readArray
";

/// `len` is bound directly here rather than through `STDLIB_SOURCE`
/// because its size measure refers to its own argument (`len xs`), which
/// the parser's sugar for intermediate-arrow placeholders cannot express
/// as ordinary source text without inventing a second special case.
fn len_func_info() -> FuncInfo {
    let arg = "len_xs".to_string();
    FuncInfo {
        args: vec![arg.clone()],
        timespec: cost::big_o(cost::one()),
        size: sym::len_of(sym::sym(arg)),
    }
}

fn populate_stdlib(defs: &mut FuncDefs) -> Result<(), Error> {
    let program = crate::parser::parse_program(STDLIB_SOURCE, 0)?;
    for def in &program.defs {
        if let Def::Func { name, typ, .. } = def {
            let (args, _, timespec, size) = bind_args(name, typ)?;
            defs.insert(name.clone(), FuncInfo { args, timespec, size });
        }
    }
    defs.insert("len".to_string(), len_func_info());
    Ok(())
}

/// Walk a curried type `(x1:t1) -> ... -> (xk:tk) -> ret @ c measure s`,
/// binding a fresh symbol per argument. Per spec §6's desugaring rule,
/// only the innermost arrow (the one whose `ret` is not itself a
/// function type) carries the function's real cost/size annotation.
fn bind_args(
    func_name: &str,
    typ: &Type,
) -> Result<(Vec<String>, BTreeMap<String, Sym>, CostExpr, Sym), Error> {
    let mut args = Vec::new();
    let mut env = BTreeMap::new();
    let mut cursor = typ;
    loop {
        match cursor {
            Type::Func {
                ident, ret, cost, size, ..
            } => {
                let name = sym::fresh(&format!("{func_name}_{ident}_"));
                env.insert(ident.clone(), sym::sym(name.clone()));
                args.push(name);
                if matches!(ret.as_ref(), Type::Func { .. }) {
                    cursor = ret.as_ref();
                    continue;
                }
                let cost_sym = sym::spec_to_sym(cost.body(), &env)?;
                let size_sym = sym::spec_to_sym(size, &env)?;
                // spec §4.5 step 1: "installs the size→n substitution" —
                // wherever the cost spec mentions the exact shape declared
                // as the size measure, replace it with the canonical `n`.
                // A bare literal size (stdlib O(1) functions declare
                // `measure 0`) is left alone: substituting a literal would
                // rename unrelated numeric constants in the cost spec.
                let canonical_cost = if matches!(size_sym, Sym::Int(_) | Sym::Bool(_)) {
                    cost_sym
                } else {
                    sym::substitute_subtree(&cost_sym, &size_sym, &sym::sym("n"))
                };
                let timespec = match cost {
                    TimeSpec::BigO(_) => cost::big_o(sym_to_cost(&canonical_cost)?),
                    TimeSpec::Exact(_) => sym_to_cost(&canonical_cost)?,
                };
                return Ok((args, env, timespec, size_sym));
            }
            Type::BaseFunc { .. } => {
                return Err(Error::UnsupportedConstruct {
                    what: format!("function `{func_name}` has no declared cost/size"),
                    span: Span::dummy(),
                })
            }
            _ => {
                return Err(Error::UnsupportedConstruct {
                    what: format!("`{func_name}` is not declared with a function type"),
                    span: Span::dummy(),
                })
            }
        }
    }
}

/// Narrow a general symbolic expression down to the polynomial/log/
/// exponential lattice cost terms live in (spec §4.1). Anything outside
/// that lattice — booleans, `mod`, division, comparisons, arbitrary
/// measure calls other than `log` — is a `DomainError`.
fn sym_to_cost(s: &Sym) -> Result<CostExpr, Error> {
    match s {
        Sym::Int(n) => Ok(cost::val(*n)),
        Sym::Symbol(x) => Ok(cost::var(x.clone())),
        Sym::BinOp(BinOp::Add, l, r) => Ok(cost::make_add(sym_to_cost(l)?, sym_to_cost(r)?)),
        Sym::BinOp(BinOp::Sub, l, r) => Ok(cost::make_sub(sym_to_cost(l)?, sym_to_cost(r)?)),
        Sym::BinOp(BinOp::Mul, l, r) => Ok(cost::make_mul(sym_to_cost(l)?, sym_to_cost(r)?)),
        Sym::BinOp(BinOp::Pow, base, exponent) => match (base.as_ref(), exponent.as_ref()) {
            (_, Sym::Int(k)) if *k >= 0 => Ok(cost::make_poly(sym_to_cost(base)?, *k as u32)),
            (Sym::Int(b), _) if *b >= 2 => Ok(cost::make_exp(*b, sym_to_cost(exponent)?)),
            _ => Err(Error::DomainError {
                reason: format!("unsupported exponent form in cost spec: {s}"),
            }),
        },
        Sym::Call(name, arg) if name == "log" => Ok(cost::make_log(sym_to_cost(arg)?)),
        other => Err(Error::DomainError {
            reason: format!(
                "cost spec outside the supported polynomial/log/exponential lattice: {other}"
            ),
        }),
    }
}

/// Consume `count` nested `fun` layers to reach the actual function body.
fn strip_lambda_prefix(body: &Spanned<Expr>, count: usize) -> Result<&Spanned<Expr>, Error> {
    let mut cursor = body;
    for _ in 0..count {
        match &cursor.node {
            Expr::Func { body: inner, .. } => cursor = inner,
            _ => {
                return Err(Error::ParseError {
                    message: "function body has fewer `fun` layers than its type declares"
                        .to_string(),
                    span: cursor.span,
                })
            }
        }
    }
    Ok(cursor)
}

/// Process an entire program (spec §4.4): pre-populate the stdlib, then
/// walk each user definition in source order.
pub fn generate(program: &ast::Program) -> Result<(FuncDefs, Vec<FunctionTest>), Error> {
    let mut defs = FuncDefs::new();
    populate_stdlib(&mut defs)?;
    let mut tests = Vec::new();

    for def in &program.defs {
        match def {
            Def::Func { name, rec, typ, body } => {
                let (args, env, timespec, size) = bind_args(name, typ)?;
                let arity = args.len();

                if *rec {
                    defs.insert(
                        name.clone(),
                        FuncInfo {
                            args: args.clone(),
                            timespec: timespec.clone(),
                            size: size.clone(),
                        },
                    );
                }

                let inner_body = strip_lambda_prefix(body, arity)?;
                let (_, paths) = pathenum::enumerate(inner_body, &env, &defs.arities)?;

                if !*rec {
                    defs.insert(
                        name.clone(),
                        FuncInfo {
                            args: args.clone(),
                            timespec: timespec.clone(),
                            size: size.clone(),
                        },
                    );
                }

                tests.push(FunctionTest {
                    name: name.clone(),
                    info: FuncInfo { args, timespec, size },
                    paths,
                });
            }
            Def::Measure { name, body, .. } => {
                if name != "len" {
                    return Err(Error::UnsupportedConstruct {
                        what: format!("custom measure `{name}` (only `len` is supported)"),
                        span: body.span,
                    });
                }
            }
        }
    }

    Ok((defs, tests))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stdlib_populates_expected_arities() {
        let mut defs = FuncDefs::new();
        populate_stdlib(&mut defs).unwrap();
        assert_eq!(defs.arities.get("readArray"), Some(&2));
        assert_eq!(defs.arities.get("writeArray"), Some(&3));
        assert_eq!(defs.arities.get("readList"), Some(&2));
        assert_eq!(defs.arities.get("newArray"), Some(&1));
        assert_eq!(defs.arities.get("len"), Some(&1));
    }

    #[test]
    fn sym_to_cost_rejects_boolean_expressions() {
        assert!(sym_to_cost(&Sym::Bool(true)).is_err());
    }

    #[test]
    fn sym_to_cost_handles_polynomial_and_exponential_pow() {
        let n = Sym::Symbol("n".to_string());
        let n_squared = Sym::BinOp(BinOp::Pow, Box::new(n.clone()), Box::new(Sym::Int(2)));
        assert_eq!(sym_to_cost(&n_squared).unwrap(), cost::make_poly(cost::var("n"), 2));

        let two_to_n = Sym::BinOp(BinOp::Pow, Box::new(Sym::Int(2)), Box::new(n));
        assert_eq!(sym_to_cost(&two_to_n).unwrap(), cost::make_exp(2, cost::var("n")));
    }
}
