//! Path enumerator (spec §4.3): structural symbolic execution of a
//! function body, producing the statically known return value (if any)
//! together with every call path recorded along the way.

use crate::ast::{BinOp, Expr, Pattern};
use crate::error::Error;
use crate::span::Spanned;
use crate::sym::{self, Sym};
use std::collections::BTreeMap;

/// One call site: the callee's name and the symbolic value bound to each
/// of its formal arguments, in declaration order (spec §3 invariant I4:
/// `argmap.len()` must equal the callee's arity).
#[derive(Clone, Debug, PartialEq)]
pub struct CallRecord {
    pub callee: String,
    pub argmap: Vec<Option<Sym>>,
}

type Paths = Vec<Vec<CallRecord>>;

/// `[a] ⊗ [b] = [a ++ b : a ∈ paths₁, b ∈ paths₂]` (spec §4.3).
fn cartesian_concat(a: &Paths, b: &Paths) -> Paths {
    let mut out = Vec::with_capacity(a.len() * b.len().max(1));
    for pa in a {
        for pb in b {
            let mut combined = pa.clone();
            combined.extend(pb.clone());
            out.push(combined);
        }
    }
    out
}

fn no_paths() -> Paths {
    vec![Vec::new()]
}

/// Evaluate `e` under `env`, returning its statically known value (`None`
/// for ⊥) and every call path it contributes. `arities` resolves a
/// callee name to its declared arity so a fully-applied spine can be
/// recognised and partial application rejected (spec §3 invariant I4).
pub fn enumerate(
    e: &Spanned<Expr>,
    env: &BTreeMap<String, Sym>,
    arities: &BTreeMap<String, usize>,
) -> Result<(Option<Sym>, Paths), Error> {
    match &e.node {
        Expr::Int(n) => Ok((Some(Sym::Int(*n)), no_paths())),
        Expr::Bool(b) => Ok((Some(Sym::Bool(*b)), no_paths())),
        Expr::Var(x) => Ok((env.get(x).cloned(), no_paths())),
        Expr::Nil => Ok((Some(Sym::Int(0)), no_paths())),
        Expr::Cons(head, tail) => {
            let (_, head_paths) = enumerate(head, env, arities)?;
            let (tail_value, tail_paths) = enumerate(tail, env, arities)?;
            let value = tail_value.map(|v| {
                Sym::BinOp(BinOp::Add, Box::new(Sym::Int(1)), Box::new(v))
            });
            Ok((value, cartesian_concat(&head_paths, &tail_paths)))
        }
        Expr::Len(inner) => enumerate(inner, env, arities),
        // Pairs carry no size information of their own in this model;
        // only their evaluation paths matter.
        Expr::Pair(a, b) => {
            let (_, ap) = enumerate(a, env, arities)?;
            let (_, bp) = enumerate(b, env, arities)?;
            Ok((None, cartesian_concat(&ap, &bp)))
        }
        Expr::Not(inner) => {
            let (value, paths) = enumerate(inner, env, arities)?;
            Ok((value.map(|v| Sym::Not(Box::new(v))), paths))
        }
        Expr::BinOp(op, l, r) => {
            let (lv, lp) = enumerate(l, env, arities)?;
            let (rv, rp) = enumerate(r, env, arities)?;
            let value = match (lv, rv) {
                (Some(a), Some(b)) => Some(Sym::BinOp(*op, Box::new(a), Box::new(b))),
                _ => None,
            };
            Ok((value, cartesian_concat(&lp, &rp)))
        }
        Expr::Ite(c, t, f) => {
            let (_, cp) = enumerate(c, env, arities)?;
            let (_, tp) = enumerate(t, env, arities)?;
            let (_, fp) = enumerate(f, env, arities)?;
            let mut paths = cartesian_concat(&cp, &tp);
            paths.extend(cartesian_concat(&cp, &fp));
            Ok((None, paths))
        }
        Expr::Let {
            rec,
            ident,
            value,
            body,
            ..
        } => {
            if *rec {
                return Err(Error::UnsupportedConstruct {
                    what: "nested `let rec`".to_string(),
                    span: e.span,
                });
            }
            let (val_value, val_paths) = enumerate(value, env, arities)?;
            let mut inner_env = env.clone();
            inner_env.insert(ident.clone(), val_value.unwrap_or(sym::sym(ident.clone())));
            let (body_value, body_paths) = enumerate(body, &inner_env, arities)?;
            Ok((body_value, cartesian_concat(&val_paths, &body_paths)))
        }
        Expr::Func { .. } => Err(Error::UnsupportedConstruct {
            what: "higher-order lambda in function body".to_string(),
            span: e.span,
        }),
        Expr::Call(..) => enumerate_call(e, env, arities),
        Expr::Match(scrutinee, clauses) => {
            let (scrutinee_value, scrutinee_paths) = enumerate(scrutinee, env, arities)?;
            let mut paths = Vec::new();
            for clause in clauses {
                let clause_env = bind_pattern(&clause.pattern, scrutinee_value.as_ref(), env);
                let (_, clause_paths) = enumerate(&clause.body, &clause_env, arities)?;
                paths.extend(cartesian_concat(&scrutinee_paths, &clause_paths));
            }
            Ok((None, paths))
        }
    }
}

/// Bind a match clause's pattern against the scrutinee's known value
/// (spec §4.3's pattern-binding table): `x :: xs` leaves the head ⊥ and
/// gives the tail `value − 1`; `x₁ :: x₂ :: xs` subtracts 2; a bare
/// identifier receives the scrutinee's value itself; anything else binds
/// every identifier to ⊥.
fn bind_pattern(
    pattern: &Pattern,
    scrutinee: Option<&Sym>,
    env: &BTreeMap<String, Sym>,
) -> BTreeMap<String, Sym> {
    let mut out = env.clone();
    for h in pattern.bound_idents() {
        out.remove(h);
    }
    let minus = |v: &Sym, k: i64| Sym::BinOp(BinOp::Sub, Box::new(v.clone()), Box::new(Sym::Int(k)));
    match pattern {
        Pattern::Var(x) => {
            if let Some(v) = scrutinee {
                out.insert(x.clone(), v.clone());
            }
        }
        // `x :: xs`
        Pattern::Cons(_, tail) if matches!(**tail, Pattern::Var(_)) => {
            if let (Pattern::Var(t), Some(v)) = (&**tail, scrutinee) {
                out.insert(t.clone(), minus(v, 1));
            }
        }
        // `x1 :: x2 :: xs`
        Pattern::Cons(_, tail) => {
            if let Pattern::Cons(_, inner_tail) = &**tail {
                if let (Pattern::Var(t), Some(v)) = (&**inner_tail, scrutinee) {
                    out.insert(t.clone(), minus(v, 2));
                }
            }
        }
        _ => {}
    }
    out
}

/// Flatten a left-associated application spine `f a₁ a₂ …`, evaluate
/// each argument in order, and emit the single call record that the
/// call contributes (spec §4.3 "Function call").
fn enumerate_call(
    e: &Spanned<Expr>,
    env: &BTreeMap<String, Sym>,
    arities: &BTreeMap<String, usize>,
) -> Result<(Option<Sym>, Paths), Error> {
    let mut args = Vec::new();
    let mut cursor = e;
    let callee_name = loop {
        match &cursor.node {
            Expr::Call(f, arg) => {
                args.push(arg.as_ref());
                cursor = f;
            }
            Expr::Var(name) => break name.clone(),
            _ => {
                return Err(Error::UnsupportedConstruct {
                    what: "call to a non-identifier expression".to_string(),
                    span: cursor.span,
                })
            }
        }
    };
    args.reverse();

    let arity = arities
        .get(&callee_name)
        .copied()
        .ok_or_else(|| Error::UnsupportedConstruct {
            what: format!("call to undeclared function `{callee_name}`"),
            span: e.span,
        })?;
    if args.len() != arity {
        return Err(Error::UnsupportedConstruct {
            what: format!(
                "partial or over-application of `{callee_name}` ({} args, arity {arity})",
                args.len()
            ),
            span: e.span,
        });
    }

    let mut argmap = Vec::with_capacity(args.len());
    let mut paths = no_paths();
    for arg in &args {
        let (value, arg_paths) = enumerate(arg, env, arities)?;
        argmap.push(value);
        paths = cartesian_concat(&paths, &arg_paths);
    }

    let record = CallRecord {
        callee: callee_name,
        argmap,
    };
    let paths = paths
        .into_iter()
        .map(|mut tail| {
            let mut full = vec![record.clone()];
            full.append(&mut tail);
            full
        })
        .collect();
    Ok((None, paths))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::span::Span;

    fn dummy(node: Expr) -> Spanned<Expr> {
        Spanned::dummy(node)
    }

    fn var(x: &str) -> Spanned<Expr> {
        dummy(Expr::Var(x.to_string()))
    }

    #[test]
    fn literal_has_one_empty_path() {
        let env = BTreeMap::new();
        let arities = BTreeMap::new();
        let (value, paths) = enumerate(&dummy(Expr::Int(3)), &env, &arities).unwrap();
        assert_eq!(value, Some(Sym::Int(3)));
        assert_eq!(paths, vec![Vec::new()]);
    }

    #[test]
    fn if_then_else_doubles_paths() {
        let env = BTreeMap::new();
        let arities = BTreeMap::new();
        let e = dummy(Expr::Ite(
            Box::new(dummy(Expr::Bool(true))),
            Box::new(dummy(Expr::Int(1))),
            Box::new(dummy(Expr::Int(2))),
        ));
        let (value, paths) = enumerate(&e, &env, &arities).unwrap();
        assert_eq!(value, None);
        assert_eq!(paths.len(), 2);
    }

    #[test]
    fn fully_applied_call_emits_one_record() {
        let mut env = BTreeMap::new();
        env.insert("m".to_string(), sym::sym("m"));
        let mut arities = BTreeMap::new();
        arities.insert("f".to_string(), 1);

        let call = dummy(Expr::Call(Box::new(var("f")), Box::new(var("m"))));
        let (value, paths) = enumerate(&call, &env, &arities).unwrap();
        assert_eq!(value, None);
        assert_eq!(paths.len(), 1);
        assert_eq!(paths[0].len(), 1);
        assert_eq!(paths[0][0].callee, "f");
        assert_eq!(paths[0][0].argmap, vec![Some(sym::sym("m"))]);
    }

    #[test]
    fn partial_application_is_rejected() {
        let env = BTreeMap::new();
        let mut arities = BTreeMap::new();
        arities.insert("f".to_string(), 2);
        let call = dummy(Expr::Call(Box::new(var("f")), Box::new(dummy(Expr::Int(1)))));
        assert!(enumerate(&call, &env, &arities).is_err());
    }

    #[test]
    fn match_concatenates_clause_paths() {
        let mut env = BTreeMap::new();
        env.insert("xs".to_string(), sym::len_of(sym::sym("xs_list")));
        let arities = BTreeMap::new();
        let e = dummy(Expr::Match(
            Box::new(var("xs")),
            vec![
                crate::ast::Clause {
                    pattern: Pattern::Nil,
                    body: dummy(Expr::Int(0)),
                },
                crate::ast::Clause {
                    pattern: Pattern::Cons(
                        Box::new(Pattern::Var("h".to_string())),
                        Box::new(Pattern::Var("t".to_string())),
                    ),
                    body: var("t"),
                },
            ],
        ));
        let (value, paths) = enumerate(&e, &env, &arities).unwrap();
        assert_eq!(value, None);
        assert_eq!(paths.len(), 2);
        let _ = Span::dummy();
    }
}
