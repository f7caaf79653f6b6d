//! Recursive-descent parser for the verifier's source language (spec §6
//! grammar sketch).
//!
//! Only the curried-parameter-list form of `let` is accepted
//! (`let [rec] f (x1:t1)...(xk:tk) : tret @ c measure s = e`); the bare
//! `let f : t = e` form from spec.md's grammar bullet list is not needed
//! by any canonical scenario and is out of scope here (recorded in
//! DESIGN.md). Every intermediate arrow of the curried sugar gets the
//! placeholder `@ O(1) measure 1` spec.md's desugaring rule prescribes;
//! only the innermost carries the declared cost/size.

use crate::ast::{BinOp, Clause, Def, Delta, Expr, Pattern, Program, Spec, TimeSpec, Type};
use crate::error::Error;
use crate::lexeme::Lexeme;
use crate::lexer::Lexer;
use crate::span::{Span, Spanned};

pub fn parse_program(source: &str, file_id: u16) -> Result<Program, Error> {
    let (tokens, diagnostics) = Lexer::new(source, file_id).tokenize();
    if let Some(d) = diagnostics.into_iter().next() {
        return Err(Error::ParseError {
            message: d.message,
            span: d.span,
        });
    }
    let mut parser = Parser { tokens: &tokens, pos: 0 };
    let defs = parser.parse_defs()?;
    Ok(Program { defs })
}

struct Parser<'a> {
    tokens: &'a [Spanned<Lexeme>],
    pos: usize,
}

impl<'a> Parser<'a> {
    fn peek(&self) -> &Lexeme {
        &self.tokens[self.pos].node
    }

    fn span(&self) -> Span {
        self.tokens[self.pos].span
    }

    fn advance(&mut self) -> Lexeme {
        let tok = self.tokens[self.pos].node.clone();
        if self.pos + 1 < self.tokens.len() {
            self.pos += 1;
        }
        tok
    }

    fn expect(&mut self, expected: Lexeme) -> Result<(), Error> {
        if *self.peek() == expected {
            self.advance();
            Ok(())
        } else {
            Err(Error::ParseError {
                message: format!(
                    "expected {}, found {}",
                    expected.description(),
                    self.peek().description()
                ),
                span: self.span(),
            })
        }
    }

    fn eat_ident(&mut self) -> Result<String, Error> {
        match self.peek().clone() {
            Lexeme::Ident(name) => {
                self.advance();
                Ok(name)
            }
            other => Err(Error::ParseError {
                message: format!("expected identifier, found {}", other.description()),
                span: self.span(),
            }),
        }
    }

    fn starts_atom(&self) -> bool {
        matches!(
            self.peek(),
            Lexeme::Integer(_)
                | Lexeme::Ident(_)
                | Lexeme::True
                | Lexeme::False
                | Lexeme::NilList
                | Lexeme::LParen
                | Lexeme::Len
        )
    }

    // ---- top level ----

    fn parse_defs(&mut self) -> Result<Vec<Def>, Error> {
        let mut defs = Vec::new();
        loop {
            if *self.peek() == Lexeme::Eof {
                break;
            }
            defs.push(self.parse_def()?);
            if *self.peek() == Lexeme::Semicolon {
                self.advance();
            } else {
                break;
            }
        }
        Ok(defs)
    }

    fn parse_def(&mut self) -> Result<Def, Error> {
        match self.peek() {
            Lexeme::Let => self.parse_funcdef(),
            Lexeme::Measure => self.parse_measuredef(),
            other => Err(Error::ParseError {
                message: format!("expected a definition, found {}", other.description()),
                span: self.span(),
            }),
        }
    }

    fn parse_funcdef(&mut self) -> Result<Def, Error> {
        self.expect(Lexeme::Let)?;
        let rec = if *self.peek() == Lexeme::Rec {
            self.advance();
            true
        } else {
            false
        };
        let name = self.eat_ident()?;

        if *self.peek() != Lexeme::LParen {
            return Err(Error::ParseError {
                message: "expected a curried parameter list `(x : t)` after the function name"
                    .to_string(),
                span: self.span(),
            });
        }
        let params = self.parse_params()?;

        self.expect(Lexeme::Colon)?;
        let ret_type = self.parse_simple_type()?;
        self.expect(Lexeme::At)?;
        let cost = self.parse_cspec()?;
        self.expect(Lexeme::Measure)?;
        let size = self.parse_espec_or()?;
        self.expect(Lexeme::Eq)?;
        let body_span_start = self.span();
        let inner_body = self.parse_expr()?;

        let mut typ = Type::Func {
            ident: params.last().unwrap().0.clone(),
            arg: Box::new(params.last().unwrap().1.clone()),
            ret: Box::new(ret_type),
            cost,
            size,
        };
        for (ident, arg_typ) in params[..params.len() - 1].iter().rev() {
            typ = Type::Func {
                ident: ident.clone(),
                arg: Box::new(arg_typ.clone()),
                ret: Box::new(typ),
                cost: TimeSpec::BigO(Spec::Int(1)),
                size: Spec::Int(1),
            };
        }

        let mut body = Spanned::new(inner_body.node, body_span_start);
        for (ident, arg_typ) in params.into_iter().rev() {
            body = Spanned::new(
                Expr::Func {
                    ident,
                    typ: arg_typ,
                    body: Box::new(body),
                },
                body_span_start,
            );
        }

        Ok(Def::Func { name, rec, typ, body })
    }

    fn parse_measuredef(&mut self) -> Result<Def, Error> {
        self.expect(Lexeme::Measure)?;
        let name = self.eat_ident()?;
        self.expect(Lexeme::LParen)?;
        let arg = self.eat_ident()?;
        self.expect(Lexeme::Colon)?;
        let arg_typ = self.parse_simple_type()?;
        self.expect(Lexeme::RParen)?;
        self.expect(Lexeme::Colon)?;
        let ret_typ = self.parse_simple_type()?;
        self.expect(Lexeme::Eq)?;
        let body = self.parse_expr()?;
        Ok(Def::Measure {
            name,
            arg,
            arg_typ,
            ret_typ,
            body,
        })
    }

    fn parse_params(&mut self) -> Result<Vec<(String, Type)>, Error> {
        let mut params = Vec::new();
        while *self.peek() == Lexeme::LParen {
            self.advance();
            let ident = self.eat_ident()?;
            self.expect(Lexeme::Colon)?;
            let typ = self.parse_simple_type()?;
            self.expect(Lexeme::RParen)?;
            params.push((ident, typ));
        }
        if params.is_empty() {
            return Err(Error::ParseError {
                message: "expected at least one `(x : t)` parameter".to_string(),
                span: self.span(),
            });
        }
        Ok(params)
    }

    // ---- types ----

    fn parse_simple_type(&mut self) -> Result<Type, Error> {
        if *self.peek() == Lexeme::LBrace {
            self.advance();
            let ident = self.eat_ident()?;
            self.expect(Lexeme::Colon)?;
            let shape = self.parse_delta()?;
            self.expect(Lexeme::Pipe)?;
            let pred = self.parse_espec_or()?;
            self.expect(Lexeme::RBrace)?;
            Ok(Type::Refinement { ident, shape, pred })
        } else {
            Ok(Type::Base(self.parse_delta()?))
        }
    }

    fn parse_delta(&mut self) -> Result<Delta, Error> {
        let mut base = match self.peek().clone() {
            Lexeme::Unit => {
                self.advance();
                Delta::Unit
            }
            Lexeme::Int => {
                self.advance();
                Delta::Int
            }
            Lexeme::Bool => {
                self.advance();
                Delta::Bool
            }
            Lexeme::Ident(name) => {
                self.advance();
                Delta::Param(name)
            }
            Lexeme::LParen => {
                self.advance();
                let mut shapes = vec![self.parse_delta()?];
                while *self.peek() == Lexeme::Comma {
                    self.advance();
                    shapes.push(self.parse_delta()?);
                }
                self.expect(Lexeme::RParen)?;
                if shapes.len() == 1 {
                    shapes.into_iter().next().unwrap()
                } else {
                    Delta::Tuple(shapes)
                }
            }
            other => {
                return Err(Error::ParseError {
                    message: format!("expected a type, found {}", other.description()),
                    span: self.span(),
                })
            }
        };
        loop {
            match self.peek() {
                Lexeme::List => {
                    self.advance();
                    base = Delta::List(Box::new(base));
                }
                Lexeme::Array => {
                    self.advance();
                    base = Delta::Array(Box::new(base));
                }
                _ => break,
            }
        }
        Ok(base)
    }

    fn parse_cspec(&mut self) -> Result<TimeSpec, Error> {
        if let Lexeme::Ident(name) = self.peek().clone() {
            if name == "O" {
                self.advance();
                self.expect(Lexeme::LParen)?;
                let body = self.parse_espec_or()?;
                self.expect(Lexeme::RParen)?;
                return Ok(TimeSpec::BigO(body));
            }
        }
        Ok(TimeSpec::Exact(self.parse_espec_or()?))
    }

    // ---- specs (logical predicates / size / cost expressions) ----

    fn parse_espec_or(&mut self) -> Result<Spec, Error> {
        let mut left = self.parse_espec_and()?;
        while *self.peek() == Lexeme::OrOr {
            self.advance();
            let right = self.parse_espec_and()?;
            left = Spec::BinOp(BinOp::Or, Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_espec_and(&mut self) -> Result<Spec, Error> {
        let mut left = self.parse_espec_cmp()?;
        while *self.peek() == Lexeme::AndAnd {
            self.advance();
            let right = self.parse_espec_cmp()?;
            left = Spec::BinOp(BinOp::And, Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_espec_cmp(&mut self) -> Result<Spec, Error> {
        let left = self.parse_espec_add()?;
        let op = match self.peek() {
            Lexeme::Eq => BinOp::Eq,
            Lexeme::Neq => BinOp::Neq,
            Lexeme::Lt => BinOp::Lt,
            Lexeme::Gt => BinOp::Gt,
            Lexeme::Le => BinOp::Le,
            Lexeme::Ge => BinOp::Ge,
            _ => return Ok(left),
        };
        self.advance();
        let right = self.parse_espec_add()?;
        Ok(Spec::BinOp(op, Box::new(left), Box::new(right)))
    }

    fn parse_espec_add(&mut self) -> Result<Spec, Error> {
        let mut left = self.parse_espec_mul()?;
        loop {
            let op = match self.peek() {
                Lexeme::Plus => BinOp::Add,
                Lexeme::Minus => BinOp::Sub,
                _ => break,
            };
            self.advance();
            let right = self.parse_espec_mul()?;
            left = Spec::BinOp(op, Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_espec_mul(&mut self) -> Result<Spec, Error> {
        let mut left = self.parse_espec_unary()?;
        loop {
            let op = match self.peek() {
                Lexeme::Star => BinOp::Mul,
                Lexeme::Slash => BinOp::Div,
                Lexeme::Mod => BinOp::Mod,
                _ => break,
            };
            self.advance();
            let right = self.parse_espec_unary()?;
            left = Spec::BinOp(op, Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn parse_espec_unary(&mut self) -> Result<Spec, Error> {
        match self.peek() {
            Lexeme::Not => {
                self.advance();
                Ok(Spec::Not(Box::new(self.parse_espec_unary()?)))
            }
            Lexeme::Minus => {
                self.advance();
                let inner = self.parse_espec_unary()?;
                Ok(Spec::BinOp(BinOp::Sub, Box::new(Spec::Int(0)), Box::new(inner)))
            }
            _ => self.parse_espec_pow(),
        }
    }

    fn parse_espec_pow(&mut self) -> Result<Spec, Error> {
        let base = self.parse_espec_app()?;
        if *self.peek() == Lexeme::Caret {
            self.advance();
            let exponent = self.parse_espec_pow()?;
            Ok(Spec::BinOp(BinOp::Pow, Box::new(base), Box::new(exponent)))
        } else {
            Ok(base)
        }
    }

    fn parse_espec_app(&mut self) -> Result<Spec, Error> {
        match self.peek().clone() {
            Lexeme::Len => {
                self.advance();
                let arg = self.parse_espec_atom()?;
                Ok(Spec::MeasureCall("len".to_string(), Box::new(arg)))
            }
            Lexeme::Forall => {
                self.advance();
                let idents = self.parse_ident_list()?;
                self.expect(Lexeme::Dot)?;
                let mut body = self.parse_espec_or()?;
                for ident in idents.into_iter().rev() {
                    body = Spec::ForAll(ident, Box::new(body));
                }
                Ok(body)
            }
            Lexeme::Exists => {
                self.advance();
                let idents = self.parse_ident_list()?;
                self.expect(Lexeme::Dot)?;
                let mut body = self.parse_espec_or()?;
                for ident in idents.into_iter().rev() {
                    body = Spec::Exists(ident, Box::new(body));
                }
                Ok(body)
            }
            Lexeme::If => {
                self.advance();
                let c = self.parse_espec_or()?;
                self.expect(Lexeme::Then)?;
                let t = self.parse_espec_or()?;
                self.expect(Lexeme::Else)?;
                let e = self.parse_espec_or()?;
                Ok(Spec::Ite(Box::new(c), Box::new(t), Box::new(e)))
            }
            Lexeme::Ident(name) => {
                self.advance();
                if self.starts_atom() {
                    let arg = self.parse_espec_atom()?;
                    Ok(Spec::MeasureCall(name, Box::new(arg)))
                } else {
                    Ok(Spec::Var(name))
                }
            }
            _ => self.parse_espec_atom(),
        }
    }

    fn parse_ident_list(&mut self) -> Result<Vec<String>, Error> {
        let mut idents = vec![self.eat_ident()?];
        while *self.peek() == Lexeme::Comma {
            self.advance();
            idents.push(self.eat_ident()?);
        }
        Ok(idents)
    }

    fn parse_espec_atom(&mut self) -> Result<Spec, Error> {
        match self.peek().clone() {
            Lexeme::Integer(n) => {
                self.advance();
                Ok(Spec::Int(n))
            }
            Lexeme::True => {
                self.advance();
                Ok(Spec::Bool(true))
            }
            Lexeme::False => {
                self.advance();
                Ok(Spec::Bool(false))
            }
            Lexeme::Ident(name) => {
                self.advance();
                Ok(Spec::Var(name))
            }
            Lexeme::LParen => {
                self.advance();
                let inner = self.parse_espec_or()?;
                self.expect(Lexeme::RParen)?;
                Ok(inner)
            }
            other => Err(Error::ParseError {
                message: format!("expected a size/cost expression, found {}", other.description()),
                span: self.span(),
            }),
        }
    }

    // ---- expressions ----

    fn parse_expr(&mut self) -> Result<Spanned<Expr>, Error> {
        self.parse_or()
    }

    fn parse_or(&mut self) -> Result<Spanned<Expr>, Error> {
        let mut left = self.parse_and()?;
        while *self.peek() == Lexeme::OrOr {
            let span = self.span();
            self.advance();
            let right = self.parse_and()?;
            left = Spanned::new(Expr::BinOp(BinOp::Or, Box::new(left), Box::new(right)), span);
        }
        Ok(left)
    }

    fn parse_and(&mut self) -> Result<Spanned<Expr>, Error> {
        let mut left = self.parse_cmp()?;
        while *self.peek() == Lexeme::AndAnd {
            let span = self.span();
            self.advance();
            let right = self.parse_cmp()?;
            left = Spanned::new(Expr::BinOp(BinOp::And, Box::new(left), Box::new(right)), span);
        }
        Ok(left)
    }

    fn parse_cmp(&mut self) -> Result<Spanned<Expr>, Error> {
        let left = self.parse_cons()?;
        let op = match self.peek() {
            Lexeme::Eq => BinOp::Eq,
            Lexeme::Neq => BinOp::Neq,
            Lexeme::Lt => BinOp::Lt,
            Lexeme::Gt => BinOp::Gt,
            Lexeme::Le => BinOp::Le,
            Lexeme::Ge => BinOp::Ge,
            _ => return Ok(left),
        };
        let span = self.span();
        self.advance();
        let right = self.parse_cons()?;
        Ok(Spanned::new(Expr::BinOp(op, Box::new(left), Box::new(right)), span))
    }

    fn parse_cons(&mut self) -> Result<Spanned<Expr>, Error> {
        let head = self.parse_add()?;
        if *self.peek() == Lexeme::ColonColon {
            let span = self.span();
            self.advance();
            let tail = self.parse_cons()?;
            Ok(Spanned::new(Expr::Cons(Box::new(head), Box::new(tail)), span))
        } else {
            Ok(head)
        }
    }

    fn parse_add(&mut self) -> Result<Spanned<Expr>, Error> {
        let mut left = self.parse_mul()?;
        loop {
            let op = match self.peek() {
                Lexeme::Plus => BinOp::Add,
                Lexeme::Minus => BinOp::Sub,
                _ => break,
            };
            let span = self.span();
            self.advance();
            let right = self.parse_mul()?;
            left = Spanned::new(Expr::BinOp(op, Box::new(left), Box::new(right)), span);
        }
        Ok(left)
    }

    fn parse_mul(&mut self) -> Result<Spanned<Expr>, Error> {
        let mut left = self.parse_unary()?;
        loop {
            let op = match self.peek() {
                Lexeme::Star => BinOp::Mul,
                Lexeme::Slash => BinOp::Div,
                Lexeme::Mod => BinOp::Mod,
                _ => break,
            };
            let span = self.span();
            self.advance();
            let right = self.parse_unary()?;
            left = Spanned::new(Expr::BinOp(op, Box::new(left), Box::new(right)), span);
        }
        Ok(left)
    }

    fn parse_unary(&mut self) -> Result<Spanned<Expr>, Error> {
        match self.peek() {
            Lexeme::Not => {
                let span = self.span();
                self.advance();
                let inner = self.parse_unary()?;
                Ok(Spanned::new(Expr::Not(Box::new(inner)), span))
            }
            Lexeme::Minus => {
                let span = self.span();
                self.advance();
                let inner = self.parse_unary()?;
                Ok(Spanned::new(
                    Expr::BinOp(BinOp::Sub, Box::new(Spanned::new(Expr::Int(0), span)), Box::new(inner)),
                    span,
                ))
            }
            _ => self.parse_app(),
        }
    }

    fn parse_app(&mut self) -> Result<Spanned<Expr>, Error> {
        let mut base = self.parse_atom()?;
        while self.starts_atom() {
            let span = self.span();
            let arg = self.parse_atom()?;
            base = Spanned::new(Expr::Call(Box::new(base), Box::new(arg)), span);
        }
        Ok(base)
    }

    fn parse_atom(&mut self) -> Result<Spanned<Expr>, Error> {
        let span = self.span();
        match self.peek().clone() {
            Lexeme::Integer(n) => {
                self.advance();
                Ok(Spanned::new(Expr::Int(n), span))
            }
            Lexeme::True => {
                self.advance();
                Ok(Spanned::new(Expr::Bool(true), span))
            }
            Lexeme::False => {
                self.advance();
                Ok(Spanned::new(Expr::Bool(false), span))
            }
            Lexeme::NilList => {
                self.advance();
                Ok(Spanned::new(Expr::Nil, span))
            }
            Lexeme::Len => {
                self.advance();
                let arg = self.parse_atom()?;
                Ok(Spanned::new(Expr::Len(Box::new(arg)), span))
            }
            Lexeme::Ident(name) => {
                self.advance();
                Ok(Spanned::new(Expr::Var(name), span))
            }
            Lexeme::LParen => {
                self.advance();
                let first = self.parse_expr()?;
                if *self.peek() == Lexeme::Comma {
                    self.advance();
                    let second = self.parse_expr()?;
                    self.expect(Lexeme::RParen)?;
                    Ok(Spanned::new(Expr::Pair(Box::new(first), Box::new(second)), span))
                } else {
                    self.expect(Lexeme::RParen)?;
                    Ok(first)
                }
            }
            Lexeme::Let => self.parse_let(),
            Lexeme::Fun => self.parse_fun(),
            Lexeme::If => self.parse_if(),
            Lexeme::Match => self.parse_match(),
            other => Err(Error::ParseError {
                message: format!("expected an expression, found {}", other.description()),
                span,
            }),
        }
    }

    fn parse_let(&mut self) -> Result<Spanned<Expr>, Error> {
        let span = self.span();
        self.expect(Lexeme::Let)?;
        let rec = if *self.peek() == Lexeme::Rec {
            self.advance();
            true
        } else {
            false
        };
        let ident = self.eat_ident()?;
        self.expect(Lexeme::Colon)?;
        let typ = self.parse_simple_type()?;
        self.expect(Lexeme::Eq)?;
        let value = self.parse_expr()?;
        self.expect(Lexeme::In)?;
        let body = self.parse_expr()?;
        Ok(Spanned::new(
            Expr::Let {
                rec,
                ident,
                typ,
                value: Box::new(value),
                body: Box::new(body),
            },
            span,
        ))
    }

    fn parse_fun(&mut self) -> Result<Spanned<Expr>, Error> {
        let span = self.span();
        self.expect(Lexeme::Fun)?;
        self.expect(Lexeme::LParen)?;
        let ident = self.eat_ident()?;
        self.expect(Lexeme::Colon)?;
        let typ = self.parse_simple_type()?;
        self.expect(Lexeme::RParen)?;
        self.expect(Lexeme::Arrow)?;
        let body = self.parse_expr()?;
        Ok(Spanned::new(
            Expr::Func {
                ident,
                typ,
                body: Box::new(body),
            },
            span,
        ))
    }

    fn parse_if(&mut self) -> Result<Spanned<Expr>, Error> {
        let span = self.span();
        self.expect(Lexeme::If)?;
        let c = self.parse_expr()?;
        self.expect(Lexeme::Then)?;
        let t = self.parse_expr()?;
        self.expect(Lexeme::Else)?;
        let e = self.parse_expr()?;
        Ok(Spanned::new(Expr::Ite(Box::new(c), Box::new(t), Box::new(e)), span))
    }

    fn parse_match(&mut self) -> Result<Spanned<Expr>, Error> {
        let span = self.span();
        self.expect(Lexeme::Match)?;
        let scrutinee = self.parse_expr()?;
        self.expect(Lexeme::With)?;
        if *self.peek() == Lexeme::Pipe {
            self.advance();
        }
        let mut clauses = vec![self.parse_clause()?];
        while *self.peek() == Lexeme::Pipe {
            self.advance();
            clauses.push(self.parse_clause()?);
        }
        Ok(Spanned::new(Expr::Match(Box::new(scrutinee), clauses), span))
    }

    fn parse_clause(&mut self) -> Result<Clause, Error> {
        let pattern = self.parse_pattern()?;
        self.expect(Lexeme::Arrow)?;
        let body = self.parse_expr()?;
        Ok(Clause { pattern, body })
    }

    fn parse_pattern(&mut self) -> Result<Pattern, Error> {
        let head = self.parse_pattern_atom()?;
        if *self.peek() == Lexeme::ColonColon {
            self.advance();
            let tail = self.parse_pattern()?;
            Ok(Pattern::Cons(Box::new(head), Box::new(tail)))
        } else {
            Ok(head)
        }
    }

    fn parse_pattern_atom(&mut self) -> Result<Pattern, Error> {
        match self.peek().clone() {
            Lexeme::Integer(n) => {
                self.advance();
                Ok(Pattern::Int(n))
            }
            Lexeme::True => {
                self.advance();
                Ok(Pattern::Bool(true))
            }
            Lexeme::False => {
                self.advance();
                Ok(Pattern::Bool(false))
            }
            Lexeme::NilList => {
                self.advance();
                Ok(Pattern::Nil)
            }
            Lexeme::Ident(name) => {
                self.advance();
                if name == "_" {
                    Ok(Pattern::Any)
                } else {
                    Ok(Pattern::Var(name))
                }
            }
            Lexeme::LParen => {
                self.advance();
                let first = self.parse_pattern()?;
                if *self.peek() == Lexeme::Comma {
                    self.advance();
                    let second = self.parse_pattern()?;
                    self.expect(Lexeme::RParen)?;
                    Ok(Pattern::Pair(Box::new(first), Box::new(second)))
                } else {
                    self.expect(Lexeme::RParen)?;
                    Ok(first)
                }
            }
            other => Err(Error::ParseError {
                message: format!("expected a pattern, found {}", other.description()),
                span: self.span(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_stdlib_source() {
        let src = "let readArray (a : int array) (i : int) : int @ O(1) measure 0 = 0";
        let program = parse_program(src, 0).unwrap();
        assert_eq!(program.defs.len(), 1);
        assert_eq!(program.defs[0].name(), "readArray");
    }

    #[test]
    fn parses_recursive_binary_search() {
        let src = "let rec bsearch (l : int) (r : int) : int @ O(log(r - l)) measure (r - l) = \
                   if l >= r then l else bsearch l ((l + r) / 2)";
        let program = parse_program(src, 0).unwrap();
        match &program.defs[0] {
            Def::Func { rec, .. } => assert!(*rec),
            _ => panic!("expected a function definition"),
        }
    }

    #[test]
    fn parses_match_with_cons_and_nil_patterns() {
        let src = "let rec sumlist (xs : int list) : int @ O(len xs) measure (len xs) = \
                   match xs with [] -> 0 | h :: t -> h + sumlist t";
        let program = parse_program(src, 0).unwrap();
        assert_eq!(program.defs.len(), 1);
    }

    #[test]
    fn rejects_bare_non_curried_let() {
        let src = "let f : int = 0";
        assert!(parse_program(src, 0).is_err());
    }
}
