use crate::diagnostic::Diagnostic;
use crate::lexeme::Lexeme;
use crate::span::{Span, Spanned};

pub struct Lexer<'src> {
    source: &'src [u8],
    file_id: u16,
    pos: usize,
    diagnostics: Vec<Diagnostic>,
}

impl<'src> Lexer<'src> {
    pub fn new(source: &'src str, file_id: u16) -> Self {
        Self {
            source: source.as_bytes(),
            file_id,
            pos: 0,
            diagnostics: Vec::new(),
        }
    }

    pub fn tokenize(mut self) -> (Vec<Spanned<Lexeme>>, Vec<Diagnostic>) {
        let mut tokens = Vec::new();
        loop {
            let tok = self.next_token();
            let is_eof = tok.node == Lexeme::Eof;
            tokens.push(tok);
            if is_eof {
                break;
            }
        }
        (tokens, self.diagnostics)
    }

    fn next_token(&mut self) -> Spanned<Lexeme> {
        loop {
            self.skip_whitespace_and_comments();

            if self.pos >= self.source.len() {
                return self.make_token(Lexeme::Eof, self.pos, self.pos);
            }

            let start = self.pos;
            let ch = self.source[self.pos];

            if is_ident_start(ch) {
                return self.scan_ident_or_keyword();
            }

            if ch.is_ascii_digit() {
                return self.scan_number();
            }

            if let Some(tok) = self.scan_symbol(start) {
                return tok;
            }
            // scan_symbol recorded an error and advanced; try again.
        }
    }

    fn skip_whitespace_and_comments(&mut self) {
        loop {
            while self.pos < self.source.len() && self.source[self.pos].is_ascii_whitespace() {
                self.pos += 1;
            }

            if self.pos + 1 < self.source.len()
                && self.source[self.pos] == b'('
                && self.source[self.pos + 1] == b'*'
            {
                let start = self.pos;
                self.pos += 2;
                while self.pos + 1 < self.source.len()
                    && !(self.source[self.pos] == b'*' && self.source[self.pos + 1] == b')')
                {
                    self.pos += 1;
                }
                if self.pos + 1 < self.source.len() {
                    self.pos += 2;
                } else {
                    self.diagnostics.push(Diagnostic::error(
                        "unterminated comment: missing closing '*)'".to_string(),
                        Span::new(self.file_id, start as u32, self.pos as u32),
                    ));
                    self.pos = self.source.len();
                }
                continue;
            }

            break;
        }
    }

    fn scan_ident_or_keyword(&mut self) -> Spanned<Lexeme> {
        let start = self.pos;
        while self.pos < self.source.len() && is_ident_continue(self.source[self.pos]) {
            self.pos += 1;
        }
        let text = std::str::from_utf8(&self.source[start..self.pos]).unwrap();
        let token = Lexeme::from_keyword(text).unwrap_or_else(|| Lexeme::Ident(text.to_string()));
        self.make_token(token, start, self.pos)
    }

    fn scan_number(&mut self) -> Spanned<Lexeme> {
        let start = self.pos;
        while self.pos < self.source.len() && self.source[self.pos].is_ascii_digit() {
            self.pos += 1;
        }
        let text = std::str::from_utf8(&self.source[start..self.pos]).unwrap();
        match text.parse::<i64>() {
            Ok(n) => self.make_token(Lexeme::Integer(n), start, self.pos),
            Err(_) => {
                self.diagnostics.push(
                    Diagnostic::error(
                        format!("integer literal '{text}' is too large"),
                        Span::new(self.file_id, start as u32, self.pos as u32),
                    )
                    .with_help(format!("maximum integer value is {}", i64::MAX)),
                );
                self.make_token(Lexeme::Integer(0), start, self.pos)
            }
        }
    }

    fn scan_symbol(&mut self, start: usize) -> Option<Spanned<Lexeme>> {
        let ch = self.source[self.pos];
        self.pos += 1;

        let token = match ch {
            b'(' => Lexeme::LParen,
            b')' => Lexeme::RParen,
            b'{' => Lexeme::LBrace,
            b'}' => Lexeme::RBrace,
            b'[' => {
                if self.peek() == Some(b']') {
                    self.pos += 1;
                    Lexeme::NilList
                } else {
                    Lexeme::LBracket
                }
            }
            b']' => Lexeme::RBracket,
            b',' => Lexeme::Comma,
            b';' => Lexeme::Semicolon,
            b'|' => Lexeme::Pipe,
            b'.' => Lexeme::Dot,
            b'@' => Lexeme::At,
            b'+' => Lexeme::Plus,
            b'*' => Lexeme::Star,
            b'^' => Lexeme::Caret,
            b'/' => Lexeme::Slash,
            b':' => {
                if self.peek() == Some(b':') {
                    self.pos += 1;
                    Lexeme::ColonColon
                } else {
                    Lexeme::Colon
                }
            }
            b'-' => {
                if self.peek() == Some(b'>') {
                    self.pos += 1;
                    Lexeme::Arrow
                } else {
                    Lexeme::Minus
                }
            }
            b'=' => Lexeme::Eq,
            b'<' => {
                if self.peek() == Some(b'>') {
                    self.pos += 1;
                    Lexeme::Neq
                } else if self.peek() == Some(b'=') {
                    self.pos += 1;
                    Lexeme::Le
                } else {
                    Lexeme::Lt
                }
            }
            b'>' => {
                if self.peek() == Some(b'=') {
                    self.pos += 1;
                    Lexeme::Ge
                } else {
                    Lexeme::Gt
                }
            }
            b'&' => {
                if self.peek() == Some(b'&') {
                    self.pos += 1;
                    Lexeme::AndAnd
                } else {
                    self.diagnostics.push(Diagnostic::error(
                        "unexpected '&'; did you mean '&&'?".to_string(),
                        Span::new(self.file_id, start as u32, self.pos as u32),
                    ));
                    return None;
                }
            }
            _ => {
                self.diagnostics.push(Diagnostic::error(
                    format!("unexpected character '{}'", ch as char),
                    Span::new(self.file_id, start as u32, self.pos as u32),
                ));
                return None;
            }
        };

        Some(self.make_token(token, start, self.pos))
    }

    fn peek(&self) -> Option<u8> {
        self.source.get(self.pos).copied()
    }

    fn make_token(&self, lexeme: Lexeme, start: usize, end: usize) -> Spanned<Lexeme> {
        Spanned::new(lexeme, Span::new(self.file_id, start as u32, end as u32))
    }
}

fn is_ident_start(ch: u8) -> bool {
    ch == b'_' || ch.is_ascii_alphabetic()
}

fn is_ident_continue(ch: u8) -> bool {
    ch == b'_' || ch.is_ascii_alphanumeric()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lex(src: &str) -> Vec<Lexeme> {
        let (tokens, diags) = Lexer::new(src, 0).tokenize();
        assert!(diags.is_empty(), "unexpected diagnostics: {diags:?}");
        tokens.into_iter().map(|t| t.node).collect()
    }

    #[test]
    fn lexes_keywords_and_idents() {
        let toks = lex("let rec f = fun (x : int) -> x");
        assert_eq!(
            toks,
            vec![
                Lexeme::Let,
                Lexeme::Rec,
                Lexeme::Ident("f".into()),
                Lexeme::Eq,
                Lexeme::Fun,
                Lexeme::LParen,
                Lexeme::Ident("x".into()),
                Lexeme::Colon,
                Lexeme::Int,
                Lexeme::RParen,
                Lexeme::Arrow,
                Lexeme::Ident("x".into()),
                Lexeme::Eof,
            ]
        );
    }

    #[test]
    fn lexes_operators_and_punctuation() {
        let toks = lex("x :: xs <= 3 <> 4 && true || [] @");
        assert_eq!(
            toks,
            vec![
                Lexeme::Ident("x".into()),
                Lexeme::ColonColon,
                Lexeme::Ident("xs".into()),
                Lexeme::Le,
                Lexeme::Integer(3),
                Lexeme::Neq,
                Lexeme::Integer(4),
                Lexeme::AndAnd,
                Lexeme::True,
                Lexeme::OrOr,
                Lexeme::NilList,
                Lexeme::At,
                Lexeme::Eof,
            ]
        );
    }

    #[test]
    fn skips_block_comments() {
        let toks = lex("(* a comment *) let x = 1");
        assert_eq!(
            toks,
            vec![
                Lexeme::Let,
                Lexeme::Ident("x".into()),
                Lexeme::Eq,
                Lexeme::Integer(1),
                Lexeme::Eof,
            ]
        );
    }
}
