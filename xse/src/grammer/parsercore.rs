use super::token::{Span, Token, TokenKind};
use crate::error::{Diagnostic, Error};
use std::iter::Peekable;

pub struct Parser<I: Iterator<Item = Token>> {
    tokens: Peekable<I>,
    errors: Vec<Diagnostic>,
}

impl<I: Iterator<Item = Token>> Parser<I> {
    pub fn new(tokens: I) -> Self {
        Parser {
            tokens: tokens.peekable(),
            errors: Vec::new(),
        }
    }

    pub fn error(&mut self, e: Diagnostic) {
        self.errors.push(e);
    }

    pub fn geterrors(self) -> Vec<Diagnostic> {
        self.errors
    }
}

impl<I: Iterator<Item = Token>> Parser<I> {
    /// Skip comments, reporting lexical errors on the way
    fn skip(&mut self) {
        while let Some(token) = self.tokens.peek() {
            match &token.kind {
                TokenKind::Comment(_) => {}
                TokenKind::Error(text) => {
                    let e = Diagnostic::error(Error::InvalidToken(text.clone()), token.span);
                    self.errors.push(e);
                }
                _ => break,
            }
            self.tokens.next();
        }
    }

    /// Peek : Watch next token without consuming it
    pub fn peek(&mut self) -> Option<&Token> {
        self.skip();
        self.tokens.peek()
    }

    /// Next : Consume next token and return it
    pub fn next(&mut self) -> Option<Token> {
        self.skip();
        self.tokens.next()
    }

    /// Peek and check next token is match with condition
    pub fn check_if<F: Fn(&Token) -> bool>(&mut self, cond: F) -> bool {
        self.skip();
        self.tokens.peek().map_or(false, cond)
    }

    /// Consume if next token is match with condition
    pub fn consume_if<F: Fn(&Token) -> bool>(&mut self, cond: F) -> Option<Token> {
        self.skip();
        self.tokens.next_if(|token| cond(token))
    }

    /// Consume until next token is match with condition, still reporting lexical errors
    pub fn consume_until<F: Fn(&Token) -> bool>(&mut self, cond: F) {
        loop {
            self.skip();
            match self.tokens.peek() {
                Some(tok) if !cond(tok) => {
                    self.tokens.next();
                }
                _ => return,
            }
        }
    }

    /// Next token must be match with condition (skipping comments)
    pub fn expect_tobe<F: Fn(&Token) -> bool>(&mut self, cond: F) -> Result<Token, Diagnostic> {
        self.skip();
        match self.tokens.peek().cloned() {
            Some(token) if cond(&token) => {
                self.tokens.next();
                Ok(token)
            }
            Some(Token {
                kind: TokenKind::Newline,
                span,
            }) => Err(Diagnostic::error(Error::UnexpectedEOL, span)),
            Some(token) => Err(Diagnostic::error(
                Error::UnexpectedToken(token.kind.to_string()),
                token.span,
            )),
            None => Err(Diagnostic::error(Error::UnexpectedEOL, Span::default())),
        }
    }
}

#[macro_export]
macro_rules! check {
    ($parser:expr, $kind:pat) => {
        $parser.check_if(|token| matches!(&token.kind, $kind))
    };
}

#[macro_export]
macro_rules! expect {
    ($parser:expr, $kind:pat) => {
        $parser.expect_tobe(|token| matches!(&token.kind, $kind))
    };
}

#[macro_export]
macro_rules! optional {
    ($parser:expr, $trigger:pat) => {
        $parser.consume_if(|token| matches!(&token.kind, $trigger))
    };
}

/// { element } terminal
#[macro_export]
macro_rules! repeat {
    ($parser:expr, $elem:expr, $terminal:pat) => {{
        let mut items = Vec::new();
        while !check!($parser, $terminal) && $parser.peek().is_some() {
            items.push($elem?);
        }
        items
    }};
}

#[macro_export]
macro_rules! recover {
    ($parser:expr, $kind:pat) => {
        $parser.consume_until(|token| matches!(&token.kind, $kind))
    };
}
