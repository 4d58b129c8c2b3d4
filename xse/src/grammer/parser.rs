use super::ast::{Arg, Branch, Item, ItemKind, Name, Value};
use super::parsercore::Parser;
use super::token::{Span, Token, TokenKind, TokenKind::*};
use crate::error::{Diagnostic, Error};
use crate::{check, expect, optional, recover, repeat};

impl<I: Iterator<Item = Token>> Parser<I> {
    pub fn parse(mut self) -> (Vec<Item>, Vec<Diagnostic>) {
        let program = self.parse_program();
        (program, self.geterrors())
    }
}

fn unexpected(token: &Token) -> Diagnostic {
    match &token.kind {
        Newline => Diagnostic::error(Error::UnexpectedEOL, token.span),
        kind => Diagnostic::error(Error::UnexpectedToken(kind.to_string()), token.span),
    }
}

fn value_of(kind: &TokenKind) -> Option<Value> {
    match kind {
        Number(_, num) => Some(Value::Number(*num)),
        Dynamic(label) => Some(Value::Dynamic(label.clone())),
        Symbol(name) => Some(Value::Symbol(name.clone())),
        Word(word) => Some(Value::Word(word.clone())),
        Text(text) => Some(Value::Text(text.clone())),
        _ => None,
    }
}

impl<I: Iterator<Item = Token>> Parser<I> {
    fn parse_program(&mut self) -> Vec<Item> {
        let mut items = Vec::new();
        while self.peek().is_some() {
            match self.parse_line() {
                Ok(Some(item)) => items.push(item),
                Ok(None) => {}
                Err(err) => {
                    self.error(err);
                    recover!(self, Newline);
                    optional!(self, Newline);
                }
            }
        }
        items
    }

    /// line = [ item ] newline
    fn parse_line(&mut self) -> Result<Option<Item>, Diagnostic> {
        if optional!(self, Newline).is_some() {
            return Ok(None);
        }
        let item = self.parse_item()?;
        expect!(self, Newline)?;
        Ok(Some(item))
    }

    /// item = macro { arg } | raw { [ type ] arg } | "if" arg ( "goto" | "call" ) arg | word { arg }
    fn parse_item(&mut self) -> Result<Item, Diagnostic> {
        let Some(token) = self.next() else {
            return Err(Diagnostic::error(Error::UnexpectedEOL, Span::default()));
        };
        match token.kind {
            // macro = ( "#" ident | "=" ) { arg }
            Macro(text) => {
                let args = repeat!(self, self.parse_arg(), Newline);
                let span = args.last().map_or(token.span, |arg| token.span.to(arg.span));
                let name = Name {
                    text,
                    span: token.span,
                };
                Ok(Item {
                    kind: ItemKind::Macro { name, args },
                    span,
                })
            }

            // raw = "#raw" { [ type ] arg }
            Raw => {
                let args = repeat!(self, self.parse_raw_arg(), Newline);
                let span = args
                    .last()
                    .map_or(token.span, |(_, arg)| token.span.to(arg.span));
                Ok(Item {
                    kind: ItemKind::Raw { args },
                    span,
                })
            }

            // if = "if" arg ( "goto" | "call" ) arg
            KwIf => {
                let cond = self.parse_arg()?;
                let branch = self.parse_branch()?;
                let target = self.parse_arg()?;
                Ok(Item {
                    span: token.span.to(target.span),
                    kind: ItemKind::If {
                        cond,
                        branch,
                        target,
                    },
                })
            }

            // command = word { arg }
            Word(text) => {
                let args = repeat!(self, self.parse_arg(), Newline);
                let span = args.last().map_or(token.span, |arg| token.span.to(arg.span));
                let name = Name {
                    text,
                    span: token.span,
                };
                Ok(Item {
                    kind: ItemKind::Command { name, args },
                    span,
                })
            }

            _ => Err(unexpected(&token)),
        }
    }

    fn parse_branch(&mut self) -> Result<Branch, Diagnostic> {
        let token = expect!(self, Word(_))?;
        match &token.kind {
            Word(word) if word == "goto" => Ok(Branch::Goto),
            Word(word) if word == "call" => Ok(Branch::Call),
            _ => Err(unexpected(&token)),
        }
    }

    /// arg = number | "@" ident | SYMBOL | word | string
    fn parse_arg(&mut self) -> Result<Arg, Diagnostic> {
        let Some(token) = self.peek().cloned() else {
            return Err(Diagnostic::error(Error::UnexpectedEOL, Span::default()));
        };
        let value = value_of(&token.kind).ok_or_else(|| unexpected(&token))?;
        self.next();
        Ok(Arg {
            value,
            span: token.span,
        })
    }

    /// raw-arg = [ type ] arg
    fn parse_raw_arg(&mut self) -> Result<(Option<arch::TypeTag>, Arg), Diagnostic> {
        let tag = match optional!(self, TypeTag(_)) {
            Some(Token {
                kind: TypeTag(tag),
                span,
            }) => {
                if check!(self, Newline | TypeTag(_)) {
                    return Err(Diagnostic::error(Error::UnassignedRawType(tag), span));
                }
                Some(tag)
            }
            _ => None,
        };
        Ok((tag, self.parse_arg()?))
    }
}
