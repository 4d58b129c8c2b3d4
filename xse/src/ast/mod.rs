mod expand;
mod ledger;
mod resolver;

pub use ledger::{Ledger, Site};
pub use resolver::Resolver;

use crate::error::{count_errors, Diagnostic};
use crate::grammer::token::Span;
use arch::{FillByte, ParamType, Pointer};
use indexmap::IndexMap;
use serde::Serialize;
use std::fmt;

/// Where a block is placed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum Origin {
    Static(u32),
    Dynamic(String),
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Origin::Static(offset) => write!(f, "0x{offset:X}"),
            Origin::Dynamic(label) => write!(f, "@{label}"),
        }
    }
}

/// Commands between one `#org` and the next.
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub origin: Origin,
    pub commands: Vec<Command>,
    pub span: Span,
}

impl Block {
    pub fn label(&self) -> Option<&str> {
        match &self.origin {
            Origin::Dynamic(label) => Some(label),
            Origin::Static(_) => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    Opcode(u8),
    Raw,
    Text,
    Braille,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Command {
    pub name: &'static str,
    pub encoding: Encoding,
    pub params: Vec<Param>,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Param {
    pub value: Value,
    pub ty: ParamType,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Literal(u32),
    Dynamic(String),
    Text(String),
}

impl fmt::Display for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.value {
            Value::Literal(raw) if self.ty == ParamType::Pointer => {
                write!(f, "{}", Pointer::from_raw(*raw))
            }
            Value::Literal(value) => write!(f, "0x{value:X}"),
            Value::Dynamic(label) => write!(f, "@{label}"),
            Value::Text(text) => write!(f, "{text:?}"),
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)?;
        for param in &self.params {
            if self.encoding == Encoding::Raw && param.ty != ParamType::Byte {
                write!(f, " {}", param.ty)?;
            }
            write!(f, " {param}")?;
        }
        Ok(())
    }
}

/// ROM edits requested by the script, applied by whoever writes the image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Directive {
    Erase { offset: u32, length: u32 },
    EraseRange { start: u32, end: u32 },
    Remove(u32),
    RemoveAll(u32),
    RemoveMart(u32),
    RemoveMove(u32),
}

/// Result of building one script.
#[derive(Debug, Clone)]
pub struct Program {
    pub blocks: Vec<Block>,
    pub symbols: IndexMap<String, u32>,
    pub ledger: Ledger,
    pub directives: Vec<Directive>,
    pub fill: FillByte,
    pub diagnostics: Vec<Diagnostic>,
}

impl Program {
    pub fn errors(&self) -> usize {
        count_errors(&self.diagnostics)
    }
}
