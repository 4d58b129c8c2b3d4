use super::token::Span;
use arch::{ArgKind, TypeTag};

/// One source line's worth of syntax.
#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    pub kind: ItemKind,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ItemKind {
    /// `#org @main`, `= "text"`
    Macro { name: Name, args: Vec<Arg> },
    /// `#raw 0x1 word 0x2`
    Raw { args: Vec<(Option<TypeTag>, Arg)> },
    /// `setvar 0x4050 0x1`
    Command { name: Name, args: Vec<Arg> },
    /// `if 0x1 goto @label`
    If {
        cond: Arg,
        branch: Branch,
        target: Arg,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Branch {
    Goto,
    Call,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Name {
    pub text: String,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Arg {
    pub value: Value,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Number(u32),
    Dynamic(String),
    Symbol(String),
    Word(String),
    Text(String),
}

impl Value {
    pub fn kind(&self) -> ArgKind {
        match self {
            Value::Number(_) => ArgKind::Number,
            Value::Dynamic(_) => ArgKind::Dynamic,
            Value::Symbol(_) => ArgKind::Symbol,
            Value::Word(_) => ArgKind::Word,
            Value::Text(_) => ArgKind::Text,
        }
    }
}

impl Item {
    /// Rewrites `if` sugar into the conditional jump it stands for.
    pub fn lower(self) -> Item {
        match self.kind {
            ItemKind::If {
                cond,
                branch,
                target,
            } => {
                let text = match branch {
                    Branch::Goto => "if1",
                    Branch::Call => "if2",
                };
                let name = Name {
                    text: text.to_string(),
                    span: self.span,
                };
                Item {
                    kind: ItemKind::Command {
                        name,
                        args: vec![cond, target],
                    },
                    span: self.span,
                }
            }
            kind => Item {
                kind,
                span: self.span,
            },
        }
    }

    pub fn name(&self) -> Option<&Name> {
        match &self.kind {
            ItemKind::Macro { name, .. } | ItemKind::Command { name, .. } => Some(name),
            _ => None,
        }
    }
}
