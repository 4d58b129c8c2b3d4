use arch::TypeTag;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    pub span: Span,
}

impl Token {
    pub fn new(kind: TokenKind, span: Span) -> Self {
        Token { kind, span }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum TokenKind {
    // Item introducers
    Macro(String), // '#org', '=', ...
    Raw,           // '#raw', '#binary', '#put'
    KwIf,          // "if"

    // Words
    Word(String),    // command
    Symbol(String),  // UPPER_SNAKE
    Dynamic(String), // '@label'
    TypeTag(TypeTag),

    // Literals
    Number(String, u32),
    Text(String),

    // Special
    Newline,
    Comment(String), // Comment
    Error(String),   // Error
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Macro(name) => write!(f, "`{name}`"),
            TokenKind::Raw => write!(f, "`#raw`"),
            TokenKind::KwIf => write!(f, "`if`"),
            TokenKind::Word(word) => write!(f, "`{word}`"),
            TokenKind::Symbol(name) => write!(f, "symbol `{name}`"),
            TokenKind::Dynamic(label) => write!(f, "`@{label}`"),
            TokenKind::TypeTag(tag) => write!(f, "type `{tag}`"),
            TokenKind::Number(lexeme, _) => write!(f, "number `{lexeme}`"),
            TokenKind::Text(text) => write!(f, "string {text:?}"),
            TokenKind::Newline => write!(f, "end of line"),
            TokenKind::Comment(_) => write!(f, "comment"),
            TokenKind::Error(text) => write!(f, "`{text}`"),
        }
    }
}

/// Zero-based line and column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize)]
pub struct Pos {
    pub row: usize,
    pub col: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Span {
    pub start: Pos,
    pub end: Pos,
}

impl Span {
    pub fn new(row: usize, start: usize, end: usize) -> Self {
        Span {
            start: Pos { row, col: start },
            end: Pos { row, col: end },
        }
    }

    /// Span covering `self` through `other`.
    pub fn to(self, other: Span) -> Span {
        Span {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        }
    }

    pub fn line(&self) -> usize {
        self.start.row + 1
    }
}

impl fmt::Display for Span {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.start.row + 1, self.start.col + 1)
    }
}
