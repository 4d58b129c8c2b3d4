use crate::grammer::token::Span;
use arch::{ArgKind, ParamType, TypeTag};
use num_enum::{IntoPrimitive, TryFromPrimitive};
use serde::Serialize;
use thiserror::Error;

// Unified error type for XSE
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
pub enum Error {
    // Lexical errors
    #[error("Invalid token: {0:?}")]
    InvalidToken(String),

    // Syntax errors
    #[error("Unexpected token: {0}")]
    UnexpectedToken(String),

    #[error("Unexpected end of line")]
    UnexpectedEOL,

    #[error("Unassigned raw type: `{0}` has no value")]
    UnassignedRawType(TypeTag),

    // Semantic errors
    #[error("Unknown command or macro: `{0}`")]
    UnknownCommand(String),

    #[error("Alias loop: `{0}` resolves to itself")]
    AliasLoop(String),

    #[error("`{0}` needs {1} parameters, got {2}")]
    MissingParams(String, usize, usize),

    #[error("Extra parameters: `{0}` takes {1}")]
    ExtraParams(String, usize),

    #[error("Invalid parameter `{1}` of `{0}`: expected {2:?}, got {3}")]
    TypeMismatch(String, String, Vec<ArgKind>, ArgKind),

    #[error("Invalid value 0x{2:X} for `{1}` of `{0}`")]
    InvalidChoice(String, String, u32),

    #[error("Value 0x{1:X} does not fit in {0}")]
    ValueOverflow(ParamType, u32),

    #[error("Undefined symbol: {0}")]
    UndefinedSymbol(String),

    #[error("Re-defined symbol: {0}")]
    RedefinedSymbol(String),

    #[error("Instruction not inside a block")]
    OutsideBlock,

    #[error("{0} line(s) after #break are ignored")]
    IgnoredAfterBreak(usize),

    // Dynamic offset errors
    #[error("Dynamic offset @{0} is declared more than once")]
    DuplicateLabel(String),

    #[error("Dynamic offset @{0} is never declared")]
    UnknownLabel(String),

    #[error("Dynamic offset @{0} has no #dynamic base")]
    MissingBase(String),

    // Compile errors
    #[error("Refused to compile: {0} error(s)")]
    Diagnostics(usize),

    #[error("Address conflict: {0} at 0x{1:X}-0x{2:X} overlaps with existing block")]
    AddressConflict(String, u32, u32),

    #[error("Insufficient free space for {0} ({1} bytes)")]
    NoFreeSpace(String, usize),

    #[error("No glyph for {0:?} on line {1}")]
    MissingGlyph(char, usize),

    #[error("Address out of range: 0x{0:X}+{1} is outside the ROM")]
    OutOfRange(u32, usize),
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, TryFromPrimitive, IntoPrimitive,
)]
#[serde(into = "u8")]
#[repr(u8)]
pub enum Severity {
    Error = 1,
    Warning = 2,
    Info = 3,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub error: Error,
    pub severity: Severity,
    pub span: Span,
}

impl Diagnostic {
    pub fn error(error: Error, span: Span) -> Self {
        Diagnostic {
            error,
            severity: Severity::Error,
            span,
        }
    }

    pub fn warn(error: Error, span: Span) -> Self {
        Diagnostic {
            error,
            severity: Severity::Warning,
            span,
        }
    }

    pub fn info(error: Error, span: Span) -> Self {
        Diagnostic {
            error,
            severity: Severity::Info,
            span,
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

pub fn count_errors(diagnostics: &[Diagnostic]) -> usize {
    diagnostics.iter().filter(|d| d.is_error()).count()
}
