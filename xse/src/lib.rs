pub mod ast;
pub mod compile;
pub mod decompile;
mod error;
pub mod grammer;
pub mod rom;

pub use ast::{Program, Resolver};
pub use compile::{compile, Compiled, CompiledBlock, Options};
pub use decompile::{decompile, Decompiled, Decompiler};
pub use error::{count_errors, Diagnostic, Error, Severity};
pub use grammer::lexer::Lexer;
pub use grammer::parsercore::Parser;
pub use rom::Rom;

use grammer::ast::Item;

/// Tokenizes and parses a script.
pub fn parse(source: &str) -> (Vec<Item>, Vec<Diagnostic>) {
    Parser::new(Lexer::new(source).parse().into_iter()).parse()
}

/// Parses a script and resolves it into blocks. Parse diagnostics come first.
pub fn build(source: &str, resolver: Resolver) -> Program {
    let (items, mut diagnostics) = parse(source);
    let mut program = resolver.build(items);
    diagnostics.append(&mut program.diagnostics);
    program.diagnostics = diagnostics;
    program
}
