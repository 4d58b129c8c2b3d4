use super::token::{Span, Token, TokenKind};
use arch::TypeTag;
use std::iter::{Enumerate, Peekable};
use std::str::Chars;

pub struct Lexer<'a> {
    code: &'a str,
}

impl<'a> Lexer<'a> {
    pub fn new(code: &'a str) -> Self {
        Self { code }
    }

    pub fn parse(self) -> Vec<Token> {
        let mut tokens = Vec::new();
        for (row, line) in self.code.lines().enumerate() {
            let lexer = LineLexer::new(line, row);
            tokens.extend(lexer.parse());
        }
        tokens
    }
}

/// What the rest of the current line is being read as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Main,
    MacroArgs,
    RawArgs,
}

pub struct LineLexer<'a> {
    // Indexed by char so spans line up with what an editor shows
    iter: Peekable<Enumerate<Chars<'a>>>,
    len: usize,
    row: usize,
    mode: Mode,
}

impl<'a> LineLexer<'a> {
    pub fn new(line: &'a str, row: usize) -> Self {
        Self {
            iter: line.chars().enumerate().peekable(),
            len: line.chars().count(),
            row,
            mode: Mode::Main,
        }
    }
}

// ----------------------------------------------------------------------------
// Helpers
// ----------------------------------------------------------------------------

impl<'a> LineLexer<'a> {
    fn peek_nth(&self, n: usize) -> Option<(usize, char)> {
        self.iter.clone().nth(n)
    }
    fn consume(&mut self) -> Option<(usize, char)> {
        self.iter.next()
    }
    fn offset(&mut self) -> usize {
        self.iter.peek().map_or(self.len, |(idx, _)| *idx)
    }
    fn take_ident(&mut self) -> String {
        let mut lexeme = String::new();
        while let Some((_, ch)) = self
            .iter
            .next_if(|(_, ch)| matches!(ch, '_' | '0'..='9' | 'a'..='z' | 'A'..='Z'))
        {
            lexeme.push(ch);
        }
        lexeme
    }
}

// ----------------------------------------------------------------------------
// Parser
// ----------------------------------------------------------------------------

impl<'a> LineLexer<'a> {
    pub fn parse(mut self) -> Vec<Token> {
        let mut tokens = Vec::new();
        while let Some((idx, ch0)) = self.peek_nth(0) {
            // 0. Skip whitespaces
            if ch0.is_whitespace() {
                self.consume();
                continue;
            }

            // 1. Comment
            let ch1 = self.peek_nth(1).map(|(_, ch)| ch);
            if ch0 == '\'' || (ch0 == '/' && ch1 == Some('/')) {
                self.consume();
                if ch0 == '/' {
                    self.consume();
                }
                let comment = self.iter.by_ref().map(|(_, ch)| ch).collect::<String>();
                let span = Span::new(self.row, idx, self.len);
                tokens.push(Token::new(TokenKind::Comment(comment.trim().to_string()), span));
                break;
            }

            // 2. Item introducer
            let kind = if self.mode == Mode::Main && ch0 == '#' {
                self.parse_macro()
            } else if self.mode == Mode::Main && ch0 == '=' {
                self.consume();
                self.mode = Mode::MacroArgs;
                TokenKind::Macro("=".to_string())
            }
            // 3. Number literal
            else if ch0.is_ascii_digit() {
                self.parse_number()
            }
            // 4. Dynamic offset
            else if ch0 == '@' {
                self.consume();
                match self.take_ident() {
                    label if label.is_empty() => TokenKind::Error("@".to_string()),
                    label => TokenKind::Dynamic(label),
                }
            }
            // 5. String literal
            else if ch0 == '"' {
                self.parse_text()
            }
            // 6. Word, symbol or keyword
            else if ch0.is_ascii_alphabetic() || ch0 == '_' {
                self.parse_word()
            }
            // Error
            else {
                self.consume();
                TokenKind::Error(format!("{ch0}"))
            };

            let end = self.offset();
            tokens.push(Token::new(kind, Span::new(self.row, idx, end)));
        }
        self.mode = Mode::Main;
        tokens.push(Token::new(
            TokenKind::Newline,
            Span::new(self.row, self.len, self.len),
        ));
        tokens
    }

    // Macro: "#org", "#raw", ...
    fn parse_macro(&mut self) -> TokenKind {
        self.consume();
        let name = self.take_ident().to_ascii_lowercase();
        match name.as_str() {
            "" => TokenKind::Error("#".to_string()),
            "raw" | "binary" | "put" => {
                self.mode = Mode::RawArgs;
                TokenKind::Raw
            }
            _ => {
                self.mode = Mode::MacroArgs;
                TokenKind::Macro(format!("#{name}"))
            }
        }
    }

    fn parse_word(&mut self) -> TokenKind {
        let lexeme = self.take_ident();
        let lower = lexeme.to_ascii_lowercase();
        match self.mode {
            Mode::Main if lower == "if" => return TokenKind::KwIf,
            Mode::RawArgs if !is_symbol(&lexeme) => {
                if let Ok(tag) = lower.parse::<TypeTag>() {
                    return TokenKind::TypeTag(tag);
                }
            }
            _ => {}
        }
        if is_symbol(&lexeme) {
            TokenKind::Symbol(lexeme)
        } else {
            TokenKind::Word(lower)
        }
    }

    // Text: "Hello\pWorld"
    // Only '\"' and '\\' are escapes; other sequences reach the charset as written.
    fn parse_text(&mut self) -> TokenKind {
        self.consume();

        let mut lexeme = String::new();
        while let Some((_, ch)) = self.consume() {
            match ch {
                '"' => return TokenKind::Text(lexeme),
                '\\' => match self.peek_nth(0) {
                    Some((_, next @ ('"' | '\\'))) => {
                        self.consume();
                        lexeme.push(next);
                    }
                    _ => lexeme.push('\\'),
                },
                ch => lexeme.push(ch),
            }
        }
        TokenKind::Error(format!("\"{lexeme}"))
    }

    fn parse_number(&mut self) -> TokenKind {
        if let (Some((_, '0')), Some((_, 'x' | 'X'))) = (self.peek_nth(0), self.peek_nth(1)) {
            self.consume();
            self.consume();
            let digits = self.take_ident();
            return match u32::from_str_radix(&digits.replace('_', ""), 16) {
                Ok(num) => TokenKind::Number(format!("0x{digits}"), num),
                Err(_) => TokenKind::Error(format!("0x{digits}")),
            };
        }
        let lexeme = self.take_ident();
        match lexeme.replace('_', "").parse::<u32>() {
            Ok(num) => TokenKind::Number(lexeme, num),
            Err(_) => TokenKind::Error(lexeme),
        }
    }
}

/// `UPPER_SNAKE` names are symbols; anything with a lowercase letter is a word.
fn is_symbol(lexeme: &str) -> bool {
    lexeme.chars().any(|ch| ch.is_ascii_uppercase())
        && !lexeme.chars().any(|ch| ch.is_ascii_lowercase())
}
