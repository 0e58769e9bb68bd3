pub use logos::Span;
use logos::{Lexer, Logos};

fn process_string(lexer: &mut Lexer<Token>) -> Result<Box<str>, LexerError> {
    // Our string syntax is /"([^\\"]|\\[ntr"\\])*"/, but Logos accepts any escape so
    // that a bad one gets a precise error instead of an invalid token.
    let slice = lexer.slice();
    let mut string = String::with_capacity(slice.len());

    let mut chars = slice[1..slice.len() - 1].chars();
    while let Some(c) = chars.next() {
        match c {
            '\\' => match chars.next() {
                Some('n') => string.push('\n'),
                Some('t') => string.push('\t'),
                Some('r') => string.push('\r'),
                Some('\\') => string.push('\\'),
                Some('"') => string.push('"'),
                Some(other) => return Err(LexerError::InvalidEscape(other)),
                None => return Err(LexerError::MalformedString),
            },
            c => string.push(c),
        }
    }

    Ok(Box::from(string.as_str()))
}

fn read_number(lexer: &mut Lexer<Token>) -> Result<f64, LexerError> {
    let value: f64 = lexer
        .slice()
        .parse()
        .map_err(|_| LexerError::MalformedNumber)?;
    // out-of-range literals parse as infinity
    if value.is_finite() {
        Ok(value)
    } else {
        Err(LexerError::MalformedNumber)
    }
}

#[derive(thiserror::Error, Debug, PartialEq, Clone, Default)]
pub enum LexerError {
    #[default]
    #[error("invalid token encountered")]
    Invalid,
    #[error("unterminated string")]
    UnterminatedString,
    #[error("malformed string")]
    MalformedString,
    #[error("invalid escape sequence: \\{0}")]
    InvalidEscape(char),
    #[error("malformed number")]
    MalformedNumber,
}

/// Tokens of the surface syntax. Whitespace and `;` comments are skipped.
#[derive(Debug, Clone, PartialEq, Logos)]
#[logos(error = LexerError)]
#[logos(skip r"[ \t\r\n\f]+")]
#[logos(skip r";[^\n]*")]
pub enum Token {
    #[token("(")]
    LParen,
    #[token(")")]
    RParen,
    // brackets are interchangeable with parens, but must match
    #[token("[")]
    LBracket,
    #[token("]")]
    RBracket,

    #[regex(r"[+-]?[0-9]+(\.[0-9]*)?([eE][+-]?[0-9]+)?", read_number)]
    #[regex(r"[+-]?\.[0-9]+([eE][+-]?[0-9]+)?", read_number)]
    Number(f64),

    #[regex(r#""([^\\"]|\\.)*""#, process_string)]
    #[regex(r#""([^\\"]|\\.)*"#, |_| Err(LexerError::UnterminatedString))]
    String(Box<str>),

    #[regex(r"[a-zA-Z!$%&*/:<=>?^_~][0-9a-zA-Z!$%&*/:<=>?^_~+\-.@]*", |l| Box::from(l.slice()))]
    #[token("+", |l| Box::from(l.slice()))]
    #[token("-", |l| Box::from(l.slice()))]
    #[regex(r"[-+][a-zA-Z!$%&*/:<=>?^_~+\-@][0-9a-zA-Z!$%&*/:<=>?^_~+\-.@]*", |l| Box::from(l.slice()))]
    Symbol(Box<str>),
}

impl Token {
    pub fn lexer(source: &str) -> Lexer<Self> {
        <Self as Logos>::lexer(source)
    }
}
