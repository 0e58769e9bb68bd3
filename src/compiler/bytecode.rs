//! The flat token stream handed to the stack interpreter.
//!
//! Tokens are plain text. Literals are written as a value followed by its tag
//! (`1.0 number`, `x var`), keywords (`let`, `print`, `if`, ...) and operators are single
//! tokens. The interpreter pops tokens off the end of the stream, which is why statement
//! and branch order is reversed by the checker.
use core::fmt;

/// Tag token that follows a literal value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tag {
    Number,
    String,
    Bool,
    Var,
    Ident,
}

impl Tag {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Number => "number",
            Self::String => "string",
            Self::Bool => "bool",
            Self::Var => "var",
            Self::Ident => "ident",
        }
    }
}

/// Control and statement keywords
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Keyword {
    Let,
    Print,
    If,
    Else,
    End,
    Return,
    Call,
}

impl Keyword {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Let => "let",
            Self::Print => "print",
            Self::If => "if",
            Self::Else => "else",
            Self::End => "end",
            Self::Return => "return",
            Self::Call => "call",
        }
    }
}

/// An owned buffer of opcode tokens.
///
/// Every check produces its own buffer; callers decide the order in which buffers are
/// spliced together.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Opcodes(Vec<Box<str>>);

impl Opcodes {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn keyword(&mut self, keyword: Keyword) -> &mut Self {
        self.token(keyword.as_str())
    }

    /// Pushes `value` followed by its tag
    pub fn literal(&mut self, value: impl AsRef<str>, tag: Tag) -> &mut Self {
        self.token(value).token(tag.as_str())
    }

    pub fn token(&mut self, token: impl AsRef<str>) -> &mut Self {
        self.0.push(Box::from(token.as_ref()));
        self
    }

    pub fn splice(&mut self, other: Opcodes) -> &mut Self {
        self.0.extend(other.0);
        self
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|t| t.as_ref())
    }
}

impl<T: AsRef<str>> FromIterator<T> for Opcodes {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Self(iter.into_iter().map(|t| Box::from(t.as_ref())).collect())
    }
}

impl fmt::Display for Opcodes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, token) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{token}")?;
        }
        Ok(())
    }
}

/// Renders a number the way the interpreter expects to read it back: integral values keep
/// a trailing `.0`, everything else uses the shortest representation that round-trips.
pub fn decimal_text(value: f64) -> String {
    format!("{value:?}")
}
