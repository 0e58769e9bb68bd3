//! Static types and compiled function signatures
use core::fmt;
use std::str::FromStr;

use arbitrary::Arbitrary;

use crate::compiler::bytecode::Opcodes;

/// The closed set of value types. There is no subtyping or coercion: two types are
/// compatible only if they are equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Arbitrary)]
pub enum Type {
    Number,
    String,
    Boolean,
}

impl Type {
    /// The name used for this type in parameter lists
    pub fn name(self) -> &'static str {
        match self {
            Self::Number => "number",
            Self::String => "string",
            Self::Boolean => "bool",
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown type name: {0}")]
pub struct UnknownTypeName(pub Box<str>);

impl FromStr for Type {
    type Err = UnknownTypeName;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "number" => Ok(Self::Number),
            "string" => Ok(Self::String),
            "bool" => Ok(Self::Boolean),
            other => Err(UnknownTypeName(Box::from(other))),
        }
    }
}

/// A positional, typed function parameter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    pub name: Box<str>,
    pub ty: Type,
}

impl fmt::Display for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.name, self.ty)
    }
}

/// A checked function. Immutable once registered in a
/// [`FunctionTable`](crate::compiler::environment::FunctionTable).
#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    pub name: Box<str>,
    pub params: Vec<Param>,
    pub return_type: Type,
    /// `return` followed by the body expression
    pub body: Opcodes,
}

impl Function {
    pub fn arity(&self) -> usize {
        self.params.len()
    }

    pub fn param_names(&self) -> impl Iterator<Item = &str> {
        self.params.iter().map(|p| p.name.as_ref())
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "fn {}(", self.name)?;
        for (i, param) in self.params.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{param}")?;
        }
        write!(f, ") -> {}", self.return_type)
    }
}
