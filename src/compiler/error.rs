use core::fmt;

use crate::types::{Type, UnknownTypeName};

/// Number of arguments a form accepts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Exact(usize),
    Range(usize, usize),
}

impl Arity {
    pub fn is_satisfied(&self, len: usize) -> bool {
        match self {
            Self::Exact(e) => *e == len,
            Self::Range(lo, hi) => (*lo..=*hi).contains(&len),
        }
    }
}

impl fmt::Display for Arity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Exact(e) => write!(f, "{e}"),
            Self::Range(lo, hi) => write!(f, "{lo} to {hi}"),
        }
    }
}

/// Broad classes of compile failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorClass {
    Structural,
    UnknownOperator,
    Arity,
    UndefinedVariable,
    DuplicateFunction,
    InvalidParam,
    TypeMismatch,
    ScopeViolation,
}

impl fmt::Display for ErrorClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Structural => "structure",
            Self::UnknownOperator => "unknown-operator",
            Self::Arity => "arity",
            Self::UndefinedVariable => "undefined-variable",
            Self::DuplicateFunction => "duplicate-function",
            Self::InvalidParam => "invalid-param",
            Self::TypeMismatch => "type-mismatch",
            Self::ScopeViolation => "scope",
        };
        write!(f, "{name}")
    }
}

/// Any failure while checking a program. The first error aborts compilation.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum CompileError {
    #[error("program must be a list of statements, found `{0}`")]
    ProgramNotList(Box<str>),
    #[error("statements must be lists, found `{0}`")]
    StatementNotList(Box<str>),
    #[error("statement must have an operator and at least one argument: `{0}`")]
    StatementTooShort(Box<str>),
    #[error("operator must be a symbol, found `{0}`")]
    OperatorNotSymbol(Box<str>),
    #[error("expected a name, found `{0}`")]
    ExpectedName(Box<str>),
    #[error("`{0}` is reserved and cannot be bound")]
    ReservedName(Box<str>),
    #[error("`quote` takes a symbol or text, found `{0}`")]
    QuoteNotText(Box<str>),
    #[error("text `{0}` must be quoted")]
    UnquotedText(Box<str>),
    #[error("empty list cannot be evaluated")]
    EmptyExpression,

    #[error("unknown operator `{0}`")]
    UnknownOperator(Box<str>),

    #[error("`{form}` takes {expected} argument(s), found {found}")]
    WrongFormArity {
        form: Box<str>,
        expected: Arity,
        found: usize,
    },
    #[error("operator `{operator}` is binary, found {found} operand(s)")]
    NonBinaryOperation { operator: Box<str>, found: usize },
    #[error("function `{function}` takes {expected} argument(s), found {found}")]
    WrongArgumentCount {
        function: Box<str>,
        expected: usize,
        found: usize,
    },

    #[error("variable `{0}` not defined")]
    UndefinedVariable(Box<str>),

    #[error("function `{0}` is already defined")]
    DuplicateFunction(Box<str>),

    #[error("invalid parameter in `{function}`: `{param}` ({reason})")]
    InvalidParam {
        function: Box<str>,
        param: Box<str>,
        reason: &'static str,
    },
    #[error("invalid type `{}` for parameter `{param}` of `{function}`", .source.0)]
    InvalidParamType {
        function: Box<str>,
        param: Box<str>,
        source: UnknownTypeName,
    },

    #[error("invalid operator `{operator}` for types {lhs} and {rhs}")]
    TypeMismatch {
        operator: Box<str>,
        lhs: Type,
        rhs: Type,
    },
    #[error("argument {position} of `{function}` must be {expected}, found {found}")]
    ArgumentTypeMismatch {
        function: Box<str>,
        position: usize,
        expected: Type,
        found: Type,
    },
    #[error("`if` condition must be bool, found {0}")]
    NonBooleanCondition(Type),

    #[error("function `{0}` must be declared at the top level")]
    FunctionsMustBeTopLevel(Box<str>),
}

impl CompileError {
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::ProgramNotList(_)
            | Self::StatementNotList(_)
            | Self::StatementTooShort(_)
            | Self::OperatorNotSymbol(_)
            | Self::ExpectedName(_)
            | Self::ReservedName(_)
            | Self::QuoteNotText(_)
            | Self::UnquotedText(_)
            | Self::EmptyExpression => ErrorClass::Structural,
            Self::UnknownOperator(_) => ErrorClass::UnknownOperator,
            Self::WrongFormArity { .. }
            | Self::NonBinaryOperation { .. }
            | Self::WrongArgumentCount { .. } => ErrorClass::Arity,
            Self::UndefinedVariable(_) => ErrorClass::UndefinedVariable,
            Self::DuplicateFunction(_) => ErrorClass::DuplicateFunction,
            Self::InvalidParam { .. } | Self::InvalidParamType { .. } => ErrorClass::InvalidParam,
            Self::TypeMismatch { .. }
            | Self::ArgumentTypeMismatch { .. }
            | Self::NonBooleanCondition(_) => ErrorClass::TypeMismatch,
            Self::FunctionsMustBeTopLevel(_) => ErrorClass::ScopeViolation,
        }
    }
}
