//! Type check a program and compile it into opcodes for the stack interpreter.
//!
//! For example:
//!
//! ```text
//! (let x 2)
//! (fun double [[n number]] (* n 2))
//! (if (> x 1) (print (double x)) (print (quote small)))
//! ```
//!
//! compiles to the function table
//!
//! ```text
//! double: return * n var 2.0 number
//! ```
//!
//! and the top-level stream
//!
//! ```text
//! end print small string else print call double ident x var if > x var 1.0 number
//! let x ident 2.0 number
//! ```
//!
//! The interpreter consumes tokens from the *end* of the stream, so statements are emitted
//! last-first, and an `if` is emitted as `end <else> else <then> if <condition>`.
//! Within a statement, values follow the token that consumes them.
use tracing::debug;

use crate::{ast::AstNode, types::Type};

pub mod bytecode;
pub mod environment;
pub mod error;
pub mod expr;
pub mod program;
mod stmt;

use bytecode::Opcodes;
use environment::{FunctionTable, SymbolTable};
use error::CompileError;
use expr::{ExprChecker, Typed};
use program::Program;

/// Names that can never be bound by `let`, parameters, or `fun`
pub const RESERVED: &[&str] = &[
    "let", "print", "if", "fun", "quote", "true", "false", "+", "-", "*", "/", "==", "!=", ">=",
    "<=", ">", "<",
];

pub fn is_reserved(name: &str) -> bool {
    RESERVED.contains(&name)
}

/// Where a statement appears. Only top-level statements may declare functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Position {
    TopLevel,
    Nested,
}

/// Checking state for one program: the variables bound so far and the functions declared
/// so far. A fresh checker is used for every program.
#[derive(Debug, Default)]
pub struct Checker {
    symbols: SymbolTable,
    functions: FunctionTable,
}

impl Checker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    pub fn functions(&self) -> &FunctionTable {
        &self.functions
    }

    /// Infers the type of an expression against the top-level scope
    pub fn check_expr(&self, expr: &AstNode) -> Result<Typed, CompileError> {
        ExprChecker::new(&self.symbols, &self.functions).check(expr)
    }

    pub fn into_functions(self) -> FunctionTable {
        self.functions
    }
}

/// Checks every top-level statement in source order and assembles the program.
///
/// The returned stream is the statements' buffers concatenated last statement first.
pub fn check_program(program: &AstNode) -> Result<Program, CompileError> {
    let Some(statements) = program.as_list() else {
        return Err(CompileError::ProgramNotList(Box::from(program.to_string())));
    };

    let mut checker = Checker::new();
    let mut buffers = Vec::with_capacity(statements.len());
    for (index, statement) in statements.iter().enumerate() {
        let opcodes = checker.check_stmt(statement, Position::TopLevel)?;
        debug!(index, tokens = opcodes.len(), "checked statement");
        buffers.push(opcodes);
    }

    let mut opcodes = Opcodes::new();
    for buffer in buffers.into_iter().rev() {
        opcodes.splice(buffer);
    }

    let functions = checker.into_functions();
    debug!(
        statements = statements.len(),
        tokens = opcodes.len(),
        functions = functions.len(),
        "assembled program"
    );
    Ok(Program::new(opcodes, functions))
}

/// Checks a single expression in an empty scope, returning its type
pub fn infer(expr: &AstNode) -> Result<Type, CompileError> {
    Checker::new().check_expr(expr).map(|typed| typed.ty)
}
