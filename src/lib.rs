pub mod ast;
pub mod compiler;
pub mod lexer;
pub mod reader;
pub mod types;

pub use ast::AstNode;
pub use compiler::{
    bytecode::Opcodes,
    check_program,
    environment::{FunctionTable, SymbolTable},
    error::{CompileError, ErrorClass},
    program::{Program, RenderError},
    Checker, Position,
};
pub use reader::{read_program, read_program_with, ReadError, ReaderOptions};
pub use types::{Function, Param, Type};

/// Anything that can go wrong between source text and a [`Program`]
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error(transparent)]
    Read(#[from] ReadError),
    #[error(transparent)]
    Compile(#[from] CompileError),
}

/// Reads and checks a whole program
pub fn compile(source: &str) -> Result<Program, Error> {
    compile_with(source, ReaderOptions::default())
}

pub fn compile_with(source: &str, options: ReaderOptions) -> Result<Program, Error> {
    let ast = read_program_with(source, options)?;
    Ok(check_program(&ast)?)
}
