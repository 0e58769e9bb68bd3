//! The compiled artifact, and its rendering as a host program for the interpreter
use core::fmt::{self, Write as _};

use serde::Serialize;

use super::{bytecode::Opcodes, environment::FunctionTable};
use crate::types::Function;

/// A checked program: the top-level stream (already last-statement-first) and every
/// declared function
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    opcodes: Opcodes,
    functions: FunctionTable,
}

#[derive(thiserror::Error, Debug)]
pub enum RenderError {
    #[error("failed to encode tokens: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("failed to write output")]
    Format(#[from] fmt::Error),
}

/// What the interpreter sees of a function. Parameter types are erased.
#[derive(Serialize)]
struct FunctionExport<'a> {
    body: Vec<&'a str>,
    params: Vec<&'a str>,
}

impl<'a> From<&'a Function> for FunctionExport<'a> {
    fn from(function: &'a Function) -> Self {
        Self {
            body: function.body.iter().collect(),
            params: function.param_names().collect(),
        }
    }
}

impl Program {
    pub fn new(opcodes: Opcodes, functions: FunctionTable) -> Self {
        Self { opcodes, functions }
    }

    pub fn opcodes(&self) -> &Opcodes {
        &self.opcodes
    }

    pub fn functions(&self) -> &FunctionTable {
        &self.functions
    }

    /// Renders the program as JavaScript that hands everything to `evalProgram`:
    ///
    /// ```text
    /// const functions = new Map();
    /// functions.set("add", {"body":["return","+","a","var","b","var"],"params":["a","b"]});
    /// const opcodes = ["print","call","add","ident","1.0","number","2.0","number"];
    /// evalProgram(opcodes, functions)
    /// ```
    pub fn to_javascript(&self) -> Result<String, RenderError> {
        let mut out = String::new();
        writeln!(out, "const functions = new Map();")?;
        for function in self.functions.iter() {
            writeln!(
                out,
                "functions.set({}, {});",
                serde_json::to_string(function.name.as_ref())?,
                serde_json::to_string(&FunctionExport::from(function))?
            )?;
        }
        writeln!(
            out,
            "const opcodes = {};",
            serde_json::to_string(&self.opcodes.iter().collect::<Vec<_>>())?
        )?;
        write!(out, "evalProgram(opcodes, functions)")?;
        Ok(out)
    }
}

/// A plain listing: each function's signature over its indented body, then the top-level
/// stream on one line
impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for function in self.functions.iter() {
            writeln!(f, "{function}")?;
            writeln!(f, "  {}", function.body)?;
        }
        write!(f, "opcodes:")?;
        for token in self.opcodes.iter() {
            write!(f, " {token}")?;
        }
        Ok(())
    }
}
