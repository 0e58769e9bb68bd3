use std::collections::{BTreeMap, HashMap};

use super::error::CompileError;
use crate::types::{Function, Type};

/// Maps variable names to their static type.
///
/// One table lives for a whole program. Function bodies are checked against a clone taken
/// when the function is declared, so top-level `let`s made before the declaration are
/// visible inside it, and nothing bound while checking the body leaks back out.
#[derive(Debug, Clone, Default)]
pub struct SymbolTable {
    types: HashMap<Box<str>, Type>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Binds `name`, replacing any binding that already exists (which is returned)
    pub fn define(&mut self, name: impl AsRef<str>, ty: Type) -> Option<Type> {
        self.types.insert(Box::from(name.as_ref()), ty)
    }

    pub fn get(&self, name: impl AsRef<str>) -> Option<Type> {
        self.types.get(name.as_ref()).copied()
    }

    pub fn contains(&self, name: impl AsRef<str>) -> bool {
        self.types.contains_key(name.as_ref())
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

/// All functions declared in a program, keyed by name.
///
/// Kept ordered so that anything rendered from it is deterministic.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FunctionTable {
    functions: BTreeMap<Box<str>, Function>,
}

impl FunctionTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a checked function. Names are unique within a program.
    pub fn register(&mut self, function: Function) -> Result<(), CompileError> {
        if self.functions.contains_key(&function.name) {
            return Err(CompileError::DuplicateFunction(function.name));
        }
        self.functions.insert(function.name.clone(), function);
        Ok(())
    }

    pub fn get(&self, name: impl AsRef<str>) -> Option<&Function> {
        self.functions.get(name.as_ref())
    }

    pub fn contains(&self, name: impl AsRef<str>) -> bool {
        self.functions.contains_key(name.as_ref())
    }

    pub fn iter(&self) -> impl Iterator<Item = &Function> {
        self.functions.values()
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use assert2::{check, let_assert};

    use super::{FunctionTable, SymbolTable};
    use crate::{
        compiler::{bytecode::Opcodes, error::CompileError},
        types::{Function, Type},
    };

    fn function(name: &str) -> Function {
        Function {
            name: Box::from(name),
            params: vec![],
            return_type: Type::Number,
            body: Opcodes::new(),
        }
    }

    #[test]
    fn later_definitions_replace_earlier_ones() {
        let mut symbols = SymbolTable::new();
        check!(symbols.define("x", Type::Number) == None);
        check!(symbols.define("x", Type::String) == Some(Type::Number));
        check!(symbols.get("x") == Some(Type::String));
        check!(symbols.get("y") == None);
    }

    #[test]
    fn clones_are_independent() {
        let mut outer = SymbolTable::new();
        outer.define("x", Type::Number);

        let mut inner = outer.clone();
        inner.define("y", Type::Boolean);

        check!(inner.contains("x"));
        check!(!outer.contains("y"));
        check!(outer.len() == 1);
    }

    #[test]
    fn function_names_are_unique() {
        let mut functions = FunctionTable::new();
        check!(functions.register(function("f")).is_ok());
        let_assert!(Err(CompileError::DuplicateFunction(name)) = functions.register(function("f")));
        check!(name.as_ref() == "f");
        check!(functions.len() == 1);
    }

    #[test]
    fn iterates_in_name_order() {
        let mut functions = FunctionTable::new();
        for name in ["zeta", "alpha", "mid"] {
            functions.register(function(name)).unwrap();
        }
        let names = functions.iter().map(|f| f.name.as_ref()).collect::<Vec<_>>();
        check!(names == ["alpha", "mid", "zeta"]);
    }
}
