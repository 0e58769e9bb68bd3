//! Expression checking: infers a type and emits the expression's opcodes
use super::{
    bytecode::{decimal_text, Keyword, Opcodes, Tag},
    environment::{FunctionTable, SymbolTable},
    error::{Arity, CompileError},
};
use crate::{
    ast::AstNode,
    types::{Function, Type},
};

/// An expression's inferred type together with its opcodes
#[derive(Debug, Clone, PartialEq)]
pub struct Typed {
    pub ty: Type,
    pub opcodes: Opcodes,
}

impl Typed {
    fn literal(ty: Type, value: impl AsRef<str>, tag: Tag) -> Self {
        let mut opcodes = Opcodes::new();
        opcodes.literal(value, tag);
        Self { ty, opcodes }
    }
}

/// Binary operators, grouped by the operand types they accept
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperatorGroup {
    /// `+ - * /`
    Arithmetic,
    /// `== !=`
    Equality,
    /// `>= <= > <`
    Relational,
}

impl OperatorGroup {
    pub fn of(operator: &str) -> Option<Self> {
        match operator {
            "+" | "-" | "*" | "/" => Some(Self::Arithmetic),
            "==" | "!=" => Some(Self::Equality),
            ">=" | "<=" | ">" | "<" => Some(Self::Relational),
            _ => None,
        }
    }

    /// The result type for operands of type `lhs` and `rhs`, if they are accepted
    pub fn result(self, lhs: Type, rhs: Type) -> Option<Type> {
        match (self, lhs, rhs) {
            (Self::Arithmetic, Type::Number, Type::Number) => Some(Type::Number),
            (Self::Equality, Type::Number, Type::Number)
            | (Self::Equality, Type::String, Type::String) => Some(Type::Boolean),
            (Self::Relational, Type::Number, Type::Number) => Some(Type::Boolean),
            _ => None,
        }
    }
}

/// Checks expressions against one scope.
///
/// Top-level expressions use the program's symbol table; function bodies use a copy of it
/// extended with the parameters.
#[derive(Debug, Clone, Copy)]
pub struct ExprChecker<'a> {
    symbols: &'a SymbolTable,
    functions: &'a FunctionTable,
}

impl<'a> ExprChecker<'a> {
    pub fn new(symbols: &'a SymbolTable, functions: &'a FunctionTable) -> Self {
        Self { symbols, functions }
    }

    pub fn check(&self, expr: &AstNode) -> Result<Typed, CompileError> {
        match expr {
            AstNode::Number(value) => Ok(Typed::literal(
                Type::Number,
                decimal_text(*value),
                Tag::Number,
            )),
            // boolean literals win over variable lookup
            AstNode::Symbol(name) if matches!(name.as_ref(), "true" | "false") => {
                Ok(Typed::literal(Type::Boolean, name, Tag::Bool))
            }
            AstNode::Symbol(name) => {
                let ty = self
                    .symbols
                    .get(name)
                    .ok_or_else(|| CompileError::UndefinedVariable(name.clone()))?;
                Ok(Typed::literal(ty, name, Tag::Var))
            }
            AstNode::Text(text) => Err(CompileError::UnquotedText(text.clone())),
            AstNode::List(items) => self.check_list(items),
        }
    }

    fn check_list(&self, items: &[AstNode]) -> Result<Typed, CompileError> {
        let Some((head, args)) = items.split_first() else {
            return Err(CompileError::EmptyExpression);
        };
        let Some(operator) = head.as_symbol() else {
            return Err(CompileError::OperatorNotSymbol(Box::from(head.to_string())));
        };

        if operator == "quote" {
            return Self::check_quote(args);
        }
        if let Some(function) = self.functions.get(operator) {
            return self.check_call(function, args);
        }
        self.check_binary(operator, args)
    }

    fn check_quote(args: &[AstNode]) -> Result<Typed, CompileError> {
        let [arg] = args else {
            return Err(CompileError::WrongFormArity {
                form: Box::from("quote"),
                expected: Arity::Exact(1),
                found: args.len(),
            });
        };
        match arg {
            AstNode::Symbol(text) | AstNode::Text(text) => {
                Ok(Typed::literal(Type::String, text, Tag::String))
            }
            other => Err(CompileError::QuoteNotText(Box::from(other.to_string()))),
        }
    }

    fn check_call(&self, function: &Function, args: &[AstNode]) -> Result<Typed, CompileError> {
        if args.len() != function.arity() {
            return Err(CompileError::WrongArgumentCount {
                function: function.name.clone(),
                expected: function.arity(),
                found: args.len(),
            });
        }

        let mut opcodes = Opcodes::new();
        opcodes
            .keyword(Keyword::Call)
            .literal(&function.name, Tag::Ident);
        for (position, (arg, param)) in args.iter().zip(&function.params).enumerate() {
            let typed = self.check(arg)?;
            if typed.ty != param.ty {
                return Err(CompileError::ArgumentTypeMismatch {
                    function: function.name.clone(),
                    position: position + 1,
                    expected: param.ty,
                    found: typed.ty,
                });
            }
            opcodes.splice(typed.opcodes);
        }

        Ok(Typed {
            ty: function.return_type,
            opcodes,
        })
    }

    fn check_binary(&self, operator: &str, args: &[AstNode]) -> Result<Typed, CompileError> {
        let [lhs, rhs] = args else {
            return Err(CompileError::NonBinaryOperation {
                operator: Box::from(operator),
                found: args.len(),
            });
        };
        let group = OperatorGroup::of(operator)
            .ok_or_else(|| CompileError::UnknownOperator(Box::from(operator)))?;

        let lhs = self.check(lhs)?;
        let rhs = self.check(rhs)?;
        let ty = group
            .result(lhs.ty, rhs.ty)
            .ok_or_else(|| CompileError::TypeMismatch {
                operator: Box::from(operator),
                lhs: lhs.ty,
                rhs: rhs.ty,
            })?;

        let mut opcodes = Opcodes::new();
        opcodes.token(operator).splice(lhs.opcodes).splice(rhs.opcodes);
        Ok(Typed { ty, opcodes })
    }
}
