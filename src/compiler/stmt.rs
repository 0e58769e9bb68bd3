//! Statement checking. Every statement produces its own opcode buffer, and `if`
//! splices its branches in reverse.
use std::collections::HashSet;

use tracing::debug;

use super::{
    bytecode::{Keyword, Opcodes, Tag},
    error::{Arity, CompileError},
    expr::ExprChecker,
    is_reserved, Checker, Position,
};
use crate::{
    ast::AstNode,
    types::{Function, Param, Type},
};

fn expect_arity(form: &str, arity: Arity, args: &[AstNode]) -> Result<(), CompileError> {
    if arity.is_satisfied(args.len()) {
        Ok(())
    } else {
        Err(CompileError::WrongFormArity {
            form: Box::from(form),
            expected: arity,
            found: args.len(),
        })
    }
}

/// A name that is about to be bound
fn binding_name(node: &AstNode) -> Result<&str, CompileError> {
    let name = node
        .as_symbol()
        .ok_or_else(|| CompileError::ExpectedName(Box::from(node.to_string())))?;
    if is_reserved(name) {
        return Err(CompileError::ReservedName(Box::from(name)));
    }
    Ok(name)
}

impl Checker {
    /// Checks one statement and returns its opcodes.
    ///
    /// `let` binds into the current symbol table, so the binding is visible to every
    /// statement checked afterwards. `fun` registers a function and returns an empty buffer.
    pub fn check_stmt(
        &mut self,
        stmt: &AstNode,
        position: Position,
    ) -> Result<Opcodes, CompileError> {
        let Some(items) = stmt.as_list() else {
            return Err(CompileError::StatementNotList(Box::from(stmt.to_string())));
        };
        if items.len() < 2 {
            return Err(CompileError::StatementTooShort(Box::from(stmt.to_string())));
        }
        let Some(operator) = items[0].as_symbol() else {
            return Err(CompileError::OperatorNotSymbol(Box::from(
                items[0].to_string(),
            )));
        };
        let args = &items[1..];

        match operator {
            "let" => self.check_let(args),
            "print" => self.check_print(args),
            "if" => self.check_if(args),
            "fun" if position == Position::Nested => Err(CompileError::FunctionsMustBeTopLevel(
                Box::from(args[0].to_string()),
            )),
            "fun" => {
                self.check_fun(args)?;
                Ok(Opcodes::new())
            }
            other => Err(CompileError::UnknownOperator(Box::from(other))),
        }
    }

    fn check_let(&mut self, args: &[AstNode]) -> Result<Opcodes, CompileError> {
        expect_arity("let", Arity::Exact(2), args)?;
        let name = binding_name(&args[0])?;

        let mut opcodes = Opcodes::new();
        opcodes.keyword(Keyword::Let).literal(name, Tag::Ident);
        let value = self.check_expr(&args[1])?;
        opcodes.splice(value.opcodes);

        self.symbols.define(name, value.ty);
        Ok(opcodes)
    }

    fn check_print(&mut self, args: &[AstNode]) -> Result<Opcodes, CompileError> {
        expect_arity("print", Arity::Exact(1), args)?;

        let mut opcodes = Opcodes::new();
        opcodes.keyword(Keyword::Print);
        opcodes.splice(self.check_expr(&args[0])?.opcodes);
        Ok(opcodes)
    }

    fn check_if(&mut self, args: &[AstNode]) -> Result<Opcodes, CompileError> {
        expect_arity("if", Arity::Range(2, 3), args)?;

        // checked in emission order, so a `let` in the else branch is visible to the
        // then branch and the condition
        let else_branch = match args.get(2) {
            Some(stmt) => self.check_stmt(stmt, Position::Nested)?,
            None => Opcodes::new(),
        };
        let then_branch = self.check_stmt(&args[1], Position::Nested)?;
        let condition = self.check_expr(&args[0])?;
        if condition.ty != Type::Boolean {
            return Err(CompileError::NonBooleanCondition(condition.ty));
        }

        let mut opcodes = Opcodes::new();
        opcodes
            .keyword(Keyword::End)
            .splice(else_branch)
            .keyword(Keyword::Else)
            .splice(then_branch)
            .keyword(Keyword::If)
            .splice(condition.opcodes);
        Ok(opcodes)
    }

    fn check_fun(&mut self, args: &[AstNode]) -> Result<(), CompileError> {
        expect_arity("fun", Arity::Exact(3), args)?;
        let name = binding_name(&args[0])?;
        if self.functions.contains(name) {
            return Err(CompileError::DuplicateFunction(Box::from(name)));
        }
        let params = parse_params(name, &args[1])?;

        // the body sees everything bound so far, plus the parameters
        let mut scope = self.symbols.clone();
        for param in &params {
            scope.define(&param.name, param.ty);
        }
        let body = ExprChecker::new(&scope, &self.functions).check(&args[2])?;

        let mut opcodes = Opcodes::new();
        opcodes.keyword(Keyword::Return).splice(body.opcodes);
        let function = Function {
            name: Box::from(name),
            params,
            return_type: body.ty,
            body: opcodes,
        };
        debug!(%function, "registered function");
        self.functions.register(function)
    }
}

/// Reads `[[name type] ...]`
fn parse_params(function: &str, params: &AstNode) -> Result<Vec<Param>, CompileError> {
    let invalid = |param: &AstNode, reason: &'static str| CompileError::InvalidParam {
        function: Box::from(function),
        param: Box::from(param.to_string()),
        reason,
    };

    let list = params
        .as_list()
        .ok_or_else(|| invalid(params, "parameters must be a list"))?;
    let mut seen = HashSet::new();
    list.iter()
        .map(|pair| {
            let Some([name, type_name]) = pair.as_list() else {
                return Err(invalid(pair, "expected a [name type] pair"));
            };
            let name = name
                .as_symbol()
                .ok_or_else(|| invalid(pair, "parameter name must be a symbol"))?;
            if is_reserved(name) {
                return Err(invalid(pair, "parameter name is reserved"));
            }
            if !seen.insert(name) {
                return Err(invalid(pair, "duplicate parameter name"));
            }
            let type_name = type_name
                .as_symbol()
                .ok_or_else(|| invalid(pair, "parameter type must be a symbol"))?;
            let ty = type_name
                .parse()
                .map_err(|source| CompileError::InvalidParamType {
                    function: Box::from(function),
                    param: Box::from(name),
                    source,
                })?;
            Ok(Param {
                name: Box::from(name),
                ty,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use assert2::{check, let_assert};

    use crate::{
        compiler::{
            error::{CompileError, ErrorClass},
            Checker, Position,
        },
        sexp,
        types::Type,
        AstNode,
    };

    fn top(checker: &mut Checker, stmt: AstNode) -> Result<String, CompileError> {
        checker
            .check_stmt(&stmt, Position::TopLevel)
            .map(|ops| ops.to_string())
    }

    fn emit(checker: &mut Checker, stmt: AstNode) -> String {
        let_assert!(Ok(ops) = top(checker, stmt));
        ops
    }

    #[test]
    fn let_emits_header_then_value() {
        let mut checker = Checker::new();
        check!(
            emit(&mut checker, sexp!([let x ["+" 1 2]]))
                == "let x ident + 1.0 number 2.0 number"
        );
        check!(checker.symbols().get("x") == Some(Type::Number));

        // rebinding takes the new type
        check!(top(&mut checker, sexp!([let x true])).is_ok());
        check!(checker.symbols().get("x") == Some(Type::Boolean));
    }

    #[test]
    fn let_shape() {
        let mut checker = Checker::new();
        let_assert!(Err(err) = top(&mut checker, sexp!([let])));
        check!(err.class() == ErrorClass::Structural);
        let_assert!(Err(err) = top(&mut checker, sexp!([let x])));
        check!(err.class() == ErrorClass::Arity);
        let_assert!(Err(err) = top(&mut checker, sexp!([let x 1 2])));
        check!(err.class() == ErrorClass::Arity);
        let_assert!(Err(err) = top(&mut checker, sexp!([let 1 2])));
        check!(err == CompileError::ExpectedName(Box::from("1")));
        let_assert!(Err(err) = top(&mut checker, sexp!([let true 2])));
        check!(err == CompileError::ReservedName(Box::from("true")));
    }

    #[test]
    fn print() {
        let mut checker = Checker::new();
        check!(emit(&mut checker, sexp!([print [quote hi]])) == "print hi string");
        let_assert!(Err(err) = top(&mut checker, sexp!([print 1 2])));
        check!(err.class() == ErrorClass::Arity);
    }

    #[test]
    fn if_else_is_assembled_in_reverse() {
        let mut checker = Checker::new();
        let ops = emit(
            &mut checker,
            sexp!([if ["<" 1 2] [print [quote yes]] [print [quote no]]]),
        );
        check!(ops == "end print no string else print yes string if < 1.0 number 2.0 number");
    }

    #[test]
    fn if_without_else_keeps_markers() {
        let mut checker = Checker::new();
        let ops = emit(&mut checker, sexp!([if true [print 1]]));
        check!(ops == "end else print 1.0 number if true bool");
    }

    #[test]
    fn nested_if() {
        let mut checker = Checker::new();
        let ops = emit(
            &mut checker,
            sexp!([if true [if false [print 1] [print 2]] [print 3]]),
        );
        check!(
            ops == concat!(
                "end print 3.0 number else ",
                "end print 2.0 number else print 1.0 number if false bool ",
                "if true bool"
            )
        );
    }

    #[test]
    fn if_shape_and_condition() {
        let mut checker = Checker::new();
        let_assert!(Err(err) = top(&mut checker, sexp!([if true [print 1] [print 2] [print 3]])));
        check!(err.class() == ErrorClass::Arity);
        let_assert!(Err(err) = top(&mut checker, sexp!([if 1 [print 1]])));
        check!(err == CompileError::NonBooleanCondition(Type::Number));
        // branches are statements, not expressions
        let_assert!(Err(err) = top(&mut checker, sexp!([if true 1])));
        check!(err.class() == ErrorClass::Structural);
    }

    #[test]
    fn branches_are_checked_in_emission_order() {
        let mut checker = Checker::new();
        check!(
            emit(&mut checker, sexp!([if true [print y] [let y 1]]))
                == "end let y ident 1.0 number else print y var if true bool"
        );

        let mut checker = Checker::new();
        let_assert!(Err(err) = top(&mut checker, sexp!([if true [let z 1] [print z]])));
        check!(err == CompileError::UndefinedVariable(Box::from("z")));

        let mut checker = Checker::new();
        check!(top(&mut checker, sexp!([if flag [let flag true]])).is_ok());
    }

    #[test]
    fn lets_in_branches_bind_in_the_enclosing_scope() {
        let mut checker = Checker::new();
        check!(top(&mut checker, sexp!([if true [let y 1]])).is_ok());
        check!(checker.symbols().get("y") == Some(Type::Number));
    }

    #[test]
    fn functions_register_and_emit_nothing() {
        let mut checker = Checker::new();
        let ops = emit(&mut checker, sexp!([fun add [[a number] [b number]] ["+" a b]]));
        check!(ops.is_empty());

        let_assert!(Some(add) = checker.functions().get("add"));
        check!(add.return_type == Type::Number);
        check!(add.param_names().collect::<Vec<_>>() == ["a", "b"]);
        check!(add.body.to_string() == "return + a var b var");
        check!(add.to_string() == "fn add(a: number, b: number) -> number");

        // parameters do not leak into the enclosing scope
        check!(!checker.symbols().contains("a"));
    }

    #[test]
    fn calls_after_declaration() {
        let mut checker = Checker::new();
        top(&mut checker, sexp!([fun add [[a number] [b number]] ["+" a b]])).unwrap();

        let_assert!(Ok(typed) = checker.check_expr(&sexp!([add 1 2])));
        check!(typed.ty == Type::Number);

        let_assert!(Err(err) = checker.check_expr(&sexp!([add 1 [quote x]])));
        check!(err.class() == ErrorClass::TypeMismatch);
        check!(matches!(err, CompileError::ArgumentTypeMismatch { position: 2, .. }));

        let_assert!(Err(err) = checker.check_expr(&sexp!([add 1])));
        check!(matches!(err, CompileError::WrongArgumentCount { expected: 2, found: 1, .. }));
    }

    #[test]
    fn return_type_is_inferred_from_the_body() {
        let mut checker = Checker::new();
        top(&mut checker, sexp!([fun same [[s string] [t string]] ["==" s t]])).unwrap();
        let_assert!(Some(same) = checker.functions().get("same"));
        check!(same.return_type == Type::Boolean);

        top(&mut checker, sexp!([fun greeting [] [quote hello]])).unwrap();
        let_assert!(Some(greeting) = checker.functions().get("greeting"));
        check!(greeting.return_type == Type::String);
        check!(greeting.body.to_string() == "return hello string");
    }

    #[test]
    fn function_bodies_see_earlier_lets_only() {
        let mut checker = Checker::new();
        let_assert!(Err(err) = top(&mut checker, sexp!([fun f [] ["+" limit 1]])));
        check!(err == CompileError::UndefinedVariable(Box::from("limit")));

        top(&mut checker, sexp!([let limit 10])).unwrap();
        check!(top(&mut checker, sexp!([fun f [] ["+" limit 1]])).is_ok());
    }

    #[test]
    fn parameters_shadow_enclosing_variables() {
        let mut checker = Checker::new();
        top(&mut checker, sexp!([let x [quote outer]])).unwrap();
        top(&mut checker, sexp!([fun inc [[x number]] ["+" x 1]])).unwrap();
        check!(checker.symbols().get("x") == Some(Type::String));
    }

    #[test]
    fn duplicate_functions() {
        let mut checker = Checker::new();
        top(&mut checker, sexp!([fun f [] 1])).unwrap();
        let_assert!(Err(err) = top(&mut checker, sexp!([fun f [] 2])));
        check!(err == CompileError::DuplicateFunction(Box::from("f")));
        check!(err.class() == ErrorClass::DuplicateFunction);
    }

    #[test]
    fn functions_must_be_top_level() {
        let mut checker = Checker::new();
        let_assert!(Err(err) = top(&mut checker, sexp!([if true [fun f [] 1]])));
        check!(err == CompileError::FunctionsMustBeTopLevel(Box::from("f")));
        check!(err.class() == ErrorClass::ScopeViolation);
        check!(checker.functions().is_empty());
    }

    #[test]
    fn functions_cannot_call_themselves() {
        let mut checker = Checker::new();
        let_assert!(Err(err) = top(&mut checker, sexp!([fun again [[n number]] [again n n]])));
        check!(err == CompileError::UnknownOperator(Box::from("again")));
    }

    #[test]
    fn invalid_params() {
        let mut checker = Checker::new();
        for stmt in [
            sexp!([fun f x 1]),
            sexp!([fun f [x] 1]),
            sexp!([fun f [[x number extra]] 1]),
            sexp!([fun f [[1 number]] 1]),
            sexp!([fun f [[x number] [x string]] 1]),
            sexp!([fun f [[if number]] 1]),
            sexp!([fun f [[x int]] 1]),
        ] {
            let_assert!(Err(err) = top(&mut checker, stmt));
            check!(err.class() == ErrorClass::InvalidParam);
        }
        check!(checker.functions().is_empty());
    }

    #[test]
    fn unknown_parameter_types_keep_their_cause() {
        use std::error::Error as _;

        let mut checker = Checker::new();
        let_assert!(Err(err) = top(&mut checker, sexp!([fun f [[x int]] x])));
        check!(err.to_string() == "invalid type `int` for parameter `x` of `f`");
        let_assert!(Some(source) = err.source());
        check!(source.to_string() == "unknown type name: int");
    }

    #[test]
    fn fun_shape() {
        let mut checker = Checker::new();
        let_assert!(Err(err) = top(&mut checker, sexp!([fun f []])));
        check!(err.class() == ErrorClass::Arity);
        let_assert!(Err(err) = top(&mut checker, sexp!([fun print [] 1])));
        check!(err == CompileError::ReservedName(Box::from("print")));
    }

    #[test]
    fn unknown_statements() {
        let mut checker = Checker::new();
        let_assert!(Err(err) = top(&mut checker, sexp!([while true])));
        check!(err == CompileError::UnknownOperator(Box::from("while")));
        let_assert!(Err(err) = top(&mut checker, sexp!([[print] 1])));
        check!(err.class() == ErrorClass::Structural);
        let_assert!(Err(err) = top(&mut checker, AstNode::Number(1.0)));
        check!(err == CompileError::StatementNotList(Box::from("1")));
    }
}
