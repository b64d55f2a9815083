//! Type checking
//!
//! Walks the syntax tree in source order, gives every name and expression its [Kind]
//! and produces the typed [SourceProgram] the compiler pipeline starts from.
//!
//! All names share one flat cache, filled in source order: a declaration sets the kind
//! of its name for everything that follows, no matter in which block or function.

use std::collections::HashMap;

use miette::Diagnostic;
use thiserror::Error;

use crate::ast::{self, Name, Parsed, Present, SourceProgram};
use crate::error::TypeMismatch;
use crate::parsing::ast::{BinaryOp, Expression, Function, Statement};
use crate::{Kind, Span, Spanned};

type Typed<T> = Result<T, TypeCheckError>;

#[derive(Debug, Error, Diagnostic, PartialEq, Eq)]
pub enum TypeCheckError {
    #[error("Use of undeclared name `{name}`")]
    #[diagnostic(help("Declare it with `var {name} = ...;` before using it"))]
    UndeclaredVariable {
        name: String,

        #[label("not declared")]
        span: Span,
    },

    #[error("{mismatch}")]
    MismatchedOperands {
        mismatch: TypeMismatch,

        #[label("operands of different types")]
        span: Span,
    },

    #[error("The condition must be a comparison")]
    #[diagnostic(help("Compare the value explicitly, e.g. `x != 0`"))]
    NotACondition {
        #[label("not a comparison")]
        span: Span,
    },

    #[error("Function returns {expected}, but this returns {found}")]
    ReturnTypeMismatch {
        expected: Kind,
        found: Kind,

        #[label("returned here")]
        span: Span,
    },

    #[error("Cannot store a {found} in `{name}`, which is a {expected}")]
    AssignmentMismatch {
        name: String,
        expected: Kind,
        found: Kind,

        #[label("value of the wrong type")]
        span: Span,
    },

    #[error("`{function}` takes {expected} arguments, but {found} were given")]
    WrongArgumentCount {
        function: String,
        expected: usize,
        found: usize,

        #[label("in this call")]
        span: Span,
    },

    #[error("Argument of `{function}` should be a {expected}, but is a {found}")]
    ArgumentMismatch {
        function: String,
        expected: Kind,
        found: Kind,

        #[label("this argument")]
        span: Span,
    },
}

/// Give every name and expression of the program its kind
pub fn type_check(program: &[Spanned<Statement>]) -> Typed<SourceProgram> {
    let mut checker = TypeChecker::default();

    // loose statements end up in an `int` returning main
    checker.returns.push(Vec::new());
    let statements = checker.check_block(program)?;
    if let Some(returns) = checker.returns.pop() {
        check_returns(&returns, Kind::Integer)?;
    }

    Ok(ast::Program::new(statements))
}

fn check_returns(returns: &[(Kind, Span)], expected: Kind) -> Typed<()> {
    match returns.iter().find(|(found, _)| *found != expected) {
        Some((found, span)) => Err(TypeCheckError::ReturnTypeMismatch {
            expected,
            found: *found,
            span: *span,
        }),
        None => Ok(()),
    }
}

#[derive(Debug, Default)]
struct TypeChecker {
    names: HashMap<String, Kind>,
    signatures: HashMap<String, Vec<Kind>>,
    /// Kinds returned in each enclosing function, innermost last
    returns: Vec<Vec<(Kind, Span)>>,
}

impl TypeChecker {
    fn check_block(
        &mut self,
        block: &[Spanned<Statement>],
    ) -> Typed<Vec<ast::Statement<Parsed>>> {
        block
            .iter()
            .map(|(statement, span)| self.check_statement(statement, *span))
            .collect()
    }

    fn check_statement(
        &mut self,
        statement: &Statement,
        span: Span,
    ) -> Typed<ast::Statement<Parsed>> {
        let checked = match statement {
            Statement::VarDecl { name, kind } => {
                self.names.insert(name.0.clone(), *kind);
                ast::Statement::VarDecl(Name::new(&name.0, *kind))
            }
            Statement::VarInit { name, kind, value } => {
                let value = self.check_expression(value)?;
                let found = value.kind();
                if let Some(expected) = *kind {
                    if expected != found {
                        return Err(TypeCheckError::AssignmentMismatch {
                            name: name.0.clone(),
                            expected,
                            found,
                            span,
                        });
                    }
                }
                self.names.insert(name.0.clone(), found);
                ast::Statement::VarInit(Present, Name::new(&name.0, found), value)
            }
            Statement::Assign { name, value } => {
                let typed = self.check_expression(value)?;
                let found = typed.kind();
                let expected = *self.names.entry(name.0.clone()).or_insert(found);
                if expected != found {
                    return Err(TypeCheckError::AssignmentMismatch {
                        name: name.0.clone(),
                        expected,
                        found,
                        span: value.1,
                    });
                }
                ast::Statement::Assign(Name::new(&name.0, expected), typed)
            }
            Statement::Print(value) => ast::Statement::Print(self.check_expression(value)?),
            Statement::If {
                condition,
                if_true,
                if_false,
            } => ast::Statement::IfElse {
                condition: self.check_condition(condition)?,
                if_true: self.check_block(if_true)?,
                if_false: self.check_block(if_false)?,
            },
            Statement::While { condition, body } => ast::Statement::While {
                condition: self.check_condition(condition)?,
                body: self.check_block(body)?,
            },
            Statement::Function(function) => {
                ast::Statement::Function(self.check_function(function)?)
            }
            Statement::Return(value) => {
                let typed = self.check_expression(value)?;
                if let Some(returns) = self.returns.last_mut() {
                    returns.push((typed.kind(), value.1));
                }
                ast::Statement::Return(typed)
            }
            Statement::Expression(value) => {
                ast::Statement::Expression(self.check_expression(value)?)
            }
        };

        Ok(checked)
    }

    fn check_function(
        &mut self,
        function: &Function,
    ) -> Typed<ast::Function<Name, ast::Statement<Parsed>>> {
        let Function {
            name,
            params,
            return_kind,
            body,
        } = function;

        self.signatures
            .insert(name.0.clone(), params.iter().map(|(_, kind)| *kind).collect());
        if let Some(kind) = return_kind {
            self.names.insert(name.0.clone(), *kind);
        }

        let parameters = params
            .iter()
            .map(|(param, kind)| {
                self.names.insert(param.clone(), *kind);
                Name::new(param, *kind)
            })
            .collect();

        self.returns.push(Vec::new());
        let body = self.check_block(body);
        let returns = self.returns.pop().unwrap_or_default();
        let body = body?;

        let kind = match return_kind {
            Some(kind) => *kind,
            None => returns.last().map_or(Kind::Integer, |(kind, _)| *kind),
        };
        self.names.insert(name.0.clone(), kind);
        check_returns(&returns, kind)?;

        Ok(ast::Function::new(Name::new(&name.0, kind), parameters, body))
    }

    fn check_condition(
        &mut self,
        condition: &Spanned<Expression>,
    ) -> Typed<ast::Condition<Parsed>> {
        match &condition.0 {
            Expression::Binary {
                op: BinaryOp::Compare(op),
                lhs,
                rhs,
            } => Ok(ast::Condition::new(
                *op,
                self.check_expression(lhs)?,
                self.check_expression(rhs)?,
            )),
            _ => Err(TypeCheckError::NotACondition { span: condition.1 }),
        }
    }

    fn check_expression(
        &mut self,
        (expr, span): &Spanned<Expression>,
    ) -> Typed<ast::Expression<Parsed>> {
        let typed = match expr {
            Expression::Int(value) => ast::Expression::Integer(*value),
            Expression::Float(value) => ast::Expression::Float(*value),
            Expression::Var(name) => ast::Expression::Name(self.lookup(name, *span)?),
            Expression::Negate(inner) => {
                ast::Expression::Negate(Present, Box::new(self.check_expression(inner)?))
            }
            Expression::Binary { op, lhs, rhs } => {
                let left = self.check_expression(lhs)?;
                let right = self.check_expression(rhs)?;
                match op {
                    BinaryOp::Arithmetic(op) => ast::Expression::binary(*op, left, right)
                        .map_err(|mismatch| TypeCheckError::MismatchedOperands {
                            mismatch,
                            span: *span,
                        })?,
                    BinaryOp::Compare(op) => ast::Expression::condition(*op, left, right),
                }
            }
            Expression::Call { function, args } => {
                let Some(params) = self.signatures.get(function).cloned() else {
                    return Err(TypeCheckError::UndeclaredVariable {
                        name: function.clone(),
                        span: *span,
                    });
                };
                if params.len() != args.len() {
                    return Err(TypeCheckError::WrongArgumentCount {
                        function: function.clone(),
                        expected: params.len(),
                        found: args.len(),
                        span: *span,
                    });
                }

                let mut arguments = Vec::with_capacity(args.len());
                for (arg, expected) in args.iter().zip(params) {
                    let typed = self.check_expression(arg)?;
                    if typed.kind() != expected {
                        return Err(TypeCheckError::ArgumentMismatch {
                            function: function.clone(),
                            expected,
                            found: typed.kind(),
                            span: arg.1,
                        });
                    }
                    arguments.push(typed);
                }

                ast::Expression::call(self.lookup(function, *span)?, arguments)
            }
        };

        Ok(typed)
    }

    fn lookup(&self, name: &str, span: Span) -> Typed<Name> {
        self.names
            .get(name)
            .map(|kind| Name::new(name, *kind))
            .ok_or_else(|| TypeCheckError::UndeclaredVariable {
                name: name.to_string(),
                span,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{BinaryOperator, Named};
    use crate::parse;

    fn check(source: &str) -> Typed<SourceProgram> {
        type_check(&parse(source).expect("test source must parse"))
    }

    #[test]
    fn kinds_flow_from_declarations() {
        let program = check("var x = 1.5;\nvar y = x * 2.0;\nprint y;").unwrap();
        let ast::Statement::VarInit(_, name, value) = &program.statements[1] else {
            panic!("expected a declaration");
        };
        assert_eq!(name, &Name::new("y", Kind::Float));
        assert_eq!(value.kind(), Kind::Float);
    }

    #[test]
    fn undeclared_read() {
        assert_eq!(
            check("print x;"),
            Err(TypeCheckError::UndeclaredVariable {
                name: String::from("x"),
                span: Span::new(6, 7),
            })
        );
    }

    #[test]
    fn assignment_records_unknown_names() {
        let program = check("x = 1;\nprint x;").unwrap();
        assert_eq!(
            program.statements[1],
            ast::Statement::Print(ast::Expression::Name(Name::new("x", Kind::Integer)))
        );
    }

    #[test]
    fn assignment_keeps_the_kind() {
        assert!(matches!(
            check("var x = 1;\nx = 2.0;"),
            Err(TypeCheckError::AssignmentMismatch {
                expected: Kind::Integer,
                found: Kind::Float,
                ..
            })
        ));
    }

    #[test]
    fn mismatched_operands() {
        assert_eq!(
            check("print 1 + 2.0;"),
            Err(TypeCheckError::MismatchedOperands {
                mismatch: TypeMismatch {
                    op: BinaryOperator::Add,
                    left: Kind::Integer,
                    right: Kind::Float,
                },
                span: Span::new(6, 13),
            })
        );
    }

    #[test]
    fn mixed_comparison_is_allowed() {
        let program = check("print 1 < 2.0;").unwrap();
        let ast::Statement::Print(ast::Expression::Condition(condition)) = &program.statements[0]
        else {
            panic!("expected a comparison");
        };
        assert_eq!(condition.kind(), Kind::Float);
    }

    #[test]
    fn condition_must_compare() {
        assert_eq!(
            check("var x = 1;\nwhile x { x = x - 1; }"),
            Err(TypeCheckError::NotACondition {
                span: Span::new(17, 18),
            })
        );
    }

    #[test]
    fn recursion_with_declared_kind() {
        let program = check(
            "func fib(n int) int {\n    if n < 2 { return n; }\n    return fib(n - 1) + fib(n - 2);\n}",
        )
        .unwrap();
        let ast::Statement::Function(function) = &program.statements[0] else {
            panic!("expected a function");
        };
        assert_eq!(function.name.kind(), Kind::Integer);
        assert_eq!(function.parameters, vec![Name::new("n", Kind::Integer)]);
    }

    #[test]
    fn return_kind_is_inferred() {
        let program = check("func half(x float) {\n    return x / 2.0;\n}\nprint half(3.0);").unwrap();
        let ast::Statement::Print(value) = &program.statements[1] else {
            panic!("expected a print");
        };
        assert_eq!(value.kind(), Kind::Float);
    }

    #[test]
    fn missing_return_defaults_to_int() {
        let program = check("func f() { print 1; }").unwrap();
        let ast::Statement::Function(function) = &program.statements[0] else {
            panic!("expected a function");
        };
        assert_eq!(function.return_kind(), Kind::Integer);
    }

    #[test]
    fn return_kind_mismatch() {
        assert!(matches!(
            check("func f() int {\n    return 1.0;\n}"),
            Err(TypeCheckError::ReturnTypeMismatch {
                expected: Kind::Integer,
                found: Kind::Float,
                ..
            })
        ));
        assert!(matches!(
            check("func f(x int) {\n    if x < 0 { return 0.5; }\n    return x;\n}"),
            Err(TypeCheckError::ReturnTypeMismatch {
                expected: Kind::Integer,
                found: Kind::Float,
                ..
            })
        ));
    }

    #[test]
    fn calls_are_checked() {
        assert!(matches!(
            check("func f(x int) int { return x; }\nprint f(1, 2);"),
            Err(TypeCheckError::WrongArgumentCount {
                expected: 1,
                found: 2,
                ..
            })
        ));
        assert!(matches!(
            check("func f(x int) int { return x; }\nprint f(1.0);"),
            Err(TypeCheckError::ArgumentMismatch { .. })
        ));
        assert!(matches!(
            check("print g(1);"),
            Err(TypeCheckError::UndeclaredVariable { .. })
        ));
    }

    #[test]
    fn nested_functions() {
        let program = check("func outer() int {\n    func inner() int { return 2; }\n    return inner();\n}")
            .unwrap();
        let ast::Statement::Function(outer) = &program.statements[0] else {
            panic!("expected a function");
        };
        assert!(matches!(outer.body[0], ast::Statement::Function(_)));
    }
}
