//! Scope resolution
//!
//! Decides for every name whether it refers to a global or a local. Scoping is
//! sequential: a declaration is only visible to the statements after it, so
//!
//! ```text
//! var x = 2;
//! func f(y int) int {
//!     print x;        // global[x]
//!     var x = y * y;
//!     print x;        // local[x]
//!     return x;       // local[x]
//! }
//! ```
//!
//! Top level declarations and functions are global. Anything declared inside a
//! function, `if` or `while` is local, and stays visible only until the end of that
//! body.
//!
//! Every local becomes a stack slot of its function, so two locals of one function
//! never share a name: a name declared again gets a `.1`, `.2`, ... suffix. Names
//! the code generator uses for blocks are never handed out either.

use std::collections::HashSet;
use std::mem;

use tracing::warn;

use crate::ast::{
    BinaryOp, Call, Condition, Expression, Function, Name, Program, Resolved, Script, Split,
    Statement, Symbol,
};
use crate::codegen::ENTRY_LABEL;
use crate::error::Result;
use crate::Options;

/// A local as it is visible to lookups: the name in the source and its symbol
type Local = (String, Symbol);

/// Replace every [Name] by a global or local [Symbol]
pub fn resolve(program: Script<Split>, options: &Options) -> Result<Script<Resolved>> {
    let mut resolver = Resolver {
        globals: Vec::new(),
        slots: HashSet::new(),
        report_undeclared: options.report_undeclared,
    };

    let mut top_locals = Vec::new();
    let statements = program
        .statements
        .into_iter()
        .map(|statement| resolver.statement(statement, &mut top_locals, Depth::TopLevel))
        .collect::<Result<_>>()?;
    Ok(Program::new(statements))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Depth {
    TopLevel,
    Nested,
}

struct Resolver {
    globals: Vec<Symbol>,
    /// Local names already taken in the function being resolved
    slots: HashSet<String>,
    report_undeclared: bool,
}

impl Resolver {
    fn block(
        &mut self,
        statements: Vec<Statement<Split>>,
        mut locals: Vec<Local>,
    ) -> Result<Vec<Statement<Resolved>>> {
        statements
            .into_iter()
            .map(|statement| self.statement(statement, &mut locals, Depth::Nested))
            .collect()
    }

    fn statement(
        &mut self,
        statement: Statement<Split>,
        locals: &mut Vec<Local>,
        depth: Depth,
    ) -> Result<Statement<Resolved>> {
        Ok(match statement {
            Statement::VarDecl(name) => {
                let symbol = self.declare(name, locals, depth);
                Statement::VarDecl(symbol)
            }
            Statement::VarInit(gone, ..) => match gone {},
            Statement::Assign(name, value) => {
                let symbol = self.lookup(&name, locals);
                Statement::Assign(symbol, self.expression(value, locals)?)
            }
            Statement::Print(value) => Statement::Print(self.expression(value, locals)?),
            Statement::IfElse {
                condition,
                if_true,
                if_false,
            } => {
                let condition = self.condition(condition, locals)?;
                Statement::IfElse {
                    condition,
                    if_true: self.block(if_true, locals.clone())?,
                    if_false: self.block(if_false, locals.clone())?,
                }
            }
            Statement::While { condition, body } => {
                let condition = self.condition(condition, locals)?;
                Statement::While {
                    condition,
                    body: self.block(body, locals.clone())?,
                }
            }
            Statement::Function(Function {
                name,
                parameters,
                body,
            }) => {
                let name = self.declare(name, locals, depth);

                let outer_slots = mem::take(&mut self.slots);
                let mut inner = locals.clone();
                let parameters = parameters
                    .into_iter()
                    .map(|parameter| self.declare(parameter, &mut inner, Depth::Nested))
                    .collect();
                let body = self.block(body, inner);
                self.slots = outer_slots;

                Statement::Function(Function::new(name, parameters, body?))
            }
            Statement::Return(value) => Statement::Return(self.expression(value, locals)?),
            Statement::Expression(value) => {
                Statement::Expression(self.expression(value, locals)?)
            }
        })
    }

    fn expression(
        &mut self,
        expression: Expression<Split>,
        locals: &[Local],
    ) -> Result<Expression<Resolved>> {
        Ok(match expression {
            Expression::Integer(value) => Expression::Integer(value),
            Expression::Float(value) => Expression::Float(value),
            Expression::Name(name) => Expression::Name(self.lookup(&name, locals)),
            Expression::Binary(binary) => {
                let BinaryOp {
                    op, left, right, ..
                } = *binary;
                Expression::binary(
                    op,
                    self.expression(left, locals)?,
                    self.expression(right, locals)?,
                )?
            }
            Expression::Condition(condition) => {
                Expression::Condition(Box::new(self.condition(*condition, locals)?))
            }
            Expression::Call(Call {
                function,
                arguments,
            }) => {
                let function = self.lookup(&function, locals);
                let arguments = arguments
                    .into_iter()
                    .map(|argument| self.expression(argument, locals))
                    .collect::<Result<_>>()?;
                Expression::call(function, arguments)
            }
            Expression::Negate(marker, inner) => {
                Expression::Negate(marker, Box::new(self.expression(*inner, locals)?))
            }
        })
    }

    fn condition(
        &mut self,
        condition: Condition<Split>,
        locals: &[Local],
    ) -> Result<Condition<Resolved>> {
        let Condition {
            op, left, right, ..
        } = condition;
        Ok(Condition::new(
            op,
            self.expression(left, locals)?,
            self.expression(right, locals)?,
        ))
    }

    fn declare(&mut self, name: Name, locals: &mut Vec<Local>, depth: Depth) -> Symbol {
        match depth {
            Depth::TopLevel => {
                let symbol = Symbol::global(name.value, name.kind);
                self.globals.push(symbol.clone());
                symbol
            }
            Depth::Nested => {
                let symbol = Symbol::local(self.fresh_slot(&name.value), name.kind);
                locals.push((name.value, symbol.clone()));
                symbol
            }
        }
    }

    /// `name` itself, or the first free `name.N` when it is taken
    fn fresh_slot(&mut self, name: &str) -> String {
        let mut slot = name.to_string();
        let mut suffix = 0;
        while self.slots.contains(&slot) || is_block_name(&slot) {
            suffix += 1;
            slot = format!("{name}.{suffix}");
        }
        self.slots.insert(slot.clone());
        slot
    }

    /// Latest local declaration, then latest global one, then an implicit global
    fn lookup(&self, name: &Name, locals: &[Local]) -> Symbol {
        let declared = locals
            .iter()
            .rev()
            .find(|(source, _)| *source == name.value)
            .map(|(_, symbol)| symbol)
            .or_else(|| {
                self.globals
                    .iter()
                    .rev()
                    .find(|symbol| symbol.value == name.value)
            });

        match declared {
            Some(symbol) => symbol.clone(),
            None => {
                if self.report_undeclared {
                    warn!(name = %name.value, "undeclared variable, treating it as global");
                }
                Symbol::global(name.value.clone(), name.kind)
            }
        }
    }
}

/// Whether the code generator may use `name` as a block label
fn is_block_name(name: &str) -> bool {
    name == ENTRY_LABEL
        || name
            .strip_prefix('L')
            .is_some_and(|n| !n.is_empty() && n.bytes().all(|b| b.is_ascii_digit()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Comparison;
    use crate::passes::{fold, split_declarations};
    use crate::{typed, Kind};

    fn resolved(source: &str) -> Script<Resolved> {
        let program = split_declarations(fold(typed(source)).unwrap());
        resolve(program, &Options::default()).unwrap()
    }

    fn int(symbol: Symbol) -> Expression<Resolved> {
        Expression::Name(symbol)
    }

    #[test]
    fn if_body_declares_locals() {
        let program = resolved("var x = 2; if x < 10 { var y = x + 1; print y; }");
        let x = Symbol::global("x", Kind::Integer);
        let y = Symbol::local("y", Kind::Integer);

        assert_eq!(program.statements[0], Statement::VarDecl(x.clone()));
        let Statement::IfElse {
            condition, if_true, ..
        } = &program.statements[2]
        else {
            panic!("expected if, got {:?}", program.statements[2]);
        };

        assert_eq!(condition.op, Comparison::Less);
        assert_eq!(condition.left, int(x.clone()));
        assert_eq!(if_true[0], Statement::VarDecl(y.clone()));
        assert_eq!(
            if_true[1],
            Statement::Assign(
                y.clone(),
                Expression::binary(crate::ast::BinaryOperator::Add, int(x), Expression::Integer(1))
                    .unwrap()
            )
        );
        assert_eq!(if_true[2], Statement::Print(int(y)));
    }

    #[test]
    fn declarations_are_visible_after_the_statement() {
        let program = resolved(
            "var x = 2;
             func f(y int) int {
                 print x;
                 var x = y * y;
                 print x;
                 return x;
             }",
        );
        let Statement::Function(f) = &program.statements[2] else {
            panic!("expected function, got {:?}", program.statements[2]);
        };

        assert_eq!(f.name, Symbol::global("f", Kind::Integer));
        assert_eq!(f.parameters, vec![Symbol::local("y", Kind::Integer)]);

        let global_x = Symbol::global("x", Kind::Integer);
        let local_x = Symbol::local("x", Kind::Integer);
        assert_eq!(f.body[0], Statement::Print(int(global_x)));
        assert_eq!(f.body[1], Statement::VarDecl(local_x.clone()));
        assert_eq!(f.body[3], Statement::Print(int(local_x.clone())));
        assert_eq!(f.body[4], Statement::Return(int(local_x)));
    }

    #[test]
    fn branch_locals_end_with_the_branch() {
        let program = resolved(
            "var z = 1;
             if z < 2 { var z = 3; print z; } else { print z; }
             print z;",
        );
        let Statement::IfElse {
            if_true, if_false, ..
        } = &program.statements[2]
        else {
            panic!("expected if");
        };
        assert_eq!(if_true[2], Statement::Print(int(Symbol::local("z", Kind::Integer))));
        assert_eq!(if_false[0], Statement::Print(int(Symbol::global("z", Kind::Integer))));
        assert_eq!(
            program.statements[3],
            Statement::Print(int(Symbol::global("z", Kind::Integer)))
        );
    }

    #[test]
    fn callee_and_recursion_resolve_to_global() {
        let program = resolved("func f(n int) int { return f(n - 1); } print f(3);");
        let f = Symbol::global("f", Kind::Integer);
        let Statement::Function(function) = &program.statements[0] else {
            panic!("expected function");
        };
        let n = Symbol::local("n", Kind::Integer);
        let body_call = Expression::call(
            f.clone(),
            vec![Expression::binary(
                crate::ast::BinaryOperator::Sub,
                int(n),
                Expression::Integer(1),
            )
            .unwrap()],
        );
        assert_eq!(function.body[0], Statement::Return(body_call));
        assert_eq!(
            program.statements[1],
            Statement::Print(Expression::call(f, vec![Expression::Integer(3)]))
        );
    }

    #[test]
    fn redeclared_locals_get_their_own_slot() {
        let program = resolved(
            "func g(x int) int {
                 var x = 5;
                 if x < 9 { var t = 1; print t; } else { var t = 2.5; print t; }
                 return x;
             }",
        );
        let Statement::Function(g) = &program.statements[0] else {
            panic!("expected function, got {:?}", program.statements[0]);
        };
        assert_eq!(g.parameters, vec![Symbol::local("x", Kind::Integer)]);

        let body_x = Symbol::local("x.1", Kind::Integer);
        assert_eq!(g.body[0], Statement::VarDecl(body_x.clone()));
        assert_eq!(g.body[3], Statement::Return(int(body_x)));

        let Statement::IfElse {
            if_true, if_false, ..
        } = &g.body[2]
        else {
            panic!("expected if, got {:?}", g.body[2]);
        };
        let t = Symbol::local("t", Kind::Integer);
        let other_t = Symbol::local("t.1", Kind::Float);
        assert_eq!(if_true[0], Statement::VarDecl(t.clone()));
        assert_eq!(if_true[2], Statement::Print(int(t)));
        assert_eq!(if_false[0], Statement::VarDecl(other_t.clone()));
        assert_eq!(if_false[2], Statement::Print(int(other_t)));
    }

    #[test]
    fn slots_start_over_in_every_function() {
        let program = resolved(
            "func a(n int) int { return n; }
             func b(n int) int { return n; }",
        );
        for statement in &program.statements {
            let Statement::Function(function) = statement else {
                panic!("expected function, got {statement:?}");
            };
            assert_eq!(function.parameters, vec![Symbol::local("n", Kind::Integer)]);
        }
    }

    #[test]
    fn locals_never_look_like_blocks() {
        let program = resolved("func m(entry int) int { var L0 = entry; var L12x = 1; return L0; }");
        let Statement::Function(m) = &program.statements[0] else {
            panic!("expected function");
        };
        assert_eq!(m.parameters, vec![Symbol::local("entry.1", Kind::Integer)]);
        assert_eq!(m.body[0], Statement::VarDecl(Symbol::local("L0.1", Kind::Integer)));
        assert_eq!(m.body[2], Statement::VarDecl(Symbol::local("L12x", Kind::Integer)));
        assert_eq!(
            m.body[4],
            Statement::Return(int(Symbol::local("L0.1", Kind::Integer)))
        );
    }

    #[test]
    fn undeclared_names_become_global() {
        let split = split_declarations(typed("x = 1; print x;"));
        let options = Options {
            report_undeclared: true,
        };
        let program = resolve(split, &options).unwrap();
        let x = Symbol::global("x", Kind::Integer);
        assert_eq!(program.statements[0], Statement::Assign(x.clone(), Expression::Integer(1)));
        assert_eq!(program.statements[1], Statement::Print(int(x)));
    }
}
