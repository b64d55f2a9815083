use crate::ast::{Function, Name, Program, Symbol};
use crate::error::{CompileError, Result};
use crate::ir::{Code, Instruction, Lowered, Nested, NestedModule, Straight};

const STAGE: &str = "statement lowering";

/// Turn every leaf statement into a straight run of instructions
pub fn lower_statements(program: NestedModule<Lowered>) -> Result<NestedModule<Straight>> {
    let statements = program
        .statements
        .into_iter()
        .map(|item| item.map_function(lower_function))
        .collect::<Result<_>>()?;
    Ok(Program::new(statements))
}

fn lower_function(
    function: Function<Symbol, Nested<Lowered>>,
) -> Result<Function<Symbol, Nested<Straight>>> {
    let Function {
        name,
        parameters,
        body,
    } = function;
    Ok(Function::new(name, parameters, lower_all(body)?))
}

fn lower_all(statements: Vec<Nested<Lowered>>) -> Result<Vec<Nested<Straight>>> {
    statements.into_iter().map(lower_nested).collect()
}

fn lower_nested(statement: Nested<Lowered>) -> Result<Nested<Straight>> {
    Ok(match statement {
        Nested::Leaf(leaf) => Nested::Leaf(straighten(leaf)?),
        Nested::IfElse {
            condition,
            if_true,
            if_false,
        } => Nested::IfElse {
            condition,
            if_true: lower_all(if_true)?,
            if_false: lower_all(if_false)?,
        },
        Nested::While { condition, body } => Nested::While {
            condition,
            body: lower_all(body)?,
        },
        Nested::Function(function) => Nested::Function(lower_function(function)?),
    })
}

fn straighten(statement: Lowered) -> Result<Straight> {
    let instructions = match statement {
        Lowered::Declare(symbol) if symbol.is_global() => {
            return Err(CompileError::unresolved(
                STAGE,
                format!("a global declaration of `{}` inside a function", symbol.value),
            ));
        }
        Lowered::Declare(symbol) => {
            vec![Instruction::Local(Name::new(symbol.value, symbol.kind))]
        }
        Lowered::Assign(symbol, value) => followed_by(value, Instruction::store(&symbol)),
        Lowered::Print(value) => {
            let kind = value.kind;
            followed_by(value, Instruction::Print(kind))
        }
        Lowered::Return(value) => {
            let kind = value.kind;
            followed_by(value, Instruction::Return(kind))
        }
        // the value is left on the stack and never looked at again
        Lowered::Expression(value) => value.instructions,
    };
    Ok(Straight { instructions })
}

fn followed_by(code: Code, last: Instruction) -> Vec<Instruction> {
    let mut instructions = code.instructions;
    instructions.push(last);
    instructions
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::Literal;
    use crate::Kind;

    fn int(value: i64) -> Code {
        Code {
            instructions: vec![Instruction::Push(Literal::Integer(value))],
            kind: Kind::Integer,
        }
    }

    #[test]
    fn assignment_stores_by_storage() {
        let x = Symbol::local("x", Kind::Integer);
        let straight = straighten(Lowered::Assign(x, int(3))).unwrap();
        assert_eq!(
            straight.instructions,
            vec![
                Instruction::Push(Literal::Integer(3)),
                Instruction::StoreLocal(Name::new("x", Kind::Integer)),
            ]
        );
    }

    #[test]
    fn local_declaration_allocates() {
        let straight = straighten(Lowered::Declare(Symbol::local("t", Kind::Float))).unwrap();
        assert_eq!(
            straight.instructions,
            vec![Instruction::Local(Name::new("t", Kind::Float))]
        );
    }

    #[test]
    fn global_declaration_in_function_is_rejected() {
        let err = straighten(Lowered::Declare(Symbol::global("g", Kind::Integer))).unwrap_err();
        assert!(matches!(
            err,
            CompileError::UnresolvedConstruct {
                stage: STAGE,
                ..
            }
        ));
    }

    #[test]
    fn print_and_return_use_value_kind() {
        let print = straighten(Lowered::Print(int(1))).unwrap();
        assert_eq!(print.instructions.last(), Some(&Instruction::Print(Kind::Integer)));

        let value = Code {
            instructions: vec![Instruction::Push(Literal::Float(0.0))],
            kind: Kind::Float,
        };
        let ret = straighten(Lowered::Return(value)).unwrap();
        assert_eq!(ret.instructions.last(), Some(&Instruction::Return(Kind::Float)));
    }
}
