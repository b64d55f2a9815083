//! Code generation
//!
//! Rewrites the stack machine code of every block into three address code. The stack
//! only exists at compile time: it tracks which constant or register holds each value
//! that has been computed but not consumed yet. Each block starts with an empty stack. Registers come from one generator for
//! the whole program, so no register name is ever used twice.
//!
//! The main interface is [generate], followed by [materialize_entry_blocks]; [Llvm]
//! renders the result as LLVM assembly.

mod entry;
mod llvm;

use std::mem;

use tracing::trace;

use crate::ast::{BinaryOperator, Comparison, Function, Program, Symbol, TopLevel};
use crate::common::{Label, Register, RegisterGenerator};
use crate::error::{CompileError, Result};
use crate::ir::{Block, Instruction, LinkedModule, Literal};
use crate::Kind;

pub use entry::{materialize_entry_blocks, ENTRY_LABEL};
pub use llvm::{emit, Llvm};

/// A value an instruction works with
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Integer(i64),
    Float(f64),
    Register(Register),
}

/// Where a variable lives: a stack slot of the function or a global
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Address {
    Local(String),
    Global(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Arithmetic(BinaryOperator),
    Compare(Comparison),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Conversion {
    /// Comparison result to `i32`
    ZeroExtend,
    /// Comparison result to `double`
    UnsignedToFloat,
    SignedToFloat,
    FloatToSigned,
}

/// One instruction of three address code
#[derive(Debug, Clone, PartialEq)]
pub enum Tac {
    Binary {
        result: Register,
        operation: Operation,
        kind: Kind,
        left: Operand,
        right: Operand,
    },
    Convert {
        result: Register,
        conversion: Conversion,
        value: Operand,
    },
    Alloca {
        name: String,
        kind: Kind,
    },
    Load {
        result: Register,
        kind: Kind,
        address: Address,
    },
    Store {
        kind: Kind,
        value: Operand,
        address: Address,
    },
    Print {
        kind: Kind,
        value: Operand,
    },
    Return {
        kind: Kind,
        value: Operand,
    },
    Jump(Label),
    Branch {
        condition: Operand,
        if_true: Label,
        if_false: Label,
    },
    Call {
        result: Register,
        function: String,
        kind: Kind,
        arguments: Vec<(Kind, Operand)>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct IrBlock {
    pub label: Label,
    pub instructions: Vec<Tac>,
}

pub type IrFunction = Function<Symbol, IrBlock>;

pub type IrModule = Program<TopLevel<IrFunction>>;

/// Generate three address code for every function
pub fn generate(program: LinkedModule) -> Result<IrModule> {
    let mut registers = RegisterGenerator::default();
    let statements = program
        .statements
        .into_iter()
        .map(|item| match item {
            TopLevel::Global(symbol) => Ok(TopLevel::Global(symbol)),
            TopLevel::Function(function) => {
                generate_function(function, &mut registers).map(TopLevel::Function)
            }
        })
        .collect::<Result<_>>()?;
    Ok(Program::new(statements))
}

fn generate_function(
    function: Function<Symbol, Block>,
    registers: &mut RegisterGenerator,
) -> Result<IrFunction> {
    let Function {
        name,
        parameters,
        body,
    } = function;

    let mut emitter = Emitter {
        registers,
        stack: Vec::new(),
        out: Vec::new(),
    };

    let mut blocks = Vec::with_capacity(body.len());
    for block in body {
        for instruction in block.instructions {
            emitter.instruction(instruction)?;
        }
        // values of expression statements are never consumed
        if !emitter.stack.is_empty() {
            trace!(label = %block.label, unused = emitter.stack.len(), "dropping stack values");
            emitter.stack.clear();
        }
        blocks.push(IrBlock {
            label: block.label,
            instructions: mem::take(&mut emitter.out),
        });
    }

    trace!(function = %name.value, "generated {} blocks", blocks.len());
    Ok(Function::new(name, parameters, blocks))
}

/// An entry of the simulated stack
#[derive(Debug, Clone)]
enum Value {
    Number(Operand, Kind),
    /// Result of a comparison done in the given kind, an `i1` in LLVM
    Flag(Register, Kind),
}

impl Value {
    fn kind(&self) -> Kind {
        match self {
            Value::Number(_, kind) | Value::Flag(_, kind) => *kind,
        }
    }
}

struct Emitter<'a> {
    registers: &'a mut RegisterGenerator,
    stack: Vec<Value>,
    out: Vec<Tac>,
}

impl Emitter<'_> {
    fn instruction(&mut self, instruction: Instruction) -> Result<()> {
        match &instruction {
            Instruction::Push(Literal::Integer(value)) => {
                self.stack
                    .push(Value::Number(Operand::Integer(*value), Kind::Integer));
            }
            Instruction::Push(Literal::Float(value)) => {
                self.stack
                    .push(Value::Number(Operand::Float(*value), Kind::Float));
            }
            Instruction::LoadLocal(name) => {
                self.load(name.kind, Address::Local(name.value.clone()));
            }
            Instruction::LoadGlobal(name) => {
                self.load(name.kind, Address::Global(name.value.clone()));
            }
            Instruction::StoreLocal(name) => {
                let value = self.pop_as(name.kind, &instruction)?;
                self.out.push(Tac::Store {
                    kind: name.kind,
                    value,
                    address: Address::Local(name.value.clone()),
                });
            }
            Instruction::StoreGlobal(name) => {
                let value = self.pop_as(name.kind, &instruction)?;
                self.out.push(Tac::Store {
                    kind: name.kind,
                    value,
                    address: Address::Global(name.value.clone()),
                });
            }
            Instruction::Arithmetic(op, kind) => {
                let result = self.binary(Operation::Arithmetic(*op), *kind, &instruction)?;
                self.stack.push(Value::Number(Operand::Register(result), *kind));
            }
            Instruction::Compare(op, kind) => {
                let result = self.binary(Operation::Compare(*op), *kind, &instruction)?;
                self.stack.push(Value::Flag(result, *kind));
            }
            Instruction::Call {
                function,
                arguments,
                kind,
            } => {
                let count = *arguments;
                let Some(first) = self.stack.len().checked_sub(count) else {
                    return Err(underflow(&instruction));
                };

                let popped = self.stack.split_off(first);
                let mut arguments = Vec::with_capacity(count);
                for value in popped {
                    let argument_kind = value.kind();
                    arguments.push((argument_kind, self.materialize(value, argument_kind)));
                }

                let result = self.registers.fresh();
                self.out.push(Tac::Call {
                    result: result.clone(),
                    function: function.clone(),
                    kind: *kind,
                    arguments,
                });
                self.stack.push(Value::Number(Operand::Register(result), *kind));
            }
            Instruction::Print(kind) => {
                let value = self.pop_as(*kind, &instruction)?;
                self.out.push(Tac::Print { kind: *kind, value });
            }
            Instruction::Return(kind) => {
                let value = self.pop_as(*kind, &instruction)?;
                self.out.push(Tac::Return { kind: *kind, value });
            }
            Instruction::Goto(label) => self.out.push(Tac::Jump(label.clone())),
            Instruction::Branch { if_true, if_false } => {
                let value = self.pop(&instruction)?;
                let condition = self.condition(value);
                self.out.push(Tac::Branch {
                    condition,
                    if_true: if_true.clone(),
                    if_false: if_false.clone(),
                });
            }
            Instruction::Local(name) => self.out.push(Tac::Alloca {
                name: name.value.clone(),
                kind: name.kind,
            }),
        }
        Ok(())
    }

    fn load(&mut self, kind: Kind, address: Address) {
        let result = self.registers.fresh();
        self.out.push(Tac::Load {
            result: result.clone(),
            kind,
            address,
        });
        self.stack.push(Value::Number(Operand::Register(result), kind));
    }

    fn binary(
        &mut self,
        operation: Operation,
        kind: Kind,
        instruction: &Instruction,
    ) -> Result<Register> {
        let right = self.pop_as(kind, instruction)?;
        let left = self.pop_as(kind, instruction)?;
        let result = self.registers.fresh();
        self.out.push(Tac::Binary {
            result: result.clone(),
            operation,
            kind,
            left,
            right,
        });
        Ok(result)
    }

    fn pop(&mut self, instruction: &Instruction) -> Result<Value> {
        self.stack.pop().ok_or_else(|| underflow(instruction))
    }

    fn pop_as(&mut self, kind: Kind, instruction: &Instruction) -> Result<Operand> {
        let value = self.pop(instruction)?;
        Ok(self.materialize(value, kind))
    }

    /// Make `value` usable where an operand of `kind` is expected
    fn materialize(&mut self, value: Value, kind: Kind) -> Operand {
        match (value, kind) {
            (Value::Number(Operand::Integer(value), _), Kind::Float) => {
                Operand::Float(value as f64)
            }
            (Value::Number(Operand::Float(value), _), Kind::Integer) => {
                Operand::Integer(value as i64)
            }
            (Value::Number(operand, from), to) if from == to => operand,
            (Value::Number(operand, Kind::Integer), _) => {
                self.convert(Conversion::SignedToFloat, operand)
            }
            (Value::Number(operand, Kind::Float), _) => {
                self.convert(Conversion::FloatToSigned, operand)
            }
            (Value::Flag(flag, _), Kind::Integer) => {
                self.convert(Conversion::ZeroExtend, Operand::Register(flag))
            }
            (Value::Flag(flag, _), Kind::Float) => {
                self.convert(Conversion::UnsignedToFloat, Operand::Register(flag))
            }
        }
    }

    /// Turn `value` into an `i1` usable by a branch
    fn condition(&mut self, value: Value) -> Operand {
        match value {
            Value::Flag(flag, _) => Operand::Register(flag),
            Value::Number(operand, kind) => {
                let zero = match kind {
                    Kind::Integer => Operand::Integer(0),
                    Kind::Float => Operand::Float(0.0),
                };
                let result = self.registers.fresh();
                self.out.push(Tac::Binary {
                    result: result.clone(),
                    operation: Operation::Compare(Comparison::NotEquals),
                    kind,
                    left: operand,
                    right: zero,
                });
                Operand::Register(result)
            }
        }
    }

    fn convert(&mut self, conversion: Conversion, value: Operand) -> Operand {
        let result = self.registers.fresh();
        self.out.push(Tac::Convert {
            result: result.clone(),
            conversion,
            value,
        });
        Operand::Register(result)
    }
}

fn underflow(instruction: &Instruction) -> CompileError {
    CompileError::StackUnderflow {
        instruction: instruction.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Name;

    fn run(instructions: Vec<Instruction>) -> Result<Vec<Tac>> {
        let mut registers = RegisterGenerator::default();
        let mut emitter = Emitter {
            registers: &mut registers,
            stack: Vec::new(),
            out: Vec::new(),
        };
        for instruction in instructions {
            emitter.instruction(instruction)?;
        }
        Ok(emitter.out)
    }

    fn int(value: i64) -> Instruction {
        Instruction::Push(Literal::Integer(value))
    }

    fn reg(name: &str) -> Operand {
        Operand::Register(Register::new(name))
    }

    #[test]
    fn pushes_emit_nothing() {
        assert_eq!(run(vec![int(1), int(2)]).unwrap(), vec![]);
    }

    #[test]
    fn arithmetic_gets_fresh_registers() {
        let tac = run(vec![
            int(2),
            int(3),
            Instruction::Arithmetic(BinaryOperator::Add, Kind::Integer),
            int(4),
            Instruction::Arithmetic(BinaryOperator::Mul, Kind::Integer),
            Instruction::Print(Kind::Integer),
        ])
        .unwrap();

        assert_eq!(
            tac,
            vec![
                Tac::Binary {
                    result: Register::new(".r0"),
                    operation: Operation::Arithmetic(BinaryOperator::Add),
                    kind: Kind::Integer,
                    left: Operand::Integer(2),
                    right: Operand::Integer(3),
                },
                Tac::Binary {
                    result: Register::new(".r1"),
                    operation: Operation::Arithmetic(BinaryOperator::Mul),
                    kind: Kind::Integer,
                    left: reg(".r0"),
                    right: Operand::Integer(4),
                },
                Tac::Print {
                    kind: Kind::Integer,
                    value: reg(".r1"),
                },
            ]
        );
    }

    #[test]
    fn call_keeps_argument_order() {
        let tac = run(vec![
            int(1),
            Instruction::Push(Literal::Float(2.5)),
            Instruction::Call {
                function: "f".into(),
                arguments: 2,
                kind: Kind::Float,
            },
            Instruction::Return(Kind::Float),
        ])
        .unwrap();

        assert_eq!(
            tac,
            vec![
                Tac::Call {
                    result: Register::new(".r0"),
                    function: "f".into(),
                    kind: Kind::Float,
                    arguments: vec![
                        (Kind::Integer, Operand::Integer(1)),
                        (Kind::Float, Operand::Float(2.5)),
                    ],
                },
                Tac::Return {
                    kind: Kind::Float,
                    value: reg(".r0"),
                },
            ]
        );
    }

    #[test]
    fn comparison_feeds_branch() {
        let x = Name::new("x", Kind::Integer);
        let tac = run(vec![
            Instruction::LoadLocal(x),
            Instruction::Push(Literal::Float(0.5)),
            Instruction::Compare(Comparison::Less, Kind::Float),
            Instruction::Branch {
                if_true: Label::new("L1"),
                if_false: Label::new("L2"),
            },
        ])
        .unwrap();

        assert_eq!(
            tac,
            vec![
                Tac::Load {
                    result: Register::new(".r0"),
                    kind: Kind::Integer,
                    address: Address::Local("x".into()),
                },
                Tac::Convert {
                    result: Register::new(".r1"),
                    conversion: Conversion::SignedToFloat,
                    value: reg(".r0"),
                },
                Tac::Binary {
                    result: Register::new(".r2"),
                    operation: Operation::Compare(Comparison::Less),
                    kind: Kind::Float,
                    left: reg(".r1"),
                    right: Operand::Float(0.5),
                },
                Tac::Branch {
                    condition: reg(".r2"),
                    if_true: Label::new("L1"),
                    if_false: Label::new("L2"),
                },
            ]
        );
    }

    #[test]
    fn comparison_as_value_is_widened() {
        let tac = run(vec![
            int(1),
            int(2),
            Instruction::Compare(Comparison::Equals, Kind::Integer),
            Instruction::Print(Kind::Integer),
        ])
        .unwrap();

        assert_eq!(
            tac[1],
            Tac::Convert {
                result: Register::new(".r1"),
                conversion: Conversion::ZeroExtend,
                value: reg(".r0"),
            }
        );
    }

    #[test]
    fn stack_does_not_outlive_its_block() {
        let next = Label::new("L1");
        let function = Function::new(
            Symbol::global("main", Kind::Integer),
            vec![],
            vec![
                Block::new(
                    Label::new("L0"),
                    vec![int(1), int(2), Instruction::Goto(next.clone())],
                ),
                Block::new(next, vec![Instruction::Return(Kind::Integer)]),
            ],
        );
        let err = generate_function(function, &mut RegisterGenerator::default()).unwrap_err();
        assert!(matches!(err, CompileError::StackUnderflow { .. }));
    }

    #[test]
    fn unused_values_are_dropped() {
        let function = Function::new(
            Symbol::global("main", Kind::Integer),
            vec![],
            vec![Block::new(
                Label::new("L0"),
                vec![int(7), int(0), Instruction::Return(Kind::Integer)],
            )],
        );
        let function = generate_function(function, &mut RegisterGenerator::default()).unwrap();
        assert_eq!(
            function.body[0].instructions,
            vec![Tac::Return {
                kind: Kind::Integer,
                value: Operand::Integer(0),
            }]
        );
    }

    #[test]
    fn missing_operand_is_an_error() {
        let err = run(vec![int(1), Instruction::Arithmetic(BinaryOperator::Sub, Kind::Integer)])
            .unwrap_err();
        assert!(matches!(err, CompileError::StackUnderflow { .. }));

        let err = run(vec![Instruction::Call {
            function: "g".into(),
            arguments: 1,
            kind: Kind::Integer,
        }])
        .unwrap_err();
        assert!(matches!(err, CompileError::StackUnderflow { .. }));
    }
}
