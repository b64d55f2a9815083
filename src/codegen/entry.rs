use crate::ast::{Program, Symbol, TopLevel};
use crate::common::{Label, Register};

use super::{Address, IrBlock, IrFunction, IrModule, Operand, Tac};

pub const ENTRY_LABEL: &str = "entry";

/// Give every function with parameters a block that copies them into stack slots
///
/// Arguments arrive in registers, which cannot be assigned to. The parameter keeps its
/// name for the stack slot, while the incoming register is renamed to `.arg_<name>`.
pub fn materialize_entry_blocks(program: IrModule) -> IrModule {
    let statements = program
        .statements
        .into_iter()
        .map(|item| match item {
            TopLevel::Function(function) => TopLevel::Function(with_entry_block(function)),
            global => global,
        })
        .collect();
    Program::new(statements)
}

fn with_entry_block(mut function: IrFunction) -> IrFunction {
    if function.parameters.is_empty() {
        return function;
    }
    let Some(target) = function.body.first().map(|block| block.label.clone()) else {
        return function;
    };

    let mut instructions = Vec::with_capacity(2 * function.parameters.len() + 1);

    let parameters = function
        .parameters
        .into_iter()
        .map(|parameter| {
            let argument = Register::argument(&parameter.value);
            instructions.push(Tac::Alloca {
                name: parameter.value.clone(),
                kind: parameter.kind,
            });
            instructions.push(Tac::Store {
                kind: parameter.kind,
                value: Operand::Register(argument.clone()),
                address: Address::Local(parameter.value),
            });
            Symbol {
                value: argument.name().to_string(),
                ..parameter
            }
        })
        .collect();
    instructions.push(Tac::Jump(target));

    function.parameters = parameters;
    function.body.insert(
        0,
        IrBlock {
            label: Label::new(ENTRY_LABEL),
            instructions,
        },
    );
    function
}
