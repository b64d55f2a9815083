use crate::ast::{Function, Program, Symbol, TopLevel};
use crate::common::LabelGenerator;
use crate::ir::{Block, Nested, NestedModule, Straight};

/// Merge neighbouring straight runs into labelled blocks
///
/// Every `if`, `while` or function ends the current block; their bodies get blocks of
/// their own. So does a `return`: code after it goes into a new block that nothing
/// jumps to. One generator is used throughout, so labels are unique in the program.
pub fn group_blocks(
    program: NestedModule<Straight>,
    labels: &mut LabelGenerator,
) -> NestedModule<Block> {
    let statements = program
        .statements
        .into_iter()
        .map(|item| match item {
            TopLevel::Global(symbol) => TopLevel::Global(symbol),
            TopLevel::Function(function) => TopLevel::Function(group_function(function, labels)),
        })
        .collect();
    Program::new(statements)
}

fn group_function(
    function: Function<Symbol, Nested<Straight>>,
    labels: &mut LabelGenerator,
) -> Function<Symbol, Nested<Block>> {
    let Function {
        name,
        parameters,
        body,
    } = function;
    Function::new(name, parameters, group(body, labels))
}

fn group(statements: Vec<Nested<Straight>>, labels: &mut LabelGenerator) -> Vec<Nested<Block>> {
    let mut grouped: Vec<Nested<Block>> = Vec::new();
    for statement in statements {
        match statement {
            Nested::Leaf(Straight { instructions }) => match grouped.last_mut() {
                Some(Nested::Leaf(open)) if !open.is_terminated() => {
                    open.instructions.extend(instructions)
                }
                _ => grouped.push(Nested::Leaf(Block::new(labels.fresh(), instructions))),
            },
            Nested::IfElse {
                condition,
                if_true,
                if_false,
            } => {
                let if_true = group(if_true, labels);
                let if_false = group(if_false, labels);
                grouped.push(Nested::IfElse {
                    condition,
                    if_true,
                    if_false,
                });
            }
            Nested::While { condition, body } => {
                let body = group(body, labels);
                grouped.push(Nested::While { condition, body });
            }
            Nested::Function(function) => {
                grouped.push(Nested::Function(group_function(function, labels)));
            }
        }
    }
    grouped
}
