//! Control flow linking
//!
//! Replaces `if` and `while` by blocks that jump to each other. Every statement list is
//! walked from the back, carrying the label of the block that comes next, so that a
//! block which does not already end in a jump can get an explicit `GOTO` to it.
//!
//! Within one list, the linked blocks are collected back to front. The block that
//! control enters from above is therefore always the last one collected, and
//! reversing the list of a function gives the blocks in source order.

use crate::ast::{Function, Program, Symbol, TopLevel};
use crate::common::{Label, LabelGenerator};
use crate::error::{CompileError, Result};
use crate::ir::{Block, Code, Instruction, LinkedModule, Nested, NestedModule};

const STAGE: &str = "control flow linking";

/// Link every function into a flat list of blocks
pub fn link(program: NestedModule<Block>, labels: &mut LabelGenerator) -> Result<LinkedModule> {
    let statements = program
        .statements
        .into_iter()
        .map(|item| match item {
            TopLevel::Global(symbol) => Ok(TopLevel::Global(symbol)),
            TopLevel::Function(function) => {
                link_function(function, labels).map(TopLevel::Function)
            }
        })
        .collect::<Result<_>>()?;
    Ok(Program::new(statements))
}

/// Rename all blocks to `L0`, `L1`, ... in the order they appear
///
/// Jumps hold the same label handles as the blocks they target, so they follow along.
pub fn relabel(program: &LinkedModule) {
    let mut names = LabelGenerator::default();
    for item in &program.statements {
        if let TopLevel::Function(function) = item {
            for block in &function.body {
                block.label.rename(names.fresh().name());
            }
        }
    }
}

fn link_function(
    function: Function<Symbol, Nested<Block>>,
    labels: &mut LabelGenerator,
) -> Result<Function<Symbol, Block>> {
    let Function {
        name,
        parameters,
        mut body,
    } = function;

    let last = match body.pop() {
        Some(Nested::Leaf(block)) if block.is_terminated() => block,
        _ => {
            return Err(CompileError::unresolved(
                STAGE,
                format!("function `{}` without a final return", name.value),
            ))
        }
    };

    let mut blocks = if body.is_empty() {
        Vec::new()
    } else {
        link_statements(body, last.label.clone(), labels)?.blocks
    };
    blocks.reverse();
    blocks.push(last);

    Ok(Function::new(name, parameters, blocks))
}

/// Blocks of one statement list, back to front
struct Linked {
    blocks: Vec<Block>,
    entry: Label,
}

fn link_statements(
    statements: Vec<Nested<Block>>,
    next: Label,
    labels: &mut LabelGenerator,
) -> Result<Linked> {
    if statements.is_empty() {
        let entry = labels.fresh();
        let passthrough = Block::new(entry.clone(), vec![Instruction::Goto(next)]);
        return Ok(Linked {
            blocks: vec![passthrough],
            entry,
        });
    }

    let mut blocks = Vec::new();
    let mut next = next;
    for statement in statements.into_iter().rev() {
        next = link_statement(statement, next, labels, &mut blocks)?;
    }

    Ok(Linked {
        blocks,
        entry: next,
    })
}

/// Link one statement in front of `next`, returning the label control enters it by
fn link_statement(
    statement: Nested<Block>,
    next: Label,
    labels: &mut LabelGenerator,
    blocks: &mut Vec<Block>,
) -> Result<Label> {
    match statement {
        Nested::Leaf(mut block) => {
            if !block.is_terminated() {
                block.instructions.push(Instruction::Goto(next));
            }
            let entry = block.label.clone();
            blocks.push(block);
            Ok(entry)
        }
        Nested::IfElse {
            condition,
            if_true,
            if_false,
        } => {
            let if_true = link_statements(if_true, next.clone(), labels)?;
            let if_false = link_statements(if_false, next, labels)?;
            let test = conditional_block(condition, labels.fresh(), if_true.entry, if_false.entry);

            let entry = test.label.clone();
            blocks.extend(if_false.blocks);
            blocks.extend(if_true.blocks);
            blocks.push(test);
            Ok(entry)
        }
        Nested::While { condition, body } => {
            let test_label = labels.fresh();
            let body = link_statements(body, test_label.clone(), labels)?;
            let test = conditional_block(condition, test_label.clone(), body.entry, next);

            blocks.extend(body.blocks);
            blocks.push(test);
            Ok(test_label)
        }
        Nested::Function(function) => Err(CompileError::unresolved(
            STAGE,
            format!("the nested function `{}`", function.name.value),
        )),
    }
}

fn conditional_block(condition: Code, label: Label, if_true: Label, if_false: Label) -> Block {
    let mut instructions = condition.instructions;
    instructions.push(Instruction::Branch { if_true, if_false });
    Block::new(label, instructions)
}
