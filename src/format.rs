//! Human readable rendering of every stage's program
//!
//! Tree stages print as source-like code with resolved names shown as `global[x]` or
//! `local[x]`. Lowered stages show the stack machine code, e.g.
//!
//! ```text
//! global x int;
//! func main() int {
//!     BLOCK('L0',[
//!         PUSH(10),
//!         STORE_GLOBAL(x),
//!         PUSH(0),
//!         RETURN()
//!     ])
//! }
//! ```

use std::fmt::{self, Write};

use crate::ast::{
    BinaryOp, BinaryOperator, Call, Comparison, Condition, Expression, Function, Name, Named,
    Phase, Program, Statement, Storage, Symbol, TopLevel,
};
use crate::codegen::IrBlock;
use crate::ir::{Block, Code, Instruction, Literal, Lowered, Nested, Straight};

const INDENT: &str = "    ";

/// Rendering of an item that may span several lines
pub trait Pretty {
    fn pretty(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result;
}

fn indent(f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
    for _ in 0..depth {
        f.write_str(INDENT)?;
    }
    Ok(())
}

impl<T: Pretty> fmt::Display for Program<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for statement in &self.statements {
            statement.pretty(f, 0)?;
            f.write_char('\n')?;
        }
        Ok(())
    }
}

/// Children on their own lines, then the closing brace
fn body<S: Pretty>(f: &mut fmt::Formatter<'_>, statements: &[S], depth: usize) -> fmt::Result {
    f.write_str("{")?;
    for statement in statements {
        f.write_char('\n')?;
        statement.pretty(f, depth + 1)?;
    }
    f.write_char('\n')?;
    indent(f, depth)?;
    f.write_str("}")
}

fn declaration(f: &mut fmt::Formatter<'_>, name: &impl Named) -> fmt::Result {
    let keyword = match name.storage() {
        None => "var",
        Some(Storage::Global) => "global",
        Some(Storage::Local) => "local",
    };
    write!(f, "{keyword} {} {};", name.value(), name.kind())
}

fn if_else<S: Pretty>(
    f: &mut fmt::Formatter<'_>,
    condition: &dyn fmt::Display,
    if_true: &[S],
    if_false: &[S],
    depth: usize,
) -> fmt::Result {
    write!(f, "if {condition} ")?;
    body(f, if_true, depth)?;
    if !if_false.is_empty() {
        f.write_str(" else ")?;
        body(f, if_false, depth)?;
    }
    Ok(())
}

impl<P: Phase> Pretty for Statement<P> {
    fn pretty(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        indent(f, depth)?;
        match self {
            Statement::VarDecl(name) => declaration(f, name),
            Statement::VarInit(_, name, value) => write!(f, "var {} = {value};", name.value()),
            Statement::Assign(name, value) => write!(f, "{name} = {value};"),
            Statement::Print(value) => write!(f, "print {value};"),
            Statement::IfElse {
                condition,
                if_true,
                if_false,
            } => if_else(f, condition, if_true, if_false, depth),
            Statement::While { condition, body: statements } => {
                write!(f, "while {condition} ")?;
                body(f, statements, depth)
            }
            Statement::Function(function) => function.pretty_header(f, depth),
            Statement::Return(value) => write!(f, "return {value};"),
            Statement::Expression(value) => write!(f, "{value};"),
        }
    }
}

impl<N: Named, S: Pretty> Function<N, S> {
    fn pretty_header(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        let parameters = self
            .parameters
            .iter()
            .map(|parameter| format!("{} {}", parameter.value(), parameter.kind()))
            .collect::<Vec<_>>()
            .join(", ");
        write!(
            f,
            "func {}({parameters}) {} ",
            self.name.value(),
            self.return_kind()
        )?;
        body(f, &self.body, depth)
    }
}

impl<N: Named, S: Pretty> Pretty for Function<N, S> {
    fn pretty(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        indent(f, depth)?;
        self.pretty_header(f, depth)
    }
}

impl<F: Pretty> Pretty for TopLevel<F> {
    fn pretty(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        match self {
            TopLevel::Global(symbol) => {
                indent(f, depth)?;
                declaration(f, symbol)
            }
            TopLevel::Function(function) => function.pretty(f, depth),
        }
    }
}

impl<L: Pretty> Pretty for Nested<L> {
    fn pretty(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        match self {
            Nested::Leaf(leaf) => leaf.pretty(f, depth),
            Nested::IfElse {
                condition,
                if_true,
                if_false,
            } => {
                indent(f, depth)?;
                if_else(f, condition, if_true, if_false, depth)
            }
            Nested::While { condition, body: statements } => {
                indent(f, depth)?;
                write!(f, "while {condition} ")?;
                body(f, statements, depth)
            }
            Nested::Function(function) => function.pretty(f, depth),
        }
    }
}

impl Pretty for Lowered {
    fn pretty(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        indent(f, depth)?;
        match self {
            Lowered::Declare(symbol) => declaration(f, symbol),
            Lowered::Assign(symbol, value) => write!(f, "{symbol} = {value};"),
            Lowered::Print(value) => write!(f, "print {value};"),
            Lowered::Return(value) => write!(f, "return {value};"),
            Lowered::Expression(value) => write!(f, "{value};"),
        }
    }
}

fn instruction_list(
    f: &mut fmt::Formatter<'_>,
    instructions: &[Instruction],
    depth: usize,
) -> fmt::Result {
    f.write_char('[')?;
    for (i, instruction) in instructions.iter().enumerate() {
        if i > 0 {
            f.write_char(',')?;
        }
        f.write_char('\n')?;
        indent(f, depth + 1)?;
        write!(f, "{instruction}")?;
    }
    f.write_char('\n')?;
    indent(f, depth)?;
    f.write_str("])")
}

impl Pretty for Straight {
    fn pretty(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        indent(f, depth)?;
        f.write_str("STATEMENT(")?;
        instruction_list(f, &self.instructions, depth)
    }
}

impl Pretty for Block {
    fn pretty(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        indent(f, depth)?;
        write!(f, "BLOCK('{}',", self.label)?;
        instruction_list(f, &self.instructions, depth)
    }
}

impl Pretty for IrBlock {
    fn pretty(&self, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
        indent(f, depth)?;
        write!(f, "{}:", self.label)?;
        for instruction in &self.instructions {
            f.write_char('\n')?;
            indent(f, depth + 1)?;
            write!(f, "{instruction}")?;
        }
        Ok(())
    }
}

impl fmt::Display for Name {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.value)
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.storage {
            Storage::Global => write!(f, "global[{}]", self.value),
            Storage::Local => write!(f, "local[{}]", self.value),
        }
    }
}

impl<P: Phase> fmt::Display for Expression<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Integer(value) => write!(f, "{value}"),
            Expression::Float(value) => write!(f, "{value:?}"),
            Expression::Name(name) => write!(f, "{name}"),
            Expression::Binary(binary) => write!(f, "{binary}"),
            Expression::Condition(condition) => write!(f, "{condition}"),
            Expression::Call(call) => write!(f, "{call}"),
            Expression::Negate(_, inner) => {
                f.write_char('-')?;
                operand(f, inner)
            }
        }
    }
}

/// Operators inside operators are put in parentheses
fn operand<P: Phase>(f: &mut fmt::Formatter<'_>, expression: &Expression<P>) -> fmt::Result {
    match expression {
        Expression::Binary(_) | Expression::Condition(_) => write!(f, "({expression})"),
        _ => write!(f, "{expression}"),
    }
}

impl<P: Phase> fmt::Display for BinaryOp<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        operand(f, &self.left)?;
        write!(f, " {} ", self.op)?;
        operand(f, &self.right)
    }
}

impl<P: Phase> fmt::Display for Condition<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        operand(f, &self.left)?;
        write!(f, " {} ", self.op)?;
        operand(f, &self.right)
    }
}

impl<P: Phase> fmt::Display for Call<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.function)?;
        for (i, argument) in self.arguments.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{argument}")?;
        }
        f.write_char(')')
    }
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("EXPR([")?;
        for (i, instruction) in self.instructions.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{instruction}")?;
        }
        f.write_str("])")
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instruction::Push(Literal::Integer(value)) => write!(f, "PUSH({value})"),
            Instruction::Push(Literal::Float(value)) => write!(f, "PUSH({value:?})"),
            Instruction::LoadLocal(name) => write!(f, "LOAD_LOCAL({name})"),
            Instruction::LoadGlobal(name) => write!(f, "LOAD_GLOBAL({name})"),
            Instruction::StoreLocal(name) => write!(f, "STORE_LOCAL({name})"),
            Instruction::StoreGlobal(name) => write!(f, "STORE_GLOBAL({name})"),
            Instruction::Arithmetic(op, _) => {
                let name = match op {
                    BinaryOperator::Add => "ADD",
                    BinaryOperator::Sub => "SUB",
                    BinaryOperator::Mul => "MUL",
                    BinaryOperator::Div => "DIV",
                };
                write!(f, "{name}()")
            }
            Instruction::Compare(op, _) => {
                let name = match op {
                    Comparison::Less => "LT",
                    Comparison::LessEq => "LE",
                    Comparison::Greater => "GT",
                    Comparison::GreaterEq => "GE",
                    Comparison::Equals => "EQ",
                    Comparison::NotEquals => "NE",
                };
                write!(f, "{name}()")
            }
            Instruction::Call {
                function,
                arguments,
                ..
            } => write!(f, "CALL({function}, {arguments})"),
            Instruction::Print(_) => f.write_str("PRINT()"),
            Instruction::Return(_) => f.write_str("RETURN()"),
            Instruction::Goto(label) => write!(f, "GOTO('{label}')"),
            Instruction::Branch { if_true, if_false } => {
                write!(f, "CBRANCH('{if_true}', '{if_false}')")
            }
            Instruction::Local(name) => write!(f, "LOCAL({name})"),
        }
    }
}
