//! Stack machine representation
//!
//! Expression lowering turns every expression into a [Code] sequence of stack machine
//! [Instruction]s. The statements around them keep their structure as [Nested] items
//! for a while: the leaves get flatter with every stage ([Lowered], then [Straight],
//! then [Block]) until the control flow linker dissolves `if` and `while` into plain
//! blocks that jump to each other.

use crate::ast::{BinaryOperator, Comparison, Function, Name, Program, Symbol, TopLevel};
use crate::common::Label;
use crate::Kind;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Literal {
    Integer(i64),
    Float(f64),
}

impl Literal {
    pub fn kind(&self) -> Kind {
        match self {
            Literal::Integer(_) => Kind::Integer,
            Literal::Float(_) => Kind::Float,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Instruction {
    Push(Literal),
    LoadLocal(Name),
    LoadGlobal(Name),
    StoreLocal(Name),
    StoreGlobal(Name),
    Arithmetic(BinaryOperator, Kind),
    Compare(Comparison, Kind),
    /// Pops `arguments` values, pushes the result of kind `kind`
    Call {
        function: String,
        arguments: usize,
        kind: Kind,
    },
    Print(Kind),
    Return(Kind),
    Goto(Label),
    Branch {
        if_true: Label,
        if_false: Label,
    },
    /// Stack slot for a local variable
    Local(Name),
}

impl Instruction {
    /// Load the value of a resolved variable
    pub fn load(symbol: &Symbol) -> Self {
        let name = Name::new(symbol.value.clone(), symbol.kind);
        if symbol.is_global() {
            Instruction::LoadGlobal(name)
        } else {
            Instruction::LoadLocal(name)
        }
    }

    /// Store the top of the stack into a resolved variable
    pub fn store(symbol: &Symbol) -> Self {
        let name = Name::new(symbol.value.clone(), symbol.kind);
        if symbol.is_global() {
            Instruction::StoreGlobal(name)
        } else {
            Instruction::StoreLocal(name)
        }
    }

    /// Whether control never falls through to the next instruction
    pub fn is_terminator(&self) -> bool {
        matches!(
            self,
            Instruction::Return(_) | Instruction::Goto(_) | Instruction::Branch { .. }
        )
    }
}

/// Instructions computing one value of kind `kind`
#[derive(Debug, Clone, PartialEq)]
pub struct Code {
    pub instructions: Vec<Instruction>,
    pub kind: Kind,
}

/// An `if`, `while` or function around some leaves, or a leaf itself
#[derive(Debug, Clone, PartialEq)]
pub enum Nested<L> {
    Leaf(L),
    IfElse {
        condition: Code,
        if_true: Vec<Nested<L>>,
        if_false: Vec<Nested<L>>,
    },
    While {
        condition: Code,
        body: Vec<Nested<L>>,
    },
    Function(Function<Symbol, Nested<L>>),
}

/// A statement whose expressions have been lowered
#[derive(Debug, Clone, PartialEq)]
pub enum Lowered {
    Declare(Symbol),
    Assign(Symbol, Code),
    Print(Code),
    Return(Code),
    Expression(Code),
}

/// A statement turned into instructions, without any jump in between
#[derive(Debug, Clone, PartialEq)]
pub struct Straight {
    pub instructions: Vec<Instruction>,
}

/// A labelled run of instructions
#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    pub label: Label,
    pub instructions: Vec<Instruction>,
}

impl Block {
    pub fn new(label: Label, instructions: Vec<Instruction>) -> Self {
        Self {
            label,
            instructions,
        }
    }

    /// Whether the block ends in a return, jump or branch
    pub fn is_terminated(&self) -> bool {
        self.instructions
            .last()
            .is_some_and(Instruction::is_terminator)
    }
}

/// A program whose function bodies are made of `L` leaves
pub type NestedModule<L> = Program<TopLevel<Function<Symbol, Nested<L>>>>;

/// A program after control flow linking: every function is a list of blocks
pub type LinkedModule = Program<TopLevel<Function<Symbol, Block>>>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn storage_picks_instruction() {
        let global = Symbol::global("x", Kind::Integer);
        let local = Symbol::local("y", Kind::Float);
        assert_eq!(
            Instruction::load(&global),
            Instruction::LoadGlobal(Name::new("x", Kind::Integer))
        );
        assert_eq!(
            Instruction::store(&local),
            Instruction::StoreLocal(Name::new("y", Kind::Float))
        );
    }

    #[test]
    fn terminated_blocks() {
        let label = Label::new("L0");
        let open = Block::new(label.clone(), vec![Instruction::Print(Kind::Integer)]);
        assert!(!open.is_terminated());
        assert!(!Block::new(label.clone(), vec![]).is_terminated());

        let jump = Block::new(label.clone(), vec![Instruction::Goto(label)]);
        assert!(jump.is_terminated());
    }
}
