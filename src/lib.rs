pub mod ast;
pub mod builtin;
pub mod cli;
pub mod codegen;
pub mod common;
pub mod driver;
pub mod error;
pub mod format;
pub mod ir;
pub mod lowering;
pub mod parsing;
pub mod passes;
pub mod type_checking;

use std::fmt;

use tracing::debug;

pub use codegen::{IrFunction, IrModule};
pub use common::{Label, LabelGenerator, Register, RegisterGenerator, Span, Spanned};
pub use error::{CompileError, TypeMismatch};
pub use parsing::{parse, ParsingError};
pub use type_checking::{type_check, TypeCheckError};

/// The two numeric kinds every value of a program has
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Integer,
    Float,
}

impl Kind {
    /// Name of the matching LLVM type
    pub fn llvm(self) -> &'static str {
        match self {
            Kind::Integer => "i32",
            Kind::Float => "double",
        }
    }

    /// Zero literal of this kind in LLVM syntax
    pub fn llvm_zero(self) -> &'static str {
        match self {
            Kind::Integer => "0",
            Kind::Float => "0.0",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Kind::Integer => write!(f, "int"),
            Kind::Float => write!(f, "float"),
        }
    }
}

/// Knobs of the compiler pipeline
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Options {
    /// Log a warning for every name that is used without being declared
    pub report_undeclared: bool,
}

/// The stages of [compile], in the order they run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Fold,
    SplitDeclarations,
    Resolve,
    Unscript,
    Returns,
    Negate,
    Expressions,
    Statements,
    Blocks,
    Flow,
    Codegen,
    EntryBlocks,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Fold => "constant folding",
            Stage::SplitDeclarations => "declaration splitting",
            Stage::Resolve => "scope resolution",
            Stage::Unscript => "script unwrapping",
            Stage::Returns => "return normalization",
            Stage::Negate => "negation elimination",
            Stage::Expressions => "expression lowering",
            Stage::Statements => "statement lowering",
            Stage::Blocks => "block grouping",
            Stage::Flow => "control flow linking",
            Stage::Codegen => "code generation",
            Stage::EntryBlocks => "entry blocks",
        };
        write!(f, "{name}")
    }
}

/// Run the whole pipeline on a typed program
pub fn compile(program: ast::SourceProgram, options: &Options) -> error::Result<IrModule> {
    compile_with(program, options, &mut |_, _| {})
}

/// Run the whole pipeline, handing the result of every stage to `observer`
pub fn compile_with(
    program: ast::SourceProgram,
    options: &Options,
    observer: &mut dyn FnMut(Stage, &dyn fmt::Display),
) -> error::Result<IrModule> {
    let mut finished = |stage: Stage, result: &dyn fmt::Display| {
        debug!(%stage, "stage done");
        observer(stage, result);
    };

    let program = passes::fold(program)?;
    finished(Stage::Fold, &program);

    let program = passes::split_declarations(program);
    finished(Stage::SplitDeclarations, &program);

    let program = passes::resolve(program, options)?;
    finished(Stage::Resolve, &program);

    let program = passes::unscript(program);
    finished(Stage::Unscript, &program);

    let program = passes::normalize_returns(program);
    finished(Stage::Returns, &program);

    let program = passes::eliminate_negation(program)?;
    finished(Stage::Negate, &program);

    let program = lowering::lower_expressions(program);
    finished(Stage::Expressions, &program);

    let program = lowering::lower_statements(program)?;
    finished(Stage::Statements, &program);

    let mut labels = LabelGenerator::default();
    let program = lowering::group_blocks(program, &mut labels);
    finished(Stage::Blocks, &program);

    let program = lowering::link(program, &mut labels)?;
    lowering::relabel(&program);
    finished(Stage::Flow, &program);

    let module = codegen::generate(program)?;
    finished(Stage::Codegen, &module);

    let module = codegen::materialize_entry_blocks(module);
    finished(Stage::EntryBlocks, &module);

    Ok(module)
}

/// Parse and type check a snippet, panicking on any error
#[cfg(test)]
pub(crate) fn typed(source: &str) -> ast::SourceProgram {
    let syntax = parse(source).expect("test source must parse");
    type_check(&syntax).expect("test source must type check")
}
