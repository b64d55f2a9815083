//! Errors of the compiler pipeline
//!
//! Apart from [TypeMismatch], every error in here means that a pass was handed
//! something an earlier pass should have removed. Those are bugs in the compiler,
//! not in the compiled program.

use miette::Diagnostic;
use thiserror::Error;

use crate::ast::BinaryOperator;
use crate::Kind;

/// A binary operator was built from operands of different kinds
#[derive(Debug, Clone, PartialEq, Eq, Error, Diagnostic)]
#[error("Invalid binary operator typing: {left} != {right} for `{op}`")]
#[diagnostic(help("Both operands of `{op}` must have the same type"))]
pub struct TypeMismatch {
    pub op: BinaryOperator,
    pub left: Kind,
    pub right: Kind,
}

#[derive(Debug, Error, Diagnostic)]
pub enum CompileError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    TypeMismatch(#[from] TypeMismatch),

    #[error("The {stage} stage cannot handle {construct}")]
    #[diagnostic(help("This is a bug in the compiler: a stage ran out of order or skipped a case"))]
    UnresolvedConstruct {
        stage: &'static str,
        construct: String,
    },

    #[error("No operand left on the stack for `{instruction}`")]
    #[diagnostic(help("This is a bug in the compiler: the lowered code does not balance the stack"))]
    StackUnderflow { instruction: String },
}

impl CompileError {
    pub(crate) fn unresolved(stage: &'static str, construct: impl Into<String>) -> Self {
        Self::UnresolvedConstruct {
            stage,
            construct: construct.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, CompileError>;
