//! Syntax tree as written in the source, before any kinds are known

use crate::ast::{BinaryOperator, Comparison};
use crate::{Kind, Spanned};

pub type Ident = String;

/// The parsed source: top level statements in order
pub type Syntax = Vec<Spanned<Statement>>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Arithmetic(BinaryOperator),
    Compare(Comparison),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Int(i64),
    Float(f64),
    Var(Ident),
    Negate(Box<Spanned<Expression>>),
    Binary {
        op: BinaryOp,
        lhs: Box<Spanned<Expression>>,
        rhs: Box<Spanned<Expression>>,
    },
    Call {
        function: Ident,
        args: Vec<Spanned<Expression>>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// `var x int;`
    VarDecl { name: Spanned<Ident>, kind: Kind },
    /// `var x = 1;` or `var x int = 1;`
    VarInit {
        name: Spanned<Ident>,
        kind: Option<Kind>,
        value: Spanned<Expression>,
    },
    Assign {
        name: Spanned<Ident>,
        value: Spanned<Expression>,
    },
    Print(Spanned<Expression>),
    If {
        condition: Spanned<Expression>,
        if_true: Vec<Spanned<Statement>>,
        if_false: Vec<Spanned<Statement>>,
    },
    While {
        condition: Spanned<Expression>,
        body: Vec<Spanned<Statement>>,
    },
    Function(Function),
    Return(Spanned<Expression>),
    Expression(Spanned<Expression>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    pub name: Spanned<Ident>,
    pub params: Vec<(Ident, Kind)>,
    /// Inferred from the final `return` when missing
    pub return_kind: Option<Kind>,
    pub body: Vec<Spanned<Statement>>,
}
