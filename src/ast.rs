//! Abstract syntax tree
//!
//! The tree passes of the compiler all work on the types in here. Which statements and
//! expressions may still occur is part of the type: every tree type is generic over a
//! [Phase], and a phase decides
//! - whether names are still plain [Name]s or already resolved [Symbol]s,
//! - whether `var x = e;` may still occur ([Present]) or was split up ([Gone]),
//! - whether unary negation may still occur.
//!
//! [Gone] has no values, so a pass handed a later phase's tree simply has no way to
//! build the variants it is not allowed to see, and a pass consuming such a tree
//! discharges those variants with an empty `match`.
//!
//! After the script unwrapper the top level of a program is restricted further to
//! [TopLevel] items.

use std::borrow::Cow;
use std::{fmt, io};

use ptree::{print_tree, write_tree, Style, TreeItem};

use crate::error::TypeMismatch;
use crate::Kind;

/// Marks a variant as allowed in a phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Present;

/// Marks a variant as eliminated by an earlier pass
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Gone {}

/// Something that names a variable or a function
pub trait Named: fmt::Display + fmt::Debug + Clone + PartialEq {
    /// The bare identifier
    fn value(&self) -> &str;

    /// Kind of the variable, or return kind of the function
    fn kind(&self) -> Kind;

    /// Storage class, once it is known
    fn storage(&self) -> Option<Storage> {
        None
    }
}

/// The shape of the tree between two passes
pub trait Phase: fmt::Debug + Clone + PartialEq {
    type Name: Named;
    type VarInit: fmt::Debug + Clone + Copy + PartialEq;
    type Negate: fmt::Debug + Clone + Copy + PartialEq;
}

/// Straight out of the front end (and after constant folding)
#[derive(Debug, Clone, PartialEq)]
pub enum Parsed {}

/// No declaration carries an initializer any more
#[derive(Debug, Clone, PartialEq)]
pub enum Split {}

/// Every name is known to be global or local
#[derive(Debug, Clone, PartialEq)]
pub enum Resolved {}

/// Unary negation has been rewritten into subtraction
#[derive(Debug, Clone, PartialEq)]
pub enum Desugared {}

impl Phase for Parsed {
    type Name = Name;
    type VarInit = Present;
    type Negate = Present;
}

impl Phase for Split {
    type Name = Name;
    type VarInit = Gone;
    type Negate = Present;
}

impl Phase for Resolved {
    type Name = Symbol;
    type VarInit = Gone;
    type Negate = Present;
}

impl Phase for Desugared {
    type Name = Symbol;
    type VarInit = Gone;
    type Negate = Gone;
}

/// A reference to a variable or function as written in the source
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Name {
    pub value: String,
    pub kind: Kind,
}

impl Name {
    pub fn new(value: impl Into<String>, kind: Kind) -> Self {
        Self {
            value: value.into(),
            kind,
        }
    }
}

impl Named for Name {
    fn value(&self) -> &str {
        &self.value
    }

    fn kind(&self) -> Kind {
        self.kind
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Storage {
    /// Lives as long as the program
    Global,
    /// Lives for one activation of the enclosing function
    Local,
}

/// A name after scope resolution
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Symbol {
    pub value: String,
    pub kind: Kind,
    pub storage: Storage,
}

impl Symbol {
    pub fn global(value: impl Into<String>, kind: Kind) -> Self {
        Self {
            value: value.into(),
            kind,
            storage: Storage::Global,
        }
    }

    pub fn local(value: impl Into<String>, kind: Kind) -> Self {
        Self {
            value: value.into(),
            kind,
            storage: Storage::Local,
        }
    }

    pub fn is_global(&self) -> bool {
        self.storage == Storage::Global
    }
}

impl Named for Symbol {
    fn value(&self) -> &str {
        &self.value
    }

    fn kind(&self) -> Kind {
        self.kind
    }

    fn storage(&self) -> Option<Storage> {
        Some(self.storage)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOperator {
    Add,
    Sub,
    Mul,
    Div,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Comparison {
    Less,
    LessEq,
    Greater,
    GreaterEq,
    Equals,
    NotEquals,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expression<P: Phase> {
    Integer(i64),
    Float(f64),
    Name(P::Name),
    Binary(Box<BinaryOp<P>>),
    Condition(Box<Condition<P>>),
    Call(Call<P>),
    Negate(P::Negate, Box<Expression<P>>),
}

/// `left op right` for arithmetic operators
///
/// Can only be built from operands of the same kind, see [BinaryOp::new].
#[derive(Debug, Clone, PartialEq)]
pub struct BinaryOp<P: Phase> {
    pub op: BinaryOperator,
    pub left: Expression<P>,
    pub right: Expression<P>,
    kind: Kind,
}

/// `left op right` for comparisons
///
/// The operands may differ in kind; the comparison is done in `float` as soon as one
/// of them is a float.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition<P: Phase> {
    pub op: Comparison,
    pub left: Expression<P>,
    pub right: Expression<P>,
    kind: Kind,
}

/// `function(arguments...)`
#[derive(Debug, Clone, PartialEq)]
pub struct Call<P: Phase> {
    pub function: P::Name,
    pub arguments: Vec<Expression<P>>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Statement<P: Phase> {
    /// `var name;`
    VarDecl(P::Name),
    /// `var name = value;`
    VarInit(P::VarInit, P::Name, Expression<P>),
    /// `name = value;`
    Assign(P::Name, Expression<P>),
    /// `print value;`
    Print(Expression<P>),
    IfElse {
        condition: Condition<P>,
        if_true: Vec<Statement<P>>,
        if_false: Vec<Statement<P>>,
    },
    While {
        condition: Condition<P>,
        body: Vec<Statement<P>>,
    },
    Function(Function<P::Name, Statement<P>>),
    /// `return value;`
    Return(Expression<P>),
    /// `value;`
    Expression(Expression<P>),
}

/// `func name(parameters...) { body }`
///
/// Generic over the statements of the body, as the function boundary survives all
/// the way down to the generated code.
#[derive(Debug, Clone, PartialEq)]
pub struct Function<N, S> {
    pub name: N,
    pub parameters: Vec<N>,
    pub body: Vec<S>,
}

impl<N: Named, S> Function<N, S> {
    pub fn new(name: N, parameters: Vec<N>, body: Vec<S>) -> Self {
        Self {
            name,
            parameters,
            body,
        }
    }

    /// A function returns the kind of its own name
    pub fn return_kind(&self) -> Kind {
        self.name.kind()
    }

    /// Keep name and parameters, replace the body
    pub fn with_body<T>(self, body: Vec<T>) -> Function<N, T> {
        Function {
            name: self.name,
            parameters: self.parameters,
            body,
        }
    }
}

/// What may remain at the top level once loose statements moved into `main`
#[derive(Debug, Clone, PartialEq)]
pub enum TopLevel<F> {
    Global(Symbol),
    Function(F),
}

impl<F> TopLevel<F> {
    /// Transform the function, if this is one
    pub fn map_function<G, E>(
        self,
        f: impl FnOnce(F) -> Result<G, E>,
    ) -> Result<TopLevel<G>, E> {
        match self {
            TopLevel::Global(symbol) => Ok(TopLevel::Global(symbol)),
            TopLevel::Function(function) => f(function).map(TopLevel::Function),
        }
    }
}

/// An ordered sequence of top level statements
#[derive(Debug, Clone, PartialEq)]
pub struct Program<T> {
    pub statements: Vec<T>,
}

impl<T> Program<T> {
    pub fn new(statements: Vec<T>) -> Self {
        Self { statements }
    }
}

/// A whole program in one of the tree phases
pub type Script<P> = Program<Statement<P>>;

/// What the front end hands to the compiler pipeline
pub type SourceProgram = Script<Parsed>;

/// A function whose body still is a tree
pub type TreeFunction<P> = Function<Symbol, Statement<P>>;

/// A program after the script unwrapper
pub type Module<P> = Program<TopLevel<TreeFunction<P>>>;

impl<P: Phase> Expression<P> {
    /// Build `left op right`, checking that both operand kinds agree
    pub fn binary(
        op: BinaryOperator,
        left: Expression<P>,
        right: Expression<P>,
    ) -> Result<Self, TypeMismatch> {
        BinaryOp::new(op, left, right).map(|b| Expression::Binary(Box::new(b)))
    }

    pub fn condition(op: Comparison, left: Expression<P>, right: Expression<P>) -> Self {
        Expression::Condition(Box::new(Condition::new(op, left, right)))
    }

    pub fn call(function: P::Name, arguments: Vec<Expression<P>>) -> Self {
        Expression::Call(Call {
            function,
            arguments,
        })
    }

    /// Literal zero of the given kind
    pub fn zero(kind: Kind) -> Self {
        match kind {
            Kind::Integer => Expression::Integer(0),
            Kind::Float => Expression::Float(0.0),
        }
    }

    pub fn kind(&self) -> Kind {
        match self {
            Expression::Integer(_) => Kind::Integer,
            Expression::Float(_) => Kind::Float,
            Expression::Name(name) => name.kind(),
            Expression::Binary(binary) => binary.kind,
            Expression::Condition(condition) => condition.kind,
            Expression::Call(call) => call.function.kind(),
            Expression::Negate(_, inner) => inner.kind(),
        }
    }

    /// Move the expression into another phase that uses the same names and still
    /// (or no longer) allows the same constructs
    pub fn into_phase<Q>(self) -> Expression<Q>
    where
        Q: Phase<Name = P::Name, Negate = P::Negate>,
    {
        match self {
            Expression::Integer(value) => Expression::Integer(value),
            Expression::Float(value) => Expression::Float(value),
            Expression::Name(name) => Expression::Name(name),
            Expression::Binary(binary) => {
                let BinaryOp {
                    op,
                    left,
                    right,
                    kind,
                } = *binary;
                Expression::Binary(Box::new(BinaryOp {
                    op,
                    left: left.into_phase(),
                    right: right.into_phase(),
                    kind,
                }))
            }
            Expression::Condition(condition) => {
                Expression::Condition(Box::new(condition.into_phase()))
            }
            Expression::Call(call) => Expression::Call(Call {
                function: call.function,
                arguments: call
                    .arguments
                    .into_iter()
                    .map(Expression::into_phase)
                    .collect(),
            }),
            Expression::Negate(marker, inner) => {
                Expression::Negate(marker, Box::new(inner.into_phase()))
            }
        }
    }
}

impl<P: Phase> BinaryOp<P> {
    pub fn new(
        op: BinaryOperator,
        left: Expression<P>,
        right: Expression<P>,
    ) -> Result<Self, TypeMismatch> {
        let (left_kind, right_kind) = (left.kind(), right.kind());
        if left_kind != right_kind {
            return Err(TypeMismatch {
                op,
                left: left_kind,
                right: right_kind,
            });
        }

        Ok(Self {
            op,
            left,
            right,
            kind: left_kind,
        })
    }

    pub fn kind(&self) -> Kind {
        self.kind
    }
}

impl<P: Phase> Condition<P> {
    pub fn new(op: Comparison, left: Expression<P>, right: Expression<P>) -> Self {
        let kind = if left.kind() == Kind::Float || right.kind() == Kind::Float {
            Kind::Float
        } else {
            Kind::Integer
        };

        Self {
            op,
            left,
            right,
            kind,
        }
    }

    pub fn kind(&self) -> Kind {
        self.kind
    }

    pub fn into_phase<Q>(self) -> Condition<Q>
    where
        Q: Phase<Name = P::Name, Negate = P::Negate>,
    {
        Condition {
            op: self.op,
            left: self.left.into_phase(),
            right: self.right.into_phase(),
            kind: self.kind,
        }
    }
}

impl fmt::Display for BinaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BinaryOperator::Add => write!(f, "+"),
            BinaryOperator::Sub => write!(f, "-"),
            BinaryOperator::Mul => write!(f, "*"),
            BinaryOperator::Div => write!(f, "/"),
        }
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Comparison::Less => write!(f, "<"),
            Comparison::LessEq => write!(f, "<="),
            Comparison::Greater => write!(f, ">"),
            Comparison::GreaterEq => write!(f, ">="),
            Comparison::Equals => write!(f, "=="),
            Comparison::NotEquals => write!(f, "!="),
        }
    }
}

impl Program<Statement<Parsed>> {
    /// Draw every top level statement as a tree on stdout
    pub fn pretty_print(&self) -> io::Result<()> {
        for statement in &self.statements {
            print_tree(&Node::Statement(statement))?;
        }
        Ok(())
    }

    /// Same as [Program::pretty_print], into any writer
    pub fn write_tree<W: io::Write>(&self, mut out: W) -> io::Result<()> {
        for statement in &self.statements {
            write_tree(&Node::Statement(statement), &mut out)?;
        }
        Ok(())
    }
}

/// A node of the drawn syntax tree
#[derive(Debug, Clone)]
pub enum Node<'a> {
    Statement(&'a Statement<Parsed>),
    Expression(&'a Expression<Parsed>),
    Condition(&'a Condition<Parsed>),
    /// Named list of statements, e.g. the branches of an `if`
    Group(&'static str, &'a [Statement<Parsed>]),
}

fn statements(statements: &[Statement<Parsed>]) -> Vec<Node<'_>> {
    statements.iter().map(Node::Statement).collect()
}

impl TreeItem for Node<'_> {
    type Child = Self;

    fn write_self<W: io::Write>(&self, f: &mut W, style: &Style) -> io::Result<()> {
        match self {
            Node::Statement(statement) => match statement {
                Statement::VarDecl(name) => write!(f, "var {}", style.paint(typed(name))),
                Statement::VarInit(_, name, _) => write!(f, "var {} =", style.paint(typed(name))),
                Statement::Assign(name, _) => write!(f, "{} =", style.paint(typed(name))),
                Statement::Print(_) => write!(f, "print"),
                Statement::IfElse { .. } => write!(f, "if"),
                Statement::While { .. } => write!(f, "while"),
                Statement::Function(function) => {
                    let params = function
                        .parameters
                        .iter()
                        .map(typed)
                        .collect::<Vec<_>>()
                        .join(", ");
                    write!(
                        f,
                        "func {}({params}) {}",
                        style.paint(&function.name.value),
                        function.name.kind
                    )
                }
                Statement::Return(_) => write!(f, "return"),
                Statement::Expression(_) => write!(f, "expression"),
            },
            Node::Expression(expression) => match expression {
                Expression::Integer(i) => write!(f, "{}", style.paint(i)),
                Expression::Float(x) => write!(f, "{}", style.paint(format!("{x:?}"))),
                Expression::Name(name) => write!(f, "{}", style.paint(typed(name))),
                Expression::Binary(binary) => write!(f, "{}: {}", binary.op, binary.kind),
                Expression::Condition(condition) => {
                    write!(f, "{}: {}", condition.op, condition.kind)
                }
                Expression::Call(call) => write!(f, "call {}", style.paint(typed(&call.function))),
                Expression::Negate(..) => write!(f, "-"),
            },
            Node::Condition(condition) => write!(f, "{}: {}", condition.op, condition.kind),
            Node::Group(label, _) => write!(f, "{label}"),
        }
    }

    fn children(&self) -> Cow<[Self::Child]> {
        let children = match self {
            Node::Statement(statement) => match statement {
                Statement::VarDecl(_) => vec![],
                Statement::VarInit(_, _, value)
                | Statement::Assign(_, value)
                | Statement::Print(value)
                | Statement::Return(value)
                | Statement::Expression(value) => vec![Node::Expression(value)],
                Statement::IfElse {
                    condition,
                    if_true,
                    if_false,
                } => {
                    let mut children = vec![Node::Condition(condition), Node::Group("then", if_true)];
                    if !if_false.is_empty() {
                        children.push(Node::Group("else", if_false));
                    }
                    children
                }
                Statement::While { condition, body } => {
                    vec![Node::Condition(condition), Node::Group("do", body)]
                }
                Statement::Function(function) => statements(&function.body),
            },
            Node::Expression(expression) => match expression {
                Expression::Integer(_) | Expression::Float(_) | Expression::Name(_) => vec![],
                Expression::Binary(binary) => {
                    vec![Node::Expression(&binary.left), Node::Expression(&binary.right)]
                }
                Expression::Condition(condition) => {
                    vec![Node::Expression(&condition.left), Node::Expression(&condition.right)]
                }
                Expression::Call(call) => call.arguments.iter().map(Node::Expression).collect(),
                Expression::Negate(_, inner) => vec![Node::Expression(inner)],
            },
            Node::Condition(condition) => {
                vec![Node::Expression(&condition.left), Node::Expression(&condition.right)]
            }
            Node::Group(_, body) => statements(body),
        };
        Cow::from(children)
    }
}

fn typed(name: &Name) -> String {
    format!("{}: {}", name.value, name.kind)
}
