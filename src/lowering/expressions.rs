use crate::ast::{
    BinaryOp, Call, Condition, Desugared, Expression, Function, Module, Program, Statement,
    Symbol, TopLevel, TreeFunction,
};
use crate::ir::{Code, Instruction, Literal, Lowered, Nested, NestedModule};

/// Turn every expression into stack machine code
///
/// Operands are pushed left to right, then the operator consumes them and leaves its
/// result on the stack.
pub fn lower_expressions(program: Module<Desugared>) -> NestedModule<Lowered> {
    let statements = program
        .statements
        .into_iter()
        .map(|item| match item {
            TopLevel::Global(symbol) => TopLevel::Global(symbol),
            TopLevel::Function(function) => TopLevel::Function(lower_function(function)),
        })
        .collect();
    Program::new(statements)
}

fn lower_function(function: TreeFunction<Desugared>) -> Function<Symbol, Nested<Lowered>> {
    let Function {
        name,
        parameters,
        body,
    } = function;
    Function::new(name, parameters, lower_statements(body))
}

fn lower_statements(statements: Vec<Statement<Desugared>>) -> Vec<Nested<Lowered>> {
    statements.into_iter().map(lower_statement).collect()
}

fn lower_statement(statement: Statement<Desugared>) -> Nested<Lowered> {
    match statement {
        Statement::VarDecl(symbol) => Nested::Leaf(Lowered::Declare(symbol)),
        Statement::VarInit(gone, ..) => match gone {},
        Statement::Assign(symbol, value) => Nested::Leaf(Lowered::Assign(symbol, code(value))),
        Statement::Print(value) => Nested::Leaf(Lowered::Print(code(value))),
        Statement::Return(value) => Nested::Leaf(Lowered::Return(code(value))),
        Statement::Expression(value) => Nested::Leaf(Lowered::Expression(code(value))),
        Statement::IfElse {
            condition,
            if_true,
            if_false,
        } => Nested::IfElse {
            condition: condition_code(condition),
            if_true: lower_statements(if_true),
            if_false: lower_statements(if_false),
        },
        Statement::While { condition, body } => Nested::While {
            condition: condition_code(condition),
            body: lower_statements(body),
        },
        Statement::Function(function) => Nested::Function(lower_function(function)),
    }
}

/// Lower one expression
pub fn code(expression: Expression<Desugared>) -> Code {
    let kind = expression.kind();
    let mut instructions = Vec::new();
    emit(expression, &mut instructions);
    Code { instructions, kind }
}

fn condition_code(condition: Condition<Desugared>) -> Code {
    let kind = condition.kind();
    let mut instructions = Vec::new();
    emit_condition(condition, &mut instructions);
    Code { instructions, kind }
}

fn emit(expression: Expression<Desugared>, out: &mut Vec<Instruction>) {
    match expression {
        Expression::Integer(value) => out.push(Instruction::Push(Literal::Integer(value))),
        Expression::Float(value) => out.push(Instruction::Push(Literal::Float(value))),
        Expression::Name(symbol) => out.push(Instruction::load(&symbol)),
        Expression::Binary(binary) => {
            let kind = binary.kind();
            let BinaryOp {
                op, left, right, ..
            } = *binary;
            emit(left, out);
            emit(right, out);
            out.push(Instruction::Arithmetic(op, kind));
        }
        Expression::Condition(condition) => emit_condition(*condition, out),
        Expression::Call(Call {
            function,
            arguments,
        }) => {
            let count = arguments.len();
            for argument in arguments {
                emit(argument, out);
            }
            out.push(Instruction::Call {
                function: function.value,
                arguments: count,
                kind: function.kind,
            });
        }
        Expression::Negate(gone, _) => match gone {},
    }
}

fn emit_condition(condition: Condition<Desugared>, out: &mut Vec<Instruction>) {
    let kind = condition.kind();
    let Condition {
        op, left, right, ..
    } = condition;
    emit(left, out);
    emit(right, out);
    out.push(Instruction::Compare(op, kind));
}
