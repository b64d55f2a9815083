use crate::ast::{
    BinaryOp, BinaryOperator, Call, Condition, Desugared, Expression, Function, Module,
    Program, Resolved, Statement, TreeFunction,
};
use crate::error::Result;

/// Rewrite every `-e` into `0 - e`
pub fn eliminate_negation(program: Module<Resolved>) -> Result<Module<Desugared>> {
    let statements = program
        .statements
        .into_iter()
        .map(|item| item.map_function(function_without_negation))
        .collect::<Result<_>>()?;
    Ok(Program::new(statements))
}

fn function_without_negation(
    function: TreeFunction<Resolved>,
) -> Result<TreeFunction<Desugared>> {
    let Function {
        name,
        parameters,
        body,
    } = function;
    Ok(Function::new(name, parameters, statements(body)?))
}

fn statements(statements: Vec<Statement<Resolved>>) -> Result<Vec<Statement<Desugared>>> {
    statements.into_iter().map(statement).collect()
}

fn statement(statement: Statement<Resolved>) -> Result<Statement<Desugared>> {
    Ok(match statement {
        Statement::VarDecl(symbol) => Statement::VarDecl(symbol),
        Statement::VarInit(gone, ..) => match gone {},
        Statement::Assign(symbol, value) => Statement::Assign(symbol, expression(value)?),
        Statement::Print(value) => Statement::Print(expression(value)?),
        Statement::IfElse {
            condition: c,
            if_true,
            if_false,
        } => Statement::IfElse {
            condition: condition(c)?,
            if_true: statements(if_true)?,
            if_false: statements(if_false)?,
        },
        Statement::While { condition: c, body } => Statement::While {
            condition: condition(c)?,
            body: statements(body)?,
        },
        Statement::Function(function) => {
            Statement::Function(function_without_negation(function)?)
        }
        Statement::Return(value) => Statement::Return(expression(value)?),
        Statement::Expression(value) => Statement::Expression(expression(value)?),
    })
}

fn expression(value: Expression<Resolved>) -> Result<Expression<Desugared>> {
    Ok(match value {
        Expression::Integer(value) => Expression::Integer(value),
        Expression::Float(value) => Expression::Float(value),
        Expression::Name(symbol) => Expression::Name(symbol),
        Expression::Binary(binary) => {
            let BinaryOp {
                op, left, right, ..
            } = *binary;
            Expression::binary(op, expression(left)?, expression(right)?)?
        }
        Expression::Condition(c) => Expression::Condition(Box::new(condition(*c)?)),
        Expression::Call(Call {
            function,
            arguments,
        }) => {
            let arguments = arguments
                .into_iter()
                .map(expression)
                .collect::<Result<_>>()?;
            Expression::call(function, arguments)
        }
        Expression::Negate(_, inner) => {
            let inner = expression(*inner)?;
            Expression::binary(BinaryOperator::Sub, Expression::zero(inner.kind()), inner)?
        }
    })
}

fn condition(condition: Condition<Resolved>) -> Result<Condition<Desugared>> {
    let Condition {
        op, left, right, ..
    } = condition;
    Ok(Condition::new(op, expression(left)?, expression(right)?))
}
