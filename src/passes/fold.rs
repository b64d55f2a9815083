use crate::ast::{
    BinaryOp, BinaryOperator, Call, Condition, Expression, Function, Phase, Program, Script,
    Statement,
};
use crate::error::Result;

/// Evaluate arithmetic on literals at compile time
///
/// Integer results are floored, so division rounds towards negative infinity. Integers
/// are 32 bits wide in the generated code, so integer arithmetic whose result does not
/// fit, or that divides by zero, stays as it is. Comparisons get
/// their operands folded but are never reduced to a value.
pub fn fold<P: Phase>(program: Script<P>) -> Result<Script<P>> {
    let statements = fold_statements(program.statements)?;
    Ok(Program::new(statements))
}

fn fold_statements<P: Phase>(statements: Vec<Statement<P>>) -> Result<Vec<Statement<P>>> {
    statements.into_iter().map(fold_statement).collect()
}

fn fold_statement<P: Phase>(statement: Statement<P>) -> Result<Statement<P>> {
    Ok(match statement {
        Statement::VarDecl(name) => Statement::VarDecl(name),
        Statement::VarInit(marker, name, value) => {
            Statement::VarInit(marker, name, fold_expression(value)?)
        }
        Statement::Assign(name, value) => Statement::Assign(name, fold_expression(value)?),
        Statement::Print(value) => Statement::Print(fold_expression(value)?),
        Statement::IfElse {
            condition,
            if_true,
            if_false,
        } => Statement::IfElse {
            condition: fold_condition(condition)?,
            if_true: fold_statements(if_true)?,
            if_false: fold_statements(if_false)?,
        },
        Statement::While { condition, body } => Statement::While {
            condition: fold_condition(condition)?,
            body: fold_statements(body)?,
        },
        Statement::Function(Function {
            name,
            parameters,
            body,
        }) => Statement::Function(Function::new(name, parameters, fold_statements(body)?)),
        Statement::Return(value) => Statement::Return(fold_expression(value)?),
        Statement::Expression(value) => Statement::Expression(fold_expression(value)?),
    })
}

pub(crate) fn fold_expression<P: Phase>(expression: Expression<P>) -> Result<Expression<P>> {
    Ok(match expression {
        Expression::Binary(binary) => fold_binary(*binary)?,
        Expression::Condition(condition) => {
            Expression::Condition(Box::new(fold_condition(*condition)?))
        }
        Expression::Call(Call {
            function,
            arguments,
        }) => {
            let arguments = arguments
                .into_iter()
                .map(fold_expression)
                .collect::<Result<_>>()?;
            Expression::call(function, arguments)
        }
        Expression::Negate(marker, inner) => match fold_expression(*inner)? {
            Expression::Integer(value) if value.checked_neg().is_some_and(fits) => {
                Expression::Integer(-value)
            }
            Expression::Float(value) => Expression::Float(-value),
            inner => Expression::Negate(marker, Box::new(inner)),
        },
        literal_or_name => literal_or_name,
    })
}

fn fold_binary<P: Phase>(binary: BinaryOp<P>) -> Result<Expression<P>> {
    let BinaryOp {
        op, left, right, ..
    } = binary;
    let left = fold_expression(left)?;
    let right = fold_expression(right)?;

    let folded = match (&left, &right) {
        (Expression::Integer(l), Expression::Integer(r)) => {
            integer_arithmetic(op, *l, *r)
                .filter(|value| fits(*value))
                .map(Expression::Integer)
        }
        (Expression::Float(l), Expression::Float(r)) => {
            Some(Expression::Float(float_arithmetic(op, *l, *r)))
        }
        _ => None,
    };

    match folded {
        Some(literal) => Ok(literal),
        None => Ok(Expression::binary(op, left, right)?),
    }
}

fn fold_condition<P: Phase>(condition: Condition<P>) -> Result<Condition<P>> {
    let Condition {
        op, left, right, ..
    } = condition;
    Ok(Condition::new(
        op,
        fold_expression(left)?,
        fold_expression(right)?,
    ))
}

fn integer_arithmetic(op: BinaryOperator, left: i64, right: i64) -> Option<i64> {
    match op {
        BinaryOperator::Add => left.checked_add(right),
        BinaryOperator::Sub => left.checked_sub(right),
        BinaryOperator::Mul => left.checked_mul(right),
        BinaryOperator::Div => {
            let quotient = left.checked_div(right)?;
            if left % right != 0 && (left < 0) != (right < 0) {
                Some(quotient - 1)
            } else {
                Some(quotient)
            }
        }
    }
}

/// Whether `value` is representable as an `i32`
fn fits(value: i64) -> bool {
    i32::try_from(value).is_ok()
}

fn float_arithmetic(op: BinaryOperator, left: f64, right: f64) -> f64 {
    match op {
        BinaryOperator::Add => left + right,
        BinaryOperator::Sub => left - right,
        BinaryOperator::Mul => left * right,
        BinaryOperator::Div => left / right,
    }
}
