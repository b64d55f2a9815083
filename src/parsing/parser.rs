use chumsky::prelude::*;

use super::ast::{BinaryOp, Expression, Function, Statement, Syntax};
use super::lexer::Token;
use crate::ast::{BinaryOperator, Comparison};
use crate::{Kind, Span, Spanned};

type ParseErr = Simple<Token, Span>;

fn binary(
    lhs: Spanned<Expression>,
    (op, rhs): (BinaryOp, Spanned<Expression>),
) -> Spanned<Expression> {
    let span = lhs.1.union(rhs.1);
    let e = Expression::Binary {
        op,
        lhs: Box::new(lhs),
        rhs: Box::new(rhs),
    };
    (e, span)
}

fn expression() -> impl Parser<Token, Spanned<Expression>, Error = ParseErr> + Clone {
    let ident = select! { Token::Ident(ident) => ident }.labelled("identifier");

    recursive(|expr| {
        let val = select! {
            Token::Int(x) => Expression::Int(x),
            Token::Float(bits) => Expression::Float(f64::from_bits(bits)),
        }
        .labelled("value");

        let var = ident.clone().map(Expression::Var);

        let items = expr
            .clone()
            .separated_by(just(Token::Comma))
            .allow_trailing();

        let call = ident
            .then(items.delimited_by(just(Token::ParenOpen), just(Token::ParenClose)))
            .map(|(function, args)| Expression::Call { function, args });

        let atom = val
            .or(call)
            .or(var)
            .map_with_span(|e, span: Span| (e, span))
            .or(expr
                .clone()
                .delimited_by(just(Token::ParenOpen), just(Token::ParenClose)));

        let unary = just(Token::Minus)
            .map_with_span(|_, span: Span| span)
            .repeated()
            .then(atom)
            .foldr(|minus, inner| {
                let span = minus.union(inner.1);
                (Expression::Negate(Box::new(inner)), span)
            });

        let product = unary
            .clone()
            .then(
                just(Token::Star)
                    .to(BinaryOp::Arithmetic(BinaryOperator::Mul))
                    .or(just(Token::Slash).to(BinaryOp::Arithmetic(BinaryOperator::Div)))
                    .then(unary)
                    .repeated(),
            )
            .foldl(binary);

        let sum = product
            .clone()
            .then(
                just(Token::Plus)
                    .to(BinaryOp::Arithmetic(BinaryOperator::Add))
                    .or(just(Token::Minus).to(BinaryOp::Arithmetic(BinaryOperator::Sub)))
                    .then(product)
                    .repeated(),
            )
            .foldl(binary);

        let comparator = choice((
            just(Token::Less).to(Comparison::Less),
            just(Token::LessEq).to(Comparison::LessEq),
            just(Token::Greater).to(Comparison::Greater),
            just(Token::GreaterEq).to(Comparison::GreaterEq),
            just(Token::Equals).to(Comparison::Equals),
            just(Token::NotEquals).to(Comparison::NotEquals),
        ))
        .map(BinaryOp::Compare);

        // comparisons do not chain
        sum.clone()
            .then(comparator.then(sum).or_not())
            .map(|(lhs, rest)| match rest {
                Some(rest) => binary(lhs, rest),
                None => lhs,
            })
            .labelled("expression")
    })
}

pub fn parser() -> impl Parser<Token, Syntax, Error = ParseErr> + Clone {
    let ident = select! { Token::Ident(ident) => ident }.labelled("identifier");
    let spanned_ident = ident.clone().map_with_span(|name, span: Span| (name, span));

    let kind = choice((
        just(Token::KwInt).to(Kind::Integer),
        just(Token::KwFloat).to(Kind::Float),
    ))
    .labelled("type");

    let expr = expression();

    let statement = recursive(|statement| {
        let block = statement
            .repeated()
            .delimited_by(just(Token::CurlyOpen), just(Token::CurlyClose))
            .recover_with(nested_delimiters(
                Token::CurlyOpen,
                Token::CurlyClose,
                [(Token::ParenOpen, Token::ParenClose)],
                |_| Vec::new(),
            ));

        let var = just(Token::Var)
            .ignore_then(spanned_ident.clone())
            .then(kind.clone().or_not())
            .then(just(Token::Assign).ignore_then(expr.clone()).or_not())
            .then_ignore(just(Token::Semicolon))
            .try_map(|((name, kind), value), span| match (kind, value) {
                (kind, Some(value)) => Ok(Statement::VarInit { name, kind, value }),
                (Some(kind), None) => Ok(Statement::VarDecl { name, kind }),
                (None, None) => Err(Simple::custom(
                    span,
                    format!("Variable `{}` needs a type or an initial value", name.0),
                )),
            })
            .labelled("variable declaration");

        let assign = spanned_ident
            .clone()
            .then_ignore(just(Token::Assign))
            .then(expr.clone())
            .then_ignore(just(Token::Semicolon))
            .map(|(name, value)| Statement::Assign { name, value });

        let print = just(Token::Print)
            .ignore_then(expr.clone())
            .then_ignore(just(Token::Semicolon))
            .map(Statement::Print);

        let ret = just(Token::Return)
            .ignore_then(expr.clone())
            .then_ignore(just(Token::Semicolon))
            .map(Statement::Return);

        let if_else = just(Token::If)
            .ignore_then(expr.clone())
            .then(block.clone())
            .then(just(Token::Else).ignore_then(block.clone()).or_not())
            .map(|((condition, if_true), if_false)| Statement::If {
                condition,
                if_true,
                if_false: if_false.unwrap_or_default(),
            });

        let while_loop = just(Token::While)
            .ignore_then(expr.clone())
            .then(block.clone())
            .map(|(condition, body)| Statement::While { condition, body });

        let params = ident
            .clone()
            .then(kind.clone())
            .separated_by(just(Token::Comma))
            .allow_trailing()
            .delimited_by(just(Token::ParenOpen), just(Token::ParenClose));

        let func = just(Token::Func)
            .ignore_then(spanned_ident)
            .then(params)
            .then(kind.or_not())
            .then(block)
            .map(|(((name, params), return_kind), body)| {
                Statement::Function(Function {
                    name,
                    params,
                    return_kind,
                    body,
                })
            })
            .labelled("function");

        let expression = expr
            .clone()
            .then_ignore(just(Token::Semicolon))
            .map(Statement::Expression);

        choice((
            var, func, if_else, while_loop, print, ret, assign, expression,
        ))
        .map_with_span(|s, span: Span| (s, span))
        .labelled("statement")
    });

    statement.repeated().then_ignore(end())
}
