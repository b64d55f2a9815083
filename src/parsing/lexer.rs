use std::fmt;

use chumsky::prelude::*;

use crate::{Span, Spanned};

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Token {
    KwInt,
    Int(i64),
    KwFloat,
    /// Bit pattern of the value, so that tokens can be hashed
    Float(u64),

    Ident(String),

    Var,
    Func,
    If,
    Else,
    While,
    Print,
    Return,

    Assign,
    Equals,
    NotEquals,
    Less,
    LessEq,
    Greater,
    GreaterEq,
    Plus,
    Minus,
    Star,
    Slash,

    ParenOpen,
    ParenClose,
    CurlyOpen,
    CurlyClose,

    Comma,
    Semicolon,
}

pub fn lex() -> impl Parser<char, Vec<Spanned<Token>>, Error = Simple<char, Span>> {
    let float = text::int(10)
        .then_ignore(just('.'))
        .then(text::digits(10).or_not())
        .try_map(|(whole, fraction): (String, Option<String>), span| {
            format!("{whole}.{}", fraction.unwrap_or_default())
                .parse::<f64>()
                .map(|value| Token::Float(value.to_bits()))
                .map_err(|err| Simple::custom(span, format!("Invalid float literal: {err}")))
        });

    let integer = text::int(10).try_map(|digits: String, span| {
        digits
            .parse::<i32>()
            .map(|value| Token::Int(value.into()))
            .map_err(|err| Simple::custom(span, format!("Invalid integer literal: {err}")))
    });

    let symbol = choice((
        just("==").to(Token::Equals),
        just("!=").to(Token::NotEquals),
        just("<=").to(Token::LessEq),
        just(">=").to(Token::GreaterEq),
        just('=').to(Token::Assign),
        just('<').to(Token::Less),
        just('>').to(Token::Greater),
        just('+').to(Token::Plus),
        just('-').to(Token::Minus),
        just('*').to(Token::Star),
        just('/').to(Token::Slash),
        just('(').to(Token::ParenOpen),
        just(')').to(Token::ParenClose),
        just('{').to(Token::CurlyOpen),
        just('}').to(Token::CurlyClose),
        just(',').to(Token::Comma),
        just(';').to(Token::Semicolon),
    ));

    let kw_or_ident = text::ident().map(|ident: String| match ident.as_str() {
        "int" => Token::KwInt,
        "float" => Token::KwFloat,
        "var" => Token::Var,
        "func" => Token::Func,
        "if" => Token::If,
        "else" => Token::Else,
        "while" => Token::While,
        "print" => Token::Print,
        "return" => Token::Return,
        _ => Token::Ident(ident),
    });

    let token = float.or(integer).or(kw_or_ident).or(symbol);

    let comment = just("//")
        .then(filter(|c: &char| *c != '\n').repeated())
        .padded();

    token
        .map_with_span(|tok, span| (tok, span))
        .padded_by(comment.repeated())
        .padded()
        .repeated()
        .padded_by(comment.repeated())
        .padded()
        .then_ignore(end())
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::KwInt => write!(f, "int"),
            Token::Int(value) => write!(f, "{value}"),
            Token::KwFloat => write!(f, "float"),
            Token::Float(bits) => write!(f, "{:?}", f64::from_bits(*bits)),
            Token::Ident(ident) => write!(f, "{ident}"),
            Token::Var => write!(f, "var"),
            Token::Func => write!(f, "func"),
            Token::If => write!(f, "if"),
            Token::Else => write!(f, "else"),
            Token::While => write!(f, "while"),
            Token::Print => write!(f, "print"),
            Token::Return => write!(f, "return"),
            Token::Assign => write!(f, "="),
            Token::Equals => write!(f, "=="),
            Token::NotEquals => write!(f, "!="),
            Token::Less => write!(f, "<"),
            Token::LessEq => write!(f, "<="),
            Token::Greater => write!(f, ">"),
            Token::GreaterEq => write!(f, ">="),
            Token::Plus => write!(f, "+"),
            Token::Minus => write!(f, "-"),
            Token::Star => write!(f, "*"),
            Token::Slash => write!(f, "/"),
            Token::ParenOpen => write!(f, "("),
            Token::ParenClose => write!(f, ")"),
            Token::CurlyOpen => write!(f, "{{"),
            Token::CurlyClose => write!(f, "}}"),
            Token::Comma => write!(f, ","),
            Token::Semicolon => write!(f, ";"),
        }
    }
}
