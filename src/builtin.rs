//! Builtin runtime functions
//!
//! The runtime linked against compiled programs provides exactly one function per
//! numeric kind, used by `print`.

use std::fmt;

use crate::Kind;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Prototype {
    pub name: &'static str,
    pub parameter: Kind,
    pub return_kind: Kind,
}

impl fmt::Display for Prototype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "declare {} @{}({})",
            self.return_kind.llvm(),
            self.name,
            self.parameter.llvm()
        )
    }
}

const PRINT_INT: Prototype = Prototype {
    name: "_print_int",
    parameter: Kind::Integer,
    return_kind: Kind::Integer,
};

const PRINT_FLOAT: Prototype = Prototype {
    name: "_print_float",
    parameter: Kind::Float,
    return_kind: Kind::Integer,
};

pub fn all_builtin_prototypes() -> [Prototype; 2] {
    [PRINT_INT, PRINT_FLOAT]
}

/// The runtime function printing a value of `kind`
pub fn print_function(kind: Kind) -> Prototype {
    match kind {
        Kind::Integer => PRINT_INT,
        Kind::Float => PRINT_FLOAT,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prologue_declarations() {
        let lines: Vec<_> = all_builtin_prototypes()
            .iter()
            .map(ToString::to_string)
            .collect();
        assert_eq!(
            lines,
            [
                "declare i32 @_print_int(i32)",
                "declare i32 @_print_float(double)"
            ]
        );
    }
}
