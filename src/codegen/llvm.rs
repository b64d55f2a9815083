//! LLVM assembly output

use std::fmt;

use super::{Address, Conversion, IrBlock, IrFunction, IrModule, Operand, Operation, Tac};
use crate::ast::{BinaryOperator, Comparison, TopLevel};
use crate::builtin::{all_builtin_prototypes, print_function};
use crate::Kind;

/// Renders a generated module as LLVM assembly
pub struct Llvm<'a>(pub &'a IrModule);

/// The LLVM assembly of a generated module
pub fn emit(module: &IrModule) -> String {
    Llvm(module).to_string()
}

impl fmt::Display for Llvm<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for prototype in all_builtin_prototypes() {
            writeln!(f, "{prototype}")?;
        }

        let mut after_function = true;
        for item in &self.0.statements {
            match item {
                TopLevel::Global(symbol) => {
                    if after_function {
                        writeln!(f)?;
                    }
                    writeln!(
                        f,
                        "@{} = global {} {}",
                        symbol.value,
                        symbol.kind.llvm(),
                        symbol.kind.llvm_zero()
                    )?;
                    after_function = false;
                }
                TopLevel::Function(function) => {
                    writeln!(f)?;
                    write_function(f, function)?;
                    after_function = true;
                }
            }
        }
        Ok(())
    }
}

fn write_function(f: &mut fmt::Formatter<'_>, function: &IrFunction) -> fmt::Result {
    let parameters = function
        .parameters
        .iter()
        .map(|parameter| format!("{} %{}", parameter.kind.llvm(), parameter.value))
        .collect::<Vec<_>>()
        .join(", ");

    writeln!(
        f,
        "define {} @{}({parameters}) {{",
        function.name.kind.llvm(),
        function.name.value
    )?;
    for block in &function.body {
        write!(f, "{block}")?;
    }
    writeln!(f, "}}")
}

impl fmt::Display for IrBlock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}:", self.label)?;
        for instruction in &self.instructions {
            writeln!(f, "    {instruction}")?;
        }
        Ok(())
    }
}

impl fmt::Display for Tac {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Tac::Binary {
                result,
                operation,
                kind,
                left,
                right,
            } => write!(
                f,
                "{result} = {} {} {left}, {right}",
                operation.mnemonic(*kind),
                kind.llvm()
            ),
            Tac::Convert {
                result,
                conversion,
                value,
            } => {
                let (mnemonic, from, to) = match conversion {
                    Conversion::ZeroExtend => ("zext", "i1", "i32"),
                    Conversion::UnsignedToFloat => ("uitofp", "i1", "double"),
                    Conversion::SignedToFloat => ("sitofp", "i32", "double"),
                    Conversion::FloatToSigned => ("fptosi", "double", "i32"),
                };
                write!(f, "{result} = {mnemonic} {from} {value} to {to}")
            }
            Tac::Alloca { name, kind } => write!(f, "%{name} = alloca {}", kind.llvm()),
            Tac::Load {
                result,
                kind,
                address,
            } => {
                let ty = kind.llvm();
                write!(f, "{result} = load {ty}, {ty}* {address}")
            }
            Tac::Store {
                kind,
                value,
                address,
            } => {
                let ty = kind.llvm();
                write!(f, "store {ty} {value}, {ty}* {address}")
            }
            Tac::Print { kind, value } => {
                let print = print_function(*kind);
                let ty = kind.llvm();
                write!(
                    f,
                    "call {} ({ty}) @{}({ty} {value})",
                    print.return_kind.llvm(),
                    print.name
                )
            }
            Tac::Return { kind, value } => write!(f, "ret {} {value}", kind.llvm()),
            Tac::Jump(label) => write!(f, "br label %{label}"),
            Tac::Branch {
                condition,
                if_true,
                if_false,
            } => write!(f, "br i1 {condition}, label %{if_true}, label %{if_false}"),
            Tac::Call {
                result,
                function,
                kind,
                arguments,
            } => {
                let signature = arguments
                    .iter()
                    .map(|(kind, _)| kind.llvm())
                    .collect::<Vec<_>>()
                    .join(", ");
                let arguments = arguments
                    .iter()
                    .map(|(kind, value)| format!("{} {value}", kind.llvm()))
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(
                    f,
                    "{result} = call {} ({signature}) @{function}({arguments})",
                    kind.llvm()
                )
            }
        }
    }
}

impl Operation {
    fn mnemonic(self, kind: Kind) -> &'static str {
        use BinaryOperator::*;
        use Comparison::*;

        match (self, kind) {
            (Operation::Arithmetic(Add), Kind::Integer) => "add",
            (Operation::Arithmetic(Sub), Kind::Integer) => "sub",
            (Operation::Arithmetic(Mul), Kind::Integer) => "mul",
            (Operation::Arithmetic(Div), Kind::Integer) => "sdiv",
            (Operation::Arithmetic(Add), Kind::Float) => "fadd",
            (Operation::Arithmetic(Sub), Kind::Float) => "fsub",
            (Operation::Arithmetic(Mul), Kind::Float) => "fmul",
            (Operation::Arithmetic(Div), Kind::Float) => "fdiv",
            (Operation::Compare(Less), Kind::Integer) => "icmp slt",
            (Operation::Compare(LessEq), Kind::Integer) => "icmp sle",
            (Operation::Compare(Greater), Kind::Integer) => "icmp sgt",
            (Operation::Compare(GreaterEq), Kind::Integer) => "icmp sge",
            (Operation::Compare(Equals), Kind::Integer) => "icmp eq",
            (Operation::Compare(NotEquals), Kind::Integer) => "icmp ne",
            (Operation::Compare(Less), Kind::Float) => "fcmp olt",
            (Operation::Compare(LessEq), Kind::Float) => "fcmp ole",
            (Operation::Compare(Greater), Kind::Float) => "fcmp ogt",
            (Operation::Compare(GreaterEq), Kind::Float) => "fcmp oge",
            (Operation::Compare(Equals), Kind::Float) => "fcmp oeq",
            (Operation::Compare(NotEquals), Kind::Float) => "fcmp one",
        }
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operand::Integer(value) => write!(f, "{value}"),
            Operand::Float(value) => write!(f, "{}", float_literal(*value)),
            Operand::Register(register) => write!(f, "{register}"),
        }
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Address::Local(name) => write!(f, "%{name}"),
            Address::Global(name) => write!(f, "@{name}"),
        }
    }
}

/// Whole numbers keep a decimal point, everything else is written as the exact bit
/// pattern, as LLVM rejects decimal constants that are not exactly representable
fn float_literal(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{value:.1}")
    } else {
        format!("0x{:016X}", value.to_bits())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Function, Program, Symbol};
    use crate::common::{Label, Register};

    #[test]
    fn float_literals() {
        assert_eq!(float_literal(3.0), "3.0");
        assert_eq!(float_literal(-0.0), "-0.0");
        assert_eq!(float_literal(0.5), "0x3FE0000000000000");
        assert_eq!(float_literal(0.1), "0x3FB999999999999A");
    }

    #[test]
    fn instruction_text() {
        let r = |name: &str| Register::new(name);
        let cases = [
            (
                Tac::Binary {
                    result: r(".r0"),
                    operation: Operation::Arithmetic(BinaryOperator::Div),
                    kind: Kind::Float,
                    left: Operand::Register(r("a")),
                    right: Operand::Float(2.0),
                },
                "%.r0 = fdiv double %a, 2.0",
            ),
            (
                Tac::Binary {
                    result: r(".r1"),
                    operation: Operation::Compare(Comparison::GreaterEq),
                    kind: Kind::Integer,
                    left: Operand::Integer(1),
                    right: Operand::Integer(2),
                },
                "%.r1 = icmp sge i32 1, 2",
            ),
            (
                Tac::Load {
                    result: r(".r2"),
                    kind: Kind::Integer,
                    address: Address::Global("x".into()),
                },
                "%.r2 = load i32, i32* @x",
            ),
            (
                Tac::Store {
                    kind: Kind::Float,
                    value: Operand::Register(r(".arg_y")),
                    address: Address::Local("y".into()),
                },
                "store double %.arg_y, double* %y",
            ),
            (
                Tac::Print {
                    kind: Kind::Float,
                    value: Operand::Register(r(".r3")),
                },
                "call i32 (double) @_print_float(double %.r3)",
            ),
            (
                Tac::Branch {
                    condition: Operand::Register(r(".r1")),
                    if_true: Label::new("L1"),
                    if_false: Label::new("L2"),
                },
                "br i1 %.r1, label %L1, label %L2",
            ),
            (
                Tac::Call {
                    result: r(".r4"),
                    function: "f".into(),
                    kind: Kind::Integer,
                    arguments: vec![
                        (Kind::Integer, Operand::Integer(7)),
                        (Kind::Float, Operand::Register(r(".r3"))),
                    ],
                },
                "%.r4 = call i32 (i32, double) @f(i32 7, double %.r3)",
            ),
            (
                Tac::Convert {
                    result: r(".r5"),
                    conversion: Conversion::ZeroExtend,
                    value: Operand::Register(r(".r1")),
                },
                "%.r5 = zext i1 %.r1 to i32",
            ),
        ];

        for (tac, text) in cases {
            assert_eq!(tac.to_string(), text);
        }
    }

    #[test]
    fn module_layout() {
        let start = Label::new("L0");
        let module = Program::new(vec![
            TopLevel::Global(Symbol::global("x", Kind::Integer)),
            TopLevel::Global(Symbol::global("y", Kind::Float)),
            TopLevel::Function(Function::new(
                Symbol::global("main", Kind::Integer),
                vec![],
                vec![IrBlock {
                    label: start,
                    instructions: vec![Tac::Return {
                        kind: Kind::Integer,
                        value: Operand::Integer(0),
                    }],
                }],
            )),
        ]);

        let expected = "\
declare i32 @_print_int(i32)
declare i32 @_print_float(double)

@x = global i32 0
@y = global double 0.0

define i32 @main() {
L0:
    ret i32 0
}
";
        assert_eq!(emit(&module), expected);
    }
}
