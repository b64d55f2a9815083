use crate::ast::{Function, Module, Program, Resolved, Script, Statement, Symbol, TopLevel};
use crate::Kind;

/// Name of the function that receives all loose top level statements
pub const ENTRY_POINT: &str = "main";

/// Move every top level statement that is neither a global declaration nor a function
/// into a new `main` function, which goes last
pub fn unscript(program: Script<Resolved>) -> Module<Resolved> {
    let mut items = Vec::new();
    let mut main = Vec::new();

    for statement in program.statements {
        match statement {
            Statement::VarDecl(symbol) if symbol.is_global() => {
                items.push(TopLevel::Global(symbol));
            }
            Statement::Function(function) if function.name.is_global() => {
                items.push(TopLevel::Function(function));
            }
            statement => main.push(statement),
        }
    }

    let entry = Symbol::global(ENTRY_POINT, Kind::Integer);
    items.push(TopLevel::Function(Function::new(entry, Vec::new(), main)));
    Program::new(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Expression;
    use crate::passes::{fold, resolve, split_declarations};
    use crate::{typed, Options};

    fn unscripted(source: &str) -> Module<Resolved> {
        let program = split_declarations(fold(typed(source)).unwrap());
        unscript(resolve(program, &Options::default()).unwrap())
    }

    #[test]
    fn loose_statements_move_into_main() {
        let module = unscripted("var x = 1; func f() int { return x; } print f();");
        let x = Symbol::global("x", Kind::Integer);
        let f = Symbol::global("f", Kind::Integer);

        assert_eq!(module.statements.len(), 3);
        assert_eq!(module.statements[0], TopLevel::Global(x.clone()));
        let TopLevel::Function(function) = &module.statements[1] else {
            panic!("expected f");
        };
        assert_eq!(function.name, f);

        let TopLevel::Function(main) = &module.statements[2] else {
            panic!("expected main");
        };
        assert_eq!(main.name, Symbol::global("main", Kind::Integer));
        assert!(main.parameters.is_empty());
        assert_eq!(
            main.body,
            vec![
                Statement::Assign(x, Expression::Integer(1)),
                Statement::Print(Expression::call(f, vec![])),
            ]
        );
    }

    #[test]
    fn empty_program_still_gets_main() {
        let module = unscripted("");
        assert_eq!(
            module.statements,
            vec![TopLevel::Function(Function::new(
                Symbol::global("main", Kind::Integer),
                vec![],
                vec![]
            ))]
        );
    }
}
