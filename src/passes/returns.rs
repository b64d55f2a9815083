use crate::ast::{Expression, Module, Phase, Program, Statement, TopLevel};

/// Make sure every function ends in a `return`
///
/// A function whose last statement is not a return gets `return 0;` appended, with the
/// zero being of the function's return kind. Returns inside branches are not looked at.
pub fn normalize_returns<P: Phase>(program: Module<P>) -> Module<P> {
    let statements = program
        .statements
        .into_iter()
        .map(|item| match item {
            TopLevel::Function(mut function) => {
                if !matches!(function.body.last(), Some(Statement::Return(_))) {
                    let zero = Expression::zero(function.return_kind());
                    function.body.push(Statement::Return(zero));
                }
                TopLevel::Function(function)
            }
            global => global,
        })
        .collect();
    Program::new(statements)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::{Resolved, Symbol};
    use crate::passes::{fold, resolve, split_declarations, unscript};
    use crate::{typed, Kind, Options};

    fn bodies(source: &str) -> Vec<Vec<Statement<Resolved>>> {
        let program = split_declarations(fold(typed(source)).unwrap());
        let module = unscript(resolve(program, &Options::default()).unwrap());
        normalize_returns(module)
            .statements
            .into_iter()
            .filter_map(|item| match item {
                TopLevel::Function(function) => Some(function.body),
                TopLevel::Global(_) => None,
            })
            .collect()
    }

    #[test]
    fn missing_return_is_added() {
        let bodies = bodies("print 1;");
        assert_eq!(
            bodies[0],
            vec![
                Statement::Print(Expression::Integer(1)),
                Statement::Return(Expression::Integer(0)),
            ]
        );
    }

    #[test]
    fn existing_return_is_kept() {
        let bodies = bodies("func f(a int) int { return a; }");
        assert_eq!(
            bodies[0],
            vec![Statement::Return(Expression::Name(Symbol::local("a", Kind::Integer)))]
        );
    }

    #[test]
    fn float_function_returns_float_zero() {
        let bodies = bodies("func g(a float) float { print a; }");
        assert_eq!(bodies[0].last(), Some(&Statement::Return(Expression::Float(0.0))));
    }

    #[test]
    fn branch_returns_are_not_inspected() {
        let bodies = bodies("func h(a int) int { if a < 0 { return 1; } else { return 2; } }");
        assert_eq!(bodies[0].len(), 2);
        assert_eq!(bodies[0][1], Statement::Return(Expression::Integer(0)));
    }
}
