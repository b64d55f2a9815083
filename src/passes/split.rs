use crate::ast::{Function, Parsed, Program, Script, Split, Statement};

/// Turn every `var x = e;` into `var x;` followed by `x = e;`
pub fn split_declarations(program: Script<Parsed>) -> Script<Split> {
    Program::new(split_statements(program.statements))
}

fn split_statements(statements: Vec<Statement<Parsed>>) -> Vec<Statement<Split>> {
    let mut split = Vec::with_capacity(statements.len());
    for statement in statements {
        split_statement(statement, &mut split);
    }
    split
}

fn split_statement(statement: Statement<Parsed>, out: &mut Vec<Statement<Split>>) {
    let statement = match statement {
        Statement::VarInit(_, name, value) => {
            out.push(Statement::VarDecl(name.clone()));
            Statement::Assign(name, value.into_phase())
        }
        Statement::VarDecl(name) => Statement::VarDecl(name),
        Statement::Assign(name, value) => Statement::Assign(name, value.into_phase()),
        Statement::Print(value) => Statement::Print(value.into_phase()),
        Statement::IfElse {
            condition,
            if_true,
            if_false,
        } => Statement::IfElse {
            condition: condition.into_phase(),
            if_true: split_statements(if_true),
            if_false: split_statements(if_false),
        },
        Statement::While { condition, body } => Statement::While {
            condition: condition.into_phase(),
            body: split_statements(body),
        },
        Statement::Function(Function {
            name,
            parameters,
            body,
        }) => Statement::Function(Function::new(name, parameters, split_statements(body))),
        Statement::Return(value) => Statement::Return(value.into_phase()),
        Statement::Expression(value) => Statement::Expression(value.into_phase()),
    };
    out.push(statement);
}
