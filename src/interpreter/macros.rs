use std::rc::Rc;

use log::debug;

use crate::parser::ast::{modify_program, Expression, Program, Statement};

use super::environment::Env;
use super::object::{MacroValue, Value};

/// First macro pass: pull every top level `let NAME = magic(...) {...};`
/// out of the program and bind it in the macro environment. Macros live in
/// their own environment, separate from runtime values.
pub fn define_macros(program: &mut Program, env: &Env) {
    let statements = std::mem::take(&mut program.statements);

    for statement in statements {
        match macro_definition(&statement, env) {
            Some((name, makro)) => {
                debug!("defining macro {name}");
                env.set(&name, makro);
            }
            None => program.statements.push(statement),
        }
    }
}

fn macro_definition(statement: &Statement, env: &Env) -> Option<(String, Value)> {
    let Statement::Let(statement) = statement else {
        return None;
    };
    let Expression::Macro(literal) = &statement.value else {
        return None;
    };

    let makro = Value::Macro(Rc::new(MacroValue {
        parameters: literal.parameters.clone(),
        body: literal.body.clone(),
        env: env.clone(),
    }));

    Some((statement.name.value.clone(), makro))
}

/// Second macro pass: rewrite every call whose callee is bound in the macro
/// environment. The arguments are handed to the macro body as quoted AST;
/// the body must evaluate to a quoted node, which replaces the call site.
pub fn expand_macros(program: Program, env: &Env) -> Program {
    modify_program(program, &|expression| {
        let Expression::Call(call) = &expression else {
            return expression;
        };
        let Expression::Identifier(identifier) = call.function.as_ref() else {
            return expression;
        };
        let Some(Value::Macro(makro)) = env.get(&identifier.value) else {
            return expression;
        };

        let eval_env = Env::new_enclosed(&makro.env);
        for (parameter, argument) in makro.parameters.iter().zip(&call.arguments) {
            eval_env.set(
                &parameter.value,
                Value::Quote(Box::new(argument.clone())),
            );
        }

        match super::eval_block(&makro.body, &eval_env) {
            Value::Quote(node) => *node,
            other => panic!(
                "macros must return quoted code, got {}",
                other.type_name()
            ),
        }
    })
}
