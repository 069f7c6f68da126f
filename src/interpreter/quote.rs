use crate::lexer::{Token, TokenKind};
use crate::parser::ast::{
    modify_expression, BooleanLiteral, Expression, FloatLiteral, IntegerLiteral, RuneLiteral,
    StringLiteral,
};

use super::environment::Env;
use super::object::Value;

/// The `quote(expr)` special form: rewrite every `unquote(...)` call inside
/// the fragment by evaluating its single argument, then wrap the resulting
/// AST without evaluating it.
pub fn quote(expression: Expression, env: &Env) -> Value {
    let node = eval_unquote_calls(expression, env);
    Value::Quote(Box::new(node))
}

fn eval_unquote_calls(expression: Expression, env: &Env) -> Expression {
    modify_expression(expression, &|expression| match expression {
        Expression::Call(call)
            if call.function.token_literal() == "unquote" && call.arguments.len() == 1 =>
        {
            let unquoted = super::eval_expression(&call.arguments[0], env);
            value_to_node(unquoted, Expression::Call(call))
        }
        other => other,
    })
}

/// Converts an evaluated unquote argument back into a literal node. Values
/// without a literal form leave the original call in place.
fn value_to_node(value: Value, original: Expression) -> Expression {
    match value {
        Value::Integer(value) => Expression::IntegerLiteral(IntegerLiteral {
            token: Token::synthesized(TokenKind::Int, value.to_string()),
            value,
        }),
        Value::Float(value) => Expression::FloatLiteral(FloatLiteral {
            token: Token::synthesized(TokenKind::Float, format!("{value:.6}")),
            value,
        }),
        Value::String(value) => Expression::StringLiteral(StringLiteral {
            token: Token::synthesized(TokenKind::String, value.clone()),
            value,
        }),
        Value::Rune(value) => Expression::RuneLiteral(RuneLiteral {
            token: Token::synthesized(TokenKind::Rune, value.to_string()),
            value,
        }),
        Value::Boolean(value) => {
            let kind = if value {
                TokenKind::True
            } else {
                TokenKind::False
            };
            Expression::BooleanLiteral(BooleanLiteral {
                token: Token::synthesized(kind, value.to_string()),
                value,
            })
        }
        Value::Quote(node) => *node,
        _ => original,
    }
}
