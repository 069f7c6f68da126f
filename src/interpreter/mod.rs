pub mod builtins;
pub mod environment;
pub mod macros;
pub mod object;
pub mod quote;

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::parser::ast::{
    AssignExpression, BlockStatement, CallExpression, Expression, ForExpression, HashLiteral,
    IfExpression, PostfixExpression, Program, Statement,
};

use self::environment::Env;
use self::object::{FunctionValue, HashPair, Value};

/// Evaluates a whole program. A top level `return` unwraps to its payload;
/// an error becomes the program result.
pub fn eval_program(program: &Program, env: &Env) -> Value {
    let mut result = Value::Null;

    for statement in &program.statements {
        result = eval_statement(statement, env);

        match result {
            Value::ReturnValue(value) => return *value,
            Value::Error(_) => return result,
            _ => {}
        }
    }

    result
}

/// Evaluates the statements of a block in order. `ReturnValue` and `Error`
/// wrappers stop the block and propagate unchanged, so a nested `return`
/// surfaces through every enclosing block.
pub fn eval_block(block: &BlockStatement, env: &Env) -> Value {
    let mut result = Value::Null;

    for statement in &block.statements {
        result = eval_statement(statement, env);

        if matches!(result, Value::ReturnValue(_) | Value::Error(_)) {
            return result;
        }
    }

    result
}

fn eval_statement(statement: &Statement, env: &Env) -> Value {
    match statement {
        Statement::Let(statement) => {
            let value = eval_expression(&statement.value, env);
            if value.is_error() {
                return value;
            }
            env.set(&statement.name.value, value);
            Value::Null
        }
        Statement::Return(statement) => {
            let value = match &statement.value {
                Some(expression) => eval_expression(expression, env),
                None => Value::Null,
            };
            if value.is_error() {
                return value;
            }
            Value::ReturnValue(Box::new(value))
        }
        Statement::Expression(statement) => eval_expression(&statement.expression, env),
    }
}

pub fn eval_expression(expression: &Expression, env: &Env) -> Value {
    match expression {
        Expression::IntegerLiteral(literal) => Value::Integer(literal.value),
        Expression::FloatLiteral(literal) => Value::Float(literal.value),
        Expression::StringLiteral(literal) => Value::String(literal.value.clone()),
        Expression::RuneLiteral(literal) => Value::Rune(literal.value),
        Expression::BooleanLiteral(literal) => Value::Boolean(literal.value),
        Expression::Identifier(identifier) => match env.get(&identifier.value) {
            Some(value) => value,
            None => builtins::lookup(&identifier.value).unwrap_or_else(|| {
                Value::Error(format!("identifier not found: {}", identifier.value))
            }),
        },
        Expression::ArrayLiteral(literal) => match eval_expressions(&literal.elements, env) {
            Ok(elements) => Value::Array(Rc::new(RefCell::new(elements))),
            Err(error) => error,
        },
        Expression::HashLiteral(literal) => eval_hash_literal(literal, env),
        Expression::Prefix(prefix) => {
            let right = eval_expression(&prefix.right, env);
            if right.is_error() {
                return right;
            }
            eval_prefix_expression(&prefix.operator, right)
        }
        Expression::Infix(infix) => {
            // the right operand is evaluated first
            let right = eval_expression(&infix.right, env);
            if right.is_error() {
                return right;
            }
            let left = eval_expression(&infix.left, env);
            if left.is_error() {
                return left;
            }
            eval_infix_expression(&infix.operator, left, right)
        }
        Expression::Postfix(postfix) => eval_postfix_expression(postfix, env),
        Expression::Assign(assign) => eval_assign_expression(assign, env),
        Expression::Index(index) => {
            let left = eval_expression(&index.left, env);
            if left.is_error() {
                return left;
            }
            let idx = eval_expression(&index.index, env);
            if idx.is_error() {
                return idx;
            }
            eval_index_expression(left, idx)
        }
        Expression::If(expression) => eval_if_expression(expression, env),
        Expression::For(expression) => eval_for_expression(expression, env),
        Expression::Function(literal) => Value::Function(Rc::new(FunctionValue {
            parameters: literal.parameters.clone(),
            body: literal.body.clone(),
            env: env.clone(),
        })),
        // macro literals are collected before evaluation; a stray one has no value
        Expression::Macro(_) => Value::Null,
        Expression::Call(call) => eval_call_expression(call, env),
    }
}

fn eval_expressions(expressions: &[Expression], env: &Env) -> Result<Vec<Value>, Value> {
    let mut result = Vec::with_capacity(expressions.len());

    for expression in expressions {
        let value = eval_expression(expression, env);
        if value.is_error() {
            return Err(value);
        }
        result.push(value);
    }

    Ok(result)
}

fn eval_call_expression(call: &CallExpression, env: &Env) -> Value {
    // quote is a special form, its argument stays unevaluated
    if call.function.token_literal() == "quote" {
        if call.arguments.len() != 1 {
            return Value::Error(format!(
                "wrong number of arguments. got={}, want=1",
                call.arguments.len()
            ));
        }
        return quote::quote(call.arguments[0].clone(), env);
    }

    let function = eval_expression(&call.function, env);
    if function.is_error() {
        return function;
    }

    let arguments = match eval_expressions(&call.arguments, env) {
        Ok(arguments) => arguments,
        Err(error) => return error,
    };

    apply_function(function, arguments)
}

fn apply_function(function: Value, arguments: Vec<Value>) -> Value {
    match function {
        Value::Function(function) => {
            if arguments.len() != function.parameters.len() {
                return Value::Error(format!(
                    "wrong number of arguments. got={}, want={}",
                    arguments.len(),
                    function.parameters.len()
                ));
            }

            let env = Env::new_enclosed(&function.env);
            for (parameter, argument) in function.parameters.iter().zip(arguments) {
                env.set(&parameter.value, argument);
            }

            unwrap_return_value(eval_block(&function.body, &env))
        }
        Value::Builtin(builtin) => builtin(arguments),
        other => Value::Error(format!("not a function: {}", other.type_name())),
    }
}

fn unwrap_return_value(value: Value) -> Value {
    match value {
        Value::ReturnValue(value) => *value,
        other => other,
    }
}

fn eval_prefix_expression(operator: &str, right: Value) -> Value {
    match operator {
        "!" => Value::Boolean(!is_truthy(&right)),
        "-" => match right {
            Value::Integer(value) => Value::Integer(-value),
            Value::Float(value) => Value::Float(-value),
            other => Value::Error(format!("unknown operator: -{}", other.type_name())),
        },
        _ => Value::Error(format!(
            "unknown operator: {operator}{}",
            right.type_name()
        )),
    }
}

fn eval_infix_expression(operator: &str, left: Value, right: Value) -> Value {
    match (operator, &left, &right) {
        // both sides are always evaluated before we get here
        ("&&", ..) => Value::Boolean(is_truthy(&left) && is_truthy(&right)),
        ("||", ..) => Value::Boolean(is_truthy(&left) || is_truthy(&right)),
        (_, Value::Integer(l), Value::Integer(r)) => {
            eval_integer_infix_expression(operator, *l, *r)
        }
        (_, Value::Float(l), Value::Float(r)) => eval_float_infix_expression(operator, *l, *r),
        (_, Value::String(l), Value::String(r)) => match operator {
            "+" => Value::String(format!("{l}{r}")),
            _ => Value::Null,
        },
        (_, Value::Rune(l), Value::Rune(r)) => eval_rune_infix_expression(operator, *l, *r),
        ("==", ..) => Value::Boolean(values_identical(&left, &right)),
        ("!=", ..) => Value::Boolean(!values_identical(&left, &right)),
        _ if left.type_name() != right.type_name() => Value::Error(format!(
            "type mismatch: {} {} {}",
            left.type_name(),
            operator,
            right.type_name()
        )),
        _ => Value::Error(format!(
            "unknown operator: {} {} {}",
            left.type_name(),
            operator,
            right.type_name()
        )),
    }
}

fn eval_integer_infix_expression(operator: &str, left: i64, right: i64) -> Value {
    match operator {
        "+" => Value::Integer(left + right),
        "-" => Value::Integer(left - right),
        "*" => Value::Integer(left * right),
        "/" => {
            if right == 0 {
                return Value::Error("division by zero".into());
            }
            Value::Integer(left / right)
        }
        "<" => Value::Boolean(left < right),
        ">" => Value::Boolean(left > right),
        "==" => Value::Boolean(left == right),
        "!=" => Value::Boolean(left != right),
        _ => Value::Error(format!("unknown operator: INTEGER {operator} INTEGER")),
    }
}

fn eval_float_infix_expression(operator: &str, left: f64, right: f64) -> Value {
    match operator {
        "+" => Value::Float(left + right),
        "-" => Value::Float(left - right),
        "*" => Value::Float(left * right),
        "/" => Value::Float(left / right),
        "<" => Value::Boolean(left < right),
        ">" => Value::Boolean(left > right),
        "==" => Value::Boolean(left == right),
        "!=" => Value::Boolean(left != right),
        _ => Value::Error(format!("unknown operator: FLOAT {operator} FLOAT")),
    }
}

/// Runes support stepping through the code point space with `+` and `-`;
/// results outside the scalar value range collapse to null.
fn eval_rune_infix_expression(operator: &str, left: char, right: char) -> Value {
    let (left, right) = (left as u32, right as u32);

    let combined = match operator {
        "+" => left.checked_add(right),
        "-" => left.checked_sub(right),
        _ => return Value::Null,
    };

    combined
        .and_then(char::from_u32)
        .map(Value::Rune)
        .unwrap_or(Value::Null)
}

/// Identity comparison for the kinds that fall through the typed dispatch:
/// booleans and null compare by value, aggregates by shared reference,
/// everything else is never identical.
fn values_identical(left: &Value, right: &Value) -> bool {
    match (left, right) {
        (Value::Boolean(l), Value::Boolean(r)) => l == r,
        (Value::Null, Value::Null) => true,
        (Value::Array(l), Value::Array(r)) => Rc::ptr_eq(l, r),
        (Value::Hash(l), Value::Hash(r)) => Rc::ptr_eq(l, r),
        (Value::Function(l), Value::Function(r)) => Rc::ptr_eq(l, r),
        (Value::Builtin(l), Value::Builtin(r)) => l == r,
        _ => false,
    }
}

fn eval_postfix_expression(postfix: &PostfixExpression, env: &Env) -> Value {
    let name = &postfix.token.literal;

    let Some(value) = env.get(name) else {
        return Value::Error(format!("identifier not found: {name}"));
    };

    let step = match postfix.operator.as_str() {
        "++" => 1,
        _ => -1,
    };

    let stepped = match value {
        Value::Integer(value) => Value::Integer(value + step),
        Value::Float(value) => Value::Float(value + step as f64),
        other => {
            return Value::Error(format!(
                "unknown operator: {}{}",
                postfix.operator,
                other.type_name()
            ))
        }
    };

    env.set_on_found(name, stepped.clone());
    stepped
}

fn eval_assign_expression(assign: &AssignExpression, env: &Env) -> Value {
    let value = eval_expression(&assign.value, env);
    if value.is_error() {
        return value;
    }

    match assign.left.as_ref() {
        Expression::Identifier(identifier) => {
            if env.set_on_found(&identifier.value, value) {
                Value::Null
            } else {
                Value::Error(format!("identifier not found: {}", identifier.value))
            }
        }
        Expression::Index(index) => {
            let structure = eval_expression(&index.left, env);
            if structure.is_error() {
                return structure;
            }
            let idx = eval_expression(&index.index, env);
            if idx.is_error() {
                return idx;
            }
            eval_index_assign_expression(structure, idx, value)
        }
        _ => value,
    }
}

fn eval_index_assign_expression(structure: Value, index: Value, value: Value) -> Value {
    match structure {
        Value::Array(elements) => {
            let Value::Integer(idx) = index else {
                return Value::Error("index must be an integer".into());
            };

            let mut elements = elements.borrow_mut();
            if idx < 0 || idx > elements.len() as i64 - 1 {
                return Value::Error("index out of bounds".into());
            }

            elements[idx as usize] = value;
            Value::Null
        }
        Value::Hash(pairs) => {
            let Some(key) = index.hash_key() else {
                return Value::Error(format!(
                    "unusable as hash key: {}",
                    index.type_name()
                ));
            };

            pairs.borrow_mut().insert(key, HashPair { key: index, value });
            Value::Null
        }
        other => Value::Error(format!(
            "index operator not supported: {}",
            other.type_name()
        )),
    }
}

fn eval_index_expression(left: Value, index: Value) -> Value {
    match left {
        Value::Array(elements) => {
            let Value::Integer(idx) = index else {
                return Value::Error("index must be an integer".into());
            };

            let elements = elements.borrow();
            let max = elements.len() as i64 - 1;

            // a negative index counts from the end
            let idx = if idx < 0 { max + idx + 1 } else { idx };

            if idx < 0 || idx > max {
                return Value::Error(format!("index out of range: {idx}"));
            }

            elements[idx as usize].clone()
        }
        Value::Hash(pairs) => {
            let Some(key) = index.hash_key() else {
                return Value::Error(format!(
                    "unusable as hash key: {}",
                    index.type_name()
                ));
            };

            pairs
                .borrow()
                .get(&key)
                .map(|pair| pair.value.clone())
                .unwrap_or(Value::Null)
        }
        other => Value::Error(format!(
            "index operator not supported: {}",
            other.type_name()
        )),
    }
}

fn eval_hash_literal(literal: &HashLiteral, env: &Env) -> Value {
    let mut pairs = HashMap::new();

    for (key_expression, value_expression) in &literal.pairs {
        let key = eval_expression(key_expression, env);
        if key.is_error() {
            return key;
        }

        let Some(hashed) = key.hash_key() else {
            return Value::Error(format!("unusable as hash key: {}", key.type_name()));
        };

        let value = eval_expression(value_expression, env);
        if value.is_error() {
            return value;
        }

        pairs.insert(hashed, HashPair { key, value });
    }

    Value::Hash(Rc::new(RefCell::new(pairs)))
}

/// Both branches run in a fresh enclosed environment; new bindings stay
/// local, writes to already-bound names go through `set_on_found`.
fn eval_if_expression(expression: &IfExpression, env: &Env) -> Value {
    let env = Env::new_enclosed(env);

    let condition = eval_expression(&expression.condition, &env);
    if condition.is_error() {
        return condition;
    }

    if is_truthy(&condition) {
        eval_block(&expression.consequence, &env)
    } else if let Some(alternative) = &expression.alternative {
        eval_block(alternative, &env)
    } else {
        Value::Null
    }
}

fn eval_for_expression(expression: &ForExpression, env: &Env) -> Value {
    let env = Env::new_enclosed(env);

    let init = eval_statement(&expression.init, &env);
    if init.is_error() {
        return init;
    }

    let mut result = Value::Null;

    loop {
        let condition = eval_expression(&expression.condition, &env);
        if condition.is_error() {
            return condition;
        }
        if !is_truthy(&condition) {
            break;
        }

        result = eval_block(&expression.body, &env);
        if matches!(result, Value::ReturnValue(_) | Value::Error(_)) {
            return result;
        }

        let post = eval_expression(&expression.post, &env);
        if post.is_error() {
            return post;
        }
    }

    result
}

/// Null and false are the only falsy values; zero, the empty string and the
/// empty array all count as truthy.
fn is_truthy(value: &Value) -> bool {
    !matches!(value, Value::Null | Value::Boolean(false))
}

#[cfg(test)]
mod tests {
    use crate::lexer::Lexer;
    use crate::parser::Parser;

    use super::*;

    fn run(input: &str) -> Value {
        let mut parser = Parser::new(Lexer::new(input));
        let program = parser.parse_program();
        assert!(
            parser.errors().is_empty(),
            "parser errors for {input:?}: {:?}",
            parser.errors()
        );

        eval_program(&program, &Env::new())
    }

    fn assert_integer(input: &str, expected: i64) {
        assert_eq!(run(input), Value::Integer(expected), "for {input:?}");
    }

    fn assert_error(input: &str, message: &str) {
        assert_eq!(
            run(input),
            Value::Error(message.into()),
            "for {input:?}"
        );
    }

    #[test]
    fn test_integer_expressions() {
        let tests = [
            ("5", 5),
            ("10", 10),
            ("-5", -5),
            ("-10", -10),
            ("5 + 5 + 5 + 5 - 10", 10),
            ("2 * 2 * 2 * 2 * 2", 32),
            ("-50 + 100 + -50", 0),
            ("5 * 2 + 10", 20),
            ("5 + 2 * 10", 25),
            ("20 + 2 * -10", 0),
            ("50 / 2 * 2 + 10", 60),
            ("2 * (5 + 10)", 30),
            ("3 * 3 * 3 + 10", 37),
            ("(5 + 10 * 2 + 15 / 3) * 2 + -10", 50),
        ];

        for (input, expected) in tests {
            assert_integer(input, expected);
        }
    }

    #[test]
    fn test_float_expressions() {
        let tests = [
            ("1.5", Value::Float(1.5)),
            ("1.5 + 2.5", Value::Float(4.0)),
            ("5.0 / 2.0", Value::Float(2.5)),
            ("-1.5", Value::Float(-1.5)),
            ("1.5 < 2.5", Value::Boolean(true)),
            ("1.5 == 1.5", Value::Boolean(true)),
        ];

        for (input, expected) in tests {
            assert_eq!(run(input), expected, "for {input:?}");
        }
    }

    #[test]
    fn test_boolean_expressions() {
        let tests = [
            ("true", true),
            ("false", false),
            ("1 < 2", true),
            ("1 > 2", false),
            ("1 == 1", true),
            ("1 != 1", false),
            ("1 == 2", false),
            ("1 != 2", true),
            ("true == true", true),
            ("false == false", true),
            ("true == false", false),
            ("true != false", true),
            ("(1 < 2) == true", true),
            ("(1 < 2) == false", false),
        ];

        for (input, expected) in tests {
            assert_eq!(run(input), Value::Boolean(expected), "for {input:?}");
        }
    }

    #[test]
    fn test_logical_operators_use_truthiness() {
        let tests = [
            ("true && true", true),
            ("true && false", false),
            ("false || true", true),
            ("false || false", false),
            ("1 && 2", true),
            ("0 && 1", true),
            (r#""" || false"#, true),
        ];

        for (input, expected) in tests {
            assert_eq!(run(input), Value::Boolean(expected), "for {input:?}");
        }
    }

    #[test]
    fn test_logical_operators_do_not_short_circuit() {
        // the right side always runs, so its error surfaces first
        assert_error("false && missing", "identifier not found: missing");
        assert_error("true || missing", "identifier not found: missing");
    }

    #[test]
    fn test_bang_operator() {
        let tests = [
            ("!true", false),
            ("!false", true),
            ("!5", false),
            ("!!true", true),
            ("!!false", false),
            ("!!5", true),
        ];

        for (input, expected) in tests {
            assert_eq!(run(input), Value::Boolean(expected), "for {input:?}");
        }
    }

    #[test]
    fn test_string_expressions() {
        assert_eq!(
            run(r#""Hello" + " " + "World!""#),
            Value::String("Hello World!".into())
        );
        // only concatenation is defined on strings
        assert_eq!(run(r#""Hello" - "World""#), Value::Null);
        assert_eq!(run(r#""a" == "a""#), Value::Null);
    }

    #[test]
    fn test_rune_expressions() {
        assert_eq!(run("'a'"), Value::Rune('a'));
        assert_eq!(run("'a' + 'a'"), Value::Rune('Â'));
        assert_eq!(run("'b' - 'a'"), Value::Rune('\u{1}'));
    }

    #[test]
    fn test_if_else_expressions() {
        let tests = [
            ("if (true) { 10 }", Value::Integer(10)),
            ("if (false) { 10 }", Value::Null),
            ("if (1) { 10 }", Value::Integer(10)),
            ("if (1 < 2) { 10 }", Value::Integer(10)),
            ("if (1 > 2) { 10 }", Value::Null),
            ("if (1 > 2) { 10 } else { 20 }", Value::Integer(20)),
            ("if (1 < 2) { 10 } else { 20 }", Value::Integer(10)),
            // zero is truthy
            ("if (0) { 10 } else { 20 }", Value::Integer(10)),
        ];

        for (input, expected) in tests {
            assert_eq!(run(input), expected, "for {input:?}");
        }
    }

    #[test]
    fn test_if_branches_get_their_own_scope() {
        // a let inside the branch stays local
        assert_eq!(run("let x = 1; if (true) { let y = 2; }; y"),
            Value::Error("identifier not found: y".into()));
        // but assignment reaches already-bound outer names
        assert_integer("let x = 1; if (true) { x = 2; }; x", 2);
    }

    #[test]
    fn test_return_statements() {
        let tests = [
            ("return 10;", 10),
            ("return 10; 9;", 10),
            ("return 2 * 5; 9;", 10),
            ("9; return 2 * 5; 9;", 10),
            (
                "if (10 > 1) {
                    if (10 > 1) {
                        return 10;
                    }
                    return 1;
                }",
                10,
            ),
        ];

        for (input, expected) in tests {
            assert_integer(input, expected);
        }

        assert_eq!(run("return;"), Value::Null);
    }

    #[test]
    fn test_error_handling() {
        let tests = [
            ("5 + true;", "type mismatch: INTEGER + BOOLEAN"),
            ("5 + true; 5;", "type mismatch: INTEGER + BOOLEAN"),
            ("-true", "unknown operator: -BOOLEAN"),
            ("true + false;", "unknown operator: BOOLEAN + BOOLEAN"),
            ("5; true + false; 5", "unknown operator: BOOLEAN + BOOLEAN"),
            (
                "if (10 > 1) { true + false; }",
                "unknown operator: BOOLEAN + BOOLEAN",
            ),
            ("foobar", "identifier not found: foobar"),
            ("5 / 0", "division by zero"),
            (
                r#"{"name": "Slang"}[fn(x) { x }];"#,
                "unusable as hash key: FUNCTION",
            ),
            (
                r#"let x = 1; x = x + "a"; x;"#,
                "type mismatch: INTEGER + STRING",
            ),
            ("x = 1;", "identifier not found: x"),
            ("5()", "not a function: INTEGER"),
        ];

        for (input, expected) in tests {
            assert_error(input, expected);
        }
    }

    #[test]
    fn test_let_statements() {
        let tests = [
            ("let a = 5; a;", 5),
            ("let a = 5 * 5; a;", 25),
            ("let a = 5; let b = a; b;", 5),
            ("let a = 5; let b = a; let c = a + b + 5; c;", 15),
        ];

        for (input, expected) in tests {
            assert_integer(input, expected);
        }
    }

    #[test]
    fn test_assign_expressions() {
        assert_integer("let a = 5; a = 10; a;", 10);
        assert_integer("let a = 5; let add = fn() { a = a + 1; }; add(); add(); a;", 7);
        // assignment itself evaluates to null
        assert_eq!(run("let a = 5; a = 10;"), Value::Null);
    }

    #[test]
    fn test_function_values() {
        let Value::Function(function) = run("fn(x) { x + 2; };") else {
            panic!("expected function value");
        };
        assert_eq!(function.parameters.len(), 1);
        assert_eq!(function.parameters[0].value, "x");
        assert_eq!(function.body.to_string(), "{ (x + 2); }");
    }

    #[test]
    fn test_function_application() {
        let tests = [
            ("let identity = fn(x) { x; }; identity(5);", 5),
            ("let identity = fn(x) { return x; }; identity(5);", 5),
            ("let double = fn(x) { x * 2; }; double(5);", 10),
            ("let add = fn(x, y) { x + y; }; add(5, 5);", 10),
            ("let add = fn(x, y) { x + y; }; add(5 + 5, add(5, 5));", 20),
            ("fn(x) { x; }(5)", 5),
        ];

        for (input, expected) in tests {
            assert_integer(input, expected);
        }
    }

    #[test]
    fn test_function_arity_is_checked() {
        assert_error(
            "let add = fn(x, y) { x + y; }; add(1);",
            "wrong number of arguments. got=1, want=2",
        );
        assert_error(
            "fn() { 1 }(2, 3)",
            "wrong number of arguments. got=2, want=0",
        );
    }

    #[test]
    fn test_closures() {
        assert_integer(
            "let newAdder = fn(x) { fn(y) { x + y }; };
             let addTwo = newAdder(2);
             addTwo(2);",
            4,
        );
    }

    #[test]
    fn test_closures_share_their_captured_environment() {
        assert_integer(
            "let counter = fn() {
                 let count = 0;
                 fn() { count = count + 1; count; };
             };
             let tick = counter();
             tick(); tick(); tick();",
            3,
        );
    }

    #[test]
    fn test_recursion() {
        assert_integer(
            "let fib = fn(n) {
                 if (n < 2) { return n; }
                 fib(n - 1) + fib(n - 2);
             };
             fib(10);",
            55,
        );
    }

    #[test]
    fn test_postfix_expressions() {
        assert_integer("let i = 0; i++;", 1);
        assert_integer("let i = 0; i++; i;", 1);
        assert_integer("let i = 5; i--; i--; i;", 3);
        assert_eq!(run("let f = 1.5; f++; f;"), Value::Float(2.5));
        assert_error("i++;", "identifier not found: i");
        assert_error(r#"let s = "a"; s++;"#, "unknown operator: ++STRING");
    }

    #[test]
    fn test_for_expressions() {
        assert_integer(
            "let s = 0; for (let i = 0; i < 5; i++) { s = s + i; } s;",
            10,
        );
        // the loop value is the last body value
        assert_integer("for (let i = 0; i < 3; i++) { i * 10; }", 20);
        // a body that never runs yields null
        assert_eq!(run("for (let i = 0; i < 0; i++) { i; }"), Value::Null);
        // return propagates out of the loop
        assert_integer(
            "let find = fn() {
                 for (let i = 0; i < 10; i++) {
                     if (i == 3) { return i; }
                 }
             };
             find();",
            3,
        );
        // the loop variable stays local
        assert_error(
            "for (let i = 0; i < 3; i++) { i; } i;",
            "identifier not found: i",
        );
    }

    #[test]
    fn test_array_literals() {
        let Value::Array(elements) = run("[1, 2 * 2, 3 + 3]") else {
            panic!("expected array");
        };
        let elements = elements.borrow();
        assert_eq!(elements.len(), 3);
        assert_eq!(elements[0], Value::Integer(1));
        assert_eq!(elements[1], Value::Integer(4));
        assert_eq!(elements[2], Value::Integer(6));
    }

    #[test]
    fn test_array_index_expressions() {
        let tests = [
            ("[1, 2, 3][0]", Value::Integer(1)),
            ("[1, 2, 3][1]", Value::Integer(2)),
            ("[1, 2, 3][2]", Value::Integer(3)),
            ("let i = 0; [1][i];", Value::Integer(1)),
            ("[1, 2, 3][1 + 1];", Value::Integer(3)),
            ("let myArray = [1, 2, 3]; myArray[2];", Value::Integer(3)),
            // negative indices count from the end
            ("[1, 2, 3][-1]", Value::Integer(3)),
            ("[1, 2, 3][-3]", Value::Integer(1)),
            ("[1, 2, 3][3]", Value::Error("index out of range: 3".into())),
            ("[1, 2, 3][-4]", Value::Error("index out of range: -1".into())),
            (
                r#"[1, 2, 3]["1"]"#,
                Value::Error("index must be an integer".into()),
            ),
        ];

        for (input, expected) in tests {
            assert_eq!(run(input), expected, "for {input:?}");
        }
    }

    #[test]
    fn test_array_index_assignment() {
        assert_integer("let xs = [1, 2, 3]; xs[1] = 20; xs[1];", 20);
        assert_error(
            "let xs = [1, 2, 3]; xs[3] = 4;",
            "index out of bounds",
        );
        assert_error(
            "let xs = [1, 2, 3]; xs[-1] = 4;",
            "index out of bounds",
        );
        assert_error(
            r#"let xs = [1]; xs["0"] = 4;"#,
            "index must be an integer",
        );
    }

    #[test]
    fn test_arrays_are_shared_references() {
        assert_integer(
            "let xs = [1];
             let ys = xs;
             push(ys, 2);
             len(xs);",
            2,
        );
    }

    #[test]
    fn test_hash_literals() {
        let Value::Hash(pairs) = run(
            r#"let two = "two";
               {
                   "one": 10 - 9,
                   two: 1 + 1,
                   "thr" + "ee": 6 / 2,
                   4: 4,
                   true: 5,
                   false: 6
               }"#,
        ) else {
            panic!("expected hash");
        };

        let pairs = pairs.borrow();
        assert_eq!(pairs.len(), 6);

        let expected = [
            (Value::String("one".into()), 1),
            (Value::String("two".into()), 2),
            (Value::String("three".into()), 3),
            (Value::Integer(4), 4),
            (Value::Boolean(true), 5),
            (Value::Boolean(false), 6),
        ];

        for (key, value) in expected {
            let hashed = key.hash_key().expect("hashable key");
            assert_eq!(pairs[&hashed].value, Value::Integer(value));
        }
    }

    #[test]
    fn test_hash_index_expressions() {
        let tests = [
            (r#"{"foo": 5}["foo"]"#, Value::Integer(5)),
            (r#"{"foo": 5}["bar"]"#, Value::Null),
            (r#"let key = "foo"; {"foo": 5}[key]"#, Value::Integer(5)),
            (r#"{}["foo"]"#, Value::Null),
            ("{5: 5}[5]", Value::Integer(5)),
            ("{true: 5}[true]", Value::Integer(5)),
            ("{false: 5}[false]", Value::Integer(5)),
            ("{1.5: 5}[1.5]", Value::Integer(5)),
        ];

        for (input, expected) in tests {
            assert_eq!(run(input), expected, "for {input:?}");
        }
    }

    #[test]
    fn test_hash_index_assignment() {
        assert_integer(
            r#"let h = {"a": 1}; h["a"] = h["a"] + 10; h["a"];"#,
            11,
        );
        assert_integer(r#"let h = {}; h["new"] = 7; h["new"];"#, 7);
        assert_error(
            r#"let h = {}; h[[1]] = 1;"#,
            "unusable as hash key: ARRAY",
        );
    }

    #[test]
    fn test_index_on_unsupported_receiver() {
        assert_error("5[0]", "index operator not supported: INTEGER");
        assert_error(r#""str"[0]"#, "index operator not supported: STRING");
    }

    #[test]
    fn test_cross_kind_equality_is_identity() {
        let tests = [
            ("1 == 1.0", false),
            ("1 != 1.0", true),
            (r#"'a' == "a""#, false),
            ("[1] == [1]", false),
            ("[1] != [1]", true),
            ("let xs = [1]; xs == xs", true),
            ("let h = {}; h == h", true),
        ];

        for (input, expected) in tests {
            assert_eq!(run(input), Value::Boolean(expected), "for {input:?}");
        }
    }

    #[test]
    fn test_cross_kind_arithmetic_is_a_type_mismatch() {
        assert_error("5 + true", "type mismatch: INTEGER + BOOLEAN");
        assert_error(r#"1 + "a""#, "type mismatch: INTEGER + STRING");
        assert_error("1 + 1.5", "type mismatch: INTEGER + FLOAT");
        // runes only define + and -, anything else falls through to null
        assert_eq!(run("'a' * 'b'"), Value::Null);
    }

    #[test]
    fn test_builtin_functions() {
        let tests = [
            (r#"len("")"#, Value::Integer(0)),
            (r#"len("four")"#, Value::Integer(4)),
            (r#"len([1, 2, 3])"#, Value::Integer(3)),
            (
                "len(1)",
                Value::Error("argument to `len` not supported, got INTEGER".into()),
            ),
            (
                r#"len("one", "two")"#,
                Value::Error("wrong number of arguments. got=2, want=1".into()),
            ),
            ("let xs = [1, 2]; push(xs, 3); xs[-1];", Value::Integer(3)),
            ("let xs = [1, 2]; pop(xs); len(xs);", Value::Integer(1)),
            ("first([7, 8, 9])", Value::Integer(7)),
            ("let xs = [1, 2, 3]; len(rest(xs));", Value::Integer(2)),
            ("let xs = [1, 2, 3]; rest(xs); len(xs);", Value::Integer(3)),
            (
                "let xs = [1]; push(xs, xs);",
                Value::Error("argument to `push` cannot be the same array".into()),
            ),
        ];

        for (input, expected) in tests {
            assert_eq!(run(input), expected, "for {input:?}");
        }
    }

    #[test]
    fn test_builtins_can_be_shadowed() {
        assert_integer("let len = fn(x) { 42 }; len([]);", 42);
    }

    #[test]
    fn test_evaluation_is_deterministic() {
        let input = "let xs = [1, 2, 3]; let s = 0;
                     for (let i = 0; i < len(xs); i++) { s = s + xs[i]; }
                     s;";
        let first = run(input);
        let second = run(input);
        assert_eq!(first, Value::Integer(6));
        assert_eq!(first, second);
    }
}
