use std::collections::HashMap;
use std::rc::Rc;

use once_cell::sync::Lazy;
use unescape::unescape;

use super::object::{BuiltinFn, Value};

static BUILTINS: Lazy<HashMap<&'static str, BuiltinFn>> = Lazy::new(|| {
    let mut m: HashMap<&'static str, BuiltinFn> = HashMap::new();

    m.insert("len", bt_len);
    m.insert("print", bt_print);
    m.insert("printf", bt_printf);
    m.insert("push", bt_push);
    m.insert("pop", bt_pop);
    m.insert("first", bt_first);
    m.insert("rest", bt_rest);

    m
});

pub fn lookup(name: &str) -> Option<Value> {
    BUILTINS.get(name).map(|builtin| Value::Builtin(*builtin))
}

fn wrong_arguments(got: usize, want: usize) -> Value {
    Value::Error(format!(
        "wrong number of arguments. got={got}, want={want}"
    ))
}

fn bt_len(args: Vec<Value>) -> Value {
    if args.len() != 1 {
        return wrong_arguments(args.len(), 1);
    }

    match &args[0] {
        Value::String(value) => Value::Integer(value.len() as i64),
        Value::Array(elements) => Value::Integer(elements.borrow().len() as i64),
        other => Value::Error(format!(
            "argument to `len` not supported, got {}",
            other.type_name()
        )),
    }
}

fn bt_print(args: Vec<Value>) -> Value {
    let mut out = String::new();

    for arg in &args {
        out.push_str(&arg.to_string());
        out.push(' ');
    }

    println!("{out}");

    Value::Null
}

fn bt_printf(args: Vec<Value>) -> Value {
    if args.is_empty() {
        return wrong_arguments(0, 1);
    }

    let Value::String(format) = &args[0] else {
        return Value::Error(format!(
            "argument to `printf` not supported, got {}",
            args[0].type_name()
        ));
    };

    for arg in &args[1..] {
        match arg {
            Value::Integer(_)
            | Value::Float(_)
            | Value::String(_)
            | Value::Rune(_)
            | Value::Boolean(_) => {}
            other => {
                return Value::Error(format!(
                    "argument to `printf` not supported, got {}",
                    other.type_name()
                ))
            }
        }
    }

    let format = unescape(format).unwrap_or_else(|| format.clone());
    println!("{}", apply_format(&format, &args[1..]));

    Value::Null
}

/// Substitutes `%d`/`%f`/`%s`/`%c`/`%t` positionally; `%%` is a literal
/// percent sign. Leftover verbs stay in place once the arguments run out.
fn apply_format(format: &str, args: &[Value]) -> String {
    let mut out = String::new();
    let mut args = args.iter();
    let mut chars = format.chars();

    while let Some(ch) = chars.next() {
        if ch != '%' {
            out.push(ch);
            continue;
        }

        match chars.next() {
            Some('%') => out.push('%'),
            Some(verb @ ('d' | 'f' | 's' | 'c' | 't')) => match args.next() {
                Some(arg) => out.push_str(&render_verb(verb, arg)),
                None => {
                    out.push('%');
                    out.push(verb);
                }
            },
            Some(other) => {
                out.push('%');
                out.push(other);
            }
            None => out.push('%'),
        }
    }

    out
}

fn render_verb(verb: char, arg: &Value) -> String {
    match (verb, arg) {
        ('f', Value::Float(value)) => format!("{value:.6}"),
        _ => arg.to_string(),
    }
}

fn bt_push(args: Vec<Value>) -> Value {
    if args.len() != 2 {
        return wrong_arguments(args.len(), 2);
    }

    let Value::Array(elements) = &args[0] else {
        return Value::Error(format!(
            "argument to `push` not supported, got {}",
            args[0].type_name()
        ));
    };

    if let Value::Array(other) = &args[1] {
        if Rc::ptr_eq(elements, other) {
            return Value::Error("argument to `push` cannot be the same array".into());
        }
    }

    elements.borrow_mut().push(args[1].clone());

    Value::Null
}

fn bt_pop(args: Vec<Value>) -> Value {
    if args.len() != 1 {
        return wrong_arguments(args.len(), 1);
    }

    let Value::Array(elements) = &args[0] else {
        return Value::Error(format!(
            "argument to `pop` not supported, got {}",
            args[0].type_name()
        ));
    };

    elements.borrow_mut().pop().unwrap_or(Value::Null)
}

fn bt_first(args: Vec<Value>) -> Value {
    if args.len() != 1 {
        return wrong_arguments(args.len(), 1);
    }

    let Value::Array(elements) = &args[0] else {
        return Value::Error(format!(
            "argument to `first` not supported, got {}",
            args[0].type_name()
        ));
    };

    let elements = elements.borrow();
    elements.first().cloned().unwrap_or(Value::Null)
}

fn bt_rest(args: Vec<Value>) -> Value {
    if args.len() != 1 {
        return wrong_arguments(args.len(), 1);
    }

    let Value::Array(elements) = &args[0] else {
        return Value::Error(format!(
            "argument to `rest` not supported, got {}",
            args[0].type_name()
        ));
    };

    let elements = elements.borrow();
    if elements.is_empty() {
        return Value::Null;
    }

    Value::Array(Rc::new(std::cell::RefCell::new(
        elements[1..].to_vec(),
    )))
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;

    fn array(elements: Vec<Value>) -> Value {
        Value::Array(Rc::new(RefCell::new(elements)))
    }

    #[test]
    fn test_len() {
        assert_eq!(bt_len(vec![Value::String("".into())]), Value::Integer(0));
        assert_eq!(
            bt_len(vec![Value::String("hello world".into())]),
            Value::Integer(11)
        );
        assert_eq!(
            bt_len(vec![array(vec![Value::Integer(1), Value::Integer(2)])]),
            Value::Integer(2)
        );
        assert_eq!(
            bt_len(vec![Value::Integer(1)]),
            Value::Error("argument to `len` not supported, got INTEGER".into())
        );
        assert_eq!(
            bt_len(vec![]),
            Value::Error("wrong number of arguments. got=0, want=1".into())
        );
    }

    #[test]
    fn test_push_mutates_in_place() {
        let xs = array(vec![Value::Integer(1)]);
        assert_eq!(bt_push(vec![xs.clone(), Value::Integer(2)]), Value::Null);
        assert_eq!(bt_len(vec![xs]), Value::Integer(2));
    }

    #[test]
    fn test_push_rejects_self() {
        let xs = array(vec![]);
        assert_eq!(
            bt_push(vec![xs.clone(), xs]),
            Value::Error("argument to `push` cannot be the same array".into())
        );
    }

    #[test]
    fn test_pop() {
        let xs = array(vec![Value::Integer(1), Value::Integer(2)]);
        assert_eq!(bt_pop(vec![xs.clone()]), Value::Integer(2));
        assert_eq!(bt_pop(vec![xs.clone()]), Value::Integer(1));
        assert_eq!(bt_pop(vec![xs]), Value::Null);
    }

    #[test]
    fn test_first_and_rest() {
        let xs = array(vec![Value::Integer(1), Value::Integer(2), Value::Integer(3)]);

        assert_eq!(bt_first(vec![xs.clone()]), Value::Integer(1));

        let rest = bt_rest(vec![xs.clone()]);
        let Value::Array(elements) = &rest else {
            panic!("expected array");
        };
        assert_eq!(elements.borrow().len(), 2);
        assert_eq!(elements.borrow()[0], Value::Integer(2));

        // rest returns a fresh array, the original is untouched
        assert_eq!(bt_len(vec![xs]), Value::Integer(3));

        assert_eq!(bt_first(vec![array(vec![])]), Value::Null);
        assert_eq!(bt_rest(vec![array(vec![])]), Value::Null);
    }

    #[test]
    fn test_apply_format() {
        assert_eq!(
            apply_format("%d-%s-%t-%c", &[
                Value::Integer(42),
                Value::String("x".into()),
                Value::Boolean(true),
                Value::Rune('y'),
            ]),
            "42-x-true-y"
        );
        assert_eq!(
            apply_format("%f", &[Value::Float(1.5)]),
            "1.500000"
        );
        assert_eq!(apply_format("100%%", &[]), "100%");
        assert_eq!(apply_format("%d %d", &[Value::Integer(1)]), "1 %d");
    }
}
