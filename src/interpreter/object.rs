use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt::{self, Display};
use std::hash::Hasher;
use std::rc::Rc;

use fnv::FnvHasher;

use crate::parser::ast::{BlockStatement, Expression, Identifier};

use super::environment::Env;

pub type BuiltinFn = fn(Vec<Value>) -> Value;

/// Runtime values. Arrays, hashes and functions are shared references with
/// interior mutability; everything else is copied freely. `ReturnValue` and
/// `Error` are in-band control-flow wrappers that block and program
/// evaluation peel off; they never reach user code.
#[derive(Debug, Clone)]
pub enum Value {
    Integer(i64),
    Float(f64),
    String(String),
    Rune(char),
    Boolean(bool),
    Null,
    Array(Rc<RefCell<Vec<Value>>>),
    Hash(Rc<RefCell<HashMap<HashKey, HashPair>>>),
    Function(Rc<FunctionValue>),
    Macro(Rc<MacroValue>),
    Builtin(BuiltinFn),
    Quote(Box<Expression>),
    ReturnValue(Box<Value>),
    Error(String),
}

#[derive(Debug)]
pub struct FunctionValue {
    pub parameters: Vec<Identifier>,
    pub body: BlockStatement,
    pub env: Env,
}

#[derive(Debug)]
pub struct MacroValue {
    pub parameters: Vec<Identifier>,
    pub body: BlockStatement,
    pub env: Env,
}

#[derive(Debug, Clone)]
pub struct HashPair {
    pub key: Value,
    pub value: Value,
}

/// A hashable key: the value kind plus a 64-bit digest. Only integers,
/// floats, booleans and strings are hashable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HashKey {
    pub kind: &'static str,
    pub value: u64,
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Integer(_) => "INTEGER",
            Value::Float(_) => "FLOAT",
            Value::String(_) => "STRING",
            Value::Rune(_) => "RUNE",
            Value::Boolean(_) => "BOOLEAN",
            Value::Null => "NULL",
            Value::Array(_) => "ARRAY",
            Value::Hash(_) => "HASH",
            Value::Function(_) => "FUNCTION",
            Value::Macro(_) => "MACRO",
            Value::Builtin(_) => "BUILTIN",
            Value::Quote(_) => "QUOTE",
            Value::ReturnValue(_) => "RETURN_VALUE",
            Value::Error(_) => "ERROR",
        }
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Value::Error(_))
    }

    /// The digest for use as a hash key, or `None` for unhashable kinds.
    /// The float digest truncates toward zero (NaN comes out as 0), which
    /// mirrors the reference behavior.
    pub fn hash_key(&self) -> Option<HashKey> {
        let digest = match self {
            Value::Integer(value) => *value as u64,
            Value::Float(value) => *value as u64,
            Value::Boolean(value) => *value as u64,
            Value::String(value) => {
                let mut hasher = FnvHasher::default();
                hasher.write(value.as_bytes());
                hasher.finish()
            }
            _ => return None,
        };

        Some(HashKey {
            kind: self.type_name(),
            value: digest,
        })
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Integer(value) => write!(f, "{value}"),
            Value::Float(value) => write!(f, "{value:.6}"),
            Value::String(value) => f.write_str(value),
            Value::Rune(value) => write!(f, "{value}"),
            Value::Boolean(value) => write!(f, "{value}"),
            Value::Null => f.write_str("null"),
            Value::Array(elements) => {
                let elements = elements
                    .borrow()
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>();
                write!(f, "[{}]", elements.join(", "))
            }
            Value::Hash(pairs) => {
                let pairs = pairs
                    .borrow()
                    .values()
                    .map(|pair| format!("{}: {}", pair.key, pair.value))
                    .collect::<Vec<_>>();
                write!(f, "{{{}}}", pairs.join(", "))
            }
            Value::Function(function) => {
                let parameters = function
                    .parameters
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>();
                write!(f, "fn({}) {}", parameters.join(", "), function.body)
            }
            Value::Macro(makro) => {
                let parameters = makro
                    .parameters
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>();
                write!(f, "magic({}) {}", parameters.join(", "), makro.body)
            }
            Value::Builtin(_) => f.write_str("builtin function"),
            Value::Quote(node) => write!(f, "QUOTE({node})"),
            Value::ReturnValue(value) => value.fmt(f),
            Value::Error(message) => write!(f, "ERROR: {message}"),
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Integer(left), Value::Integer(right)) => left == right,
            (Value::Float(left), Value::Float(right)) => left == right,
            (Value::String(left), Value::String(right)) => left == right,
            (Value::Rune(left), Value::Rune(right)) => left == right,
            (Value::Boolean(left), Value::Boolean(right)) => left == right,
            (Value::Null, Value::Null) => true,
            (Value::Array(left), Value::Array(right)) => Rc::ptr_eq(left, right),
            (Value::Hash(left), Value::Hash(right)) => Rc::ptr_eq(left, right),
            (Value::Function(left), Value::Function(right)) => Rc::ptr_eq(left, right),
            (Value::Macro(left), Value::Macro(right)) => Rc::ptr_eq(left, right),
            (Value::Builtin(left), Value::Builtin(right)) => left == right,
            (Value::Quote(left), Value::Quote(right)) => left == right,
            (Value::ReturnValue(left), Value::ReturnValue(right)) => left == right,
            (Value::Error(left), Value::Error(right)) => left == right,
            _ => false,
        }
    }
}
