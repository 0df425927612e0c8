//! Runtime values and environments.
//!
//! [`Object`] is the single value type the evaluator produces. Two variants
//! are internal plumbing rather than user-visible values: `ReturnValue`
//! wraps a value unwinding out of nested blocks toward the enclosing
//! function, and `Error` carries a runtime error message; both are
//! unwrapped or stopped at statement boundaries and never end up inside
//! composite values.
//!
//! Environments form a tree shared by closures: a frame owns its bindings
//! behind a `RefCell` and holds an `Rc` to its outer frame. Lookup walks
//! outward, binding always writes to the innermost frame, and the graph is
//! acyclic because a child's outer frame always exists first.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::ast::{BlockStatement, Expression};
use crate::builtins::BuiltinDef;

#[derive(Clone)]
pub enum Object {
    Integer(i64),
    Boolean(bool),
    Str(String),
    Null,
    /// Unwind marker for `return`; unwrapped at function and program
    /// boundaries, passed through block boundaries unchanged
    ReturnValue(Box<Object>),
    /// A runtime error propagating outward; never caught by the language
    Error(String),
    Function {
        parameters: Vec<String>,
        body: BlockStatement,
        env: Rc<Environment>,
    },
    Builtin(&'static BuiltinDef),
    Array(Vec<Object>),
    Hash(HashMap<HashKey, HashPair>),
    /// An unevaluated AST node produced by `quote`
    Quote(Expression),
    Macro {
        parameters: Vec<String>,
        body: BlockStatement,
        env: Rc<Environment>,
    },
}

/// A hashable key: the value's type tag plus a 64-bit hash. Equal keys
/// have equal tags and equal hashes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HashKey {
    pub kind: &'static str,
    pub value: u64,
}

/// A hash entry retaining the original key object for inspection.
#[derive(Debug, Clone, PartialEq)]
pub struct HashPair {
    pub key: Object,
    pub value: Object,
}

/// FNV-1a over a byte string. Fixed so equal strings always hash equal
/// within and across runs.
fn fnv1a(bytes: &[u8]) -> u64 {
    let mut hash: u64 = 0xcbf29ce484222325;
    for byte in bytes {
        hash ^= u64::from(*byte);
        hash = hash.wrapping_mul(0x100000001b3);
    }
    hash
}

impl Object {
    /// The type tag used in error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Object::Integer(_) => "INTEGER",
            Object::Boolean(_) => "BOOLEAN",
            Object::Str(_) => "STRING",
            Object::Null => "NULL",
            Object::ReturnValue(_) => "RETURN_VALUE",
            Object::Error(_) => "ERROR",
            Object::Function { .. } => "FUNCTION",
            Object::Builtin(_) => "BUILTIN",
            Object::Array(_) => "ARRAY",
            Object::Hash(_) => "HASH",
            Object::Quote(_) => "QUOTE",
            Object::Macro { .. } => "MACRO",
        }
    }

    /// `Null` and `false` are falsy; every other value is truthy,
    /// including `0` and `""`.
    pub fn is_truthy(&self) -> bool {
        !matches!(self, Object::Null | Object::Boolean(false))
    }

    pub fn is_error(&self) -> bool {
        matches!(self, Object::Error(_))
    }

    /// The 64-bit hash key for values usable as hash keys: integers,
    /// booleans and strings. `None` for everything else.
    pub fn hash_key(&self) -> Option<HashKey> {
        let value = match self {
            Object::Integer(n) => *n as u64,
            Object::Boolean(b) => u64::from(*b),
            Object::Str(s) => fnv1a(s.as_bytes()),
            _ => return None,
        };
        Some(HashKey {
            kind: self.type_name(),
            value,
        })
    }
}

// Manual Debug: a closure's environment can transitively contain the
// closure itself, so the captured env is elided.
impl fmt::Debug for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Object::Integer(n) => write!(f, "Integer({n})"),
            Object::Boolean(b) => write!(f, "Boolean({b})"),
            Object::Str(s) => write!(f, "Str({s:?})"),
            Object::Null => write!(f, "Null"),
            Object::ReturnValue(value) => write!(f, "ReturnValue({value:?})"),
            Object::Error(message) => write!(f, "Error({message:?})"),
            Object::Function {
                parameters, body, ..
            } => write!(f, "Function(params={parameters:?}, body={body})"),
            Object::Builtin(def) => write!(f, "Builtin({})", def.name),
            Object::Array(elements) => write!(f, "Array({elements:?})"),
            Object::Hash(pairs) => write!(f, "Hash({pairs:?})"),
            Object::Quote(node) => write!(f, "Quote({node})"),
            Object::Macro {
                parameters, body, ..
            } => write!(f, "Macro(params={parameters:?}, body={body})"),
        }
    }
}

impl PartialEq for Object {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Object::Integer(a), Object::Integer(b)) => a == b,
            (Object::Boolean(a), Object::Boolean(b)) => a == b,
            (Object::Str(a), Object::Str(b)) => a == b,
            (Object::Null, Object::Null) => true,
            (Object::ReturnValue(a), Object::ReturnValue(b)) => a == b,
            (Object::Error(a), Object::Error(b)) => a == b,
            (Object::Builtin(a), Object::Builtin(b)) => std::ptr::eq(*a, *b),
            (Object::Array(a), Object::Array(b)) => a == b,
            (Object::Hash(a), Object::Hash(b)) => a == b,
            (Object::Quote(a), Object::Quote(b)) => a == b,
            // Functions and macros compare by identity, which value
            // equality cannot observe
            _ => false,
        }
    }
}

impl fmt::Display for Object {
    /// The inspect string shown to users.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Object::Integer(n) => write!(f, "{n}"),
            Object::Boolean(b) => write!(f, "{b}"),
            Object::Str(s) => write!(f, "{s}"),
            Object::Null => write!(f, "null"),
            Object::ReturnValue(value) => write!(f, "{value}"),
            Object::Error(message) => write!(f, "ERROR: {message}"),
            Object::Function {
                parameters, body, ..
            } => write!(f, "fn({}) {body}", parameters.join(", ")),
            Object::Builtin(_) => write!(f, "builtin function"),
            Object::Array(elements) => {
                let elements = elements
                    .iter()
                    .map(|element| element.to_string())
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "[{elements}]")
            }
            Object::Hash(pairs) => {
                let pairs = pairs
                    .values()
                    .map(|pair| format!("{}: {}", pair.key, pair.value))
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "{{{pairs}}}")
            }
            Object::Quote(node) => write!(f, "QUOTE({node})"),
            Object::Macro {
                parameters, body, ..
            } => write!(f, "macro({}) {body}", parameters.join(", ")),
        }
    }
}

/// A single binding frame with an optional link to its enclosing frame.
#[derive(Debug, Default)]
pub struct Environment {
    bindings: RefCell<HashMap<String, Object>>,
    outer: Option<Rc<Environment>>,
}

impl Environment {
    pub fn new() -> Rc<Self> {
        Rc::new(Environment::default())
    }

    /// A child frame sharing `outer`; used for function calls and macro
    /// expansion.
    pub fn new_enclosed(outer: Rc<Environment>) -> Rc<Self> {
        Rc::new(Environment {
            bindings: RefCell::new(HashMap::new()),
            outer: Some(outer),
        })
    }

    /// Look a name up in this frame, then outward through the chain.
    pub fn get(&self, name: &str) -> Option<Object> {
        if let Some(value) = self.bindings.borrow().get(name) {
            return Some(value.clone());
        }
        self.outer.as_ref().and_then(|outer| outer.get(name))
    }

    /// Bind a name in this frame. Never touches outer frames.
    pub fn set(&self, name: impl Into<String>, value: Object) {
        self.bindings.borrow_mut().insert(name.into(), value);
    }
}
