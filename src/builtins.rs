//! Built-in functions registry.
//!
//! Builtins live in a single static registry and are resolved by the
//! evaluator whenever an identifier is not found in the environment chain.
//! Each entry carries its name, its arity, and the implementation; arity is
//! validated before the implementation runs, so the functions themselves
//! only deal with argument types.
//!
//! All failures are ordinary `Object::Error` values; builtins never panic.

use std::collections::HashMap;
use std::sync::LazyLock;

use crate::object::Object;

/// The canonical builtin signature: evaluated arguments in, object out.
pub type BuiltinFn = fn(&[Object]) -> Object;

/// Expected number of arguments for a builtin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    /// Exactly n arguments
    Exact(usize),
    /// Any number of arguments
    Any,
}

impl Arity {
    /// `Some(error)` when the argument count is invalid.
    pub(crate) fn validate(&self, got: usize) -> Option<Object> {
        match self {
            Arity::Exact(want) if got != *want => Some(Object::Error(format!(
                "wrong number of arguments. got={got}, want={want}"
            ))),
            _ => None,
        }
    }
}

/// Definition of a built-in function.
#[derive(Debug)]
pub struct BuiltinDef {
    pub name: &'static str,
    pub arity: Arity,
    pub func: BuiltinFn,
}

impl BuiltinDef {
    /// Validate arity, then invoke.
    pub fn apply(&self, args: &[Object]) -> Object {
        if let Some(error) = self.arity.validate(args.len()) {
            return error;
        }
        (self.func)(args)
    }
}

fn unsupported_argument(builtin: &str, got: &Object) -> Object {
    Object::Error(format!(
        "argument to `{builtin}` not supported, got {}",
        got.type_name()
    ))
}

/// `len(x)`: byte length of a string, element count of an array.
fn builtin_len(args: &[Object]) -> Object {
    match &args[0] {
        Object::Str(s) => Object::Integer(s.len() as i64),
        Object::Array(elements) => Object::Integer(elements.len() as i64),
        other => unsupported_argument("len", other),
    }
}

/// `first(array)`: the first element, or `null` on an empty array.
fn builtin_first(args: &[Object]) -> Object {
    match &args[0] {
        Object::Array(elements) => elements.first().cloned().unwrap_or(Object::Null),
        other => unsupported_argument("first", other),
    }
}

/// `last(array)`: the last element, or `null` on an empty array.
fn builtin_last(args: &[Object]) -> Object {
    match &args[0] {
        Object::Array(elements) => elements.last().cloned().unwrap_or(Object::Null),
        other => unsupported_argument("last", other),
    }
}

/// `rest(array)`: a new array of everything but the first element, or
/// `null` on an empty array.
fn builtin_rest(args: &[Object]) -> Object {
    match &args[0] {
        Object::Array(elements) => match elements.split_first() {
            Some((_, rest)) => Object::Array(rest.to_vec()),
            None => Object::Null,
        },
        other => unsupported_argument("rest", other),
    }
}

/// `push(array, elem)`: a new array with `elem` appended. The input array
/// is not mutated.
fn builtin_push(args: &[Object]) -> Object {
    match &args[0] {
        Object::Array(elements) => {
            let mut pushed = elements.clone();
            pushed.push(args[1].clone());
            Object::Array(pushed)
        }
        other => unsupported_argument("push", other),
    }
}

/// `puts(args...)`: write each argument's inspect string to stdout,
/// one per line. Returns `null`.
fn builtin_puts(args: &[Object]) -> Object {
    for arg in args {
        println!("{arg}");
    }
    Object::Null
}

/// Registry of all built-in functions.
static BUILTINS: LazyLock<Vec<BuiltinDef>> = LazyLock::new(|| {
    vec![
        BuiltinDef {
            name: "len",
            arity: Arity::Exact(1),
            func: builtin_len,
        },
        BuiltinDef {
            name: "first",
            arity: Arity::Exact(1),
            func: builtin_first,
        },
        BuiltinDef {
            name: "last",
            arity: Arity::Exact(1),
            func: builtin_last,
        },
        BuiltinDef {
            name: "rest",
            arity: Arity::Exact(1),
            func: builtin_rest,
        },
        BuiltinDef {
            name: "push",
            arity: Arity::Exact(2),
            func: builtin_push,
        },
        BuiltinDef {
            name: "puts",
            arity: Arity::Any,
            func: builtin_puts,
        },
    ]
});

/// Name index over [`BUILTINS`].
static BUILTIN_INDEX: LazyLock<HashMap<&'static str, &'static BuiltinDef>> =
    LazyLock::new(|| {
        let defs: &'static [BuiltinDef] = BUILTINS.as_slice();
        defs.iter().map(|def| (def.name, def)).collect()
    });

/// Find a builtin by name.
pub fn find_builtin(name: &str) -> Option<&'static BuiltinDef> {
    BUILTIN_INDEX.get(name).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call(name: &str, args: &[Object]) -> Object {
        find_builtin(name)
            .unwrap_or_else(|| panic!("builtin {name} not registered"))
            .apply(args)
    }

    fn str_obj(s: &str) -> Object {
        Object::Str(s.to_owned())
    }

    fn int_array(values: &[i64]) -> Object {
        Object::Array(values.iter().map(|n| Object::Integer(*n)).collect())
    }

    #[test]
    fn test_len() {
        let cases = [
            (str_obj(""), Object::Integer(0)),
            (str_obj("four"), Object::Integer(4)),
            (str_obj("hello world"), Object::Integer(11)),
            (int_array(&[]), Object::Integer(0)),
            (int_array(&[1, 2, 3]), Object::Integer(3)),
            (
                Object::Integer(1),
                Object::Error("argument to `len` not supported, got INTEGER".to_owned()),
            ),
        ];
        for (arg, expected) in cases {
            assert_eq!(call("len", &[arg]), expected);
        }
    }

    #[test]
    fn test_arity_errors() {
        let cases = [
            (
                "len",
                vec![str_obj("1"), str_obj("2")],
                "wrong number of arguments. got=2, want=1",
            ),
            ("first", vec![], "wrong number of arguments. got=0, want=1"),
            (
                "last",
                vec![int_array(&[]), int_array(&[])],
                "wrong number of arguments. got=2, want=1",
            ),
            (
                "push",
                vec![int_array(&[])],
                "wrong number of arguments. got=1, want=2",
            ),
        ];
        for (name, args, expected) in cases {
            assert_eq!(call(name, &args), Object::Error(expected.to_owned()));
        }
    }

    #[test]
    fn test_first_last_rest() {
        assert_eq!(call("first", &[int_array(&[33, 34])]), Object::Integer(33));
        assert_eq!(call("first", &[int_array(&[])]), Object::Null);
        assert_eq!(call("last", &[int_array(&[33, 34])]), Object::Integer(34));
        assert_eq!(call("last", &[int_array(&[])]), Object::Null);
        assert_eq!(call("rest", &[int_array(&[1, 2, 3])]), int_array(&[2, 3]));
        assert_eq!(call("rest", &[int_array(&[1])]), int_array(&[]));
        assert_eq!(call("rest", &[int_array(&[])]), Object::Null);

        for name in ["first", "last", "rest"] {
            assert_eq!(
                call(name, &[str_obj("")]),
                Object::Error(format!(
                    "argument to `{name}` not supported, got STRING"
                ))
            );
        }
    }

    #[test]
    fn test_push_does_not_mutate() {
        let original = int_array(&[1, 2]);
        let pushed = call("push", &[original.clone(), Object::Integer(3)]);
        assert_eq!(pushed, int_array(&[1, 2, 3]));
        assert_eq!(original, int_array(&[1, 2]));

        assert_eq!(
            call("push", &[Object::Integer(1), Object::Integer(2)]),
            Object::Error("argument to `push` not supported, got INTEGER".to_owned())
        );
    }

    #[test]
    fn test_puts_returns_null() {
        assert_eq!(call("puts", &[str_obj("hello")]), Object::Null);
        assert_eq!(call("puts", &[]), Object::Null);
    }
}
