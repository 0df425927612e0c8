//! Tree-walking evaluator: AST in, runtime value out.
//!
//! Evaluation is a recursive descent over the AST carrying an environment
//! and a depth counter. Two values drive the non-local control flow:
//!
//! - `Object::ReturnValue` unwinds a `return` outward. Block evaluation
//!   passes it through unchanged; function calls and the program boundary
//!   unwrap it exactly once, so a `return` inside nested `if` blocks
//!   escapes to the enclosing function and no further.
//! - `Object::Error` aborts whatever operation is in progress. Every rule
//!   checks sub-results and propagates the error instead of continuing.
//!
//! Neither value ever ends up inside a composite value.

pub(crate) mod quote;

use std::collections::HashMap;
use std::rc::Rc;

use crate::MAX_EVAL_DEPTH;
use crate::ast::{BlockStatement, Expression, Program, Statement};
use crate::builtins::find_builtin;
use crate::object::{Environment, HashPair, Object};

/// Evaluate a program. The program boundary unwraps a `ReturnValue` and
/// stops at the first `Error`.
pub fn eval_program(program: &Program, env: &Rc<Environment>) -> Object {
    let mut result = Object::Null;
    for statement in &program.statements {
        result = match eval_statement(statement, env, 0) {
            Object::ReturnValue(value) => return *value,
            error @ Object::Error(_) => return error,
            object => object,
        };
    }
    result
}

fn eval_statement(statement: &Statement, env: &Rc<Environment>, depth: usize) -> Object {
    match statement {
        Statement::Let { name, value } => {
            let value = eval_expression(value, env, depth);
            if value.is_error() {
                return value;
            }
            env.set(name.clone(), value);
            Object::Null
        }
        Statement::Return(value) => {
            let value = eval_expression(value, env, depth);
            if value.is_error() {
                return value;
            }
            Object::ReturnValue(Box::new(value))
        }
        Statement::Expression(expression) => eval_expression(expression, env, depth),
    }
}

/// Evaluate a block. Unlike the program boundary, a `ReturnValue` is
/// propagated unchanged so it can unwind past enclosing blocks.
pub(crate) fn eval_block_statement(
    block: &BlockStatement,
    env: &Rc<Environment>,
    depth: usize,
) -> Object {
    let mut result = Object::Null;
    for statement in &block.statements {
        result = eval_statement(statement, env, depth);
        if matches!(result, Object::ReturnValue(_) | Object::Error(_)) {
            return result;
        }
    }
    result
}

pub(crate) fn eval_expression(
    expression: &Expression,
    env: &Rc<Environment>,
    depth: usize,
) -> Object {
    if depth >= MAX_EVAL_DEPTH {
        return Object::Error(format!(
            "evaluation depth limit exceeded (max: {MAX_EVAL_DEPTH})"
        ));
    }

    match expression {
        Expression::IntegerLiteral(value) => Object::Integer(*value),
        Expression::BooleanLiteral(value) => Object::Boolean(*value),
        Expression::StringLiteral(value) => Object::Str(value.clone()),
        Expression::Identifier(name) => eval_identifier(name, env),
        Expression::Prefix { operator, right } => {
            let right = eval_expression(right, env, depth + 1);
            if right.is_error() {
                return right;
            }
            eval_prefix_expression(operator, right)
        }
        Expression::Infix {
            operator,
            left,
            right,
        } => {
            let left = eval_expression(left, env, depth + 1);
            if left.is_error() {
                return left;
            }
            let right = eval_expression(right, env, depth + 1);
            if right.is_error() {
                return right;
            }
            eval_infix_expression(operator, left, right)
        }
        Expression::If {
            condition,
            consequence,
            alternative,
        } => {
            let condition = eval_expression(condition, env, depth + 1);
            if condition.is_error() {
                return condition;
            }
            if condition.is_truthy() {
                eval_block_statement(consequence, env, depth + 1)
            } else if let Some(alternative) = alternative {
                eval_block_statement(alternative, env, depth + 1)
            } else {
                Object::Null
            }
        }
        Expression::FunctionLiteral { parameters, body } => Object::Function {
            parameters: parameters.clone(),
            body: body.clone(),
            env: Rc::clone(env),
        },
        Expression::MacroLiteral { .. } => {
            Object::Error("macro literal outside of a macro definition".to_owned())
        }
        Expression::Call {
            function,
            arguments,
        } => {
            // `quote` is a special form: its argument is not evaluated, so
            // it must be intercepted before the callee is.
            if let Expression::Identifier(name) = function.as_ref()
                && name == "quote"
            {
                return quote::quote(arguments, env, depth);
            }

            let function = eval_expression(function, env, depth + 1);
            if function.is_error() {
                return function;
            }
            let arguments = match eval_expressions(arguments, env, depth) {
                Ok(arguments) => arguments,
                Err(error) => return error,
            };
            apply_function(function, arguments, depth)
        }
        Expression::ArrayLiteral(elements) => {
            match eval_expressions(elements, env, depth) {
                Ok(elements) => Object::Array(elements),
                Err(error) => error,
            }
        }
        Expression::Index { left, index } => {
            let left = eval_expression(left, env, depth + 1);
            if left.is_error() {
                return left;
            }
            let index = eval_expression(index, env, depth + 1);
            if index.is_error() {
                return index;
            }
            eval_index_expression(left, index)
        }
        Expression::HashLiteral(pairs) => eval_hash_literal(pairs, env, depth),
    }
}

fn eval_identifier(name: &str, env: &Rc<Environment>) -> Object {
    if let Some(value) = env.get(name) {
        return value;
    }
    if let Some(def) = find_builtin(name) {
        return Object::Builtin(def);
    }
    Object::Error(format!("identifier not found: {name}"))
}

/// Evaluate an expression list left-to-right, abandoning the rest as soon
/// as one evaluates to an error.
fn eval_expressions(
    expressions: &[Expression],
    env: &Rc<Environment>,
    depth: usize,
) -> Result<Vec<Object>, Object> {
    let mut results = Vec::with_capacity(expressions.len());
    for expression in expressions {
        let value = eval_expression(expression, env, depth + 1);
        if value.is_error() {
            return Err(value);
        }
        results.push(value);
    }
    Ok(results)
}

fn apply_function(function: Object, arguments: Vec<Object>, depth: usize) -> Object {
    match function {
        Object::Function {
            parameters,
            body,
            env,
        } => {
            if parameters.len() != arguments.len() {
                return Object::Error(format!(
                    "wrong number of arguments. got={}, want={}",
                    arguments.len(),
                    parameters.len()
                ));
            }
            let call_env = Environment::new_enclosed(env);
            for (parameter, argument) in parameters.iter().zip(arguments) {
                call_env.set(parameter.clone(), argument);
            }
            match eval_block_statement(&body, &call_env, depth + 1) {
                Object::ReturnValue(value) => *value,
                object => object,
            }
        }
        Object::Builtin(def) => def.apply(&arguments),
        other => Object::Error(format!("not a function: {}", other.type_name())),
    }
}

fn eval_prefix_expression(operator: &str, right: Object) -> Object {
    match operator {
        "!" => Object::Boolean(!right.is_truthy()),
        "-" => match right {
            Object::Integer(n) => match n.checked_neg() {
                Some(negated) => Object::Integer(negated),
                None => Object::Error("integer overflow in negation".to_owned()),
            },
            other => Object::Error(format!("unknown operator: -{}", other.type_name())),
        },
        _ => Object::Error(format!(
            "unknown operator: {operator}{}",
            right.type_name()
        )),
    }
}

fn eval_infix_expression(operator: &str, left: Object, right: Object) -> Object {
    match (&left, &right) {
        (Object::Integer(l), Object::Integer(r)) => {
            eval_integer_infix_expression(operator, *l, *r)
        }
        (Object::Str(l), Object::Str(r)) => match operator {
            "+" => Object::Str(format!("{l}{r}")),
            _ => Object::Error(format!("unknown operator: STRING {operator} STRING")),
        },
        _ => match operator {
            // The canonical singletons compare by identity; everything
            // else is a distinct value and compares unequal here.
            "==" => Object::Boolean(canonical_eq(&left, &right)),
            "!=" => Object::Boolean(!canonical_eq(&left, &right)),
            _ if left.type_name() != right.type_name() => Object::Error(format!(
                "type mismatch: {} {operator} {}",
                left.type_name(),
                right.type_name()
            )),
            _ => Object::Error(format!(
                "unknown operator: {} {operator} {}",
                left.type_name(),
                right.type_name()
            )),
        },
    }
}

/// Identity comparison over the canonical `true`/`false`/`null` values.
fn canonical_eq(left: &Object, right: &Object) -> bool {
    match (left, right) {
        (Object::Boolean(l), Object::Boolean(r)) => l == r,
        (Object::Null, Object::Null) => true,
        _ => false,
    }
}

fn eval_integer_infix_expression(operator: &str, left: i64, right: i64) -> Object {
    let overflow = |what: &str| Object::Error(format!("integer overflow in {what}"));
    match operator {
        "+" => left.checked_add(right).map_or_else(
            || overflow("addition"),
            Object::Integer,
        ),
        "-" => left.checked_sub(right).map_or_else(
            || overflow("subtraction"),
            Object::Integer,
        ),
        "*" => left.checked_mul(right).map_or_else(
            || overflow("multiplication"),
            Object::Integer,
        ),
        "/" => {
            if right == 0 {
                return Object::Error("division by zero".to_owned());
            }
            left.checked_div(right)
                .map_or_else(|| overflow("division"), Object::Integer)
        }
        "<" => Object::Boolean(left < right),
        ">" => Object::Boolean(left > right),
        "==" => Object::Boolean(left == right),
        "!=" => Object::Boolean(left != right),
        _ => Object::Error(format!("unknown operator: INTEGER {operator} INTEGER")),
    }
}

fn eval_index_expression(left: Object, index: Object) -> Object {
    match (left, index) {
        (Object::Array(elements), Object::Integer(index)) => {
            if index < 0 || index as usize >= elements.len() {
                return Object::Null;
            }
            elements[index as usize].clone()
        }
        (Object::Hash(pairs), key) => match key.hash_key() {
            Some(hash_key) => pairs
                .get(&hash_key)
                .map(|pair| pair.value.clone())
                .unwrap_or(Object::Null),
            None => Object::Error(format!("unusable as hash key: {}", key.type_name())),
        },
        (left, _) => Object::Error(format!(
            "index operator not supported: {}",
            left.type_name()
        )),
    }
}

fn eval_hash_literal(
    pairs: &[(Expression, Expression)],
    env: &Rc<Environment>,
    depth: usize,
) -> Object {
    let mut hash = HashMap::new();
    for (key_expression, value_expression) in pairs {
        let key = eval_expression(key_expression, env, depth + 1);
        if key.is_error() {
            return key;
        }
        let Some(hash_key) = key.hash_key() else {
            return Object::Error(format!("unusable as hash key: {}", key.type_name()));
        };
        let value = eval_expression(value_expression, env, depth + 1);
        if value.is_error() {
            return value;
        }
        hash.insert(hash_key, HashPair { key, value });
    }
    Object::Hash(hash)
}
