//! The `quote`/`unquote` special form.
//!
//! `quote(expr)` wraps its argument's AST in an `Object::Quote` without
//! evaluating it, except for `unquote(e)` call sites inside it, which are
//! evaluated in the current environment and spliced back in as AST nodes.
//! The splice is a pure rewrite: parents of a replaced node are rebuilt,
//! shared subtrees are never mutated in place.

use std::rc::Rc;

use crate::ast::{self, Expression};
use crate::evaluator::eval_expression;
use crate::object::{Environment, Object};

/// Evaluate a `quote(...)` call site. The argument list is the unevaluated
/// argument AST of the call.
pub(crate) fn quote(arguments: &[Expression], env: &Rc<Environment>, depth: usize) -> Object {
    if arguments.len() != 1 {
        return Object::Error(format!(
            "wrong number of arguments. got={}, want=1",
            arguments.len()
        ));
    }

    match eval_unquote_calls(arguments[0].clone(), env, depth) {
        Ok(expression) => Object::Quote(expression),
        Err(error) => error,
    }
}

/// Replace every `unquote(e)` inside `quoted` with the AST form of `e`'s
/// value. An error during an `unquote` evaluation aborts the whole quote.
fn eval_unquote_calls(
    quoted: Expression,
    env: &Rc<Environment>,
    depth: usize,
) -> Result<Expression, Object> {
    ast::modify_expression(quoted, &mut |expression| match expression {
        Expression::Call {
            function,
            mut arguments,
        } if is_unquote(&function, &arguments) => {
            // The guard checked there is exactly one argument.
            let argument = arguments.remove(0);
            match eval_expression(&argument, env, depth + 1) {
                error @ Object::Error(_) => Err(error),
                value => Ok(object_to_expression(value)),
            }
        }
        expression => Ok(expression),
    })
}

fn is_unquote(function: &Expression, arguments: &[Expression]) -> bool {
    matches!(function, Expression::Identifier(name) if name == "unquote")
        && arguments.len() == 1
}

/// Convert an evaluated value back into an AST node for splicing. Values
/// with no literal syntax splice as the identifier `null`.
fn object_to_expression(object: Object) -> Expression {
    match object {
        Object::Integer(n) => Expression::IntegerLiteral(n),
        Object::Boolean(b) => Expression::BooleanLiteral(b),
        Object::Str(s) => Expression::StringLiteral(s),
        Object::Quote(node) => node,
        _ => Expression::Identifier("null".to_owned()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluator::eval_program;
    use crate::parser;

    fn eval_input(input: &str) -> Object {
        let (program, errors) = parser::parse(input);
        assert!(errors.is_empty(), "parser errors for {input:?}: {errors:?}");
        eval_program(&program, &Environment::new())
    }

    fn assert_quote(input: &str, expected: &str) {
        match eval_input(input) {
            Object::Quote(node) => {
                assert_eq!(node.to_string(), expected, "input {input:?}")
            }
            other => panic!("expected quote for {input:?}, got {other:?}"),
        }
    }

    #[test]
    fn test_quote() {
        let cases = [
            ("quote(5)", "5"),
            ("quote(5 + 8)", "(5 + 8)"),
            ("quote(foobar)", "foobar"),
            ("quote(foobar + barfoo)", "(foobar + barfoo)"),
        ];
        for (input, expected) in cases {
            assert_quote(input, expected);
        }
    }

    #[test]
    fn test_quote_does_not_evaluate_its_argument() {
        // `missing` is unbound, but quoting it must not fail.
        assert_quote("quote(missing)", "missing");
    }

    #[test]
    fn test_quote_unquote() {
        let cases = [
            ("quote(unquote(4))", "4"),
            ("quote(unquote(4 + 4))", "8"),
            ("quote(8 + unquote(4 + 4))", "(8 + 8)"),
            ("quote(unquote(4 + 4) + 8)", "(8 + 8)"),
            ("let foobar = 8; quote(foobar)", "foobar"),
            ("let foobar = 8; quote(unquote(foobar))", "8"),
            ("quote(unquote(true))", "true"),
            ("quote(unquote(true == false))", "false"),
            ("quote(unquote(quote(4 + 4)))", "(4 + 4)"),
            (
                "let quotedInfixExpression = quote(4 + 4); \
                 quote(unquote(4 + 4) + unquote(quotedInfixExpression))",
                "(8 + (4 + 4))",
            ),
        ];
        for (input, expected) in cases {
            assert_quote(input, expected);
        }
    }

    #[test]
    fn test_unquote_inside_nested_positions() {
        let cases = [
            (
                "quote(if (unquote(true)) { unquote(1 + 1) })",
                "iftrue {2}",
            ),
            ("quote([unquote(1), unquote(2 + 0)])", "[1, 2]"),
        ];
        for (input, expected) in cases {
            assert_quote(input, expected);
        }
    }

    #[test]
    fn test_unquote_error_propagates() {
        assert_eq!(
            eval_input("quote(unquote(missing))"),
            Object::Error("identifier not found: missing".to_owned())
        );
    }

    #[test]
    fn test_quote_arity() {
        assert_eq!(
            eval_input("quote(1, 2)"),
            Object::Error("wrong number of arguments. got=2, want=1".to_owned())
        );
    }
}
