//! Macro definition and expansion.
//!
//! Macros run before evaluation, in two passes over the program:
//!
//! 1. [`define_macros`] walks the top-level statements once, binds every
//!    `let <name> = macro(...) {...};` as an `Object::Macro` in the given
//!    environment, and removes those statements from the program.
//! 2. [`expand_macros`] rewrites every call site whose callee names one of
//!    those macros. The unevaluated argument ASTs are bound to the macro's
//!    parameters as `Object::Quote` values, the body is evaluated, and the
//!    `Quote` it returns replaces the call site.
//!
//! Expansion is a single pass: substituted nodes are not re-expanded, and
//! nested macro definitions are not supported. A macro body that produces
//! anything but a `Quote` is a programmer error and aborts.
//!
//! Set `MONKEY_MACRO_DEBUG=1` to trace expansions on stderr.

use std::convert::Infallible;
use std::rc::Rc;
use std::sync::LazyLock;

use crate::ast::{self, Expression, Program, Statement};
use crate::evaluator::eval_block_statement;
use crate::object::{Environment, Object};

static DEBUG: LazyLock<bool> =
    LazyLock::new(|| std::env::var("MONKEY_MACRO_DEBUG").is_ok());

macro_rules! debug_trace {
    ($($arg:tt)*) => {
        if *DEBUG {
            eprintln!("[macro] {}", format!($($arg)*));
        }
    };
}

/// Harvest `let <name> = macro(...) {...};` statements: bind each macro in
/// `env` and drop the statement from the program. Every other statement is
/// preserved in order.
pub fn define_macros(program: &mut Program, env: &Rc<Environment>) {
    program.statements.retain(|statement| {
        let Statement::Let {
            name,
            value: Expression::MacroLiteral { parameters, body },
        } = statement
        else {
            return true;
        };

        debug_trace!("defining macro {name}({})", parameters.join(", "));
        env.set(
            name.clone(),
            Object::Macro {
                parameters: parameters.clone(),
                body: body.clone(),
                env: Rc::clone(env),
            },
        );
        false
    });
}

/// Rewrite every macro call site in `program` with the AST its macro body
/// produces. Pure rewrite: new nodes are built, shared subtrees are left
/// untouched.
pub fn expand_macros(program: Program, env: &Rc<Environment>) -> Program {
    let expanded = ast::modify_program::<Infallible, _>(program, &mut |expression| {
        let Expression::Call {
            function,
            arguments,
        } = &expression
        else {
            return Ok(expression);
        };
        let Expression::Identifier(name) = function.as_ref() else {
            return Ok(expression);
        };
        let Some(Object::Macro {
            parameters,
            body,
            env: macro_env,
        }) = env.get(name)
        else {
            return Ok(expression);
        };

        debug_trace!("expanding {name} at {expression}");

        // Bind each unevaluated argument AST as a Quote, then evaluate the
        // macro body in a frame enclosing the macro's captured env.
        let expand_env = Environment::new_enclosed(macro_env);
        for (parameter, argument) in parameters.iter().zip(arguments) {
            expand_env.set(parameter.clone(), Object::Quote(argument.clone()));
        }

        match eval_block_statement(&body, &expand_env, 0) {
            Object::Quote(node) => {
                debug_trace!("expanded {name} to {node}");
                Ok(node)
            }
            other => panic!("macro {name} must return a quoted expression, got {other:?}"),
        }
    });

    match expanded {
        Ok(program) => program,
        Err(never) => match never {},
    }
}
