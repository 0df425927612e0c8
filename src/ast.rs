//! Abstract syntax tree for Monkey programs.
//!
//! The tree is a pair of sum types, [`Statement`] and [`Expression`], with
//! [`Program`] as the root and [`BlockStatement`] as the brace-delimited
//! statement sequence used by `if`, `fn` and `macro` bodies. Nodes are
//! immutable after parsing; passes that rewrite the tree (macro expansion)
//! build new nodes instead of mutating shared ones.
//!
//! Every node implements `Display`. Prefix and infix expressions print with
//! explicit parentheses, so the printed form of a parsed program re-parses
//! to a shape-equivalent tree regardless of the original spacing.

use std::fmt;

/// An ordered sequence of top-level statements.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Program {
    pub statements: Vec<Statement>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    /// `let <name> = <value>;`
    Let { name: String, value: Expression },
    /// `return <value>;`
    Return(Expression),
    /// A bare expression in statement position
    Expression(Expression),
}

/// `{ <statements> }`, the body form shared by `if`, `fn` and `macro`.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct BlockStatement {
    pub statements: Vec<Statement>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expression {
    Identifier(String),
    IntegerLiteral(i64),
    BooleanLiteral(bool),
    StringLiteral(String),
    /// `<operator><right>`, e.g. `!ok`, `-5`
    Prefix {
        operator: String,
        right: Box<Expression>,
    },
    /// `<left> <operator> <right>`, e.g. `a + b`
    Infix {
        operator: String,
        left: Box<Expression>,
        right: Box<Expression>,
    },
    /// `if (<condition>) { ... } else { ... }`, the else block optional
    If {
        condition: Box<Expression>,
        consequence: BlockStatement,
        alternative: Option<BlockStatement>,
    },
    /// `fn(<parameters>) { ... }`
    FunctionLiteral {
        parameters: Vec<String>,
        body: BlockStatement,
    },
    /// `macro(<parameters>) { ... }`, the same shape as a function literal,
    /// consumed by the macro-definition pass
    MacroLiteral {
        parameters: Vec<String>,
        body: BlockStatement,
    },
    /// `<function>(<arguments>)`
    Call {
        function: Box<Expression>,
        arguments: Vec<Expression>,
    },
    /// `[<elements>]`
    ArrayLiteral(Vec<Expression>),
    /// `<left>[<index>]`
    Index {
        left: Box<Expression>,
        index: Box<Expression>,
    },
    /// `{<key>: <value>, ...}` with pairs kept in source order
    HashLiteral(Vec<(Expression, Expression)>),
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for statement in &self.statements {
            write!(f, "{statement}")?;
        }
        Ok(())
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Statement::Let { name, value } => write!(f, "let {name} = {value};"),
            Statement::Return(value) => write!(f, "return {value};"),
            Statement::Expression(expression) => write!(f, "{expression}"),
        }
    }
}

impl fmt::Display for BlockStatement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for statement in &self.statements {
            write!(f, "{statement}")?;
        }
        write!(f, "}}")
    }
}

/// Join a list of printable items with `", "`.
fn comma_separated(items: &[impl fmt::Display]) -> String {
    items
        .iter()
        .map(|item| item.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expression::Identifier(name) => write!(f, "{name}"),
            Expression::IntegerLiteral(value) => write!(f, "{value}"),
            Expression::BooleanLiteral(value) => write!(f, "{value}"),
            Expression::StringLiteral(value) => write!(f, "\"{value}\""),
            Expression::Prefix { operator, right } => write!(f, "({operator}{right})"),
            Expression::Infix {
                operator,
                left,
                right,
            } => write!(f, "({left} {operator} {right})"),
            Expression::If {
                condition,
                consequence,
                alternative,
            } => {
                write!(f, "if{condition} {consequence}")?;
                if let Some(alternative) = alternative {
                    write!(f, "else {alternative}")?;
                }
                Ok(())
            }
            Expression::FunctionLiteral { parameters, body } => {
                write!(f, "fn({}) {body}", parameters.join(", "))
            }
            Expression::MacroLiteral { parameters, body } => {
                write!(f, "macro({}) {body}", parameters.join(", "))
            }
            Expression::Call {
                function,
                arguments,
            } => write!(f, "{function}({})", comma_separated(arguments)),
            Expression::ArrayLiteral(elements) => {
                write!(f, "[{}]", comma_separated(elements))
            }
            Expression::Index { left, index } => write!(f, "({left}[{index}])"),
            Expression::HashLiteral(pairs) => {
                let pairs = pairs
                    .iter()
                    .map(|(key, value)| format!("{key}:{value}"))
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "{{{pairs}}}")
            }
        }
    }
}

/// Rewrite a program bottom-up with `modifier`, building new nodes and
/// leaving the input's shared subtrees untouched. The modifier runs on
/// every expression node after its children have been rewritten; its
/// result replaces the node and is not walked again. An `Err` aborts the
/// whole traversal.
pub(crate) fn modify_program<E, F>(program: Program, modifier: &mut F) -> Result<Program, E>
where
    F: FnMut(Expression) -> Result<Expression, E>,
{
    let statements = program
        .statements
        .into_iter()
        .map(|statement| modify_statement(statement, modifier))
        .collect::<Result<_, _>>()?;
    Ok(Program { statements })
}

pub(crate) fn modify_statement<E, F>(statement: Statement, modifier: &mut F) -> Result<Statement, E>
where
    F: FnMut(Expression) -> Result<Expression, E>,
{
    Ok(match statement {
        Statement::Let { name, value } => Statement::Let {
            name,
            value: modify_expression(value, modifier)?,
        },
        Statement::Return(value) => Statement::Return(modify_expression(value, modifier)?),
        Statement::Expression(expression) => {
            Statement::Expression(modify_expression(expression, modifier)?)
        }
    })
}

pub(crate) fn modify_block<E, F>(
    block: BlockStatement,
    modifier: &mut F,
) -> Result<BlockStatement, E>
where
    F: FnMut(Expression) -> Result<Expression, E>,
{
    let statements = block
        .statements
        .into_iter()
        .map(|statement| modify_statement(statement, modifier))
        .collect::<Result<_, _>>()?;
    Ok(BlockStatement { statements })
}

pub(crate) fn modify_expression<E, F>(
    expression: Expression,
    modifier: &mut F,
) -> Result<Expression, E>
where
    F: FnMut(Expression) -> Result<Expression, E>,
{
    let rebuilt = match expression {
        Expression::Prefix { operator, right } => Expression::Prefix {
            operator,
            right: Box::new(modify_expression(*right, modifier)?),
        },
        Expression::Infix {
            operator,
            left,
            right,
        } => Expression::Infix {
            operator,
            left: Box::new(modify_expression(*left, modifier)?),
            right: Box::new(modify_expression(*right, modifier)?),
        },
        Expression::If {
            condition,
            consequence,
            alternative,
        } => Expression::If {
            condition: Box::new(modify_expression(*condition, modifier)?),
            consequence: modify_block(consequence, modifier)?,
            alternative: match alternative {
                Some(block) => Some(modify_block(block, modifier)?),
                None => None,
            },
        },
        Expression::FunctionLiteral { parameters, body } => Expression::FunctionLiteral {
            parameters,
            body: modify_block(body, modifier)?,
        },
        Expression::MacroLiteral { parameters, body } => Expression::MacroLiteral {
            parameters,
            body: modify_block(body, modifier)?,
        },
        Expression::Call {
            function,
            arguments,
        } => Expression::Call {
            function: Box::new(modify_expression(*function, modifier)?),
            arguments: arguments
                .into_iter()
                .map(|argument| modify_expression(argument, modifier))
                .collect::<Result<_, _>>()?,
        },
        Expression::ArrayLiteral(elements) => Expression::ArrayLiteral(
            elements
                .into_iter()
                .map(|element| modify_expression(element, modifier))
                .collect::<Result<_, _>>()?,
        ),
        Expression::Index { left, index } => Expression::Index {
            left: Box::new(modify_expression(*left, modifier)?),
            index: Box::new(modify_expression(*index, modifier)?),
        },
        Expression::HashLiteral(pairs) => Expression::HashLiteral(
            pairs
                .into_iter()
                .map(|(key, value)| {
                    Ok((
                        modify_expression(key, modifier)?,
                        modify_expression(value, modifier)?,
                    ))
                })
                .collect::<Result<_, _>>()?,
        ),
        leaf => leaf,
    };
    modifier(rebuilt)
}

/// Shorthand for an identifier expression. Handy in tests.
#[cfg_attr(not(test), expect(dead_code))]
pub(crate) fn ident(name: &str) -> Expression {
    Expression::Identifier(name.to_owned())
}

/// Shorthand for an integer literal. Handy in tests.
#[cfg_attr(not(test), expect(dead_code))]
pub(crate) fn int(value: i64) -> Expression {
    Expression::IntegerLiteral(value)
}
