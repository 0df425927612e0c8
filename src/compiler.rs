//! Bytecode compiler, first stage.
//!
//! Walks the AST appending encoded instructions and filling the constant
//! pool. The surface is deliberately small for now: integer literals
//! compile to `OpConstant` with a pool index, and `+` compiles its
//! operands and emits `OpAdd`. Everything else is a [`CompileError`].

use std::fmt;

use crate::ast::{Expression, Program, Statement};
use crate::code::{self, Instructions, Opcode};
use crate::object::Object;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileError {
    message: String,
}

impl CompileError {
    fn new(message: impl Into<String>) -> Self {
        CompileError {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl fmt::Display for CompileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Compile error: {}", self.message)
    }
}

impl std::error::Error for CompileError {}

/// The compiler's output: the instruction stream and its constant pool.
#[derive(Debug)]
pub struct Bytecode {
    pub instructions: Instructions,
    pub constants: Vec<Object>,
}

#[derive(Debug, Default)]
pub struct Compiler {
    instructions: Instructions,
    constants: Vec<Object>,
}

impl Compiler {
    pub fn new() -> Self {
        Compiler::default()
    }

    pub fn compile(&mut self, program: &Program) -> Result<(), CompileError> {
        for statement in &program.statements {
            self.compile_statement(statement)?;
        }
        Ok(())
    }

    fn compile_statement(&mut self, statement: &Statement) -> Result<(), CompileError> {
        match statement {
            Statement::Expression(expression) => self.compile_expression(expression),
            other => Err(CompileError::new(format!(
                "statement not yet supported: {other}"
            ))),
        }
    }

    fn compile_expression(&mut self, expression: &Expression) -> Result<(), CompileError> {
        match expression {
            Expression::Infix {
                operator,
                left,
                right,
            } => {
                self.compile_expression(left)?;
                self.compile_expression(right)?;
                match operator.as_str() {
                    "+" => {
                        self.emit(Opcode::Add, &[]);
                        Ok(())
                    }
                    other => Err(CompileError::new(format!("unknown operator {other}"))),
                }
            }
            Expression::IntegerLiteral(value) => {
                let constant = self.add_constant(Object::Integer(*value));
                self.emit(Opcode::Constant, &[constant]);
                Ok(())
            }
            other => Err(CompileError::new(format!(
                "expression not yet supported: {other}"
            ))),
        }
    }

    /// Append to the constant pool, returning the new entry's index.
    fn add_constant(&mut self, object: Object) -> usize {
        self.constants.push(object);
        self.constants.len() - 1
    }

    /// Encode and append one instruction, returning its byte offset.
    fn emit(&mut self, op: Opcode, operands: &[usize]) -> usize {
        let position = self.instructions.len();
        self.instructions.append(code::make(op, operands));
        position
    }

    pub fn bytecode(self) -> Bytecode {
        Bytecode {
            instructions: self.instructions,
            constants: self.constants,
        }
    }
}
