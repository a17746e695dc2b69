use crate::ast::BinaryOperator;
use crate::position::Position;
use crate::semantic::types::Type;
use std::io;
use thiserror::Error;

/// The grammar failed to match. Parsing stops at the first one.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Syntax error at {position}: {message}")]
pub struct ParseError {
    pub message: String,
    pub position: Position,
}

impl ParseError {
    pub fn new(message: impl Into<String>, position: Position) -> Self {
        Self {
            message: message.into(),
            position,
        }
    }

    /// Create an `expected X, found Y` error
    pub fn expected(expected: impl AsRef<str>, found: impl AsRef<str>, position: Position) -> Self {
        Self::new(
            format!("expected {}, found {}", expected.as_ref(), found.as_ref()),
            position,
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SemanticError {
    #[error("{position}: symbol '{name}' is already declared in this scope")]
    DuplicateSymbol { name: String, position: Position },

    #[error("{position}: undefined symbol '{name}'")]
    UndefinedSymbol { name: String, position: Position },

    #[error("{position}: '{name}' expects {expected} argument(s) but {found} were supplied")]
    ArityMismatch {
        name: String,
        expected: usize,
        found: usize,
        position: Position,
    },

    #[error("{position}: index {index} is outside the bounds {lower}..{upper} of '{name}'")]
    IndexOutOfRange {
        name: String,
        index: i64,
        lower: i64,
        upper: i64,
        position: Position,
    },

    #[error("{position}: array '{name}' has an empty range {lower}..{upper}")]
    InvalidBounds {
        name: String,
        lower: i64,
        upper: i64,
        position: Position,
    },

    #[error("{position}: type mismatch for '{name}': expected {expected} but found {found}")]
    TypeMismatch {
        name: String,
        expected: Type,
        found: Type,
        position: Position,
    },

    #[error("{position}: operator '{operator}' cannot be applied to {left} and {right}")]
    InvalidOperatorOperand {
        operator: BinaryOperator,
        left: Type,
        right: Type,
        position: Position,
    },

    #[error("{position}: {construct} requires a {expected} expression but found {found}")]
    ConditionTypeError {
        construct: &'static str,
        expected: Type,
        found: Type,
        position: Position,
    },

    #[error("{position}: '{name}' is a {found}, expected a {expected}")]
    KindMismatch {
        name: String,
        expected: &'static str,
        found: &'static str,
        position: Position,
    },

    #[error("{position}: string literal {raw} can only be passed to write or writeln")]
    MisplacedString { raw: String, position: Position },
}

impl SemanticError {
    pub fn position(&self) -> Position {
        match self {
            SemanticError::DuplicateSymbol { position, .. }
            | SemanticError::UndefinedSymbol { position, .. }
            | SemanticError::ArityMismatch { position, .. }
            | SemanticError::IndexOutOfRange { position, .. }
            | SemanticError::InvalidBounds { position, .. }
            | SemanticError::TypeMismatch { position, .. }
            | SemanticError::InvalidOperatorOperand { position, .. }
            | SemanticError::ConditionTypeError { position, .. }
            | SemanticError::KindMismatch { position, .. }
            | SemanticError::MisplacedString { position, .. } => *position,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodegenError {
    #[error("unresolved name '{name}' in routine '{routine}'")]
    UnresolvedName { name: String, routine: String },

    #[error("{position}: for loop must start with an assignment to a plain variable")]
    UnsupportedForInit { position: Position },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuntimeError {
    #[error("method '{0}' not found")]
    UnknownMethod(String),

    #[error("label '{label}' not found in method '{method}'")]
    UnknownLabel { method: String, label: String },

    #[error("evaluation stack underflow in method '{0}'")]
    StackUnderflow(String),

    #[error("division by zero in method '{0}'")]
    DivisionByZero(String),

    #[error("array index {index} out of range for length {length}")]
    IndexOutOfRange { index: i32, length: usize },

    #[error("invalid operand in method '{method}': {message}")]
    InvalidOperand { method: String, message: String },

    #[error("'{method}' expects {expected} argument(s) but {found} were supplied")]
    ArgumentCount {
        method: String,
        expected: usize,
        found: usize,
    },

    #[error("no input left for ReadLine")]
    InputExhausted,

    #[error("'{0}' is not a valid int32")]
    InvalidInput(String),

    #[error("call depth limit of {0} exceeded")]
    CallDepthExceeded(usize),

    #[error("step limit of {0} instructions exceeded")]
    StepLimitExceeded(usize),
}

#[derive(Debug, Error)]
pub enum CompileError {
    #[error("File read error: {0}")]
    FileReadError(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("Semantic error at {0}")]
    Semantic(#[from] SemanticError),

    #[error("Code generation error: {0}")]
    Codegen(#[from] CodegenError),

    #[error("Runtime error: {0}")]
    Runtime(#[from] RuntimeError),
}

// Type alias for Result with CompileError
pub type CompileResult<T> = Result<T, CompileError>;
pub type SemanticResult<T> = Result<T, SemanticError>;
pub type CodegenResult<T> = Result<T, CodegenError>;
pub type RuntimeResult<T> = Result<T, RuntimeError>;
