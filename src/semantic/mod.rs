pub mod analyzer;
pub mod symboltable;
pub mod types;

pub use analyzer::{analyze, SemanticAnalyzer};
pub use symboltable::{Symbol, SymbolTable, SymbolType};
pub use types::{LiteralKind, Type};
