use crate::position::Position;
use crate::semantic::types::Type;
use crate::utils::config::runtime_functions::BUILTIN_ROUTINES;
use crate::utils::errors::{SemanticError, SemanticResult};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SymbolType {
    BuiltinType(Type),
    Variable(Type),
    Array { element: Type, lower: i32, upper: i32 },
    Procedure { params: Vec<Type> },
    Function { params: Vec<Type>, returns: Type },
    BuiltinRoutine,
}

impl SymbolType {
    /// Human-readable kind, used in `KindMismatch` diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            SymbolType::BuiltinType(_) => "type",
            SymbolType::Variable(_) => "variable",
            SymbolType::Array { .. } => "array",
            SymbolType::Procedure { .. } => "procedure",
            SymbolType::Function { .. } => "function",
            SymbolType::BuiltinRoutine => "built-in routine",
        }
    }

    pub fn is_routine(&self) -> bool {
        matches!(
            self,
            SymbolType::Procedure { .. } | SymbolType::Function { .. } | SymbolType::BuiltinRoutine
        )
    }
}

#[derive(Debug, Clone)]
pub struct Symbol {
    pub symbol_type: SymbolType,
    pub position: Position,
    pub level: usize,
}

impl Symbol {
    pub fn new(symbol_type: SymbolType, position: Position, level: usize) -> Self {
        Self {
            symbol_type,
            position,
            level,
        }
    }
}

/// Scope chain kept as a stack. The bottom entry is the global scope.
#[derive(Debug)]
pub struct SymbolTable {
    scopes: Vec<HashMap<String, Symbol>>,
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

impl SymbolTable {
    pub fn new() -> Self {
        Self {
            scopes: vec![HashMap::new()],
        }
    }

    /// A global scope seeded with the built-in types and routines.
    pub fn with_builtins() -> Self {
        let mut table = Self::new();
        let global = &mut table.scopes[0];
        for ty in Type::BUILTINS {
            global.insert(
                ty.name().to_string(),
                Symbol::new(SymbolType::BuiltinType(ty), Position::UNKNOWN, 0),
            );
        }
        for name in BUILTIN_ROUTINES {
            global.insert(
                name.to_string(),
                Symbol::new(SymbolType::BuiltinRoutine, Position::UNKNOWN, 0),
            );
        }
        table
    }

    pub fn push_scope(&mut self) {
        self.scopes.push(HashMap::new());
    }

    /// Pop the innermost scope. The global scope is never dropped.
    pub fn drop_scope(&mut self) {
        if self.scopes.len() > 1 {
            self.scopes.pop();
        }
    }

    /// Bind `name` in the current scope. Shadowing an outer binding is fine;
    /// a second binding in the same scope is a `DuplicateSymbol`.
    pub fn insert(&mut self, name: &str, symbol_type: SymbolType, position: Position) -> SemanticResult<()> {
        let level = self.current_level();
        if let Some(scope) = self.scopes.last_mut() {
            if scope.contains_key(name) {
                return Err(SemanticError::DuplicateSymbol {
                    name: name.to_string(),
                    position,
                });
            }
            scope.insert(name.to_string(), Symbol::new(symbol_type, position, level));
        }
        Ok(())
    }

    /// Look a name up from the innermost scope outward.
    pub fn get(&self, name: &str) -> Option<&Symbol> {
        self.scopes.iter().rev().find_map(|scope| scope.get(name))
    }

    pub fn get_current(&self, name: &str) -> Option<&Symbol> {
        self.scopes.last().and_then(|scope| scope.get(name))
    }

    /// Look up a callable name. Built-in routines also match regardless of
    /// case, so `WriteLn` and `writeln` both resolve.
    pub fn get_routine(&self, name: &str) -> Option<&Symbol> {
        self.get(name).or_else(|| {
            let lowered = name.to_ascii_lowercase();
            self.get(&lowered)
                .filter(|symbol| symbol.symbol_type == SymbolType::BuiltinRoutine)
        })
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Nesting depth of the innermost scope, 0 for the global scope.
    pub fn current_level(&self) -> usize {
        self.scopes.len() - 1
    }

    pub fn get_scopes_len(&self) -> usize {
        self.scopes.len()
    }
}
