use crate::ast::Node;
use crate::position::Position;
use crate::semantic::types::LiteralKind;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LiteralValue {
    Integer(i32),
    Char(char),
    Str(String),
    Boolean(bool),
}

/// A literal keeps the text it was written as next to its interpreted value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Literal {
    pub raw: String,
    pub value: LiteralValue,
    pub position: Position,
}

impl Literal {
    pub fn new(raw: impl Into<String>, value: LiteralValue, position: Position) -> Self {
        Self {
            raw: raw.into(),
            value,
            position,
        }
    }

    pub fn integer(value: i32, position: Position) -> Self {
        Self::new(value.to_string(), LiteralValue::Integer(value), position)
    }

    pub fn boolean(value: bool, position: Position) -> Self {
        let raw = if value { "True" } else { "False" };
        Self::new(raw, LiteralValue::Boolean(value), position)
    }

    pub fn kind(&self) -> LiteralKind {
        match self.value {
            LiteralValue::Integer(_) => LiteralKind::Int,
            LiteralValue::Char(_) | LiteralValue::Str(_) => LiteralKind::Str,
            LiteralValue::Boolean(_) => LiteralKind::Bool,
        }
    }

    pub fn as_integer(&self) -> Option<i32> {
        match self.value {
            LiteralValue::Integer(n) => Some(n),
            _ => None,
        }
    }
}

impl Node for Literal {
    fn label(&self) -> String {
        format!("{} ({})", self.raw, self.kind().name())
    }

    fn position(&self) -> Position {
        self.position
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identifier {
    pub name: String,
    pub position: Position,
}

impl Identifier {
    pub fn new(name: impl Into<String>, position: Position) -> Self {
        Self {
            name: name.into(),
            position,
        }
    }
}

impl Node for Identifier {
    fn label(&self) -> String {
        self.name.clone()
    }

    fn position(&self) -> Position {
        self.position
    }
}
