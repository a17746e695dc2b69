use crate::ast::BinaryOperator;
use std::fmt;

/// The three built-in scalar types of the language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Type {
    Integer,
    Char,
    Boolean,
}

impl Type {
    pub const BUILTINS: [Type; 3] = [Type::Integer, Type::Char, Type::Boolean];

    pub fn name(&self) -> &'static str {
        match self {
            Type::Integer => "integer",
            Type::Char => "char",
            Type::Boolean => "boolean",
        }
    }

    pub fn from_name(name: &str) -> Option<Type> {
        Type::BUILTINS.iter().copied().find(|ty| ty.name() == name)
    }

    /// Assignment compatibility. Reflexive only; literal kinds reach this
    /// point already mapped through [`LiteralKind::builtin`].
    pub fn is_compatible_with(&self, other: Type) -> bool {
        *self == other
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Lexical class of a literal, before it is mapped onto a built-in type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LiteralKind {
    Int,
    Str,
    Bool,
}

/// Generic literal kinds and the built-in type each one stands for.
const LITERAL_ALIASES: [(LiteralKind, Type); 3] = [
    (LiteralKind::Int, Type::Integer),
    (LiteralKind::Str, Type::Char),
    (LiteralKind::Bool, Type::Boolean),
];

impl LiteralKind {
    pub fn builtin(&self) -> Type {
        LITERAL_ALIASES
            .iter()
            .find(|(kind, _)| kind == self)
            .map(|(_, ty)| *ty)
            .unwrap_or(Type::Integer)
    }

    pub fn name(&self) -> &'static str {
        match self {
            LiteralKind::Int => "int",
            LiteralKind::Str => "str",
            LiteralKind::Bool => "bool",
        }
    }
}

/// Result type of an operator applied to operands of type `operand`, or
/// `None` when the operator does not accept that type.
pub fn operator_result(op: BinaryOperator, operand: Type) -> Option<Type> {
    use BinaryOperator::*;
    let allowed: &[Type] = match op {
        Add => &[Type::Integer, Type::Char],
        Sub | Mul | DivReal | DivInt | Mod => &[Type::Integer],
        Lt | Le | Gt | Ge => &[Type::Integer, Type::Char],
        Eq | Ne => &[Type::Integer, Type::Char, Type::Boolean],
        And | Or => &[Type::Boolean],
    };
    if !allowed.contains(&operand) {
        return None;
    }
    Some(match op {
        Add => operand,
        Sub | Mul | DivReal | DivInt | Mod => Type::Integer,
        Lt | Le | Gt | Ge | Eq | Ne | And | Or => Type::Boolean,
    })
}
