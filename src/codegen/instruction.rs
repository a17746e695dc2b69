use crate::semantic::types::Type;
use crate::utils::config::cil::CLASS_NAME;
use crate::utils::config::naming::quote_identifier;
use std::fmt;

/// Value types that appear in signatures and local slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CilType {
    Void,
    Int32,
    Bool,
    Char,
    String,
    Array(ElementType),
    StringArray,
}

/// Element type of a single-dimension array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementType {
    Int32,
    Bool,
    Char,
}

impl CilType {
    pub fn from_type(ty: Type) -> Self {
        match ty {
            Type::Integer => CilType::Int32,
            Type::Boolean => CilType::Bool,
            Type::Char => CilType::Char,
        }
    }

    /// Map a source type name. Unknown names default to `int32`.
    pub fn from_name(name: &str) -> Self {
        Type::from_name(name).map_or(CilType::Int32, CilType::from_type)
    }

    pub fn is_void(&self) -> bool {
        *self == CilType::Void
    }
}

impl ElementType {
    pub fn from_type(ty: Type) -> Self {
        match ty {
            Type::Integer => ElementType::Int32,
            Type::Boolean => ElementType::Bool,
            Type::Char => ElementType::Char,
        }
    }

    fn class_name(&self) -> &'static str {
        match self {
            ElementType::Int32 => "[mscorlib]System.Int32",
            ElementType::Bool => "[mscorlib]System.Boolean",
            ElementType::Char => "[mscorlib]System.Char",
        }
    }

    fn load_suffix(&self) -> &'static str {
        match self {
            ElementType::Int32 => "i4",
            ElementType::Bool => "i1",
            ElementType::Char => "u2",
        }
    }

    fn store_suffix(&self) -> &'static str {
        match self {
            ElementType::Int32 => "i4",
            ElementType::Bool => "i1",
            ElementType::Char => "i2",
        }
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ElementType::Int32 => "int32",
            ElementType::Bool => "bool",
            ElementType::Char => "char",
        };
        f.write_str(name)
    }
}

impl fmt::Display for CilType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CilType::Void => f.write_str("void"),
            CilType::Int32 => f.write_str("int32"),
            CilType::Bool => f.write_str("bool"),
            CilType::Char => f.write_str("char"),
            CilType::String => f.write_str("string"),
            CilType::Array(element) => write!(f, "{}[]", element),
            CilType::StringArray => f.write_str("string[]"),
        }
    }
}

/// Fully qualified call target, e.g. `void [mscorlib]System.Console::WriteLine(int32)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodRef {
    pub return_type: CilType,
    pub owner: String,
    pub name: String,
    pub params: Vec<CilType>,
}

impl MethodRef {
    /// A static method of the generated class.
    pub fn local(name: impl Into<String>, params: Vec<CilType>, return_type: CilType) -> Self {
        Self {
            return_type,
            owner: CLASS_NAME.to_string(),
            name: name.into(),
            params,
        }
    }

    pub fn external(owner: &str, name: &str, params: Vec<CilType>, return_type: CilType) -> Self {
        Self {
            return_type,
            owner: owner.to_string(),
            name: name.to_string(),
            params,
        }
    }

    pub fn is_local(&self) -> bool {
        self.owner == CLASS_NAME
    }
}

impl fmt::Display for MethodRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let params: Vec<String> = self.params.iter().map(|p| p.to_string()).collect();
        let name = if self.is_local() {
            quote_identifier(&self.name)
        } else {
            self.name.clone()
        };
        write!(
            f,
            "{} {}::{}({})",
            self.return_type,
            self.owner,
            name,
            params.join(", ")
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instruction {
    LdcI4(i32),
    Ldstr(String),
    Ldloc(usize),
    Stloc(usize),
    Ldarg(usize),
    Starg(usize),
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    And,
    Or,
    Ceq,
    Cgt,
    Clt,
    Label(String),
    Br(String),
    Brfalse(String),
    Brtrue(String),
    Call(MethodRef),
    Newarr(ElementType),
    Ldelem(ElementType),
    Stelem(ElementType),
    Pop,
    Ret,
}

impl Instruction {
    /// Number of stack slots the instruction pops and pushes.
    pub fn stack_effect(&self) -> (usize, usize) {
        match self {
            Instruction::LdcI4(_)
            | Instruction::Ldstr(_)
            | Instruction::Ldloc(_)
            | Instruction::Ldarg(_) => (0, 1),
            Instruction::Stloc(_) | Instruction::Starg(_) | Instruction::Pop => (1, 0),
            Instruction::Add
            | Instruction::Sub
            | Instruction::Mul
            | Instruction::Div
            | Instruction::Rem
            | Instruction::And
            | Instruction::Or
            | Instruction::Ceq
            | Instruction::Cgt
            | Instruction::Clt => (2, 1),
            Instruction::Label(_) | Instruction::Br(_) => (0, 0),
            Instruction::Brfalse(_) | Instruction::Brtrue(_) => (1, 0),
            Instruction::Call(method) => {
                let pushes = usize::from(!method.return_type.is_void());
                (method.params.len(), pushes)
            }
            Instruction::Newarr(_) => (1, 1),
            Instruction::Ldelem(_) => (2, 1),
            Instruction::Stelem(_) => (3, 0),
            // The evaluation stack must be empty or hold just the return value
            Instruction::Ret => (0, 0),
        }
    }

    /// Whether control never falls through to the next instruction.
    pub fn is_terminator(&self) -> bool {
        matches!(self, Instruction::Br(_) | Instruction::Ret)
    }

    pub fn branch_target(&self) -> Option<&str> {
        match self {
            Instruction::Br(label) | Instruction::Brfalse(label) | Instruction::Brtrue(label) => {
                Some(label)
            }
            _ => None,
        }
    }
}

/// Body of an ILAsm quoted string. ILAsm understands `\t`, `\n`, `\"`,
/// `\\` and three-digit octal escapes, nothing else.
pub fn escape_il_string(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '"' => escaped.push_str("\\\""),
            '\\' => escaped.push_str("\\\\"),
            '\n' => escaped.push_str("\\n"),
            '\t' => escaped.push_str("\\t"),
            c if c.is_control() => escaped.push_str(&format!("\\{:03o}", c as u32)),
            c => escaped.push(c),
        }
    }
    escaped
}

fn slot_form(f: &mut fmt::Formatter<'_>, opcode: &str, index: usize, short_max: usize) -> fmt::Result {
    if index <= short_max {
        write!(f, "{}.{}", opcode, index)
    } else if index <= u8::MAX as usize {
        write!(f, "{}.s {}", opcode, index)
    } else {
        write!(f, "{} {}", opcode, index)
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Instruction::LdcI4(-1) => f.write_str("ldc.i4.m1"),
            Instruction::LdcI4(n @ 0..=8) => write!(f, "ldc.i4.{}", n),
            Instruction::LdcI4(n @ -128..=127) => write!(f, "ldc.i4.s {}", n),
            Instruction::LdcI4(n) => write!(f, "ldc.i4 {}", n),
            Instruction::Ldstr(s) => write!(f, "ldstr \"{}\"", escape_il_string(s)),
            Instruction::Ldloc(i) => slot_form(f, "ldloc", *i, 3),
            Instruction::Stloc(i) => slot_form(f, "stloc", *i, 3),
            Instruction::Ldarg(i) => slot_form(f, "ldarg", *i, 3),
            // starg has no indexed short forms, only starg.s
            Instruction::Starg(i) if *i <= u8::MAX as usize => write!(f, "starg.s {}", i),
            Instruction::Starg(i) => write!(f, "starg {}", i),
            Instruction::Add => f.write_str("add"),
            Instruction::Sub => f.write_str("sub"),
            Instruction::Mul => f.write_str("mul"),
            Instruction::Div => f.write_str("div"),
            Instruction::Rem => f.write_str("rem"),
            Instruction::And => f.write_str("and"),
            Instruction::Or => f.write_str("or"),
            Instruction::Ceq => f.write_str("ceq"),
            Instruction::Cgt => f.write_str("cgt"),
            Instruction::Clt => f.write_str("clt"),
            Instruction::Label(label) => write!(f, "{}:", label),
            Instruction::Br(label) => write!(f, "br {}", label),
            Instruction::Brfalse(label) => write!(f, "brfalse {}", label),
            Instruction::Brtrue(label) => write!(f, "brtrue {}", label),
            Instruction::Call(method) => write!(f, "call {}", method),
            Instruction::Newarr(element) => write!(f, "newarr {}", element.class_name()),
            Instruction::Ldelem(element) => write!(f, "ldelem.{}", element.load_suffix()),
            Instruction::Stelem(element) => write!(f, "stelem.{}", element.store_suffix()),
            Instruction::Pop => f.write_str("pop"),
            Instruction::Ret => f.write_str("ret"),
        }
    }
}
