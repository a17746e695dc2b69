use crate::codegen::instruction::{CilType, Instruction};
use crate::utils::config::cil::{
    ASSEMBLY_VERSION, BASE_CLASS, CLASS_NAME, DEFAULT_MAX_STACK, INSTRUCTION_INDENT, METHOD_INDENT,
};
use crate::utils::config::naming::quote_identifier;
use std::collections::HashMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MethodKind {
    Entry,
    Procedure,
    Function,
}

/// A named, typed parameter or local slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slot {
    pub name: String,
    pub ty: CilType,
}

impl Slot {
    pub fn new(name: impl Into<String>, ty: CilType) -> Self {
        Self {
            name: name.into(),
            ty,
        }
    }
}

/// One static method of the generated class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Method {
    pub name: String,
    pub kind: MethodKind,
    pub return_type: CilType,
    pub params: Vec<Slot>,
    pub locals: Vec<Slot>,
    pub body: Vec<Instruction>,
    pub max_stack: usize,
}

impl Method {
    pub fn new(
        name: impl Into<String>,
        kind: MethodKind,
        return_type: CilType,
        params: Vec<Slot>,
        locals: Vec<Slot>,
        body: Vec<Instruction>,
    ) -> Self {
        let max_stack = max_stack_depth(&body).max(DEFAULT_MAX_STACK);
        Self {
            name: name.into(),
            kind,
            return_type,
            params,
            locals,
            body,
            max_stack,
        }
    }

    /// Position of every label in the body.
    pub fn labels(&self) -> HashMap<&str, usize> {
        self.body
            .iter()
            .enumerate()
            .filter_map(|(i, instruction)| match instruction {
                Instruction::Label(label) => Some((label.as_str(), i)),
                _ => None,
            })
            .collect()
    }
}

/// Deepest evaluation stack reached by a straight walk of the body. Depth
/// at a label is the depth recorded at the first branch to it.
fn max_stack_depth(body: &[Instruction]) -> usize {
    let mut at_label: HashMap<&str, usize> = HashMap::new();
    let mut depth = 0usize;
    let mut max = 0usize;
    for instruction in body {
        if let Instruction::Label(label) = instruction {
            if let Some(&recorded) = at_label.get(label.as_str()) {
                depth = recorded;
            }
        }
        let (pops, pushes) = instruction.stack_effect();
        depth = depth.saturating_sub(pops) + pushes;
        max = max.max(depth);
        if let Some(target) = instruction.branch_target() {
            at_label.entry(target).or_insert(depth);
        }
        if instruction.is_terminator() {
            depth = 0;
        }
    }
    max
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let params: Vec<String> = self
            .params
            .iter()
            .map(|p| format!("{} {}", p.ty, quote_identifier(&p.name)))
            .collect();
        writeln!(
            f,
            "{}.method private hidebysig static {} {}({}) cil managed",
            METHOD_INDENT,
            self.return_type,
            quote_identifier(&self.name),
            params.join(", ")
        )?;
        writeln!(f, "{}{{", METHOD_INDENT)?;
        if self.kind == MethodKind::Entry {
            writeln!(f, "{}.entrypoint", INSTRUCTION_INDENT)?;
        }
        writeln!(f, "{}.maxstack {}", INSTRUCTION_INDENT, self.max_stack)?;
        if !self.locals.is_empty() {
            let locals: Vec<String> = self
                .locals
                .iter()
                .enumerate()
                .map(|(i, slot)| format!("[{}] {} {}", i, slot.ty, quote_identifier(&slot.name)))
                .collect();
            writeln!(
                f,
                "{}.locals init ({})",
                INSTRUCTION_INDENT,
                locals.join(", ")
            )?;
        }
        for instruction in &self.body {
            match instruction {
                // Labels sit at method indentation so branches stand out
                Instruction::Label(_) => writeln!(f, "{}{}", METHOD_INDENT, instruction)?,
                _ => writeln!(f, "{}{}", INSTRUCTION_INDENT, instruction)?,
            }
        }
        writeln!(f, "{}}}", METHOD_INDENT)
    }
}

/// The whole translation unit: one class holding every generated method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assembly {
    pub name: String,
    pub methods: Vec<Method>,
}

impl Assembly {
    pub fn method(&self, name: &str) -> Option<&Method> {
        self.methods.iter().find(|method| method.name == name)
    }

    pub fn entry(&self) -> Option<&Method> {
        self.methods
            .iter()
            .find(|method| method.kind == MethodKind::Entry)
    }

    /// All instructions of all methods, in emission order.
    pub fn instruction_count(&self) -> usize {
        self.methods.iter().map(|method| method.body.len()).sum()
    }
}

impl fmt::Display for Assembly {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = quote_identifier(&self.name);
        writeln!(f, ".assembly extern mscorlib {{}}")?;
        writeln!(f, ".assembly {}", name)?;
        writeln!(f, "{{")?;
        writeln!(f, "{}.ver {}", METHOD_INDENT, ASSEMBLY_VERSION)?;
        writeln!(f, "}}")?;
        writeln!(f)?;
        writeln!(f, ".module {}.exe", name)?;
        writeln!(f)?;
        writeln!(f, ".class private auto ansi beforefieldinit {}", CLASS_NAME)?;
        writeln!(f, "       extends {}", BASE_CLASS)?;
        writeln!(f, "{{")?;
        for (i, method) in self.methods.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            write!(f, "{}", method)?;
        }
        writeln!(f, "}}")
    }
}
