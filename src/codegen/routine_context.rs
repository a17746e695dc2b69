use crate::codegen::assembly::{Method, MethodKind, Slot};
use crate::codegen::code_emitter::InstructionBuffer;
use crate::codegen::instruction::{CilType, ElementType};
use crate::utils::config::cil::RESULT_LOCAL;
use std::collections::HashMap;

/// Where a source name lives inside the current method.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Storage {
    Arg(usize),
    Local(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ArrayInfo {
    pub element: ElementType,
    pub lower: i32,
    pub upper: i32,
}

impl ArrayInfo {
    pub fn length(&self) -> i32 {
        self.upper - self.lower + 1
    }
}

/// Per-method state while one routine body is being generated.
#[derive(Debug)]
pub struct RoutineContext {
    pub method_name: String,
    pub kind: MethodKind,
    pub return_type: CilType,
    // Source name that denotes the result slot inside a function body
    function_name: Option<String>,
    signature: Vec<Slot>,
    params: Vec<Slot>,
    locals: Vec<Slot>,
    arrays: HashMap<String, ArrayInfo>,
    pub code: InstructionBuffer,
}

impl RoutineContext {
    /// The entry method. It takes the command-line arguments, which are not
    /// visible to the program source.
    pub fn entry(method_name: impl Into<String>) -> Self {
        Self {
            method_name: method_name.into(),
            kind: MethodKind::Entry,
            return_type: CilType::Void,
            function_name: None,
            signature: vec![Slot::new("args", CilType::StringArray)],
            params: Vec::new(),
            locals: Vec::new(),
            arrays: HashMap::new(),
            code: InstructionBuffer::new(),
        }
    }

    pub fn procedure(method_name: impl Into<String>, params: Vec<Slot>) -> Self {
        Self {
            method_name: method_name.into(),
            kind: MethodKind::Procedure,
            return_type: CilType::Void,
            function_name: None,
            signature: params.clone(),
            params,
            locals: Vec::new(),
            arrays: HashMap::new(),
            code: InstructionBuffer::new(),
        }
    }

    /// A function reserves local 0 for its result.
    pub fn function(
        method_name: impl Into<String>,
        source_name: impl Into<String>,
        params: Vec<Slot>,
        return_type: CilType,
    ) -> Self {
        Self {
            method_name: method_name.into(),
            kind: MethodKind::Function,
            return_type,
            function_name: Some(source_name.into()),
            signature: params.clone(),
            params,
            locals: vec![Slot::new(RESULT_LOCAL, return_type)],
            arrays: HashMap::new(),
            code: InstructionBuffer::new(),
        }
    }

    pub fn result_slot(&self) -> Option<usize> {
        self.function_name.as_ref().map(|_| 0)
    }

    /// Whether `name` is the enclosing function's own name.
    pub fn is_result_name(&self, name: &str) -> bool {
        self.function_name.as_deref() == Some(name)
    }

    // The result slot is never found by name
    fn first_named_local(&self) -> usize {
        usize::from(self.function_name.is_some())
    }

    /// Resolve a name: parameters win over locals.
    pub fn storage(&self, name: &str) -> Option<Storage> {
        if let Some(i) = self.params.iter().position(|slot| slot.name == name) {
            return Some(Storage::Arg(i));
        }
        self.locals
            .iter()
            .enumerate()
            .skip(self.first_named_local())
            .find(|(_, slot)| slot.name == name)
            .map(|(i, _)| Storage::Local(i))
    }

    pub fn storage_type(&self, storage: Storage) -> CilType {
        let slot = match storage {
            Storage::Arg(i) => self.params.get(i),
            Storage::Local(i) => self.locals.get(i),
        };
        slot.map_or(CilType::Int32, |slot| slot.ty)
    }

    /// Add a local unless one with that name already exists; returns its index.
    pub fn declare_local(&mut self, name: &str, ty: CilType) -> usize {
        if let Some(Storage::Local(i)) = self.storage(name) {
            return i;
        }
        self.locals.push(Slot::new(name, ty));
        self.locals.len() - 1
    }

    pub fn declare_array(&mut self, name: &str, info: ArrayInfo) -> usize {
        self.arrays.insert(name.to_string(), info);
        self.declare_local(name, CilType::Array(info.element))
    }

    pub fn array(&self, name: &str) -> Option<ArrayInfo> {
        self.arrays.get(name).copied()
    }

    /// Array locals with their slot, in slot order.
    pub fn array_locals(&self) -> Vec<(usize, ArrayInfo)> {
        self.locals
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| self.arrays.get(&slot.name).map(|info| (i, *info)))
            .collect()
    }

    pub fn is_known(&self, name: &str) -> bool {
        self.is_result_name(name) || self.storage(name).is_some()
    }

    pub fn finish(self) -> Method {
        Method::new(
            self.method_name,
            self.kind,
            self.return_type,
            self.signature,
            self.locals,
            self.code.into_instructions(),
        )
    }
}
