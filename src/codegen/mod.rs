pub mod assembly;
pub mod code_emitter;
pub mod expression_handlers;
pub mod instruction;
pub mod procedure_handlers;
pub mod routine_context;
pub mod statement_handlers;
pub mod symbol_helpers;

pub use assembly::{Assembly, Method, MethodKind, Slot};
pub use code_emitter::{CodeEmitter, InstructionBuffer};
pub use instruction::{CilType, ElementType, Instruction, MethodRef};

use crate::ast::Program;
use crate::codegen::routine_context::RoutineContext;
use crate::utils::config::cil::ENTRY_METHOD;
use crate::utils::errors::{CodegenError, CodegenResult};
use std::collections::HashMap;

/// What to do with a name that resolves to neither a parameter, a local
/// nor a known routine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnresolvedNamePolicy {
    /// Assigned names become `int32` locals, reads and calls push zero and
    /// bare calls emit nothing.
    #[default]
    ImplicitIntegerLocal,
    /// Every such name is a `CodegenError::UnresolvedName`.
    Reject,
}

/// Call signature of a user routine as seen from the call site.
#[derive(Debug, Clone)]
pub struct RoutineSig {
    pub method: MethodRef,
    pub is_function: bool,
}

/// Lower a program into an assembly with the default policy.
pub fn generate(program: &Program) -> CodegenResult<Assembly> {
    generate_with(program, UnresolvedNamePolicy::default())
}

pub fn generate_with(program: &Program, policy: UnresolvedNamePolicy) -> CodegenResult<Assembly> {
    CodeGenerator::new(policy).generate(program)
}

pub struct CodeGenerator {
    pub(crate) label_counter: usize,
    pub(crate) policy: UnresolvedNamePolicy,
    // Routine signatures, one map per lexical nesting level
    pub(crate) routines: Vec<HashMap<String, RoutineSig>>,
    pub(crate) methods: Vec<Method>,
    pub(crate) context: RoutineContext,
}

impl CodeGenerator {
    pub fn new(policy: UnresolvedNamePolicy) -> Self {
        Self {
            label_counter: 0,
            policy,
            routines: Vec::new(),
            methods: Vec::new(),
            context: RoutineContext::entry(ENTRY_METHOD),
        }
    }

    pub fn generate(mut self, program: &Program) -> CodegenResult<Assembly> {
        procedure_handlers::handle_program(&mut self, program)?;
        Ok(Assembly {
            name: program.name.name.clone(),
            methods: self.methods,
        })
    }

    pub fn create_label(&mut self) -> String {
        let label = format!("L{}", self.label_counter);
        self.label_counter += 1;
        label
    }

    /// Apply the unresolved-name policy. `Ok(())` means fall back.
    pub(crate) fn unresolved(&self, name: &str) -> CodegenResult<()> {
        match self.policy {
            UnresolvedNamePolicy::ImplicitIntegerLocal => Ok(()),
            UnresolvedNamePolicy::Reject => Err(CodegenError::UnresolvedName {
                name: name.to_string(),
                routine: self.context.method_name.clone(),
            }),
        }
    }

    pub(crate) fn lookup_routine(&self, name: &str) -> Option<&RoutineSig> {
        self.routines.iter().rev().find_map(|scope| scope.get(name))
    }
}

impl CodeEmitter for CodeGenerator {
    fn emit(&mut self, instruction: Instruction) {
        self.context.code.emit(instruction);
    }
}
