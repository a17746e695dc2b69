use crate::ast::BinaryOperator;
use crate::codegen::instruction::{CilType, ElementType, Instruction, MethodRef};
use crate::utils::config::runtime_functions::{CONSOLE, INT32, PARSE, READ_LINE, WRITE, WRITE_LINE};

/// Sink for generated instructions. The provided methods lower the
/// composite operations onto primitive opcodes.
pub trait CodeEmitter {
    fn emit(&mut self, instruction: Instruction);

    fn emit_label(&mut self, label: &str) {
        self.emit(Instruction::Label(label.to_string()));
    }

    fn emit_jump(&mut self, label: &str) {
        self.emit(Instruction::Br(label.to_string()));
    }

    fn emit_branch_if_false(&mut self, label: &str) {
        self.emit(Instruction::Brfalse(label.to_string()));
    }

    fn emit_branch_if_true(&mut self, label: &str) {
        self.emit(Instruction::Brtrue(label.to_string()));
    }

    fn emit_const(&mut self, value: i32) {
        self.emit(Instruction::LdcI4(value));
    }

    /// Binary operator on the two topmost stack values. The target has no
    /// opcode for `>=`, `<=` and `<>`; those are the inverse comparison
    /// followed by a compare-with-zero.
    fn emit_binary(&mut self, operator: BinaryOperator) {
        let base = match operator {
            BinaryOperator::Add => Instruction::Add,
            BinaryOperator::Sub => Instruction::Sub,
            BinaryOperator::Mul => Instruction::Mul,
            BinaryOperator::DivInt | BinaryOperator::DivReal => Instruction::Div,
            BinaryOperator::Mod => Instruction::Rem,
            BinaryOperator::And => Instruction::And,
            BinaryOperator::Or => Instruction::Or,
            BinaryOperator::Eq | BinaryOperator::Ne => Instruction::Ceq,
            BinaryOperator::Lt | BinaryOperator::Ge => Instruction::Clt,
            BinaryOperator::Gt | BinaryOperator::Le => Instruction::Cgt,
        };
        self.emit(base);
        if matches!(
            operator,
            BinaryOperator::Ne | BinaryOperator::Ge | BinaryOperator::Le
        ) {
            self.emit_const(0);
            self.emit(Instruction::Ceq);
        }
    }

    /// Console output of the value on top of the stack.
    fn emit_write(&mut self, ty: CilType, newline: bool) {
        let name = if newline { WRITE_LINE } else { WRITE };
        self.emit(Instruction::Call(MethodRef::external(
            CONSOLE,
            name,
            vec![ty],
            CilType::Void,
        )));
    }

    fn emit_write_newline(&mut self) {
        self.emit(Instruction::Call(MethodRef::external(
            CONSOLE,
            WRITE_LINE,
            Vec::new(),
            CilType::Void,
        )));
    }

    /// Push the next console line as a string.
    fn emit_read_line(&mut self) {
        self.emit(Instruction::Call(MethodRef::external(
            CONSOLE,
            READ_LINE,
            Vec::new(),
            CilType::String,
        )));
    }

    /// Read one line from the console and parse it as an `int32`.
    fn emit_read_int(&mut self) {
        self.emit_read_line();
        self.emit(Instruction::Call(MethodRef::external(
            INT32,
            PARSE,
            vec![CilType::String],
            CilType::Int32,
        )));
    }

    /// Allocate an array of `length` cells and leave it on the stack.
    fn emit_new_array(&mut self, element: ElementType, length: i32) {
        self.emit_const(length);
        self.emit(Instruction::Newarr(element));
    }
}

/// Collects instructions for one method body.
#[derive(Debug, Default)]
pub struct InstructionBuffer {
    instructions: Vec<Instruction>,
}

impl InstructionBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_instructions(self) -> Vec<Instruction> {
        self.instructions
    }
}

impl CodeEmitter for InstructionBuffer {
    fn emit(&mut self, instruction: Instruction) {
        self.instructions.push(instruction);
    }
}
