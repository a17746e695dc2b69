use super::CodeGenerator;
use crate::ast::{BinaryOperator, Expr, LiteralValue};
use crate::codegen::code_emitter::CodeEmitter;
use crate::codegen::instruction::{CilType, ElementType, Instruction};
use crate::codegen::routine_context::Storage;
use crate::utils::config::runtime_functions::BUILTIN_ROUTINES;
use crate::utils::errors::CodegenResult;

/// Push the value of a scalar name.
pub fn emit_load_variable(gen: &mut CodeGenerator, name: &str) -> CodegenResult<()> {
    if gen.context.is_result_name(name) {
        if let Some(slot) = gen.context.result_slot() {
            gen.emit(Instruction::Ldloc(slot));
            return Ok(());
        }
    }
    match gen.context.storage(name) {
        Some(Storage::Arg(i)) => gen.emit(Instruction::Ldarg(i)),
        Some(Storage::Local(i)) => gen.emit(Instruction::Ldloc(i)),
        None => {
            gen.unresolved(name)?;
            gen.emit_const(0);
        }
    }
    Ok(())
}

/// Pop the stack top into a scalar name.
pub fn emit_store_variable(gen: &mut CodeGenerator, name: &str) -> CodegenResult<()> {
    if gen.context.is_result_name(name) {
        if let Some(slot) = gen.context.result_slot() {
            gen.emit(Instruction::Stloc(slot));
            return Ok(());
        }
    }
    match gen.context.storage(name) {
        Some(Storage::Arg(i)) => gen.emit(Instruction::Starg(i)),
        Some(Storage::Local(i)) => gen.emit(Instruction::Stloc(i)),
        None => {
            gen.unresolved(name)?;
            let slot = gen.context.declare_local(name, CilType::Int32);
            gen.emit(Instruction::Stloc(slot));
        }
    }
    Ok(())
}

/// Push the array reference and the zero-based index of `array[index]`.
/// Returns the element type, or `None` when the array is unknown and the
/// policy allows falling back.
pub fn emit_element_address(
    gen: &mut CodeGenerator,
    array: &str,
    index: &Expr,
) -> CodegenResult<Option<ElementType>> {
    let (Some(info), Some(Storage::Local(slot))) =
        (gen.context.array(array), gen.context.storage(array))
    else {
        gen.unresolved(array)?;
        return Ok(None);
    };
    gen.emit(Instruction::Ldloc(slot));
    super::expression_handlers::emit_expression(gen, index)?;
    if info.lower != 0 {
        gen.emit_const(info.lower);
        gen.emit(Instruction::Sub);
    }
    Ok(Some(info.element))
}

pub fn is_builtin(name: &str) -> bool {
    BUILTIN_ROUTINES.contains(&name.to_ascii_lowercase().as_str())
}

/// Static type of an expression, used to pick console overloads.
pub fn expression_type(gen: &CodeGenerator, expr: &Expr) -> CilType {
    match expr {
        Expr::Literal(literal) => match literal.value {
            LiteralValue::Integer(_) => CilType::Int32,
            LiteralValue::Char(_) => CilType::Char,
            LiteralValue::Boolean(_) => CilType::Bool,
            LiteralValue::Str(_) => CilType::String,
        },
        Expr::Identifier(ident) => {
            if gen.context.is_result_name(&ident.name) {
                return gen.context.return_type;
            }
            gen.context
                .storage(&ident.name)
                .map_or(CilType::Int32, |storage| gen.context.storage_type(storage))
        }
        Expr::ArrayElement(element) => match gen.context.array(&element.array.name) {
            Some(info) => match info.element {
                ElementType::Int32 => CilType::Int32,
                ElementType::Bool => CilType::Bool,
                ElementType::Char => CilType::Char,
            },
            None => CilType::Int32,
        },
        Expr::BinaryOp(binop) => match binop.operator {
            op if op.is_comparison() => CilType::Bool,
            BinaryOperator::And | BinaryOperator::Or => CilType::Bool,
            BinaryOperator::Add => match expression_type(gen, &binop.left) {
                CilType::Char => CilType::Char,
                _ => CilType::Int32,
            },
            _ => CilType::Int32,
        },
        Expr::Call(call) => gen
            .lookup_routine(&call.callee.name)
            .filter(|sig| sig.is_function)
            .map_or(CilType::Int32, |sig| sig.method.return_type),
    }
}
