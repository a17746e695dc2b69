use super::{symbol_helpers, CodeGenerator};
use crate::ast::{BinaryOp, Call, Expr, Literal, LiteralValue};
use crate::codegen::code_emitter::CodeEmitter;
use crate::codegen::instruction::Instruction;
use crate::utils::errors::CodegenResult;

/// Post-order lowering: operands first, then the operator.
pub fn emit_expression(gen: &mut CodeGenerator, expr: &Expr) -> CodegenResult<()> {
    match expr {
        Expr::Literal(literal) => {
            handle_literal(gen, literal);
            Ok(())
        }
        Expr::Identifier(ident) => symbol_helpers::emit_load_variable(gen, &ident.name),
        Expr::ArrayElement(element) => {
            match symbol_helpers::emit_element_address(gen, &element.array.name, &element.index)? {
                Some(ty) => gen.emit(Instruction::Ldelem(ty)),
                None => gen.emit_const(0),
            }
            Ok(())
        }
        Expr::BinaryOp(binop) => handle_binary_operation(gen, binop),
        Expr::Call(call) => handle_call_expression(gen, call),
    }
}

pub fn handle_literal(gen: &mut CodeGenerator, literal: &Literal) {
    match &literal.value {
        LiteralValue::Integer(n) => gen.emit_const(*n),
        LiteralValue::Char(c) => gen.emit_const(*c as i32),
        LiteralValue::Boolean(b) => gen.emit_const(i32::from(*b)),
        LiteralValue::Str(s) => gen.emit(Instruction::Ldstr(s.clone())),
    }
}

pub fn handle_binary_operation(gen: &mut CodeGenerator, binop: &BinaryOp) -> CodegenResult<()> {
    emit_expression(gen, &binop.left)?;
    emit_expression(gen, &binop.right)?;
    gen.emit_binary(binop.operator);
    Ok(())
}

/// Push the arguments and call a user routine; always leaves one value.
pub fn handle_call_expression(gen: &mut CodeGenerator, call: &Call) -> CodegenResult<()> {
    let Some(sig) = gen.lookup_routine(&call.callee.name).cloned() else {
        gen.unresolved(&call.callee.name)?;
        gen.emit_const(0);
        return Ok(());
    };
    for arg in &call.args {
        emit_expression(gen, arg)?;
    }
    gen.emit(Instruction::Call(sig.method));
    if !sig.is_function {
        // A procedure has no value to contribute
        gen.emit_const(0);
    }
    Ok(())
}
