use super::expression_handlers::emit_expression;
use super::{symbol_helpers, CodeGenerator};
use crate::ast::{Assign, AssignTarget, Call, Expr, For, If, Repeat, StatementList, Stmt, While};
use crate::codegen::code_emitter::CodeEmitter;
use crate::codegen::instruction::Instruction;
use crate::utils::errors::{CodegenError, CodegenResult};

pub fn handle_statement(gen: &mut CodeGenerator, stmt: &Stmt) -> CodegenResult<()> {
    match stmt {
        Stmt::Assign(assign) => handle_assign(gen, assign),
        Stmt::Call(call) => handle_call(gen, call),
        Stmt::If(if_stmt) => handle_if(gen, if_stmt),
        Stmt::While(while_stmt) => handle_while(gen, while_stmt),
        Stmt::For(for_stmt) => handle_for(gen, for_stmt),
        Stmt::Repeat(repeat) => handle_repeat(gen, repeat),
        Stmt::Compound(list) => handle_statement_list(gen, list),
    }
}

pub fn handle_statement_list(gen: &mut CodeGenerator, list: &StatementList) -> CodegenResult<()> {
    for stmt in &list.statements {
        handle_statement(gen, stmt)?;
    }
    Ok(())
}

pub fn handle_assign(gen: &mut CodeGenerator, assign: &Assign) -> CodegenResult<()> {
    match &assign.target {
        AssignTarget::Variable(ident) => {
            emit_expression(gen, &assign.value)?;
            symbol_helpers::emit_store_variable(gen, &ident.name)
        }
        AssignTarget::Element(element) => {
            let element_type =
                symbol_helpers::emit_element_address(gen, &element.array.name, &element.index)?;
            emit_expression(gen, &assign.value)?;
            match element_type {
                Some(ty) => gen.emit(Instruction::Stelem(ty)),
                // Unknown array: the value is computed and dropped
                None => gen.emit(Instruction::Pop),
            }
            Ok(())
        }
    }
}

/// A call in statement position. Built-in routines are only recognised
/// when no user routine of that name is visible.
pub fn handle_call(gen: &mut CodeGenerator, call: &Call) -> CodegenResult<()> {
    if let Some(sig) = gen.lookup_routine(&call.callee.name).cloned() {
        for arg in &call.args {
            emit_expression(gen, arg)?;
        }
        gen.emit(Instruction::Call(sig.method));
        if sig.is_function {
            gen.emit(Instruction::Pop);
        }
        return Ok(());
    }

    if !symbol_helpers::is_builtin(&call.callee.name) {
        return gen.unresolved(&call.callee.name);
    }
    match call.callee.name.to_ascii_lowercase().as_str() {
        "write" => handle_write(gen, &call.args, false),
        "writeln" => handle_write(gen, &call.args, true),
        "read" => handle_read(gen, &call.args, false),
        _ => handle_read(gen, &call.args, true),
    }
}

/// One console call per argument. `writeln` ends the line after the last
/// argument, or on its own when there are none.
fn handle_write(gen: &mut CodeGenerator, args: &[Expr], newline: bool) -> CodegenResult<()> {
    if args.is_empty() {
        if newline {
            gen.emit_write_newline();
        }
        return Ok(());
    }
    let last = args.len() - 1;
    for (i, arg) in args.iter().enumerate() {
        let ty = symbol_helpers::expression_type(gen, arg);
        emit_expression(gen, arg)?;
        gen.emit_write(ty, newline && i == last);
    }
    Ok(())
}

fn handle_read(gen: &mut CodeGenerator, args: &[Expr], line: bool) -> CodegenResult<()> {
    if args.is_empty() {
        if line {
            // Discard the rest of the input line
            gen.emit_read_line();
            gen.emit(Instruction::Pop);
        }
        return Ok(());
    }
    for arg in args {
        match arg {
            Expr::Identifier(ident) => {
                gen.emit_read_int();
                symbol_helpers::emit_store_variable(gen, &ident.name)?;
            }
            Expr::ArrayElement(element) => {
                let element_type = symbol_helpers::emit_element_address(
                    gen,
                    &element.array.name,
                    &element.index,
                )?;
                gen.emit_read_int();
                match element_type {
                    Some(ty) => gen.emit(Instruction::Stelem(ty)),
                    None => gen.emit(Instruction::Pop),
                }
            }
            _ => {}
        }
    }
    Ok(())
}

pub fn handle_if(gen: &mut CodeGenerator, stmt: &If) -> CodegenResult<()> {
    let else_label = gen.create_label();
    let end_label = gen.create_label();

    emit_expression(gen, &stmt.condition)?;
    gen.emit_branch_if_false(&else_label);
    handle_statement(gen, &stmt.then_branch)?;
    gen.emit_jump(&end_label);
    gen.emit_label(&else_label);
    if let Some(else_branch) = &stmt.else_branch {
        handle_statement(gen, else_branch)?;
    }
    gen.emit_label(&end_label);
    Ok(())
}

pub fn handle_while(gen: &mut CodeGenerator, stmt: &While) -> CodegenResult<()> {
    let start_label = gen.create_label();
    let end_label = gen.create_label();

    gen.emit_label(&start_label);
    emit_expression(gen, &stmt.condition)?;
    gen.emit_branch_if_false(&end_label);
    handle_statement(gen, &stmt.body)?;
    gen.emit_jump(&start_label);
    gen.emit_label(&end_label);
    Ok(())
}

/// Runs while the loop variable is at most the bound, re-evaluating the
/// bound on every iteration.
pub fn handle_for(gen: &mut CodeGenerator, stmt: &For) -> CodegenResult<()> {
    let variable = stmt
        .variable()
        .ok_or(CodegenError::UnsupportedForInit {
            position: stmt.position,
        })?
        .name
        .clone();
    let start_label = gen.create_label();
    let end_label = gen.create_label();

    handle_assign(gen, &stmt.init)?;
    gen.emit_label(&start_label);
    symbol_helpers::emit_load_variable(gen, &variable)?;
    emit_expression(gen, &stmt.bound)?;
    gen.emit(Instruction::Cgt);
    gen.emit_branch_if_true(&end_label);
    handle_statement(gen, &stmt.body)?;
    symbol_helpers::emit_load_variable(gen, &variable)?;
    gen.emit_const(1);
    gen.emit(Instruction::Add);
    symbol_helpers::emit_store_variable(gen, &variable)?;
    gen.emit_jump(&start_label);
    gen.emit_label(&end_label);
    Ok(())
}

/// Post-test loop: the body runs until the condition becomes true.
pub fn handle_repeat(gen: &mut CodeGenerator, stmt: &Repeat) -> CodegenResult<()> {
    let start_label = gen.create_label();

    gen.emit_label(&start_label);
    handle_statement_list(gen, &stmt.body)?;
    emit_expression(gen, &stmt.condition)?;
    gen.emit_branch_if_false(&start_label);
    Ok(())
}
