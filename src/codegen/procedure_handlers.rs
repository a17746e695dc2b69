use super::statement_handlers::handle_statement_list;
use super::{CodeGenerator, RoutineSig, UnresolvedNamePolicy};
use crate::ast::{AssignTarget, DeclSection, Expr, Program, Routine, StatementList, Stmt, VarDeclKind};
use crate::codegen::assembly::Slot;
use crate::codegen::code_emitter::CodeEmitter;
use crate::codegen::instruction::{CilType, ElementType, Instruction, MethodRef};
use crate::codegen::routine_context::{ArrayInfo, RoutineContext};
use crate::semantic::types::Type;
use crate::utils::config::cil::NESTED_NAME_SEPARATOR;
use crate::utils::errors::CodegenResult;
use std::collections::HashMap;
use std::mem;

/// Lower the whole program. Routines are emitted before the entry method,
/// each nested routine before the routine that contains it.
pub fn handle_program(gen: &mut CodeGenerator, program: &Program) -> CodegenResult<()> {
    let decls = program.decls.as_ref();
    gen.routines.push(routine_signatures(decls, ""));
    if let Some(decls) = decls {
        for routine in decls.routines() {
            generate_routine(gen, routine, "")?;
        }
    }

    if let Some(decls) = decls {
        declare_variables(&mut gen.context, decls);
    }
    emit_prologue(gen, &program.body);
    handle_statement_list(gen, &program.body)?;
    gen.emit(Instruction::Ret);

    let context = mem::replace(&mut gen.context, RoutineContext::entry(""));
    gen.methods.push(context.finish());
    gen.routines.pop();
    Ok(())
}

fn mangle(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{}{}{}", prefix, NESTED_NAME_SEPARATOR, name)
    }
}

fn param_slots(routine: Routine<'_>) -> Vec<Slot> {
    routine
        .params()
        .iter()
        .map(|param| {
            let ty = param
                .ty
                .as_ref()
                .map_or(CilType::Int32, |ty| CilType::from_name(&ty.name));
            Slot::new(param.name.name.clone(), ty)
        })
        .collect()
}

fn signature(routine: Routine<'_>, prefix: &str) -> RoutineSig {
    let params = param_slots(routine).into_iter().map(|slot| slot.ty).collect();
    let return_type = routine
        .return_type()
        .map_or(CilType::Void, |ty| CilType::from_name(&ty.name));
    RoutineSig {
        method: MethodRef::local(mangle(prefix, &routine.name().name), params, return_type),
        is_function: routine.return_type().is_some(),
    }
}

/// Signatures of every routine declared directly in `decls`, so calls can
/// reach routines declared later in the same section.
fn routine_signatures(decls: Option<&DeclSection>, prefix: &str) -> HashMap<String, RoutineSig> {
    decls
        .into_iter()
        .flat_map(DeclSection::routines)
        .map(|routine| (routine.name().name.clone(), signature(routine, prefix)))
        .collect()
}

fn generate_routine(gen: &mut CodeGenerator, routine: Routine<'_>, prefix: &str) -> CodegenResult<()> {
    let sig = signature(routine, prefix);
    let method_name = sig.method.name.clone();

    gen.routines.push(routine_signatures(routine.decls(), &method_name));
    if let Some(decls) = routine.decls() {
        for nested in decls.routines() {
            generate_routine(gen, nested, &method_name)?;
        }
    }

    let params = param_slots(routine);
    let context = match routine {
        Routine::Procedure(_) => RoutineContext::procedure(method_name, params),
        Routine::Function(decl) => RoutineContext::function(
            method_name,
            decl.name.name.clone(),
            params,
            sig.method.return_type,
        ),
    };
    let outer = mem::replace(&mut gen.context, context);

    if let Some(decls) = routine.decls() {
        declare_variables(&mut gen.context, decls);
    }
    emit_prologue(gen, routine.body());
    handle_statement_list(gen, routine.body())?;
    if let Some(slot) = gen.context.result_slot() {
        gen.emit(Instruction::Ldloc(slot));
    }
    gen.emit(Instruction::Ret);

    let context = mem::replace(&mut gen.context, outer);
    gen.methods.push(context.finish());
    gen.routines.pop();
    Ok(())
}

fn declare_variables(context: &mut RoutineContext, decls: &DeclSection) {
    for section in decls.var_sections() {
        for decl in &section.decls {
            match decl {
                VarDeclKind::Var(var) => {
                    let ty = CilType::from_name(&var.ty.name);
                    for name in var.names.iter() {
                        context.declare_local(&name.name, ty);
                    }
                }
                VarDeclKind::Array(array) => {
                    let element = Type::from_name(&array.element.name)
                        .map_or(ElementType::Int32, ElementType::from_type);
                    let info = ArrayInfo {
                        element,
                        lower: array.lower.as_integer().unwrap_or(0),
                        upper: array.upper.as_integer().unwrap_or(0),
                    };
                    for name in array.names.iter() {
                        context.declare_array(&name.name, info);
                    }
                }
            }
        }
    }
}

/// Declare the implicit locals of a body and allocate its arrays.
fn emit_prologue(gen: &mut CodeGenerator, body: &StatementList) {
    if gen.policy == UnresolvedNamePolicy::ImplicitIntegerLocal {
        let mut names = Vec::new();
        collect_assigned(body, &mut names);
        for name in names {
            if !gen.context.is_known(&name) {
                gen.context.declare_local(&name, CilType::Int32);
            }
        }
    }
    for (slot, info) in gen.context.array_locals() {
        gen.emit_new_array(info.element, info.length());
        gen.emit(Instruction::Stloc(slot));
    }
}

/// Scalar names written by a body: assignment targets, loop variables and
/// `read` arguments, in order of first appearance.
fn collect_assigned(list: &StatementList, names: &mut Vec<String>) {
    for stmt in &list.statements {
        collect_stmt(stmt, names);
    }
}

fn push_unique(names: &mut Vec<String>, name: &str) {
    if !names.iter().any(|n| n == name) {
        names.push(name.to_string());
    }
}

fn collect_stmt(stmt: &Stmt, names: &mut Vec<String>) {
    match stmt {
        Stmt::Assign(assign) => {
            if let AssignTarget::Variable(ident) = &assign.target {
                push_unique(names, &ident.name);
            }
        }
        Stmt::Call(call) => {
            let callee = call.callee.name.to_ascii_lowercase();
            if callee == "read" || callee == "readln" {
                for arg in &call.args {
                    if let Expr::Identifier(ident) = arg {
                        push_unique(names, &ident.name);
                    }
                }
            }
        }
        Stmt::If(if_stmt) => {
            collect_stmt(&if_stmt.then_branch, names);
            if let Some(else_branch) = &if_stmt.else_branch {
                collect_stmt(else_branch, names);
            }
        }
        Stmt::While(while_stmt) => collect_stmt(&while_stmt.body, names),
        Stmt::For(for_stmt) => {
            if let Some(variable) = for_stmt.variable() {
                push_unique(names, &variable.name);
            }
            collect_stmt(&for_stmt.body, names);
        }
        Stmt::Repeat(repeat) => collect_assigned(&repeat.body, names),
        Stmt::Compound(list) => collect_assigned(list, names),
    }
}
