use std::{fs::File, io::Read, path::Path};

pub mod ast;
pub mod codegen;
pub mod frontend;
pub mod position;
pub mod semantic;
pub mod utils;
pub mod vm;

pub use codegen::{Assembly, UnresolvedNamePolicy};

use crate::ast::Program;
use crate::frontend::Parser;
use crate::utils::errors::{CompileError, CompileResult};

pub const VERSION: &str = "0.1.0";

/// Parse source text into a program tree.
pub fn parse(source: &str) -> CompileResult<Program> {
    Ok(Parser::new(source)?.parse()?)
}

pub fn analyze(program: &Program) -> CompileResult<()> {
    Ok(semantic::analyze(program)?)
}

pub fn generate(program: &Program) -> CompileResult<Assembly> {
    Ok(codegen::generate(program)?)
}

pub fn generate_with(program: &Program, policy: UnresolvedNamePolicy) -> CompileResult<Assembly> {
    Ok(codegen::generate_with(program, policy)?)
}

/// Run the whole pipeline with the default unresolved-name policy. The
/// first failing phase determines the error.
pub fn compile(source: &str) -> CompileResult<Assembly> {
    compile_with(source, UnresolvedNamePolicy::default())
}

pub fn compile_with(source: &str, policy: UnresolvedNamePolicy) -> CompileResult<Assembly> {
    let program = parse(source)?;
    analyze(&program)?;
    generate_with(&program, policy)
}

pub fn read(filename: &Path) -> CompileResult<String> {
    match filename.extension() {
        Some(ext) if ext == "pas" => {}
        _ => {
            return Err(CompileError::FileReadError(
                "File must have a .pas extension".to_string(),
            ))
        }
    }
    let mut file = File::open(filename)?;
    let mut contents = String::new();
    file.read_to_string(&mut contents)?;
    Ok(contents)
}
