// CIL container constants
pub mod cil {
    pub const CLASS_NAME: &str = "Program";
    pub const BASE_CLASS: &str = "[mscorlib]System.Object";
    pub const ENTRY_METHOD: &str = "Main";
    pub const ASSEMBLY_VERSION: &str = "1:0:0:0";

    // Lower bound for the .maxstack hint of every method
    pub const DEFAULT_MAX_STACK: usize = 8;

    pub const INSTRUCTION_INDENT: &str = "    ";
    pub const METHOD_INDENT: &str = "  ";

    // Name of the implicit local holding a function's return value
    pub const RESULT_LOCAL: &str = "result";

    // Separator used when flattening nested routines into class methods.
    // Source identifiers cannot contain it, so flattened names never clash
    // with a routine declared at an outer level.
    pub const NESTED_NAME_SEPARATOR: &str = "$";
}

// Runtime function names
pub mod runtime_functions {
    pub const CONSOLE: &str = "[mscorlib]System.Console";
    pub const INT32: &str = "[mscorlib]System.Int32";
    pub const WRITE: &str = "Write";
    pub const WRITE_LINE: &str = "WriteLine";
    pub const READ_LINE: &str = "ReadLine";
    pub const PARSE: &str = "Parse";

    // Source-level names of the built-in routines
    pub const BUILTIN_ROUTINES: [&str; 4] = ["read", "readln", "write", "writeln"];
}

// Syntax limits
pub mod parser {
    // Deepest run of nested blocks, statements or parenthesised expressions
    pub const MAX_NESTING_DEPTH: usize = 100;
}

// Reference interpreter limits
pub mod vm {
    pub const MAX_STEPS: usize = 1_000_000;
    pub const MAX_CALL_DEPTH: usize = 256;
}

// Identifier handling for emitted IL
pub mod naming {
    use lazy_static::lazy_static;
    use std::collections::HashSet;

    lazy_static! {
        pub static ref IL_RESERVED: HashSet<&'static str> = [
            "add", "and", "or", "sub", "mul", "div", "rem", "ceq", "cgt", "clt", "br",
            "brfalse", "brtrue", "call", "ret", "pop", "ldloc", "stloc", "ldarg", "starg",
            "ldstr", "newarr", "ldelem", "stelem", "nop", "dup", "neg", "not", "xor",
            "int32", "int64", "bool", "char", "string", "void", "object", "class",
            "method", "static", "private", "public", "cil", "managed", "hidebysig",
            "init", "locals", "entrypoint", "maxstack", "assembly", "module", "extern",
            "value", "instance", "native", "to", "field", "type", "auto", "ansi",
        ]
        .iter()
        .copied()
        .collect();
    }

    /// Quote a source identifier when it collides with an ILAsm keyword.
    pub fn quote_identifier(name: &str) -> String {
        if IL_RESERVED.contains(name.to_ascii_lowercase().as_str()) {
            format!("'{}'", name)
        } else {
            name.to_string()
        }
    }
}
