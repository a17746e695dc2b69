use clap::{Parser, ValueEnum};
use pascil::{
    self,
    ast::{Node, Program},
    codegen::{self, Assembly, UnresolvedNamePolicy},
    frontend::scan,
    read, semantic,
    utils::errors::{CompileError, CompileResult},
    vm::Machine,
};
use std::{fs, path::PathBuf, time::Instant};

#[derive(Parser)]
#[command(
    author,
    version,
    about = "Pascal-subset compiler that generates CIL assembly text",
    long_about = "Pascal-subset compiler that generates CIL assembly text.\n\
                 This compiler parses a small Pascal dialect, checks it and\n\
                 lowers it to ILAsm source for the .NET runtime.\n\
                 \n\
                 Example usage:\n\
                 pascil input.pas                    # Compile to input.il\n\
                 pascil input.pas -o output.il       # Specify output file\n\
                 pascil input.pas --print-il         # Print generated IL\n\
                 pascil input.pas --run --input 5    # Run in the reference interpreter\n\
                 pascil input.pas --show-ast         # Display abstract syntax tree\n\
                 pascil input.pas --timing           # Show compilation timing"
)]
struct Cli {
    // The path to the file to compile
    path: PathBuf,

    // Output file path (defaults to input file with .il extension)
    #[arg(short, long)]
    output: Option<PathBuf>,

    // Print the generated IL
    #[arg(short = 'i', long)]
    print_il: bool,

    // Run the program in the reference interpreter after compiling
    #[arg(short, long)]
    run: bool,

    // Lines fed to ReadLine when running
    #[arg(long, num_args = 1..)]
    input: Vec<String>,

    // What to do with names that resolve to nothing during code generation
    #[arg(long, value_enum, default_value_t = PolicyArg::Implicit)]
    policy: PolicyArg,

    // Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    // Show compilation timing
    #[arg(short, long)]
    timing: bool,

    // Show AST after parsing
    #[arg(long)]
    show_ast: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum PolicyArg {
    Implicit,
    Reject,
}

impl From<PolicyArg> for UnresolvedNamePolicy {
    fn from(arg: PolicyArg) -> Self {
        match arg {
            PolicyArg::Implicit => UnresolvedNamePolicy::ImplicitIntegerLocal,
            PolicyArg::Reject => UnresolvedNamePolicy::Reject,
        }
    }
}

// Compilation statistics for performance analysis
#[derive(Debug, Default)]
struct CompilationStats {
    lexer_time: f64,
    parser_time: f64,
    semantic_time: f64,
    codegen_time: f64,
    run_time: f64,
    total_time: f64,
    token_count: usize,
    ast_size: usize,
    methods: usize,
    il_instructions: usize,
}

// Print error message and exit with error code
fn fatal(msg: &str) -> ! {
    eprintln!("Error: {}", msg);
    std::process::exit(1);
}

// Generate output file path from input path if not specified
fn determine_output_path(input_path: &PathBuf, output: &Option<PathBuf>) -> PathBuf {
    match output {
        Some(path) => path.clone(),
        None => {
            let basename = input_path.file_stem().unwrap_or_default();
            let mut path = PathBuf::from(basename);
            path.set_extension("il");
            path
        }
    }
}

fn count_nodes(node: &dyn Node) -> usize {
    1 + node.children().into_iter().map(count_nodes).sum::<usize>()
}

// Tokenize once up front so lexical errors are reported before parsing
fn lexical_analysis(source: &str, stats: &mut CompilationStats, verbose: bool) -> CompileResult<()> {
    let lexer_start = Instant::now();
    let tokens = scan(source)?;
    stats.lexer_time = lexer_start.elapsed().as_secs_f64();
    stats.token_count = tokens.len();

    if verbose {
        println!("✓ Lexical analysis completed in {:.3}s", stats.lexer_time);
        println!("  Generated {} tokens", stats.token_count);
    }
    Ok(())
}

fn parsing_phase(source: &str, stats: &mut CompilationStats, verbose: bool) -> CompileResult<Program> {
    let parser_start = Instant::now();
    let program = pascil::parse(source)?;
    stats.parser_time = parser_start.elapsed().as_secs_f64();
    stats.ast_size = count_nodes(&program);

    if verbose {
        println!("✓ Parsing completed in {:.3}s", stats.parser_time);
        println!("  Built {} AST nodes", stats.ast_size);
    }
    Ok(program)
}

fn semantic_phase(program: &Program, stats: &mut CompilationStats, verbose: bool) -> CompileResult<()> {
    let semantic_start = Instant::now();
    semantic::analyze(program)?;
    stats.semantic_time = semantic_start.elapsed().as_secs_f64();

    if verbose {
        println!("✓ Semantic analysis completed in {:.3}s", stats.semantic_time);
    }
    Ok(())
}

fn code_generation_phase(
    program: &Program,
    policy: UnresolvedNamePolicy,
    stats: &mut CompilationStats,
    verbose: bool,
) -> CompileResult<Assembly> {
    let codegen_start = Instant::now();
    let assembly = codegen::generate_with(program, policy)?;
    stats.codegen_time = codegen_start.elapsed().as_secs_f64();
    stats.methods = assembly.methods.len();
    stats.il_instructions = assembly.instruction_count();

    if verbose {
        println!("✓ Code generation completed in {:.3}s", stats.codegen_time);
        println!(
            "  Generated {} methods, {} IL instructions",
            stats.methods, stats.il_instructions
        );
    }
    Ok(assembly)
}

// Main compilation function
fn compile(input_path: &PathBuf, args: &Cli) -> CompileResult<(Assembly, CompilationStats)> {
    let start_time = Instant::now();
    let mut stats = CompilationStats::default();

    if args.verbose {
        println!(" Starting compilation of: {}", input_path.display());
    }

    if !input_path.exists() {
        return Err(CompileError::FileReadError(format!(
            "Input file does not exist: {}",
            input_path.display()
        )));
    }

    let source = read(input_path)?;
    if args.verbose {
        println!("Read {} bytes from input file", source.len());
    }

    lexical_analysis(&source, &mut stats, args.verbose)?;
    let program = parsing_phase(&source, &mut stats, args.verbose)?;

    if args.show_ast {
        println!("\n Abstract Syntax Tree:");
        println!("{}", program.render_tree());
    }

    semantic_phase(&program, &mut stats, args.verbose)?;
    let assembly = code_generation_phase(&program, args.policy.into(), &mut stats, args.verbose)?;

    if args.print_il {
        println!("\n Generated IL:");
        print!("{}", assembly);
    }

    stats.total_time = start_time.elapsed().as_secs_f64();
    if args.verbose {
        println!(" Compilation completed in {:.3}s", stats.total_time);
    }

    Ok((assembly, stats))
}

fn run(assembly: &Assembly, input: &[String], verbose: bool) -> CompileResult<f64> {
    let run_start = Instant::now();
    let mut machine = Machine::new(assembly).with_input(input.iter().cloned());
    let execution = machine.run_entry()?;
    let run_time = run_start.elapsed().as_secs_f64();

    print!("{}", execution.output);
    if verbose {
        println!(
            "✓ Program finished in {:.3}s after {} steps",
            run_time,
            machine.steps()
        );
        for (name, value) in &execution.locals {
            println!("  {} = {}", name, value);
        }
    }
    Ok(run_time)
}

// Print detailed compilation statistics
fn print_stats(stats: &CompilationStats) {
    println!("\n Compilation Statistics:");
    println!("┌─────────────────────┬───────────┐");
    println!("│ Phase               │ Time (s)  │");
    println!("├─────────────────────┼───────────┤");
    println!("│ Lexical Analysis    │ {:>8.3} │", stats.lexer_time);
    println!("│ Parsing             │ {:>8.3} │", stats.parser_time);
    println!("│ Semantic Analysis   │ {:>8.3} │", stats.semantic_time);
    println!("│ Code Generation     │ {:>8.3} │", stats.codegen_time);
    println!("│ Execution           │ {:>8.3} │", stats.run_time);
    println!("├─────────────────────┼───────────┤");
    println!("│ Total Time          │ {:>8.3} │", stats.total_time);
    println!("└─────────────────────┴───────────┘");

    println!("\n Code Metrics:");
    println!("  • Tokens:             {}", stats.token_count);
    println!("  • AST Nodes:          {}", stats.ast_size);
    println!("  • Methods:            {}", stats.methods);
    println!("  • IL Instructions:    {}", stats.il_instructions);
}

fn main() {
    let args = Cli::parse();

    match compile(&args.path, &args) {
        Ok((assembly, mut stats)) => {
            let output_path = determine_output_path(&args.path, &args.output);

            if let Err(e) = fs::write(&output_path, assembly.to_string()) {
                fatal(&format!(
                    "Failed to write output file '{}': {}",
                    output_path.display(),
                    e
                ));
            }

            if args.verbose {
                println!("IL written to: {}", output_path.display());
            }

            if args.run {
                match run(&assembly, &args.input, args.verbose) {
                    Ok(run_time) => {
                        stats.run_time = run_time;
                        stats.total_time += run_time;
                    }
                    Err(e) => fatal(&format!("Execution failed: {}", e)),
                }
            }

            if args.timing {
                print_stats(&stats);
            }

            if args.verbose {
                println!("Compilation successful!");
            }
        }
        Err(e) => fatal(&format!("Compilation failed: {}", e)),
    }
}
