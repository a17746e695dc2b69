use pascil::ast::{AssignTarget, BinaryOperator, Decl, Expr, LiteralValue, Stmt, VarDeclKind};
use pascil::frontend::Parser;
use pascil::parse;
use pascil::utils::errors::{CompileError, CompileResult, ParseError};

fn expr(source: &str) -> Result<Expr, ParseError> {
    Parser::new(source)?.expression()
}

fn binop(expr: &Expr) -> (BinaryOperator, &Expr, &Expr) {
    match expr {
        Expr::BinaryOp(op) => (op.operator, &*op.left, &*op.right),
        other => panic!("expected a binary operation, found {:?}", other),
    }
}

fn ident(expr: &Expr) -> &str {
    match expr {
        Expr::Identifier(ident) => &ident.name,
        other => panic!("expected an identifier, found {:?}", other),
    }
}

#[test]
fn test_multiplication_binds_tighter_than_addition() -> Result<(), ParseError> {
    let tree = expr("a + b * c")?;
    let (op, left, right) = binop(&tree);
    assert_eq!(op, BinaryOperator::Add);
    assert_eq!(ident(left), "a");
    let (op, left, right) = binop(right);
    assert_eq!(op, BinaryOperator::Mul);
    assert_eq!(ident(left), "b");
    assert_eq!(ident(right), "c");
    Ok(())
}

#[test]
fn test_operators_are_left_associative() -> Result<(), ParseError> {
    let tree = expr("a - b - c")?;
    let (op, left, right) = binop(&tree);
    assert_eq!(op, BinaryOperator::Sub);
    assert_eq!(ident(right), "c");
    let (op, left, right) = binop(left);
    assert_eq!(op, BinaryOperator::Sub);
    assert_eq!(ident(left), "a");
    assert_eq!(ident(right), "b");
    Ok(())
}

#[test]
fn test_logical_and_comparison_layers() -> Result<(), ParseError> {
    // or < and < equality < relational
    let tree = expr("a < b = c or d and e")?;
    let (op, left, right) = binop(&tree);
    assert_eq!(op, BinaryOperator::Or);
    assert_eq!(binop(right).0, BinaryOperator::And);
    let (op, left, _) = binop(left);
    assert_eq!(op, BinaryOperator::Eq);
    assert_eq!(binop(left).0, BinaryOperator::Lt);
    Ok(())
}

#[test]
fn test_parentheses_override_precedence() -> Result<(), ParseError> {
    let tree = expr("(a + b) * c")?;
    let (op, left, _) = binop(&tree);
    assert_eq!(op, BinaryOperator::Mul);
    assert_eq!(binop(left).0, BinaryOperator::Add);
    Ok(())
}

#[test]
fn test_unary_minus_subtracts_from_zero() -> Result<(), ParseError> {
    let tree = expr("-x")?;
    let (op, left, right) = binop(&tree);
    assert_eq!(op, BinaryOperator::Sub);
    assert!(matches!(left, Expr::Literal(lit) if lit.value == LiteralValue::Integer(0)));
    assert_eq!(ident(right), "x");

    let tree = expr("+x")?;
    assert_eq!(ident(&tree), "x");
    Ok(())
}

#[test]
fn test_word_operators() -> Result<(), ParseError> {
    assert_eq!(binop(&expr("a div b")?).0, BinaryOperator::DivInt);
    assert_eq!(binop(&expr("a / b")?).0, BinaryOperator::DivReal);
    assert_eq!(binop(&expr("a mod b")?).0, BinaryOperator::Mod);
    assert_eq!(binop(&expr("a <> b")?).0, BinaryOperator::Ne);
    Ok(())
}

#[test]
fn test_calls_and_elements_in_expressions() -> Result<(), ParseError> {
    let tree = expr("f(1, x) + a[i + 1]")?;
    let (_, left, right) = binop(&tree);
    assert!(matches!(left, Expr::Call(call) if call.callee.name == "f" && call.args.len() == 2));
    assert!(matches!(right, Expr::ArrayElement(elem) if elem.array.name == "a"));
    Ok(())
}

#[test]
fn test_program_structure() -> CompileResult<()> {
    let program = parse(
        "program demo;
         var x, y: integer;
             a: array[-1..3] of char;
         procedure p(m, n: integer; flag);
         begin end;
         function f: boolean;
         begin f := true end;
         begin
           x := 1;
           a[0] := 'z';
           p(x, y, 0)
         end.",
    )?;
    assert_eq!(program.name.name, "demo");
    let decls = program.decls.as_ref().map(|d| d.decls.as_slice()).unwrap_or(&[]);
    assert_eq!(decls.len(), 3);

    let Decl::Vars(section) = &decls[0] else {
        panic!("expected a var section");
    };
    let VarDeclKind::Var(var) = &section.decls[0] else {
        panic!("expected a plain variable declaration");
    };
    assert_eq!(var.names.len(), 2);
    let VarDeclKind::Array(array) = &section.decls[1] else {
        panic!("expected an array declaration");
    };
    assert_eq!(array.lower.as_integer(), Some(-1));
    assert_eq!(array.upper.as_integer(), Some(3));
    assert_eq!(array.element.name, "char");

    let Decl::Procedure(procedure) = &decls[1] else {
        panic!("expected a procedure");
    };
    let param_types: Vec<Option<&str>> = procedure
        .params
        .iter()
        .map(|p| p.ty.as_ref().map(|t| t.name.as_str()))
        .collect();
    assert_eq!(param_types, vec![Some("integer"), Some("integer"), None]);

    let Decl::Function(function) = &decls[2] else {
        panic!("expected a function");
    };
    assert!(function.params.is_empty());
    assert_eq!(function.return_type.name, "boolean");

    assert_eq!(program.body.statements.len(), 3);
    assert!(matches!(
        &program.body.statements[1],
        Stmt::Assign(assign) if matches!(assign.target, AssignTarget::Element(_))
    ));
    assert!(matches!(&program.body.statements[2], Stmt::Call(_)));
    Ok(())
}

#[test]
fn test_empty_statements_and_semicolon_before_else() -> CompileResult<()> {
    let program = parse(
        "program p;
         begin
           ;
           if x = 1 then x := 2; else x := 3;
           ;
         end.",
    )?;
    assert_eq!(program.body.statements.len(), 1);
    let Stmt::If(if_stmt) = &program.body.statements[0] else {
        panic!("expected an if statement");
    };
    assert!(if_stmt.else_branch.is_some());
    Ok(())
}

#[test]
fn test_loops() -> CompileResult<()> {
    let program = parse(
        "program p;
         begin
           while x < 10 do x := x + 1;
           for i := 1 to n do begin s := s + i end;
           repeat x := x - 1; y := y + 1 until x = 0
         end.",
    )?;
    let statements = &program.body.statements;
    assert!(matches!(&statements[0], Stmt::While(_)));
    let Stmt::For(for_stmt) = &statements[1] else {
        panic!("expected a for loop");
    };
    assert_eq!(for_stmt.variable().map(|v| v.name.as_str()), Some("i"));
    assert!(matches!(for_stmt.body.as_ref(), Stmt::Compound(_)));
    let Stmt::Repeat(repeat) = &statements[2] else {
        panic!("expected a repeat loop");
    };
    assert_eq!(repeat.body.statements.len(), 2);
    Ok(())
}

#[test]
fn test_tree_rendering() -> CompileResult<()> {
    let source = "program p; begin x := 1 end.";
    let expected = "program\n├ p\n└ ...\n  └ :=\n    ├ x\n    └ 1 (int)";
    assert_eq!(parse(source)?.render_tree(), expected);
    // Same input, same tree
    assert_eq!(parse(source)?.render_tree(), parse(source)?.render_tree());
    Ok(())
}

fn syntax_error(source: &str) -> ParseError {
    match parse(source) {
        Err(CompileError::Parse(err)) => err,
        other => panic!("expected a syntax error, got {:?}", other.map(|p| p.name)),
    }
}

#[test]
fn test_missing_semicolon() {
    let err = syntax_error("program p begin end.");
    assert!(err.message.contains("expected ';'"));
    assert_eq!(err.position.line, 1);
    assert_eq!(err.position.column, 11);
}

#[test]
fn test_bare_identifier_is_not_a_statement() {
    let err = syntax_error("program p; begin x end.");
    assert!(err.message.contains("':=' or '('"));
}

#[test]
fn test_input_after_final_dot() {
    let err = syntax_error("program p; begin end. extra");
    assert!(err.message.contains("end of input"));
}

#[test]
fn test_missing_then() {
    let err = syntax_error("program p; begin if x x := 1 end.");
    assert!(err.message.contains("expected"));
    assert!(err.message.contains("found identifier 'x'"));
}

#[test]
fn test_deeply_nested_parentheses_are_rejected() {
    let depth = 100_000;
    let source = format!("{}1{}", "(".repeat(depth), ")".repeat(depth));
    let err = match expr(&source) {
        Err(err) => err,
        Ok(_) => panic!("expected a nesting error"),
    };
    assert!(err.message.contains("nesting deeper than 100 levels"));
    assert_eq!(err.position.line, 1);
    assert_eq!(err.position.column, 101);
}

#[test]
fn test_moderate_nesting_is_accepted() -> Result<(), ParseError> {
    let source = format!("{}x{}", "(".repeat(50), ")".repeat(50));
    assert_eq!(ident(&expr(&source)?), "x");
    Ok(())
}

#[test]
fn test_long_unary_chains_are_rejected() {
    let source = "-".repeat(100_000) + "1";
    assert!(matches!(expr(&source), Err(err) if err.message.contains("nesting")));
}

#[test]
fn test_deeply_nested_blocks_are_rejected() {
    let depth = 10_000;
    let source = format!(
        "program p; begin {}{} end.",
        "begin ".repeat(depth),
        "end ".repeat(depth)
    );
    let err = syntax_error(&source);
    assert!(err.message.contains("nesting deeper than"));
}
