use pascil::parse;
use pascil::position::Position;
use pascil::semantic::{analyze, SymbolTable, SymbolType, Type};
use pascil::utils::errors::{CompileResult, SemanticError};

fn check(source: &str) -> CompileResult<Result<(), SemanticError>> {
    let program = parse(source)?;
    Ok(analyze(&program))
}

#[test]
fn test_well_typed_program() -> CompileResult<()> {
    let result = check(
        "program ok;
         var i, total: integer;
             done: boolean;
             c: char;
             a: array[1..5] of integer;
         function square(n: integer): integer;
         begin square := n * n end;
         procedure report(value: integer);
         begin WriteLn('value: ', value) end;
         begin
           total := 0;
           for i := 1 to 5 do a[i] := square(i);
           for i := 1 to 5 do total := total + a[i];
           done := (total > 50) and (c = 'x');
           c := c + 'a';
           repeat total := total - 1 until total <= 0;
           report(total)
         end.",
    )?;
    assert_eq!(result, Ok(()));
    Ok(())
}

#[test]
fn test_inner_declaration_shadows_outer() -> CompileResult<()> {
    let result = check(
        "program p;
         var x: boolean;
         procedure q;
         var x: integer;
         begin x := 1 end;
         begin x := true; q() end.",
    )?;
    assert_eq!(result, Ok(()));
    Ok(())
}

#[test]
fn test_duplicate_in_one_scope() -> CompileResult<()> {
    let result = check("program p; var x, x: integer; begin end.")?;
    assert!(matches!(
        result,
        Err(SemanticError::DuplicateSymbol { ref name, position })
            if name == "x" && position == Position::new(1, 19)
    ));
    Ok(())
}

#[test]
fn test_parameter_and_local_collide() -> CompileResult<()> {
    let result = check(
        "program p;
         procedure q(n: integer);
         var n: integer;
         begin end;
         begin end.",
    )?;
    assert!(matches!(result, Err(SemanticError::DuplicateSymbol { .. })));
    Ok(())
}

#[test]
fn test_assignment_type_mismatch() -> CompileResult<()> {
    let result = check("program p; var c: boolean; begin c := 1 end.")?;
    assert!(matches!(
        result,
        Err(SemanticError::TypeMismatch {
            ref name,
            expected: Type::Boolean,
            found: Type::Integer,
            ..
        }) if name == "c"
    ));
    Ok(())
}

#[test]
fn test_single_quoted_character_is_char_typed() -> CompileResult<()> {
    assert_eq!(check("program p; var c: char; begin c := 'h' end.")?, Ok(()));
    let result = check("program p; var n: integer; begin n := 'a' end.")?;
    assert!(matches!(result, Err(SemanticError::TypeMismatch { .. })));
    Ok(())
}

#[test]
fn test_string_literal_only_inside_write() -> CompileResult<()> {
    let result = check("program t; var c: char; begin c := 'ab'; writeln(c) end.")?;
    assert_eq!(
        result,
        Err(SemanticError::MisplacedString {
            raw: "'ab'".to_string(),
            position: Position::new(1, 36),
        })
    );

    let result = check("program t; var c: char; begin c := 'a'; c := c + 'xy' end.")?;
    assert!(matches!(result, Err(SemanticError::MisplacedString { .. })));

    let result = check("program t; var b: boolean; begin b := 'no' = 'no' end.")?;
    assert!(matches!(result, Err(SemanticError::MisplacedString { .. })));

    assert_eq!(
        check("program t; var c: char; begin c := 'z'; write('c = '); writeln('', c) end.")?,
        Ok(())
    );
    Ok(())
}

#[test]
fn test_call_arity() -> CompileResult<()> {
    let result = check(
        "program p;
         procedure q(a, b: integer); begin end;
         begin q(1) end.",
    )?;
    assert!(matches!(
        result,
        Err(SemanticError::ArityMismatch {
            expected: 2,
            found: 1,
            ..
        })
    ));
    Ok(())
}

#[test]
fn test_argument_types() -> CompileResult<()> {
    let result = check(
        "program p;
         procedure q(flag: boolean); begin end;
         begin q(3) end.",
    )?;
    assert!(matches!(
        result,
        Err(SemanticError::TypeMismatch {
            expected: Type::Boolean,
            found: Type::Integer,
            ..
        })
    ));
    Ok(())
}

#[test]
fn test_builtins_take_any_arguments() -> CompileResult<()> {
    let result = check(
        "program p;
         var x: integer;
         begin writeln; writeln(); write(1, 'a', true, x); readln(x); READ(x) end.",
    );
    // a bare `writeln` without parentheses is not a statement
    assert!(result.is_err());

    let result = check(
        "program p;
         var x: integer;
         begin writeln(); write(1, 'a', true, x); readln(x); READ(x) end.",
    )?;
    assert_eq!(result, Ok(()));
    Ok(())
}

#[test]
fn test_read_needs_integer_variables() -> CompileResult<()> {
    let result = check("program p; var b: boolean; begin read(b) end.")?;
    assert!(matches!(result, Err(SemanticError::TypeMismatch { .. })));
    let result = check("program p; var x: integer; begin read(x + 1) end.")?;
    assert!(matches!(result, Err(SemanticError::KindMismatch { .. })));
    Ok(())
}

#[test]
fn test_constant_index_bounds() -> CompileResult<()> {
    let program = |index: &str| {
        format!(
            "program p; var arr: array[1..5] of integer; begin arr[{}] := 0 end.",
            index
        )
    };
    assert_eq!(check(&program("5"))?, Ok(()));
    assert_eq!(check(&program("1"))?, Ok(()));
    assert!(matches!(
        check(&program("6"))?,
        Err(SemanticError::IndexOutOfRange {
            index: 6,
            lower: 1,
            upper: 5,
            ..
        })
    ));
    assert!(matches!(
        check(&program("-1"))?,
        Err(SemanticError::IndexOutOfRange { index: -1, .. })
    ));
    // Computed indices are only type checked
    assert_eq!(check(&program("2 * 10"))?, Ok(()));
    assert!(matches!(
        check(&program("true"))?,
        Err(SemanticError::TypeMismatch { .. })
    ));
    Ok(())
}

#[test]
fn test_empty_array_range() -> CompileResult<()> {
    let result = check("program p; var a: array[5..1] of integer; begin end.")?;
    assert!(matches!(
        result,
        Err(SemanticError::InvalidBounds {
            lower: 5,
            upper: 1,
            ..
        })
    ));
    Ok(())
}

#[test]
fn test_undefined_symbol() -> CompileResult<()> {
    let result = check("program p; begin y := 1 end.")?;
    assert!(matches!(
        result,
        Err(SemanticError::UndefinedSymbol { ref name, position })
            if name == "y" && position == Position::new(1, 18)
    ));
    let result = check("program p; begin missing(1) end.")?;
    assert!(matches!(result, Err(SemanticError::UndefinedSymbol { .. })));
    Ok(())
}

#[test]
fn test_conditions_must_be_boolean() -> CompileResult<()> {
    let result = check("program p; var x: integer; begin if x then x := 1 end.")?;
    assert!(matches!(
        result,
        Err(SemanticError::ConditionTypeError {
            construct: "if",
            found: Type::Integer,
            ..
        })
    ));
    let result = check("program p; var x: integer; begin while x + 1 do x := 1 end.")?;
    assert!(matches!(
        result,
        Err(SemanticError::ConditionTypeError { construct: "while", .. })
    ));
    let result = check("program p; var x: integer; begin repeat x := 1 until x end.")?;
    assert!(matches!(
        result,
        Err(SemanticError::ConditionTypeError { construct: "repeat", .. })
    ));
    Ok(())
}

#[test]
fn test_for_needs_integer_variable_and_bound() -> CompileResult<()> {
    let result = check("program p; var b: boolean; begin for b := true to 3 do b := false end.")?;
    assert!(matches!(
        result,
        Err(SemanticError::ConditionTypeError { construct: "for", found: Type::Boolean, .. })
    ));
    let result = check("program p; var i: integer; begin for i := 1 to 'z' do i := 1 end.")?;
    assert!(matches!(
        result,
        Err(SemanticError::ConditionTypeError { construct: "for", found: Type::Char, .. })
    ));
    Ok(())
}

#[test]
fn test_operator_operands() -> CompileResult<()> {
    let result = check("program p; var x: integer; c: char; begin x := x + c end.")?;
    assert!(matches!(result, Err(SemanticError::InvalidOperatorOperand { .. })));
    let result = check("program p; var b: boolean; begin b := b + b end.")?;
    assert!(matches!(result, Err(SemanticError::InvalidOperatorOperand { .. })));
    let result = check("program p; var b: boolean; x: integer; begin b := x and x end.")?;
    assert!(matches!(result, Err(SemanticError::InvalidOperatorOperand { .. })));
    assert_eq!(
        check("program p; var b: boolean; begin b := b = false end.")?,
        Ok(())
    );
    Ok(())
}

#[test]
fn test_kind_mismatches() -> CompileResult<()> {
    let result = check(
        "program p;
         var x: integer;
         procedure q; begin end;
         begin x := q() end.",
    )?;
    assert!(matches!(
        result,
        Err(SemanticError::KindMismatch { found: "procedure", .. })
    ));

    let result = check("program p; var x: integer; begin x[1] := 0 end.")?;
    assert!(matches!(
        result,
        Err(SemanticError::KindMismatch { expected: "array", .. })
    ));

    let result = check("program p; var x: integer; begin integer := 1 end.")?;
    assert!(matches!(
        result,
        Err(SemanticError::KindMismatch { expected: "variable", .. })
    ));

    let result = check("program p; var x: x; begin end.")?;
    assert!(matches!(result, Err(SemanticError::UndefinedSymbol { .. })));
    Ok(())
}

#[test]
fn test_routines_in_one_section_see_each_other() -> CompileResult<()> {
    let result = check(
        "program p;
         function even(n: integer): boolean;
         begin if n = 0 then even := true else even := odd(n - 1) end;
         function odd(n: integer): boolean;
         begin if n = 0 then odd := false else odd := even(n - 1) end;
         begin end.",
    )?;
    assert_eq!(result, Ok(()));
    Ok(())
}

#[test]
fn test_function_name_is_its_result_slot() -> CompileResult<()> {
    let result = check(
        "program p;
         function f(n: integer): integer;
         begin f := n; f := f + 1 end;
         begin end.",
    )?;
    assert_eq!(result, Ok(()));

    let result = check(
        "program p;
         function f(n: integer): boolean;
         begin f := n end;
         begin end.",
    )?;
    assert!(matches!(
        result,
        Err(SemanticError::TypeMismatch { expected: Type::Boolean, .. })
    ));
    Ok(())
}

#[test]
fn test_scope_is_restored_after_an_error() -> CompileResult<()> {
    let mut table = SymbolTable::with_builtins();
    table.push_scope();
    table.insert("x", SymbolType::Variable(Type::Integer), Position::new(1, 1))?;
    assert!(table
        .insert("x", SymbolType::Variable(Type::Char), Position::new(2, 1))
        .is_err());
    table.drop_scope();
    assert!(table.get("x").is_none());
    assert_eq!(table.get_scopes_len(), 1);
    Ok(())
}

#[test]
fn test_symbol_table_shadowing_and_levels() -> CompileResult<()> {
    let mut table = SymbolTable::new();
    table.insert("x", SymbolType::Variable(Type::Boolean), Position::new(1, 1))?;
    table.push_scope();
    table.insert("x", SymbolType::Variable(Type::Integer), Position::new(2, 1))?;

    let inner = table.get("x").map(|symbol| (symbol.symbol_type.clone(), symbol.level));
    assert_eq!(inner, Some((SymbolType::Variable(Type::Integer), 1)));
    assert!(table.get_current("x").is_some());

    table.drop_scope();
    let outer = table.get("x").map(|symbol| symbol.symbol_type.clone());
    assert_eq!(outer, Some(SymbolType::Variable(Type::Boolean)));

    // The global scope is never dropped
    table.drop_scope();
    assert_eq!(table.get_scopes_len(), 1);
    assert_eq!(table.current_level(), 0);
    Ok(())
}

#[test]
fn test_builtin_routines_ignore_case() {
    let table = SymbolTable::with_builtins();
    assert!(table.get_routine("WriteLn").is_some());
    assert!(table.get_routine("READ").is_some());
    assert!(table.get("WriteLn").is_none());
    assert!(table.get_routine("print").is_none());
}
