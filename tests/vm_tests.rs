use pascil::compile;
use pascil::utils::errors::{CompileError, CompileResult, RuntimeError, SemanticError};
use pascil::vm::{Machine, Value};

#[test]
fn test_countdown_ends_at_zero() -> CompileResult<()> {
    let assembly = compile(
        "program countdown;
         var x: integer;
         begin
           x := 10;
           while x > 0 do x := x - 1
         end.",
    )?;
    let execution = Machine::new(&assembly).run_entry()?;
    assert_eq!(execution.int("x"), Some(0));
    Ok(())
}

#[test]
fn test_invoke_function() -> CompileResult<()> {
    let assembly = compile(
        "program p;
         function f(n: integer): integer;
         begin f := n + 1 end;
         begin end.",
    )?;
    let mut machine = Machine::new(&assembly);
    assert_eq!(machine.invoke("f", vec![Value::Int(3)])?, Some(Value::Int(4)));
    Ok(())
}

#[test]
fn test_recursion() -> CompileResult<()> {
    let assembly = compile(
        "program p;
         var r: integer;
         function fact(n: integer): integer;
         begin
           if n <= 1 then fact := 1
           else fact := n * fact(n - 1)
         end;
         begin r := fact(5) end.",
    )?;
    let execution = Machine::new(&assembly).run_entry()?;
    assert_eq!(execution.int("r"), Some(120));
    Ok(())
}

#[test]
fn test_mutual_recursion() -> CompileResult<()> {
    let assembly = compile(
        "program p;
         function even(n: integer): boolean;
         begin if n = 0 then even := true else even := odd(n - 1) end;
         function odd(n: integer): boolean;
         begin if n = 0 then odd := false else odd := even(n - 1) end;
         begin end.",
    )?;
    let mut machine = Machine::new(&assembly);
    assert_eq!(machine.invoke("even", vec![Value::Int(10)])?, Some(Value::Int(1)));
    assert_eq!(machine.invoke("odd", vec![Value::Int(10)])?, Some(Value::Int(0)));
    Ok(())
}

#[test]
fn test_console_output() -> CompileResult<()> {
    let assembly = compile(
        "program hello;
         var c: char;
         begin
           c := 'a';
           writeln('Hello, world');
           write(1 + 2, ' ', c);
           writeln();
           writeln(3 > 2, false);
           writeln(c + 'b')
         end.",
    )?;
    let execution = Machine::new(&assembly).run_entry()?;
    // char arithmetic adds code points
    assert_eq!(execution.output, "Hello, world\n3 a\nTrueFalse\n\u{c3}\n");
    Ok(())
}

#[test]
fn test_string_assigned_to_char_never_reaches_the_machine() {
    let result = compile(
        "program t;
         var c: char;
         begin
           c := 'ab';
           c := c + 'x';
           writeln(c)
         end.",
    );
    assert!(matches!(
        result,
        Err(CompileError::Semantic(SemanticError::MisplacedString { .. }))
    ));
}

#[test]
fn test_read_from_input() -> CompileResult<()> {
    let assembly = compile(
        "program p;
         var x, y: integer;
         begin read(x); readln(y); writeln(x * y) end.",
    )?;
    let execution = Machine::new(&assembly)
        .with_input(["6", " 7 "])
        .run_entry()?;
    assert_eq!(execution.output, "42\n");

    let mut machine = Machine::new(&assembly).with_input(["6"]);
    assert_eq!(machine.run_entry(), Err(RuntimeError::InputExhausted));

    let mut machine = Machine::new(&assembly).with_input(["six", "7"]);
    assert_eq!(
        machine.run_entry(),
        Err(RuntimeError::InvalidInput("six".to_string()))
    );
    Ok(())
}

#[test]
fn test_read_into_array_elements() -> CompileResult<()> {
    let assembly = compile(
        "program p;
         var a: array[0..1] of integer;
             s: integer;
         begin read(a[0], a[1]); s := a[0] - a[1] end.",
    )?;
    let execution = Machine::new(&assembly).with_input(["10", "4"]).run_entry()?;
    assert_eq!(execution.int("s"), Some(6));
    Ok(())
}

#[test]
fn test_arrays() -> CompileResult<()> {
    let assembly = compile(
        "program squares;
         var a: array[1..5] of integer;
             i, sum: integer;
         begin
           for i := 1 to 5 do a[i] := i * i;
           sum := 0;
           for i := 1 to 5 do sum := sum + a[i]
         end.",
    )?;
    let execution = Machine::new(&assembly).run_entry()?;
    assert_eq!(execution.int("sum"), Some(55));
    // The loop variable ends one past the bound
    assert_eq!(execution.int("i"), Some(6));
    match execution.local("a") {
        Some(Value::Array(cells)) => assert_eq!(*cells.borrow(), vec![1, 4, 9, 16, 25]),
        other => panic!("expected an array, found {:?}", other),
    }
    Ok(())
}

#[test]
fn test_negative_lower_bound() -> CompileResult<()> {
    let assembly = compile(
        "program p;
         var a: array[-2..2] of integer;
             i, r: integer;
         begin
           for i := -2 to 2 do a[i] := i * 10;
           r := a[-2] + a[2] * 2
         end.",
    )?;
    let execution = Machine::new(&assembly).run_entry()?;
    assert_eq!(execution.int("r"), Some(20));
    Ok(())
}

#[test]
fn test_repeat_runs_at_least_once() -> CompileResult<()> {
    let assembly = compile(
        "program p;
         var n: integer;
         begin
           n := 100;
           repeat n := n + 1 until true
         end.",
    )?;
    let execution = Machine::new(&assembly).run_entry()?;
    assert_eq!(execution.int("n"), Some(101));
    Ok(())
}

#[test]
fn test_integer_division_and_remainder() -> CompileResult<()> {
    let assembly = compile(
        "program p;
         var q, r, s: integer;
         begin q := -7 div 2; r := -7 mod 2; s := 7 / 2 end.",
    )?;
    let execution = Machine::new(&assembly).run_entry()?;
    assert_eq!(execution.int("q"), Some(-3));
    assert_eq!(execution.int("r"), Some(-1));
    assert_eq!(execution.int("s"), Some(3));
    Ok(())
}

#[test]
fn test_nested_routine() -> CompileResult<()> {
    let assembly = compile(
        "program p;
         var r: integer;
         function outer(n: integer): integer;
           function inner(m: integer): integer;
           begin inner := m * 2 end;
         begin outer := inner(n) + 1 end;
         begin r := outer(5) end.",
    )?;
    let execution = Machine::new(&assembly).run_entry()?;
    assert_eq!(execution.int("r"), Some(11));
    Ok(())
}

#[test]
fn test_nested_routine_is_not_confused_with_outer_namesake() -> CompileResult<()> {
    let assembly = compile(
        "program p;
         procedure a_b; begin writeln(1) end;
         procedure a;
           procedure b; begin writeln(2) end;
         begin b() end;
         begin a(); a_b() end.",
    )?;
    let execution = Machine::new(&assembly).run_entry()?;
    assert_eq!(execution.output, "2\n1\n");
    Ok(())
}

#[test]
fn test_parameters_are_passed_by_value() -> CompileResult<()> {
    let assembly = compile(
        "program p;
         var x: integer;
         procedure bump(n: integer);
         begin n := n + 1; writeln(n) end;
         begin x := 1; bump(x); writeln(x) end.",
    )?;
    let execution = Machine::new(&assembly).run_entry()?;
    assert_eq!(execution.output, "2\n1\n");
    Ok(())
}

#[test]
fn test_division_by_zero() -> CompileResult<()> {
    let assembly = compile(
        "program p;
         var x, y: integer;
         begin y := 0; x := 1 div y end.",
    )?;
    let mut machine = Machine::new(&assembly);
    assert_eq!(
        machine.run_entry(),
        Err(RuntimeError::DivisionByZero("Main".to_string()))
    );
    Ok(())
}

#[test]
fn test_computed_index_out_of_range() -> CompileResult<()> {
    let assembly = compile(
        "program p;
         var a: array[1..3] of integer;
             i: integer;
         begin i := 4; a[i] := 1 end.",
    )?;
    let mut machine = Machine::new(&assembly);
    assert_eq!(
        machine.run_entry(),
        Err(RuntimeError::IndexOutOfRange {
            index: 3,
            length: 3
        })
    );
    Ok(())
}

#[test]
fn test_step_limit() -> CompileResult<()> {
    let assembly = compile(
        "program p;
         var x: integer;
         begin while true do x := x + 1 end.",
    )?;
    let mut machine = Machine::new(&assembly).with_step_limit(1_000);
    assert_eq!(machine.run_entry(), Err(RuntimeError::StepLimitExceeded(1_000)));
    Ok(())
}

#[test]
fn test_runaway_recursion() -> CompileResult<()> {
    let assembly = compile(
        "program p;
         procedure forever; begin forever() end;
         begin forever() end.",
    )?;
    let mut machine = Machine::new(&assembly).with_call_depth_limit(64);
    assert_eq!(machine.run_entry(), Err(RuntimeError::CallDepthExceeded(64)));
    Ok(())
}

#[test]
fn test_invoke_errors() -> CompileResult<()> {
    let assembly = compile(
        "program p;
         function f(n: integer): integer; begin f := n end;
         begin end.",
    )?;
    let mut machine = Machine::new(&assembly);
    assert_eq!(
        machine.invoke("g", vec![]),
        Err(RuntimeError::UnknownMethod("g".to_string()))
    );
    assert!(matches!(
        machine.invoke("f", vec![]),
        Err(RuntimeError::ArgumentCount {
            expected: 1,
            found: 0,
            ..
        })
    ));
    Ok(())
}
