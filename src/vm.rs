//! A small interpreter for generated assemblies. It understands exactly the
//! instruction set the code generator emits plus the handful of console
//! routines the programs call, which is enough to check generated code
//! without an external assembler.

use crate::codegen::{Assembly, CilType, ElementType, Instruction, Method, MethodKind, MethodRef};
use crate::utils::config::runtime_functions::{CONSOLE, INT32, PARSE, READ_LINE, WRITE, WRITE_LINE};
use crate::utils::config::vm::{MAX_CALL_DEPTH, MAX_STEPS};
use crate::utils::errors::{RuntimeError, RuntimeResult};
use std::cell::RefCell;
use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::rc::Rc;

/// A value on the evaluation stack or in a slot. Booleans and chars are
/// carried as `Int`, the way the target machine widens them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Int(i32),
    Str(Rc<str>),
    Array(Rc<RefCell<Vec<i32>>>),
    Null,
}

impl Value {
    fn default_for(ty: CilType) -> Self {
        match ty {
            CilType::Int32 | CilType::Bool | CilType::Char => Value::Int(0),
            _ => Value::Null,
        }
    }

    pub fn as_int(&self) -> Option<i32> {
        match self {
            Value::Int(n) => Some(*n),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Int(n) => write!(f, "{}", n),
            Value::Str(s) => f.write_str(s),
            Value::Array(cells) => write!(f, "{:?}", cells.borrow()),
            Value::Null => f.write_str("null"),
        }
    }
}

/// Outcome of running the entry method.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Execution {
    pub locals: Vec<(String, Value)>,
    pub output: String,
}

impl Execution {
    pub fn local(&self, name: &str) -> Option<&Value> {
        self.locals
            .iter()
            .find(|(local, _)| local == name)
            .map(|(_, value)| value)
    }

    pub fn int(&self, name: &str) -> Option<i32> {
        self.local(name).and_then(Value::as_int)
    }
}

pub struct Machine<'a> {
    assembly: &'a Assembly,
    input: VecDeque<String>,
    output: String,
    steps: usize,
    max_steps: usize,
    depth: usize,
    max_depth: usize,
}

// Evaluation state of one activation
struct Frame<'m> {
    method: &'m Method,
    labels: HashMap<&'m str, usize>,
    args: Vec<Value>,
    locals: Vec<Value>,
    stack: Vec<Value>,
}

impl<'m> Frame<'m> {
    fn pop(&mut self) -> RuntimeResult<Value> {
        self.stack
            .pop()
            .ok_or_else(|| RuntimeError::StackUnderflow(self.method.name.clone()))
    }

    fn pop_int(&mut self) -> RuntimeResult<i32> {
        match self.pop()? {
            Value::Int(n) => Ok(n),
            other => Err(self.invalid(format!("expected int32, found {}", other))),
        }
    }

    fn pop_array(&mut self) -> RuntimeResult<Rc<RefCell<Vec<i32>>>> {
        match self.pop()? {
            Value::Array(cells) => Ok(cells),
            other => Err(self.invalid(format!("expected an array, found {}", other))),
        }
    }

    fn push_bool(&mut self, value: bool) {
        self.stack.push(Value::Int(i32::from(value)));
    }

    fn target(&self, label: &str) -> RuntimeResult<usize> {
        self.labels
            .get(label)
            .copied()
            .ok_or_else(|| RuntimeError::UnknownLabel {
                method: self.method.name.clone(),
                label: label.to_string(),
            })
    }

    fn invalid(&self, message: String) -> RuntimeError {
        RuntimeError::InvalidOperand {
            method: self.method.name.clone(),
            message,
        }
    }
}

fn slot<'v>(slots: &'v mut [Value], index: usize, method: &Method) -> RuntimeResult<&'v mut Value> {
    slots.get_mut(index).ok_or_else(|| RuntimeError::InvalidOperand {
        method: method.name.clone(),
        message: format!("slot {} does not exist", index),
    })
}

fn element_index(index: i32, length: usize) -> RuntimeResult<usize> {
    usize::try_from(index)
        .ok()
        .filter(|i| *i < length)
        .ok_or(RuntimeError::IndexOutOfRange { index, length })
}

// Narrow a stored value to what the element type can hold
fn narrow(element: ElementType, value: i32) -> i32 {
    match element {
        ElementType::Int32 => value,
        ElementType::Bool => i32::from(value as i8),
        ElementType::Char => i32::from(value as u16),
    }
}

impl<'a> Machine<'a> {
    pub fn new(assembly: &'a Assembly) -> Self {
        Self {
            assembly,
            input: VecDeque::new(),
            output: String::new(),
            steps: 0,
            max_steps: MAX_STEPS,
            depth: 0,
            max_depth: MAX_CALL_DEPTH,
        }
    }

    /// Queue lines for `Console::ReadLine`.
    pub fn with_input<I, S>(mut self, lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.input.extend(lines.into_iter().map(Into::into));
        self
    }

    pub fn with_step_limit(mut self, max_steps: usize) -> Self {
        self.max_steps = max_steps;
        self
    }

    pub fn with_call_depth_limit(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn output(&self) -> &str {
        &self.output
    }

    pub fn steps(&self) -> usize {
        self.steps
    }

    pub fn run_entry(&mut self) -> RuntimeResult<Execution> {
        let entry = self
            .assembly
            .entry()
            .ok_or_else(|| RuntimeError::UnknownMethod("<entry>".to_string()))?;
        let args = entry.params.iter().map(|p| Value::default_for(p.ty)).collect();
        let (_, locals) = self.execute(entry, args)?;
        Ok(Execution {
            locals: entry
                .locals
                .iter()
                .map(|slot| slot.name.clone())
                .zip(locals)
                .collect(),
            output: self.output.clone(),
        })
    }

    /// Call a method of the assembly by name.
    pub fn invoke(&mut self, name: &str, args: Vec<Value>) -> RuntimeResult<Option<Value>> {
        let method = self
            .assembly
            .method(name)
            .ok_or_else(|| RuntimeError::UnknownMethod(name.to_string()))?;
        if method.kind == MethodKind::Entry {
            self.run_entry()?;
            return Ok(None);
        }
        self.execute(method, args).map(|(result, _)| result)
    }

    fn execute(
        &mut self,
        method: &'a Method,
        args: Vec<Value>,
    ) -> RuntimeResult<(Option<Value>, Vec<Value>)> {
        if args.len() != method.params.len() {
            return Err(RuntimeError::ArgumentCount {
                method: method.name.clone(),
                expected: method.params.len(),
                found: args.len(),
            });
        }
        if self.depth >= self.max_depth {
            return Err(RuntimeError::CallDepthExceeded(self.max_depth));
        }
        self.depth += 1;
        let result = self.run_frame(Frame {
            method,
            labels: method.labels(),
            args,
            locals: method.locals.iter().map(|slot| Value::default_for(slot.ty)).collect(),
            stack: Vec::new(),
        });
        self.depth -= 1;
        result
    }

    fn run_frame(&mut self, mut frame: Frame<'a>) -> RuntimeResult<(Option<Value>, Vec<Value>)> {
        let method = frame.method;
        let body = &method.body;
        let mut pc = 0;
        while pc < body.len() {
            self.steps += 1;
            if self.steps > self.max_steps {
                return Err(RuntimeError::StepLimitExceeded(self.max_steps));
            }
            let instruction = &body[pc];
            pc += 1;
            match instruction {
                Instruction::LdcI4(n) => frame.stack.push(Value::Int(*n)),
                Instruction::Ldstr(s) => frame.stack.push(Value::Str(Rc::from(s.as_str()))),
                Instruction::Ldloc(i) => {
                    let value = slot(&mut frame.locals, *i, method)?.clone();
                    frame.stack.push(value);
                }
                Instruction::Stloc(i) => {
                    let value = frame.pop()?;
                    *slot(&mut frame.locals, *i, method)? = value;
                }
                Instruction::Ldarg(i) => {
                    let value = slot(&mut frame.args, *i, method)?.clone();
                    frame.stack.push(value);
                }
                Instruction::Starg(i) => {
                    let value = frame.pop()?;
                    *slot(&mut frame.args, *i, method)? = value;
                }
                Instruction::Add
                | Instruction::Sub
                | Instruction::Mul
                | Instruction::Div
                | Instruction::Rem
                | Instruction::And
                | Instruction::Or => {
                    let right = frame.pop_int()?;
                    let left = frame.pop_int()?;
                    let value = match instruction {
                        Instruction::Add => left.wrapping_add(right),
                        Instruction::Sub => left.wrapping_sub(right),
                        Instruction::Mul => left.wrapping_mul(right),
                        Instruction::Div | Instruction::Rem if right == 0 => {
                            return Err(RuntimeError::DivisionByZero(method.name.clone()))
                        }
                        Instruction::Div => left.wrapping_div(right),
                        Instruction::Rem => left.wrapping_rem(right),
                        Instruction::And => left & right,
                        _ => left | right,
                    };
                    frame.stack.push(Value::Int(value));
                }
                Instruction::Ceq => {
                    let right = frame.pop()?;
                    let left = frame.pop()?;
                    frame.push_bool(left == right);
                }
                Instruction::Cgt => {
                    let right = frame.pop_int()?;
                    let left = frame.pop_int()?;
                    frame.push_bool(left > right);
                }
                Instruction::Clt => {
                    let right = frame.pop_int()?;
                    let left = frame.pop_int()?;
                    frame.push_bool(left < right);
                }
                Instruction::Label(_) => {}
                Instruction::Br(label) => pc = frame.target(label)?,
                Instruction::Brfalse(label) => {
                    if frame.pop_int()? == 0 {
                        pc = frame.target(label)?;
                    }
                }
                Instruction::Brtrue(label) => {
                    if frame.pop_int()? != 0 {
                        pc = frame.target(label)?;
                    }
                }
                Instruction::Call(callee) => {
                    let mut args = Vec::with_capacity(callee.params.len());
                    for _ in 0..callee.params.len() {
                        args.push(frame.pop()?);
                    }
                    args.reverse();
                    if let Some(value) = self.call(callee, args)? {
                        frame.stack.push(value);
                    }
                }
                Instruction::Newarr(_) => {
                    let length = frame.pop_int()?;
                    let length = usize::try_from(length)
                        .map_err(|_| frame.invalid(format!("negative array length {}", length)))?;
                    frame
                        .stack
                        .push(Value::Array(Rc::new(RefCell::new(vec![0; length]))));
                }
                Instruction::Ldelem(_) => {
                    let index = frame.pop_int()?;
                    let cells = frame.pop_array()?;
                    let cells = cells.borrow();
                    let i = element_index(index, cells.len())?;
                    frame.stack.push(Value::Int(cells[i]));
                }
                Instruction::Stelem(element) => {
                    let value = frame.pop_int()?;
                    let index = frame.pop_int()?;
                    let cells = frame.pop_array()?;
                    let mut cells = cells.borrow_mut();
                    let i = element_index(index, cells.len())?;
                    cells[i] = narrow(*element, value);
                }
                Instruction::Pop => {
                    frame.pop()?;
                }
                Instruction::Ret => {
                    let result = if method.return_type.is_void() {
                        None
                    } else {
                        Some(frame.pop()?)
                    };
                    return Ok((result, frame.locals));
                }
            }
        }
        // Falling off the end behaves like a bare ret
        Ok((None, frame.locals))
    }

    fn call(&mut self, callee: &MethodRef, args: Vec<Value>) -> RuntimeResult<Option<Value>> {
        if callee.is_local() {
            let method = self
                .assembly
                .method(&callee.name)
                .ok_or_else(|| RuntimeError::UnknownMethod(callee.name.clone()))?;
            return self.execute(method, args).map(|(result, _)| result);
        }
        match (callee.owner.as_str(), callee.name.as_str()) {
            (CONSOLE, WRITE) | (CONSOLE, WRITE_LINE) => {
                if let (Some(ty), Some(value)) = (callee.params.first(), args.first()) {
                    let text = console_text(*ty, value);
                    self.output.push_str(&text);
                }
                if callee.name == WRITE_LINE {
                    self.output.push('\n');
                }
                Ok(None)
            }
            (CONSOLE, READ_LINE) => {
                let line = self.input.pop_front().ok_or(RuntimeError::InputExhausted)?;
                Ok(Some(Value::Str(Rc::from(line.as_str()))))
            }
            (INT32, PARSE) => {
                let text = match args.first() {
                    Some(Value::Str(s)) => s.to_string(),
                    Some(other) => other.to_string(),
                    None => String::new(),
                };
                text.trim()
                    .parse::<i32>()
                    .map(|n| Some(Value::Int(n)))
                    .map_err(|_| RuntimeError::InvalidInput(text))
            }
            _ => Err(RuntimeError::UnknownMethod(format!(
                "{}::{}",
                callee.owner, callee.name
            ))),
        }
    }
}

/// Text a console overload prints for a value of the given static type.
fn console_text(ty: CilType, value: &Value) -> String {
    match (ty, value) {
        (CilType::Bool, Value::Int(n)) => String::from(if *n != 0 { "True" } else { "False" }),
        (CilType::Char, Value::Int(n)) => u32::try_from(*n)
            .ok()
            .and_then(char::from_u32)
            .map_or_else(String::new, String::from),
        _ => value.to_string(),
    }
}
