use crate::ast::{
    ArrayElement, Assign, AssignTarget, BinaryOperator, Call, Decl, DeclSection, Expr,
    Identifier, Literal, LiteralValue, Node, Program, Routine, StatementList, Stmt, TypeRef,
    VarDeclKind, VarSection,
};
use crate::position::Position;
use crate::semantic::symboltable::{SymbolTable, SymbolType};
use crate::semantic::types::{operator_result, Type};
use crate::utils::errors::{SemanticError, SemanticResult};

/// Validate a parsed program. Stops at the first error.
pub fn analyze(program: &Program) -> SemanticResult<()> {
    SemanticAnalyzer::new().analyze(program)
}

/// Depth-first validating walk over the AST. Produces no output besides
/// the first error it meets.
pub struct SemanticAnalyzer {
    table: SymbolTable,
    // One entry per routine body being analysed; `Some` for functions,
    // carrying the name that denotes the return slot and its type.
    frames: Vec<Option<(String, Type)>>,
}

impl Default for SemanticAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl SemanticAnalyzer {
    pub fn new() -> Self {
        Self {
            table: SymbolTable::with_builtins(),
            frames: Vec::new(),
        }
    }

    pub fn analyze(&mut self, program: &Program) -> SemanticResult<()> {
        // Program-level names share the global scope with the built-ins
        self.frames.push(None);
        let result = self.block(program.decls.as_ref(), &program.body);
        self.frames.pop();
        result
    }

    /// Run `f` inside a fresh scope and routine frame, restoring both
    /// whether `f` succeeds or not.
    fn with_scope<T>(
        &mut self,
        frame: Option<(String, Type)>,
        f: impl FnOnce(&mut Self) -> SemanticResult<T>,
    ) -> SemanticResult<T> {
        self.table.push_scope();
        self.frames.push(frame);
        let result = f(self);
        self.frames.pop();
        self.table.drop_scope();
        result
    }

    fn block(&mut self, decls: Option<&DeclSection>, body: &StatementList) -> SemanticResult<()> {
        if let Some(decls) = decls {
            self.decl_section(decls)?;
        }
        self.statement_list(body)
    }

    /// Bind every variable and routine signature of the section first, then
    /// analyse the routine bodies, so routines in one section see each other.
    fn decl_section(&mut self, section: &DeclSection) -> SemanticResult<()> {
        for decl in &section.decls {
            if let Decl::Vars(vars) = decl {
                self.var_section(vars)?;
            } else if let Some(routine) = decl.as_routine() {
                self.declare_routine(routine)?;
            }
        }
        for routine in section.routines() {
            self.routine_body(routine)?;
        }
        Ok(())
    }

    fn var_section(&mut self, section: &VarSection) -> SemanticResult<()> {
        for decl in &section.decls {
            match decl {
                VarDeclKind::Var(var) => {
                    let ty = self.resolve_type(&var.ty)?;
                    for ident in var.names.iter() {
                        self.table
                            .insert(&ident.name, SymbolType::Variable(ty), ident.position)?;
                    }
                }
                VarDeclKind::Array(array) => {
                    let element = self.resolve_type(&array.element)?;
                    let lower = array.lower.as_integer().unwrap_or(0);
                    let upper = array.upper.as_integer().unwrap_or(0);
                    for ident in array.names.iter() {
                        if lower > upper {
                            return Err(SemanticError::InvalidBounds {
                                name: ident.name.clone(),
                                lower: lower.into(),
                                upper: upper.into(),
                                position: ident.position,
                            });
                        }
                        self.table.insert(
                            &ident.name,
                            SymbolType::Array {
                                element,
                                lower,
                                upper,
                            },
                            ident.position,
                        )?;
                    }
                }
            }
        }
        Ok(())
    }

    fn resolve_type(&self, type_ref: &TypeRef) -> SemanticResult<Type> {
        let symbol = self
            .table
            .get(&type_ref.name)
            .ok_or_else(|| SemanticError::UndefinedSymbol {
                name: type_ref.name.clone(),
                position: type_ref.position,
            })?;
        match symbol.symbol_type {
            SymbolType::BuiltinType(ty) => Ok(ty),
            ref other => Err(SemanticError::KindMismatch {
                name: type_ref.name.clone(),
                expected: "type",
                found: other.kind(),
                position: type_ref.position,
            }),
        }
    }

    // Untyped parameters fall back to integer
    fn param_types(&self, routine: Routine<'_>) -> SemanticResult<Vec<Type>> {
        routine
            .params()
            .iter()
            .map(|param| match &param.ty {
                Some(ty) => self.resolve_type(ty),
                None => Ok(Type::Integer),
            })
            .collect()
    }

    fn declare_routine(&mut self, routine: Routine<'_>) -> SemanticResult<()> {
        let params = self.param_types(routine)?;
        let symbol_type = match routine.return_type() {
            Some(ty) => SymbolType::Function {
                params,
                returns: self.resolve_type(ty)?,
            },
            None => SymbolType::Procedure { params },
        };
        let name = routine.name();
        self.table.insert(&name.name, symbol_type, name.position)
    }

    fn routine_body(&mut self, routine: Routine<'_>) -> SemanticResult<()> {
        let params = self.param_types(routine)?;
        let frame = match routine.return_type() {
            Some(ty) => Some((routine.name().name.clone(), self.resolve_type(ty)?)),
            None => None,
        };
        self.with_scope(frame, |this| {
            for (param, ty) in routine.params().iter().zip(params) {
                this.table
                    .insert(&param.name.name, SymbolType::Variable(ty), param.name.position)?;
            }
            this.block(routine.decls(), routine.body())
        })
    }

    fn statement_list(&mut self, list: &StatementList) -> SemanticResult<()> {
        for stmt in &list.statements {
            self.statement(stmt)?;
        }
        Ok(())
    }

    fn statement(&mut self, stmt: &Stmt) -> SemanticResult<()> {
        match stmt {
            Stmt::Assign(assign) => self.assign(assign),
            Stmt::Call(call) => self.call(call, false).map(|_| ()),
            Stmt::If(if_stmt) => {
                self.condition(&if_stmt.condition, "if")?;
                self.statement(&if_stmt.then_branch)?;
                if let Some(else_branch) = &if_stmt.else_branch {
                    self.statement(else_branch)?;
                }
                Ok(())
            }
            Stmt::While(while_stmt) => {
                self.condition(&while_stmt.condition, "while")?;
                self.statement(&while_stmt.body)
            }
            Stmt::Repeat(repeat) => {
                self.statement_list(&repeat.body)?;
                self.condition(&repeat.condition, "repeat")
            }
            Stmt::For(for_stmt) => {
                let variable_type = self.target_type(&for_stmt.init.target)?;
                if variable_type != Type::Integer {
                    return Err(SemanticError::ConditionTypeError {
                        construct: "for",
                        expected: Type::Integer,
                        found: variable_type,
                        position: for_stmt.init.position,
                    });
                }
                self.assign(&for_stmt.init)?;
                let bound = self.expression(&for_stmt.bound)?;
                if !Type::Integer.is_compatible_with(bound) {
                    return Err(SemanticError::ConditionTypeError {
                        construct: "for",
                        expected: Type::Integer,
                        found: bound,
                        position: for_stmt.position,
                    });
                }
                self.statement(&for_stmt.body)
            }
            Stmt::Compound(list) => self.statement_list(list),
        }
    }

    fn condition(&mut self, condition: &Expr, construct: &'static str) -> SemanticResult<()> {
        let found = self.expression(condition)?;
        if found != Type::Boolean {
            return Err(SemanticError::ConditionTypeError {
                construct,
                expected: Type::Boolean,
                found,
                position: condition.position(),
            });
        }
        Ok(())
    }

    fn assign(&mut self, assign: &Assign) -> SemanticResult<()> {
        let expected = self.target_type(&assign.target)?;
        let found = self.expression(&assign.value)?;
        if !expected.is_compatible_with(found) {
            return Err(SemanticError::TypeMismatch {
                name: assign.target.name().to_string(),
                expected,
                found,
                position: assign.position,
            });
        }
        Ok(())
    }

    fn target_type(&mut self, target: &AssignTarget) -> SemanticResult<Type> {
        match target {
            AssignTarget::Variable(ident) => self.variable_type(ident),
            AssignTarget::Element(element) => self.array_element(element),
        }
    }

    /// The return slot of the innermost function, when `name` denotes it.
    fn return_slot(&self, name: &str) -> Option<Type> {
        match self.frames.last() {
            Some(Some((function, ty))) if function == name => Some(*ty),
            _ => None,
        }
    }

    fn variable_type(&self, ident: &Identifier) -> SemanticResult<Type> {
        if let Some(ty) = self.return_slot(&ident.name) {
            return Ok(ty);
        }
        let symbol = self.table.get(&ident.name).ok_or_else(|| undefined(ident))?;
        match symbol.symbol_type {
            SymbolType::Variable(ty) => Ok(ty),
            ref other => Err(SemanticError::KindMismatch {
                name: ident.name.clone(),
                expected: "variable",
                found: other.kind(),
                position: ident.position,
            }),
        }
    }

    fn array_element(&mut self, element: &ArrayElement) -> SemanticResult<Type> {
        let array = &element.array;
        let symbol = self.table.get(&array.name).ok_or_else(|| undefined(array))?;
        let (element_type, lower, upper) = match symbol.symbol_type {
            SymbolType::Array {
                element,
                lower,
                upper,
            } => (element, lower, upper),
            ref other => {
                return Err(SemanticError::KindMismatch {
                    name: array.name.clone(),
                    expected: "array",
                    found: other.kind(),
                    position: array.position,
                })
            }
        };

        if let Some(index) = constant_index(&element.index) {
            if index < i64::from(lower) || index > i64::from(upper) {
                return Err(SemanticError::IndexOutOfRange {
                    name: array.name.clone(),
                    index,
                    lower: lower.into(),
                    upper: upper.into(),
                    position: array.position,
                });
            }
            return Ok(element_type);
        }

        // Non-constant indices are type checked only
        let index_type = self.expression(&element.index)?;
        if index_type != Type::Integer {
            return Err(SemanticError::TypeMismatch {
                name: array.name.clone(),
                expected: Type::Integer,
                found: index_type,
                position: array.position,
            });
        }
        Ok(element_type)
    }

    fn expression(&mut self, expr: &Expr) -> SemanticResult<Type> {
        match expr {
            Expr::Literal(literal) => match literal.value {
                LiteralValue::Str(_) => Err(SemanticError::MisplacedString {
                    raw: literal.raw.clone(),
                    position: literal.position,
                }),
                _ => Ok(literal.kind().builtin()),
            },
            Expr::Identifier(ident) => self.variable_type(ident),
            Expr::ArrayElement(element) => self.array_element(element),
            Expr::BinaryOp(binop) => {
                let left = self.expression(&binop.left)?;
                let right = self.expression(&binop.right)?;
                self.binary_result(binop.operator, left, right, binop.position)
            }
            Expr::Call(call) => match self.call(call, true)? {
                Some(ty) => Ok(ty),
                None => Err(SemanticError::KindMismatch {
                    name: call.callee.name.clone(),
                    expected: "function",
                    found: "procedure",
                    position: call.callee.position,
                }),
            },
        }
    }

    fn binary_result(
        &self,
        operator: BinaryOperator,
        left: Type,
        right: Type,
        position: Position,
    ) -> SemanticResult<Type> {
        let result = if left.is_compatible_with(right) {
            operator_result(operator, left)
        } else {
            None
        };
        result.ok_or(SemanticError::InvalidOperatorOperand {
            operator,
            left,
            right,
            position,
        })
    }

    /// Check a call and return the callee's result type, if it has one.
    fn call(&mut self, call: &Call, in_expression: bool) -> SemanticResult<Option<Type>> {
        let callee = &call.callee;
        let symbol = self
            .table
            .get_routine(&callee.name)
            .ok_or_else(|| undefined(callee))?;
        let symbol_type = symbol.symbol_type.clone();

        let kind_mismatch = |found: &'static str| SemanticError::KindMismatch {
            name: callee.name.clone(),
            expected: if in_expression { "function" } else { "routine" },
            found,
            position: callee.position,
        };

        match symbol_type {
            SymbolType::BuiltinRoutine => {
                if in_expression {
                    return Err(kind_mismatch("built-in routine"));
                }
                if callee.name.to_ascii_lowercase().starts_with("read") {
                    self.read_targets(call)?;
                } else {
                    // Multi-character literals are only printable text
                    for arg in &call.args {
                        if !is_string_literal(arg) {
                            self.expression(arg)?;
                        }
                    }
                }
                Ok(None)
            }
            SymbolType::Procedure { params } => {
                if in_expression {
                    return Err(kind_mismatch("procedure"));
                }
                self.arguments(call, &params)?;
                Ok(None)
            }
            SymbolType::Function { params, returns } => {
                self.arguments(call, &params)?;
                Ok(Some(returns))
            }
            other => Err(kind_mismatch(other.kind())),
        }
    }

    fn arguments(&mut self, call: &Call, params: &[Type]) -> SemanticResult<()> {
        let callee = &call.callee;
        if call.args.len() != params.len() {
            return Err(SemanticError::ArityMismatch {
                name: callee.name.clone(),
                expected: params.len(),
                found: call.args.len(),
                position: callee.position,
            });
        }
        for (arg, &expected) in call.args.iter().zip(params) {
            let found = self.expression(arg)?;
            if !expected.is_compatible_with(found) {
                return Err(SemanticError::TypeMismatch {
                    name: callee.name.clone(),
                    expected,
                    found,
                    position: arg.position(),
                });
            }
        }
        Ok(())
    }

    /// `read`/`readln` store parsed integers, so every argument must name an
    /// integer variable or array element.
    fn read_targets(&mut self, call: &Call) -> SemanticResult<()> {
        for arg in &call.args {
            let (name, found) = match arg {
                Expr::Identifier(ident) => (&ident.name, self.variable_type(ident)?),
                Expr::ArrayElement(element) => (&element.array.name, self.array_element(element)?),
                _ => {
                    return Err(SemanticError::KindMismatch {
                        name: call.callee.name.clone(),
                        expected: "variable",
                        found: "expression",
                        position: arg.position(),
                    })
                }
            };
            if found != Type::Integer {
                return Err(SemanticError::TypeMismatch {
                    name: name.clone(),
                    expected: Type::Integer,
                    found,
                    position: arg.position(),
                });
            }
        }
        Ok(())
    }
}

fn undefined(ident: &Identifier) -> SemanticError {
    SemanticError::UndefinedSymbol {
        name: ident.name.clone(),
        position: ident.position,
    }
}

fn is_string_literal(expr: &Expr) -> bool {
    matches!(
        expr,
        Expr::Literal(Literal {
            value: LiteralValue::Str(_),
            ..
        })
    )
}

/// Value of an index written as an integer literal, optionally negated.
fn constant_index(index: &Expr) -> Option<i64> {
    match index {
        Expr::Literal(literal) => match literal.value {
            LiteralValue::Integer(n) => Some(n.into()),
            _ => None,
        },
        Expr::BinaryOp(binop) if binop.operator == BinaryOperator::Sub => {
            match (binop.left.as_ref(), binop.right.as_ref()) {
                (Expr::Literal(zero), Expr::Literal(value))
                    if zero.as_integer() == Some(0) && zero.position == binop.position =>
                {
                    value.as_integer().map(|n| -i64::from(n))
                }
                _ => None,
            }
        }
        _ => None,
    }
}
