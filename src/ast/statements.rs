use crate::ast::{ArrayElement, Call, Expr, Identifier, Node};
use crate::position::Position;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Stmt {
    Assign(Assign),
    Call(Call),
    If(If),
    While(While),
    For(For),
    Repeat(Repeat),
    Compound(StatementList),
}

impl Stmt {
    fn as_node(&self) -> &dyn Node {
        match self {
            Stmt::Assign(assign) => assign,
            Stmt::Call(call) => call,
            Stmt::If(if_stmt) => if_stmt,
            Stmt::While(while_stmt) => while_stmt,
            Stmt::For(for_stmt) => for_stmt,
            Stmt::Repeat(repeat) => repeat,
            Stmt::Compound(list) => list,
        }
    }
}

impl Node for Stmt {
    fn label(&self) -> String {
        self.as_node().label()
    }

    fn children(&self) -> Vec<&dyn Node> {
        self.as_node().children()
    }

    fn position(&self) -> Position {
        self.as_node().position()
    }
}

/// Left-hand side of `:=`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AssignTarget {
    Variable(Identifier),
    Element(ArrayElement),
}

impl AssignTarget {
    pub fn name(&self) -> &str {
        match self {
            AssignTarget::Variable(ident) => &ident.name,
            AssignTarget::Element(elem) => &elem.array.name,
        }
    }

    fn as_node(&self) -> &dyn Node {
        match self {
            AssignTarget::Variable(ident) => ident,
            AssignTarget::Element(elem) => elem,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assign {
    pub target: AssignTarget,
    pub value: Expr,
    pub position: Position,
}

impl Node for Assign {
    fn label(&self) -> String {
        ":=".to_string()
    }

    fn children(&self) -> Vec<&dyn Node> {
        vec![self.target.as_node(), &self.value as &dyn Node]
    }

    fn position(&self) -> Position {
        self.position
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct If {
    pub condition: Expr,
    pub then_branch: Box<Stmt>,
    pub else_branch: Option<Box<Stmt>>,
    pub position: Position,
}

impl Node for If {
    fn label(&self) -> String {
        "if".to_string()
    }

    fn children(&self) -> Vec<&dyn Node> {
        let mut children: Vec<&dyn Node> = vec![&self.condition as &dyn Node, self.then_branch.as_ref()];
        if let Some(else_branch) = &self.else_branch {
            children.push(else_branch.as_ref());
        }
        children
    }

    fn position(&self) -> Position {
        self.position
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct While {
    pub condition: Expr,
    pub body: Box<Stmt>,
    pub position: Position,
}

impl Node for While {
    fn label(&self) -> String {
        "while".to_string()
    }

    fn children(&self) -> Vec<&dyn Node> {
        vec![&self.condition as &dyn Node, self.body.as_ref()]
    }

    fn position(&self) -> Position {
        self.position
    }
}

/// `for v := init to bound do body`. The loop counts upward inclusively.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct For {
    pub init: Assign,
    pub bound: Expr,
    pub body: Box<Stmt>,
    pub position: Position,
}

impl For {
    /// The loop variable, when the initializer targets a plain variable.
    pub fn variable(&self) -> Option<&Identifier> {
        match &self.init.target {
            AssignTarget::Variable(ident) => Some(ident),
            AssignTarget::Element(_) => None,
        }
    }
}

impl Node for For {
    fn label(&self) -> String {
        "for".to_string()
    }

    fn children(&self) -> Vec<&dyn Node> {
        vec![&self.init as &dyn Node, &self.bound, self.body.as_ref()]
    }

    fn position(&self) -> Position {
        self.position
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Repeat {
    pub body: StatementList,
    pub condition: Expr,
    pub position: Position,
}

impl Node for Repeat {
    fn label(&self) -> String {
        "repeat".to_string()
    }

    fn children(&self) -> Vec<&dyn Node> {
        vec![&self.body as &dyn Node, &self.condition]
    }

    fn position(&self) -> Position {
        self.position
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StatementList {
    pub statements: Vec<Stmt>,
    pub position: Position,
}

impl StatementList {
    pub fn new(statements: Vec<Stmt>, position: Position) -> Self {
        Self {
            statements,
            position,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.statements.is_empty()
    }
}

impl Node for StatementList {
    fn label(&self) -> String {
        "...".to_string()
    }

    fn children(&self) -> Vec<&dyn Node> {
        self.statements.iter().map(|stmt| stmt as &dyn Node).collect()
    }

    fn position(&self) -> Position {
        self.position
    }
}
