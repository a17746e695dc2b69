use crate::ast::{Identifier, Literal, Node};
use crate::position::Position;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BinaryOperator {
    Add,
    Sub,
    Mul,
    DivInt,
    DivReal,
    Mod,
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    And,
    Or,
}

impl BinaryOperator {
    pub fn symbol(&self) -> &'static str {
        match self {
            BinaryOperator::Add => "+",
            BinaryOperator::Sub => "-",
            BinaryOperator::Mul => "*",
            BinaryOperator::DivInt => "div",
            BinaryOperator::DivReal => "/",
            BinaryOperator::Mod => "mod",
            BinaryOperator::Eq => "=",
            BinaryOperator::Ne => "<>",
            BinaryOperator::Lt => "<",
            BinaryOperator::Le => "<=",
            BinaryOperator::Gt => ">",
            BinaryOperator::Ge => ">=",
            BinaryOperator::And => "and",
            BinaryOperator::Or => "or",
        }
    }

    pub fn is_comparison(&self) -> bool {
        matches!(
            self,
            BinaryOperator::Eq
                | BinaryOperator::Ne
                | BinaryOperator::Lt
                | BinaryOperator::Le
                | BinaryOperator::Gt
                | BinaryOperator::Ge
        )
    }
}

impl fmt::Display for BinaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    Literal(Literal),
    Identifier(Identifier),
    ArrayElement(ArrayElement),
    BinaryOp(BinaryOp),
    Call(Call),
}

impl Expr {
    pub fn binary(operator: BinaryOperator, left: Expr, right: Expr, position: Position) -> Self {
        Expr::BinaryOp(BinaryOp {
            operator,
            left: Box::new(left),
            right: Box::new(right),
            position,
        })
    }

    fn as_node(&self) -> &dyn Node {
        match self {
            Expr::Literal(lit) => lit,
            Expr::Identifier(ident) => ident,
            Expr::ArrayElement(elem) => elem,
            Expr::BinaryOp(binop) => binop,
            Expr::Call(call) => call,
        }
    }
}

impl Node for Expr {
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

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArrayElement {
    pub array: Identifier,
    pub index: Box<Expr>,
}

impl Node for ArrayElement {
    fn label(&self) -> String {
        "[]".to_string()
    }

    fn children(&self) -> Vec<&dyn Node> {
        vec![&self.array as &dyn Node, self.index.as_ref()]
    }

    fn position(&self) -> Position {
        self.array.position
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BinaryOp {
    pub operator: BinaryOperator,
    pub left: Box<Expr>,
    pub right: Box<Expr>,
    pub position: Position,
}

impl Node for BinaryOp {
    fn label(&self) -> String {
        self.operator.symbol().to_string()
    }

    fn children(&self) -> Vec<&dyn Node> {
        vec![self.left.as_ref() as &dyn Node, self.right.as_ref()]
    }

    fn position(&self) -> Position {
        self.position
    }
}

/// A routine invocation. Used both as an expression and as a statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Call {
    pub callee: Identifier,
    pub args: Vec<Expr>,
}

impl Node for Call {
    fn label(&self) -> String {
        "call".to_string()
    }

    fn children(&self) -> Vec<&dyn Node> {
        let mut children: Vec<&dyn Node> = vec![&self.callee];
        children.extend(self.args.iter().map(|arg| arg as &dyn Node));
        children
    }

    fn position(&self) -> Position {
        self.callee.position
    }
}
