use crate::ast::{Identifier, Literal, Node, StatementList};
use crate::position::Position;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdentifierList {
    pub idents: Vec<Identifier>,
}

impl IdentifierList {
    pub fn iter(&self) -> impl Iterator<Item = &Identifier> {
        self.idents.iter()
    }

    pub fn len(&self) -> usize {
        self.idents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.idents.is_empty()
    }
}

impl Node for IdentifierList {
    fn label(&self) -> String {
        "idents".to_string()
    }

    fn children(&self) -> Vec<&dyn Node> {
        self.idents.iter().map(|id| id as &dyn Node).collect()
    }
}

/// A reference to a type by name, lowercased by the lexer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeRef {
    pub name: String,
    pub position: Position,
}

impl Node for TypeRef {
    fn label(&self) -> String {
        self.name.clone()
    }

    fn position(&self) -> Position {
        self.position
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VarDecl {
    pub names: IdentifierList,
    pub ty: TypeRef,
}

impl Node for VarDecl {
    fn label(&self) -> String {
        "var_decl".to_string()
    }

    fn children(&self) -> Vec<&dyn Node> {
        vec![&self.names as &dyn Node, &self.ty]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArrayDecl {
    pub names: IdentifierList,
    pub lower: Literal,
    pub upper: Literal,
    pub element: TypeRef,
}

impl Node for ArrayDecl {
    fn label(&self) -> String {
        "array_decl".to_string()
    }

    fn children(&self) -> Vec<&dyn Node> {
        vec![&self.names as &dyn Node, &self.lower, &self.upper, &self.element]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VarDeclKind {
    Var(VarDecl),
    Array(ArrayDecl),
}

impl VarDeclKind {
    fn as_node(&self) -> &dyn Node {
        match self {
            VarDeclKind::Var(decl) => decl,
            VarDeclKind::Array(decl) => decl,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VarSection {
    pub decls: Vec<VarDeclKind>,
    pub position: Position,
}

impl Node for VarSection {
    fn label(&self) -> String {
        "var".to_string()
    }

    fn children(&self) -> Vec<&dyn Node> {
        self.decls.iter().map(VarDeclKind::as_node).collect()
    }

    fn position(&self) -> Position {
        self.position
    }
}

/// A formal parameter. The type is optional in the grammar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    pub name: Identifier,
    pub ty: Option<TypeRef>,
}

impl Node for Param {
    fn label(&self) -> String {
        "param".to_string()
    }

    fn children(&self) -> Vec<&dyn Node> {
        let mut children: Vec<&dyn Node> = vec![&self.name];
        if let Some(ty) = &self.ty {
            children.push(ty);
        }
        children
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcedureDecl {
    pub name: Identifier,
    pub params: Vec<Param>,
    pub decls: Option<DeclSection>,
    pub body: StatementList,
}

impl Node for ProcedureDecl {
    fn label(&self) -> String {
        "procedure".to_string()
    }

    fn children(&self) -> Vec<&dyn Node> {
        let mut children: Vec<&dyn Node> = vec![&self.name];
        children.extend(self.params.iter().map(|p| p as &dyn Node));
        if let Some(decls) = &self.decls {
            children.push(decls);
        }
        children.push(&self.body);
        children
    }

    fn position(&self) -> Position {
        self.name.position
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionDecl {
    pub name: Identifier,
    pub params: Vec<Param>,
    pub return_type: TypeRef,
    pub decls: Option<DeclSection>,
    pub body: StatementList,
}

impl Node for FunctionDecl {
    fn label(&self) -> String {
        "function".to_string()
    }

    fn children(&self) -> Vec<&dyn Node> {
        let mut children: Vec<&dyn Node> = vec![&self.name];
        children.extend(self.params.iter().map(|p| p as &dyn Node));
        children.push(&self.return_type);
        if let Some(decls) = &self.decls {
            children.push(decls);
        }
        children.push(&self.body);
        children
    }

    fn position(&self) -> Position {
        self.name.position
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decl {
    Vars(VarSection),
    Procedure(ProcedureDecl),
    Function(FunctionDecl),
}

impl Decl {
    pub fn as_routine(&self) -> Option<Routine<'_>> {
        match self {
            Decl::Vars(_) => None,
            Decl::Procedure(decl) => Some(Routine::Procedure(decl)),
            Decl::Function(decl) => Some(Routine::Function(decl)),
        }
    }

    fn as_node(&self) -> &dyn Node {
        match self {
            Decl::Vars(section) => section,
            Decl::Procedure(decl) => decl,
            Decl::Function(decl) => decl,
        }
    }
}

/// Borrowed view over a procedure or function declaration, so passes can
/// treat both uniformly.
#[derive(Debug, Clone, Copy)]
pub enum Routine<'a> {
    Procedure(&'a ProcedureDecl),
    Function(&'a FunctionDecl),
}

impl<'a> Routine<'a> {
    pub fn name(&self) -> &'a Identifier {
        match self {
            Routine::Procedure(decl) => &decl.name,
            Routine::Function(decl) => &decl.name,
        }
    }

    pub fn params(&self) -> &'a [Param] {
        match self {
            Routine::Procedure(decl) => &decl.params,
            Routine::Function(decl) => &decl.params,
        }
    }

    pub fn decls(&self) -> Option<&'a DeclSection> {
        match self {
            Routine::Procedure(decl) => decl.decls.as_ref(),
            Routine::Function(decl) => decl.decls.as_ref(),
        }
    }

    pub fn body(&self) -> &'a StatementList {
        match self {
            Routine::Procedure(decl) => &decl.body,
            Routine::Function(decl) => &decl.body,
        }
    }

    pub fn return_type(&self) -> Option<&'a TypeRef> {
        match self {
            Routine::Procedure(_) => None,
            Routine::Function(decl) => Some(&decl.return_type),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DeclSection {
    pub decls: Vec<Decl>,
}

impl DeclSection {
    pub fn var_sections(&self) -> impl Iterator<Item = &VarSection> {
        self.decls.iter().filter_map(|decl| match decl {
            Decl::Vars(section) => Some(section),
            _ => None,
        })
    }

    pub fn routines(&self) -> impl Iterator<Item = Routine<'_>> {
        self.decls.iter().filter_map(Decl::as_routine)
    }
}

impl Node for DeclSection {
    fn label(&self) -> String {
        "declarations".to_string()
    }

    fn children(&self) -> Vec<&dyn Node> {
        self.decls.iter().map(Decl::as_node).collect()
    }
}
