// Abstract syntax tree for the Pascal subset.
// Every node kind is a closed enum or plain struct; `Node` gives a uniform
// read-only view for tree dumps and diagnostics.

mod traits;
pub use traits::Node;

mod declarations;
mod expressions;
mod literals;
mod program;
mod statements;

pub use declarations::{
    ArrayDecl, Decl, DeclSection, FunctionDecl, IdentifierList, Param, ProcedureDecl, Routine,
    TypeRef, VarDecl, VarDeclKind, VarSection,
};
pub use expressions::{ArrayElement, BinaryOp, BinaryOperator, Call, Expr};
pub use literals::{Identifier, Literal, LiteralValue};
pub use program::Program;
pub use statements::{Assign, AssignTarget, For, If, Repeat, StatementList, Stmt, While};
