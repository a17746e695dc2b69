use crate::ast::{DeclSection, Identifier, Node, StatementList};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Program {
    pub name: Identifier,
    pub decls: Option<DeclSection>,
    pub body: StatementList,
}

impl Program {
    pub fn new(name: Identifier, decls: Option<DeclSection>, body: StatementList) -> Self {
        Self { name, decls, body }
    }

    /// Deterministic text dump of the whole tree.
    pub fn render_tree(&self) -> String {
        self.tree().join("\n")
    }
}

impl Node for Program {
    fn label(&self) -> String {
        "program".to_string()
    }

    fn children(&self) -> Vec<&dyn Node> {
        let mut children: Vec<&dyn Node> = vec![&self.name];
        if let Some(decls) = &self.decls {
            children.push(decls);
        }
        children.push(&self.body);
        children
    }
}
