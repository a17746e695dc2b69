/*
*                    pascil -- Pascal subset to CIL compiler.
*
* program      = "program" ident ";" block "." ;
* block        = [ var_section ] { procedure | function } compound ;
* var_section  = "var" ( var_decl | array_decl ) { var_decl | array_decl } ;
* var_decl     = ident_list ":" type ";" ;
* array_decl   = ident_list ":" "array" "[" bound ".." bound "]" "of" type ";" ;
* procedure    = "procedure" ident [ params ] ";" block ";" ;
* function     = "function" ident [ params ] ":" type ";" block ";" ;
* params       = "(" [ group { ";" group } ] ")" ;
* group        = ident_list [ ":" type ] ;
* compound     = "begin" [ statement ] { ";" [ statement ] } "end" ;
* statement    = target ":=" expr
*              | ident "(" [ expr { "," expr } ] ")"
*              | "if" expr "then" statement [ "else" statement ]
*              | "while" expr "do" statement
*              | "for" ident ":=" expr "to" expr "do" statement
*              | "repeat" statement { ";" statement } "until" expr
*              | compound ;
* expr         = and_expr { "or" and_expr } ;
* and_expr     = equality { "and" equality } ;
* equality     = relational { ( "=" | "<>" ) relational } ;
* relational   = additive { ( "<" | "<=" | ">" | ">=" ) additive } ;
* additive     = term { ( "+" | "-" ) term } ;
* term         = atom { ( "*" | "/" | "div" | "mod" ) atom } ;
* atom         = literal | call | ident "[" expr "]" | ident
*              | "(" expr ")" | ( "+" | "-" ) atom ;
*/

use crate::position::Position;

/// Common view over every AST node, used for diagnostics and tree dumps.
///
/// `children` returns the node's children in the fixed order each node
/// kind defines; that order is also the evaluation order of the passes.
pub trait Node {
    fn label(&self) -> String;

    fn children(&self) -> Vec<&dyn Node> {
        Vec::new()
    }

    fn position(&self) -> Position {
        Position::UNKNOWN
    }

    /// Render this node and its subtree, one line per node.
    fn tree(&self) -> Vec<String> {
        let mut lines = vec![self.label()];
        let children = self.children();
        let last = children.len().saturating_sub(1);
        for (i, child) in children.iter().enumerate() {
            let (head, rest) = if i == last { ("└", " ") } else { ("├", "│") };
            for (j, line) in child.tree().into_iter().enumerate() {
                let prefix = if j == 0 { head } else { rest };
                lines.push(format!("{} {}", prefix, line));
            }
        }
        lines
    }
}
