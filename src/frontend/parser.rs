use crate::ast::{
    ArrayDecl, ArrayElement, Assign, AssignTarget, BinaryOperator, Call, Decl, DeclSection, Expr,
    For, FunctionDecl, Identifier, IdentifierList, If, Literal, LiteralValue, Param,
    ProcedureDecl, Program, Repeat, StatementList, Stmt, TypeRef, VarDecl, VarDeclKind,
    VarSection, While,
};
use crate::frontend::lexer::Lexer;
use crate::frontend::token::Token;
use crate::position::Position;
use crate::utils::config::parser::MAX_NESTING_DEPTH;
use crate::utils::errors::ParseError;

type ParseResult<T> = Result<T, ParseError>;

/// Recursive-descent parser. It pulls tokens from the lexer on demand and
/// keeps one token of lookahead beyond the current one.
pub struct Parser<'a> {
    lexer: Lexer<'a>,
    current_token: Token,
    position: Position,
    lookahead: Option<(Token, Position)>,
    depth: usize,
}

impl<'a> Parser<'a> {
    pub fn new(source: &'a str) -> ParseResult<Self> {
        let mut lexer = Lexer::new(source);
        let (current_token, position) = lexer.next_token()?;
        Ok(Self {
            lexer,
            current_token,
            position,
            lookahead: None,
            depth: 0,
        })
    }

    /// Parse a whole compilation unit. Trailing input after the final `.`
    /// is an error.
    pub fn parse(mut self) -> ParseResult<Program> {
        let program = self.program()?;
        if self.current_token != Token::Eof {
            return Err(self.unexpected("end of input"));
        }
        Ok(program)
    }

    fn next(&mut self) -> ParseResult<()> {
        let (token, position) = match self.lookahead.take() {
            Some(pair) => pair,
            None => self.lexer.next_token()?,
        };
        self.current_token = token;
        self.position = position;
        Ok(())
    }

    fn peek(&mut self) -> ParseResult<&Token> {
        if self.lookahead.is_none() {
            self.lookahead = Some(self.lexer.next_token()?);
        }
        match &self.lookahead {
            Some((token, _)) => Ok(token),
            None => Ok(&Token::Eof),
        }
    }

    /// Run `parse` one nesting level deeper, failing once the level passes
    /// `MAX_NESTING_DEPTH`.
    fn nested<T>(&mut self, parse: impl FnOnce(&mut Self) -> ParseResult<T>) -> ParseResult<T> {
        if self.depth >= MAX_NESTING_DEPTH {
            return Err(ParseError::new(
                format!("nesting deeper than {} levels", MAX_NESTING_DEPTH),
                self.position,
            ));
        }
        self.depth += 1;
        let result = parse(self);
        self.depth -= 1;
        result
    }

    fn unexpected(&self, expected: &str) -> ParseError {
        ParseError::expected(expected, self.current_token.to_string(), self.position)
    }

    fn expect(&mut self, expected: Token) -> ParseResult<Position> {
        if self.current_token != expected {
            return Err(self.unexpected(&expected.to_string()));
        }
        let position = self.position;
        self.next()?;
        Ok(position)
    }

    fn accept(&mut self, token: Token) -> ParseResult<bool> {
        if self.current_token == token {
            self.next()?;
            return Ok(true);
        }
        Ok(false)
    }

    fn expect_ident(&mut self) -> ParseResult<Identifier> {
        let Token::Ident(name) = &self.current_token else {
            return Err(self.unexpected("identifier"));
        };
        let ident = Identifier::new(name.clone(), self.position);
        self.next()?;
        Ok(ident)
    }

    fn program(&mut self) -> ParseResult<Program> {
        self.expect(Token::Program)?;
        let name = self.expect_ident()?;
        self.expect(Token::Semicolon)?;
        let (decls, body) = self.block()?;
        self.expect(Token::Dot)?;
        Ok(Program::new(name, decls, body))
    }

    /// block = { var_section | procedure | function } compound
    fn block(&mut self) -> ParseResult<(Option<DeclSection>, StatementList)> {
        self.nested(|parser| {
            let mut decls = Vec::new();
            loop {
                match parser.current_token {
                    Token::Var => decls.push(Decl::Vars(parser.var_section()?)),
                    Token::Procedure => decls.push(Decl::Procedure(parser.procedure()?)),
                    Token::Function => decls.push(Decl::Function(parser.function()?)),
                    _ => break,
                }
            }
            let body = parser.compound()?;
            let decls = (!decls.is_empty()).then_some(DeclSection { decls });
            Ok((decls, body))
        })
    }

    fn var_section(&mut self) -> ParseResult<VarSection> {
        let position = self.expect(Token::Var)?;
        let mut decls = vec![self.var_decl()?];
        while matches!(self.current_token, Token::Ident(_)) {
            decls.push(self.var_decl()?);
        }
        Ok(VarSection { decls, position })
    }

    fn var_decl(&mut self) -> ParseResult<VarDeclKind> {
        let names = self.identifier_list()?;
        self.expect(Token::Colon)?;
        let decl = if self.accept(Token::Array)? {
            self.expect(Token::LBrack)?;
            let lower = self.array_bound()?;
            self.expect(Token::DotDot)?;
            let upper = self.array_bound()?;
            self.expect(Token::RBrack)?;
            self.expect(Token::Of)?;
            let element = self.type_ref()?;
            VarDeclKind::Array(ArrayDecl {
                names,
                lower,
                upper,
                element,
            })
        } else {
            let ty = self.type_ref()?;
            VarDeclKind::Var(VarDecl { names, ty })
        };
        self.expect(Token::Semicolon)?;
        Ok(decl)
    }

    fn identifier_list(&mut self) -> ParseResult<IdentifierList> {
        let mut idents = vec![self.expect_ident()?];
        while self.accept(Token::Comma)? {
            idents.push(self.expect_ident()?);
        }
        Ok(IdentifierList { idents })
    }

    fn type_ref(&mut self) -> ParseResult<TypeRef> {
        let ident = self.expect_ident().map_err(|_| self.unexpected("type name"))?;
        Ok(TypeRef {
            name: ident.name,
            position: ident.position,
        })
    }

    /// A signed integer literal.
    fn array_bound(&mut self) -> ParseResult<Literal> {
        let position = self.position;
        let negative = if self.accept(Token::Minus)? {
            true
        } else {
            self.accept(Token::Plus)?;
            false
        };
        let Token::Number(value) = self.current_token else {
            return Err(self.unexpected("integer array bound"));
        };
        self.next()?;
        let value = if negative { -value } else { value };
        Ok(Literal::integer(value, position))
    }

    fn params(&mut self) -> ParseResult<Vec<Param>> {
        let mut params = Vec::new();
        if !self.accept(Token::LParen)? {
            return Ok(params);
        }
        if self.accept(Token::RParen)? {
            return Ok(params);
        }
        loop {
            let names = self.identifier_list()?;
            let ty = if self.accept(Token::Colon)? {
                Some(self.type_ref()?)
            } else {
                None
            };
            for name in names.idents {
                params.push(Param {
                    name,
                    ty: ty.clone(),
                });
            }
            if !self.accept(Token::Semicolon)? {
                break;
            }
        }
        self.expect(Token::RParen)?;
        Ok(params)
    }

    fn procedure(&mut self) -> ParseResult<ProcedureDecl> {
        self.expect(Token::Procedure)?;
        let name = self.expect_ident()?;
        let params = self.params()?;
        self.expect(Token::Semicolon)?;
        let (decls, body) = self.block()?;
        self.expect(Token::Semicolon)?;
        Ok(ProcedureDecl {
            name,
            params,
            decls,
            body,
        })
    }

    fn function(&mut self) -> ParseResult<FunctionDecl> {
        self.expect(Token::Function)?;
        let name = self.expect_ident()?;
        let params = self.params()?;
        self.expect(Token::Colon)?;
        let return_type = self.type_ref()?;
        self.expect(Token::Semicolon)?;
        let (decls, body) = self.block()?;
        self.expect(Token::Semicolon)?;
        Ok(FunctionDecl {
            name,
            params,
            return_type,
            decls,
            body,
        })
    }

    /// compound = "begin" [ statement ] { ";" [ statement ] } "end"
    fn compound(&mut self) -> ParseResult<StatementList> {
        let position = self.expect(Token::Begin)?;
        let statements = self.statement_sequence(Token::End)?;
        self.expect(Token::End)?;
        Ok(StatementList::new(statements, position))
    }

    /// Statements separated by `;` up to (not including) `terminator`.
    /// Empty statements are dropped.
    fn statement_sequence(&mut self, terminator: Token) -> ParseResult<Vec<Stmt>> {
        let mut statements = Vec::new();
        loop {
            if self.current_token != terminator && self.current_token != Token::Semicolon {
                statements.push(self.statement()?);
            }
            if !self.accept(Token::Semicolon)? {
                return Ok(statements);
            }
        }
    }

    fn statement(&mut self) -> ParseResult<Stmt> {
        self.nested(|parser| match parser.current_token {
            Token::Ident(_) => parser.simple_statement(),
            Token::If => parser.if_statement(),
            Token::While => parser.while_statement(),
            Token::For => parser.for_statement(),
            Token::Repeat => parser.repeat_statement(),
            Token::Begin => Ok(Stmt::Compound(parser.compound()?)),
            _ => Err(parser.unexpected("statement")),
        })
    }

    /// Assignment or bare call, both starting with an identifier.
    fn simple_statement(&mut self) -> ParseResult<Stmt> {
        let ident = self.expect_ident()?;
        match self.current_token {
            Token::LParen => Ok(Stmt::Call(self.call_arguments(ident)?)),
            Token::LBrack => {
                let element = self.array_element(ident)?;
                self.assignment(AssignTarget::Element(element))
                    .map(Stmt::Assign)
            }
            Token::Assign => self.assignment(AssignTarget::Variable(ident)).map(Stmt::Assign),
            _ => Err(self.unexpected("':=' or '('")),
        }
    }

    fn assignment(&mut self, target: AssignTarget) -> ParseResult<Assign> {
        let position = self.expect(Token::Assign)?;
        let value = self.expression()?;
        Ok(Assign {
            target,
            value,
            position,
        })
    }

    fn if_statement(&mut self) -> ParseResult<Stmt> {
        let position = self.expect(Token::If)?;
        let condition = self.expression()?;
        self.expect(Token::Then)?;
        let then_branch = Box::new(self.statement()?);
        // Tolerate a stray ';' directly before 'else'
        if self.current_token == Token::Semicolon && *self.peek()? == Token::Else {
            self.next()?;
        }
        let else_branch = if self.accept(Token::Else)? {
            Some(Box::new(self.statement()?))
        } else {
            None
        };
        Ok(Stmt::If(If {
            condition,
            then_branch,
            else_branch,
            position,
        }))
    }

    fn while_statement(&mut self) -> ParseResult<Stmt> {
        let position = self.expect(Token::While)?;
        let condition = self.expression()?;
        self.expect(Token::Do)?;
        let body = Box::new(self.statement()?);
        Ok(Stmt::While(While {
            condition,
            body,
            position,
        }))
    }

    fn for_statement(&mut self) -> ParseResult<Stmt> {
        let position = self.expect(Token::For)?;
        let variable = self.expect_ident()?;
        let init = self.assignment(AssignTarget::Variable(variable))?;
        self.expect(Token::To)?;
        let bound = self.expression()?;
        self.expect(Token::Do)?;
        let body = Box::new(self.statement()?);
        Ok(Stmt::For(For {
            init,
            bound,
            body,
            position,
        }))
    }

    fn repeat_statement(&mut self) -> ParseResult<Stmt> {
        let position = self.expect(Token::Repeat)?;
        let statements = self.statement_sequence(Token::Until)?;
        self.expect(Token::Until)?;
        let condition = self.expression()?;
        Ok(Stmt::Repeat(Repeat {
            body: StatementList::new(statements, position),
            condition,
            position,
        }))
    }

    fn call_arguments(&mut self, callee: Identifier) -> ParseResult<Call> {
        self.expect(Token::LParen)?;
        let mut args = Vec::new();
        if !self.accept(Token::RParen)? {
            args.push(self.expression()?);
            while self.accept(Token::Comma)? {
                args.push(self.expression()?);
            }
            self.expect(Token::RParen)?;
        }
        Ok(Call { callee, args })
    }

    fn array_element(&mut self, array: Identifier) -> ParseResult<ArrayElement> {
        self.expect(Token::LBrack)?;
        let index = self.expression()?;
        self.expect(Token::RBrack)?;
        Ok(ArrayElement {
            array,
            index: Box::new(index),
        })
    }

    pub fn expression(&mut self) -> ParseResult<Expr> {
        self.nested(|parser| parser.binary_layer(0))
    }

    /// One left-associative precedence layer. A layer only wraps its operand
    /// in a `BinaryOp` when it actually consumed an operator.
    fn binary_layer(&mut self, level: usize) -> ParseResult<Expr> {
        if level == PRECEDENCE.len() {
            return self.atom();
        }
        let mut left = self.binary_layer(level + 1)?;
        while let Some(operator) = binary_operator(&self.current_token, PRECEDENCE[level]) {
            let position = self.position;
            self.next()?;
            let right = self.binary_layer(level + 1)?;
            left = Expr::binary(operator, left, right, position);
        }
        Ok(left)
    }

    fn atom(&mut self) -> ParseResult<Expr> {
        let position = self.position;
        match &self.current_token {
            Token::Number(n) => {
                let literal = Literal::integer(*n, position);
                self.next()?;
                Ok(Expr::Literal(literal))
            }
            Token::CharLiteral(c) => {
                let literal = Literal::new(format!("'{}'", c), LiteralValue::Char(*c), position);
                self.next()?;
                Ok(Expr::Literal(literal))
            }
            Token::StringLiteral(s) => {
                let literal =
                    Literal::new(format!("'{}'", s), LiteralValue::Str(s.clone()), position);
                self.next()?;
                Ok(Expr::Literal(literal))
            }
            Token::True | Token::False => {
                let literal = Literal::boolean(self.current_token == Token::True, position);
                self.next()?;
                Ok(Expr::Literal(literal))
            }
            Token::Ident(_) => {
                let ident = self.expect_ident()?;
                match self.current_token {
                    Token::LParen => Ok(Expr::Call(self.call_arguments(ident)?)),
                    Token::LBrack => Ok(Expr::ArrayElement(self.array_element(ident)?)),
                    _ => Ok(Expr::Identifier(ident)),
                }
            }
            Token::LParen => {
                self.next()?;
                let expr = self.expression()?;
                self.expect(Token::RParen)?;
                Ok(expr)
            }
            Token::Minus => {
                self.next()?;
                let operand = self.nested(Self::atom)?;
                let zero = Expr::Literal(Literal::integer(0, position));
                Ok(Expr::binary(BinaryOperator::Sub, zero, operand, position))
            }
            Token::Plus => {
                self.next()?;
                self.nested(Self::atom)
            }
            _ => Err(self.unexpected("expression")),
        }
    }
}

// Binary precedence layers, loosest binding first
const PRECEDENCE: [&[BinaryOperator]; 6] = [
    &[BinaryOperator::Or],
    &[BinaryOperator::And],
    &[BinaryOperator::Eq, BinaryOperator::Ne],
    &[
        BinaryOperator::Lt,
        BinaryOperator::Le,
        BinaryOperator::Gt,
        BinaryOperator::Ge,
    ],
    &[BinaryOperator::Add, BinaryOperator::Sub],
    &[
        BinaryOperator::Mul,
        BinaryOperator::DivReal,
        BinaryOperator::DivInt,
        BinaryOperator::Mod,
    ],
];

fn binary_operator(token: &Token, layer: &[BinaryOperator]) -> Option<BinaryOperator> {
    let operator = match token {
        Token::Or => BinaryOperator::Or,
        Token::And => BinaryOperator::And,
        Token::Equal => BinaryOperator::Eq,
        Token::NotEqual => BinaryOperator::Ne,
        Token::LessThan => BinaryOperator::Lt,
        Token::LessThanEqual => BinaryOperator::Le,
        Token::GreaterThan => BinaryOperator::Gt,
        Token::GreaterThanEqual => BinaryOperator::Ge,
        Token::Plus => BinaryOperator::Add,
        Token::Minus => BinaryOperator::Sub,
        Token::Multiply => BinaryOperator::Mul,
        Token::Divide => BinaryOperator::DivReal,
        Token::Div => BinaryOperator::DivInt,
        Token::Mod => BinaryOperator::Mod,
        _ => return None,
    };
    layer.contains(&operator).then_some(operator)
}
