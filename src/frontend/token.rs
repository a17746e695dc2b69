use std::fmt;
use std::mem;

#[derive(Debug, Clone)]
pub enum Token {
    Ident(String),
    Number(i32),
    CharLiteral(char),
    StringLiteral(String),
    Program,
    Var,
    Procedure,
    Function,
    Begin,
    End,
    If,
    Then,
    Else,
    While,
    Do,
    For,
    To,
    Repeat,
    Until,
    Array,
    Of,
    Div,
    Mod,
    And,
    Or,
    True,
    False,
    Assign,
    Colon,
    Semicolon,
    Comma,
    Dot,
    DotDot,
    LParen,
    RParen,
    LBrack,
    RBrack,
    Plus,
    Minus,
    Multiply,
    Divide,
    Equal,
    NotEqual,
    LessThan,
    LessThanEqual,
    GreaterThan,
    GreaterThanEqual,
    Eof,
}

impl Token {
    /// Keyword lookup on the lowercased spelling of a word.
    pub fn keyword(word: &str) -> Option<Token> {
        let token = match word {
            "program" => Token::Program,
            "var" => Token::Var,
            "procedure" => Token::Procedure,
            "function" => Token::Function,
            "begin" => Token::Begin,
            "end" => Token::End,
            "if" => Token::If,
            "then" => Token::Then,
            "else" => Token::Else,
            "while" => Token::While,
            "do" => Token::Do,
            "for" => Token::For,
            "to" => Token::To,
            "repeat" => Token::Repeat,
            "until" => Token::Until,
            "array" => Token::Array,
            "of" => Token::Of,
            "div" => Token::Div,
            "mod" => Token::Mod,
            "and" => Token::And,
            "or" => Token::Or,
            "true" => Token::True,
            "false" => Token::False,
            _ => return None,
        };
        Some(token)
    }
}

impl PartialEq for Token {
    fn eq(&self, other: &Self) -> bool {
        // Compare variants only, ignoring any carried value
        mem::discriminant(self) == mem::discriminant(other)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Token::Ident(name) => return write!(f, "identifier '{}'", name),
            Token::Number(n) => return write!(f, "number {}", n),
            Token::CharLiteral(c) => return write!(f, "character '{}'", c),
            Token::StringLiteral(s) => return write!(f, "string '{}'", s),
            Token::Program => "'program'",
            Token::Var => "'var'",
            Token::Procedure => "'procedure'",
            Token::Function => "'function'",
            Token::Begin => "'begin'",
            Token::End => "'end'",
            Token::If => "'if'",
            Token::Then => "'then'",
            Token::Else => "'else'",
            Token::While => "'while'",
            Token::Do => "'do'",
            Token::For => "'for'",
            Token::To => "'to'",
            Token::Repeat => "'repeat'",
            Token::Until => "'until'",
            Token::Array => "'array'",
            Token::Of => "'of'",
            Token::Div => "'div'",
            Token::Mod => "'mod'",
            Token::And => "'and'",
            Token::Or => "'or'",
            Token::True => "'true'",
            Token::False => "'false'",
            Token::Assign => "':='",
            Token::Colon => "':'",
            Token::Semicolon => "';'",
            Token::Comma => "','",
            Token::Dot => "'.'",
            Token::DotDot => "'..'",
            Token::LParen => "'('",
            Token::RParen => "')'",
            Token::LBrack => "'['",
            Token::RBrack => "']'",
            Token::Plus => "'+'",
            Token::Minus => "'-'",
            Token::Multiply => "'*'",
            Token::Divide => "'/'",
            Token::Equal => "'='",
            Token::NotEqual => "'<>'",
            Token::LessThan => "'<'",
            Token::LessThanEqual => "'<='",
            Token::GreaterThan => "'>'",
            Token::GreaterThanEqual => "'>='",
            Token::Eof => "end of input",
        };
        f.write_str(text)
    }
}
