use crate::frontend::token::Token;
use crate::position::Position;
use crate::semantic::types::Type;
use crate::utils::errors::ParseError;
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref WHITESPACE: Regex = Regex::new(r"^\s+").expect("whitespace pattern");
    static ref IDENTIFIER: Regex =
        Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*").expect("identifier pattern");
    static ref NUMBER: Regex = Regex::new(r"^[0-9]+").expect("number pattern");
    static ref QUOTED: Regex =
        Regex::new(r"^'((?:[^'\\\n]|\\.)*)'").expect("quoted literal pattern");
}

// Longest spellings first so that ":=" wins over ":"
const SYMBOLS: [(&str, Token); 20] = [
    (":=", Token::Assign),
    ("..", Token::DotDot),
    ("<>", Token::NotEqual),
    ("<=", Token::LessThanEqual),
    (">=", Token::GreaterThanEqual),
    (":", Token::Colon),
    (";", Token::Semicolon),
    (",", Token::Comma),
    (".", Token::Dot),
    ("(", Token::LParen),
    (")", Token::RParen),
    ("[", Token::LBrack),
    ("]", Token::RBrack),
    ("+", Token::Plus),
    ("-", Token::Minus),
    ("*", Token::Multiply),
    ("/", Token::Divide),
    ("=", Token::Equal),
    ("<", Token::LessThan),
    (">", Token::GreaterThan),
];

// (opening, closing) delimiters of the block comment styles
const BLOCK_COMMENTS: [(&str, &str); 3] = [("/*", "*/"), ("(*", "*)"), ("{", "}")];

/// Pull-based scanner. The parser asks for one token at a time.
pub struct Lexer<'a> {
    source: &'a str,
    offset: usize,
    line: usize,
    column: usize,
}

impl<'a> Lexer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            source,
            offset: 0,
            line: 1,
            column: 1,
        }
    }

    pub fn position(&self) -> Position {
        Position::new(self.line, self.column)
    }

    /// Scan the next token, skipping whitespace and comments before it.
    /// Returns `Token::Eof` once the input is exhausted, and keeps doing so.
    pub fn next_token(&mut self) -> Result<(Token, Position), ParseError> {
        self.skip_whitespace_and_comments()?;
        let position = self.position();
        let rest = self.rest();
        let Some(ch) = rest.chars().next() else {
            return Ok((Token::Eof, position));
        };

        let token = if ch.is_ascii_alphabetic() || ch == '_' {
            self.scan_word()
        } else if ch.is_ascii_digit() {
            self.scan_number(position)?
        } else if ch == '\'' {
            self.scan_quoted(position)?
        } else {
            self.scan_symbol(ch, position)?
        };
        Ok((token, position))
    }

    fn rest(&self) -> &'a str {
        &self.source[self.offset..]
    }

    fn advance(&mut self, len: usize) {
        let consumed = &self.source[self.offset..self.offset + len];
        for ch in consumed.chars() {
            if ch == '\n' {
                self.line += 1;
                self.column = 1;
            } else {
                self.column += 1;
            }
        }
        self.offset += len;
    }

    fn skip_whitespace_and_comments(&mut self) -> Result<(), ParseError> {
        loop {
            let rest = self.rest();
            if let Some(m) = WHITESPACE.find(rest) {
                self.advance(m.end());
            } else if rest.starts_with("//") {
                let len = rest.find('\n').unwrap_or(rest.len());
                self.advance(len);
            } else if let Some((open, close)) = BLOCK_COMMENTS
                .iter()
                .find(|(open, _)| rest.starts_with(open))
            {
                self.scan_comment(open, close)?;
            } else {
                return Ok(());
            }
        }
    }

    fn scan_comment(&mut self, open: &str, close: &str) -> Result<(), ParseError> {
        let start = self.position();
        let body = &self.rest()[open.len()..];
        match body.find(close) {
            Some(end) => {
                self.advance(open.len() + end + close.len());
                Ok(())
            }
            None => Err(ParseError::new(
                format!("unterminated comment opened with '{}'", open),
                start,
            )),
        }
    }

    fn scan_word(&mut self) -> Token {
        let rest = self.rest();
        let len = IDENTIFIER.find(rest).map_or(1, |m| m.end());
        let word = &rest[..len];
        self.advance(len);

        let lowered = word.to_ascii_lowercase();
        if let Some(keyword) = Token::keyword(&lowered) {
            return keyword;
        }
        // Built-in type names are case-insensitive, everything else is not
        if Type::from_name(&lowered).is_some() {
            return Token::Ident(lowered);
        }
        Token::Ident(word.to_string())
    }

    fn scan_number(&mut self, position: Position) -> Result<Token, ParseError> {
        let rest = self.rest();
        let len = NUMBER.find(rest).map_or(0, |m| m.end());
        let digits = &rest[..len];
        let value = digits.parse::<i32>().map_err(|_| {
            ParseError::new(
                format!("integer literal {} does not fit in 32 bits", digits),
                position,
            )
        })?;
        self.advance(len);
        Ok(Token::Number(value))
    }

    fn scan_quoted(&mut self, position: Position) -> Result<Token, ParseError> {
        let rest = self.rest();
        let Some(caps) = QUOTED.captures(rest) else {
            return Err(ParseError::new("unterminated string literal", position));
        };
        let len = caps.get(0).map_or(0, |m| m.end());
        let body = caps.get(1).map_or("", |m| m.as_str());
        let text = unescape(body);
        self.advance(len);

        let mut chars = text.chars();
        match (chars.next(), chars.next()) {
            (Some(c), None) => Ok(Token::CharLiteral(c)),
            _ => Ok(Token::StringLiteral(text)),
        }
    }

    fn scan_symbol(&mut self, ch: char, position: Position) -> Result<Token, ParseError> {
        let rest = self.rest();
        for (spelling, token) in SYMBOLS.iter() {
            if rest.starts_with(spelling) {
                self.advance(spelling.len());
                return Ok(token.clone());
            }
        }
        Err(ParseError::new(
            format!("unexpected character '{}'", ch),
            position,
        ))
    }
}

fn unescape(body: &str) -> String {
    let mut text = String::with_capacity(body.len());
    let mut chars = body.chars();
    while let Some(ch) = chars.next() {
        if ch != '\\' {
            text.push(ch);
            continue;
        }
        match chars.next() {
            Some('n') => text.push('\n'),
            Some('t') => text.push('\t'),
            Some('r') => text.push('\r'),
            Some('0') => text.push('\0'),
            Some(other) => text.push(other),
            None => text.push('\\'),
        }
    }
    text
}

/// Drain a scanner over `source` into a token list, ending with `Eof`.
pub fn scan(source: &str) -> Result<Vec<(Token, Position)>, ParseError> {
    let mut lexer = Lexer::new(source);
    let mut tokens = Vec::new();
    loop {
        let (token, position) = lexer.next_token()?;
        let done = token == Token::Eof;
        tokens.push((token, position));
        if done {
            return Ok(tokens);
        }
    }
}
