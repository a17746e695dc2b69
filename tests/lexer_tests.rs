use pascil::frontend::{scan, Lexer, Token};
use pascil::position::Position;
use pascil::utils::errors::ParseError;

fn tokens(source: &str) -> Result<Vec<Token>, ParseError> {
    Ok(scan(source)?.into_iter().map(|(token, _)| token).collect())
}

#[test]
fn test_keywords_ignore_case() -> Result<(), ParseError> {
    let toks = tokens("PROGRAM Begin eNd While DO div MOD")?;
    assert!(matches!(
        toks.as_slice(),
        [
            Token::Program,
            Token::Begin,
            Token::End,
            Token::While,
            Token::Do,
            Token::Div,
            Token::Mod,
            Token::Eof
        ]
    ));
    Ok(())
}

#[test]
fn test_identifiers_keep_case_but_type_names_do_not() -> Result<(), ParseError> {
    let toks = tokens("Foo foo INTEGER Boolean")?;
    let names: Vec<&str> = toks
        .iter()
        .filter_map(|token| match token {
            Token::Ident(name) => Some(name.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(names, vec!["Foo", "foo", "integer", "boolean"]);
    Ok(())
}

#[test]
fn test_longest_symbol_wins() -> Result<(), ParseError> {
    let toks = tokens(":= : .. . <> <= < >= > =")?;
    assert!(matches!(
        toks.as_slice(),
        [
            Token::Assign,
            Token::Colon,
            Token::DotDot,
            Token::Dot,
            Token::NotEqual,
            Token::LessThanEqual,
            Token::LessThan,
            Token::GreaterThanEqual,
            Token::GreaterThan,
            Token::Equal,
            Token::Eof
        ]
    ));
    Ok(())
}

#[test]
fn test_array_range_is_not_a_real_number() -> Result<(), ParseError> {
    let toks = tokens("[1..10]")?;
    assert!(matches!(
        toks.as_slice(),
        [
            Token::LBrack,
            Token::Number(1),
            Token::DotDot,
            Token::Number(10),
            Token::RBrack,
            Token::Eof
        ]
    ));
    Ok(())
}

#[test]
fn test_comments_are_skipped() -> Result<(), ParseError> {
    let source = "// line\nx { brace } (* paren *) /* slash\n star */ y";
    let toks = tokens(source)?;
    assert_eq!(toks.len(), 3);
    assert!(matches!(&toks[0], Token::Ident(name) if name == "x"));
    assert!(matches!(&toks[1], Token::Ident(name) if name == "y"));
    Ok(())
}

#[test]
fn test_positions_are_one_based() -> Result<(), ParseError> {
    let scanned = scan("begin\n  x := 1\nend")?;
    let positions: Vec<Position> = scanned.iter().map(|(_, position)| *position).collect();
    assert_eq!(positions[0], Position::new(1, 1));
    assert_eq!(positions[1], Position::new(2, 3));
    assert_eq!(positions[2], Position::new(2, 5));
    assert_eq!(positions[3], Position::new(2, 8));
    assert_eq!(positions[4], Position::new(3, 1));
    Ok(())
}

#[test]
fn test_quoted_literals() -> Result<(), ParseError> {
    let toks = tokens(r"'a' 'hello' '' 'it\'s' '\n'")?;
    assert!(matches!(toks[0], Token::CharLiteral('a')));
    assert!(matches!(&toks[1], Token::StringLiteral(s) if s == "hello"));
    assert!(matches!(&toks[2], Token::StringLiteral(s) if s.is_empty()));
    assert!(matches!(&toks[3], Token::StringLiteral(s) if s == "it's"));
    assert!(matches!(toks[4], Token::CharLiteral('\n')));
    Ok(())
}

#[test]
fn test_pull_scanner_keeps_returning_eof() -> Result<(), ParseError> {
    let mut lexer = Lexer::new("x");
    assert!(matches!(lexer.next_token()?.0, Token::Ident(_)));
    assert_eq!(lexer.next_token()?.0, Token::Eof);
    assert_eq!(lexer.next_token()?.0, Token::Eof);
    Ok(())
}

#[test]
fn test_unterminated_comment() {
    let err = scan("x { never closed").unwrap_err();
    assert!(err.message.contains("unterminated comment"));
    assert_eq!(err.position, Position::new(1, 3));
}

#[test]
fn test_unterminated_string() {
    let err = scan("x := 'abc").unwrap_err();
    assert!(err.message.contains("unterminated string"));
    assert_eq!(err.position, Position::new(1, 6));
}

#[test]
fn test_unexpected_character() {
    let err = scan("x # y").unwrap_err();
    assert!(err.message.contains("'#'"));
    assert_eq!(err.position, Position::new(1, 3));
}

#[test]
fn test_integer_must_fit_32_bits() {
    assert!(tokens("2147483647").is_ok());
    let err = scan("2147483648").unwrap_err();
    assert!(err.message.contains("32 bits"));
}
