use super::FilterError;

/// The kinds of token produced by the filter lexer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    /// A bare word: a filter keyword or an unquoted value
    Word(String),
    /// A quoted string with escapes already resolved
    Str(String),
    /// An unsigned integer literal
    Int(i64),
    /// A `>N` count specification
    MoreThan(u32),
    /// A `$name` placeholder
    Variable(String),
    Comma,
    LParen,
    RParen,
    /// `in` or `=`, the two spellings are interchangeable
    In,
    And,
    Or,
    Not,
    With,
    From,
}

/// A token together with the byte offset it starts at
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub offset: usize,
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '-' || c == '.'
}

fn reserved(word: &str) -> Option<TokenKind> {
    match word.to_ascii_lowercase().as_str() {
        "and" => Some(TokenKind::And),
        "or" => Some(TokenKind::Or),
        "not" => Some(TokenKind::Not),
        "in" => Some(TokenKind::In),
        "with" => Some(TokenKind::With),
        "from" => Some(TokenKind::From),
        _ => None,
    }
}

/// Splits a filter expression into tokens
///
/// ### Errors
///
/// Returns `FilterError::Lex` for unterminated strings, a `$` or `>` with
/// nothing usable after it, and characters outside the filter alphabet.
pub fn tokenize(input: &str) -> Result<Vec<Token>, FilterError> {
    let mut tokens = Vec::new();
    let mut chars = input.char_indices().peekable();

    while let Some(&(offset, c)) = chars.peek() {
        if c.is_whitespace() {
            chars.next();
            continue;
        }

        let kind = match c {
            ',' => {
                chars.next();
                TokenKind::Comma
            }
            '(' => {
                chars.next();
                TokenKind::LParen
            }
            ')' => {
                chars.next();
                TokenKind::RParen
            }
            '=' => {
                chars.next();
                TokenKind::In
            }
            '"' | '\'' => {
                let quote = c;
                chars.next();
                let mut value = String::new();
                let mut closed = false;
                while let Some((_, c)) = chars.next() {
                    match c {
                        '\\' => match chars.next() {
                            Some((_, escaped)) => value.push(escaped),
                            None => break,
                        },
                        c if c == quote => {
                            closed = true;
                            break;
                        }
                        c => value.push(c),
                    }
                }
                if !closed {
                    return Err(FilterError::Lex {
                        offset,
                        message: "unterminated string".to_string(),
                    });
                }
                TokenKind::Str(value)
            }
            '$' => {
                chars.next();
                let mut name = String::new();
                while let Some(&(_, c)) = chars.peek() {
                    if !is_word_char(c) {
                        break;
                    }
                    name.push(c);
                    chars.next();
                }
                if name.is_empty() {
                    return Err(FilterError::Lex {
                        offset,
                        message: "expected a variable name after '$'".to_string(),
                    });
                }
                TokenKind::Variable(name)
            }
            '>' => {
                chars.next();
                let mut digits = String::new();
                while let Some(&(_, c)) = chars.peek() {
                    if !c.is_ascii_digit() {
                        break;
                    }
                    digits.push(c);
                    chars.next();
                }
                let bound = digits.parse::<u32>().map_err(|_| FilterError::Lex {
                    offset,
                    message: "expected a number after '>'".to_string(),
                })?;
                TokenKind::MoreThan(bound)
            }
            c if is_word_char(c) => {
                let mut word = String::new();
                while let Some(&(_, c)) = chars.peek() {
                    // an apostrophe only opens a string at the start of a token
                    if !is_word_char(c) && c != '\'' {
                        break;
                    }
                    word.push(c);
                    chars.next();
                }
                if word.chars().all(|c| c.is_ascii_digit()) {
                    match word.parse::<i64>() {
                        Ok(value) => TokenKind::Int(value),
                        Err(_) => TokenKind::Word(word),
                    }
                } else {
                    reserved(&word).unwrap_or(TokenKind::Word(word))
                }
            }
            other => {
                return Err(FilterError::Lex {
                    offset,
                    message: format!("unexpected character '{}'", other),
                });
            }
        };

        tokens.push(Token { kind, offset });
    }

    Ok(tokens)
}
