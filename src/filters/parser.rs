use super::ast::{ArgItem, FilterAst, Term, TermArgs, Value};
use super::lexer::{tokenize, Token, TokenKind};
use super::FilterError;

/// Deepest nesting of `NOT` and parentheses an expression may use
const MAX_NESTING: usize = 256;

/// Parses a filter expression into its syntax tree
///
/// An empty or all-whitespace expression is the null filter. `NOT` binds
/// tighter than `AND`, which binds tighter than `OR`.
///
/// ### Errors
///
/// Returns `FilterError::Lex` or `FilterError::Syntax` with the byte offset
/// of the offending input.
pub fn parse(input: &str) -> Result<FilterAst, FilterError> {
    let tokens = tokenize(input)?;
    let mut parser = Parser { tokens, position: 0, end: input.len(), depth: 0 };
    if parser.tokens.is_empty() {
        return Ok(FilterAst::Null);
    }
    let ast = parser.parse_or()?;
    match parser.peek() {
        None => Ok(ast),
        Some(token) => Err(FilterError::Syntax {
            offset: token.offset,
            message: format!("unexpected {}", describe(&token.kind)),
        }),
    }
}

struct Parser {
    tokens: Vec<Token>,
    position: usize,
    /// Offset reported for errors at end of input
    end: usize,
    /// Open `NOT`s and parentheses around the current position
    depth: usize,
}

fn describe(kind: &TokenKind) -> String {
    match kind {
        TokenKind::Word(word) => format!("'{}'", word),
        TokenKind::Str(text) => format!("string \"{}\"", text),
        TokenKind::Int(value) => format!("number {}", value),
        TokenKind::MoreThan(bound) => format!("'>{}'", bound),
        TokenKind::Variable(name) => format!("variable ${}", name),
        TokenKind::Comma => "','".to_string(),
        TokenKind::LParen => "'('".to_string(),
        TokenKind::RParen => "')'".to_string(),
        TokenKind::In => "'in'".to_string(),
        TokenKind::And => "AND".to_string(),
        TokenKind::Or => "OR".to_string(),
        TokenKind::Not => "NOT".to_string(),
        TokenKind::With => "'with'".to_string(),
        TokenKind::From => "'from'".to_string(),
    }
}

impl Parser {
    fn peek(&self) -> Option<&Token> {
        self.tokens.get(self.position)
    }

    fn peek_kind(&self) -> Option<&TokenKind> {
        self.peek().map(|token| &token.kind)
    }

    fn advance(&mut self) -> Option<Token> {
        let token = self.tokens.get(self.position).cloned();
        if token.is_some() {
            self.position += 1;
        }
        token
    }

    fn eat(&mut self, kind: &TokenKind) -> bool {
        if self.peek_kind() == Some(kind) {
            self.position += 1;
            true
        } else {
            false
        }
    }

    fn error_here(&self, expected: &str) -> FilterError {
        match self.peek() {
            Some(token) => FilterError::Syntax {
                offset: token.offset,
                message: format!("expected {}, found {}", expected, describe(&token.kind)),
            },
            None => FilterError::Syntax {
                offset: self.end,
                message: format!("expected {}, found end of input", expected),
            },
        }
    }

    /// Runs `parse` one nesting level deeper, failing past `MAX_NESTING`
    fn nested<T>(&mut self, parse: impl FnOnce(&mut Self) -> Result<T, FilterError>) -> Result<T, FilterError> {
        if self.depth >= MAX_NESTING {
            return Err(FilterError::Syntax {
                offset: self.peek().map_or(self.end, |token| token.offset),
                message: format!("expression nested more than {} levels deep", MAX_NESTING),
            });
        }
        self.depth += 1;
        let result = parse(self);
        self.depth -= 1;
        result
    }

    fn parse_or(&mut self) -> Result<FilterAst, FilterError> {
        let mut parts = vec![self.parse_and()?];
        while self.eat(&TokenKind::Or) {
            parts.push(self.parse_and()?);
        }
        Ok(FilterAst::any_of(parts))
    }

    fn parse_and(&mut self) -> Result<FilterAst, FilterError> {
        let mut parts = vec![self.parse_unary()?];
        while self.eat(&TokenKind::And) {
            parts.push(self.parse_unary()?);
        }
        Ok(FilterAst::all_of(parts))
    }

    fn parse_unary(&mut self) -> Result<FilterAst, FilterError> {
        match self.peek_kind() {
            Some(TokenKind::Not) => self.nested(|parser| {
                parser.advance();
                Ok(parser.parse_unary()?.negate())
            }),
            Some(TokenKind::LParen) => self.nested(|parser| {
                parser.advance();
                if parser.eat(&TokenKind::RParen) {
                    return Ok(FilterAst::Null);
                }
                let inner = parser.parse_or()?;
                if !parser.eat(&TokenKind::RParen) {
                    return Err(parser.error_here("')'"));
                }
                Ok(inner)
            }),
            Some(TokenKind::Word(_)) => self.parse_term(),
            _ => Err(self.error_here("a filter keyword, NOT or '('")),
        }
    }

    fn parse_term(&mut self) -> Result<FilterAst, FilterError> {
        let keyword = match self.advance() {
            Some(Token { kind: TokenKind::Word(word), .. }) => word,
            _ => return Err(self.error_here("a filter keyword")),
        };

        if !self.eat(&TokenKind::In) {
            return Ok(FilterAst::Term(Term { keyword, args: TermArgs::None }));
        }

        if let Some(TokenKind::Variable(name)) = self.peek_kind() {
            let name = name.clone();
            self.advance();
            return Ok(FilterAst::Term(Term { keyword, args: TermArgs::Variable(name) }));
        }

        let mut items = vec![self.parse_item()?];
        while self.eat(&TokenKind::Comma) {
            items.push(self.parse_item()?);
        }

        let mut from = Vec::new();
        if self.eat(&TokenKind::From) {
            from.push(self.parse_value()?);
            while self.eat(&TokenKind::Comma) {
                from.push(self.parse_value()?);
            }
        }

        Ok(FilterAst::Term(Term { keyword, args: TermArgs::Values { items, from } }))
    }

    fn parse_item(&mut self) -> Result<ArgItem, FilterError> {
        let value = self.parse_value()?;
        let with = if self.eat(&TokenKind::With) { Some(self.parse_value()?) } else { None };
        Ok(ArgItem { value, with })
    }

    fn parse_value(&mut self) -> Result<Value, FilterError> {
        let value = match self.peek_kind() {
            Some(TokenKind::Str(text)) | Some(TokenKind::Word(text)) => Value::Text(text.clone()),
            Some(TokenKind::Int(value)) => Value::Int(*value),
            Some(TokenKind::MoreThan(bound)) => Value::MoreThan(*bound),
            _ => return Err(self.error_here("a value")),
        };
        self.advance();
        Ok(value)
    }
}
