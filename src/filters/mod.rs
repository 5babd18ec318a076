/// Card filter language
///
/// Filters select abstract cards, physical cards or card sets. They are
/// written as small expressions such as
///
/// ```text
/// Clan in "Ventrue", "Tremere" AND NOT Discipline_with_Level in "Dominate" with "superior"
/// ```
///
/// and go through four stages:
///
/// - `lexer` and `parser` turn text into a [`FilterAst`], which keeps what was
///   written (including `$variables`) and prints back to canonical syntax.
/// - `keywords` is the registry of filter keywords, their argument shapes and
///   the targets they apply to.
/// - `filter` validates an AST into a typed [`Filter`].
/// - `sql` compiles a [`Filter`] for a target into a SQL predicate with bind
///   values; repository code runs it.

mod ast;
mod filter;
mod keywords;
mod lexer;
mod parser;
mod sql;

pub use ast::{ArgItem, FilterAst, Term, TermArgs, Value};
pub use filter::{CountSpec, Filter, NO_EXPANSION};
pub use keywords::{
    lookup_keyword, ArgShape, CardSetField, KeywordKind, KeywordSpec, NumericField, KEYWORDS,
};
pub use parser::parse;
pub use sql::{SqlFragment, SqlValue};

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// What a compiled filter selects rows of
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterTarget {
    AbstractCard,
    PhysicalCard,
    CardSet,
}

impl FilterTarget {
    pub const ALL: [FilterTarget; 3] =
        [FilterTarget::AbstractCard, FilterTarget::PhysicalCard, FilterTarget::CardSet];
}

impl fmt::Display for FilterTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FilterTarget::AbstractCard => "abstract cards",
            FilterTarget::PhysicalCard => "physical cards",
            FilterTarget::CardSet => "card sets",
        };
        f.write_str(name)
    }
}

/// Errors raised while parsing, validating or compiling a filter
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FilterError {
    #[error("Invalid filter at offset {offset}: {message}")]
    Lex { offset: usize, message: String },
    #[error("Syntax error at offset {offset}: {message}")]
    Syntax { offset: usize, message: String },
    #[error("Unknown filter keyword '{0}'")]
    UnknownKeyword(String),
    #[error("Invalid arguments for {keyword}: {reason}")]
    InvalidArguments { keyword: &'static str, reason: String },
    #[error("Invalid value '{value}' for {keyword}")]
    InvalidValue { keyword: &'static str, value: String },
    #[error("Variable ${0} has no value")]
    UnboundVariable(String),
    #[error("{keyword} cannot be applied to {target}")]
    UnsupportedTarget { keyword: &'static str, target: FilterTarget },
}

/// Parses an expression and validates it into a typed filter in one step
pub fn parse_filter(input: &str) -> Result<Filter, FilterError> {
    Filter::from_ast(&parse(input)?)
}
