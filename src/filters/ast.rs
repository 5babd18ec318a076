use std::collections::HashMap;
use std::fmt;

/// A single argument value as written in a filter expression
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    Text(String),
    Int(i64),
    /// `>N`, only meaningful for card counts
    MoreThan(u32),
}

impl Value {
    /// Returns the value as it should be compared against names in the database
    pub fn as_text(&self) -> String {
        match self {
            Value::Text(text) => text.clone(),
            Value::Int(value) => value.to_string(),
            Value::MoreThan(bound) => format!(">{}", bound),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(text) => {
                f.write_str("\"")?;
                for c in text.chars() {
                    if c == '"' || c == '\\' {
                        f.write_str("\\")?;
                    }
                    write!(f, "{}", c)?;
                }
                f.write_str("\"")
            }
            Value::Int(value) => write!(f, "{}", value),
            Value::MoreThan(bound) => write!(f, ">{}", bound),
        }
    }
}

/// One element of an argument list: `value` or `value with value`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArgItem {
    pub value: Value,
    pub with: Option<Value>,
}

impl ArgItem {
    pub fn single(value: Value) -> Self {
        Self { value, with: None }
    }
}

impl fmt::Display for ArgItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.with {
            Some(with) => write!(f, "{} with {}", self.value, with),
            None => write!(f, "{}", self.value),
        }
    }
}

/// The arguments of a filter term
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TermArgs {
    /// A keyword written on its own, e.g. `SetsInUse`
    None,
    /// A `$name` placeholder to be bound before use
    Variable(String),
    /// An item list, optionally followed by `from` and a second list
    Values { items: Vec<ArgItem>, from: Vec<Value> },
}

/// A filter keyword with its arguments
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Term {
    pub keyword: String,
    pub args: TermArgs,
}

impl fmt::Display for Term {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.args {
            TermArgs::None => write!(f, "{}", self.keyword),
            TermArgs::Variable(name) => write!(f, "{} in ${}", self.keyword, name),
            TermArgs::Values { items, from } => {
                write!(f, "{} in ", self.keyword)?;
                write_list(f, items)?;
                if !from.is_empty() {
                    f.write_str(" from ")?;
                    write_list(f, from)?;
                }
                Ok(())
            }
        }
    }
}

fn write_list<T: fmt::Display>(f: &mut fmt::Formatter<'_>, values: &[T]) -> fmt::Result {
    for (index, value) in values.iter().enumerate() {
        if index > 0 {
            f.write_str(", ")?;
        }
        write!(f, "{}", value)?;
    }
    Ok(())
}

/// Parse tree of a filter expression
///
/// Combinators are kept flat: an `And` never directly contains another
/// `And`, an `Or` never another `Or`, and neither holds `Null` or fewer than
/// two children. Build combined trees with [`FilterAst::all_of`],
/// [`FilterAst::any_of`], [`FilterAst::and`] and [`FilterAst::or`] to keep
/// that shape, which is what makes `to_string` and `parse` inverse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterAst {
    /// The empty filter, matching everything
    Null,
    And(Vec<FilterAst>),
    Or(Vec<FilterAst>),
    Not(Box<FilterAst>),
    Term(Term),
}

impl FilterAst {
    pub fn term(keyword: &str, args: TermArgs) -> Self {
        FilterAst::Term(Term { keyword: keyword.to_string(), args })
    }

    /// Conjunction of the given filters, flattening nested conjunctions
    pub fn all_of(parts: Vec<FilterAst>) -> Self {
        let mut flat = Vec::new();
        for part in parts {
            match part {
                FilterAst::Null => {}
                FilterAst::And(children) => flat.extend(children),
                other => flat.push(other),
            }
        }
        match flat.len() {
            0 => FilterAst::Null,
            1 => flat.remove(0),
            _ => FilterAst::And(flat),
        }
    }

    /// Disjunction of the given filters, flattening nested disjunctions
    ///
    /// A `Null` operand matches everything, so it absorbs the disjunction.
    pub fn any_of(parts: Vec<FilterAst>) -> Self {
        let mut flat = Vec::new();
        for part in parts {
            match part {
                FilterAst::Null => return FilterAst::Null,
                FilterAst::Or(children) => flat.extend(children),
                other => flat.push(other),
            }
        }
        match flat.len() {
            0 => FilterAst::Null,
            1 => flat.remove(0),
            _ => FilterAst::Or(flat),
        }
    }

    pub fn and(self, other: FilterAst) -> Self {
        FilterAst::all_of(vec![self, other])
    }

    pub fn or(self, other: FilterAst) -> Self {
        FilterAst::any_of(vec![self, other])
    }

    pub fn negate(self) -> Self {
        FilterAst::Not(Box::new(self))
    }

    pub fn is_null(&self) -> bool {
        matches!(self, FilterAst::Null)
    }

    /// Names of the unbound variables, in order of first appearance
    pub fn variables(&self) -> Vec<String> {
        let mut names = Vec::new();
        self.collect_variables(&mut names);
        names
    }

    fn collect_variables(&self, names: &mut Vec<String>) {
        match self {
            FilterAst::Null => {}
            FilterAst::And(children) | FilterAst::Or(children) => {
                for child in children {
                    child.collect_variables(names);
                }
            }
            FilterAst::Not(inner) => inner.collect_variables(names),
            FilterAst::Term(term) => {
                if let TermArgs::Variable(name) = &term.args {
                    if !names.contains(name) {
                        names.push(name.clone());
                    }
                }
            }
        }
    }

    /// Substitutes variables with value lists
    ///
    /// A bound value of the form `A with B` becomes a paired item, every
    /// other value is bound as text. Variables without a binding are left
    /// untouched so the caller can report them.
    pub fn bind(&self, values: &HashMap<String, Vec<String>>) -> FilterAst {
        match self {
            FilterAst::Null => FilterAst::Null,
            FilterAst::And(children) => {
                FilterAst::And(children.iter().map(|child| child.bind(values)).collect())
            }
            FilterAst::Or(children) => {
                FilterAst::Or(children.iter().map(|child| child.bind(values)).collect())
            }
            FilterAst::Not(inner) => FilterAst::Not(Box::new(inner.bind(values))),
            FilterAst::Term(term) => match &term.args {
                TermArgs::Variable(name) => match values.get(name) {
                    Some(bound) => FilterAst::Term(Term {
                        keyword: term.keyword.clone(),
                        args: TermArgs::Values {
                            items: bound.iter().map(|value| bound_item(value)).collect(),
                            from: Vec::new(),
                        },
                    }),
                    None => FilterAst::Term(term.clone()),
                },
                _ => FilterAst::Term(term.clone()),
            },
        }
    }

    fn fmt_operand(&self, f: &mut fmt::Formatter<'_>, parenthesise_compound: bool) -> fmt::Result {
        let needs_parens = match self {
            FilterAst::Null => true,
            FilterAst::And(_) | FilterAst::Or(_) => parenthesise_compound,
            _ => false,
        };
        if needs_parens {
            write!(f, "({})", self)
        } else {
            write!(f, "{}", self)
        }
    }
}

fn bound_item(value: &str) -> ArgItem {
    // ASCII lowercasing keeps byte offsets aligned with `value`
    let lower = value.to_ascii_lowercase();
    match lower.find(" with ") {
        Some(index) => ArgItem {
            value: Value::Text(value[..index].trim().to_string()),
            with: Some(Value::Text(value[index + " with ".len()..].trim().to_string())),
        },
        _ => ArgItem::single(Value::Text(value.to_string())),
    }
}

impl fmt::Display for FilterAst {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterAst::Null => Ok(()),
            FilterAst::And(children) => {
                for (index, child) in children.iter().enumerate() {
                    if index > 0 {
                        f.write_str(" AND ")?;
                    }
                    child.fmt_operand(f, matches!(child, FilterAst::Or(_)))?;
                }
                Ok(())
            }
            FilterAst::Or(children) => {
                for (index, child) in children.iter().enumerate() {
                    if index > 0 {
                        f.write_str(" OR ")?;
                    }
                    child.fmt_operand(f, matches!(child, FilterAst::Or(_)))?;
                }
                Ok(())
            }
            FilterAst::Not(inner) => {
                f.write_str("NOT ")?;
                inner.fmt_operand(f, true)
            }
            FilterAst::Term(term) => write!(f, "{}", term),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clan(name: &str) -> FilterAst {
        FilterAst::term(
            "Clan",
            TermArgs::Values {
                items: vec![ArgItem::single(Value::Text(name.to_string()))],
                from: vec![],
            },
        )
    }

    #[test]
    fn test_all_of_flattens_and_drops_null() {
        let ast = FilterAst::all_of(vec![
            clan("Ventrue"),
            FilterAst::Null,
            clan("Tremere").and(clan("Brujah")),
        ]);
        assert_eq!(ast, FilterAst::And(vec![clan("Ventrue"), clan("Tremere"), clan("Brujah")]));
    }

    #[test]
    fn test_single_operand_is_unwrapped() {
        assert_eq!(FilterAst::Null.and(clan("Ventrue")), clan("Ventrue"));
        assert_eq!(FilterAst::all_of(vec![]), FilterAst::Null);
    }

    #[test]
    fn test_null_absorbs_disjunction() {
        assert_eq!(clan("Ventrue").or(FilterAst::Null), FilterAst::Null);
    }

    #[test]
    fn test_display_parenthesises_or_inside_and() {
        let ast = clan("Ventrue").or(clan("Tremere")).and(clan("Brujah").negate());
        assert_eq!(
            ast.to_string(),
            "(Clan in \"Ventrue\" OR Clan in \"Tremere\") AND NOT Clan in \"Brujah\""
        );
    }

    #[test]
    fn test_display_parenthesises_compound_not() {
        let ast = clan("Ventrue").and(clan("Tremere")).negate();
        assert_eq!(ast.to_string(), "NOT (Clan in \"Ventrue\" AND Clan in \"Tremere\")");
    }

    #[test]
    fn test_display_with_and_from() {
        let ast = FilterAst::term(
            "CardCount",
            TermArgs::Values {
                items: vec![ArgItem::single(Value::Int(2)), ArgItem::single(Value::MoreThan(3))],
                from: vec![Value::Text("My \"Deck\"".to_string())],
            },
        );
        assert_eq!(ast.to_string(), "CardCount in 2, >3 from \"My \\\"Deck\\\"\"");

        let pair = FilterAst::term(
            "Discipline_with_Level",
            TermArgs::Values {
                items: vec![ArgItem {
                    value: Value::Text("Auspex".to_string()),
                    with: Some(Value::Text("superior".to_string())),
                }],
                from: vec![],
            },
        );
        assert_eq!(pair.to_string(), "Discipline_with_Level in \"Auspex\" with \"superior\"");
    }

    #[test]
    fn test_variables_in_order_without_duplicates() {
        let ast = FilterAst::all_of(vec![
            FilterAst::term("Clan", TermArgs::Variable("clans".to_string())),
            FilterAst::term("Sect", TermArgs::Variable("sect".to_string())).negate(),
            FilterAst::term("Title", TermArgs::Variable("clans".to_string())),
        ]);
        assert_eq!(ast.variables(), vec!["clans".to_string(), "sect".to_string()]);
    }

    #[test]
    fn test_bind_replaces_known_variables_only() {
        let ast = FilterAst::term("Clan", TermArgs::Variable("clans".to_string()))
            .and(FilterAst::term("Discipline_with_Level", TermArgs::Variable("disc".to_string())))
            .and(FilterAst::term("Sect", TermArgs::Variable("sect".to_string())));

        let mut values = HashMap::new();
        values.insert("clans".to_string(), vec!["Ventrue".to_string(), "Tremere".to_string()]);
        values.insert("disc".to_string(), vec!["Auspex With superior".to_string()]);

        let bound = ast.bind(&values);
        assert_eq!(bound.variables(), vec!["sect".to_string()]);
        assert_eq!(
            bound.to_string(),
            "Clan in \"Ventrue\", \"Tremere\" AND Discipline_with_Level in \"Auspex\" with \"superior\" AND Sect in $sect"
        );
    }
}
