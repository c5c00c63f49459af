// Compiled representation of URI templates

use regex::Regex;
use std::collections::HashSet;

use super::matcher;
use super::types::VariableType;
use crate::error::FuriError;

/// Expression operators, following the RFC 6570 expansion table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    /// `{var}`
    Simple,
    /// `{+var}`
    Reserved,
    /// `{#var}`
    Fragment,
    /// `{.var}`
    Label,
    /// `{/var}`
    Path,
    /// `{;var}`
    PathParameter,
    /// `{?var}`
    Query,
    /// `{&var}`
    QueryContinuation,
}

impl Operator {
    pub fn from_char(ch: char) -> Option<Self> {
        match ch {
            '+' => Some(Operator::Reserved),
            '#' => Some(Operator::Fragment),
            '.' => Some(Operator::Label),
            '/' => Some(Operator::Path),
            ';' => Some(Operator::PathParameter),
            '?' => Some(Operator::Query),
            '&' => Some(Operator::QueryContinuation),
            _ => None,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Operator::Simple => "",
            Operator::Reserved => "+",
            Operator::Fragment => "#",
            Operator::Label => ".",
            Operator::Path => "/",
            Operator::PathParameter => ";",
            Operator::Query => "?",
            Operator::QueryContinuation => "&",
        }
    }

    /// String emitted before the first defined value
    pub fn prefix(self) -> &'static str {
        match self {
            Operator::Simple | Operator::Reserved => "",
            other => other.symbol(),
        }
    }

    /// String emitted between defined values
    pub fn separator(self) -> &'static str {
        match self {
            Operator::Simple | Operator::Reserved | Operator::Fragment => ",",
            Operator::Query | Operator::QueryContinuation => "&",
            other => other.symbol(),
        }
    }

    /// Whether values are emitted as `name=value` pairs
    pub fn is_named(self) -> bool {
        matches!(
            self,
            Operator::PathParameter | Operator::Query | Operator::QueryContinuation
        )
    }

    /// Suffix of a named pair whose value is empty
    pub fn if_empty(self) -> &'static str {
        match self {
            Operator::Query | Operator::QueryContinuation => "=",
            _ => "",
        }
    }

    /// Whether reserved characters pass through expansion unencoded
    pub fn allows_reserved(self) -> bool {
        matches!(self, Operator::Reserved | Operator::Fragment)
    }
}

/// A variable inside an expression: `[type:]name[=default]`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variable {
    pub name: String,
    pub default: Option<String>,
    pub var_type: Option<VariableType>,
}

impl Variable {
    pub fn new(name: String) -> Self {
        Self {
            name,
            default: None,
            var_type: None,
        }
    }

    pub fn with_default(mut self, default: String) -> Self {
        self.default = Some(default);
        self
    }

    pub fn with_type(mut self, var_type: VariableType) -> Self {
        self.var_type = Some(var_type);
        self
    }

    /// Whether a matched value satisfies this variable's type
    pub fn accepts(&self, value: &str) -> bool {
        self.var_type.as_ref().map_or(true, |t| t.accepts(value))
    }
}

/// A brace expression: an operator applied to one or more variables
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableExpr {
    pub operator: Operator,
    pub variables: Vec<Variable>,
    /// Source text including the braces
    pub raw: String,
}

impl VariableExpr {
    /// Single variable expanded in place, without prefix or separator
    pub fn is_inline(&self) -> bool {
        self.variables.len() == 1
            && matches!(self.operator, Operator::Simple | Operator::Reserved)
    }
}

/// Atomic unit of a compiled template
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Literal(String),
    Variable(VariableExpr),
}

impl Token {
    /// Source text this token was parsed from
    pub fn raw(&self) -> &str {
        match self {
            Token::Literal(text) => text,
            Token::Variable(expr) => &expr.raw,
        }
    }
}

/// A compiled URI template
#[derive(Debug, Clone)]
pub struct Template {
    source: String,
    tokens: Vec<Token>,
    regex: Regex,
    validates: bool,
}

impl Template {
    /// Assemble a template from already parsed tokens
    pub fn new(source: &str, tokens: Vec<Token>) -> Result<Self, FuriError> {
        let regex = Regex::new(&matcher::regex_source(&tokens))?;

        // Extraction confirms a regex match when typed variables outside inline
        // expressions need checking, or when a name appears in several expressions
        let validates = {
            let mut seen = HashSet::new();
            let mut validates = false;
            for expr in tokens.iter().filter_map(|token| match token {
                Token::Variable(expr) => Some(expr),
                Token::Literal(_) => None,
            }) {
                let vars = &expr.variables;
                validates |= !expr.is_inline() && vars.iter().any(|v| v.var_type.is_some());
                validates |= vars.iter().any(|v| seen.contains(v.name.as_str()));
                seen.extend(vars.iter().map(|v| v.name.as_str()));
            }
            validates
        };

        Ok(Self {
            source: source.to_string(),
            tokens,
            regex,
            validates,
        })
    }

    /// The pattern string this template was compiled from
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub(crate) fn regex(&self) -> &Regex {
        &self.regex
    }

    pub(crate) fn validates(&self) -> bool {
        self.validates
    }

    /// Get all variables in this template
    pub fn variables(&self) -> Vec<&Variable> {
        self.tokens
            .iter()
            .filter_map(|token| match token {
                Token::Variable(expr) => Some(expr.variables.iter()),
                Token::Literal(_) => None,
            })
            .flatten()
            .collect()
    }

    /// Number of variables, used to rank overlapping templates
    pub fn variable_count(&self) -> usize {
        self.variables().len()
    }

    /// Total length of literal text, used to rank overlapping templates
    pub fn literal_len(&self) -> usize {
        self.tokens
            .iter()
            .map(|token| match token {
                Token::Literal(text) => text.len(),
                Token::Variable(_) => 0,
            })
            .sum()
    }

    /// Directory prefix of this template: everything up to and including the
    /// last `/` found in literal text.
    pub fn home_prefix(&self) -> Option<String> {
        let (index, slash) = self
            .tokens
            .iter()
            .enumerate()
            .rev()
            .find_map(|(i, token)| match token {
                Token::Literal(text) => text.rfind('/').map(|pos| (i, pos)),
                Token::Variable(_) => None,
            })?;

        let mut prefix: String = self.tokens[..index].iter().map(Token::raw).collect();
        prefix.push_str(&self.tokens[index].raw()[..=slash]);
        Some(prefix)
    }
}

// Templates compiled from the same source are interchangeable
impl PartialEq for Template {
    fn eq(&self, other: &Self) -> bool {
        self.source == other.source && self.tokens == other.tokens
    }
}

impl Eq for Template {}
