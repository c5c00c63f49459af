// Matching: candidate paths against compiled templates

use regex::{Captures, Regex};
use std::borrow::Cow;

use super::ast::{Operator, Template, Token, Variable, VariableExpr};
use crate::domain::parameters::{Parameters, UriParameters};

/// Something that can be matched against a candidate path
pub trait Matchable {
    /// Whether the whole candidate is matched
    fn matches(&self, candidate: &str) -> bool;

    /// Anchored regular expression equivalent to this matcher
    fn pattern(&self) -> &Regex;
}

impl Matchable for Template {
    fn matches(&self, candidate: &str) -> bool {
        if !self.regex().is_match(candidate) {
            return false;
        }
        !self.validates() || self.extract(candidate).is_some()
    }

    fn pattern(&self) -> &Regex {
        self.regex()
    }
}

impl Template {
    /// Match the candidate and collect the values of every matched variable
    pub fn extract(&self, candidate: &str) -> Option<UriParameters> {
        let captures = self.regex().captures(candidate)?;
        let mut parameters = UriParameters::new();

        let expressions = self.tokens().iter().filter_map(|token| match token {
            Token::Variable(expr) => Some(expr),
            Token::Literal(_) => None,
        });

        for (group, expr) in expressions.enumerate() {
            let matched = capture(&captures, group + 1);
            let mut bound = UriParameters::new();
            if !bind(expr, matched, &mut bound) {
                return None;
            }

            // A name repeated across expressions stands for a single value
            for (name, values) in bound.iter() {
                if parameters.values(name).is_some_and(|earlier| earlier != values) {
                    return None;
                }
                parameters.set_values(name, values.to_vec());
            }
        }

        Some(parameters)
    }
}

fn capture<'h>(captures: &Captures<'h>, group: usize) -> &'h str {
    captures.get(group).map_or("", |m| m.as_str())
}

/// Build the anchored regex source for a token sequence.
///
/// Every variable token owns exactly one capture group, in token order.
pub(super) fn regex_source(tokens: &[Token]) -> String {
    let mut source = String::from("^");

    for (i, token) in tokens.iter().enumerate() {
        match token {
            Token::Literal(text) => source.push_str(&regex::escape(text)),
            Token::Variable(expr) => {
                let next_is_literal = matches!(tokens.get(i + 1), Some(Token::Literal(_)));
                source.push('(');
                source.push_str(&fragment(expr, next_is_literal));
                source.push(')');
            }
        }
    }

    source.push('$');
    source
}

fn fragment(expr: &VariableExpr, next_is_literal: bool) -> String {
    let count = expr.variables.len();

    if expr.is_inline() {
        if let Some(var_type) = &expr.variables[0].var_type {
            return format!("(?:{})", var_type.pattern());
        }
    }

    match expr.operator {
        // Minimal up to the next literal, greedy when nothing delimits it
        Operator::Simple if next_is_literal => "[^/]*?".to_string(),
        Operator::Simple => "[^/]*".to_string(),
        Operator::Reserved => ".*".to_string(),
        Operator::Fragment => "(?:#.*)?".to_string(),
        Operator::Label => format!(r"(?:\.[^/?#.]*){{0,{}}}", count),
        Operator::Path => format!("(?:/[^/?#]*){{0,{}}}", count),
        Operator::PathParameter => "(?:;[^/?#;]*)*".to_string(),
        Operator::Query => r"(?:\?[^#]*)?".to_string(),
        Operator::QueryContinuation => "(?:&[^#]*)?".to_string(),
    }
}

fn decode(value: &str) -> String {
    urlencoding::decode(value)
        .map(Cow::into_owned)
        .unwrap_or_else(|_| value.to_string())
}

/// Bind the text captured for one expression; false when a typed value is rejected
fn bind(expr: &VariableExpr, matched: &str, parameters: &mut UriParameters) -> bool {
    let vars = &expr.variables;

    match expr.operator {
        Operator::Simple | Operator::Reserved if expr.is_inline() => {
            assign(&vars[0], matched, parameters)
        }
        Operator::Simple | Operator::Reserved => {
            positional(vars, matched.splitn(vars.len(), ','), parameters)
        }
        Operator::Fragment => match matched.strip_prefix('#') {
            Some(rest) if vars.len() == 1 => assign(&vars[0], rest, parameters),
            Some(rest) => positional(vars, rest.splitn(vars.len(), ','), parameters),
            None => true,
        },
        Operator::Label | Operator::Path => {
            let separator = if expr.operator == Operator::Label { '.' } else { '/' };
            positional(vars, matched.split(separator).skip(1), parameters)
        }
        Operator::PathParameter => named(vars, matched.split(';').skip(1), parameters),
        Operator::Query => match matched.strip_prefix('?') {
            Some(rest) => named(vars, rest.split('&'), parameters),
            None => true,
        },
        Operator::QueryContinuation => match matched.strip_prefix('&') {
            Some(rest) => named(vars, rest.split('&'), parameters),
            None => true,
        },
    }
}

// Types constrain the text as it appears in the URI, before decoding
fn assign(var: &Variable, raw: &str, parameters: &mut UriParameters) -> bool {
    if !var.accepts(raw) {
        return false;
    }
    parameters.set(&var.name, &decode(raw));
    true
}

fn positional<'h>(
    vars: &[Variable],
    pieces: impl Iterator<Item = &'h str>,
    parameters: &mut UriParameters,
) -> bool {
    vars.iter()
        .zip(pieces)
        .all(|(var, piece)| assign(var, piece, parameters))
}

fn named<'h>(
    vars: &[Variable],
    pairs: impl Iterator<Item = &'h str>,
    parameters: &mut UriParameters,
) -> bool {
    for pair in pairs.filter(|p| !p.is_empty()) {
        let (name, value) = pair.split_once('=').unwrap_or((pair, ""));
        let name = decode(name);

        // Undeclared names are ignored
        if let Some(var) = vars.iter().find(|v| v.name == name) {
            if !assign(var, value, parameters) {
                return false;
            }
        }
    }
    true
}
