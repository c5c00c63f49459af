// Expansion: templates back into concrete URIs

use super::ast::{Operator, Template, Token, Variable, VariableExpr};
use crate::domain::parameters::Parameters;

/// Something that can be expanded into a string given parameters
pub trait Expandable {
    fn expand(&self, parameters: &dyn Parameters) -> String;
}

impl Expandable for Template {
    fn expand(&self, parameters: &dyn Parameters) -> String {
        let mut result = String::new();
        for token in self.tokens() {
            result.push_str(&token.expand(parameters));
        }
        result
    }
}

impl Expandable for Token {
    fn expand(&self, parameters: &dyn Parameters) -> String {
        match self {
            Token::Literal(text) => text.clone(),
            Token::Variable(expr) => expr.expand(parameters),
        }
    }
}

impl Expandable for VariableExpr {
    fn expand(&self, parameters: &dyn Parameters) -> String {
        let op = self.operator;

        if self.is_inline() {
            let value = lookup(&self.variables[0], parameters).unwrap_or_default();
            return encode(&value, op);
        }

        // Undefined variables are skipped, an all-undefined expression emits nothing
        let pieces: Vec<String> = self
            .variables
            .iter()
            .filter_map(|var| {
                let value = lookup(var, parameters)?;
                let piece = if !op.is_named() {
                    encode(&value, op)
                } else if value.is_empty() {
                    format!("{}{}", var.name, op.if_empty())
                } else {
                    format!("{}={}", var.name, encode(&value, op))
                };
                Some(piece)
            })
            .collect();

        if pieces.is_empty() {
            return String::new();
        }

        format!("{}{}", op.prefix(), pieces.join(op.separator()))
    }
}

/// Value of a variable: its non-empty parameter value, else its default
fn lookup(var: &Variable, parameters: &dyn Parameters) -> Option<String> {
    parameters
        .value(&var.name)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .or_else(|| var.default.clone())
}

fn encode(value: &str, op: Operator) -> String {
    if op.allows_reserved() {
        encode_reserved(value)
    } else {
        urlencoding::encode(value).into_owned()
    }
}

fn is_reserved(ch: char) -> bool {
    matches!(
        ch,
        ':' | '/' | '?' | '#' | '[' | ']' | '@' | '!' | '$' | '&' | '\'' | '(' | ')' | '*' | '+'
            | ',' | ';' | '='
    )
}

/// Percent-encode everything outside the unreserved and reserved sets,
/// keeping existing `%XX` triplets intact
fn encode_reserved(value: &str) -> String {
    let bytes = value.as_bytes();
    let mut result = String::with_capacity(value.len());
    let mut buf = [0u8; 4];

    for (i, ch) in value.char_indices() {
        let triplet = ch == '%'
            && bytes.get(i + 1).is_some_and(u8::is_ascii_hexdigit)
            && bytes.get(i + 2).is_some_and(u8::is_ascii_hexdigit);

        if triplet || is_reserved(ch) || ch.is_ascii_alphanumeric() || "-._~".contains(ch) {
            result.push(ch);
        } else {
            result.push_str(&urlencoding::encode(ch.encode_utf8(&mut buf)));
        }
    }

    result
}
