// Template module for RFC 6570-style URI templates
//
// This module provides parsing of URI templates into tokens, matching of
// candidate paths against them, and expansion back into concrete URIs.

mod ast;
mod expander;
mod matcher;
mod parser;
mod types;

pub use ast::{Operator, Template, Token, Variable, VariableExpr};
pub use expander::Expandable;
pub use matcher::Matchable;
pub use parser::TemplateParser;
pub use types::{VariableType, VariableTypes};

use crate::error::FuriError;

/// Compile a pattern with the built-in variable types
pub fn compile(pattern: &str) -> Result<Template, FuriError> {
    TemplateParser::parse(pattern)
}
