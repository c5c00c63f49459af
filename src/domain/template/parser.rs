// Template parser: scans a pattern left to right into literal and variable tokens

use std::sync::OnceLock;

use super::ast::{Operator, Template, Token, Variable, VariableExpr};
use super::types::VariableTypes;
use crate::error::FuriError;

fn builtin_types() -> &'static VariableTypes {
    static BUILTIN: OnceLock<VariableTypes> = OnceLock::new();
    BUILTIN.get_or_init(VariableTypes::new)
}

pub struct TemplateParser<'a> {
    input: &'a str,
    pos: usize,
    types: &'a VariableTypes,
}

impl<'a> TemplateParser<'a> {
    /// Compile a pattern using the built-in variable types
    pub fn parse(template: &str) -> Result<Template, FuriError> {
        TemplateParser::parse_with(template, builtin_types())
    }

    /// Compile a pattern resolving typed variables against `types`
    pub fn parse_with(template: &str, types: &VariableTypes) -> Result<Template, FuriError> {
        let mut parser = TemplateParser {
            input: template,
            pos: 0,
            types,
        };
        let tokens = parser.parse_tokens()?;
        Template::new(template, tokens)
    }

    fn parse_tokens(&mut self) -> Result<Vec<Token>, FuriError> {
        let mut tokens = Vec::new();
        let mut literal_buf = String::new();

        while let Some(ch) = self.peek_char() {
            if ch != '{' {
                literal_buf.push(ch);
                self.pos += ch.len_utf8();
                continue;
            }

            let rest = &self.input[self.pos + 1..];
            let Some(close) = rest.find('}') else {
                // Never closed: the brace is plain text
                literal_buf.push('{');
                self.pos += 1;
                continue;
            };

            let body = &rest[..close];
            if body.is_empty() {
                // `{}` is opaque text, never a variable
                literal_buf.push_str("{}");
                self.pos += 2;
            } else if body.contains('{') {
                // Only the innermost brace can open an expression
                literal_buf.push('{');
                self.pos += 1;
            } else {
                if !literal_buf.is_empty() {
                    tokens.push(Token::Literal(std::mem::take(&mut literal_buf)));
                }
                let expr = self.parse_expression(body)?;
                tokens.push(Token::Variable(expr));
                self.pos += close + 2;
            }
        }

        if !literal_buf.is_empty() {
            tokens.push(Token::Literal(literal_buf));
        }

        Ok(tokens)
    }

    fn parse_expression(&self, body: &str) -> Result<VariableExpr, FuriError> {
        let mut offset = self.pos + 1;
        let mut list = body;

        let operator = match body.chars().next().and_then(Operator::from_char) {
            Some(op) => {
                list = &body[1..];
                offset += 1;
                op
            }
            None => Operator::Simple,
        };

        let mut variables = Vec::new();
        for spec in list.split(',') {
            variables.push(self.parse_varspec(spec, offset)?);
            offset += spec.len() + 1;
        }

        Ok(VariableExpr {
            operator,
            variables,
            raw: format!("{{{}}}", body),
        })
    }

    fn parse_varspec(&self, spec: &str, position: usize) -> Result<Variable, FuriError> {
        let (head, default) = match spec.split_once('=') {
            Some((head, default)) => (head, Some(default)),
            None => (spec, None),
        };

        let (type_name, name) = match head.split_once(':') {
            Some((type_name, name)) => (Some(type_name), name),
            None => (None, head),
        };

        let name_position = position + type_name.map_or(0, |t| t.len() + 1);
        self.check_name(name, name_position, "variable name")?;

        let mut variable = Variable::new(name.to_string());

        if let Some(type_name) = type_name {
            self.check_name(type_name, position, "type name")?;
            let var_type = self.types.get(type_name).ok_or_else(|| {
                FuriError::malformed(
                    self.input,
                    position,
                    format!("unknown variable type '{}'", type_name),
                )
            })?;
            variable = variable.with_type(var_type.clone());
        }

        if let Some(default) = default {
            variable = variable.with_default(default.to_string());
        }

        Ok(variable)
    }

    fn check_name(&self, name: &str, position: usize, what: &str) -> Result<(), FuriError> {
        if name.is_empty() {
            return Err(FuriError::malformed(
                self.input,
                position,
                format!("empty {}", what),
            ));
        }

        if let Some((i, ch)) = name.char_indices().find(|(_, ch)| !is_name_char(*ch)) {
            return Err(FuriError::malformed(
                self.input,
                position + i,
                format!("invalid character '{}' in {}", ch, what),
            ));
        }

        Ok(())
    }

    fn peek_char(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }
}

fn is_name_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || ch == '_' || ch == '-' || ch == '.'
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::template::types::VariableType;

    fn expr(token: &Token) -> &VariableExpr {
        match token {
            Token::Variable(expr) => expr,
            _ => panic!("Expected variable"),
        }
    }

    #[test]
    fn test_parse_simple_variable() {
        let template = TemplateParser::parse("/products/{id}").unwrap();
        assert_eq!(template.tokens().len(), 2);

        match &template.tokens()[0] {
            Token::Literal(s) => assert_eq!(s, "/products/"),
            _ => panic!("Expected literal"),
        }

        let expr = expr(&template.tokens()[1]);
        assert_eq!(expr.operator, Operator::Simple);
        assert_eq!(expr.variables.len(), 1);
        assert_eq!(expr.variables[0].name, "id");
        assert!(expr.variables[0].default.is_none());
        assert_eq!(expr.raw, "{id}");
    }

    #[test]
    fn test_parse_default() {
        let template = TemplateParser::parse("{test=fallback}").unwrap();
        let vars = template.variables();
        assert_eq!(vars[0].name, "test");
        assert_eq!(vars[0].default.as_deref(), Some("fallback"));
    }

    #[test]
    fn test_parse_default_splits_at_first_equals() {
        let template = TemplateParser::parse("{q=a=b}").unwrap();
        let vars = template.variables();
        assert_eq!(vars[0].name, "q");
        assert_eq!(vars[0].default.as_deref(), Some("a=b"));
    }

    #[test]
    fn test_parse_empty_default() {
        let template = TemplateParser::parse("{lang=}").unwrap();
        assert_eq!(template.variables()[0].default.as_deref(), Some(""));
    }

    #[test]
    fn test_parse_operators() {
        for (pattern, operator) in [
            ("{+path}", Operator::Reserved),
            ("{#section}", Operator::Fragment),
            ("{.ext}", Operator::Label),
            ("{/segment}", Operator::Path),
            ("{;param}", Operator::PathParameter),
            ("{?query}", Operator::Query),
            ("{&more}", Operator::QueryContinuation),
        ] {
            let template = TemplateParser::parse(pattern).unwrap();
            assert_eq!(expr(&template.tokens()[0]).operator, operator, "{}", pattern);
        }
    }

    #[test]
    fn test_parse_variable_list() {
        let template = TemplateParser::parse("/search{?q,page=1}").unwrap();
        let expr = expr(&template.tokens()[1]);
        assert_eq!(expr.operator, Operator::Query);
        assert_eq!(expr.variables.len(), 2);
        assert_eq!(expr.variables[0].name, "q");
        assert_eq!(expr.variables[1].name, "page");
        assert_eq!(expr.variables[1].default.as_deref(), Some("1"));
    }

    #[test]
    fn test_parse_typed_variable() {
        let template = TemplateParser::parse("/orders/{int:id}").unwrap();
        let var = template.variables()[0];
        assert_eq!(var.name, "id");
        assert_eq!(var.var_type.as_ref().unwrap().name(), "int");
    }

    #[test]
    fn test_parse_custom_type() {
        let mut types = VariableTypes::new();
        types.register(VariableType::new("year", "[0-9]{4}").unwrap());
        let template = TemplateParser::parse_with("/archive/{year:y=2024}", &types).unwrap();
        let var = template.variables()[0];
        assert_eq!(var.name, "y");
        assert_eq!(var.default.as_deref(), Some("2024"));
        assert_eq!(var.var_type.as_ref().unwrap().pattern(), "[0-9]{4}");
    }

    #[test]
    fn test_parse_unknown_type_fails() {
        let result = TemplateParser::parse("/archive/{year:y}");
        let err = result.unwrap_err();
        assert!(err.to_string().contains("unknown variable type 'year'"));
        assert!(matches!(err, FuriError::MalformedTemplate { position: 10, .. }));
    }

    #[test]
    fn test_parse_empty_braces_are_literal() {
        let template = TemplateParser::parse("{}").unwrap();
        assert_eq!(template.tokens(), &[Token::Literal("{}".to_string())]);

        let template = TemplateParser::parse("a{}{}b").unwrap();
        assert_eq!(template.tokens(), &[Token::Literal("a{}{}b".to_string())]);
        assert!(template.variables().is_empty());
    }

    #[test]
    fn test_parse_unmatched_braces_are_literal() {
        for pattern in ["{", "}", "a{b", "a}b", "}{", "{{"] {
            let template = TemplateParser::parse(pattern).unwrap();
            assert_eq!(template.tokens(), &[Token::Literal(pattern.to_string())]);
        }
    }

    #[test]
    fn test_parse_nested_open_brace() {
        let template = TemplateParser::parse("{a{b}").unwrap();
        assert_eq!(template.tokens().len(), 2);
        assert_eq!(template.tokens()[0], Token::Literal("{a".to_string()));
        assert_eq!(expr(&template.tokens()[1]).variables[0].name, "b");
    }

    #[test]
    fn test_parse_invalid_name_fails() {
        let err = TemplateParser::parse("/x/{a b}").unwrap_err();
        assert!(err.to_string().contains("invalid character ' '"));
        assert!(matches!(err, FuriError::MalformedTemplate { position: 5, .. }));
    }

    #[test]
    fn test_parse_empty_name_fails() {
        assert!(TemplateParser::parse("{=x}").is_err());
        assert!(TemplateParser::parse("{+}").is_err());
        assert!(TemplateParser::parse("{a,}").is_err());
    }

    #[test]
    fn test_parse_is_deterministic() {
        let pattern = "/{group}/{+path}{?q,page=1}#top";
        let a = TemplateParser::parse(pattern).unwrap();
        let b = TemplateParser::parse(pattern).unwrap();
        assert_eq!(a.tokens(), b.tokens());
        assert_eq!(a.source(), pattern);
    }

    #[test]
    fn test_parse_unicode_literal() {
        let template = TemplateParser::parse("/café/{name}").unwrap();
        assert_eq!(template.tokens()[0], Token::Literal("/café/".to_string()));
    }
}
