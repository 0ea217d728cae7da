//! parse a task document made of lines `key: value` into a HashMap<String, Value>.
//! Blank lines and lines starting with `#` are skipped, text after `#` is a comment.
//! Every key may appear once.
//!
//! ```text
//! # cubic with a bracket
//! function: x^3 - x - 1
//! method: false_position
//! a: 1
//! b: 2
//! tolerance: 1e-10
//! ```
use nom::{
    IResult, Parser,
    bytes::complete::take_while1,
    character::complete::{char, not_line_ending, space0},
    combinator::{all_consuming, map},
    sequence::{delimited, separated_pair},
};
use std::collections::HashMap;
use std::fmt::Display;
use thiserror::Error;

use crate::Utils::logger::LoggerError;
use crate::numerical::scalar_root_finding::RootFindingError;

pub type DocumentMap = HashMap<String, Value>;

/// errors of reading, validating and running a task document
#[derive(Debug, Error)]
pub enum TaskError {
    #[error("line {line}: expected `key: value`, got `{content}`")]
    Syntax { line: usize, content: String },
    #[error("key `{0}` is given more than once")]
    DuplicateKey(String),
    #[error("unknown key `{0}`")]
    UnknownKey(String),
    #[error("missing key `{0}`")]
    MissingKey(String),
    #[error("invalid value `{value}` for key `{key}`")]
    InvalidValue { key: String, value: String },
    #[error("cannot read task file: {0}")]
    Io(#[from] std::io::Error),
    #[error(transparent)]
    Solver(#[from] RootFindingError),
    #[error(transparent)]
    Logger(#[from] LoggerError),
}

/// enum to represent different value types:
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Integer(i64),
    Float(f64),
    Text(String),
}

impl Value {
    /// integers are accepted where a float is expected
    pub fn as_float(&self) -> Option<f64> {
        match self {
            Value::Float(f) => Some(*f),
            Value::Integer(i) => Some(*i as f64),
            Value::Text(_) => None,
        }
    }

    pub fn as_integer(&self) -> Option<i64> {
        if let Value::Integer(i) = self {
            Some(*i)
        } else {
            None
        }
    }
}

impl Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Integer(val) => write!(f, "{}", val),
            Value::Float(val) => write!(f, "{}", val),
            Value::Text(s) => write!(f, "{}", s),
        }
    }
}

/// Parses a key (word characters without spaces)
fn parse_key(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_ascii_alphanumeric() || c == '_').parse(input)
}

// Try parsing as different types in order
fn classify_value(raw: &str) -> Value {
    let s = raw.trim();
    if let Ok(val) = s.parse::<i64>() {
        Value::Integer(val)
    } else if let Ok(val) = s.parse::<f64>() {
        Value::Float(val)
    } else {
        Value::Text(s.to_string())
    }
}

/// Parses `key: value`; the value is the rest of the line
fn parse_entry(input: &str) -> IResult<&str, (&str, Value)> {
    let colon_separator = delimited(space0, char(':'), space0);
    separated_pair(parse_key, colon_separator, map(not_line_ending, classify_value))
        .parse(input)
}

fn strip_comment(line: &str) -> &str {
    let content = match line.find('#') {
        Some(position) => &line[..position],
        None => line,
    };
    content.trim()
}

/// Parses the entire document into a HashMap
pub fn parse_document(input: &str) -> Result<DocumentMap, TaskError> {
    let mut document = HashMap::new();
    for (number, line) in input.lines().enumerate() {
        let line = strip_comment(line);
        if line.is_empty() {
            continue;
        }
        let (_, (key, value)) =
            all_consuming(parse_entry)
                .parse(line)
                .map_err(|_| TaskError::Syntax {
                    line: number + 1,
                    content: line.to_string(),
                })?;
        if value == Value::Text(String::new()) {
            return Err(TaskError::InvalidValue {
                key: key.to_string(),
                value: String::new(),
            });
        }
        if document.insert(key.to_lowercase(), value).is_some() {
            return Err(TaskError::DuplicateKey(key.to_lowercase()));
        }
    }
    Ok(document)
}

/////////////////////////////TESTS////////////////////////////////////////////////////
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_key() {
        let (remaining, key) = parse_key("max_iterations: 10").unwrap();
        assert_eq!(key, "max_iterations");
        assert_eq!(remaining, ": 10");

        let (remaining, key) = parse_key("x0 : 1").unwrap();
        assert_eq!(key, "x0");
        assert_eq!(remaining, " : 1");

        assert!(parse_key(": value").is_err());
    }

    #[test]
    fn test_parse_entry() {
        let (remaining, (key, value)) = parse_entry("tolerance : 1e-8").unwrap();
        assert_eq!(key, "tolerance");
        assert_eq!(value, Value::Float(1e-8));
        assert_eq!(remaining, "");

        let (_, (_, value)) = parse_entry("max_iterations: 250").unwrap();
        assert_eq!(value, Value::Integer(250));

        // the function keeps its inner spaces
        let (_, (_, value)) = parse_entry("function: x^2 - 2").unwrap();
        assert_eq!(value, Value::Text("x^2 - 2".to_string()));
    }

    #[test]
    fn test_value_accessors() {
        assert_eq!(Value::Integer(3).as_float(), Some(3.0));
        assert_eq!(Value::Float(0.5).as_integer(), None);
        assert_eq!(Value::Text("secant".to_string()).as_float(), None);
        assert_eq!(Value::Float(-2.5).to_string(), "-2.5");
    }

    #[test]
    fn test_parse_document() {
        let input = r#"
            # cubic with a bracket
            function: x^3 - x - 1
            method: false_position

            a: 1
            b: 2.0   # upper end
            tolerance: 1e-10
        "#;
        let document = parse_document(input).unwrap();
        assert_eq!(document.len(), 5);
        assert_eq!(
            document["function"],
            Value::Text("x^3 - x - 1".to_string())
        );
        assert_eq!(document["a"], Value::Integer(1));
        assert_eq!(document["b"], Value::Float(2.0));
        assert_eq!(document["tolerance"], Value::Float(1e-10));
    }

    #[test]
    fn test_empty_document() {
        assert!(parse_document("").unwrap().is_empty());
        assert!(parse_document("# only a comment\n\n").unwrap().is_empty());
    }

    #[test]
    fn test_malformed_line() {
        let result = parse_document("method: secant\nx0 1.0\n");
        match result {
            Err(TaskError::Syntax { line, content }) => {
                assert_eq!(line, 2);
                assert_eq!(content, "x0 1.0");
            }
            other => panic!("expected a syntax error, got {:?}", other),
        }
    }

    #[test]
    fn test_duplicate_key() {
        let result = parse_document("a: 1\nb: 2\nA: 3");
        assert!(matches!(result, Err(TaskError::DuplicateKey(key)) if key == "a"));
    }

    #[test]
    fn test_empty_value() {
        let result = parse_document("function:   ");
        assert!(matches!(result, Err(TaskError::InvalidValue { .. })));
    }
}
