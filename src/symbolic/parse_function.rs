//! Turns a compact textual expression like `3x^2 - 2sin(x^3) + 4` into a term map.
//!
//! Grammar of one top-level term (whitespace is ignored everywhere):
//! ```text
//! trig term: [+|-] [coefficient] (sin|cos|tan) ( x | x^D )
//! poly term: [+|-] [coefficient] [ x [^D] ]
//! ```
//! A missing coefficient means 1, `x` without exponent means degree 1 and a bare number is the
//! constant term. Repeated terms of the same key are summed.
use crate::symbolic::term_model::{TermError, TermKey, TrigFunction};
use crate::symbolic::utils::{has_balanced_brackets, split_outside_brackets};
use log::{debug, trace};
use regex::{Captures, Regex};
use std::collections::BTreeMap;
use std::sync::LazyLock;
use thiserror::Error;

static TRIG_NAME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"sin|cos|tan").expect("valid trig name regex"));
static TRIG_TERM_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([+-]?)(\d+\.?\d*|\.\d+)?(sin|cos|tan)\(x(?:\^(\d+))?\)$")
        .expect("valid trig term regex")
});
static POLY_TERM_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([+-]?)(\d+\.?\d*|\.\d+)?(?:(x)(?:\^(\d+))?)?$").expect("valid poly term regex")
});

/// Errors raised while reading a function from text
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("trig requires parenthesized monomial argument: `{function}` at position {position}")]
    TrigWithoutArgument { function: String, position: usize },
    #[error("unrecognized term: `{0}`")]
    UnrecognizedTerm(String),
    #[error("unbalanced parentheses in `{0}`")]
    UnbalancedBrackets(String),
    #[error("invalid number `{0}`")]
    InvalidNumber(String),
    #[error("invalid term: {0}")]
    Term(#[from] TermError),
}

/// Parse `text` into a map from term key to accumulated coefficient.
/// Fails on the first term that cannot be classified; nothing partial is returned.
pub fn parse_expression(text: &str) -> Result<BTreeMap<TermKey, f64>, ParseError> {
    let expr: String = text.chars().filter(|c| !c.is_whitespace()).collect();
    debug!("parsing expression: {}", expr);

    check_trig_arguments(&expr)?;
    if !has_balanced_brackets(&expr) {
        return Err(ParseError::UnbalancedBrackets(expr));
    }

    let mut coeffs = BTreeMap::new();
    for token in split_outside_brackets(&expr, &['+', '-']) {
        match parse_term(token)? {
            Some((key, value)) => {
                trace!("term `{}` -> {} * {}", token, value, key);
                *coeffs.entry(key).or_insert(0.0) += value;
            }
            None => trace!("empty term `{}` skipped", token),
        }
    }
    Ok(coeffs)
}

/// every sin/cos/tan must be followed directly by an opening bracket.
/// Longer names such as `tanh` or `asin` are left to the term matcher; `sinx` is still a bare name.
fn check_trig_arguments(expr: &str) -> Result<(), ParseError> {
    for m in TRIG_NAME_RE.find_iter(expr) {
        let before = expr[..m.start()].chars().next_back();
        let after = expr[m.end()..].chars().next();
        let is_name_char = |c: char| c.is_ascii_alphabetic() && c != 'x';
        if before.is_some_and(is_name_char) || after.is_some_and(is_name_char) {
            continue;
        }
        if after != Some('(') {
            return Err(ParseError::TrigWithoutArgument {
                function: m.as_str().to_string(),
                position: m.start(),
            });
        }
    }
    Ok(())
}

/// Classify one signed term. `Ok(None)` means the token carried neither digits nor `x`.
fn parse_term(token: &str) -> Result<Option<(TermKey, f64)>, ParseError> {
    if let Some(caps) = TRIG_TERM_RE.captures(token) {
        let value = signed_coefficient(&caps)?;
        let function = caps[3]
            .parse::<TrigFunction>()
            .map_err(|_| ParseError::UnrecognizedTerm(token.to_string()))?;
        let degree = match caps.get(4) {
            Some(d) => parse_degree(d.as_str())?,
            None => 1,
        };
        let key = TermKey::trig(function, degree)?;
        return Ok(Some((key, value)));
    }

    if let Some(caps) = POLY_TERM_RE.captures(token) {
        let has_x = caps.get(3).is_some();
        if !has_x && caps.get(2).is_none() {
            return Ok(None);
        }
        let value = signed_coefficient(&caps)?;
        let degree = match (has_x, caps.get(4)) {
            (false, _) => 0,
            (true, None) => 1,
            (true, Some(d)) => parse_degree(d.as_str())?,
        };
        return Ok(Some((TermKey::poly(degree), value)));
    }

    Err(ParseError::UnrecognizedTerm(token.to_string()))
}

// group 1 is the sign, group 2 the optional coefficient digits
fn signed_coefficient(caps: &Captures) -> Result<f64, ParseError> {
    let magnitude = match caps.get(2) {
        Some(digits) => digits
            .as_str()
            .parse::<f64>()
            .map_err(|_| ParseError::InvalidNumber(digits.as_str().to_string()))?,
        None => 1.0,
    };
    Ok(if &caps[1] == "-" { -magnitude } else { magnitude })
}

fn parse_degree(digits: &str) -> Result<u32, ParseError> {
    digits
        .parse::<u32>()
        .map_err(|_| ParseError::InvalidNumber(digits.to_string()))
}
