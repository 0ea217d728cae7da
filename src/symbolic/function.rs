//! Function of a single variable x as a weighted sum of basis terms
//!# Example
//! ```
//! use RustedRoots::symbolic::function::Function;
//! let f = Function::parse("3x^2 + 2x - 5").unwrap();
//! assert_eq!(f.evaluate(2.0), 11.0);
//! assert_eq!(f.derivative(2.0), 14.0);
//! println!("f(x) = {}", f);
//! ```
use crate::symbolic::parse_function::{ParseError, parse_expression};
use crate::symbolic::term_model::{TermError, TermKey};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    coeffs: BTreeMap<TermKey, f64>,
    name: String,
}

impl Default for Function {
    fn default() -> Self {
        Self::new()
    }
}

impl Function {
    pub fn new() -> Self {
        Function {
            coeffs: BTreeMap::new(),
            name: "unnamed_function".to_string(),
        }
    }

    /// Build a function from its textual form; the text becomes the function name
    pub fn parse(text: &str) -> Result<Self, ParseError> {
        let coeffs = parse_expression(text)?;
        Ok(Function {
            coeffs,
            name: text.trim().to_string(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// sum of coefficient * term(x); tan poles propagate as inf/NaN
    pub fn evaluate(&self, x: f64) -> f64 {
        self.coeffs
            .iter()
            .map(|(key, coeff)| coeff * key.evaluate(x))
            .sum()
    }

    /// analytical derivative: sum of coefficient * term'(x)
    pub fn derivative(&self, x: f64) -> f64 {
        self.coeffs
            .iter()
            .map(|(key, coeff)| coeff * key.derivative(x))
            .sum()
    }

    /// coefficient of `key`, 0 for absent terms
    pub fn get(&self, key: &TermKey) -> f64 {
        self.coeffs.get(key).copied().unwrap_or(0.0)
    }

    /// insert a new term; existing terms must be changed with `update`
    pub fn add(&mut self, key: TermKey, value: f64) -> Result<(), TermError> {
        if !key.is_valid() {
            return Err(TermError::InvalidTerm(key.to_string()));
        }
        if self.coeffs.contains_key(&key) {
            return Err(TermError::DuplicateTerm(key));
        }
        self.coeffs.insert(key, value);
        Ok(())
    }

    /// overwrite the coefficient of an existing term
    pub fn update(&mut self, key: TermKey, value: f64) -> Result<(), TermError> {
        if !key.is_valid() {
            return Err(TermError::InvalidTerm(key.to_string()));
        }
        match self.coeffs.get_mut(&key) {
            Some(coeff) => {
                *coeff = value;
                Ok(())
            }
            None => Err(TermError::UnknownTerm(key)),
        }
    }

    pub fn get_str(&self, key: &str) -> Result<f64, TermError> {
        Ok(self.get(&key.parse()?))
    }

    pub fn add_str(&mut self, key: &str, value: f64) -> Result<(), TermError> {
        self.add(key.parse()?, value)
    }

    pub fn update_str(&mut self, key: &str, value: f64) -> Result<(), TermError> {
        self.update(key.parse()?, value)
    }

    /// terms in key order: polynomial terms by degree, then trig terms
    pub fn terms(&self) -> impl Iterator<Item = (&TermKey, &f64)> {
        self.coeffs.iter()
    }

    pub fn len(&self) -> usize {
        self.coeffs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.coeffs.is_empty()
    }

    /// Render like "3x^2 + 2x - 5 + sin(x^2)": polynomial part by descending degree, then trig
    /// terms. Coefficients of +-1 are elided except for the constant term, zero terms are skipped.
    pub fn to_display_string(&self) -> String {
        let (poly, trig): (Vec<_>, Vec<_>) = self
            .coeffs
            .iter()
            .filter(|(_, coeff)| **coeff != 0.0)
            .partition(|(key, _)| key.is_poly());

        let mut out = String::new();
        for (i, (key, coeff)) in poly.into_iter().rev().chain(trig).enumerate() {
            let magnitude = coeff.abs();
            match (i, *coeff < 0.0) {
                (0, true) => out.push('-'),
                (0, false) => {}
                (_, true) => out.push_str(" - "),
                (_, false) => out.push_str(" + "),
            }
            let digits = format_coefficient(magnitude);
            if digits != "1" || key.is_constant() {
                out.push_str(&digits);
            }
            out.push_str(&key.pretty());
        }
        if out.is_empty() {
            out.push('0');
        }
        out
    }
}

// at most 12 decimals so accumulated sums like 0.1 + 0.2 print as 0.3
fn format_coefficient(magnitude: f64) -> String {
    let fixed = format!("{:.12}", magnitude);
    let trimmed = fixed.trim_end_matches('0').trim_end_matches('.');
    if trimmed == "0" && magnitude != 0.0 {
        format!("{:e}", magnitude)
    } else {
        trimmed.to_string()
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_display_string())
    }
}

impl FromStr for Function {
    type Err = ParseError;

    fn from_str(text: &str) -> Result<Self, Self::Err> {
        Function::parse(text)
    }
}

/// entry point for callers holding only the text of a function
pub fn parse_function(text: &str) -> Result<Function, ParseError> {
    Function::parse(text)
}
