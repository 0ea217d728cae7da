//! Canonical term keys of the restricted function vocabulary.
//!
//! Every function handled by the crate is a weighted sum of basis terms of two families:
//! * `poly(N)`     - the monomial x^N, N >= 0
//! * `trig(F,N)`   - F(x^N) with F one of sin, cos, tan and N >= 1
//!
//! The text form (`poly(2)`, `trig(sin,3)`) is what `Display`/`FromStr` use, so keys can be
//! printed in logs and read back from user input.
use regex::Regex;
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;
use strum_macros::{Display, EnumIter, EnumString};
use thiserror::Error;

static POLY_KEY_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^poly\((0|[1-9]\d*)\)$").expect("valid poly key regex"));
static TRIG_KEY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^trig\((sin|cos|tan),([1-9]\d*)\)$").expect("valid trig key regex")
});

/// Errors of direct term-map manipulation
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TermError {
    #[error("invalid term key: {0}")]
    InvalidTerm(String),
    #[error("term {0} already exists; use update() to change it")]
    DuplicateTerm(TermKey),
    #[error("term {0} does not exist; use add() instead")]
    UnknownTerm(TermKey),
}

/// Trigonometric functions allowed as outer function of a trig term
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, EnumString, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum TrigFunction {
    Sin,
    Cos,
    Tan,
}

impl TrigFunction {
    pub fn apply(&self, u: f64) -> f64 {
        match self {
            TrigFunction::Sin => u.sin(),
            TrigFunction::Cos => u.cos(),
            TrigFunction::Tan => u.tan(),
        }
    }

    /// dF/du. For tan this is sec^2(u), which blows up where cos(u) = 0.
    pub fn outer_derivative(&self, u: f64) -> f64 {
        match self {
            TrigFunction::Sin => u.cos(),
            TrigFunction::Cos => -u.sin(),
            TrigFunction::Tan => {
                let c = u.cos();
                1.0 / (c * c)
            }
        }
    }
}

/// Basis term of a function: either x^degree or function(x^degree)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TermKey {
    Poly { degree: u32 },
    Trig { function: TrigFunction, degree: u32 },
}

// x^n with integer exponent; falls back to powf for exponents beyond i32
fn monomial(x: f64, degree: u32) -> f64 {
    match i32::try_from(degree) {
        Ok(n) => x.powi(n),
        Err(_) => x.powf(degree as f64),
    }
}

impl TermKey {
    pub fn poly(degree: u32) -> TermKey {
        TermKey::Poly { degree }
    }

    pub fn constant() -> TermKey {
        TermKey::Poly { degree: 0 }
    }

    /// Trig terms need a monomial argument of degree at least 1
    pub fn trig(function: TrigFunction, degree: u32) -> Result<TermKey, TermError> {
        let key = TermKey::Trig { function, degree };
        if key.is_valid() {
            Ok(key)
        } else {
            Err(TermError::InvalidTerm(key.to_string()))
        }
    }

    /// The enum fields are public, so a `Trig` of degree 0 can still be built by hand
    pub fn is_valid(&self) -> bool {
        match self {
            TermKey::Poly { .. } => true,
            TermKey::Trig { degree, .. } => *degree >= 1,
        }
    }

    pub fn is_constant(&self) -> bool {
        matches!(self, TermKey::Poly { degree: 0 })
    }

    pub fn is_poly(&self) -> bool {
        matches!(self, TermKey::Poly { .. })
    }

    /// value of the basis term at x
    pub fn evaluate(&self, x: f64) -> f64 {
        match self {
            TermKey::Poly { degree } => monomial(x, *degree),
            TermKey::Trig { function, degree } => function.apply(monomial(x, *degree)),
        }
    }

    /// analytical derivative of the basis term at x.
    /// poly: N*x^(N-1); trig: F'(x^N) * N*x^(N-1) (chain rule)
    pub fn derivative(&self, x: f64) -> f64 {
        match self {
            TermKey::Poly { degree: 0 } => 0.0,
            TermKey::Poly { degree } => *degree as f64 * monomial(x, degree - 1),
            TermKey::Trig { function, degree } => {
                let inner = monomial(x, *degree);
                let inner_derivative = if *degree == 0 {
                    0.0
                } else {
                    *degree as f64 * monomial(x, degree - 1)
                };
                function.outer_derivative(inner) * inner_derivative
            }
        }
    }

    /// Human readable form: "", "x", "x^3", "sin(x)", "tan(x^2)"
    pub fn pretty(&self) -> String {
        let power = |degree: u32| match degree {
            1 => "x".to_string(),
            n => format!("x^{}", n),
        };
        match self {
            TermKey::Poly { degree: 0 } => String::new(),
            TermKey::Poly { degree } => power(*degree),
            TermKey::Trig { function, degree } => format!("{}({})", function, power(*degree)),
        }
    }
}

impl fmt::Display for TermKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TermKey::Poly { degree } => write!(f, "poly({})", degree),
            TermKey::Trig { function, degree } => write!(f, "trig({},{})", function, degree),
        }
    }
}

impl FromStr for TermKey {
    type Err = TermError;

    fn from_str(key: &str) -> Result<Self, Self::Err> {
        let invalid = || TermError::InvalidTerm(key.to_string());
        if let Some(caps) = POLY_KEY_RE.captures(key) {
            let degree = caps[1].parse::<u32>().map_err(|_| invalid())?;
            return Ok(TermKey::poly(degree));
        }
        if let Some(caps) = TRIG_KEY_RE.captures(key) {
            let function = caps[1].parse::<TrigFunction>().map_err(|_| invalid())?;
            let degree = caps[2].parse::<u32>().map_err(|_| invalid())?;
            return TermKey::trig(function, degree).map_err(|_| invalid());
        }
        Err(invalid())
    }
}

/// true iff `key` is `poly(N)` with N >= 0 or `trig(F,N)` with F in {sin, cos, tan} and N >= 1
pub fn is_valid_key(key: &str) -> bool {
    key.parse::<TermKey>().is_ok()
}

/// value of the basis term named by a textual key
pub fn evaluate_key(key: &str, x: f64) -> Result<f64, TermError> {
    Ok(key.parse::<TermKey>()?.evaluate(x))
}

/// derivative of the basis term named by a textual key
pub fn derivative_key(key: &str, x: f64) -> Result<f64, TermError> {
    Ok(key.parse::<TermKey>()?.derivative(x))
}
