#![allow(non_camel_case_types)]
#![allow(non_snake_case)]
/// term keys `poly(N)` and `trig(F,N)`: validation, evaluation and derivative of a single term
///# Example
/// ```
/// use RustedRoots::symbolic::term_model::{TermKey, TrigFunction, evaluate_key};
/// let key: TermKey = "trig(sin,2)".parse().unwrap();
/// assert_eq!(key, TermKey::trig(TrigFunction::Sin, 2).unwrap());
/// assert_eq!(key.pretty(), "sin(x^2)");
/// assert_eq!(evaluate_key("poly(3)", 2.0).unwrap(), 8.0);
/// ```
pub mod term_model;
/// turns a String expression like "3x^2 - 2sin(x^3) + 1" into a map from term keys to coefficients
pub mod parse_function;
///____________________________________________________________________________________________________________________________
/// # Function
/// a sum of coefficient * term, parsed from a string, evaluated and differentiated pointwise
///# Example
/// ```
/// use RustedRoots::symbolic::function::parse_function;
/// let f = parse_function("x^2 - 2cos(x)").unwrap();
/// println!("f(x) = {}", f);
/// let value = f.evaluate(0.0);
/// let slope = f.derivative(0.0);
/// assert_eq!((value, slope), (-2.0, 0.0));
/// ```
pub mod function;
/// bracket bookkeeping used by the expression parser
pub mod utils;
