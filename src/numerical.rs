//! root finding for functions of one variable
/// relative-change stopping rule shared by the root finders
pub mod convergence;
/// ____________________________________________________________________________________________________________________________
/// # Scalar root finding
/// bisection, fixed-point iteration, false position, Newton-Raphson and secant methods
///# Example
/// ```
/// use RustedRoots::numerical::scalar_root_finding::{ScalarRootFinder, RootFindingConfig};
/// use RustedRoots::symbolic::function::parse_function;
/// let f = parse_function("x^3 - x - 1").unwrap();
/// let solver = ScalarRootFinder::with_config(RootFindingConfig::new(1e-10, 100).unwrap());
/// let outcome = solver.false_position(&f, 1.0, 2.0).unwrap();
/// println!("root {:?} after {} iterations", outcome.root(), outcome.iterations());
/// ```
pub mod scalar_root_finding;
mod scalar_root_finding_tests;
/// many independent problems solved in parallel
pub mod batch_solve;
