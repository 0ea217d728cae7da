use crate::numerical::convergence::{converged, relative_error};
use crate::symbolic::function::Function;
use crate::symbolic::parse_function::ParseError;
use log::{debug, info, warn};
use std::str::FromStr;
use strum_macros::{Display, EnumIter, EnumString};
use thiserror::Error;

/// Enum to represent the root finding methods
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum RootFindingMethod {
    Bisection,
    FixedPoint,
    FalsePosition,
    NewtonRaphson,
    Secant,
}

impl RootFindingMethod {
    /// names of the numeric inputs the method expects, in order
    pub fn parameter_names(&self) -> &'static [&'static str] {
        match self {
            RootFindingMethod::Bisection | RootFindingMethod::FalsePosition => &["a", "b"],
            RootFindingMethod::FixedPoint | RootFindingMethod::NewtonRaphson => &["x0"],
            RootFindingMethod::Secant => &["x0", "x1"],
        }
    }
}

/// Error types for root finding methods. Running out of iterations is not an error,
/// see `RootOutcome::NotConverged`.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RootFindingError {
    #[error("f(a) and f(b) must have opposite signs: f({a}) = {fa}, f({b}) = {fb}")]
    InvalidBracket { a: f64, b: f64, fa: f64, fb: f64 },
    #[error("the two seeds must be distinct, got {0} twice")]
    DegenerateSeed(f64),
    #[error("derivative is zero or undefined at x = {x} (iteration {iteration})")]
    ZeroDerivative { x: f64, iteration: usize },
    #[error("iteration {iteration} produced a non-finite value starting from x = {x}")]
    NonFiniteIterate { x: f64, iteration: usize },
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("unknown root finding method `{0}`")]
    UnknownMethod(String),
    #[error(transparent)]
    Parse(#[from] ParseError),
}

//////////////////////////////////TRAITS AND IMPLEMENTATIONS/////////////////////////////////

/// Trait for representing a nonlinear equation f(x) = 0
pub trait NonlinearFunction {
    /// Evaluate the function at point x
    fn evaluate(&self, x: f64) -> f64;

    /// Evaluate the derivative at point x (optional, for methods that can use it)
    fn derivative(&self, _x: f64) -> Option<f64> {
        None
    }

    /// Get function name for debugging/logging
    fn name(&self) -> &str {
        "unnamed_function"
    }
}

impl NonlinearFunction for Function {
    fn evaluate(&self, x: f64) -> f64 {
        Function::evaluate(self, x)
    }

    fn derivative(&self, x: f64) -> Option<f64> {
        Some(Function::derivative(self, x))
    }

    fn name(&self) -> &str {
        Function::name(self)
    }
}

/// Simple function wrapper for closures
pub struct ClosureFunction<F>
where
    F: Fn(f64) -> f64,
{
    func: F,
    name: String,
}

impl<F> ClosureFunction<F>
where
    F: Fn(f64) -> f64,
{
    pub fn new(func: F, name: String) -> Self {
        Self { func, name }
    }
}

impl<F> NonlinearFunction for ClosureFunction<F>
where
    F: Fn(f64) -> f64,
{
    fn evaluate(&self, x: f64) -> f64 {
        (self.func)(x)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Function wrapper with analytical derivative
pub struct FunctionWithDerivative<F, D>
where
    F: Fn(f64) -> f64,
    D: Fn(f64) -> f64,
{
    func: F,
    derivative_func: D,
    name: String,
}

impl<F, D> FunctionWithDerivative<F, D>
where
    F: Fn(f64) -> f64,
    D: Fn(f64) -> f64,
{
    pub fn new(func: F, derivative_func: D, name: String) -> Self {
        Self {
            func,
            derivative_func,
            name,
        }
    }
}

impl<F, D> NonlinearFunction for FunctionWithDerivative<F, D>
where
    F: Fn(f64) -> f64,
    D: Fn(f64) -> f64,
{
    fn evaluate(&self, x: f64) -> f64 {
        (self.func)(x)
    }

    fn derivative(&self, x: f64) -> Option<f64> {
        Some((self.derivative_func)(x))
    }

    fn name(&self) -> &str {
        &self.name
    }
}

////////////////////////////////////OUTCOMES AND CONFIGURATION////////////////////////////////////

/// Terminal state of a root finding run
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RootOutcome {
    Converged { root: f64, iterations: usize },
    NotConverged { last_iterate: f64, iterations: usize },
}

impl RootOutcome {
    pub fn root(&self) -> Option<f64> {
        match self {
            RootOutcome::Converged { root, .. } => Some(*root),
            RootOutcome::NotConverged { .. } => None,
        }
    }

    pub fn iterations(&self) -> usize {
        match self {
            RootOutcome::Converged { iterations, .. }
            | RootOutcome::NotConverged { iterations, .. } => *iterations,
        }
    }

    pub fn is_converged(&self) -> bool {
        matches!(self, RootOutcome::Converged { .. })
    }
}

/// Numeric seeds of a run: a bracket, one starting point or two starting points
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MethodParams {
    Bracket { a: f64, b: f64 },
    Initial { x0: f64 },
    TwoPoint { x0: f64, x1: f64 },
}

/// Configuration for root finding methods
#[derive(Debug, Clone, PartialEq)]
pub struct RootFindingConfig {
    /// relative error bound of the convergence test
    pub tolerance: f64,
    pub max_iterations: usize,
}

impl Default for RootFindingConfig {
    fn default() -> Self {
        Self {
            tolerance: 1e-6,
            max_iterations: 100,
        }
    }
}

impl RootFindingConfig {
    pub fn new(tolerance: f64, max_iterations: usize) -> Result<Self, RootFindingError> {
        let config = Self {
            tolerance,
            max_iterations,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), RootFindingError> {
        if !(self.tolerance.is_finite() && self.tolerance > 0.0) {
            return Err(RootFindingError::InvalidConfig(format!(
                "tolerance must be a positive number, got {}",
                self.tolerance
            )));
        }
        if self.max_iterations == 0 {
            return Err(RootFindingError::InvalidConfig(
                "max_iterations must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

fn same_sign(u: f64, v: f64) -> bool {
    (u > 0.0 && v > 0.0) || (u < 0.0 && v < 0.0)
}

fn opposite_signs(u: f64, v: f64) -> bool {
    (u > 0.0 && v < 0.0) || (u < 0.0 && v > 0.0)
}

// f(a)*f(b) <= 0 without the product, so tiny values cannot underflow; NaN never brackets
fn is_bracket(fa: f64, fb: f64) -> bool {
    !(fa.is_nan() || fb.is_nan() || same_sign(fa, fb))
}

/// Main structure for scalar root finding methods
#[derive(Debug, Clone, Default)]
pub struct ScalarRootFinder {
    config: RootFindingConfig,
}

impl ScalarRootFinder {
    /// Create a new ScalarRootFinder with default configuration
    pub fn new() -> Self {
        Self {
            config: RootFindingConfig::default(),
        }
    }

    /// Create a new ScalarRootFinder with custom configuration
    pub fn with_config(config: RootFindingConfig) -> Self {
        Self { config }
    }

    /// Set tolerance for convergence
    pub fn set_tolerance(&mut self, tolerance: f64) {
        self.config.tolerance = tolerance;
    }

    /// Set maximum number of iterations
    pub fn set_max_iterations(&mut self, max_iterations: usize) {
        self.config.max_iterations = max_iterations;
    }

    /////////////////////////////IMPLEMENTING SYMBOLIC FUNCTIONS///////////////////////////////////////////
    /// Parse `expr_str` and solve it with `method`
    pub fn solve_symbolic_str(
        &self,
        expr_str: &str,
        method: RootFindingMethod,
        params: MethodParams,
    ) -> Result<RootOutcome, RootFindingError> {
        let function = Function::parse(expr_str)?;
        self.solve_with_method(&function, method, params)
    }

    /// Solve with specific method; the shape of `params` must fit the method
    pub fn solve_with_method<F>(
        &self,
        function: &F,
        method: RootFindingMethod,
        params: MethodParams,
    ) -> Result<RootOutcome, RootFindingError>
    where
        F: NonlinearFunction,
    {
        match (method, params) {
            (RootFindingMethod::Bisection, MethodParams::Bracket { a, b }) => {
                self.bisection(function, a, b)
            }
            (RootFindingMethod::FalsePosition, MethodParams::Bracket { a, b }) => {
                self.false_position(function, a, b)
            }
            (RootFindingMethod::FixedPoint, MethodParams::Initial { x0 }) => {
                self.fixed_point(function, x0)
            }
            (RootFindingMethod::NewtonRaphson, MethodParams::Initial { x0 }) => {
                self.newton_raphson(function, x0)
            }
            (RootFindingMethod::Secant, MethodParams::TwoPoint { x0, x1 }) => {
                self.secant(function, x0, x1)
            }
            (method, params) => Err(RootFindingError::InvalidInput(format!(
                "{} expects parameters {:?}, got {:?}",
                method,
                method.parameter_names(),
                params
            ))),
        }
    }

    /////////////////////////////////////////METHODS///////////////////////////////////////////

    /// Bisection method for finding roots
    /// Requires that f(a) and f(b) have opposite signs or that one of them is zero
    pub fn bisection<F>(
        &self,
        function: &F,
        mut a: f64,
        mut b: f64,
    ) -> Result<RootOutcome, RootFindingError>
    where
        F: NonlinearFunction,
    {
        self.config.validate()?;
        if a > b {
            std::mem::swap(&mut a, &mut b);
        }

        let mut fa = function.evaluate(a);
        let fb = function.evaluate(b);

        if !is_bracket(fa, fb) {
            warn!("bisection: no sign change on [{}, {}]", a, b);
            return Err(RootFindingError::InvalidBracket { a, b, fa, fb });
        }

        // root exactly at an endpoint
        if fa == 0.0 {
            return Ok(RootOutcome::Converged {
                root: a,
                iterations: 0,
            });
        }
        if fb == 0.0 {
            return Ok(RootOutcome::Converged {
                root: b,
                iterations: 0,
            });
        }

        info!(
            "bisection method for function: {}, initial interval: [{}, {}], tolerance: {}",
            function.name(),
            a,
            b,
            self.config.tolerance
        );

        let mut previous: Option<f64> = None;
        let mut c = a;
        for iteration in 1..=self.config.max_iterations {
            c = (a + b) / 2.0;
            let fc = function.evaluate(c);
            debug!(
                "iteration {}: x = {:.10}, f(x) = {:.2e}, interval = [{:.6}, {:.6}]",
                iteration, c, fc, a, b
            );
            if fc.is_nan() {
                return Err(RootFindingError::NonFiniteIterate { x: c, iteration });
            }

            if fc == 0.0
                || previous.is_some_and(|p| converged(p, c, self.config.tolerance))
            {
                info!("bisection converged to {} in {} iterations", c, iteration);
                return Ok(RootOutcome::Converged {
                    root: c,
                    iterations: iteration,
                });
            }

            // keep the half where the sign change is
            if same_sign(fa, fc) {
                a = c;
                fa = fc;
            } else {
                b = c;
            }
            previous = Some(c);
        }

        info!(
            "bisection did not converge in {} iterations",
            self.config.max_iterations
        );
        Ok(RootOutcome::NotConverged {
            last_iterate: c,
            iterations: self.config.max_iterations,
        })
    }

    /// Fixed-point iteration x_{n+1} = g(x_n), where `function` is g itself.
    /// No contraction check is made: divergent g simply ends as NotConverged, also when
    /// the iterates overflow before the budget is spent.
    pub fn fixed_point<F>(&self, function: &F, x0: f64) -> Result<RootOutcome, RootFindingError>
    where
        F: NonlinearFunction,
    {
        self.config.validate()?;
        info!(
            "fixed point iteration for function: {}, initial guess: {}, tolerance: {}",
            function.name(),
            x0,
            self.config.tolerance
        );

        let mut x = x0;
        let mut gx = function.evaluate(x);
        for iteration in 1..=self.config.max_iterations {
            let next = gx;
            // overflow is how a divergent map shows itself
            if !next.is_finite() {
                warn!(
                    "fixed point iteration diverged at iteration {}: g({}) = {}",
                    iteration, x, next
                );
                return Ok(RootOutcome::NotConverged {
                    last_iterate: x,
                    iterations: iteration,
                });
            }
            let g_next = function.evaluate(next);
            debug!(
                "iteration {}: x = {:.10}, g(x) = {:.10}, rel. change = {:.2e}",
                iteration,
                next,
                g_next,
                relative_error(x, next)
            );

            if g_next == 0.0 || converged(x, next, self.config.tolerance) {
                info!("fixed point converged to {} in {} iterations", next, iteration);
                return Ok(RootOutcome::Converged {
                    root: next,
                    iterations: iteration,
                });
            }
            x = next;
            gx = g_next;
        }

        info!(
            "fixed point iteration did not converge in {} iterations",
            self.config.max_iterations
        );
        Ok(RootOutcome::NotConverged {
            last_iterate: x,
            iterations: self.config.max_iterations,
        })
    }

    /// False position (regula falsi). Same bracket requirement as bisection, but the new point is
    /// where the chord through (a, f(a)) and (b, f(b)) crosses zero.
    pub fn false_position<F>(
        &self,
        function: &F,
        mut a: f64,
        mut b: f64,
    ) -> Result<RootOutcome, RootFindingError>
    where
        F: NonlinearFunction,
    {
        self.config.validate()?;
        let mut fa = function.evaluate(a);
        let mut fb = function.evaluate(b);

        if !is_bracket(fa, fb) {
            warn!("false position: no sign change on [{}, {}]", a, b);
            return Err(RootFindingError::InvalidBracket { a, b, fa, fb });
        }
        if fa == 0.0 {
            return Ok(RootOutcome::Converged {
                root: a,
                iterations: 0,
            });
        }
        if fb == 0.0 {
            return Ok(RootOutcome::Converged {
                root: b,
                iterations: 0,
            });
        }

        info!(
            "false position method for function: {}, initial interval: [{}, {}], tolerance: {}",
            function.name(),
            a,
            b,
            self.config.tolerance
        );

        let mut p = a;
        for iteration in 1..=self.config.max_iterations {
            p = (a * fb - b * fa) / (fb - fa);
            let fp = function.evaluate(p);
            debug!(
                "iteration {}: x = {:.10}, f(x) = {:.2e}, interval = [{:.6}, {:.6}]",
                iteration, p, fp, a, b
            );
            if !p.is_finite() || fp.is_nan() {
                return Err(RootFindingError::NonFiniteIterate { x: p, iteration });
            }

            if fp == 0.0 {
                return Ok(RootOutcome::Converged {
                    root: p,
                    iterations: iteration,
                });
            }

            let replaced = if opposite_signs(fp, fa) {
                let old = b;
                b = p;
                fb = fp;
                old
            } else if opposite_signs(fp, fb) {
                let old = a;
                a = p;
                fa = fp;
                old
            } else {
                // cannot happen while f(a), f(b) keep opposite signs and f(p) != 0
                warn!(
                    "false position stalled at iteration {}: f({}) = {} keeps the sign of both ends",
                    iteration, p, fp
                );
                return Ok(RootOutcome::NotConverged {
                    last_iterate: p,
                    iterations: iteration,
                });
            };

            if converged(replaced, p, self.config.tolerance) {
                info!("false position converged to {} in {} iterations", p, iteration);
                return Ok(RootOutcome::Converged {
                    root: p,
                    iterations: iteration,
                });
            }
        }

        info!(
            "false position did not converge in {} iterations",
            self.config.max_iterations
        );
        Ok(RootOutcome::NotConverged {
            last_iterate: p,
            iterations: self.config.max_iterations,
        })
    }

    /// Newton-Raphson method. Uses the analytical derivative when the function provides one,
    /// a central difference otherwise.
    pub fn newton_raphson<F>(&self, function: &F, x0: f64) -> Result<RootOutcome, RootFindingError>
    where
        F: NonlinearFunction,
    {
        self.config.validate()?;
        info!(
            "Newton-Raphson method for function: {}, initial guess: {}, tolerance: {}",
            function.name(),
            x0,
            self.config.tolerance
        );

        let mut x = x0;
        for iteration in 1..=self.config.max_iterations {
            let fx = function.evaluate(x);

            // Get derivative
            let fpx = match function.derivative(x) {
                Some(deriv) => deriv,
                None => {
                    let h = 1e-8 * x.abs().max(1.0);
                    (function.evaluate(x + h) - function.evaluate(x - h)) / (2.0 * h)
                }
            };
            debug!(
                "iteration {}: x = {:.10}, f(x) = {:.2e}, f'(x) = {:.2e}",
                iteration, x, fx, fpx
            );

            if fpx == 0.0 || !fpx.is_finite() {
                warn!("Newton-Raphson: derivative {} at x = {}", fpx, x);
                return Err(RootFindingError::ZeroDerivative { x, iteration });
            }

            // Newton-Raphson update
            let x_new = x - fx / fpx;
            if !x_new.is_finite() {
                return Err(RootFindingError::NonFiniteIterate { x, iteration });
            }

            if converged(x, x_new, self.config.tolerance) {
                info!(
                    "Newton-Raphson converged to {} in {} iterations",
                    x_new, iteration
                );
                return Ok(RootOutcome::Converged {
                    root: x_new,
                    iterations: iteration,
                });
            }
            x = x_new;
        }

        info!(
            "Newton-Raphson did not converge in {} iterations",
            self.config.max_iterations
        );
        Ok(RootOutcome::NotConverged {
            last_iterate: x,
            iterations: self.config.max_iterations,
        })
    }

    /// Secant method for finding roots
    /// Requires two distinct initial guesses x0 and x1
    pub fn secant<F>(
        &self,
        function: &F,
        x0: f64,
        x1: f64,
    ) -> Result<RootOutcome, RootFindingError>
    where
        F: NonlinearFunction,
    {
        self.config.validate()?;
        if x0 == x1 {
            return Err(RootFindingError::DegenerateSeed(x0));
        }

        info!(
            "secant method for function: {}, initial guesses: x0 = {}, x1 = {}, tolerance: {}",
            function.name(),
            x0,
            x1,
            self.config.tolerance
        );

        let (mut a, mut b) = (x0, x1);
        let mut fa = function.evaluate(a);
        let mut fb = function.evaluate(b);

        for iteration in 1..=self.config.max_iterations {
            // exact root in the window
            if fb == 0.0 {
                return Ok(RootOutcome::Converged {
                    root: b,
                    iterations: iteration - 1,
                });
            }
            // the secant slope vanishes
            if fb == fa {
                warn!("secant: f({}) = f({}) = {}", a, b, fb);
                return Err(RootFindingError::ZeroDerivative { x: b, iteration });
            }

            let p = (a * fb - b * fa) / (fb - fa);
            debug!(
                "iteration {}: x = {:.10}, rel. change = {:.2e}",
                iteration,
                p,
                relative_error(b, p)
            );
            if !p.is_finite() {
                return Err(RootFindingError::NonFiniteIterate { x: b, iteration });
            }

            if converged(b, p, self.config.tolerance) {
                info!("secant converged to {} in {} iterations", p, iteration);
                return Ok(RootOutcome::Converged {
                    root: p,
                    iterations: iteration,
                });
            }

            // shift the window
            a = b;
            fa = fb;
            b = p;
            fb = function.evaluate(p);
        }

        info!(
            "secant did not converge in {} iterations",
            self.config.max_iterations
        );
        Ok(RootOutcome::NotConverged {
            last_iterate: b,
            iterations: self.config.max_iterations,
        })
    }
}

/// Run the method called `name` (e.g. "bisection", "newton_raphson") on `function`
pub fn run_method<F>(
    name: &str,
    function: &F,
    params: MethodParams,
    config: &RootFindingConfig,
) -> Result<RootOutcome, RootFindingError>
where
    F: NonlinearFunction,
{
    let method = RootFindingMethod::from_str(name.trim())
        .map_err(|_| RootFindingError::UnknownMethod(name.to_string()))?;
    ScalarRootFinder::with_config(config.clone()).solve_with_method(function, method, params)
}

// Convenience functions for quick usage
pub fn bisection<F>(function: F, a: f64, b: f64, tolerance: f64) -> Result<Option<f64>, RootFindingError>
where
    F: Fn(f64) -> f64,
{
    let func = ClosureFunction::new(function, "bisection_function".to_string());
    let mut solver = ScalarRootFinder::new();
    solver.set_tolerance(tolerance);
    Ok(solver.bisection(&func, a, b)?.root())
}

pub fn secant<F>(function: F, x0: f64, x1: f64, tolerance: f64) -> Result<Option<f64>, RootFindingError>
where
    F: Fn(f64) -> f64,
{
    let func = ClosureFunction::new(function, "secant_function".to_string());
    let mut solver = ScalarRootFinder::new();
    solver.set_tolerance(tolerance);
    Ok(solver.secant(&func, x0, x1)?.root())
}
