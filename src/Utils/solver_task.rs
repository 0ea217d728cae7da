//! A complete root finding job read from a task document (see `task_parser`):
//! the function, the method, its seeds and the stopping rule.
//!
//! ```
//! use RustedRoots::Utils::solver_task::SolverTask;
//! let task: SolverTask = "function: x^2 - 2\nmethod: newton_raphson\nx0: 1\ntolerance: 1e-10"
//!     .parse()
//!     .unwrap();
//! let outcome = task.run().unwrap();
//! assert!((outcome.root().unwrap() - 2f64.sqrt()).abs() < 1e-9);
//! println!("{}", task.summary_table(&outcome));
//! ```
use crate::Utils::logger::level_from_str;
use crate::Utils::task_parser::{DocumentMap, TaskError, Value, parse_document};
use crate::numerical::scalar_root_finding::{
    MethodParams, RootFindingConfig, RootFindingError, RootFindingMethod, RootOutcome,
    ScalarRootFinder,
};
use crate::symbolic::function::Function;
use itertools::Itertools;
use log::{LevelFilter, info};
use std::path::Path;
use std::str::FromStr;
use tabled::{builder::Builder, settings::Style};

const KNOWN_KEYS: [&str; 9] = [
    "function",
    "method",
    "a",
    "b",
    "x0",
    "x1",
    "tolerance",
    "max_iterations",
    "loglevel",
];

#[derive(Debug, Clone)]
pub struct SolverTask {
    pub function: Function,
    pub method: RootFindingMethod,
    pub params: MethodParams,
    pub config: RootFindingConfig,
    /// level requested by the document; installing a logger is up to the caller
    pub loglevel: Option<LevelFilter>,
}

fn required<'a>(document: &'a DocumentMap, key: &str) -> Result<&'a Value, TaskError> {
    document
        .get(key)
        .ok_or_else(|| TaskError::MissingKey(key.to_string()))
}

fn required_float(document: &DocumentMap, key: &str) -> Result<f64, TaskError> {
    let value = required(document, key)?;
    value.as_float().ok_or_else(|| TaskError::InvalidValue {
        key: key.to_string(),
        value: value.to_string(),
    })
}

/// seeds of `method` as (name, value) pairs
pub fn parameter_pairs(params: &MethodParams) -> Vec<(&'static str, f64)> {
    match *params {
        MethodParams::Bracket { a, b } => vec![("a", a), ("b", b)],
        MethodParams::Initial { x0 } => vec![("x0", x0)],
        MethodParams::TwoPoint { x0, x1 } => vec![("x0", x0), ("x1", x1)],
    }
}

impl SolverTask {
    pub fn from_document(document: &DocumentMap) -> Result<Self, TaskError> {
        if let Some(unknown) = document
            .keys()
            .find(|key| !KNOWN_KEYS.contains(&key.as_str()))
        {
            return Err(TaskError::UnknownKey(unknown.clone()));
        }

        // a bare number such as `5` is a valid constant function
        let function_text = required(document, "function")?.to_string();
        let function = Function::parse(&function_text).map_err(RootFindingError::from)?;

        let method_text = required(document, "method")?.to_string();
        let method = RootFindingMethod::from_str(&method_text)
            .map_err(|_| RootFindingError::UnknownMethod(method_text.clone()))?;

        let params = match method {
            RootFindingMethod::Bisection | RootFindingMethod::FalsePosition => {
                MethodParams::Bracket {
                    a: required_float(document, "a")?,
                    b: required_float(document, "b")?,
                }
            }
            RootFindingMethod::FixedPoint | RootFindingMethod::NewtonRaphson => {
                MethodParams::Initial {
                    x0: required_float(document, "x0")?,
                }
            }
            RootFindingMethod::Secant => MethodParams::TwoPoint {
                x0: required_float(document, "x0")?,
                x1: required_float(document, "x1")?,
            },
        };

        let mut config = RootFindingConfig::default();
        if document.contains_key("tolerance") {
            config.tolerance = required_float(document, "tolerance")?;
        }
        if let Some(value) = document.get("max_iterations") {
            config.max_iterations = value
                .as_integer()
                .and_then(|n| usize::try_from(n).ok())
                .ok_or_else(|| TaskError::InvalidValue {
                    key: "max_iterations".to_string(),
                    value: value.to_string(),
                })?;
        }
        config.validate()?;

        let loglevel = match document.get("loglevel") {
            Some(value) => Some(level_from_str(&value.to_string())?),
            None => None,
        };

        Ok(Self {
            function,
            method,
            params,
            config,
            loglevel,
        })
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, TaskError> {
        let text = std::fs::read_to_string(path)?;
        text.parse()
    }

    pub fn run(&self) -> Result<RootOutcome, TaskError> {
        info!(
            "task: {} on f(x) = {} with {}",
            self.method,
            self.function,
            self.parameters_line()
        );
        let solver = ScalarRootFinder::with_config(self.config.clone());
        Ok(solver.solve_with_method(&self.function, self.method, self.params)?)
    }

    /// e.g. "a = 1, b = 2"
    pub fn parameters_line(&self) -> String {
        parameter_pairs(&self.params)
            .iter()
            .map(|(name, value)| format!("{} = {}", name, value))
            .join(", ")
    }

    /// the task and its outcome as a two-column table
    pub fn summary_table(&self, outcome: &RootOutcome) -> String {
        let mut builder = Builder::default();
        builder.push_record(["function", &format!("f(x) = {}", self.function)]);
        builder.push_record(["method", &self.method.to_string()]);
        builder.push_record(["parameters", &self.parameters_line()]);
        builder.push_record(["tolerance", &format!("{:e}", self.config.tolerance)]);
        builder.push_record(["max iterations", &self.config.max_iterations.to_string()]);
        for row in outcome_rows(outcome) {
            builder.push_record(row);
        }
        let mut table = builder.build();
        table.with(Style::modern_rounded());
        table.to_string()
    }
}

/// status, value and iteration rows describing `outcome`
pub fn outcome_rows(outcome: &RootOutcome) -> [[String; 2]; 3] {
    match outcome {
        RootOutcome::Converged { root, iterations } => [
            ["status".to_string(), "converged".to_string()],
            ["root".to_string(), root.to_string()],
            ["iterations".to_string(), iterations.to_string()],
        ],
        RootOutcome::NotConverged {
            last_iterate,
            iterations,
        } => [
            ["status".to_string(), "not converged".to_string()],
            ["last iterate".to_string(), last_iterate.to_string()],
            ["iterations".to_string(), iterations.to_string()],
        ],
    }
}

impl FromStr for SolverTask {
    type Err = TaskError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let document = parse_document(s)?;
        Self::from_document(&document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use std::io::Write;

    #[test]
    fn test_task_from_document() {
        let task: SolverTask = "
            function: x^3 - x - 1
            method: false_position
            a: 1
            b: 2
            tolerance: 1e-10
            max_iterations: 500
            loglevel: warn
        "
        .parse()
        .unwrap();
        assert_eq!(task.method, RootFindingMethod::FalsePosition);
        assert_eq!(task.params, MethodParams::Bracket { a: 1.0, b: 2.0 });
        assert_eq!(task.config.tolerance, 1e-10);
        assert_eq!(task.config.max_iterations, 500);
        assert_eq!(task.loglevel, Some(LevelFilter::Warn));
        assert_eq!(task.parameters_line(), "a = 1, b = 2");

        let outcome = task.run().unwrap();
        assert_abs_diff_eq!(outcome.root().unwrap(), 1.324717957244746, epsilon = 1e-8);
    }

    #[test]
    fn test_defaults_apply() {
        let task: SolverTask = "function: cos(x)\nmethod: fixed_point\nx0: 1"
            .parse()
            .unwrap();
        assert_eq!(task.config, RootFindingConfig::default());
        assert_eq!(task.loglevel, None);
        assert!(task.run().unwrap().is_converged());
    }

    #[test]
    fn test_constant_function_value() {
        let task: SolverTask = "function: 5\nmethod: secant\nx0: 0\nx1: 1"
            .parse()
            .unwrap();
        assert_eq!(task.function.to_display_string(), "5");
        assert!(matches!(
            task.run(),
            Err(TaskError::Solver(RootFindingError::ZeroDerivative { .. }))
        ));
    }

    #[test]
    fn test_missing_and_unknown_keys() {
        let missing = "function: x - 1\nmethod: secant\nx0: 0".parse::<SolverTask>();
        assert!(matches!(missing, Err(TaskError::MissingKey(key)) if key == "x1"));

        let unknown = "function: x - 1\nmethod: newton_raphson\nx0: 0\nguess: 1"
            .parse::<SolverTask>();
        assert!(matches!(unknown, Err(TaskError::UnknownKey(key)) if key == "guess"));

        let no_function = "method: bisection\na: 0\nb: 1".parse::<SolverTask>();
        assert!(matches!(no_function, Err(TaskError::MissingKey(key)) if key == "function"));
    }

    #[test]
    fn test_invalid_values() {
        let bad_seed = "function: x\nmethod: newton_raphson\nx0: one".parse::<SolverTask>();
        assert!(matches!(bad_seed, Err(TaskError::InvalidValue { .. })));

        let bad_iterations =
            "function: x\nmethod: newton_raphson\nx0: 1\nmax_iterations: 2.5".parse::<SolverTask>();
        assert!(matches!(bad_iterations, Err(TaskError::InvalidValue { .. })));

        let bad_tolerance =
            "function: x\nmethod: newton_raphson\nx0: 1\ntolerance: -1".parse::<SolverTask>();
        assert!(matches!(
            bad_tolerance,
            Err(TaskError::Solver(RootFindingError::InvalidConfig(_)))
        ));

        let bad_method = "function: x\nmethod: brent\nx0: 1".parse::<SolverTask>();
        assert!(matches!(
            bad_method,
            Err(TaskError::Solver(RootFindingError::UnknownMethod(_)))
        ));

        let bad_function = "function: sin + x\nmethod: newton_raphson\nx0: 1".parse::<SolverTask>();
        assert!(matches!(
            bad_function,
            Err(TaskError::Solver(RootFindingError::Parse(_)))
        ));

        let bad_level = "function: x\nmethod: newton_raphson\nx0: 1\nloglevel: loud"
            .parse::<SolverTask>();
        assert!(matches!(bad_level, Err(TaskError::Logger(_))));
    }

    #[test]
    fn test_task_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "# square root of two").unwrap();
        writeln!(file, "function: x^2 - 2").unwrap();
        writeln!(file, "method: bisection").unwrap();
        writeln!(file, "a: 0").unwrap();
        writeln!(file, "b: 2").unwrap();
        let task = SolverTask::from_file(file.path()).unwrap();
        let outcome = task.run().unwrap();
        assert_abs_diff_eq!(outcome.root().unwrap(), 2.0_f64.sqrt(), epsilon = 1e-5);

        assert!(matches!(
            SolverTask::from_file("no/such/task.txt"),
            Err(TaskError::Io(_))
        ));
    }

    #[test]
    fn test_summary_table() {
        let task: SolverTask = "function: x^2 - 2\nmethod: newton_raphson\nx0: 1"
            .parse()
            .unwrap();
        let outcome = task.run().unwrap();
        let table = task.summary_table(&outcome);
        assert!(table.contains("f(x) = x^2 - 2"));
        assert!(table.contains("newton_raphson"));
        assert!(table.contains("x0 = 1"));
        assert!(table.contains("converged"));

        let stalled = RootOutcome::NotConverged {
            last_iterate: 0.5,
            iterations: 3,
        };
        let table = task.summary_table(&stalled);
        assert!(table.contains("not converged"));
        assert!(table.contains("last iterate"));
    }
}
