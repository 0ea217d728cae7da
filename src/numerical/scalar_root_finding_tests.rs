#[cfg(test)]
mod tests {
    use crate::numerical::scalar_root_finding::*;
    use crate::symbolic::function::{Function, parse_function};
    use approx::assert_abs_diff_eq;
    use std::cell::Cell;

    const CUBIC_ROOT: f64 = 1.324717957244746; // x^3 - x - 1
    const DOTTIE: f64 = 0.7390851332151607; // x = cos(x)

    fn solver(tolerance: f64, max_iterations: usize) -> ScalarRootFinder {
        ScalarRootFinder::with_config(RootFindingConfig::new(tolerance, max_iterations).unwrap())
    }

    fn f(expression: &str) -> Function {
        parse_function(expression).unwrap()
    }

    /////////////////////////////////////BISECTION/////////////////////////////////////////
    #[test]
    fn test_bisection_sqrt2() {
        let result = solver(1e-6, 100).bisection(&f("x^2-2"), 0.0, 2.0).unwrap();
        let root = result.root().expect("bisection should converge");
        assert_abs_diff_eq!(root, 2.0_f64.sqrt(), epsilon = 1e-6);
        assert!(result.iterations() > 1);
    }

    #[test]
    fn test_bisection_invalid_bracket() {
        let result = solver(1e-6, 100).bisection(&f("x-5"), 1.0, 2.0);
        assert_eq!(
            result,
            Err(RootFindingError::InvalidBracket {
                a: 1.0,
                b: 2.0,
                fa: -4.0,
                fb: -3.0
            })
        );
    }

    #[test]
    fn test_bisection_root_at_endpoint() {
        let result = solver(1e-6, 100).bisection(&f("x-2"), 1.0, 2.0).unwrap();
        assert_eq!(
            result,
            RootOutcome::Converged {
                root: 2.0,
                iterations: 0
            }
        );
    }

    #[test]
    fn test_bisection_swapped_interval() {
        let result = solver(1e-10, 200).bisection(&f("sin(x)"), 4.0, 3.0).unwrap();
        assert_abs_diff_eq!(result.root().unwrap(), std::f64::consts::PI, epsilon = 1e-9);
    }

    #[test]
    fn test_bisection_exhausted_budget() {
        let result = solver(1e-6, 1).bisection(&f("x^2-2"), 0.0, 2.0).unwrap();
        assert_eq!(
            result,
            RootOutcome::NotConverged {
                last_iterate: 1.0,
                iterations: 1
            }
        );
        assert_eq!(result.root(), None);
    }

    /////////////////////////////////////FIXED POINT///////////////////////////////////////
    #[test]
    fn test_fixed_point_cosine() {
        let result = solver(1e-8, 200).fixed_point(&f("cos(x)"), 1.0).unwrap();
        assert!(result.is_converged());
        assert_abs_diff_eq!(result.root().unwrap(), DOTTIE, epsilon = 1e-6);
    }

    #[test]
    fn test_fixed_point_divergent_map() {
        let result = solver(1e-8, 50).fixed_point(&f("2x"), 1.0).unwrap();
        assert!(!result.is_converged());
        assert_eq!(result.iterations(), 50);
    }

    #[test]
    fn test_fixed_point_zero_iterate_converges() {
        // g(x) = x - 1 from 1: the first iterate is 0, which counts as converged
        let result = solver(1e-8, 50).fixed_point(&f("x - 1"), 1.0).unwrap();
        assert_eq!(
            result,
            RootOutcome::Converged {
                root: 0.0,
                iterations: 1
            }
        );
    }

    #[test]
    fn test_fixed_point_overflow_is_not_converged() {
        // g(x) = x^2 from 2 gives 2^(2^n), which overflows at the tenth iterate
        let result = solver(1e-8, 100).fixed_point(&f("x^2"), 2.0).unwrap();
        assert_eq!(
            result,
            RootOutcome::NotConverged {
                last_iterate: 2.0_f64.powi(512),
                iterations: 10
            }
        );
    }

    ///////////////////////////////////FALSE POSITION//////////////////////////////////////
    #[test]
    fn test_false_position_cubic() {
        let result = solver(1e-10, 200)
            .false_position(&f("x^3 - x - 1"), 1.0, 2.0)
            .unwrap();
        assert_abs_diff_eq!(result.root().unwrap(), CUBIC_ROOT, epsilon = 1e-8);
    }

    #[test]
    fn test_false_position_invalid_bracket() {
        let result = solver(1e-6, 100).false_position(&f("x^2 + 1"), -1.0, 1.0);
        assert!(matches!(result, Err(RootFindingError::InvalidBracket { .. })));
    }

    #[test]
    fn test_false_position_nan_is_reported() {
        let func = ClosureFunction::new(
            |x: f64| if x.abs() < 0.9 { f64::NAN } else { x },
            "nan in the middle".to_string(),
        );
        let result = solver(1e-6, 100).false_position(&func, -1.0, 1.0);
        assert_eq!(
            result,
            Err(RootFindingError::NonFiniteIterate {
                x: 0.0,
                iteration: 1
            })
        );
    }

    #[test]
    fn test_false_position_exhausted_budget() {
        // first chord point of x^3 - x - 1 on [1, 2] is 7/6
        let result = solver(1e-10, 1)
            .false_position(&f("x^3 - x - 1"), 1.0, 2.0)
            .unwrap();
        assert_eq!(
            result,
            RootOutcome::NotConverged {
                last_iterate: 7.0 / 6.0,
                iterations: 1
            }
        );
    }

    ///////////////////////////////////NEWTON-RAPHSON//////////////////////////////////////
    #[test]
    fn test_newton_raphson_quadratic_convergence() {
        let result = solver(1e-10, 100)
            .newton_raphson(&f("x^2 - 2"), 1.0)
            .unwrap();
        assert_abs_diff_eq!(result.root().unwrap(), 2.0_f64.sqrt(), epsilon = 1e-12);
        assert!(result.iterations() <= 6);
    }

    #[test]
    fn test_newton_raphson_zero_derivative() {
        let result = solver(1e-10, 100).newton_raphson(&f("x^3"), 0.0);
        assert_eq!(
            result,
            Err(RootFindingError::ZeroDerivative {
                x: 0.0,
                iteration: 1
            })
        );
    }

    #[test]
    fn test_newton_raphson_trig() {
        let result = solver(1e-12, 100)
            .newton_raphson(&f("x - cos(x)"), 1.0)
            .unwrap();
        assert_abs_diff_eq!(result.root().unwrap(), DOTTIE, epsilon = 1e-12);
    }

    #[test]
    fn test_newton_raphson_numerical_derivative_fallback() {
        let func = ClosureFunction::new(|x| x * x - 4.0, "x^2 - 4".to_string());
        let result = solver(1e-10, 100).newton_raphson(&func, 1.0).unwrap();
        assert_abs_diff_eq!(result.root().unwrap(), 2.0, epsilon = 1e-9);
    }

    #[test]
    fn test_newton_raphson_closure_with_derivative() {
        let func = FunctionWithDerivative::new(
            |x| x * x * x - 2.0 * x - 5.0,
            |x| 3.0 * x * x - 2.0,
            "x^3 - 2x - 5".to_string(),
        );
        let result = solver(1e-12, 100).newton_raphson(&func, 2.0).unwrap();
        assert_abs_diff_eq!(result.root().unwrap(), 2.094551481542327, epsilon = 1e-9);
    }

    #[test]
    fn test_newton_raphson_exhausted_budget() {
        let result = solver(1e-10, 1).newton_raphson(&f("x^2 - 2"), 1.0).unwrap();
        assert!(!result.is_converged());
        assert_eq!(result.iterations(), 1);
    }

    ///////////////////////////////////////SECANT//////////////////////////////////////////
    #[test]
    fn test_secant_degenerate_seed_evaluates_nothing() {
        let calls = Cell::new(0);
        let func = ClosureFunction::new(
            |x| {
                calls.set(calls.get() + 1);
                x
            },
            "counting".to_string(),
        );
        let result = solver(1e-6, 100).secant(&func, 1.5, 1.5);
        assert_eq!(result, Err(RootFindingError::DegenerateSeed(1.5)));
        assert_eq!(calls.get(), 0);
    }

    #[test]
    fn test_secant_sqrt2() {
        let result = solver(1e-10, 100).secant(&f("x^2 - 2"), 1.0, 2.0).unwrap();
        assert_abs_diff_eq!(result.root().unwrap(), 2.0_f64.sqrt(), epsilon = 1e-10);
    }

    #[test]
    fn test_secant_flat_function() {
        let result = solver(1e-6, 100).secant(&f("3"), 0.0, 1.0);
        assert!(matches!(
            result,
            Err(RootFindingError::ZeroDerivative { iteration: 1, .. })
        ));
    }

    #[test]
    fn test_secant_exact_root_seed() {
        let result = solver(1e-6, 100).secant(&f("x - 2"), 5.0, 2.0).unwrap();
        assert_eq!(
            result,
            RootOutcome::Converged {
                root: 2.0,
                iterations: 0
            }
        );
    }

    #[test]
    fn test_secant_exhausted_budget() {
        let result = solver(1e-10, 1).secant(&f("x^3 - x - 1"), 1.0, 2.0).unwrap();
        assert_eq!(
            result,
            RootOutcome::NotConverged {
                last_iterate: 7.0 / 6.0,
                iterations: 1
            }
        );
    }

    ////////////////////////////////DISPATCH AND CONFIG///////////////////////////////////
    #[test]
    fn test_methods_agree_on_cubic() {
        let cubic = f("x^3 - x - 1");
        let finder = solver(1e-12, 500);
        let runs = [
            (RootFindingMethod::Bisection, MethodParams::Bracket { a: 1.0, b: 2.0 }),
            (RootFindingMethod::FalsePosition, MethodParams::Bracket { a: 1.0, b: 2.0 }),
            (RootFindingMethod::NewtonRaphson, MethodParams::Initial { x0: 1.5 }),
            (RootFindingMethod::Secant, MethodParams::TwoPoint { x0: 1.0, x1: 2.0 }),
        ];
        for (method, params) in runs {
            let result = finder.solve_with_method(&cubic, method, params).unwrap();
            assert_abs_diff_eq!(result.root().unwrap(), CUBIC_ROOT, epsilon = 1e-9);
        }
    }

    #[test]
    fn test_run_method_by_name() {
        let config = RootFindingConfig::new(1e-10, 100).unwrap();
        let func = f("x^2 - 2");
        let result = run_method(
            "newton_raphson",
            &func,
            MethodParams::Initial { x0: 1.0 },
            &config,
        )
        .unwrap();
        assert_abs_diff_eq!(result.root().unwrap(), 2.0_f64.sqrt(), epsilon = 1e-10);

        let result = run_method(
            "Bisection",
            &func,
            MethodParams::Bracket { a: 0.0, b: 2.0 },
            &config,
        )
        .unwrap();
        assert!(result.is_converged());

        assert_eq!(
            run_method("regula", &func, MethodParams::Initial { x0: 1.0 }, &config),
            Err(RootFindingError::UnknownMethod("regula".to_string()))
        );
        assert!(matches!(
            run_method("secant", &func, MethodParams::Initial { x0: 1.0 }, &config),
            Err(RootFindingError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_method_names() {
        assert_eq!(RootFindingMethod::FalsePosition.to_string(), "false_position");
        assert_eq!(
            "fixed_point".parse::<RootFindingMethod>().unwrap(),
            RootFindingMethod::FixedPoint
        );
        assert_eq!(RootFindingMethod::Secant.parameter_names(), &["x0", "x1"]);
    }

    #[test]
    fn test_invalid_config_is_rejected_before_iterating() {
        assert!(matches!(
            RootFindingConfig::new(0.0, 10),
            Err(RootFindingError::InvalidConfig(_))
        ));
        assert!(matches!(
            RootFindingConfig::new(1e-6, 0),
            Err(RootFindingError::InvalidConfig(_))
        ));
        let mut finder = ScalarRootFinder::new();
        finder.set_tolerance(-1.0);
        assert!(matches!(
            finder.newton_raphson(&f("x - 1"), 0.0),
            Err(RootFindingError::InvalidConfig(_))
        ));
        finder.set_tolerance(1e-6);
        finder.set_max_iterations(0);
        assert!(matches!(
            finder.bisection(&f("x - 1"), 0.0, 2.0),
            Err(RootFindingError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_solve_symbolic_str() {
        let finder = solver(1e-10, 100);
        let result = finder
            .solve_symbolic_str(
                "x^2 + 3x^2 - 4",
                RootFindingMethod::Secant,
                MethodParams::TwoPoint { x0: 0.5, x1: 2.0 },
            )
            .unwrap();
        assert_abs_diff_eq!(result.root().unwrap(), 1.0, epsilon = 1e-10);

        assert!(matches!(
            finder.solve_symbolic_str(
                "cos + 1",
                RootFindingMethod::NewtonRaphson,
                MethodParams::Initial { x0: 0.0 }
            ),
            Err(RootFindingError::Parse(_))
        ));
    }

    #[test]
    fn test_convenience_functions() {
        let root = bisection(|x| x * x - 4.0, 0.0, 3.0, 1e-10).unwrap().unwrap();
        assert_abs_diff_eq!(root, 2.0, epsilon = 1e-9);
        let root = secant(|x| x * x - 4.0, 1.0, 3.0, 1e-10).unwrap().unwrap();
        assert_abs_diff_eq!(root, 2.0, epsilon = 1e-10);
    }
}
