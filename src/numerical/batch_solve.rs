//! Solving many independent problems at once.
//! Functions are only read during a run, so problems are spread over the rayon thread pool
//! without any locking.
use crate::numerical::scalar_root_finding::{
    MethodParams, NonlinearFunction, RootFindingConfig, RootFindingError, RootFindingMethod,
    RootOutcome, ScalarRootFinder,
};
use log::info;
use rayon::prelude::*;

/// Solve every `(function, params)` pair with `method`; results keep the input order
pub fn solve_batch<F>(
    problems: &[(F, MethodParams)],
    method: RootFindingMethod,
    config: &RootFindingConfig,
) -> Vec<Result<RootOutcome, RootFindingError>>
where
    F: NonlinearFunction + Sync,
{
    info!(
        "solving {} problems with {} in parallel",
        problems.len(),
        method
    );
    let solver = ScalarRootFinder::with_config(config.clone());
    problems
        .par_iter()
        .map(|(function, params)| solver.solve_with_method(function, method, *params))
        .collect()
}
