//! Bounded fork-join execution of per-admin-unit work.

use rayon::prelude::*;
use tracing::{debug, info};

use crate::error::ImpactError;

/// Runs `task` once per unit on a dedicated pool of `workers` threads.
///
/// Tasks only see shared immutable state through the closure; results are
/// returned in the order of `units` once every task has finished. The first
/// error (in unit order) is returned if any task fails. `workers == 0`
/// lets rayon pick the thread count.
///
/// # Errors
///
/// Returns the task error, or [`ImpactError::Pool`] (converted into `E`)
/// if the pool cannot be built.
pub fn run_per_unit<U, T, E, F>(units: &[U], workers: usize, task: F) -> Result<Vec<T>, E>
where
    U: Sync,
    T: Send,
    E: Send + From<ImpactError>,
    F: Fn(&U) -> Result<T, E> + Sync,
{
    let pool = rayon::ThreadPoolBuilder::new()
        .num_threads(workers)
        .build()
        .map_err(ImpactError::from)?;
    info!(units = units.len(), threads = pool.current_num_threads(), "running per-unit tasks");

    let results: Vec<Result<T, E>> = pool.install(|| units.par_iter().map(&task).collect());
    let out = results.into_iter().collect::<Result<Vec<T>, E>>()?;
    debug!(completed = out.len(), "per-unit tasks joined");
    Ok(out)
}
