//! Expiration Sweep Task
//!
//! Background task that periodically removes expired cache rows.

use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::error::{CacheError, Result};

// == Sweep Task ==
/// Owner of a running background sweep.
///
/// Dropping the value stops the task, so it can never outlive the engine
/// that holds it.
#[derive(Debug)]
pub struct SweepTask {
    handle: JoinHandle<()>,
    interval: Duration,
}

impl SweepTask {
    /// Stops the task. Safe to call more than once.
    pub fn stop(&self) {
        self.handle.abort();
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }
}

impl Drop for SweepTask {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Spawns a task that calls `sweep` every `interval`.
///
/// The first sweep happens one full interval after spawning. Each sweep runs
/// on the blocking pool so storage I/O never stalls the runtime's workers.
/// A failed or panicking sweep is logged and the next tick tries again.
///
/// # Errors
/// `InvalidConfig` for a zero interval or one too large to schedule,
/// `RuntimeUnavailable` when called outside a tokio runtime.
///
/// # Example
/// ```ignore
/// let task = spawn_sweep_task(move || store.delete_where_expired(now()), Duration::from_secs(60))?;
/// // Later, during teardown:
/// task.stop();
/// ```
pub fn spawn_sweep_task<F>(sweep: F, interval: Duration) -> Result<SweepTask>
where
    F: Fn() -> Result<usize> + Send + Sync + 'static,
{
    if interval.is_zero() {
        return Err(CacheError::InvalidConfig(
            "sweep interval must be greater than zero".to_string(),
        ));
    }
    let runtime = Handle::try_current().map_err(|_| CacheError::RuntimeUnavailable)?;
    let first_tick = Instant::now().checked_add(interval).ok_or_else(|| {
        CacheError::InvalidConfig(format!(
            "sweep interval of {} seconds is out of range",
            interval.as_secs()
        ))
    })?;
    let sweep = Arc::new(sweep);

    let handle = runtime.spawn(async move {
        info!(
            "Starting expiration sweep task with interval of {} seconds",
            interval.as_secs()
        );

        let mut ticker = interval_at(first_tick, interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            ticker.tick().await;

            let job = Arc::clone(&sweep);
            match tokio::task::spawn_blocking(move || job()).await {
                Ok(Ok(removed)) if removed > 0 => {
                    info!("EXPIRATION: [{}] object(s) expired", removed);
                }
                Ok(Ok(_)) => debug!("EXPIRATION: no expired entries found"),
                Ok(Err(err)) => warn!("Expiration sweep failed, retrying next tick: {}", err),
                Err(err) => warn!("Expiration sweep aborted, retrying next tick: {}", err),
            }
        }
    });

    Ok(SweepTask { handle, interval })
}
