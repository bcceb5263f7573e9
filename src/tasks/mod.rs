//! Background Tasks Module
//!
//! Contains background tasks owned by the cache engine.
//!
//! # Tasks
//! - Expiration sweep: Removes expired cache rows at a configured interval

mod sweep;

pub use sweep::{spawn_sweep_task, SweepTask};
