//! Command execution - handlers, the executor, and the worker pool
//!
//! Where dispatched commands actually happen:
//! - **Executor** (`executor`) - implements the gateway's `CommandRunner`
//!   seam with an exhaustive match over the command sum type
//! - **Handlers** (`handlers`) - one per executable keyword; each builds a
//!   deployment API request from resolved options and relays the outcome to
//!   the requesting thread
//! - **Worker Pool** (`pool`) - optional bounded queue between dispatch and
//!   execution, for deployments that want backpressure instead of unbounded
//!   task fan-out

pub mod executor;
mod handlers;
pub mod pool;

pub use executor::Executor;
pub use pool::{PoolClosed, PoolMetricsSnapshot, WorkRequest, WorkerPool};
