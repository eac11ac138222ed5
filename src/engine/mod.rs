// src/engine/mod.rs

//! Orchestration engine.
//!
//! - `queue`: pure FIFO state machine for serialized tasks.
//! - `serial`: async executor loop driving a `QueueCore`.
//! - `dispatcher`: resolves a descriptor, runs its handler, reports errors.
//! - `build`: `dispatch_all` and `clean`.
//! - `live`: watch-mode trigger that rebuilds and notifies the dev-server.

pub mod build;
pub mod dispatcher;
pub mod live;
pub mod queue;
pub mod serial;

pub use build::{clean, dispatch_all, BuildReport};
pub use dispatcher::{DispatchTicket, Dispatcher};
pub use live::live_trigger;
pub use queue::{QueueCore, QueueState};
pub use serial::{QueueJob, SerialQueue};
