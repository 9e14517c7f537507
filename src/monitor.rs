//! Monitor module - wires the classifier, the debouncer and a sink together
//!
//! The backend publishes snapshots through a [`MonitorHandle`] from whatever
//! thread it runs on. Bucket rebuilds happen on that thread under the
//! classifier lock; everything visibility-related is marshalled onto the
//! monitor's own task.

mod actor;
mod actor_handle;
mod commands;


pub use actor::MonitorActor;
pub use actor_handle::MonitorHandle;
pub use commands::MonitorCommand;
