//! Background retry of events whose last write never reached the backend.

pub mod connectivity;
pub mod scheduler;

pub use connectivity::{Connectivity, TcpProbe};
pub use scheduler::{SyncHandle, SyncScheduler};
