pub mod event;
pub mod support;
pub mod user;

pub use event::{EventRepository, SyncReport};
pub use support::SupportRepository;
pub use user::UserRepository;

#[cfg(test)]
pub(crate) mod fake;
